//! Scenario 1 (broker election): two processes racing to acquire the same
//! endpoint path end up with exactly one broker.

use std::process::Stdio;
use std::time::Duration;

use crate::prelude::wait_for;

#[test]
fn exactly_one_of_two_racing_daemons_becomes_the_broker() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = dir.path().join("symposium.sock");

    let binary = {
        let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        manifest_dir.join("target/debug/symposium")
    };

    let mut first = std::process::Command::new(&binary)
        .args(["--endpoint", endpoint.to_str().unwrap(), "daemon"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("first daemon should spawn");

    assert!(
        wait_for(2000, || endpoint.exists()),
        "first daemon should bind the endpoint"
    );

    let second = std::process::Command::new(&binary)
        .args(["--endpoint", endpoint.to_str().unwrap(), "daemon"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .expect("second daemon should run and exit");

    assert!(
        !second.status.success(),
        "second daemon should fail to acquire the already-held endpoint"
    );
    assert!(String::from_utf8_lossy(&second.stderr).contains("already listening"));

    assert!(
        first.try_wait().expect("poll first daemon").is_none(),
        "first daemon should still be running as the broker"
    );

    first.kill().expect("kill first daemon");
    let _ = first.wait();
    std::thread::sleep(Duration::from_millis(50));
}
