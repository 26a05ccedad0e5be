use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("viewer.log");

    let guard = map_viewer::logging::init(true, Some(path.clone()));
    assert!(guard.is_some());
    tracing::info!("map viewer log line");

    sleep(Duration::from_millis(100));
    drop(guard);

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("map viewer log line"));
}
