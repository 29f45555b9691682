#![cfg(unix)]

use image_migrator::{CliRuntime, ContainerRuntime, ImageRef};
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

#[tokio::test]
async fn dropped_command_does_not_keep_running() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("finished");
    let script = dir.path().join("slow-runtime");
    std::fs::write(
        &script,
        format!("#!/bin/sh\nsleep 1\ntouch '{}'\n", marker.display()),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let runtime = CliRuntime::new(script.to_string_lossy());
    let image = ImageRef::parse("alpine:3").unwrap();
    let pushed = tokio::time::timeout(Duration::from_millis(200), runtime.push(&image)).await;
    assert!(pushed.is_err());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!marker.exists());
}
