#![allow(dead_code)]

use tempfile::TempDir;

/// A fresh directory removed when the guard drops.
pub fn temp_dir(label: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(&format!("mmesh-io-{label}-"))
        .tempdir()
        .unwrap_or_else(|e| panic!("failed to create temp dir for {label}: {e}"))
}
