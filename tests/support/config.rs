//! Temporary config files.

use std::io::Write;

use tempfile::NamedTempFile;

/// Minimal valid config pointing at `base_url`.
pub fn minimal_toml(base_url: &str) -> String {
    format!("[server]\nbase_url = \"{base_url}\"\napi_token = \"file-token\"\n")
}

/// Write `contents` to a temp `.toml` file that lives as long as the handle.
pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("upsdash-test-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}
