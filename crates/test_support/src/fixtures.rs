use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// `<crate_dir>/tests/fixtures/<name>`. Pass `env!("CARGO_MANIFEST_DIR")`.
pub fn fixture_path(crate_dir: &str, name: &str) -> PathBuf {
    Path::new(crate_dir).join("tests").join("fixtures").join(name)
}

pub fn load_toml<T: DeserializeOwned>(path: &Path) -> T {
    let content =
        fs::read_to_string(path).unwrap_or_else(|err| panic!("failed to read TOML fixture {path:?}: {err}"));
    toml::from_str(&content).unwrap_or_else(|err| panic!("failed to parse TOML fixture {path:?}: {err}"))
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let content =
        fs::read_to_string(path).unwrap_or_else(|err| panic!("failed to read JSON fixture {path:?}: {err}"));
    serde_json::from_str(&content).unwrap_or_else(|err| panic!("failed to parse JSON fixture {path:?}: {err}"))
}
