use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vmbframe_core::DEFAULT_WAIT_TIMEOUT_MS;

/// Capture configuration.
///
/// Precedence, lowest first: built-in defaults, TOML file, `VMBFRAME_*`
/// environment variables, command-line flags (applied by `main`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the VimbaC shared library.
    pub lib_path: PathBuf,
    /// Camera id string; the first listed camera when unset.
    pub camera_id: Option<String>,
    /// Timeout for each frame wait, in milliseconds.
    pub wait_timeout_ms: u32,
    /// Number of frames announced and cycled through the queue.
    pub buffer_count: usize,
    /// Number of waits the capture loop performs.
    pub frame_count: usize,
    /// Directory to write filled frames to as PNG. Nothing is written when unset.
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lib_path: PathBuf::from(vmbframe_hw::library::DEFAULT_LIB_PATH),
            camera_id: None,
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            buffer_count: 3,
            frame_count: 10,
            output_dir: None,
        }
    }
}

impl Config {
    /// Load defaults, then the optional TOML file, then the process environment.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Override fields from `VMBFRAME_*` variables (and `VIMBAC_LIB_PATH`).
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("VMBFRAME_LIB_PATH").or_else(|| lookup("VIMBAC_LIB_PATH")) {
            self.lib_path = PathBuf::from(path);
        }
        if let Some(id) = lookup("VMBFRAME_CAMERA_ID") {
            self.camera_id = Some(id);
        }
        if let Some(dir) = lookup("VMBFRAME_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(dir));
        }
        env_parse(&lookup, "VMBFRAME_WAIT_TIMEOUT_MS", &mut self.wait_timeout_ms);
        env_parse(&lookup, "VMBFRAME_BUFFER_COUNT", &mut self.buffer_count);
        env_parse(&lookup, "VMBFRAME_FRAME_COUNT", &mut self.frame_count);
    }
}

fn env_parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring unparsable environment value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.wait_timeout_ms, 2000);
        assert_eq!(config.buffer_count, 3);
        assert_eq!(config.frame_count, 10);
        assert!(config.camera_id.is_none());
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_toml_overrides_some_fields() {
        let config = Config::from_toml(
            r#"
            camera_id = "DEV_000F315B91E2"
            wait_timeout_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.camera_id.as_deref(), Some("DEV_000F315B91E2"));
        assert_eq!(config.wait_timeout_ms, 500);
        assert_eq!(config.buffer_count, 3);
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        assert!(Config::from_toml("buffers = 4").is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::from_toml("frame_count = 5").unwrap();
        config.apply_env(lookup_from(&[
            ("VMBFRAME_FRAME_COUNT", "7"),
            ("VMBFRAME_OUTPUT_DIR", "/tmp/frames"),
        ]));
        assert_eq!(config.frame_count, 7);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/frames")));
    }

    #[test]
    fn test_env_lib_path_precedence() {
        let mut config = Config::default();
        config.apply_env(lookup_from(&[("VIMBAC_LIB_PATH", "/a/libVimbaC.so")]));
        assert_eq!(config.lib_path, PathBuf::from("/a/libVimbaC.so"));

        config.apply_env(lookup_from(&[
            ("VIMBAC_LIB_PATH", "/a/libVimbaC.so"),
            ("VMBFRAME_LIB_PATH", "/b/libVimbaC.so"),
        ]));
        assert_eq!(config.lib_path, PathBuf::from("/b/libVimbaC.so"));
    }

    #[test]
    fn test_unparsable_env_value_is_ignored() {
        let mut config = Config::default();
        config.apply_env(lookup_from(&[("VMBFRAME_WAIT_TIMEOUT_MS", "soon")]));
        assert_eq!(config.wait_timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
    }
}
