//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Load configuration from a YAML (or `.json`) file
pub fn load_config(path: &Path) -> Result<SfxConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {:?}", path))?;
    let config: SfxConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&contents)?,
        _ => serde_yaml::from_str(&contents)?,
    };
    config.validate()?;
    debug!(path = ?path, effects = config.effects.len(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
audio:
  sample_rate: 48000

gain:
  effects: 0.6

effects: []
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.gain.effects, 0.6);
        assert_eq!(config.gain.music, 0.5);
    }

    #[test]
    fn test_load_json_config() {
        let json = r#"{
  "audio": { "sample_rate": 22050 },
  "effects": [
    { "name": "hum", "generator": { "kind": "sine" }, "notes": [{ "hz": 60, "sec": 1.0 }] }
  ]
}"#;
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 22050);
        assert_eq!(config.effects[0].name, "hum");
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"audio:\n  sample_rate: 100\n").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: SfxConfig = serde_yaml::from_str(include_str!("../../sfx.example.yaml")).unwrap();
        config.validate().unwrap();
        assert!(!config.effects.is_empty());
    }
}
