//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Options controlling one analysis engine instance. Loadable from YAML;
/// every field has a default so partial files work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Wall-clock budget per job, in seconds.
    pub timeout_secs: u64,
    /// Default number of chunks returned by context queries.
    pub top_k: usize,
    /// Quality score below which the CLI exits non-zero.
    pub score_threshold: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            top_k: crate::index::DEFAULT_TOP_K,
            score_threshold: 50.0,
        }
    }
}

impl EngineOptions {
    /// Load options from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let options: EngineOptions = serde_yaml::from_str(&content)?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::default();
        assert_eq!(options.timeout_secs, 60);
        assert_eq!(options.top_k, 3);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs: 5").unwrap();
        let options = EngineOptions::from_file(file.path()).unwrap();
        assert_eq!(options.timeout_secs, 5);
        assert_eq!(options.top_k, 3);
    }
}
