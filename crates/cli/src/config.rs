use anyhow::{Context as AnyhowContext, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use vana_search::CoordinatorConfig;
use vana_vector_store::DEFAULT_DIMENSION;

pub const CONFIG_ENV: &str = "VANA_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "vana.toml";

/// Contents of `vana.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub search: CoordinatorConfig,
    pub memory: MemorySection,
    pub vector: VectorSection,
    pub web: WebSection,
    pub bench: BenchSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemorySection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VectorSection {
    pub path: Option<PathBuf>,
    pub dimension: usize,
}

impl Default for VectorSection {
    fn default() -> Self {
        Self {
            path: None,
            dimension: DEFAULT_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebSection {
    pub endpoint: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchSection {
    pub concurrency: usize,
    pub iterations: usize,
}

impl Default for BenchSection {
    fn default() -> Self {
        Self {
            concurrency: 4,
            iterations: 1,
        }
    }
}

impl AppConfig {
    /// Resolve and load the configuration: `explicit`, then `$VANA_CONFIG`, then `./vana.toml`
    /// when present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => env::var_os(CONFIG_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .or_else(|| {
                    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                    local.is_file().then_some(local)
                }),
        };

        match path {
            Some(path) => Self::from_path(&path),
            None => {
                log::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut cfg = Self::from_toml_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        if let Some(base) = path.parent() {
            cfg.resolve_relative_paths(base);
        }
        log::debug!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(raw).context("Failed to parse TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        self.search.validate()?;
        if self.vector.dimension == 0 {
            anyhow::bail!("vector.dimension must be greater than zero");
        }
        if self.bench.concurrency == 0 {
            anyhow::bail!("bench.concurrency must be greater than zero");
        }
        if self.bench.iterations == 0 {
            anyhow::bail!("bench.iterations must be greater than zero");
        }
        if self.web.timeout_secs == 0 {
            anyhow::bail!("web.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Data file paths are relative to the config file, not the working directory.
    fn resolve_relative_paths(&mut self, base: &Path) {
        for path in [&mut self.memory.path, &mut self.vector.path]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert!(cfg.memory.path.is_none());
        assert_eq!(cfg.vector.dimension, DEFAULT_DIMENSION);
        assert_eq!(cfg.web.timeout_secs, 10);
        assert_eq!(cfg.bench.concurrency, 4);
        assert_eq!(cfg.search, CoordinatorConfig::default());
    }

    #[test]
    fn sections_are_parsed() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [search]
            default_max_results = 3

            [search.sufficiency]
            user_context_min_results = 2

            [vector]
            path = "corpus.json"
            dimension = 64

            [web]
            endpoint = "https://search.example.com/v1"
            api_key_env = "SEARCH_KEY"

            [bench]
            concurrency = 2
            iterations = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.search.default_max_results, 3);
        assert_eq!(cfg.search.sufficiency.user_context_min_results, 2);
        assert_eq!(cfg.vector.dimension, 64);
        assert_eq!(cfg.web.api_key_env.as_deref(), Some("SEARCH_KEY"));
        assert_eq!(cfg.bench.iterations, 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::from_toml_str("[bench]\nconcurrency = 0\n").is_err());
        assert!(AppConfig::from_toml_str("[search]\ndefault_max_results = 0\n").is_err());
        assert!(AppConfig::from_toml_str("[memroy]\npath = \"x\"\n").is_err());
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vana.toml");
        fs::write(
            &path,
            "[memory]\npath = \"memory.json\"\n[vector]\npath = \"/abs/corpus.json\"\n",
        )
        .unwrap();

        let cfg = AppConfig::from_path(&path).unwrap();
        assert_eq!(cfg.memory.path, Some(dir.path().join("memory.json")));
        assert_eq!(cfg.vector.path, Some(PathBuf::from("/abs/corpus.json")));
    }
}
