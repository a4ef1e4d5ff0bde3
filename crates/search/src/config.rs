use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use vana_protocol::SearchSource;

/// Tunable heuristics for the coordinator. Defaults reproduce the stock routing behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    pub default_max_results: usize,
    pub sufficiency: SufficiencyConfig,
    pub default_relevance: DefaultRelevance,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_max_results: 5,
            sufficiency: SufficiencyConfig::default(),
            default_relevance: DefaultRelevance::default(),
        }
    }
}

impl CoordinatorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self =
            toml::from_str(raw).map_err(|err| SearchError::Config(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_max_results == 0 {
            return Err(SearchError::Config(
                "default_max_results must be greater than zero".to_string(),
            ));
        }
        validate_unit(
            "sufficiency.high_relevance_threshold",
            self.sufficiency.high_relevance_threshold,
        )?;
        validate_unit("default_relevance.memory", self.default_relevance.memory)?;
        validate_unit("default_relevance.vector", self.default_relevance.vector)?;
        validate_unit("default_relevance.web", self.default_relevance.web)?;
        Ok(())
    }
}

/// Result counts that let the coordinator skip the remaining tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SufficiencyConfig {
    pub vana_specific_min_results: usize,
    pub user_context_min_results: usize,
    pub high_relevance_min_results: usize,
    /// Strict lower bound: a result counts only when `relevance > threshold`.
    pub high_relevance_threshold: f64,
}

impl Default for SufficiencyConfig {
    fn default() -> Self {
        Self {
            vana_specific_min_results: 2,
            user_context_min_results: 1,
            high_relevance_min_results: 3,
            high_relevance_threshold: 0.7,
        }
    }
}

/// Relevance assigned when a backend does not report a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultRelevance {
    pub memory: f64,
    pub vector: f64,
    pub web: f64,
}

impl Default for DefaultRelevance {
    fn default() -> Self {
        Self {
            memory: 0.9,
            vector: 0.7,
            web: 0.8,
        }
    }
}

impl DefaultRelevance {
    #[must_use]
    pub fn for_source(&self, source: SearchSource) -> f64 {
        match source {
            SearchSource::Memory => self.memory,
            SearchSource::Vector => self.vector,
            SearchSource::Web => self.web,
        }
    }
}

fn validate_unit(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SearchError::Config(format!(
            "{field} must be within [0, 1], got {value}"
        )))
    }
}
