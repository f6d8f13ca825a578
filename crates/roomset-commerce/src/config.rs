//! Engine configuration.
//!
//! Loaded by the host (TOML or JSON) and handed to the configurators.
//! Every field has a default so an empty document is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfiguratorError;
use crate::money::Currency;

/// Smallest quantity of a selected product.
pub const MIN_QUANTITY: u32 = 1;
/// Largest quantity of a selected product.
pub const MAX_QUANTITY: u32 = 5;

/// Whether a material choice must be made before pricing and submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaterialSelectionPolicy {
    /// Every category with more than one option needs an explicit choice.
    #[default]
    Required,
    /// An absent choice is priced as the base option.
    DefaultToBase,
}

/// A fixed premium for options whose name mentions a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordPremium {
    /// Matched case-insensitively against the option name.
    pub keyword: String,
    /// Premium in whole currency units.
    pub amount: i64,
}

impl KeywordPremium {
    pub fn new(keyword: impl Into<String>, amount: i64) -> Self {
        Self {
            keyword: keyword.into(),
            amount,
        }
    }
}

/// Configuration of the selection and pricing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Currency of every catalog price.
    #[serde(default)]
    pub currency: Currency,

    /// Mandatory or optional material choice.
    #[serde(default)]
    pub material_selection: MaterialSelectionPolicy,

    /// Premiums for unmatched package options, first match wins.
    #[serde(default = "default_keyword_premiums")]
    pub keyword_premiums: Vec<KeywordPremium>,

    /// Estimated surcharge as a percentage of the unit price.
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate_percent: u32,

    /// Minimum estimated surcharge, in whole currency units.
    #[serde(default = "default_fallback_floor")]
    pub fallback_floor: i64,

    /// Deposit percentages offered at checkout.
    #[serde(default = "default_payment_ratios")]
    pub payment_ratios: Vec<u32>,
}

fn default_keyword_premiums() -> Vec<KeywordPremium> {
    vec![
        KeywordPremium::new("imported", 1200),
        KeywordPremium::new("genuine leather", 1000),
        KeywordPremium::new("aviation aluminum", 800),
        KeywordPremium::new("solid wood", 600),
        KeywordPremium::new("high-density", 500),
    ]
}

fn default_fallback_rate() -> u32 {
    8
}

fn default_fallback_floor() -> i64 {
    300
}

fn default_payment_ratios() -> Vec<u32> {
    vec![30, 50, 100]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            material_selection: MaterialSelectionPolicy::default(),
            keyword_premiums: default_keyword_premiums(),
            fallback_rate_percent: default_fallback_rate(),
            fallback_floor: default_fallback_floor(),
            payment_ratios: default_payment_ratios(),
        }
    }
}

impl EngineConfig {
    /// Set the material selection policy.
    pub fn with_material_selection(mut self, policy: MaterialSelectionPolicy) -> Self {
        self.material_selection = policy;
        self
    }

    /// Replace the keyword premium table.
    pub fn with_keyword_premiums(mut self, premiums: Vec<KeywordPremium>) -> Self {
        self.keyword_premiums = premiums;
        self
    }

    /// Check whether a deposit percentage is offered.
    pub fn offers_ratio(&self, percent: u32) -> bool {
        self.payment_ratios.contains(&percent)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfiguratorError> {
        if self.payment_ratios.is_empty() {
            return Err(ConfiguratorError::InvalidConfig(
                "payment_ratios must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self.payment_ratios.iter().find(|r| **r == 0 || **r > 100) {
            return Err(ConfiguratorError::InvalidConfig(format!(
                "payment ratio {} is outside 1..=100",
                bad
            )));
        }
        if self.fallback_floor < 0 {
            return Err(ConfiguratorError::InvalidConfig(
                "fallback_floor must not be negative".to_string(),
            ));
        }
        if self.keyword_premiums.iter().any(|k| k.keyword.trim().is_empty()) {
            return Err(ConfiguratorError::InvalidConfig(
                "keyword premiums need a non-empty keyword".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.material_selection, MaterialSelectionPolicy::Required);
        assert_eq!(config.fallback_rate_percent, 8);
        assert_eq!(config.fallback_floor, 300);
        assert!(config.offers_ratio(30));
        assert!(!config.offers_ratio(40));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_policy_snake_case() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"material_selection": "default_to_base"}"#).unwrap();
        assert_eq!(
            config.material_selection,
            MaterialSelectionPolicy::DefaultToBase
        );
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = EngineConfig::default();
        config.payment_ratios = vec![0];
        assert!(config.validate().is_err());

        config.payment_ratios = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_keyword() {
        let config =
            EngineConfig::default().with_keyword_premiums(vec![KeywordPremium::new("  ", 10)]);
        assert!(config.validate().is_err());
    }
}
