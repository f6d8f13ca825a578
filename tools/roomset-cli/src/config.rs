//! CLI configuration.

use anyhow::{Context, Result};
use roomset_commerce::EngineConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Selection and pricing engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Order output settings.
    #[serde(default)]
    pub orders: OrdersConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Where submitted orders are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersConfig {
    /// Directory for order files when `--out` is not given.
    #[serde(default = "default_orders_dir")]
    pub dir: String,

    /// Pretty-print order files.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_orders_dir() -> String {
    "orders".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            dir: default_orders_dir(),
            pretty: true,
        }
    }
}

/// Generate a default roomset.toml config file.
pub fn generate_default_config() -> String {
    r#"# Roomset configurator configuration

[engine]
currency = "CNY"
# "required": every multi-option material must be chosen before pricing.
# "default_to_base": unchosen materials count as the base option.
material_selection = "required"
# Estimate for unlisted package upgrades: max(rate% of unit price, floor).
fallback_rate_percent = 8
fallback_floor = 300
payment_ratios = [30, 50, 100]

# Checked in order; the first keyword found in the option wins.
[[engine.keyword_premiums]]
keyword = "imported"
amount = 1200

[[engine.keyword_premiums]]
keyword = "genuine leather"
amount = 1000

[[engine.keyword_premiums]]
keyword = "aviation aluminum"
amount = 800

[[engine.keyword_premiums]]
keyword = "solid wood"
amount = 600

[[engine.keyword_premiums]]
keyword = "high-density"
amount = 500

[orders]
dir = "orders"
pretty = true
"#
    .to_string()
}
