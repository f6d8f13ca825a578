//! Material surcharge resolution.
//!
//! A surcharge is found by running an ordered chain of strategies against the
//! chosen option; the first strategy that matches decides the amount:
//!
//! 1. [`BaseOption`]: the category's first option is always free.
//! 2. [`ExactKey`]: the option is a key of the upgrade table.
//! 3. [`DashPrefix`]: the option is `"<key>-<variant>"` and `<key>` is a table
//!    key. Only the option is split, longest prefix first.
//! 4. [`Substring`]: the first table key contained in the option, or containing it.
//! 5. [`KeywordPremium`]: package mode only, fixed premium for keywords.
//! 6. [`PercentageFallback`]: package mode only, `max(rate × unit price, floor)`.
//!
//! An option nothing matches costs nothing. PRO items skip the chain.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::{MaterialOptions, MaterialTag, PackageProduct, Sku, UpgradePriceTable};
use crate::config::{EngineConfig, KeywordPremium as KeywordPremiumEntry, MaterialSelectionPolicy};
use crate::error::ConfiguratorError;
use crate::money::Money;

/// Chosen option per material category.
pub type MaterialChoices = BTreeMap<MaterialTag, String>;

const DASHES: &[char] = &['-', '\u{2013}', '\u{2014}'];

/// Which price shape a surcharge is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Product inside a package; estimates apply to unmatched options.
    Package,
    /// Product detail page; unmatched options are free.
    SingleProduct,
}

/// Where a surcharge amount came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeSource {
    ProFlat,
    BaseOption,
    ExactKey,
    DashPrefix,
    Substring,
    KeywordPremium,
    PercentageFallback,
    Unmatched,
}

/// A resolved surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surcharge {
    pub amount: Money,
    pub source: SurchargeSource,
}

/// Result of a single strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyOutcome {
    Matched(Money),
    NoMatch,
}

/// Inputs for resolving one option of one material category.
#[derive(Debug, Clone, Copy)]
pub struct SurchargeContext<'a> {
    pub option: &'a str,
    pub base_option: Option<&'a str>,
    pub table: &'a UpgradePriceTable,
    pub unit_price: Money,
    pub mode: PricingMode,
}

/// One step of the resolution chain.
pub trait SurchargeStrategy: Send + Sync {
    /// Source reported when this strategy matches.
    fn source(&self) -> SurchargeSource;

    fn resolve(&self, ctx: &SurchargeContext<'_>) -> StrategyOutcome;
}

/// The base option is always free.
pub struct BaseOption;

impl SurchargeStrategy for BaseOption {
    fn source(&self) -> SurchargeSource {
        SurchargeSource::BaseOption
    }

    fn resolve(&self, ctx: &SurchargeContext<'_>) -> StrategyOutcome {
        match ctx.base_option {
            Some(base) if base == ctx.option => {
                StrategyOutcome::Matched(Money::zero(ctx.unit_price.currency))
            }
            _ => StrategyOutcome::NoMatch,
        }
    }
}

/// Exact key lookup.
pub struct ExactKey;

impl SurchargeStrategy for ExactKey {
    fn source(&self) -> SurchargeSource {
        SurchargeSource::ExactKey
    }

    fn resolve(&self, ctx: &SurchargeContext<'_>) -> StrategyOutcome {
        ctx.table
            .get(ctx.option)
            .map_or(StrategyOutcome::NoMatch, StrategyOutcome::Matched)
    }
}

/// `"<key>-<variant>"` where `<key>` is a table key.
pub struct DashPrefix;

impl SurchargeStrategy for DashPrefix {
    fn source(&self) -> SurchargeSource {
        SurchargeSource::DashPrefix
    }

    fn resolve(&self, ctx: &SurchargeContext<'_>) -> StrategyOutcome {
        let cuts: Vec<usize> = ctx
            .option
            .char_indices()
            .filter(|(_, c)| DASHES.contains(c))
            .map(|(i, _)| i)
            .collect();

        for cut in cuts.into_iter().rev() {
            let prefix = ctx.option[..cut].trim();
            if prefix.is_empty() {
                continue;
            }
            if let Some(amount) = ctx.table.get(prefix) {
                return StrategyOutcome::Matched(amount);
            }
        }
        StrategyOutcome::NoMatch
    }
}

/// First table key that contains, or is contained in, the option.
pub struct Substring;

impl SurchargeStrategy for Substring {
    fn source(&self) -> SurchargeSource {
        SurchargeSource::Substring
    }

    fn resolve(&self, ctx: &SurchargeContext<'_>) -> StrategyOutcome {
        ctx.table
            .iter()
            .filter(|entry| !entry.key.is_empty())
            .find(|entry| ctx.option.contains(entry.key.as_str()) || entry.key.contains(ctx.option))
            .map_or(StrategyOutcome::NoMatch, |entry| {
                StrategyOutcome::Matched(entry.amount)
            })
    }
}

/// Fixed premium for options naming a premium material.
pub struct KeywordPremium {
    premiums: Vec<(String, i64)>,
}

impl KeywordPremium {
    pub fn new(premiums: &[KeywordPremiumEntry]) -> Self {
        Self {
            premiums: premiums
                .iter()
                .map(|p| (p.keyword.to_lowercase(), p.amount))
                .collect(),
        }
    }
}

impl SurchargeStrategy for KeywordPremium {
    fn source(&self) -> SurchargeSource {
        SurchargeSource::KeywordPremium
    }

    fn resolve(&self, ctx: &SurchargeContext<'_>) -> StrategyOutcome {
        if ctx.mode != PricingMode::Package {
            return StrategyOutcome::NoMatch;
        }
        let option = ctx.option.to_lowercase();
        self.premiums
            .iter()
            .find(|(keyword, _)| option.contains(keyword.as_str()))
            .map_or(StrategyOutcome::NoMatch, |(_, amount)| {
                StrategyOutcome::Matched(Money::from_units(*amount, ctx.unit_price.currency))
            })
    }
}

/// `max(round(rate% × unit price), floor)` for bundle products.
pub struct PercentageFallback {
    rate_percent: u32,
    floor_units: i64,
}

impl PercentageFallback {
    pub fn new(rate_percent: u32, floor_units: i64) -> Self {
        Self {
            rate_percent,
            floor_units,
        }
    }
}

impl SurchargeStrategy for PercentageFallback {
    fn source(&self) -> SurchargeSource {
        SurchargeSource::PercentageFallback
    }

    fn resolve(&self, ctx: &SurchargeContext<'_>) -> StrategyOutcome {
        if ctx.mode != PricingMode::Package {
            return StrategyOutcome::NoMatch;
        }
        let estimate = ctx.unit_price.percent_of_rounded(self.rate_percent);
        let floor = Money::from_units(self.floor_units, ctx.unit_price.currency);
        estimate
            .max_of(floor)
            .map_or(StrategyOutcome::NoMatch, StrategyOutcome::Matched)
    }
}

/// Something that carries materials and an upgrade table.
#[derive(Debug, Clone, Copy)]
pub struct PricedItem<'a> {
    pub name: &'a str,
    pub materials: &'a MaterialOptions,
    pub table: &'a UpgradePriceTable,
    pub unit_price: Money,
    pub is_pro: bool,
}

impl<'a> PricedItem<'a> {
    /// A product priced inside a package.
    pub fn package(product: &'a PackageProduct) -> Self {
        Self {
            name: &product.name,
            materials: &product.materials,
            table: &product.upgrade_prices,
            unit_price: product.unit_price,
            is_pro: product.is_pro,
        }
    }

    /// A SKU priced on the product detail page.
    pub fn sku(product: &'a PackageProduct, sku: &'a Sku) -> Self {
        Self {
            name: &product.name,
            materials: product.materials_for(sku),
            table: &sku.upgrade_prices,
            unit_price: sku.effective_price(),
            is_pro: sku.is_pro || product.is_pro,
        }
    }
}

/// Surcharge of one material category of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub tag: MaterialTag,
    pub option: String,
    pub surcharge: Surcharge,
}

/// All material surcharges of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSurcharge {
    /// Sum of the material lines, per unit.
    pub per_unit: Money,
    pub lines: Vec<MaterialLine>,
}

/// Ordered chain of surcharge strategies.
pub struct MaterialSurchargeResolver {
    strategies: Vec<Box<dyn SurchargeStrategy>>,
    policy: MaterialSelectionPolicy,
}

impl fmt::Debug for MaterialSurchargeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterialSurchargeResolver")
            .field("chain", &self.chain())
            .field("policy", &self.policy)
            .finish()
    }
}

impl MaterialSurchargeResolver {
    /// Build the standard chain from configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_strategies(
            vec![
                Box::new(BaseOption),
                Box::new(ExactKey),
                Box::new(DashPrefix),
                Box::new(Substring),
                Box::new(KeywordPremium::new(&config.keyword_premiums)),
                Box::new(PercentageFallback::new(
                    config.fallback_rate_percent,
                    config.fallback_floor,
                )),
            ],
            config.material_selection,
        )
    }

    /// Build a resolver from an explicit chain.
    pub fn with_strategies(
        strategies: Vec<Box<dyn SurchargeStrategy>>,
        policy: MaterialSelectionPolicy,
    ) -> Self {
        Self { strategies, policy }
    }

    /// Sources of the chain, in order.
    pub fn chain(&self) -> Vec<SurchargeSource> {
        self.strategies.iter().map(|s| s.source()).collect()
    }

    pub fn policy(&self) -> MaterialSelectionPolicy {
        self.policy
    }

    /// Run the chain for one option.
    pub fn resolve(&self, ctx: &SurchargeContext<'_>) -> Surcharge {
        for strategy in &self.strategies {
            if let StrategyOutcome::Matched(amount) = strategy.resolve(ctx) {
                return Surcharge {
                    amount,
                    source: strategy.source(),
                };
            }
        }
        Surcharge {
            amount: Money::zero(ctx.unit_price.currency),
            source: SurchargeSource::Unmatched,
        }
    }

    /// Resolve one option of one material category of an item.
    pub fn resolve_option(
        &self,
        item: &PricedItem<'_>,
        tag: &MaterialTag,
        option: &str,
        mode: PricingMode,
    ) -> Surcharge {
        if item.is_pro {
            return Surcharge {
                amount: Money::zero(item.unit_price.currency),
                source: SurchargeSource::ProFlat,
            };
        }
        let base_option = item.materials.group(tag).and_then(|g| g.base());
        self.resolve(&SurchargeContext {
            option,
            base_option,
            table: item.table,
            unit_price: item.unit_price,
            mode,
        })
    }

    /// The option each category resolves to, honoring fixed groups and the policy.
    pub fn effective_choices(
        &self,
        item: &PricedItem<'_>,
        choices: Option<&MaterialChoices>,
    ) -> Result<Vec<(MaterialTag, String)>, ConfiguratorError> {
        let mut resolved = Vec::with_capacity(item.materials.len());
        for group in item.materials.groups() {
            let chosen = if group.is_fixed() {
                group.base().map(str::to_string)
            } else {
                choices
                    .and_then(|c| c.get(&group.tag))
                    .filter(|option| group.contains(option))
                    .cloned()
            };
            let option = match (chosen, self.policy) {
                (Some(option), _) => option,
                (None, MaterialSelectionPolicy::DefaultToBase) => match group.base() {
                    Some(base) => base.to_string(),
                    None => continue,
                },
                (None, MaterialSelectionPolicy::Required) => {
                    return Err(ConfiguratorError::MissingSelection {
                        product: item.name.to_string(),
                        material: group.tag.to_string(),
                    })
                }
            };
            resolved.push((group.tag.clone(), option));
        }
        Ok(resolved)
    }

    /// Per-unit surcharge of an item for the given choices.
    pub fn item_surcharge(
        &self,
        item: &PricedItem<'_>,
        choices: Option<&MaterialChoices>,
        mode: PricingMode,
    ) -> Result<ItemSurcharge, ConfiguratorError> {
        let mut per_unit = Money::zero(item.unit_price.currency);
        let mut lines = Vec::new();
        for (tag, option) in self.effective_choices(item, choices)? {
            let surcharge = self.resolve_option(item, &tag, &option, mode);
            per_unit = per_unit
                .try_add(&surcharge.amount)
                .ok_or(ConfiguratorError::Overflow)?;
            lines.push(MaterialLine {
                tag,
                option,
                surcharge,
            });
        }
        Ok(ItemSurcharge { per_unit, lines })
    }

    /// For each category, the option with the highest surcharge (first wins ties).
    ///
    /// Used to dress PRO SKUs in their premium look: their price is flat anyway.
    pub fn premium_choices(&self, item: &PricedItem<'_>, mode: PricingMode) -> MaterialChoices {
        let appraised = PricedItem {
            is_pro: false,
            ..*item
        };
        let mut choices = MaterialChoices::new();
        for group in item.materials.groups() {
            let mut best: Option<(&String, i64)> = None;
            for option in &group.options {
                let amount = self
                    .resolve_option(&appraised, &group.tag, option, mode)
                    .amount
                    .amount_minor;
                if best.map_or(true, |(_, top)| amount > top) {
                    best = Some((option, amount));
                }
            }
            if let Some((option, _)) = best {
                choices.insert(group.tag.clone(), option.clone());
            }
        }
        choices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn cny(units: i64) -> Money {
        Money::from_units(units, Currency::CNY)
    }

    fn resolver() -> MaterialSurchargeResolver {
        MaterialSurchargeResolver::new(&EngineConfig::default())
    }

    fn ctx<'a>(
        option: &'a str,
        table: &'a UpgradePriceTable,
        mode: PricingMode,
    ) -> SurchargeContext<'a> {
        SurchargeContext {
            option,
            base_option: Some("Standard"),
            table,
            unit_price: cny(2000),
            mode,
        }
    }

    #[test]
    fn test_chain_order() {
        assert_eq!(
            resolver().chain(),
            vec![
                SurchargeSource::BaseOption,
                SurchargeSource::ExactKey,
                SurchargeSource::DashPrefix,
                SurchargeSource::Substring,
                SurchargeSource::KeywordPremium,
                SurchargeSource::PercentageFallback,
            ]
        );
    }

    #[test]
    fn test_base_option_is_free_even_when_listed() {
        let table = UpgradePriceTable::new().with("Standard", cny(999));
        let s = resolver().resolve(&ctx("Standard", &table, PricingMode::Package));
        assert_eq!(s.amount, cny(0));
        assert_eq!(s.source, SurchargeSource::BaseOption);
    }

    #[test]
    fn test_exact_match() {
        let table = UpgradePriceTable::new().with("Velvet", cny(500));
        let s = resolver().resolve(&ctx("Velvet", &table, PricingMode::SingleProduct));
        assert_eq!(s.amount, cny(500));
        assert_eq!(s.source, SurchargeSource::ExactKey);
    }

    #[test]
    fn test_dash_prefix_variants() {
        let table = UpgradePriceTable::new().with("Titanium Legs", cny(900));
        for option in ["Titanium Legs-Black", "Titanium Legs \u{2013} Gold", "Titanium Legs\u{2014}Silver"] {
            let s = resolver().resolve(&ctx(option, &table, PricingMode::SingleProduct));
            assert_eq!(s.amount, cny(900), "{}", option);
            assert_eq!(s.source, SurchargeSource::DashPrefix);
        }
    }

    #[test]
    fn test_dash_prefix_prefers_longest() {
        let table = UpgradePriceTable::new()
            .with("Oak", cny(100))
            .with("Oak-Smoked", cny(400));
        let s = resolver().resolve(&ctx("Oak-Smoked-Matte", &table, PricingMode::SingleProduct));
        assert_eq!(s.amount, cny(400));
    }

    #[test]
    fn test_substring_first_key_in_table_order() {
        let table = UpgradePriceTable::new()
            .with("Leather", cny(800))
            .with("Aniline", cny(1500));
        let s = resolver().resolve(&ctx("Aniline Leather", &table, PricingMode::SingleProduct));
        assert_eq!(s.amount, cny(800));
        assert_eq!(s.source, SurchargeSource::Substring);

        // Key containing the option also matches.
        let s = resolver().resolve(&ctx("Anil", &table, PricingMode::SingleProduct));
        assert_eq!(s.amount, cny(1500));
    }

    #[test]
    fn test_keyword_premium_package_only() {
        let table = UpgradePriceTable::new();
        let s = resolver().resolve(&ctx("Imported Leather", &table, PricingMode::Package));
        assert_eq!(s.amount, cny(1200));
        assert_eq!(s.source, SurchargeSource::KeywordPremium);

        let s = resolver().resolve(&ctx("Imported Leather", &table, PricingMode::SingleProduct));
        assert_eq!(s.amount, cny(0));
        assert_eq!(s.source, SurchargeSource::Unmatched);
    }

    #[test]
    fn test_percentage_fallback_floor_and_rate() {
        let table = UpgradePriceTable::new();
        // 8% of 2000 = 160 < 300
        let s = resolver().resolve(&ctx("Mystery", &table, PricingMode::Package));
        assert_eq!(s.amount, cny(300));
        assert_eq!(s.source, SurchargeSource::PercentageFallback);

        let mut c = ctx("Mystery", &table, PricingMode::Package);
        c.unit_price = cny(10_000);
        assert_eq!(resolver().resolve(&c).amount, cny(800));
    }

    #[test]
    fn test_titanium_variant_falls_through_to_fallback() {
        let table = UpgradePriceTable::new().with("Titanium Legs-Black", cny(900));
        let s = resolver().resolve(&ctx("Titanium Legs-Silver", &table, PricingMode::Package));
        assert_eq!(s.source, SurchargeSource::PercentageFallback);
        assert_eq!(s.amount, cny(300));

        let s = resolver().resolve(&ctx("Titanium Legs-Silver", &table, PricingMode::SingleProduct));
        assert_eq!(s.amount, cny(0));
    }

    #[test]
    fn test_effective_choices_policy() {
        let product = PackageProduct::new("p", "Sofa", cny(2000)).with_materials(
            MaterialOptions::default()
                .with(MaterialTag::Fabric, &["Linen", "Velvet"])
                .with(MaterialTag::Frame, &["Pine"]),
        );
        let item = PricedItem::package(&product);

        let err = resolver().effective_choices(&item, None).unwrap_err();
        assert!(matches!(err, ConfiguratorError::MissingSelection { .. }));

        let lenient = MaterialSurchargeResolver::new(
            &EngineConfig::default().with_material_selection(MaterialSelectionPolicy::DefaultToBase),
        );
        let choices = lenient.effective_choices(&item, None).unwrap();
        assert_eq!(
            choices,
            vec![
                (MaterialTag::Fabric, "Linen".to_string()),
                (MaterialTag::Frame, "Pine".to_string())
            ]
        );
    }

    #[test]
    fn test_item_surcharge_sums_lines() {
        let product = PackageProduct::new("p", "Sofa", cny(2000))
            .with_materials(
                MaterialOptions::default()
                    .with(MaterialTag::Fabric, &["Linen", "Velvet"])
                    .with(MaterialTag::Leg, &["Steel", "Brass"]),
            )
            .with_upgrade_prices(
                UpgradePriceTable::new()
                    .with("Velvet", cny(500))
                    .with("Brass", cny(200)),
            );
        let mut choices = MaterialChoices::new();
        choices.insert(MaterialTag::Fabric, "Velvet".to_string());
        choices.insert(MaterialTag::Leg, "Brass".to_string());

        let s = resolver()
            .item_surcharge(&PricedItem::package(&product), Some(&choices), PricingMode::Package)
            .unwrap();
        assert_eq!(s.per_unit, cny(700));
        assert_eq!(s.lines.len(), 2);
    }

    #[test]
    fn test_pro_is_flat_and_prefers_premium_look() {
        let product = PackageProduct::new("p", "Sofa", cny(2000));
        let sku = Sku::new("s", "2.4m", cny(6000))
            .pro()
            .with_materials(MaterialOptions::default().with(MaterialTag::Fabric, &["Linen", "Velvet", "Boucle"]))
            .with_upgrade_prices(
                UpgradePriceTable::new()
                    .with("Velvet", cny(800))
                    .with("Boucle", cny(500)),
            );
        let item = PricedItem::sku(&product, &sku);

        let premium = resolver().premium_choices(&item, PricingMode::SingleProduct);
        assert_eq!(premium.get(&MaterialTag::Fabric).map(String::as_str), Some("Velvet"));

        let s = resolver()
            .item_surcharge(&item, Some(&premium), PricingMode::SingleProduct)
            .unwrap();
        assert_eq!(s.per_unit, cny(0));
        assert_eq!(s.lines[0].surcharge.source, SurchargeSource::ProFlat);
    }
}
