//! Price aggregation.
//!
//! Folds a selection and its material surcharges into a [`PriceBreakdown`].
//! Every method is a pure function of its inputs.

use crate::catalog::{PackagePlan, PackageProduct};
use crate::config::EngineConfig;
use crate::error::ConfiguratorError;
use crate::ids::SkuId;
use crate::money::Money;
use crate::pricing::{
    AggregationMode, MaterialSurchargeResolver, PriceBreakdown, PriceLine, PricedItem,
    PricingMode,
};
use crate::selection::{SelectionState, SkuSelection};

fn add(a: Money, b: Money) -> Result<Money, ConfiguratorError> {
    a.try_add(&b).ok_or_else(|| {
        if a.currency != b.currency {
            ConfiguratorError::CurrencyMismatch {
                expected: a.currency.code().to_string(),
                got: b.currency.code().to_string(),
            }
        } else {
            ConfiguratorError::Overflow
        }
    })
}

/// Computes totals for every aggregation shape.
#[derive(Debug)]
pub struct PriceAggregator {
    resolver: MaterialSurchargeResolver,
}

impl PriceAggregator {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_resolver(MaterialSurchargeResolver::new(config))
    }

    pub fn with_resolver(resolver: MaterialSurchargeResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &MaterialSurchargeResolver {
        &self.resolver
    }

    /// `plan.base_price + Σ surcharge(product) × quantity` over the selection.
    ///
    /// Lines follow catalog category order, then pick order.
    pub fn package(
        &self,
        plan: &PackagePlan,
        state: &SelectionState,
    ) -> Result<PriceBreakdown, ConfiguratorError> {
        let currency = plan.base_price.currency;
        let mut surcharge_subtotal = Money::zero(currency);
        let mut lines = Vec::new();

        for category in &plan.categories {
            for product_id in state.selected(&category.key) {
                let product = category
                    .product(product_id)
                    .ok_or_else(|| ConfiguratorError::ProductNotFound(product_id.to_string()))?;
                let quantity = state.quantity(product_id).unwrap_or(1);
                let item = self.resolver.item_surcharge(
                    &PricedItem::package(product),
                    state.material_choices(product_id),
                    PricingMode::Package,
                )?;
                let line_surcharge = item
                    .per_unit
                    .try_multiply(quantity as i64)
                    .ok_or(ConfiguratorError::Overflow)?;
                surcharge_subtotal = add(surcharge_subtotal, line_surcharge)?;

                lines.push(PriceLine {
                    product_id: product.id.clone(),
                    sku_id: None,
                    name: product.name.clone(),
                    quantity,
                    base: Money::zero(currency),
                    surcharge_per_unit: item.per_unit,
                    materials: item.lines,
                    total: line_surcharge,
                });
            }
        }

        Ok(PriceBreakdown {
            mode: AggregationMode::Package,
            base: plan.base_price,
            total: add(plan.base_price, surcharge_subtotal)?,
            surcharge_subtotal,
            lines,
            payment: None,
        })
    }

    /// Effective SKU price plus its material surcharges.
    pub fn sku_line(
        &self,
        product: &PackageProduct,
        sku_id: &SkuId,
        selection: &SkuSelection,
    ) -> Result<PriceLine, ConfiguratorError> {
        let sku = product
            .sku(sku_id)
            .ok_or_else(|| ConfiguratorError::SkuNotFound(sku_id.to_string()))?;
        let item = PricedItem::sku(product, sku);
        let surcharge = self.resolver.item_surcharge(
            &item,
            selection.material_choices(sku_id),
            PricingMode::SingleProduct,
        )?;
        Ok(PriceLine {
            product_id: product.id.clone(),
            sku_id: Some(sku.id.clone()),
            name: format!("{} {}", product.name, sku.name),
            quantity: 1,
            base: item.unit_price,
            surcharge_per_unit: surcharge.per_unit,
            total: add(item.unit_price, surcharge.per_unit)?,
            materials: surcharge.lines,
        })
    }

    /// Price of the first chosen SKU.
    pub fn single_sku(
        &self,
        product: &PackageProduct,
        selection: &SkuSelection,
    ) -> Result<PriceBreakdown, ConfiguratorError> {
        self.sum_skus(
            AggregationMode::SingleSku,
            product,
            selection,
            selection.chosen().iter().take(1),
        )
    }

    /// Σ single-SKU price over every chosen SKU of the product.
    pub fn multi_spec(
        &self,
        product: &PackageProduct,
        selection: &SkuSelection,
    ) -> Result<PriceBreakdown, ConfiguratorError> {
        self.sum_skus(
            AggregationMode::MultiSpec,
            product,
            selection,
            selection.chosen().iter(),
        )
    }

    /// Σ single-SKU price over the chosen SKUs of a composite product.
    pub fn combo(
        &self,
        product: &PackageProduct,
        selection: &SkuSelection,
    ) -> Result<PriceBreakdown, ConfiguratorError> {
        if !product.combo {
            return Err(ConfiguratorError::ModeUnavailable {
                mode: AggregationMode::Combo.as_str().to_string(),
                product: product.name.clone(),
            });
        }
        self.sum_skus(
            AggregationMode::Combo,
            product,
            selection,
            selection.chosen().iter(),
        )
    }

    /// Dispatch on the aggregation shape of a product-detail page.
    pub fn product(
        &self,
        mode: AggregationMode,
        product: &PackageProduct,
        selection: &SkuSelection,
    ) -> Result<PriceBreakdown, ConfiguratorError> {
        match mode {
            AggregationMode::SingleSku => self.single_sku(product, selection),
            AggregationMode::MultiSpec => self.multi_spec(product, selection),
            AggregationMode::Combo => self.combo(product, selection),
            AggregationMode::Package => Err(ConfiguratorError::ModeUnavailable {
                mode: mode.as_str().to_string(),
                product: product.name.clone(),
            }),
        }
    }

    fn sum_skus<'a>(
        &self,
        mode: AggregationMode,
        product: &PackageProduct,
        selection: &SkuSelection,
        skus: impl Iterator<Item = &'a SkuId>,
    ) -> Result<PriceBreakdown, ConfiguratorError> {
        let currency = product.unit_price.currency;
        let mut base = Money::zero(currency);
        let mut surcharge_subtotal = Money::zero(currency);
        let mut lines = Vec::new();

        for sku_id in skus {
            let line = self.sku_line(product, sku_id, selection)?;
            base = add(base, line.base)?;
            surcharge_subtotal = add(surcharge_subtotal, line.surcharge_per_unit)?;
            lines.push(line);
        }

        Ok(PriceBreakdown {
            mode,
            base,
            total: add(base, surcharge_subtotal)?,
            surcharge_subtotal,
            lines,
            payment: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MaterialOptions, MaterialTag, PackageCategory, Sku, UpgradePriceTable};
    use crate::config::MaterialSelectionPolicy;
    use crate::money::Currency;

    fn cny(units: i64) -> Money {
        Money::from_units(units, Currency::CNY)
    }

    fn plan() -> PackagePlan {
        PackagePlan::new("plan", "Plan", cny(5000))
            .with_category(
                PackageCategory::new("sofa", "Sofa", 2).with_product(
                    PackageProduct::new("sofa-a", "Sofa A", cny(3000))
                        .with_materials(
                            MaterialOptions::default().with(MaterialTag::Fabric, &["Linen", "Velvet"]),
                        )
                        .with_upgrade_prices(UpgradePriceTable::new().with("Velvet", cny(400))),
                ),
            )
            .with_category(
                PackageCategory::new("table", "Table", 1)
                    .with_product(PackageProduct::new("table-a", "Table A", cny(900))),
            )
    }

    fn detail() -> PackageProduct {
        PackageProduct::new("sofa", "Sofa", cny(3000))
            .with_materials(MaterialOptions::default().with(MaterialTag::Fabric, &["Linen", "Velvet"]))
            .with_sku(
                Sku::new("s1", "2.4m", cny(3000))
                    .with_discount(cny(2700))
                    .with_upgrade_prices(UpgradePriceTable::new().with("Velvet", cny(300))),
            )
            .with_sku(Sku::new("s2", "2.8m", cny(3600)))
    }

    #[test]
    fn test_package_multiplies_surcharge_by_quantity() {
        let plan = plan();
        let mut state = SelectionState::new();
        state.select(&plan, &"sofa".into(), &"sofa-a".into()).unwrap();
        state
            .change_quantity(&plan, &"sofa".into(), &"sofa-a".into(), 1)
            .unwrap();
        let product = plan.product(&"sofa-a".into()).unwrap();
        state.choose_material(product, MaterialTag::Fabric, "Velvet").unwrap();

        let breakdown = PriceAggregator::new(&EngineConfig::default())
            .package(&plan, &state)
            .unwrap();
        assert_eq!(breakdown.base, cny(5000));
        assert_eq!(breakdown.surcharge_subtotal, cny(800));
        assert_eq!(breakdown.total, cny(5800));
        assert_eq!(breakdown.lines[0].quantity, 2);
    }

    #[test]
    fn test_package_missing_material_fails_under_required_policy() {
        let plan = plan();
        let mut state = SelectionState::new();
        state.select(&plan, &"sofa".into(), &"sofa-a".into()).unwrap();

        let err = PriceAggregator::new(&EngineConfig::default())
            .package(&plan, &state)
            .unwrap_err();
        assert!(matches!(err, ConfiguratorError::MissingSelection { .. }));

        let lenient = EngineConfig::default()
            .with_material_selection(MaterialSelectionPolicy::DefaultToBase);
        let breakdown = PriceAggregator::new(&lenient).package(&plan, &state).unwrap();
        assert_eq!(breakdown.total, cny(5000));
    }

    #[test]
    fn test_single_sku_uses_discount() {
        let product = detail();
        let mut selection = SkuSelection::new();
        selection.choose_only(&product, &"s1".into()).unwrap();
        selection
            .choose_material(&product, &"s1".into(), MaterialTag::Fabric, "Velvet")
            .unwrap();

        let breakdown = PriceAggregator::new(&EngineConfig::default())
            .single_sku(&product, &selection)
            .unwrap();
        assert_eq!(breakdown.total, cny(3000));
        assert_eq!(breakdown.base, cny(2700));
        assert_eq!(breakdown.surcharge_subtotal, cny(300));
    }

    #[test]
    fn test_multi_spec_sums_skus() {
        let product = detail();
        let mut selection = SkuSelection::new();
        selection.toggle(&product, &"s1".into()).unwrap();
        selection.toggle(&product, &"s2".into()).unwrap();
        selection
            .choose_material(&product, &"s1".into(), MaterialTag::Fabric, "Linen")
            .unwrap();
        selection
            .choose_material(&product, &"s2".into(), MaterialTag::Fabric, "Velvet")
            .unwrap();

        let breakdown = PriceAggregator::new(&EngineConfig::default())
            .multi_spec(&product, &selection)
            .unwrap();
        // s2 has no upgrade table: unmatched options are free outside packages.
        assert_eq!(breakdown.total, cny(2700 + 3600));
        assert_eq!(breakdown.lines.len(), 2);
    }

    #[test]
    fn test_combo_requires_flag() {
        let product = detail();
        let selection = SkuSelection::new();
        let aggregator = PriceAggregator::new(&EngineConfig::default());
        let err = aggregator.combo(&product, &selection).unwrap_err();
        assert!(matches!(err, ConfiguratorError::ModeUnavailable { .. }));

        let empty = aggregator.combo(&product.combo(), &selection).unwrap();
        assert!(empty.total.is_zero());
    }
}
