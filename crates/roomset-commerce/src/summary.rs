//! Priced selection summary handed to the order service.

use serde::{Deserialize, Serialize};

use crate::catalog::{MaterialImageLookup, MaterialTag, PackagePlan};
use crate::error::ConfiguratorError;
use crate::ids::{CategoryKey, PlanId, ProductId};
use crate::money::Money;
use crate::pricing::{MaterialLine, PriceBreakdown, SurchargeSource};

/// A resolved material of a selected item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenMaterial {
    pub tag: MaterialTag,
    pub option: String,
    pub surcharge: Money,
    pub source: SurchargeSource,
    /// Swatch image, for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ChosenMaterial {
    fn from_line(line: &MaterialLine, images: &dyn MaterialImageLookup) -> Self {
        Self {
            tag: line.tag.clone(),
            option: line.option.clone(),
            surcharge: line.surcharge.amount,
            source: line.surcharge.source,
            image: images.image_for(&line.tag, &line.option).map(str::to_string),
        }
    }
}

/// One selected product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub chosen_materials: Vec<ChosenMaterial>,
    pub surcharge_per_unit: Money,
}

/// Selected products of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub key: CategoryKey,
    pub name: String,
    pub required: u32,
    pub items: Vec<SelectedItem>,
}

/// The order payload of a completed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedSelectionSummary {
    pub plan_id: PlanId,
    pub plan_name: String,
    pub categories: Vec<CategorySummary>,
    pub breakdown: PriceBreakdown,
}

impl PricedSelectionSummary {
    /// Group the lines of a package breakdown by category.
    pub fn build(plan: &PackagePlan, breakdown: PriceBreakdown) -> Result<Self, ConfiguratorError> {
        let mut categories = Vec::with_capacity(plan.categories.len());
        for category in &plan.categories {
            let mut items = Vec::new();
            for line in breakdown
                .lines
                .iter()
                .filter(|l| category.contains(&l.product_id))
            {
                let product = category
                    .product(&line.product_id)
                    .ok_or_else(|| ConfiguratorError::ProductNotFound(line.product_id.to_string()))?;
                items.push(SelectedItem {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    chosen_materials: line
                        .materials
                        .iter()
                        .map(|m| ChosenMaterial::from_line(m, product))
                        .collect(),
                    surcharge_per_unit: line.surcharge_per_unit,
                });
            }
            categories.push(CategorySummary {
                key: category.key.clone(),
                name: category.name.clone(),
                required: category.required,
                items,
            });
        }

        Ok(Self {
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            categories,
            breakdown,
        })
    }

    /// Total quantity of every selected item.
    pub fn item_count(&self) -> u32 {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .map(|i| i.quantity)
            .sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfiguratorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MaterialOptions, PackageCategory, PackageProduct, UpgradePriceTable};
    use crate::config::EngineConfig;
    use crate::money::Currency;
    use crate::pricing::PriceAggregator;
    use crate::selection::SelectionState;

    fn cny(units: i64) -> Money {
        Money::from_units(units, Currency::CNY)
    }

    #[test]
    fn test_summary_groups_by_category_with_images() {
        let plan = PackagePlan::new("plan", "Living", cny(5000))
            .with_category(
                PackageCategory::new("sofa", "Sofa", 1).with_product(
                    PackageProduct::new("sofa-a", "Sofa A", cny(3000))
                        .with_materials(
                            MaterialOptions::default().with(MaterialTag::Fabric, &["Linen", "Velvet"]),
                        )
                        .with_upgrade_prices(UpgradePriceTable::new().with("Velvet", cny(1500)))
                        .with_image("Velvet", "https://img/velvet.png"),
                ),
            )
            .with_category(
                PackageCategory::new("table", "Table", 1)
                    .with_product(PackageProduct::new("table-a", "Table A", cny(900))),
            );

        let mut state = SelectionState::new();
        state.select(&plan, &"sofa".into(), &"sofa-a".into()).unwrap();
        state.select(&plan, &"table".into(), &"table-a".into()).unwrap();
        let sofa = plan.product(&"sofa-a".into()).unwrap();
        state.choose_material(sofa, MaterialTag::Fabric, "Velvet").unwrap();

        let breakdown = PriceAggregator::new(&EngineConfig::default())
            .package(&plan, &state)
            .unwrap();
        let summary = PricedSelectionSummary::build(&plan, breakdown).unwrap();

        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.item_count(), 2);
        let sofa_item = &summary.categories[0].items[0];
        assert_eq!(sofa_item.surcharge_per_unit, cny(1500));
        assert_eq!(
            sofa_item.chosen_materials[0].image.as_deref(),
            Some("https://img/velvet.png")
        );
        assert_eq!(summary.breakdown.total, cny(6500));

        let json = summary.to_json_pretty().unwrap();
        assert!(json.contains("\"plan_id\": \"plan\""));
    }
}
