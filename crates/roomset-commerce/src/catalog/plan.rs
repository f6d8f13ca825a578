//! Package plans and their categories.

use serde::{Deserialize, Serialize};

use crate::catalog::PackageProduct;
use crate::ids::{CategoryKey, PlanId, ProductId};
use crate::money::Money;

/// A category of a package: pick `required` items in total among `products`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageCategory {
    /// Key, unique within the plan.
    pub key: CategoryKey,
    /// Display name.
    pub name: String,
    /// Total quantity the shopper must choose.
    pub required: u32,
    /// Interchangeable products, in catalog order.
    pub products: Vec<PackageProduct>,
}

impl PackageCategory {
    pub fn new(key: impl Into<CategoryKey>, name: impl Into<String>, required: u32) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            required,
            products: Vec::new(),
        }
    }

    pub fn with_product(mut self, product: PackageProduct) -> Self {
        self.products.push(product);
        self
    }

    pub fn product(&self, product_id: &ProductId) -> Option<&PackageProduct> {
        self.products.iter().find(|p| &p.id == product_id)
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.product(product_id).is_some()
    }
}

/// A package (bundle) offering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackagePlan {
    /// Plan identifier.
    pub id: PlanId,
    /// Display name.
    pub name: String,
    /// Price of the package before upgrades.
    pub base_price: Money,
    /// Categories, in catalog order.
    pub categories: Vec<PackageCategory>,
}

impl PackagePlan {
    pub fn new(id: impl Into<PlanId>, name: impl Into<String>, base_price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_price,
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: PackageCategory) -> Self {
        self.categories.push(category);
        self
    }

    /// Get a category by key.
    pub fn category(&self, key: &CategoryKey) -> Option<&PackageCategory> {
        self.categories.iter().find(|c| &c.key == key)
    }

    /// Find a product anywhere in the plan.
    pub fn product(&self, product_id: &ProductId) -> Option<&PackageProduct> {
        self.categories.iter().find_map(|c| c.product(product_id))
    }

    /// Sum of all category quotas.
    pub fn required_total(&self) -> u64 {
        self.categories.iter().map(|c| u64::from(c.required)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn plan() -> PackagePlan {
        let cny = |u| Money::from_units(u, Currency::CNY);
        PackagePlan::new("living", "Living room", cny(5000))
            .with_category(
                PackageCategory::new("sofa", "Sofa", 2)
                    .with_product(PackageProduct::new("sofa-a", "Sofa A", cny(3000)))
                    .with_product(PackageProduct::new("sofa-b", "Sofa B", cny(3200))),
            )
            .with_category(
                PackageCategory::new("table", "Coffee table", 1)
                    .with_product(PackageProduct::new("table-a", "Table A", cny(900))),
            )
    }

    #[test]
    fn test_lookups() {
        let plan = plan();
        assert_eq!(plan.required_total(), 3);
        assert!(plan.category(&"sofa".into()).is_some());
        assert!(plan.category(&"bed".into()).is_none());
        assert_eq!(plan.product(&"table-a".into()).unwrap().name, "Table A");
    }

    #[test]
    fn test_category_membership() {
        let plan = plan();
        let sofa = plan.category(&"sofa".into()).unwrap();
        assert!(sofa.contains(&"sofa-b".into()));
        assert!(!sofa.contains(&"table-a".into()));
    }
}
