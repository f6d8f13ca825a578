//! Package selection state and the category quota operations.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::catalog::{MaterialTag, PackageCategory, PackagePlan, PackageProduct};
use crate::config::{MAX_QUANTITY, MIN_QUANTITY};
use crate::error::ConfiguratorError;
use crate::ids::{CategoryKey, ProductId};
use crate::pricing::MaterialChoices;
use crate::selection::validate_choice;

/// Result of a `select` intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectOutcome {
    /// The product was added; older selections may have made room for it.
    Selected { evicted: Vec<ProductId> },
    /// The product was already selected and has been removed.
    Deselected,
}

/// What the shopper has chosen in a package.
///
/// Quantities of deselected products stay cached so that re-selecting a
/// product restores its last quantity. Only [`SelectionState::quantity`] of a
/// selected product is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    /// Selected products per category, oldest first.
    selected: BTreeMap<CategoryKey, Vec<ProductId>>,
    /// Last known quantity per product.
    quantities: BTreeMap<ProductId, u32>,
    /// Material choices per product.
    materials: BTreeMap<ProductId, MaterialChoices>,
}

fn category<'a>(
    plan: &'a PackagePlan,
    key: &CategoryKey,
) -> Result<&'a PackageCategory, ConfiguratorError> {
    plan.category(key)
        .ok_or_else(|| ConfiguratorError::CategoryNotFound(key.to_string()))
}

fn quota_exceeded(category: &PackageCategory) -> ConfiguratorError {
    ConfiguratorError::QuotaExceeded {
        category: category.key.to_string(),
        category_name: category.name.clone(),
        required: category.required,
    }
}

impl SelectionState {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected products of a category, oldest first.
    pub fn selected(&self, key: &CategoryKey) -> &[ProductId] {
        self.selected.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if a product is selected in a category.
    pub fn is_selected(&self, key: &CategoryKey, product_id: &ProductId) -> bool {
        self.selected(key).contains(product_id)
    }

    /// Quantity of a selected product.
    pub fn quantity(&self, product_id: &ProductId) -> Option<u32> {
        let selected = self.selected.values().any(|list| list.contains(product_id));
        selected.then(|| self.stored_quantity(product_id))
    }

    fn stored_quantity(&self, product_id: &ProductId) -> u32 {
        self.quantities
            .get(product_id)
            .copied()
            .unwrap_or(MIN_QUANTITY)
            .clamp(MIN_QUANTITY, MAX_QUANTITY)
    }

    /// Total selected quantity in a category.
    pub fn category_quantity(&self, key: &CategoryKey) -> u32 {
        self.selected(key)
            .iter()
            .map(|p| self.stored_quantity(p))
            .sum()
    }

    /// Iterate over `(category, product, quantity)` of every selection.
    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, &ProductId, u32)> + '_ {
        self.selected.iter().flat_map(move |(key, list)| {
            list.iter()
                .map(move |product| (key, product, self.stored_quantity(product)))
        })
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.values().all(Vec::is_empty)
    }

    /// Material choices made for a product.
    pub fn material_choices(&self, product_id: &ProductId) -> Option<&MaterialChoices> {
        self.materials.get(product_id)
    }

    /// Toggle a product in a category, evicting the oldest selections if the
    /// category quota would overflow.
    ///
    /// Eviction is planned on a copy of the category list and only committed
    /// once the product fits, so a rejected intent changes nothing.
    pub fn select(
        &mut self,
        plan: &PackagePlan,
        key: &CategoryKey,
        product_id: &ProductId,
    ) -> Result<SelectOutcome, ConfiguratorError> {
        let category = category(plan, key)?;
        if !category.contains(product_id) {
            return Err(ConfiguratorError::ProductNotInCategory {
                product: product_id.to_string(),
                category: key.to_string(),
            });
        }

        if self.is_selected(key, product_id) {
            self.remove_from_list(key, product_id);
            return Ok(SelectOutcome::Deselected);
        }

        let addition = self.stored_quantity(product_id);
        let mut scratch: VecDeque<ProductId> = self.selected(key).iter().cloned().collect();
        let mut total: u32 = scratch.iter().map(|p| self.stored_quantity(p)).sum();
        let mut evicted = Vec::new();

        while total + addition > category.required {
            match scratch.pop_front() {
                Some(oldest) => {
                    total -= self.stored_quantity(&oldest);
                    evicted.push(oldest);
                }
                None => break,
            }
        }

        if total + addition > category.required {
            return Err(quota_exceeded(category));
        }

        scratch.push_back(product_id.clone());
        self.selected.insert(key.clone(), scratch.into());
        self.quantities.insert(product_id.clone(), addition);
        Ok(SelectOutcome::Selected { evicted })
    }

    /// Replace a category's selection with the first `required` candidates,
    /// each at quantity 1.
    pub fn select_all(
        &mut self,
        plan: &PackagePlan,
        key: &CategoryKey,
        candidates: &[ProductId],
    ) -> Result<Vec<ProductId>, ConfiguratorError> {
        let category = category(plan, key)?;
        if let Some(stranger) = candidates.iter().find(|p| !category.contains(p)) {
            return Err(ConfiguratorError::ProductNotInCategory {
                product: stranger.to_string(),
                category: key.to_string(),
            });
        }

        let mut chosen: Vec<ProductId> = Vec::new();
        for candidate in candidates {
            if chosen.len() as u32 >= category.required {
                break;
            }
            if !chosen.contains(candidate) {
                chosen.push(candidate.clone());
            }
        }

        for product in &chosen {
            self.quantities.insert(product.clone(), MIN_QUANTITY);
        }
        self.selected.insert(key.clone(), chosen.clone());
        Ok(chosen)
    }

    /// Remove a product from a category. Returns whether it was selected.
    pub fn remove(
        &mut self,
        plan: &PackagePlan,
        key: &CategoryKey,
        product_id: &ProductId,
    ) -> Result<bool, ConfiguratorError> {
        category(plan, key)?;
        Ok(self.remove_from_list(key, product_id))
    }

    fn remove_from_list(&mut self, key: &CategoryKey, product_id: &ProductId) -> bool {
        match self.selected.get_mut(key) {
            Some(list) => {
                let before = list.len();
                list.retain(|p| p != product_id);
                list.len() < before
            }
            None => false,
        }
    }

    /// Change the quantity of a selected product by `delta`, clamped to
    /// `[MIN_QUANTITY, MAX_QUANTITY]`. Never evicts.
    ///
    /// Returns the quantity after the change.
    pub fn change_quantity(
        &mut self,
        plan: &PackagePlan,
        key: &CategoryKey,
        product_id: &ProductId,
        delta: i32,
    ) -> Result<u32, ConfiguratorError> {
        let category = category(plan, key)?;
        if !self.is_selected(key, product_id) {
            return Err(ConfiguratorError::NotSelected {
                product: product_id.to_string(),
                category: key.to_string(),
            });
        }

        let current = self.stored_quantity(product_id);
        let next = (current as i64 + delta as i64).clamp(MIN_QUANTITY as i64, MAX_QUANTITY as i64)
            as u32;
        if next == current {
            return Ok(current);
        }

        let others: u32 = self
            .selected(key)
            .iter()
            .filter(|p| *p != product_id)
            .map(|p| self.stored_quantity(p))
            .sum();
        if others + next > category.required {
            return Err(quota_exceeded(category));
        }

        self.quantities.insert(product_id.clone(), next);
        Ok(next)
    }

    /// Record a material choice for a product of the plan.
    pub fn choose_material(
        &mut self,
        product: &PackageProduct,
        tag: MaterialTag,
        option: &str,
    ) -> Result<(), ConfiguratorError> {
        validate_choice(&product.name, &product.materials, &tag, option)?;
        self.materials
            .entry(product.id.clone())
            .or_default()
            .insert(tag, option.to_string());
        Ok(())
    }

    /// Add choices for categories the shopper has not chosen yet.
    pub(crate) fn fill_materials(&mut self, product_id: &ProductId, choices: MaterialChoices) {
        let current = self.materials.entry(product_id.clone()).or_default();
        for (tag, option) in choices {
            current.entry(tag).or_insert(option);
        }
    }

    /// Forget every choice for a category of a product.
    pub fn clear_material(&mut self, product_id: &ProductId, tag: &MaterialTag) -> bool {
        self.materials
            .get_mut(product_id)
            .map(|choices| choices.remove(tag).is_some())
            .unwrap_or(false)
    }

    /// Drop every selection and choice.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.quantities.clear();
        self.materials.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MaterialOptions;
    use crate::money::{Currency, Money};

    fn plan() -> PackagePlan {
        let cny = |u| Money::from_units(u, Currency::CNY);
        PackagePlan::new("plan", "Plan", cny(5000))
            .with_category(
                PackageCategory::new("sofa", "Sofa", 2)
                    .with_product(PackageProduct::new("a", "A", cny(1000)))
                    .with_product(PackageProduct::new("b", "B", cny(1000)))
                    .with_product(PackageProduct::new("c", "C", cny(1000))),
            )
            .with_category(
                PackageCategory::new("chair", "Chair", 3).with_product(
                    PackageProduct::new("p1", "P1", cny(400)).with_materials(
                        MaterialOptions::default()
                            .with(MaterialTag::Fabric, &["Linen", "Velvet"])
                            .with(MaterialTag::Frame, &["Oak"]),
                    ),
                ),
            )
    }

    fn key(k: &str) -> CategoryKey {
        CategoryKey::new(k)
    }

    fn id(p: &str) -> ProductId {
        ProductId::new(p)
    }

    #[test]
    fn test_select_and_toggle() {
        let plan = plan();
        let mut state = SelectionState::new();

        let outcome = state.select(&plan, &key("sofa"), &id("a")).unwrap();
        assert_eq!(outcome, SelectOutcome::Selected { evicted: vec![] });
        assert_eq!(state.quantity(&id("a")), Some(1));

        let outcome = state.select(&plan, &key("sofa"), &id("a")).unwrap();
        assert_eq!(outcome, SelectOutcome::Deselected);
        assert_eq!(state.quantity(&id("a")), None);
        assert!(state.is_empty());
    }

    #[test]
    fn test_select_evicts_oldest() {
        let plan = plan();
        let mut state = SelectionState::new();
        state.select(&plan, &key("sofa"), &id("a")).unwrap();
        state.select(&plan, &key("sofa"), &id("b")).unwrap();

        let outcome = state.select(&plan, &key("sofa"), &id("c")).unwrap();
        assert_eq!(outcome, SelectOutcome::Selected { evicted: vec![id("a")] });
        assert_eq!(state.selected(&key("sofa")), &[id("b"), id("c")]);
    }

    #[test]
    fn test_reselect_restores_cached_quantity() {
        let plan = plan();
        let mut state = SelectionState::new();
        state.select(&plan, &key("sofa"), &id("a")).unwrap();
        state.change_quantity(&plan, &key("sofa"), &id("a"), 1).unwrap();
        state.select(&plan, &key("sofa"), &id("a")).unwrap();
        state.select(&plan, &key("sofa"), &id("a")).unwrap();
        assert_eq!(state.quantity(&id("a")), Some(2));
    }

    #[test]
    fn test_foreign_product_rejected() {
        let plan = plan();
        let mut state = SelectionState::new();
        let err = state.select(&plan, &key("sofa"), &id("p1")).unwrap_err();
        assert!(matches!(err, ConfiguratorError::ProductNotInCategory { .. }));

        let err = state.select(&plan, &key("bed"), &id("a")).unwrap_err();
        assert!(matches!(err, ConfiguratorError::CategoryNotFound(_)));
    }

    #[test]
    fn test_change_quantity_clamps_and_never_evicts() {
        let plan = plan();
        let mut state = SelectionState::new();
        state.select(&plan, &key("sofa"), &id("a")).unwrap();
        state.select(&plan, &key("sofa"), &id("b")).unwrap();

        let before = state.clone();
        let err = state
            .change_quantity(&plan, &key("sofa"), &id("a"), 1)
            .unwrap_err();
        assert!(matches!(err, ConfiguratorError::QuotaExceeded { required: 2, .. }));
        assert_eq!(state, before);

        // Clamped at the minimum: no-op.
        assert_eq!(
            state.change_quantity(&plan, &key("sofa"), &id("a"), -4).unwrap(),
            1
        );
    }

    #[test]
    fn test_change_quantity_requires_selection() {
        let plan = plan();
        let mut state = SelectionState::new();
        let err = state
            .change_quantity(&plan, &key("sofa"), &id("a"), 1)
            .unwrap_err();
        assert!(matches!(err, ConfiguratorError::NotSelected { .. }));
    }

    #[test]
    fn test_select_all_resets_to_one() {
        let plan = plan();
        let mut state = SelectionState::new();
        state.select(&plan, &key("sofa"), &id("c")).unwrap();
        state.change_quantity(&plan, &key("sofa"), &id("c"), 1).unwrap();

        let chosen = state
            .select_all(&plan, &key("sofa"), &[id("a"), id("b"), id("c")])
            .unwrap();
        assert_eq!(chosen, vec![id("a"), id("b")]);
        assert_eq!(state.quantity(&id("a")), Some(1));
        assert_eq!(state.quantity(&id("c")), None);
        assert_eq!(state.category_quantity(&key("sofa")), 2);
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let plan = plan();
        let mut state = SelectionState::new();
        assert!(!state.remove(&plan, &key("sofa"), &id("a")).unwrap());
        state.select(&plan, &key("sofa"), &id("a")).unwrap();
        assert!(state.remove(&plan, &key("sofa"), &id("a")).unwrap());
    }

    #[test]
    fn test_choose_material_validates_option() {
        let plan = plan();
        let product = plan.product(&id("p1")).unwrap();
        let mut state = SelectionState::new();

        state
            .choose_material(product, MaterialTag::Fabric, "Velvet")
            .unwrap();
        assert_eq!(
            state
                .material_choices(&id("p1"))
                .and_then(|c| c.get(&MaterialTag::Fabric))
                .map(String::as_str),
            Some("Velvet")
        );

        let err = state
            .choose_material(product, MaterialTag::Fabric, "Silk")
            .unwrap_err();
        assert!(matches!(err, ConfiguratorError::UnknownMaterialOption { .. }));

        let err = state
            .choose_material(product, MaterialTag::Leg, "Steel")
            .unwrap_err();
        assert!(matches!(err, ConfiguratorError::UnknownMaterial { .. }));

        assert!(state.clear_material(&id("p1"), &MaterialTag::Fabric));
        assert!(!state.clear_material(&id("p1"), &MaterialTag::Fabric));
    }
}
