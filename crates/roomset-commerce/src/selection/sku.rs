//! SKU choice of a product detail page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{MaterialTag, PackageProduct, Sku};
use crate::error::ConfiguratorError;
use crate::ids::SkuId;
use crate::pricing::MaterialChoices;
use crate::selection::validate_choice;

fn find_sku<'a>(product: &'a PackageProduct, sku_id: &SkuId) -> Result<&'a Sku, ConfiguratorError> {
    product
        .sku(sku_id)
        .ok_or_else(|| ConfiguratorError::SkuNotFound(sku_id.to_string()))
}

/// SKUs and per-SKU material choices on a product detail page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkuSelection {
    /// Chosen SKUs, in the order they were picked.
    chosen: Vec<SkuId>,
    /// Material choices keyed per SKU.
    materials: BTreeMap<SkuId, MaterialChoices>,
}

impl SkuSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chosen(&self) -> &[SkuId] {
        &self.chosen
    }

    pub fn is_chosen(&self, sku_id: &SkuId) -> bool {
        self.chosen.contains(sku_id)
    }

    /// Make `sku_id` the only chosen SKU.
    pub fn choose_only(
        &mut self,
        product: &PackageProduct,
        sku_id: &SkuId,
    ) -> Result<(), ConfiguratorError> {
        find_sku(product, sku_id)?;
        self.chosen = vec![sku_id.clone()];
        Ok(())
    }

    /// Add or remove a SKU. Returns whether it is chosen afterwards.
    pub fn toggle(
        &mut self,
        product: &PackageProduct,
        sku_id: &SkuId,
    ) -> Result<bool, ConfiguratorError> {
        find_sku(product, sku_id)?;
        if let Some(pos) = self.chosen.iter().position(|s| s == sku_id) {
            self.chosen.remove(pos);
            Ok(false)
        } else {
            self.chosen.push(sku_id.clone());
            Ok(true)
        }
    }

    /// Keep only the first chosen SKU.
    pub fn truncate_to_one(&mut self) {
        self.chosen.truncate(1);
    }

    pub fn material_choices(&self, sku_id: &SkuId) -> Option<&MaterialChoices> {
        self.materials.get(sku_id)
    }

    /// Record a material choice for one SKU.
    pub fn choose_material(
        &mut self,
        product: &PackageProduct,
        sku_id: &SkuId,
        tag: MaterialTag,
        option: &str,
    ) -> Result<(), ConfiguratorError> {
        let sku = find_sku(product, sku_id)?;
        validate_choice(&product.name, product.materials_for(sku), &tag, option)?;
        self.materials
            .entry(sku_id.clone())
            .or_default()
            .insert(tag, option.to_string());
        Ok(())
    }

    /// Replace every material choice of a SKU.
    pub(crate) fn set_materials(&mut self, sku_id: &SkuId, choices: MaterialChoices) {
        self.materials.insert(sku_id.clone(), choices);
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
        self.materials.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MaterialOptions;
    use crate::money::{Currency, Money};

    fn product() -> PackageProduct {
        let cny = |u| Money::from_units(u, Currency::CNY);
        PackageProduct::new("sofa", "Sofa", cny(3000))
            .with_materials(MaterialOptions::default().with(MaterialTag::Fabric, &["Linen", "Velvet"]))
            .with_sku(Sku::new("s1", "2.4m", cny(3000)))
            .with_sku(
                Sku::new("s2", "2.8m", cny(3600))
                    .with_materials(MaterialOptions::default().with(MaterialTag::Leather, &["Nappa", "Aniline"])),
            )
    }

    #[test]
    fn test_toggle_keeps_pick_order() {
        let product = product();
        let mut selection = SkuSelection::new();
        assert!(selection.toggle(&product, &"s2".into()).unwrap());
        assert!(selection.toggle(&product, &"s1".into()).unwrap());
        assert_eq!(selection.chosen(), &[SkuId::new("s2"), SkuId::new("s1")]);

        assert!(!selection.toggle(&product, &"s2".into()).unwrap());
        assert_eq!(selection.chosen(), &[SkuId::new("s1")]);
    }

    #[test]
    fn test_unknown_sku_rejected() {
        let product = product();
        let mut selection = SkuSelection::new();
        let err = selection.choose_only(&product, &"s9".into()).unwrap_err();
        assert_eq!(err, ConfiguratorError::SkuNotFound("s9".to_string()));
        assert!(selection.chosen().is_empty());
    }

    #[test]
    fn test_materials_are_keyed_per_sku() {
        let product = product();
        let mut selection = SkuSelection::new();
        selection
            .choose_material(&product, &"s1".into(), MaterialTag::Fabric, "Velvet")
            .unwrap();
        selection
            .choose_material(&product, &"s2".into(), MaterialTag::Leather, "Aniline")
            .unwrap();

        // s2 has its own materials; fabric is not one of them.
        let err = selection
            .choose_material(&product, &"s2".into(), MaterialTag::Fabric, "Velvet")
            .unwrap_err();
        assert!(matches!(err, ConfiguratorError::UnknownMaterial { .. }));

        assert_eq!(
            selection
                .material_choices(&"s1".into())
                .and_then(|c| c.get(&MaterialTag::Fabric))
                .map(String::as_str),
            Some("Velvet")
        );
        assert!(selection
            .material_choices(&"s1".into())
            .and_then(|c| c.get(&MaterialTag::Leather))
            .is_none());
    }
}
