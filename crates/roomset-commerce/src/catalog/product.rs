//! Package products and their SKUs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{MaterialImageLookup, MaterialOptions, MaterialTag, UpgradePriceTable};
use crate::ids::{ProductId, SkuId};
use crate::money::Money;

/// A purchasable variant of a product (size/spec combination).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sku {
    /// SKU identifier.
    pub id: SkuId,
    /// Spec label (e.g., "3-seat 2.4m").
    pub name: String,
    /// List price.
    pub price: Money,
    /// Promotional price, if any.
    #[serde(default)]
    pub discount_price: Option<Money>,
    /// Flat one-price SKU: materials never change its price.
    #[serde(default)]
    pub is_pro: bool,
    /// SKU-specific materials. Empty means the product's materials apply.
    #[serde(default)]
    pub materials: MaterialOptions,
    /// Surcharges by option name.
    #[serde(default)]
    pub upgrade_prices: UpgradePriceTable,
}

impl Sku {
    /// Create a SKU with a list price.
    pub fn new(id: impl Into<SkuId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            discount_price: None,
            is_pro: false,
            materials: MaterialOptions::default(),
            upgrade_prices: UpgradePriceTable::default(),
        }
    }

    pub fn with_discount(mut self, discount_price: Money) -> Self {
        self.discount_price = Some(discount_price);
        self
    }

    pub fn with_upgrade_prices(mut self, table: UpgradePriceTable) -> Self {
        self.upgrade_prices = table;
        self
    }

    pub fn with_materials(mut self, materials: MaterialOptions) -> Self {
        self.materials = materials;
        self
    }

    pub fn pro(mut self) -> Self {
        self.is_pro = true;
        self
    }

    /// Check if the discount price applies.
    pub fn is_on_sale(&self) -> bool {
        self.discount_price
            .map(|d| {
                d.is_positive()
                    && d.currency == self.price.currency
                    && d.amount_minor < self.price.amount_minor
            })
            .unwrap_or(false)
    }

    /// The discount price when it is positive and below list price, otherwise the list price.
    pub fn effective_price(&self) -> Money {
        match self.discount_price {
            Some(discount) if self.is_on_sale() => discount,
            _ => self.price,
        }
    }
}

/// A product offered inside a package category, or on its own detail page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageProduct {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price.
    pub unit_price: Money,
    /// Flat one-price product: materials never change its price.
    #[serde(default)]
    pub is_pro: bool,
    /// Composite product whose SKUs are separate line items.
    #[serde(default)]
    pub combo: bool,
    /// Material categories and their options.
    #[serde(default)]
    pub materials: MaterialOptions,
    /// Surcharges used when the product is priced inside a package.
    #[serde(default)]
    pub upgrade_prices: UpgradePriceTable,
    /// Swatch image per option name.
    #[serde(default)]
    pub material_images: BTreeMap<String, String>,
    /// SKUs for product-detail pricing.
    #[serde(default)]
    pub skus: Vec<Sku>,
}

impl PackageProduct {
    /// Create a product with a unit price.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            is_pro: false,
            combo: false,
            materials: MaterialOptions::default(),
            upgrade_prices: UpgradePriceTable::default(),
            material_images: BTreeMap::new(),
            skus: Vec::new(),
        }
    }

    pub fn with_materials(mut self, materials: MaterialOptions) -> Self {
        self.materials = materials;
        self
    }

    pub fn with_upgrade_prices(mut self, table: UpgradePriceTable) -> Self {
        self.upgrade_prices = table;
        self
    }

    pub fn with_sku(mut self, sku: Sku) -> Self {
        self.skus.push(sku);
        self
    }

    pub fn with_image(mut self, option: impl Into<String>, url: impl Into<String>) -> Self {
        self.material_images.insert(option.into(), url.into());
        self
    }

    pub fn pro(mut self) -> Self {
        self.is_pro = true;
        self
    }

    pub fn combo(mut self) -> Self {
        self.combo = true;
        self
    }

    /// Get a SKU by ID.
    pub fn sku(&self, sku_id: &SkuId) -> Option<&Sku> {
        self.skus.iter().find(|s| &s.id == sku_id)
    }

    /// Materials that apply to a SKU.
    pub fn materials_for<'a>(&'a self, sku: &'a Sku) -> &'a MaterialOptions {
        if sku.materials.is_empty() {
            &self.materials
        } else {
            &sku.materials
        }
    }
}

impl MaterialImageLookup for PackageProduct {
    fn image_for(&self, _tag: &MaterialTag, option: &str) -> Option<&str> {
        self.material_images.get(option).map(String::as_str)
    }
}
