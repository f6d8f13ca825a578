//! Raw catalog payloads and their normalization.
//!
//! The catalog service is loose about shapes: ids may be numbers, prices may
//! be strings, and materials come as a delimited string, a flat list, or an
//! object of per-category lists. Everything is normalized here, once, into the
//! canonical [`PackagePlan`] / [`PackageProduct`] types.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::marker::PhantomData;

use crate::catalog::{
    MaterialOptions, MaterialTag, PackageCategory, PackagePlan, PackageProduct, Sku,
    UpgradePriceTable,
};
use crate::error::ConfiguratorError;
use crate::ids::{CategoryKey, PlanId, ProductId, SkuId};
use crate::money::{Currency, Money};

/// Category key used for materials given as a bare list or string.
pub const DEFAULT_MATERIAL_KEY: &str = "material";

const OPTION_DELIMITERS: &[char] = &[',', '，', '/', '、', ';'];
const CURRENCY_SIGNS: &[char] = &['\u{00a5}', '\u{ffe5}', '$'];

/// A JSON object deserialized with its key order preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// An identifier that may be a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s.trim().to_string(),
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// A price that may be a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    /// Convert to money, accepting "¥1,299.00"-style strings.
    pub fn to_money(&self, currency: Currency) -> Result<Money, ConfiguratorError> {
        let value = match self {
            RawPrice::Number(n) => *n,
            RawPrice::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .trim_start_matches(CURRENCY_SIGNS)
                    .chars()
                    .filter(|c| *c != ',')
                    .collect();
                cleaned.trim().parse::<f64>().map_err(|_| {
                    ConfiguratorError::InvalidCatalog(format!("unparseable price {:?}", s))
                })?
            }
        };
        if !value.is_finite() || value < 0.0 {
            return Err(ConfiguratorError::InvalidCatalog(format!(
                "price out of range: {}",
                value
            )));
        }
        Ok(Money::from_decimal(value, currency))
    }
}

/// Options of one material category as the catalog sends them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawMaterialValue {
    Text(String),
    List(Vec<String>),
    Nested {
        #[serde(alias = "values", alias = "items")]
        options: Vec<String>,
    },
}

impl RawMaterialValue {
    fn into_options(self) -> Vec<String> {
        match self {
            RawMaterialValue::Text(s) => split_options(&s),
            RawMaterialValue::List(list) | RawMaterialValue::Nested { options: list } => list
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        }
    }
}

/// Materials field as the catalog sends it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawMaterials {
    Text(String),
    List(Vec<String>),
    Groups(OrderedMap<RawMaterialValue>),
}

impl RawMaterials {
    /// Normalize into canonical material options. Empty groups are dropped.
    pub fn normalize(self) -> MaterialOptions {
        let mut materials = MaterialOptions::default();
        let default_tag = || MaterialTag::from_key(DEFAULT_MATERIAL_KEY);
        match self {
            RawMaterials::Text(s) => {
                push_non_empty(&mut materials, default_tag(), split_options(&s))
            }
            RawMaterials::List(list) => push_non_empty(
                &mut materials,
                default_tag(),
                RawMaterialValue::List(list).into_options(),
            ),
            RawMaterials::Groups(OrderedMap(groups)) => {
                for (key, value) in groups {
                    let tag = MaterialTag::from_key(&key);
                    push_non_empty(&mut materials, tag, value.into_options());
                }
            }
        }
        materials
    }
}

fn push_non_empty(materials: &mut MaterialOptions, tag: MaterialTag, options: Vec<String>) {
    if !options.is_empty() {
        materials.push(tag, options);
    }
}

fn split_options(s: &str) -> Vec<String> {
    s.split(OPTION_DELIMITERS)
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_table(
    raw: OrderedMap<RawPrice>,
    currency: Currency,
) -> Result<UpgradePriceTable, ConfiguratorError> {
    let mut table = UpgradePriceTable::new();
    for (key, price) in raw.0 {
        table.insert(key.trim(), price.to_money(currency)?);
    }
    Ok(table)
}

/// A SKU as the catalog sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSku {
    pub id: RawId,
    #[serde(default, alias = "spec", alias = "specName")]
    pub name: Option<String>,
    pub price: RawPrice,
    #[serde(default)]
    pub discount_price: Option<RawPrice>,
    #[serde(default, alias = "pro")]
    pub is_pro: bool,
    #[serde(default)]
    pub materials: Option<RawMaterials>,
    #[serde(default, alias = "upgradePrices")]
    pub material_upgrade_prices: OrderedMap<RawPrice>,
}

impl RawSku {
    pub fn normalize(self, currency: Currency) -> Result<Sku, ConfiguratorError> {
        let id = self.id.into_string();
        let discount_price = match self.discount_price {
            Some(raw) => Some(raw.to_money(currency)?).filter(|m| m.is_positive()),
            None => None,
        };
        Ok(Sku {
            name: self.name.unwrap_or_else(|| id.clone()),
            id: SkuId::new(id),
            price: self.price.to_money(currency)?,
            discount_price,
            is_pro: self.is_pro,
            materials: self.materials.map(RawMaterials::normalize).unwrap_or_default(),
            upgrade_prices: normalize_table(self.material_upgrade_prices, currency)?,
        })
    }
}

/// A product as the catalog sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub id: RawId,
    pub name: String,
    #[serde(alias = "unitPrice")]
    pub price: RawPrice,
    #[serde(default, alias = "pro")]
    pub is_pro: bool,
    #[serde(default, alias = "isCombo")]
    pub combo: bool,
    #[serde(default)]
    pub materials: Option<RawMaterials>,
    #[serde(default)]
    pub material_images: OrderedMap<String>,
    #[serde(default, alias = "upgradePrices")]
    pub material_upgrade_prices: OrderedMap<RawPrice>,
    #[serde(default)]
    pub skus: Vec<RawSku>,
}

impl RawProduct {
    /// Parse a product from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfiguratorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalize into a canonical product.
    ///
    /// A product without its own materials or upgrade table borrows them from
    /// its first SKU, so package pricing always has something to resolve against.
    pub fn normalize(self, currency: Currency) -> Result<PackageProduct, ConfiguratorError> {
        let id = self.id.into_string();
        if id.is_empty() {
            return Err(ConfiguratorError::InvalidCatalog(format!(
                "product {:?} has an empty id",
                self.name
            )));
        }

        let skus = self
            .skus
            .into_iter()
            .map(|s| s.normalize(currency))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        if let Some(dup) = skus.iter().find(|s| !seen.insert(s.id.clone())) {
            return Err(ConfiguratorError::InvalidCatalog(format!(
                "duplicate SKU {} in product {}",
                dup.id, id
            )));
        }

        let mut materials = self.materials.map(RawMaterials::normalize).unwrap_or_default();
        let mut upgrade_prices = normalize_table(self.material_upgrade_prices, currency)?;
        if let Some(first) = skus.first() {
            if materials.is_empty() {
                materials = first.materials.clone();
            }
            if upgrade_prices.is_empty() {
                upgrade_prices = first.upgrade_prices.clone();
            }
        }

        let material_images: BTreeMap<String, String> = self.material_images.0.into_iter().collect();

        Ok(PackageProduct {
            id: ProductId::new(id),
            name: self.name,
            unit_price: self.price.to_money(currency)?,
            is_pro: self.is_pro,
            combo: self.combo,
            materials,
            upgrade_prices,
            material_images,
            skus,
        })
    }
}

fn default_required() -> u32 {
    1
}

/// A package category as the catalog sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCategory {
    #[serde(alias = "id")]
    pub key: RawId,
    pub name: String,
    #[serde(default = "default_required", alias = "count", alias = "quantity")]
    pub required: u32,
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

/// A package plan as the catalog sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPackagePlan {
    pub id: RawId,
    pub name: String,
    #[serde(alias = "price")]
    pub base_price: RawPrice,
    #[serde(default)]
    pub categories: Vec<RawCategory>,
}

impl RawPackagePlan {
    /// Parse a plan from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfiguratorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalize into a canonical plan, validating keys and quotas.
    pub fn normalize(self, currency: Currency) -> Result<PackagePlan, ConfiguratorError> {
        let plan_id = self.id.into_string();
        if self.categories.is_empty() {
            return Err(ConfiguratorError::CatalogUnavailable(format!(
                "plan {} has no categories",
                plan_id
            )));
        }

        let mut category_keys = HashSet::new();
        let mut product_ids = HashSet::new();
        let mut categories = Vec::with_capacity(self.categories.len());

        for raw in self.categories {
            let key = raw.key.into_string();
            if !category_keys.insert(key.clone()) {
                return Err(ConfiguratorError::InvalidCatalog(format!(
                    "duplicate category {}",
                    key
                )));
            }
            if raw.required == 0 {
                return Err(ConfiguratorError::InvalidCatalog(format!(
                    "category {} requires no items",
                    key
                )));
            }

            let mut products = Vec::with_capacity(raw.products.len());
            for raw_product in raw.products {
                let product = raw_product.normalize(currency)?;
                if !product_ids.insert(product.id.clone()) {
                    return Err(ConfiguratorError::InvalidCatalog(format!(
                        "duplicate product {}",
                        product.id
                    )));
                }
                products.push(product);
            }

            categories.push(PackageCategory {
                key: CategoryKey::new(key),
                name: raw.name,
                required: raw.required,
                products,
            });
        }

        Ok(PackagePlan {
            id: PlanId::new(plan_id),
            name: self.name,
            base_price: self.base_price.to_money(currency)?,
            categories,
        })
    }
}
