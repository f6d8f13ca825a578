//! Material categories, option lists and upgrade price tables.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::money::Money;

/// Well-known material category of a furniture product.
///
/// Catalog keys outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialTag {
    Fabric,
    Leather,
    Filling,
    Frame,
    Leg,
    Wood,
    Stone,
    Hardware,
    Color,
    Other(String),
}

impl MaterialTag {
    /// Map a catalog key (English or Chinese) to a tag.
    pub fn from_key(key: &str) -> Self {
        let trimmed = key.trim();
        match trimmed.to_lowercase().as_str() {
            "fabric" | "fabrics" | "cloth" | "面料" | "布料" => MaterialTag::Fabric,
            "leather" | "皮料" | "皮革" => MaterialTag::Leather,
            "filling" | "fill" | "cushion" | "填充" | "填充物" => MaterialTag::Filling,
            "frame" | "框架" | "骨架" => MaterialTag::Frame,
            "leg" | "legs" | "feet" | "脚" | "椅脚" | "腿" => MaterialTag::Leg,
            "wood" | "timber" | "木材" | "木料" => MaterialTag::Wood,
            "stone" | "slate" | "marble" | "tabletop" | "台面" | "岩板" => MaterialTag::Stone,
            "hardware" | "五金" => MaterialTag::Hardware,
            "color" | "colour" | "颜色" => MaterialTag::Color,
            _ => MaterialTag::Other(trimmed.to_string()),
        }
    }

    /// Canonical key of the tag.
    pub fn as_key(&self) -> &str {
        match self {
            MaterialTag::Fabric => "fabric",
            MaterialTag::Leather => "leather",
            MaterialTag::Filling => "filling",
            MaterialTag::Frame => "frame",
            MaterialTag::Leg => "leg",
            MaterialTag::Wood => "wood",
            MaterialTag::Stone => "stone",
            MaterialTag::Hardware => "hardware",
            MaterialTag::Color => "color",
            MaterialTag::Other(key) => key,
        }
    }
}

impl fmt::Display for MaterialTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl From<&str> for MaterialTag {
    fn from(key: &str) -> Self {
        MaterialTag::from_key(key)
    }
}

impl Serialize for MaterialTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_key())
    }
}

impl<'de> Deserialize<'de> for MaterialTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(MaterialTag::from_key(&key))
    }
}

/// The options of one material category. The first option is the base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialGroup {
    pub tag: MaterialTag,
    pub options: Vec<String>,
}

impl MaterialGroup {
    /// The base (non-upgraded) option.
    pub fn base(&self) -> Option<&str> {
        self.options.first().map(String::as_str)
    }

    /// A group with one option needs no choice.
    pub fn is_fixed(&self) -> bool {
        self.options.len() == 1
    }

    pub fn contains(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Material categories of a product, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialOptions {
    groups: Vec<MaterialGroup>,
}

impl MaterialOptions {
    pub fn new(groups: Vec<MaterialGroup>) -> Self {
        Self { groups }
    }

    /// Append options for a tag, merging into an existing group.
    pub fn push(&mut self, tag: MaterialTag, options: Vec<String>) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.tag == tag) {
            for option in options {
                if !group.contains(&option) {
                    group.options.push(option);
                }
            }
        } else {
            self.groups.push(MaterialGroup { tag, options });
        }
    }

    /// Builder form of [`MaterialOptions::push`].
    pub fn with(mut self, tag: MaterialTag, options: &[&str]) -> Self {
        self.push(tag, options.iter().map(|o| o.to_string()).collect());
        self
    }

    pub fn group(&self, tag: &MaterialTag) -> Option<&MaterialGroup> {
        self.groups.iter().find(|g| &g.tag == tag)
    }

    pub fn groups(&self) -> impl Iterator<Item = &MaterialGroup> {
        self.groups.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

/// One entry of an upgrade price table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePrice {
    /// Option name or option-name prefix.
    pub key: String,
    /// Surcharge over the base option.
    pub amount: Money,
}

/// Surcharges by option name, in catalog order.
///
/// Order matters: substring matching takes the first key that matches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradePriceTable {
    entries: Vec<UpgradePrice>,
}

impl UpgradePriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, keeping the first position of the key.
    pub fn insert(&mut self, key: impl Into<String>, amount: Money) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.amount = amount;
        } else {
            self.entries.push(UpgradePrice { key, amount });
        }
    }

    /// Builder form of [`UpgradePriceTable::insert`].
    pub fn with(mut self, key: impl Into<String>, amount: Money) -> Self {
        self.insert(key, amount);
        self
    }

    /// Exact lookup.
    pub fn get(&self, key: &str) -> Option<Money> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradePrice> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display lookup from a material option to its swatch image.
pub trait MaterialImageLookup {
    /// Image URL for an option, if the catalog has one.
    fn image_for(&self, tag: &MaterialTag, option: &str) -> Option<&str>;
}
