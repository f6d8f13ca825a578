//! Package catalog module.
//!
//! Contains the canonical plan, category, product and SKU types, material
//! option lists, and normalization of raw catalog payloads.

mod material;
mod plan;
mod product;
pub mod raw;

pub use material::{
    MaterialGroup, MaterialImageLookup, MaterialOptions, MaterialTag, UpgradePrice,
    UpgradePriceTable,
};
pub use plan::{PackageCategory, PackagePlan};
pub use product::{PackageProduct, Sku};
pub use raw::{RawPackagePlan, RawProduct};
