//! Selection state.
//!
//! [`SelectionState`] holds what a shopper picked in a package and enforces
//! category quotas. [`SkuSelection`] holds the SKUs and per-SKU materials
//! picked on a product detail page.

mod sku;
mod state;

pub use sku::SkuSelection;
pub use state::{SelectOutcome, SelectionState};

use crate::catalog::{MaterialOptions, MaterialTag};
use crate::error::ConfiguratorError;

/// Check that `option` is a valid choice for `tag` among `materials`.
pub(crate) fn validate_choice(
    product: &str,
    materials: &MaterialOptions,
    tag: &MaterialTag,
    option: &str,
) -> Result<(), ConfiguratorError> {
    let group = materials
        .group(tag)
        .ok_or_else(|| ConfiguratorError::UnknownMaterial {
            product: product.to_string(),
            material: tag.to_string(),
        })?;
    if !group.contains(option) {
        return Err(ConfiguratorError::UnknownMaterialOption {
            product: product.to_string(),
            material: tag.to_string(),
            option: option.to_string(),
        });
    }
    Ok(())
}
