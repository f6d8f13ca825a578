//! Configurator error types.
//!
//! Every error here is recoverable: a rejected intent leaves the selection
//! untouched, and a failed catalog fetch can be retried.

use thiserror::Error;

/// Errors that can occur while configuring and pricing a selection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfiguratorError {
    /// Selecting or growing a product would exceed the category quota.
    #[error("Category {category} allows {required} item(s) in total")]
    QuotaExceeded {
        category: String,
        category_name: String,
        required: u32,
    },

    /// A material category with several options has no choice yet.
    #[error("No {material} chosen for {product}")]
    MissingSelection { product: String, material: String },

    /// The catalog could not be fetched or was empty.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The catalog arrived but is structurally invalid.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Category not found in the plan.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Product not found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but belongs to a different category.
    #[error("Product {product} is not offered in category {category}")]
    ProductNotInCategory { product: String, category: String },

    /// Quantity change requested for a product that is not selected.
    #[error("Product {product} is not selected in category {category}")]
    NotSelected { product: String, category: String },

    /// SKU not found on the product.
    #[error("SKU not found: {0}")]
    SkuNotFound(String),

    /// Material category not offered by the product.
    #[error("{product} has no {material} options")]
    UnknownMaterial { product: String, material: String },

    /// Option not listed for the material category.
    #[error("{option} is not a {material} option of {product}")]
    UnknownMaterialOption {
        product: String,
        material: String,
        option: String,
    },

    /// Aggregation shape not available for this product.
    #[error("{mode} pricing is not available for {product}")]
    ModeUnavailable { mode: String, product: String },

    /// Submission requested before every category quota is met.
    #[error("Selection incomplete: {0}% of required items chosen")]
    SelectionIncomplete(u8),

    /// Deposit ratio not offered.
    #[error("Payment ratio {0}% is not offered")]
    InvalidPaymentRatio(u32),

    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in price calculation")]
    Overflow,

    /// Order service rejected the submission.
    #[error("Order submission failed: {0}")]
    SubmissionFailed(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ConfiguratorError {
    /// Whether the caller can recover by retrying or adjusting the selection.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Message suitable for showing to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            ConfiguratorError::QuotaExceeded {
                category_name,
                required,
                ..
            } => format!("{} allows {} item(s) in total", category_name, required),
            ConfiguratorError::MissingSelection { product, material } => {
                format!("Please choose a {} for {}", material, product)
            }
            ConfiguratorError::CatalogUnavailable(_) => {
                "This package is not available right now, please try again".to_string()
            }
            ConfiguratorError::SelectionIncomplete(percent) => {
                format!("Selection is {}% complete", percent)
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConfiguratorError {
    fn from(e: serde_json::Error) -> Self {
        ConfiguratorError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_message_names_category() {
        let err = ConfiguratorError::QuotaExceeded {
            category: "sofa".to_string(),
            category_name: "Sofa".to_string(),
            required: 2,
        };
        assert_eq!(err.user_message(), "Sofa allows 2 item(s) in total");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_from_json_error() {
        let err: ConfiguratorError = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert!(matches!(err, ConfiguratorError::SerializationError(_)));
    }
}
