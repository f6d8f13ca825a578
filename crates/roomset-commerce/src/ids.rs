//! Newtype identifiers.
//!
//! Catalog identifiers arrive as opaque strings from the catalog service.
//! Wrapping them keeps a `ProductId` from being passed where a `SkuId` or a
//! `CategoryKey` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a package plan.
    PlanId
);
define_id!(
    /// Identifier of a product, unique within a plan.
    ProductId
);
define_id!(
    /// Identifier of a SKU within a product.
    SkuId
);
define_id!(
    /// Key of a category, unique within a plan.
    CategoryKey
);
define_id!(
    /// Identifier assigned by the order service.
    OrderId
);

impl OrderId {
    /// Generate a locally unique order reference.
    ///
    /// Used by gateways that do not receive an identifier from a remote service.
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let seq = COUNTER.fetch_add(1, Ordering::SeqCst);

        Self(format!("ord-{:x}-{:04x}", millis, seq & 0xffff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("sofa-01");
        assert_eq!(id.as_str(), "sofa-01");
    }

    #[test]
    fn test_id_from_str() {
        let key: CategoryKey = "sofa".into();
        assert_eq!(key.to_string(), "sofa");
    }

    #[test]
    fn test_order_id_generation() {
        let a = OrderId::generate();
        let b = OrderId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("ord-"));
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = SkuId::new("sku-9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"sku-9\"");
        let back: SkuId = serde_json::from_str("\"sku-9\"").unwrap();
        assert_eq!(back, id);
    }
}
