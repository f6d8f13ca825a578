//! Package configurator and pricing engine for the Roomset furniture storefront.
//!
//! A *package* bundles several categories, each with a required quantity
//! ("sofa: choose 2"), filled from interchangeable products that offer
//! material upgrades. This crate keeps a shopper's selection within every
//! category quota and prices it:
//!
//! - **Catalog**: plans, categories, products, SKUs, materials, and
//!   normalization of raw catalog payloads
//! - **Selection**: quota-enforcing selection state with FIFO eviction
//! - **Pricing**: material surcharge resolution and package, single-SKU,
//!   multi-spec and combo aggregation
//! - **Configurator**: page controllers tying catalog, selection and pricing
//!   together, with progress and the order summary
//!
//! # Example
//!
//! ```rust
//! use roomset_commerce::prelude::*;
//!
//! let cny = |units| Money::from_units(units, Currency::CNY);
//! let plan = PackagePlan::new("living", "Living room", cny(5000))
//!     .with_category(
//!         PackageCategory::new("sofa", "Sofa", 1)
//!             .with_product(PackageProduct::new("sofa-a", "Sofa A", cny(3000))),
//!     );
//!
//! let mut configurator = PackageConfigurator::new(plan, EngineConfig::default()).unwrap();
//! configurator.select(&"sofa".into(), &"sofa-a".into()).unwrap();
//!
//! assert!(configurator.progress().is_complete);
//! assert_eq!(configurator.breakdown().unwrap().total, cny(5000));
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod configurator;
pub mod pricing;
pub mod progress;
pub mod selection;
pub mod service;
pub mod summary;

pub use config::EngineConfig;
pub use error::ConfiguratorError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{EngineConfig, KeywordPremium, MaterialSelectionPolicy};
    pub use crate::error::ConfiguratorError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        MaterialImageLookup, MaterialOptions, MaterialTag, PackageCategory, PackagePlan,
        PackageProduct, RawPackagePlan, RawProduct, Sku, UpgradePriceTable,
    };

    // Selection and progress
    pub use crate::progress::SelectionProgress;
    pub use crate::selection::{SelectOutcome, SelectionState, SkuSelection};

    // Pricing
    pub use crate::pricing::{
        AggregationMode, MaterialChoices, MaterialSurchargeResolver, PaymentSplit,
        PriceAggregator, PriceBreakdown, PricingMode, SurchargeSource,
    };

    // Controllers and services
    pub use crate::configurator::{Intent, IntentOutcome, PackageConfigurator, ProductConfigurator};
    pub use crate::service::{CatalogSource, InMemoryOrderGateway, OrderGateway, StaticCatalog};
    pub use crate::summary::PricedSelectionSummary;
}
