//! Surcharge resolution and price aggregation.

mod aggregator;
mod breakdown;
mod resolver;

pub use aggregator::PriceAggregator;
pub use breakdown::{AggregationMode, PaymentSplit, PriceBreakdown, PriceLine};
pub use resolver::{
    BaseOption, DashPrefix, ExactKey, ItemSurcharge, KeywordPremium, MaterialChoices,
    MaterialLine, MaterialSurchargeResolver, PercentageFallback, PricedItem, PricingMode,
    StrategyOutcome, Substring, Surcharge, SurchargeContext, SurchargeSource, SurchargeStrategy,
};
