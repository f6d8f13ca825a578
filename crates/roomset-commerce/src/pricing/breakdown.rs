//! Price breakdown types.

use serde::{Deserialize, Serialize};

use crate::error::ConfiguratorError;
use crate::ids::{ProductId, SkuId};
use crate::money::Money;
use crate::pricing::MaterialLine;

/// Aggregation shape of a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Package base price plus surcharges of every selected product.
    Package,
    /// One SKU of a product.
    SingleSku,
    /// Several SKUs of the same product.
    MultiSpec,
    /// SKUs of a composite product, each a separate line item.
    Combo,
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMode::Package => "package",
            AggregationMode::SingleSku => "single",
            AggregationMode::MultiSpec => "multi-spec",
            AggregationMode::Combo => "combo",
        }
    }
}

/// Pricing of one selected product or SKU.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceLine {
    /// Product the line belongs to.
    pub product_id: ProductId,
    /// SKU, in product-detail modes.
    pub sku_id: Option<SkuId>,
    /// Display name.
    pub name: String,
    /// Quantity.
    pub quantity: u32,
    /// Own price of the line. Zero in package mode, where the plan carries the base.
    pub base: Money,
    /// Material surcharge per unit.
    pub surcharge_per_unit: Money,
    /// Resolved materials.
    pub materials: Vec<MaterialLine>,
    /// base + surcharge_per_unit × quantity.
    pub total: Money,
}

/// Deposit and balance for a chosen payment ratio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentSplit {
    /// Deposit percentage.
    pub ratio_percent: u32,
    /// round(total × ratio / 100), in whole currency units.
    pub deposit: Money,
    /// total - deposit.
    pub final_payment: Money,
}

impl PaymentSplit {
    /// Split `total` at `ratio_percent`.
    pub fn new(total: Money, ratio_percent: u32) -> Result<Self, ConfiguratorError> {
        if ratio_percent == 0 || ratio_percent > 100 {
            return Err(ConfiguratorError::InvalidPaymentRatio(ratio_percent));
        }
        let deposit = total.percent_of_rounded(ratio_percent);
        let final_payment = total
            .try_subtract(&deposit)
            .ok_or(ConfiguratorError::Overflow)?;
        Ok(Self {
            ratio_percent,
            deposit,
            final_payment,
        })
    }
}

/// Displayed price of a selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// How the total was aggregated.
    pub mode: AggregationMode,
    /// Package base price, or the sum of SKU prices.
    pub base: Money,
    /// Sum of every line's surcharge.
    pub surcharge_subtotal: Money,
    /// base + surcharge_subtotal.
    pub total: Money,
    /// Per-item pricing.
    pub lines: Vec<PriceLine>,
    /// Deposit split, when a payment ratio is chosen.
    pub payment: Option<PaymentSplit>,
}

impl PriceBreakdown {
    /// Attach a deposit split.
    pub fn with_payment(mut self, ratio_percent: u32) -> Result<Self, ConfiguratorError> {
        self.payment = Some(PaymentSplit::new(self.total, ratio_percent)?);
        Ok(self)
    }

    /// Check if any upgrade costs extra.
    pub fn has_surcharges(&self) -> bool {
        self.surcharge_subtotal.is_positive()
    }
}
