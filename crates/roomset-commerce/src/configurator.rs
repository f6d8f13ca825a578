//! Controllers owning a catalog, its selection state and the pricing engine.
//!
//! [`PackageConfigurator`] drives a package (bundle) page: shoppers fill
//! category quotas, pick materials, choose a payment ratio and submit.
//! [`ProductConfigurator`] drives a product detail page in single, multi-spec
//! or combo mode.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{MaterialTag, PackagePlan, PackageProduct};
use crate::config::EngineConfig;
use crate::error::ConfiguratorError;
use crate::ids::{CategoryKey, OrderId, PlanId, ProductId, SkuId};
use crate::pricing::{AggregationMode, PriceAggregator, PriceBreakdown, PricedItem, PricingMode};
use crate::progress::SelectionProgress;
use crate::selection::{SelectOutcome, SelectionState, SkuSelection};
use crate::service::{CatalogSource, OrderGateway};
use crate::summary::PricedSelectionSummary;

/// A shopper intent on a package page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Intent {
    /// Toggle a product.
    Select {
        category: CategoryKey,
        product: ProductId,
    },
    /// Fill a category from its catalog order.
    SelectAll { category: CategoryKey },
    Remove {
        category: CategoryKey,
        product: ProductId,
    },
    /// Change a selected product's quantity.
    Quantity {
        category: CategoryKey,
        product: ProductId,
        delta: i32,
    },
    /// Choose a material option.
    Material {
        product: ProductId,
        material: MaterialTag,
        option: String,
    },
}

/// What an accepted intent did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum IntentOutcome {
    Select(SelectOutcome),
    Filled { products: Vec<ProductId> },
    Removed { was_selected: bool },
    Quantity { quantity: u32 },
    Material,
}

/// Package page controller.
///
/// A configurator whose catalog failed to load is inert: every intent and
/// every price request fails with [`ConfiguratorError::CatalogUnavailable`]
/// until [`PackageConfigurator::reload`] succeeds.
#[derive(Debug)]
pub struct PackageConfigurator {
    plan_id: PlanId,
    plan: Option<PackagePlan>,
    last_error: Option<ConfiguratorError>,
    state: SelectionState,
    config: EngineConfig,
    aggregator: PriceAggregator,
    payment_ratio: Option<u32>,
}

impl PackageConfigurator {
    /// Create a configurator for an already normalized plan.
    pub fn new(plan: PackagePlan, config: EngineConfig) -> Result<Self, ConfiguratorError> {
        config.validate()?;
        Ok(Self {
            plan_id: plan.id.clone(),
            plan: Some(plan),
            last_error: None,
            state: SelectionState::new(),
            aggregator: PriceAggregator::new(&config),
            config,
            payment_ratio: None,
        })
    }

    /// Fetch and normalize a plan. Failures leave an inert configurator.
    pub async fn load(source: &dyn CatalogSource, plan_id: PlanId, config: EngineConfig) -> Self {
        let mut configurator = Self {
            plan_id,
            plan: None,
            last_error: None,
            state: SelectionState::new(),
            aggregator: PriceAggregator::new(&config),
            config,
            payment_ratio: None,
        };
        if let Err(e) = configurator.reload(source).await {
            warn!(plan = %configurator.plan_id, error = %e, "package catalog unavailable");
        }
        configurator
    }

    /// Fetch the plan again. A successful reload starts a fresh selection.
    pub async fn reload(&mut self, source: &dyn CatalogSource) -> Result<(), ConfiguratorError> {
        let loaded = match self.config.validate() {
            Ok(()) => match source.fetch_plan(&self.plan_id).await {
                Ok(raw) => raw.normalize(self.config.currency),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        match loaded {
            Ok(plan) => {
                info!(
                    plan = %plan.id,
                    categories = plan.categories.len(),
                    required = plan.required_total(),
                    "package catalog loaded"
                );
                self.plan = Some(plan);
                self.last_error = None;
                self.state.clear();
                Ok(())
            }
            Err(e) => {
                self.plan = None;
                self.state.clear();
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn plan_id(&self) -> &PlanId {
        &self.plan_id
    }

    pub fn is_loaded(&self) -> bool {
        self.plan.is_some()
    }

    /// Error of the last failed load, kept until a reload succeeds.
    pub fn last_error(&self) -> Option<&ConfiguratorError> {
        self.last_error.as_ref()
    }

    fn unavailable(&self) -> ConfiguratorError {
        ConfiguratorError::CatalogUnavailable(format!("plan {} is not loaded", self.plan_id))
    }

    /// The loaded plan.
    pub fn plan(&self) -> Result<&PackagePlan, ConfiguratorError> {
        self.plan.as_ref().ok_or_else(|| self.unavailable())
    }

    pub fn selection(&self) -> &SelectionState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn rejected<T>(intent: &str, result: Result<T, ConfiguratorError>) -> Result<T, ConfiguratorError> {
        if let Err(e) = &result {
            warn!(intent, error = %e, "intent rejected");
        }
        result
    }

    /// Toggle a product in a category.
    pub fn select(
        &mut self,
        category: &CategoryKey,
        product: &ProductId,
    ) -> Result<SelectOutcome, ConfiguratorError> {
        let result = match self.plan.as_ref() {
            Some(plan) => self.state.select(plan, category, product),
            None => Err(self.unavailable()),
        };
        if let Ok(SelectOutcome::Selected { evicted }) = &result {
            for old in evicted {
                debug!(category = %category, evicted = %old, "evicted to make room");
            }
            debug!(category = %category, product = %product, "product selected");
            self.dress_pro(std::slice::from_ref(product));
        }
        Self::rejected("select", result)
    }

    /// Give newly selected PRO products their premium look where nothing is chosen yet.
    fn dress_pro(&mut self, products: &[ProductId]) {
        let Some(plan) = self.plan.as_ref() else {
            return;
        };
        for product_id in products {
            let Some(product) = plan.product(product_id).filter(|p| p.is_pro) else {
                continue;
            };
            let premium = self
                .aggregator
                .resolver()
                .premium_choices(&PricedItem::package(product), PricingMode::Package);
            debug!(product = %product_id, ?premium, "premium look applied");
            self.state.fill_materials(product_id, premium);
        }
    }

    /// Fill a category with its first products in catalog order.
    pub fn select_all(&mut self, category: &CategoryKey) -> Result<Vec<ProductId>, ConfiguratorError> {
        let candidates = self.plan().and_then(|plan| {
            plan.category(category)
                .map(|c| c.products.iter().map(|p| p.id.clone()).collect::<Vec<_>>())
                .ok_or_else(|| ConfiguratorError::CategoryNotFound(category.to_string()))
        });
        let candidates = Self::rejected("select_all", candidates)?;
        self.select_all_from(category, &candidates)
    }

    /// Replace a category's selection with the first `required` candidates.
    pub fn select_all_from(
        &mut self,
        category: &CategoryKey,
        candidates: &[ProductId],
    ) -> Result<Vec<ProductId>, ConfiguratorError> {
        let result = match self.plan.as_ref() {
            Some(plan) => self.state.select_all(plan, category, candidates),
            None => Err(self.unavailable()),
        };
        if let Ok(chosen) = &result {
            debug!(category = %category, count = chosen.len(), "category filled");
            self.dress_pro(chosen);
        }
        Self::rejected("select_all", result)
    }

    pub fn remove(
        &mut self,
        category: &CategoryKey,
        product: &ProductId,
    ) -> Result<bool, ConfiguratorError> {
        let result = match self.plan.as_ref() {
            Some(plan) => self.state.remove(plan, category, product),
            None => Err(self.unavailable()),
        };
        Self::rejected("remove", result)
    }

    /// Change a selected product's quantity by `delta`.
    pub fn change_quantity(
        &mut self,
        category: &CategoryKey,
        product: &ProductId,
        delta: i32,
    ) -> Result<u32, ConfiguratorError> {
        let result = match self.plan.as_ref() {
            Some(plan) => self.state.change_quantity(plan, category, product, delta),
            None => Err(self.unavailable()),
        };
        if let Ok(quantity) = &result {
            debug!(category = %category, product = %product, quantity, "quantity changed");
        }
        Self::rejected("quantity", result)
    }

    /// Choose a material option for a product of the plan.
    pub fn choose_material(
        &mut self,
        product: &ProductId,
        tag: MaterialTag,
        option: &str,
    ) -> Result<(), ConfiguratorError> {
        let result = match self.plan.as_ref() {
            Some(plan) => match plan.product(product) {
                Some(p) => self.state.choose_material(p, tag, option),
                None => Err(ConfiguratorError::ProductNotFound(product.to_string())),
            },
            None => Err(self.unavailable()),
        };
        Self::rejected("material", result)
    }

    /// Apply one intent.
    pub fn apply(&mut self, intent: &Intent) -> Result<IntentOutcome, ConfiguratorError> {
        match intent {
            Intent::Select { category, product } => {
                self.select(category, product).map(IntentOutcome::Select)
            }
            Intent::SelectAll { category } => self
                .select_all(category)
                .map(|products| IntentOutcome::Filled { products }),
            Intent::Remove { category, product } => self
                .remove(category, product)
                .map(|was_selected| IntentOutcome::Removed { was_selected }),
            Intent::Quantity {
                category,
                product,
                delta,
            } => self
                .change_quantity(category, product, *delta)
                .map(|quantity| IntentOutcome::Quantity { quantity }),
            Intent::Material {
                product,
                material,
                option,
            } => self
                .choose_material(product, material.clone(), option)
                .map(|_| IntentOutcome::Material),
        }
    }

    /// Choose the deposit percentage, or `None` for no split.
    pub fn set_payment_ratio(&mut self, ratio: Option<u32>) -> Result<(), ConfiguratorError> {
        if let Some(percent) = ratio {
            if !self.config.offers_ratio(percent) {
                warn!(percent, "payment ratio not offered");
                return Err(ConfiguratorError::InvalidPaymentRatio(percent));
            }
        }
        self.payment_ratio = ratio;
        Ok(())
    }

    pub fn payment_ratio(&self) -> Option<u32> {
        self.payment_ratio
    }

    /// Progress of the selection; empty when the plan is not loaded.
    pub fn progress(&self) -> SelectionProgress {
        match &self.plan {
            Some(plan) => SelectionProgress::compute(plan, &self.state),
            None => SelectionProgress::empty(),
        }
    }

    /// Current price of the selection.
    pub fn breakdown(&self) -> Result<PriceBreakdown, ConfiguratorError> {
        let breakdown = self.aggregator.package(self.plan()?, &self.state)?;
        match self.payment_ratio {
            Some(ratio) => breakdown.with_payment(ratio),
            None => Ok(breakdown),
        }
    }

    /// The order payload. Requires a complete selection.
    pub fn summary(&self) -> Result<PricedSelectionSummary, ConfiguratorError> {
        let plan = self.plan()?;
        let progress = self.progress();
        if !progress.is_complete {
            return Err(ConfiguratorError::SelectionIncomplete(progress.percent));
        }
        PricedSelectionSummary::build(plan, self.breakdown()?)
    }

    /// Hand the summary to the order service.
    pub async fn submit(&self, gateway: &dyn OrderGateway) -> Result<OrderId, ConfiguratorError> {
        let summary = self.summary().map_err(|e| {
            warn!(plan = %self.plan_id, error = %e, "submission refused");
            e
        })?;
        let order_id = gateway.create_order(&summary).await?;
        info!(
            plan = %self.plan_id,
            order = %order_id,
            total = %summary.breakdown.total,
            "order submitted"
        );
        Ok(order_id)
    }
}

/// Product detail page controller.
#[derive(Debug)]
pub struct ProductConfigurator {
    product: PackageProduct,
    mode: AggregationMode,
    selection: SkuSelection,
    aggregator: PriceAggregator,
}

impl ProductConfigurator {
    /// Create a configurator in single-SKU mode.
    pub fn new(product: PackageProduct, config: &EngineConfig) -> Result<Self, ConfiguratorError> {
        config.validate()?;
        if product.skus.is_empty() {
            return Err(ConfiguratorError::CatalogUnavailable(format!(
                "product {} has no SKUs",
                product.id
            )));
        }
        Ok(Self {
            product,
            mode: AggregationMode::SingleSku,
            selection: SkuSelection::new(),
            aggregator: PriceAggregator::new(config),
        })
    }

    /// Fetch and normalize a product.
    pub async fn load(
        source: &dyn CatalogSource,
        product_id: &ProductId,
        config: &EngineConfig,
    ) -> Result<Self, ConfiguratorError> {
        let raw = source.fetch_product(product_id).await.map_err(|e| {
            warn!(product = %product_id, error = %e, "product catalog unavailable");
            e
        })?;
        let product = raw.normalize(config.currency)?;
        info!(product = %product.id, skus = product.skus.len(), "product catalog loaded");
        Self::new(product, config)
    }

    pub fn product(&self) -> &PackageProduct {
        &self.product
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    pub fn selection(&self) -> &SkuSelection {
        &self.selection
    }

    /// Switch aggregation mode. Leaving a multi-SKU mode for single keeps the first SKU.
    pub fn set_mode(&mut self, mode: AggregationMode) -> Result<(), ConfiguratorError> {
        let available = match mode {
            AggregationMode::SingleSku | AggregationMode::MultiSpec => true,
            AggregationMode::Combo => self.product.combo,
            AggregationMode::Package => false,
        };
        if !available {
            return Err(ConfiguratorError::ModeUnavailable {
                mode: mode.as_str().to_string(),
                product: self.product.name.clone(),
            });
        }
        if mode == AggregationMode::SingleSku {
            self.selection.truncate_to_one();
        }
        self.mode = mode;
        Ok(())
    }

    /// Pick a SKU: replaces the choice in single mode, toggles otherwise.
    ///
    /// Returns whether the SKU is chosen afterwards. A newly chosen PRO SKU
    /// is dressed in its most expensive look.
    pub fn choose_sku(&mut self, sku_id: &SkuId) -> Result<bool, ConfiguratorError> {
        let chosen = match self.mode {
            AggregationMode::SingleSku => self.selection.choose_only(&self.product, sku_id).map(|_| true),
            _ => self.selection.toggle(&self.product, sku_id),
        }
        .map_err(|e| {
            warn!(sku = %sku_id, error = %e, "SKU rejected");
            e
        })?;

        if chosen {
            if let Some(sku) = self.product.sku(sku_id).filter(|s| s.is_pro || self.product.is_pro) {
                let premium = self
                    .aggregator
                    .resolver()
                    .premium_choices(&PricedItem::sku(&self.product, sku), PricingMode::SingleProduct);
                debug!(sku = %sku_id, ?premium, "premium look applied");
                self.selection.set_materials(sku_id, premium);
            }
        }
        Ok(chosen)
    }

    /// Choose a material option for one SKU.
    pub fn choose_material(
        &mut self,
        sku_id: &SkuId,
        tag: MaterialTag,
        option: &str,
    ) -> Result<(), ConfiguratorError> {
        self.selection
            .choose_material(&self.product, sku_id, tag, option)
            .map_err(|e| {
                warn!(sku = %sku_id, error = %e, "material rejected");
                e
            })
    }

    /// Current price in the current mode.
    pub fn breakdown(&self) -> Result<PriceBreakdown, ConfiguratorError> {
        self.aggregator.product(self.mode, &self.product, &self.selection)
    }
}
