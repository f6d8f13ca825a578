//! Seams to the catalog and order services.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::catalog::{RawPackagePlan, RawProduct};
use crate::error::ConfiguratorError;
use crate::ids::{OrderId, PlanId, ProductId};
use crate::summary::PricedSelectionSummary;

/// Read-only catalog service.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch a package plan as the catalog sends it.
    async fn fetch_plan(&self, plan_id: &PlanId) -> Result<RawPackagePlan, ConfiguratorError>;

    /// Fetch a product with its SKUs.
    async fn fetch_product(&self, product_id: &ProductId) -> Result<RawProduct, ConfiguratorError>;
}

/// Order submission service.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create an order from a priced selection.
    async fn create_order(&self, summary: &PricedSelectionSummary) -> Result<OrderId, ConfiguratorError>;
}

/// Catalog held in memory.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    plans: HashMap<PlanId, RawPackagePlan>,
    products: HashMap<ProductId, RawProduct>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(mut self, plan_id: impl Into<PlanId>, plan: RawPackagePlan) -> Self {
        self.plans.insert(plan_id.into(), plan);
        self
    }

    pub fn with_product(mut self, product_id: impl Into<ProductId>, product: RawProduct) -> Self {
        self.products.insert(product_id.into(), product);
        self
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_plan(&self, plan_id: &PlanId) -> Result<RawPackagePlan, ConfiguratorError> {
        self.plans
            .get(plan_id)
            .cloned()
            .ok_or_else(|| ConfiguratorError::CatalogUnavailable(format!("plan {} not found", plan_id)))
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<RawProduct, ConfiguratorError> {
        self.products.get(product_id).cloned().ok_or_else(|| {
            ConfiguratorError::CatalogUnavailable(format!("product {} not found", product_id))
        })
    }
}

/// Gateway that keeps submitted orders in memory.
#[derive(Debug, Default)]
pub struct InMemoryOrderGateway {
    orders: Mutex<Vec<(OrderId, PricedSelectionSummary)>>,
}

impl InMemoryOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders created so far.
    pub fn orders(&self) -> Vec<(OrderId, PricedSelectionSummary)> {
        self.orders
            .lock()
            .map(|orders| orders.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn create_order(&self, summary: &PricedSelectionSummary) -> Result<OrderId, ConfiguratorError> {
        let order_id = OrderId::generate();
        self.orders
            .lock()
            .map_err(|_| ConfiguratorError::SubmissionFailed("order store poisoned".to_string()))?
            .push((order_id.clone(), summary.clone()));
        Ok(order_id)
    }
}
