//! File-backed catalog and order gateway.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use roomset_commerce::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Catalog read from `<id>.json` files in one directory.
pub struct FileCatalog {
    dir: PathBuf,
}

impl FileCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Split a catalog file path into its catalog and the entry id.
    pub fn for_file(path: &Path) -> (Self, String) {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        (Self::new(dir), id)
    }

    async fn read(&self, id: &str) -> Result<String, ConfiguratorError> {
        let path = self.dir.join(format!("{}.json", id));
        debug!(path = %path.display(), "reading catalog file");
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            ConfiguratorError::CatalogUnavailable(format!("{}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn fetch_plan(&self, plan_id: &PlanId) -> Result<RawPackagePlan, ConfiguratorError> {
        RawPackagePlan::from_json(&self.read(plan_id.as_str()).await?)
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<RawProduct, ConfiguratorError> {
        RawProduct::from_json(&self.read(product_id.as_str()).await?)
    }
}

/// An order as written to disk.
#[derive(Serialize)]
struct OrderRecord<'a> {
    order_id: &'a OrderId,
    created_at: String,
    summary: &'a PricedSelectionSummary,
}

/// Gateway writing each order to a JSON file.
pub struct FileOrderGateway {
    dir: PathBuf,
    out: Option<PathBuf>,
    pretty: bool,
}

impl FileOrderGateway {
    pub fn new(dir: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            dir: dir.into(),
            out: None,
            pretty,
        }
    }

    /// Write every order to `path` instead of the orders directory.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.out = Some(path.into());
        self
    }

    /// File an order is written to.
    pub fn path_for(&self, order_id: &OrderId) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| self.dir.join(format!("{}.json", order_id)))
    }
}

#[async_trait]
impl OrderGateway for FileOrderGateway {
    async fn create_order(&self, summary: &PricedSelectionSummary) -> Result<OrderId, ConfiguratorError> {
        let order_id = OrderId::generate();
        let record = OrderRecord {
            order_id: &order_id,
            created_at: Utc::now().to_rfc3339(),
            summary,
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&record)
        } else {
            serde_json::to_string(&record)
        }
        .map_err(|e| ConfiguratorError::SubmissionFailed(e.to_string()))?;

        let path = self.path_for(&order_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfiguratorError::SubmissionFailed(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| ConfiguratorError::SubmissionFailed(format!("{}: {}", path.display(), e)))?;

        debug!(order = %order_id, path = %path.display(), "order written");
        Ok(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "id": 7, "name": "Study", "price": 2000,
        "categories": [
            {"key": "desk", "name": "Desk", "count": 1,
             "products": [{"id": "desk-a", "name": "Desk A", "price": 900}]}
        ]
    }"#;

    #[test]
    fn test_for_file_splits_dir_and_id() {
        let (catalog, id) = FileCatalog::for_file(Path::new("plans/study.json"));
        assert_eq!(id, "study");
        assert_eq!(catalog.dir, PathBuf::from("plans"));
    }

    #[tokio::test]
    async fn test_file_catalog_and_gateway() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("study.json"), PLAN).unwrap();

        let catalog = FileCatalog::new(dir.path());
        let mut configurator =
            PackageConfigurator::load(&catalog, PlanId::new("study"), EngineConfig::default()).await;
        assert!(configurator.is_loaded());
        configurator
            .select(&"desk".into(), &"desk-a".into())
            .unwrap();

        let gateway = FileOrderGateway::new(dir.path().join("orders"), true);
        let order_id = configurator.submit(&gateway).await.unwrap();
        let written = std::fs::read_to_string(gateway.path_for(&order_id)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["order_id"], order_id.as_str());
        assert_eq!(value["summary"]["plan_name"], "Study");
    }

    #[tokio::test]
    async fn test_missing_catalog_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FileCatalog::new(dir.path());
        let err = catalog.fetch_product(&"nope".into()).await.unwrap_err();
        assert!(matches!(err, ConfiguratorError::CatalogUnavailable(_)));
    }
}
