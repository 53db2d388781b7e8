//! Supplier directory service.

use scp_common::AppResult;
use scp_db::{entities::supplier, repositories::SupplierRepository};

use crate::services::access::Viewer;

/// Supplier directory service.
#[derive(Clone)]
pub struct SupplierService {
    supplier_repo: SupplierRepository,
}

impl SupplierService {
    /// Create a new supplier service.
    #[must_use]
    pub const fn new(supplier_repo: SupplierRepository) -> Self {
        Self { supplier_repo }
    }

    /// Suppliers a consumer may request links to (active and verified).
    pub async fn list_linkable(
        &self,
        viewer: &Viewer,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<supplier::Model>> {
        viewer.require_consumer("browse the supplier directory")?;
        self.supplier_repo.find_linkable(limit, until_id).await
    }

    /// Get a supplier by ID.
    pub async fn get(&self, id: &str) -> AppResult<supplier::Model> {
        self.supplier_repo.get_by_id(id).await
    }
}
