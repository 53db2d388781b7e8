//! Catalog service: supplier product management and the consumer catalog view.

use chrono::Utc;
use scp_common::{AppError, AppResult, IdGenerator};
use scp_db::{
    entities::product,
    repositories::{LinkRepository, ProductRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::access::{Role, Viewer, Visibility};

/// Input for creating a product.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(max = 4096))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 32))]
    pub unit: String,

    #[validate(range(min = 1))]
    pub price_kzt: i64,

    #[validate(range(min = 0))]
    pub stock: i32,

    #[validate(range(min = 1))]
    pub moq: i32,
}

/// Input for updating a product. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    #[validate(length(max = 4096))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,

    #[validate(range(min = 1))]
    pub price_kzt: Option<i64>,

    #[validate(range(min = 0))]
    pub stock: Option<i32>,

    #[validate(range(min = 1))]
    pub moq: Option<i32>,
}

/// Catalog service.
#[derive(Clone)]
pub struct CatalogService {
    product_repo: ProductRepository,
    link_repo: LinkRepository,
    id_gen: IdGenerator,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(product_repo: ProductRepository, link_repo: LinkRepository) -> Self {
        Self {
            product_repo,
            link_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a product in the viewer's company catalog.
    pub async fn create_product(
        &self,
        viewer: &Viewer,
        input: CreateProductInput,
    ) -> AppResult<product::Model> {
        viewer.require(viewer.permissions().can_manage_catalog, "manage the catalog")?;
        let supplier_id = viewer.supplier_scope()?.to_string();

        input.validate()?;

        let model = product::ActiveModel {
            id: Set(self.id_gen.generate()),
            supplier_id: Set(supplier_id),
            name: Set(input.name),
            description: Set(input.description),
            unit: Set(input.unit),
            price_kzt: Set(input.price_kzt),
            stock: Set(input.stock),
            moq: Set(input.moq),
            archived: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.product_repo.create(model).await
    }

    /// Update a product of the viewer's company.
    pub async fn update_product(
        &self,
        viewer: &Viewer,
        product_id: &str,
        input: UpdateProductInput,
    ) -> AppResult<product::Model> {
        viewer.require(viewer.permissions().can_manage_catalog, "manage the catalog")?;

        input.validate()?;

        let product = self.product_repo.get_by_id(product_id).await?;
        product.check_visible(viewer)?;

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(unit) = input.unit {
            active.unit = Set(unit);
        }
        if let Some(price_kzt) = input.price_kzt {
            active.price_kzt = Set(price_kzt);
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(moq) = input.moq {
            active.moq = Set(moq);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.product_repo.update(active).await
    }

    /// Archive a product (soft delete).
    pub async fn archive_product(
        &self,
        viewer: &Viewer,
        product_id: &str,
    ) -> AppResult<product::Model> {
        viewer.require(viewer.permissions().can_manage_catalog, "manage the catalog")?;

        let product = self.product_repo.get_by_id(product_id).await?;
        product.check_visible(viewer)?;

        if product.archived {
            return Err(AppError::Conflict("Product is already archived".to_string()));
        }

        let mut active: product::ActiveModel = product.into();
        active.archived = Set(true);
        active.updated_at = Set(Some(Utc::now().into()));

        self.product_repo.update(active).await
    }

    /// List the catalog in the viewer's scope.
    ///
    /// Consumers see products of their approved-linked suppliers only;
    /// supplier staff see their own catalog. Archived products are excluded
    /// unless supplier staff ask for them.
    pub async fn list(
        &self,
        viewer: &Viewer,
        include_archived: bool,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<product::Model>> {
        if viewer.role == Role::Consumer {
            let supplier_ids = self.link_repo.approved_supplier_ids(&viewer.user_id).await?;
            self.product_repo
                .find_for_suppliers(&supplier_ids, limit, until_id)
                .await
        } else {
            let supplier_id = viewer.supplier_scope()?;
            self.product_repo
                .find_for_supplier(supplier_id, include_archived, limit, until_id)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn admin_viewer(supplier_id: &str) -> Viewer {
        Viewer {
            user_id: "admin-1".to_string(),
            role: Role::Admin,
            supplier_id: Some(supplier_id.to_string()),
        }
    }

    fn consumer_viewer() -> Viewer {
        Viewer {
            user_id: "consumer-1".to_string(),
            role: Role::Consumer,
            supplier_id: None,
        }
    }

    fn create_mock_product(id: &str, supplier_id: &str) -> product::Model {
        product::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            name: "Flour".to_string(),
            description: None,
            unit: "kg".to_string(),
            price_kzt: 180,
            stock: 500,
            moq: 10,
            archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> CatalogService {
        CatalogService::new(
            ProductRepository::new(Arc::clone(&db)),
            LinkRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_sales_cannot_create_products() {
        let viewer = Viewer {
            user_id: "sales-1".to_string(),
            role: Role::Sales,
            supplier_id: Some("sup1".to_string()),
        };
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = CreateProductInput {
            name: "Flour".to_string(),
            description: None,
            unit: "kg".to_string(),
            price_kzt: 180,
            stock: 500,
            moq: 10,
        };
        let result = service(db).create_product(&viewer, input).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_product_rejects_non_positive_price() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = CreateProductInput {
            name: "Flour".to_string(),
            description: None,
            unit: "kg".to_string(),
            price_kzt: 0,
            stock: 500,
            moq: 10,
        };
        let result = service(db).create_product(&admin_viewer("sup1"), input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_consumer_without_links_sees_empty_catalog() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // Approved-links lookup yields nothing, so no product query runs
                .append_query_results([Vec::<scp_db::entities::link::Model>::new()])
                .into_connection(),
        );

        let result = service(db)
            .list(&consumer_viewer(), false, 10, None)
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_archive_already_archived_is_conflict() {
        let archived = product::Model {
            archived: true,
            ..create_mock_product("p1", "sup1")
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[archived]])
                .into_connection(),
        );

        let result = service(db).archive_product(&admin_viewer("sup1"), "p1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
