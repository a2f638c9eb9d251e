//! Category, supplier and product maintenance.
//!
//! Thin wrappers over the repositories. Product edits never touch
//! `stock_quantity`; only the transaction engine moves stock.

use sea_orm::{DatabaseConnection, IntoActiveModel, Set};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    dto::{
        CategoryDto, CategoryRequest, ProductDto, ProductRequest, SupplierDto, SupplierRequest,
        UpdateProductRequest,
    },
    entities::{category, product, supplier},
    errors::ServiceError,
    repositories::{
        CategoryRepository, ProductRepository, SupplierRepository, TransactionRepository,
    },
};

#[derive(Debug, Clone)]
pub struct CategoryService {
    categories: CategoryRepository,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            categories: CategoryRepository::new(db),
        }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: CategoryRequest) -> Result<CategoryDto, ServiceError> {
        let name = request.name.trim().to_string();
        self.ensure_unique(&name, None).await?;

        let saved = self
            .categories
            .save(category::ActiveModel {
                name: Set(name),
                ..Default::default()
            })
            .await?;
        info!(category_id = saved.id, "Category created");
        Ok(CategoryDto::from(saved))
    }

    pub async fn list(&self) -> Result<Vec<CategoryDto>, ServiceError> {
        let rows = self.categories.list_all().await?;
        Ok(rows.into_iter().map(CategoryDto::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<CategoryDto, ServiceError> {
        self.find(id).await.map(CategoryDto::from)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, request: CategoryRequest) -> Result<CategoryDto, ServiceError> {
        let existing = self.find(id).await?;
        let name = request.name.trim().to_string();
        self.ensure_unique(&name, Some(id)).await?;

        let mut active = existing.into_active_model();
        active.name = Set(name);
        let saved = self.categories.save(active).await?;
        Ok(CategoryDto::from(saved))
    }

    /// Products in the category keep existing with no category.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.find(id).await?;
        self.categories.delete(id).await?;
        info!(category_id = id, "Category deleted");
        Ok(())
    }

    async fn ensure_unique(&self, name: &str, except: Option<i64>) -> Result<(), ServiceError> {
        if self.categories.name_taken(name, except).await? {
            return Err(ServiceError::Conflict(format!(
                "Category {} already exists",
                name
            )));
        }
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<category::Model, ServiceError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category"))
    }
}

#[derive(Debug, Clone)]
pub struct SupplierService {
    suppliers: SupplierRepository,
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            suppliers: SupplierRepository::new(db),
        }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: SupplierRequest) -> Result<SupplierDto, ServiceError> {
        let saved = self
            .suppliers
            .save(supplier::ActiveModel {
                name: Set(request.name.trim().to_string()),
                contact_info: Set(request.contact_info),
                address: Set(request.address),
                ..Default::default()
            })
            .await?;
        info!(supplier_id = saved.id, "Supplier created");
        Ok(SupplierDto::from(saved))
    }

    pub async fn list(&self) -> Result<Vec<SupplierDto>, ServiceError> {
        let rows = self.suppliers.list_all().await?;
        Ok(rows.into_iter().map(SupplierDto::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<SupplierDto, ServiceError> {
        self.find(id).await.map(SupplierDto::from)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, request: SupplierRequest) -> Result<SupplierDto, ServiceError> {
        let mut active = self.find(id).await?.into_active_model();
        active.name = Set(request.name.trim().to_string());
        active.contact_info = Set(request.contact_info);
        active.address = Set(request.address);

        let saved = self.suppliers.save(active).await?;
        Ok(SupplierDto::from(saved))
    }

    /// Ledger rows that referenced the supplier keep their history with the
    /// supplier reference cleared.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.find(id).await?;
        self.suppliers.delete(id).await?;
        info!(supplier_id = id, "Supplier deleted");
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<supplier::Model, ServiceError> {
        self.suppliers
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier"))
    }
}

#[derive(Debug, Clone)]
pub struct ProductService {
    products: ProductRepository,
    categories: CategoryRepository,
    transactions: TransactionRepository,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            transactions: TransactionRepository::new(db),
        }
    }

    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create(&self, request: ProductRequest) -> Result<ProductDto, ServiceError> {
        let sku = request.sku.trim().to_string();
        self.ensure_unique_sku(&sku, None).await?;
        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id).await?;
        }

        let saved = self
            .products
            .save(product::ActiveModel {
                name: Set(request.name.trim().to_string()),
                sku: Set(sku),
                price: Set(request.price),
                stock_quantity: Set(request.stock_quantity),
                description: Set(request.description),
                image_url: Set(request.image_url),
                expiry_date: Set(request.expiry_date),
                category_id: Set(request.category_id),
                ..Default::default()
            })
            .await?;
        info!(product_id = saved.id, "Product created");
        Ok(ProductDto::from(saved))
    }

    pub async fn list(&self) -> Result<Vec<ProductDto>, ServiceError> {
        let rows = self.products.list_all().await?;
        Ok(rows.into_iter().map(ProductDto::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<ProductDto, ServiceError> {
        self.find(id).await.map(ProductDto::from)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateProductRequest,
    ) -> Result<ProductDto, ServiceError> {
        let mut active = self.find(id).await?.into_active_model();

        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(sku) = request.sku {
            let sku = sku.trim().to_string();
            self.ensure_unique_sku(&sku, Some(id)).await?;
            active.sku = Set(sku);
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id).await?;
            active.category_id = Set(Some(category_id));
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(expiry_date) = request.expiry_date {
            active.expiry_date = Set(Some(expiry_date));
        }

        let saved = self.products.save(active).await?;
        info!(product_id = saved.id, "Product updated");
        Ok(ProductDto::from(saved))
    }

    /// Refuses to delete a product the ledger still points at.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.find(id).await?;

        if self.transactions.count_by_product(id).await? > 0 {
            return Err(ServiceError::Conflict(
                "Product has recorded transactions and cannot be deleted".to_string(),
            ));
        }

        self.products.delete(id).await?;
        info!(product_id = id, "Product deleted");
        Ok(())
    }

    async fn ensure_unique_sku(&self, sku: &str, except: Option<i64>) -> Result<(), ServiceError> {
        if self.products.sku_taken(sku, except).await? {
            return Err(ServiceError::Conflict(format!(
                "Product with sku {} already exists",
                sku
            )));
        }
        Ok(())
    }

    async fn ensure_category(&self, id: i64) -> Result<(), ServiceError> {
        self.categories
            .find_by_id(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Category"))
    }

    async fn find(&self, id: i64) -> Result<product::Model, ServiceError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product"))
    }
}
