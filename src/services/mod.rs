// Inventory transaction engine
pub mod transactions;

// Credential store and user administration
pub mod users;

// Categories, suppliers and products
pub mod catalog;

pub use catalog::{CategoryService, ProductService, SupplierService};
pub use transactions::TransactionService;
pub use users::{LoginOutcome, UserService};

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::StockPolicy;

/// Services shared by every handler through `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub transactions: Arc<TransactionService>,
    pub users: Arc<UserService>,
    pub categories: Arc<CategoryService>,
    pub suppliers: Arc<SupplierService>,
    pub products: Arc<ProductService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        tokens: Arc<TokenService>,
        stock_policy: StockPolicy,
    ) -> Self {
        Self {
            transactions: Arc::new(TransactionService::new(db.clone(), stock_policy)),
            users: Arc::new(UserService::new(db.clone(), tokens)),
            categories: Arc::new(CategoryService::new(db.clone())),
            suppliers: Arc::new(SupplierService::new(db.clone())),
            products: Arc::new(ProductService::new(db)),
        }
    }
}
