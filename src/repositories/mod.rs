//! Store contracts over the sea-orm entities.
//!
//! Read paths take the pooled connection held by each repository. Writes the
//! transaction engine performs inside a unit of work are exposed as associated
//! functions generic over [`ConnectionTrait`] so they accept a
//! `DatabaseTransaction` as well.

use sea_orm::{ConnectionTrait, DatabaseConnection, Paginator, SelectorTrait};
use std::sync::Arc;

use crate::errors::ServiceError;

pub mod category_repository;
pub mod product_repository;
pub mod supplier_repository;
pub mod transaction_repository;
pub mod user_repository;

pub use category_repository::CategoryRepository;
pub use product_repository::ProductRepository;
pub use supplier_repository::SupplierRepository;
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// One zero-based page of results plus the totals the envelope reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

/// Rejects a zero page size before it reaches the paginator.
pub fn ensure_page_size(size: u64) -> Result<(), ServiceError> {
    if size == 0 {
        return Err(ServiceError::ValidationError(
            "Page size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub(crate) async fn fetch_page<'db, C, S>(
    paginator: Paginator<'db, C, S>,
    page: u64,
) -> Result<Page<S::Item>, ServiceError>
where
    C: ConnectionTrait,
    S: SelectorTrait + 'db,
{
    let totals = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(page).await?;

    Ok(Page {
        items,
        total_elements: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}
