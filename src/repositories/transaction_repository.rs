use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use std::sync::Arc;

use crate::entities::{
    product,
    transaction::{self, ActiveModel as TransactionActiveModel, Model as TransactionModel},
};
use crate::errors::ServiceError;

use super::{ensure_page_size, fetch_page, BaseRepository, Page, Repository};

const LIKE_ESCAPE: char = '\\';

/// `%text%` with the LIKE wildcards in `text` taken literally.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Ledger store. Rows are appended inside the engine's unit of work and only
/// ever revisited to change their status.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    base: BaseRepository,
}

impl TransactionRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn insert<C>(
        conn: &C,
        model: TransactionActiveModel,
    ) -> Result<TransactionModel, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(model.insert(conn).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<TransactionModel>, ServiceError> {
        Ok(transaction::Entity::find_by_id(id)
            .one(self.base.get_db())
            .await?)
    }

    /// Newest-first page of the ledger, optionally narrowed by a
    /// case-insensitive substring of description, status, product name or sku.
    pub async fn search(
        &self,
        page: u64,
        size: u64,
        search_text: Option<&str>,
    ) -> Result<Page<TransactionModel>, ServiceError> {
        ensure_page_size(size)?;

        let mut query = transaction::Entity::find()
            .join(JoinType::LeftJoin, transaction::Relation::Product.def())
            .order_by_desc(transaction::Column::Id);

        if let Some(text) = search_text.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = contains_pattern(&text.to_lowercase());
            let lowered = |expr: Expr| {
                let like = LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE);
                Expr::expr(Func::lower(expr)).like(like)
            };
            query = query.filter(
                Condition::any()
                    .add(lowered(Expr::col((
                        transaction::Entity,
                        transaction::Column::Description,
                    ))))
                    .add(lowered(Expr::col((
                        transaction::Entity,
                        transaction::Column::Status,
                    ))))
                    .add(lowered(Expr::col((product::Entity, product::Column::Name))))
                    .add(lowered(Expr::col((product::Entity, product::Column::Sku)))),
            );
        }

        fetch_page(query.paginate(self.base.get_db(), size), page).await
    }

    /// Rows created in `[from, until)`, in insertion order.
    pub async fn find_created_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<TransactionModel>, ServiceError> {
        Ok(transaction::Entity::find()
            .filter(transaction::Column::CreatedAt.gte(from))
            .filter(transaction::Column::CreatedAt.lt(until))
            .order_by_asc(transaction::Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<TransactionModel>, ServiceError> {
        Ok(transaction::Entity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .order_by_desc(transaction::Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    pub async fn count_by_product(&self, product_id: i64) -> Result<u64, ServiceError> {
        Ok(transaction::Entity::find()
            .filter(transaction::Column::ProductId.eq(product_id))
            .count(self.base.get_db())
            .await?)
    }

    pub async fn count_by_user(&self, user_id: i64) -> Result<u64, ServiceError> {
        Ok(transaction::Entity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .count(self.base.get_db())
            .await?)
    }

    /// Writes back a row whose status (and `updated_at`) were changed.
    pub async fn update(&self, model: TransactionActiveModel) -> Result<TransactionModel, ServiceError> {
        Ok(model.update(self.base.get_db()).await?)
    }
}
