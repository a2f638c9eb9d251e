use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;

use crate::entities::product::{self, ActiveModel as ProductActiveModel, Model as ProductModel};
use crate::errors::ServiceError;

use super::{BaseRepository, Repository};

#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Lookup usable on the pool or inside an open unit of work.
    pub async fn find_with<C>(conn: &C, id: i64) -> Result<Option<ProductModel>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(product::Entity::find_by_id(id).one(conn).await?)
    }

    /// Moves stock by `delta` with a single conditional UPDATE.
    ///
    /// The row only changes when the result fits the `i32` column, and with
    /// `floor_at_zero` also only when it stays non-negative. Zero affected rows
    /// means one of those bounds refused the movement (or the product vanished).
    pub async fn adjust_stock<C>(
        conn: &C,
        id: i64,
        delta: i32,
        floor_at_zero: bool,
    ) -> Result<u64, ServiceError>
    where
        C: ConnectionTrait,
    {
        let stock = product::Column::StockQuantity;
        let mut update = product::Entity::update_many()
            .col_expr(stock, Expr::col(stock).add(delta))
            .col_expr(product::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(product::Column::Id.eq(id));

        if delta > 0 {
            update = update.filter(stock.lte(i32::MAX - delta));
        } else if delta < 0 {
            let floor = if floor_at_zero { 0 } else { i32::MIN };
            update = update.filter(stock.gte(floor - delta));
        }

        let result = update.exec(conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ProductModel>, ServiceError> {
        Self::find_with(self.base.get_db(), id).await
    }

    pub async fn sku_taken(&self, sku: &str, except: Option<i64>) -> Result<bool, ServiceError> {
        let mut query = product::Entity::find().filter(product::Column::Sku.eq(sku));
        if let Some(id) = except {
            query = query.filter(product::Column::Id.ne(id));
        }
        Ok(query.count(self.base.get_db()).await? > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<ProductModel>, ServiceError> {
        Ok(product::Entity::find()
            .order_by_desc(product::Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    pub async fn save(&self, model: ProductActiveModel) -> Result<ProductModel, ServiceError> {
        let db = self.base.get_db();
        let saved = if model.id.is_not_set() {
            model.insert(db).await?
        } else {
            model.update(db).await?
        };
        Ok(saved)
    }

    pub async fn delete(&self, id: i64) -> Result<u64, ServiceError> {
        let result = product::Entity::delete_by_id(id)
            .exec(self.base.get_db())
            .await?;
        Ok(result.rows_affected)
    }
}
