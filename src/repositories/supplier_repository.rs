use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder,
};
use std::sync::Arc;

use crate::entities::supplier::{self, ActiveModel as SupplierActiveModel, Model as SupplierModel};
use crate::errors::ServiceError;

use super::{BaseRepository, Repository};

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    base: BaseRepository,
}

impl SupplierRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Lookup usable on the pool or inside an open unit of work.
    pub async fn find_with<C>(conn: &C, id: i64) -> Result<Option<SupplierModel>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(supplier::Entity::find_by_id(id).one(conn).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<SupplierModel>, ServiceError> {
        Self::find_with(self.base.get_db(), id).await
    }

    pub async fn list_all(&self) -> Result<Vec<SupplierModel>, ServiceError> {
        Ok(supplier::Entity::find()
            .order_by_desc(supplier::Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    pub async fn save(&self, model: SupplierActiveModel) -> Result<SupplierModel, ServiceError> {
        let db = self.base.get_db();
        let saved = if model.id.is_not_set() {
            model.insert(db).await?
        } else {
            model.update(db).await?
        };
        Ok(saved)
    }

    pub async fn delete(&self, id: i64) -> Result<u64, ServiceError> {
        let result = supplier::Entity::delete_by_id(id)
            .exec(self.base.get_db())
            .await?;
        Ok(result.rows_affected)
    }
}
