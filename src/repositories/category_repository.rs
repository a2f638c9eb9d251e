use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;

use crate::entities::category::{self, ActiveModel as CategoryActiveModel, Model as CategoryModel};
use crate::errors::ServiceError;

use super::{BaseRepository, Repository};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<CategoryModel>, ServiceError> {
        Ok(category::Entity::find_by_id(id)
            .one(self.base.get_db())
            .await?)
    }

    pub async fn name_taken(&self, name: &str, except: Option<i64>) -> Result<bool, ServiceError> {
        let mut query = category::Entity::find().filter(category::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(category::Column::Id.ne(id));
        }
        Ok(query.count(self.base.get_db()).await? > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(category::Entity::find()
            .order_by_desc(category::Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    pub async fn save(&self, model: CategoryActiveModel) -> Result<CategoryModel, ServiceError> {
        let db = self.base.get_db();
        let saved = if model.id.is_not_set() {
            model.insert(db).await?
        } else {
            model.update(db).await?
        };
        Ok(saved)
    }

    pub async fn delete(&self, id: i64) -> Result<u64, ServiceError> {
        let result = category::Entity::delete_by_id(id)
            .exec(self.base.get_db())
            .await?;
        Ok(result.rows_affected)
    }
}
