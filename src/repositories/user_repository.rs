use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;

use crate::entities::user::{self, ActiveModel as UserActiveModel, Model as UserModel};
use crate::errors::ServiceError;

use super::{BaseRepository, Repository};

/// Credential store: user lookups by id and by login email.
#[derive(Debug, Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserModel>, ServiceError> {
        Ok(user::Entity::find_by_id(id).one(self.base.get_db()).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.base.get_db())
            .await?)
    }

    /// True when another user already owns `email`.
    pub async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, ServiceError> {
        let mut query = user::Entity::find().filter(user::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(user::Column::Id.ne(id));
        }
        Ok(query.count(self.base.get_db()).await? > 0)
    }

    pub async fn count_all(&self) -> Result<u64, ServiceError> {
        Ok(user::Entity::find().count(self.base.get_db()).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<UserModel>, ServiceError> {
        Ok(user::Entity::find()
            .order_by_desc(user::Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    /// Inserts a new user or writes the changed columns of an existing one.
    pub async fn save(&self, model: UserActiveModel) -> Result<UserModel, ServiceError> {
        let db = self.base.get_db();
        let saved = if model.id.is_not_set() {
            model.insert(db).await?
        } else {
            model.update(db).await?
        };
        Ok(saved)
    }

    pub async fn delete(&self, id: i64) -> Result<u64, ServiceError> {
        let result = user::Entity::delete_by_id(id).exec(self.base.get_db()).await?;
        Ok(result.rows_affected)
    }
}
