use sea_orm::{DatabaseConnection, IntoActiveModel, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    auth::{hash_password, verify_password, CurrentUser, TokenService},
    dto::{LoginRequest, RegisterRequest, TransactionDto, UpdateUserRequest, UserDto},
    entities::{user, UserRole},
    errors::ServiceError,
    repositories::{ProductRepository, TransactionRepository, UserRepository},
};

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub role: UserRole,
    pub expiration_time: String,
}

/// Role a new account receives.
///
/// A requested role is honoured for ADMIN callers and for the very first
/// account, which bootstraps the installation. Everyone else becomes a MANAGER.
fn granted_role(
    requested: Option<UserRole>,
    requested_by: Option<&CurrentUser>,
    first_account: bool,
) -> UserRole {
    let trusted = first_account || requested_by.is_some_and(|u| u.has_role(UserRole::Admin));
    match requested {
        Some(role) if trusted => role,
        _ => UserRole::Manager,
    }
}

fn admin_required() -> ServiceError {
    ServiceError::Forbidden(format!("Access denied: {} role required", UserRole::Admin))
}

/// Registration, login and user administration over the credential store.
#[derive(Debug, Clone)]
pub struct UserService {
    users: UserRepository,
    transactions: TransactionRepository,
    products: ProductRepository,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, tokens: Arc<TokenService>) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            transactions: TransactionRepository::new(db.clone()),
            products: ProductRepository::new(db),
            tokens,
        }
    }

    /// Creates an account. `requested_by` is the signed-in caller, if any.
    #[instrument(skip(self, request, requested_by), fields(email = %request.email))]
    pub async fn register(
        &self,
        request: RegisterRequest,
        requested_by: Option<&CurrentUser>,
    ) -> Result<UserDto, ServiceError> {
        let email = request.email.trim().to_lowercase();
        if self.users.email_taken(&email, None).await? {
            return Err(ServiceError::Conflict(format!(
                "User with email {} already exists",
                email
            )));
        }

        let first_account = self.users.count_all().await? == 0;
        let role = granted_role(request.role, requested_by, first_account);
        if request.role.is_some_and(|wanted| wanted != role) {
            warn!(requested = ?request.role, granted = %role, "Requested role not granted");
        }

        let model = user::ActiveModel {
            name: Set(request.name.trim().to_string()),
            email: Set(email),
            password: Set(hash_password(&request.password)?),
            phone_number: Set(request.phone_number.trim().to_string()),
            role: Set(role),
            ..Default::default()
        };

        let saved = self.users.save(model).await?;
        info!(user_id = saved.id, role = %saved.role, "User registered");
        Ok(UserDto::from(saved))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, ServiceError> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Email not Found".to_string()))?;

        if !verify_password(&request.password, &user.password) {
            warn!(user_id = user.id, "Login rejected: password mismatch");
            return Err(ServiceError::InvalidCredentials(
                "password does not match".to_string(),
            ));
        }

        let token = self.tokens.issue(&user.email)?;
        info!(user_id = user.id, "User logged in");

        Ok(LoginOutcome {
            token,
            role: user.role,
            expiration_time: self.tokens.expiration_label(),
        })
    }

    pub async fn list_users(&self) -> Result<Vec<UserDto>, ServiceError> {
        let users = self.users.list_all().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    pub async fn get_user(&self, id: i64) -> Result<UserDto, ServiceError> {
        self.find_user(id).await.map(UserDto::from)
    }

    /// Partial profile update. Callers edit their own profile; ADMINs may edit
    /// anyone's and are the only ones who can change a role.
    #[instrument(skip(self, request, caller), fields(caller_id = caller.id))]
    pub async fn update_user(
        &self,
        id: i64,
        request: UpdateUserRequest,
        caller: &CurrentUser,
    ) -> Result<UserDto, ServiceError> {
        let is_admin = caller.has_role(UserRole::Admin);
        if caller.id != id && !is_admin {
            warn!(target_id = id, "Profile update refused: not the owner");
            return Err(ServiceError::Forbidden(
                "Access denied: users may only update their own profile".to_string(),
            ));
        }

        let existing = self.find_user(id).await?;
        let current_role = existing.role;
        let mut active = existing.into_active_model();

        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(email) = request.email {
            let email = email.trim().to_lowercase();
            if self.users.email_taken(&email, Some(id)).await? {
                return Err(ServiceError::Conflict(format!(
                    "User with email {} already exists",
                    email
                )));
            }
            active.email = Set(email);
        }
        if let Some(phone_number) = request.phone_number {
            active.phone_number = Set(phone_number.trim().to_string());
        }
        if let Some(role) = request.role.filter(|role| *role != current_role) {
            if !is_admin {
                warn!(target_id = id, requested = %role, "Role change refused");
                return Err(admin_required());
            }
            active.role = Set(role);
        }
        if let Some(password) = request.password {
            active.password = Set(hash_password(&password)?);
        }

        let saved = self.users.save(active).await?;
        info!(user_id = saved.id, "User updated");
        Ok(UserDto::from(saved))
    }

    /// Deletes a user that owns no ledger rows.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<(), ServiceError> {
        self.find_user(id).await?;

        if self.transactions.count_by_user(id).await? > 0 {
            return Err(ServiceError::Conflict(
                "User has recorded transactions and cannot be deleted".to_string(),
            ));
        }

        self.users.delete(id).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }

    /// The user with their ledger rows, each carrying its product summary.
    pub async fn user_transactions(&self, id: i64) -> Result<UserDto, ServiceError> {
        let user = self.find_user(id).await?;
        let rows = self.transactions.find_by_user(id).await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let product = self.products.find_by_id(row.product_id).await?;
            entries.push(TransactionDto::from(row).with_product(product));
        }

        let mut dto = UserDto::from(user);
        dto.transactions = Some(entries);
        Ok(dto)
    }

    async fn find_user(&self, id: i64) -> Result<user::Model, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }
}
