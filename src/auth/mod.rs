//! Authentication and authorization.
//!
//! `auth_gate` runs on every request. It turns a valid bearer token into a
//! [`CurrentUser`] request extension and otherwise lets the request continue
//! anonymously. Route groups then opt into [`require_auth`] or
//! [`require_role`] through [`AuthRouterExt`], which is where anonymous or
//! under-privileged callers are turned away.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::entities::user::{Model as UserModel, UserRole};
use crate::errors::ServiceError;
use crate::repositories::UserRepository;
use crate::AppState;

pub const AUTH_REQUIRED: &str = "Authentication required";

/// Identity resolved by the gate for the rest of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }
}

impl From<&UserModel> for CurrentUser {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized(AUTH_REQUIRED.to_string()))
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Resolves a token to a user, or `None` when anything about it is off.
pub async fn resolve_identity(
    users: &UserRepository,
    tokens: &TokenService,
    token: &str,
) -> Result<Option<CurrentUser>, ServiceError> {
    let subject = match tokens.extract_subject(token) {
        Ok(subject) => subject,
        Err(e) => {
            debug!(error = %e, "Ignoring undecodable bearer token");
            return Ok(None);
        }
    };

    let Some(user) = users.find_by_email(&subject).await? else {
        warn!(subject = %subject, "Bearer token subject does not match any user");
        return Ok(None);
    };

    if !tokens.validate(token, &user.email) {
        debug!(user_id = user.id, "Bearer token failed validation");
        return Ok(None);
    }

    Ok(Some(CurrentUser::from(&user)))
}

/// Per-request identity resolution. Never rejects; a lookup error is logged
/// and the request proceeds anonymously.
pub async fn auth_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        let users = UserRepository::new(state.db.clone());
        match resolve_identity(&users, &state.tokens, &token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(user);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Identity lookup failed, continuing anonymously"),
        }
    }

    next.run(request).await
}

pub async fn require_auth(request: Request, next: Next) -> Result<Response, ServiceError> {
    if request.extensions().get::<CurrentUser>().is_none() {
        return Err(ServiceError::Unauthorized(AUTH_REQUIRED.to_string()));
    }
    Ok(next.run(request).await)
}

pub async fn require_role(
    State(required_role): State<UserRole>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ServiceError::Unauthorized(AUTH_REQUIRED.to_string()))?;

    if !user.has_role(required_role) {
        debug!(user_id = user.id, role = %user.role, required = %required_role, "Role check failed");
        return Err(ServiceError::Forbidden(format!(
            "Access denied: {} role required",
            required_role
        )));
    }

    Ok(next.run(request).await)
}

/// Attaches the guards to a group of routes.
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: UserRole) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.route_layer(axum::middleware::from_fn(require_auth))
    }

    fn with_role(self, role: UserRole) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(role, require_role))
            .with_auth()
    }
}
