//! Request bodies and response projections.
//!
//! Responses never embed back-references: a user nested in a transaction is a
//! [`UserSummary`], which has no transaction list, so the graph stays finite.

pub mod catalog;
pub mod transaction;
pub mod user;

pub use catalog::{
    CategoryDto, CategoryRequest, ProductDto, ProductRequest, SupplierDto, SupplierRequest,
    UpdateProductRequest,
};
pub use transaction::{
    PageQuery, PeriodQuery, TransactionDto, TransactionRequest, UpdateStatusRequest,
};
pub use user::{LoginRequest, RegisterRequest, UpdateUserRequest, UserDto, UserSummary};

use validator::ValidationError;

/// Rejects empty and whitespace-only strings.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
