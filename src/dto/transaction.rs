use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{ProductDto, SupplierDto, UserSummary};
use crate::entities::{
    product, round_money, supplier, transaction, user, TransactionStatus, TransactionType,
};

/// Body shared by the purchase, sell and return endpoints.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub product_id: i64,
    pub quantity: i32,
    /// Required for purchases and returns, ignored for sales
    pub supplier_id: Option<i64>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Accepts either a bare status (`"CANCELED"`) or `{"status": "CANCELED"}`.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum UpdateStatusRequest {
    Bare(TransactionStatus),
    Wrapped { status: TransactionStatus },
}

impl UpdateStatusRequest {
    pub fn status(self) -> TransactionStatus {
        match self {
            UpdateStatusRequest::Bare(status) | UpdateStatusRequest::Wrapped { status } => status,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub search_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: i64,
    pub total_products: i32,
    pub total_price: Decimal,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: i64,
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<SupplierDto>,
}

impl From<transaction::Model> for TransactionDto {
    fn from(model: transaction::Model) -> Self {
        Self {
            id: model.id,
            total_products: model.total_products,
            total_price: round_money(model.total_price),
            transaction_type: model.transaction_type,
            status: model.status,
            description: model.description,
            user_id: model.user_id,
            product_id: model.product_id,
            supplier_id: model.supplier_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            product: None,
            user: None,
            supplier: None,
        }
    }
}

impl TransactionDto {
    pub fn with_product(mut self, product: Option<product::Model>) -> Self {
        self.product = product.map(ProductDto::from);
        self
    }

    pub fn with_user(mut self, user: Option<user::Model>) -> Self {
        self.user = user.map(UserSummary::from);
        self
    }

    pub fn with_supplier(mut self, supplier: Option<supplier::Model>) -> Self {
        self.supplier = supplier.map(SupplierDto::from);
        self
    }
}
