use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::not_blank;
use crate::entities::{category, product, round_money, supplier, MONEY_SCALE};

/// Highest unit price the catalog accepts. Together with the movement
/// quantity cap it keeps every ledger total within 15 significant digits.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 4); // 999999.9999

fn valid_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("negative_price"));
    }
    if *price > MAX_UNIT_PRICE {
        return Err(ValidationError::new("price_too_large"));
    }
    if price.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::new("price_scale"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[validate(custom = "not_blank", length(max = 255))]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryDto {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRequest {
    #[validate(custom = "not_blank", length(max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub contact_info: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDto {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<supplier::Model> for SupplierDto {
    fn from(model: supplier::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact_info: model.contact_info,
            address: model.address,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(custom = "not_blank", length(max = 255))]
    pub name: String,
    #[validate(custom = "not_blank", length(max = 64))]
    pub sku: String,
    #[validate(custom = "valid_price")]
    pub price: Decimal,
    /// Opening stock; later changes go through the transaction endpoints
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock_quantity: i32,
    pub category_id: Option<i64>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 1000))]
    pub image_url: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Catalog edit. Deliberately has no stock field.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(custom = "not_blank", length(max = 255))]
    pub name: Option<String>,
    #[validate(custom = "not_blank", length(max = 64))]
    pub sku: Option<String>,
    #[validate(custom = "valid_price")]
    pub price: Option<Decimal>,
    pub category_id: Option<i64>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 1000))]
    pub image_url: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductDto {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sku: model.sku,
            price: round_money(model.price),
            stock_quantity: model.stock_quantity,
            description: model.description,
            image_url: model.image_url,
            expiry_date: model.expiry_date,
            category_id: model.category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product_request(price: &str, stock: i32) -> ProductRequest {
        ProductRequest {
            name: "Widget".into(),
            sku: "W-1".into(),
            price: Decimal::from_str(price).unwrap(),
            stock_quantity: stock,
            category_id: None,
            description: None,
            image_url: None,
            expiry_date: None,
        }
    }

    #[test]
    fn product_request_bounds() {
        assert!(product_request("0", 0).validate().is_ok());
        assert!(product_request("12.50", 10).validate().is_ok());

        let negative_price = product_request("-0.01", 1).validate().unwrap_err();
        assert!(negative_price.field_errors().contains_key("price"));

        let negative_stock = product_request("1", -1).validate().unwrap_err();
        assert!(negative_stock.field_errors().contains_key("stock_quantity"));
    }

    #[test]
    fn price_is_capped_in_size_and_precision() {
        assert_eq!(MAX_UNIT_PRICE.to_string(), "999999.9999");
        assert!(product_request("999999.9999", 0).validate().is_ok());
        assert!(product_request("19.990000", 0).validate().is_ok());

        let too_large = product_request("1000000", 0).validate().unwrap_err();
        assert!(too_large.field_errors().contains_key("price"));

        let too_precise = product_request("0.00001", 0).validate().unwrap_err();
        assert!(too_precise.field_errors().contains_key("price"));
    }

    #[test]
    fn blank_category_name_is_rejected() {
        let request = CategoryRequest { name: " \t".into() };
        assert!(request.validate().is_err());
    }
}
