//! Inventory transaction engine.
//!
//! Every stock movement runs in one unit of work: the product's stock is moved
//! with a conditional UPDATE and the ledger row is appended on the same
//! database transaction, so either both land or neither does. Reference
//! checks happen before anything is written.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    auth::CurrentUser,
    config::StockPolicy,
    db::with_transaction,
    dto::{TransactionDto, TransactionRequest},
    entities::{round_money, transaction, TransactionStatus, TransactionType},
    errors::ServiceError,
    repositories::{
        Page, ProductRepository, SupplierRepository, TransactionRepository, UserRepository,
    },
};

pub const SUPPLIER_REQUIRED: &str = "Supplier Id is Required";

/// Largest quantity a single movement may carry.
pub const MAX_MOVEMENT_QUANTITY: i32 = 100_000;

#[derive(Debug, Clone)]
pub struct TransactionService {
    db: Arc<DatabaseConnection>,
    stock_policy: StockPolicy,
    transactions: TransactionRepository,
    products: ProductRepository,
    suppliers: SupplierRepository,
    users: UserRepository,
}

impl TransactionService {
    pub fn new(db: Arc<DatabaseConnection>, stock_policy: StockPolicy) -> Self {
        Self {
            transactions: TransactionRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            suppliers: SupplierRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            db,
            stock_policy,
        }
    }

    /// Records a PURCHASE from a supplier and raises stock.
    #[instrument(skip(self, request, actor), fields(actor_id = actor.id))]
    pub async fn restock(
        &self,
        request: TransactionRequest,
        actor: &CurrentUser,
    ) -> Result<TransactionDto, ServiceError> {
        self.record_movement(TransactionType::Purchase, request, actor)
            .await
    }

    /// Records a SALE and lowers stock. No supplier is involved.
    #[instrument(skip(self, request, actor), fields(actor_id = actor.id))]
    pub async fn sell(
        &self,
        request: TransactionRequest,
        actor: &CurrentUser,
    ) -> Result<TransactionDto, ServiceError> {
        self.record_movement(TransactionType::Sale, request, actor)
            .await
    }

    /// Records a RETURN_TO_SUPPLIER, lowers stock and leaves the row
    /// PROCESSING until the shipment is confirmed.
    #[instrument(skip(self, request, actor), fields(actor_id = actor.id))]
    pub async fn return_to_supplier(
        &self,
        request: TransactionRequest,
        actor: &CurrentUser,
    ) -> Result<TransactionDto, ServiceError> {
        self.record_movement(TransactionType::ReturnToSupplier, request, actor)
            .await
    }

    async fn record_movement(
        &self,
        kind: TransactionType,
        request: TransactionRequest,
        actor: &CurrentUser,
    ) -> Result<TransactionDto, ServiceError> {
        let supplier_id = if kind.requires_supplier() {
            Some(
                request
                    .supplier_id
                    .ok_or_else(|| ServiceError::MissingReference(SUPPLIER_REQUIRED.to_string()))?,
            )
        } else {
            None
        };

        let quantity = request.quantity;
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Quantity must be a positive integer".to_string(),
            ));
        }
        if quantity > MAX_MOVEMENT_QUANTITY {
            return Err(ServiceError::ValidationError(format!(
                "Quantity must not exceed {MAX_MOVEMENT_QUANTITY}"
            )));
        }

        let product_id = request.product_id;
        let description = request.description;
        let actor_id = actor.id;
        let enforce_floor = self.stock_policy.enforces_non_negative();

        let row = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let product = ProductRepository::find_with(txn, product_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Product"))?;

                if let Some(supplier_id) = supplier_id {
                    SupplierRepository::find_with(txn, supplier_id)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Supplier"))?;
                }

                let delta = kind.stock_direction() * quantity;
                let updated =
                    ProductRepository::adjust_stock(txn, product.id, delta, enforce_floor).await?;
                if updated == 0 {
                    return Err(if delta < 0 && enforce_floor {
                        ServiceError::InsufficientStock(format!(
                            "Insufficient stock for product {}: available {}, requested {}",
                            product.sku, product.stock_quantity, quantity
                        ))
                    } else {
                        ServiceError::StockLimitExceeded(format!(
                            "Stock limit exceeded for product {}: available {}, change {}",
                            product.sku, product.stock_quantity, delta
                        ))
                    });
                }

                let total_price = match kind {
                    TransactionType::ReturnToSupplier => Decimal::ZERO,
                    TransactionType::Purchase | TransactionType::Sale => {
                        round_money(product.price) * Decimal::from(quantity)
                    }
                };

                let now = Utc::now();
                let entry = transaction::ActiveModel {
                    total_products: Set(quantity),
                    total_price: Set(total_price),
                    transaction_type: Set(kind),
                    status: Set(kind.initial_status()),
                    description: Set(description),
                    user_id: Set(actor_id),
                    product_id: Set(product.id),
                    supplier_id: Set(supplier_id),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };

                TransactionRepository::insert(txn, entry).await
            })
        })
        .await
        .map_err(|e| {
            if matches!(
                e,
                ServiceError::InsufficientStock(_) | ServiceError::StockLimitExceeded(_)
            ) {
                warn!(product_id, quantity, kind = %kind, "Stock movement refused");
            }
            e
        })?;

        info!(
            transaction_id = row.id,
            product_id = row.product_id,
            kind = %row.transaction_type,
            quantity = row.total_products,
            "Stock movement recorded"
        );

        Ok(TransactionDto::from(row))
    }

    /// Newest-first ledger page, optionally filtered by free text.
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        page: u64,
        size: u64,
        search_text: Option<&str>,
    ) -> Result<Page<TransactionDto>, ServiceError> {
        let page = self.transactions.search(page, size, search_text).await?;
        Ok(page.map(TransactionDto::from))
    }

    /// Full record with product, actor and supplier summaries resolved.
    #[instrument(skip(self))]
    pub async fn get_transaction(&self, id: i64) -> Result<TransactionDto, ServiceError> {
        let row = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Transaction"))?;

        let product = self.products.find_by_id(row.product_id).await?;
        let user = self.users.find_by_id(row.user_id).await?;
        let supplier = match row.supplier_id {
            Some(supplier_id) => self.suppliers.find_by_id(supplier_id).await?,
            None => None,
        };

        Ok(TransactionDto::from(row)
            .with_product(product)
            .with_user(user)
            .with_supplier(supplier))
    }

    /// Rows created during the given calendar month (UTC), oldest first.
    #[instrument(skip(self))]
    pub async fn list_transactions_by_period(
        &self,
        month: u32,
        year: i32,
    ) -> Result<Vec<TransactionDto>, ServiceError> {
        let (from, until) = month_bounds(month, year)?;
        let rows = self.transactions.find_created_between(from, until).await?;
        Ok(rows.into_iter().map(TransactionDto::from).collect())
    }

    /// Sets a new status. Any status may follow any other; the change is
    /// logged so the ledger history can be reconstructed from the logs.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: i64,
        new_status: TransactionStatus,
    ) -> Result<TransactionDto, ServiceError> {
        let row = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Transaction"))?;

        let old_status = row.status;
        if old_status.is_terminal() && old_status != new_status {
            warn!(
                transaction_id = id,
                from = %old_status,
                to = %new_status,
                "Reopening a settled transaction"
            );
        }

        let mut active: transaction::ActiveModel = row.into();
        active.status = Set(new_status);
        active.updated_at = Set(Utc::now());

        let updated = self.transactions.update(active).await?;
        info!(
            transaction_id = id,
            from = %old_status,
            to = %new_status,
            "Transaction status changed"
        );

        Ok(TransactionDto::from(updated))
    }
}

/// Half-open UTC range covering one calendar month.
pub fn month_bounds(month: u32, year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    if !(1..=12).contains(&month) {
        return Err(ServiceError::ValidationError(
            "Month must be between 1 and 12".to_string(),
        ));
    }
    if !(1..=9999).contains(&year) {
        return Err(ServiceError::ValidationError(
            "Year must be between 1 and 9999".to_string(),
        ));
    }

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    Ok((first_instant(year, month)?, first_instant(next_year, next_month)?))
}

fn first_instant(year: i32, month: u32) -> Result<DateTime<Utc>, ServiceError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ServiceError::InternalError(format!("invalid month {}-{}", year, month)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Datelike;

    #[test]
    fn month_bounds_cover_exactly_one_month() {
        let (from, until) = month_bounds(2, 2024).unwrap();
        assert_eq!(from.to_rfc3339(), "2024-02-01T00:00:00+00:00");
        assert_eq!(until.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let (from, until) = month_bounds(12, 2023).unwrap();
        assert_eq!((from.year(), from.month()), (2023, 12));
        assert_eq!((until.year(), until.month()), (2024, 1));
    }

    #[test]
    fn month_bounds_reject_out_of_range_input() {
        assert_matches!(month_bounds(0, 2024), Err(ServiceError::ValidationError(_)));
        assert_matches!(month_bounds(13, 2024), Err(ServiceError::ValidationError(_)));
        assert_matches!(month_bounds(5, 0), Err(ServiceError::ValidationError(_)));
        assert_matches!(month_bounds(5, 10_000), Err(ServiceError::ValidationError(_)));
    }
}
