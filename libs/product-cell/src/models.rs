use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::{AppError, FieldErrors};
use shared_models::patch::{check_nullable_date, nullable, Nullable};
use shared_models::product::Product;
use shared_models::validation::{check_date, require_text};
use shared_summary::{product_expiry_state, ExpiryState};

pub const DEFAULT_CATEGORY: &str = "medical";
pub const DEFAULT_UNIT: &str = "ea";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub member_id: Option<Uuid>,
    pub name: String,
    pub category: Option<String>,
    pub stock_quantity: Option<i32>,
    pub unit: Option<String>,
    pub expiry_date: Option<String>,
    pub purchase_date: Option<String>,
    pub notes: Option<String>,
}

/// Parsed `(expiry_date, purchase_date)`.
pub type ProductDates = (Option<NaiveDate>, Option<NaiveDate>);

impl CreateProductRequest {
    pub fn validate(&self) -> Result<ProductDates, AppError> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "name", &self.name, 100);
        check_optional_text(&mut errors, "category", self.category.as_deref(), 50);
        check_optional_text(&mut errors, "unit", self.unit.as_deref(), 20);
        check_stock(&mut errors, self.stock_quantity);
        let dates = check_dates(&mut errors, &self.expiry_date, &self.purchase_date);
        errors.into_result()?;
        Ok(dates)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub stock_quantity: Option<i32>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Nullable<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub purchase_date: Nullable<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub notes: Nullable<String>,
}

/// Parsed `(expiry_date, purchase_date)` of an update, `Some(None)` meaning cleared.
pub type ProductDateChanges = (Nullable<NaiveDate>, Nullable<NaiveDate>);

impl UpdateProductRequest {
    pub fn validate(&self) -> Result<ProductDateChanges, AppError> {
        let mut errors = FieldErrors::new();
        check_optional_text(&mut errors, "name", self.name.as_deref(), 100);
        check_optional_text(&mut errors, "category", self.category.as_deref(), 50);
        check_optional_text(&mut errors, "unit", self.unit.as_deref(), 20);
        check_stock(&mut errors, self.stock_quantity);
        let expiry = check_nullable_date(&mut errors, "expiry_date", &self.expiry_date);
        let purchase = check_nullable_date(&mut errors, "purchase_date", &self.purchase_date);
        errors.into_result()?;
        Ok((expiry, purchase))
    }
}

fn check_optional_text(errors: &mut FieldErrors, field: &str, value: Option<&str>, max_len: usize) {
    if let Some(value) = value {
        require_text(errors, field, value, max_len);
    }
}

fn check_stock(errors: &mut FieldErrors, stock: Option<i32>) {
    if stock.is_some_and(|stock| stock < 0) {
        errors.add("stock_quantity", "must not be negative");
    }
}

fn check_dates(
    errors: &mut FieldErrors,
    expiry: &Option<String>,
    purchase: &Option<String>,
) -> ProductDates {
    let expiry = expiry
        .as_deref()
        .and_then(|raw| check_date(errors, "expiry_date", raw));
    let purchase = purchase
        .as_deref()
        .and_then(|raw| check_date(errors, "purchase_date", raw));
    (expiry, purchase)
}

/// A product with its expiry flags computed for the moment of the read.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    #[serde(flatten)]
    pub expiry: ExpiryState,
}

impl ProductView {
    pub fn at(product: Product, now: DateTime<Utc>) -> Self {
        let expiry = product_expiry_state(product.expiry_date, now);
        Self { product, expiry }
    }
}
