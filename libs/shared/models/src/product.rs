use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An item of household health inventory (supplements, devices, supplies).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub family_id: Uuid,
    pub member_id: Option<Uuid>,
    pub name: String,
    pub category: String,
    pub stock_quantity: i32,
    pub unit: String,
    pub expiry_date: Option<NaiveDate>,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
