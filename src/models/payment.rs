use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A payment method transactions are made against
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: i64,
    pub payment_name: String,
    pub payment_type: String,
    pub created_at: DateTime<Utc>,
}
