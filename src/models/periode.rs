use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A named payment period
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Periode {
    pub id: i64,
    pub periode_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
