/// Transaction models
///
/// A transaction is a member's report of a payment made for a period. Admins
/// move it through `sent -> on_process -> completed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Payment, Periode, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Sent,
    OnProcess,
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Sent => "sent",
            TransactionStatus::OnProcess => "on_process",
            TransactionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(TransactionStatus::Sent),
            "on_process" => Ok(TransactionStatus::OnProcess),
            "completed" => Ok(TransactionStatus::Completed),
            other => Err(format!("unknown transaction status '{}'", other)),
        }
    }
}

/// User reference embedded in transaction responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleUser {
    pub id: i64,
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub user_type: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionOut {
    pub id: i64,
    pub amount: f64,
    pub transaction_date: DateTime<Utc>,
    pub bukti_transfer_url: Option<String>,
    pub status: TransactionStatus,
    pub reported_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub reported_by: Option<SimpleUser>,
    pub confirmed_by: Option<SimpleUser>,
    pub payment: Option<Payment>,
    pub periode: Option<Periode>,
}
