mod auth;
mod health_check;
mod payments;
mod periodes;
mod transactions;
mod users;

pub use auth::{delete_user, login, logout, profile, refresh, register};
pub use health_check::{live, root};
pub use payments::{create_payment, delete_payment, list_payments, update_payment};
pub use periodes::{create_periode, delete_periode, list_periodes, update_periode};
pub use transactions::{
    create_transaction, delete_transaction, list_transactions, update_transaction_status,
};
pub use users::{get_user, list_users};
