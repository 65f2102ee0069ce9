/// Domain models
///
/// Plain data types shared by the stores and the route handlers.

mod payment;
mod periode;
mod transaction;
mod user;

pub use payment::Payment;
pub use periode::Periode;
pub use transaction::{SimpleUser, TransactionOut, TransactionStatus};
pub use user::{NewUser, Role, User};
