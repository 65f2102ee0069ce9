/// Authentication module
///
/// Password hashing, access/refresh token issuance and verification,
/// refresh token revocation and role-based access checks.

mod claims;
mod guard;
mod password;
mod revocation;
mod tokens;

pub use claims::{Claims, TokenKind};
pub use guard::{bearer_token, require_role, require_self_or_role, AccessGuard};
pub use password::{hash_password, verify_password};
pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use tokens::TokenService;
