/// Authentication module
///
/// Password hashing, bearer extraction, access-token signing/validation,
/// refresh-token records, and the session flows built on top of them.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use bearer::extract_bearer;
pub use claims::{Claims, ISSUER};
pub use jwt::issue_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::hash_token;
pub use refresh_token::RefreshTokenRecord;
pub use session::{LoginSession, SessionService};
