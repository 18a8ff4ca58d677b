pub mod auth;
pub mod response;

pub use auth::{authenticate, require_admin, CurrentUser};
pub use response::{ApiResponse, ApiResult};
