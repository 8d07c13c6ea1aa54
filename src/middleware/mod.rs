pub mod auth;
pub mod response;

pub use auth::{extract_bearer_token, Authorized};
pub use response::{ApiResponse, ApiResult, Deleted, DrinkList};
