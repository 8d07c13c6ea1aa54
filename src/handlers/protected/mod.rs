// handlers/protected/mod.rs - Protected handlers (bearer token + permission required)

pub mod drinks;

pub use drinks::create as drinks_create;
pub use drinks::delete as drinks_delete;
pub use drinks::detail as drinks_detail;
pub use drinks::update as drinks_update;
