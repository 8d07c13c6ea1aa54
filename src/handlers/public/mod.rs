// handlers/public/mod.rs - Public handlers (no authentication)

pub mod drinks;
pub mod health;

pub use drinks::list as drinks_list;
pub use health::health;
