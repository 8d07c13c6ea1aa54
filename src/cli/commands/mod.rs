pub mod reset;
pub mod serve;
