pub mod auth;
pub mod finance;
pub mod quotes;
pub mod sellers;
