pub mod auth;
pub mod classifier;
pub mod commission;
pub mod document_service;
pub mod finance_service;
pub mod migration_service;
pub mod quote_service;
pub mod seller_service;
