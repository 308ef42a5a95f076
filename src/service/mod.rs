pub mod contract_service;
pub mod error;
pub mod order_resolver;
pub mod payment_service;
