pub mod chat;
pub mod contract;
pub mod order;
pub mod payment;
