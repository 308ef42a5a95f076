pub mod chatdb;
pub mod contractdb;
pub mod db;
pub mod orderdb;
pub mod paymentdb;
pub mod userdb;
