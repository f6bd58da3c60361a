pub mod accounts;
pub mod error;
pub mod identity;
pub mod profile;
pub mod server;
