pub mod chat;
pub mod coins;
