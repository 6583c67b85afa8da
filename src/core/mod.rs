pub mod auth;
pub mod checkin;
pub mod dispatch;
pub mod log;
pub mod normalizer;
pub mod store;
