pub mod add;
pub mod checkin;
pub mod config;
pub mod del;
pub mod import;
pub mod init;
pub mod list;
pub mod log;
pub mod operator;
pub mod qr;
pub mod send;
pub mod session;
pub mod sync;
