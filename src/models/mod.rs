pub mod attendee;
pub mod operator;
pub mod session;
