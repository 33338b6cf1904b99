pub mod auth;
pub mod message;
pub mod quiet_hours;
