pub mod health_service;
pub mod message_service;
pub mod release_service;
pub mod settings_service;
