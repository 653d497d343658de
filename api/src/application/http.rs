pub mod food_analysis;
pub mod health;
pub mod image_upload;
pub mod server;
pub mod session;
