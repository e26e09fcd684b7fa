pub mod client;
pub mod config;
pub mod format;
pub mod kiosk;
pub mod model;
pub mod patch;
pub mod surface;
