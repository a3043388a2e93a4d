pub mod config;
pub mod error;
mod html;
pub mod inquiries;
pub mod notifications;
pub mod telemetry;
