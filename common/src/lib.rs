//! Shared building blocks for the 96sooq backend.
//!
//! - [`config`]: process-wide settings resolved once at startup
//! - [`errors`]: the error taxonomy and its HTTP mapping
//! - [`response`]: the JSON envelope every endpoint answers with
//! - [`middleware`]: request-scoped middleware
//! - [`models`]: typed entities stored in Supabase
//! - [`db`]: the Supabase data access adapter

pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;

pub use config::AppConfig;
pub use errors::{AppError, AppResult};
