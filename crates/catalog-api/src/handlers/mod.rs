//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod auth;
pub mod health;
pub mod products;
pub mod users;

use crate::error::AppError;
use uuid::Uuid;

/// Parse a path id, reporting `Invalid <kind> ID` on failure
pub(crate) fn parse_id(raw: &str, kind: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid {kind} ID")))
}
