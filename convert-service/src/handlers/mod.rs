//! HTTP handlers for the convert service.

pub mod convert;
pub mod health;
