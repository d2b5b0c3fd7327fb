//! convert-service: turns photographed tables into CSV via a vision model.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
