//! services/api/src/lib.rs
//!
//! The habit tracker web service: configuration, store and chart adapters,
//! and the axum HTTP surface.

pub mod adapters;
pub mod config;
pub mod error;
pub mod markup;
pub mod web;
