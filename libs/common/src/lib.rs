//! Common library for the Wavehouse backend
//!
//! This crate provides shared functionality used across the Wavehouse
//! services: database connectivity and the shared database error type.

pub mod database;
pub mod error;
