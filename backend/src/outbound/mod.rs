//! Outbound adapters implementing the store port.
//!
//! - **persistence**: PostgreSQL via Diesel
//! - **memory**: in-process tables for development and tests

pub mod memory;
pub mod persistence;
