//! Picstash - image metadata backend
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod images;
pub mod media;
pub mod server;
