//! Core types and shared logic for Pinmark.
//!
//! This crate defines what every other crate agrees on:
//! - Application configuration
//! - Image filename rules (allow-list, marked names, public URLs)
//! - Image inspection and circle marker rendering

pub mod config;
pub mod error;
pub mod filename;
pub mod marker;

pub use error::{Error, Result};
pub use filename::{is_allowed_image, marked_filename, public_url, sanitize_upload_name};
pub use marker::{Dimensions, MarkerColor, MarkerStyle};
