//! HTTP request handlers.

pub mod catalog;
pub mod common;
pub mod images;
pub mod records;

pub use catalog::*;
pub use common::*;
pub use images::*;
pub use records::*;
