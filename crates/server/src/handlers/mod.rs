//! HTTP request handlers.

pub mod bindings;
pub mod catalog;
pub mod common;
pub mod health;
pub mod instances;

pub use bindings::*;
pub use catalog::*;
pub use common::*;
pub use health::*;
pub use instances::*;
