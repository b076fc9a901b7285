//! Executor backends.

pub mod mock;
pub mod remote;
