//! Core domain types and shared logic for the osbridge service broker.
//!
//! This crate defines the pieces every other crate agrees on:
//! - Binding identifier compaction (UUID to short, identifier-safe tokens)
//! - The static plan table and plan resolution
//! - The OSB catalog model
//! - Configuration types

pub mod catalog;
pub mod config;
pub mod error;
pub mod ident;
pub mod plan;

pub use catalog::{Catalog, CatalogPlan, CatalogService};
pub use error::{Error, Result};
pub use ident::{BINDING_USER_PREFIX, binding_username, compact_uuid, is_binding_username};
pub use plan::{
    DEFAULT_PLAN_ID, PLANS, PlanConfig, PlanDefinition, ResourceTier, StorageTier, find_plan,
    resolve_plan,
};

/// Port advertised in binding credentials.
pub const DATABASE_PORT: u16 = 5432;

/// URI scheme for generated connection strings.
pub const DATABASE_URI_SCHEME: &str = "postgresql";
