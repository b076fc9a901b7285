//! Service plans and their sizing.
//!
//! Plan IDs are published through the catalog and pinned by platform operators.
//! Never change or reuse an ID once it has shipped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Container resource tier requested for a cluster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceTier {
    /// Let the cluster manager apply its own defaults.
    #[default]
    Default,
    Small,
    Medium,
    Large,
}

impl ResourceTier {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for ResourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage tier requested for a cluster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    #[default]
    Default,
    Small,
    Medium,
    Large,
}

impl StorageTier {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizing applied when a cluster is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    pub resource_tier: ResourceTier,
    pub storage_tier: StorageTier,
    pub replica_count: u32,
}

impl PlanConfig {
    const fn new(resource_tier: ResourceTier, storage_tier: StorageTier, replica_count: u32) -> Self {
        Self {
            resource_tier,
            storage_tier,
            replica_count,
        }
    }
}

/// A plan as published in the catalog.
#[derive(Clone, Copy, Debug)]
pub struct PlanDefinition {
    /// Stable plan ID (external contract).
    pub id: &'static str,
    /// Stable plan name (external contract).
    pub name: &'static str,
    pub description: &'static str,
    pub config: PlanConfig,
}

/// ID of the plan used when nothing more specific applies.
pub const DEFAULT_PLAN_ID: &str = "86064792-7ea2-467b-af93-ac9694d96d5c";

/// Every plan the broker offers.
pub const PLANS: &[PlanDefinition] = &[
    PlanDefinition {
        id: DEFAULT_PLAN_ID,
        name: "default",
        description: "The default plan for the pgo osb service",
        config: PlanConfig::new(ResourceTier::Default, StorageTier::Default, 0),
    },
    PlanDefinition {
        id: "885a1cb6-ca42-43e9-a725-8195918e1343",
        name: "standalone_sm",
        description: "Small postgres server, no replicas",
        config: PlanConfig::new(ResourceTier::Small, StorageTier::Small, 0),
    },
    PlanDefinition {
        id: "dc951396-bb28-45a4-b040-cfe3bebc6121",
        name: "standalone_md",
        description: "Medium postgres server, no replicas",
        config: PlanConfig::new(ResourceTier::Medium, StorageTier::Medium, 0),
    },
    PlanDefinition {
        id: "04349656-4dc9-4b67-9b15-52a93d64d566",
        name: "standalone_lg",
        description: "Large postgres server, no replicas",
        config: PlanConfig::new(ResourceTier::Large, StorageTier::Large, 0),
    },
    PlanDefinition {
        id: "877432f8-07eb-4e57-b984-d025a71d2282",
        name: "ha_sm",
        description: "Small postgres server with replicas",
        config: PlanConfig::new(ResourceTier::Small, StorageTier::Small, 2),
    },
    PlanDefinition {
        id: "89bcdf8a-e637-4bb3-b7ce-aca083cc1e69",
        name: "ha_md",
        description: "Medium postgres server with replicas",
        config: PlanConfig::new(ResourceTier::Medium, StorageTier::Medium, 2),
    },
    PlanDefinition {
        id: "470ca1a0-2763-41f1-a4cf-985acdb549ab",
        name: "ha_lg",
        description: "Large postgres server with replicas",
        config: PlanConfig::new(ResourceTier::Large, StorageTier::Large, 2),
    },
];

/// Look up a plan definition by ID.
pub fn find_plan(plan_id: &str) -> Option<&'static PlanDefinition> {
    PLANS.iter().find(|plan| plan.id == plan_id)
}

/// Resolve the sizing for a plan ID.
///
/// Unknown IDs resolve to [`PlanConfig::default`] so a catalog that drifted
/// from this table still provisions.
pub fn resolve_plan(plan_id: &str) -> PlanConfig {
    match find_plan(plan_id) {
        Some(plan) => plan.config,
        None => {
            tracing::debug!(plan_id = %plan_id, "Unknown plan ID, using default sizing");
            PlanConfig::default()
        }
    }
}
