//! OSB catalog model.

use crate::plan::PLANS;
use serde::Serialize;
use serde_json::{Value, json};

/// Name of the single service this broker offers.
pub const SERVICE_NAME: &str = "pgo-osb-service";

/// Provisioning parameter carrying the cluster name.
pub const PARAM_CLUSTER_NAME: &str = "CLUSTERNAME";

/// Provisioning parameter carrying the target namespace.
pub const PARAM_NAMESPACE: &str = "NAMESPACE";

/// `GET /v2/catalog` response body.
#[derive(Clone, Debug, Serialize)]
pub struct Catalog {
    pub services: Vec<CatalogService>,
}

/// A service offering.
#[derive(Clone, Debug, Serialize)]
pub struct CatalogService {
    pub id: String,
    pub name: String,
    pub description: String,
    pub bindable: bool,
    pub plan_updateable: bool,
    pub metadata: Value,
    pub plans: Vec<CatalogPlan>,
}

/// A plan within a service offering.
#[derive(Clone, Debug, Serialize)]
pub struct CatalogPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub free: bool,
    pub schemas: Value,
}

impl Catalog {
    /// Build the catalog for a broker identified by `service_id`.
    pub fn build(service_id: &str) -> Self {
        let schemas = provision_schema();
        let plans = PLANS
            .iter()
            .map(|plan| CatalogPlan {
                id: plan.id.to_string(),
                name: plan.name.to_string(),
                description: plan.description.to_string(),
                free: true,
                schemas: schemas.clone(),
            })
            .collect();

        Self {
            services: vec![CatalogService {
                id: service_id.to_string(),
                name: SERVICE_NAME.to_string(),
                description: "PostgreSQL clusters managed by the postgres operator".to_string(),
                bindable: true,
                plan_updateable: false,
                metadata: json!({
                    "displayName": "pgo osb service",
                    "imageUrl": "https://avatars2.githubusercontent.com/u/19862012?s=200&v=4",
                }),
                plans,
            }],
        }
    }

    /// IDs of every advertised plan, in catalog order.
    pub fn plan_ids(&self) -> Vec<&str> {
        self.services
            .iter()
            .flat_map(|svc| svc.plans.iter().map(|plan| plan.id.as_str()))
            .collect()
    }
}

/// JSON schema advertised for provisioning parameters.
fn provision_schema() -> Value {
    json!({
        "service_instance": {
            "create": {
                "parameters": {
                    "$schema": "http://json-schema.org/draft-04/schema#",
                    "type": "object",
                    "properties": {
                        PARAM_CLUSTER_NAME: { "type": "string" },
                        PARAM_NAMESPACE: { "type": "string" },
                    },
                    "required": [PARAM_CLUSTER_NAME, PARAM_NAMESPACE],
                }
            }
        }
    })
}
