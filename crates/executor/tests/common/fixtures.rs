//! Canned cluster-management API responses.

#![allow(dead_code)]

use serde_json::{Value, json};

pub const INSTANCE_ID: &str = "inst-1";
pub const BIND_ID: &str = "a7cb6bd8-cf67-400f-805c-019e85eac3bf";
pub const BIND_USER: &str = "useru7fwxwgpm5aa7ac4agpil2wdx4";
pub const SELECTOR: &str = "pgo-osb-instance=inst-1";
pub const NAMESPACE: &str = "demo";

pub fn ok(results: Value) -> Value {
    json!({"status": {"code": "ok", "msg": ""}, "results": results})
}

pub fn rejected(msg: &str) -> Value {
    json!({"status": {"code": "error", "msg": msg}, "results": []})
}

pub fn service(external_ip: &str) -> Value {
    json!({
        "name": "unitinstance",
        "clusterName": "unitinstance",
        "clusterIP": "10.96.0.12",
        "externalIP": external_ip
    })
}

pub fn cluster(services: Vec<Value>) -> Value {
    json!({"database": "userdb", "services": services})
}

pub fn users(usernames: &[&str]) -> Value {
    let secrets: Vec<Value> = usernames
        .iter()
        .map(|u| json!({"name": format!("unitinstance-{u}-secret"), "username": u, "password": format!("pw-{u}")}))
        .collect();
    json!([{"clusterName": "unitinstance", "secrets": secrets}])
}
