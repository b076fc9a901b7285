use async_trait::async_trait;
use osbridge_executor::{ClusterLookup, ExecutorResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cluster lookup answering from a fixed selector table.
#[derive(Default)]
pub struct StaticLookup {
    namespaces: Mutex<HashMap<String, Vec<String>>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `selector` with `namespaces`.
    pub fn with(self, selector: &str, namespaces: &[&str]) -> Self {
        self.namespaces.lock().unwrap().insert(
            selector.to_string(),
            namespaces.iter().map(|ns| ns.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterLookup for StaticLookup {
    async fn namespaces_for_selector(&self, selector: &str) -> ExecutorResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .namespaces
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }
}
