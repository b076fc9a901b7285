pub mod fixtures;
pub mod lookup;

#[allow(unused_imports)]
pub use lookup::StaticLookup;

use osbridge_executor::{HttpClientSource, RemoteExecutor, RemoteSettings};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Label key used by every remote executor built in tests.
#[allow(dead_code)]
pub const LABEL_KEY: &str = "pgo-osb-instance";

/// Build a remote executor pointed at `base_url` with a plain HTTP client.
#[allow(dead_code)]
pub async fn remote_executor(base_url: &str, lookup: Arc<StaticLookup>) -> RemoteExecutor {
    let settings = RemoteSettings {
        apiserver_url: Url::parse(base_url).unwrap(),
        client_version: "4.0.1".to_string(),
        username: "pgoadmin".to_string(),
        password: "examplepassword".to_string(),
        request_timeout: Duration::from_secs(5),
        instance_label_key: LABEL_KEY.to_string(),
    };
    RemoteExecutor::new(settings, HttpClientSource::Fixed(reqwest::Client::new()), lookup)
        .await
        .unwrap()
}
