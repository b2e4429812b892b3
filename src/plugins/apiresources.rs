//! API resources served by the cluster

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::Result;
use async_trait::async_trait;
use kube::discovery::{Discovery, Scope};
use kube::Client;

pub const NAME: &str = "apiresources";
const DESCRIPTION: &str = "APIResources discovers the available APIs of the cluster.";
const ALIASES: &[&str] = &["api", "apiresource"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(
        BucketInfo::new(NAME, DESCRIPTION, new_bucket)
            .with_aliases(ALIASES)
            .requires_client(),
    )
}

pub fn new_bucket(config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(ApiResourcesBucket {
        client: config.client()?,
    }))
}

pub struct ApiResourcesBucket {
    client: Client,
}

#[async_trait]
impl Bucket for ApiResourcesBucket {
    async fn run(&self) -> Result<Results> {
        let discovery = Discovery::new(self.client.clone()).run().await?;

        let mut rows: Vec<(String, String, bool)> = discovery
            .groups()
            .flat_map(|group| group.recommended_resources())
            .map(|(ar, caps)| (ar.kind, ar.api_version, caps.scope == Scope::Namespaced))
            .collect();
        rows.sort_by(|a, b| (&a.1, &a.0).cmp(&(&b.1, &b.0)));

        let mut res = Results::new(NAME);
        res.set_headers(["kind", "apiVersion", "namespaced"]);
        for (kind, api_version, namespaced) in rows {
            res.add_content(vec![Value::from(kind), Value::from(api_version), Value::from(namespaced)]);
        }
        Ok(res)
    }
}
