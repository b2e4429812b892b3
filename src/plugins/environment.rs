//! Kubernetes related environment variables

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::client::KUBERNETES_HOST_ENV;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

pub const NAME: &str = "environment";
const DESCRIPTION: &str = "Environment checks the presence of kubernetes related environment variables and shows them.";
const ALIASES: &[&str] = &["environments", "environ", "env"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(EnvironmentBucket))
}

pub struct EnvironmentBucket;

#[async_trait]
impl Bucket for EnvironmentBucket {
    async fn run(&self) -> Result<Results> {
        let mut res = Results::new(NAME);
        res.set_headers(["name", "value"]);
        for (name, value) in kube_environ(std::env::vars_os().map(|(k, v)| {
            (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned())
        })) {
            res.add_content(vec![Value::from(name), Value::from(value)]);
        }

        if std::env::var_os(KUBERNETES_HOST_ENV).is_some() {
            res.add_comment(format!(
                "Typical Kubernetes API service env var {KUBERNETES_HOST_ENV} was found, we might be running inside a pod."
            ));
        } else {
            res.add_comment(format!(
                "Typical Kubernetes API service env var {KUBERNETES_HOST_ENV} was not found, we might not be running inside a pod."
            ));
        }
        Ok(res)
    }
}

/// Variables whose name contains `KUBE`, sorted by name
pub fn kube_environ<I>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter().filter(|(name, _)| name.contains("KUBE")).collect()
}
