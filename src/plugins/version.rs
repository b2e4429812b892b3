//! API server version

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::Result;
use async_trait::async_trait;
use kube::Client;

pub const NAME: &str = "version";
const DESCRIPTION: &str = "Version dumps the API server version informations.";
const ALIASES: &[&str] = &["versions"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(
        BucketInfo::new(NAME, DESCRIPTION, new_bucket)
            .with_aliases(ALIASES)
            .requires_client(),
    )
}

pub fn new_bucket(config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(VersionBucket {
        client: config.client()?,
    }))
}

pub struct VersionBucket {
    client: Client,
}

#[async_trait]
impl Bucket for VersionBucket {
    async fn run(&self) -> Result<Results> {
        let info = self.client.apiserver_version().await?;

        let mut res = Results::new(NAME);
        res.set_headers(["gitVersion", "buildDate", "platform", "goVersion"]);
        res.add_content(vec![
            Value::from(info.git_version),
            Value::from(info.build_date),
            Value::from(info.platform),
            Value::from(info.go_version),
        ]);
        Ok(res)
    }
}
