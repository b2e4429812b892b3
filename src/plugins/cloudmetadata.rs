//! Cloud provider metadata endpoints reachability

use crate::bucket::fanout::{gather, TimeoutPolicy, Verdict};
use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::{DigError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

pub const NAME: &str = "cloudmetadata";
const DESCRIPTION: &str = "Cloudmetadata scans the usual metadata endpoints in public clouds.";
const ALIASES: &[&str] = &["cloud", "meta"];

const BUDGET: Duration = Duration::from_millis(100);

pub const ENDPOINTS: &[(&str, &str)] = &[
    ("AWS", "http://169.254.169.254/latest"),
    ("Alibaba", "http://100.100.100.200/latest/meta-data/"),
    ("Azure", "http://169.254.169.254/metadata/v1/maintenance"),
    ("DigitalOcean", "http://169.254.169.254/metadata/v1.json"),
    ("GoogleCloud", "http://metadata.google.internal/computeMetadata/"),
    ("OpenStack", "http://169.254.169.254/openstack"),
    ("OracleCloud", "http://192.0.0.192/latest/"),
    ("PacketCloud", "https://metadata.packet.net/userdata"),
];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    let endpoints = ENDPOINTS
        .iter()
        .map(|(provider, url)| (provider.to_string(), url.to_string()))
        .collect();
    Ok(Box::new(CloudMetadataBucket::with_endpoints(endpoints, BUDGET)?))
}

pub struct CloudMetadataBucket {
    http: reqwest::Client,
    endpoints: Vec<(String, String)>,
    budget: Duration,
}

impl CloudMetadataBucket {
    /// Query `(provider, url)` pairs, each bounded by `budget`
    pub fn with_endpoints(endpoints: Vec<(String, String)>, budget: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(budget)
            .build()
            .map_err(|e| DigError::bucket(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, endpoints, budget })
    }
}

#[async_trait]
impl Bucket for CloudMetadataBucket {
    async fn run(&self) -> Result<Results> {
        let items = self
            .endpoints
            .iter()
            .map(|(provider, url)| (provider.clone(), (self.http.clone(), url.clone())))
            .collect();
        let outcomes = gather(items, self.budget, TimeoutPolicy::Fail, |(http, url)| query(http, url)).await;

        let mut res = Results::new(NAME);
        res.set_headers(["cloudProvider", "success", "url", "error"]);
        for (outcome, (_, url)) in outcomes.into_iter().zip(&self.endpoints) {
            res.add_content(vec![
                Value::from(outcome.label),
                Value::from(outcome.success),
                Value::from(url),
                Value::from(outcome.detail.unwrap_or_default()),
            ]);
        }
        Ok(res)
    }
}

async fn query(http: reqwest::Client, url: String) -> Verdict {
    match http.get(&url).send().await {
        Ok(resp) if resp.status() == StatusCode::OK => Verdict::pass(),
        Ok(resp) if resp.status() == StatusCode::NOT_FOUND => Verdict::fail("not found"),
        Ok(resp) => Verdict::fail(format!("unexpected status {}", resp.status())),
        Err(e) => Verdict::fail(e.to_string()),
    }
}
