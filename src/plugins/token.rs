//! Mounted service account token

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::client::SERVICE_ACCOUNT_DIR;
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub const NAME: &str = "token";
const DESCRIPTION: &str = "Token checks for the presence of a service account token in the filesystem.";
const ALIASES: &[&str] = &["tokens", "tk"];

pub const TOKEN_PATH: &str = SERVICE_ACCOUNT_DIR;

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(TokenBucket::new(TOKEN_PATH)))
}

pub struct TokenBucket {
    root: PathBuf,
}

impl TokenBucket {
    /// Bucket reading the service account files under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, file: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.root.join(file))?)
    }
}

#[async_trait]
impl Bucket for TokenBucket {
    async fn run(&self) -> Result<Results> {
        let mut res = Results::new(NAME);
        if !Path::new(&self.root).exists() {
            res.add_comment("No service account token was found in the local file system.");
            return Ok(res);
        }

        res.add_comment("A service account token is mounted.");
        res.set_headers(["namespace", "token", "CA"]);
        let namespace = self.read("namespace")?;
        let token = self.read("token")?;
        let ca = self.read("ca.crt")?;
        res.add_content(vec![Value::from(namespace), Value::from(token), Value::from(ca)]);
        Ok(res)
    }
}
