//! Mounted filesystems

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::{DigError, Result};
use async_trait::async_trait;

pub const NAME: &str = "mount";
const DESCRIPTION: &str = "Mount shows all mounted devices in the container.";
const ALIASES: &[&str] = &["mounts", "mn"];

const MOUNTS_PATH: &str = "/proc/mounts";

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(MountBucket))
}

pub struct MountBucket;

#[async_trait]
impl Bucket for MountBucket {
    async fn run(&self) -> Result<Results> {
        let content = std::fs::read_to_string(MOUNTS_PATH)?;
        let mounts = parse_mounts(&content)?;

        let mut res = Results::new(NAME);
        res.set_headers(["device", "path", "filesystem", "flags"]);
        for m in &mounts {
            res.add_content(vec![
                Value::from(&m.device),
                Value::from(&m.path),
                Value::from(&m.filesystem),
                Value::from(&m.flags),
            ]);
        }
        res.add_comment(format!("{} devices are mounted.", mounts.len()));
        Ok(res)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub device: String,
    pub path: String,
    pub filesystem: String,
    pub flags: String,
}

/// Parse the content of /proc/mounts
pub fn parse_mounts(content: &str) -> Result<Vec<Mount>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let parts: Vec<&str> = line.splitn(5, ' ').collect();
            if parts.len() != 5 {
                return Err(DigError::bucket(format!("malformed mount entry: {line:?}")));
            }
            Ok(Mount {
                device: parts[0].to_string(),
                path: parts[1].to_string(),
                filesystem: parts[2].to_string(),
                flags: parts[3].to_string(),
            })
        })
        .collect()
}
