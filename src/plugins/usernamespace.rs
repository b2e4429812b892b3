//! User namespace mappings

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::{DigError, Result};
use async_trait::async_trait;

pub const NAME: &str = "usernamespace";
const DESCRIPTION: &str = "UserNamespace analyses the user namespace configuration.";
const ALIASES: &[&str] = &["usernamespaces", "userns"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(UserNamespaceBucket))
}

pub struct UserNamespaceBucket;

#[async_trait]
impl Bucket for UserNamespaceBucket {
    async fn run(&self) -> Result<Results> {
        let content = std::fs::read_to_string("/proc/self/uid_map")?;
        let mappings = parse_id_map(&content)?;

        let mut res = Results::new(NAME);
        res.set_headers(["containerID", "hostID", "range"]);
        for m in &mappings {
            res.add_content(vec![Value::from(m.container_id), Value::from(m.host_id), Value::from(m.range)]);
        }
        if is_active(&mappings) {
            res.add_comment("User namespace is active.");
        } else {
            res.add_comment("User namespace is not active.");
        }
        Ok(res)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMapping {
    pub container_id: u32,
    pub host_id: u32,
    pub range: u32,
}

/// Parse /proc/<pid>/uid_map or gid_map
pub fn parse_id_map(content: &str) -> Result<Vec<IdMapping>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<u32> = line
                .split_whitespace()
                .map(str::parse)
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| DigError::bucket(format!("malformed id map line {line:?}: {e}")))?;
            match fields[..] {
                [container_id, host_id, range] => Ok(IdMapping {
                    container_id,
                    host_id,
                    range,
                }),
                _ => Err(DigError::bucket(format!("malformed id map line {line:?}"))),
            }
        })
        .collect()
}

/// The initial namespace maps the full id range onto itself
pub fn is_active(mappings: &[IdMapping]) -> bool {
    !matches!(
        mappings,
        [IdMapping {
            container_id: 0,
            host_id: 0,
            range: u32::MAX,
        }]
    )
}
