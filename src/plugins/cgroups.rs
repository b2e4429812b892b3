//! Control groups of the current process

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::{DigError, Result};
use async_trait::async_trait;

pub const NAME: &str = "cgroups";
const DESCRIPTION: &str = "Cgroups reads the /proc/self/cgroup files that can leak information under cgroups v1.";
const ALIASES: &[&str] = &["cgroup", "cg"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(CgroupsBucket))
}

pub struct CgroupsBucket;

#[async_trait]
impl Bucket for CgroupsBucket {
    async fn run(&self) -> Result<Results> {
        let content = std::fs::read_to_string("/proc/self/cgroup")?;
        let cgroups = parse_cgroups(&content)?;

        let mut res = Results::new(NAME);
        if cgroups.len() <= 1 {
            res.add_comment("This kernel might use cgroups v2, thus explaining the lack of information.");
        }
        res.set_headers(["hierarchyID", "controllerList", "cgroupPath"]);
        for cgroup in cgroups {
            res.add_content(vec![
                Value::from(cgroup.hierarchy_id),
                Value::from(cgroup.controllers),
                Value::from(cgroup.path),
            ]);
        }
        Ok(res)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cgroup {
    pub hierarchy_id: String,
    pub controllers: String,
    pub path: String,
}

/// Parse `hierarchy-ID:controller-list:cgroup-path` lines. The path may
/// itself contain colons.
pub fn parse_cgroups(content: &str) -> Result<Vec<Cgroup>> {
    content
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(id), Some(controllers), Some(path)) => Ok(Cgroup {
                    hierarchy_id: id.to_string(),
                    controllers: controllers.to_string(),
                    path: path.to_string(),
                }),
                _ => Err(DigError::bucket(
                    "format of /proc/self/cgroup file is incorrect, missing colons",
                )),
            }
        })
        .collect()
}
