//! PID namespace of the container

use super::processes::{list_processes, ProcessEntry};
use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::Result;
use async_trait::async_trait;
use std::os::unix::fs::MetadataExt;

pub const NAME: &str = "pidnamespace";
const DESCRIPTION: &str = "PIDnamespace analyses the PID namespace of the container in the context of Kubernetes.";
const ALIASES: &[&str] = &["pidnamespaces", "pidns"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(PidNamespaceBucket))
}

pub struct PidNamespaceBucket;

#[async_trait]
impl Bucket for PidNamespaceBucket {
    async fn run(&self) -> Result<Results> {
        let device_number = std::fs::symlink_metadata("/proc/1/ns/pid")?.dev();
        let processes = list_processes()?;
        let (kubelet_found, pause_found) = scan(&processes);

        let mut res = Results::new(NAME);
        res.set_headers(["deviceNumber", "kubeletFound", "pauseFound"]);
        if let Some(comment) = namespace_comment(kubelet_found, pause_found) {
            res.add_comment(comment);
        }
        res.add_content(vec![
            Value::from(device_number),
            Value::from(kubelet_found),
            Value::from(pause_found),
        ]);
        Ok(res)
    }
}

/// Whether the kubelet and pause processes are visible
pub fn scan(processes: &[ProcessEntry]) -> (bool, bool) {
    let kubelet = processes.iter().any(|p| p.name == "kubelet");
    let pause = processes.iter().any(|p| p.name == "pause");
    (kubelet, pause)
}

pub fn namespace_comment(kubelet_found: bool, pause_found: bool) -> Option<String> {
    let mut parts = Vec::new();
    if pause_found {
        parts.push("the pause process was found, pod might have shareProcessNamespace to true");
    }
    if kubelet_found {
        parts.push("the kubelet process was found, pod might have hostPID to true");
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}
