//! Hints that the process runs inside a container

use super::mount::{parse_mounts, Mount};
use super::processes::{list_processes, ProcessEntry};
use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::Result;
use async_trait::async_trait;
use std::os::unix::fs::MetadataExt;

pub const NAME: &str = "containerdetect";
const DESCRIPTION: &str = "ContainerDetect retrieves hints that the process is running inside a typical container.";
const ALIASES: &[&str] = &["container", "cdetect"];

const FSTAB_PATH: &str = "/etc/fstab";
const BOOT_PATH: &str = "/boot";

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(ContainerDetectBucket))
}

pub struct ContainerDetectBucket;

#[async_trait]
impl Bucket for ContainerDetectBucket {
    async fn run(&self) -> Result<Results> {
        let processes = list_processes()?;
        let root_inode = std::fs::metadata("/")?.ino();
        let mounts = parse_mounts(&std::fs::read_to_string("/proc/mounts")?)?;
        let fstab = std::fs::read_to_string(FSTAB_PATH)?;
        let boot_entries = std::fs::read_dir(BOOT_PATH)?.count();

        let mut res = Results::new(NAME);
        res.set_headers(["hint", "result"]);
        for (hint, result) in [
            ("systemd is not PID 1", !is_process_pid(&processes, "systemd", 1)),
            ("kthreadd is not PID 2", !is_process_pid(&processes, "kthreadd", 2)),
            ("inode number of root is not 2", root_inode != 2),
            ("root is an overlay fs", root_is_overlay(&mounts)),
            ("/etc/fstab is empty", fstab_is_empty(&fstab)),
            ("/boot is empty", boot_entries == 0),
        ] {
            res.add_content(vec![Value::from(hint), Value::from(result)]);
        }
        res.add_comment("A majority of true hints might imply running in a container.");
        Ok(res)
    }
}

/// Whether `pid` runs a process called `name`
pub fn is_process_pid(processes: &[ProcessEntry], name: &str, pid: i32) -> bool {
    processes.iter().any(|p| p.pid == pid && p.name == name)
}

pub fn root_is_overlay(mounts: &[Mount]) -> bool {
    mounts.iter().any(|m| m.filesystem == "overlay" && m.path == "/")
}

/// No line of the fstab declares anything, comments aside
pub fn fstab_is_empty(content: &str) -> bool {
    content.lines().all(|line| line.is_empty() || line.starts_with('#'))
}
