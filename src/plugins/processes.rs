//! Processes visible in the PID namespace

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::Result;
use async_trait::async_trait;

pub const NAME: &str = "processes";
const DESCRIPTION: &str = "Processes analyses the running processes in your PID namespace.";
const ALIASES: &[&str] = &["process", "ps"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(ProcessesBucket))
}

pub struct ProcessesBucket;

#[async_trait]
impl Bucket for ProcessesBucket {
    async fn run(&self) -> Result<Results> {
        let processes = list_processes()?;

        let mut res = Results::new(NAME);
        res.set_headers(["pid", "ppid", "name"]);
        for p in &processes {
            res.add_content(vec![Value::from(p.pid), Value::from(p.ppid), Value::from(&p.name)]);
        }
        res.add_comment(process_comment(&processes));
        Ok(res)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: i32,
    pub ppid: i32,
    pub name: String,
}

/// Every process readable under /proc, sorted by pid. Processes that exit
/// while being scanned are skipped.
pub fn list_processes() -> Result<Vec<ProcessEntry>> {
    let mut entries: Vec<ProcessEntry> = procfs::process::all_processes()?
        .filter_map(|p| p.ok())
        .filter_map(|p| p.stat().ok())
        .map(|stat| ProcessEntry {
            pid: stat.pid,
            ppid: stat.ppid,
            name: stat.comm,
        })
        .collect();
    entries.sort_by_key(|e| e.pid);
    Ok(entries)
}

pub fn process_comment(processes: &[ProcessEntry]) -> String {
    let systemd_first = processes.iter().any(|p| p.pid == 1 && p.name == "systemd");
    let mut comment = format!("{} processes running", processes.len());
    if systemd_first {
        comment.push_str(", systemd is the first process");
    } else {
        comment.push_str(", systemd not found as the first process");
    }
    comment
}
