//! Host information read from /proc

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::{DigError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

pub const NAME: &str = "node";
const DESCRIPTION: &str = "Node retrieves various information in /proc about the current host.";
const ALIASES: &[&str] = &["nodes", "n"];

const CPUINFO_PATH: &str = "/proc/cpuinfo";
const MEMINFO_PATH: &str = "/proc/meminfo";
const VERSION_PATH: &str = "/proc/version";

const UNITS: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(NodeBucket))
}

pub struct NodeBucket;

#[async_trait]
impl Bucket for NodeBucket {
    async fn run(&self) -> Result<Results> {
        let cpus = parse_cpuinfo(&std::fs::read_to_string(CPUINFO_PATH)?)?;
        let mem = parse_meminfo(&std::fs::read_to_string(MEMINFO_PATH)?)?;
        let kernel = parse_kernel_version(&std::fs::read_to_string(VERSION_PATH)?)?;

        let first = cpus.first().ok_or_else(|| DigError::bucket("no CPU listed in /proc/cpuinfo"))?;
        let field = |key: &str| first.get(key).cloned().unwrap_or_default();

        let mut res = Results::new(NAME);
        res.set_headers(["cpuModel", "cpuCores", "memTotal", "memUsed", "kernelVersion", "kernelDetails"]);
        res.add_content(vec![
            Value::from(field("model name")),
            Value::from(field("cpu cores")),
            Value::from(to_human(mem.total)),
            Value::from(to_human(mem.used())),
            Value::from(kernel.version),
            Value::from(kernel.details),
        ]);
        Ok(res)
    }
}

/// Memory counters, in kB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Meminfo {
    pub total: u64,
    pub free: u64,
    pub available: u64,
    pub buffers: u64,
    pub cached: u64,
    pub s_reclaimable: u64,
}

impl Meminfo {
    /// Used memory as `free(1)` computes it
    pub fn used(&self) -> u64 {
        self.total
            .saturating_sub(self.free)
            .saturating_sub(self.buffers)
            .saturating_sub(self.cached)
            .saturating_sub(self.s_reclaimable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelVersion {
    pub version: String,
    pub details: String,
}

/// One `key -> value` map per CPU block of /proc/cpuinfo
pub fn parse_cpuinfo(content: &str) -> Result<Vec<HashMap<String, String>>> {
    let mut cpus = Vec::new();
    let mut cpu = HashMap::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !cpu.is_empty() {
                cpus.push(std::mem::take(&mut cpu));
            }
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| DigError::bucket("error in /proc/cpuinfo format, missing colons"))?;
        cpu.insert(key.trim().to_string(), value.trim().to_string());
    }
    if !cpu.is_empty() {
        cpus.push(cpu);
    }
    Ok(cpus)
}

/// Parse the `Key: N kB` lines of /proc/meminfo, ignoring keys not tracked
pub fn parse_meminfo(content: &str) -> Result<Meminfo> {
    let mut mem = Meminfo::default();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| DigError::bucket("error in /proc/meminfo format, missing colons"))?;
        let value = value.trim().trim_end_matches("kB").trim();
        let value: u64 = value
            .parse()
            .map_err(|_| DigError::bucket(format!("invalid /proc/meminfo value for {}: {value:?}", key.trim())))?;
        match key.trim() {
            "MemTotal" => mem.total = value,
            "MemFree" => mem.free = value,
            "MemAvailable" => mem.available = value,
            "Buffers" => mem.buffers = value,
            "Cached" => mem.cached = value,
            "SReclaimable" => mem.s_reclaimable = value,
            _ => {}
        }
    }
    Ok(mem)
}

/// Split /proc/version into the release and the build details after it
pub fn parse_kernel_version(content: &str) -> Result<KernelVersion> {
    let parts: Vec<&str> = content.splitn(4, ' ').collect();
    if parts.len() < 4 {
        return Err(DigError::bucket("error in /proc/version format, missing fields"));
    }
    Ok(KernelVersion {
        version: parts[2].to_string(),
        details: parts[3].trim().to_string(),
    })
}

/// Format a kB amount in the first binary unit that brings it to 1024 or less.
/// Values above 10 drop the decimal.
pub fn to_human(kb: u64) -> String {
    let mut value = kb as f64;
    let mut unit = 0;
    while value > 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if value > 10.0 {
        format!("{value:.0}{}", UNITS[unit])
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}
