//! Container runtime identification

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results};
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub const NAME: &str = "runtime";
const DESCRIPTION: &str = "Runtime finds clues to identify which container runtime is running the container.";
const ALIASES: &[&str] = &["runtimes", "rt"];

/// Known runtimes, matched in this order against each clue
pub const RUNTIMES: &[&str] = &[
    "docker",
    "rkt",
    "systemd-nspawn",
    "lxc-libvirt",
    "lxc",
    "openvz",
    "kube",
    "garden",
    "podman",
    "gvisor",
    "firejail",
    "wsl",
];

pub const NOT_FOUND: &str = "not-found";

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(RuntimeBucket))
}

pub struct RuntimeBucket;

#[async_trait]
impl Bucket for RuntimeBucket {
    async fn run(&self) -> Result<Results> {
        let runtime = detect_runtime(&Clues::gather());
        let mut res = Results::new(NAME);
        res.add_comment(format!("The container runtime seems to be {runtime}."));
        Ok(res)
    }
}

/// Everything the runtime is guessed from. Unreadable sources stay empty.
#[derive(Debug, Clone, Default)]
pub struct Clues {
    pub cgroup: String,
    pub proc_vz: bool,
    pub proc_bc: bool,
    pub runsc_containers: bool,
    /// The `container` environment variable
    pub container_env: String,
    pub systemd_container: String,
    pub init_environ: String,
}

impl Clues {
    pub fn gather() -> Self {
        let read = |path: &str| std::fs::read_to_string(path).unwrap_or_default();
        Self {
            cgroup: read("/proc/self/cgroup"),
            proc_vz: Path::new("/proc/vz").exists(),
            proc_bc: Path::new("/proc/bc").exists(),
            runsc_containers: Path::new("/__runsc_containers__").exists(),
            container_env: std::env::var("container").unwrap_or_default(),
            systemd_container: read("/run/systemd/container"),
            init_environ: std::fs::read("/proc/1/environ")
                .map(|raw| String::from_utf8_lossy(&raw).into_owned())
                .unwrap_or_default(),
        }
    }
}

/// First known runtime named in `input`
pub fn match_runtime(input: &str) -> Option<&'static str> {
    if input.trim().is_empty() {
        return None;
    }
    RUNTIMES.iter().copied().find(|runtime| input.contains(runtime))
}

/// Runtime named by the first conclusive clue, or [`NOT_FOUND`]
pub fn detect_runtime(clues: &Clues) -> &'static str {
    if let Some(runtime) = match_runtime(&clues.cgroup) {
        return runtime;
    }
    // /proc/vz shows on both sides of an OpenVZ host, /proc/bc only outside
    if clues.proc_vz && !clues.proc_bc {
        return "openvz";
    }
    if clues.runsc_containers {
        return "gvisor";
    }
    if let Some(runtime) = match_runtime(&clues.container_env) {
        return runtime;
    }
    if let Some(runtime) = match_runtime(&clues.systemd_container) {
        return runtime;
    }
    clues
        .init_environ
        .split('\0')
        .filter_map(|var| var.strip_prefix("container="))
        .find_map(match_runtime)
        .unwrap_or(NOT_FOUND)
}
