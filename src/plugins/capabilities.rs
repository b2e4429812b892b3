//! Capability sets of the current process

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::{DigError, Result};
use async_trait::async_trait;
use owo_colors::OwoColorize;

pub const NAME: &str = "capabilities";
const DESCRIPTION: &str = "Capabilities lists all capabilities in all sets and displays dangerous capabilities in red.";
const ALIASES: &[&str] = &["capability", "cap"];

/// Capability names indexed by their bit number
pub const CAPABILITY_NAMES: [&str; 41] = [
    "chown",
    "dac_override",
    "dac_read_search",
    "fowner",
    "fsetid",
    "kill",
    "setgid",
    "setuid",
    "setpcap",
    "linux_immutable",
    "net_bind_service",
    "net_broadcast",
    "net_admin",
    "net_raw",
    "ipc_lock",
    "ipc_owner",
    "sys_module",
    "sys_rawio",
    "sys_chroot",
    "sys_ptrace",
    "sys_pacct",
    "sys_admin",
    "sys_boot",
    "sys_nice",
    "sys_resource",
    "sys_time",
    "sys_tty_config",
    "mknod",
    "lease",
    "audit_write",
    "audit_control",
    "setfcap",
    "mac_override",
    "mac_admin",
    "syslog",
    "wake_alarm",
    "block_suspend",
    "audit_read",
    "perfmon",
    "bpf",
    "checkpoint_restore",
];

const DANGEROUS: &[&str] = &[
    "chown",
    "dac_override",
    "dac_read_search",
    "setuid",
    "setgid",
    "net_raw",
    "sys_admin",
    "sys_ptrace",
    "sys_module",
    "fowner",
    "setfcap",
];

/// Sets in display order, with their /proc/self/status keys
const SETS: [(&str, &str); 5] = [
    ("effective", "CapEff"),
    ("permitted", "CapPrm"),
    ("inheritable", "CapInh"),
    ("bounding", "CapBnd"),
    ("ambient", "CapAmb"),
];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(CapabilitiesBucket { color: config.color }))
}

pub struct CapabilitiesBucket {
    color: bool,
}

#[async_trait]
impl Bucket for CapabilitiesBucket {
    async fn run(&self) -> Result<Results> {
        let status = std::fs::read_to_string("/proc/self/status")?;
        let sets = parse_capability_sets(&status)?;

        let mut res = Results::new(NAME);
        res.set_headers(["set", "capabilities"]);
        let mut bounding: Vec<&str> = Vec::new();
        for (set, caps) in &sets {
            if *set == "bounding" {
                bounding = caps.clone();
            }
            let rendered = caps
                .iter()
                .map(|cap| {
                    if self.color && is_dangerous(cap) {
                        cap.red().to_string()
                    } else {
                        cap.to_string()
                    }
                })
                .collect::<Vec<_>>();
            res.add_content(vec![Value::from(*set), Value::from(rendered)]);
        }

        if bounding.contains(&"sys_admin") {
            res.add_comment(format!(
                "The bounding set contains {} caps and you have CAP_SYS_ADMIN, you might be running a privileged container, check the number of devices available.",
                bounding.len()
            ));
        } else {
            res.add_comment(format!(
                "The bounding set contains {} caps, it seems that you are running a non-privileged container.",
                bounding.len()
            ));
        }

        match no_new_privs(&status) {
            Ok(flag) => res.add_comment(format!("NoNewPrivs flag is set to {flag}.")),
            Err(e) => res.add_comment(format!("error reading the NoNewPrivs flag: {e}")),
        }
        Ok(res)
    }
}

pub fn is_dangerous(cap: &str) -> bool {
    DANGEROUS.contains(&cap)
}

/// Names of the capabilities whose bit is set in `mask`
pub fn decode_mask(mask: u64) -> Vec<&'static str> {
    CAPABILITY_NAMES
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask & (1u64 << bit) != 0)
        .map(|(_, name)| *name)
        .collect()
}

/// Every capability set found in the content of /proc/<pid>/status, in
/// display order
pub fn parse_capability_sets(status: &str) -> Result<Vec<(&'static str, Vec<&'static str>)>> {
    SETS.iter()
        .map(|(set, key)| {
            let raw = status_field(status, key)
                .ok_or_else(|| DigError::bucket(format!("{key} was not found in /proc/self/status")))?;
            let mask = u64::from_str_radix(raw, 16)
                .map_err(|e| DigError::bucket(format!("invalid {key} mask {raw:?}: {e}")))?;
            Ok((*set, decode_mask(mask)))
        })
        .collect()
}

pub fn no_new_privs(status: &str) -> Result<bool> {
    status_field(status, "NoNewPrivs")
        .map(|v| v == "1")
        .ok_or_else(|| DigError::bucket("flag NoNewPrivs was not found in /proc/self/status"))
}

fn status_field<'a>(status: &'a str, key: &str) -> Option<&'a str> {
    status.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        (name.trim() == key).then(|| value.trim())
    })
}
