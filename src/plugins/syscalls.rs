//! Syscall filtering scan
//!
//! Every scanned syscall is issued with zeroed arguments on a throwaway
//! thread. `EPERM` or `EACCES` means a filter blocked it, any other outcome
//! means the kernel looked at the call. Calls that block past the budget are
//! abandoned and counted as allowed.

use crate::bucket::fanout::{gather, TimeoutPolicy, Verdict};
use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::oneshot;

pub const NAME: &str = "syscalls";
const DESCRIPTION: &str = "Syscalls scans most of the syscalls to detect which are blocked and allowed.";
const ALIASES: &[&str] = &["syscall", "sys"];

const BUDGET: Duration = Duration::from_millis(100);
const UNSUPPORTED: &str = "unsupported";

/// Syscalls attempted, by name and number. Calls that exit, fork, wait or
/// hang forever are left out, as are calls whose zero-argument form alters
/// the whole host.
pub const SCANNED: &[(&str, libc::c_long)] = &[
    ("getpid", libc::SYS_getpid),
    ("getuid", libc::SYS_getuid),
    ("uname", libc::SYS_uname),
    ("getcwd", libc::SYS_getcwd),
    ("mount", libc::SYS_mount),
    ("umount2", libc::SYS_umount2),
    ("unshare", libc::SYS_unshare),
    ("setns", libc::SYS_setns),
    ("pivot_root", libc::SYS_pivot_root),
    ("chroot", libc::SYS_chroot),
    ("reboot", libc::SYS_reboot),
    ("swapon", libc::SYS_swapon),
    ("swapoff", libc::SYS_swapoff),
    ("init_module", libc::SYS_init_module),
    ("finit_module", libc::SYS_finit_module),
    ("delete_module", libc::SYS_delete_module),
    ("bpf", libc::SYS_bpf),
    ("perf_event_open", libc::SYS_perf_event_open),
    ("keyctl", libc::SYS_keyctl),
    ("add_key", libc::SYS_add_key),
    ("request_key", libc::SYS_request_key),
    ("settimeofday", libc::SYS_settimeofday),
    ("clock_settime", libc::SYS_clock_settime),
    ("clock_adjtime", libc::SYS_clock_adjtime),
    ("adjtimex", libc::SYS_adjtimex),
    ("mknodat", libc::SYS_mknodat),
    ("syslog", libc::SYS_syslog),
    ("quotactl", libc::SYS_quotactl),
    ("open_by_handle_at", libc::SYS_open_by_handle_at),
    ("name_to_handle_at", libc::SYS_name_to_handle_at),
    ("userfaultfd", libc::SYS_userfaultfd),
    ("personality", libc::SYS_personality),
    ("mbind", libc::SYS_mbind),
    ("move_pages", libc::SYS_move_pages),
    ("set_mempolicy", libc::SYS_set_mempolicy),
    ("get_mempolicy", libc::SYS_get_mempolicy),
    ("process_vm_readv", libc::SYS_process_vm_readv),
    ("process_vm_writev", libc::SYS_process_vm_writev),
    ("kcmp", libc::SYS_kcmp),
    ("lookup_dcookie", libc::SYS_lookup_dcookie),
    ("fanotify_init", libc::SYS_fanotify_init),
    ("setuid", libc::SYS_setuid),
    ("setgid", libc::SYS_setgid),
    ("setreuid", libc::SYS_setreuid),
    ("setregid", libc::SYS_setregid),
    ("setgroups", libc::SYS_setgroups),
    ("capset", libc::SYS_capset),
    ("ioprio_set", libc::SYS_ioprio_set),
    ("memfd_create", libc::SYS_memfd_create),
];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(
        BucketInfo::new(NAME, DESCRIPTION, new_bucket)
            .with_aliases(ALIASES)
            .with_side_effects(),
    )
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(SyscallsBucket))
}

pub struct SyscallsBucket;

#[async_trait]
impl Bucket for SyscallsBucket {
    async fn run(&self) -> Result<Results> {
        let items = SCANNED
            .iter()
            .map(|(name, nr)| (name.to_string(), *nr))
            .collect::<Vec<_>>();
        let outcomes = gather(items, BUDGET, TimeoutPolicy::Pass, attempt).await;

        let mut blocked = Vec::new();
        let mut allowed = Vec::new();
        for outcome in outcomes {
            if outcome.detail.as_deref() == Some(UNSUPPORTED) {
                continue;
            }
            if outcome.success {
                allowed.push(outcome.label);
            } else {
                blocked.push(outcome.label);
            }
        }
        blocked.sort();
        allowed.sort();

        let mut res = Results::new(NAME);
        res.set_headers(["blocked", "allowed"]);
        res.add_content(vec![Value::from(blocked), Value::from(allowed)]);
        res.add_comment(format!(
            "{} syscalls were scanned, those that exit, fork, wait or hang were not.",
            SCANNED.len()
        ));
        Ok(res)
    }
}

async fn attempt(nr: libc::c_long) -> Verdict {
    let (tx, rx) = oneshot::channel();
    // credential changes stay local to this thread
    std::thread::spawn(move || {
        let _ = tx.send(issue(nr));
    });
    match rx.await {
        Ok(errno) => classify(errno),
        Err(_) => Verdict::pass(),
    }
}

/// Issue syscall `nr` with zeroed arguments, returning its errno if any
fn issue(nr: libc::c_long) -> Option<i32> {
    // SAFETY: every scanned syscall takes null pointers as invalid input
    // and fails with EFAULT or EINVAL instead of dereferencing them
    let ret = unsafe { libc::syscall(nr, 0, 0, 0) };
    if ret == -1 {
        std::io::Error::last_os_error().raw_os_error()
    } else {
        None
    }
}

/// Blocked, allowed or unsupported from the errno of a call
pub fn classify(errno: Option<i32>) -> Verdict {
    match errno {
        Some(libc::EPERM) | Some(libc::EACCES) => Verdict::fail("blocked"),
        Some(libc::EOPNOTSUPP) => Verdict::pass().with_detail(UNSUPPORTED),
        _ => Verdict::pass(),
    }
}
