//! Devices exposed in /dev

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{FileType, Metadata};
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};

pub const NAME: &str = "devices";
const DESCRIPTION: &str = "Devices shows the list of devices available in the container.";
const ALIASES: &[&str] = &["device", "dev"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(DevicesBucket::new("/dev")))
}

pub struct DevicesBucket {
    root: PathBuf,
}

impl DevicesBucket {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Bucket for DevicesBucket {
    async fn run(&self) -> Result<Results> {
        let devices = read_dir_sorted(&self.root)?;

        let mut res = Results::new(NAME);
        res.set_headers(["mode", "isDir", "modTime", "name"]);
        for (name, meta) in &devices {
            let modified = meta
                .modified()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default();
            res.add_content(vec![
                Value::from(mode_string(&meta.file_type(), meta.permissions().mode())),
                Value::from(meta.is_dir()),
                Value::from(modified),
                Value::from(name),
            ]);
        }
        res.add_comment(format!("{} devices are available.", devices.len()));
        Ok(res)
    }
}

fn read_dir_sorted(root: &Path) -> Result<Vec<(String, Metadata)>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        // symlinks are reported as such, not followed
        let meta = std::fs::symlink_metadata(entry.path())?;
        entries.push((entry.file_name().to_string_lossy().into_owned(), meta));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// `ls -l` style mode string, e.g. `crw-rw-rw-`
pub fn mode_string(file_type: &FileType, mode: u32) -> String {
    let kind = if file_type.is_dir() {
        'd'
    } else if file_type.is_symlink() {
        'l'
    } else if file_type.is_char_device() {
        'c'
    } else if file_type.is_block_device() {
        'b'
    } else if file_type.is_fifo() {
        'p'
    } else if file_type.is_socket() {
        's'
    } else {
        '-'
    };
    let mut out = String::with_capacity(10);
    out.push(kind);
    out.push_str(&permission_string(mode));
    out
}

/// rwx triplets for the low nine permission bits
pub fn permission_string(mode: u32) -> String {
    const FLAGS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    FLAGS
        .iter()
        .map(|(bit, c)| if mode & bit != 0 { *c } else { '-' })
        .collect()
}
