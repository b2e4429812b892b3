//! Identity of the current user

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::Result;
use async_trait::async_trait;

pub const NAME: &str = "userid";
const DESCRIPTION: &str = "UserID retrieves UID, GID and their corresponding names.";
const ALIASES: &[&str] = &["userids", "id"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(BucketInfo::new(NAME, DESCRIPTION, new_bucket).with_aliases(ALIASES))
}

pub fn new_bucket(_config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(UserIdBucket))
}

pub struct UserIdBucket;

#[async_trait]
impl Bucket for UserIdBucket {
    async fn run(&self) -> Result<Results> {
        // SAFETY: getuid and getgid cannot fail and touch no memory
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };

        let passwd = std::fs::read_to_string("/etc/passwd").unwrap_or_default();
        let group = std::fs::read_to_string("/etc/group").unwrap_or_default();
        let user = lookup_user(&passwd, uid);

        let user_name = user.as_ref().map(|u| u.name.clone()).unwrap_or_default();
        let home = user
            .map(|u| u.home)
            .or_else(|| std::env::var("HOME").ok())
            .unwrap_or_default();
        let group_name = lookup_group(&group, gid).unwrap_or_default();

        let mut res = Results::new(NAME);
        res.set_headers(["userID", "userName", "groupID", "groupName", "homeDir"]);
        res.add_content(vec![
            Value::from(uid.to_string()),
            Value::from(user_name.clone()),
            Value::from(gid.to_string()),
            Value::from(group_name),
            Value::from(home),
        ]);
        if user_name.is_empty() {
            res.add_comment(format!("No entry for uid {uid} in /etc/passwd."));
        }
        Ok(res)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: String,
}

/// Find the /etc/passwd entry of `uid`
pub fn lookup_user(passwd: &str, uid: u32) -> Option<PasswdEntry> {
    passwd.lines().filter(|l| !l.starts_with('#')).find_map(|line| {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 6 {
            return None;
        }
        let entry_uid: u32 = fields[2].parse().ok()?;
        if entry_uid != uid {
            return None;
        }
        Some(PasswdEntry {
            name: fields[0].to_string(),
            uid: entry_uid,
            gid: fields[3].parse().ok()?,
            home: fields[5].to_string(),
        })
    })
}

/// Find the name of group `gid` in /etc/group
pub fn lookup_group(group: &str, gid: u32) -> Option<String> {
    group.lines().filter(|l| !l.starts_with('#')).find_map(|line| {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 3 {
            return None;
        }
        (fields[2].parse::<u32>().ok()? == gid).then(|| fields[0].to_string())
    })
}
