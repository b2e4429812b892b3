//! Built-in buckets

pub mod admission;
pub mod apiresources;
pub mod authorization;
pub mod capabilities;
pub mod cgroups;
pub mod cloudmetadata;
pub mod containerdetect;
pub mod devices;
pub mod environment;
pub mod mount;
pub mod node;
pub mod pidnamespace;
pub mod processes;
pub mod runtime;
pub mod syscalls;
pub mod token;
pub mod userid;
pub mod usernamespace;
pub mod version;

use crate::bucket::Buckets;
use crate::error::Result;

/// Register every built-in bucket
pub fn register_all(buckets: &Buckets) -> Result<()> {
    admission::register(buckets)?;
    apiresources::register(buckets)?;
    authorization::register(buckets)?;
    capabilities::register(buckets)?;
    cgroups::register(buckets)?;
    cloudmetadata::register(buckets)?;
    containerdetect::register(buckets)?;
    devices::register(buckets)?;
    environment::register(buckets)?;
    mount::register(buckets)?;
    node::register(buckets)?;
    pidnamespace::register(buckets)?;
    processes::register(buckets)?;
    runtime::register(buckets)?;
    syscalls::register(buckets)?;
    token::register(buckets)?;
    userid::register(buckets)?;
    usernamespace::register(buckets)?;
    version::register(buckets)?;
    Ok(())
}

/// A registry populated with every built-in bucket
pub fn default_buckets() -> Result<Buckets> {
    let buckets = Buckets::new();
    register_all(&buckets)?;
    Ok(buckets)
}
