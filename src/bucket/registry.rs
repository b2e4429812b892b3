//! Bucket registry: descriptors, name and alias lookups, instantiation

use super::{Bucket, Config};
use crate::error::{DigError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Builds a bucket instance from the invocation config
pub type Factory = Arc<dyn Fn(&Config) -> Result<Box<dyn Bucket>> + Send + Sync>;

/// Static description of a bucket
#[derive(Clone)]
pub struct BucketInfo {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub side_effects: bool,
    pub requires_client: bool,
    pub factory: Factory,
}

impl BucketInfo {
    pub fn new<F>(name: &'static str, description: &'static str, factory: F) -> Self
    where
        F: Fn(&Config) -> Result<Box<dyn Bucket>> + Send + Sync + 'static,
    {
        Self {
            name,
            aliases: &[],
            description,
            side_effects: false,
            requires_client: false,
            factory: Arc::new(factory),
        }
    }

    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_side_effects(mut self) -> Self {
        self.side_effects = true;
        self
    }

    pub fn requires_client(mut self) -> Self {
        self.requires_client = true;
        self
    }
}

impl std::fmt::Debug for BucketInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketInfo")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("side_effects", &self.side_effects)
            .field("requires_client", &self.requires_client)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Inner {
    registry: HashMap<&'static str, BucketInfo>,
    // every alias and every canonical name points to the canonical name
    aliases: HashMap<&'static str, &'static str>,
}

/// Registry of every bucket known to the process
#[derive(Default)]
pub struct Buckets {
    inner: RwLock<Inner>,
}

impl Buckets {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a bucket, rejecting empty fields and any name or alias collision
    pub fn register(&self, info: BucketInfo) -> Result<()> {
        if info.name.is_empty() {
            return Err(DigError::Registration("bucket name must not be empty".to_string()));
        }
        if info.description.is_empty() {
            return Err(DigError::Registration(format!(
                "bucket {:?} has an empty description",
                info.name
            )));
        }

        let mut inner = self.write();
        if inner.aliases.contains_key(info.name) {
            return Err(DigError::Registration(format!(
                "name {:?} is already registered",
                info.name
            )));
        }
        for (i, alias) in info.aliases.iter().enumerate() {
            if inner.aliases.contains_key(alias) || *alias == info.name || info.aliases[..i].contains(alias) {
                return Err(DigError::Registration(format!(
                    "alias {:?} of bucket {:?} collides with an existing name or alias",
                    alias, info.name
                )));
            }
        }

        inner.aliases.insert(info.name, info.name);
        for alias in info.aliases {
            inner.aliases.insert(alias, info.name);
        }
        inner.registry.insert(info.name, info);
        Ok(())
    }

    /// Canonical name for a name or alias
    pub fn resolve_alias(&self, token: &str) -> Option<&'static str> {
        self.read().aliases.get(token).copied()
    }

    /// All canonical names, sorted
    pub fn registered(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.read().registry.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Canonical names of the buckets without side effects, sorted
    pub fn registered_passive(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .read()
            .registry
            .values()
            .filter(|info| !info.side_effects)
            .map(|info| info.name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Descriptor for a name or alias
    pub fn info(&self, token: &str) -> Option<BucketInfo> {
        let inner = self.read();
        let name = inner.aliases.get(token)?;
        inner.registry.get(name).cloned()
    }

    pub fn describe(&self, token: &str) -> &'static str {
        self.info(token).map(|i| i.description).unwrap_or_default()
    }

    pub fn aliases(&self, token: &str) -> &'static [&'static str] {
        self.info(token).map(|i| i.aliases).unwrap_or_default()
    }

    pub fn has_side_effects(&self, token: &str) -> bool {
        self.info(token).is_some_and(|i| i.side_effects)
    }

    pub fn requires_client(&self, token: &str) -> bool {
        self.info(token).is_some_and(|i| i.requires_client)
    }

    /// Instantiate the bucket behind a name or alias.
    ///
    /// `MissingClient` from the factory is passed through untouched so the
    /// caller can bootstrap a client and retry.
    pub fn init_bucket(&self, token: &str, config: &Config) -> Result<Box<dyn Bucket>> {
        let info = self
            .info(token)
            .ok_or_else(|| DigError::UnknownBucket(token.to_string()))?;

        // the lock is released before the factory runs
        match (info.factory)(config) {
            Ok(bucket) => Ok(bucket),
            Err(DigError::MissingClient) => Err(DigError::MissingClient),
            Err(e) => Err(DigError::BucketInit {
                name: token.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
