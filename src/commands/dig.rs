//! Dig command: resolve bucket names, bootstrap the client on demand, run and render

use crate::bucket::{Bucket, Buckets, Config, RenderOptions};
use crate::cli::{DigArgs, OutputFormat};
use crate::client::{ClientBootstrap, KubeBootstrap};
use crate::error::{DigError, Result};
use crate::output::{render_error, render_results};
use crate::plugins::default_buckets;
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info, warn};

/// Tallies of a dig run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Buckets skipped because the client could not be bootstrapped
    pub skipped: usize,
}

enum Instance {
    Ready(Box<dyn Bucket>),
    Skipped(DigError),
}

/// Runs buckets one after the other against a shared config
pub struct Digger<'a, B> {
    buckets: &'a Buckets,
    config: Config,
    bootstrap: B,
    format: OutputFormat,
    side_effects: bool,
}

impl<'a, B: ClientBootstrap> Digger<'a, B> {
    pub fn new(buckets: &'a Buckets, config: Config, bootstrap: B, format: OutputFormat, side_effects: bool) -> Self {
        Self {
            buckets,
            config,
            bootstrap,
            format,
            side_effects,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Expand `all`/`a` and drop repeated tokens, keeping first occurrences
    pub fn resolve(&self, tokens: &[String]) -> Vec<String> {
        let expanded: Vec<String> = match tokens.first() {
            Some(first) if first.eq_ignore_ascii_case("all") || first.eq_ignore_ascii_case("a") => {
                let names = if self.side_effects {
                    self.buckets.registered()
                } else {
                    self.buckets.registered_passive()
                };
                debug!(count = names.len(), side_effects = self.side_effects, "expanded bucket list");
                names.into_iter().map(String::from).collect()
            }
            _ => tokens.to_vec(),
        };

        let mut seen = HashSet::new();
        expanded.into_iter().filter(|t| seen.insert(t.clone())).collect()
    }

    /// Run every requested bucket, writing rendered blocks to `out`.
    ///
    /// Bucket failures and bootstrap failures are rendered as error blocks
    /// and the run goes on. Unknown buckets, inconsistent client requirements
    /// and rendering failures abort the run.
    pub async fn run<W: Write>(&mut self, tokens: &[String], out: &mut W) -> Result<DigSummary> {
        let mut summary = DigSummary::default();
        let opts = RenderOptions::new(self.config.output_width);

        for token in self.resolve(tokens) {
            let label = self.buckets.resolve_alias(&token).unwrap_or(token.as_str()).to_string();

            if self.buckets.has_side_effects(&token) && !self.side_effects {
                warn!(bucket = %label, "running a bucket with side effects on the environment");
            }

            let bucket = match self.instantiate(&token).await? {
                Instance::Ready(bucket) => bucket,
                Instance::Skipped(err) => {
                    out.write_all(render_error(&label, &err.to_string(), self.format)?.as_bytes())?;
                    summary.skipped += 1;
                    continue;
                }
            };

            debug!(bucket = %label, "running bucket");
            match bucket.run().await {
                Ok(results) => {
                    out.write_all(render_results(&results, &opts, self.format)?.as_bytes())?;
                    summary.succeeded += 1;
                }
                Err(err) => {
                    out.write_all(render_error(&label, &err.to_string(), self.format)?.as_bytes())?;
                    summary.failed += 1;
                }
            }
        }

        out.flush()?;
        Ok(summary)
    }

    async fn instantiate(&mut self, token: &str) -> Result<Instance> {
        let mut retried = false;
        loop {
            match self.buckets.init_bucket(token, &self.config) {
                Ok(bucket) => return Ok(Instance::Ready(bucket)),
                Err(DigError::MissingClient) => {
                    if retried || !self.buckets.requires_client(token) {
                        return Err(DigError::ClientMisdeclared(token.to_string()));
                    }
                    retried = true;
                    if let Err(e) = self.ensure_client().await {
                        return Ok(Instance::Skipped(DigError::Bootstrap(e.to_string())));
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn ensure_client(&mut self) -> Result<()> {
        if self.config.client.is_some() {
            return Ok(());
        }
        debug!("bootstrapping cluster client");
        let (client, namespace) = self.bootstrap.bootstrap().await?;
        self.config.client = Some(client);
        self.config.namespace = namespace;
        Ok(())
    }
}

/// Execute the dig command
pub async fn run_dig(args: &DigArgs, format: OutputFormat, output_width: usize, color: bool) -> Result<()> {
    let buckets = default_buckets()?;

    let config = Config {
        client: None,
        namespace: args.namespace.clone().unwrap_or_default(),
        color: color && format == OutputFormat::Human,
        output_width,
        admission_force: args.admission_force,
        admission_create: args.admission_create,
    };
    let bootstrap = KubeBootstrap {
        kubeconfig: args.kubeconfig.clone(),
        context: args.context.clone(),
        namespace: args.namespace.clone(),
    };

    let mut digger = Digger::new(&buckets, config, bootstrap, format, args.side_effects);
    let mut out = std::io::stdout();
    let summary = digger.run(&args.buckets, &mut out).await?;
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        "dig finished"
    );
    Ok(())
}
