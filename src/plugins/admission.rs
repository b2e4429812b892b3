//! Admission chain scan
//!
//! Submits one pod per risky spec and reports which the admission chain
//! accepts. Pods go through a server-side dry run unless real creation is
//! requested, in which case every created pod is deleted afterwards.

use crate::bucket::fanout::{gather_all, Verdict};
use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::{DigError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    Container, HostPathVolumeSource, Pod, PodSpec, SecurityContext, Volume,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const NAME: &str = "admission";
const DESCRIPTION: &str = "Admission scans the admission controller chain by creating specific pods to find what is prevented or not.";
const ALIASES: &[&str] = &["admissions", "adm"];

const GENERATE_NAME: &str = "admission-bucket-";

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(
        BucketInfo::new(NAME, DESCRIPTION, new_bucket)
            .with_aliases(ALIASES)
            .with_side_effects()
            .requires_client(),
    )
}

pub fn new_bucket(config: &Config) -> Result<Box<dyn Bucket>> {
    let sink = KubePods::new(config.client()?, &config.namespace);
    Ok(Box::new(AdmissionBucket::with_sink(sink, config)))
}

/// Where test pods are submitted
#[async_trait]
pub trait PodSink: Send + Sync {
    /// Submit a pod, returning the name the server gave it
    async fn create(&self, pod: Pod, dry_run: bool) -> Result<String>;

    async fn delete(&self, name: &str) -> Result<()>;

    /// Whether pods can be deleted, checked by deleting a pod that does not exist
    async fn can_delete(&self) -> bool;
}

/// Pods API of a namespace
pub struct KubePods {
    api: Api<Pod>,
}

impl KubePods {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }
}

#[async_trait]
impl PodSink for KubePods {
    async fn create(&self, pod: Pod, dry_run: bool) -> Result<String> {
        let params = PostParams {
            dry_run,
            ..Default::default()
        };
        let created = self.api.create(&params, &pod).await?;
        Ok(created.metadata.name.unwrap_or_default())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn can_delete(&self) -> bool {
        match self.api.delete("delete-test", &DeleteParams::default()).await {
            Err(kube::Error::Api(e)) => e.code != 403,
            _ => true,
        }
    }
}

pub struct AdmissionBucket<S> {
    sink: Arc<S>,
    namespace: String,
    force: bool,
    create: bool,
}

impl<S: PodSink + 'static> AdmissionBucket<S> {
    pub fn with_sink(sink: S, config: &Config) -> Self {
        Self {
            sink: Arc::new(sink),
            namespace: config.namespace.clone(),
            force: config.admission_force,
            create: config.admission_create,
        }
    }

    async fn cleanup(&self, created: Vec<String>) -> Result<()> {
        let mut failures = Vec::new();
        for name in &created {
            debug!(pod = %name, "deleting admission test pod");
            if let Err(e) = self.sink.delete(name).await {
                failures.push(format!("{name}: {e}"));
            }
        }
        if failures.is_empty() {
            return Ok(());
        }
        if self.force {
            for failure in &failures {
                warn!("failed to delete admission test pod {failure}");
            }
            return Ok(());
        }
        Err(DigError::Cleanup {
            count: failures.len(),
            failures,
        })
    }
}

#[async_trait]
impl<S: PodSink + 'static> Bucket for AdmissionBucket<S> {
    async fn run(&self) -> Result<Results> {
        if self.create && !self.force && !self.sink.can_delete().await {
            return Err(DigError::bucket(
                "cannot delete pod, will not be able to clean the scan artifacts, force creation with --admission-force",
            ));
        }

        let dry_run = !self.create;
        let created: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let items = test_pods(&self.namespace)
            .into_iter()
            .map(|(label, pod)| (label.to_string(), pod))
            .collect();

        // every submission is awaited so each created pod is known before cleanup
        let outcomes = gather_all(items, |pod| {
            let sink = Arc::clone(&self.sink);
            let created = Arc::clone(&created);
            async move {
                match sink.create(pod, dry_run).await {
                    Ok(name) => {
                        if !dry_run {
                            created.lock().await.push(name);
                        }
                        Verdict::pass()
                    }
                    Err(e) => Verdict::fail(e.to_string()),
                }
            }
        })
        .await;

        let mut res = Results::new(NAME);
        res.set_headers(["pod", "success", "error"]);
        for outcome in outcomes {
            res.add_content(vec![
                Value::from(outcome.label),
                Value::from(outcome.success),
                Value::from(outcome.detail.unwrap_or_default()),
            ]);
        }
        if dry_run {
            res.add_comment("Pods were submitted with a server-side dry run, nothing was persisted.");
        } else {
            res.add_comment("Pods were created for real and deleted after the scan.");
        }

        let to_clean = std::mem::take(&mut *created.lock().await);
        self.cleanup(to_clean).await?;
        Ok(res)
    }
}

/// Base pod every risky spec derives from
pub fn generic_pod(namespace: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            namespace: Some(namespace.to_string()),
            generate_name: Some(GENERATE_NAME.to_string()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "foo".to_string(),
                image: Some("ThisImageDoesNotExist".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn with_spec(namespace: &str, edit: impl FnOnce(&mut PodSpec)) -> Pod {
    let mut pod = generic_pod(namespace);
    if let Some(spec) = pod.spec.as_mut() {
        edit(spec);
    }
    pod
}

fn with_security_context(namespace: &str, context: SecurityContext) -> Pod {
    with_spec(namespace, |spec| {
        if let Some(container) = spec.containers.first_mut() {
            container.security_context = Some(context);
        }
    })
}

/// The risky pod specs, labelled
pub fn test_pods(namespace: &str) -> Vec<(&'static str, Pod)> {
    vec![
        (
            "privileged",
            with_security_context(
                namespace,
                SecurityContext {
                    privileged: Some(true),
                    ..Default::default()
                },
            ),
        ),
        (
            "hostPath",
            with_spec(namespace, |spec| {
                spec.volumes = Some(vec![Volume {
                    name: "rootfs".to_string(),
                    host_path: Some(HostPathVolumeSource {
                        path: "/".to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                }]);
            }),
        ),
        ("hostPID", with_spec(namespace, |spec| spec.host_pid = Some(true))),
        ("hostNetwork", with_spec(namespace, |spec| spec.host_network = Some(true))),
        (
            "runAsRoot",
            with_security_context(
                namespace,
                SecurityContext {
                    run_as_non_root: Some(false),
                    ..Default::default()
                },
            ),
        ),
        (
            "privilegeEscalation",
            with_security_context(
                namespace,
                SecurityContext {
                    allow_privilege_escalation: Some(true),
                    ..Default::default()
                },
            ),
        ),
    ]
}
