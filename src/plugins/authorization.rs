//! Permissions of the current identity in the active namespace

use crate::bucket::{Bucket, BucketInfo, Buckets, Config, Results, Value};
use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::authorization::v1::{
    SelfSubjectRulesReview, SelfSubjectRulesReviewSpec, SubjectRulesReviewStatus,
};
use kube::api::{Api, PostParams};
use kube::Client;
use std::collections::{BTreeMap, BTreeSet};

pub const NAME: &str = "authorization";
const DESCRIPTION: &str = "Authorization checks your API permissions with the current context or the available token.";
const ALIASES: &[&str] = &["authorizations", "auth"];

pub fn register(buckets: &Buckets) -> Result<()> {
    buckets.register(
        BucketInfo::new(NAME, DESCRIPTION, new_bucket)
            .with_aliases(ALIASES)
            .requires_client(),
    )
}

pub fn new_bucket(config: &Config) -> Result<Box<dyn Bucket>> {
    Ok(Box::new(AuthorizationBucket {
        client: config.client()?,
        namespace: config.namespace.clone(),
    }))
}

pub struct AuthorizationBucket {
    client: Client,
    namespace: String,
}

#[async_trait]
impl Bucket for AuthorizationBucket {
    async fn run(&self) -> Result<Results> {
        let review = SelfSubjectRulesReview {
            spec: SelfSubjectRulesReviewSpec {
                namespace: Some(self.namespace.clone()),
            },
            ..Default::default()
        };
        let api: Api<SelfSubjectRulesReview> = Api::all(self.client.clone());
        let response = api.create(&PostParams::default(), &review).await?;

        let mut res = Results::new(NAME);
        res.add_comment(format!(
            "Checking current context/token permissions in the {:?} namespace.",
            self.namespace
        ));
        let status = response.status.unwrap_or_default();
        if status.incomplete {
            res.add_comment("The rules review is incomplete, the authorizer might not support rules evaluation.");
        }
        if let Some(err) = status.evaluation_error.as_deref().filter(|e| !e.is_empty()) {
            res.add_comment(format!("Evaluation error: {err}"));
        }

        res.set_headers(["resources", "nonResourceURLs", "resourceNames", "verbs"]);
        for rule in compact_rules(&status) {
            res.add_content(vec![
                Value::from(rule.resources),
                Value::from(rule.non_resource_urls),
                Value::from(rule.resource_names),
                Value::from(rule.verbs),
            ]);
        }
        Ok(res)
    }
}

/// A rule as displayed, resources already combined with their group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DisplayRule {
    pub resources: Vec<String>,
    pub non_resource_urls: Vec<String>,
    pub resource_names: Vec<String>,
    pub verbs: Vec<String>,
}

/// `resource.group`, or just `resource` for the core group
pub fn combine_resource_group(resource: &str, group: &str) -> String {
    if group.is_empty() {
        resource.to_string()
    } else {
        format!("{resource}.{group}")
    }
}

/// Break every rule down to single resource (or URL) entries, then merge
/// the verbs of entries that target the same thing. Output is sorted.
pub fn compact_rules(status: &SubjectRulesReviewStatus) -> Vec<DisplayRule> {
    let mut by_target: BTreeMap<(String, Option<String>, bool), BTreeSet<String>> = BTreeMap::new();

    for rule in &status.resource_rules {
        let groups = rule.api_groups.clone().unwrap_or_else(|| vec![String::new()]);
        let resources = rule.resources.clone().unwrap_or_default();
        let names: Vec<Option<String>> = match &rule.resource_names {
            Some(names) if !names.is_empty() => names.iter().cloned().map(Some).collect(),
            _ => vec![None],
        };
        for group in &groups {
            for resource in &resources {
                for name in &names {
                    by_target
                        .entry((combine_resource_group(resource, group), name.clone(), false))
                        .or_default()
                        .extend(rule.verbs.iter().cloned());
                }
            }
        }
    }

    for rule in &status.non_resource_rules {
        for url in rule.non_resource_urls.clone().unwrap_or_default() {
            by_target
                .entry((url, None, true))
                .or_default()
                .extend(rule.verbs.iter().cloned());
        }
    }

    let mut rules: Vec<DisplayRule> = by_target
        .into_iter()
        .map(|((target, name, non_resource), verbs)| {
            let verbs = verbs.into_iter().collect();
            if non_resource {
                DisplayRule {
                    resources: Vec::new(),
                    non_resource_urls: vec![target],
                    resource_names: Vec::new(),
                    verbs,
                }
            } else {
                DisplayRule {
                    resources: vec![target],
                    non_resource_urls: Vec::new(),
                    resource_names: name.into_iter().collect(),
                    verbs,
                }
            }
        })
        .collect();
    rules.sort();
    rules
}
