//! Tests for src/bucket/registry.rs - Buckets

use kubedig::bucket::{BucketInfo, Buckets, Config};
use kubedig::error::DigError;
use kubedig::plugins::default_buckets;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

#[allow(dead_code)]
mod common {
    include!("../common/mod.rs");
}

fn runs() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

// ============================================================================
// register tests
// ============================================================================

#[test]
fn test_register_and_resolve() {
    let buckets = Buckets::new();
    buckets
        .register(common::ok_bucket("alpha", runs()).with_aliases(&["al", "a1"]))
        .unwrap();

    assert_eq!(buckets.resolve_alias("alpha"), Some("alpha"));
    assert_eq!(buckets.resolve_alias("al"), Some("alpha"));
    assert_eq!(buckets.resolve_alias("a1"), Some("alpha"));
    assert_eq!(buckets.resolve_alias("beta"), None);
}

#[test]
fn test_register_duplicate_name_fails() {
    let buckets = Buckets::new();
    buckets.register(common::ok_bucket("alpha", runs())).unwrap();
    let err = buckets.register(common::ok_bucket("alpha", runs())).unwrap_err();
    assert!(matches!(err, DigError::Registration(_)));
}

#[test]
fn test_register_alias_colliding_with_name_fails() {
    let buckets = Buckets::new();
    buckets.register(common::ok_bucket("alpha", runs())).unwrap();
    let err = buckets
        .register(common::ok_bucket("beta", runs()).with_aliases(&["alpha"]))
        .unwrap_err();
    assert!(matches!(err, DigError::Registration(_)));
    assert_eq!(buckets.resolve_alias("beta"), None);
}

#[test]
fn test_register_alias_colliding_with_alias_fails() {
    let buckets = Buckets::new();
    buckets
        .register(common::ok_bucket("alpha", runs()).with_aliases(&["x"]))
        .unwrap();
    let err = buckets
        .register(common::ok_bucket("beta", runs()).with_aliases(&["x"]))
        .unwrap_err();
    assert!(matches!(err, DigError::Registration(_)));
}

#[test]
fn test_register_name_colliding_with_alias_fails() {
    let buckets = Buckets::new();
    buckets
        .register(common::ok_bucket("alpha", runs()).with_aliases(&["beta"]))
        .unwrap();
    assert!(buckets.register(common::ok_bucket("beta", runs())).is_err());
}

#[test]
fn test_register_empty_name_fails() {
    let buckets = Buckets::new();
    assert!(buckets.register(common::ok_bucket("", runs())).is_err());
}

#[test]
fn test_register_empty_description_fails() {
    let buckets = Buckets::new();
    let info = BucketInfo::new("alpha", "", |_c: &Config| Err(DigError::MissingClient));
    assert!(matches!(
        buckets.register(info),
        Err(DigError::Registration(_))
    ));
}

// ============================================================================
// listing tests
// ============================================================================

#[test]
fn test_registered_is_sorted_and_unique() {
    let buckets = Buckets::new();
    for name in ["zeta", "alpha", "mid"] {
        buckets.register(common::ok_bucket(name, runs())).unwrap();
    }
    assert_eq!(buckets.registered(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_registered_passive_excludes_side_effects() {
    let buckets = Buckets::new();
    buckets.register(common::ok_bucket("passive", runs())).unwrap();
    buckets
        .register(common::ok_bucket("loud", runs()).with_side_effects())
        .unwrap();

    assert_eq!(buckets.registered(), vec!["loud", "passive"]);
    assert_eq!(buckets.registered_passive(), vec!["passive"]);
}

#[test]
fn test_lookups_by_alias() {
    let buckets = Buckets::new();
    buckets
        .register(
            common::client_bucket("remote", runs())
                .with_aliases(&["rm"])
                .with_side_effects(),
        )
        .unwrap();

    assert_eq!(buckets.describe("rm"), "needs a client");
    assert_eq!(buckets.aliases("remote"), &["rm"]);
    assert!(buckets.has_side_effects("rm"));
    assert!(buckets.requires_client("rm"));
}

#[test]
fn test_lookups_unknown_are_empty() {
    let buckets = Buckets::new();
    assert_eq!(buckets.describe("nope"), "");
    assert!(buckets.aliases("nope").is_empty());
    assert!(!buckets.has_side_effects("nope"));
    assert!(!buckets.requires_client("nope"));
    assert!(buckets.info("nope").is_none());
}

// ============================================================================
// init_bucket tests
// ============================================================================

#[test]
fn test_init_unknown_bucket() {
    let buckets = Buckets::new();
    let err = buckets.init_bucket("ghost", &Config::default()).err().unwrap();
    assert!(matches!(err, DigError::UnknownBucket(name) if name == "ghost"));
}

#[test]
fn test_init_missing_client_passes_through() {
    let buckets = Buckets::new();
    buckets.register(common::client_bucket("remote", runs())).unwrap();
    let err = buckets.init_bucket("remote", &Config::default()).err().unwrap();
    assert!(matches!(err, DigError::MissingClient));
}

#[test]
fn test_init_other_errors_are_wrapped() {
    let buckets = Buckets::new();
    let info = BucketInfo::new("broken", "fails to build", |_c: &Config| {
        Err(DigError::bucket("boom"))
    })
    .with_aliases(&["br"]);
    buckets.register(info).unwrap();

    let err = buckets.init_bucket("br", &Config::default()).err().unwrap();
    match err {
        DigError::BucketInit { name, reason } => {
            assert_eq!(name, "br");
            assert_eq!(reason, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_init_by_alias_runs_bucket() {
    let counter = runs();
    let buckets = Buckets::new();
    buckets
        .register(common::ok_bucket("alpha", Arc::clone(&counter)).with_aliases(&["al"]))
        .unwrap();

    let bucket = buckets.init_bucket("al", &Config::default()).unwrap();
    let results = bucket.run().await.unwrap();
    assert_eq!(results.name(), "alpha");
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
}

// ============================================================================
// built-in catalogue tests
// ============================================================================

#[test]
fn test_default_buckets_catalogue() {
    let buckets = default_buckets().unwrap();
    let names = buckets.registered();
    assert_eq!(names.len(), 19);
    assert!(names.windows(2).all(|w| w[0] < w[1]));

    assert!(buckets.has_side_effects("admission"));
    assert!(buckets.has_side_effects("syscalls"));
    let passive = buckets.registered_passive();
    assert_eq!(passive.len(), 17);
    assert!(!passive.contains(&"admission"));
    assert!(!passive.contains(&"syscalls"));
}

#[test]
fn test_default_buckets_client_requirements() {
    let buckets = default_buckets().unwrap();
    for name in ["admission", "apiresources", "authorization", "version"] {
        assert!(buckets.requires_client(name), "{name} should need a client");
    }
    for name in ["environment", "mount", "token", "capabilities", "syscalls"] {
        assert!(!buckets.requires_client(name), "{name} should not need a client");
    }
}

#[test]
fn test_default_buckets_aliases() {
    let buckets = default_buckets().unwrap();
    assert_eq!(buckets.resolve_alias("env"), Some("environment"));
    assert_eq!(buckets.resolve_alias("adm"), Some("admission"));
    assert_eq!(buckets.resolve_alias("ps"), Some("processes"));
    assert_eq!(buckets.resolve_alias("pidns"), Some("pidnamespace"));
    assert_eq!(buckets.resolve_alias("api"), Some("apiresources"));
}

#[test]
fn test_client_buckets_refuse_without_client() {
    let buckets = default_buckets().unwrap();
    for name in ["admission", "apiresources", "authorization", "version"] {
        let err = buckets.init_bucket(name, &Config::default()).err().unwrap();
        assert!(matches!(err, DigError::MissingClient), "{name}");
    }
}
