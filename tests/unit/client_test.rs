//! Tests for src/client/mod.rs - namespace resolution and in-cluster detection

use kube::config::Kubeconfig;
use kubedig::client::{is_in_cluster, namespace_from_kubeconfig, KUBERNETES_HOST_ENV};
use serial_test::serial;

const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
clusters:
- name: local
  cluster:
    server: https://127.0.0.1:6443
users:
- name: admin
  user:
    token: abc
contexts:
- name: dev
  context:
    cluster: local
    user: admin
    namespace: team-a
- name: bare
  context:
    cluster: local
    user: admin
"#;

fn kubeconfig() -> Kubeconfig {
    Kubeconfig::from_yaml(KUBECONFIG).unwrap()
}

// ============================================================================
// namespace tests
// ============================================================================

#[test]
fn test_namespace_of_current_context() {
    assert_eq!(namespace_from_kubeconfig(&kubeconfig(), None).unwrap(), "team-a");
}

#[test]
fn test_namespace_defaults_when_context_has_none() {
    assert_eq!(namespace_from_kubeconfig(&kubeconfig(), Some("bare")).unwrap(), "default");
}

#[test]
fn test_namespace_unknown_context() {
    let err = namespace_from_kubeconfig(&kubeconfig(), Some("prod")).unwrap_err();
    assert!(err.to_string().contains("Context not found: prod"));
}

#[test]
fn test_namespace_without_current_context() {
    let mut config = kubeconfig();
    config.current_context = None;
    assert!(namespace_from_kubeconfig(&config, None).is_err());
}

// ============================================================================
// in-cluster detection tests
// ============================================================================

#[test]
#[serial]
fn test_is_in_cluster_follows_service_host() {
    let saved = std::env::var_os(KUBERNETES_HOST_ENV);

    std::env::set_var(KUBERNETES_HOST_ENV, "10.96.0.1");
    assert!(is_in_cluster());
    std::env::remove_var(KUBERNETES_HOST_ENV);
    assert!(!is_in_cluster());

    if let Some(value) = saved {
        std::env::set_var(KUBERNETES_HOST_ENV, value);
    }
}

// ============================================================================
// service account path tests
// ============================================================================

#[test]
fn test_service_account_paths_use_var_run() {
    use kubedig::client::{SERVICE_ACCOUNT_DIR, SERVICE_ACCOUNT_NAMESPACE};
    use kubedig::plugins::token::TOKEN_PATH;

    assert_eq!(SERVICE_ACCOUNT_DIR, "/var/run/secrets/kubernetes.io/serviceaccount");
    assert_eq!(SERVICE_ACCOUNT_NAMESPACE, format!("{SERVICE_ACCOUNT_DIR}/namespace"));
    assert_eq!(TOKEN_PATH, SERVICE_ACCOUNT_DIR);
}
