//! kubedig - dig around a Kubernetes environment with pluggable diagnostic buckets

pub mod bucket;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod plugins;
