//! Workload sources
//!
//! A source lists namespaces and then every image running in them, each with
//! the merged labels and annotations of its workload and namespace.

pub mod cluster;
pub mod workload;

pub use cluster::{KubeConfig, KubeSource};

use crate::error::Result;
use crate::model::RawImageRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,
}

#[async_trait]
pub trait WorkloadSource: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>>;

    /// Images of pods, init containers, jobs and cron-jobs in `namespaces`
    async fn list_images(&self, namespaces: &[Namespace]) -> Result<Vec<RawImageRecord>>;

    async fn list_all_images(&self) -> Result<Vec<RawImageRecord>> {
        let namespaces = self.list_namespaces().await?;
        let images = self.list_images(&namespaces).await?;

        let names: Vec<&str> = namespaces.iter().map(|ns| ns.name.as_str()).collect();
        info!(
            namespaces = %names.join(", "),
            images = images.len(),
            "All images for namespaces have been parsed"
        );
        Ok(images)
    }
}

/// Tag map of a workload: its labels and annotations with namespace values
/// filling the gaps, then annotations laid over labels.
pub fn merge_tags(
    labels: &HashMap<String, String>,
    annotations: &HashMap<String, String>,
    namespace: &Namespace,
) -> HashMap<String, String> {
    let mut tags = underlay(labels, &namespace.labels);
    tags.extend(underlay(annotations, &namespace.annotations));
    tags
}

fn underlay(
    own: &HashMap<String, String>,
    fallback: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = fallback.clone();
    merged.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
