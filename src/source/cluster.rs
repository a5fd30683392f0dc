//! Workload source backed by the Kubernetes API
//!
//! The client is built lazily on the first listing, from an explicit
//! kubeconfig, the default kubeconfig, or the in-cluster service account, in
//! that order.

use crate::error::{CollectorError, Result};
use crate::model::RawImageRecord;
use crate::source::workload::{cronjob_images, job_images, pod_images};
use crate::source::{Namespace, WorkloadSource};
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Namespace as NamespaceObject, Pod};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct KubeConfig {
    /// Path of a kubeconfig file; `KUBECONFIG` or `~/.kube/config` when empty
    pub config_file: String,
    pub context: String,
    /// Overrides the API server address of the selected cluster
    pub master_url: String,
}

impl KubeConfig {
    /// Resolves the client configuration without contacting the cluster
    pub async fn client_config(&self) -> Result<Config> {
        let kubeconfig = if self.config_file.is_empty() {
            Kubeconfig::read().ok()
        } else {
            Some(Kubeconfig::read_from(&self.config_file).map_err(|e| {
                CollectorError::Enumeration(format!("unable to read kubeconfig {}: {}", self.config_file, e))
            })?)
        };

        let mut config = match kubeconfig {
            Some(kubeconfig) => {
                info!("Using kubeconfig");
                let options = KubeConfigOptions {
                    context: Some(self.context.clone()).filter(|c| !c.is_empty()),
                    ..KubeConfigOptions::default()
                };
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| CollectorError::Enumeration(format!("invalid kubeconfig: {}", e)))?
            }
            None => {
                info!("Using in-cluster config based on the service account token");
                Config::incluster().map_err(|e| {
                    CollectorError::Enumeration(format!("unable to load in-cluster config: {}", e))
                })?
            }
        };

        if !self.master_url.is_empty() {
            config.cluster_url = self.master_url.parse().map_err(|e| {
                CollectorError::Enumeration(format!("invalid master URL {}: {}", self.master_url, e))
            })?;
        }
        Ok(config)
    }
}

pub struct KubeSource {
    config: KubeConfig,
    client: OnceCell<Client>,
}

impl KubeSource {
    pub fn new(config: KubeConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<Client> {
        self.client
            .get_or_try_init(|| async {
                let config = self.config.client_config().await?;
                Client::try_from(config).map_err(|e| {
                    CollectorError::Enumeration(format!("unable to create Kubernetes client: {}", e))
                })
            })
            .await
            .cloned()
    }

    async fn list<K>(&self, api: Api<K>, kind: &str, namespace: Option<&str>) -> Result<Vec<K>>
    where
        K: kube::Resource + Clone + serde::de::DeserializeOwned + std::fmt::Debug,
    {
        debug!(kind = %kind, namespace = ?namespace, "Listing cluster objects");
        let list = api.list(&ListParams::default()).await.map_err(|e| {
            CollectorError::Enumeration(format!("unable to list {}: {}", kind, e))
        })?;
        Ok(list.items)
    }
}

#[async_trait]
impl WorkloadSource for KubeSource {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let api: Api<NamespaceObject> = Api::all(self.client().await?);
        let namespaces = self.list(api, "namespaces", None).await?;
        Ok(namespaces.into_iter().map(Namespace::from).collect())
    }

    async fn list_images(&self, namespaces: &[Namespace]) -> Result<Vec<RawImageRecord>> {
        let client = self.client().await?;
        let mut images = Vec::new();

        for namespace in namespaces {
            let name = namespace.name.as_str();

            let pods = self.list(Api::<Pod>::namespaced(client.clone(), name), "pods", Some(name)).await?;
            for pod in &pods {
                images.extend(pod_images(pod, namespace));
            }

            let jobs = self.list(Api::<Job>::namespaced(client.clone(), name), "jobs", Some(name)).await?;
            for job in &jobs {
                images.extend(job_images(job, namespace));
            }

            let cronjobs = self
                .list(Api::<CronJob>::namespaced(client.clone(), name), "cronjobs", Some(name))
                .await?;
            for cronjob in &cronjobs {
                images.extend(cronjob_images(cronjob, namespace));
            }
        }

        Ok(images)
    }
}
