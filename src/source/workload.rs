//! Image extraction from Kubernetes workload objects

use crate::model::{ImageType, RawImageRecord};
use crate::source::{Namespace, merge_tags};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Container, ContainerStatus, Namespace as NamespaceObject, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

impl From<NamespaceObject> for Namespace {
    fn from(object: NamespaceObject) -> Self {
        Namespace {
            name: object.metadata.name.unwrap_or_default(),
            labels: into_map(object.metadata.labels),
            annotations: into_map(object.metadata.annotations),
        }
    }
}

fn into_map(map: Option<BTreeMap<String, String>>) -> HashMap<String, String> {
    map.unwrap_or_default().into_iter().collect()
}

fn workload_tags(metadata: &ObjectMeta, namespace: &Namespace) -> HashMap<String, String> {
    merge_tags(
        &into_map(metadata.labels.clone()),
        &into_map(metadata.annotations.clone()),
        namespace,
    )
}

fn record(
    image: String,
    image_id: String,
    namespace: &Namespace,
    tags: &HashMap<String, String>,
    image_type: ImageType,
) -> RawImageRecord {
    debug!(namespace = %namespace.name, image = %image, image_type = %image_type, "Adding image");
    RawImageRecord {
        image,
        image_id,
        namespace: namespace.name.clone(),
        tags: tags.clone(),
        image_type,
    }
}

/// Images of a running pod.
///
/// Containers with a status use the status image (falling back to the spec
/// image) and carry the resolved image id. Spec containers without a status
/// follow with an empty image id. Containers without any image are dropped.
pub fn pod_images(pod: &Pod, namespace: &Namespace) -> Vec<RawImageRecord> {
    let tags = workload_tags(&pod.metadata, namespace);
    let spec = pod.spec.clone().unwrap_or_default();
    let status = pod.status.clone().unwrap_or_default();

    let mut init_containers = spec.init_containers.unwrap_or_default();
    let mut containers = spec.containers;
    let init_statuses = status.init_container_statuses.unwrap_or_default();
    let statuses = status.container_statuses.unwrap_or_default();

    let mut images = Vec::new();
    let with_status: [(&[ContainerStatus], &mut Vec<Container>, ImageType); 2] = [
        (&init_statuses, &mut init_containers, ImageType::InitContainer),
        (&statuses, &mut containers, ImageType::Container),
    ];
    for (statuses, spec, image_type) in with_status {
        for status in statuses {
            let spec_image = take_image_by_name(spec, &status.name).unwrap_or_default();
            let image = if status.image.is_empty() {
                spec_image
            } else {
                status.image.clone()
            };
            if image.is_empty() {
                continue;
            }
            images.push(record(image, status.image_id.clone(), namespace, &tags, image_type));
        }
    }

    for (spec, image_type) in [
        (init_containers, ImageType::InitContainer),
        (containers, ImageType::Container),
    ] {
        for image in spec.into_iter().filter_map(|c| c.image).filter(|i| !i.is_empty()) {
            images.push(record(image, String::new(), namespace, &tags, image_type));
        }
    }

    images
}

pub fn job_images(job: &Job, namespace: &Namespace) -> Vec<RawImageRecord> {
    let spec = job.spec.as_ref().and_then(|spec| spec.template.spec.as_ref());
    template_images(&job.metadata, spec, namespace, ImageType::Job)
}

pub fn cronjob_images(cronjob: &CronJob, namespace: &Namespace) -> Vec<RawImageRecord> {
    let spec = cronjob
        .spec
        .as_ref()
        .and_then(|spec| spec.job_template.spec.as_ref())
        .and_then(|job| job.template.spec.as_ref());
    template_images(&cronjob.metadata, spec, namespace, ImageType::CronJob)
}

/// Images of a pod template; there is no status, so image ids stay empty.
fn template_images(
    metadata: &ObjectMeta,
    spec: Option<&PodSpec>,
    namespace: &Namespace,
    image_type: ImageType,
) -> Vec<RawImageRecord> {
    let Some(spec) = spec else {
        return Vec::new();
    };
    let tags = workload_tags(metadata, namespace);

    let containers = spec.containers.iter().map(|c| (c, image_type));
    let init_containers = spec
        .init_containers
        .iter()
        .flatten()
        .map(|c| (c, ImageType::InitContainer));

    containers
        .chain(init_containers)
        .filter_map(|(container, image_type)| {
            let image = container.image.clone().filter(|image| !image.is_empty())?;
            Some(record(image, String::new(), namespace, &tags, image_type))
        })
        .collect()
}

fn take_image_by_name(containers: &mut Vec<Container>, name: &str) -> Option<String> {
    let index = containers.iter().position(|c| c.name == name)?;
    containers.remove(index).image
}
