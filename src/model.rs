//! Data model shared by the collection pipeline
//!
//! [`RawImageRecord`] is what the workload source hands over, [`OutputRecord`]
//! is one line of the final report. Defaults are an [`OutputRecord`] too.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Where an image was found inside a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Container,
    InitContainer,
    Job,
    #[serde(rename = "cronjob")]
    CronJob,
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageType::Container => write!(f, "container"),
            ImageType::InitContainer => write!(f, "init_container"),
            ImageType::Job => write!(f, "job"),
            ImageType::CronJob => write!(f, "cronjob"),
        }
    }
}

/// An image as reported by the workload source, before any resolution
#[derive(Debug, Clone, PartialEq)]
pub struct RawImageRecord {
    pub image: String,
    pub image_id: String,
    pub namespace: String,
    /// Labels and annotations of the workload, namespace values filled in
    pub tags: HashMap<String, String>,
    pub image_type: ImageType,
}

/// Key prefixes under which the collector looks up its annotations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationNamespaces {
    pub base: String,
    pub scans: String,
    pub contact: String,
    pub defect_dojo: String,
}

impl Default for AnnotationNamespaces {
    fn default() -> Self {
        Self {
            base: "sdase.org/".to_string(),
            scans: "clusterscanner.sdase.org/".to_string(),
            contact: "contact.sdase.org/".to_string(),
            defect_dojo: "defectdojo.sdase.org/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Notification channels of the owning team.
///
/// Sub-fields missing from a decoded document (or set to `null`) become empty
/// lists; they are not inherited from any default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifications {
    #[serde(default, deserialize_with = "null_as_default")]
    pub slack: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emails: Vec<String>,
    #[serde(
        rename = "msTeams",
        alias = "msteams",
        alias = "MSTeams",
        default,
        deserialize_with = "null_as_default"
    )]
    pub msteams: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One normalized line of the report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub namespace: String,
    pub image: String,
    pub image_id: String,

    pub environment: String,
    pub product: String,
    pub description: String,
    pub app_kubernetes_io_name: String,
    pub app_kubernetes_io_version: String,
    pub container_type: String,
    pub skip: bool,
    pub namespace_filter: String,
    pub namespace_filter_negated: String,
    pub engagement_tags: Vec<String>,

    pub team: String,
    pub team_uuid: String,
    pub slack: String,
    pub email: String,
    pub owners: Vec<Owner>,
    pub notifications: Notifications,

    pub is_scan_baseimage_lifetime: bool,
    pub is_scan_dependency_check: bool,
    pub is_scan_dependency_track: bool,
    pub is_scan_distroless: bool,
    pub is_scan_lifetime: bool,
    pub is_scan_malware: bool,
    pub is_scan_new_version: bool,
    pub is_scan_runasroot: bool,
    pub is_scan_potentially_running_as_root: bool,
    pub is_scan_run_as_privileged: bool,
    pub is_scan_potentially_running_as_privileged: bool,
    pub scan_lifetime_max_days: i64,
}
