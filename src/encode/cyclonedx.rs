//! CycloneDX bill of materials with one container component per record

use crate::error::Result;
use crate::model::OutputRecord;
use serde::{Deserialize, Serialize};

pub const BOM_FORMAT: &str = "CycloneDX";
pub const SPEC_VERSION: &str = "1.5";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bom {
    pub bom_format: String,
    pub spec_version: String,
    pub version: u32,
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub purl: String,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    fn new(name: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

impl From<&OutputRecord> for Component {
    fn from(record: &OutputRecord) -> Self {
        let properties = vec![
            Property::new("namespace", &record.namespace),
            Property::new("environment", &record.environment),
            Property::new("product", &record.product),
            Property::new("description", &record.description),
            Property::new("app_kubernetes_io_name", &record.app_kubernetes_io_name),
            Property::new("container_type", &record.container_type),
            Property::new("team", &record.team),
            Property::new("team_uuid", &record.team_uuid),
            Property::new("slack", &record.slack),
            Property::new("email", &record.email),
            Property::new("skip", record.skip),
            Property::new("namespace_filter", &record.namespace_filter),
            Property::new("namespace_filter_negated", &record.namespace_filter_negated),
            Property::new("is_scan_baseimage_lifetime", record.is_scan_baseimage_lifetime),
            Property::new("is_scan_dependency_check", record.is_scan_dependency_check),
            Property::new("is_scan_dependency_track", record.is_scan_dependency_track),
            Property::new("is_scan_distroless", record.is_scan_distroless),
            Property::new("is_scan_lifetime", record.is_scan_lifetime),
            Property::new("is_scan_malware", record.is_scan_malware),
            Property::new("is_scan_new_version", record.is_scan_new_version),
            Property::new("is_scan_runasroot", record.is_scan_runasroot),
            Property::new(
                "is_scan_potentially_running_as_root",
                record.is_scan_potentially_running_as_root,
            ),
            Property::new("is_scan_run_as_privileged", record.is_scan_run_as_privileged),
            Property::new(
                "is_scan_potentially_running_as_privileged",
                record.is_scan_potentially_running_as_privileged,
            ),
            Property::new("scan_lifetime_max_days", record.scan_lifetime_max_days),
        ];

        Self {
            component_type: "container".to_string(),
            name: record.image.clone(),
            version: record.app_kubernetes_io_version.clone(),
            purl: record.image_id.clone(),
            properties,
        }
    }
}

pub fn bom(records: &[OutputRecord]) -> Bom {
    Bom {
        bom_format: BOM_FORMAT.to_string(),
        spec_version: SPEC_VERSION.to_string(),
        version: 1,
        components: records.iter().map(Component::from).collect(),
    }
}

pub fn encode(records: &[OutputRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&bom(records))?)
}
