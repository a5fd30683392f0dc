//! Conversion of raw workload images into report records

use crate::collector::resolve::Tags;
use crate::model::{AnnotationNamespaces, OutputRecord, RawImageRecord};

const APP_NAME_LABEL: &str = "app.kubernetes.io/name";
const APP_VERSION_LABEL: &str = "app.kubernetes.io/version";

/// Builds the report record for `raw`, taking each field from its annotation
/// when present and parseable, otherwise from `defaults`.
///
/// Never fails: a malformed value only affects its own field.
pub fn convert(
    raw: &RawImageRecord,
    defaults: &OutputRecord,
    names: &AnnotationNamespaces,
) -> OutputRecord {
    let tags = Tags::new(&raw.tags);
    let base = |suffix: &str| format!("{}{}", names.base, suffix);
    let scans = |suffix: &str| format!("{}{}", names.scans, suffix);
    let contact = |suffix: &str| format!("{}{}", names.contact, suffix);
    let defect_dojo = |suffix: &str| format!("{}{}", names.defect_dojo, suffix);

    let string = |key: String, default: &String| tags.string(&key).or_default(default.clone());
    let flag = |key: String, default: bool| tags.bool(&key).or_default(default);

    OutputRecord {
        namespace: raw.namespace.clone(),
        image: raw.image.clone(),
        image_id: raw.image_id.clone(),

        environment: string(base("environment"), &defaults.environment),
        product: string(base("product"), &defaults.product),
        description: string(base("description"), &defaults.description),
        app_kubernetes_io_name: tags.string(APP_NAME_LABEL).or_default(String::new()),
        app_kubernetes_io_version: tags.string(APP_VERSION_LABEL).or_default(String::new()),
        container_type: string(base("container-type"), &defaults.container_type),
        skip: flag(scans("skip"), defaults.skip),
        namespace_filter: string(scans("namespace-filter"), &defaults.namespace_filter),
        namespace_filter_negated: string(
            scans("negated_namespace_filter"),
            &defaults.namespace_filter_negated,
        ),
        engagement_tags: tags
            .string_list(&defect_dojo("engagement-tags"))
            .or_default(defaults.engagement_tags.clone()),

        team: string(contact("team"), &defaults.team),
        team_uuid: string(contact("team_uuid"), &defaults.team_uuid),
        slack: string(contact("slack"), &defaults.slack),
        email: string(contact("email"), &defaults.email),
        owners: tags.json(&contact("owners")).or_default(defaults.owners.clone()),
        notifications: tags
            .json(&contact("notifications"))
            .or_default(defaults.notifications.clone()),

        is_scan_baseimage_lifetime: flag(
            scans("is-scan-baseimage-lifetime"),
            defaults.is_scan_baseimage_lifetime,
        ),
        is_scan_dependency_check: flag(
            scans("is-scan-dependency-check"),
            defaults.is_scan_dependency_check,
        ),
        is_scan_dependency_track: flag(
            scans("is-scan-dependency-track"),
            defaults.is_scan_dependency_track,
        ),
        is_scan_distroless: flag(scans("is-scan-distroless"), defaults.is_scan_distroless),
        is_scan_lifetime: flag(scans("is-scan-lifetime"), defaults.is_scan_lifetime),
        is_scan_malware: flag(scans("is-scan-malware"), defaults.is_scan_malware),
        is_scan_new_version: flag(scans("is-scan-new-version"), defaults.is_scan_new_version),
        is_scan_runasroot: flag(scans("is-scan-runasroot"), defaults.is_scan_runasroot),
        is_scan_potentially_running_as_root: flag(
            scans("is-scan-potentially-running-as-root"),
            defaults.is_scan_potentially_running_as_root,
        ),
        is_scan_run_as_privileged: flag(
            scans("is-scan-run-as-privileged"),
            defaults.is_scan_run_as_privileged,
        ),
        is_scan_potentially_running_as_privileged: flag(
            scans("is-scan-potentially-running-as-privileged"),
            defaults.is_scan_potentially_running_as_privileged,
        ),
        scan_lifetime_max_days: tags
            .int64(&scans("scan-lifetime-max-days"))
            .or_default(defaults.scan_lifetime_max_days),
    }
}
