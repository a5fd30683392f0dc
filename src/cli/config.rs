//! Run configuration built from the parsed arguments

use crate::cli::args::Args;
use crate::encode::OutputFormat;
use crate::error::{CollectorError, Result};
use crate::model::{AnnotationNamespaces, Notifications, Owner, OutputRecord};
use crate::sink::{ApiConfig, GitConfig, S3Config, StorageConfig};
use crate::source::KubeConfig;
use serde::de::DeserializeOwned;

/// Immutable settings of one collector run
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub environment: String,
    /// Fallback values for every record
    pub defaults: OutputRecord,
    pub annotation_names: AnnotationNamespaces,
    pub image_filters: Vec<String>,
    pub storage: StorageConfig,
    pub kube: KubeConfig,
    pub output_format: OutputFormat,
}

impl CollectorConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let owners: Vec<Owner> = parse_json_flag("owners", &args.owners)?;
        let notifications: Notifications = parse_json_flag("notifications", &args.notifications)?;

        let defaults = OutputRecord {
            environment: args.environment_name.clone(),
            product: args.product.clone(),
            description: args.description.clone(),
            container_type: args.container_type.clone(),
            skip: args.skip,
            namespace_filter: args.namespace_filter.clone(),
            namespace_filter_negated: args.negated_namespace_filter.clone(),
            engagement_tags: non_empty(&args.engagement_tags),
            team: args.team.clone(),
            team_uuid: args.team_uuid.clone(),
            slack: args.slack.clone(),
            email: args.email.clone(),
            owners,
            notifications,
            is_scan_baseimage_lifetime: args.is_scan_baseimage_lifetime,
            is_scan_dependency_check: args.is_scan_dependency_check,
            is_scan_dependency_track: args.is_scan_dependency_track,
            is_scan_distroless: args.is_scan_distroless,
            is_scan_lifetime: args.is_scan_lifetime,
            is_scan_malware: args.is_scan_malware,
            is_scan_new_version: args.is_scan_new_version,
            is_scan_runasroot: args.is_scan_runasroot,
            is_scan_potentially_running_as_root: args.is_scan_potentially_running_as_root,
            is_scan_run_as_privileged: args.is_scan_run_as_privileged,
            is_scan_potentially_running_as_privileged: args.is_scan_potentially_running_as_privileged,
            scan_lifetime_max_days: args.scan_lifetime_max_days,
            ..OutputRecord::default()
        };

        let storage = StorageConfig {
            storage: args.storage.clone(),
            file_name: args.filename.clone(),
            api: ApiConfig {
                api_key: args.api_key.clone(),
                api_signature: args.api_signature.clone(),
                api_endpoint: args.api_endpoint.clone(),
                http_headers: args.http_header.clone(),
            },
            s3: S3Config {
                bucket: args.s3_bucket.clone(),
                endpoint: args.s3_endpoint.clone(),
                region: args.s3_region.clone(),
                insecure: args.s3_insecure,
            },
            git: GitConfig {
                url: args.git_url.clone(),
                directory: args.git_directory.clone(),
                password: args.git_password.clone(),
                private_key_file: args.git_private_key_file.clone(),
            },
        };

        Ok(Self {
            environment: args.environment_name.clone(),
            defaults,
            annotation_names: AnnotationNamespaces {
                base: args.annotation_name_base.clone(),
                scans: args.annotation_name_scans.clone(),
                contact: args.annotation_name_contact.clone(),
                defect_dojo: args.annotation_name_defect_dojo.clone(),
            },
            image_filters: non_empty(&args.image_filter),
            storage,
            kube: KubeConfig {
                config_file: args.kube_config.clone(),
                context: args.kube_context.clone(),
                master_url: args.master_url.clone(),
            },
            output_format: args.output_format,
        })
    }
}

/// An empty value means "not set"; anything else must decode.
fn parse_json_flag<T: DeserializeOwned + Default>(flag: &str, value: &str) -> Result<T> {
    if value.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str::<Option<T>>(value)
        .map(Option::unwrap_or_default)
        .map_err(|e| CollectorError::Config(format!("Could not parse --{} as JSON: {}", flag, e)))
}

// `--image-filter ""` must not turn into a match-everything pattern
fn non_empty(values: &[String]) -> Vec<String> {
    values.iter().filter(|v| !v.is_empty()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["collector"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_record() {
        let config = CollectorConfig::from_args(&args(&[
            "--environment-name",
            "prod",
            "--team",
            "checkout",
            "--engagement-tags",
            "pci,gdpr",
        ]))
        .unwrap();

        assert_eq!(config.environment, "prod");
        assert_eq!(config.defaults.environment, "prod");
        assert_eq!(config.defaults.team, "checkout");
        assert_eq!(config.defaults.engagement_tags, vec!["pci", "gdpr"]);
        assert_eq!(config.defaults.container_type, "application");
        assert_eq!(config.defaults.scan_lifetime_max_days, 120);
        assert!(config.defaults.owners.is_empty());
        assert_eq!(config.defaults.notifications, Notifications::default());
        assert_eq!(config.annotation_names, AnnotationNamespaces::default());
        assert_eq!(config.storage.file_name("prod"), "prod-output.json");
    }

    #[test]
    fn test_owners_and_notifications_json() {
        let config = CollectorConfig::from_args(&args(&[
            "--owners",
            r#"[{"role":"lead","uuid":"1","name":"Ana"}]"#,
            "--notifications",
            r##"{"slack":["#alerts"]}"##,
        ]))
        .unwrap();
        assert_eq!(config.defaults.owners[0].name, "Ana");
        assert_eq!(config.defaults.notifications.slack, vec!["#alerts"]);
    }

    #[test]
    fn test_invalid_owners_is_config_error() {
        let err = CollectorConfig::from_args(&args(&["--owners", "[{"])).unwrap_err();
        assert!(matches!(err, CollectorError::Config(_)));
        assert!(err.to_string().contains("--owners"));

        let err = CollectorConfig::from_args(&args(&["--notifications", "nope"])).unwrap_err();
        assert!(matches!(err, CollectorError::Config(_)));
    }

    #[test]
    fn test_empty_image_filter_is_dropped() {
        let config = CollectorConfig::from_args(&args(&["-s", ""])).unwrap();
        assert!(config.image_filters.is_empty());
    }
}
