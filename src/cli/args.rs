//! Command-line argument parsing
//!
//! Every flag can also be provided through a `COLLECTOR_` prefixed environment
//! variable; an explicit flag wins over the environment.

use crate::encode::OutputFormat;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "collector")]
#[command(about = "Collects the container images running in a Kubernetes cluster together with their scan metadata")]
#[command(version)]
pub struct Args {
    #[arg(
        long = "debug",
        env = "COLLECTOR_DEBUG",
        value_parser = BoolishValueParser::new(),
        help = "Set logging level to debug, default logging level is info"
    )]
    pub debug: bool,

    /// Regexes of images whose records get the skip flag
    #[arg(
        long = "image-filter",
        short = 's',
        env = "COLLECTOR_IMAGE_FILTER",
        value_delimiter = ',',
        help = "Images to set the skip flag to true, as comma separated regexes, e.g. 'mock-service,mongo,/istio/'"
    )]
    pub image_filter: Vec<String>,

    // Kubernetes connection
    #[arg(long = "kube-config", env = "COLLECTOR_KUBE_CONFIG", default_value = "", help = "Absolute path to the kubeconfig file")]
    pub kube_config: String,

    #[arg(
        long = "kube-context",
        env = "COLLECTOR_KUBE_CONTEXT",
        default_value = "",
        help = "The context to use to talk to the Kubernetes apiserver, defaults to the current context"
    )]
    pub kube_context: String,

    #[arg(long = "master-url", env = "COLLECTOR_MASTER_URL", default_value = "", help = "URL of the API server")]
    pub master_url: String,

    // Storage
    #[arg(
        long = "storage",
        env = "COLLECTOR_STORAGE",
        default_value = "api",
        help = "Write output to storage location [api, s3, git, fs, stdout]"
    )]
    pub storage: String,

    #[arg(
        long = "filename",
        env = "COLLECTOR_FILENAME",
        help = "Output filename, defaults to '<environment>-output.json'"
    )]
    pub filename: Option<String>,

    #[arg(
        long = "output-format",
        env = "COLLECTOR_OUTPUT_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json,
        help = "Document format of the report"
    )]
    pub output_format: OutputFormat,

    #[arg(long = "s3-bucket", env = "COLLECTOR_S3_BUCKET", default_value = "", help = "S3 bucket to store the collector results")]
    pub s3_bucket: String,

    #[arg(long = "s3-endpoint", env = "COLLECTOR_S3_ENDPOINT", default_value = "", help = "S3 endpoint (e.g. minio)")]
    pub s3_endpoint: String,

    #[arg(long = "s3-region", env = "COLLECTOR_S3_REGION", default_value = "", help = "S3 region")]
    pub s3_region: String,

    #[arg(
        long = "s3-insecure",
        env = "COLLECTOR_S3_INSECURE",
        value_parser = BoolishValueParser::new(),
        help = "Accept invalid TLS certificates from the S3 endpoint"
    )]
    pub s3_insecure: bool,

    #[arg(long = "git-url", env = "COLLECTOR_GIT_URL", default_value = "", help = "Git URL to push the report to")]
    pub git_url: String,

    #[arg(long = "git-directory", env = "COLLECTOR_GIT_DIRECTORY", default_value = "", help = "Directory to clone to")]
    pub git_directory: String,

    #[arg(long = "git-password", env = "COLLECTOR_GIT_PASSWORD", default_value = "", help = "Git password or token")]
    pub git_password: String,

    #[arg(
        long = "git-private-key-file",
        env = "COLLECTOR_GIT_PRIVATE_KEY_FILE",
        default_value = "",
        help = "Path to the private ssh key file"
    )]
    pub git_private_key_file: String,

    #[arg(long = "api-key", env = "COLLECTOR_API_KEY", default_value = "", help = "API key")]
    pub api_key: String,

    #[arg(long = "api-signature", env = "COLLECTOR_API_SIGNATURE", default_value = "", help = "API signature")]
    pub api_signature: String,

    #[arg(
        long = "api-endpoint",
        env = "COLLECTOR_API_ENDPOINT",
        default_value = "",
        help = "API endpoint, e.g. https://example.io/v1/account/$ACCOUNT/cluster/$CLUSTER/image-collector-report/images"
    )]
    pub api_endpoint: String,

    /// Extra request headers for the api storage
    #[arg(
        long = "http-header",
        env = "COLLECTOR_HTTP_HEADER",
        action = ArgAction::Append,
        help = "HTTP header in 'key:value' format, repeat the flag for multiple headers"
    )]
    pub http_header: Vec<String>,

    // Annotation names
    #[arg(
        long = "annotation-name-base",
        env = "COLLECTOR_ANNOTATION_NAME_BASE",
        default_value = "sdase.org/",
        help = "Annotation name for general annotations"
    )]
    pub annotation_name_base: String,

    #[arg(
        long = "annotation-name-scans",
        env = "COLLECTOR_ANNOTATION_NAME_SCANS",
        default_value = "clusterscanner.sdase.org/",
        help = "Annotation name for scan related annotations"
    )]
    pub annotation_name_scans: String,

    #[arg(
        long = "annotation-name-contact",
        env = "COLLECTOR_ANNOTATION_NAME_CONTACT",
        default_value = "contact.sdase.org/",
        help = "Annotation name for contact related annotations"
    )]
    pub annotation_name_contact: String,

    #[arg(
        long = "annotation-name-defect-dojo",
        env = "COLLECTOR_ANNOTATION_NAME_DEFECT_DOJO",
        default_value = "defectdojo.sdase.org/",
        help = "Annotation name for defectdojo related annotations"
    )]
    pub annotation_name_defect_dojo: String,

    // Record defaults
    #[arg(long = "environment-name", env = "COLLECTOR_ENVIRONMENT_NAME", default_value = "", help = "Name of the environment")]
    pub environment_name: String,

    #[arg(
        long = "is-scan-dependency-check",
        env = "COLLECTOR_IS_SCAN_DEPENDENCY_CHECK",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable DependencyCheck scan"
    )]
    pub is_scan_dependency_check: bool,

    #[arg(
        long = "is-scan-dependency-track",
        env = "COLLECTOR_IS_SCAN_DEPENDENCY_TRACK",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable DependencyTrack scan"
    )]
    pub is_scan_dependency_track: bool,

    #[arg(
        long = "is-scan-lifetime",
        env = "COLLECTOR_IS_SCAN_LIFETIME",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable Lifetime scan"
    )]
    pub is_scan_lifetime: bool,

    #[arg(
        long = "is-scan-baseimage-lifetime",
        env = "COLLECTOR_IS_SCAN_BASEIMAGE_LIFETIME",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable Baseimage Lifetime scan"
    )]
    pub is_scan_baseimage_lifetime: bool,

    #[arg(
        long = "is-scan-distroless",
        env = "COLLECTOR_IS_SCAN_DISTROLESS",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable Distroless scan"
    )]
    pub is_scan_distroless: bool,

    #[arg(
        long = "is-scan-malware",
        env = "COLLECTOR_IS_SCAN_MALWARE",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable Malware scan"
    )]
    pub is_scan_malware: bool,

    #[arg(
        long = "is-scan-new-version",
        env = "COLLECTOR_IS_SCAN_NEW_VERSION",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable New Version scan"
    )]
    pub is_scan_new_version: bool,

    #[arg(
        long = "is-scan-runasroot",
        env = "COLLECTOR_IS_SCAN_RUNASROOT",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable RunAsRoot scan"
    )]
    pub is_scan_runasroot: bool,

    #[arg(
        long = "is-scan-run-as-privileged",
        env = "COLLECTOR_IS_SCAN_RUN_AS_PRIVILEGED",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable RunAsPrivileged scan"
    )]
    pub is_scan_run_as_privileged: bool,

    #[arg(
        long = "is-scan-potentially-running-as-root",
        env = "COLLECTOR_IS_SCAN_POTENTIALLY_RUNNING_AS_ROOT",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable PotentiallyRunningAsRoot scan"
    )]
    pub is_scan_potentially_running_as_root: bool,

    #[arg(
        long = "is-scan-potentially-running-as-privileged",
        env = "COLLECTOR_IS_SCAN_POTENTIALLY_RUNNING_AS_PRIVILEGED",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default enable/disable PotentiallyRunningAsPrivileged scan"
    )]
    pub is_scan_potentially_running_as_privileged: bool,

    #[arg(
        long = "ScanLifetimeMaxDays",
        env = "COLLECTOR_SCANLIFETIMEMAXDAYS",
        default_value_t = 120,
        help = "Default max days for (base) image lifetime scan"
    )]
    pub scan_lifetime_max_days: i64,

    #[arg(
        long = "skip",
        env = "COLLECTOR_SKIP",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Default behaviour for skipping scans for images"
    )]
    pub skip: bool,

    #[arg(
        long = "engagement-tags",
        env = "COLLECTOR_ENGAGEMENT_TAGS",
        value_delimiter = ',',
        help = "Default engagement tags to use"
    )]
    pub engagement_tags: Vec<String>,

    #[arg(
        long = "container-type",
        env = "COLLECTOR_CONTAINER_TYPE",
        default_value = "application",
        help = "Default container-type to use"
    )]
    pub container_type: String,

    #[arg(long = "team", env = "COLLECTOR_TEAM", default_value = "", help = "Default team to use")]
    pub team: String,

    #[arg(long = "team-uuid", env = "COLLECTOR_TEAM_UUID", default_value = "", help = "Default team uuid to use")]
    pub team_uuid: String,

    #[arg(long = "product", env = "COLLECTOR_PRODUCT", default_value = "", help = "Default product to use")]
    pub product: String,

    #[arg(long = "description", env = "COLLECTOR_DESCRIPTION", default_value = "", help = "Default description to use")]
    pub description: String,

    #[arg(long = "slack", env = "COLLECTOR_SLACK", default_value = "", help = "Default slack channel to use")]
    pub slack: String,

    #[arg(long = "email", env = "COLLECTOR_EMAIL", default_value = "", help = "Default email to use")]
    pub email: String,

    /// JSON array of `{"role", "uuid", "name"}` objects
    #[arg(long = "owners", env = "COLLECTOR_OWNERS", default_value = "", help = "Default owners as JSON list")]
    pub owners: String,

    /// JSON object with `slack`, `emails` and `msteams` lists
    #[arg(
        long = "notifications",
        env = "COLLECTOR_NOTIFICATIONS",
        default_value = "",
        help = "Default notification targets as JSON object"
    )]
    pub notifications: String,

    #[arg(
        long = "namespace-filter",
        env = "COLLECTOR_NAMESPACE_FILTER",
        default_value = "",
        help = "Default namespace filter to use"
    )]
    pub namespace_filter: String,

    #[arg(
        long = "negated_namespace_filter",
        env = "COLLECTOR_NEGATED_NAMESPACE_FILTER",
        default_value = "",
        help = "Default negated namespace filter to use"
    )]
    pub negated_namespace_filter: String,
}
