//! Image Metadata Collector Library
//!
//! Enumerates the images running in a Kubernetes cluster, resolves their
//! scan and ownership metadata from labels and annotations, and delivers the
//! report to one configurable storage.

pub mod cli;
pub mod collector;
pub mod encode;
pub mod error;
pub mod logging;
pub mod model;
pub mod sink;
pub mod source;

pub use collector::{Collector, SkipFilter};
pub use encode::OutputFormat;
pub use error::{CollectorError, Result};
pub use model::{AnnotationNamespaces, ImageType, OutputRecord, RawImageRecord};
pub use sink::{Sink, StorageConfig};
pub use source::{Namespace, WorkloadSource};
