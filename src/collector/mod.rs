//! Metadata resolution pipeline
//!
//! Raw images from the workload source go through [`convert`] and
//! [`normalize`]; the [`Collector`] ties both together with the run's
//! defaults, annotation namespaces and image filters.

pub mod convert;
pub mod filter;
pub mod normalize;
pub mod resolve;

pub use convert::convert;
pub use filter::SkipFilter;
pub use normalize::normalize;
pub use resolve::{Resolved, Tags};

use crate::model::{AnnotationNamespaces, OutputRecord, RawImageRecord};
use tracing::debug;

/// Converts and cleans raw images with a fixed set of defaults
#[derive(Debug, Clone)]
pub struct Collector {
    defaults: OutputRecord,
    names: AnnotationNamespaces,
    filter: SkipFilter,
}

impl Collector {
    pub fn new(defaults: OutputRecord, names: AnnotationNamespaces, filter: SkipFilter) -> Self {
        Self {
            defaults,
            names,
            filter,
        }
    }

    /// One output record per raw image, in input order. Duplicates are kept.
    pub fn collect(&self, images: &[RawImageRecord]) -> Vec<OutputRecord> {
        images
            .iter()
            .map(|raw| {
                let mut record = convert(raw, &self.defaults, &self.names);
                normalize(&mut record, &self.filter);
                debug!(
                    namespace = %record.namespace,
                    image = %record.image,
                    image_type = %raw.image_type,
                    skip = record.skip,
                    "Collected image"
                );
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageType;
    use std::collections::HashMap;

    fn raw(namespace: &str, image: &str) -> RawImageRecord {
        RawImageRecord {
            image: image.to_string(),
            image_id: String::new(),
            namespace: namespace.to_string(),
            tags: HashMap::new(),
            image_type: ImageType::Container,
        }
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let collector = Collector::new(
            OutputRecord::default(),
            AnnotationNamespaces::default(),
            SkipFilter::default(),
        );
        let records = collector.collect(&[raw("a", "nginx"), raw("b", "nginx"), raw("a", "nginx")]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], records[2]);
    }

    #[test]
    fn test_default_namespace_filter_applies() {
        let defaults = OutputRecord {
            namespace_filter: "^pay.*".to_string(),
            ..OutputRecord::default()
        };
        let collector = Collector::new(defaults, AnnotationNamespaces::default(), SkipFilter::default());
        let records = collector.collect(&[raw("payments", "api:1"), raw("shop", "api:1")]);
        assert!(records[0].skip);
        assert!(!records[1].skip);
    }
}
