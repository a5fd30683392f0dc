//! Skip decision for report records

use crate::model::OutputRecord;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Decides whether a record is marked as skipped.
///
/// A record is skipped when its own `skip` flag is set, when its namespace
/// filters say so, or when its image matches one of the configured image
/// filters. All patterns use unanchored search.
#[derive(Debug, Clone, Default)]
pub struct SkipFilter {
    image_filters: Vec<Regex>,
    /// Namespace filters seen so far; `None` for patterns that do not compile
    namespace_patterns: Arc<Mutex<HashMap<String, Option<Regex>>>>,
}

impl SkipFilter {
    /// Compiles the image filters once. Patterns that do not compile can never
    /// match and are dropped with a warning.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let image_filters = patterns
            .into_iter()
            .filter_map(|pattern| {
                let pattern = pattern.as_ref();
                match Regex::new(pattern) {
                    Ok(regex) => Some(regex),
                    Err(err) => {
                        warn!(pattern, error = %err, "Ignoring image filter that does not compile");
                        None
                    }
                }
            })
            .collect();

        Self {
            image_filters,
            namespace_patterns: Arc::default(),
        }
    }

    pub fn should_skip(&self, record: &OutputRecord) -> bool {
        record.skip || self.skip_by_namespace(record) || self.skip_by_image_filter(record)
    }

    pub fn skip_by_image_filter(&self, record: &OutputRecord) -> bool {
        self.image_filters.iter().any(|filter| {
            debug!(image = %record.image, filter = filter.as_str(), "Checking image filter");
            filter.is_match(&record.image)
        })
    }

    /// `namespace_filter` matching skips the record. So does
    /// `namespace_filter_negated` matching: that pattern is stored already
    /// negated, so a match means the namespace is outside the kept set.
    pub fn skip_by_namespace(&self, record: &OutputRecord) -> bool {
        let filtered = !record.namespace_filter.is_empty()
            && self.search(&record.namespace_filter, &record.namespace);
        let filtered_negated = !record.namespace_filter_negated.is_empty()
            && self.search(&record.namespace_filter_negated, &record.namespace);

        filtered || filtered_negated
    }

    fn search(&self, pattern: &str, haystack: &str) -> bool {
        let mut cache = match self.namespace_patterns.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache
            .entry(pattern.to_string())
            .or_insert_with(|| Regex::new(pattern).ok())
            .as_ref()
            .is_some_and(|regex| regex.is_match(haystack))
    }

    #[cfg(test)]
    fn cached_patterns(&self) -> usize {
        self.namespace_patterns.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(namespace: &str, image: &str) -> OutputRecord {
        OutputRecord {
            namespace: namespace.to_string(),
            image: image.to_string(),
            ..OutputRecord::default()
        }
    }

    #[test]
    fn test_nothing_set_is_not_skipped() {
        let filter = SkipFilter::new(Vec::<String>::new());
        assert!(!filter.should_skip(&record("shop", "nginx:1.25")));
    }

    #[test]
    fn test_each_signal_toggles_skip_on_its_own() {
        let filter = SkipFilter::new(["mongo"]);

        let mut explicit = record("shop", "nginx:1.25");
        explicit.skip = true;
        assert!(filter.should_skip(&explicit));

        let mut by_namespace = record("shop", "nginx:1.25");
        by_namespace.namespace_filter = "^sh".to_string();
        assert!(SkipFilter::default().skip_by_namespace(&by_namespace));
        assert!(filter.should_skip(&by_namespace));

        let mut by_negated = record("shop", "nginx:1.25");
        by_negated.namespace_filter_negated = "op$".to_string();
        assert!(filter.should_skip(&by_negated));

        let by_image = record("shop", "docker.io/library/mongo:7");
        assert!(!SkipFilter::default().skip_by_namespace(&by_image));
        assert!(filter.should_skip(&by_image));
    }

    #[test]
    fn test_namespace_filter_is_a_search() {
        let mut r = record("team-payments-prod", "nginx");
        r.namespace_filter = "payments".to_string();
        assert!(SkipFilter::default().skip_by_namespace(&r));

        r.namespace_filter = "^payments$".to_string();
        assert!(!SkipFilter::default().skip_by_namespace(&r));
    }

    #[test]
    fn test_negated_filter_skips_on_match() {
        let mut r = record("kube-system", "coredns");
        r.namespace_filter_negated = "^kube-".to_string();
        assert!(SkipFilter::default().skip_by_namespace(&r));

        r.namespace = "shop".to_string();
        assert!(!SkipFilter::default().skip_by_namespace(&r));
    }

    #[test]
    fn test_broken_patterns_never_match() {
        let filter = SkipFilter::new(["(unclosed", "nginx"]);
        let mut r = record("shop", "nginx:1.25");
        r.namespace_filter = "[".to_string();
        assert!(!SkipFilter::default().skip_by_namespace(&r));
        assert!(filter.should_skip(&r));

        let broken_only = SkipFilter::new(["(unclosed"]);
        assert!(!broken_only.should_skip(&record("(unclosed", "(unclosed")));
    }

    #[test]
    fn test_empty_filters_are_ignored() {
        let mut r = record("shop", "nginx");
        r.namespace_filter = String::new();
        r.namespace_filter_negated = String::new();
        assert!(!SkipFilter::default().skip_by_namespace(&r));
    }

    #[test]
    fn test_namespace_patterns_compile_once() {
        let filter = SkipFilter::default();
        let records: Vec<OutputRecord> = ["pay-a", "pay-b", "shop"]
            .iter()
            .map(|namespace| {
                let mut r = record(namespace, "nginx");
                r.namespace_filter = "^pay".to_string();
                r.namespace_filter_negated = "[".to_string();
                r
            })
            .collect();

        let skipped: Vec<bool> = records.iter().map(|r| filter.should_skip(r)).collect();
        assert_eq!(skipped, vec![true, true, false]);
        assert_eq!(filter.cached_patterns(), 2);
    }
}
