//! Cleanup applied to every converted record

use crate::collector::filter::SkipFilter;
use crate::model::OutputRecord;
use tracing::info;

/// Prefix some container runtimes put in front of image references
pub const DOCKER_PULLABLE_PREFIX: &str = "docker-pullable://";

/// Strips runtime prefixes, backfills a missing image id and then settles the
/// skip flag. Applying it twice changes nothing.
pub fn normalize(record: &mut OutputRecord, filter: &SkipFilter) {
    record.image = record.image.replace(DOCKER_PULLABLE_PREFIX, "");
    record.image_id = record.image_id.replace(DOCKER_PULLABLE_PREFIX, "");

    if record.image_id.is_empty() {
        info!(
            namespace = %record.namespace,
            image = %record.image,
            "ImageId is empty, using image name as imageId"
        );
        record.image_id = record.image.clone();
    }

    record.skip = filter.should_skip(record);
}
