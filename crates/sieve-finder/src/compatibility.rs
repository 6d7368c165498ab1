use sieve_platform_tags::{TagCompatibility, TagPriority, Tags};

use crate::error::{IncompatibleTagPart, Skipped};
use crate::link::{DistKind, Link};

/// Check a link against the target's supported tags.
///
/// Returns the priority of the best matching tag for wheels and `None` for source distributions,
/// which are built for the target and always compatible.
pub(crate) fn check(link: &Link, tags: &Tags) -> Result<Option<TagPriority>, Skipped> {
    match link.kind() {
        DistKind::SourceDist => Ok(None),
        DistKind::Wheel(wheel) => match wheel.compatibility(tags) {
            TagCompatibility::Compatible(priority) => Ok(Some(priority)),
            TagCompatibility::Incompatible(tag) => {
                Err(Skipped::IncompatibleTag(IncompatibleTagPart(tag)))
            }
        },
    }
}
