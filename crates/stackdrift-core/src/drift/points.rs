use std::collections::BTreeMap;

use tracing::debug;

use crate::frame::{PointAnnotation, ShiftSample};

use super::config::DuplicatePolicy;

/// Convert point annotations into drift samples sorted by frame index.
///
/// The annotation at the earliest frame index is the zero-drift origin;
/// every sample is its annotation's position minus the origin's. Several
/// annotations at one frame index collapse according to `policy`.
pub fn samples_from_annotations(
    annotations: &[PointAnnotation],
    policy: DuplicatePolicy,
) -> Vec<ShiftSample> {
    let positions = collapse_duplicates(annotations, policy);

    let Some((_, &(y0, x0))) = positions.iter().next() else {
        return Vec::new();
    };

    positions
        .iter()
        .map(|(&frame, &(y, x))| ShiftSample::new(frame, y - y0, x - x0))
        .collect()
}

/// One `(y, x)` position per annotated frame index.
fn collapse_duplicates(
    annotations: &[PointAnnotation],
    policy: DuplicatePolicy,
) -> BTreeMap<usize, (f64, f64)> {
    match policy {
        DuplicatePolicy::Last => {
            let mut positions = BTreeMap::new();
            for a in annotations {
                if let Some((y, x)) = positions.insert(a.frame_index, (a.y, a.x)) {
                    debug!(frame = a.frame_index, y, x, "Annotation overwritten");
                }
            }
            positions
        }
        DuplicatePolicy::Mean => {
            let mut sums: BTreeMap<usize, (f64, f64, usize)> = BTreeMap::new();
            for a in annotations {
                let entry = sums.entry(a.frame_index).or_insert((0.0, 0.0, 0));
                entry.0 += a.y;
                entry.1 += a.x;
                entry.2 += 1;
            }
            sums.into_iter()
                .map(|(frame, (y, x, n))| (frame, (y / n as f64, x / n as f64)))
                .collect()
        }
    }
}
