use std::sync::Arc;

use uuid::Uuid;

use crate::fetch::options::{FetchPriority, ImageFetchOptions};
use crate::pool::priority::TaskPriorityPolicy;
use crate::task::task::Task;
use crate::types::types::Quality;

/// Dispatch order within a priority band: cheapest representations
/// first so something is on screen as soon as possible, then raw pixel
/// data before lossless (no backend re-encoding involved).
const QUALITY_DISPATCH_ORDER: [Quality; 4] = [
    Quality::Low,
    Quality::Medium,
    Quality::PixelData,
    Quality::Lossless,
];

const PRIORITY_BANDS: [FetchPriority; 3] = [
    FetchPriority::Loading,
    FetchPriority::PreloadHigh,
    FetchPriority::PreloadLow,
];

/// Priority policy for progressive image loading.
///
/// Loading-band tasks always go first, then high- and low-priority
/// preloads; within a band, tasks dispatch in
/// [`QUALITY_DISPATCH_ORDER`]. The last idle worker is reserved for
/// the loading band so a visible viewport never waits behind preloads.
pub struct ProgressiveFetchPriority;

impl<R: 'static> TaskPriorityPolicy<ImageFetchOptions, R> for ProgressiveFetchPriority {
    fn select_task(
        &self,
        idle_workers: usize,
        _busy_workers: usize,
        queued: &[Arc<Task<ImageFetchOptions, R>>],
        _in_flight: &[Arc<Task<ImageFetchOptions, R>>],
    ) -> Option<Uuid> {
        for band in PRIORITY_BANDS {
            if band != FetchPriority::Loading && idle_workers < 2 {
                return None;
            }
            for quality in QUALITY_DISPATCH_ORDER {
                let found = queued.iter().find(|task| {
                    task.options().priority == band && task.options().quality == quality
                });
                if let Some(task) = found {
                    return Some(task.id());
                }
            }
        }
        queued.first().map(|task| task.id())
    }
}
