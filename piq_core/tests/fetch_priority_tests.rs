use std::sync::Arc;

use piq_core::fetch::options::{FetchPriority, FetchedBinary, ImageFetchOptions, FETCH_IMAGE};
use piq_core::fetch::priority::ProgressiveFetchPriority;
use piq_core::pool::priority::TaskPriorityPolicy;
use piq_core::task::task::Task;
use piq_core::types::types::Quality;

type FetchTask = Arc<Task<ImageFetchOptions, FetchedBinary>>;

fn fetch_task(image_id: &str, quality: Quality, priority: FetchPriority) -> FetchTask {
    Arc::new(Task::new(
        FETCH_IMAGE,
        ImageFetchOptions {
            image_id: image_id.to_string(),
            quality,
            priority,
        },
    ))
}

fn selected(policy: &ProgressiveFetchPriority, idle: usize, queued: &[FetchTask]) -> Option<FetchTask> {
    let id = policy.select_task(idle, 0, queued, &[])?;
    queued.iter().find(|task| task.id() == id).cloned()
}

#[test]
fn loading_band_beats_every_preload() {
    let queued = vec![
        fetch_task("a", Quality::Low, FetchPriority::PreloadHigh),
        fetch_task("b", Quality::Lossless, FetchPriority::Loading),
        fetch_task("c", Quality::Low, FetchPriority::PreloadLow),
    ];

    let task = selected(&ProgressiveFetchPriority, 4, &queued).unwrap();
    assert_eq!(task.options().image_id, "b");
}

#[test]
fn within_a_band_lowest_quality_dispatches_first() {
    let queued = vec![
        fetch_task("a", Quality::Lossless, FetchPriority::Loading),
        fetch_task("b", Quality::Medium, FetchPriority::Loading),
        fetch_task("c", Quality::Low, FetchPriority::Loading),
    ];

    let task = selected(&ProgressiveFetchPriority, 4, &queued).unwrap();
    assert_eq!(task.options().quality, Quality::Low);
}

#[test]
fn pixeldata_dispatches_before_lossless() {
    let queued = vec![
        fetch_task("a", Quality::Lossless, FetchPriority::Loading),
        fetch_task("b", Quality::PixelData, FetchPriority::Loading),
    ];

    let task = selected(&ProgressiveFetchPriority, 4, &queued).unwrap();
    assert_eq!(task.options().quality, Quality::PixelData);
}

#[test]
fn last_idle_worker_is_reserved_for_the_loading_band() {
    let queued = vec![
        fetch_task("a", Quality::Low, FetchPriority::PreloadHigh),
        fetch_task("b", Quality::Low, FetchPriority::PreloadLow),
    ];

    assert!(selected(&ProgressiveFetchPriority, 1, &queued).is_none());

    let task = selected(&ProgressiveFetchPriority, 2, &queued).unwrap();
    assert_eq!(task.options().priority, FetchPriority::PreloadHigh);
}

#[test]
fn loading_band_still_dispatches_on_the_last_worker() {
    let queued = vec![fetch_task("a", Quality::Low, FetchPriority::Loading)];

    let task = selected(&ProgressiveFetchPriority, 1, &queued).unwrap();
    assert_eq!(task.options().image_id, "a");
}

#[test]
fn preload_high_beats_preload_low() {
    let queued = vec![
        fetch_task("a", Quality::Low, FetchPriority::PreloadLow),
        fetch_task("b", Quality::Lossless, FetchPriority::PreloadHigh),
    ];

    let task = selected(&ProgressiveFetchPriority, 4, &queued).unwrap();
    assert_eq!(task.options().priority, FetchPriority::PreloadHigh);
}

#[test]
fn empty_queue_selects_nothing() {
    assert!(selected(&ProgressiveFetchPriority, 4, &[]).is_none());
}
