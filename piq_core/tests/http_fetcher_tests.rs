use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use piq_core::cache::binary_cache::BinaryCache;
use piq_core::fetch::http_image_fetcher::HttpImageFetcher;
use piq_core::fetch::options::{FetchPriority, FetchedBinary, ImageFetchOptions, FETCH_IMAGE};
use piq_core::fetch::priority::ProgressiveFetchPriority;
use piq_core::pool::handler::TaskHandler;
use piq_core::pool::worker_pool::WorkerPool;
use piq_core::quality::policy::QualityPolicy;
use piq_core::quality::thumbnail::QualityForThumbnail;
use piq_core::task::task::Task;
use piq_core::types::types::{ImageQualities, Quality, TaskFailure};

fn options(image_id: &str, quality: Quality) -> ImageFetchOptions {
    ImageFetchOptions {
        image_id: image_id.to_string(),
        quality,
        priority: FetchPriority::Loading,
    }
}

#[tokio::test]
async fn fetches_an_image_binary_at_the_requested_quality() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/xyz/1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7, 8, 9]))
        .mount(&server)
        .await;

    let fetcher = HttpImageFetcher::new(server.uri());
    let binary = fetcher
        .handle(FETCH_IMAGE, &options("xyz", Quality::Low), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(binary.image_id, "xyz");
    assert_eq!(binary.quality, Quality::Low);
    assert_eq!(binary.bytes, vec![7, 8, 9]);
}

#[tokio::test]
async fn quality_travels_as_its_stable_wire_code() {
    let server = MockServer::start().await;
    // Only the pixeldata code route exists; hitting anything else 404s.
    Mock::given(method("GET"))
        .and(path("/images/xyz/101"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1]))
        .mount(&server)
        .await;

    let fetcher = HttpImageFetcher::new(server.uri());
    let binary = fetcher
        .handle(
            FETCH_IMAGE,
            &options("xyz", Quality::PixelData),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(binary.quality, Quality::PixelData);
}

#[tokio::test]
async fn backend_errors_surface_as_http_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpImageFetcher::new(server.uri());
    let failure = fetcher
        .handle(FETCH_IMAGE, &options("missing", Quality::Low), CancellationToken::new())
        .await
        .unwrap_err();

    match failure {
        TaskFailure::Http { status, url } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/images/missing/1"));
        }
        other => panic!("expected an http failure, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_task_kinds_are_rejected() {
    let server = MockServer::start().await;
    let fetcher = HttpImageFetcher::new(server.uri());

    let failure = fetcher
        .handle("transcode", &options("xyz", Quality::Low), CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(failure, TaskFailure::UnsupportedKind("transcode".to_string()));
}

#[tokio::test]
async fn cancellation_aborts_a_slow_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![1])
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpImageFetcher::new(server.uri());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let failure = fetcher
        .handle(FETCH_IMAGE, &options("xyz", Quality::Low), cancel)
        .await
        .unwrap_err();

    assert_eq!(failure, TaskFailure::Aborted);
}

// ---------------------------------------------------------------
// End to end: policy -> pool -> fetcher -> cache
// ---------------------------------------------------------------

#[tokio::test]
async fn thumbnail_ladder_flows_through_pool_and_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/img-1/1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![5; 64]))
        .mount(&server)
        .await;

    let image = ImageQualities::new(vec![Quality::Low, Quality::Lossless]);
    let ladder = QualityForThumbnail.select_qualities(&image).unwrap();
    assert_eq!(ladder, vec![Quality::Low]);

    let pool: WorkerPool<ImageFetchOptions, FetchedBinary> = WorkerPool::new(
        Arc::new(HttpImageFetcher::new(server.uri())),
        Arc::new(ProgressiveFetchPriority),
        2,
    )
    .unwrap();
    let cache = BinaryCache::new();

    for quality in ladder {
        let task = Arc::new(Task::new(FETCH_IMAGE, options("img-1", quality)));
        let binary = pool.queue_task(task).await.unwrap().unwrap();
        cache.add(&binary.image_id, binary.quality, binary.bytes).unwrap();
    }

    assert_eq!(cache.best_quality("img-1"), Some(Quality::Low));
    assert_eq!(cache.get("img-1", Quality::Low).unwrap().len(), 64);
}
