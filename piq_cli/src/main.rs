use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use piq_core::cache::binary_cache::BinaryCache;
use piq_core::fetch::http_image_fetcher::HttpImageFetcher;
use piq_core::fetch::options::{FetchPriority, FetchedBinary, ImageFetchOptions, FETCH_IMAGE};
use piq_core::fetch::priority::ProgressiveFetchPriority;
use piq_core::pool::worker_pool::WorkerPool;
use piq_core::quality::diagnosis::QualityForDiagnosis;
use piq_core::quality::policy::QualityPolicy;
use piq_core::quality::thumbnail::QualityForThumbnail;
use piq_core::task::task::Task;
use piq_core::types::types::Quality;

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Thumbnail,
    Diagnosis,
}

#[derive(Clone, Copy, ValueEnum)]
enum QualityArg {
    Low,
    Medium,
    Lossless,
    Pixeldata,
}

impl From<QualityArg> for Quality {
    fn from(arg: QualityArg) -> Quality {
        match arg {
            QualityArg::Low => Quality::Low,
            QualityArg::Medium => Quality::Medium,
            QualityArg::Lossless => Quality::Lossless,
            QualityArg::Pixeldata => Quality::PixelData,
        }
    }
}

#[derive(Parser)]
#[command(name = "piq", about = "Progressive image-quality loader")]
struct Args {
    /// Backend base URL serving /images/{id}/{quality code}
    #[arg(short, long, default_value = "http://localhost:8042/web-viewer")]
    base_url: String,

    /// Image ids to load
    #[arg(required = true)]
    images: Vec<String>,

    /// Viewport role deciding which qualities to request
    #[arg(short, long, value_enum, default_value = "thumbnail")]
    policy: PolicyArg,

    /// Qualities the backend advertises for these images
    #[arg(short, long, value_enum, value_delimiter = ',', default_value = "low,medium,lossless")]
    qualities: Vec<QualityArg>,

    /// Concurrent fetch workers (minimum 2)
    #[arg(short, long, default_value = "4")]
    workers: usize,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let policy: Box<dyn QualityPolicy> = match args.policy {
        PolicyArg::Thumbnail => Box::new(QualityForThumbnail),
        PolicyArg::Diagnosis => Box::new(QualityForDiagnosis),
    };
    let available: Vec<Quality> = args.qualities.iter().copied().map(Quality::from).collect();

    let pool: WorkerPool<ImageFetchOptions, FetchedBinary> = match WorkerPool::new(
        Arc::new(HttpImageFetcher::new(args.base_url.clone())),
        Arc::new(ProgressiveFetchPriority),
        args.workers,
    ) {
        Ok(pool) => pool,
        Err(error) => {
            eprintln!("{}", error);
            std::process::exit(1);
        }
    };
    let cache = BinaryCache::new();

    // Resolve every image's ladder first so the progress bar knows its length.
    let mut requests = Vec::new();
    for image_id in &args.images {
        let image = cache.qualities_for(image_id, available.clone());
        match policy.select_qualities(&image) {
            Ok(ladder) => {
                for quality in ladder {
                    requests.push((image_id.clone(), quality));
                }
            }
            Err(violation) => eprintln!("skipping {}: {}", image_id, violation),
        }
    }
    if requests.is_empty() {
        eprintln!("nothing to load");
        std::process::exit(1);
    }

    let bar = ProgressBar::new(requests.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("[{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    println!(
        "Loading {} binaries for {} image(s) from {}",
        requests.len(),
        args.images.len(),
        args.base_url
    );
    let start = Instant::now();

    let receivers: Vec<_> = requests
        .into_iter()
        .map(|(image_id, quality)| {
            let task = Arc::new(Task::new(
                FETCH_IMAGE,
                ImageFetchOptions {
                    image_id: image_id.clone(),
                    quality,
                    priority: FetchPriority::Loading,
                },
            ));
            (image_id, quality, pool.queue_task(task))
        })
        .collect();

    let mut failures = 0usize;
    for (image_id, quality, receiver) in receivers {
        match receiver.await {
            Ok(Ok(binary)) => {
                bar.set_message(format!("{} {}", image_id, quality));
                if let Err(error) = cache.add(&binary.image_id, binary.quality, binary.bytes) {
                    log::warn!("{}", error);
                }
            }
            Ok(Err(failure)) => {
                failures += 1;
                eprintln!("{} at {} failed: {}", image_id, quality, failure);
            }
            Err(_) => {
                failures += 1;
                eprintln!("{} at {}: pool dropped the task", image_id, quality);
            }
        }
        bar.inc(1);
    }
    bar.finish();

    let elapsed = start.elapsed();
    println!(
        "Loaded {} binaries ({} bytes) in {:.2}s, {} failure(s)",
        cache.len(),
        cache.total_bytes(),
        elapsed.as_secs_f64(),
        failures
    );
}
