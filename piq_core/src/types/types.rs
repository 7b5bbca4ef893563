use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Image compression qualities, as processed by the backend transcoder.
///
/// The numeric codes are the wire-level vocabulary shared with the
/// backend: they end up in request parameters and must never be
/// renumbered.
///
/// Note: the DICOM pixel data may itself already be compressed, so
/// `PixelData` is a distinct representation class rather than a strict
/// fidelity rank above `Lossless`. The code order is the progressive
/// download order, not a visual-fidelity ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Quality {
    /// 8bit jpeg80 150x150 thumbnail.
    Low,
    /// 8bit jpeg80 1000x1000 preview.
    Medium,
    /// Transcoded losslessly by the backend (may still be lossy if the
    /// stored pixel data was).
    Lossless,
    /// Raw pixel data, straight from the DICOM file.
    PixelData,
}

impl Quality {
    pub const ALL: [Quality; 4] = [
        Quality::Low,
        Quality::Medium,
        Quality::Lossless,
        Quality::PixelData,
    ];

    /// Stable wire code. Code 0 is reserved.
    pub fn code(self) -> u32 {
        match self {
            Quality::Low => 1,
            Quality::Medium => 2,
            Quality::Lossless => 100,
            Quality::PixelData => 101,
        }
    }

    pub fn from_code(code: u32) -> Option<Quality> {
        Quality::ALL.into_iter().find(|q| q.code() == code)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> u32 {
        quality.code()
    }
}

impl TryFrom<u32> for Quality {
    type Error = String;

    fn try_from(code: u32) -> Result<Quality, String> {
        Quality::from_code(code).ok_or_else(|| format!("unknown quality code {}", code))
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Quality::Low => "LOW",
            Quality::Medium => "MEDIUM",
            Quality::Lossless => "LOSSLESS",
            Quality::PixelData => "PIXELDATA",
        };
        write!(f, "{}", name)
    }
}

/// Everything a quality policy is allowed to look at: the qualities the
/// backend advertises for an image, plus the best one already cached
/// locally (if any).
///
/// An empty `available` set is a caller contract violation; policies
/// answer it with [`PolicyViolation`] rather than guessing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageQualities {
    pub available: Vec<Quality>,
    pub best_cached: Option<Quality>,
}

impl ImageQualities {
    pub fn new(available: Vec<Quality>) -> Self {
        Self {
            available,
            best_cached: None,
        }
    }

    pub fn with_best_cached(mut self, quality: Quality) -> Self {
        self.best_cached = Some(quality);
        self
    }

    pub fn has(&self, quality: Quality) -> bool {
        self.available.contains(&quality)
    }
}

/// A quality policy was asked to choose for an image with no viable
/// quality. Fatal to that image's display path; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("quality policy `{policy}` found no viable quality among {available:?}")]
pub struct PolicyViolation {
    pub policy: &'static str,
    pub available: Vec<Quality>,
}

/// Failure payload delivered on a task's failure channel.
///
/// `Clone` so a single failure can fan out to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend returned HTTP {status} for {url}")]
    Http { status: u16, url: String },
    #[error("task aborted before completion")]
    Aborted,
    #[error("unsupported task kind `{0}`")]
    UnsupportedKind(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TaskFailure {
    fn from(error: reqwest::Error) -> Self {
        TaskFailure::Transport(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// One worker is always kept free for high-priority displays, so a
    /// pool below two workers could never preload anything.
    #[error("worker pool needs at least 2 workers, got {0}")]
    TooFewWorkers(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("binary for image `{image_id}` at quality {quality} is already cached")]
    AlreadyCached { image_id: String, quality: Quality },
}
