use serde::{Deserialize, Serialize};

use crate::types::types::Quality;

/// Task kind understood by the image fetch handler.
pub const FETCH_IMAGE: &str = "fetch-image";

/// Request urgency, mirroring viewport behavior: a visible viewport
/// loads, its neighbors preload at high priority, the rest of the
/// series preloads at low priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchPriority {
    Loading,
    PreloadHigh,
    PreloadLow,
}

/// Options bag of an image fetch task; opaque to the task, read by the
/// fetch handler and the priority policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFetchOptions {
    pub image_id: String,
    pub quality: Quality,
    pub priority: FetchPriority,
}

/// Success payload of an image fetch task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBinary {
    pub image_id: String,
    pub quality: Quality,
    pub bytes: Vec<u8>,
}
