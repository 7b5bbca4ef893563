use crate::quality::policy::QualityPolicy;
use crate::types::types::{ImageQualities, PolicyViolation, Quality};

/// Quality selection for thumbnail viewports.
///
/// A strict fallback chain, first match wins:
///
/// 1. `LOW` when available.
/// 2. Else `PIXELDATA` — images whose DICOM pixel data is already
///    compressed are served as-is, skipping backend re-encoding.
/// 3. Else `LOSSLESS`, for images incompatible with raw pixel data.
///
/// Exactly one quality is returned; branches below the first match are
/// ignored even when available.
pub struct QualityForThumbnail;

impl QualityPolicy for QualityForThumbnail {
    fn name(&self) -> &'static str {
        "thumbnail"
    }

    fn select_qualities(&self, image: &ImageQualities) -> Result<Vec<Quality>, PolicyViolation> {
        if image.has(Quality::Low) {
            Ok(vec![Quality::Low])
        } else if image.has(Quality::PixelData) {
            Ok(vec![Quality::PixelData])
        } else if image.has(Quality::Lossless) {
            Ok(vec![Quality::Lossless])
        } else {
            Err(PolicyViolation {
                policy: self.name(),
                available: image.available.clone(),
            })
        }
    }
}
