use crate::quality::policy::QualityPolicy;
use crate::types::types::{ImageQualities, PolicyViolation, Quality};

/// Quality selection for diagnostic viewports.
///
/// Builds the progressive download ladder: start at the best quality
/// already in cache (so nothing lower than what we have gets
/// re-downloaded), finish at the best quality the image offers —
/// `PIXELDATA` when available, otherwise `LOSSLESS` — and include
/// every available quality in between, ascending by wire code.
pub struct QualityForDiagnosis;

impl QualityPolicy for QualityForDiagnosis {
    fn name(&self) -> &'static str {
        "diagnosis"
    }

    fn select_qualities(&self, image: &ImageQualities) -> Result<Vec<Quality>, PolicyViolation> {
        let desired = if image.has(Quality::PixelData) {
            Quality::PixelData
        } else if image.has(Quality::Lossless) {
            Quality::Lossless
        } else {
            return Err(PolicyViolation {
                policy: self.name(),
                available: image.available.clone(),
            });
        };

        // Lowest quality worth drawing: the best one already cached.
        let minimum = image.best_cached.map(|quality| quality.code()).unwrap_or(0);
        let maximum = desired.code().max(minimum);

        let mut ladder: Vec<Quality> = image
            .available
            .iter()
            .copied()
            .filter(|quality| {
                let code = quality.code();
                code >= minimum && code <= maximum
            })
            .collect();
        ladder.sort_by_key(|quality| quality.code());
        ladder.dedup();

        if ladder.is_empty() {
            // Cache claims a quality the image no longer advertises.
            return Err(PolicyViolation {
                policy: self.name(),
                available: image.available.clone(),
            });
        }
        Ok(ladder)
    }
}
