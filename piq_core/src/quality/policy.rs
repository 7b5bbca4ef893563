use crate::types::types::{ImageQualities, PolicyViolation, Quality};

/// Selects which qualities a viewport role should display for an
/// image, and by extension which ones get downloaded when missing from
/// the cache.
///
/// Policies are pure: same input, same output, no side effects. They
/// only see the image's [`ImageQualities`] and never request a quality
/// absent from its available set. Concrete policies are picked by
/// explicit construction, one per viewport role.
pub trait QualityPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Ordered qualities to load, lowest first. Non-empty on success;
    /// an image with no viable quality yields [`PolicyViolation`].
    fn select_qualities(&self, image: &ImageQualities) -> Result<Vec<Quality>, PolicyViolation>;
}
