//! Size-class decision for textures.

/// Dimensions an image should be scaled to so neither edge exceeds
/// `max_size`, or `None` when it already fits.
///
/// The larger edge becomes exactly `max_size`; the other edge is scaled by
/// the same ratio and rounded to the nearest pixel (never below 1).
pub fn target_dimensions(width: u32, height: u32, max_size: u32) -> Option<(u32, u32)> {
    if max_size == 0 || (width <= max_size && height <= max_size) {
        return None;
    }

    let scale = |edge: u32, larger: u32| -> u32 {
        let scaled = (edge as u64 * max_size as u64 + larger as u64 / 2) / larger as u64;
        scaled.max(1) as u32
    };

    if width >= height {
        Some((max_size, scale(height, width)))
    } else {
        Some((scale(width, height), max_size))
    }
}
