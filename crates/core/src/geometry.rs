//! Selection-to-crop coordinate mapping.
//!
//! The crop control renders the source image at an arbitrary scaled size, so
//! selections are expressed in percentage space (0-100 of the rendered
//! element) - the only coordinate system stable across renders. The
//! processing service wants absolute pixels of the original image. This
//! module converts between the two.
//!
//! # Two-stage dimensions
//!
//! The natural dimensions of an image become available only once its bytes
//! have been decoded. Until then a selection cannot be mapped; it passes
//! through unchanged as a provisional value rather than silently producing
//! wrong pixels. [`NaturalSize`] models this explicitly.

/// A user-drawn selection as a percentage (0-100) of the rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A crop region in absolute pixels of the original image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The wire form of the crop: `[x1, y1, x2, y2]`.
    pub fn coords(&self) -> [u32; 4] {
        [
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height,
        ]
    }

    /// The JSON-encoded coordinate tuple sent in the `crops` field,
    /// e.g. `"[80,60,240,180]"`.
    pub fn coords_json(&self) -> String {
        let [x1, y1, x2, y2] = self.coords();
        format!("[{x1},{y1},{x2},{y2}]")
    }
}

/// Natural pixel dimensions of a source image.
///
/// Unresolved until the image bytes have been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NaturalSize {
    #[default]
    Unresolved,
    Resolved {
        width: u32,
        height: u32,
    },
}

impl NaturalSize {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Outcome of mapping a selection against an image's natural size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MappedCrop {
    /// Dimensions were not yet known; the raw selection is carried unchanged.
    Provisional(SelectionRect),
    /// Pixel-space crop, ready for validation and transmission.
    Pixels(CropRect),
}

impl MappedCrop {
    /// Returns the pixel crop if the mapping has resolved.
    pub fn pixels(&self) -> Option<CropRect> {
        match self {
            Self::Pixels(crop) => Some(*crop),
            Self::Provisional(_) => None,
        }
    }
}

/// Converts a percentage-space selection into a pixel-space crop.
///
/// Each component maps independently as `round(percent / 100 * natural)` -
/// exact rounding, not truncation. Against [`NaturalSize::Unresolved`] the
/// selection passes through as [`MappedCrop::Provisional`].
///
/// The result is clamped so that `x + width` and `y + height` never exceed
/// the natural dimensions; a selection drawn to the very edge can otherwise
/// overshoot by a rounding pixel.
pub fn map_selection(selection: SelectionRect, natural: NaturalSize) -> MappedCrop {
    let NaturalSize::Resolved { width, height } = natural else {
        return MappedCrop::Provisional(selection);
    };

    let to_px = |percent: f64, dimension: u32| -> u32 {
        (percent / 100.0 * f64::from(dimension)).round().max(0.0) as u32
    };

    let x = to_px(selection.x, width).min(width);
    let y = to_px(selection.y, height).min(height);
    let w = to_px(selection.width, width).min(width - x);
    let h = to_px(selection.height, height).min(height - y);

    MappedCrop::Pixels(CropRect::new(x, y, w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NATURAL: NaturalSize = NaturalSize::Resolved {
        width: 800,
        height: 600,
    };

    #[test]
    fn maps_percentages_to_pixels() {
        let selection = SelectionRect::new(10.0, 10.0, 20.0, 20.0);
        let mapped = map_selection(selection, NATURAL);
        assert_eq!(mapped.pixels(), Some(CropRect::new(80, 60, 160, 120)));
    }

    #[test]
    fn rounds_rather_than_truncates() {
        // 12.34% of 800 = 98.72 -> 99, truncation would give 98
        let selection = SelectionRect::new(12.34, 0.0, 50.0, 50.0);
        let crop = map_selection(selection, NATURAL).pixels().unwrap();
        assert_eq!(crop.x, 99);

        // 0.1% of 600 = 0.6 -> 1
        let selection = SelectionRect::new(0.0, 0.1, 10.0, 10.0);
        let crop = map_selection(selection, NATURAL).pixels().unwrap();
        assert_eq!(crop.y, 1);
    }

    #[test]
    fn unresolved_dimensions_pass_selection_through() {
        let selection = SelectionRect::new(10.0, 10.0, 20.0, 20.0);
        let mapped = map_selection(selection, NaturalSize::Unresolved);
        assert_eq!(mapped, MappedCrop::Provisional(selection));
        assert_eq!(mapped.pixels(), None);
    }

    #[test]
    fn clamps_edge_overshoot_to_bounds() {
        // 33.4% + 66.7% rounds past the right edge without clamping.
        let selection = SelectionRect::new(33.4, 0.0, 66.7, 100.0);
        let crop = map_selection(selection, NATURAL).pixels().unwrap();
        assert!(crop.x + crop.width <= 800);
        assert!(crop.y + crop.height <= 600);
    }

    #[test]
    fn coords_are_corner_pairs() {
        let crop = CropRect::new(80, 60, 160, 120);
        assert_eq!(crop.coords(), [80, 60, 240, 180]);
        assert_eq!(crop.coords_json(), "[80,60,240,180]");
    }
}
