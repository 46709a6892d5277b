//! Crop validation.
//!
//! A candidate crop must pass here before any network call is allowed.

use crate::geometry::CropRect;

/// Minimum width and height, in pixels, of an acceptable crop.
pub const MIN_CROP_DIMENSION: u32 = 10;

/// User-facing message for any rejected crop.
pub const MIN_CROP_MESSAGE: &str = "Please select a valid crop area (minimum 10x10 pixels)";

/// Why a candidate crop was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropInvalid {
    /// No crop rectangle exists (nothing drawn, or still provisional).
    Missing,
    /// The rectangle exists but is under the minimum size.
    TooSmall { width: u32, height: u32 },
}

/// Checks a candidate crop against the minimum-size rules.
///
/// Rejects iff the crop is absent or either dimension is below
/// [`MIN_CROP_DIMENSION`]. A 10x10 crop is exactly acceptable. Containment
/// within the image bounds is not checked here; the mapper clamps
/// best-effort and the service revalidates.
pub fn validate_crop(crop: Option<&CropRect>) -> Result<(), CropInvalid> {
    let crop = crop.ok_or(CropInvalid::Missing)?;
    if crop.width < MIN_CROP_DIMENSION || crop.height < MIN_CROP_DIMENSION {
        return Err(CropInvalid::TooSmall {
            width: crop.width,
            height: crop.height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_crop_is_rejected() {
        assert_eq!(validate_crop(None), Err(CropInvalid::Missing));
    }

    #[test]
    fn minimum_size_boundary() {
        let ok = CropRect::new(0, 0, 10, 10);
        assert_eq!(validate_crop(Some(&ok)), Ok(()));

        let narrow = CropRect::new(0, 0, 9, 10);
        assert_eq!(
            validate_crop(Some(&narrow)),
            Err(CropInvalid::TooSmall {
                width: 9,
                height: 10
            })
        );

        let short = CropRect::new(0, 0, 10, 9);
        assert!(validate_crop(Some(&short)).is_err());
    }

    #[test]
    fn large_crops_pass() {
        let crop = CropRect::new(80, 60, 160, 120);
        assert_eq!(validate_crop(Some(&crop)), Ok(()));
    }
}
