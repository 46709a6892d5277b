//! Upload session and owned session state.
//!
//! One [`Session`] record aggregates everything the workflow mutates: the
//! chosen image, the current selection, the last preview and generated
//! results, the single user-visible error slot, and the request bookkeeping
//! used to discard stale responses. It is passed explicitly through the
//! controller rather than living in globals, so the whole state machine can
//! be unit tested without a rendering environment.

use crate::error::Result;
use crate::geometry::{CropRect, MappedCrop, NaturalSize, SelectionRect, map_selection};
use image::ImageReader;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// The currently chosen source image: raw bytes plus natural dimensions.
///
/// Dimensions stay [`NaturalSize::Unresolved`] when the bytes do not decode
/// as a known image format; selections against such an image remain
/// provisional and never reach the service.
#[derive(Debug, Clone)]
pub struct ImageReference {
    pub name: String,
    pub bytes: Vec<u8>,
    pub natural: NaturalSize,
}

impl ImageReference {
    /// Wraps already-loaded image data, probing it for natural dimensions.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let natural = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.into_dimensions().ok())
            .map(|(width, height)| NaturalSize::Resolved { width, height })
            .unwrap_or(NaturalSize::Unresolved);

        Self {
            name: name.into(),
            bytes,
            natural,
        }
    }

    /// Reads an image file from disk.
    ///
    /// No media-type validation beyond the dimension probe; the service
    /// rejects bytes it cannot open.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::from_bytes(name, bytes))
    }
}

/// All mutable state of the crop workflow.
#[derive(Debug, Default)]
pub struct Session {
    image: Option<ImageReference>,
    selection: Option<SelectionRect>,
    preview: Option<Vec<u8>>,
    generated: Option<Vec<u8>>,
    generated_with: Option<i64>,
    error: Option<String>,
    generation: u64,
    in_flight: Option<u64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooses a new source image from disk. See [`Session::set_image`].
    pub fn choose_file(&mut self, path: &Path) -> Result<()> {
        let image = ImageReference::open(path)?;
        self.set_image(image);
        Ok(())
    }

    /// Replaces the source image, performing the hard reset: selection,
    /// preview, generated result and error are cleared and any in-flight
    /// request is superseded so its eventual response is discarded.
    pub fn set_image(&mut self, image: ImageReference) {
        self.selection = None;
        self.preview = None;
        self.generated = None;
        self.generated_with = None;
        self.error = None;
        self.in_flight = None;
        self.image = Some(image);
    }

    /// Updates the current selection.
    ///
    /// Any crop-changing interaction clears the error overlay, and an
    /// outstanding request is superseded the same way a new image does it.
    pub fn set_selection(&mut self, selection: Option<SelectionRect>) {
        self.selection = selection;
        self.error = None;
        self.in_flight = None;
    }

    pub fn image(&self) -> Option<&ImageReference> {
        self.image.as_ref()
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    /// The current selection mapped against the image's natural size.
    pub fn mapped_crop(&self) -> Option<MappedCrop> {
        let selection = self.selection?;
        let image = self.image.as_ref()?;
        Some(map_selection(selection, image.natural))
    }

    /// The pixel-space crop, if the selection has resolved.
    pub fn crop(&self) -> Option<CropRect> {
        self.mapped_crop()?.pixels()
    }

    /// Whether a preview/generate request is in flight.
    pub fn busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Raw bytes of the last successful preview, if any.
    pub fn preview(&self) -> Option<&[u8]> {
        self.preview.as_deref()
    }

    /// Raw bytes of the last successful generate, if any.
    pub fn generated(&self) -> Option<&[u8]> {
        self.generated.as_deref()
    }

    /// Id of the configuration applied to the last generated result.
    pub fn generated_with(&self) -> Option<i64> {
        self.generated_with
    }

    pub(crate) fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn set_preview(&mut self, bytes: Vec<u8>) {
        self.preview = Some(bytes);
    }

    pub(crate) fn set_generated(&mut self, bytes: Vec<u8>, config_id: Option<i64>) {
        self.generated = Some(bytes);
        self.generated_with = config_id;
    }

    /// Marks a request as in flight and returns its token.
    ///
    /// The generation counter only ever increases; comparing tokens at
    /// response-apply time is what makes superseded responses detectable.
    pub(crate) fn start_request(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.generation
    }

    /// Ends the request identified by `token`.
    ///
    /// Returns `false` when the token no longer matches the outstanding
    /// request (reset, selection change, or a newer request took over); the
    /// caller must then discard the response without touching state.
    pub(crate) fn finish_request(&mut self, token: u64) -> bool {
        if self.in_flight == Some(token) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}

/// Builds an in-memory PNG-backed image reference for tests.
#[cfg(test)]
pub(crate) fn png_image(width: u32, height: u32) -> ImageReference {
    use image::{ImageFormat, RgbImage};

    let mut bytes = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encoding a blank PNG cannot fail");
    ImageReference::from_bytes("test.png", bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_resolves_natural_dimensions() {
        let image = png_image(800, 600);
        assert_eq!(
            image.natural,
            NaturalSize::Resolved {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn undecodable_bytes_stay_unresolved() {
        let image = ImageReference::from_bytes("junk.bin", vec![0, 1, 2, 3]);
        assert_eq!(image.natural, NaturalSize::Unresolved);
    }

    #[test]
    fn selection_against_unresolved_image_is_provisional() {
        let mut session = Session::new();
        session.set_image(ImageReference::from_bytes("junk.bin", vec![0, 1, 2, 3]));
        session.set_selection(Some(SelectionRect::new(10.0, 10.0, 20.0, 20.0)));

        assert!(matches!(
            session.mapped_crop(),
            Some(MappedCrop::Provisional(_))
        ));
        assert_eq!(session.crop(), None);
    }

    #[test]
    fn new_image_clears_all_dependent_state() {
        let mut session = Session::new();
        session.set_image(png_image(800, 600));
        session.set_selection(Some(SelectionRect::new(10.0, 10.0, 20.0, 20.0)));
        session.set_preview(vec![1]);
        session.set_generated(vec![2], Some(7));
        session.set_error("boom");
        let token = session.start_request();

        session.set_image(png_image(400, 300));

        assert_eq!(session.selection(), None);
        assert_eq!(session.preview(), None);
        assert_eq!(session.generated(), None);
        assert_eq!(session.generated_with(), None);
        assert_eq!(session.error(), None);
        assert!(!session.busy());
        // the outstanding request was superseded
        assert!(!session.finish_request(token));
    }

    #[test]
    fn selection_change_clears_error_and_supersedes() {
        let mut session = Session::new();
        session.set_image(png_image(800, 600));
        session.set_error("stale message");
        let token = session.start_request();

        session.set_selection(Some(SelectionRect::new(0.0, 0.0, 50.0, 50.0)));

        assert_eq!(session.error(), None);
        assert!(!session.busy());
        assert!(!session.finish_request(token));
    }

    #[test]
    fn tokens_are_monotonic_and_single_use() {
        let mut session = Session::new();
        let first = session.start_request();
        assert!(session.finish_request(first));
        let second = session.start_request();
        assert!(second > first);
        assert!(!session.finish_request(first));
        assert!(session.finish_request(second));
    }
}
