//! Request controller: the preview/generate state machine.
//!
//! States run `Idle -> Busy(Preview|Generate) -> Idle`, with the error slot
//! as an overlay cleared by any crop change or by starting a new request.
//! Exactly one request may be in flight; a second submission while busy is a
//! no-op.
//!
//! The controller is split into a synchronous `begin`/`apply` pair around the
//! single suspension point (the network call). `begin` checks preconditions
//! and snapshots the outgoing payload together with a [`RequestReceipt`];
//! `apply` takes the receipt back and refuses to touch state when the
//! request was superseded in the meantime (new image, changed selection).
//! That token comparison, not the busy flag, is what prevents a slow preview
//! response from clobbering a newer result.

use crate::api::ApiClient;
use crate::configs::ConfigurationStore;
use crate::error::{AppError, Result};
use crate::session::Session;
use crate::validate::{MIN_CROP_MESSAGE, validate_crop};

/// Which of the two image operations a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Preview,
    Generate,
}

/// Identifies one outgoing request when its response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestReceipt {
    pub kind: RequestKind,
    pub token: u64,
    /// Configuration id carried by a Generate payload, if one was selected.
    pub config_id: Option<i64>,
}

/// Snapshot of an outgoing payload, ready for transmission.
#[derive(Debug)]
pub struct PendingRequest {
    pub receipt: RequestReceipt,
    /// Raw bytes of the source image.
    pub image: Vec<u8>,
    pub image_name: String,
    /// JSON tuple string for the `crops` field, e.g. `"[80,60,240,180]"`.
    pub coords: String,
}

/// Drives preview and generate calls against the owned [`Session`].
#[derive(Debug, Default)]
pub struct RequestController {
    session: Session,
}

impl RequestController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Starts a preview request. See [`RequestController::begin`].
    pub fn begin_preview(&mut self) -> Result<PendingRequest> {
        self.begin(RequestKind::Preview, None)
    }

    /// Starts a generate request, carrying the store's selected
    /// configuration id when one is set.
    pub fn begin_generate(&mut self, store: &ConfigurationStore) -> Result<PendingRequest> {
        self.begin(RequestKind::Generate, store.selected_id())
    }

    /// Checks preconditions and transitions to Busy.
    ///
    /// Preconditions: not busy, an image is chosen, and the mapped crop
    /// passes validation. While busy the call returns [`AppError::Busy`]
    /// without any state change or outgoing request. A validation failure
    /// surfaces its message in the session error slot and never reaches the
    /// network.
    fn begin(&mut self, kind: RequestKind, config_id: Option<i64>) -> Result<PendingRequest> {
        if self.session.busy() {
            return Err(AppError::Busy);
        }

        let Some(image) = self.session.image() else {
            let msg = "Please choose an image first";
            self.session.set_error(msg);
            return Err(AppError::validation(msg));
        };
        let image_bytes = image.bytes.clone();
        let image_name = image.name.clone();

        let crop = match self.session.crop() {
            Some(crop) if validate_crop(Some(&crop)).is_ok() => crop,
            _ => {
                self.session.set_error(MIN_CROP_MESSAGE);
                return Err(AppError::validation(MIN_CROP_MESSAGE));
            }
        };

        self.session.clear_error();
        let token = self.session.start_request();

        Ok(PendingRequest {
            receipt: RequestReceipt {
                kind,
                token,
                config_id,
            },
            image: image_bytes,
            image_name,
            coords: crop.coords_json(),
        })
    }

    /// Applies a completed response to state and returns to Idle.
    ///
    /// Returns `false` when the receipt's token no longer matches the
    /// outstanding request: the response is stale and is discarded entirely,
    /// leaving prior results untouched. On success the result bytes are
    /// stored; on failure the error message replaces whatever was in the
    /// error slot, and prior successful results stay as they were.
    pub fn apply(&mut self, receipt: RequestReceipt, outcome: Result<Vec<u8>>) -> bool {
        if !self.session.finish_request(receipt.token) {
            log::debug!("Discarding stale {:?} response", receipt.kind);
            return false;
        }
        match outcome {
            Ok(bytes) => match receipt.kind {
                RequestKind::Preview => self.session.set_preview(bytes),
                RequestKind::Generate => self.session.set_generated(bytes, receipt.config_id),
            },
            Err(e) => self.session.set_error(e.to_string()),
        }
        true
    }

    /// Runs a full preview round trip.
    ///
    /// Returns `Err` only for local rejections (busy, validation); a
    /// network or service failure is recorded in the session error slot and
    /// the call returns `Ok(())`, mirroring how the result bytes land in the
    /// session rather than the return value.
    pub async fn submit_preview(&mut self, api: &ApiClient) -> Result<()> {
        let pending = self.begin_preview()?;
        let receipt = pending.receipt;
        let outcome = api
            .preview(pending.image, pending.image_name, pending.coords)
            .await;
        self.apply(receipt, outcome);
        Ok(())
    }

    /// Runs a full generate round trip; same contract as
    /// [`RequestController::submit_preview`].
    pub async fn submit_generate(
        &mut self,
        api: &ApiClient,
        store: &ConfigurationStore,
    ) -> Result<()> {
        let pending = self.begin_generate(store)?;
        let receipt = pending.receipt;
        let outcome = api
            .generate(
                pending.image,
                pending.image_name,
                pending.coords,
                receipt.config_id,
            )
            .await;
        self.apply(receipt, outcome);
        Ok(())
    }
}
