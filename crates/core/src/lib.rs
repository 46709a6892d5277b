//! Croplab Core Library
//!
//! This library provides the core functionality for the croplab image
//! cropping tool: selecting a region of a source image, requesting a cheap
//! low-resolution preview of the crop from a remote processing service, and
//! generating the full-quality crop, optionally composited with a logo
//! overlay described by a reusable configuration.
//!
//! # Overview
//!
//! Croplab is a client; the actual image processing (scaling, compositing)
//! happens on the remote service. The library handles everything in front of
//! it:
//!
//! - **Coordinate Mapping**: percentage-space selections to pixel-space
//!   crops via [`geometry`]
//! - **Validation**: minimum-size gating before any network call via
//!   [`validate`]
//! - **Configurations**: the logo-overlay configuration cache via [`configs`]
//! - **Request Sequencing**: the preview/generate state machine via
//!   [`controller`], with stale responses discarded by request token
//! - **Session State**: the single owned state record via [`session`]
//! - **Service Client**: the consumed HTTP endpoints via [`api`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`Croplab`] facade:
//!
//! ```ignore
//! use croplab_core::{Croplab, SelectionRect};
//!
//! let mut app = Croplab::new()?;
//! app.load_configurations().await;
//!
//! app.choose_file("photo.jpg".as_ref())?;
//! app.set_selection(SelectionRect::new(10.0, 10.0, 20.0, 20.0));
//! app.preview().await?;
//! ```
//!
//! # Module Structure
//!
//! - [`api`]: HTTP client for the processing service
//! - [`config`]: Environment-based configuration
//! - [`configs`]: Logo-overlay configurations and their store
//! - [`controller`]: Preview/generate request state machine
//! - [`error`]: Error types and result aliases
//! - [`geometry`]: Selection and crop rectangles, coordinate mapping
//! - [`session`]: Upload session and owned state
//! - [`validate`]: Crop validation rules

pub mod api;
pub mod config;
pub mod configs;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod session;
pub mod validate;

// Re-export primary types for convenience
pub use api::ApiClient;
pub use config::Config;
pub use configs::{Configuration, ConfigurationStore, LogoPosition};
pub use controller::{PendingRequest, RequestController, RequestKind, RequestReceipt};
pub use error::{AppError, Result};
pub use geometry::{CropRect, MappedCrop, NaturalSize, SelectionRect};
pub use session::{ImageReference, Session};

use std::path::Path;

/// Default file name for a downloaded generated result.
pub const DOWNLOAD_FILE_NAME: &str = "cropped-image.png";

/// Main entry point for the croplab client.
///
/// This struct provides a facade over the various subsystems, wiring the
/// request controller, configuration store and service client together.
/// It's the recommended way to use the library for most use cases.
pub struct Croplab {
    config: Config,
    api: ApiClient,
    controller: RequestController,
    store: ConfigurationStore,
}

impl Croplab {
    /// Creates a new instance with environment-based configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured API base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::load()?)
    }

    /// Creates an instance with custom configuration, e.g. a CLI override
    /// of the service address.
    pub fn with_config(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        Ok(Self {
            config,
            api,
            controller: RequestController::new(),
            store: ConfigurationStore::new(),
        })
    }

    /// Fetches the configuration list once at startup.
    ///
    /// A failure is logged and leaves the store empty; the crop workflow
    /// stays usable without overlay configurations.
    pub async fn load_configurations(&mut self) {
        self.store.load_all(&self.api).await;
    }

    /// Creates and appends a new logo-overlay configuration.
    pub async fn create_configuration(
        &mut self,
        scale_down: f64,
        logo_position: LogoPosition,
        logo_png: Option<Vec<u8>>,
    ) -> Result<Configuration> {
        self.store
            .create(&self.api, scale_down, logo_position, logo_png)
            .await
    }

    /// Sets the active configuration; `None` means "no overlay".
    pub fn select_configuration(&mut self, id: Option<i64>) -> Result<()> {
        self.store.select(id)
    }

    /// Chooses a new source image, resetting all dependent state.
    pub fn choose_file(&mut self, path: &Path) -> Result<()> {
        self.controller.session_mut().choose_file(path)
    }

    /// Updates the current selection (percentage space).
    pub fn set_selection(&mut self, selection: SelectionRect) {
        self.controller.session_mut().set_selection(Some(selection));
    }

    /// Requests a low-resolution preview of the current crop.
    pub async fn preview(&mut self) -> Result<()> {
        self.controller.submit_preview(&self.api).await
    }

    /// Requests the full-quality crop, with the selected configuration's
    /// logo overlay when one is active.
    pub async fn generate(&mut self) -> Result<()> {
        self.controller.submit_generate(&self.api, &self.store).await
    }

    /// Returns a reference to the session state.
    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    /// Returns a reference to the configuration store.
    pub fn store(&self) -> &ConfigurationStore {
        &self.store
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
/// This loads `.env` files if present and sets up the environment.
pub fn init() {
    let _ = dotenvy::dotenv();
}
