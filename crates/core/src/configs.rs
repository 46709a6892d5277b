//! Logo-overlay configurations and their in-memory store.
//!
//! Configurations are fetched once at startup, appended to when a new one is
//! created, and never mutated afterwards from the client's point of view.
//! Which configuration is active is tracked as a separate selected id
//! alongside the append-only list, not as a flag inside the list items.

use crate::api::ApiClient;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive bounds accepted for a configuration's scale-down factor.
pub const SCALE_DOWN_MIN: f64 = 0.01;
pub const SCALE_DOWN_MAX: f64 = 0.25;

/// Anchor position of the logo within the generated crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl LogoPosition {
    pub const ALL: [LogoPosition; 5] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::Center,
    ];

    /// The wire spelling of the position, e.g. `bottom-right`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Center => "center",
        }
    }
}

impl fmt::Display for LogoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogoPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown logo position '{s}'"))
    }
}

/// A persisted logo-overlay configuration, as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Server-assigned unique id.
    pub id: i64,
    /// Factor the logo is scaled down by, in `(0, 0.25]`.
    pub scale_down: f64,
    pub logo_position: LogoPosition,
    /// Server-side URL of the stored logo image, if any.
    #[serde(default)]
    pub logo_image: Option<String>,
}

/// Checks a scale-down factor before it is allowed onto the wire.
///
/// The server is the source of truth for acceptance, but an out-of-range
/// value is rejected client-side so the form never submits it.
pub fn validate_scale_down(scale_down: f64) -> Result<()> {
    if !(SCALE_DOWN_MIN..=SCALE_DOWN_MAX).contains(&scale_down) {
        return Err(AppError::validation(format!(
            "scaleDown must be between {SCALE_DOWN_MIN} and {SCALE_DOWN_MAX} (got {scale_down})"
        )));
    }
    Ok(())
}

/// In-memory cache of configurations plus the currently selected id.
#[derive(Debug, Default)]
pub struct ConfigurationStore {
    configs: Vec<Configuration>,
    selected: Option<i64>,
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All known configurations, in server order.
    pub fn all(&self) -> &[Configuration] {
        &self.configs
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Fetches the configuration list from the service.
    ///
    /// Called once at startup. A failure is logged and swallowed; the store
    /// stays empty and the rest of the workflow remains usable without
    /// overlay configurations.
    pub async fn load_all(&mut self, api: &ApiClient) {
        match api.list_configurations().await {
            Ok(configs) => self.configs = configs,
            Err(e) => log::warn!("Failed to load configurations: {e}"),
        }
    }

    /// Creates a new configuration on the service and appends it.
    ///
    /// `scale_down` is validated client-side before anything is transmitted.
    pub async fn create(
        &mut self,
        api: &ApiClient,
        scale_down: f64,
        logo_position: LogoPosition,
        logo_png: Option<Vec<u8>>,
    ) -> Result<Configuration> {
        validate_scale_down(scale_down)?;

        let created = api
            .create_configuration(scale_down, logo_position, logo_png)
            .await?;
        self.configs.push(created.clone());
        Ok(created)
    }

    /// Sets the active configuration; `None` means "no overlay".
    ///
    /// Advisory state only: nothing is sent to the service until a Generate
    /// request is made.
    pub fn select(&mut self, id: Option<i64>) -> Result<()> {
        match id {
            None => {
                self.selected = None;
                Ok(())
            }
            Some(id) => {
                if self.configs.iter().any(|c| c.id == id) {
                    self.selected = Some(id);
                    Ok(())
                } else {
                    Err(AppError::validation(format!(
                        "No configuration with id {id}"
                    )))
                }
            }
        }
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected
    }

    /// The currently selected configuration, looked up in the cached list.
    pub fn selected(&self) -> Option<&Configuration> {
        self.selected
            .and_then(|id| self.configs.iter().find(|c| c.id == id))
    }

    /// Looks up any configuration by id.
    pub fn get(&self, id: i64) -> Option<&Configuration> {
        self.configs.iter().find(|c| c.id == id)
    }

    #[cfg(test)]
    pub(crate) fn with_configs(configs: Vec<Configuration>) -> Self {
        Self {
            configs,
            selected: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64) -> Configuration {
        Configuration {
            id,
            scale_down: 0.1,
            logo_position: LogoPosition::BottomRight,
            logo_image: Some(format!("/media/logos/logo-{id}.png")),
        }
    }

    #[test]
    fn position_round_trips_through_wire_spelling() {
        for position in LogoPosition::ALL {
            assert_eq!(position.as_str().parse::<LogoPosition>(), Ok(position));
        }
        assert!("middle".parse::<LogoPosition>().is_err());
    }

    #[test]
    fn configuration_deserializes_from_service_record() {
        let json = r#"{
            "id": 3,
            "scale_down": 0.05,
            "logo_position": "bottom-right",
            "logo_image": "/media/logos/acme.png"
        }"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(config.id, 3);
        assert_eq!(config.scale_down, 0.05);
        assert_eq!(config.logo_position, LogoPosition::BottomRight);
        assert_eq!(config.logo_image.as_deref(), Some("/media/logos/acme.png"));
    }

    #[test]
    fn scale_down_bounds() {
        assert!(validate_scale_down(0.01).is_ok());
        assert!(validate_scale_down(0.25).is_ok());
        assert!(validate_scale_down(0.1).is_ok());
        assert!(matches!(
            validate_scale_down(0.3),
            Err(crate::error::AppError::Validation(_))
        ));
        assert!(validate_scale_down(0.0).is_err());
        assert!(validate_scale_down(-0.05).is_err());
    }

    #[test]
    fn select_tracks_id_separately_from_list() {
        let mut store = ConfigurationStore::with_configs(vec![sample(1), sample(2)]);
        assert_eq!(store.selected(), None);

        store.select(Some(2)).unwrap();
        assert_eq!(store.selected_id(), Some(2));
        assert_eq!(store.selected().unwrap().id, 2);

        store.select(None).unwrap();
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn selecting_unknown_id_is_an_error() {
        let mut store = ConfigurationStore::with_configs(vec![sample(1)]);
        assert!(store.select(Some(42)).is_err());
        assert_eq!(store.selected_id(), None);
    }

    #[tokio::test]
    async fn out_of_range_scale_never_reaches_the_wire() {
        // A transmission attempt against this address would surface as a
        // Transport error; the client-side check must fire first.
        let config = crate::config::Config::with_url("http://127.0.0.1:1").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let mut store = ConfigurationStore::new();

        let result = store
            .create(&api, 0.3, LogoPosition::BottomRight, None)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.is_empty());
    }
}
