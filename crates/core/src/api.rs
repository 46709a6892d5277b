//! HTTP client for the image processing service.
//!
//! Wraps the four consumed endpoints: configuration list/create and the
//! preview/generate image operations. Requests go out as multipart forms;
//! image results come back as `{"image": "<base64>"}` bodies and are decoded
//! to raw bytes here. No credentials are attached.

use crate::config::Config;
use crate::configs::{Configuration, LogoPosition};
use crate::error::{AppError, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use url::Url;

/// Client for the crop service endpoints.
pub struct ApiClient {
    http: Client,
    base: Url,
}

/// Successful body of the preview/generate endpoints.
#[derive(Debug, Deserialize)]
struct ImageBody {
    image: String,
}

/// Structured error body; any non-2xx response may carry one.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| AppError::transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base: config.api_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| AppError::config(format!("Invalid endpoint {path}: {e}")))
    }

    /// `GET /api/config/` - the full configuration list, in server order.
    pub async fn list_configurations(&self) -> Result<Vec<Configuration>> {
        let url = self.endpoint("/api/config/")?;
        log::debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::transport(e.to_string()))?;
        let response = Self::check(response).await?;
        response
            .json::<Vec<Configuration>>()
            .await
            .map_err(|e| AppError::transport(format!("Malformed configuration list: {e}")))
    }

    /// `POST /api/config` - creates a logo-overlay configuration.
    pub async fn create_configuration(
        &self,
        scale_down: f64,
        logo_position: LogoPosition,
        logo_png: Option<Vec<u8>>,
    ) -> Result<Configuration> {
        let url = self.endpoint("/api/config")?;
        let mut form = Form::new()
            .text("scaleDown", scale_down.to_string())
            .text("logoPosition", logo_position.as_str());
        if let Some(png) = logo_png {
            let part = Part::bytes(png)
                .file_name("logo.png")
                .mime_str("image/png")
                .map_err(|e| AppError::transport(e.to_string()))?;
            form = form.part("logoImage", part);
        }

        log::debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::transport(e.to_string()))?;
        let response = Self::check(response).await?;
        response
            .json::<Configuration>()
            .await
            .map_err(|e| AppError::transport(format!("Malformed configuration record: {e}")))
    }

    /// `POST /api/image/preview` - low-resolution rendering of the crop.
    pub async fn preview(
        &self,
        image: Vec<u8>,
        image_name: String,
        coords_json: String,
    ) -> Result<Vec<u8>> {
        self.post_image("/api/image/preview", image, image_name, coords_json, None)
            .await
    }

    /// `POST /api/image/generate` - full-quality crop, optionally composited
    /// with the logo of the given configuration.
    pub async fn generate(
        &self,
        image: Vec<u8>,
        image_name: String,
        coords_json: String,
        config_id: Option<i64>,
    ) -> Result<Vec<u8>> {
        self.post_image(
            "/api/image/generate",
            image,
            image_name,
            coords_json,
            config_id,
        )
        .await
    }

    async fn post_image(
        &self,
        path: &str,
        image: Vec<u8>,
        image_name: String,
        coords_json: String,
        config_id: Option<i64>,
    ) -> Result<Vec<u8>> {
        let url = self.endpoint(path)?;
        let image_part = Part::bytes(image).file_name(image_name);
        let mut form = Form::new()
            .part("image", image_part)
            .text("crops", coords_json);
        // Omitted entirely when no configuration is selected, never sent empty.
        if let Some(id) = config_id {
            form = form.text("config_id", id.to_string());
        }

        log::debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::transport(e.to_string()))?;
        let response = Self::check(response).await?;
        let body: ImageBody = response
            .json()
            .await
            .map_err(|e| AppError::transport(format!("Malformed image response: {e}")))?;
        decode_image_field(&body.image)
    }

    /// Maps a non-2xx response to [`AppError::Service`] when it carries a
    /// structured `{error}` body, or [`AppError::Transport`] otherwise.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match response.json::<ErrorBody>().await {
            Ok(body) => Err(AppError::service(body.error)),
            Err(_) => Err(AppError::transport(format!(
                "Request failed with status {status}"
            ))),
        }
    }
}

/// Decodes the base64 `image` field of a service response into raw bytes.
fn decode_image_field(encoded: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(encoded.trim())
        .map_err(|e| AppError::image(format!("Invalid base64 image in response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_image_field() {
        let encoded = BASE64.encode(b"\x89PNG\r\n");
        assert_eq!(decode_image_field(&encoded).unwrap(), b"\x89PNG\r\n");
    }

    #[test]
    fn rejects_non_base64_image_field() {
        assert!(matches!(
            decode_image_field("not base64!!!"),
            Err(AppError::Image(_))
        ));
    }

    #[test]
    fn joins_endpoints_against_the_base_url() {
        let config = Config::with_url("http://127.0.0.1:8000").unwrap();
        let api = ApiClient::new(&config).unwrap();
        assert_eq!(
            api.endpoint("/api/image/preview").unwrap().as_str(),
            "http://127.0.0.1:8000/api/image/preview"
        );
    }
}
