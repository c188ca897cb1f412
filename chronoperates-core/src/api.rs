//! HTTP client for the extraction backend.

use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::image::SelectedImage;
use crate::protocol::{
    DOWNLOAD_PATH, ErrorBody, ExtractionResult, GENERIC_UPLOAD_ERROR, UPLOAD_FIELD, UPLOAD_PATH,
};

/// Talks to the backend at a resolved [`ApiConfig`]. Each call is a single
/// attempt; nothing is retried here.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_http(config, reqwest::Client::new())
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxies).
    pub fn with_http(config: ApiConfig, http: reqwest::Client) -> Self {
        ApiClient { http, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// POST /upload-image
    pub async fn upload_image(&self, image: &SelectedImage) -> ExtractResult<ExtractionResult> {
        let bytes = image.read_bytes().await.map_err(|e| {
            ExtractError::RequestFailed(format!("Could not read {}: {}", image.describe(), e))
        })?;

        let part = Part::bytes(bytes)
            .file_name(image.upload_file_name())
            .mime_str(&image.upload_media_type())
            .map_err(|e| {
                warn!(
                    error = %e,
                    media_type = %image.upload_media_type(),
                    "upload_media_type_invalid"
                );
                ExtractError::RequestFailed(GENERIC_UPLOAD_ERROR.to_string())
            })?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let url = self.config.endpoint(UPLOAD_PATH);
        debug!(url = %url, file_name = %image.upload_file_name(), "upload_request");

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "upload_unreachable");
                ExtractError::RequestFailed(GENERIC_UPLOAD_ERROR.to_string())
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let detail = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .filter(|detail| !detail.is_empty());
            warn!(status, detail = ?detail, "upload_rejected");
            return Err(ExtractError::RequestFailed(
                detail.unwrap_or_else(|| GENERIC_UPLOAD_ERROR.to_string()),
            ));
        }

        resp.json::<ExtractionResult>().await.map_err(|e| {
            warn!(error = %e, "upload_response_malformed");
            ExtractError::RequestFailed(GENERIC_UPLOAD_ERROR.to_string())
        })
    }

    /// `{api_url}/download-ics?file_path=<encoded locator>`
    pub fn download_url(&self, locator: &str) -> String {
        format!(
            "{}?file_path={}",
            self.config.endpoint(DOWNLOAD_PATH),
            urlencoding::encode(locator)
        )
    }

    /// GET /download-ics, returning the raw calendar bytes.
    pub async fn download_ics(&self, locator: &str) -> ExtractResult<Vec<u8>> {
        let url = self.download_url(locator);
        debug!(url = %url, "download_request");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ExtractError::RetrievalFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ExtractError::RetrievalFailed(format!(
                "server responded with {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ExtractError::RetrievalFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(ApiConfig::new(server.uri()))
    }

    fn pasted_png() -> SelectedImage {
        SelectedImage::from_bytes(b"\x89PNG fake".to_vec(), "image/png")
    }

    #[tokio::test]
    async fn test_upload_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ics_file_path": "/tmp/events.ics",
                "events_found": 3,
                "extracted_text": "Event data",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).upload_image(&pasted_png()).await.unwrap();

        assert_eq!(result.ics_file_path, "/tmp/events.ics");
        assert_eq!(result.events_found, 3);
        assert_eq!(result.extracted_text(), Some("Event data"));
    }

    #[tokio::test]
    async fn test_upload_sends_single_file_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ics_file_path": "/tmp/events.ics",
                "events_found": 0,
                "extracted_text": "",
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("Flyer.JPG");
        std::fs::write(&image_path, b"jpeg bytes").unwrap();

        client(&server)
            .upload_image(&SelectedImage::from_path(&image_path))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);

        let content_type = requests[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&requests[0].body).to_string();
        assert!(body.contains(r#"name="file""#));
        assert!(body.contains(r#"filename="photo.jpg""#));
        assert!(body.to_lowercase().contains("content-type: image/jpg"));
        assert!(body.contains("jpeg bytes"));
        assert_eq!(body.to_lowercase().matches("content-disposition").count(), 1);
    }

    #[tokio::test]
    async fn test_upload_padded_media_type_reaches_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ics_file_path": "/tmp/events.ics",
                "events_found": 1,
                "extracted_text": null,
            })))
            .expect(2)
            .mount(&server)
            .await;

        for declared in [" image/png", "image/png "] {
            let pasted = SelectedImage::from_bytes(b"png bytes".to_vec(), declared);
            let result = client(&server).upload_image(&pasted).await.unwrap();
            assert_eq!(result.events_found, 1);
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            let body = String::from_utf8_lossy(&request.body).to_lowercase();
            assert!(body.contains(r#"filename="photo.png""#));
            assert!(body.contains("content-type: image/png\r\n"));
        }
    }

    #[tokio::test]
    async fn test_upload_error_uses_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-image"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "detail": "Invalid image format" })),
            )
            .mount(&server)
            .await;

        let err = client(&server).upload_image(&pasted_png()).await.unwrap_err();

        assert!(matches!(&err, ExtractError::RequestFailed(msg) if msg == "Invalid image format"));
    }

    #[tokio::test]
    async fn test_upload_error_without_json_uses_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-image"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client(&server).upload_image(&pasted_png()).await.unwrap_err();

        assert_eq!(err.to_string(), GENERIC_UPLOAD_ERROR);
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_request_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-image"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "ok" })),
            )
            .mount(&server)
            .await;

        let err = client(&server).upload_image(&pasted_png()).await.unwrap_err();

        assert!(matches!(&err, ExtractError::RequestFailed(msg) if msg == GENERIC_UPLOAD_ERROR));
    }

    #[tokio::test]
    async fn test_unreachable_backend_uses_generic_message() {
        // Nothing listens on port 9 (discard) in the test environment.
        let client = ApiClient::new(ApiConfig::new("http://127.0.0.1:9"));

        let err = client.upload_image(&pasted_png()).await.unwrap_err();

        assert_eq!(err.to_string(), GENERIC_UPLOAD_ERROR);
    }

    #[tokio::test]
    async fn test_unreadable_image_fails_before_network() {
        let server = MockServer::start().await;
        let missing = SelectedImage::File {
            path: PathBuf::from("/definitely/not/here.png"),
            size: None,
        };

        let err = client(&server).upload_image(&missing).await.unwrap_err();

        assert!(matches!(err, ExtractError::RequestFailed(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_download_url_encodes_locator() {
        let client = ApiClient::new(ApiConfig::new("http://localhost:8000"));

        assert_eq!(
            client.download_url("/tmp/x.ics"),
            "http://localhost:8000/download-ics?file_path=%2Ftmp%2Fx.ics"
        );
        assert_eq!(
            client.download_url("/tmp/my events&more.ics"),
            "http://localhost:8000/download-ics?file_path=%2Ftmp%2Fmy%20events%26more.ics"
        );
    }

    #[tokio::test]
    async fn test_download_returns_raw_bytes() {
        let server = MockServer::start().await;
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
        Mock::given(method("GET"))
            .and(path("/download-ics"))
            .and(query_param("file_path", "/tmp/x.ics"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(ics.as_bytes().to_vec(), "text/calendar"),
            )
            .mount(&server)
            .await;

        let bytes = client(&server).download_ics("/tmp/x.ics").await.unwrap();
        assert_eq!(bytes, ics.as_bytes());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("file_path=%2Ftmp%2Fx.ics"));
    }

    #[tokio::test]
    async fn test_download_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download-ics"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).download_ics("/tmp/gone.ics").await.unwrap_err();
        assert!(matches!(err, ExtractError::RetrievalFailed(_)));
    }
}
