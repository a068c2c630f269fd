//! Image fetch/transform unit.
//!
//! [`ImageFetcher::fetch`] never fails: any error ends with one failure-log
//! line and the placeholder image, so a bad image degrades instead of
//! aborting the batch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use fotomigra_core::constants::{RECOMPRESS_JPEG_QUALITY, WATERMARK_ENDPOINT};

use crate::compress::recompress_jpeg;
use crate::faillog::FailureLog;

/// Fixed parameter set for the watermark service: full opacity, full mark
/// ratio, bottom-middle anchor, zero offsets.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WatermarkRequest<'a> {
    main_image_url: &'a str,
    mark_image_url: &'a str,
    opacity: f64,
    mark_ratio: f64,
    position: &'a str,
    position_x: f64,
    position_y: f64,
}

impl<'a> WatermarkRequest<'a> {
    fn new(main_image_url: &'a str, mark_image_url: &'a str) -> Self {
        Self {
            main_image_url,
            mark_image_url,
            opacity: 1.0,
            mark_ratio: 1.0,
            position: "bottomMiddle",
            position_x: 0.0,
            position_y: 0.0,
        }
    }
}

/// Trait seam between the orchestrator and the fetch unit.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Produce image bytes for `url`. Must not fail; error handling is the
    /// implementation's responsibility.
    async fn fetch(&self, url: &str) -> Bytes;

    /// Fetch `urls` sequentially, preserving input order. Concurrency across
    /// groups belongs to the orchestrator, not here.
    async fn fetch_many(&self, urls: &[String]) -> Vec<Bytes> {
        let mut images = Vec::with_capacity(urls.len());
        for url in urls {
            images.push(self.fetch(url).await);
        }
        images
    }
}

/// HTTP-backed fetcher, optionally routing through the watermark service.
pub struct ImageFetcher {
    client: reqwest::Client,
    watermark_endpoint: String,
    watermark_url: Option<String>,
    n_tries: u32,
    placeholder: Bytes,
    log: Arc<dyn FailureLog>,
}

impl ImageFetcher {
    /// Create a new ImageFetcher
    ///
    /// # Arguments
    /// * `timeout` - per-request timeout for image and watermark calls
    /// * `n_tries` - retries after a failed watermark call (total attempts
    ///   are `n_tries + 1`)
    /// * `watermark_url` - public URL of the mark image; plain downloads
    ///   when absent
    /// * `placeholder` - bytes substituted for any failed fetch
    /// * `log` - failure log sink, one line per failed fetch
    pub fn new(
        timeout: Duration,
        n_tries: u32,
        watermark_url: Option<String>,
        placeholder: Bytes,
        log: Arc<dyn FailureLog>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            watermark_endpoint: WATERMARK_ENDPOINT.to_string(),
            watermark_url,
            n_tries,
            placeholder,
            log,
        })
    }

    /// Override the watermark service base URL (tests, alternate deployments).
    pub fn with_watermark_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.watermark_endpoint = endpoint.into();
        self
    }

    async fn fetch_plain(&self, url: &str) -> Result<Bytes, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("{}. Could not download the image. URL: {}", e, url))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(format!(
                "Error downloading the image. Status code: {}. URL: {}",
                status.as_u16(),
                url
            ));
        }

        response
            .bytes()
            .await
            .map_err(|e| format!("{}. Could not download the image. URL: {}", e, url))
    }

    async fn watermark_once(
        &self,
        url: &str,
        request: &WatermarkRequest<'_>,
    ) -> Result<Bytes, String> {
        let response = self
            .client
            .post(&self.watermark_endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| format!("{}. Could not apply watermark to the image. URL: {}", e, url))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(format!(
                "Error applying watermark to the image. Status code: {}. URL: {}",
                status.as_u16(),
                url
            ));
        }

        response
            .bytes()
            .await
            .map_err(|e| format!("{}. Could not apply watermark to the image. URL: {}", e, url))
    }

    /// Watermark round trip with a bounded attempt loop: one initial call
    /// plus `n_tries` retries. A successful response is re-compressed to
    /// counteract the size inflation the service introduces; a compression
    /// failure is not retried.
    async fn fetch_watermarked(&self, url: &str, mark_url: &str) -> Result<Bytes, String> {
        let request = WatermarkRequest::new(url, mark_url);
        let mut last_failure = String::new();

        for _ in 0..=self.n_tries {
            match self.watermark_once(url, &request).await {
                Ok(body) => {
                    return recompress_jpeg(&body, RECOMPRESS_JPEG_QUALITY).map_err(|e| {
                        format!("{:#}. Could not apply watermark to the image. URL: {}", e, url)
                    });
                }
                Err(failure) => last_failure = failure,
            }
        }

        Err(last_failure)
    }
}

#[async_trait]
impl Fetcher for ImageFetcher {
    async fn fetch(&self, url: &str) -> Bytes {
        let result = match &self.watermark_url {
            Some(mark_url) => self.fetch_watermarked(url, mark_url).await,
            None => self.fetch_plain(url).await,
        };

        match result {
            Ok(bytes) => bytes,
            Err(message) => {
                tracing::warn!(url = %url, detail = %message, "Image fetch failed, substituting placeholder");
                self.log.record(&message);
                self.placeholder.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faillog::MemoryFailureLog;
    use crate::placeholder::default_placeholder;
    use image::codecs::jpeg::JpegEncoder;
    use serde_json::json;

    fn tiny_jpeg() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, 90);
        encoder.encode_image(&img).unwrap();
        buffer
    }

    fn fetcher(
        watermark_url: Option<String>,
        n_tries: u32,
        log: Arc<MemoryFailureLog>,
    ) -> ImageFetcher {
        ImageFetcher::new(
            Duration::from_secs(5),
            n_tries,
            watermark_url,
            default_placeholder().unwrap(),
            log,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn plain_fetch_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/img.jpg")
            .with_status(200)
            .with_body(b"jpeg bytes")
            .create_async()
            .await;

        let log = Arc::new(MemoryFailureLog::new());
        let fetcher = fetcher(None, 0, log.clone());

        let bytes = fetcher.fetch(&format!("{}/img.jpg", server.url())).await;
        assert_eq!(bytes.as_ref(), b"jpeg bytes");
        assert!(log.lines().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn plain_fetch_falls_back_to_placeholder_on_404() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.jpg")
            .with_status(404)
            .create_async()
            .await;

        let log = Arc::new(MemoryFailureLog::new());
        let fetcher = fetcher(None, 0, log.clone());

        let url = format!("{}/missing.jpg", server.url());
        let bytes = fetcher.fetch(&url).await;
        assert_eq!(bytes, default_placeholder().unwrap());

        let lines = log.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Status code: 404"));
        assert!(lines[0].contains(&url));
    }

    #[tokio::test]
    async fn fetch_never_returns_empty_even_when_unreachable() {
        // Connection refused: no server listening on this port.
        let log = Arc::new(MemoryFailureLog::new());
        let fetcher = fetcher(None, 0, log.clone());

        let bytes = fetcher.fetch("http://127.0.0.1:1/img.jpg").await;
        assert!(!bytes.is_empty());
        assert_eq!(log.lines().len(), 1);
    }

    #[tokio::test]
    async fn watermark_posts_fixed_parameter_set() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/watermark")
            .match_body(mockito::Matcher::Json(json!({
                "mainImageUrl": "https://images.test/main.jpg",
                "markImageUrl": "https://images.test/mark.png",
                "opacity": 1.0,
                "markRatio": 1.0,
                "position": "bottomMiddle",
                "positionX": 0.0,
                "positionY": 0.0,
            })))
            .with_status(200)
            .with_body(tiny_jpeg())
            .create_async()
            .await;

        let log = Arc::new(MemoryFailureLog::new());
        let fetcher = fetcher(
            Some("https://images.test/mark.png".to_string()),
            0,
            log.clone(),
        )
        .with_watermark_endpoint(format!("{}/watermark", server.url()));

        let bytes = fetcher.fetch("https://images.test/main.jpg").await;
        mock.assert_async().await;
        assert!(log.lines().is_empty());

        // The body is re-compressed, not passed through.
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
        assert_ne!(bytes.as_ref(), tiny_jpeg().as_slice());
    }

    #[tokio::test]
    async fn watermark_failure_retries_then_placeholder() {
        let mut server = mockito::Server::new_async().await;
        // n_tries = 2 means one initial call plus two retries.
        let mock = server
            .mock("POST", "/watermark")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let log = Arc::new(MemoryFailureLog::new());
        let fetcher = fetcher(Some("https://images.test/mark.png".to_string()), 2, log.clone())
            .with_watermark_endpoint(format!("{}/watermark", server.url()));

        let bytes = fetcher.fetch("https://images.test/main.jpg").await;
        mock.assert_async().await;
        assert_eq!(bytes, default_placeholder().unwrap());

        let lines = log.lines();
        assert_eq!(lines.len(), 1, "exactly one failure line per failed fetch");
        assert!(lines[0].contains("Status code: 500"));
    }

    #[tokio::test]
    async fn undecodable_watermark_body_falls_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/watermark")
            .with_status(200)
            .with_body(b"definitely not an image")
            .create_async()
            .await;

        let log = Arc::new(MemoryFailureLog::new());
        let fetcher = fetcher(Some("https://images.test/mark.png".to_string()), 1, log.clone())
            .with_watermark_endpoint(format!("{}/watermark", server.url()));

        let bytes = fetcher.fetch("https://images.test/main.jpg").await;
        assert_eq!(bytes, default_placeholder().unwrap());
        assert_eq!(log.lines().len(), 1);
    }

    #[tokio::test]
    async fn fetch_many_preserves_input_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/a.jpg")
            .with_status(200)
            .with_body(b"first")
            .create_async()
            .await;
        server
            .mock("GET", "/b.jpg")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/c.jpg")
            .with_status(200)
            .with_body(b"third")
            .create_async()
            .await;

        let log = Arc::new(MemoryFailureLog::new());
        let fetcher = fetcher(None, 0, log.clone());

        let urls = vec![
            format!("{}/a.jpg", server.url()),
            format!("{}/b.jpg", server.url()),
            format!("{}/c.jpg", server.url()),
        ];
        let images = fetcher.fetch_many(&urls).await;

        assert_eq!(images.len(), 3);
        assert_eq!(images[0].as_ref(), b"first");
        assert_eq!(images[1], default_placeholder().unwrap());
        assert_eq!(images[2].as_ref(), b"third");
        assert_eq!(log.lines().len(), 1);
    }
}
