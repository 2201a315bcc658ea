//! Remote image loading
//!
//! Remote image elements are resolved before painting. A load failure is
//! never fatal: the element is simply absent from [`ResolvedImages`] and the
//! renderer draws the fallback placeholder in its place.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::join_all;
use image::RgbaImage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::imaging;
use crate::scene::{ElementId, ImageSource, Scene, Shape};

/// Default time budget for one remote fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on a remote image body
pub const DEFAULT_MAX_REMOTE_BYTES: usize = 10 * 1024 * 1024;

/// Source of decoded pixels for remote image URLs
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Fetch and decode the image at `url`
    async fn load(&self, url: &str) -> Result<RgbaImage>;
}

/// Loader that fetches over HTTP(S) and understands `data:` URLs
pub struct HttpImageLoader {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageLoader {
    /// Create a loader with the default timeout and size cap
    pub fn new() -> Result<Self> {
        Self::with_limits(DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_REMOTE_BYTES)
    }

    /// Create a loader with an explicit timeout and body size cap
    pub fn with_limits(timeout: Duration, max_bytes: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("http client: {e}")))?;
        Ok(Self { client, max_bytes })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::image_load(format!("{url} returned {status}")));
        }
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(Error::image_load(format!(
                "{url} exceeds {} bytes",
                self.max_bytes
            )));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(Error::image_load(format!(
                    "{url} exceeds {} bytes",
                    self.max_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<RgbaImage> {
        let bytes = if let Some(data) = url.strip_prefix("data:") {
            decode_data_url(data)?
        } else if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch(url).await?
        } else {
            return Err(Error::image_load(format!("unsupported url scheme: {url}")));
        };

        tokio::task::spawn_blocking(move || imaging::decode(&bytes)).await?
    }
}

/// Decode the payload of a `data:` URL (everything after the scheme)
fn decode_data_url(data: &str) -> Result<Vec<u8>> {
    let (meta, payload) = data
        .split_once(',')
        .ok_or_else(|| Error::image_load("malformed data url"))?;
    if !meta.ends_with(";base64") {
        return Err(Error::image_load("data url is not base64 encoded"));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::image_load(format!("data url: {e}")))
}

/// Decoded remote images keyed by the element that references them
#[derive(Debug, Default, Clone)]
pub struct ResolvedImages {
    images: HashMap<ElementId, Arc<RgbaImage>>,
}

impl ResolvedImages {
    /// No images resolved
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record a decoded image for an element
    pub fn insert(&mut self, id: ElementId, image: RgbaImage) {
        self.images.insert(id, Arc::new(image));
    }

    /// Decoded pixels for an element, if its load succeeded
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&RgbaImage> {
        self.images.get(&id).map(Arc::as_ref)
    }

    /// Number of successfully resolved images
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether nothing was resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Fetch every remote image in the scene concurrently; failures are logged
/// and left out of the result
pub async fn resolve_remote_images(scene: &Scene, loader: &dyn ImageLoader) -> ResolvedImages {
    let pending = scene.elements.iter().filter_map(|element| match &element.shape {
        Shape::Image {
            source: ImageSource::Remote { url },
            ..
        } => Some(async move { (element.id, url.as_str(), loader.load(url).await) }),
        _ => None,
    });

    let mut resolved = ResolvedImages::empty();
    for (id, url, outcome) in join_all(pending).await {
        match outcome {
            Ok(image) => {
                debug!(id = %id, url, "Remote image loaded");
                resolved.insert(id, image);
            }
            Err(e) => warn!(id = %id, url, error = %e, "Remote image failed, using placeholder"),
        }
    }
    resolved
}
