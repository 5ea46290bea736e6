//! Product image download into the local images directory.

use crate::error::ScrapeError;
use crate::shop::client::ShopFetch;
use std::path::PathBuf;
use tracing::debug;

/// Derives the local file name from the last path segment of an image URL.
///
/// Query and fragment are ignored and percent-escapes decoded. Names that
/// could escape the images directory are rejected.
pub fn image_file_name(url: &str) -> Result<String, ScrapeError> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let segment = without_query.rsplit('/').next().unwrap_or_default();

    let name = urlencoding::decode(segment)
        .map_err(|e| ScrapeError::image(url, format!("undecodable file name: {}", e)))?
        .into_owned();

    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ScrapeError::image(url, format!("unusable file name {:?}", name)));
    }

    Ok(name)
}

/// Downloads images and stores them by file name. No retry.
pub struct ImageRetriever<'a, C: ShopFetch + ?Sized> {
    client: &'a C,
    images_dir: PathBuf,
}

impl<'a, C: ShopFetch + ?Sized> ImageRetriever<'a, C> {
    pub fn new(client: &'a C, images_dir: impl Into<PathBuf>) -> Self {
        Self { client, images_dir: images_dir.into() }
    }

    /// Downloads `url` and returns the local path it was written to.
    ///
    /// An existing file with the same name is overwritten.
    pub async fn retrieve(&self, url: &str) -> Result<String, ScrapeError> {
        let file_name = image_file_name(url)?;

        let bytes = self.client.fetch_bytes(url).await.map_err(|e| match e {
            ScrapeError::Transport { message, .. } => ScrapeError::image(url, message),
            other => ScrapeError::image(url, other),
        })?;

        tokio::fs::create_dir_all(&self.images_dir)
            .await
            .map_err(|e| ScrapeError::image(url, format!("cannot create {}: {}", self.images_dir.display(), e)))?;

        let path = self.images_dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ScrapeError::image(url, format!("cannot write {}: {}", path.display(), e)))?;

        debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }
}
