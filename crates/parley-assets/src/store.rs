//! The on-disk asset store: download, cache, extract.
//!
//! Freshness is existence-only: a file that is already present is never
//! revalidated against the remote (no checksum, no ETag). Archives are
//! extracted into a directory named after the asset; a cached archive
//! whose extraction directory went missing is re-extracted without a new
//! download.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use parley_types::ModelAsset;

use crate::error::{AssetError, Result};
use crate::retry::{RetryConfig, compute_delay, is_retryable};

/// Materializes model assets in a local cache directory.
pub struct AssetStore {
    cache_dir: PathBuf,
    http: reqwest::Client,
    retry: RetryConfig,
}

impl AssetStore {
    /// Create a store over `cache_dir` with the default retry policy.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_retry(cache_dir, RetryConfig::default())
    }

    /// Create a store with an explicit retry policy.
    pub fn with_retry(cache_dir: impl Into<PathBuf>, retry: RetryConfig) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            http: reqwest::Client::new(),
            retry,
        }
    }

    /// The cache directory this store manages.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where the asset's download lands: `<cache>/<file_name>.<uri extension>`.
    pub fn download_path(&self, asset: &ModelAsset) -> PathBuf {
        let ext = asset.uri_extension();
        if ext.is_empty() {
            self.cache_dir.join(&asset.file_name)
        } else {
            self.cache_dir.join(format!("{}.{ext}", asset.file_name))
        }
    }

    /// Where an archive asset is extracted: `<cache>/<file_name>`.
    pub fn extraction_dir(&self, asset: &ModelAsset) -> PathBuf {
        self.cache_dir.join(&asset.file_name)
    }

    /// Materialize `asset`, returning the path the caller should use.
    ///
    /// Idempotent: a present download is reused as-is. For zip archives the
    /// returned path is the extraction directory; for anything else it is
    /// the downloaded file itself.
    ///
    /// # Errors
    ///
    /// [`AssetError::Empty`] if the cached or downloaded file is
    /// zero-length, [`AssetError::Transfer`]/[`AssetError::Http`] when the
    /// download fails after the configured retries, and
    /// [`AssetError::Archive`] when extraction fails.
    pub async fn ensure(&self, asset: &ModelAsset) -> Result<PathBuf> {
        let download = self.download_path(asset);

        if download.exists() {
            debug!(
                asset = %asset.file_name,
                path = %download.display(),
                "asset already present"
            );
        } else {
            info!(asset = %asset.file_name, url = %asset.source_url, "downloading asset");
            self.download(&asset.source_url, &download).await?;
        }

        let len = tokio::fs::metadata(&download).await?.len();
        if len == 0 {
            return Err(AssetError::Empty(download));
        }

        if asset.uri_extension() == "zip" {
            let extracted = self.extraction_dir(asset);
            if !extracted.exists() {
                info!(asset = %asset.file_name, "extracting cached archive");
                self.extract(&download).await?;
            }
            if !extracted.is_dir() {
                return Err(AssetError::Missing(extracted));
            }
            return Ok(extracted);
        }

        Ok(download)
    }

    /// Download `url` to `dest`, retrying transient failures with backoff.
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let mut last_err = None;

        for attempt in 0..=self.retry.max_retries {
            match self.try_download(url, dest).await {
                Ok(()) => {
                    if attempt > 0 {
                        debug!(url, attempt, "download succeeded after retry");
                    }
                    return Ok(());
                }
                Err(err) => {
                    if !is_retryable(&err) || attempt == self.retry.max_retries {
                        return Err(err);
                    }

                    let delay = compute_delay(&self.retry, attempt);
                    warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying download after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    last_err = Some(err);
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| AssetError::Transfer("retry loop exhausted without error".into())))
    }

    /// One transfer attempt: stream the body to a temp file, rename on success.
    async fn try_download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Transfer(format!("HTTP {status}: {url}")));
        }

        let total = response.content_length().unwrap_or(0);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = dest.with_extension("part");
        let mut file = tokio::fs::File::create(&tmp).await?;

        let mut downloaded: u64 = 0;
        let mut next_pct: u64 = 25;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            // Only report percentages when the total length is known.
            if total > 0 {
                let pct = downloaded * 100 / total;
                if pct >= next_pct && pct <= 99 {
                    debug!(url, pct, "download progress");
                    next_pct += 25;
                }
            }
        }
        file.flush().await?;
        drop(file);

        if total > 0 && downloaded != total {
            return Err(AssetError::IncompleteTransfer {
                expected: total,
                actual: downloaded,
            });
        }

        tokio::fs::rename(&tmp, dest).await?;
        debug!(url, bytes = downloaded, path = %dest.display(), "download complete");
        Ok(())
    }

    /// Extract a zip archive into the cache directory.
    async fn extract(&self, archive: &Path) -> Result<()> {
        let archive = archive.to_path_buf();
        let dest = self.cache_dir.clone();
        tokio::task::spawn_blocking(move || extract_zip(&archive, &dest))
            .await
            .map_err(|e| AssetError::Archive(format!("extraction task failed: {e}")))?
    }
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = std::fs::File::open(archive)?;
    let mut zip =
        zip::ZipArchive::new(file).map_err(|e| AssetError::Archive(e.to_string()))?;
    zip.extract(dest)
        .map_err(|e| AssetError::Archive(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter_fraction: 0.0,
        }
    }

    fn write_model_zip(dir: &Path, name: &str) -> PathBuf {
        let zip_path = dir.join(format!("{name}.zip"));
        let file = std::fs::File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer.add_directory(format!("{name}/"), options).unwrap();
        writer
            .start_file(format!("{name}/conf.json"), options)
            .unwrap();
        writer.write_all(b"{\"sample_rate\":16000}").unwrap();
        writer.finish().unwrap();
        zip_path
    }

    #[test]
    fn download_path_uses_uri_extension() {
        let store = AssetStore::new("/cache");
        let asset = ModelAsset::new("model", "https://host/model.zip");
        assert_eq!(store.download_path(&asset), PathBuf::from("/cache/model.zip"));
        assert_eq!(store.extraction_dir(&asset), PathBuf::from("/cache/model"));
    }

    #[test]
    fn download_path_without_extension() {
        let store = AssetStore::new("/cache");
        let asset = ModelAsset::new("model", "https://host/model");
        assert_eq!(store.download_path(&asset), PathBuf::from("/cache/model"));
    }

    #[tokio::test]
    async fn ensure_reuses_cached_file() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("weights.gguf");
        std::fs::write(&cached, b"weights").unwrap();

        // The URL is unreachable on purpose: a cached asset must not touch
        // the network.
        let store = AssetStore::with_retry(dir.path(), fast_retry());
        let asset = ModelAsset::new("weights", "http://127.0.0.1:1/weights.gguf");
        let path = store.ensure(&asset).await.unwrap();
        assert_eq!(path, cached);
    }

    #[tokio::test]
    async fn ensure_rejects_empty_cached_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("weights.gguf"), b"").unwrap();

        let store = AssetStore::with_retry(dir.path(), fast_retry());
        let asset = ModelAsset::new("weights", "http://127.0.0.1:1/weights.gguf");
        let err = store.ensure(&asset).await.unwrap_err();
        assert!(matches!(err, AssetError::Empty(_)));
    }

    #[tokio::test]
    async fn ensure_extracts_cached_archive() {
        let dir = tempfile::tempdir().unwrap();
        write_model_zip(dir.path(), "vosk-model-small-xx");

        let store = AssetStore::with_retry(dir.path(), fast_retry());
        let asset = ModelAsset::new(
            "vosk-model-small-xx",
            "http://127.0.0.1:1/vosk-model-small-xx.zip",
        );
        let path = store.ensure(&asset).await.unwrap();
        assert_eq!(path, dir.path().join("vosk-model-small-xx"));
        assert!(path.join("conf.json").is_file());
    }

    #[tokio::test]
    async fn ensure_skips_extraction_when_directory_present() {
        let dir = tempfile::tempdir().unwrap();
        write_model_zip(dir.path(), "model-a");
        std::fs::create_dir(dir.path().join("model-a")).unwrap();
        let marker = dir.path().join("model-a").join("marker");
        std::fs::write(&marker, b"keep").unwrap();

        let store = AssetStore::with_retry(dir.path(), fast_retry());
        let asset = ModelAsset::new("model-a", "http://127.0.0.1:1/model-a.zip");
        let path = store.ensure(&asset).await.unwrap();
        // Existing extraction untouched: the marker survives and the zip's
        // contents were not re-extracted over it.
        assert!(marker.is_file());
        assert!(!path.join("conf.json").exists());
    }

    #[tokio::test]
    async fn ensure_downloads_absent_asset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weights.gguf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake-weights".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::with_retry(dir.path(), fast_retry());
        let asset = ModelAsset::new("weights", format!("{}/weights.gguf", server.uri()));

        let path = store.ensure(&asset).await.unwrap();
        assert_eq!(path, dir.path().join("weights.gguf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"fake-weights");
    }

    #[tokio::test]
    async fn download_retries_transient_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weights.gguf"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/weights.gguf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake-weights".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::with_retry(dir.path(), fast_retry());
        let asset = ModelAsset::new("weights", format!("{}/weights.gguf", server.uri()));

        let path = store.ensure(&asset).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"fake-weights");
    }

    #[tokio::test]
    async fn download_gives_up_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weights.gguf"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::with_retry(dir.path(), fast_retry());
        let asset = ModelAsset::new("weights", format!("{}/weights.gguf", server.uri()));

        let err = store.ensure(&asset).await.unwrap_err();
        assert!(matches!(err, AssetError::Transfer(_)), "got {err}");
        // Nothing half-written left behind under the final name.
        assert!(!dir.path().join("weights.gguf").exists());
    }

    #[tokio::test]
    async fn corrupt_archive_reports_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model-b.zip"), b"this is not a zip").unwrap();

        let store = AssetStore::with_retry(dir.path(), fast_retry());
        let asset = ModelAsset::new("model-b", "http://127.0.0.1:1/model-b.zip");
        let err = store.ensure(&asset).await.unwrap_err();
        assert!(matches!(err, AssetError::Archive(_)), "got {err}");
    }
}
