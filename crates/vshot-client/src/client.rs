//! Screenshot service HTTP client.

use std::path::{Path, PathBuf};

use futures_util::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use vshot_models::{Job, JobId, JobRequest, StatusResponse, UploadResponse};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, PollError, SubmitError};

const UPLOAD_PATH: &str = "/api/upload";
const STATUS_PATH: &str = "/api/status";
const DOWNLOAD_PATH: &str = "/download";

/// Client for the screenshot extraction service.
#[derive(Debug, Clone)]
pub struct ScreenshotClient {
    http: Client,
    config: ClientConfig,
}

impl ScreenshotClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "server URL must start with http:// or https://, got {}",
                config.base_url
            )));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upload a video and start a job.
    ///
    /// Makes exactly one request. The returned job is in `uploading` state.
    pub async fn submit(&self, request: &JobRequest) -> Result<Job, SubmitError> {
        let video = request.file.as_ref().ok_or_else(|| {
            SubmitError::File(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no video file selected",
            ))
        })?;

        let file = tokio::fs::File::open(&video.path).await?;
        let part = Part::stream_with_length(file, video.size).file_name(video.name.clone());
        let form = Form::new()
            .part("video", part)
            .text("interval", request.interval_field());

        let url = format!("{}{}", self.config.normalized_base_url(), UPLOAD_PATH);
        debug!("Uploading {} ({} bytes) to {}", video.name, video.size, url);

        let response = self
            .http
            .post(&url)
            .timeout(self.config.upload_timeout)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let upload: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            SubmitError::NetworkFailure(format!("upload returned {} with unreadable body: {}", status, e))
        })?;

        if !upload.success {
            warn!("Upload rejected: {:?}", upload.message);
            return Err(SubmitError::rejected(upload.message));
        }

        match upload.process_id {
            Some(id) if !id.is_empty() => {
                info!(job_id = %id, "Upload accepted");
                Ok(Job::new(id))
            }
            _ => Err(SubmitError::NetworkFailure(
                "upload succeeded without a process_id".to_string(),
            )),
        }
    }

    /// Query the status of a job once.
    ///
    /// A status body is honoured whatever the HTTP code, so a server that
    /// reports `"error"` with a 500 still ends the job. The HTTP code only
    /// matters when the body is not a status.
    pub async fn status(&self, job_id: &JobId) -> Result<StatusResponse, PollError> {
        let url = format!(
            "{}{}/{}",
            self.config.normalized_base_url(),
            STATUS_PATH,
            job_id
        );

        let response = self.http.get(&url).send().await?;
        let code = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<StatusResponse>(&body) {
            Ok(status) => {
                if !code.is_success() {
                    debug!(
                        job_id = %job_id,
                        http_status = code.as_u16(),
                        status = %status.status,
                        "Status reported with an error code"
                    );
                }
                Ok(status)
            }
            Err(_) if !code.is_success() => Err(PollError::HttpStatus(code.as_u16())),
            Err(e) => Err(PollError::InvalidResponse(e.to_string())),
        }
    }

    /// Link to a finished archive.
    pub fn download_url(&self, archive_ref: &str) -> String {
        format!(
            "{}{}/{}",
            self.config.normalized_base_url(),
            DOWNLOAD_PATH,
            archive_ref
        )
    }

    /// Stream a finished archive into `dest_dir`, returning the written path.
    pub async fn download(&self, archive_ref: &str, dest_dir: &Path) -> ClientResult<PathBuf> {
        let file_name = Path::new(archive_ref)
            .file_name()
            .ok_or_else(|| ClientError::RequestFailed(format!("invalid archive name: {:?}", archive_ref)))?;
        let dest = dest_dir.join(file_name);

        let response = self.http.get(self.download_url(archive_ref)).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::RequestFailed(format!(
                "download returned {}: {}",
                status, body
            )));
        }

        let chunks = response.bytes_stream().map(|chunk| chunk.map_err(ClientError::from));
        let written = save_chunks(chunks, &dest).await?;

        info!("Downloaded {} ({} bytes) to {}", archive_ref, written, dest.display());
        Ok(dest)
    }
}

/// Write `chunks` to `dest`. A failed stream leaves no file behind.
async fn save_chunks<S, B>(chunks: S, dest: &Path) -> ClientResult<u64>
where
    S: Stream<Item = ClientResult<B>>,
    B: AsRef<[u8]>,
{
    let result = write_chunks(chunks, dest).await;
    if let Err(e) = &result {
        warn!("Download to {} failed, removing partial file: {}", dest.display(), e);
        if let Err(remove_err) = tokio::fs::remove_file(dest).await {
            debug!("Could not remove {}: {}", dest.display(), remove_err);
        }
    }
    result
}

async fn write_chunks<S, B>(chunks: S, dest: &Path) -> ClientResult<u64>
where
    S: Stream<Item = ClientResult<B>>,
    B: AsRef<[u8]>,
{
    tokio::pin!(chunks);
    let mut file = tokio::fs::File::create(dest).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        file.write_all(chunk.as_ref()).await?;
        written += chunk.as_ref().len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
