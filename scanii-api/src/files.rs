//! Files API: synchronous and asynchronous processing, remote fetch and
//! result retrieval.
//!
//! Every operation here issues exactly one HTTP request and decodes exactly
//! one response. Nothing is retried or cached.

use log::debug;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::ScaniiError;
use crate::client::ScaniiClient;
use crate::decode::{expect_status, read_entity};
use crate::models::{PendingResult, ScanResult};

/// Name of the multipart part carrying the content.
const FILE_FIELD: &str = "file";

/// Optional parameters of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// URL notified with the result once processing completes
    pub callback: Option<String>,
    /// Arbitrary key/value pairs echoed back on the result
    pub metadata: HashMap<String, String>,
}

impl SubmitOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_metadata_map(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    fn metadata_fields(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.metadata.iter().map(|(key, value)| {
            debug!("metadata item {key}={value}");
            (format!("metadata[{key}]"), value.clone())
        })
    }

    /// Reject metadata keys that cannot be written into a multipart
    /// `Content-Disposition` name.
    fn validate_multipart(&self) -> Result<(), ScaniiError> {
        if let Some(key) = self
            .metadata
            .keys()
            .find(|key| key.contains(['"', '\r', '\n']))
        {
            return Err(ScaniiError::InvalidArgument(format!(
                "metadata key {key:?} must not contain quotes or line breaks"
            )));
        }
        Ok(())
    }

    /// Multipart text fields: `metadata[<key>]` entries, then `callback`.
    fn multipart_fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self.metadata_fields().collect();
        if let Some(callback) = &self.callback {
            fields.push(("callback".to_string(), callback.clone()));
        }
        fields
    }

    /// Form fields for a fetch: `location`, `callback`, then metadata.
    fn fetch_fields(&self, location: &str) -> Vec<(String, String)> {
        let mut fields = vec![("location".to_string(), location.to_string())];
        if let Some(callback) = &self.callback {
            fields.push(("callback".to_string(), callback.clone()));
        }
        fields.extend(self.metadata_fields());
        fields
    }
}

/// Content to submit for processing.
pub enum ScanSource<'a> {
    /// A local file, opened and closed within the call
    Path(PathBuf),
    /// Content already in memory
    Bytes {
        data: Vec<u8>,
        file_name: Option<String>,
    },
    /// A caller owned stream, read to the end but never closed
    Reader(&'a mut (dyn AsyncRead + Unpin + Send)),
}

impl<'a> ScanSource<'a> {
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ScanSource::Path(path.into())
    }

    #[must_use]
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        ScanSource::Bytes {
            data: data.into(),
            file_name: None,
        }
    }

    #[must_use]
    pub fn reader<R: AsyncRead + Unpin + Send>(reader: &'a mut R) -> Self {
        ScanSource::Reader(reader)
    }

    /// Open the content, returning its file name and payload.
    ///
    /// Paths are streamed from disk; readers are drained into memory.
    async fn open(self) -> Result<(String, Payload), ScaniiError> {
        match self {
            ScanSource::Path(path) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| FILE_FIELD.to_string());

                // the handle moves into the request body and is dropped with it
                let file = tokio::fs::File::open(&path).await?;
                let length = file.metadata().await?.len();
                Ok((file_name, Payload::File { file, length }))
            }
            ScanSource::Bytes { data, file_name } => Ok((
                file_name.unwrap_or_else(|| FILE_FIELD.to_string()),
                Payload::Bytes(data),
            )),
            ScanSource::Reader(reader) => {
                let mut data = Vec::new();
                reader.read_to_end(&mut data).await?;
                Ok((FILE_FIELD.to_string(), Payload::Bytes(data)))
            }
        }
    }
}

#[derive(Debug)]
enum Payload {
    Bytes(Vec<u8>),
    File { file: tokio::fs::File, length: u64 },
}

impl From<PathBuf> for ScanSource<'_> {
    fn from(path: PathBuf) -> Self {
        ScanSource::Path(path)
    }
}

impl From<&Path> for ScanSource<'_> {
    fn from(path: &Path) -> Self {
        ScanSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ScanSource<'_> {
    fn from(data: Vec<u8>) -> Self {
        ScanSource::bytes(data)
    }
}

impl std::fmt::Debug for ScanSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ScanSource::Bytes { data, file_name } => f
                .debug_struct("Bytes")
                .field("len", &data.len())
                .field("file_name", file_name)
                .finish(),
            ScanSource::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

fn require_non_empty(value: &str, what: &str) -> Result<(), ScaniiError> {
    if value.is_empty() {
        return Err(ScaniiError::InvalidArgument(format!("{what} cannot be empty")));
    }
    Ok(())
}

impl ScaniiClient {
    async fn submit(
        &self,
        endpoint: &str,
        source: ScanSource<'_>,
        options: &SubmitOptions,
    ) -> Result<reqwest::Response, ScaniiError> {
        options.validate_multipart()?;

        let fields = options.multipart_fields();
        match source.open().await? {
            (file_name, Payload::Bytes(data)) => {
                self.upload_file_multipart(endpoint, fields, FILE_FIELD, &file_name, data)
                    .await
            }
            (file_name, Payload::File { file, length }) => {
                self.upload_stream_multipart(
                    endpoint,
                    fields,
                    FILE_FIELD,
                    &file_name,
                    file,
                    length,
                )
                .await
            }
        }
    }

    /// Submit content for synchronous processing (`POST /files`).
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Service`] unless the service answers `201 Created`,
    /// [`ScaniiError::Io`] if the source cannot be read,
    /// [`ScaniiError::InvalidArgument`] for a metadata key containing quotes or
    /// line breaks, and [`ScaniiError::Decode`] for a body without an `id`.
    pub async fn process(
        &self,
        source: ScanSource<'_>,
        options: &SubmitOptions,
    ) -> Result<ScanResult, ScaniiError> {
        let response = self.submit("/files", source, options).await?;
        let response = expect_status(response, StatusCode::CREATED, "process").await?;
        Ok(read_entity(response).await?.into_scan_result())
    }

    /// Submit a local file for synchronous processing.
    ///
    /// # Errors
    ///
    /// See [`ScaniiClient::process`].
    pub async fn process_file(
        &self,
        path: impl AsRef<Path>,
        options: &SubmitOptions,
    ) -> Result<ScanResult, ScaniiError> {
        self.process(ScanSource::from(path.as_ref()), options).await
    }

    /// Submit content for asynchronous processing (`POST /files/async`).
    ///
    /// The returned [`PendingResult`] carries the id to pass to
    /// [`ScaniiClient::retrieve`].
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Service`] unless the service answers `202 Accepted`.
    pub async fn process_async(
        &self,
        source: ScanSource<'_>,
        options: &SubmitOptions,
    ) -> Result<PendingResult, ScaniiError> {
        let response = self.submit("/files/async", source, options).await?;
        let response = expect_status(response, StatusCode::ACCEPTED, "process_async").await?;
        Ok(read_entity(response).await?.into_pending_result())
    }

    /// Submit a local file for asynchronous processing.
    ///
    /// # Errors
    ///
    /// See [`ScaniiClient::process_async`].
    pub async fn process_async_file(
        &self,
        path: impl AsRef<Path>,
        options: &SubmitOptions,
    ) -> Result<PendingResult, ScaniiError> {
        self.process_async(ScanSource::from(path.as_ref()), options).await
    }

    /// Ask the service to download and process remote content
    /// (`POST /files/fetch`).
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::InvalidArgument`] for an empty location, without
    /// contacting the service, and [`ScaniiError::Service`] unless the service
    /// answers `202 Accepted`.
    pub async fn fetch(
        &self,
        location: &str,
        options: &SubmitOptions,
    ) -> Result<PendingResult, ScaniiError> {
        require_non_empty(location, "location")?;

        let response = self
            .post_form("/files/fetch", &options.fetch_fields(location))
            .await?;
        let response = expect_status(response, StatusCode::ACCEPTED, "fetch").await?;
        Ok(read_entity(response).await?.into_pending_result())
    }

    /// Retrieve the result of previously processed content (`GET /files/{id}`).
    ///
    /// While an async submission is still processing the service answers 404,
    /// surfaced as a [`ScaniiError::Service`] error.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Service`] unless the service answers `200 OK`.
    pub async fn retrieve(&self, id: &str) -> Result<ScanResult, ScaniiError> {
        require_non_empty(id, "id")?;

        let response = self.get(&format!("/files/{id}")).await?;
        let response = expect_status(response, StatusCode::OK, "retrieve").await?;
        Ok(read_entity(response).await?.into_scan_result())
    }

    /// Ping the service with this client's credentials (`GET /ping`).
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Service`] unless the service answers `200 OK`.
    pub async fn ping(&self) -> Result<bool, ScaniiError> {
        let response = self.get("/ping").await?;
        expect_status(response, StatusCode::OK, "ping").await?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_multipart_fields() {
        let options = SubmitOptions::new()
            .with_callback("https://example.com/hook")
            .with_metadata("hello", "world");

        let fields = options.multipart_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], ("metadata[hello]".to_string(), "world".to_string()));
        assert_eq!(
            fields[1],
            ("callback".to_string(), "https://example.com/hook".to_string())
        );
    }

    #[test]
    fn test_empty_options_have_no_fields() {
        assert!(SubmitOptions::new().multipart_fields().is_empty());
        assert_eq!(
            SubmitOptions::new().fetch_fields("https://example.com/a.zip"),
            vec![("location".to_string(), "https://example.com/a.zip".to_string())]
        );
    }

    #[test]
    fn test_fetch_fields_order() {
        let options = SubmitOptions::new()
            .with_metadata("a", "1")
            .with_callback("https://example.com/hook");

        let fields = options.fetch_fields("https://example.com/a.zip");
        assert_eq!(fields[0].0, "location");
        assert_eq!(fields[1].0, "callback");
        assert_eq!(fields[2], ("metadata[a]".to_string(), "1".to_string()));
    }

    #[test]
    fn test_metadata_map_merges() {
        let mut extra = HashMap::new();
        extra.insert("b".to_string(), "2".to_string());

        let options = SubmitOptions::new()
            .with_metadata("a", "1")
            .with_metadata_map(extra);
        assert_eq!(options.metadata.len(), 2);
    }

    #[test]
    fn test_metadata_keys_must_fit_in_part_name() {
        assert!(SubmitOptions::new()
            .with_metadata("hello[1]", "line\r\nbreaks are fine in values")
            .validate_multipart()
            .is_ok());

        for key in ["a\"b", "a\r\nX-Injected: 1", "a\nb"] {
            let err = SubmitOptions::new()
                .with_metadata(key, "v")
                .validate_multipart()
                .unwrap_err();
            assert!(matches!(err, ScaniiError::InvalidArgument(_)));
        }
    }

    #[tokio::test]
    async fn test_open_path_streams_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".txt")
            .tempfile()
            .expect("temp file");
        file.write_all(b"hello").expect("write temp file");

        let (name, payload) = ScanSource::from(file.path())
            .open()
            .await
            .expect("file opens");
        assert!(name.ends_with(".txt"));
        assert!(matches!(payload, Payload::File { length: 5, .. }));
    }

    #[tokio::test]
    async fn test_open_missing_path_is_io_error() {
        let err = ScanSource::path("/definitely/not/here.bin")
            .open()
            .await
            .unwrap_err();
        assert!(matches!(err, ScaniiError::Io(_)));
    }

    #[tokio::test]
    async fn test_open_reader_leaves_stream_usable() {
        let mut reader: &[u8] = b"stream content";
        let (name, payload) = ScanSource::reader(&mut reader)
            .open()
            .await
            .expect("reader opens");
        assert_eq!(name, "file");
        match payload {
            Payload::Bytes(data) => assert_eq!(data, b"stream content"),
            other => panic!("expected bytes, got {other:?}"),
        }
        // still owned and usable by the caller
        assert!(reader.is_empty());
    }

    #[tokio::test]
    async fn test_open_bytes() {
        let (name, payload) = ScanSource::bytes("abc").open().await.expect("bytes open");
        assert_eq!(name, "file");
        assert!(matches!(payload, Payload::Bytes(ref data) if data == b"abc"));
    }
}
