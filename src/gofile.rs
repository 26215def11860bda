//! Gofile hosting API client.
//!
//! The hosting exchange is two calls: `GET /getServer` to discover the
//! upload target, then `POST https://<server>.<host>/uploadFile` with the
//! staged bytes as a multipart `file` part. Responses carry a JSON envelope
//! with a `status` field; a non-`ok` status is a service-level rejection,
//! not a transport failure.

use crate::config::Settings;
use crate::relay::RelayError;
use reqwest::multipart;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ServerResponse {
    data: ServerData,
}

#[derive(Debug, Deserialize)]
struct ServerData {
    server: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    status: String,
    #[serde(default)]
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadData {
    download_page: String,
}

/// Client for the two-call hosting API.
#[derive(Debug, Clone)]
pub struct GofileClient {
    http: reqwest::Client,
    api_base: String,
    upload_host: String,
    upload_base: Option<String>,
}

impl GofileClient {
    /// Build a client with bounded timeouts from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base: settings.hosting_api_base.trim_end_matches('/').to_string(),
            upload_host: settings.hosting_upload_host.clone(),
            upload_base: settings
                .hosting_upload_base
                .as_ref()
                .map(|b| b.trim_end_matches('/').to_string()),
        })
    }

    /// Query the server-discovery endpoint and return the upload target.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ServerSelection`] on network failure, a
    /// non-success HTTP status, or a malformed response body.
    pub async fn best_server(&self) -> Result<String, RelayError> {
        let url = format!("{}/getServer", self.api_base);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RelayError::ServerSelection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RelayError::ServerSelection(format!(
                "getServer returned HTTP {status}"
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| RelayError::ServerSelection(e.to_string()))?;
        let parsed: ServerResponse = serde_json::from_slice(&bytes)
            .map_err(|e| RelayError::ServerSelection(format!("malformed getServer body: {e}")))?;

        debug!(server = %parsed.data.server, "Selected upload server");
        Ok(parsed.data.server)
    }

    /// Upload endpoint for a discovered server.
    ///
    /// Follows the `https://<server>.<host>/uploadFile` scheme unless a flat
    /// upload base override is configured.
    #[must_use]
    pub fn upload_endpoint(&self, server: &str) -> String {
        match &self.upload_base {
            Some(base) => format!("{base}/uploadFile"),
            None => format!("https://{server}.{}/uploadFile", self.upload_host),
        }
    }

    /// Stream a staged file to the chosen server as multipart form data.
    ///
    /// Returns the public download-page URL on success.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Upload`] on transport failure or a non-success
    /// HTTP status, and [`RelayError::RemoteRejected`] when the service
    /// answers with a non-`ok` status field.
    pub async fn upload(
        &self,
        server: &str,
        path: &Path,
        filename: &str,
    ) -> Result<String, RelayError> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = multipart::Part::stream_with_length(body, len)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| RelayError::Upload(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let endpoint = self.upload_endpoint(server);
        debug!(endpoint = %endpoint, filename = %filename, size = len, "Uploading staged file");

        let resp = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::Upload(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Upload(format!(
                "uploadFile returned HTTP {status}: {body}"
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| RelayError::Upload(e.to_string()))?;
        let parsed: UploadResponse = serde_json::from_slice(&bytes)
            .map_err(|e| RelayError::Upload(format!("malformed uploadFile body: {e}")))?;

        interpret_upload_response(parsed)
    }
}

/// Map the upload envelope to a link or a rejection.
fn interpret_upload_response(resp: UploadResponse) -> Result<String, RelayError> {
    if resp.status == "ok" {
        resp.data
            .map(|d| d.download_page)
            .ok_or_else(|| RelayError::Upload("ok response without downloadPage".to_string()))
    } else {
        Err(RelayError::RemoteRejected(resp.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_upload_base(upload_base: Option<&str>) -> Settings {
        Settings {
            telegram_token: "dummy".to_string(),
            hosting_api_base: "https://api.gofile.io".to_string(),
            hosting_upload_host: "gofile.io".to_string(),
            hosting_upload_base: upload_base.map(String::from),
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
            upload_retries: 0,
        }
    }

    #[test]
    fn endpoint_follows_subdomain_scheme() -> Result<(), reqwest::Error> {
        let client = GofileClient::new(&settings_with_upload_base(None))?;
        assert_eq!(
            client.upload_endpoint("store1"),
            "https://store1.gofile.io/uploadFile"
        );
        Ok(())
    }

    #[test]
    fn endpoint_override_ignores_server() -> Result<(), reqwest::Error> {
        let client = GofileClient::new(&settings_with_upload_base(Some("http://127.0.0.1:1234/")))?;
        assert_eq!(
            client.upload_endpoint("store1"),
            "http://127.0.0.1:1234/uploadFile"
        );
        Ok(())
    }

    #[test]
    fn server_response_parses() -> Result<(), serde_json::Error> {
        let parsed: ServerResponse = serde_json::from_str(r#"{"data":{"server":"store1"}}"#)?;
        assert_eq!(parsed.data.server, "store1");
        Ok(())
    }

    #[test]
    fn ok_upload_response_yields_link() -> Result<(), serde_json::Error> {
        let parsed: UploadResponse = serde_json::from_str(
            r#"{"status":"ok","data":{"downloadPage":"https://x/y"}}"#,
        )?;
        let link = interpret_upload_response(parsed).expect("ok response must yield a link");
        assert_eq!(link, "https://x/y");
        Ok(())
    }

    #[test]
    fn error_status_is_a_remote_rejection() -> Result<(), serde_json::Error> {
        let parsed: UploadResponse = serde_json::from_str(r#"{"status":"error"}"#)?;
        match interpret_upload_response(parsed) {
            Err(RelayError::RemoteRejected(status)) => assert_eq!(status, "error"),
            other => panic!("expected RemoteRejected, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn ok_without_link_is_an_upload_error() -> Result<(), serde_json::Error> {
        let parsed: UploadResponse = serde_json::from_str(r#"{"status":"ok"}"#)?;
        assert!(matches!(
            interpret_upload_response(parsed),
            Err(RelayError::Upload(_))
        ));
        Ok(())
    }
}
