//! HTTP client for the bingo server API
//!
//! Blocking `reqwest` client. Mutating endpoints answer `{"success": true}` or
//! `{"error": "..."}`; the latter becomes `ApiError::Application` whatever the
//! status code.

use std::path::Path;
use std::time::Duration;

use image::ImageFormat;
use reqwest::blocking::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::constants::{
    CARDS_PATH, DRAW_NUMBER_PATH, SETTINGS_PATH, START_DRAWING_PATH, UPLOAD_PATH,
};
use crate::core::error::ApiError;
use crate::core::io_traits::{AdminApi, SettingsSource};
use crate::core::protocol::{Ack, Card, DrawResponse, NewCard, Settings, SettingsPatch, UploadResponse};

/// Multipart field carrying uploaded images
const UPLOAD_FIELD: &str = "file";

pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "[HTTP] GET");
        let response = self.client.get(self.url(path)).send().map_err(transport)?;
        let response = check_status(response)?;
        response.json::<T>().map_err(decode)
    }

    fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        debug!(path, "[HTTP] POST");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(transport)?;
        read_ack(response)
    }
}

impl SettingsSource for HttpApi {
    fn fetch_settings(&self) -> Result<Settings, ApiError> {
        self.get_json(SETTINGS_PATH)
    }
}

impl AdminApi for HttpApi {
    fn list_cards(&self) -> Result<Vec<Card>, ApiError> {
        self.get_json(CARDS_PATH)
    }

    fn create_card(&self, card: &NewCard) -> Result<(), ApiError> {
        self.post_json(CARDS_PATH, card)
    }

    fn delete_card(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("{}/{}", CARDS_PATH, id);
        debug!(path = %path, "[HTTP] DELETE");
        let response = self
            .client
            .delete(self.url(&path))
            .send()
            .map_err(transport)?;
        read_ack(response)
    }

    fn update_settings(&self, patch: &SettingsPatch) -> Result<(), ApiError> {
        self.post_json(SETTINGS_PATH, patch)
    }

    fn start_drawing(&self) -> Result<(), ApiError> {
        self.post_json(START_DRAWING_PATH, &serde_json::json!({}))
    }

    fn draw_number(&self) -> Result<DrawResponse, ApiError> {
        debug!(path = DRAW_NUMBER_PATH, "[HTTP] POST");
        let response = self
            .client
            .post(self.url(DRAW_NUMBER_PATH))
            .json(&serde_json::json!({}))
            .send()
            .map_err(transport)?;
        read_body::<DrawResponse>(response)
    }

    fn upload_image(&self, path: &Path) -> Result<String, ApiError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ApiError::Transport(format!("Could not read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime = ImageFormat::from_path(path)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(transport)?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        debug!(path = UPLOAD_PATH, file = %path.display(), "[HTTP] POST multipart");
        let response = self
            .client
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .map_err(transport)?;
        read_body::<UploadResponse>(response)?
            .into_result()
            .map_err(ApiError::Application)
    }
}

// =============================================================================
// RESPONSE HANDLING
// =============================================================================

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

fn decode(e: reqwest::Error) -> ApiError {
    ApiError::Decode(e.to_string())
}

/// Pass successful responses through; turn others into the server's message
/// or a bare status error
fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let code = status.as_u16();
    let body = response.text().unwrap_or_default();
    Err(error_from_body(code, &body))
}

fn error_from_body(code: u16, body: &str) -> ApiError {
    match serde_json::from_str::<Ack>(body) {
        Ok(Ack {
            error: Some(message),
            ..
        }) => ApiError::Application(message),
        _ => {
            warn!(status = code, "[HTTP] Request failed");
            ApiError::Status(code)
        }
    }
}

/// Decode a `{success}` / `{error}` acknowledgment
fn read_ack(response: Response) -> Result<(), ApiError> {
    let status = response.status();
    let body = response.text().map_err(transport)?;
    match serde_json::from_str::<Ack>(&body) {
        Ok(Ack {
            error: Some(message),
            ..
        }) => Err(ApiError::Application(message)),
        _ if !status.is_success() => Err(error_from_body(status.as_u16(), &body)),
        // Some endpoints answer with an empty or non-JSON body on success
        _ => Ok(()),
    }
}

/// Decode an endpoint whose body carries its own `error` field, even on
/// non-success statuses
fn read_body<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().map_err(transport)?;
    match serde_json::from_str::<T>(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(error_from_body(status.as_u16(), &body)),
        Err(e) => Err(ApiError::Decode(e.to_string())),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// A request seen by the stub server
    #[derive(Debug)]
    struct Recorded {
        method: String,
        path: String,
        headers: Vec<String>,
        body: String,
    }

    /// Serve one canned response per connection, in order
    fn stub(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Recorded>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for (status, body) in responses {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let path = parts.next().unwrap_or_default().to_string();

                let mut headers = Vec::new();
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    let line = line.trim_end().to_string();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap();
                        }
                    }
                    headers.push(line.to_ascii_lowercase());
                }
                let mut body_bytes = vec![0u8; content_length];
                reader.read_exact(&mut body_bytes).unwrap();

                recorded.push(Recorded {
                    method,
                    path,
                    headers,
                    body: String::from_utf8_lossy(&body_bytes).into_owned(),
                });

                let mut stream = stream;
                write!(
                    stream,
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
                .unwrap();
                stream.flush().unwrap();
            }
            recorded
        });

        (url, handle)
    }

    fn api(url: &str) -> HttpApi {
        HttpApi::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_fetch_settings() {
        let (url, server) = stub(vec![(
            200,
            r#"{"countdown_time":null,"is_drawing":true,"drawn_numbers":[5,12]}"#,
        )]);
        let settings = api(&url).fetch_settings().unwrap();
        assert!(settings.is_drawing);
        assert_eq!(settings.drawn_numbers, vec![5, 12]);

        let requests = server.join().unwrap();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/api/settings");
    }

    #[test]
    fn test_create_card_posts_json() {
        let (url, server) = stub(vec![(200, r#"{"success":true}"#)]);
        let card = NewCard {
            card_id: "0001".to_string(),
            name: "Ana".to_string(),
            numbers: (1..=24).collect(),
        };
        api(&url).create_card(&card).unwrap();

        let requests = server.join().unwrap();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/api/cards");
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body["card_id"], "0001");
        assert_eq!(body["numbers"].as_array().unwrap().len(), 24);
    }

    #[test]
    fn test_error_body_is_application_error() {
        let (url, server) = stub(vec![
            (400, r#"{"error":"Card ID already exists"}"#),
            (200, r#"{"error":"Nothing to update"}"#),
        ]);
        let api = api(&url);
        let card = NewCard {
            card_id: "0001".to_string(),
            name: "Ana".to_string(),
            numbers: vec![],
        };
        assert_eq!(
            api.create_card(&card),
            Err(ApiError::Application("Card ID already exists".to_string()))
        );
        assert_eq!(
            api.update_settings(&SettingsPatch::default()),
            Err(ApiError::Application("Nothing to update".to_string()))
        );
        server.join().unwrap();
    }

    #[test]
    fn test_status_without_message() {
        let (url, server) = stub(vec![(500, "<h1>oops</h1>")]);
        assert_eq!(api(&url).start_drawing(), Err(ApiError::Status(500)));
        assert_eq!(server.join().unwrap()[0].path, "/api/start_drawing");
    }

    #[test]
    fn test_delete_card_path() {
        let (url, server) = stub(vec![(200, r#"{"success":true}"#)]);
        api(&url).delete_card(42).unwrap();
        let requests = server.join().unwrap();
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/api/cards/42");
    }

    #[test]
    fn test_draw_number_error_is_a_response() {
        let (url, server) = stub(vec![
            (400, r#"{"error":"Drawing has not started"}"#),
            (200, r#"{"number":33,"hasWinner":false}"#),
        ]);
        let api = api(&url);

        let refused = api.draw_number().unwrap();
        assert_eq!(refused.error.as_deref(), Some("Drawing has not started"));

        let drawn = api.draw_number().unwrap();
        assert_eq!(drawn.number, Some(33));
        assert!(!drawn.has_winner);
        server.join().unwrap();
    }

    #[test]
    fn test_upload_image_multipart() {
        let (url, server) = stub(vec![(200, r#"{"filename":"logo_1.png"}"#)]);
        let mut file = tempfile::Builder::new()
            .prefix("logo")
            .suffix(".png")
            .tempfile()
            .unwrap();
        file.write_all(b"\x89PNG\r\n\x1a\n").unwrap();

        let filename = api(&url).upload_image(file.path()).unwrap();
        assert_eq!(filename, "logo_1.png");

        let requests = server.join().unwrap();
        assert_eq!(requests[0].path, "/api/upload");
        assert!(requests[0]
            .headers
            .iter()
            .any(|h| h.starts_with("content-type: multipart/form-data")));
        assert!(requests[0].body.contains("name=\"file\""));
        assert!(requests[0]
            .body
            .to_ascii_lowercase()
            .contains("content-type: image/png"));
    }

    #[test]
    fn test_upload_error() {
        let (url, server) = stub(vec![(400, r#"{"error":"Invalid file type"}"#)]);
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"png").unwrap();
        assert_eq!(
            api(&url).upload_image(file.path()),
            Err(ApiError::Application("Invalid file type".to_string()))
        );
        server.join().unwrap();
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let result = api(&format!("http://127.0.0.1:{}", port)).fetch_settings();
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
