//! HTTP client for the Quantix solver backend — /parse, /solve, /feedback.

use quantix_core::types::{
    ClientConfig, FeedbackRequest, ParseResponse, ParsedProblem, ProblemInput, SolveResponse,
};
use serde::Deserialize;
use tracing::{debug, error};

/// Client for the solver backend. Cheap to clone; wraps a pooled
/// `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct SolverClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct FeedbackAck {
    status: String,
}

impl SolverClient {
    pub fn new(config: ClientConfig) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| format!("http client build failed: {e}"))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Submit an input for parsing. Multipart form: `input_type` plus a
    /// `text` field or a `file` part depending on the mode. A dictated
    /// transcript travels in the `text` field with `input_type=audio`.
    pub async fn parse(&self, input: &ProblemInput) -> Result<ParseResponse, String> {
        input.validate()?;

        let form = match input {
            ProblemInput::Text(text) | ProblemInput::Transcript(text) => {
                reqwest::multipart::Form::new()
                    .text("input_type", input.input_type())
                    .text("text", text.clone())
            }
            ProblemInput::Image { file_name, bytes } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(image_mime(file_name))
                    .map_err(|e| format!("mime error: {e}"))?;
                reqwest::multipart::Form::new()
                    .text("input_type", input.input_type())
                    .part("file", part)
            }
        };

        debug!("parse: POST /parse ({})", input.input_type());
        let resp = self
            .http
            .post(self.endpoint("parse"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("parse request failed: {e}"))?;

        read_json(resp, "parse").await
    }

    /// Solve a parsed problem. The body is the parsed problem object
    /// itself, exactly as `/parse` returned it.
    pub async fn solve(&self, problem: &ParsedProblem) -> Result<SolveResponse, String> {
        debug!("solve: POST /solve ({})", problem.topic);
        let resp = self
            .http
            .post(self.endpoint("solve"))
            .json(problem)
            .send()
            .await
            .map_err(|e| format!("solve request failed: {e}"))?;

        read_json(resp, "solve").await
    }

    /// Submit a rating for a solved problem. Success is the backend's
    /// `{"status": "stored"}` acknowledgement.
    pub async fn feedback(&self, request: &FeedbackRequest) -> Result<(), String> {
        debug!("feedback: POST /feedback ({})", request.feedback);
        let resp = self
            .http
            .post(self.endpoint("feedback"))
            .json(request)
            .send()
            .await
            .map_err(|e| format!("feedback request failed: {e}"))?;

        let ack: FeedbackAck = read_json(resp, "feedback").await?;
        if ack.status == "stored" {
            Ok(())
        } else {
            Err(format!("feedback not stored: {}", ack.status))
        }
    }
}

/// Fold a response into `Ok(T)` or an error carrying status and body.
async fn read_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    what: &str,
) -> Result<T, String> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| format!("{what} response read error: {e}"))?;
    if !status.is_success() {
        error!("{what} failed ({status}): {body}");
        return Err(format!("{what} failed ({status}): {body}"));
    }
    serde_json::from_str(&body).map_err(|e| format!("{what} returned invalid JSON: {e}; raw={body}"))
}

/// Best-effort MIME type from an image file name.
fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_cleanly() {
        let client = SolverClient::new(ClientConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.endpoint("parse"), "http://localhost:8000/parse");

        let client = SolverClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.endpoint("solve"), "http://localhost:8000/solve");
    }

    #[test]
    fn image_mime_by_extension() {
        assert_eq!(image_mime("problem.png"), "image/png");
        assert_eq!(image_mime("scan.JPG"), "image/jpeg");
        assert_eq!(image_mime("photo.jpeg"), "image/jpeg");
        assert_eq!(image_mime("anim.gif"), "image/gif");
        assert_eq!(image_mime("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn parse_rejects_empty_input_before_sending() {
        // Unroutable port: the validation error must fire first.
        let client = SolverClient::new(ClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        let err = client.parse(&ProblemInput::text("  ")).await.unwrap_err();
        assert_eq!(err, "enter a problem first");
    }
}
