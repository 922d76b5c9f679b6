use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use super::credentials::CredentialStore;
use super::error::GenerateError;
use super::wire::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GoogleSearch, ImageConfig, InlineData, Part, Tool,
};
use super::{GenerationRequest, GenerationResult, SourceLink};
use crate::config::Settings;
use crate::prompt;
use crate::state::data::{EncodedImage, RESULT_MIME_TYPE};

const TARGET_IMAGE_NOTE: &str = "Target Image: This is the image to be edited.";
const STYLE_REFERENCE_NOTE: &str = "Style Reference Image: Use the artistic style, color palette, and texture of this image as a reference for the transformation.";

/// Title used for citations that arrive without one
const UNTITLED_SOURCE: &str = "Source";

/// Client for the hosted image generation endpoint.
///
/// Each `generate` call issues exactly one request. There is no retry and no
/// client-side timeout.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: Client,
    settings: Settings,
    credentials: CredentialStore,
}

impl GenerationClient {
    pub fn new(settings: Settings, credentials: CredentialStore) -> Self {
        Self {
            http: Client::new(),
            settings,
            credentials,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    /// Send one generation request and normalize the response
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GenerateError> {
        let api_key = self
            .credentials
            .resolve()
            .ok_or(GenerateError::MissingCredential)?;

        let body = build_request_body(&request, &self.settings);
        let part_count = body.contents.first().map_or(0, |c| c.parts.len());
        info!(
            model = %self.settings.model,
            parts = part_count,
            has_reference = request.reference_image.is_some(),
            "sending generation request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "generation request failed");
                GenerateError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = endpoint_error(status.as_u16(), &text);
            error!(status = status.as_u16(), error = %err, "generation endpoint returned an error");
            return Err(err);
        }

        let result = parse_response(&text)?;
        info!(
            bytes = result.image.len(),
            sources = result.source_links.len(),
            "generation succeeded"
        );
        Ok(result)
    }
}

/// Assemble the request body: images first, then the composed text
pub(crate) fn build_request_body(
    request: &GenerationRequest,
    settings: &Settings,
) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(5);

    if let Some(image) = &request.primary_image {
        parts.push(inline_part(image));
        parts.push(Part::Text {
            text: TARGET_IMAGE_NOTE.to_string(),
        });
    }

    if let Some(image) = &request.reference_image {
        parts.push(inline_part(image));
        parts.push(Part::Text {
            text: STYLE_REFERENCE_NOTE.to_string(),
        });
    }

    parts.push(Part::Text {
        text: prompt::compose_final_text(
            &request.instruction,
            request.primary_image.is_some(),
            request.excluded_terms.as_deref(),
            settings.grounding,
        ),
    });

    let tools = if settings.grounding {
        vec![Tool {
            google_search: GoogleSearch::default(),
        }]
    } else {
        Vec::new()
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["TEXT", "IMAGE"],
            image_config: ImageConfig {
                aspect_ratio: settings.aspect_ratio,
                image_size: settings.image_size,
            },
        },
        tools,
    }
}

fn inline_part(image: &EncodedImage) -> Part {
    Part::Inline {
        inline_data: InlineData {
            mime_type: image.mime_type().to_string(),
            data: image.to_base64(),
        },
    }
}

/// Decode a successful response body into a `GenerationResult`.
///
/// The first inline image of the first candidate wins; any later inline
/// parts are ignored.
pub(crate) fn parse_response(body: &str) -> Result<GenerationResult, GenerateError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response.prompt_feedback.and_then(|f| f.block_reason);
        warn!(reason = ?reason, "response has no candidates");
        return Err(GenerateError::NoImage { reason });
    };

    let inline = candidate
        .content
        .into_iter()
        .flat_map(|content| content.parts)
        .find_map(|part| part.inline_data);

    let Some(inline) = inline else {
        warn!(finish_reason = ?candidate.finish_reason, "response has no inline image");
        return Err(GenerateError::NoImage {
            reason: candidate.finish_reason,
        });
    };

    let bytes = BASE64
        .decode(inline.data.as_bytes())
        .map_err(|e| GenerateError::MalformedResponse(format!("image payload: {e}")))?;
    debug!(returned_mime = %inline.mime_type, "decoded inline image");

    let source_links = candidate
        .grounding_metadata
        .map(|meta| meta.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let uri = web.uri.filter(|uri| !uri.is_empty())?;
            let title = web
                .title
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| UNTITLED_SOURCE.to_string());
            Some(SourceLink { title, uri })
        })
        .collect();

    Ok(GenerationResult {
        // Results are always presented as PNG, whatever the endpoint reports
        image: EncodedImage::new(bytes, RESULT_MIME_TYPE),
        source_links,
    })
}

/// Build an `Endpoint` error from a non-2xx response body
fn endpoint_error(status: u16, body: &str) -> GenerateError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => GenerateError::Endpoint {
            status: envelope.error.code.unwrap_or(status),
            code: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => GenerateError::Endpoint {
            status,
            code: None,
            message: if body.trim().is_empty() {
                format!("endpoint returned HTTP {status}")
            } else {
                body.trim().to_string()
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Requests seen by the fake endpoint: (api key header, body)
    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    /// Serve `reply` for every generateContent call on a local port
    async fn fake_endpoint(status: StatusCode, reply: Value) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route(
                "/v1beta/models/{model}",
                post(
                    move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let key = headers
                                .get("x-goog-api-key")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            seen.lock().unwrap().push((key, body));
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), seen)
    }

    fn client_for(base_url: &str, key: Option<&str>) -> GenerationClient {
        let settings = Settings {
            base_url: base_url.to_string(),
            ..Settings::default()
        };
        let credentials = CredentialStore::new(Vec::new());
        if let Some(key) = key {
            credentials.select(key);
        }
        GenerationClient::new(settings, credentials)
    }

    fn edit_request() -> GenerationRequest {
        GenerationRequest {
            instruction: "make it snow".into(),
            primary_image: Some(EncodedImage::new(vec![1u8, 2, 3], "image/jpeg")),
            reference_image: None,
            excluded_terms: None,
        }
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_network() {
        // Nothing listens here; a network attempt would be a transport error
        let client = client_for("http://127.0.0.1:9", None);
        let err = client.generate(edit_request()).await.unwrap_err();
        assert!(matches!(err, GenerateError::MissingCredential));
    }

    #[tokio::test]
    async fn test_first_inline_image_wins() {
        let reply = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here you go"},
                    {"inlineData": {"mimeType": "image/jpeg", "data": "AQID"}},
                    {"inlineData": {"mimeType": "image/png", "data": "BAUG"}}
                ]}
            }]
        });
        let (base, seen) = fake_endpoint(StatusCode::OK, reply).await;

        let result = client_for(&base, Some("test-key"))
            .generate(edit_request())
            .await
            .unwrap();

        assert_eq!(result.image.bytes(), &[1, 2, 3]);
        assert_eq!(result.image.mime_type(), "image/png");
        assert!(result.source_links.is_empty());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("test-key"));
    }

    #[tokio::test]
    async fn test_request_body_carries_images_and_text() {
        let reply = json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"data": "AQID"}}]}}]
        });
        let (base, seen) = fake_endpoint(StatusCode::OK, reply).await;

        let mut request = edit_request();
        request.reference_image = Some(EncodedImage::new(vec![9u8], "image/webp"));
        request.excluded_terms = Some("people".into());
        client_for(&base, Some("k")).generate(request).await.unwrap();

        let seen = seen.lock().unwrap();
        let body = &seen[0].1;
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0]["inlineData"]["mimeType"], json!("image/jpeg"));
        assert_eq!(parts[0]["inlineData"]["data"], json!("AQID"));
        assert_eq!(parts[1]["text"], json!(TARGET_IMAGE_NOTE));
        assert_eq!(parts[2]["inlineData"]["mimeType"], json!("image/webp"));
        assert_eq!(parts[3]["text"], json!(STYLE_REFERENCE_NOTE));

        let text = parts[4]["text"].as_str().unwrap();
        assert!(text.starts_with("Action: make it snow."));
        assert!(text.contains("EXCLUSIONS/NEGATIVE PROMPT"));
        assert!(text.contains("people"));

        assert_eq!(body["tools"], json!([{"googleSearch": {}}]));
        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], json!("1:1"));
    }

    #[tokio::test]
    async fn test_no_inline_image_is_an_error() {
        let reply = json!({
            "candidates": [{
                "content": {"parts": [{"text": "I can't do that."}]},
                "finishReason": "STOP"
            }]
        });
        let (base, _) = fake_endpoint(StatusCode::OK, reply).await;

        let err = client_for(&base, Some("k"))
            .generate(edit_request())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerateError::NoImage { .. }));
    }

    #[tokio::test]
    async fn test_not_found_asks_for_new_key() {
        let reply = json!({
            "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
        });
        let (base, _) = fake_endpoint(StatusCode::NOT_FOUND, reply).await;

        let err = client_for(&base, Some("k"))
            .generate(edit_request())
            .await
            .unwrap_err();

        assert!(err.requires_credential_reselect());
        assert_eq!(err.to_string(), "Requested entity was not found.");
    }

    #[test]
    fn test_links_keep_order_and_skip_empty_uri() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"data": "AQID"}}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://a.example", "title": "A"}},
                    {"web": {"title": "No uri"}},
                    {"web": {"uri": "", "title": "Empty"}},
                    {"retrievedContext": {}},
                    {"web": {"uri": "https://b.example"}},
                    {"web": {"uri": "https://a.example", "title": "A"}},
                    {"web": {"uri": " ", "title": " "}},
                    {"web": {"uri": "https://c.example", "title": ""}}
                ]}
            }]
        });

        let result = parse_response(&body.to_string()).unwrap();
        let links: Vec<(&str, &str)> = result
            .source_links
            .iter()
            .map(|l| (l.title.as_str(), l.uri.as_str()))
            .collect();

        assert_eq!(
            links,
            vec![
                ("A", "https://a.example"),
                ("Source", "https://b.example"),
                ("A", "https://a.example"),
                (" ", " "),
                ("Source", "https://c.example"),
            ]
        );
    }

    #[test]
    fn test_no_candidates_reports_block_reason() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        match parse_response(&body.to_string()) {
            Err(GenerateError::NoImage { reason }) => assert_eq!(reason.as_deref(), Some("SAFETY")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_base64_is_malformed() {
        let body = json!({"candidates": [{"content": {"parts": [{"inlineData": {"data": "@@"}}]}}]});
        assert!(matches!(
            parse_response(&body.to_string()),
            Err(GenerateError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_generate_prefix_without_image() {
        let request = GenerationRequest {
            instruction: "a red fox".into(),
            primary_image: None,
            reference_image: None,
            excluded_terms: None,
        };
        let settings = Settings {
            grounding: false,
            ..Settings::default()
        };

        let body = build_request_body(&request, &settings);
        assert!(body.tools.is_empty());
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"], json!([{"text": "Generate: a red fox."}]));
    }

    #[test]
    fn test_plain_text_error_body() {
        let err = endpoint_error(502, "Bad Gateway");
        assert!(matches!(err, GenerateError::Endpoint { status: 502, .. }));
        assert_eq!(err.to_string(), "Bad Gateway");
    }
}
