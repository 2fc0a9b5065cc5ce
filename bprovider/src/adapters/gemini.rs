//! Gemini provider over the `generativelanguage` streaming REST API.
//!
//! The provider half resolves credentials and shapes requests; the
//! transport half owns HTTP and SSE parsing. Fragments are yielded as each
//! server-sent event is parsed, never collected first.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    BoxedFragmentStream, ModelProvider, ProviderError, ProviderFuture, ProviderId, Role,
    SecureCredentialManager, StreamRequest,
};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_TEMPERATURE: f32 = 0.7;

impl SecureCredentialManager {
    pub fn set_gemini_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        if !api_key.starts_with("AIza") {
            return Err(ProviderError::authentication(
                "Gemini API key must start with 'AIza'",
            ));
        }

        self.set_api_key(ProviderId::Gemini, api_key)
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn GeminiTransport>,
    model: String,
    temperature: f32,
}

impl GeminiProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn GeminiTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn default_http_transport(client: Client) -> GeminiHttpTransport {
        GeminiHttpTransport::new(client)
    }

    fn build_request(&self, request: StreamRequest) -> GeminiRequest {
        let mut contents = request
            .history
            .into_iter()
            .filter(|message| !message.text.trim().is_empty())
            .map(|message| GeminiContent {
                role: wire_role(message.role).to_string(),
                parts: vec![GeminiPart { text: message.text }],
            })
            .collect::<Vec<_>>();

        contents.push(GeminiContent {
            role: wire_role(Role::User).to_string(),
            parts: vec![GeminiPart {
                text: request.user_text,
            }],
        });

        GeminiRequest {
            model: self.model.clone(),
            contents,
            system_instruction: GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: request.persona,
                }],
            },
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

impl ModelProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn stream<'a>(
        &'a self,
        request: StreamRequest,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let auth = GeminiAuth::ApiKey(resolve_gemini_api_key(&self.credentials)?);
            let turns = request.history.len();
            let gemini_request = self.build_request(request);

            tracing::debug!(model = %gemini_request.model, turns, "dispatching gemini stream request");
            self.transport.stream_content(gemini_request, auth).await
        })
    }
}

/// Local role vocabulary to Gemini's. Exhaustive on purpose: adding a third
/// role must not compile until it is mapped here.
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

fn resolve_gemini_api_key(credentials: &SecureCredentialManager) -> Result<String, ProviderError> {
    credentials
        .with_api_key(ProviderId::Gemini, |value| value.to_string())?
        .ok_or_else(|| ProviderError::authentication("no Gemini credentials configured"))
}

pub trait GeminiTransport: Send + Sync + std::fmt::Debug {
    fn stream_content<'a>(
        &'a self,
        request: GeminiRequest,
        auth: GeminiAuth,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>>;
}

#[derive(Clone, PartialEq, Eq)]
pub enum GeminiAuth {
    ApiKey(String),
}

impl std::fmt::Debug for GeminiAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("GeminiAuth::ApiKey([REDACTED])"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Travels in the request URL, not the JSON body.
    #[serde(skip)]
    pub model: String,
    pub contents: Vec<GeminiContent>,
    pub system_instruction: GeminiSystemInstruction,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeminiContent {
    pub role: String,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeminiPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeminiSystemInstruction {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeminiGenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct GeminiHttpTransport {
    client: Client,
    base_url: String,
}

impl GeminiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str, auth: &GeminiAuth) -> String {
        let GeminiAuth::ApiKey(api_key) = auth;
        format!(
            "{}/{model}:streamGenerateContent?alt=sse&key={api_key}",
            self.base_url.trim_end_matches('/')
        )
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Gemini request failed with status {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        }
    }
}

impl GeminiTransport for GeminiHttpTransport {
    fn stream_content<'a>(
        &'a self,
        request: GeminiRequest,
        auth: GeminiAuth,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            let url = self.endpoint(&request.model, &auth);
            let response = self
                .client
                .post(url)
                .json(&request)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.to_string())
                    } else {
                        ProviderError::transport(err.to_string())
                    }
                })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut sse_buffer = String::new();

                while let Some(item) = chunks.next().await {
                    let bytes =
                        item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|err| ProviderError::transport(err.to_string()))?;
                    sse_buffer.push_str(text);

                    while let Some(newline_index) = sse_buffer.find('\n') {
                        let line = sse_buffer.drain(..=newline_index).collect::<String>();
                        let line = line.trim();

                        if !line.starts_with("data:") {
                            continue;
                        }

                        let payload = line.trim_start_matches("data:").trim();
                        if payload.is_empty() {
                            continue;
                        }

                        let parsed: GeminiStreamChunk = serde_json::from_str(payload)
                            .map_err(|err| ProviderError::transport(err.to_string()))?;

                        for fragment in parsed.into_fragments() {
                            yield fragment;
                        }
                    }
                }
            };

            Ok(Box::pin(stream) as BoxedFragmentStream<'a>)
        })
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<GeminiErrorEnvelope>(body).ok()?;
    let status = parsed.error.status.unwrap_or_default();
    let message = parsed.error.message?;

    if status.is_empty() {
        Some(message)
    } else {
        Some(format!("{status}: {message}"))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiStreamChunk {
    candidates: Option<Vec<GeminiCandidate>>,
}

impl GeminiStreamChunk {
    fn into_fragments(self) -> Vec<String> {
        self.candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .filter(|text| !text.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    use super::*;
    use crate::{ProviderErrorKind, TurnMessage, VecFragmentStream};

    #[derive(Debug, Default)]
    struct FakeTransport {
        captured_request: Mutex<Option<GeminiRequest>>,
        captured_auth: Mutex<Option<GeminiAuth>>,
    }

    impl GeminiTransport for FakeTransport {
        fn stream_content<'a>(
            &'a self,
            request: GeminiRequest,
            auth: GeminiAuth,
        ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>> {
            Box::pin(async move {
                *self.captured_request.lock().expect("request lock") = Some(request);
                *self.captured_auth.lock().expect("auth lock") = Some(auth);

                let stream = VecFragmentStream::new(vec![
                    Ok("hi".to_string()),
                    Ok(" there".to_string()),
                ]);
                Ok(Box::pin(stream) as BoxedFragmentStream<'a>)
            })
        }
    }

    fn provider_with(transport: Arc<FakeTransport>) -> GeminiProvider {
        let credentials = Arc::new(SecureCredentialManager::new());
        credentials
            .set_gemini_api_key("AIzaTestKey123")
            .expect("key should set");
        GeminiProvider::new(credentials, transport)
    }

    #[test]
    fn stream_builds_request_with_persona_as_system_instruction() {
        let transport = Arc::new(FakeTransport::default());
        let provider = provider_with(transport.clone());
        let request = StreamRequest::new(
            "Be terse.",
            vec![
                TurnMessage::new(Role::User, "earlier question"),
                TurnMessage::new(Role::Model, "earlier answer"),
            ],
            "hi",
        );

        let _ = block_on(provider.stream(request)).expect("stream should build");

        let captured = transport
            .captured_request
            .lock()
            .expect("request lock")
            .clone()
            .expect("request should be captured");

        assert_eq!(captured.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(captured.system_instruction.parts[0].text, "Be terse.");
        assert_eq!(captured.generation_config.temperature, 0.7);
        assert_eq!(captured.contents.len(), 3);
        assert_eq!(captured.contents[0].role, "user");
        assert_eq!(captured.contents[1].role, "model");
        assert_eq!(captured.contents[2].role, "user");
        assert_eq!(captured.contents[2].parts[0].text, "hi");

        let auth = transport
            .captured_auth
            .lock()
            .expect("auth lock")
            .clone()
            .expect("auth should be captured");
        assert_eq!(auth, GeminiAuth::ApiKey("AIzaTestKey123".to_string()));
    }

    #[test]
    fn stream_drops_blank_history_entries() {
        let transport = Arc::new(FakeTransport::default());
        let provider = provider_with(transport.clone());
        let request = StreamRequest::new(
            "Be terse.",
            vec![
                TurnMessage::new(Role::User, "a real turn"),
                TurnMessage::new(Role::Model, ""),
                TurnMessage::new(Role::User, "   "),
            ],
            "hi",
        );

        let _ = block_on(provider.stream(request)).expect("stream should build");

        let captured = transport
            .captured_request
            .lock()
            .expect("request lock")
            .clone()
            .expect("request should be captured");

        // one surviving history entry plus the new user message
        assert_eq!(captured.contents.len(), 2);
        assert_eq!(captured.contents[0].parts[0].text, "a real turn");
    }

    #[test]
    fn missing_credentials_return_auth_error() {
        let credentials = Arc::new(SecureCredentialManager::new());
        let transport = Arc::new(FakeTransport::default());
        let provider = GeminiProvider::new(credentials, transport);
        let request = StreamRequest::new("Be terse.", Vec::new(), "hi");

        let error = block_on(provider.stream(request)).expect_err("missing creds should fail");
        assert_eq!(error.kind, ProviderErrorKind::Authentication);
        assert_eq!(error.message, "no Gemini credentials configured");
    }

    #[test]
    fn gemini_key_prefix_is_enforced() {
        let credentials = SecureCredentialManager::new();
        let error = credentials
            .set_gemini_api_key("sk-wrong-ecosystem")
            .expect_err("prefix must be checked");
        assert_eq!(error.kind, ProviderErrorKind::Authentication);
    }

    #[test]
    fn request_serializes_with_camel_case_and_no_model_field() {
        let request = GeminiRequest {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: "hi".to_string(),
                }],
            }],
            system_instruction: GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: "Be terse.".to_string(),
                }],
            },
            generation_config: GeminiGenerationConfig { temperature: 0.7 },
        };

        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("model").is_none());
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "Be terse."
        );
        let temperature = json["generationConfig"]["temperature"]
            .as_f64()
            .expect("temperature should serialize as a number");
        assert_eq!(temperature, f64::from(0.7_f32));
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[test]
    fn stream_chunks_flatten_to_text_fragments() {
        let payload = r#"{"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;
        let chunk: GeminiStreamChunk = serde_json::from_str(payload).expect("parse");
        assert_eq!(chunk.into_fragments(), vec!["Hel", "lo"]);

        let empty = r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#;
        let chunk: GeminiStreamChunk = serde_json::from_str(empty).expect("parse");
        assert!(chunk.into_fragments().is_empty());

        let no_candidates = r#"{}"#;
        let chunk: GeminiStreamChunk = serde_json::from_str(no_candidates).expect("parse");
        assert!(chunk.into_fragments().is_empty());
    }

    fn block_on<F: Future>(future: F) -> F::Output {
        let mut future = std::pin::pin!(future);
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        loop {
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(value) => return value,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    fn noop_waker() -> Waker {
        unsafe fn clone(_: *const ()) -> RawWaker {
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        unsafe fn wake(_: *const ()) {}

        unsafe fn wake_by_ref(_: *const ()) {}

        unsafe fn drop(_: *const ()) {}

        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, wake, wake_by_ref, drop);

        let raw_waker = RawWaker::new(std::ptr::null(), &VTABLE);
        unsafe { Waker::from_raw(raw_waker) }
    }
}
