//! Chat completion proxy client and the study assistant built on it.

use anyhow::Context;
use async_trait::async_trait;
use btechverse_core::models::{ChatCompletionRequest, ChatMessage};
use btechverse_core::Config;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("OPENAI_API_KEY is not configured")]
    NotConfigured,

    /// The completion endpoint answered with a non-2xx status.
    #[error("Completion endpoint returned {status}")]
    Upstream { status: u16, body: String },

    #[error("Completion request failed: {0}")]
    Transport(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

/// A chat-completion endpoint.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send the request and return the endpoint's JSON body unchanged.
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<Value, ChatError>;
}

/// OpenAI-compatible `chat/completions` client.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    http_client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompletionClient")
            .field("url", &self.url)
            .field("configured", &self.api_key.is_some())
            .finish()
    }
}

impl OpenAiCompletionClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client for chat completions")?;

        Ok(Self {
            http_client,
            url: url.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.chat_completions_url(),
            config.openai_api_key().map(String::from),
        )
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletionClient {
    #[tracing::instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<Value, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::NotConfigured)?;
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| r#"{"error":"Unknown error"}"#.to_string());
            tracing::warn!(
                status = status.as_u16(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Completion endpoint returned an error"
            );
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        tracing::debug!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Completion received"
        );
        Ok(body)
    }
}

/// `choices[0].message.content` of a completion body.
pub fn reply_content(body: &Value) -> Result<String, ChatError> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| ChatError::MalformedResponse("missing choices[0].message.content".into()))
}

/// Study assistant that answers questions about a document. Never fails:
/// when the completion endpoint is unavailable it answers from a canned,
/// topic-matched set of replies.
#[derive(Clone)]
pub struct ChatService {
    backend: Arc<dyn CompletionBackend>,
}

impl ChatService {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn CompletionBackend> {
        &self.backend
    }

    /// Forward a request as-is. Used by the HTTP proxy.
    pub async fn proxy(&self, request: &ChatCompletionRequest) -> Result<Value, ChatError> {
        self.backend.complete(request).await
    }

    pub async fn ask(&self, document_title: &str, file_name: &str, question: &str) -> String {
        let request = ChatCompletionRequest::new(vec![
            ChatMessage::system(system_prompt(document_title)),
            ChatMessage::user(question),
        ]);

        match self
            .backend
            .complete(&request)
            .await
            .and_then(|body| reply_content(&body))
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Chat completion failed, using fallback reply");
                fallback_reply(question, file_name)
            }
        }
    }
}

fn system_prompt(document_title: &str) -> String {
    let mut prompt = String::from(
        "You are BTechVerse AI, an assistant helping BTech students with their studies. ",
    );
    if !document_title.trim().is_empty() {
        prompt.push_str(&format!(
            "The student is reading a document titled \"{}\". ",
            document_title.trim()
        ));
    }
    prompt.push_str(
        "Give accurate, educational answers with examples where useful. \
         If you do not know something, say so and suggest where to look.",
    );
    prompt
}

const FALLBACK_TOPICS: &[(&[&str], &str)] = &[
    (
        &["algorithm", "complexity", "big o", "big-o"],
        "Algorithms and complexity: an algorithm is a step-by-step procedure for solving a \
         problem. Compare algorithms by how their running time grows with input size: O(1) \
         constant, O(log n) logarithmic, O(n) linear, O(n log n) for efficient sorting, and \
         O(n^2) for nested loops.",
    ),
    (
        &["sort", "search"],
        "Sorting and searching: merge sort and heap sort run in O(n log n); quick sort averages \
         O(n log n) but degrades to O(n^2). Binary search finds an item in a sorted array in \
         O(log n); linear search needs O(n).",
    ),
    (
        &["data structure", "array", "linked list", "stack", "queue", "tree", "graph", "heap"],
        "Data structures: arrays give O(1) indexed access, linked lists O(1) insertion at a known \
         node, stacks are LIFO and queues FIFO. Trees model hierarchies (a BST gives O(log n) \
         lookups when balanced) and graphs model arbitrary relationships.",
    ),
    (
        &["database", "dbms", "sql", "normalization", "transaction"],
        "Databases: a DBMS stores data in tables linked by keys. SQL covers SELECT, INSERT, \
         UPDATE and DELETE; normalization (1NF, 2NF, 3NF) removes redundancy; transactions \
         follow ACID properties.",
    ),
    (
        &["network", "protocol", "tcp", "udp", "osi", "http"],
        "Computer networks: the OSI model has seven layers from physical to application. TCP is \
         connection-oriented and reliable, UDP is connectionless and fast. HTTP, DNS and SMTP \
         are common application-layer protocols.",
    ),
    (
        &["operating system", "process", "thread", "scheduling", "deadlock", "memory management"],
        "Operating systems: the OS manages processes, memory, files and devices. Study CPU \
         scheduling (FCFS, SJF, round robin), synchronization and deadlocks, and paging and \
         virtual memory.",
    ),
    (
        &["programming", "code", "python", "java", "javascript", "c++"],
        "Programming: start from fundamentals (variables, control flow, functions), then \
         practise problem solving daily. Read the error message first when debugging, and \
         learn one language well before moving to the next.",
    ),
    (
        &["math", "calculus", "matrix", "probability", "integral", "derivative"],
        "Engineering mathematics: focus on calculus (limits, derivatives, integrals), linear \
         algebra (matrices, eigenvalues) and probability. Work through solved examples before \
         attempting exercises.",
    ),
];

/// Canned reply for `question`, chosen by topic keywords.
pub fn fallback_reply(question: &str, file_name: &str) -> String {
    let question = question.to_lowercase();
    FALLBACK_TOPICS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| question.contains(k)))
        .map(|(_, reply)| reply.to_string())
        .unwrap_or_else(|| {
            format!(
                "I can't reach the AI service right now. Meanwhile, review \"{}\" for the topic \
                 you asked about. I can help with programming, data structures and algorithms, \
                 databases, operating systems, computer networks and engineering mathematics.",
                file_name
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubBackend {
        result: Result<Value, u16>,
        seen: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl StubBackend {
        fn new(result: Result<Value, u16>) -> Arc<Self> {
            Arc::new(Self {
                result,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for StubBackend {
        async fn complete(&self, request: &ChatCompletionRequest) -> Result<Value, ChatError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.result {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(ChatError::Upstream {
                    status: *status,
                    body: "{}".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_ask_returns_first_choice() {
        let backend = StubBackend::new(Ok(json!({
            "choices": [{"message": {"role": "assistant", "content": "Normalize to 3NF."}}]
        })));
        let service = ChatService::new(backend.clone());

        let reply = service.ask("DBMS Unit 1", "dbms.pdf", "What is 3NF?").await;
        assert_eq!(reply, "Normalize to 3NF.");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].model, "gpt-3.5-turbo");
        assert_eq!(seen[0].messages[0].role, "system");
        assert!(seen[0].messages[0].content.contains("DBMS Unit 1"));
        assert_eq!(seen[0].messages[1].content, "What is 3NF?");
    }

    #[tokio::test]
    async fn test_ask_falls_back_on_upstream_error() {
        let service = ChatService::new(StubBackend::new(Err(429)));
        let reply = service.ask("Notes", "notes.pdf", "Explain TCP handshakes").await;
        assert!(reply.starts_with("Computer networks"));
    }

    #[tokio::test]
    async fn test_ask_falls_back_on_malformed_body() {
        let service = ChatService::new(StubBackend::new(Ok(json!({"choices": []}))));
        let reply = service.ask("Notes", "notes.pdf", "hello").await;
        assert!(reply.contains("notes.pdf"));
    }

    #[test]
    fn test_fallback_topic_order() {
        assert!(fallback_reply("time complexity of quick sort", "f").starts_with("Algorithms"));
        assert!(fallback_reply("binary search", "f").starts_with("Sorting"));
        assert!(fallback_reply("what is a linked list", "f").starts_with("Data structures"));
        assert!(fallback_reply("SQL joins", "f").starts_with("Databases"));
        assert!(fallback_reply("deadlock avoidance", "f").starts_with("Operating systems"));
        assert!(fallback_reply("learn Python", "f").starts_with("Programming"));
        assert!(fallback_reply("eigenvalues of a matrix", "f").starts_with("Engineering"));
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses() {
        let client = OpenAiCompletionClient::new("http://127.0.0.1:9/unused", None).unwrap();
        let err = client
            .complete(&ChatCompletionRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotConfigured));
        assert_eq!(err.to_string(), "OPENAI_API_KEY is not configured");
    }
}
