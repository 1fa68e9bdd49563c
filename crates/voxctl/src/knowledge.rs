//! HTTP knowledge collaborator.
//!
//! Speaks the generateContent wire shape: POST with a single user part,
//! answer read from the first candidate. Any transport or shape failure is
//! reported as "cannot answer", which sends the interpreter on to web search.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use vox_common::KnowledgeSource;

pub struct HttpKnowledge {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpKnowledge {
    pub fn new(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
        }
    }

    async fn query(&self, text: &str) -> Option<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }]
        });

        let response = self.client.post(&url).json(&body).send().await.ok()?;
        if !response.status().is_success() {
            debug!(status = %response.status(), "knowledge endpoint refused query");
            return None;
        }

        let data: serde_json::Value = response.json().await.ok()?;
        let answer = data["candidates"][0]["content"]["parts"][0]["text"].as_str()?;
        let answer = answer.trim();
        if answer.is_empty() {
            None
        } else {
            Some(answer.to_string())
        }
    }
}

#[async_trait]
impl KnowledgeSource for HttpKnowledge {
    async fn ask(&self, query: &str) -> Option<String> {
        self.query(query).await
    }
}
