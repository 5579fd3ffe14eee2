use crate::models::ProfileAttributes;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the embedding provider
///
/// Provider failures are hard failures for the save path: the caller
/// must surface them instead of persisting a partial vector, so a
/// profile with a failed embedding step simply keeps a NULL embedding.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// HTTP client for the external embedding provider
///
/// Speaks the OpenAI-compatible `/embeddings` shape. Constructed once
/// at startup and injected into the save path; there is deliberately no
/// process-global handle.
pub struct EmbeddingClient {
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

impl EmbeddingClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        dimension: usize,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            model,
            dimension,
            client,
        }
    }

    /// Embed one text into a fixed-length vector
    ///
    /// A response with the wrong dimension is rejected: an absent
    /// embedding must stay absent, never be replaced by a truncated or
    /// empty vector masquerading as valid.
    pub async fn embed(&self, text: &str) -> Result<Vec<f64>, EmbeddingError> {
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));

        let payload = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmbeddingError::Api(format!(
                "Embedding request failed: {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("Empty data array".into()))?;

        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                got: embedding.len(),
            });
        }

        Ok(embedding)
    }
}

/// Flatten an attribute bag into the text the provider embeds
///
/// Mirrors what the onboarding flow collects: free-text summary first,
/// then the declared labels. Interest ids are numeric references into
/// the taxonomy and carry no text, so they are left out.
pub fn profile_text(attributes: &ProfileAttributes) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(summary) = &attributes.vibe_summary {
        parts.push(summary.clone());
    }
    if let Some(style) = &attributes.meeting_style {
        parts.push(format!("Prefers to meet: {}", style));
    }
    if let Some(intent) = &attributes.social_intent {
        parts.push(format!("Looking for: {}", intent));
    }
    if let Some(personality) = &attributes.personality_type {
        parts.push(format!("Personality: {}", personality));
    }
    if !attributes.conversation_topics.is_empty() {
        parts.push(format!(
            "Likes talking about: {}",
            attributes.conversation_topics.join(", ")
        ));
    }

    parts.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_attributes() -> ProfileAttributes {
        ProfileAttributes {
            vibe_summary: Some("Curious engineer who lives on espresso".to_string()),
            meeting_style: Some("in-person".to_string()),
            social_intent: Some("friendship".to_string()),
            personality_type: Some("analytical".to_string()),
            conversation_topics: vec!["startups".to_string(), "hiking".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_profile_text_composition() {
        let text = profile_text(&sample_attributes());
        assert!(text.starts_with("Curious engineer"));
        assert!(text.contains("Prefers to meet: in-person"));
        assert!(text.contains("Looking for: friendship"));
        assert!(text.contains("startups, hiking"));
    }

    #[test]
    fn test_profile_text_empty_bag() {
        let text = profile_text(&ProfileAttributes::default());
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_embed_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#)
            .create_async()
            .await;

        let client = EmbeddingClient::new(server.url(), "test_key".to_string(), "test-model".to_string(), 3, 5);

        let embedding = client.embed("hello").await.unwrap();
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_rejects_wrong_dimension() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.1,0.2]}]}"#)
            .create_async()
            .await;

        let client = EmbeddingClient::new(server.url(), "test_key".to_string(), "test-model".to_string(), 3, 5);

        let err = client.embed("hello").await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { expected: 3, got: 2 }
        ));
    }

    #[tokio::test]
    async fn test_embed_surfaces_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(500)
            .create_async()
            .await;

        let client = EmbeddingClient::new(server.url(), "test_key".to_string(), "test-model".to_string(), 3, 5);

        let err = client.embed("hello").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Api(_)));
    }

    #[tokio::test]
    async fn test_embed_rejects_empty_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let client = EmbeddingClient::new(server.url(), "test_key".to_string(), "test-model".to_string(), 3, 5);

        let err = client.embed("hello").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
    }
}
