//! Cliente do serviço NER hospedado (Inference API).
//!
//! Uma chamada por texto: o corpo `{"inputs": texto}` vai com bearer auth
//! para a URL do modelo. Resposta não-2xx é falha dura com status e corpo,
//! nunca mascarada como lista vazia de predições.

use radar_core::RawPrediction;

use crate::error::IngestError;

pub struct NerClient {
    http: reqwest::Client,
    model_url: String,
    api_key: String,
}

impl NerClient {
    pub fn new(model_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            model_url: model_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Roda o NER sobre um texto e devolve as predições cruas, na ordem
    /// em que o serviço as emitiu.
    pub async fn predict(&self, text: &str) -> Result<Vec<RawPrediction>, IngestError> {
        let response = self
            .http
            .post(&self.model_url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::NerService { status, body });
        }

        response
            .json::<Vec<RawPrediction>>()
            .await
            .map_err(IngestError::NerDecode)
    }
}
