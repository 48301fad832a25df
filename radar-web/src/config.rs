//! Configuração explícita do servidor, carregada do ambiente uma única vez
//! na inicialização e passada aos construtores dos clientes. Nenhum módulo
//! lê variáveis de ambiente depois daqui.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Endpoint de inferência hospedado do modelo NER padrão.
pub const DEFAULT_HF_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/dslim/bert-base-NER";

/// Configuração completa da aplicação.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chave da API de inferência (obrigatória; sem ela não há NER).
    pub hf_api_key: String,
    /// URL do modelo NER hospedado.
    pub hf_model_url: String,
    /// Chave do GNews; provedor ignorado quando ausente.
    pub gnews_api_key: Option<String>,
    /// Chave da NewsAPI (busca alternativa); provedor ignorado quando ausente.
    pub news_api_key: Option<String>,
    /// Termo de busca dos ciclos de ingestão.
    pub news_query: String,
    /// Caminho do arquivo SQLite.
    pub database_path: PathBuf,
    /// Porta HTTP do servidor.
    pub port: u16,
}

impl Config {
    /// Lê a configuração do ambiente.
    ///
    /// Variáveis: `HF_API_KEY` (obrigatória), `HF_MODEL_URL`,
    /// `GNEWS_API_KEY`, `NEWS_API_KEY`, `NEWS_QUERY`, `DATABASE_PATH`
    /// e `PORT`.
    pub fn from_env() -> Result<Self> {
        let hf_api_key = env::var("HF_API_KEY")
            .context("HF_API_KEY não definida; necessária para o serviço NER")?;
        let hf_model_url =
            env::var("HF_MODEL_URL").unwrap_or_else(|_| DEFAULT_HF_MODEL_URL.to_string());
        let gnews_api_key = env::var("GNEWS_API_KEY").ok().filter(|k| !k.is_empty());
        let news_api_key = env::var("NEWS_API_KEY").ok().filter(|k| !k.is_empty());
        let news_query = env::var("NEWS_QUERY").unwrap_or_else(|_| "startups".to_string());
        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("radar.db"));
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().with_context(|| format!("PORT inválida: {raw}"))?,
            Err(_) => 5000,
        };

        Ok(Self {
            hf_api_key,
            hf_model_url,
            gnews_api_key,
            news_api_key,
            news_query,
            database_path,
            port,
        })
    }
}
