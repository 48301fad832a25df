//! Taxonomia de erros do ciclo de ingestão.
//!
//! A fusão de entidades em si nunca falha; os erros daqui são dos
//! colaboradores externos (serviços HTTP e banco). Uma falha do serviço NER
//! é um tipo próprio, para que o chamador distinga "nenhuma entidade
//! encontrada" de "a consulta NER falhou".

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Falha de transporte ao falar com um serviço externo.
    #[error("falha de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    /// O serviço NER respondeu com status de erro.
    #[error("serviço NER respondeu {status}: {body}")]
    NerService { status: StatusCode, body: String },

    /// A resposta do serviço NER não pôde ser decodificada.
    #[error("resposta ilegível do serviço NER: {0}")]
    NerDecode(#[source] reqwest::Error),

    /// Uma API de busca de notícias respondeu com status de erro.
    #[error("API de notícias ({provider}) respondeu {status}: {body}")]
    NewsService {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    /// Erro de banco de dados.
    #[error("erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),
}
