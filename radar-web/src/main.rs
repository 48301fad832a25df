//! Servidor web Axum do Radar de Notícias: endpoints de leitura sobre o
//! banco e o gatilho do ciclo de ingestão (busca + NER + fusão).

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use radar_core::EntityCategory;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

mod config;
mod db;
mod error;
mod ingest;
mod ner;
mod news;

use config::Config;
use error::IngestError;
use ner::NerClient;
use news::{GNewsClient, NewsApiClient};

/// Estado compartilhado da aplicação
struct AppState {
    pool: sqlx::SqlitePool,
    ner: NerClient,
    gnews: Option<GNewsClient>,
    newsapi: Option<NewsApiClient>,
    news_query: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let config = Config::from_env()?;
    let pool = db::init_database(&config.database_path).await?;

    let state = Arc::new(AppState {
        pool,
        ner: NerClient::new(config.hf_model_url.clone(), config.hf_api_key.clone()),
        gnews: config.gnews_api_key.as_deref().map(GNewsClient::new),
        newsapi: config.news_api_key.as_deref().map(NewsApiClient::new),
        news_query: config.news_query.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/articles", get(articles_handler))
        .route("/entities", get(entities_handler))
        .route("/ingest", post(ingest_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("📰 Radar de Notícias no ar em http://localhost:{}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Artigos armazenados, mais recentes primeiro.
async fn articles_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match db::list_articles(&state.pool).await {
        Ok(rows) => Json(rows).into_response(),
        Err(err) => internal_error(err),
    }
}

/// Entidades com contagem de menções e metadados de exibição da categoria.
async fn entities_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match db::list_entities(&state.pool).await {
        Ok(rows) => {
            let enriched: Vec<serde_json::Value> = rows
                .iter()
                .map(|row| {
                    let category = EntityCategory::from_label(&row.kind);
                    serde_json::json!({
                        "entity_id": row.entity_id,
                        "name": row.name,
                        "type": row.kind,
                        "mentions_count": row.mentions_count,
                        "first_mentioned_date": row.first_mentioned_date,
                        "last_mentioned_date": row.last_mentioned_date,
                        "color": category.map(|c| c.color()),
                        "icon": category.map(|c| c.icon()),
                    })
                })
                .collect();
            Json(enriched).into_response()
        }
        Err(err) => internal_error(err),
    }
}

/// Dispara um ciclo de ingestão e devolve o relatório.
///
/// Falhas de serviço externo (NER ou busca) viram 502; falha de banco, 500.
async fn ingest_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let result = ingest::run_cycle(
        &state.pool,
        &state.ner,
        state.gnews.as_ref(),
        state.newsapi.as_ref(),
        &state.news_query,
    )
    .await;

    match result {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            let status = match &err {
                IngestError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
        }
    }
}

fn internal_error(err: sqlx::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": err.to_string()})),
    )
        .into_response()
}
