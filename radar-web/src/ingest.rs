//! Ciclo de ingestão: busca → NER → fusão → persistência.
//!
//! Este módulo é o chamador da fusão: emite **uma** consulta NER por artigo
//! (título e corpo opcional separados por um espaço), entrega a sequência de
//! tokens à fusão na ordem recebida e converte as menções deduplicadas em
//! linhas de entidade e associações artigo-entidade.
//!
//! Falha do serviço NER é falha dura daquele artigo, nunca uma lista vazia
//! de entidades. Dentro de um ciclo ela é registrada e contada, e o ciclo
//! segue para o próximo artigo; falha de um provedor de busca aborta o
//! ciclo, já que sem artigos não há o que processar.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{error, info};

use crate::db;
use crate::error::IngestError;
use crate::ner::NerClient;
use crate::news::{GNewsClient, NewsApiClient, NewsArticle};

/// Resultado de um ciclo de ingestão.
#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
    /// Artigos processados e gravados.
    pub articles: usize,
    /// Associações de entidade gravadas, somadas sobre os artigos.
    pub entities: usize,
    /// Artigos cujo processamento falhou (NER ou banco); detalhes no log.
    pub failed: usize,
}

/// Texto enviado ao NER: título e corpo opcional com um espaço separador.
/// O corpo preferencial é o conteúdo completo; na falta dele, a descrição.
fn ner_input(article: &NewsArticle) -> String {
    match article.content.as_deref().or(article.description.as_deref()) {
        Some(body) => format!("{} {}", article.title, body),
        None => article.title.clone(),
    }
}

/// Processa um artigo de ponta a ponta. Devolve o número de entidades
/// associadas a ele.
async fn ingest_article(
    pool: &SqlitePool,
    ner: &NerClient,
    article: &NewsArticle,
) -> Result<usize, IngestError> {
    let predictions = ner.predict(&ner_input(article)).await?;
    let mentions = radar_core::merge(&predictions);

    let article_id = db::insert_article(pool, article).await?;
    let seen_at = article
        .published_at
        .unwrap_or_else(|| Utc::now().timestamp());

    for mention in &mentions {
        let entity_id = db::upsert_entity(pool, mention, seen_at).await?;
        db::link_article_entity(pool, article_id, entity_id).await?;
    }

    Ok(mentions.len())
}

/// Roda um ciclo completo sobre todos os provedores configurados.
pub async fn run_cycle(
    pool: &SqlitePool,
    ner: &NerClient,
    gnews: Option<&GNewsClient>,
    newsapi: Option<&NewsApiClient>,
    query: &str,
) -> Result<IngestReport, IngestError> {
    let mut articles: Vec<NewsArticle> = Vec::new();
    if let Some(client) = gnews {
        articles.extend(client.search(query, "en", "us", 10).await?);
    }
    if let Some(client) = newsapi {
        articles.extend(client.search(query, 10).await?);
    }

    // O mesmo artigo pode vir dos dois provedores; a URL é a identidade.
    let mut seen = HashSet::new();
    articles.retain(|a| seen.insert(a.url.clone()));

    let mut report = IngestReport::default();
    for article in &articles {
        match ingest_article(pool, ner, article).await {
            Ok(count) => {
                report.articles += 1;
                report.entities += count;
            }
            Err(err) => {
                error!(url = %article.url, %err, "falha ao processar artigo");
                report.failed += 1;
            }
        }
    }

    info!(
        articles = report.articles,
        entities = report.entities,
        failed = report.failed,
        "ciclo de ingestão concluído"
    );
    Ok(report)
}
