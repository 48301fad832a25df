//! Persistência SQLite: artigos, entidades e associações artigo-entidade.
//!
//! A chave de deduplicação de artigo é a URL; a de entidade é o nome. O
//! `type` gravado na primeira inserção de uma entidade nunca é sobrescrito
//! por menções posteriores, espelhando a política first-type-wins da fusão.

use std::path::Path;

use chrono::Utc;
use radar_core::EntityMention;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::news::NewsArticle;

/// Abre (ou cria) o banco e garante o esquema.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    create_schema(&pool).await?;

    if newly_created {
        info!("banco novo inicializado em {}", db_path.display());
    } else {
        info!("banco existente aberto em {}", db_path.display());
    }

    Ok(pool)
}

/// Cria as tabelas se não existirem. Idempotente.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entities (
            entity_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            type TEXT NOT NULL,
            description TEXT,
            first_mentioned_date INTEGER,
            last_mentioned_date INTEGER,
            mentions_count INTEGER DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            article_id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            url TEXT UNIQUE NOT NULL,
            content TEXT,
            published_at INTEGER NOT NULL,
            source_name TEXT,
            image_url TEXT,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS article_entities (
            article_entity_id INTEGER PRIMARY KEY AUTOINCREMENT,
            article_id INTEGER NOT NULL,
            entity_id INTEGER NOT NULL,
            FOREIGN KEY (article_id) REFERENCES articles(article_id) ON DELETE CASCADE,
            FOREIGN KEY (entity_id) REFERENCES entities(entity_id) ON DELETE CASCADE,
            UNIQUE (article_id, entity_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Linha da tabela de artigos.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ArticleRow {
    pub article_id: i64,
    pub title: String,
    pub url: String,
    pub content: Option<String>,
    pub published_at: i64,
    pub source_name: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Linha da tabela de entidades.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EntityRow {
    pub entity_id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub first_mentioned_date: Option<i64>,
    pub last_mentioned_date: Option<i64>,
    pub mentions_count: i64,
}

/// Insere um artigo, ou devolve o id do já existente com a mesma URL.
pub async fn insert_article(pool: &SqlitePool, article: &NewsArticle) -> Result<i64, sqlx::Error> {
    let published_at = article
        .published_at
        .unwrap_or_else(|| Utc::now().timestamp());

    let inserted: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT OR IGNORE INTO articles
            (title, url, content, published_at, source_name, image_url, description)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING article_id
        "#,
    )
    .bind(&article.title)
    .bind(&article.url)
    .bind(&article.content)
    .bind(published_at)
    .bind(&article.source_name)
    .bind(&article.image_url)
    .bind(&article.description)
    .fetch_optional(pool)
    .await?;

    if let Some((id,)) = inserted {
        return Ok(id);
    }

    // URL já conhecida: o OR IGNORE não devolveu linha.
    let (id,): (i64,) = sqlx::query_as("SELECT article_id FROM articles WHERE url = ?")
        .bind(&article.url)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

/// Registra uma menção de entidade e devolve o id da linha.
///
/// Na primeira menção a linha nasce com o tipo da menção e contador 1;
/// menções seguintes do mesmo nome só avançam `mentions_count` e
/// `last_mentioned_date`, sem tocar no tipo.
pub async fn upsert_entity(
    pool: &SqlitePool,
    mention: &EntityMention,
    seen_at: i64,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO entities (name, type, first_mentioned_date, last_mentioned_date, mentions_count)
        VALUES (?, ?, ?, ?, 1)
        ON CONFLICT(name) DO UPDATE SET
            last_mentioned_date = excluded.last_mentioned_date,
            mentions_count = mentions_count + 1
        RETURNING entity_id
        "#,
    )
    .bind(&mention.name)
    .bind(&mention.kind)
    .bind(seen_at)
    .bind(seen_at)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Associa artigo e entidade. Idempotente: o par é único na tabela.
pub async fn link_article_entity(
    pool: &SqlitePool,
    article_id: i64,
    entity_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO article_entities (article_id, entity_id) VALUES (?, ?)")
        .bind(article_id)
        .bind(entity_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Artigos armazenados, mais recentes primeiro.
pub async fn list_articles(pool: &SqlitePool) -> Result<Vec<ArticleRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM articles ORDER BY published_at DESC, article_id DESC")
        .fetch_all(pool)
        .await
}

/// Entidades armazenadas, mais mencionadas primeiro.
pub async fn list_entities(pool: &SqlitePool) -> Result<Vec<EntityRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM entities ORDER BY mentions_count DESC, name ASC")
        .fetch_all(pool)
        .await
}
