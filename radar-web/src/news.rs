//! Clientes das duas APIs de busca de artigos.
//!
//! - **GNews** (`/api/v4/search`): busca principal, com `expand=content`
//!   para pedir o conteúdo completo quando o plano permite.
//! - **NewsAPI** (`/v2/everything`): busca alternativa, ordenada por data
//!   de publicação.
//!
//! Os dois formatos de resposta são normalizados em [`NewsArticle`].
//! Artigos sem título ou sem URL são descartados com aviso: a URL é a
//! chave de deduplicação na tabela de artigos.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::IngestError;

const GNEWS_SEARCH_URL: &str = "https://gnews.io/api/v4/search";
const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

/// Artigo normalizado, independente do provedor de busca.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    pub content: Option<String>,
    pub description: Option<String>,
    pub source_name: Option<String>,
    pub image_url: Option<String>,
    /// Publicação em segundos unix. `None` quando o provedor não informou
    /// uma data legível; o padrão ("agora") é aplicado na inserção.
    pub published_at: Option<i64>,
}

/// Datas chegam como RFC 3339; valores ilegíveis contam como ausentes.
fn parse_published(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.timestamp())
}

// ------------------------------ GNews -------------------------------

#[derive(Debug, Deserialize)]
struct GNewsResponse {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GNewsArticle {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    description: Option<String>,
    image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<GNewsSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GNewsSource {
    name: Option<String>,
}

impl GNewsArticle {
    fn normalize(self) -> Option<NewsArticle> {
        let (Some(title), Some(url)) = (self.title, self.url) else {
            warn!("artigo do GNews sem título ou URL, descartado");
            return None;
        };
        Some(NewsArticle {
            title,
            url,
            content: self.content,
            description: self.description,
            source_name: self.source.and_then(|s| s.name),
            image_url: self.image,
            published_at: parse_published(self.published_at.as_deref()),
        })
    }
}

pub struct GNewsClient {
    http: reqwest::Client,
    api_key: String,
}

impl GNewsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Busca artigos no GNews.
    pub async fn search(
        &self,
        query: &str,
        lang: &str,
        country: &str,
        max: u32,
    ) -> Result<Vec<NewsArticle>, IngestError> {
        let max = max.to_string();
        let response = self
            .http
            .get(GNEWS_SEARCH_URL)
            .query(&[
                ("q", query),
                ("lang", lang),
                ("country", country),
                ("max", max.as_str()),
                ("token", self.api_key.as_str()),
                ("expand", "content"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::NewsService {
                provider: "gnews",
                status,
                body,
            });
        }

        let parsed: GNewsResponse = response.json().await?;
        Ok(parsed
            .articles
            .into_iter()
            .filter_map(GNewsArticle::normalize)
            .collect())
    }
}

// ------------------------------ NewsAPI -----------------------------

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    description: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<NewsApiSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewsApiSource {
    name: Option<String>,
}

impl NewsApiArticle {
    fn normalize(self) -> Option<NewsArticle> {
        let (Some(title), Some(url)) = (self.title, self.url) else {
            warn!("artigo da NewsAPI sem título ou URL, descartado");
            return None;
        };
        Some(NewsArticle {
            title,
            url,
            content: self.content,
            description: self.description,
            source_name: self.source.and_then(|s| s.name),
            image_url: self.url_to_image,
            published_at: parse_published(self.published_at.as_deref()),
        })
    }
}

pub struct NewsApiClient {
    http: reqwest::Client,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Busca artigos na NewsAPI, mais recentes primeiro.
    pub async fn search(&self, query: &str, page_size: u32) -> Result<Vec<NewsArticle>, IngestError> {
        let page_size = page_size.to_string();
        let response = self
            .http
            .get(NEWS_API_URL)
            // A NewsAPI rejeita requisições sem User-Agent.
            .header(reqwest::header::USER_AGENT, "radar-web/0.1")
            .query(&[
                ("q", query),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::NewsService {
                provider: "newsapi",
                status,
                body,
            });
        }

        let parsed: NewsApiResponse = response.json().await?;
        Ok(parsed
            .articles
            .into_iter()
            .filter_map(NewsApiArticle::normalize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gnews_response_normalizes() {
        let payload = r#"{
            "totalArticles": 1,
            "articles": [{
                "title": "OpenAI launches GPT-4",
                "description": "A major leap in generative AI.",
                "content": "Full content of the release article.",
                "url": "https://example.com/openai-gpt4",
                "image": "https://example.com/image1.jpg",
                "publishedAt": "2023-03-14T00:00:00Z",
                "source": {"name": "TechCrunch", "url": "https://techcrunch.com"}
            }]
        }"#;
        let parsed: GNewsResponse = serde_json::from_str(payload).unwrap();
        let articles: Vec<NewsArticle> = parsed
            .articles
            .into_iter()
            .filter_map(GNewsArticle::normalize)
            .collect();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "OpenAI launches GPT-4");
        assert_eq!(articles[0].source_name.as_deref(), Some("TechCrunch"));
        assert_eq!(articles[0].published_at, Some(1678752000));
    }

    #[test]
    fn test_newsapi_response_normalizes() {
        let payload = r#"{
            "status": "ok",
            "articles": [{
                "source": {"id": null, "name": "The Verge"},
                "title": "Sam Altman speaks at AI summit",
                "description": "OpenAI's CEO discusses AI policy.",
                "url": "https://example.com/altman-ai-summit",
                "urlToImage": "https://example.com/image2.jpg",
                "publishedAt": "2023-04-13T04:00:00Z",
                "content": "Full content of the keynote."
            }]
        }"#;
        let parsed: NewsApiResponse = serde_json::from_str(payload).unwrap();
        let articles: Vec<NewsArticle> = parsed
            .articles
            .into_iter()
            .filter_map(NewsApiArticle::normalize)
            .collect();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].image_url.as_deref(), Some("https://example.com/image2.jpg"));
        assert_eq!(articles[0].source_name.as_deref(), Some("The Verge"));
    }

    #[test]
    fn test_article_without_url_is_dropped() {
        let payload = r#"{"articles": [{"title": "sem link"}]}"#;
        let parsed: GNewsResponse = serde_json::from_str(payload).unwrap();
        let articles: Vec<NewsArticle> = parsed
            .articles
            .into_iter()
            .filter_map(GNewsArticle::normalize)
            .collect();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_unparseable_date_counts_as_absent() {
        assert_eq!(parse_published(Some("ontem")), None);
        assert_eq!(parse_published(None), None);
        assert_eq!(parse_published(Some("1970-01-01T00:00:10Z")), Some(10));
    }
}
