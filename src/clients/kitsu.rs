use super::{AnimePage, CatalogSource, CategoryList};
use crate::config::KitsuConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Locale-keyed text as Kitsu returns it (`{"en": "...", "en_jp": null}`).
pub type LocaleMap = BTreeMap<String, Option<String>>;

const ANIME_QUERY: &str = r#"
    query anime($cursor: String, $first: Int, $characters: Int, $categories: Int) {
        anime(first: $first, after: $cursor) {
            edges { cursor }
            nodes {
                id
                slug
                createdAt
                updatedAt
                startDate
                endDate
                description
                subtype
                ageRating
                ageRatingGuide
                episodeCount
                episodeLength
                totalLength
                youtubeTrailerVideoId
                averageRating
                averageRatingRank
                userCount
                userCountRank
                favoritesCount
                originCountries
                originLanguages
                tba
                titles { canonical localized originalLocale }
                characters(first: $characters) {
                    nodes {
                        role
                        createdAt
                        updatedAt
                        character {
                            id
                            slug
                            createdAt
                            updatedAt
                            description
                            names { canonical localized }
                            image {
                                blurhash
                                original { name url width height }
                                views { name url width height }
                            }
                        }
                    }
                }
                categories(first: $categories) { nodes { id } }
                posterImage {
                    blurhash
                    original { name url width height }
                    views { name url width height }
                }
                bannerImage {
                    blurhash
                    original { name url width height }
                    views { name url width height }
                }
            }
        }
    }
"#;

const CATEGORIES_QUERY: &str = r#"
    query categories($first: Int) {
        categories(first: $first) {
            totalCount
            nodes {
                createdAt
                updatedAt
                slug
                children(first: 2000) { totalCount }
                parent { id }
                isNsfw
                description
                title
            }
        }
    }
"#;

#[derive(Debug, Error)]
pub enum KitsuError {
    #[error("Kitsu request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Kitsu returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Kitsu GraphQL error: {0}")]
    GraphQl(String),

    #[error("Kitsu response had no data for {0}")]
    MissingData(&'static str),
}

#[derive(Serialize)]
struct GraphQLRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnimeVariables<'a> {
    cursor: Option<&'a str>,
    first: u32,
    characters: u32,
    categories: u32,
}

#[derive(Serialize)]
struct CategoryVariables {
    first: u32,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQLErrorMessage>,
}

#[derive(Deserialize)]
struct GraphQLErrorMessage {
    message: String,
}

#[derive(Deserialize)]
struct AnimeData {
    anime: Option<AnimeConnection>,
}

#[derive(Deserialize)]
struct AnimeConnection {
    #[serde(default)]
    edges: Vec<Edge>,
    #[serde(default)]
    nodes: Vec<AnimeNode>,
}

#[derive(Deserialize)]
struct Edge {
    cursor: String,
}

#[derive(Deserialize)]
struct CategoriesData {
    categories: Option<CategoryConnection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryConnection {
    total_count: Option<i64>,
    #[serde(default)]
    nodes: Vec<CategoryNode>,
}

/// A GraphQL connection reduced to its node list.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimeNode {
    pub id: String,
    pub slug: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<serde_json::Value>,
    pub subtype: Option<String>,
    pub age_rating: Option<String>,
    pub age_rating_guide: Option<String>,
    pub episode_count: Option<i32>,
    pub episode_length: Option<i32>,
    pub total_length: Option<i32>,
    pub youtube_trailer_video_id: Option<String>,
    pub average_rating: Option<f64>,
    pub average_rating_rank: Option<i32>,
    pub user_count: Option<i32>,
    pub user_count_rank: Option<i32>,
    pub favorites_count: Option<i32>,
    pub origin_countries: Option<Vec<String>>,
    pub origin_languages: Option<Vec<String>>,
    pub tba: Option<String>,
    pub titles: TitlesNode,
    pub characters: Connection<CharacterEdgeNode>,
    pub categories: Connection<IdRef>,
    pub poster_image: Option<ImageNode>,
    pub banner_image: Option<ImageNode>,
}

impl AnimeNode {
    /// Identifier used in logs: the upstream id, plus the slug when present.
    #[must_use]
    pub fn display_id(&self) -> String {
        match &self.slug {
            Some(slug) => format!("{} ({slug})", self.id),
            None => self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitlesNode {
    pub canonical: Option<String>,
    pub localized: LocaleMap,
    pub original_locale: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterEdgeNode {
    pub role: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub character: Option<CharacterNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterNode {
    pub id: String,
    pub slug: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub description: Option<serde_json::Value>,
    pub names: NamesNode,
    pub image: Option<ImageNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamesNode {
    pub canonical: Option<String>,
    pub localized: LocaleMap,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageNode {
    pub blurhash: Option<String>,
    pub original: ImageView,
    #[serde(default)]
    pub views: Vec<ImageView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageView {
    pub name: String,
    pub url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountNode {
    #[serde(rename = "totalCount")]
    pub total_count: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryNode {
    pub slug: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub children: CountNode,
    pub parent: Option<IdRef>,
    pub is_nsfw: bool,
    pub description: LocaleMap,
    pub title: LocaleMap,
}

#[derive(Clone)]
pub struct KitsuClient {
    client: Client,
    endpoint: String,
    page_size: u32,
    character_limit: u32,
    category_page_size: u32,
    category_limit: u32,
}

impl KitsuClient {
    pub fn new(config: &KitsuConfig) -> Result<Self, KitsuError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.graphql_url.clone(),
            page_size: config.page_size,
            character_limit: config.character_limit,
            category_page_size: config.category_page_size,
            category_limit: config.category_limit,
        })
    }

    async fn post<V, T>(&self, query: &str, variables: V) -> Result<T, KitsuError>
    where
        V: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let request_body = GraphQLRequest { query, variables };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KitsuError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: GraphQLResponse<T> = response.json().await?;

        if !response.errors.is_empty() {
            let message = response
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(KitsuError::GraphQl(message));
        }

        response.data.ok_or(KitsuError::MissingData("query"))
    }
}

#[async_trait]
impl CatalogSource for KitsuClient {
    async fn fetch_anime_page(&self, cursor: &str) -> Result<AnimePage, KitsuError> {
        let variables = AnimeVariables {
            cursor: (!cursor.is_empty()).then_some(cursor),
            first: self.page_size,
            characters: self.character_limit,
            categories: self.category_page_size,
        };

        let data: AnimeData = self.post(ANIME_QUERY, variables).await?;
        let connection = data.anime.ok_or(KitsuError::MissingData("anime"))?;

        let next_cursor = connection.edges.into_iter().last().map(|e| e.cursor);
        debug!(
            "Fetched anime page after {:?}: {} nodes",
            cursor,
            connection.nodes.len()
        );

        Ok(AnimePage {
            next_cursor,
            nodes: connection.nodes,
        })
    }

    async fn fetch_categories(&self) -> Result<CategoryList, KitsuError> {
        let data: CategoriesData = self
            .post(
                CATEGORIES_QUERY,
                CategoryVariables {
                    first: self.category_limit,
                },
            )
            .await?;
        let connection = data
            .categories
            .ok_or(KitsuError::MissingData("categories"))?;

        Ok(CategoryList {
            total_count: connection.total_count,
            nodes: connection.nodes,
        })
    }
}
