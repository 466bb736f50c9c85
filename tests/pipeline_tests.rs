//! End-to-end import runs against a scripted catalog and a throwaway SQLite
//! database.

use async_trait::async_trait;
use kitsu_import::clients::kitsu::{AnimeNode, CategoryNode, KitsuError};
use kitsu_import::clients::{AnimePage, CatalogSource, CategoryList};
use kitsu_import::config::Config;
use kitsu_import::db::Store;
use kitsu_import::domain::{CharacterId, MediaId};
use kitsu_import::entities::{
    anime, anime_characters, anime_genres, castings, categories, characters, media_characters,
};
use kitsu_import::services::{
    EntityKind, ImportError, ImportPipeline, LoadError, PipelineContext, TransformError,
};
use sea_orm::{EntityTrait, QueryOrder};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Serves scripted pages in order; once the script runs out it answers with
/// an empty page.
#[derive(Default)]
struct ScriptedSource {
    pages: Mutex<VecDeque<Result<AnimePage, KitsuError>>>,
    categories: Vec<CategoryNode>,
    cursors: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn with_pages(pages: Vec<Result<AnimePage, KitsuError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    fn requested_cursors(&self) -> Vec<String> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch_anime_page(&self, cursor: &str) -> Result<AnimePage, KitsuError> {
        self.cursors.lock().unwrap().push(cursor.to_string());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AnimePage::default()))
    }

    async fn fetch_categories(&self) -> Result<CategoryList, KitsuError> {
        Ok(CategoryList {
            total_count: Some(self.categories.len() as i64),
            nodes: self.categories.clone(),
        })
    }
}

async fn test_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("kitsu-import-test-{}.db", uuid::Uuid::new_v4()));
    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open store");
    store.create_schema().await.expect("failed to create schema");
    store
}

fn test_config(pages: u32) -> Config {
    let mut config = Config::default();
    config.import.pages = pages;
    config.import.import_categories = false;
    config
}

fn character(slug: &str, role: &str) -> Value {
    json!({
        "role": role,
        "createdAt": "2017-07-21T11:49:22Z",
        "updatedAt": "2017-07-21T11:49:22Z",
        "character": {
            "id": format!("c-{slug}"),
            "slug": slug,
            "createdAt": "2013-02-20T16:00:13Z",
            "updatedAt": "2013-02-20T16:00:13Z",
            "description": { "en": "A character." },
            "names": {
                "canonical": slug.to_uppercase(),
                "localized": { "en": slug.to_uppercase(), "ja_jp": null }
            },
            "image": null
        }
    })
}

fn anime_json(id: &str, slug: &str, characters: Vec<Value>, genres: &[&str]) -> Value {
    let genres: Vec<Value> = genres.iter().map(|id| json!({ "id": id })).collect();
    json!({
        "id": id,
        "slug": slug,
        "createdAt": "2013-02-20T16:00:13Z",
        "updatedAt": "2024-01-02T03:04:05Z",
        "startDate": "1998-04-03",
        "endDate": "1999-04-24",
        "description": { "en": "Space bounty hunters." },
        "subtype": "TV",
        "ageRating": "R",
        "ageRatingGuide": "17+",
        "episodeCount": 26,
        "episodeLength": 25,
        "averageRating": 82.5,
        "userCount": 100,
        "favoritesCount": 10,
        "originCountries": ["JP"],
        "originLanguages": ["ja"],
        "titles": {
            "canonical": slug,
            "localized": { "en": slug, "en_jp": slug, "ja_jp": null },
            "originalLocale": "ja_jp"
        },
        "characters": { "nodes": characters },
        "categories": { "nodes": genres },
        "posterImage": {
            "blurhash": "LKO2?U%2Tw=w",
            "original": {
                "name": "original",
                "url": format!("https://media.kitsu.io/anime/{id}/poster_image/original.jpg"),
                "width": 550,
                "height": 780
            },
            "views": [
                {
                    "name": "tiny",
                    "url": format!("https://media.kitsu.io/anime/{id}/poster_image/tiny.jpg"),
                    "width": 110,
                    "height": 156
                }
            ]
        },
        "bannerImage": null
    })
}

fn anime_node(value: Value) -> AnimeNode {
    serde_json::from_value(value).expect("fixture should deserialize")
}

fn page(nodes: Vec<Value>, cursor: Option<&str>) -> Result<AnimePage, KitsuError> {
    Ok(AnimePage {
        next_cursor: cursor.map(str::to_string),
        nodes: nodes.into_iter().map(anime_node).collect(),
    })
}

#[tokio::test]
async fn test_import_writes_only_accepted_anime() {
    let store = test_store().await;

    let mut unrated = anime_json("2", "trigun", vec![character("vash", "MAIN")], &["1"]);
    unrated["ageRating"] = Value::Null;

    let source = ScriptedSource::with_pages(vec![
        page(
            vec![anime_json(
                "1",
                "cowboy-bebop",
                vec![character("spike", "MAIN"), character("jet", "RECURRING")],
                &["1", "4"],
            )],
            Some("c1"),
        ),
        page(vec![unrated], Some("c2")),
    ]);

    let config = test_config(2);
    let mut ctx = PipelineContext::new();
    let summary = ImportPipeline::new(&source, &store, &config)
        .run(&mut ctx)
        .await
        .expect("import should succeed");

    assert_eq!(source.requested_cursors(), vec!["", "c1"]);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.media_ids, vec![MediaId::new(0)]);
    assert_eq!(summary.filter.accepted, 1);
    assert_eq!(summary.filter.missing_age_rating, 1);
    assert_eq!(summary.genres_written, 2);
    assert_eq!(summary.characters_written, 2);
    assert!(summary.skips.is_empty());
    assert_eq!(ctx.cursor, "c2");

    let media = anime::Entity::find().all(&store.conn).await.unwrap();
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].id, 0);
    assert_eq!(media[0].slug, "cowboy-bebop");
    assert_eq!(media[0].canonical_title, "en_jp");
    assert_eq!(media[0].age_rating, Some(2));
    assert_eq!(media[0].subtype, 0);
    assert_eq!(media[0].episode_count_guess, Some(26));

    let poster = media[0].poster_image_data.clone().unwrap();
    assert_eq!(poster["id"], "anime/1/poster_image/original.jpg");
    assert_eq!(poster["derivates"]["tiny"]["id"], "anime/1/poster_image/tiny.jpg");

    let cast = characters::Entity::find()
        .order_by_asc(characters::Column::Id)
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(
        cast.iter().map(|c| (c.id, c.slug.as_str())).collect::<Vec<_>>(),
        vec![(1, "spike"), (2, "jet")]
    );
    assert!(cast.iter().all(|c| c.primary_media_id == 0));

    let legacy_links = anime_characters::Entity::find().all(&store.conn).await.unwrap();
    assert_eq!(legacy_links.len(), 2);

    let links = media_characters::Entity::find()
        .order_by_asc(media_characters::Column::CharacterId)
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].media_type, "Anime");
    assert_eq!(links[0].role, 0);
    assert_eq!(links[1].role, 1);

    let casts = castings::Entity::find()
        .order_by_asc(castings::Column::Id)
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(casts.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(casts.iter().all(|c| c.role == "Producer" && c.language == "En"));
}

#[tokio::test]
async fn test_empty_description_map_writes_nothing() {
    let store = test_store().await;

    let mut blank = anime_json(
        "1",
        "cowboy-bebop",
        vec![character("spike", "MAIN")],
        &["1"],
    );
    blank["description"] = json!({});

    let source = ScriptedSource::with_pages(vec![page(vec![blank], None)]);

    let config = test_config(1);
    let mut ctx = PipelineContext::new();
    let summary = ImportPipeline::new(&source, &store, &config)
        .run(&mut ctx)
        .await
        .unwrap();

    assert_eq!(summary.filter.missing_description, 1);
    assert_eq!(summary.filter.accepted, 0);
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.media_attempted, 0);
    assert!(summary.skips.is_empty());
    assert_eq!(ctx.ids.media_allocated(), 0);

    let conn = &store.conn;
    assert!(anime::Entity::find().all(conn).await.unwrap().is_empty());
    assert!(anime_genres::Entity::find().all(conn).await.unwrap().is_empty());
    assert!(characters::Entity::find().all(conn).await.unwrap().is_empty());
    assert!(anime_characters::Entity::find().all(conn).await.unwrap().is_empty());
    assert!(media_characters::Entity::find().all(conn).await.unwrap().is_empty());
    assert!(castings::Entity::find().all(conn).await.unwrap().is_empty());
    assert!(categories::Entity::find().all(conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_genre_failures_are_isolated() {
    let store = test_store().await;
    let source = ScriptedSource::with_pages(vec![page(
        vec![anime_json("1", "cowboy-bebop", vec![], &["3", "3", "action", "5"])],
        None,
    )]);

    let config = test_config(1);
    let summary = ImportPipeline::new(&source, &store, &config)
        .run(&mut PipelineContext::new())
        .await
        .unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.genres_written, 2);
    assert_eq!(summary.skips.len(), 2);
    assert!(summary.skips.iter().all(|s| s.entity == EntityKind::Genre));
    assert!(matches!(
        summary.skips[1].error,
        LoadError::Transform(TransformError::InvalidId { kind: "genre", .. })
    ));

    let genres = anime_genres::Entity::find()
        .order_by_asc(anime_genres::Column::GenreId)
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(
        genres.iter().map(|g| (g.anime_id, g.genre_id)).collect::<Vec<_>>(),
        vec![(0, 3), (0, 5)]
    );
}

#[tokio::test]
async fn test_failed_media_leaves_an_id_gap() {
    let store = test_store().await;
    let source = ScriptedSource::with_pages(vec![page(
        vec![
            anime_json("1", "cowboy-bebop", vec![character("spike", "MAIN")], &[]),
            anime_json("2", "cowboy-bebop", vec![character("faye", "MAIN")], &["1"]),
            anime_json("3", "trigun", vec![character("vash", "MAIN")], &[]),
        ],
        None,
    )]);

    let config = test_config(1);
    let summary = ImportPipeline::new(&source, &store, &config)
        .run(&mut PipelineContext::new())
        .await
        .unwrap();

    assert_eq!(summary.media_attempted, 3);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.media_ids, vec![MediaId::new(0), MediaId::new(2)]);
    assert_eq!(summary.skips.len(), 1);
    assert_eq!(summary.skips[0].entity, EntityKind::Media);
    assert!(matches!(summary.skips[0].error, LoadError::Database(_)));

    let media = anime::Entity::find()
        .order_by_asc(anime::Column::Id)
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(media.iter().map(|m| m.id).collect::<Vec<_>>(), vec![0, 2]);

    // The failed node's characters were never attempted, so no id was spent.
    let cast = characters::Entity::find()
        .order_by_asc(characters::Column::Id)
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(
        cast.iter()
            .map(|c| (c.id, c.primary_media_id))
            .collect::<Vec<_>>(),
        vec![(1, 0), (2, 2)]
    );
    assert!(anime_genres::Entity::find().all(&store.conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_character_chain_failures_keep_sequence() {
    let store = test_store().await;
    let source = ScriptedSource::with_pages(vec![page(
        vec![anime_json(
            "1",
            "cowboy-bebop",
            vec![
                character("spike", "MAIN"),
                character("spike", "MAIN"),
                character("faye", "VILLAIN"),
                character("jet", "RECURRING"),
            ],
            &[],
        )],
        None,
    )]);

    let config = test_config(1);
    let mut ctx = PipelineContext::new();
    let summary = ImportPipeline::new(&source, &store, &config)
        .run(&mut ctx)
        .await
        .unwrap();

    assert_eq!(summary.characters_written, 2);
    assert_eq!(ctx.ids.characters_allocated(), 4);
    assert_eq!(
        summary
            .skips
            .iter()
            .map(|s| (s.entity, s.identifier.as_str()))
            .collect::<Vec<_>>(),
        vec![
            (EntityKind::Character, "spike"),
            (EntityKind::AnimeCharacter, "faye")
        ]
    );

    let cast = characters::Entity::find()
        .order_by_asc(characters::Column::Id)
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(cast.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 3, 4]);

    let casts = castings::Entity::find()
        .order_by_asc(castings::Column::Id)
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(casts.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 4]);

    let links = media_characters::Entity::find().all(&store.conn).await.unwrap();
    assert_eq!(links.len(), 2);
}

#[tokio::test]
async fn test_fetch_error_aborts_before_loading() {
    let store = test_store().await;
    let source = ScriptedSource::with_pages(vec![
        page(
            vec![anime_json("1", "cowboy-bebop", vec![], &[])],
            Some("c1"),
        ),
        Err(KitsuError::GraphQl("rate limited".to_string())),
    ]);

    let config = test_config(3);
    let mut ctx = PipelineContext::new();
    let result = ImportPipeline::new(&source, &store, &config)
        .run(&mut ctx)
        .await;

    assert!(matches!(
        result,
        Err(ImportError::Source(KitsuError::GraphQl(_)))
    ));
    assert_eq!(ctx.pages_fetched, 1);
    assert_eq!(source.requested_cursors(), vec!["", "c1"]);
    assert!(anime::Entity::find().all(&store.conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_paging_stops_when_catalog_is_exhausted() {
    let store = test_store().await;
    let source = ScriptedSource::with_pages(vec![page(
        vec![anime_json("1", "cowboy-bebop", vec![], &[])],
        Some("c1"),
    )]);

    let config = test_config(5);
    let mut ctx = PipelineContext::new();
    let summary = ImportPipeline::new(&source, &store, &config)
        .run(&mut ctx)
        .await
        .unwrap();

    assert!(ctx.exhausted);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(source.requested_cursors(), vec!["", "c1"]);
    assert_eq!(summary.imported, 1);
}

#[tokio::test]
async fn test_categories_are_loaded_first() {
    let store = test_store().await;

    let category = |slug: &str, parent: Option<&str>| -> CategoryNode {
        serde_json::from_value(json!({
            "slug": slug,
            "createdAt": "2017-05-31T06:38:27Z",
            "updatedAt": "2017-05-31T06:38:27Z",
            "children": { "totalCount": 1 },
            "parent": parent.map(|id| json!({ "id": id })),
            "isNsfw": false,
            "title": { "en": slug },
            "description": { "en": format!("{slug} shows") }
        }))
        .unwrap()
    };

    let source = ScriptedSource {
        categories: vec![
            category("action", None),
            category("broken", Some("not-a-number")),
            category("space", Some("0")),
        ],
        ..ScriptedSource::default()
    };

    let mut config = test_config(1);
    config.import.import_categories = true;
    let mut ctx = PipelineContext::new();
    let summary = ImportPipeline::new(&source, &store, &config)
        .run(&mut ctx)
        .await
        .unwrap();

    assert_eq!(summary.categories_written, 2);
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.skips.len(), 1);
    assert_eq!(summary.skips[0].entity, EntityKind::Category);
    assert_eq!(summary.skips[0].identifier, "broken");

    let rows = categories::Entity::find()
        .order_by_asc(categories::Column::Id)
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(
        rows.iter()
            .map(|c| (c.id, c.slug.as_str(), c.parent_id))
            .collect::<Vec<_>>(),
        vec![(0, "action", None), (2, "space", Some(0))]
    );
    assert_eq!(rows[1].description, json!("space shows"));

    // Category ids do not share a counter with media or characters.
    assert_eq!(ctx.ids.media_allocated(), 0);
    assert_eq!(ctx.ids.next_character_id(), CharacterId::new(1));
}
