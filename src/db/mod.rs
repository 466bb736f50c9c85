use crate::config::DatabaseConfig;
use crate::models::{Casting, Category, Character, MediaCharacter, MediaGenre, MediaRecord};
use anyhow::{Context, Result};
use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
    Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::prelude::*;

pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::connect(&DatabaseConfig {
            url: db_url.to_string(),
            ..DatabaseConfig::default()
        })
        .await
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if let Some(path_str) = config.url.strip_prefix("sqlite:")
            && !path_str.starts_with(":memory:")
        {
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let timeout = Duration::from_secs(config.connect_timeout_seconds);
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(timeout)
            .acquire_timeout(timeout)
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        let store = Self { conn };
        store.ping().await.context("Database did not answer ping")?;

        info!(
            "Database connected (pool: {}-{})",
            config.min_connections, config.max_connections
        );

        Ok(store)
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Creates the import tables if they do not exist yet. Parents are
    /// created before the join tables that reference them.
    pub async fn create_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let statements: Vec<TableCreateStatement> = vec![
            create_table(&schema, Anime),
            create_table(&schema, Categories),
            create_table(&schema, Characters),
            create_table(&schema, AnimeGenres),
            create_table(&schema, AnimeCharacters),
            create_table(&schema, MediaCharacters),
            create_table(&schema, Castings),
        ];

        for statement in &statements {
            self.conn.execute(backend.build(statement)).await?;
        }

        info!("Import schema ensured ({} tables)", statements.len());
        Ok(())
    }

    fn media_repo(&self) -> repositories::media::MediaRepository {
        repositories::media::MediaRepository::new(self.conn.clone())
    }

    fn category_repo(&self) -> repositories::category::CategoryRepository {
        repositories::category::CategoryRepository::new(self.conn.clone())
    }

    fn character_repo(&self) -> repositories::character::CharacterRepository {
        repositories::character::CharacterRepository::new(self.conn.clone())
    }

    pub async fn insert_category(&self, category: &Category) -> Result<(), DbErr> {
        self.category_repo().insert(category).await
    }

    pub async fn insert_media(&self, media: &MediaRecord) -> Result<(), DbErr> {
        self.media_repo().insert(media).await
    }

    pub async fn insert_media_genre(&self, link: MediaGenre) -> Result<(), DbErr> {
        self.media_repo().insert_genre(link).await
    }

    pub async fn insert_character(&self, character: &Character) -> Result<(), DbErr> {
        self.character_repo().insert(character).await
    }

    pub async fn insert_anime_character(&self, link: &MediaCharacter) -> Result<(), DbErr> {
        self.character_repo().insert_anime_link(link).await
    }

    pub async fn insert_media_character(&self, link: &MediaCharacter) -> Result<(), DbErr> {
        self.character_repo().insert_media_link(link).await
    }

    pub async fn insert_casting(&self, casting: &Casting) -> Result<(), DbErr> {
        self.character_repo().insert_casting(casting).await
    }
}

fn create_table<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    schema
        .create_table_from_entity(entity)
        .if_not_exists()
        .to_owned()
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, DbErr> {
    serde_json::to_value(value).map_err(|e| DbErr::Json(e.to_string()))
}
