use crate::db::to_json;
use crate::domain::EnumTable;
use crate::entities::{anime, anime_genres};
use crate::models::{MediaGenre, MediaRecord};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};

pub struct MediaRepository {
    conn: DatabaseConnection,
}

impl MediaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, media: &MediaRecord) -> Result<(), DbErr> {
        let active_model = anime::ActiveModel {
            id: Set(media.id.value()),
            slug: Set(media.slug.clone()),
            age_rating: Set(media.age_rating.map(EnumTable::code)),
            age_rating_guide: Set(media.age_rating_guide.clone()),
            subtype: Set(media.subtype.code()),
            episode_count: Set(media.episode_count),
            episode_count_guess: Set(media.episode_count),
            episode_length: Set(media.episode_length),
            total_length: Set(media.total_length),
            start_date: Set(media.start_date),
            end_date: Set(media.end_date),
            description: Set(media.description.clone()),
            youtube_video_id: Set(media.youtube_video_id.clone()),
            titles: Set(media.titles.clone()),
            canonical_title: Set(media.canonical_title.clone()),
            original_locale: Set(media.original_locale.clone()),
            average_rating: Set(media.average_rating),
            user_count: Set(media.user_count),
            popularity_rank: Set(media.popularity_rank),
            rating_rank: Set(media.rating_rank),
            favorites_count: Set(media.favorites_count),
            tba: Set(media.tba.clone()),
            origin_languages: Set(to_json(&media.origin_languages)?),
            origin_countries: Set(to_json(&media.origin_countries)?),
            poster_image_data: Set(media.poster_image.as_ref().map(to_json).transpose()?),
            cover_image_data: Set(media.cover_image.as_ref().map(to_json).transpose()?),
            created_at: Set(media.created_at),
            updated_at: Set(media.updated_at),
        };

        anime::Entity::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn insert_genre(&self, link: MediaGenre) -> Result<(), DbErr> {
        let active_model = anime_genres::ActiveModel {
            anime_id: Set(link.media_id.value()),
            genre_id: Set(link.genre_id),
        };

        anime_genres::Entity::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }
}
