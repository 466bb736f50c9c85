use crate::db::to_json;
use crate::domain::EnumTable;
use crate::entities::{anime_characters, castings, characters, media_characters};
use crate::models::{Casting, Character, MediaCharacter};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};

pub struct CharacterRepository {
    conn: DatabaseConnection,
}

impl CharacterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, character: &Character) -> Result<(), DbErr> {
        let active_model = characters::ActiveModel {
            id: Set(character.id.value()),
            name: Set(character.name.clone()),
            canonical_name: Set(character.canonical_name.clone()),
            slug: Set(character.slug.clone()),
            names: Set(character.names.clone()),
            description: Set(character.description.clone()),
            image_data: Set(character.image.as_ref().map(to_json).transpose()?),
            primary_media_id: Set(character.primary_media_id.value()),
            primary_media_type: Set(character.primary_media_type.clone()),
            created_at: Set(character.created_at),
            updated_at: Set(character.updated_at),
        };

        characters::Entity::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn insert_anime_link(&self, link: &MediaCharacter) -> Result<(), DbErr> {
        let active_model = anime_characters::ActiveModel {
            anime_id: Set(link.media_id.value()),
            character_id: Set(link.character_id.value()),
            role: Set(link.role.code()),
            created_at: Set(link.created_at),
            updated_at: Set(link.updated_at),
        };

        anime_characters::Entity::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn insert_media_link(&self, link: &MediaCharacter) -> Result<(), DbErr> {
        let active_model = media_characters::ActiveModel {
            media_id: Set(link.media_id.value()),
            media_type: Set(link.media_type.clone()),
            character_id: Set(link.character_id.value()),
            role: Set(link.role.code()),
            created_at: Set(link.created_at),
            updated_at: Set(link.updated_at),
        };

        media_characters::Entity::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn insert_casting(&self, casting: &Casting) -> Result<(), DbErr> {
        let active_model = castings::ActiveModel {
            id: Set(casting.id),
            media_id: Set(casting.media_id.value()),
            media_type: Set(casting.media_type.clone()),
            character_id: Set(casting.character_id.value()),
            role: Set(casting.role.clone()),
            voice_actor: Set(casting.voice_actor),
            featured: Set(casting.featured),
            language: Set(casting.language.clone()),
            created_at: Set(casting.created_at),
            updated_at: Set(casting.updated_at),
        };

        castings::Entity::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }
}
