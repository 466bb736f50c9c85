use crate::entities::categories;
use crate::models::Category;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, category: &Category) -> Result<(), DbErr> {
        let active_model = categories::ActiveModel {
            id: Set(category.id.value()),
            title: Set(category.title.clone()),
            slug: Set(category.slug.clone()),
            parent_id: Set(category.parent_id),
            nsfw: Set(category.nsfw),
            child_count: Set(category.child_count),
            description: Set(category.description.clone()),
            created_at: Set(category.created_at),
            updated_at: Set(category.updated_at),
        };

        categories::Entity::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }
}
