use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "anime")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(unique)]
    pub slug: String,
    pub age_rating: Option<i32>,
    pub age_rating_guide: Option<String>,
    pub subtype: i32,
    pub episode_count: Option<i32>,
    pub episode_count_guess: Option<i32>,
    pub episode_length: Option<i32>,
    pub total_length: Option<i32>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub description: Json,
    pub youtube_video_id: Option<String>,
    pub titles: String,
    pub canonical_title: String,
    pub original_locale: Option<String>,
    pub average_rating: Option<f64>,
    pub user_count: i32,
    pub popularity_rank: Option<i32>,
    pub rating_rank: Option<i32>,
    pub favorites_count: i32,
    pub tba: Option<String>,
    pub origin_languages: Json,
    pub origin_countries: Json,
    pub poster_image_data: Option<Json>,
    pub cover_image_data: Option<Json>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
