pub use super::anime::Entity as Anime;
pub use super::anime_characters::Entity as AnimeCharacters;
pub use super::anime_genres::Entity as AnimeGenres;
pub use super::castings::Entity as Castings;
pub use super::categories::Entity as Categories;
pub use super::characters::Entity as Characters;
pub use super::media_characters::Entity as MediaCharacters;
