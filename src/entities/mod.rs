pub mod prelude;

pub mod anime;
pub mod anime_characters;
pub mod anime_genres;
pub mod castings;
pub mod categories;
pub mod characters;
pub mod media_characters;
