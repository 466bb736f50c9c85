pub mod category;
pub mod character;
pub mod image;
pub mod media;

pub use category::Category;
pub use character::{Casting, Character, MediaCharacter};
pub use image::{ImageAsset, ImageDerivative, ImageMetadata};
pub use media::{MediaGenre, MediaRecord};
