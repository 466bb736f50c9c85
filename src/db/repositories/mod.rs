pub mod category;
pub mod character;
pub mod media;
