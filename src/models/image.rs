use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage tag written for every asset the importer produces.
pub const STORE_TAG: &str = "store";

/// Shrine-style image attachment as stored in `*_image_data` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: String,
    pub storage: String,
    pub metadata: ImageMetadata,
    pub derivates: BTreeMap<String, ImageDerivative>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDerivative {
    pub id: String,
    pub storage: String,
    pub metadata: ImageMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: Option<i32>,
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurhash: Option<String>,
}
