use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub order: i64,
    #[serde(rename = "default")]
    pub is_default: bool,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Manga {
    pub id: i64,
    pub title: String,
    pub thumbnail_url: String,
    pub author: String,
    pub artist: String,
    pub description: String,
    pub status: String,
    pub in_library: bool,
}
