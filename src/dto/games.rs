use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::CatalogItemRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgdbCover {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgdbGenre {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgdbGame {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub cover: Option<IgdbCover>,
    #[serde(default)]
    pub genres: Option<Vec<IgdbGenre>>,
    /// Unix seconds.
    #[serde(default)]
    pub first_release_date: Option<i64>,
}

impl From<IgdbGame> for CatalogItemRef {
    fn from(game: IgdbGame) -> Self {
        CatalogItemRef {
            external_id: game.id.to_string(),
            title: game.name,
            cover_url: game.cover.map(|c| absolute_cover_url(&c.url)),
            genres: game
                .genres
                .unwrap_or_default()
                .into_iter()
                .map(|g| g.name)
                .collect(),
            release_date: game
                .first_release_date
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.date_naive()),
        }
    }
}

fn absolute_cover_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}
