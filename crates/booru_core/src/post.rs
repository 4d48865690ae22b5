use serde::{Deserialize, Serialize};

use crate::Rating;

pub type PostId = u64;

/// One post as returned by the `post.json` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub score: i64,
    /// Single-letter rating code: `s`, `q` or `e`.
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub preview_url: String,
    #[serde(default)]
    pub preview_width: u32,
    #[serde(default)]
    pub preview_height: u32,
    pub sample_url: String,
    #[serde(default)]
    pub sample_width: u32,
    #[serde(default)]
    pub sample_height: u32,
    pub file_url: String,
    #[serde(default)]
    pub jpeg_url: Option<String>,
}

impl Post {
    pub fn rating(&self) -> Rating {
        Rating::from_code(&self.rating)
    }

    /// Width-over-height of the sample variant, `None` when the service
    /// reported no dimensions.
    pub fn sample_aspect_ratio(&self) -> Option<f64> {
        if self.sample_width == 0 || self.sample_height == 0 {
            return None;
        }
        Some(f64::from(self.sample_width) / f64::from(self.sample_height))
    }
}

/// Account record from `user.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: u64,
    pub name: String,
}
