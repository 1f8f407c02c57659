use poise::serenity_prelude::ChannelId;
use serde::{Deserialize, Serialize};

/// 1 行分の計算結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRangeRow {
    pub bonus_percent: u16,   // 0 ~ 435
    pub consumption_tier: u8, // 炊き数 0 ~ 3
    pub score_min: u32,
    pub score_max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub pages: Vec<String>,
    pub current_page: usize,
}

impl PaginationState {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            current_page: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Prev,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorBinding {
    pub text_channel_id: ChannelId,
    pub voice_channel_id: ChannelId,
    pub notify_channel_id: ChannelId,
}

/// musicDifficulty.json の 1 エントリ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    pub id: u64,
    pub title: String,
    pub pronunciation: String,
    #[serde(rename = "assetbundleName")]
    pub asset_bundle_name: String,
    #[serde(default)]
    pub music_tag: Vec<String>,
    #[serde(default)]
    pub compromise: Vec<String>,
    #[serde(default)]
    pub priority: Vec<String>,
    #[serde(default)]
    pub encore: Vec<String>,
}

impl SongRecord {
    pub fn jacket_url(&self) -> String {
        format!(
            "https://storage.sekai.best/sekai-jp-assets/music/jacket/{0}/{0}.webp",
            self.asset_bundle_name
        )
    }
}
