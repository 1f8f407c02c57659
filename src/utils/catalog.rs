use crate::models::types::SongRecord;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// オートコンプリートの上限 (Discord 側の制限)
pub const MAX_MATCHES: usize = 25;
/// 入力が空のときに出す件数
pub const DEFAULT_SUGGESTIONS: usize = 5;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// musicDifficulty.json をメモリに保持し、曲名・読みで引けるようにしたもの
#[derive(Debug, Default)]
pub struct SongCatalog {
    songs: Vec<SongRecord>,
    by_title: HashMap<String, usize>,
    by_pronunciation: HashMap<String, usize>,
}

impl SongCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let songs: Vec<SongRecord> = serde_json::from_str(&content)?;
        Ok(Self::from_songs(songs))
    }

    pub fn from_songs(songs: Vec<SongRecord>) -> Self {
        let mut by_title = HashMap::with_capacity(songs.len());
        let mut by_pronunciation = HashMap::with_capacity(songs.len());
        for (i, song) in songs.iter().enumerate() {
            // 同じキーは先に出てきた曲を優先
            by_title.entry(song.title.to_lowercase()).or_insert(i);
            by_pronunciation
                .entry(song.pronunciation.to_lowercase())
                .or_insert(i);
        }

        Self {
            songs,
            by_title,
            by_pronunciation,
        }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// 曲名 → 読みの順で完全一致 (大文字小文字は無視)
    pub fn find_exact(&self, query: &str) -> Option<&SongRecord> {
        let key = query.trim().to_lowercase();
        self.by_title
            .get(&key)
            .or_else(|| self.by_pronunciation.get(&key))
            .map(|&i| &self.songs[i])
    }

    /// 曲名・読みの部分一致。データセット順で最大 25 件。
    pub fn search(&self, query: &str) -> Vec<&SongRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.songs.iter().take(DEFAULT_SUGGESTIONS).collect();
        }

        self.songs
            .iter()
            .filter(|song| {
                song.title.to_lowercase().contains(&needle)
                    || song.pronunciation.to_lowercase().contains(&needle)
            })
            .take(MAX_MATCHES)
            .collect()
    }

    /// 完全一致があればその 1 件、無ければ部分一致の候補
    pub fn lookup(&self, query: &str) -> Vec<&SongRecord> {
        match self.find_exact(query) {
            Some(song) => vec![song],
            None => self.search(query),
        }
    }
}
