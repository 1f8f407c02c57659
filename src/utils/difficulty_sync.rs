//! musicDifficulty.json を再生成するオフラインツール。
//!
//! 楽曲マスタ・タグ・効率表 (Google スプレッドシート) を取得して既存ファイルとマージする。
//! 効率値が空の曲だけ、効率表の行を曲名で突き合わせて埋める
//! (完全一致 → 正規化後一致 → 類似度 0.8 以上の最良候補)。

use crate::models::types::SongRecord;
use crate::utils::config::SyncConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const SHEET_NAME: &str = "効率表";
pub const SHEET_RANGE: &str = "B1:F";
pub const MIN_SIMILARITY: f64 = 0.8;

static GVIZ_PAYLOAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"setResponse\(([\s\S]+?)\);").expect("gviz pattern is valid"));

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("スプレッドシートの形式が想定外です")]
    UnexpectedSheetFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicInfo {
    pub id: u64,
    pub title: String,
    pub pronunciation: String,
    #[serde(rename = "assetbundleName")]
    pub asset_bundle_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicTag {
    pub music_id: u64,
    pub music_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EfficiencyRow {
    pub title: String,
    pub compromise: String,
    pub priority: String,
    pub encore: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub missing_before: usize,
    pub missing_after: usize,
}

/// gviz の JSONP 応答から行を取り出す (先頭行は見出しなので捨てる)
pub fn parse_gviz(body: &str) -> Result<Vec<EfficiencyRow>, SyncError> {
    let payload = GVIZ_PAYLOAD
        .captures(body)
        .and_then(|c| c.get(1))
        .ok_or(SyncError::UnexpectedSheetFormat)?;
    let data: Value = serde_json::from_str(payload.as_str())?;
    let rows = data
        .pointer("/table/rows")
        .and_then(Value::as_array)
        .ok_or(SyncError::UnexpectedSheetFormat)?;

    Ok(rows
        .iter()
        .skip(1)
        .map(|row| {
            let cell = |i: usize| cell_text(row.get("c").and_then(|c| c.get(i)));
            EfficiencyRow {
                title: cell(0),
                compromise: cell(1),
                priority: cell(2),
                encore: cell(4),
            }
        })
        .collect())
}

fn cell_text(cell: Option<&Value>) -> String {
    match cell.and_then(|c| c.get("v")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub fn normalize(s: &str) -> String {
    s.nfkc().collect::<String>().trim().to_lowercase()
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// 1 - 編集距離 / 長い方の文字数
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// 曲名で引ける効率表。同名の行は後のもので上書きし、順序は最初に出た位置を保つ。
#[derive(Debug, Default)]
pub struct EfficiencyTable {
    rows: Vec<EfficiencyRow>,
    by_title: HashMap<String, usize>,
}

impl EfficiencyTable {
    pub fn new(rows: Vec<EfficiencyRow>) -> Self {
        let mut table = Self::default();
        for row in rows {
            match table.by_title.get(&row.title) {
                Some(&i) => table.rows[i] = row,
                None => {
                    table.by_title.insert(row.title.clone(), table.rows.len());
                    table.rows.push(row);
                }
            }
        }
        table
    }

    pub fn find(&self, title: &str) -> Option<&EfficiencyRow> {
        if let Some(&i) = self.by_title.get(title) {
            return Some(&self.rows[i]);
        }

        let wanted = normalize(title);
        if let Some(row) = self.rows.iter().find(|r| normalize(&r.title) == wanted) {
            return Some(row);
        }

        let mut best: Option<(&EfficiencyRow, f64)> = None;
        for row in &self.rows {
            let score = similarity(&wanted, &normalize(&row.title));
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((row, score));
            }
        }
        best.filter(|(_, score)| *score >= MIN_SIMILARITY)
            .map(|(row, _)| row)
    }
}

/// 楽曲マスタを基準に既存データと効率表をマージする
pub fn merge(
    musics: &[MusicInfo],
    tags: &[MusicTag],
    table: &EfficiencyTable,
    existing: &[SongRecord],
) -> (Vec<SongRecord>, SyncStats) {
    let mut tag_map: HashMap<u64, Vec<String>> = HashMap::new();
    for tag in tags {
        tag_map
            .entry(tag.music_id)
            .or_default()
            .push(tag.music_tag.clone());
    }
    let existing: HashMap<&str, &SongRecord> =
        existing.iter().map(|s| (s.title.as_str(), s)).collect();

    let mut stats = SyncStats::default();
    let merged = musics
        .iter()
        .map(|music| {
            let mut record = SongRecord {
                id: music.id,
                title: music.title.clone(),
                pronunciation: music.pronunciation.clone(),
                asset_bundle_name: music.asset_bundle_name.clone(),
                music_tag: tag_map.get(&music.id).cloned().unwrap_or_default(),
                compromise: Vec::new(),
                priority: Vec::new(),
                encore: Vec::new(),
            };

            if let Some(prev) = existing.get(music.title.as_str()) {
                record.compromise = prev.compromise.clone();
                record.priority = prev.priority.clone();
                record.encore = prev.encore.clone();
                if prev.compromise.is_empty() {
                    stats.missing_before += 1;
                }
            }

            if record.compromise.is_empty() {
                match table.find(&music.title) {
                    Some(row) => {
                        record.compromise = vec![row.compromise.clone()];
                        record.priority = vec![row.priority.clone()];
                        record.encore = vec![row.encore.clone()];
                    }
                    None => {
                        stats.missing_after += 1;
                        log::info!("未登録のまま: {}", music.title);
                    }
                }
            }

            record
        })
        .collect();

    (merged, stats)
}

async fn fetch_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str) -> Result<T, SyncError> {
    Ok(client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<T>()
        .await?)
}

async fn fetch_efficiency(
    client: &reqwest::Client,
    spreadsheet_id: &str,
) -> Result<Vec<EfficiencyRow>, SyncError> {
    let url = format!("https://docs.google.com/spreadsheets/d/{}/gviz/tq", spreadsheet_id);
    let body = client
        .get(url)
        .query(&[("tqx", "out:json"), ("sheet", SHEET_NAME), ("range", SHEET_RANGE)])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_gviz(&body)
}

fn read_existing(path: &Path) -> Vec<SongRecord> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        log::warn!("既存の {} を読めなかったため作り直します: {}", path.display(), e);
        Vec::new()
    })
}

pub async fn run(config: &SyncConfig) -> Result<SyncStats, SyncError> {
    let client = reqwest::Client::new();
    let (musics, tags, sheet_rows) = tokio::try_join!(
        fetch_json::<Vec<MusicInfo>>(&client, &config.music_info_url),
        fetch_json::<Vec<MusicTag>>(&client, &config.music_tag_url),
        fetch_efficiency(&client, &config.spreadsheet_id),
    )?;
    log::info!(
        "取得完了: 楽曲 {} 件 / タグ {} 件 / 効率表 {} 行",
        musics.len(),
        tags.len(),
        sheet_rows.len()
    );

    let existing = read_existing(&config.music_db_path);
    let table = EfficiencyTable::new(sheet_rows);
    let (merged, stats) = merge(&musics, &tags, &table, &existing);

    std::fs::write(&config.music_db_path, serde_json::to_string_pretty(&merged)?)?;
    log::info!(
        "✔ 更新完了: 空だった効率値 {} 件 / 更新後も未登録 {} 件",
        stats.missing_before,
        stats.missing_after
    );
    Ok(stats)
}
