use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::utils::reminder::DEFAULT_REMINDER_MINUTE;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MUSIC_DB_PATH: &str = "./musicDifficulty.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("環境変数 {0} が設定されていません")]
    Missing(&'static str),
    #[error("環境変数 {name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// `.env.local` → `.env` の順に読み込み、読み込めたファイル名を返す。
/// ロガー初期化前に呼ぶので、ここではログを出さない。
pub fn load_dotenv() -> Vec<Result<&'static str, (&'static str, dotenvy::Error)>> {
    [".env.local", ".env"]
        .into_iter()
        .filter_map(|path| match dotenvy::from_filename(path) {
            Ok(_) => Some(Ok(path)),
            Err(e) if e.not_found() => None,
            Err(e) => Some(Err((path, e))),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub port: u16,
    pub deploy_url: Option<String>,
    pub music_db_path: PathBuf,
    pub reminder_minute: u32,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 取得関数を差し替え可能 (テスト用)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let reminder_minute = parse_or("REMINDER_MINUTE", get("REMINDER_MINUTE"), DEFAULT_REMINDER_MINUTE)?;
        if reminder_minute > 59 {
            return Err(ConfigError::Invalid {
                name: "REMINDER_MINUTE",
                value: reminder_minute.to_string(),
            });
        }

        Ok(Self {
            discord_token,
            port,
            deploy_url: get("DEPLOY_URL").map(|url| url.trim_end_matches('/').to_string()),
            music_db_path: get("MUSIC_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MUSIC_DB_PATH)),
            reminder_minute,
        })
    }
}

/// sync-difficulty 用の取得先
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub music_info_url: String,
    pub music_tag_url: String,
    pub spreadsheet_id: String,
    pub music_db_path: PathBuf,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            music_info_url: require("MUSIC_INFO_URL")?,
            music_tag_url: require("MUSIC_TAG_URL")?,
            spreadsheet_id: require("SPREADSHEET_ID")?,
            music_db_path: lookup("MUSIC_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MUSIC_DB_PATH)),
        })
    }
}

/// LOG_LEVEL (error/warn/info/debug/trace) → LevelFilter。未設定・不正値は info。
pub fn log_level_from_env() -> LevelFilter {
    env::var("LOG_LEVEL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

pub fn log_file_from_env() -> Option<String> {
    env::var("LOG_FILE").ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_bot_config_defaults() {
        let config = BotConfig::from_lookup(lookup_from(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.deploy_url.is_none());
        assert_eq!(config.music_db_path, PathBuf::from(DEFAULT_MUSIC_DB_PATH));
        assert_eq!(config.reminder_minute, 30);
    }

    #[test]
    fn test_bot_config_requires_token() {
        let err = BotConfig::from_lookup(lookup_from(&[("PORT", "9000")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DISCORD_TOKEN")));

        let err = BotConfig::from_lookup(lookup_from(&[("DISCORD_TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DISCORD_TOKEN")));
    }

    #[test]
    fn test_bot_config_overrides() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("PORT", "9000"),
            ("DEPLOY_URL", "https://example.deno.dev/"),
            ("MUSIC_DB_PATH", "/data/music.json"),
            ("REMINDER_MINUTE", "0"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.deploy_url.as_deref(), Some("https://example.deno.dev"));
        assert_eq!(config.music_db_path, PathBuf::from("/data/music.json"));
        assert_eq!(config.reminder_minute, 0);
    }

    #[test]
    fn test_bot_config_rejects_bad_values() {
        let err = BotConfig::from_lookup(lookup_from(&[("DISCORD_TOKEN", "abc"), ("PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("REMINDER_MINUTE", "60"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "REMINDER_MINUTE", .. }));
    }

    #[test]
    fn test_sync_config_requires_sources() {
        let err = SyncConfig::from_lookup(lookup_from(&[("MUSIC_INFO_URL", "a")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MUSIC_TAG_URL")));

        let config = SyncConfig::from_lookup(lookup_from(&[
            ("MUSIC_INFO_URL", "https://example.com/musics.json"),
            ("MUSIC_TAG_URL", "https://example.com/musicTags.json"),
            ("SPREADSHEET_ID", "sheet"),
        ]))
        .unwrap();
        assert_eq!(config.spreadsheet_id, "sheet");
        assert_eq!(config.music_db_path, PathBuf::from(DEFAULT_MUSIC_DB_PATH));
    }
}
