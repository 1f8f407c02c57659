use crate::models::types::MonitorBinding;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use poise::serenity_prelude::ChannelId;
use regex::Regex;

static ROOM_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("room code pattern is valid"));

/// 投稿全体がちょうど 5 桁の数字なら部屋番号として返す
pub fn parse_room_code(content: &str) -> Option<&str> {
    ROOM_CODE.is_match(content).then_some(content)
}

pub fn voice_channel_name(code: &str) -> String {
    format!("部屋番号【{}】", code)
}

pub fn notify_channel_name(code: &str) -> String {
    format!("🔒│【{}】", code)
}

/// "<#123>" / "#123" / "123" → ChannelId
pub fn parse_channel_id(input: &str) -> Option<ChannelId> {
    let mut s = input.trim();
    if let Some(inner) = s.strip_prefix("<#").and_then(|rest| rest.strip_suffix('>')) {
        s = inner;
    }
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>()
        .ok()
        .filter(|&id| id != 0)
        .map(ChannelId::new)
}

/// テキストチャンネルごとの監視設定
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    bindings: DashMap<ChannelId, MonitorBinding>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の設定は上書きされる
    pub fn start(&self, binding: MonitorBinding) -> Option<MonitorBinding> {
        self.bindings.insert(binding.text_channel_id, binding)
    }

    pub fn end(&self, text_channel_id: ChannelId) -> Option<MonitorBinding> {
        self.bindings
            .remove(&text_channel_id)
            .map(|(_, binding)| binding)
    }

    pub fn get(&self, text_channel_id: ChannelId) -> Option<MonitorBinding> {
        self.bindings.get(&text_channel_id).map(|b| *b)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
