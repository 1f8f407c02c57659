use chrono::{DateTime, FixedOffset, TimeZone, Timelike, Utc};
use dashmap::DashSet;
use poise::serenity_prelude::{ChannelId, Http};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub const REMINDER_MESSAGE: &str = "炊きましょう🔥";
pub const DEFAULT_REMINDER_MINUTE: u32 = 30;

const JST_OFFSET_SECS: i32 = 9 * 3600;

pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

pub fn to_jst<Tz: TimeZone>(time: DateTime<Tz>) -> DateTime<FixedOffset> {
    time.with_timezone(&jst())
}

/// 毎分の tick がこの時刻に当たったら送信する。取りこぼした分は補わない。
pub fn is_due(now: &DateTime<FixedOffset>, target_minute: u32) -> bool {
    now.minute() == target_minute
}

/// 次の hh:mm:00 までの待ち時間
pub fn until_next_minute<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let into_minute = Duration::from_secs(u64::from(now.second()))
        + Duration::from_nanos(u64::from(now.nanosecond().min(999_999_999)));
    Duration::from_secs(60).saturating_sub(into_minute)
}

/// 毎時リマインドを受け取るチャンネルの集合と送信ループ
#[derive(Debug)]
pub struct ReminderService {
    channels: DashSet<ChannelId>,
    target_minute: u32,
    started: AtomicBool,
}

impl Default for ReminderService {
    fn default() -> Self {
        Self::new(DEFAULT_REMINDER_MINUTE)
    }
}

impl ReminderService {
    pub fn new(target_minute: u32) -> Self {
        Self {
            channels: DashSet::new(),
            target_minute: target_minute.min(59),
            started: AtomicBool::new(false),
        }
    }

    pub fn target_minute(&self) -> u32 {
        self.target_minute
    }

    /// 新規登録なら true
    pub fn subscribe(&self, channel_id: ChannelId) -> bool {
        self.channels.insert(channel_id)
    }

    pub fn unsubscribe(&self, channel_id: ChannelId) -> bool {
        self.channels.remove(&channel_id).is_some()
    }

    #[cfg(test)]
    fn is_subscribed(&self, channel_id: ChannelId) -> bool {
        self.channels.contains(&channel_id)
    }

    pub fn channels(&self) -> Vec<ChannelId> {
        self.channels.iter().map(|c| *c).collect()
    }

    /// ループは 1 度だけ起動する。2 回目以降は false。
    pub fn spawn_loop(self: &Arc<Self>, http: Arc<Http>) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }
        let service = Arc::clone(self);
        tokio::spawn(async move { service.run(http).await });
        true
    }

    async fn run(self: Arc<Self>, http: Arc<Http>) {
        log::info!("リマインドループを開始しました (毎時 {} 分)", self.target_minute);
        tokio::time::sleep(until_next_minute(&Utc::now())).await;

        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let now = to_jst(Utc::now());
            if is_due(&now, self.target_minute) {
                self.broadcast(&http).await;
            }
        }
    }

    async fn broadcast(&self, http: &Http) {
        let channels = self.channels();
        if channels.is_empty() {
            return;
        }
        log::info!("リマインドを {} チャンネルへ送信します", channels.len());

        let sends = channels.into_iter().map(|channel_id| async move {
            if let Err(e) = channel_id.say(http, REMINDER_MESSAGE).await {
                log::error!("チャンネル {} へのリマインド送信に失敗: {}", channel_id, e);
            }
        });
        futures::future::join_all(sends).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_due_uses_tokyo_time() {
        // 2026-01-01 06:30:00 UTC = 15:30 JST
        let utc = Utc.with_ymd_and_hms(2026, 1, 1, 6, 30, 0).unwrap();
        assert!(is_due(&to_jst(utc), 30));

        // 21:00 UTC = 06:00 JST
        let utc = Utc.with_ymd_and_hms(2026, 1, 1, 21, 0, 0).unwrap();
        assert!(!is_due(&to_jst(utc), 30));
        assert!(is_due(&to_jst(utc), 0));
    }

    #[test]
    fn test_to_jst_shifts_hour() {
        let utc = Utc.with_ymd_and_hms(2026, 3, 31, 20, 15, 0).unwrap();
        let local = to_jst(utc);
        assert_eq!(local.hour(), 5);
        assert_eq!(local.minute(), 15);
    }

    #[test]
    fn test_until_next_minute() {
        let utc = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 45).unwrap();
        assert_eq!(until_next_minute(&utc), Duration::from_secs(15));

        let utc = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(until_next_minute(&utc), Duration::from_secs(60));
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let service = ReminderService::default();
        let channel = ChannelId::new(123);
        assert!(service.subscribe(channel));
        assert!(!service.subscribe(channel));
        assert!(service.is_subscribed(channel));
        assert_eq!(service.channels(), vec![channel]);

        assert!(service.unsubscribe(channel));
        assert!(!service.unsubscribe(channel));
        assert!(service.channels().is_empty());
    }

    #[test]
    fn test_target_minute_is_clamped() {
        assert_eq!(ReminderService::new(75).target_minute(), 59);
        assert_eq!(ReminderService::default().target_minute(), 30);
    }
}
