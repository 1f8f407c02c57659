use poise::serenity_prelude::MessageId;

/// Discord のエポック (2015-01-01T00:00:00Z) のミリ秒
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;
/// Bulk Delete API は 14 日より古いメッセージを受け付けない
pub const BULK_DELETE_MAX_AGE_MS: u64 = 14 * 24 * 60 * 60 * 1000;
pub const MAX_PURGE: u8 = 100;

pub fn clamp_count(requested: i64) -> u8 {
    requested.clamp(1, i64::from(MAX_PURGE)) as u8
}

pub fn snowflake_created_ms(id: u64) -> u64 {
    (id >> 22) + DISCORD_EPOCH_MS
}

/// 一括削除できる (14 日以内の) メッセージだけを残す
pub fn bulk_deletable(ids: &[MessageId], now_ms: u64) -> Vec<MessageId> {
    let threshold = now_ms.saturating_sub(BULK_DELETE_MAX_AGE_MS);
    ids.iter()
        .copied()
        .filter(|id| snowflake_created_ms(id.get()) >= threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_at(ms: u64) -> MessageId {
        MessageId::new((ms - DISCORD_EPOCH_MS) << 22 | 1)
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(-5), 1);
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(50), 50);
        assert_eq!(clamp_count(100), 100);
        assert_eq!(clamp_count(250), 100);
    }

    #[test]
    fn test_snowflake_timestamp() {
        // Discord ドキュメントの例: 175928847299117063 → 2016-04-30T11:18:25.796Z
        assert_eq!(snowflake_created_ms(175928847299117063), 1_462_015_105_796);
    }

    #[test]
    fn test_bulk_deletable_filters_old_messages() {
        let now = 1_800_000_000_000;
        let day = 24 * 60 * 60 * 1000;
        let fresh = id_at(now - day);
        let edge = id_at(now - 14 * day);
        let stale = id_at(now - 15 * day);

        let kept = bulk_deletable(&[fresh, stale, edge], now);
        assert_eq!(kept, vec![fresh, edge]);
        assert!(bulk_deletable(&[stale], now).is_empty());
    }
}
