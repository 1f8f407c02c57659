use crate::bot::reply::say_ephemeral;
use crate::bot::{Context, Error};
use crate::utils::purge::{MAX_PURGE, bulk_deletable, clamp_count};
use poise::serenity_prelude::{GetMessages, MessageId};

/// このチャンネルの最新メッセージをまとめて削除します
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_MESSAGES",
    required_bot_permissions = "MANAGE_MESSAGES"
)]
pub async fn purge(
    ctx: Context<'_>,
    #[description = "削除したいメッセージ数 (1-100)"]
    #[min = 1]
    #[max = 100]
    count: i64,
) -> Result<(), Error> {
    let count = clamp_count(count);
    let channel_id = ctx.channel_id();
    ctx.defer_ephemeral().await?;

    let http = ctx.serenity_context();
    let messages = match channel_id
        .messages(http, GetMessages::new().limit(count))
        .await
    {
        Ok(messages) => messages,
        Err(e) => {
            log::error!("チャンネル {} のメッセージ取得に失敗: {}", channel_id, e);
            return say_ephemeral(ctx, "メッセージの取得に失敗しました。").await;
        }
    };

    let ids: Vec<MessageId> = messages.iter().map(|m| m.id).collect();
    let now_ms = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
    let targets = bulk_deletable(&ids, now_ms);
    if targets.is_empty() {
        return say_ephemeral(ctx, "14日以内に削除できるメッセージがありません。").await;
    }

    match channel_id.delete_messages(http, targets.iter().copied()).await {
        Ok(()) => {
            log::info!(
                "チャンネル {} で {} 件を削除しました (要求 {} / 上限 {})",
                channel_id,
                targets.len(),
                count,
                MAX_PURGE
            );
            say_ephemeral(ctx, format!("{}件のメッセージを削除しました。", targets.len())).await
        }
        Err(e) => {
            log::error!("チャンネル {} の一括削除に失敗: {}", channel_id, e);
            say_ephemeral(ctx, "メッセージの削除に失敗しました。権限を確認してください。").await
        }
    }
}
