use crate::bot::reply::say_ephemeral;
use crate::bot::{Context, Error};
use crate::models::types::MonitorBinding;
use crate::utils::monitor::parse_channel_id;
use poise::serenity_prelude::ChannelId;

/// 部屋番号の監視を設定します
#[poise::command(
    slash_command,
    guild_only,
    subcommands("roomid_start", "roomid_end"),
    subcommand_required
)]
pub async fn roomid(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// このテキストチャンネルに投稿された 5 桁の部屋番号を監視します
#[poise::command(slash_command, rename = "start")]
pub async fn roomid_start(
    ctx: Context<'_>,
    #[description = "番号を設定したいボイスチャンネルID"] voice_channel_id: String,
    #[description = "番号変更を通知するテキストチャンネルID"] notify_channel_id: String,
) -> Result<(), Error> {
    let binding = match build_binding(ctx.channel_id(), &voice_channel_id, &notify_channel_id) {
        Ok(binding) => binding,
        Err(message) => return say_ephemeral(ctx, message).await,
    };

    if ctx.data().monitors.start(binding).is_some() {
        log::info!("チャンネル {} の監視設定を上書きしました", binding.text_channel_id);
    }
    log::info!(
        "監視開始: text={} voice={} notify={} (監視中 {} チャンネル)",
        binding.text_channel_id,
        binding.voice_channel_id,
        binding.notify_channel_id,
        ctx.data().monitors.len()
    );

    ctx.say(format!(
        "このチャンネルでの部屋番号監視を開始しました。\nボイスチャンネル: <#{}>\n通知先: <#{}>",
        binding.voice_channel_id, binding.notify_channel_id
    ))
    .await?;
    Ok(())
}

/// このテキストチャンネルの監視を終了します
#[poise::command(slash_command, rename = "end")]
pub async fn roomid_end(ctx: Context<'_>) -> Result<(), Error> {
    match ctx.data().monitors.end(ctx.channel_id()) {
        Some(binding) => {
            log::info!("監視終了: text={}", binding.text_channel_id);
            ctx.say("このチャンネルでの部屋番号監視を終了しました。").await?;
            Ok(())
        }
        None => say_ephemeral(ctx, "このチャンネルは監視されていません。").await,
    }
}

fn build_binding(
    text_channel_id: ChannelId,
    voice_input: &str,
    notify_input: &str,
) -> Result<MonitorBinding, &'static str> {
    let voice_channel_id =
        parse_channel_id(voice_input).ok_or("ボイスチャンネルIDが正しくありません。")?;
    let notify_channel_id =
        parse_channel_id(notify_input).ok_or("通知先チャンネルIDが正しくありません。")?;
    Ok(MonitorBinding {
        text_channel_id,
        voice_channel_id,
        notify_channel_id,
    })
}
