use crate::bot::reply::say_ephemeral;
use crate::bot::{Context, Error};

/// 毎時のリマインドを設定します
#[poise::command(slash_command, subcommands("taki_start", "taki_end"), subcommand_required)]
pub async fn taki(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// このチャンネルでリマインドを開始します
#[poise::command(slash_command, rename = "s")]
pub async fn taki_start(ctx: Context<'_>) -> Result<(), Error> {
    let reminders = &ctx.data().reminders;
    if !reminders.subscribe(ctx.channel_id()) {
        return say_ephemeral(ctx, "このチャンネルではすでにリマインドが有効です。").await;
    }
    log::info!("リマインド登録: {}", ctx.channel_id());
    ctx.say(format!(
        "リマインドを開始しました。毎時{}分にお知らせします。",
        reminders.target_minute()
    ))
    .await?;
    Ok(())
}

/// このチャンネルのリマインドを終了します
#[poise::command(slash_command, rename = "e")]
pub async fn taki_end(ctx: Context<'_>) -> Result<(), Error> {
    if !ctx.data().reminders.unsubscribe(ctx.channel_id()) {
        return say_ephemeral(ctx, "このチャンネルではリマインドが登録されていません。").await;
    }
    log::info!("リマインド解除: {}", ctx.channel_id());
    ctx.say("リマインドを終了しました。").await?;
    Ok(())
}
