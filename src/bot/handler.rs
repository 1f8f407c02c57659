use crate::bot::data::BotData;
use crate::bot::{Command, Error};
use crate::models::types::{MonitorBinding, NavDirection};
use crate::utils::monitor::{notify_channel_name, parse_room_code, voice_channel_name};
use crate::utils::pagination::{NAV_PREFIX, nav_components};
use poise::serenity_prelude as serenity;
use serenity::{
    ComponentInteraction, CreateInteractionResponse, CreateInteractionResponseMessage,
    EditChannel, FullEvent, Interaction,
};

pub const EXPIRED_PAGES: &str =
    "このページ送りは期限切れです。もう一度コマンドを実行してください。";

/// ボタン押下の行き先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRoute {
    Navigate(NavDirection),
}

/// custom_id → ルート。知らない ID は None (無視する)。
pub fn route_component(custom_id: &str) -> Option<ComponentRoute> {
    match custom_id.strip_prefix(NAV_PREFIX)? {
        "prev" => Some(ComponentRoute::Navigate(NavDirection::Prev)),
        "next" => Some(ComponentRoute::Navigate(NavDirection::Next)),
        _ => None,
    }
}

/// スラッシュコマンドとオートコンプリートは poise がコマンド名で振り分けるので、
/// ここではそれ以外のイベントだけを扱う。
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            log::info!(
                "{} としてログインしました ({} ギルド)",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }
        FullEvent::GuildCreate { guild, is_new } => {
            if *is_new == Some(true) {
                log::info!("新しいギルドに参加しました: {} ({})", guild.name, guild.id);
                register_commands(ctx, &framework.options().commands, &[guild.id]).await;
            }
        }
        FullEvent::Message { new_message } => {
            if new_message.author.id == framework.bot_id {
                commit_from_echo(new_message, data);
            } else if !new_message.author.bot {
                handle_room_code(ctx, new_message, data).await;
            }
        }
        FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } => {
            if let Some(route) = route_component(&component.data.custom_id) {
                match route {
                    ComponentRoute::Navigate(direction) => {
                        navigate(ctx, component, data, direction).await?
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn guild_ids(guilds: &[serenity::UnavailableGuild]) -> Vec<serenity::GuildId> {
    guilds.iter().map(|guild| guild.id).collect()
}

/// 各ギルドへ順番に登録する。失敗したギルドはログだけ残して続行。
pub async fn register_commands(
    ctx: &serenity::Context,
    commands: &[Command],
    guild_ids: &[serenity::GuildId],
) {
    for &guild_id in guild_ids {
        match poise::builtins::register_in_guild(ctx, commands, guild_id).await {
            Ok(()) => log::info!("ギルド {} に {} 個のコマンドを登録しました", guild_id, commands.len()),
            Err(e) => log::error!("ギルド {} へのコマンド登録に失敗: {}", guild_id, e),
        }
    }
}

/// Bot 自身の返信が届いたら、元のインタラクション ID で仮登録されたページを確定する
fn commit_from_echo(message: &serenity::Message, data: &BotData) {
    if let Some(interaction) = &message.interaction {
        if data.pages.commit(interaction.id.get(), message.id) {
            log::debug!(
                "メッセージ {} のページ送りを確定しました (保持中 {} 件)",
                message.id,
                data.pages.tracked_messages()
            );
        }
    }
}

async fn handle_room_code(ctx: &serenity::Context, message: &serenity::Message, data: &BotData) {
    let Some(binding) = data.monitors.get(message.channel_id) else {
        return;
    };
    let Some(code) = parse_room_code(&message.content) else {
        return;
    };

    log::info!("部屋番号 {} を検出しました (チャンネル {})", code, message.channel_id);
    if let Err(e) = apply_room_code(ctx, &binding, code).await {
        log::error!("部屋番号の反映に失敗: {}", e);
    }
}

async fn apply_room_code(
    ctx: &serenity::Context,
    binding: &MonitorBinding,
    code: &str,
) -> Result<(), serenity::Error> {
    let voice_name = voice_channel_name(code);
    binding
        .voice_channel_id
        .edit(ctx, EditChannel::new().name(&voice_name))
        .await?;
    binding
        .notify_channel_id
        .edit(ctx, EditChannel::new().name(notify_channel_name(code)))
        .await?;
    binding
        .notify_channel_id
        .say(ctx, format!("ボイスチャンネルを{}に変更しました。", voice_name))
        .await?;
    Ok(())
}

async fn navigate(
    ctx: &serenity::Context,
    component: &ComponentInteraction,
    data: &BotData,
    direction: NavDirection,
) -> Result<(), Error> {
    let response = match data.pages.advance(component.message.id, direction) {
        Some(view) => CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .content(view.content)
                .components(nav_components(view.index, view.total)),
        ),
        None => CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(EXPIRED_PAGES)
                .ephemeral(true),
        ),
    };
    component.create_response(ctx, response).await?;
    Ok(())
}
