pub mod commands;
pub mod data;
pub mod handler;
pub mod reply;

use poise::CreateReply;
use poise::serenity_prelude::GatewayIntents;

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, data::BotData, Error>;
pub type Command = poise::Command<data::BotData, Error>;

pub const GENERIC_FAILURE: &str = "処理中にエラーが発生しました。時間をおいて再度お試しください。";

pub fn commands() -> Vec<Command> {
    vec![
        commands::calc::calc(),
        commands::purge::purge(),
        commands::roomid::roomid(),
        commands::checkrole::checkrole(),
        commands::taki::taki(),
        commands::efficiency::efficiency(),
        commands::help::help(),
    ]
}

/// メンバー一覧は REST で取得するので GUILD_MEMBERS (特権) は要求しない
pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
}

pub async fn on_error(error: poise::FrameworkError<'_, data::BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            log::error!("起動処理に失敗しました: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            log::error!("コマンド `{}` の実行中にエラー: {:?}", ctx.command().name, error);
            let reply = CreateReply::default().content(GENERIC_FAILURE).ephemeral(true);
            if let Err(why) = ctx.send(reply).await {
                log::error!("エラーメッセージの送信に失敗: {}", why);
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            log::error!("イベント {} の処理中にエラー: {:?}", event.snake_case_name(), error);
        }
        other => {
            if let Err(why) = poise::builtins::on_error(other).await {
                log::error!("エラー処理中にさらにエラー: {}", why);
            }
        }
    }
}
