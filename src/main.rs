mod bot;
mod models;
mod utils;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use poise::serenity_prelude as serenity;

use crate::bot::data::BotData;
use crate::utils::catalog::SongCatalog;
use crate::utils::config::{self, BotConfig, SyncConfig};
use crate::utils::logger::BotLogger;
use crate::utils::{difficulty_sync, health};

#[derive(Debug, Parser)]
#[command(name = "sekai-guild-bot", version, about = "プロセカ向けサーバー管理 Bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum CliCommand {
    /// Bot とヘルスチェック用 HTTP サーバーを起動する (既定)
    Run,
    /// 効率表を取り込んで musicDifficulty.json を更新する
    SyncDifficulty,
}

#[tokio::main]
async fn main() -> Result<(), bot::Error> {
    let cli = Cli::parse();
    let dotenv_results = config::load_dotenv();

    if let Err(e) = BotLogger::init(
        config::log_level_from_env(),
        config::log_file_from_env().as_deref(),
    ) {
        eprintln!("ロガーの初期化に失敗: {}", e);
    }
    for result in dotenv_results {
        match result {
            Ok(path) => log::info!("{} を読み込みました", path),
            Err((path, e)) => log::warn!("{} の読み込みに失敗: {}", path, e),
        }
    }

    match cli.command.unwrap_or(CliCommand::Run) {
        CliCommand::Run => run_bot().await,
        CliCommand::SyncDifficulty => {
            let sync_config = SyncConfig::from_env()?;
            difficulty_sync::run(&sync_config).await?;
            Ok(())
        }
    }
}

async fn run_bot() -> Result<(), bot::Error> {
    let bot_config = BotConfig::from_env()?;

    let catalog = match SongCatalog::load(&bot_config.music_db_path) {
        Ok(catalog) if catalog.is_empty() => {
            log::warn!(
                "{} に楽曲がありません。/efficiency は候補を返しません",
                bot_config.music_db_path.display()
            );
            Some(catalog)
        }
        Ok(catalog) => {
            log::info!("楽曲データを {} 件読み込みました", catalog.len());
            Some(catalog)
        }
        Err(e) => {
            log::warn!(
                "{} を読み込めませんでした。/efficiency は無効になります: {}",
                bot_config.music_db_path.display(),
                e
            );
            None
        }
    };
    let data = BotData::new(catalog, bot_config.reminder_minute);

    let port = bot_config.port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port).await {
            log::error!("HTTP サーバーが停止しました: {}", e);
        }
    });
    if let Some(deploy_url) = bot_config.deploy_url.clone() {
        health::spawn_self_ping(deploy_url);
    }

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: bot::commands(),
            on_error: |error| Box::pin(bot::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(bot::handler::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                log::info!("{} が起動しました", ready.user.name);
                let guild_ids = bot::handler::guild_ids(&ready.guilds);
                bot::handler::register_commands(ctx, &framework.options().commands, &guild_ids)
                    .await;
                data.reminders.spawn_loop(ctx.http.clone());
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&bot_config.discord_token, bot::gateway_intents())
        .framework(framework)
        .await
        .map_err(|e| anyhow!("Discord クライアントの作成に失敗: {}", e))?;

    let shard_manager = client.shard_manager.clone();
    tokio::select! {
        result = client.start() => {
            result.map_err(|e| anyhow!("Bot の起動に失敗: {}", e))?;
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("終了シグナルを受信しました。シャットダウンします");
            shard_manager.shutdown_all().await;
        }
    }

    Ok(())
}
