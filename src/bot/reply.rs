use crate::bot::{Context, Error};
use crate::utils::pagination::nav_components;
use poise::CreateReply;

pub async fn say_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}

/// 1 ページ目をボタン付きで送り、残りのページはメッセージ ID に紐付けて保持する。
/// pages が空なら何も送らない (呼び出し側で「結果なし」を返すこと)。
pub async fn send_paginated(ctx: Context<'_>, pages: Vec<String>) -> Result<(), Error> {
    let Some(first) = pages.first().cloned() else {
        return Ok(());
    };
    let total = pages.len();
    let pending_key = ctx.id();
    let store = &ctx.data().pages;
    store.stage(pending_key, pages);

    let reply = CreateReply::default()
        .content(first)
        .components(nav_components(0, total));
    let handle = ctx.send(reply).await?;

    // メッセージ作成イベント側で先にコミットされていれば何も起きない
    match handle.message().await {
        Ok(message) => {
            store.commit(pending_key, message.id);
        }
        Err(e) => log::warn!("送信したページのメッセージ ID を取得できませんでした: {}", e),
    }
    Ok(())
}
