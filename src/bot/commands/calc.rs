use crate::bot::reply::send_paginated;
use crate::bot::{Context, Error};
use crate::utils::pagination::render_pages;
use crate::utils::score_range::{render_lines, render_page};

pub const CALC_PAGE_SIZE: usize = 8;
pub const NO_RESULTS: &str = "条件に合う結果がありませんでした。";

/// 目標イベントポイントを稼げるスコア範囲を一覧表示します
#[poise::command(slash_command)]
pub async fn calc(
    ctx: Context<'_>,
    #[description = "目標のイベントポイント数 (例: 600)"] required_points: u32,
) -> Result<(), Error> {
    log::info!("/calc {} ({})", required_points, ctx.author().name);

    let pages = calc_pages(required_points);
    if pages.is_empty() {
        ctx.say(NO_RESULTS).await?;
        return Ok(());
    }
    send_paginated(ctx, pages).await
}

pub fn calc_pages(required_points: u32) -> Vec<String> {
    let lines = render_lines(required_points);
    render_pages(&lines, CALC_PAGE_SIZE, |page| {
        render_page(required_points, page.index, page.total, page.lines)
    })
}
