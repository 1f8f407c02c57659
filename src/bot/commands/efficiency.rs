use crate::bot::reply::say_ephemeral;
use crate::bot::{Context, Error};
use crate::models::types::SongRecord;
use crate::utils::catalog::SongCatalog;
use poise::CreateReply;
use poise::serenity_prelude::{self as serenity, CreateEmbed};

pub const NO_MATCH_CHOICE: &str = "一致する曲が見つかりません";
pub const UNKNOWN_DIFFICULTY: &str = "情報なし";
const EMBED_COLOUR: u32 = 0x33CCBB;

/// 入力途中の文字列 → (表示名, 値) の候補
pub fn title_choices(catalog: &SongCatalog, partial: &str) -> Vec<(String, String)> {
    let matches = catalog.search(partial);
    if matches.is_empty() {
        return vec![(NO_MATCH_CHOICE.to_string(), partial.to_string())];
    }
    matches
        .into_iter()
        .map(|song| (song.title.clone(), song.title.clone()))
        .collect()
}

async fn autocomplete_title(
    ctx: Context<'_>,
    partial: &str,
) -> impl Iterator<Item = serenity::AutocompleteChoice> {
    let choices = match &ctx.data().catalog {
        Some(catalog) => title_choices(catalog, partial),
        None => Vec::new(),
    };
    choices
        .into_iter()
        .map(|(name, value)| serenity::AutocompleteChoice::new(name, value))
}

pub fn difficulty_label(song: &SongRecord) -> &str {
    song.priority
        .first()
        .map(String::as_str)
        .filter(|label| !label.trim().is_empty())
        .unwrap_or(UNKNOWN_DIFFICULTY)
}

/// 楽曲名から効率難易度とジャケット画像を表示します
#[poise::command(slash_command)]
pub async fn efficiency(
    ctx: Context<'_>,
    #[description = "楽曲名（日本語 / ローマ字 どちらでも可）"]
    #[autocomplete = "autocomplete_title"]
    title: String,
) -> Result<(), Error> {
    let query = title.trim();
    if query.is_empty() {
        return say_ephemeral(ctx, "楽曲名が指定されていません。").await;
    }
    let Some(catalog) = &ctx.data().catalog else {
        return say_ephemeral(
            ctx,
            "楽曲データが読み込まれていないため、現在この機能は使えません。",
        )
        .await;
    };

    match catalog.lookup(query).as_slice() {
        [] => say_ephemeral(ctx, format!("**{}** が見つかりませんでした。", query)).await,
        [song] => {
            let embed = CreateEmbed::new()
                .title(&song.title)
                .description(format!("**効率難易度** : {}", difficulty_label(song)))
                .image(song.jacket_url())
                .colour(EMBED_COLOUR);
            ctx.send(CreateReply::default().embed(embed)).await?;
            Ok(())
        }
        candidates => say_ephemeral(ctx, candidate_list(query, candidates)).await,
    }
}

fn candidate_list(query: &str, candidates: &[&SongRecord]) -> String {
    let mut out = format!("**{}** に一致する曲が複数あります:\n", query);
    for song in candidates {
        out.push_str("- ");
        out.push_str(&song.title);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: u64, title: &str, pronunciation: &str, priority: &[&str]) -> SongRecord {
        SongRecord {
            id,
            title: title.into(),
            pronunciation: pronunciation.into(),
            asset_bundle_name: format!("jacket_s_{:03}", id),
            music_tag: vec![],
            compromise: vec![],
            priority: priority.iter().map(|s| s.to_string()).collect(),
            encore: vec![],
        }
    }

    fn catalog() -> SongCatalog {
        SongCatalog::from_songs(vec![
            song(1, "Tell Your World", "てるゆあわーるど", &["S"]),
            song(2, "ロキ", "ろき", &[]),
            song(3, "ヒバナ", "ひばな", &[""]),
        ])
    }

    #[test]
    fn test_title_choices_use_title_as_value() {
        let choices = title_choices(&catalog(), "ろ");
        assert_eq!(choices, vec![("ロキ".to_string(), "ロキ".to_string())]);
    }

    #[test]
    fn test_title_choices_placeholder_keeps_input() {
        let choices = title_choices(&catalog(), "存在しない");
        assert_eq!(
            choices,
            vec![(NO_MATCH_CHOICE.to_string(), "存在しない".to_string())]
        );
    }

    #[test]
    fn test_title_choices_empty_input() {
        assert_eq!(title_choices(&catalog(), "").len(), 3);
    }

    #[test]
    fn test_difficulty_label() {
        let catalog = catalog();
        let found = catalog.lookup("tell your world");
        assert_eq!(difficulty_label(found[0]), "S");
        assert_eq!(difficulty_label(catalog.lookup("ロキ")[0]), UNKNOWN_DIFFICULTY);
        assert_eq!(difficulty_label(catalog.lookup("ひばな")[0]), UNKNOWN_DIFFICULTY);
    }

    #[test]
    fn test_candidate_list() {
        let a = song(1, "A", "a", &[]);
        let b = song(2, "B", "b", &[]);
        assert_eq!(candidate_list("x", &[&a, &b]), "**x** に一致する曲が複数あります:\n- A\n- B\n");
    }
}
