use crate::bot::reply::{say_ephemeral, send_paginated};
use crate::bot::{Context, Error};
use crate::utils::pagination::{Page, render_pages};
use poise::serenity_prelude::{Role, RoleId, UserId};

pub const MEMBER_PAGE_SIZE: usize = 20;
/// 1 回の API 呼び出しで取れる上限
pub const MEMBER_FETCH_LIMIT: u64 = 1000;

/// 表示名の判定に必要な分だけ取り出したメンバー情報
#[derive(Debug, Clone, Copy)]
pub struct MemberEntry<'a> {
    pub nick: Option<&'a str>,
    pub user_name: &'a str,
    pub roles: &'a [RoleId],
}

/// 指定したロールを持つメンバーを一覧表示します
#[poise::command(slash_command, guild_only)]
pub async fn checkrole(
    ctx: Context<'_>,
    #[description = "メンバーを確認したいロール"] role: Role,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return say_ephemeral(ctx, "このコマンドはサーバー内でのみ使用できます。").await;
    };
    ctx.defer().await?;

    let members = match guild_id
        .members(ctx.serenity_context(), Some(MEMBER_FETCH_LIMIT), None::<UserId>)
        .await
    {
        Ok(members) => members,
        Err(e) => {
            log::error!("ギルド {} のメンバー取得に失敗: {}", guild_id, e);
            ctx.say("メンバー取得に失敗しました。権限や環境を確認してください。")
                .await?;
            return Ok(());
        }
    };

    let entries: Vec<MemberEntry<'_>> = members
        .iter()
        .map(|member| MemberEntry {
            nick: member.nick.as_deref(),
            user_name: &member.user.name,
            roles: &member.roles,
        })
        .collect();
    let lines = holder_lines(&entries, role.id);
    if lines.is_empty() {
        ctx.say(format!("ロール **{}** を持つメンバーはいません。", role.name))
            .await?;
        return Ok(());
    }

    let member_count = lines.len();
    let pages = render_pages(&lines, MEMBER_PAGE_SIZE, |page| {
        render_member_page(&role.name, member_count, page)
    });
    send_paginated(ctx, pages).await
}

/// ロールを持つメンバーを "- 表示名" の行にする (ニックネーム優先)
pub fn holder_lines(entries: &[MemberEntry<'_>], role_id: RoleId) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| entry.roles.contains(&role_id))
        .map(|entry| format!("- {}", entry.nick.unwrap_or(entry.user_name)))
        .collect()
}

pub fn render_member_page(role_name: &str, member_count: usize, page: &Page<'_>) -> String {
    format!(
        "**ロール**: {} | **メンバー数**: {} | Page {}/{}\n```\n{}\n```",
        role_name,
        member_count,
        page.index,
        page.total,
        page.lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::pagination::paginate;

    #[test]
    fn test_holder_lines_prefer_nickname() {
        let staff = RoleId::new(10);
        let other = RoleId::new(20);
        let both = [staff, other];
        let only_staff = [staff];
        let only_other = [other];
        let entries = [
            MemberEntry { nick: Some("みく"), user_name: "miku", roles: &both },
            MemberEntry { nick: None, user_name: "rin", roles: &only_staff },
            MemberEntry { nick: Some("レン"), user_name: "len", roles: &only_other },
        ];

        assert_eq!(holder_lines(&entries, staff), vec!["- みく", "- rin"]);
        assert_eq!(holder_lines(&entries, other), vec!["- みく", "- レン"]);
        assert!(holder_lines(&entries, RoleId::new(30)).is_empty());
    }

    #[test]
    fn test_member_pages() {
        let lines: Vec<String> = (0..45).map(|i| format!("- user{}", i)).collect();
        let pages = paginate(&lines, MEMBER_PAGE_SIZE);
        assert_eq!(pages.len(), 3);

        let last = render_member_page("運営", 45, &pages[2]);
        assert!(last.starts_with("**ロール**: 運営 | **メンバー数**: 45 | Page 3/3"));
        assert!(last.contains("- user40\n"));
        assert!(last.ends_with("- user44\n```"));
    }
}
