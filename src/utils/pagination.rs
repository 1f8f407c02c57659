use crate::models::types::{NavDirection, PaginationState};
use dashmap::DashMap;
use poise::serenity_prelude::{ButtonStyle, CreateActionRow, CreateButton, MessageId};
use std::time::{Duration, Instant};

/// ページ送りボタンの custom_id 名前空間
pub const NAV_PREFIX: &str = "page:";
pub const NAV_PREV_ID: &str = "page:prev";
pub const NAV_NEXT_ID: &str = "page:next";

/// コミットされずに残った仮登録を捨てるまでの時間
pub const PENDING_TTL: Duration = Duration::from_secs(15 * 60);
/// 送信済みメッセージのページ状態を保持する時間 (過ぎたボタンは期限切れ扱い)
pub const COMMITTED_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    pub index: usize, // 1 始まり
    pub total: usize,
    pub lines: &'a [String],
}

/// 行を page_size 件ずつのページに分割する。行が無ければページも無い。
pub fn paginate(lines: &[String], page_size: usize) -> Vec<Page<'_>> {
    let page_size = page_size.max(1);
    let total = lines.len().div_ceil(page_size);
    lines
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| Page {
            index: i + 1,
            total,
            lines: chunk,
        })
        .collect()
}

pub fn render_pages<F>(lines: &[String], page_size: usize, render: F) -> Vec<String>
where
    F: Fn(&Page<'_>) -> String,
{
    paginate(lines, page_size).iter().map(render).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavControls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl NavControls {
    /// current は 0 始まり
    pub fn for_page(current: usize, total: usize) -> Self {
        Self {
            prev_enabled: current > 0,
            next_enabled: current + 1 < total,
        }
    }

    pub fn action_row(&self) -> CreateActionRow {
        CreateActionRow::Buttons(vec![
            CreateButton::new(NAV_PREV_ID)
                .label("◀ 前へ")
                .style(ButtonStyle::Primary)
                .disabled(!self.prev_enabled),
            CreateButton::new(NAV_NEXT_ID)
                .label("次へ ▶")
                .style(ButtonStyle::Primary)
                .disabled(!self.next_enabled),
        ])
    }
}

pub fn nav_components(current: usize, total: usize) -> Vec<CreateActionRow> {
    vec![NavControls::for_page(current, total).action_row()]
}

/// advance の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub content: String,
    pub index: usize, // 0 始まり
    pub total: usize,
}

#[derive(Debug)]
struct StagedPages {
    pages: Vec<String>,
    staged_at: Instant,
}

#[derive(Debug)]
struct CommittedPages {
    state: PaginationState,
    committed_at: Instant,
}

/// 送信済みメッセージ ID → ページ状態。
///
/// メッセージ ID は返信を送るまで分からないので、まずインタラクション ID で
/// `stage` し、ID が判明した時点で `commit` する。
/// どちらの表も古いエントリは次の `stage` / `commit` で捨てる。
#[derive(Debug)]
pub struct PaginationStore {
    staged: DashMap<u64, StagedPages>,
    committed: DashMap<MessageId, CommittedPages>,
    pending_ttl: Duration,
    committed_ttl: Duration,
}

impl Default for PaginationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationStore {
    pub fn new() -> Self {
        Self::with_ttls(PENDING_TTL, COMMITTED_TTL)
    }

    pub fn with_ttls(pending_ttl: Duration, committed_ttl: Duration) -> Self {
        Self {
            staged: DashMap::new(),
            committed: DashMap::new(),
            pending_ttl,
            committed_ttl,
        }
    }

    pub fn stage(&self, pending_key: u64, pages: Vec<String>) {
        self.evict_expired_staged();
        self.staged.insert(
            pending_key,
            StagedPages {
                pages,
                staged_at: Instant::now(),
            },
        );
    }

    /// 仮登録をメッセージ ID へ移す。仮登録が無ければ何もしない。
    pub fn commit(&self, pending_key: u64, message_id: MessageId) -> bool {
        match self.staged.remove(&pending_key) {
            Some((_, staged)) => {
                self.evict_expired_committed();
                self.committed.insert(
                    message_id,
                    CommittedPages {
                        state: PaginationState::new(staged.pages),
                        committed_at: Instant::now(),
                    },
                );
                true
            }
            None => false,
        }
    }

    pub fn advance(&self, message_id: MessageId, direction: NavDirection) -> Option<PageView> {
        let mut entry = self.committed.get_mut(&message_id)?;
        let state = &mut entry.state;
        let last = state.page_count().saturating_sub(1);
        state.current_page = match direction {
            NavDirection::Prev => state.current_page.saturating_sub(1),
            NavDirection::Next => (state.current_page + 1).min(last),
        };

        let content = state.pages.get(state.current_page)?.clone();
        Some(PageView {
            content,
            index: state.current_page,
            total: state.page_count(),
        })
    }

    #[cfg(test)]
    fn is_staged(&self, pending_key: u64) -> bool {
        self.staged.contains_key(&pending_key)
    }

    pub fn tracked_messages(&self) -> usize {
        self.committed.len()
    }

    fn evict_expired_committed(&self) {
        let ttl = self.committed_ttl;
        let before = self.committed.len();
        self.committed
            .retain(|_, pages| pages.committed_at.elapsed() < ttl);
        let evicted = before.saturating_sub(self.committed.len());
        if evicted > 0 {
            log::info!("期限切れのページ送りを {} 件破棄しました", evicted);
        }
    }

    fn evict_expired_staged(&self) {
        let ttl = self.pending_ttl;
        let before = self.staged.len();
        self.staged.retain(|_, staged| staged.staged_at.elapsed() < ttl);
        let evicted = before.saturating_sub(self.staged.len());
        if evicted > 0 {
            log::info!("期限切れのページ仮登録を {} 件破棄しました", evicted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {}", i)).collect()
    }

    #[test]
    fn test_paginate_page_count() {
        for (n, expected) in [(0, 0), (1, 1), (8, 1), (9, 2), (16, 2), (17, 3), (100, 13)] {
            let input = lines(n);
            let pages = paginate(&input, 8);
            assert_eq!(pages.len(), expected, "n = {}", n);
            assert!(pages.iter().all(|p| p.total == expected));
        }
    }

    #[test]
    fn test_paginate_preserves_order() {
        let input = lines(21);
        let pages = paginate(&input, 8);
        let rejoined: Vec<String> = pages.iter().flat_map(|p| p.lines.to_vec()).collect();
        assert_eq!(rejoined, input);
        assert_eq!(
            pages.iter().map(|p| p.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(pages[2].lines.len(), 5);
    }

    #[test]
    fn test_render_pages() {
        let input = lines(3);
        let pages = render_pages(&input, 2, |p| format!("{}/{}:{}", p.index, p.total, p.lines.join(",")));
        assert_eq!(pages, vec!["1/2:line 0,line 1", "2/2:line 2"]);
    }

    #[test]
    fn test_nav_controls() {
        assert_eq!(
            NavControls::for_page(0, 3),
            NavControls { prev_enabled: false, next_enabled: true }
        );
        assert_eq!(
            NavControls::for_page(1, 3),
            NavControls { prev_enabled: true, next_enabled: true }
        );
        assert_eq!(
            NavControls::for_page(2, 3),
            NavControls { prev_enabled: true, next_enabled: false }
        );
        assert_eq!(
            NavControls::for_page(0, 1),
            NavControls { prev_enabled: false, next_enabled: false }
        );
    }

    #[test]
    fn test_stage_commit_advance() {
        let store = PaginationStore::new();
        let message_id = MessageId::new(1001);
        store.stage(7, vec!["p0".into(), "p1".into(), "p2".into()]);
        assert!(store.is_staged(7));

        assert!(store.commit(7, message_id));
        assert!(!store.is_staged(7));

        let view = store.advance(message_id, NavDirection::Next).unwrap();
        assert_eq!(view.index, 1);
        assert_eq!(view.content, "p1");
        assert_eq!(view.total, 3);
    }

    #[test]
    fn test_commit_unstaged_key_is_noop() {
        let store = PaginationStore::new();
        assert!(!store.commit(99, MessageId::new(5)));
        assert_eq!(store.tracked_messages(), 0);
        assert!(store.advance(MessageId::new(5), NavDirection::Next).is_none());
    }

    #[test]
    fn test_advance_clamps_both_ends() {
        let store = PaginationStore::new();
        let message_id = MessageId::new(42);
        store.stage(1, vec!["a".into(), "b".into()]);
        store.commit(1, message_id);

        let view = store.advance(message_id, NavDirection::Prev).unwrap();
        assert_eq!(view.index, 0);
        assert_eq!(view.content, "a");

        store.advance(message_id, NavDirection::Next);
        let view = store.advance(message_id, NavDirection::Next).unwrap();
        assert_eq!(view.index, 1);
        assert_eq!(view.content, "b");
    }

    #[test]
    fn test_second_commit_is_noop() {
        let store = PaginationStore::new();
        store.stage(3, vec!["x".into(), "y".into()]);
        assert!(store.commit(3, MessageId::new(10)));
        assert!(!store.commit(3, MessageId::new(11)));
        assert!(store.advance(MessageId::new(11), NavDirection::Next).is_none());
    }

    #[test]
    fn test_expired_stage_is_evicted() {
        let store = PaginationStore::with_ttls(Duration::ZERO, COMMITTED_TTL);
        store.stage(1, vec!["a".into()]);
        store.stage(2, vec!["b".into()]);
        assert!(!store.is_staged(1));
        assert!(store.is_staged(2));
    }

    #[test]
    fn test_expired_commit_is_evicted() {
        let store = PaginationStore::with_ttls(PENDING_TTL, Duration::ZERO);
        let old = MessageId::new(100);
        let new = MessageId::new(200);
        store.stage(1, vec!["a".into(), "b".into()]);
        assert!(store.commit(1, old));
        assert_eq!(store.tracked_messages(), 1);

        store.stage(2, vec!["c".into(), "d".into()]);
        assert!(store.commit(2, new));
        assert_eq!(store.tracked_messages(), 1);
        assert!(store.advance(old, NavDirection::Next).is_none());
        assert_eq!(store.advance(new, NavDirection::Next).unwrap().content, "d");
    }

    #[test]
    fn test_fresh_commits_are_kept() {
        let store = PaginationStore::new();
        for key in 1..=3 {
            store.stage(key, vec!["x".into()]);
            store.commit(key, MessageId::new(key));
        }
        assert_eq!(store.tracked_messages(), 3);
    }
}
