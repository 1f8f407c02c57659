use std::sync::Arc;

use crate::utils::catalog::SongCatalog;
use crate::utils::monitor::MonitorRegistry;
use crate::utils::pagination::PaginationStore;
use crate::utils::reminder::ReminderService;

/// プロセス内だけの状態。再起動すると空に戻る。
pub struct BotData {
    pub pages: PaginationStore,
    pub monitors: MonitorRegistry,
    pub reminders: Arc<ReminderService>,
    /// 楽曲データを読めなかった場合は None (/efficiency だけが使えなくなる)
    pub catalog: Option<SongCatalog>,
}

impl BotData {
    pub fn new(catalog: Option<SongCatalog>, reminder_minute: u32) -> Self {
        Self {
            pages: PaginationStore::new(),
            monitors: MonitorRegistry::new(),
            reminders: Arc::new(ReminderService::new(reminder_minute)),
            catalog,
        }
    }
}
