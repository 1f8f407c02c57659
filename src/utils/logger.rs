use chrono::{DateTime, Local};
use log::{LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use thiserror::Error;

/// 同じ行がこの回数続いたらまとめて 1 行出す
const REPEAT_FLUSH_THRESHOLD: u32 = 10;

/// serenity / tungstenite のゲートウェイ心拍などは捨てる
static NOISY_TARGETS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["tungstenite", "hyper", "rustls", "h2", "reqwest"]);
static NOISY_PATTERNS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["do_heartbeat", "recv_event", "recv;", "heartbeat ack"]);

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to set logger: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}

#[derive(Debug, Default)]
struct RepeatState {
    file: Option<File>,
    last_line: Option<String>,
    repeats: u32,
}

pub struct BotLogger {
    level: LevelFilter,
    state: Mutex<RepeatState>,
}

impl BotLogger {
    pub fn new(level: LevelFilter, log_file: Option<&str>) -> Result<Self, std::io::Error> {
        let file = log_file
            .map(|path| OpenOptions::new().create(true).append(true).open(path))
            .transpose()?;

        Ok(Self {
            level,
            state: Mutex::new(RepeatState {
                file,
                ..Default::default()
            }),
        })
    }

    pub fn init(level: LevelFilter, log_file: Option<&str>) -> Result<(), LoggerError> {
        let logger = Self::new(level, log_file)?;
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(level);
        Ok(())
    }

    fn is_noise(record: &Record) -> bool {
        let target = record.target();
        if NOISY_TARGETS.iter().any(|t| target.starts_with(t)) {
            return true;
        }
        let message = record.args().to_string();
        NOISY_PATTERNS.iter().any(|p| message.contains(p))
    }

    /// 比較用の本文 (時刻なし)
    fn body(record: &Record) -> String {
        format!("[{}] {}: {}", record.level(), record.target(), record.args())
    }

    fn stamp(now: DateTime<Local>, body: &str) -> String {
        format!("{} {}", now.format("%Y-%m-%d %H:%M:%S"), body)
    }

    fn emit(state: &mut RepeatState, line: &str) {
        println!("{}", line);
        if let Some(file) = state.file.as_mut() {
            if let Err(e) = writeln!(file, "{}", line) {
                eprintln!("ログファイルへの書き込みに失敗: {}", e);
            }
        }
    }

    fn flush_repeats(state: &mut RepeatState) {
        if state.repeats > 0 {
            let summary = Self::stamp(
                Local::now(),
                &format!("(直前のメッセージが {} 回繰り返されました)", state.repeats),
            );
            Self::emit(state, &summary);
            state.repeats = 0;
        }
    }

    /// 出力すべきなら true。連続した同一行はカウントだけ進める。
    fn record_line(state: &mut RepeatState, body: String) -> bool {
        if state.last_line.as_deref() == Some(body.as_str()) {
            state.repeats = state.repeats.saturating_add(1);
            if state.repeats >= REPEAT_FLUSH_THRESHOLD {
                Self::flush_repeats(state);
            }
            return false;
        }

        Self::flush_repeats(state);
        state.last_line = Some(body);
        true
    }
}

impl Log for BotLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) || Self::is_noise(record) {
            return;
        }

        let body = Self::body(record);
        let Ok(mut state) = self.state.lock() else {
            eprintln!("{}", body);
            return;
        };

        if Self::record_line(&mut state, body.clone()) {
            let line = Self::stamp(Local::now(), &body);
            Self::emit(&mut state, &line);
        }
    }

    fn flush(&self) {
        if let Ok(mut state) = self.state.lock() {
            Self::flush_repeats(&mut state);
            if let Some(file) = state.file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_logger_without_file() {
        assert!(BotLogger::new(LevelFilter::Info, None).is_ok());
    }

    #[test]
    fn test_logger_with_file() {
        let path = std::env::temp_dir().join("sekai_guild_bot_logger_test.log");
        let path = path.to_string_lossy().to_string();
        let logger = BotLogger::new(LevelFilter::Info, Some(&path)).unwrap();
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("sekai_guild_bot")
                .args(format_args!("written to file"))
                .build(),
        );
        logger.flush();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[INFO] sekai_guild_bot: written to file"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_logger_counts_repeats() {
        let logger = BotLogger::new(LevelFilter::Info, None).unwrap();
        for _ in 0..6 {
            logger.log(
                &Record::builder()
                    .level(Level::Info)
                    .target("sekai_guild_bot")
                    .args(format_args!("same line"))
                    .build(),
            );
        }

        let state = logger.state.lock().unwrap();
        assert_eq!(
            state.last_line.as_deref(),
            Some("[INFO] sekai_guild_bot: same line")
        );
        assert_eq!(state.repeats, 5);
    }

    #[test]
    fn test_repeats_reset_after_threshold() {
        let mut state = RepeatState::default();
        assert!(BotLogger::record_line(&mut state, "a".into()));
        for _ in 0..REPEAT_FLUSH_THRESHOLD {
            assert!(!BotLogger::record_line(&mut state, "a".into()));
        }
        assert_eq!(state.repeats, 0);
        assert!(BotLogger::record_line(&mut state, "b".into()));
    }

    #[test]
    fn test_level_filter() {
        let logger = BotLogger::new(LevelFilter::Warn, None).unwrap();
        let info = Metadata::builder().level(Level::Info).build();
        let error = Metadata::builder().level(Level::Error).build();
        assert!(!logger.enabled(&info));
        assert!(logger.enabled(&error));
    }

    #[test]
    fn test_noise_is_dropped() {
        assert!(BotLogger::is_noise(
            &Record::builder()
                .level(Level::Info)
                .target("tungstenite::protocol")
                .args(format_args!("anything"))
                .build()
        ));
        assert!(BotLogger::is_noise(
            &Record::builder()
                .level(Level::Info)
                .target("serenity::gateway")
                .args(format_args!("do_heartbeat sent"))
                .build()
        ));
        assert!(!BotLogger::is_noise(
            &Record::builder()
                .level(Level::Info)
                .target("sekai_guild_bot")
                .args(format_args!("ready"))
                .build()
        ));
    }
}
