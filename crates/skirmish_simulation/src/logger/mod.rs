//! Глобальный logger симуляции
//!
//! Один process-wide `LogPrinter` (консоль по умолчанию, хост может подменить
//! через `set_logger`). Timestamp добавляется здесь, printer получает готовую строку.
//!
//! Порог `LogLevel` проверяется до timestamp и printer'а. Строку собирает
//! вызывающий: в горячих системах (sweep, AI) debug идёт через `log_lazy`,
//! который не вызывает `format!` пока уровень выше Debug.

use once_cell::sync::Lazy;
use std::sync::Mutex;

static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

static LOGGER_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Info));

/// Уровень логирования (упорядочен: Debug < Info < Warning < Error)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Куда уходят строки лога (консоль, файл, host engine)
pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    if let Ok(mut slot) = LOGGER.lock() {
        *slot = Some(logger);
    }
}

pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    if let Ok(mut slot) = LOGGER.lock() {
        if slot.is_none() {
            *slot = Some(logger);
        }
    }
}

pub fn set_log_level(level: LogLevel) {
    if let Ok(mut current) = LOGGER_LEVEL.lock() {
        *current = level;
    }
}

pub fn log_level() -> LogLevel {
    LOGGER_LEVEL
        .lock()
        .map(|level| *level)
        .unwrap_or(LogLevel::Info)
}

/// Проходит ли сообщение уровня `level` текущий порог
pub fn enabled(level: LogLevel) -> bool {
    level >= log_level()
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

/// Debug лог, сообщение строится только если Debug проходит порог
pub fn log_lazy(message: impl FnOnce() -> String) {
    if enabled(LogLevel::Debug) {
        log_with_level(LogLevel::Debug, &message());
    }
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    if !enabled(level) {
        return;
    }

    // Poisoned mutex = кто-то запаниковал внутри printer'а, просто молчим
    let Ok(guard) = LOGGER.lock() else {
        return;
    };

    if let Some(logger) = guard.as_ref() {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        logger.log(level, &format!("[{}] {}", timestamp, message));
    }
}

struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

/// Ставит ConsoleLogger, если хост ещё не подставил свой printer
pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}
