//! Persistence Layer - 数据持久化
//!
//! 音色目录的 SQLite 存储实现

pub mod sqlite;

pub use self::sqlite::SqliteVoiceRepository;
