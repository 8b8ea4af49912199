//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod voice_repo;

pub use database::*;
pub use voice_repo::*;
