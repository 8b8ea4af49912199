//! Memory Layer - In-Memory Implementations
//!
//! 音色目录的内存实现，用于测试和无数据库场景

mod voice_repo;

pub use voice_repo::InMemoryVoiceRepository;
