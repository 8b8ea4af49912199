//! Voice Sample Adapters - 降级模式下的文件系统音色解析

mod directory_resolver;

pub use directory_resolver::DirectoryVoiceResolver;
