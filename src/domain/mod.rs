//! 领域层
//!
//! - voice: 音色上下文（值对象、解析选择器）

pub mod voice;
