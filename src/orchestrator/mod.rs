//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度。
//!
//! ### `batch_processor` - 批量表格处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载表格（Vec<GridDocument>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<GridDocument>)
//!     ↓
//! workflow::SheetFlow (处理单张表格)
//!     ↓
//! engine (识别 / 解析 / 填充，纯计算)  +  services (写结果 / 写警告)
//! ```

pub mod batch_processor;

pub use batch_processor::{App, ProcessingStats};
