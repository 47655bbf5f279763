//! # Remark Merge
//!
//! 根据评分表格为每名学生自动生成评语
//!
//! ## 架构设计
//!
//! ### ① 核心引擎层（Engine）
//! - `engine/` - 纯同步计算，不做任何 I/O
//! - `StructureDetector` - 定位姓名锚点，推导表头、模板与类别区间
//! - `SelectionResolver` - 解析单列 / 互斥 / 类别栏目的勾选
//! - `TemplateEngine` - 填充 `{占位符}` 并补全句末标点
//! - `RemarkMerger` - 逐行合并评语并收集校验问题
//!
//! ### ② 业务能力层（Services）
//! - `ReportWriter` - 写出结果 JSON
//! - `WarnWriter` - 写 warn.txt
//!
//! ### ③ 流程层（Workflow）
//! - `SheetCtx` - 上下文封装（表格名 + 序号）
//! - `SheetFlow` - 流程编排（识别 → 合并 → 输出 → 警告）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量表格处理器，管理并发
//!
//! ## 使用示例
//!
//! ```no_run
//! use remark_merge::{EngineOptions, Grid, RemarkEngine};
//!
//! # fn main() -> remark_merge::AppResult<()> {
//! let engine = RemarkEngine::new(EngineOptions::default())?;
//! let grid: Grid = serde_json::from_str("[]").unwrap_or_default();
//! let detection = engine.detect_structure(&grid);
//! if let Some(structure) = &detection.structure {
//!     let summary = engine.merge_remarks(&grid, structure);
//!     println!("{} 名学生, {} 个问题", summary.total, summary.errors);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use engine::{BlankRowPolicy, EngineOptions, RemarkEngine};
pub use error::{AppError, AppResult};
pub use models::{
    Cell, ColumnRange, DetectionOutcome, Grid, GridDocument, IssueType, MergeResultRow,
    MergeResultSummary, RemarkLabels, RemarkStructure, ValidationIssue,
};
pub use orchestrator::App;
pub use workflow::{ProcessResult, SheetCtx, SheetFlow};
