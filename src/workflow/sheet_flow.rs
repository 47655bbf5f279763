//! 表格处理流程 - 流程层
//!
//! 核心职责：定义"一张表"的完整处理流程
//!
//! 流程顺序：
//! 1. 结构识别（失败则写入 warn.txt 并结束）
//! 2. 逐行合并评语
//! 3. 写出结果 JSON
//! 4. 写入 warn.txt（结构问题 + 行问题）

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::RemarkEngine;
use crate::models::GridDocument;
use crate::services::{ReportWriter, WarnWriter};
use crate::utils::truncate_text;
use crate::workflow::sheet_ctx::SheetCtx;

/// 表格处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 已生成评语
    Merged,
    /// 结构无法识别，未生成评语
    Rejected,
}

/// 单张表格的处理统计
#[derive(Debug, Clone)]
pub struct SheetOutcome {
    pub result: ProcessResult,
    /// 生成评语的学生数
    pub students: usize,
    /// 结构问题与行问题的总数
    pub issues: usize,
}

/// 表格处理流程
///
/// - 编排识别 → 合并 → 输出
/// - 引擎本身是纯计算，这里负责全部文件读写和日志
pub struct SheetFlow {
    engine: Arc<RemarkEngine>,
    report_writer: ReportWriter,
    warn_writer: WarnWriter,
    verbose_logging: bool,
}

impl SheetFlow {
    /// 创建新的表格处理流程
    pub fn new(engine: Arc<RemarkEngine>, config: &Config) -> Self {
        Self {
            engine,
            report_writer: ReportWriter::new(&config.output_folder),
            warn_writer: WarnWriter::with_path(&config.warn_file),
            verbose_logging: config.verbose_logging,
        }
    }

    pub async fn run(&self, document: &GridDocument, ctx: &SheetCtx) -> Result<SheetOutcome> {
        info!("{} 开始处理，共 {} 行", ctx, document.grid.row_count());

        // ========== 1. 结构识别 ==========
        let detection = self.engine.detect_structure(&document.grid);

        let Some(structure) = detection.structure else {
            for issue in &detection.issues {
                warn!("{} ❌ {}", ctx, issue);
            }
            self.warn_writer.write(&ctx.sheet_name, &detection.issues)?;
            return Ok(SheetOutcome {
                result: ProcessResult::Rejected,
                students: 0,
                issues: detection.issues.len(),
            });
        };

        info!(
            "{} ✓ 结构识别完成: 学生记录从第 {} 行开始, {} 个栏目列",
            ctx,
            structure.student_records_start_row_index,
            structure.headers.len()
        );
        for issue in &detection.issues {
            warn!("{} ⚠️ {}", ctx, issue);
        }

        // ========== 2. 合并评语 ==========
        let summary = self.engine.merge_remarks(&document.grid, &structure);

        if self.verbose_logging {
            for row in &summary.rows {
                info!(
                    "{}   {}: {}",
                    ctx,
                    row.student_name,
                    truncate_text(&row.remark, 80)
                );
            }
        }

        // ========== 3. 写出结果 ==========
        let report_path = self
            .report_writer
            .write(&ctx.file_stem, &ctx.sheet_name, &detection.issues, &summary)
            .await?;

        // ========== 4. 写入警告 ==========
        let issue_count = self
            .warn_writer
            .write(&ctx.sheet_name, detection.issues.iter().chain(summary.issues()))?;

        if summary.has_warnings() {
            warn!(
                "{} ⚠️ {} 名学生中共有 {} 个问题，已写入 {}",
                ctx,
                summary.total,
                summary.errors,
                self.warn_writer.path()
            );
        }
        info!("{} ✅ 已生成 {} 条评语 → {}", ctx, summary.total, report_path.display());

        Ok(SheetOutcome {
            result: ProcessResult::Merged,
            students: summary.total,
            issues: issue_count,
        })
    }
}
