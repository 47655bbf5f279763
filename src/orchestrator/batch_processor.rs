//! 批量表格处理器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：初始化日志文件、构建评语引擎
//! 2. **批量加载**：扫描并加载所有待处理的表格（`Vec<GridDocument>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总所有表格的处理结果
//!
//! 引擎是同步纯计算，单张表格的任务放在独立的 tokio 任务里即可并行。

use crate::config::Config;
use crate::engine::RemarkEngine;
use crate::models::GridDocument;
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_sheets_loaded, log_startup,
    print_final_stats,
};
use crate::workflow::{ProcessResult, SheetCtx, SheetFlow, SheetOutcome};
use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    engine: Arc<RemarkEngine>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(config.max_concurrent_sheets, &config.label_preset);

        let engine = RemarkEngine::new(config.engine_options()?)?;

        Ok(Self {
            config,
            engine: Arc::new(engine),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        // 加载所有待处理的表格
        info!("\n📁 正在扫描待处理的表格...");
        let all_sheets = crate::models::load_all_grid_files(&self.config.grid_folder).await?;

        if all_sheets.is_empty() {
            warn!("⚠️ 没有找到待处理的JSON表格，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_sheets_loaded(all_sheets.len(), self.config.max_concurrent_sheets);

        let stats = self.process_all_sheets(all_sheets).await?;

        print_final_stats(
            stats.merged,
            stats.rejected,
            stats.failed,
            stats.students,
            stats.issues,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 处理所有表格
    pub async fn process_all_sheets(&self, all_sheets: Vec<GridDocument>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_sheets.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_sheets = all_sheets.len();
        let total_batches = total_sheets.div_ceil(batch_size);
        let mut stats = ProcessingStats::default();

        let mut remaining = all_sheets.into_iter();
        for batch_num in 1..=total_batches {
            let batch_start = (batch_num - 1) * batch_size;
            let batch_sheets: Vec<GridDocument> = remaining.by_ref().take(batch_size).collect();
            let batch_end = batch_start + batch_sheets.len();

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total_sheets);

            let batch = self
                .process_batch(batch_sheets, batch_start, semaphore.clone())
                .await?;
            log_batch_complete(batch_num, batch.merged, batch.total());

            stats.absorb(&batch);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_sheets: Vec<GridDocument>,
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<ProcessingStats> {
        let mut handles = Vec::with_capacity(batch_sheets.len());

        for (idx, document) in batch_sheets.into_iter().enumerate() {
            let sheet_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let flow = SheetFlow::new(self.engine.clone(), &self.config);
            let ctx = SheetCtx::new(document.name.clone(), sheet_index, file_stem(&document, sheet_index));

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let outcome = flow.run(&document, &ctx).await;
                if let Err(e) = &outcome {
                    error!("{} ❌ 处理过程中发生错误: {:#}", ctx, e);
                }
                outcome
            });
            handles.push((sheet_index, handle));
        }

        let (indices, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let mut batch = ProcessingStats::default();

        for (sheet_index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(outcome)) => batch.record(&outcome),
                Ok(Err(_)) => batch.failed += 1,
                Err(e) => {
                    error!("[表格 #{}] 任务执行失败: {}", sheet_index, e);
                    batch.failed += 1;
                }
            }
        }

        Ok(batch)
    }
}

/// 输出文件名：优先使用源文件名，否则用序号
fn file_stem(document: &GridDocument, sheet_index: usize) -> String {
    document
        .file_path
        .as_deref()
        .and_then(|p| std::path::Path::new(p).file_stem())
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("sheet_{}", sheet_index))
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub merged: usize,
    pub rejected: usize,
    pub failed: usize,
    pub students: usize,
    pub issues: usize,
}

impl ProcessingStats {
    pub fn total(&self) -> usize {
        self.merged + self.rejected + self.failed
    }

    fn record(&mut self, outcome: &SheetOutcome) {
        match outcome.result {
            ProcessResult::Merged => self.merged += 1,
            ProcessResult::Rejected => self.rejected += 1,
        }
        self.students += outcome.students;
        self.issues += outcome.issues;
    }

    fn absorb(&mut self, other: &ProcessingStats) {
        self.merged += other.merged;
        self.rejected += other.rejected;
        self.failed += other.failed;
        self.students += other.students;
        self.issues += other.issues;
    }
}
