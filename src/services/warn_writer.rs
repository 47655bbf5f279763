//! 警告写入服务 - 业务能力层
//!
//! 只负责"把校验问题写入 warn.txt"，不关心流程

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::models::ValidationIssue;

/// 警告写入服务
///
/// 职责：
/// - 把一个表格产生的校验问题逐行追加到 warn.txt
/// - 多个表格并发写入时，每次调用一次性写完，行不会交错
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 写入一个表格的全部问题，没有问题时不写
    ///
    /// # 参数
    /// - `sheet_name`: 表格名称
    /// - `issues`: 校验问题
    pub fn write<'a>(
        &self,
        sheet_name: &str,
        issues: impl IntoIterator<Item = &'a ValidationIssue>,
    ) -> Result<usize> {
        let lines: Vec<String> = issues
            .into_iter()
            .map(|issue| format!("表格 {} | {}\n", sheet_name, issue))
            .collect();
        if lines.is_empty() {
            return Ok(0);
        }

        debug!("写入警告: 表格 {} | {} 条", sheet_name, lines.len());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .with_context(|| format!("无法打开警告文件: {}", self.warn_file_path))?;

        file.write_all(lines.concat().as_bytes())?;

        Ok(lines.len())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}
