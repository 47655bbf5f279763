//! 结果写入服务 - 业务能力层
//!
//! 只负责"把合并结果写成 JSON 文件"，不关心流程

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::error::AppError;
use crate::models::{MergeResultSummary, ValidationIssue};

/// 写入文件的报告内容
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkReport<'a> {
    pub sheet_name: &'a str,
    pub generated_at: String,
    /// 结构识别阶段的问题
    pub structure_issues: &'a [ValidationIssue],
    #[serde(flatten)]
    pub summary: &'a MergeResultSummary,
}

/// 结果写入服务
pub struct ReportWriter {
    output_folder: PathBuf,
}

impl ReportWriter {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
        }
    }

    /// 报告文件路径：`<输出目录>/<文件名>.remarks.json`
    pub fn report_path(&self, file_stem: &str) -> PathBuf {
        self.output_folder.join(format!("{}.remarks.json", file_stem))
    }

    /// 写入一个表格的合并结果，返回文件路径
    pub async fn write(
        &self,
        file_stem: &str,
        sheet_name: &str,
        structure_issues: &[ValidationIssue],
        summary: &MergeResultSummary,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", self.output_folder.display()))?;

        let report = RemarkReport {
            sheet_name,
            generated_at: chrono::Local::now().to_rfc3339(),
            structure_issues,
            summary,
        };
        let json = serde_json::to_string_pretty(&report)?;

        let path = self.report_path(file_stem);
        fs::write(&path, json)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        debug!("结果已写入: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MergeResultRow;

    #[tokio::test]
    async fn test_write_report_json() {
        let dir = std::env::temp_dir().join(format!("remark_report_{}", std::process::id()));
        let writer = ReportWriter::new(&dir);
        let summary = MergeResultSummary::from_rows(vec![MergeResultRow {
            student_name: "Minh".to_string(),
            remark: "Minh làm bài rất tốt.".to_string(),
            issues: vec![],
        }]);

        let path = writer.write("lop9a", "Lớp 9A", &[], &summary).await.unwrap();
        assert_eq!(path, dir.join("lop9a.remarks.json"));

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["sheetName"], "Lớp 9A");
        assert_eq!(value["total"], 1);
        assert_eq!(value["errors"], 0);
        assert_eq!(value["rows"][0]["studentName"], "Minh");
        assert_eq!(value["rows"][0]["remark"], "Minh làm bài rất tốt.");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_write_failure_is_file_write_error() {
        let dir = std::env::temp_dir().join(format!("remark_report_blocked_{}", std::process::id()));
        // 目标路径已被同名目录占用
        std::fs::create_dir_all(dir.join("lop9a.remarks.json")).unwrap();
        let writer = ReportWriter::new(&dir);
        let summary = MergeResultSummary::from_rows(vec![]);

        let err = writer.write("lop9a", "Lớp 9A", &[], &summary).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::File(crate::error::FileError::WriteFailed { .. }))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
