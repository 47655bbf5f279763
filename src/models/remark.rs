//! 评语表结构、校验问题与合并结果

use serde::{Deserialize, Serialize};
use std::fmt;

/// 半开列区间 `[start_col, end_col_exclusive)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRange {
    pub start_col: usize,
    pub end_col_exclusive: usize,
}

impl ColumnRange {
    pub fn new(start_col: usize, end_col_exclusive: usize) -> Self {
        Self {
            start_col,
            end_col_exclusive,
        }
    }

    pub fn columns(&self) -> std::ops::Range<usize> {
        self.start_col..self.end_col_exclusive
    }
}

/// 从表格中识别出的评语结构，一次识别后对所有学生行复用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkStructure {
    /// 第 0 行的栏目表头，每列一个
    pub headers: Vec<String>,
    /// 第 1 行的句子模板，与 `headers` 按列对齐
    pub templates: Vec<String>,
    /// 子标签所在行
    pub meta_row_index: usize,
    /// 姓名锚点所在行
    pub student_header_row_index: usize,
    /// 第一条学生记录所在行
    pub student_records_start_row_index: usize,
    pub name_column_index: usize,
    pub exam_name: Option<String>,
    pub good_header_index: Option<usize>,
    pub not_good_header_index: Option<usize>,
    /// 优点/待改进类别的枚举区间
    pub good_range: Option<ColumnRange>,
}

impl RemarkStructure {
    pub fn header(&self, col: usize) -> &str {
        self.headers.get(col).map_or("", |s| s.as_str())
    }

    pub fn template(&self, col: usize) -> &str {
        self.templates.get(col).map_or("", |s| s.as_str())
    }

    /// 表头和模板中较长者的列数
    pub fn column_count(&self) -> usize {
        self.headers.len().max(self.templates.len())
    }
}

/// 校验问题类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// 找不到学生姓名锚点（致命）
    MissingHeader,
    /// 表头非空但模板为空
    MissingTemplate,
    /// 互斥选项中勾选了多项
    ConflictSelection,
    /// 无法推导类别区间
    RangeDetectionFailed,
    /// 两条有效记录之间出现空姓名行
    MissingStudentName,
    /// 其他问题（如空表格）
    General,
}

impl IssueType {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::MissingHeader => "missing_header",
            IssueType::MissingTemplate => "missing_template",
            IssueType::ConflictSelection => "conflict_selection",
            IssueType::RangeDetectionFailed => "range_detection_failed",
            IssueType::MissingStudentName => "missing_student_name",
            IssueType::General => "general",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条校验问题，只作为输出，不会中断后续处理
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
}

impl ValidationIssue {
    pub fn new(issue_type: IssueType, message: impl Into<String>) -> Self {
        Self {
            issue_type,
            message: message.into(),
            row_index: None,
            column_index: None,
            section_name: None,
            student_name: None,
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row_index = Some(row);
        self
    }

    pub fn at_column(mut self, col: usize) -> Self {
        self.column_index = Some(col);
        self
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section_name = Some(section.into());
        self
    }

    pub fn for_student(mut self, student: impl Into<String>) -> Self {
        self.student_name = Some(student.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.issue_type, self.message)?;
        if let Some(row) = self.row_index {
            write!(f, " | 行 {}", row)?;
        }
        if let Some(col) = self.column_index {
            write!(f, " | 列 {}", col)?;
        }
        if let Some(section) = &self.section_name {
            write!(f, " | 栏目 {}", section)?;
        }
        if let Some(student) = &self.student_name {
            write!(f, " | 学生 {}", student)?;
        }
        Ok(())
    }
}

/// 结构识别结果，`structure` 为 `None` 表示识别失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionOutcome {
    pub structure: Option<RemarkStructure>,
    pub issues: Vec<ValidationIssue>,
}

/// 单个学生的合并结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResultRow {
    pub student_name: String,
    pub remark: String,
    pub issues: Vec<ValidationIssue>,
}

/// 整批合并结果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResultSummary {
    pub rows: Vec<MergeResultRow>,
    pub total: usize,
    pub errors: usize,
}

impl MergeResultSummary {
    pub fn from_rows(rows: Vec<MergeResultRow>) -> Self {
        let total = rows.len();
        let errors = rows.iter().map(|row| row.issues.len()).sum();
        Self {
            rows,
            total,
            errors,
        }
    }

    /// 按行顺序展开全部问题
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.rows.iter().flat_map(|row| row.issues.iter())
    }

    pub fn has_warnings(&self) -> bool {
        self.errors > 0
    }
}
