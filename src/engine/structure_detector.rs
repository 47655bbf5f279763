//! 表格结构识别
//!
//! 固定约定：
//! - 第 0 行是栏目表头，第 1 行是句子模板
//! - 第 1 行第 0 列是考试名称
//! - 第 0 列中第一次出现姓名锚点的行是子标签行，其下一行开始是学生记录

use tracing::{debug, warn};

use crate::engine::EngineOptions;
use crate::models::{
    ColumnRange, DetectionOutcome, Grid, IssueType, RemarkStructure, ValidationIssue,
};

const HEADER_ROW: usize = 0;
const TEMPLATE_ROW: usize = 1;
const NAME_COLUMN: usize = 0;
const EXAM_NAME_CELL: (usize, usize) = (1, 0);

/// 结构识别器
pub struct StructureDetector<'a> {
    options: &'a EngineOptions,
}

impl<'a> StructureDetector<'a> {
    pub fn new(options: &'a EngineOptions) -> Self {
        Self { options }
    }

    /// 识别表格结构
    ///
    /// 只有空表格和找不到姓名锚点会导致 `structure` 为 `None`，
    /// 其余异常都以问题形式附带在仍可用的结构上。
    pub fn detect(&self, grid: &Grid) -> DetectionOutcome {
        if grid.is_empty() {
            warn!("表格为空，无法识别结构");
            return DetectionOutcome {
                structure: None,
                issues: vec![ValidationIssue::new(
                    IssueType::General,
                    "empty or unreadable grid",
                )],
            };
        }

        let headers = grid.row_texts(HEADER_ROW);
        let templates = grid.row_texts(TEMPLATE_ROW);

        let Some(student_header_row_index) = self.find_anchor_row(grid) else {
            warn!(
                "前 {} 行中未找到姓名锚点 '{}'",
                self.options.anchor_scan_rows, self.options.labels.student_name_anchor
            );
            return DetectionOutcome {
                structure: None,
                issues: vec![ValidationIssue::new(
                    IssueType::MissingHeader,
                    format!(
                        "student name anchor '{}' not found in column {}",
                        self.options.labels.student_name_anchor, NAME_COLUMN
                    ),
                )
                .at_column(NAME_COLUMN)],
            };
        };

        let meta_row_index = student_header_row_index;
        let mut issues = Vec::new();

        let exam_name = Some(grid.trimmed(EXAM_NAME_CELL.0, EXAM_NAME_CELL.1))
            .filter(|name| !name.is_empty());

        let good_header_index = find_header(&headers, &self.options.labels.good_section_header);
        let not_good_header_index =
            find_header(&headers, &self.options.labels.not_good_section_header);

        let good_range = match (good_header_index, not_good_header_index) {
            (Some(good), Some(not_good)) if not_good > good => {
                Some(ColumnRange::new(good, not_good))
            }
            (Some(good), Some(not_good)) => {
                issues.push(
                    ValidationIssue::new(
                        IssueType::RangeDetectionFailed,
                        format!(
                            "weakness section (column {}) must be to the right of strength section (column {})",
                            not_good, good
                        ),
                    )
                    .at_row(HEADER_ROW)
                    .at_column(not_good)
                    .in_section(self.options.labels.not_good_section_header.clone()),
                );
                None
            }
            (Some(good), None) => {
                let end = grid
                    .last_populated_col(meta_row_index)
                    .map_or(good + 1, |last| (last + 1).max(good + 1));
                Some(ColumnRange::new(good, end))
            }
            (None, _) => {
                issues.push(
                    ValidationIssue::new(
                        IssueType::RangeDetectionFailed,
                        format!(
                            "strength section '{}' not found in header row",
                            self.options.labels.good_section_header
                        ),
                    )
                    .at_row(HEADER_ROW)
                    .in_section(self.options.labels.good_section_header.clone()),
                );
                None
            }
        };

        if self.options.flag_missing_templates {
            issues.extend(missing_template_issues(&headers, &templates));
        }

        debug!(
            "结构识别完成: 锚点行 {}, 类别区间 {:?}, 问题 {} 个",
            student_header_row_index,
            good_range,
            issues.len()
        );

        DetectionOutcome {
            structure: Some(RemarkStructure {
                headers,
                templates,
                meta_row_index,
                student_header_row_index,
                student_records_start_row_index: student_header_row_index + 1,
                name_column_index: NAME_COLUMN,
                exam_name,
                good_header_index,
                not_good_header_index,
                good_range,
            }),
            issues,
        }
    }

    /// 在有限的前几行里查找姓名锚点
    fn find_anchor_row(&self, grid: &Grid) -> Option<usize> {
        let anchor = self.options.labels.student_name_anchor.trim().to_lowercase();
        let limit = grid.row_count().min(self.options.anchor_scan_rows);
        (0..limit).find(|&row| grid.trimmed(row, NAME_COLUMN).to_lowercase() == anchor)
    }
}

/// 不区分大小写的精确表头匹配，返回第一个匹配列
fn find_header(headers: &[String], label: &str) -> Option<usize> {
    let label = label.trim().to_lowercase();
    headers
        .iter()
        .position(|header| header.trim().to_lowercase() == label)
}

fn missing_template_issues(headers: &[String], templates: &[String]) -> Vec<ValidationIssue> {
    headers
        .iter()
        .enumerate()
        .filter(|(col, header)| {
            !header.trim().is_empty()
                && templates.get(*col).map_or(true, |t| t.trim().is_empty())
        })
        .map(|(col, header)| {
            ValidationIssue::new(
                IssueType::MissingTemplate,
                format!("section '{}' has no template", header.trim()),
            )
            .at_row(TEMPLATE_ROW)
            .at_column(col)
            .in_section(header.trim())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RemarkLabels;

    fn en_options() -> EngineOptions {
        EngineOptions {
            labels: RemarkLabels::preset("en").unwrap(),
            ..EngineOptions::default()
        }
    }

    fn detect(grid: &Grid, options: &EngineOptions) -> DetectionOutcome {
        StructureDetector::new(options).detect(grid)
    }

    #[test]
    fn test_empty_grid_is_general_issue() {
        let outcome = detect(&Grid::default(), &en_options());
        assert!(outcome.structure.is_none());
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].issue_type, IssueType::General);
    }

    #[test]
    fn test_missing_anchor_is_fatal() {
        let grid = Grid::from_strings(vec![
            vec!["", "Effort"],
            vec!["Midterm", "{student name} works hard"],
            vec!["Minh", "x"],
        ]);
        let outcome = detect(&grid, &en_options());

        assert!(outcome.structure.is_none());
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].issue_type, IssueType::MissingHeader);
    }

    #[test]
    fn test_anchor_beyond_scan_limit_is_not_found() {
        let mut rows = vec![vec!["".to_string()]; 5];
        rows.push(vec!["Student name".to_string()]);
        let grid = Grid::from_strings(rows);

        let options = EngineOptions {
            anchor_scan_rows: 3,
            ..en_options()
        };
        assert!(detect(&grid, &options).structure.is_none());
        assert!(detect(&grid, &en_options()).structure.is_some());
    }

    #[test]
    fn test_full_structure_with_both_category_sections() {
        let grid = Grid::from_strings(vec![
            vec!["", "Effort", "Strength categories", "", "", "Weakness categories"],
            vec!["Final exam", "t1", "good: {list of strength categories}", "", "", "weak"],
            vec![" student NAME ", "", "Algebra", "Geometry", "Statistics", ""],
            vec!["Minh", "x", "x", "", "x", ""],
        ]);
        let outcome = detect(&grid, &en_options());
        let s = outcome.structure.unwrap();

        assert!(outcome.issues.is_empty());
        assert_eq!(s.student_header_row_index, 2);
        assert_eq!(s.meta_row_index, 2);
        assert_eq!(s.student_records_start_row_index, 3);
        assert_eq!(s.exam_name.as_deref(), Some("Final exam"));
        assert_eq!(s.good_header_index, Some(2));
        assert_eq!(s.not_good_header_index, Some(5));
        assert_eq!(s.good_range, Some(ColumnRange::new(2, 5)));
        assert_eq!(s.headers.len(), 6);
        assert_eq!(s.templates.len(), 6);
    }

    #[test]
    fn test_strength_only_range_extends_to_last_meta_column() {
        let grid = Grid::from_strings(vec![
            vec!["", "Strength categories"],
            vec!["", "{list of strength categories}"],
            vec!["Student name", "Reading", "Writing", "Listening", ""],
        ]);
        let outcome = detect(&grid, &en_options());
        let s = outcome.structure.unwrap();

        assert_eq!(s.good_range, Some(ColumnRange::new(1, 4)));
        assert_eq!(s.exam_name, None);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_missing_strength_section_degrades() {
        let grid = Grid::from_strings(vec![
            vec!["", "Effort", "Weakness categories"],
            vec!["", "t", "w"],
            vec!["Student name"],
        ]);
        let outcome = detect(&grid, &en_options());

        let s = outcome.structure.unwrap();
        assert_eq!(s.good_range, None);
        assert_eq!(s.not_good_header_index, Some(2));
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].issue_type, IssueType::RangeDetectionFailed);
    }

    #[test]
    fn test_reversed_category_sections_degrade() {
        let grid = Grid::from_strings(vec![
            vec!["", "Weakness categories", "Strength categories"],
            vec!["", "w", "s"],
            vec!["Student name", "A", "B"],
        ]);
        let outcome = detect(&grid, &en_options());

        assert_eq!(outcome.structure.unwrap().good_range, None);
        assert_eq!(outcome.issues[0].issue_type, IssueType::RangeDetectionFailed);
    }

    #[test]
    fn test_flag_missing_templates() {
        let grid = Grid::from_strings(vec![
            vec!["", "Effort", "Homework", "Strength categories"],
            vec!["", "{student name} tries", "", "s"],
            vec!["Student name", "", "", "A"],
        ]);
        let options = EngineOptions {
            flag_missing_templates: true,
            ..en_options()
        };
        let outcome = detect(&grid, &options);

        let flagged: Vec<_> = outcome
            .issues
            .iter()
            .filter(|i| i.issue_type == IssueType::MissingTemplate)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].column_index, Some(2));
        assert_eq!(flagged[0].section_name.as_deref(), Some("Homework"));
    }
}
