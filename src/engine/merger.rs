//! 评语合并
//!
//! 从第一条学生记录开始逐行处理，每行得到一条评语。默认遇到第一个空姓名行就结束整批。

use tracing::{debug, info};

use crate::engine::selection::{plan_sections, SelectionResolver};
use crate::engine::template::TemplateEngine;
use crate::engine::{BlankRowPolicy, EngineOptions};
use crate::models::{
    Grid, IssueType, MergeResultRow, MergeResultSummary, RemarkStructure, ValidationIssue,
};

/// 评语合并器
pub struct RemarkMerger<'a> {
    options: &'a EngineOptions,
    templates: &'a TemplateEngine,
}

impl<'a> RemarkMerger<'a> {
    pub fn new(options: &'a EngineOptions, templates: &'a TemplateEngine) -> Self {
        Self { options, templates }
    }

    /// 对所有学生行生成评语，数据问题只记录不中断
    pub fn merge(&self, grid: &Grid, structure: &RemarkStructure) -> MergeResultSummary {
        let labels = &self.options.labels;
        let sections = plan_sections(grid, structure, labels);
        let resolver = SelectionResolver::new(grid, structure, labels, self.templates, &sections);

        let mut rows = Vec::new();
        // 仅在 SkipAndReport 策略下使用：尚未遇到下一条有效记录的空行
        let mut pending_blank_rows: Vec<usize> = Vec::new();

        for row in structure.student_records_start_row_index..grid.row_count() {
            let student_name = grid.trimmed(row, structure.name_column_index);

            if student_name.is_empty() {
                match self.options.blank_row_policy {
                    BlankRowPolicy::Stop => {
                        debug!("第 {} 行姓名为空，结束本批", row);
                        break;
                    }
                    BlankRowPolicy::SkipAndReport => {
                        pending_blank_rows.push(row);
                        continue;
                    }
                }
            }

            let mut issues = Vec::new();
            if !rows.is_empty() {
                issues.extend(pending_blank_rows.iter().map(|&blank| {
                    ValidationIssue::new(
                        IssueType::MissingStudentName,
                        format!("row {} has no student name and was skipped", blank),
                    )
                    .at_row(blank)
                    .at_column(structure.name_column_index)
                }));
            }
            pending_blank_rows.clear();

            let selection = resolver.resolve_row(row, &student_name);
            issues.extend(selection.issues);

            let remark = selection.fragments.join(" ").trim().to_string();
            rows.push(MergeResultRow {
                student_name,
                remark,
                issues,
            });
        }

        let summary = MergeResultSummary::from_rows(rows);
        info!(
            "评语合并完成: {} 名学生, {} 个问题",
            summary.total, summary.errors
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::structure_detector::StructureDetector;
    use crate::models::RemarkLabels;

    fn options(policy: BlankRowPolicy) -> EngineOptions {
        EngineOptions {
            labels: RemarkLabels::preset("en").unwrap(),
            blank_row_policy: policy,
            ..EngineOptions::default()
        }
    }

    fn merge(grid: &Grid, options: &EngineOptions) -> MergeResultSummary {
        let engine = TemplateEngine::new("{", "}").unwrap();
        let structure = StructureDetector::new(options).detect(grid).structure.unwrap();
        RemarkMerger::new(options, &engine).merge(grid, &structure)
    }

    fn names_grid() -> Grid {
        Grid::from_strings(vec![
            vec!["", "Effort"],
            vec!["", "{student name} tries hard"],
            vec!["Student name", ""],
            vec!["Alice", "x"],
            vec!["Bob", ""],
            vec!["", ""],
            vec!["Carol", "x"],
            vec!["", ""],
        ])
    }

    #[test]
    fn test_first_blank_name_ends_batch() {
        let summary = merge(&names_grid(), &options(BlankRowPolicy::Stop));

        let names: Vec<_> = summary.rows.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.rows[0].remark, "Alice tries hard.");
        assert_eq!(summary.rows[1].remark, "");
    }

    #[test]
    fn test_skip_policy_reports_interior_blank_rows_only() {
        let summary = merge(&names_grid(), &options(BlankRowPolicy::SkipAndReport));

        let names: Vec<_> = summary.rows.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(summary.errors, 1);

        let issue = &summary.rows[2].issues[0];
        assert_eq!(issue.issue_type, IssueType::MissingStudentName);
        assert_eq!(issue.row_index, Some(5));
    }

    #[test]
    fn test_leading_blank_rows_are_not_reported() {
        let grid = Grid::from_strings(vec![
            vec!["", "Effort"],
            vec!["", "ok"],
            vec!["Student name"],
            vec![""],
            vec!["Dung", "x"],
        ]);
        let summary = merge(&grid, &options(BlankRowPolicy::SkipAndReport));

        assert_eq!(summary.total, 1);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.rows[0].remark, "ok.");
    }

    #[test]
    fn test_fragments_joined_without_extra_spaces() {
        let grid = Grid::from_strings(vec![
            vec!["", "A", "B", "C"],
            vec!["", "{student name} one", "   ", "three"],
            vec!["Student name"],
            vec!["Nam", "x", "x", "x"],
        ]);
        let summary = merge(&grid, &options(BlankRowPolicy::Stop));
        assert_eq!(summary.rows[0].remark, "Nam one. three.");
    }

    #[test]
    fn test_merge_is_repeatable() {
        let grid = names_grid();
        let options = options(BlankRowPolicy::Stop);
        let before = grid.clone();

        let first = merge(&grid, &options);
        let second = merge(&grid, &options);

        assert_eq!(first, second);
        assert_eq!(grid, before);
    }
}
