//! 勾选解析
//!
//! 栏目划分只取决于表头行和子标签行，与具体学生无关，因此先对列做一次
//! 线性扫描得到栏目列表，再对每个学生行按栏目解析勾选并渲染句子。

use tracing::debug;

use crate::engine::template::{TemplateContext, TemplateEngine};
use crate::models::{Grid, IssueType, RemarkLabels, RemarkStructure, ValidationIssue};

/// 栏目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// 优点类别列表
    Strengths,
    /// 待改进类别列表
    Weaknesses,
    /// 单列栏目，勾选即输出
    Single,
    /// 多列互斥栏目
    Window,
}

/// 一个栏目占据的列区间 `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// 对表头做一次从左到右的扫描，划分栏目
///
/// 表头为空的列不属于任何栏目。
pub fn plan_sections(grid: &Grid, structure: &RemarkStructure, labels: &RemarkLabels) -> Vec<Section> {
    let column_count = structure.column_count();
    let good = labels.good_section_header.trim().to_lowercase();
    let not_good = labels.not_good_section_header.trim().to_lowercase();

    let mut sections = Vec::new();
    let mut col = 0;
    while col < column_count {
        let name = structure.header(col).trim();
        if name.is_empty() {
            col += 1;
            continue;
        }
        let lowered = name.to_lowercase();

        // 只有识别出的那一列算作类别栏目，重复出现的同名表头不再渲染
        let is_good_header = structure.good_header_index == Some(col);
        let is_not_good_header = structure.not_good_header_index == Some(col);
        if (lowered == good && !is_good_header) || (lowered == not_good && !is_not_good_header) {
            debug!("忽略重复的类别表头: 第 {} 列 {}", col, name);
            col += 1;
            continue;
        }

        let (kind, end) = if is_good_header {
            let end = structure
                .good_range
                .map_or(col + 1, |range| range.end_col_exclusive.max(col + 1));
            (SectionKind::Strengths, end)
        } else if is_not_good_header {
            let mut end = col + 1;
            while end < column_count && structure.header(end).trim().to_lowercase() == not_good {
                end += 1;
            }
            (SectionKind::Weaknesses, end)
        } else {
            let mut end = col + 1;
            while end < column_count
                && structure.header(end).trim() == name
                && !grid.cell(structure.meta_row_index, end).is_blank()
            {
                end += 1;
            }
            let kind = if end - col > 1 {
                SectionKind::Window
            } else {
                SectionKind::Single
            };
            (kind, end)
        };

        sections.push(Section {
            kind,
            name: name.to_string(),
            start: col,
            end,
        });
        col = end;
    }

    debug!("栏目划分完成: {} 个栏目", sections.len());
    sections
}

/// 单个学生行的解析结果
#[derive(Debug, Default)]
pub struct RowSelection {
    /// 按栏目顺序渲染出的句子
    pub fragments: Vec<String>,
    pub issues: Vec<ValidationIssue>,
}

/// 勾选解析器，对同一次合并中的所有学生行复用
pub struct SelectionResolver<'a> {
    grid: &'a Grid,
    structure: &'a RemarkStructure,
    labels: &'a RemarkLabels,
    templates: &'a TemplateEngine,
    sections: &'a [Section],
}

impl<'a> SelectionResolver<'a> {
    pub fn new(
        grid: &'a Grid,
        structure: &'a RemarkStructure,
        labels: &'a RemarkLabels,
        templates: &'a TemplateEngine,
        sections: &'a [Section],
    ) -> Self {
        Self {
            grid,
            structure,
            labels,
            templates,
            sections,
        }
    }

    /// 解析一个学生行的全部栏目
    pub fn resolve_row(&self, row: usize, student_name: &str) -> RowSelection {
        let context = self.base_context(student_name);
        let mut selection = RowSelection::default();

        for section in self.sections {
            let fragment = match section.kind {
                SectionKind::Strengths => self.render_categories(row, section, &context, true),
                SectionKind::Weaknesses => self.render_categories(row, section, &context, false),
                SectionKind::Single => self
                    .is_marked(row, section.start)
                    .then(|| self.templates.fill(self.structure.template(section.start), &context)),
                SectionKind::Window => {
                    self.render_window(row, section, student_name, &context, &mut selection.issues)
                }
            };

            if let Some(text) = fragment.filter(|text| !text.trim().is_empty()) {
                selection.fragments.push(text);
            }
        }

        selection
    }

    fn base_context(&self, student_name: &str) -> TemplateContext {
        let mut context = TemplateContext::new();
        context.insert(self.labels.student_name_key.clone(), student_name.to_string());
        context.insert(
            self.labels.exam_name_key.clone(),
            self.structure.exam_name.clone().unwrap_or_default(),
        );
        context
    }

    fn is_marked(&self, row: usize, col: usize) -> bool {
        self.labels.is_selected(&self.grid.text(row, col))
    }

    /// 互斥栏目：多选时记录冲突并取第一个勾选列
    fn render_window(
        &self,
        row: usize,
        section: &Section,
        student_name: &str,
        context: &TemplateContext,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<String> {
        let marked: Vec<usize> = (section.start..section.end)
            .filter(|&col| self.is_marked(row, col))
            .collect();
        let &chosen = marked.first()?;

        if marked.len() > 1 {
            debug!(
                "学生 {} 在栏目 {} 中勾选了 {} 项",
                student_name,
                section.name,
                marked.len()
            );
            issues.push(
                ValidationIssue::new(
                    IssueType::ConflictSelection,
                    format!(
                        "{} options selected in section '{}' for student '{}', using column {}",
                        marked.len(),
                        section.name,
                        student_name,
                        chosen
                    ),
                )
                .at_row(row)
                .at_column(chosen)
                .in_section(section.name.clone())
                .for_student(student_name),
            );
        }

        let own = self.structure.template(chosen);
        let template = if own.trim().is_empty() {
            self.structure.template(section.start)
        } else {
            own
        };
        Some(self.templates.fill(template, context))
    }

    /// 类别栏目：在类别区间内按子标签枚举，勾选的归入优点，其余归入待改进
    ///
    /// 列表为空时照常填充，填充结果为空白才不输出。
    fn render_categories(
        &self,
        row: usize,
        section: &Section,
        context: &TemplateContext,
        strengths: bool,
    ) -> Option<String> {
        let range = self.structure.good_range?;
        let template = self.structure.template(section.start);
        if template.trim().is_empty() {
            return None;
        }

        let categories: Vec<String> = range
            .columns()
            .filter_map(|col| {
                let label = self.grid.trimmed(self.structure.meta_row_index, col);
                if label.is_empty() || self.is_marked(row, col) != strengths {
                    return None;
                }
                Some(label.to_lowercase())
            })
            .collect();

        let key = if strengths {
            &self.labels.good_list_key
        } else {
            &self.labels.not_good_list_key
        };
        let mut context = context.clone();
        context.insert(key.clone(), categories.join(", "));
        Some(self.templates.fill(template, &context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::structure_detector::StructureDetector;
    use crate::engine::EngineOptions;

    fn options() -> EngineOptions {
        EngineOptions {
            labels: RemarkLabels::preset("en").unwrap(),
            ..EngineOptions::default()
        }
    }

    fn sample_grid() -> Grid {
        Grid::from_strings(vec![
            vec!["", "Attitude", "Attitude", "Homework", "Strength categories", "", "", "Weakness categories"],
            vec![
                "Quiz 3",
                "{student name} is focused",
                "{student name} needs to focus",
                "{student name} always does homework",
                "Strong at {list of strength categories}",
                "",
                "",
                "Should review {list of weakness categories}",
            ],
            vec!["Student name", "Good", "Not good", "", "Algebra", "Geometry", "Statistics", ""],
            vec!["Minh", "x", "x", "x", "x", "", "X", ""],
            vec!["Lan", "", "x", "", "", "", "", ""],
        ])
    }

    fn resolve(grid: &Grid, row: usize, name: &str) -> RowSelection {
        let options = options();
        let structure = StructureDetector::new(&options).detect(grid).structure.unwrap();
        let engine = TemplateEngine::new("{", "}").unwrap();
        let sections = plan_sections(grid, &structure, &options.labels);
        SelectionResolver::new(grid, &structure, &options.labels, &engine, &sections)
            .resolve_row(row, name)
    }

    #[test]
    fn test_plan_sections() {
        let grid = sample_grid();
        let options = options();
        let structure = StructureDetector::new(&options).detect(&grid).structure.unwrap();
        let sections = plan_sections(&grid, &structure, &options.labels);

        let kinds: Vec<_> = sections.iter().map(|s| (s.kind, s.start, s.end)).collect();
        assert_eq!(
            kinds,
            vec![
                (SectionKind::Window, 1, 3),
                (SectionKind::Single, 3, 4),
                (SectionKind::Strengths, 4, 7),
                (SectionKind::Weaknesses, 7, 8),
            ]
        );
    }

    #[test]
    fn test_conflict_uses_first_marked_column() {
        let selection = resolve(&sample_grid(), 3, "Minh");

        assert_eq!(selection.issues.len(), 1);
        let issue = &selection.issues[0];
        assert_eq!(issue.issue_type, IssueType::ConflictSelection);
        assert_eq!(issue.section_name.as_deref(), Some("Attitude"));
        assert_eq!(issue.student_name.as_deref(), Some("Minh"));
        assert_eq!(issue.column_index, Some(1));
        assert_eq!(selection.fragments[0], "Minh is focused.");
    }

    #[test]
    fn test_strengths_and_weaknesses_partition() {
        let selection = resolve(&sample_grid(), 3, "Minh");

        assert!(selection
            .fragments
            .contains(&"Strong at algebra, statistics.".to_string()));
        assert!(selection
            .fragments
            .contains(&"Should review geometry.".to_string()));
    }

    #[test]
    fn test_empty_category_list_still_renders_template_text() {
        let selection = resolve(&sample_grid(), 4, "Lan");

        assert!(selection.issues.is_empty());
        assert_eq!(
            selection.fragments,
            vec![
                "Lan needs to focus.".to_string(),
                "Strong at.".to_string(),
                "Should review algebra, geometry, statistics.".to_string(),
            ]
        );
    }

    #[test]
    fn test_category_template_that_fills_blank_is_skipped() {
        let grid = Grid::from_strings(vec![
            vec!["", "Strength categories", "", "Weakness categories"],
            vec!["", "{list of strength categories}", "", "Should review {list of weakness categories}"],
            vec!["Student name", "Algebra", "Geometry", ""],
            vec!["Huy", "", "", ""],
        ]);
        let selection = resolve(&grid, 3, "Huy");

        assert_eq!(
            selection.fragments,
            vec!["Should review algebra, geometry.".to_string()]
        );
    }

    #[test]
    fn test_all_marked_keeps_weaknesses_sentence() {
        let grid = Grid::from_strings(vec![
            vec!["", "Strength categories", "", "Weakness categories"],
            vec!["", "Strong at {list of strength categories}", "", "Should review {list of weakness categories}"],
            vec!["Student name", "Algebra", "Geometry", ""],
            vec!["Huy", "x", "x", ""],
        ]);
        let selection = resolve(&grid, 3, "Huy");

        assert_eq!(
            selection.fragments,
            vec![
                "Strong at algebra, geometry.".to_string(),
                "Should review.".to_string(),
            ]
        );
    }

    #[test]
    fn test_repeated_strengths_header_is_not_rendered_twice() {
        let grid = Grid::from_strings(vec![
            vec!["", "Strength categories", "", "Weakness categories", "Strength categories"],
            vec![
                "",
                "Strong at {list of strength categories}",
                "",
                "Should review {list of weakness categories}",
                "Again strong at {list of strength categories}",
            ],
            vec!["Student name", "Algebra", "Geometry", "", ""],
            vec!["Huy", "x", "", "", "x"],
        ]);
        let options = options();
        let structure = StructureDetector::new(&options).detect(&grid).structure.unwrap();
        let sections = plan_sections(&grid, &structure, &options.labels);
        let kinds: Vec<_> = sections.iter().map(|s| (s.kind, s.start, s.end)).collect();
        assert_eq!(
            kinds,
            vec![(SectionKind::Strengths, 1, 3), (SectionKind::Weaknesses, 3, 4)]
        );

        let selection = resolve(&grid, 3, "Huy");
        assert_eq!(
            selection.fragments,
            vec![
                "Strong at algebra.".to_string(),
                "Should review geometry.".to_string(),
            ]
        );
    }

    #[test]
    fn test_window_falls_back_to_first_template() {
        let grid = Grid::from_strings(vec![
            vec!["", "Progress", "Progress"],
            vec!["", "{student name} made progress", ""],
            vec!["Student name", "Yes", "A little"],
            vec!["Huy", "", "x"],
        ]);
        let selection = resolve(&grid, 3, "Huy");
        assert_eq!(selection.fragments, vec!["Huy made progress.".to_string()]);
    }

    #[test]
    fn test_same_header_without_sub_label_is_separate_section() {
        let grid = Grid::from_strings(vec![
            vec!["", "Effort", "Effort"],
            vec!["", "first", "second"],
            vec!["Student name", "", ""],
            vec!["Huy", "x", "x"],
        ]);
        let selection = resolve(&grid, 3, "Huy");

        assert!(selection.issues.is_empty());
        assert_eq!(
            selection.fragments,
            vec!["first.".to_string(), "second.".to_string()]
        );
    }
}
