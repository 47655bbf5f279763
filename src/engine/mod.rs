//! 评语引擎（核心层）
//!
//! ## 职责
//!
//! 读取外部组件提供的二维表格，识别结构，逐个学生解析勾选并填充句子模板，
//! 得到每名学生的评语以及处理过程中发现的问题。
//!
//! ## 模块划分
//!
//! - `structure_detector` - 定位姓名锚点，推导表头、模板、类别区间
//! - `selection` - 划分栏目，解析单列 / 互斥 / 类别栏目的勾选
//! - `template` - 占位符替换与句末标点补全
//! - `merger` - 逐行编排并汇总结果
//!
//! ## 流程
//!
//! ```text
//! Grid → StructureDetector → RemarkStructure
//!      → RemarkMerger (SelectionResolver + TemplateEngine，逐行) → MergeResultSummary
//! ```
//!
//! 引擎是纯同步计算：同样的输入总是得到同样的输出，不修改输入，也不保留跨调用的状态。

pub mod merger;
pub mod selection;
pub mod structure_detector;
pub mod template;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{AppResult, ConfigError};
use crate::models::{DetectionOutcome, Grid, MergeResultSummary, RemarkLabels, RemarkStructure};

pub use merger::RemarkMerger;
pub use selection::{plan_sections, Section, SectionKind, SelectionResolver};
pub use structure_detector::StructureDetector;
pub use template::{ensure_sentence_ending, TemplateContext, TemplateEngine};

/// 姓名锚点默认的查找行数
pub const DEFAULT_ANCHOR_SCAN_ROWS: usize = 50;

/// 空姓名行的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankRowPolicy {
    /// 遇到第一个空姓名行即结束整批
    #[default]
    Stop,
    /// 跳过空姓名行，夹在两条有效记录之间的空行记为 `missing_student_name`
    SkipAndReport,
}

impl FromStr for BlankRowPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stop" => Ok(BlankRowPolicy::Stop),
            "skip" | "skip_and_report" => Ok(BlankRowPolicy::SkipAndReport),
            other => Err(ConfigError::EnvVarParseFailed {
                var_name: "BLANK_ROW_POLICY".to_string(),
                value: other.to_string(),
                expected_type: "stop | skip".to_string(),
            }),
        }
    }
}

/// 引擎选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub labels: RemarkLabels,
    /// 查找姓名锚点时最多扫描的行数
    pub anchor_scan_rows: usize,
    pub blank_row_policy: BlankRowPolicy,
    /// 为"有表头无模板"的列生成 `missing_template` 问题
    pub flag_missing_templates: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            labels: RemarkLabels::default(),
            anchor_scan_rows: DEFAULT_ANCHOR_SCAN_ROWS,
            blank_row_policy: BlankRowPolicy::default(),
            flag_missing_templates: false,
        }
    }
}

/// 评语引擎
///
/// 只持有不可变的配置和编译好的占位符模式，可以在多个任务间共享。
#[derive(Debug, Clone)]
pub struct RemarkEngine {
    options: EngineOptions,
    templates: TemplateEngine,
}

impl RemarkEngine {
    /// 校验选项并构建引擎
    pub fn new(options: EngineOptions) -> AppResult<Self> {
        options.labels.validate()?;
        let templates = TemplateEngine::new(
            &options.labels.placeholder_open,
            &options.labels.placeholder_close,
        )?;
        Ok(Self { options, templates })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// 识别表格结构
    pub fn detect_structure(&self, grid: &Grid) -> DetectionOutcome {
        StructureDetector::new(&self.options).detect(grid)
    }

    /// 按已识别的结构为每名学生生成评语
    pub fn merge_remarks(&self, grid: &Grid, structure: &RemarkStructure) -> MergeResultSummary {
        RemarkMerger::new(&self.options, &self.templates).merge(grid, structure)
    }

    /// 单独填充一个模板（供界面预览等场景使用）
    pub fn fill_template(&self, template: &str, context: &TemplateContext) -> String {
        self.templates.fill(template, context)
    }
}
