pub mod grid;
pub mod labels;
pub mod loaders;
pub mod remark;

pub use grid::{Cell, Grid};
pub use labels::{LabelOverrides, RemarkLabels};
pub use loaders::{
    load_all_grid_files, load_grid_document, load_label_overrides, load_labels, GridDocument,
};
pub use remark::{
    ColumnRange, DetectionOutcome, IssueType, MergeResultRow, MergeResultSummary,
    RemarkStructure, ValidationIssue,
};
