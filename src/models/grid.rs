//! 表格数据模型
//!
//! 外部读表组件把电子表格转换成二维单元格数组，本模块只负责承载这份数据，
//! 并提供唯一的带边界检查的读取入口。

use serde::{Deserialize, Serialize};

/// 单元格取值
///
/// JSON 中的 `null`、字符串、数字、布尔值可直接反序列化。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// 布尔值
    Bool(bool),
    /// 数字
    Number(f64),
    /// 文本
    Text(String),
    /// 空单元格或越界位置
    #[default]
    Empty,
}

/// 越界读取时返回的哨兵值
static ABSENT: Cell = Cell::Empty;

impl Cell {
    /// 渲染为文本，空单元格返回空串
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => b.to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// 去掉首尾空白后是否为空
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Empty => true,
            _ => false,
        }
    }
}

/// 整数形式的数字不带小数点输出
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 行优先、从 0 开始索引的二维表格
///
/// 行可以长短不一，任何越界位置都视为空单元格。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// 从字符串二维数组构建，空串视为空单元格（主要用于测试和示例数据）
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|s| {
                        let s = s.as_ref();
                        if s.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(s.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// 行数
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 指定行的实际长度，越界行为 0
    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    /// 唯一的单元格读取入口，越界返回 `Cell::Empty`
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&ABSENT)
    }

    /// 单元格文本（未去空白）
    pub fn text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).as_text()
    }

    /// 单元格文本（已去首尾空白）
    pub fn trimmed(&self, row: usize, col: usize) -> String {
        self.text(row, col).trim().to_string()
    }

    /// 指定行最后一个非空单元格的列号
    pub fn last_populated_col(&self, row: usize) -> Option<usize> {
        (0..self.row_len(row))
            .rev()
            .find(|&col| !self.cell(row, col).is_blank())
    }

    /// 整行文本，保持原始长度
    pub fn row_texts(&self, row: usize) -> Vec<String> {
        (0..self.row_len(row)).map(|col| self.text(row, col)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_reads_are_empty() {
        let grid = Grid::from_strings(vec![vec!["a", "b"], vec!["c"]]);

        assert_eq!(grid.cell(1, 1), &Cell::Empty);
        assert_eq!(grid.cell(9, 0), &Cell::Empty);
        assert_eq!(grid.text(1, 5), "");
        assert_eq!(grid.row_len(7), 0);
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(Cell::Number(3.0).as_text(), "3");
        assert_eq!(Cell::Number(2.5).as_text(), "2.5");
        assert_eq!(Cell::Bool(true).as_text(), "true");
    }

    #[test]
    fn test_deserialize_mixed_json_row() {
        let grid: Grid = serde_json::from_str(r#"[["Minh", 9, null, true]]"#).unwrap();

        assert_eq!(grid.cell(0, 0), &Cell::Text("Minh".to_string()));
        assert_eq!(grid.cell(0, 1), &Cell::Number(9.0));
        assert_eq!(grid.cell(0, 2), &Cell::Empty);
        assert_eq!(grid.cell(0, 3), &Cell::Bool(true));
    }

    #[test]
    fn test_last_populated_col_ignores_trailing_blanks() {
        let grid = Grid::from_strings(vec![vec!["a", "", "b", " ", ""]]);
        assert_eq!(grid.last_populated_col(0), Some(2));
        assert_eq!(grid.last_populated_col(3), None);
    }
}
