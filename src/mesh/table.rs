//! Per-element attribute tables.
//!
//! Faces, edges and face-vertices can carry arbitrary named columns (UVs,
//! colors, weights...). Topology edits never interpret these values; they
//! only need to rebuild a table with the same columns and copy surviving rows
//! across in order. That contract is [`AttributeTable::clone_empty`] plus
//! [`TableCopier::push_row`].

use std::collections::BTreeMap;

use nalgebra::{Vector2, Vector3};

/// A single typed attribute column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Scalar values.
    F64(Vec<f64>),
    /// Integer values.
    I32(Vec<i32>),
    /// Flags.
    Bool(Vec<bool>),
    /// 2D vectors (texture coordinates).
    Vector2(Vec<Vector2<f64>>),
    /// 3D vectors (colors, normals).
    Vector3(Vec<Vector3<f64>>),
}

macro_rules! for_each_column {
    ($column:expr, $values:ident => $body:expr) => {
        match $column {
            Column::F64($values) => $body,
            Column::I32($values) => $body,
            Column::Bool($values) => $body,
            Column::Vector2($values) => $body,
            Column::Vector3($values) => $body,
        }
    };
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        for_each_column!(self, values => values.len())
    }

    /// True if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A column of the same type with no rows.
    pub fn clone_empty(&self) -> Column {
        match self {
            Column::F64(_) => Column::F64(Vec::new()),
            Column::I32(_) => Column::I32(Vec::new()),
            Column::Bool(_) => Column::Bool(Vec::new()),
            Column::Vector2(_) => Column::Vector2(Vec::new()),
            Column::Vector3(_) => Column::Vector3(Vec::new()),
        }
    }

    /// Append row `index` of `source`. Columns of different types are left untouched.
    fn push_from(&mut self, source: &Column, index: usize) {
        match (self, source) {
            (Column::F64(dst), Column::F64(src)) => dst.push(src[index]),
            (Column::I32(dst), Column::I32(src)) => dst.push(src[index]),
            (Column::Bool(dst), Column::Bool(src)) => dst.push(src[index]),
            (Column::Vector2(dst), Column::Vector2(src)) => dst.push(src[index]),
            (Column::Vector3(dst), Column::Vector3(src)) => dst.push(src[index]),
            _ => {}
        }
    }
}

/// A set of named, equally long attribute columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTable {
    columns: BTreeMap<String, Column>,
}

impl AttributeTable {
    /// Create an empty table without columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column and return the table.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Self {
        self.insert_column(name, column);
        self
    }

    /// Add (or replace) a column.
    pub fn insert_column(&mut self, name: impl Into<String>, column: Column) {
        self.columns.insert(name.into(), column);
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Iterate over `(name, column)` pairs in name order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> + '_ {
        self.columns.iter().map(|(name, column)| (name.as_str(), column))
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True if the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Row count shared by every column.
    ///
    /// Returns `None` when the table has no columns or the columns disagree.
    pub fn row_count(&self) -> Option<usize> {
        let mut lengths = self.columns.values().map(Column::len);
        let first = lengths.next()?;
        lengths.all(|len| len == first).then_some(first)
    }

    /// True if the table can describe `count` elements: no columns at all, or
    /// every column exactly `count` rows long.
    pub fn matches_len(&self, count: usize) -> bool {
        self.is_empty() || self.row_count() == Some(count)
    }

    /// A table with the same columns and no rows.
    pub fn clone_empty(&self) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.clone_empty()))
                .collect(),
        }
    }
}

/// Copies rows from a source table into a target built by
/// [`AttributeTable::clone_empty`], keeping columns aligned.
#[derive(Debug)]
pub struct TableCopier<'a> {
    source: &'a AttributeTable,
    target: &'a mut AttributeTable,
}

impl<'a> TableCopier<'a> {
    /// Bind a source/target pair.
    pub fn new(source: &'a AttributeTable, target: &'a mut AttributeTable) -> Self {
        Self { source, target }
    }

    /// Append the source row at `index` to every matching target column.
    ///
    /// # Panics
    /// Panics if `index` is outside the source rows.
    pub fn push_row(&mut self, index: usize) {
        for (name, dst) in self.target.columns.iter_mut() {
            if let Some(src) = self.source.columns.get(name) {
                dst.push_from(src, index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AttributeTable {
        AttributeTable::new()
            .with_column("weight", Column::F64(vec![0.5, 1.5, 2.5]))
            .with_column(
                "uv",
                Column::Vector2(vec![
                    Vector2::new(0.0, 0.0),
                    Vector2::new(1.0, 0.0),
                    Vector2::new(1.0, 1.0),
                ]),
            )
    }

    #[test]
    fn test_row_count() {
        assert_eq!(sample().row_count(), Some(3));
        assert_eq!(AttributeTable::new().row_count(), None);
        assert!(AttributeTable::new().matches_len(17));

        let ragged = sample().with_column("id", Column::I32(vec![1]));
        assert_eq!(ragged.row_count(), None);
        assert!(!ragged.matches_len(3));
    }

    #[test]
    fn test_clone_empty_keeps_columns() {
        let empty = sample().clone_empty();
        assert_eq!(empty.column_count(), 2);
        assert_eq!(empty.row_count(), Some(0));
        assert!(matches!(empty.column("uv"), Some(Column::Vector2(v)) if v.is_empty()));
    }

    #[test]
    fn test_copier_reorders_rows() {
        let source = sample();
        let mut target = source.clone_empty();
        {
            let mut copier = TableCopier::new(&source, &mut target);
            copier.push_row(2);
            copier.push_row(0);
        }

        assert_eq!(target.row_count(), Some(2));
        assert_eq!(target.column("weight"), Some(&Column::F64(vec![2.5, 0.5])));
    }
}
