use crate::Value;
use std::sync::Arc;

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;

/// A fetched row: column labels with the values aligned by index, in select order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub labels: RowNames,
    pub values: Box<[Value]>,
}

impl Row {
    pub fn new(labels: RowNames, values: Box<[Value]>) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .and_then(|i| self.values.get(i))
    }
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Value of the column `column` refers to.
    ///
    /// An index first matches a column literally labelled with that number
    /// (`SELECT 1`), then falls back to the position among the columns.
    pub fn project(&self, column: &ColumnRef) -> Option<&Value> {
        match column {
            ColumnRef::Name(name) => self.get_column(name),
            ColumnRef::Index(index) => self
                .get_column(&index.to_string())
                .or_else(|| self.get_index(*index)),
        }
    }
}

impl From<Row> for Box<[Value]> {
    fn from(value: Row) -> Self {
        value.values
    }
}

/// Column selector of [`crate::ResultSet::fetch_col`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Index(usize),
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        ColumnRef::Name(value.into())
    }
}

impl From<String> for ColumnRef {
    fn from(value: String) -> Self {
        ColumnRef::Name(value)
    }
}

impl From<usize> for ColumnRef {
    fn from(value: usize) -> Self {
        ColumnRef::Index(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(labels: &[&str], values: Vec<Value>) -> Row {
        Row::new(
            labels.iter().map(|v| v.to_string()).collect(),
            values.into(),
        )
    }

    #[test]
    fn project_by_name_and_position() {
        let row = row(&["a", "b"], vec!["x".into(), "y".into()]);
        assert_eq!(row.project(&"b".into()), Some(&Value::from("y")));
        assert_eq!(row.project(&ColumnRef::Index(1)), Some(&Value::from("y")));
        assert_eq!(row.project(&ColumnRef::Index(2)), None);
        assert_eq!(row.project(&"c".into()), None);
    }

    #[test]
    fn project_numeric_label_first() {
        let row = row(&["1", "x"], vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(row.project(&ColumnRef::Index(1)), Some(&Value::Int(1)));
        assert_eq!(row.project(&ColumnRef::Index(0)), Some(&Value::Int(1)));
    }
}
