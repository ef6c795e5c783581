use crate::error::{ProcessingError, Result};
use crate::models::{ColumnKind, PipelineStage, Value};

/// Ordered, uniformly-columned rows of [`Value`]s.
///
/// Every row has exactly `columns.len()` cells. Columns are looked up by name;
/// a name that is not present is reported as [`ProcessingError::MissingColumn`]
/// tagged with the stage that asked for it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut table = Self::new(columns);
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Row {} has {} cells, expected {}",
                self.rows.len() + 1,
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str, stage: PipelineStage) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ProcessingError::MissingColumn {
                column: name.to_string(),
                stage,
            })
    }

    /// Fails on the first name in `names` that the table lacks.
    pub fn require_columns(&self, names: &[String], stage: PipelineStage) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| self.column_index(name, stage))
            .collect()
    }

    /// All names in `names` that the table lacks, in order.
    pub fn missing_columns<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| !self.has_column(name))
            .cloned()
            .collect()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn column_values(
        &self,
        name: &str,
        stage: PipelineStage,
    ) -> Result<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name, stage)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Applies `f` to every cell of one column in place.
    pub fn map_column<F>(&mut self, name: &str, stage: PipelineStage, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Value),
    {
        let idx = self.column_index(name, stage)?;
        for row in &mut self.rows {
            f(&mut row[idx]);
        }
        Ok(())
    }

    pub fn retain_rows<F>(&mut self, f: F)
    where
        F: FnMut(&Vec<Value>) -> bool,
    {
        self.rows.retain(f);
    }

    /// Appends `name` as the last column, or overwrites it if it already exists.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.columns.iter().position(|c| c == name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// New table holding exactly `names`, in that order, with every row kept.
    pub fn select(&self, names: &[String], stage: PipelineStage) -> Result<Table> {
        let indices = self.require_columns(names, stage)?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table {
            columns: names.to_vec(),
            rows,
        })
    }

    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let idx = self.columns.iter().position(|c| c == name)?;
        let mut kind: Option<ColumnKind> = None;
        let mut saw_null_datetime = false;

        for row in &self.rows {
            if matches!(row[idx], Value::NullDateTime) {
                saw_null_datetime = true;
            }
            let Some(cell_kind) = row[idx].kind() else {
                continue;
            };
            kind = match kind {
                None => Some(cell_kind),
                Some(k) if k == cell_kind => Some(k),
                Some(_) => return Some(ColumnKind::Mixed),
            };
        }

        match kind {
            Some(k) => Some(k),
            None if saw_null_datetime => Some(ColumnKind::DateTime),
            None => Some(ColumnKind::Empty),
        }
    }
}
