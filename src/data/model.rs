use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Well-known column names
// ---------------------------------------------------------------------------

/// Column names the dashboard knows about. Only `ATTRITION` is needed by
/// every summary; the rest are optional and their absence just drops the
/// summaries that depend on them.
pub mod columns {
    pub const ATTRITION: &str = "Attrition";
    pub const DEPARTMENT: &str = "Department";
    pub const AGE: &str = "Age";
    pub const GENDER: &str = "Gender";
    pub const EDUCATION: &str = "Education";
    pub const YEARS_AT_COMPANY: &str = "YearsAtCompany";
    pub const MONTHLY_INCOME: &str = "MonthlyIncome";
    pub const MARITAL_STATUS: &str = "MaritalStatus";
    pub const JOB_ROLE: &str = "JobRole";
    pub const YEARS_SINCE_LAST_PROMOTION: &str = "YearsSinceLastPromotion";
    pub const YEARS_WITH_CURR_MANAGER: &str = "YearsWithCurrManager";
}

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell. Numeric columns hold `Integer`/`Float`,
/// categorical columns hold `Text`; an empty cell is `Null` in either.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so Value can key BTreeMap / BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

/// Renders the cell as it is written back to CSV: integers plain, floats in
/// shortest round-trip form (integral floats keep a trailing `.0` so they
/// reload as floats), null as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                write!(f, "{v:.1}")
            }
            Value::Float(v) => write!(f, "{v}"),
            Value::Null => Ok(()),
        }
    }
}

impl Value {
    /// Numeric view of the cell, `None` for text and null.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if !v.is_nan() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Label used when the cell acts as a category (group key, attrition
    /// label, filter match). `None` for null.
    pub fn label(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// One named column of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
}

impl Column {
    /// Build a column from raw text cells, inferring its kind.
    ///
    /// The column is numeric when every non-empty cell parses as a number and
    /// at least one cell is non-empty. Numeric cells become `Integer` when the
    /// whole column parses as `i64`, otherwise `Float`. Anything else is
    /// categorical text.
    pub fn infer<I, S>(name: impl Into<String>, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<S> = raw.into_iter().collect();
        let cells: Vec<&str> = raw.iter().map(|s| s.as_ref().trim()).collect();
        let non_empty = cells.iter().filter(|c| !c.is_empty());

        let mut any = false;
        let mut all_int = true;
        let mut all_num = true;
        for c in non_empty {
            any = true;
            if c.parse::<i64>().is_err() {
                all_int = false;
                if c.parse::<f64>().is_err() {
                    all_num = false;
                    break;
                }
            }
        }

        let (kind, values) = if any && all_num {
            let values = cells
                .iter()
                .map(|c| {
                    if c.is_empty() {
                        Value::Null
                    } else if all_int {
                        c.parse::<i64>().map(Value::Integer).unwrap_or(Value::Null)
                    } else {
                        c.parse::<f64>().map(Value::Float).unwrap_or(Value::Null)
                    }
                })
                .collect();
            (ColumnKind::Numeric, values)
        } else {
            let values = cells
                .iter()
                .map(|c| {
                    if c.is_empty() {
                        Value::Null
                    } else {
                        Value::Text((*c).to_string())
                    }
                })
                .collect();
            (ColumnKind::Categorical, values)
        };

        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    /// Sorted distinct non-null values.
    pub fn unique_values(&self) -> BTreeSet<Value> {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }

    /// The non-null numeric cells, in row order.
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(Value::as_f64)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Columnar, immutable table. Every column has the same number of rows.
///
/// The name → position index is the explicit schema: operations check it
/// before touching an optional column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    index: BTreeMap<String, usize>,
    n_rows: usize,
}

impl Dataset {
    /// Assemble a dataset from columns of equal length.
    ///
    /// Returns `None` when the lengths disagree or a column name repeats.
    pub fn from_columns(columns: Vec<Column>) -> Option<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        if columns.iter().any(|c| c.len() != n_rows) {
            return None;
        }
        let mut index = BTreeMap::new();
        for (i, col) in columns.iter().enumerate() {
            if index.insert(col.name.clone(), i).is_some() {
                return None;
            }
        }
        Some(Dataset {
            columns,
            index,
            n_rows,
        })
    }

    /// Build a dataset from a header and row-major raw text cells, inferring
    /// column kinds the same way the CSV loader does. Short rows are padded
    /// with empty cells.
    pub fn from_rows<H, R, S>(headers: &[H], rows: &[R]) -> Option<Self>
    where
        H: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let raw: Vec<&str> = rows
                    .iter()
                    .map(|row| row.as_ref().get(col_idx).map(|s| s.as_ref()).unwrap_or(""))
                    .collect();
                Column::infer(name.as_ref(), raw)
            })
            .collect();
        Self::from_columns(columns)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    /// Numeric columns in schema order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    /// New dataset holding the given rows, in the order given. Schema and
    /// column kinds are preserved. Out-of-range indices are ignored.
    pub fn take(&self, indices: &[usize]) -> Dataset {
        let indices: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.n_rows)
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Dataset {
            columns,
            index: self.index.clone(),
            n_rows: indices.len(),
        }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        let indices: Vec<usize> = (0..n.min(self.n_rows)).collect();
        self.take(&indices)
    }
}
