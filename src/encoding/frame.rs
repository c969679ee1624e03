/// A single feature row with named, ordered columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; a repeated name overwrites the earlier value.
    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.names.iter().position(|n| *n == name) {
            Some(idx) => self.values[idx] = value,
            None => {
                self.names.push(name);
                self.values.push(value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reorder to `columns`: missing columns become 0.0, extra columns are dropped.
    pub fn reindex<S: AsRef<str>>(&self, columns: &[S]) -> FeatureFrame {
        let mut out = FeatureFrame {
            names: Vec::with_capacity(columns.len()),
            values: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            let column = column.as_ref();
            out.names.push(column.to_string());
            out.values.push(self.get(column).unwrap_or(0.0));
        }
        out
    }
}
