use serde_json::{Number, Value};

use crate::util::hash::DeterministicHasher;

/// One named column of a dataset, values in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// Ordered collection of named columns of equal length. Read-only once
/// built; expectations only ever observe it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Assembles columns from row objects in first-seen key order.
    /// Missing keys become nulls, and string cells are coerced into
    /// typed scalars so CSV input behaves like typed input.
    pub fn from_rows(rows: &[Value]) -> Self {
        let mut names: Vec<String> = Vec::new();
        for row in rows {
            if let Value::Object(map) = row {
                for key in map.keys() {
                    if !names.iter().any(|name| name == key) {
                        names.push(key.clone());
                    }
                }
            }
        }

        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(rows.len()),
            })
            .collect();

        for row in rows {
            let map = match row {
                Value::Object(map) => Some(map),
                _ => None,
            };
            for column in &mut columns {
                let cell = map
                    .and_then(|map| map.get(&column.name))
                    .cloned()
                    .unwrap_or(Value::Null);
                column.values.push(coerce_cell(cell));
            }
        }

        Self {
            columns,
            row_count: rows.len(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Deterministic fingerprint over column names and cell contents,
    /// used as the default batch identifier.
    pub fn fingerprint(&self) -> String {
        let mut hasher = DeterministicHasher::new();
        for column in &self.columns {
            hasher.update_len_prefixed(column.name.as_bytes());
            for value in &column.values {
                let cell = serde_json::to_string(value)
                    .unwrap_or_else(|_| "<serialization-error>".to_string());
                hasher.update_len_prefixed(cell.as_bytes());
            }
        }
        hasher.finish_hex()
    }
}

fn coerce_cell(value: Value) -> Value {
    match value {
        Value::String(text) => coerce_string(text),
        other => other,
    }
}

fn coerce_string(text: String) -> Value {
    match text.as_str() {
        "" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match parse_number(text.as_str()) {
            Some(number) => Value::Number(number),
            None => Value::String(text),
        },
    }
}

fn parse_number(input: &str) -> Option<Number> {
    if let Ok(parsed) = input.parse::<i64>() {
        return Some(Number::from(parsed));
    }
    if let Ok(parsed) = input.parse::<u64>() {
        return Some(Number::from(parsed));
    }
    // An integer literal too large for u64/i64 stays a string rather
    // than becoming a lossy float.
    if is_integer_literal(input) {
        return None;
    }
    if !input
        .bytes()
        .all(|byte| byte.is_ascii_digit() || matches!(byte, b'-' | b'+' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    let parsed = input.parse::<f64>().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Number::from_f64(parsed)
}

fn is_integer_literal(input: &str) -> bool {
    let bytes = input.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut index = 0;
    if bytes[index] == b'-' {
        index += 1;
        if index == bytes.len() {
            return false;
        }
    }
    bytes[index..].iter().all(|byte| byte.is_ascii_digit())
}
