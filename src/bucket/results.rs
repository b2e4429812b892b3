//! Tabular results produced by buckets and their two render paths

use crate::error::{DigError, Result};
use crate::output::format_table;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// A single table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
}

impl Value {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::Int(i) => JsonValue::from(*i),
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::List(items) => JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => write!(f, "[{}]", items.join(" ")),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

/// Which parts of a result get rendered. Unset fields mean shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_name: Option<bool>,
    pub show_comments: Option<bool>,
    pub show_data: Option<bool>,
    pub output_width: usize,
}

impl RenderOptions {
    pub fn new(output_width: usize) -> Self {
        Self {
            output_width,
            ..Default::default()
        }
    }

    /// Hide the bucket name and the comments, the form used by `ls` and `version`
    pub fn bare(output_width: usize) -> Self {
        Self {
            show_name: Some(false),
            show_comments: Some(false),
            show_data: None,
            output_width,
        }
    }

    pub fn name_shown(&self) -> bool {
        self.show_name.unwrap_or(true)
    }

    pub fn comments_shown(&self) -> bool {
        self.show_comments.unwrap_or(true)
    }

    pub fn data_shown(&self) -> bool {
        self.show_data.unwrap_or(true)
    }
}

/// Findings of one bucket run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Results {
    name: String,
    headers: Vec<String>,
    data: Vec<Vec<Value>>,
    comments: Vec<String>,
}

impl Results {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn set_headers<I, S>(&mut self, headers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }

    pub fn add_content(&mut self, row: Vec<Value>) {
        self.data.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn data(&self) -> &[Vec<Value>] {
        &self.data
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Every row has the same width, and that width matches the headers
    /// whenever both headers and data are present
    pub fn widths_consistent(&self) -> bool {
        let data_width = match self.data.first() {
            Some(first) => first.len(),
            None => 0,
        };
        if self.data.iter().any(|row| row.len() != data_width) {
            return false;
        }
        if self.headers.is_empty() || data_width == 0 {
            return true;
        }
        self.headers.len() == data_width
    }

    /// Banner, comments and boxed table
    pub fn human(&self, opts: &RenderOptions) -> String {
        let mut output = String::new();

        if opts.name_shown() {
            output.push_str(&format!("### {} ###\n", self.name.to_uppercase()));
        }
        if !self.comments.is_empty() && opts.comments_shown() {
            output.push_str("Comments:\n");
            for comment in &self.comments {
                output.push_str(&format!("- {comment}\n"));
            }
        }
        if opts.data_shown() && !self.headers.is_empty() && !self.data.is_empty() {
            let headers: Vec<&str> = self.headers.iter().map(String::as_str).collect();
            let rows: Vec<Vec<String>> = self
                .data
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect();
            output.push_str(&format_table(&headers, &rows, opts.output_width));
            output.push('\n');
        }
        output
    }

    /// Compact JSON. Keys of row objects are sorted.
    pub fn json(&self, opts: &RenderOptions) -> Result<String> {
        if !self.widths_consistent() {
            return Err(DigError::WidthMismatch(self.name.clone()));
        }

        let rows: Vec<JsonValue> = if self.headers.is_empty() {
            Vec::new()
        } else {
            self.data
                .iter()
                .map(|row| {
                    let sorted: BTreeMap<String, JsonValue> = self
                        .headers
                        .iter()
                        .cloned()
                        .zip(row.iter().map(Value::to_json))
                        .collect();
                    JsonValue::Object(sorted.into_iter().collect())
                })
                .collect()
        };

        let rendered = if !opts.name_shown() && !opts.comments_shown() {
            flatten(rows)
        } else {
            let mut envelope = Map::new();
            if opts.name_shown() {
                envelope.insert("bucket".to_string(), JsonValue::String(self.name.clone()));
            }
            if opts.comments_shown() && !self.comments.is_empty() {
                envelope.insert("comments".to_string(), JsonValue::from(self.comments.clone()));
            }
            if opts.data_shown() {
                let key = if rows.len() == 1 { "result" } else { "results" };
                envelope.insert(key.to_string(), flatten(rows));
            }
            JsonValue::Object(envelope)
        };

        Ok(serde_json::to_string(&rendered)?)
    }
}

/// A single row becomes a plain object, anything else stays an array
fn flatten(mut rows: Vec<JsonValue>) -> JsonValue {
    if rows.len() == 1 {
        rows.remove(0)
    } else {
        JsonValue::Array(rows)
    }
}
