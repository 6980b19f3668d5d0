//! # Array to JSON Converter
//!
//! Maps the variables of a MAT-file onto a JSON document. The conversion is a
//! pure function of the array tree: no I/O, no shared state.
//!
//! ## Output Shape
//!
//! The document is a JSON array with one single-key object per variable, in
//! file order. An empty variable name becomes the literal key `""` (two quote
//! characters). Values follow the first matching [`Rule`]:
//!
//! | Rule | Applies to | JSON |
//! |------|------------|------|
//! | empty | 0-element cell / numeric / char field | `{}` / `[]` / `""` |
//! | row-string | 1-row char field | `"text"` |
//! | scalar-matrix | 1-element numeric or sparse field | `true`, `3.5`, or `"+2.0j"` if complex |
//! | struct | any struct or object | `{"type": "1x1 struct", field: ...}` |
//! | function-handle | any function handle | `{"function_handle": "1x1", "content": ...}` |
//! | foreign | opaque object field | `"1x1 java.io.File (Java)"` |
//! | fallback | any other field | `"2x2 double"` |
//!
//! Only scalar structs list their fields; struct arrays show just the type
//! line. Complex scalars keep only the imaginary part, as `"+{imag}j"`, with
//! the imaginary part written the way the JVM prints a `double` (`2.0`,
//! `1.0E7`, `1.0E-4`).

mod rules;

#[cfg(test)]
mod tests;

use serde_json::{Map, Value};

use crate::mat::{ArrayEntry, ArrayNode, StructArray};

pub use rules::{dim_string, Rule, PRECEDENCE};

/// Key used for variables whose name is empty
pub const EMPTY_NAME_KEY: &str = "\"\"";

/// Options controlling the rendered text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Tag appended to foreign objects, e.g. `"1x1 java.io.File (Java)"`
    pub foreign_tag: String,
    /// Pretty-print the JSON text
    pub pretty: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            foreign_tag: "Java".to_string(),
            pretty: false,
        }
    }
}

/// Converter from array trees to JSON
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: RenderOptions,
}

impl Converter {
    /// Create a converter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with custom options
    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Options in use
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Convert variables to JSON text
    pub fn convert(&self, entries: &[ArrayEntry]) -> String {
        let document = self.to_value(entries);
        if self.options.pretty {
            format!("{:#}", document)
        } else {
            document.to_string()
        }
    }

    /// Convert variables to a JSON value tree
    pub fn to_value(&self, entries: &[ArrayEntry]) -> Value {
        let objects = entries
            .iter()
            .map(|entry| {
                let key = if entry.name.is_empty() {
                    EMPTY_NAME_KEY.to_string()
                } else {
                    entry.name.clone()
                };
                let mut object = Map::new();
                object.insert(key, self.render(&entry.value, false));
                Value::Object(object)
            })
            .collect();
        Value::Array(objects)
    }

    /// Rule that [`Converter::render`] applies to `node`
    pub fn classify(&self, node: &ArrayNode, in_field: bool) -> Option<Rule> {
        Rule::classify(node, in_field)
    }

    /// Render one array node.
    ///
    /// `in_field` is true when the node is the value of a named field. Nodes
    /// outside a field that match no rule render as an empty object.
    pub fn render(&self, node: &ArrayNode, in_field: bool) -> Value {
        match Rule::classify(node, in_field) {
            Some(rule) => self.apply(rule, node),
            None => Value::Object(Map::new()),
        }
    }

    fn apply(&self, rule: Rule, node: &ArrayNode) -> Value {
        match (rule, node) {
            (Rule::Empty, ArrayNode::Cell(_)) => Value::Object(Map::new()),
            (Rule::Empty, ArrayNode::Char(_)) => Value::String(String::new()),
            (Rule::Empty, _) => Value::Array(Vec::new()),
            (Rule::RowString, ArrayNode::Char(chars)) => Value::String(chars.text.clone()),
            (Rule::ScalarMatrix, ArrayNode::Matrix(matrix)) => scalar_value(
                matrix.is_logical,
                matrix.real.first().copied().unwrap_or(0.0),
                matrix.imag.as_ref().map(|imag| imag.first().copied().unwrap_or(0.0)),
            ),
            (Rule::ScalarMatrix, ArrayNode::Sparse(sparse)) => {
                let (real, imag) = sparse.value_at(0);
                scalar_value(sparse.is_logical, real, imag)
            }
            (Rule::Struct, ArrayNode::Struct(structure)) => self.struct_value(structure),
            (Rule::FunctionHandle, ArrayNode::FunctionHandle(handle)) => {
                let mut object = Map::new();
                object.insert(
                    "function_handle".to_string(),
                    Value::String(dim_string(&handle.dims)),
                );
                object.insert("content".to_string(), self.render(&handle.content, true));
                Value::Object(object)
            }
            (Rule::Foreign, ArrayNode::Opaque(object)) => Value::String(format!(
                "{} {} ({})",
                dim_string(&object.dims),
                object.class_name,
                self.options.foreign_tag
            )),
            _ => Value::String(format!(
                "{} {}",
                dim_string(node.dims()),
                node.type_name()
            )),
        }
    }

    fn struct_value(&self, structure: &StructArray) -> Value {
        let class = match &structure.class {
            Some(class) => class.qualified(),
            None => "struct".to_string(),
        };

        let mut object = Map::new();
        object.insert(
            "type".to_string(),
            Value::String(format!("{} {}", dim_string(&structure.dims), class)),
        );

        let numel: usize = structure.dims.iter().product();
        if numel == 1 {
            for (name, value) in structure.element(0) {
                object.insert(name.to_string(), self.render(value, true));
            }
        }
        Value::Object(object)
    }
}

/// Convert with default options
pub fn convert(entries: &[ArrayEntry]) -> String {
    Converter::new().convert(entries)
}

fn scalar_value(is_logical: bool, real: f64, imag: Option<f64>) -> Value {
    if is_logical {
        return Value::Bool(real != 0.0);
    }
    if let Some(imag) = imag {
        return Value::String(format!("+{}j", jvm_double(imag)));
    }
    number_value(real)
}

/// Text of a `double` as the JVM prints it: plain decimal for magnitudes in
/// `[1e-3, 1e7)`, otherwise `d.dddE[-]n`, always with a fractional digit.
pub fn jvm_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return format!("{:?}", value);
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    if mantissa.contains('.') {
        format!("{}E{}", mantissa, exponent)
    } else {
        format!("{}.0E{}", mantissa, exponent)
    }
}

/// JSON has no NaN or infinities, so those become MATLAB-style strings
fn number_value(value: f64) -> Value {
    if value.is_nan() {
        Value::String("NaN".to_string())
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Inf" } else { "-Inf" };
        Value::String(text.to_string())
    } else {
        Value::from(value)
    }
}
