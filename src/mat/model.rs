//! In-memory model of the variables stored in a MAT-file.
//!
//! Every array variant carries its dimensions; the number of elements is always
//! the product of those dimensions, and zero elements is the "empty" state
//! regardless of variant.

use std::fmt;

/// One named top-level variable of a MAT-file.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEntry {
    /// Variable name (may be empty)
    pub name: String,
    /// Variable payload
    pub value: ArrayNode,
}

impl ArrayEntry {
    /// Create a new named entry
    pub fn new(name: impl Into<String>, value: ArrayNode) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Storage class of a numeric matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericClass {
    /// 64-bit floating point
    #[default]
    Double,
    /// 32-bit floating point
    Single,
    /// Signed 8-bit integer
    Int8,
    /// Unsigned 8-bit integer
    UInt8,
    /// Signed 16-bit integer
    Int16,
    /// Unsigned 16-bit integer
    UInt16,
    /// Signed 32-bit integer
    Int32,
    /// Unsigned 32-bit integer
    UInt32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 64-bit integer
    UInt64,
}

impl NumericClass {
    /// MATLAB class name
    pub fn name(&self) -> &'static str {
        match self {
            NumericClass::Double => "double",
            NumericClass::Single => "single",
            NumericClass::Int8 => "int8",
            NumericClass::UInt8 => "uint8",
            NumericClass::Int16 => "int16",
            NumericClass::UInt16 => "uint16",
            NumericClass::Int32 => "int32",
            NumericClass::UInt32 => "uint32",
            NumericClass::Int64 => "int64",
            NumericClass::UInt64 => "uint64",
        }
    }
}

impl fmt::Display for NumericClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dense numeric or logical array.
///
/// Values are stored in column-major order, widened to `f64`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    /// Dimensions
    pub dims: Vec<usize>,
    /// Storage class
    pub class: NumericClass,
    /// Whether the array holds logical (boolean) values
    pub is_logical: bool,
    /// Real parts
    pub real: Vec<f64>,
    /// Imaginary parts, present only for complex arrays
    pub imag: Option<Vec<f64>>,
}

impl Matrix {
    /// Real double matrix
    pub fn new(dims: Vec<usize>, real: Vec<f64>) -> Self {
        Self {
            dims,
            real,
            ..Default::default()
        }
    }

    /// 1x1 double
    pub fn scalar(value: f64) -> Self {
        Self::new(vec![1, 1], vec![value])
    }

    /// 1x1 complex double
    pub fn complex_scalar(re: f64, im: f64) -> Self {
        Self {
            dims: vec![1, 1],
            real: vec![re],
            imag: Some(vec![im]),
            ..Default::default()
        }
    }

    /// 1x1 logical
    pub fn logical_scalar(value: bool) -> Self {
        Self {
            dims: vec![1, 1],
            class: NumericClass::UInt8,
            is_logical: true,
            real: vec![if value { 1.0 } else { 0.0 }],
            imag: None,
        }
    }

    /// Empty 0x0 double
    pub fn empty() -> Self {
        Self::new(vec![0, 0], Vec::new())
    }

    /// Set the storage class
    pub fn with_class(mut self, class: NumericClass) -> Self {
        self.class = class;
        self
    }

    /// Whether imaginary parts are present
    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }
}

/// Character array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharArray {
    /// Dimensions
    pub dims: Vec<usize>,
    /// Decoded characters in column-major order
    pub text: String,
}

impl CharArray {
    /// A 1xN row string
    pub fn row(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            dims: vec![1, text.chars().count()],
            text,
        }
    }

    /// Number of rows (first dimension)
    pub fn rows(&self) -> usize {
        self.dims.first().copied().unwrap_or(0)
    }
}

/// Cell array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellArray {
    /// Dimensions
    pub dims: Vec<usize>,
    /// Elements in column-major order
    pub elements: Vec<ArrayNode>,
}

/// Class of an object (`mxOBJECT_CLASS`) struct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassName {
    /// Package path, empty when the class is not in a package
    pub package: String,
    /// Class name without the package
    pub name: String,
}

impl ClassName {
    /// Split a fully qualified class name at its last `.`
    pub fn parse(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((package, name)) => Self {
                package: package.to_string(),
                name: name.to_string(),
            },
            None => Self {
                package: String::new(),
                name: qualified.to_string(),
            },
        }
    }

    /// `package.class`, or just `class` outside a package
    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// Struct array, or an object struct when `class` is set.
///
/// Field values are stored element-major: element `i`'s value for field `j`
/// lives at `values[i * field_names.len() + j]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructArray {
    /// Dimensions
    pub dims: Vec<usize>,
    /// Object class, `None` for plain structs
    pub class: Option<ClassName>,
    /// Ordered field names
    pub field_names: Vec<String>,
    /// Field values, element-major
    pub values: Vec<ArrayNode>,
}

impl StructArray {
    /// 1x1 struct from ordered `(name, value)` pairs
    pub fn scalar<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, ArrayNode)>,
        S: Into<String>,
    {
        let (field_names, values) = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        Self {
            dims: vec![1, 1],
            class: None,
            field_names,
            values,
        }
    }

    /// Turn this struct into an object of the given fully qualified class
    pub fn with_class(mut self, qualified: &str) -> Self {
        self.class = Some(ClassName::parse(qualified));
        self
    }

    /// Iterate `(name, value)` pairs of element `index`
    pub fn element(&self, index: usize) -> impl Iterator<Item = (&str, &ArrayNode)> {
        let width = self.field_names.len();
        let start = index * width;
        self.field_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().skip(start).take(width))
    }
}

/// Sparse matrix in compressed-column form.
///
/// Column `c` owns the stored values `column_starts[c]..column_starts[c + 1]`;
/// `row_indices` gives the row of each stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseArray {
    /// Dimensions
    pub dims: Vec<usize>,
    /// Logical sparse
    pub is_logical: bool,
    /// Row of each stored value
    pub row_indices: Vec<usize>,
    /// Offset of each column's first stored value, plus the end offset
    pub column_starts: Vec<usize>,
    /// Real parts of the stored values
    pub real: Vec<f64>,
    /// Imaginary parts of the stored values, present only for complex sparse
    pub imag: Option<Vec<f64>>,
}

impl SparseArray {
    /// 1x1 sparse double holding `value` (stored even when zero)
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: vec![1, 1],
            row_indices: vec![0],
            column_starts: vec![0, 1],
            real: vec![value],
            ..Default::default()
        }
    }

    /// Number of stored values
    pub fn nnz(&self) -> usize {
        self.real.len()
    }

    /// Whether imaginary parts are present
    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }

    /// Real and imaginary part at column-major element `index`.
    ///
    /// Elements without a stored value are zero; the imaginary part is `None`
    /// for real arrays.
    pub fn value_at(&self, index: usize) -> (f64, Option<f64>) {
        let rows = self.dims.first().copied().unwrap_or(0).max(1);
        let (row, column) = (index % rows, index / rows);
        let stored = match (self.column_starts.get(column), self.column_starts.get(column + 1)) {
            (Some(&start), Some(&end)) if start <= end => (start..end)
                .find(|&k| self.row_indices.get(k) == Some(&row)),
            _ => None,
        };
        let real = stored.and_then(|k| self.real.get(k)).copied().unwrap_or(0.0);
        let imag = self
            .imag
            .as_ref()
            .map(|imag| stored.and_then(|k| imag.get(k)).copied().unwrap_or(0.0));
        (real, imag)
    }
}

/// Function handle with its workspace/metadata content.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionHandle {
    /// Dimensions
    pub dims: Vec<usize>,
    /// Handle description (usually a struct)
    pub content: Box<ArrayNode>,
}

/// Foreign object without a convertible payload (e.g. a Java object).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpaqueObject {
    /// Dimensions
    pub dims: Vec<usize>,
    /// Type system that owns the object (`java`, `MCOS`, ...)
    pub type_system: String,
    /// Foreign class name
    pub class_name: String,
}

/// A typed, dimensioned array value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayNode {
    /// Numeric or logical matrix
    Matrix(Matrix),
    /// Character array
    Char(CharArray),
    /// Cell array
    Cell(CellArray),
    /// Struct or object struct
    Struct(StructArray),
    /// Sparse matrix
    Sparse(SparseArray),
    /// Function handle
    FunctionHandle(FunctionHandle),
    /// Foreign object
    Opaque(OpaqueObject),
}

impl ArrayNode {
    /// Dimensions of the array
    pub fn dims(&self) -> &[usize] {
        match self {
            ArrayNode::Matrix(m) => &m.dims,
            ArrayNode::Char(c) => &c.dims,
            ArrayNode::Cell(c) => &c.dims,
            ArrayNode::Struct(s) => &s.dims,
            ArrayNode::Sparse(s) => &s.dims,
            ArrayNode::FunctionHandle(h) => &h.dims,
            ArrayNode::Opaque(o) => &o.dims,
        }
    }

    /// Product of the dimensions
    pub fn num_elements(&self) -> usize {
        self.dims().iter().product()
    }

    /// Whether the array has no elements
    pub fn is_empty(&self) -> bool {
        self.num_elements() == 0
    }

    /// MATLAB type token used in summaries such as `"2x3 double"`
    pub fn type_name(&self) -> &'static str {
        match self {
            ArrayNode::Matrix(m) if m.is_logical => "logical",
            ArrayNode::Matrix(m) => m.class.name(),
            ArrayNode::Char(_) => "char",
            ArrayNode::Cell(_) => "cell",
            ArrayNode::Struct(s) if s.class.is_some() => "object",
            ArrayNode::Struct(_) => "struct",
            ArrayNode::Sparse(_) => "sparse",
            ArrayNode::FunctionHandle(_) => "function_handle",
            ArrayNode::Opaque(_) => "opaque",
        }
    }
}

impl From<Matrix> for ArrayNode {
    fn from(value: Matrix) -> Self {
        ArrayNode::Matrix(value)
    }
}

impl From<CharArray> for ArrayNode {
    fn from(value: CharArray) -> Self {
        ArrayNode::Char(value)
    }
}

impl From<CellArray> for ArrayNode {
    fn from(value: CellArray) -> Self {
        ArrayNode::Cell(value)
    }
}

impl From<StructArray> for ArrayNode {
    fn from(value: StructArray) -> Self {
        ArrayNode::Struct(value)
    }
}

impl From<SparseArray> for ArrayNode {
    fn from(value: SparseArray) -> Self {
        ArrayNode::Sparse(value)
    }
}

impl From<FunctionHandle> for ArrayNode {
    fn from(value: FunctionHandle) -> Self {
        ArrayNode::FunctionHandle(value)
    }
}

impl From<OpaqueObject> for ArrayNode {
    fn from(value: OpaqueObject) -> Self {
        ArrayNode::Opaque(value)
    }
}
