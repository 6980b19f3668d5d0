/// Errors that can occur while reading or writing MAT-files
#[derive(Debug, thiserror::Error)]
pub enum MatError {
    /// I/O error during file operations or decompression
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not a Level 5 MAT-file (Level 4, v7.3/HDF5, or not a MAT-file at all)
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A data element extends past the end of its enclosing buffer
    #[error("Truncated data element at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        /// Offset of the element within its buffer
        offset: usize,
        /// Bytes the element claims
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// Unknown data element type code
    #[error("Unknown data type {0}")]
    UnknownDataType(u32),

    /// Unknown array class code
    #[error("Unknown array class {0}")]
    UnknownArrayClass(u8),

    /// A data element had a type that is not valid at its position
    #[error("Unexpected {found} where {expected} was expected")]
    UnexpectedElement {
        /// What the parser required
        expected: &'static str,
        /// What it found
        found: String,
    },

    /// Structurally invalid array contents
    #[error("Invalid array structure: {0}")]
    InvalidStructure(String),

    /// Character data that cannot be decoded
    #[error("Invalid character data: {0}")]
    InvalidText(String),

    /// Model value the writer cannot express
    #[error("Unsupported value for writing: {0}")]
    UnsupportedValue(String),
}
