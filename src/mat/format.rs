//! Level 5 MAT-file constants: data element types and array classes.

use super::model::NumericClass;

/// Length of the fixed file header
pub const HEADER_LEN: usize = 128;
/// Length of the descriptive text at the start of the header
pub const HEADER_TEXT_LEN: usize = 116;
/// Version stored in bytes 124..126
pub const VERSION_5: u16 = 0x0100;

/// Array flag bit: complex
pub const FLAG_COMPLEX: u8 = 0x08;
/// Array flag bit: logical
pub const FLAG_LOGICAL: u8 = 0x02;

/// Byte order of the file, taken from the header endian indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// `IM` indicator
    #[default]
    Little,
    /// `MI` indicator
    Big,
}

impl Endian {
    /// Decode the two indicator bytes at offset 126
    pub fn from_indicator(bytes: [u8; 2]) -> Option<Self> {
        match &bytes {
            b"IM" => Some(Endian::Little),
            b"MI" => Some(Endian::Big),
            _ => None,
        }
    }

    /// Indicator bytes written for this byte order
    pub fn indicator(&self) -> [u8; 2] {
        match self {
            Endian::Little => *b"IM",
            Endian::Big => *b"MI",
        }
    }
}

/// Data element types (`miXXX`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// miINT8
    Int8,
    /// miUINT8
    UInt8,
    /// miINT16
    Int16,
    /// miUINT16
    UInt16,
    /// miINT32
    Int32,
    /// miUINT32
    UInt32,
    /// miSINGLE
    Single,
    /// miDOUBLE
    Double,
    /// miINT64
    Int64,
    /// miUINT64
    UInt64,
    /// miMATRIX
    Matrix,
    /// miCOMPRESSED
    Compressed,
    /// miUTF8
    Utf8,
    /// miUTF16
    Utf16,
    /// miUTF32
    Utf32,
}

impl DataType {
    /// Decode a tag type code
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(DataType::Int8),
            2 => Some(DataType::UInt8),
            3 => Some(DataType::Int16),
            4 => Some(DataType::UInt16),
            5 => Some(DataType::Int32),
            6 => Some(DataType::UInt32),
            7 => Some(DataType::Single),
            9 => Some(DataType::Double),
            12 => Some(DataType::Int64),
            13 => Some(DataType::UInt64),
            14 => Some(DataType::Matrix),
            15 => Some(DataType::Compressed),
            16 => Some(DataType::Utf8),
            17 => Some(DataType::Utf16),
            18 => Some(DataType::Utf32),
            _ => None,
        }
    }

    /// Tag type code
    pub fn code(&self) -> u32 {
        match self {
            DataType::Int8 => 1,
            DataType::UInt8 => 2,
            DataType::Int16 => 3,
            DataType::UInt16 => 4,
            DataType::Int32 => 5,
            DataType::UInt32 => 6,
            DataType::Single => 7,
            DataType::Double => 9,
            DataType::Int64 => 12,
            DataType::UInt64 => 13,
            DataType::Matrix => 14,
            DataType::Compressed => 15,
            DataType::Utf8 => 16,
            DataType::Utf16 => 17,
            DataType::Utf32 => 18,
        }
    }

    /// Size of one value in bytes (0 for container types)
    pub fn byte_size(&self) -> usize {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Utf8 => 1,
            DataType::Int16 | DataType::UInt16 | DataType::Utf16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Single | DataType::Utf32 => 4,
            DataType::Double | DataType::Int64 | DataType::UInt64 => 8,
            DataType::Matrix | DataType::Compressed => 0,
        }
    }
}

/// Array classes (`mxXXX_CLASS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayClass {
    /// mxCELL_CLASS
    Cell,
    /// mxSTRUCT_CLASS
    Struct,
    /// mxOBJECT_CLASS
    Object,
    /// mxCHAR_CLASS
    Char,
    /// mxSPARSE_CLASS
    Sparse,
    /// Numeric classes
    Numeric(NumericClass),
    /// mxFUNCTION_CLASS
    Function,
    /// mxOPAQUE_CLASS
    Opaque,
}

impl ArrayClass {
    /// Decode the class byte of the array flags
    pub fn from_code(code: u8) -> Option<Self> {
        let class = match code {
            1 => ArrayClass::Cell,
            2 => ArrayClass::Struct,
            3 => ArrayClass::Object,
            4 => ArrayClass::Char,
            5 => ArrayClass::Sparse,
            6 => ArrayClass::Numeric(NumericClass::Double),
            7 => ArrayClass::Numeric(NumericClass::Single),
            8 => ArrayClass::Numeric(NumericClass::Int8),
            9 => ArrayClass::Numeric(NumericClass::UInt8),
            10 => ArrayClass::Numeric(NumericClass::Int16),
            11 => ArrayClass::Numeric(NumericClass::UInt16),
            12 => ArrayClass::Numeric(NumericClass::Int32),
            13 => ArrayClass::Numeric(NumericClass::UInt32),
            14 => ArrayClass::Numeric(NumericClass::Int64),
            15 => ArrayClass::Numeric(NumericClass::UInt64),
            16 => ArrayClass::Function,
            17 => ArrayClass::Opaque,
            _ => return None,
        };
        Some(class)
    }

    /// Class byte for the array flags
    pub fn code(&self) -> u8 {
        match self {
            ArrayClass::Cell => 1,
            ArrayClass::Struct => 2,
            ArrayClass::Object => 3,
            ArrayClass::Char => 4,
            ArrayClass::Sparse => 5,
            ArrayClass::Numeric(class) => match class {
                NumericClass::Double => 6,
                NumericClass::Single => 7,
                NumericClass::Int8 => 8,
                NumericClass::UInt8 => 9,
                NumericClass::Int16 => 10,
                NumericClass::UInt16 => 11,
                NumericClass::Int32 => 12,
                NumericClass::UInt32 => 13,
                NumericClass::Int64 => 14,
                NumericClass::UInt64 => 15,
            },
            ArrayClass::Function => 16,
            ArrayClass::Opaque => 17,
        }
    }
}

/// Storage type used when writing values of a numeric class
pub fn storage_type(class: NumericClass) -> DataType {
    match class {
        NumericClass::Double => DataType::Double,
        NumericClass::Single => DataType::Single,
        NumericClass::Int8 => DataType::Int8,
        NumericClass::UInt8 => DataType::UInt8,
        NumericClass::Int16 => DataType::Int16,
        NumericClass::UInt16 => DataType::UInt16,
        NumericClass::Int32 => DataType::Int32,
        NumericClass::UInt32 => DataType::UInt32,
        NumericClass::Int64 => DataType::Int64,
        NumericClass::UInt64 => DataType::UInt64,
    }
}

/// Round `len` up to the next multiple of 8
pub fn padded(len: usize) -> usize {
    (len + 7) & !7
}
