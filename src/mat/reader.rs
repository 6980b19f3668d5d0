//! Level 5 MAT-file reader.
//!
//! A MAT-file is a 128-byte header followed by a flat sequence of tagged data
//! elements. Each top-level element is either an `miMATRIX` holding one
//! variable or an `miCOMPRESSED` wrapper whose zlib stream holds one.
//!
//! ```text
//! header (128 bytes)
//! ├── text (116)  subsys offset (8)  version (2)  endian "IM"/"MI" (2)
//! element*
//! └── tag (type u32, nbytes u32) | small tag (nbytes u16, type u16, data 4)
//!     └── miMATRIX
//!         ├── array flags (miUINT32 x2)
//!         ├── dimensions (miINT32)
//!         ├── name (miINT8)
//!         └── class-specific sub-elements
//! ```

use std::io::Read;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;
use log::debug;

use super::error::MatError;
use super::format::{
    padded, ArrayClass, DataType, Endian, FLAG_COMPLEX, FLAG_LOGICAL, HEADER_LEN,
    HEADER_TEXT_LEN, VERSION_5,
};
use super::model::{
    ArrayEntry, ArrayNode, CellArray, CharArray, ClassName, FunctionHandle, Matrix, OpaqueObject,
    SparseArray, StructArray,
};

/// Nesting limit for cells/structs inside one variable
const MAX_DEPTH: usize = 256;

/// Source of the named array variables stored in a container file.
pub trait ContainerReader: Send + Sync {
    /// Read every top-level variable of the file at `path`
    fn read_entries(&self, path: &Path) -> Result<Vec<ArrayEntry>, MatError>;
}

/// Decoded MAT-file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatHeader {
    /// Descriptive text, trailing padding removed
    pub text: String,
    /// Byte order
    pub endian: Endian,
    /// Offset of the subsystem data element, if any
    pub subsys_offset: Option<u64>,
}

/// A fully decoded MAT-file
#[derive(Debug, Clone, PartialEq)]
pub struct MatFile {
    /// File header
    pub header: MatHeader,
    /// Top-level variables in file order
    pub entries: Vec<ArrayEntry>,
}

/// Reader for Level 5 MAT-files (MATLAB v5 through v7, not v7.3)
#[derive(Debug, Clone, Copy, Default)]
pub struct Mat5Reader;

impl Mat5Reader {
    /// Create a new reader
    pub fn new() -> Self {
        Self
    }

    /// Read and decode a file from disk
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<MatFile, MatError> {
        let bytes = std::fs::read(path.as_ref())?;
        self.read_bytes(&bytes)
    }

    /// Decode a whole MAT-file held in memory
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<MatFile, MatError> {
        let header = parse_header(bytes)?;
        let mut cursor = ElementCursor::new(bytes, HEADER_LEN, header.endian);
        let mut entries = Vec::new();

        while !cursor.is_at_end() {
            let element = cursor.next_element()?;
            if header.subsys_offset == Some(element.offset as u64) {
                debug!("Skipping subsystem data element at offset {}", element.offset);
                continue;
            }
            let (name, value) = match element.data_type {
                DataType::Matrix => parse_matrix(element.data, header.endian, 0)?,
                DataType::Compressed => {
                    let inflated = inflate(element.data)?;
                    let mut inner = ElementCursor::new(&inflated, 0, header.endian);
                    let element = inner.next_element()?;
                    expect_type(&element, DataType::Matrix, "compressed miMATRIX")?;
                    parse_matrix(element.data, header.endian, 0)?
                }
                other => {
                    return Err(MatError::UnexpectedElement {
                        expected: "top-level miMATRIX or miCOMPRESSED",
                        found: format!("{:?}", other),
                    })
                }
            };
            entries.push(ArrayEntry { name, value });
        }

        Ok(MatFile { header, entries })
    }
}

impl ContainerReader for Mat5Reader {
    fn read_entries(&self, path: &Path) -> Result<Vec<ArrayEntry>, MatError> {
        Ok(self.read_file(path)?.entries)
    }
}

fn parse_header(bytes: &[u8]) -> Result<MatHeader, MatError> {
    if bytes.len() < HEADER_LEN {
        return Err(MatError::UnsupportedFormat(format!(
            "file is {} bytes, shorter than the {} byte Level 5 header",
            bytes.len(),
            HEADER_LEN
        )));
    }

    let endian = Endian::from_indicator([bytes[126], bytes[127]]).ok_or_else(|| {
        MatError::UnsupportedFormat("missing endian indicator (not a Level 5 MAT-file)".into())
    })?;

    let version = match endian {
        Endian::Little => LittleEndian::read_u16(&bytes[124..126]),
        Endian::Big => BigEndian::read_u16(&bytes[124..126]),
    };
    if version != VERSION_5 {
        return Err(MatError::UnsupportedFormat(format!(
            "header version 0x{:04x} (v7.3 HDF5-based files are not supported)",
            version
        )));
    }

    // Writers leave the subsystem offset as all zeros or all spaces when unused
    let raw_offset = &bytes[HEADER_TEXT_LEN..HEADER_TEXT_LEN + 8];
    let subsys_offset = if raw_offset.iter().all(|&b| b == 0 || b == b' ') {
        None
    } else {
        Some(match endian {
            Endian::Little => LittleEndian::read_u64(raw_offset),
            Endian::Big => BigEndian::read_u64(raw_offset),
        })
    };

    let text = String::from_utf8_lossy(&bytes[..HEADER_TEXT_LEN])
        .trim_end_matches(|c: char| c == ' ' || c == '\0')
        .to_string();

    Ok(MatHeader {
        text,
        endian,
        subsys_offset,
    })
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, MatError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    Ok(inflated)
}

/// One decoded data element, borrowing its payload
struct Element<'a> {
    data_type: DataType,
    data: &'a [u8],
    offset: usize,
}

/// Sequential walker over the data elements of a buffer
struct ElementCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ElementCursor<'a> {
    fn new(buf: &'a [u8], pos: usize, endian: Endian) -> Self {
        Self { buf, pos, endian }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn u32_at(&self, at: usize) -> u32 {
        let bytes = &self.buf[at..at + 4];
        match self.endian {
            Endian::Little => LittleEndian::read_u32(bytes),
            Endian::Big => BigEndian::read_u32(bytes),
        }
    }

    fn require(&self, offset: usize, needed: usize) -> Result<(), MatError> {
        let available = self.buf.len().saturating_sub(offset);
        if needed > available {
            return Err(MatError::Truncated {
                offset,
                needed,
                available,
            });
        }
        Ok(())
    }

    fn next_element(&mut self) -> Result<Element<'a>, MatError> {
        let offset = self.pos;
        self.require(offset, 8)?;

        let first = self.u32_at(offset);
        let small_len = (first >> 16) as usize;

        // Small data element: byte count in the upper half, payload in the tag
        if small_len != 0 {
            let code = first & 0xffff;
            let data_type = DataType::from_code(code).ok_or(MatError::UnknownDataType(code))?;
            if small_len > 4 {
                return Err(MatError::InvalidStructure(format!(
                    "small data element at offset {} claims {} bytes",
                    offset, small_len
                )));
            }
            self.pos = offset + 8;
            return Ok(Element {
                data_type,
                data: &self.buf[offset + 4..offset + 4 + small_len],
                offset,
            });
        }

        let data_type = DataType::from_code(first).ok_or(MatError::UnknownDataType(first))?;
        let len = self.u32_at(offset + 4) as usize;
        self.require(offset + 8, len)?;
        let data = &self.buf[offset + 8..offset + 8 + len];

        // Compressed elements are not padded; trailing padding may be cut short
        let advance = match data_type {
            DataType::Compressed => 8 + len,
            _ => 8 + padded(len),
        };
        self.pos = (offset + advance).min(self.buf.len());

        Ok(Element {
            data_type,
            data,
            offset,
        })
    }

    fn next_of(
        &mut self,
        data_type: DataType,
        expected: &'static str,
    ) -> Result<Element<'a>, MatError> {
        if self.is_at_end() {
            return Err(MatError::InvalidStructure(format!(
                "array ended before its {}",
                expected
            )));
        }
        let element = self.next_element()?;
        expect_type(&element, data_type, expected)?;
        Ok(element)
    }

    fn next_of_numeric(&mut self, expected: &'static str) -> Result<Element<'a>, MatError> {
        if self.is_at_end() {
            return Err(MatError::InvalidStructure(format!(
                "array ended before its {}",
                expected
            )));
        }
        let element = self.next_element()?;
        if element.data_type.byte_size() == 0 {
            return Err(MatError::UnexpectedElement {
                expected,
                found: format!("{:?} at offset {}", element.data_type, element.offset),
            });
        }
        Ok(element)
    }
}

fn expect_type(
    element: &Element<'_>,
    data_type: DataType,
    expected: &'static str,
) -> Result<(), MatError> {
    if element.data_type != data_type {
        return Err(MatError::UnexpectedElement {
            expected,
            found: format!("{:?} at offset {}", element.data_type, element.offset),
        });
    }
    Ok(())
}

/// Decode the body of an `miMATRIX` element into `(name, value)`
fn parse_matrix(
    data: &[u8],
    endian: Endian,
    depth: usize,
) -> Result<(String, ArrayNode), MatError> {
    if depth > MAX_DEPTH {
        return Err(MatError::InvalidStructure(format!(
            "arrays nested deeper than {} levels",
            MAX_DEPTH
        )));
    }

    // Zero-length miMATRIX is how writers store an empty cell element
    if data.is_empty() {
        return Ok((String::new(), ArrayNode::Matrix(Matrix::empty())));
    }

    let mut cursor = ElementCursor::new(data, 0, endian);

    let flags = cursor.next_of(DataType::UInt32, "array flags")?;
    if flags.data.len() < 8 {
        return Err(MatError::InvalidStructure("array flags shorter than 8 bytes".into()));
    }
    let flag_word = read_u32(&flags.data[0..4], endian);
    let class_code = (flag_word & 0xff) as u8;
    let flag_bits = ((flag_word >> 8) & 0xff) as u8;
    let class = ArrayClass::from_code(class_code).ok_or(MatError::UnknownArrayClass(class_code))?;
    let is_complex = flag_bits & FLAG_COMPLEX != 0;
    let is_logical = flag_bits & FLAG_LOGICAL != 0;

    // Opaque objects have no dimensions element
    if class == ArrayClass::Opaque {
        let name = read_name(&mut cursor, "array name")?;
        let type_system = read_name(&mut cursor, "opaque type system")?;
        let class_name = read_name(&mut cursor, "opaque class name")?;
        let node = OpaqueObject {
            dims: vec![1, 1],
            type_system,
            class_name,
        };
        return Ok((name, node.into()));
    }

    let dims = read_dims(&mut cursor, endian)?;
    let name = read_name(&mut cursor, "array name")?;
    let numel = element_count(&dims)?;

    let node = match class {
        ArrayClass::Numeric(numeric) => {
            let real = decode_values(&cursor.next_of_numeric("real part")?, endian)?;
            check_len(&real, numel, "real part")?;
            let imag = if is_complex {
                let imag = decode_values(&cursor.next_of_numeric("imaginary part")?, endian)?;
                check_len(&imag, numel, "imaginary part")?;
                Some(imag)
            } else {
                None
            };
            ArrayNode::Matrix(Matrix {
                dims,
                class: numeric,
                is_logical,
                real,
                imag,
            })
        }
        ArrayClass::Char => {
            let text = if cursor.is_at_end() {
                String::new()
            } else {
                decode_text(&cursor.next_element()?, endian)?
            };
            ArrayNode::Char(CharArray { dims, text })
        }
        ArrayClass::Cell => {
            let mut elements = Vec::new();
            for _ in 0..numel {
                let element = cursor.next_of(DataType::Matrix, "cell element")?;
                let (_, value) = parse_matrix(element.data, endian, depth + 1)?;
                elements.push(value);
            }
            ArrayNode::Cell(CellArray { dims, elements })
        }
        ArrayClass::Struct | ArrayClass::Object => {
            let class = if class == ArrayClass::Object {
                Some(ClassName::parse(&read_name(&mut cursor, "class name")?))
            } else {
                None
            };
            let field_names = read_field_names(&mut cursor, endian)?;
            let total = numel.checked_mul(field_names.len()).ok_or_else(|| {
                MatError::InvalidStructure("struct field count overflows".into())
            })?;
            let mut values = Vec::new();
            for _ in 0..total {
                let element = cursor.next_of(DataType::Matrix, "struct field value")?;
                let (_, value) = parse_matrix(element.data, endian, depth + 1)?;
                values.push(value);
            }
            ArrayNode::Struct(StructArray {
                dims,
                class,
                field_names,
                values,
            })
        }
        ArrayClass::Sparse => {
            let rows = cursor.next_of(DataType::Int32, "sparse row indices")?;
            let row_indices = decode_indices(&rows, endian, "sparse row index")?;
            let columns = cursor.next_of(DataType::Int32, "sparse column index")?;
            let column_starts = decode_indices(&columns, endian, "sparse column index")?;
            let nnz = column_starts.last().copied().unwrap_or(0);
            if row_indices.len() < nnz {
                return Err(MatError::InvalidStructure(format!(
                    "sparse array stores {} values but only {} row indices",
                    nnz,
                    row_indices.len()
                )));
            }

            // Logical sparse may omit its values, which are all true
            let real = if is_logical && cursor.is_at_end() {
                vec![1.0; nnz]
            } else {
                sparse_values(&cursor.next_of_numeric("sparse real part")?, endian, nnz)?
            };
            let imag = if is_complex {
                let element = cursor.next_of_numeric("sparse imaginary part")?;
                Some(sparse_values(&element, endian, nnz)?)
            } else {
                None
            };
            ArrayNode::Sparse(SparseArray {
                dims,
                is_logical,
                row_indices,
                column_starts,
                real,
                imag,
            })
        }
        ArrayClass::Function => {
            let element = cursor.next_of(DataType::Matrix, "function handle content")?;
            let (_, content) = parse_matrix(element.data, endian, depth + 1)?;
            ArrayNode::FunctionHandle(FunctionHandle {
                dims,
                content: Box::new(content),
            })
        }
        ArrayClass::Opaque => {
            return Err(MatError::InvalidStructure("opaque array with dimensions".into()))
        }
    };

    Ok((name, node))
}

fn read_u32(bytes: &[u8], endian: Endian) -> u32 {
    match endian {
        Endian::Little => LittleEndian::read_u32(bytes),
        Endian::Big => BigEndian::read_u32(bytes),
    }
}

fn read_dims(cursor: &mut ElementCursor<'_>, endian: Endian) -> Result<Vec<usize>, MatError> {
    let element = cursor.next_of(DataType::Int32, "dimensions")?;
    decode_values(&element, endian)?
        .into_iter()
        .map(|d| {
            if d < 0.0 {
                Err(MatError::InvalidStructure(format!("negative dimension {}", d)))
            } else {
                Ok(d as usize)
            }
        })
        .collect()
}

fn decode_indices(
    element: &Element<'_>,
    endian: Endian,
    what: &str,
) -> Result<Vec<usize>, MatError> {
    decode_values(element, endian)?
        .into_iter()
        .map(|i| {
            if i < 0.0 {
                Err(MatError::InvalidStructure(format!("negative {} {}", what, i)))
            } else {
                Ok(i as usize)
            }
        })
        .collect()
}

/// Stored values of a sparse array; writers may pad them beyond `nnz`
fn sparse_values(
    element: &Element<'_>,
    endian: Endian,
    nnz: usize,
) -> Result<Vec<f64>, MatError> {
    let mut values = decode_values(element, endian)?;
    if values.len() < nnz {
        return Err(MatError::InvalidStructure(format!(
            "sparse array stores {} values, column index requires {}",
            values.len(),
            nnz
        )));
    }
    values.truncate(nnz);
    Ok(values)
}

fn element_count(dims: &[usize]) -> Result<usize, MatError> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| MatError::InvalidStructure(format!("dimensions {:?} overflow", dims)))
}

fn check_len(values: &[f64], numel: usize, what: &str) -> Result<(), MatError> {
    if values.len() != numel {
        return Err(MatError::InvalidStructure(format!(
            "{} holds {} values, dimensions require {}",
            what,
            values.len(),
            numel
        )));
    }
    Ok(())
}

fn read_name(cursor: &mut ElementCursor<'_>, expected: &'static str) -> Result<String, MatError> {
    let element = cursor.next_of(DataType::Int8, expected)?;
    Ok(ascii_name(element.data))
}

/// Names are NUL-padded byte strings
fn ascii_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn read_field_names(
    cursor: &mut ElementCursor<'_>,
    endian: Endian,
) -> Result<Vec<String>, MatError> {
    let width = cursor.next_of(DataType::Int32, "field name length")?;
    let width = decode_values(&width, endian)?
        .first()
        .copied()
        .unwrap_or(0.0);
    let names = cursor.next_of(DataType::Int8, "field names")?;

    if names.data.is_empty() {
        return Ok(Vec::new());
    }
    if width < 1.0 {
        return Err(MatError::InvalidStructure(format!(
            "field name length {} with {} bytes of names",
            width,
            names.data.len()
        )));
    }
    Ok(names.data.chunks(width as usize).map(ascii_name).collect())
}

/// Widen the payload of a numeric element to `f64`
fn decode_values(element: &Element<'_>, endian: Endian) -> Result<Vec<f64>, MatError> {
    match endian {
        Endian::Little => decode_values_as::<LittleEndian>(element),
        Endian::Big => decode_values_as::<BigEndian>(element),
    }
}

fn decode_values_as<B: ByteOrder>(element: &Element<'_>) -> Result<Vec<f64>, MatError> {
    let size = element.data_type.byte_size();
    if size == 0 {
        return Err(MatError::UnexpectedElement {
            expected: "numeric data",
            found: format!("{:?}", element.data_type),
        });
    }
    let data = element.data;
    if data.len() % size != 0 {
        return Err(MatError::InvalidStructure(format!(
            "{} bytes of {:?} data is not a whole number of values",
            data.len(),
            element.data_type
        )));
    }

    let values = match element.data_type {
        DataType::Int8 => data.iter().map(|&b| b as i8 as f64).collect(),
        DataType::UInt8 | DataType::Utf8 => data.iter().map(|&b| b as f64).collect(),
        DataType::Int16 => data.chunks_exact(2).map(|c| B::read_i16(c) as f64).collect(),
        DataType::UInt16 | DataType::Utf16 => {
            data.chunks_exact(2).map(|c| B::read_u16(c) as f64).collect()
        }
        DataType::Int32 => data.chunks_exact(4).map(|c| B::read_i32(c) as f64).collect(),
        DataType::UInt32 | DataType::Utf32 => {
            data.chunks_exact(4).map(|c| B::read_u32(c) as f64).collect()
        }
        DataType::Single => data.chunks_exact(4).map(|c| B::read_f32(c) as f64).collect(),
        DataType::Double => data.chunks_exact(8).map(B::read_f64).collect(),
        DataType::Int64 => data.chunks_exact(8).map(|c| B::read_i64(c) as f64).collect(),
        DataType::UInt64 => data.chunks_exact(8).map(|c| B::read_u64(c) as f64).collect(),
        DataType::Matrix | DataType::Compressed => Vec::new(),
    };
    Ok(values)
}

/// Decode character data stored in any of the encodings MATLAB writes
fn decode_text(element: &Element<'_>, endian: Endian) -> Result<String, MatError> {
    match element.data_type {
        DataType::Utf8 => String::from_utf8(element.data.to_vec())
            .map_err(|e| MatError::InvalidText(e.to_string())),
        // 8-bit storage is Latin-1
        DataType::UInt8 | DataType::Int8 => Ok(element.data.iter().map(|&b| b as char).collect()),
        DataType::UInt16 | DataType::Utf16 | DataType::Int16 => {
            if element.data.len() % 2 != 0 {
                return Err(MatError::InvalidText("odd byte count for 16-bit text".into()));
            }
            let units = element.data.chunks_exact(2).map(|c| match endian {
                Endian::Little => LittleEndian::read_u16(c),
                Endian::Big => BigEndian::read_u16(c),
            });
            char::decode_utf16(units)
                .collect::<Result<String, _>>()
                .map_err(|e| MatError::InvalidText(e.to_string()))
        }
        DataType::UInt32 | DataType::Utf32 | DataType::Int32 => {
            if element.data.len() % 4 != 0 {
                return Err(MatError::InvalidText(
                    "byte count is not a multiple of 4 for 32-bit text".into(),
                ));
            }
            element
                .data
                .chunks_exact(4)
                .map(|c| {
                    let code = read_u32(c, endian);
                    char::from_u32(code).ok_or_else(|| {
                        MatError::InvalidText(format!("invalid code point {}", code))
                    })
                })
                .collect()
        }
        other => Err(MatError::UnexpectedElement {
            expected: "character data",
            found: format!("{:?}", other),
        }),
    }
}
