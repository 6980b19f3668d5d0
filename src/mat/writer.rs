//! Level 5 MAT-file writer.
//!
//! Writes little-endian files. Each variable is emitted as an `miMATRIX`
//! element, optionally wrapped in an `miCOMPRESSED` zlib stream the way
//! MATLAB's `-v7` format does.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::error::MatError;
use super::format::{
    padded, storage_type, ArrayClass, DataType, Endian, FLAG_COMPLEX, FLAG_LOGICAL,
    HEADER_TEXT_LEN, VERSION_5,
};
use super::model::{ArrayEntry, ArrayNode, Matrix, NumericClass, StructArray};

/// Header text written at the start of every file
const HEADER_TEXT: &str = "MATLAB 5.0 MAT-file, Platform: matjson, Created by: matjson";

/// Writer for Level 5 MAT-files
#[derive(Debug, Clone, Copy, Default)]
pub struct Mat5Writer {
    compress: bool,
}

impl Mat5Writer {
    /// Writer producing uncompressed (`-v6` style) files
    pub fn new() -> Self {
        Self { compress: false }
    }

    /// Enable or disable per-variable zlib compression
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Write `entries` to a new file at `path`
    pub fn write_file<P: AsRef<Path>>(
        &self,
        path: P,
        entries: &[ArrayEntry],
    ) -> Result<(), MatError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_to(&mut writer, entries)?;
        writer.flush()?;
        Ok(())
    }

    /// Encode `entries` as a complete MAT-file into a byte vector
    pub fn to_bytes(&self, entries: &[ArrayEntry]) -> Result<Vec<u8>, MatError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes, entries)?;
        Ok(bytes)
    }

    /// Write a complete MAT-file to `out`
    pub fn write_to<W: Write>(&self, out: &mut W, entries: &[ArrayEntry]) -> Result<(), MatError> {
        out.write_all(&header_bytes())?;
        for entry in entries {
            let mut element = Vec::new();
            write_matrix(&mut element, &entry.name, &entry.value)?;
            if self.compress {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&element)?;
                let compressed = encoder.finish()?;
                out.write_u32::<LittleEndian>(DataType::Compressed.code())?;
                out.write_u32::<LittleEndian>(byte_len(compressed.len())?)?;
                out.write_all(&compressed)?;
            } else {
                out.write_all(&element)?;
            }
        }
        Ok(())
    }
}

fn header_bytes() -> Vec<u8> {
    let mut header = vec![b' '; HEADER_TEXT_LEN];
    header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT.as_bytes());
    // Subsystem offset unused
    header.extend_from_slice(&[0u8; 8]);
    header.extend_from_slice(&VERSION_5.to_le_bytes());
    header.extend_from_slice(&Endian::Little.indicator());
    header
}

fn byte_len(len: usize) -> Result<u32, MatError> {
    u32::try_from(len)
        .map_err(|_| MatError::UnsupportedValue(format!("element of {} bytes exceeds 4 GiB", len)))
}

/// Append one data element, using the small element form when it fits
fn write_element(out: &mut Vec<u8>, data_type: DataType, data: &[u8]) -> Result<(), MatError> {
    if data.len() <= 4 && data_type != DataType::Matrix {
        out.write_u32::<LittleEndian>(((data.len() as u32) << 16) | data_type.code())?;
        out.extend_from_slice(data);
        out.resize(out.len() + 4 - data.len(), 0);
        return Ok(());
    }
    out.write_u32::<LittleEndian>(data_type.code())?;
    out.write_u32::<LittleEndian>(byte_len(data.len())?)?;
    out.extend_from_slice(data);
    out.resize(out.len() + padded(data.len()) - data.len(), 0);
    Ok(())
}

fn flags_element(out: &mut Vec<u8>, class: ArrayClass, flag_bits: u8) -> Result<(), MatError> {
    let mut data = Vec::with_capacity(8);
    data.write_u32::<LittleEndian>(u32::from(class.code()) | (u32::from(flag_bits) << 8))?;
    data.write_u32::<LittleEndian>(0)?;
    write_element(out, DataType::UInt32, &data)
}

fn dims_element(out: &mut Vec<u8>, dims: &[usize]) -> Result<(), MatError> {
    let mut data = Vec::with_capacity(dims.len() * 4);
    for &d in dims {
        let d = i32::try_from(d)
            .map_err(|_| MatError::UnsupportedValue(format!("dimension {} exceeds i32", d)))?;
        data.write_i32::<LittleEndian>(d)?;
    }
    write_element(out, DataType::Int32, &data)
}

fn name_element(out: &mut Vec<u8>, name: &str) -> Result<(), MatError> {
    write_element(out, DataType::Int8, name.as_bytes())
}

fn numeric_element(
    out: &mut Vec<u8>,
    class: NumericClass,
    values: &[f64],
) -> Result<(), MatError> {
    let data_type = storage_type(class);
    let mut data = Vec::with_capacity(values.len() * data_type.byte_size());
    for &v in values {
        match class {
            NumericClass::Double => data.write_f64::<LittleEndian>(v)?,
            NumericClass::Single => data.write_f32::<LittleEndian>(v as f32)?,
            NumericClass::Int8 => data.write_i8(v as i8)?,
            NumericClass::UInt8 => data.write_u8(v as u8)?,
            NumericClass::Int16 => data.write_i16::<LittleEndian>(v as i16)?,
            NumericClass::UInt16 => data.write_u16::<LittleEndian>(v as u16)?,
            NumericClass::Int32 => data.write_i32::<LittleEndian>(v as i32)?,
            NumericClass::UInt32 => data.write_u32::<LittleEndian>(v as u32)?,
            NumericClass::Int64 => data.write_i64::<LittleEndian>(v as i64)?,
            NumericClass::UInt64 => data.write_u64::<LittleEndian>(v as u64)?,
        }
    }
    write_element(out, data_type, &data)
}

/// Append a complete `miMATRIX` element for `node`
fn write_matrix(out: &mut Vec<u8>, name: &str, node: &ArrayNode) -> Result<(), MatError> {
    let mut body = Vec::new();

    match node {
        ArrayNode::Matrix(matrix) => write_numeric(&mut body, name, matrix)?,
        ArrayNode::Char(chars) => {
            flags_element(&mut body, ArrayClass::Char, 0)?;
            dims_element(&mut body, &chars.dims)?;
            name_element(&mut body, name)?;
            let mut data = Vec::new();
            for unit in chars.text.encode_utf16() {
                data.write_u16::<LittleEndian>(unit)?;
            }
            write_element(&mut body, DataType::UInt16, &data)?;
        }
        ArrayNode::Cell(cell) => {
            flags_element(&mut body, ArrayClass::Cell, 0)?;
            dims_element(&mut body, &cell.dims)?;
            name_element(&mut body, name)?;
            for element in &cell.elements {
                write_matrix(&mut body, "", element)?;
            }
        }
        ArrayNode::Struct(structure) => write_struct(&mut body, name, structure)?,
        ArrayNode::FunctionHandle(handle) => {
            flags_element(&mut body, ArrayClass::Function, 0)?;
            dims_element(&mut body, &handle.dims)?;
            name_element(&mut body, name)?;
            write_matrix(&mut body, "", &handle.content)?;
        }
        ArrayNode::Opaque(object) => {
            flags_element(&mut body, ArrayClass::Opaque, 0)?;
            name_element(&mut body, name)?;
            name_element(&mut body, &object.type_system)?;
            name_element(&mut body, &object.class_name)?;
            // Serialized object bytes are not modelled; store an empty uint8 payload
            write_numeric(
                &mut body,
                "",
                &Matrix::new(vec![0, 0], Vec::new()).with_class(NumericClass::UInt8),
            )?;
        }
        ArrayNode::Sparse(_) => {
            return Err(MatError::UnsupportedValue(format!(
                "sparse variable '{}' cannot be written",
                name
            )))
        }
    }

    write_element(out, DataType::Matrix, &body)
}

fn write_numeric(body: &mut Vec<u8>, name: &str, matrix: &Matrix) -> Result<(), MatError> {
    let numel: usize = matrix.dims.iter().product();
    if matrix.real.len() != numel {
        return Err(MatError::UnsupportedValue(format!(
            "'{}' has {} values for dimensions {:?}",
            name,
            matrix.real.len(),
            matrix.dims
        )));
    }

    let mut flag_bits = 0;
    if matrix.is_complex() {
        flag_bits |= FLAG_COMPLEX;
    }
    if matrix.is_logical {
        flag_bits |= FLAG_LOGICAL;
    }
    flags_element(body, ArrayClass::Numeric(matrix.class), flag_bits)?;
    dims_element(body, &matrix.dims)?;
    name_element(body, name)?;
    numeric_element(body, matrix.class, &matrix.real)?;
    if let Some(imag) = &matrix.imag {
        numeric_element(body, matrix.class, imag)?;
    }
    Ok(())
}

fn write_struct(body: &mut Vec<u8>, name: &str, structure: &StructArray) -> Result<(), MatError> {
    let numel: usize = structure.dims.iter().product();
    if structure.values.len() != numel * structure.field_names.len() {
        return Err(MatError::UnsupportedValue(format!(
            "struct '{}' has {} values for {} elements of {} fields",
            name,
            structure.values.len(),
            numel,
            structure.field_names.len()
        )));
    }

    let class = if structure.class.is_some() {
        ArrayClass::Object
    } else {
        ArrayClass::Struct
    };
    flags_element(body, class, 0)?;
    dims_element(body, &structure.dims)?;
    name_element(body, name)?;
    if let Some(class_name) = &structure.class {
        name_element(body, &class_name.qualified())?;
    }

    let width = structure
        .field_names
        .iter()
        .map(|f| f.len() + 1)
        .max()
        .unwrap_or(1);
    let mut width_data = Vec::with_capacity(4);
    width_data.write_i32::<LittleEndian>(width as i32)?;
    write_element(body, DataType::Int32, &width_data)?;

    let mut names = Vec::with_capacity(width * structure.field_names.len());
    for field in &structure.field_names {
        names.extend_from_slice(field.as_bytes());
        names.resize(names.len() + width - field.len(), 0);
    }
    write_element(body, DataType::Int8, &names)?;

    for value in &structure.values {
        write_matrix(body, "", value)?;
    }
    Ok(())
}
