//! Minimal JVM class-file parser.
//!
//! Only the class header is decoded: the constant pool, access flags,
//! `this_class`, `super_class`, and the interface table. Fields, methods, and
//! attributes are never touched, which keeps resolution cheap enough to run
//! over every type in a deployment.

use std::borrow::Cow;
use std::ops::Range;

use prescan_common::internal_to_qualified;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAGIC: u32 = 0xCAFE_BABE;

/// Errors produced while decoding a class file.
#[derive(Debug, Error)]
pub enum ClassParseError {
    /// The input ended before the header was complete.
    #[error("unexpected end of class file")]
    UnexpectedEof,

    /// The first four bytes are not `0xCAFEBABE`.
    #[error("invalid class file magic header")]
    InvalidMagic,

    /// The constant pool contains a tag this parser does not know.
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant {
        /// The offending tag byte.
        tag: u8,
    },

    /// A constant pool reference points at a missing or mistyped entry.
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex {
        /// The offending index.
        index: u16,
    },

    /// A name constant is not valid modified UTF-8.
    #[error("invalid modified UTF-8 string in constant pool at byte {offset}")]
    InvalidModifiedUtf8 {
        /// Offset of the first bad byte within the string.
        offset: usize,
    },
}

/// Class access flags as stored in the class file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    /// `ACC_PUBLIC`
    pub const PUBLIC: u16 = 0x0001;
    /// `ACC_FINAL`
    pub const FINAL: u16 = 0x0010;
    /// `ACC_INTERFACE`
    pub const INTERFACE: u16 = 0x0200;
    /// `ACC_ABSTRACT`
    pub const ABSTRACT: u16 = 0x0400;
    /// `ACC_SYNTHETIC`
    pub const SYNTHETIC: u16 = 0x1000;
    /// `ACC_ANNOTATION`
    pub const ANNOTATION: u16 = 0x2000;
    /// `ACC_ENUM`
    pub const ENUM: u16 = 0x4000;

    /// Returns `true` if every bit in `mask` is set.
    pub fn contains(self, mask: u16) -> bool {
        self.0 & mask == mask
    }

    /// Returns `true` for interfaces (including annotation types).
    pub fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }

    /// Returns `true` for abstract classes and interfaces.
    pub fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    /// Returns `true` for annotation types.
    pub fn is_annotation(self) -> bool {
        self.contains(Self::ANNOTATION)
    }

    /// Returns `true` for enum classes.
    pub fn is_enum(self) -> bool {
        self.contains(Self::ENUM)
    }

    /// Returns `true` for compiler-generated types.
    pub fn is_synthetic(self) -> bool {
        self.contains(Self::SYNTHETIC)
    }
}

/// An introspectable view of a resolved type.
///
/// This is what classification policies decide over. All names are in
/// qualified (dot-separated) form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Qualified name of the type.
    pub name: String,

    /// Qualified name of the direct supertype. `None` only for `java.lang.Object`
    /// and `module-info`.
    pub super_name: Option<String>,

    /// Qualified names of directly implemented interfaces, in declaration order.
    pub interfaces: Vec<String>,

    /// Class access flags.
    pub access: AccessFlags,

    /// Class-file major version (e.g. 61 for Java 17).
    pub major_version: u16,

    /// Class-file minor version.
    pub minor_version: u16,
}

impl TypeDescriptor {
    /// Returns the package portion of the type name.
    pub fn package(&self) -> &str {
        prescan_common::package_of(&self.name)
    }

    /// Returns `true` if the type directly implements `interface`.
    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|i| i == interface)
    }
}

/// Returns `true` if `header` starts with the class-file magic number.
pub fn is_class_file(header: &[u8]) -> bool {
    header.len() >= 4 && u32::from_be_bytes([header[0], header[1], header[2], header[3]]) == MAGIC
}

/// Parses the class header into a [`TypeDescriptor`].
pub fn parse_descriptor(bytes: &[u8]) -> Result<TypeDescriptor, ClassParseError> {
    let mut reader = ClassReader::new(bytes);
    if reader.read_u4()? != MAGIC {
        return Err(ClassParseError::InvalidMagic);
    }
    let minor_version = reader.read_u2()?;
    let major_version = reader.read_u2()?;
    let pool = ConstantPool::parse(&mut reader)?;

    let access = AccessFlags(reader.read_u2()?);
    let this_class = reader.read_u2()?;
    let super_class = reader.read_u2()?;

    let interfaces_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        let index = reader.read_u2()?;
        interfaces.push(internal_to_qualified(&pool.class_name(bytes, index)?));
    }

    let name = internal_to_qualified(&pool.class_name(bytes, this_class)?);
    let super_name = match super_class {
        0 => None,
        index => Some(internal_to_qualified(&pool.class_name(bytes, index)?)),
    };

    Ok(TypeDescriptor {
        name,
        super_name,
        interfaces,
        access,
        major_version,
        minor_version,
    })
}

#[derive(Debug, Clone)]
enum Constant {
    /// Byte range of the string payload within the class file.
    Utf8(Range<usize>),
    Class { name_index: u16 },
    Other,
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let start = reader.pos;
                    reader.skip(length)?;
                    Constant::Utf8(start..start + length)
                }
                3 | 4 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                // Long and Double occupy two slots.
                5 | 6 => {
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Unusable
                }
                7 => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                8 | 16 | 19 | 20 => {
                    reader.skip(2)?;
                    Constant::Other
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                15 => {
                    reader.skip(3)?;
                    Constant::Other
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };
            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    fn utf8<'a>(&self, bytes: &'a [u8], index: u16) -> Result<Cow<'a, str>, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(range) => decode_modified_utf8(&bytes[range.clone()]),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn class_name<'a>(
        &self,
        bytes: &'a [u8],
        index: u16,
    ) -> Result<Cow<'a, str>, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(bytes, *name_index),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }
}

/// Decodes the JVM's modified UTF-8.
///
/// It differs from standard UTF-8 in two ways: NUL is written as `C0 80`, and
/// supplementary characters are written as two 3-byte surrogate halves.
/// Strings that are already valid UTF-8 are borrowed as-is.
fn decode_modified_utf8(raw: &[u8]) -> Result<Cow<'_, str>, ClassParseError> {
    if let Ok(text) = std::str::from_utf8(raw) {
        return Ok(Cow::Borrowed(text));
    }

    let invalid = |offset| ClassParseError::InvalidModifiedUtf8 { offset };
    let continuation = |offset: usize| match raw.get(offset) {
        Some(b) if b & 0xC0 == 0x80 => Ok(u32::from(b & 0x3F)),
        _ => Err(invalid(offset)),
    };
    // A 3-byte sequence encoding one UTF-16 code unit.
    let unit_at = |offset: usize| -> Option<u32> {
        let lead = *raw.get(offset)?;
        if lead & 0xF0 != 0xE0 {
            return None;
        }
        let b1 = continuation(offset + 1).ok()?;
        let b2 = continuation(offset + 2).ok()?;
        Some((u32::from(lead & 0x0F) << 12) | (b1 << 6) | b2)
    };

    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;
    while pos < raw.len() {
        let lead = raw[pos];
        let (code, width) = if lead < 0x80 {
            (u32::from(lead), 1)
        } else if lead & 0xE0 == 0xC0 {
            ((u32::from(lead & 0x1F) << 6) | continuation(pos + 1)?, 2)
        } else if lead & 0xF0 == 0xE0 {
            let high = unit_at(pos).ok_or_else(|| invalid(pos))?;
            match (high, unit_at(pos + 3)) {
                (0xD800..=0xDBFF, Some(low @ 0xDC00..=0xDFFF)) => {
                    (0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00), 6)
                }
                _ => (high, 3),
            }
        } else {
            return Err(invalid(pos));
        };
        out.push(char::from_u32(code).ok_or_else(|| invalid(pos))?);
        pos += width;
    }
    Ok(Cow::Owned(out))
}

struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassParseError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        Ok(self.take(1)?[0])
    }

    fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.take(len).map(|_| ())
    }
}
