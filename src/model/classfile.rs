//! Minimal class-file header reader.
//!
//! Only the part of the format needed to learn which type a `.class`
//! artifact declares: magic, version, the constant pool and `this_class`.

use crate::error::{ApiToolsError, ErrorContext, LoadErrorKind, Result};
use std::path::Path;

const MAGIC: u32 = 0xCAFE_BABE;

// Constant pool tags
const CONSTANT_UTF8: u8 = 1;
const CONSTANT_INTEGER: u8 = 3;
const CONSTANT_FLOAT: u8 = 4;
const CONSTANT_LONG: u8 = 5;
const CONSTANT_DOUBLE: u8 = 6;
const CONSTANT_CLASS: u8 = 7;
const CONSTANT_STRING: u8 = 8;
const CONSTANT_FIELDREF: u8 = 9;
const CONSTANT_METHODREF: u8 = 10;
const CONSTANT_INTERFACE_METHODREF: u8 = 11;
const CONSTANT_NAME_AND_TYPE: u8 = 12;
const CONSTANT_METHOD_HANDLE: u8 = 15;
const CONSTANT_METHOD_TYPE: u8 = 16;
const CONSTANT_DYNAMIC: u8 = 17;
const CONSTANT_INVOKE_DYNAMIC: u8 = 18;
const CONSTANT_MODULE: u8 = 19;
const CONSTANT_PACKAGE: u8 = 20;

#[derive(Debug, Clone)]
enum PoolEntry {
    Utf8(String),
    Class(u16),
    /// Entries this reader never dereferences, including the unusable slot after long/double
    Other,
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| invalid(format!("truncated at offset {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

fn invalid(message: impl Into<String>) -> ApiToolsError {
    ApiToolsError::load(
        "reading class file header",
        LoadErrorKind::InvalidClassFile(message.into()),
    )
}

/// Read the dotted qualified name of the type declared by a class file.
pub fn read_class_name(bytes: &[u8]) -> Result<String> {
    let mut reader = ByteReader::new(bytes);
    if reader.u32()? != MAGIC {
        return Err(invalid("bad magic number"));
    }
    let _minor = reader.u16()?;
    let _major = reader.u16()?;

    let count = reader.u16()? as usize;
    let mut pool = vec![PoolEntry::Other; count.max(1)];
    let mut index = 1;
    while index < count {
        let tag = reader.u8()?;
        let mut width = 1;
        pool[index] = match tag {
            CONSTANT_UTF8 => {
                let len = reader.u16()? as usize;
                // Modified UTF-8 only differs for NUL and supplementary chars
                PoolEntry::Utf8(String::from_utf8_lossy(reader.take(len)?).into_owned())
            }
            CONSTANT_CLASS => PoolEntry::Class(reader.u16()?),
            CONSTANT_STRING | CONSTANT_METHOD_TYPE | CONSTANT_MODULE | CONSTANT_PACKAGE => {
                reader.take(2)?;
                PoolEntry::Other
            }
            CONSTANT_METHOD_HANDLE => {
                reader.take(3)?;
                PoolEntry::Other
            }
            CONSTANT_INTEGER
            | CONSTANT_FLOAT
            | CONSTANT_FIELDREF
            | CONSTANT_METHODREF
            | CONSTANT_INTERFACE_METHODREF
            | CONSTANT_NAME_AND_TYPE
            | CONSTANT_DYNAMIC
            | CONSTANT_INVOKE_DYNAMIC => {
                reader.take(4)?;
                PoolEntry::Other
            }
            CONSTANT_LONG | CONSTANT_DOUBLE => {
                reader.take(8)?;
                width = 2;
                PoolEntry::Other
            }
            other => return Err(invalid(format!("unknown constant pool tag {other} at index {index}"))),
        };
        index += width;
    }

    let _access_flags = reader.u16()?;
    let this_class = reader.u16()? as usize;
    let name_index = match pool.get(this_class) {
        Some(PoolEntry::Class(name_index)) => *name_index as usize,
        _ => return Err(invalid(format!("this_class {this_class} is not a class entry"))),
    };
    match pool.get(name_index) {
        Some(PoolEntry::Utf8(internal)) => Ok(internal.replace('/', ".")),
        _ => Err(invalid(format!("class name index {name_index} is not a UTF-8 entry"))),
    }
}

/// Extracts the declared type name of a changed class artifact.
pub trait ClassArtifactReader: Send + Sync {
    fn read_type_name(&self, path: &Path) -> Result<String>;
}

/// Reads class files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassFileReader;

impl ClassArtifactReader for ClassFileReader {
    fn read_type_name(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| ApiToolsError::io(path, e))?;
        read_class_name(&bytes).with_context(|| path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a minimal class file declaring `internal_name`.
    fn class_bytes(internal_name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&61u16.to_be_bytes());
        // 1: Long (takes 1 and 2), 3: Utf8 name, 4: Class -> 3
        out.extend_from_slice(&5u16.to_be_bytes());
        out.push(CONSTANT_LONG);
        out.extend_from_slice(&42u64.to_be_bytes());
        out.push(CONSTANT_UTF8);
        out.extend_from_slice(&(internal_name.len() as u16).to_be_bytes());
        out.extend_from_slice(internal_name.as_bytes());
        out.push(CONSTANT_CLASS);
        out.extend_from_slice(&3u16.to_be_bytes());
        out.extend_from_slice(&0x0021u16.to_be_bytes());
        out.extend_from_slice(&4u16.to_be_bytes());
        out
    }

    #[test]
    fn test_reads_dotted_name_past_wide_entries() {
        let bytes = class_bytes("org/example/api/Widget$Inner");
        assert_eq!(read_class_name(&bytes).unwrap(), "org.example.api.Widget$Inner");
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = class_bytes("a/B");
        bytes[0] = 0;
        assert!(read_class_name(&bytes).is_err());
    }

    #[test]
    fn test_rejects_truncated_input() {
        let bytes = class_bytes("a/B");
        assert!(read_class_name(&bytes[..bytes.len() - 1]).is_err());
        assert!(read_class_name(&[]).is_err());
    }

    #[test]
    fn test_reader_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("B.class");
        std::fs::write(&path, class_bytes("a/B")).unwrap();
        assert_eq!(ClassFileReader.read_type_name(&path).unwrap(), "a.B");
        assert!(ClassFileReader
            .read_type_name(&dir.path().join("missing.class"))
            .unwrap_err()
            .is_io());
    }
}
