//! The IFD walker: traverses an IFD chain and fills tag directories.

use std::collections::HashSet;

use bytes::Bytes;
use log::{trace, warn};

use crate::directory::Directory;
use crate::error::{IfdexError, IfdexResult};
use crate::metadata::Metadata;
use crate::reader::{ByteOrder, ByteReader};
use crate::tags::DirectoryKind;
use crate::value::{Rational, SRational, Type, Value};

// TIFF header markers [TIFF6, section 2].
const BYTE_ORDER_MOTOROLA: u16 = 0x4d4d; // "MM"
const BYTE_ORDER_INTEL: u16 = 0x4949; // "II"
const TIFF_MAGIC: u16 = 42;

/// Tag   2 bytes
/// Type  2 bytes
/// Count 4 bytes
/// Value 4 bytes, either inline or a pointer to the value
const IFD_ENTRY_SIZE: usize = 12;

/// Values longer than the 4-byte inline slot live behind a pointer.
const INLINE_VALUE_SIZE: u64 = 4;

/// Extract all tag directories from a TIFF-structured byte buffer.
///
/// This parses the 8-byte TIFF header (byte-order mark, magic 42, offset of
/// the first IFD) and walks the whole chain, including sub-IFDs reached
/// through pointer tags.
///
/// The only hard failure is an empty buffer. Every recoverable problem
/// (bad header, truncated entries, cyclic offsets) is recorded on the
/// affected [`Directory`] and extraction of the rest continues, so damaged
/// files still yield whatever could be salvaged.
pub fn extract(data: Bytes) -> IfdexResult<Metadata> {
    if data.is_empty() {
        return Err(IfdexError::EmptyInput);
    }
    let mut reader = ByteReader::new(data);
    let mut metadata = Metadata::new();
    match parse_header(&mut reader) {
        Ok(first_ifd_offset) => {
            let mut walker = IfdWalker::new();
            walker.walk(
                &reader,
                first_ifd_offset,
                DirectoryKind::Ifd0,
                None,
                &mut metadata,
            );
        }
        Err(e) => {
            warn!("unreadable TIFF header: {e}");
            let mut dir = Directory::new(DirectoryKind::Ifd0, None);
            dir.add_error(None, e.to_string());
            metadata.push(dir);
        }
    }
    Ok(metadata)
}

/// Walk one IFD chain that a container sniffer has already located.
///
/// The sniffer supplies the reader (with byte order already set), the chain's
/// starting offset, and the kind of the outermost directory. Directories are
/// appended to a fresh [`Metadata`] in discovery order.
pub fn extract_ifd(reader: &ByteReader, offset: usize, kind: DirectoryKind) -> Metadata {
    let mut metadata = Metadata::new();
    let mut walker = IfdWalker::new();
    walker.walk(reader, offset, kind, None, &mut metadata);
    metadata
}

/// Parse the TIFF header, setting the reader's byte order, and return the
/// offset of the first IFD.
fn parse_header(reader: &mut ByteReader) -> IfdexResult<usize> {
    // The byte-order mark repeats one byte, so reading it with the
    // reader's initial order is safe.
    let byte_order = match reader.get_u16(0)? {
        BYTE_ORDER_MOTOROLA => ByteOrder::Motorola,
        BYTE_ORDER_INTEL => ByteOrder::Intel,
        other => {
            return Err(IfdexError::Decode(format!(
                "unexpected byte order mark 0x{other:04x}"
            )))
        }
    };
    reader.set_byte_order(byte_order);
    let magic = reader.get_u16(2)?;
    if magic != TIFF_MAGIC {
        return Err(IfdexError::Decode(format!(
            "invalid TIFF magic number {magic}"
        )));
    }
    Ok(reader.get_u32(4)? as usize)
}

/// Recursive traversal state for one extraction call.
///
/// The visited-offset set is the cycle guard: it is threaded through the
/// whole walk of one buffer, strictly grows, and is bounded by the buffer
/// length, which makes termination independent of chain length.
struct IfdWalker {
    visited: HashSet<usize>,
}

impl IfdWalker {
    fn new() -> Self {
        Self {
            visited: HashSet::new(),
        }
    }

    /// Parse one IFD at `offset` into a directory of `kind` and append it,
    /// then any sub-IFDs it points at, then the next-IFD sibling.
    ///
    /// A directory is emitted for every requested offset, even when the IFD
    /// turns out to be cyclic or unreadable; such failures are recorded as
    /// directory-level errors on the otherwise empty directory.
    fn walk(
        &mut self,
        reader: &ByteReader,
        offset: usize,
        kind: DirectoryKind,
        parent: Option<usize>,
        metadata: &mut Metadata,
    ) {
        trace!("reading {} at offset {offset}", kind.name());
        let mut dir = Directory::new(kind, parent);

        if !self.visited.insert(offset) {
            warn!("{}: cyclic IFD offset {offset}", kind.name());
            dir.add_error(None, format!("cyclic reference to IFD at offset {offset}"));
            metadata.push(dir);
            return;
        }

        let entry_count = match reader.get_u16(offset) {
            Ok(count) => count as usize,
            Err(e) => {
                warn!("{}: unreadable IFD at offset {offset}: {e}", kind.name());
                dir.add_error(None, format!("malformed IFD at offset {offset}: {e}"));
                metadata.push(dir);
                return;
            }
        };

        // The entry table has a fixed size; if it runs past the buffer the
        // declared count is garbage and no entry can be trusted.
        let table_end = offset as u64 + 2 + (entry_count * IFD_ENTRY_SIZE) as u64;
        if table_end > reader.len() as u64 {
            dir.add_error(
                None,
                format!("truncated IFD: {entry_count} entries do not fit at offset {offset}"),
            );
            metadata.push(dir);
            return;
        }

        // Sub-IFD walks are deferred until this directory's entries are
        // complete, keeping aggregate order parents-before-children.
        let mut children: Vec<(usize, DirectoryKind)> = Vec::new();

        for i in 0..entry_count {
            let entry_offset = offset + 2 + i * IFD_ENTRY_SIZE;
            self.read_entry(reader, entry_offset, &mut dir, &mut children);
        }

        // A 4-byte offset of the next IFD in the chain follows the entries.
        // Only the top-level chain follows it; sub-IFDs ignore theirs.
        let mut sibling = None;
        if let Some(next_kind) = kind.next_ifd_kind() {
            match reader.get_u32(offset + 2 + entry_count * IFD_ENTRY_SIZE) {
                Ok(0) => {}
                Ok(next) => sibling = Some((next as usize, next_kind)),
                Err(e) => dir.add_error(None, format!("unreadable next-IFD offset: {e}")),
            }
        }

        let index = metadata.directories().len();
        metadata.push(dir);

        for (child_offset, child_kind) in children {
            self.walk(reader, child_offset, child_kind, Some(index), metadata);
        }
        if let Some((next_offset, next_kind)) = sibling {
            self.walk(reader, next_offset, next_kind, parent, metadata);
        }
    }

    /// Decode one 12-byte IFD entry into `dir`, or queue a sub-IFD walk if
    /// the tag is a registered pointer. Failures are recorded per tag.
    fn read_entry(
        &mut self,
        reader: &ByteReader,
        entry_offset: usize,
        dir: &mut Directory,
        children: &mut Vec<(usize, DirectoryKind)>,
    ) {
        // The entry record itself was bounds-checked with the table.
        let Ok(tag) = reader.get_u16(entry_offset) else {
            return;
        };
        let Ok(type_code) = reader.get_u16(entry_offset + 2) else {
            return;
        };
        let Ok(count) = reader.get_u32(entry_offset + 4) else {
            return;
        };

        let value_type = match Type::try_from(type_code) {
            Ok(t) => t,
            Err(_) => {
                warn!(
                    "{}: tag 0x{tag:04x} has unknown value type {type_code}",
                    dir.name()
                );
                dir.add_error(Some(tag), format!("unknown value type code {type_code}"));
                return;
            }
        };

        let byte_length = value_type.size() * u64::from(count);
        let data_offset = if byte_length <= INLINE_VALUE_SIZE {
            // Value fits in the entry's inline slot.
            Ok(entry_offset + 8)
        } else {
            // The inline slot holds an absolute offset to the value.
            reader
                .get_u32(entry_offset + 8)
                .map(|pointer| pointer as usize)
        };

        let value = data_offset
            .and_then(|data_offset| decode_value(reader, value_type, count, data_offset));

        if let Some(child_kind) = dir.kind().sub_ifd_target(tag) {
            // Pointer tags designate a nested IFD; resolve the offset and
            // queue the child walk instead of storing the value.
            match value.and_then(|v| v.as_uint()) {
                Ok(child_offset) => children.push((child_offset as usize, child_kind)),
                Err(e) => {
                    warn!("{}: bad sub-IFD pointer 0x{tag:04x}: {e}", dir.name());
                    dir.add_error(Some(tag), format!("invalid sub-IFD pointer: {e}"));
                }
            }
            return;
        }

        match value {
            Ok(v) => dir.set_value(tag, v),
            Err(e) => {
                warn!("{}: failed to decode tag 0x{tag:04x}: {e}", dir.name());
                dir.add_error(Some(tag), e.to_string());
            }
        }
    }
}

/// Decode `count` components of `value_type` starting at `data_offset`.
///
/// Every read is bounds-checked through the reader; a failure anywhere
/// leaves no partial value behind.
fn decode_value(
    reader: &ByteReader,
    value_type: Type,
    count: u32,
    data_offset: usize,
) -> IfdexResult<Value> {
    let count = count as usize;
    if count == 0 {
        // A zero count is legal; the value is empty, shaped by its type.
        return Ok(match value_type {
            Type::Ascii => Value::Ascii(String::new()),
            Type::Undefined => Value::Undefined(Bytes::new()),
            _ => Value::List(Vec::new()),
        });
    }

    match value_type {
        Type::Ascii => {
            let raw = reader.get_bytes(data_offset, count)?;
            // ASCII values are NUL-terminated; cut at the first NUL.
            let text = match raw.iter().position(|&b| b == 0) {
                Some(end) => &raw[..end],
                None => &raw[..],
            };
            let text = std::str::from_utf8(text)
                .map_err(|e| IfdexError::Decode(format!("invalid string data: {e}")))?;
            Ok(Value::Ascii(text.to_owned()))
        }
        Type::Undefined => Ok(Value::Undefined(reader.get_bytes(data_offset, count)?)),
        _ if count == 1 => decode_scalar(reader, value_type, data_offset),
        _ => {
            let stride = value_type.size() as usize;
            // Validate the whole run up front so a truncated tail cannot
            // produce a partially decoded array. The length math is done
            // in u64 so a huge count cannot wrap on 32-bit targets.
            let byte_length = value_type.size() * count as u64;
            match (data_offset as u64).checked_add(byte_length) {
                Some(end) if end <= reader.len() as u64 => {}
                _ => {
                    return Err(IfdexError::OutOfRange {
                        index: data_offset as u64,
                        count: byte_length,
                        length: reader.len() as u64,
                    })
                }
            }
            let mut values = Vec::with_capacity(count);
            for i in 0..count {
                values.push(decode_scalar(reader, value_type, data_offset + i * stride)?);
            }
            Ok(Value::List(values))
        }
    }
}

fn decode_scalar(reader: &ByteReader, value_type: Type, offset: usize) -> IfdexResult<Value> {
    Ok(match value_type {
        Type::Byte => Value::Byte(reader.get_u8(offset)?),
        Type::SByte => Value::SByte(reader.get_i8(offset)?),
        Type::Short => Value::Short(reader.get_u16(offset)?),
        Type::SShort => Value::SShort(reader.get_i16(offset)?),
        Type::Long | Type::Ifd => Value::Long(reader.get_u32(offset)?),
        Type::SLong => Value::SLong(reader.get_i32(offset)?),
        Type::Float => Value::Float(reader.get_f32(offset)?),
        Type::Double => Value::Double(reader.get_f64(offset)?),
        Type::Rational => Value::Rational(Rational {
            num: reader.get_u32(offset)?,
            denom: reader.get_u32(offset + 4)?,
        }),
        Type::SRational => Value::SRational(SRational {
            num: reader.get_i32(offset)?,
            denom: reader.get_i32(offset + 4)?,
        }),
        // Handled in decode_value.
        Type::Ascii | Type::Undefined => unreachable!(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_errors_become_directory_errors() {
        let metadata = extract(Bytes::from_static(b"PK\x03\x04junk")).unwrap();
        assert_eq!(metadata.len(), 1);
        let dir = &metadata.directories()[0];
        assert_eq!(dir.kind(), DirectoryKind::Ifd0);
        assert!(dir.is_empty());
        assert!(dir.has_errors());
    }

    #[test]
    fn bad_magic_is_recorded() {
        let metadata = extract(Bytes::from_static(b"MM\x00\x2b\x00\x00\x00\x08")).unwrap();
        assert!(metadata.directories()[0]
            .errors()[0]
            .message
            .contains("magic"));
    }

    #[test]
    fn empty_input_is_the_only_hard_failure() {
        assert!(matches!(
            extract(Bytes::new()),
            Err(IfdexError::EmptyInput)
        ));
        // One junk byte is enough to get a (errored) aggregate back.
        assert!(extract(Bytes::from_static(b"\x00")).is_ok());
    }

    #[test]
    fn little_endian_header_switches_reads() {
        // II, magic 42, first IFD at 8, zero entries, no next IFD.
        let data: &[u8] = b"II\x2a\x00\x08\x00\x00\x00\x00\x00\x00\x00\x00\x00";
        let metadata = extract(Bytes::from_static(data)).unwrap();
        assert_eq!(metadata.len(), 1);
        let dir = &metadata.directories()[0];
        assert!(dir.is_empty());
        assert!(!dir.has_errors());
    }

    #[test]
    fn huge_component_count_is_rejected_up_front() {
        // count * stride overflows 32-bit length math; the whole-run bounds
        // check must still fail cleanly instead of wrapping.
        let reader = ByteReader::new(Bytes::from_static(&[0u8; 16]));
        assert!(matches!(
            decode_value(&reader, Type::Short, u32::MAX, 8),
            Err(IfdexError::OutOfRange { .. })
        ));
        assert!(matches!(
            decode_value(&reader, Type::Long, 0x4000_0000, 0),
            Err(IfdexError::OutOfRange { .. })
        ));
    }

    #[test]
    fn truncated_entry_table_is_structural() {
        // Big-endian header, IFD at 8 declaring 200 entries in a short buffer.
        let data: &[u8] = b"MM\x00\x2a\x00\x00\x00\x08\x00\xc8\x01\x12";
        let metadata = extract(Bytes::from_static(data)).unwrap();
        let dir = &metadata.directories()[0];
        assert!(dir.is_empty());
        assert_eq!(dir.errors().len(), 1);
        assert!(dir.errors()[0].message.contains("truncated IFD"));
    }
}
