//! Persisted index file format.
//!
//! ```text
//! magic        [u8; 4]   "LXIX"
//! version      u32 LE    FORMAT_VERSION
//! profile      u64 LE    stage bits (low word) and conversion table
//!                        fingerprint (high word) the keys were built with
//! node_count   u64 LE
//! key_count    u64 LE
//! entry_count  u64 LE
//! nodes        node_count records, depth-first pre-order
//! crc32        u32 LE    over every preceding byte
//! ```
//!
//! Each node record:
//!
//! ```text
//! unit         u32 LE    code point (0 for the root)
//! flags        u8        bit 0: terminal
//! [terminal]   varint count, then count × (offset u64 LE, length u32 LE)
//! children     varint    number of child records that follow (recursively)
//! ```
//!
//! Children are written in ascending unit order. The decoder checks the
//! checksum, bounds every count against the bytes left, and requires the
//! decoded totals to match the header, so a damaged file is rejected rather
//! than producing wrong lookups.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::Serialize;

use crate::error::{LexidxError, Result};
use crate::lexical::entry::{ENTRY_REF_ENCODED_LEN, EntryRef};
use crate::lexical::index::{LexicalIndex, NodeId, ROOT};
use crate::storage::file::write_atomic;
use crate::util::varint;

/// Magic bytes opening every index file.
pub const INDEX_MAGIC: [u8; 4] = *b"LXIX";

/// Current format version. Files with any other version are rebuilt.
pub const FORMAT_VERSION: u32 = 2;

/// Encoded header length in bytes.
pub const HEADER_LEN: usize = 4 + 4 + 8 + 8 + 8 + 8;

const TRAILER_LEN: usize = 4;

/// Smallest possible node record: unit, flags and a one-byte child count.
const MIN_NODE_LEN: usize = 4 + 1 + 1;

const FLAG_TERMINAL: u8 = 0x01;

/// Decoded index file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexHeader {
    pub version: u32,
    pub profile: u64,
    pub node_count: u64,
    pub key_count: u64,
    pub entry_count: u64,
}

impl IndexHeader {
    /// Key-affecting stage bits, see [`StageConfig::profile`](crate::config::StageConfig::profile).
    pub fn stage_bits(&self) -> u32 {
        self.profile as u32
    }

    /// Fingerprint of the conversion table, 0 when keys were not converted.
    pub fn table_fingerprint(&self) -> u32 {
        (self.profile >> 32) as u32
    }
}

/// Serialize `index` into `sink`.
pub fn write_index<W: Write>(index: &LexicalIndex, sink: &mut W, profile: u64) -> Result<()> {
    let mut writer = CrcWriter::new(sink);

    writer.write_all(&INDEX_MAGIC)?;
    writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    writer.write_u64::<LittleEndian>(profile)?;
    writer.write_u64::<LittleEndian>(index.node_count() as u64)?;
    writer.write_u64::<LittleEndian>(index.key_count() as u64)?;
    writer.write_u64::<LittleEndian>(index.entry_count() as u64)?;

    let mut stack: Vec<NodeId> = vec![ROOT];
    while let Some(id) = stack.pop() {
        let node = index.node(id);
        let unit = if id == ROOT { 0 } else { node.unit as u32 };
        writer.write_u32::<LittleEndian>(unit)?;

        if node.is_terminal() {
            writer.write_u8(FLAG_TERMINAL)?;
            varint::write_u64(&mut writer, node.values.len() as u64)?;
            for entry in &node.values {
                writer.write_u64::<LittleEndian>(entry.offset)?;
                writer.write_u32::<LittleEndian>(entry.length)?;
            }
        } else {
            writer.write_u8(0)?;
        }

        varint::write_u64(&mut writer, node.children.len() as u64)?;
        for &(_, child) in node.children.iter().rev() {
            stack.push(child);
        }
    }

    let crc = writer.finish();
    sink.write_u32::<LittleEndian>(crc)?;
    sink.flush()?;
    Ok(())
}

/// Decode an index previously written by [`write_index`].
pub fn read_index<R: Read>(source: &mut R) -> Result<(LexicalIndex, IndexHeader)> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;
    decode(&data)
}

/// Decode an index from an in-memory buffer.
pub fn decode(data: &[u8]) -> Result<(LexicalIndex, IndexHeader)> {
    if data.len() < HEADER_LEN + MIN_NODE_LEN + TRAILER_LEN {
        return Err(LexidxError::index_format(format!(
            "index too small: {} bytes",
            data.len()
        )));
    }

    let (body, trailer) = data.split_at(data.len() - TRAILER_LEN);
    let expected = LittleEndian::read_u32(trailer);
    let actual = crc32fast::hash(body);
    if expected != actual {
        return Err(LexidxError::index_format(format!(
            "checksum mismatch: expected {:#010x}, got {:#010x}",
            expected, actual
        )));
    }

    let mut input = body;
    let header = parse_header(&mut input)?;
    if header.node_count == 0 || header.node_count > (input.len() / MIN_NODE_LEN) as u64 {
        return Err(LexidxError::index_format(format!(
            "node count {} does not fit in {} bytes",
            header.node_count,
            input.len()
        )));
    }

    let mut index = LexicalIndex::new();
    let root = read_node(&mut input)?;
    if root.unit != 0 {
        return Err(LexidxError::index_format(format!(
            "root unit must be 0, found {:#x}",
            root.unit
        )));
    }
    index.set_root_values(root.values);

    let mut decoded: u64 = 1;
    let mut stack: Vec<(NodeId, u64)> = vec![(ROOT, root.children)];
    while let Some(top) = stack.last_mut() {
        if top.1 == 0 {
            stack.pop();
            continue;
        }
        top.1 -= 1;
        let parent = top.0;

        decoded += 1;
        if decoded > header.node_count {
            return Err(LexidxError::index_format(format!(
                "more nodes than the {} declared",
                header.node_count
            )));
        }

        let record = read_node(&mut input)?;
        let unit = char::from_u32(record.unit).ok_or_else(|| {
            LexidxError::index_format(format!("invalid code point {:#x}", record.unit))
        })?;
        let id = index.push_last_child(parent, unit, record.values)?;
        stack.push((id, record.children));
    }

    if !input.is_empty() {
        return Err(LexidxError::index_format(format!(
            "{} trailing bytes after node records",
            input.len()
        )));
    }
    if decoded != header.node_count
        || index.key_count() as u64 != header.key_count
        || index.entry_count() as u64 != header.entry_count
    {
        return Err(LexidxError::index_format(format!(
            "decoded {} nodes / {} keys / {} entries, header declares {} / {} / {}",
            decoded,
            index.key_count(),
            index.entry_count(),
            header.node_count,
            header.key_count,
            header.entry_count
        )));
    }

    Ok((index, header))
}

/// Read only the header of an index stream.
pub fn read_header<R: Read>(source: &mut R) -> Result<IndexHeader> {
    let mut buf = [0u8; HEADER_LEN];
    source.read_exact(&mut buf).map_err(truncated)?;
    parse_header(&mut &buf[..])
}

/// Write `index` to `path` without ever exposing a partially written file.
pub fn write_index_file(index: &LexicalIndex, path: &Path, profile: u64) -> Result<()> {
    write_atomic(path, |file| {
        let mut writer = BufWriter::new(file);
        write_index(index, &mut writer, profile)?;
        writer.flush()?;
        Ok(())
    })
}

/// Load an index file written by [`write_index_file`].
pub fn read_index_file(path: &Path) -> Result<(LexicalIndex, IndexHeader)> {
    let file = File::open(path)?;
    let (index, header) = read_index(&mut BufReader::new(file))?;
    debug!(
        "decoded index {}: {} nodes, {} keys",
        path.display(),
        header.node_count,
        header.key_count
    );
    Ok((index, header))
}

fn parse_header(input: &mut &[u8]) -> Result<IndexHeader> {
    let mut magic = [0u8; 4];
    input.read_exact(&mut magic).map_err(truncated)?;
    if magic != INDEX_MAGIC {
        return Err(LexidxError::index_format(format!("invalid magic {:?}", magic)));
    }

    let version = input.read_u32::<LittleEndian>().map_err(truncated)?;
    if version != FORMAT_VERSION {
        return Err(LexidxError::index_format(format!(
            "unsupported version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    Ok(IndexHeader {
        version,
        profile: input.read_u64::<LittleEndian>().map_err(truncated)?,
        node_count: input.read_u64::<LittleEndian>().map_err(truncated)?,
        key_count: input.read_u64::<LittleEndian>().map_err(truncated)?,
        entry_count: input.read_u64::<LittleEndian>().map_err(truncated)?,
    })
}

struct NodeRecord {
    unit: u32,
    values: Vec<EntryRef>,
    children: u64,
}

fn read_node(input: &mut &[u8]) -> Result<NodeRecord> {
    let unit = input.read_u32::<LittleEndian>().map_err(truncated)?;
    let flags = input.read_u8().map_err(truncated)?;
    if flags & !FLAG_TERMINAL != 0 {
        return Err(LexidxError::index_format(format!("unknown node flags {:#04x}", flags)));
    }

    let mut values = Vec::new();
    if flags & FLAG_TERMINAL != 0 {
        let count = varint::read_u64(input)?;
        if count == 0 {
            return Err(LexidxError::index_format("terminal node without values"));
        }
        if count > (input.len() / ENTRY_REF_ENCODED_LEN) as u64 {
            return Err(LexidxError::index_format(format!(
                "value count {} exceeds remaining {} bytes",
                count,
                input.len()
            )));
        }
        values.reserve_exact(count as usize);
        for _ in 0..count {
            let offset = input.read_u64::<LittleEndian>().map_err(truncated)?;
            let length = input.read_u32::<LittleEndian>().map_err(truncated)?;
            values.push(EntryRef::new(offset, length));
        }
    }

    let children = varint::read_u64(input)?;
    if children > (input.len() / MIN_NODE_LEN) as u64 {
        return Err(LexidxError::index_format(format!(
            "child count {} exceeds remaining {} bytes",
            children,
            input.len()
        )));
    }

    Ok(NodeRecord {
        unit,
        values,
        children,
    })
}

fn truncated(e: io::Error) -> LexidxError {
    LexidxError::index_format(format!("truncated index: {}", e))
}

/// Forwards writes while feeding them to a CRC32 hasher.
struct CrcWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: crc32fast::Hasher,
}

impl<'a, W: Write> CrcWriter<'a, W> {
    fn new(inner: &'a mut W) -> Self {
        Self {
            inner,
            hasher: crc32fast::Hasher::new(),
        }
    }

    fn finish(self) -> u32 {
        self.hasher.finalize()
    }
}

impl<W: Write> Write for CrcWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
