//! Binary snapshots of a [`LexiconIndex`] for fast startup.
//!
//! Layout: `b"MDLX"`, format version (`u16`, little endian), CRC32 of the payload
//! (`u32`, little endian), then the gzip-compressed payload. The payload is a
//! bincode-encoded list of [`Record`]s: node `i` is written at position `2i` and
//! its edge map at `2i + 1`; edges refer to the positions of child node records.
//!
//! Loading is a trust boundary. Only the two record shapes below decode at all,
//! and every reference, label and the absence of cycles are checked before a new
//! index is built, so a rejected snapshot never yields a partial index.

use super::{LexNode, LexiconError, LexiconIndex, NodeId};
use crate::letter::MuddleChar;
use bincode::Options;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

const MAGIC: &[u8; 4] = b"MDLX";
const HEADER_LEN: usize = MAGIC.len() + 2 + 4;

/// Snapshot format written by this build.
pub const FORMAT_VERSION: u16 = 1;

/// Most nodes a snapshot can hold: two records each, numbered by `u32`.
pub const MAX_SNAPSHOT_NODES: u64 = 1 << 31;

// Upper bound on the decompressed payload
const MAX_PAYLOAD_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Record {
    Node { terminal: bool, edges: u32 },
    EdgeMap { entries: Vec<(char, u32)> },
}

impl Record {
    fn kind(&self) -> &'static str {
        match self {
            Record::Node { .. } => "node",
            Record::EdgeMap { .. } => "edge map",
        }
    }
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_PAYLOAD_BYTES)
}

impl LexiconIndex {
    /// Encode the whole graph as snapshot bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::Io`] if encoding or compression fails, or
    /// [`LexiconError::TooManyNodes`] if the graph has more than
    /// [`MAX_SNAPSHOT_NODES`] nodes.
    pub fn to_snapshot_bytes(&self) -> Result<Vec<u8>, LexiconError> {
        encode_records(&self.records()?)
    }

    /// Decode and validate snapshot bytes into a new index.
    ///
    /// # Errors
    ///
    /// Any framing, decoding or structural fault is reported as the matching
    /// [`LexiconError`] variant; nothing is built in that case.
    pub fn from_snapshot_bytes(bytes: &[u8]) -> Result<Self, LexiconError> {
        let records = decode_records(bytes)?;
        let nodes = rebuild(&records)?;
        debug!("loaded snapshot with {} nodes", nodes.len());
        Ok(LexiconIndex::from_nodes(nodes))
    }

    /// Write a snapshot file, replacing any existing one.
    ///
    /// # Errors
    ///
    /// See [`LexiconIndex::to_snapshot_bytes`]; file system errors are [`LexiconError::Io`].
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), LexiconError> {
        let bytes = self.to_snapshot_bytes()?;
        std::fs::write(path.as_ref(), &bytes)?;
        debug!("wrote {} byte snapshot to {}", bytes.len(), path.as_ref().display());
        Ok(())
    }

    /// Read a snapshot file.
    ///
    /// # Errors
    ///
    /// See [`LexiconIndex::from_snapshot_bytes`]; file system errors are [`LexiconError::Io`].
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self, LexiconError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_snapshot_bytes(&bytes)
    }

    fn records(&self) -> Result<Vec<Record>, LexiconError> {
        let too_many = || LexiconError::TooManyNodes { nodes: self.node_count(), limit: MAX_SNAPSHOT_NODES };
        let mut records = Vec::with_capacity(self.node_count() * 2);
        for (id, node) in self.nodes().iter().enumerate() {
            let position = node_position(id).ok_or_else(too_many)?;
            records.push(Record::Node { terminal: node.is_terminal(), edges: position + 1 });
            let entries = node
                .edges()
                .map(|(label, child)| node_position(child as usize).map(|target| (label, target)))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(too_many)?;
            records.push(Record::EdgeMap { entries });
        }
        Ok(records)
    }
}

/// Record position of node `id`, provided its edge map at the next position fits too.
fn node_position(id: usize) -> Option<u32> {
    u32::try_from(id)
        .ok()
        .and_then(|id| id.checked_mul(2))
        .filter(|position| *position < u32::MAX)
}

fn encode_records(records: &[Record]) -> Result<Vec<u8>, LexiconError> {
    let raw = codec()
        .serialize(records)
        .map_err(|e| LexiconError::Io(std::io::Error::other(e.to_string())))?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    frame(&encoder.finish()?)
}

fn frame(payload: &[u8]) -> Result<Vec<u8>, LexiconError> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.write_u16::<LittleEndian>(FORMAT_VERSION)?;
    out.write_u32::<LittleEndian>(crc32fast::hash(payload))?;
    out.extend_from_slice(payload);
    Ok(out)
}

fn decode_records(bytes: &[u8]) -> Result<Vec<Record>, LexiconError> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(LexiconError::BadMagic);
    }
    let mut header = &bytes[MAGIC.len()..HEADER_LEN];
    let version = header.read_u16::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(LexiconError::UnsupportedVersion { found: version, expected: FORMAT_VERSION });
    }
    let expected = header.read_u32::<LittleEndian>()?;
    let payload = &bytes[HEADER_LEN..];
    let found = crc32fast::hash(payload);
    if found != expected {
        return Err(LexiconError::ChecksumMismatch { expected, found });
    }

    let mut raw = Vec::new();
    GzDecoder::new(payload)
        .take(MAX_PAYLOAD_BYTES + 1)
        .read_to_end(&mut raw)
        .map_err(|e| LexiconError::Undecodable(e.to_string()))?;
    if raw.len() as u64 > MAX_PAYLOAD_BYTES {
        return Err(LexiconError::Undecodable("payload exceeds size limit".to_string()));
    }
    codec()
        .deserialize(&raw)
        .map_err(|e| LexiconError::Undecodable(e.to_string()))
}

/// Check every record and build the node arena, numbering nodes in record order.
fn rebuild(records: &[Record]) -> Result<Vec<LexNode>, LexiconError> {
    let first = records.first().ok_or(LexiconError::EmptySnapshot)?;
    if !matches!(first, Record::Node { .. }) {
        return Err(LexiconError::UnexpectedRecord { index: 0, expected: "node", found: first.kind() });
    }

    let mut next_id: NodeId = 0;
    let ids: Vec<Option<NodeId>> = records
        .iter()
        .map(|record| {
            matches!(record, Record::Node { .. }).then(|| {
                next_id += 1;
                next_id - 1
            })
        })
        .collect();
    let node_id = |referrer: usize, target: usize| -> Result<NodeId, LexiconError> {
        match (records.get(target), ids.get(target).copied().flatten()) {
            (Some(_), Some(id)) => Ok(id),
            (Some(other), None) => Err(LexiconError::UnexpectedRecord { index: target, expected: "node", found: other.kind() }),
            (None, _) => Err(LexiconError::DanglingReference { index: referrer, target }),
        }
    };

    let mut nodes = Vec::with_capacity(next_id as usize);
    for (index, record) in records.iter().enumerate() {
        let Record::Node { terminal, edges } = record else {
            continue;
        };
        let edge_map = *edges as usize;
        let entries = match records.get(edge_map) {
            Some(Record::EdgeMap { entries }) => entries,
            Some(other) => {
                return Err(LexiconError::UnexpectedRecord { index: edge_map, expected: "edge map", found: other.kind() })
            }
            None => return Err(LexiconError::DanglingReference { index, target: edge_map }),
        };
        let mut node = LexNode::new(*terminal);
        for &(label, target) in entries {
            if !label.is_edge_label() {
                return Err(LexiconError::InvalidEdgeLabel { index: edge_map, label });
            }
            node.set_edge(label, node_id(edge_map, target as usize)?);
        }
        nodes.push(node);
    }

    check_acyclic(&nodes)?;
    Ok(nodes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Finished,
}

/// Iterative depth-first search; reaching a node already on the current path is a cycle.
fn check_acyclic(nodes: &[LexNode]) -> Result<(), LexiconError> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];
    for start in 0..nodes.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        marks[start] = Mark::OnPath;
        let mut stack = vec![(start, 0usize)];
        while let Some((node, cursor)) = stack.last_mut() {
            let node = *node;
            match nodes[node].edges().nth(*cursor) {
                Some((_, child)) => {
                    *cursor += 1;
                    let child = child as usize;
                    match marks[child] {
                        Mark::OnPath => return Err(LexiconError::Cyclic { node: child }),
                        Mark::Unvisited => {
                            marks[child] = Mark::OnPath;
                            stack.push((child, 0));
                        }
                        Mark::Finished => {}
                    }
                }
                None => {
                    marks[node] = Mark::Finished;
                    stack.pop();
                }
            }
        }
    }
    Ok(())
}
