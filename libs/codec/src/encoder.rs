//! Node identity encoder.
//!
//! Encoding is a pure function of the [`NodeInfo`] content: field order is
//! fixed by the directory, and both sub-maps come from `BTreeMap`s so their
//! tables are emitted sorted by key. Two documents with the same logical
//! content therefore encode to identical bytes.

use std::collections::BTreeMap;

use meshmeta_types::NodeInfo;
use zerocopy::AsBytes;

use crate::error::{CodecError, CodecResult};
use crate::layout::{
    DirEntry, MapEntry, NodeHeader, WireU32, FIELD_COUNT, FORMAT_VERSION, MAX_ENCODED_SIZE,
    NODE_MAGIC,
};

/// Encode a node record into a self-contained binary buffer.
///
/// Lenient by contract: absent fields encode as zero-length entries. The only
/// failure is exceeding [`MAX_ENCODED_SIZE`], which is checked before any
/// bytes are written.
pub fn encode_node(node: &NodeInfo) -> CodecResult<Vec<u8>> {
    let strings = [
        &node.name,
        &node.namespace,
        &node.owner,
        &node.workload_name,
        &node.mesh_id,
        &node.cluster_id,
    ];

    let dir_size = FIELD_COUNT * DirEntry::SIZE;
    let labels_table_size = node.labels.len() * MapEntry::SIZE;
    let platform_table_size = node.platform_metadata.len() * MapEntry::SIZE;
    let data_size: usize = strings.iter().map(|s| s.len()).sum::<usize>()
        + map_data_size(&node.labels)
        + map_data_size(&node.platform_metadata);

    let payload_size = dir_size + labels_table_size + platform_table_size + data_size;
    let total_size = NodeHeader::SIZE + payload_size;
    if total_size > MAX_ENCODED_SIZE {
        return Err(CodecError::MessageTooLarge {
            size: total_size,
            max: MAX_ENCODED_SIZE,
        });
    }

    // Region offsets within the payload.
    let labels_table_offset = dir_size;
    let platform_table_offset = labels_table_offset + labels_table_size;
    let data_offset = platform_table_offset + platform_table_size;

    let mut data = DataRegion::new(data_offset, data_size);

    let mut directory = [DirEntry {
        offset: WireU32::new(0),
        len: WireU32::new(0),
    }; FIELD_COUNT];

    for (slot, value) in strings.iter().enumerate() {
        let (offset, len) = data.push(value);
        directory[slot] = DirEntry { offset, len };
    }

    let labels_table = map_table(&node.labels, &mut data);
    directory[crate::layout::SLOT_LABELS] = DirEntry {
        offset: WireU32::new(labels_table_offset as u32),
        len: WireU32::new(node.labels.len() as u32),
    };

    let platform_table = map_table(&node.platform_metadata, &mut data);
    directory[crate::layout::SLOT_PLATFORM_METADATA] = DirEntry {
        offset: WireU32::new(platform_table_offset as u32),
        len: WireU32::new(node.platform_metadata.len() as u32),
    };

    // Assemble payload: directory, map tables, data region.
    let mut payload = Vec::with_capacity(payload_size);
    payload.extend_from_slice(directory.as_bytes());
    payload.extend_from_slice(labels_table.as_bytes());
    payload.extend_from_slice(platform_table.as_bytes());
    payload.extend_from_slice(&data.bytes);
    debug_assert_eq!(payload.len(), payload_size);

    let header = NodeHeader {
        magic: WireU32::new(NODE_MAGIC),
        payload_size: WireU32::new(payload.len() as u32),
        checksum: WireU32::new(crc32fast::hash(&payload)),
        version: FORMAT_VERSION,
        reserved: [0; 3],
    };

    let mut buffer = Vec::with_capacity(total_size);
    buffer.extend_from_slice(header.as_bytes());
    buffer.extend_from_slice(&payload);
    Ok(buffer)
}

fn map_data_size(map: &BTreeMap<String, String>) -> usize {
    map.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// BTreeMap iteration is key-sorted, so the emitted table already satisfies
/// the strictly-ascending invariant the decoder enforces.
fn map_table(map: &BTreeMap<String, String>, data: &mut DataRegion) -> Vec<MapEntry> {
    map.iter()
        .map(|(key, value)| {
            let (key_offset, key_len) = data.push(key);
            let (value_offset, value_len) = data.push(value);
            MapEntry {
                key_offset,
                key_len,
                value_offset,
                value_len,
            }
        })
        .collect()
}

/// Accumulates the raw string bytes while handing out payload-relative offsets.
struct DataRegion {
    base: usize,
    bytes: Vec<u8>,
}

impl DataRegion {
    fn new(base: usize, capacity: usize) -> Self {
        Self {
            base,
            bytes: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, value: &str) -> (WireU32, WireU32) {
        let offset = self.base + self.bytes.len();
        self.bytes.extend_from_slice(value.as_bytes());
        (
            WireU32::new(offset as u32),
            WireU32::new(value.len() as u32),
        )
    }
}
