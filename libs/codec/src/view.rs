//! Zero-copy decode side of the node identity codec.
//!
//! [`NodeView::parse`] validates the whole buffer once: header, checksum,
//! every directory and map reference, UTF-8, and map-key ordering. After
//! that, every accessor is infallible and borrows straight from the input
//! buffer; no decode allocates.

use zerocopy::Ref;

use meshmeta_types::NodeInfo;

use crate::error::{CodecError, CodecResult};
use crate::layout::{
    DirEntry, MapEntry, NodeHeader, FIELD_COUNT, FIELD_NAMES, FORMAT_VERSION, NODE_MAGIC,
    SLOT_CLUSTER_ID, SLOT_LABELS, SLOT_MESH_ID, SLOT_NAME, SLOT_NAMESPACE, SLOT_OWNER,
    SLOT_PLATFORM_METADATA, SLOT_WORKLOAD_NAME,
};

/// Zero-copy reader over an encoded node identity buffer.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    name: &'a str,
    namespace: &'a str,
    owner: &'a str,
    workload_name: &'a str,
    mesh_id: &'a str,
    cluster_id: &'a str,
    labels: MapView<'a>,
    platform_metadata: MapView<'a>,
}

impl<'a> NodeView<'a> {
    /// Validate a buffer and take a view over it.
    ///
    /// Every offset the buffer declares is bounds-checked here; a malformed
    /// buffer yields a [`CodecError`] and never an out-of-bounds read.
    pub fn parse(buffer: &'a [u8]) -> CodecResult<Self> {
        let (header, payload) = Ref::<_, NodeHeader>::new_from_prefix(buffer)
            .map(|(h, rest)| (h.into_ref(), rest))
            .ok_or(CodecError::MessageTooSmall {
                need: NodeHeader::SIZE,
                got: buffer.len(),
            })?;

        if header.magic.get() != NODE_MAGIC {
            return Err(CodecError::InvalidMagic {
                expected: NODE_MAGIC,
                actual: header.magic.get(),
            });
        }
        if header.version != FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion {
                version: header.version,
            });
        }
        let declared = header.payload_size.get() as usize;
        if declared != payload.len() {
            return Err(CodecError::TruncatedPayload {
                declared,
                actual: payload.len(),
            });
        }
        let calculated = crc32fast::hash(payload);
        if calculated != header.checksum.get() {
            return Err(CodecError::ChecksumMismatch {
                expected: header.checksum.get(),
                calculated,
            });
        }

        let dir_bytes = check_range(payload, 0, FIELD_COUNT * DirEntry::SIZE)?;
        let directory: &[DirEntry] = Ref::<_, [DirEntry]>::new_slice(dir_bytes)
            .ok_or(CodecError::MessageTooSmall {
                need: FIELD_COUNT * DirEntry::SIZE,
                got: dir_bytes.len(),
            })?
            .into_slice();

        Ok(Self {
            name: checked_str(payload, &directory[SLOT_NAME], FIELD_NAMES[SLOT_NAME])?,
            namespace: checked_str(
                payload,
                &directory[SLOT_NAMESPACE],
                FIELD_NAMES[SLOT_NAMESPACE],
            )?,
            owner: checked_str(payload, &directory[SLOT_OWNER], FIELD_NAMES[SLOT_OWNER])?,
            workload_name: checked_str(
                payload,
                &directory[SLOT_WORKLOAD_NAME],
                FIELD_NAMES[SLOT_WORKLOAD_NAME],
            )?,
            mesh_id: checked_str(payload, &directory[SLOT_MESH_ID], FIELD_NAMES[SLOT_MESH_ID])?,
            cluster_id: checked_str(
                payload,
                &directory[SLOT_CLUSTER_ID],
                FIELD_NAMES[SLOT_CLUSTER_ID],
            )?,
            labels: MapView::parse(payload, &directory[SLOT_LABELS], FIELD_NAMES[SLOT_LABELS])?,
            platform_metadata: MapView::parse(
                payload,
                &directory[SLOT_PLATFORM_METADATA],
                FIELD_NAMES[SLOT_PLATFORM_METADATA],
            )?,
        })
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    pub fn owner(&self) -> &'a str {
        self.owner
    }

    pub fn workload_name(&self) -> &'a str {
        self.workload_name
    }

    pub fn mesh_id(&self) -> &'a str {
        self.mesh_id
    }

    pub fn cluster_id(&self) -> &'a str {
        self.cluster_id
    }

    pub fn labels(&self) -> MapView<'a> {
        self.labels
    }

    pub fn platform_metadata(&self) -> MapView<'a> {
        self.platform_metadata
    }

    /// Node identity: `<name>.<namespace>`.
    pub fn node_id(&self) -> String {
        format!("{}.{}", self.name, self.namespace)
    }

    /// Copy the view out into an owned record.
    pub fn to_node_info(&self) -> NodeInfo {
        NodeInfo {
            name: self.name.to_string(),
            namespace: self.namespace.to_string(),
            owner: self.owner.to_string(),
            workload_name: self.workload_name.to_string(),
            mesh_id: self.mesh_id.to_string(),
            cluster_id: self.cluster_id.to_string(),
            labels: self
                .labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            platform_metadata: self
                .platform_metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Zero-copy reader over one encoded sub-map.
///
/// Entries are key-sorted (validated at parse), so [`lookup`](Self::lookup)
/// is a binary search over the entry table.
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    payload: &'a [u8],
    entries: &'a [MapEntry],
}

impl<'a> MapView<'a> {
    fn parse(
        payload: &'a [u8],
        slot: &DirEntry,
        map_name: &'static str,
    ) -> CodecResult<MapView<'a>> {
        let count = slot.len.get() as usize;
        let table_size = count
            .checked_mul(MapEntry::SIZE)
            .ok_or(CodecError::BoundsCheckFailed {
                offset: slot.offset.get() as usize,
                length: usize::MAX,
                payload_size: payload.len(),
            })?;
        let table_bytes = check_range(payload, slot.offset.get() as usize, table_size)?;
        let entries: &[MapEntry] = Ref::<_, [MapEntry]>::new_slice(table_bytes)
            .ok_or(CodecError::MessageTooSmall {
                need: table_size,
                got: table_bytes.len(),
            })?
            .into_slice();

        let mut previous_key: Option<&[u8]> = None;
        for entry in entries {
            let key_bytes = check_range(
                payload,
                entry.key_offset.get() as usize,
                entry.key_len.get() as usize,
            )?;
            std::str::from_utf8(key_bytes)
                .map_err(|_| CodecError::InvalidUtf8 { field: map_name })?;
            let value_bytes = check_range(
                payload,
                entry.value_offset.get() as usize,
                entry.value_len.get() as usize,
            )?;
            std::str::from_utf8(value_bytes)
                .map_err(|_| CodecError::InvalidUtf8 { field: map_name })?;

            if let Some(previous) = previous_key {
                if previous >= key_bytes {
                    return Err(CodecError::UnsortedMapKeys { map: map_name });
                }
            }
            previous_key = Some(key_bytes);
        }

        Ok(MapView { payload, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key in O(log n). Returns `None` for keys never inserted.
    pub fn lookup(&self, key: &str) -> Option<&'a str> {
        let needle = key.as_bytes();
        self.entries
            .binary_search_by(|entry| self.key_bytes(entry).cmp(needle))
            .ok()
            .map(|index| {
                let entry = &self.entries[index];
                self.str_at(entry.value_offset.get(), entry.value_len.get())
            })
    }

    /// Entry by table position, in key order.
    pub fn get(&self, index: usize) -> Option<(&'a str, &'a str)> {
        self.entries.get(index).map(|entry| {
            (
                self.str_at(entry.key_offset.get(), entry.key_len.get()),
                self.str_at(entry.value_offset.get(), entry.value_len.get()),
            )
        })
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.entries.iter().map(|entry| {
            (
                self.str_at(entry.key_offset.get(), entry.key_len.get()),
                self.str_at(entry.value_offset.get(), entry.value_len.get()),
            )
        })
    }

    fn key_bytes(&self, entry: &MapEntry) -> &'a [u8] {
        let start = entry.key_offset.get() as usize;
        &self.payload[start..start + entry.key_len.get() as usize]
    }

    fn str_at(&self, offset: u32, len: u32) -> &'a str {
        let start = offset as usize;
        let bytes = &self.payload[start..start + len as usize];
        // SAFETY: every entry range was bounds-checked and UTF-8 validated in
        // `MapView::parse` before the view was handed out.
        unsafe { std::str::from_utf8_unchecked(bytes) }
    }
}

fn checked_str<'a>(
    payload: &'a [u8],
    slot: &DirEntry,
    field: &'static str,
) -> CodecResult<&'a str> {
    let bytes = check_range(payload, slot.offset.get() as usize, slot.len.get() as usize)?;
    std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 { field })
}

fn check_range(payload: &[u8], offset: usize, length: usize) -> CodecResult<&[u8]> {
    let end = offset
        .checked_add(length)
        .filter(|end| *end <= payload.len())
        .ok_or(CodecError::BoundsCheckFailed {
            offset,
            length,
            payload_size: payload.len(),
        })?;
    Ok(&payload[offset..end])
}
