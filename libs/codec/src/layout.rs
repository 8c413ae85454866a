//! Wire-layout structs and constants for the node identity buffer.
//!
//! All multi-byte integers are little-endian `U32`s from
//! `zerocopy::byteorder`, which are unaligned by construction, so a view can
//! be taken over a buffer at any alignment (cached buffers give no alignment
//! guarantee).

use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

/// Wire-order u32.
pub type WireU32 = U32<LittleEndian>;

/// Protocol identification magic ("MESH").
pub const NODE_MAGIC: u32 = 0x4D45_5348;

/// Current wire-format version.
pub const FORMAT_VERSION: u8 = 1;

/// Hard cap on a complete encoded buffer (header + payload).
pub const MAX_ENCODED_SIZE: usize = 65_536;

/// Number of directory slots. Fixed for version 1.
pub const FIELD_COUNT: usize = 8;

// Directory slot assignment. Fixed field order is what makes every top-level
// field locatable in O(1).
pub(crate) const SLOT_NAME: usize = 0;
pub(crate) const SLOT_NAMESPACE: usize = 1;
pub(crate) const SLOT_OWNER: usize = 2;
pub(crate) const SLOT_WORKLOAD_NAME: usize = 3;
pub(crate) const SLOT_MESH_ID: usize = 4;
pub(crate) const SLOT_CLUSTER_ID: usize = 5;
pub(crate) const SLOT_LABELS: usize = 6;
pub(crate) const SLOT_PLATFORM_METADATA: usize = 7;

/// Slot names, used in decode errors.
pub(crate) const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "name",
    "namespace",
    "owner",
    "workload_name",
    "mesh_id",
    "cluster_id",
    "labels",
    "platform_metadata",
];

/// Buffer header (16 bytes).
///
/// Field ordering groups the u32s ahead of the u8s so the struct is exactly
/// 16 bytes with zero padding. `checksum` is a CRC32 of the payload (all
/// bytes after the header).
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct NodeHeader {
    pub magic: WireU32,
    pub payload_size: WireU32,
    pub checksum: WireU32,
    pub version: u8,
    pub reserved: [u8; 3],
}

impl NodeHeader {
    /// Header size in bytes.
    pub const SIZE: usize = 16;
}

/// Directory entry (8 bytes).
///
/// For string slots, `offset`/`len` reference raw bytes in the data region.
/// For map slots, `offset` references a [`MapEntry`] table and `len` is the
/// entry count. Offsets are relative to the payload start.
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct DirEntry {
    pub offset: WireU32,
    pub len: WireU32,
}

impl DirEntry {
    pub const SIZE: usize = 8;
}

/// Map table entry (16 bytes), sorted strictly ascending by key bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct MapEntry {
    pub key_offset: WireU32,
    pub key_len: WireU32,
    pub value_offset: WireU32,
    pub value_len: WireU32,
}

impl MapEntry {
    pub const SIZE: usize = 16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_struct_sizes() {
        assert_eq!(std::mem::size_of::<NodeHeader>(), NodeHeader::SIZE);
        assert_eq!(std::mem::size_of::<DirEntry>(), DirEntry::SIZE);
        assert_eq!(std::mem::size_of::<MapEntry>(), MapEntry::SIZE);
    }

    #[test]
    fn test_wire_structs_are_unaligned() {
        assert_eq!(std::mem::align_of::<NodeHeader>(), 1);
        assert_eq!(std::mem::align_of::<DirEntry>(), 1);
        assert_eq!(std::mem::align_of::<MapEntry>(), 1);
    }
}
