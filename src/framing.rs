use bytes::{BufMut, Bytes, BytesMut};

pub const CHUNK_START: u8 = 0x00;
pub const CHUNK_START_END: u8 = 0x20;
pub const CHUNK_MIDDLE: u8 = 0x40;
pub const CHUNK_END: u8 = 0x80;

/// Splits one encoded packet into chunks of at most `max_chunk_len` bytes,
/// each prefixed with a 1-byte position header, for transports whose payload
/// unit is smaller than a codec packet. Empty input produces no chunks.
pub fn pack(packet: &[u8], max_chunk_len: usize) -> Vec<Bytes> {
    // A chunk is one header byte plus at least one payload byte.
    let payload_len = max_chunk_len.saturating_sub(1).max(1);

    let mut chunks = Vec::with_capacity(packet.len().div_ceil(payload_len));
    let mut offset = 0;

    while offset < packet.len() {
        let remaining = packet.len() - offset;
        let size = payload_len.min(remaining);
        let head = match (offset == 0, remaining <= payload_len) {
            (true, true) => CHUNK_START_END,
            (true, false) => CHUNK_START,
            (false, true) => CHUNK_END,
            (false, false) => CHUNK_MIDDLE,
        };

        let mut chunk = BytesMut::with_capacity(size + 1);
        chunk.put_u8(head);
        chunk.extend_from_slice(&packet[offset..offset + size]);
        chunks.push(chunk.freeze());

        offset += size;
    }

    chunks
}

/// Rebuilds packets from chunks produced by `pack`, fed in link order.
#[derive(Debug, Default)]
pub struct Reassembler {
    partial: BytesMut,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one received chunk; returns the reassembled packet when the
    /// chunk completes one. A start header discards any partial packet, so a
    /// truncated sequence costs one packet, never a desynchronized stream.
    /// Headerless (empty) and unknown-header chunks are ignored.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Bytes> {
        let (&head, payload) = chunk.split_first()?;

        match head {
            CHUNK_START => {
                self.partial.clear();
                self.partial.extend_from_slice(payload);
                None
            }
            CHUNK_START_END => {
                self.partial.clear();
                Some(Bytes::copy_from_slice(payload))
            }
            CHUNK_MIDDLE => {
                self.partial.extend_from_slice(payload);
                None
            }
            CHUNK_END => {
                self.partial.extend_from_slice(payload);
                Some(self.partial.split().freeze())
            }
            _ => None,
        }
    }
}
