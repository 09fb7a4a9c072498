//! Receiver-side message boundaries.
//!
//! The sender writes one bare JSON array and nothing marks its end, so a
//! message is taken to end at the last `]` received so far.
//!
//! Known limits of that rule:
//! - the buffer grows without bound until a `]` shows up;
//! - a frame that fails to decode is dropped without trace;
//! - a chunk that ends just after an inner `]` hands the decoder a truncated payload;
//! - two reports arriving in one chunk are decoded as one (and fail).

use pci_probe::DeviceRecord;

use crate::errors::DecodeError;
use crate::wire::decode_records;

const FRAME_END: u8 = b']';

#[derive(Debug)]
pub enum FrameOutcome {
    /// No terminator yet; the bytes stay buffered.
    Incomplete,
    Decoded(Vec<DeviceRecord>),
    /// A terminated frame that did not decode. It has been removed from the buffer.
    Discarded(DecodeError),
}

#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> FrameOutcome {
        // Whatever is already buffered holds no terminator, so only the new
        // chunk needs searching.
        let Some(pos) = chunk.iter().rposition(|&b| b == FRAME_END) else {
            self.buffer.extend_from_slice(chunk);
            return FrameOutcome::Incomplete;
        };

        self.buffer.extend_from_slice(&chunk[..=pos]);
        let frame = std::mem::replace(&mut self.buffer, chunk[pos + 1..].to_vec());

        match decode_records(&frame) {
            Ok(records) => FrameOutcome::Decoded(records),
            Err(err) => FrameOutcome::Discarded(err),
        }
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests;
