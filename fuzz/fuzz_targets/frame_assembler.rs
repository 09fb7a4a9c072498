#![no_main]

use libfuzzer_sys::fuzz_target;
use pci_report::{FrameAssembler, FrameOutcome};

// First byte picks the chunk size so the same stream gets split many ways.
fuzz_target!(|data: &[u8]| {
    let Some((&split, stream)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(split % 32) + 1;

    let mut frames = FrameAssembler::new();
    for piece in stream.chunks(chunk) {
        match frames.push(piece) {
            FrameOutcome::Decoded(records) => {
                for record in records {
                    assert!(record.vendor_id() != 0 && record.vendor_id() != 0xFFFF);
                }
            }
            FrameOutcome::Incomplete | FrameOutcome::Discarded(_) => {}
        }
        assert!(frames.buffered_len() <= stream.len());
    }
});
