#![no_main]

use libfuzzer_sys::fuzz_target;
use pci_report::{decode_records, encode_records};

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = decode_records(data) {
        let encoded = encode_records(&records).expect("decoded records re-encode");
        let again = decode_records(&encoded).expect("re-encoded payload decodes");
        assert_eq!(records, again);
    }
});
