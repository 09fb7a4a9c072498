use proptest::prelude::*;

use super::*;

fn record(bus: u8, device: u8, function: u8, vendor: u16, dev: u16) -> DeviceRecord {
    let addr = PciAddress::new(bus, device, function).expect("valid address");
    DeviceRecord::new(addr, vendor, dev).expect("present vendor")
}

#[test]
fn empty_list_encodes_to_empty_array() {
    assert_eq!(encode_records(&[]).expect("encode"), b"[]");
}

#[test]
fn encodes_fields_in_wire_order_with_uppercase_padded_hex() {
    let payload = encode_records(&[record(0, 1, 0, 0x10de, 0x0a80)]).expect("encode");
    assert_eq!(
        String::from_utf8(payload).expect("utf8"),
        r#"[{"bus":0,"device":1,"function":0,"vendorID":"10DE","deviceID":"0A80"}]"#
    );
}

#[test]
fn decodes_lowercase_hex() {
    let records =
        decode_records(br#"[{"bus":2,"device":3,"function":1,"vendorID":"10de","deviceID":"1e84"}]"#)
            .expect("decode");
    assert_eq!(records, vec![record(2, 3, 1, 0x10DE, 0x1E84)]);
}

#[test]
fn rejects_payload_that_is_not_an_array() {
    let err = decode_records(br#"{"bus":0}"#).expect_err("object is not a report");
    assert!(matches!(err, DecodeError::Json(_)));
}

#[test]
fn rejects_absent_vendor_and_out_of_range_address() {
    let absent =
        decode_records(br#"[{"bus":0,"device":0,"function":0,"vendorID":"FFFF","deviceID":"0000"}]"#)
            .expect_err("vendor FFFF is not a device");
    assert!(matches!(absent, DecodeError::InvalidRecord { index: 0, .. }));

    let out_of_range = decode_records(
        br#"[{"bus":0,"device":0,"function":0,"vendorID":"8086","deviceID":"1237"},
            {"bus":0,"device":40,"function":0,"vendorID":"8086","deviceID":"1237"}]"#,
    )
    .expect_err("device 40 does not exist");
    assert!(matches!(out_of_range, DecodeError::InvalidRecord { index: 1, .. }));
}

#[test]
fn rejects_malformed_hex_ids() {
    for bad in [r#""0x8086""#, r#""18086""#, r#""""#, r#""GG00""#, "32902"] {
        let payload = format!(
            r#"[{{"bus":0,"device":0,"function":0,"vendorID":{bad},"deviceID":"1237"}}]"#
        );
        assert!(decode_records(payload.as_bytes()).is_err(), "accepted {bad}");
    }
}

proptest! {
    #[test]
    fn encoded_records_decode_to_the_same_tuples(
        raw in proptest::collection::vec(
            (any::<u8>(), 0u8..32, 0u8..8, 1u16..0xFFFF, any::<u16>()),
            1..32,
        ),
        lowercase in any::<bool>(),
    ) {
        let records: Vec<DeviceRecord> = raw
            .iter()
            .map(|&(b, d, f, v, id)| record(b, d, f, v, id))
            .collect();

        let mut payload: serde_json::Value =
            serde_json::from_slice(&encode_records(&records).expect("encode")).expect("json");
        if lowercase {
            for entry in payload.as_array_mut().expect("array") {
                for key in ["vendorID", "deviceID"] {
                    if let Some(id) = entry.get_mut(key) {
                        let lower = id.as_str().expect("hex string").to_ascii_lowercase();
                        *id = serde_json::Value::String(lower);
                    }
                }
            }
        }

        let decoded = decode_records(payload.to_string().as_bytes()).expect("decode");
        prop_assert_eq!(decoded, records);
    }
}
