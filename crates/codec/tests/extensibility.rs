//! Registry extension scenarios.
//!
//! The registry is data; each test augments the bundled document and
//! checks that the codec picks the addition up with no code change,
//! while the unaugmented registry keeps rejecting it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use arbor_ledger_codec::definitions::{DefinitionsDoc, FieldEntry};
use arbor_ledger_codec::{decode, encode, Definitions, TypeKind};
use serde_json::{json, Value};

const BUNDLED_JSON: &str = include_str!("../src/definitions.json");

fn doc() -> DefinitionsDoc {
    serde_json::from_str(BUNDLED_JSON).unwrap()
}

fn uint32_entry(nth: u8) -> FieldEntry {
    FieldEntry {
        nth,
        is_vl_encoded: false,
        is_serialized: true,
        is_signing_field: true,
        type_name: "UInt32".to_string(),
    }
}

#[test]
fn test_new_transaction_type() {
    let mut doc = doc();
    doc.transaction_types.insert("NewTestTransaction".to_string(), 75);
    let defs = Definitions::from_doc(doc).unwrap();

    let tx = json!({ "TransactionType": "NewTestTransaction" });
    let blob = encode(&tx, &defs).unwrap();
    assert_eq!(blob, "12004B");
    assert_eq!(decode(&blob, &defs).unwrap(), tx);

    let bundled = Definitions::bundled();
    assert!(encode(&tx, bundled).is_err());
    // The bundled registry has no name for code 75, so the decode
    // stays numeric.
    assert_eq!(decode(&blob, bundled).unwrap(), json!({ "TransactionType": 75 }));
}

#[test]
fn test_new_field() {
    let mut doc = doc();
    doc.fields.push(("NewFieldDefinition".to_string(), uint32_entry(100)));
    let defs = Definitions::from_doc(doc).unwrap();

    let tx = json!({ "NewFieldDefinition": 30 });
    let blob = encode(&tx, &defs).unwrap();
    // Field code 100 does not fit the tag nibble and escapes to a
    // second byte.
    assert_eq!(blob, "20640000001E");
    assert_eq!(decode(&blob, &defs).unwrap(), tx);

    // The bundled registry does not know the name: the default encode
    // drops it, strict encode refuses it, decode always refuses the
    // code pair.
    assert_eq!(encode(&tx, Definitions::bundled()).unwrap(), "");
    let strict = arbor_ledger_codec::EncodeOptions {
        strict: true,
        ..arbor_ledger_codec::EncodeOptions::default()
    };
    assert!(
        arbor_ledger_codec::encode_with_options(&tx, Definitions::bundled(), &strict).is_err()
    );
    assert!(decode(&blob, Definitions::bundled()).is_err());
}

#[test]
fn test_new_field_nested_in_array_wrapper() {
    let mut doc = doc();
    doc.fields.push(("NewFieldArray".to_string(), uint32_entry(101)));
    let defs = Definitions::from_doc(doc).unwrap();

    let tx = json!({
        "Memos": [
            { "Memo": { "MemoData": "AB", "NewFieldArray": 7 } },
        ],
    });
    let blob = encode(&tx, &defs).unwrap();
    let decoded = decode(&blob, &defs).unwrap();
    assert_eq!(decoded, tx);

    assert!(decode(&blob, Definitions::bundled()).is_err());
}

#[test]
fn test_new_aliased_type() {
    let mut doc = doc();
    doc.types.insert("NewType".to_string(), 48);
    doc.fields.push((
        "TestField".to_string(),
        FieldEntry {
            nth: 100,
            is_vl_encoded: false,
            is_serialized: true,
            is_signing_field: true,
            type_name: "NewType".to_string(),
        },
    ));
    let defs =
        Definitions::from_doc_with_aliases(doc, &[("NewType", TypeKind::UInt32)]).unwrap();

    let tx = json!({ "TestField": 30 });
    let blob = encode(&tx, &defs).unwrap();
    // Type 48 and field 100 both escape: 00 30 64, then the UInt32.
    assert_eq!(blob, "0030640000001E");
    assert_eq!(decode(&blob, &defs).unwrap(), tx);

    assert!(decode(&blob, Definitions::bundled()).is_err());
}

#[test]
fn test_default_encode_skips_future_fields() {
    let mut extended = doc();
    extended.fields.push(("FutureField".to_string(), uint32_entry(102)));
    let future_defs = Definitions::from_doc(extended).unwrap();

    let tx = json!({ "Sequence": 5, "FutureField": 1 });
    let future_blob = encode(&tx, &future_defs).unwrap();

    let lenient = encode(&tx, Definitions::bundled()).unwrap();
    assert_eq!(lenient, encode(&json!({ "Sequence": 5 }), Definitions::bundled()).unwrap());
    assert_ne!(lenient, future_blob);
}

#[test]
fn test_decoded_unknown_value_survives_reencode_with_extended_registry() {
    let mut doc = doc();
    doc.fields.push(("NewFieldDefinition".to_string(), uint32_entry(100)));
    let defs = Definitions::from_doc(doc).unwrap();

    let tx = json!({ "Flags": 1, "NewFieldDefinition": 42, "Sequence": 2 });
    let blob = encode(&tx, &defs).unwrap();
    let decoded: Value = decode(&blob, &defs).unwrap();
    assert_eq!(encode(&decoded, &defs).unwrap(), blob);
}
