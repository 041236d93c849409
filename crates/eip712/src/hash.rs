//! Encoding and hashing of typed structured data.
//!
//! Implements the `encodeType`, `encodeData`, `hashStruct`, and
//! `domainSeparator` operations from [EIP-712], composed into the final
//! `0x1901`-prefixed signing digest. Atomic values encode to 32-byte words;
//! dynamic values (`string`, `bytes`, arrays, nested structs) encode to the
//! keccak-256 hash of their contents.
//!
//! [EIP-712]: https://eips.ethereum.org/EIPS/eip-712

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use sha3::{Digest, Keccak256};

use crate::{Domain, Error, TypedData, Types};

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// The `encodeType` string for `primary`: the primary type's declaration
/// followed by every transitively referenced struct type, sorted by name.
///
/// # Errors
///
/// Fails with `Error::UnknownType` when a referenced struct type has no
/// entry in `types`.
pub fn encode_type(primary: &str, types: &Types) -> Result<String, Error> {
    let mut referenced = BTreeSet::new();
    collect_types(primary, types, &mut referenced)?;
    referenced.remove(primary);

    let mut names = vec![primary.to_string()];
    names.extend(referenced);

    let mut encoded = String::new();
    for name in names {
        let fields = types.get(&name).ok_or_else(|| Error::UnknownType(name.clone()))?;
        let list =
            fields.iter().map(|f| format!("{} {}", f.type_, f.name)).collect::<Vec<_>>().join(",");
        encoded.push_str(&format!("{name}({list})"));
    }

    Ok(encoded)
}

/// `keccak256(encodeType(primary))`.
///
/// # Errors
///
/// Fails when `encode_type` fails.
pub fn type_hash(primary: &str, types: &Types) -> Result<[u8; 32], Error> {
    Ok(keccak256(encode_type(primary, types)?.as_bytes()))
}

/// `hashStruct(message) = keccak256(typeHash ‖ encodeData(message))`.
///
/// Fields are encoded in the order declared by the type's field list, never
/// the order they happen to appear in `message`.
///
/// # Errors
///
/// Fails when a declared field is missing from the message or a value does
/// not parse as its declared type.
pub fn hash_struct(
    type_name: &str, message: &Map<String, Value>, types: &Types,
) -> Result<[u8; 32], Error> {
    let fields =
        types.get(type_name).ok_or_else(|| Error::UnknownType(type_name.to_string()))?;

    let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
    encoded.extend_from_slice(&type_hash(type_name, types)?);

    for field in fields {
        let value = message
            .get(&field.name)
            .ok_or_else(|| Error::InvalidValue(field.name.clone(), "missing field".into()))?;
        encoded.extend_from_slice(&encode_value(&field.name, &field.type_, value, types)?);
    }

    Ok(keccak256(&encoded))
}

/// `hashStruct` of the `EIP712Domain` struct built from `domain`'s present
/// fields.
///
/// # Errors
///
/// Fails when the `verifyingContract` value is not a well-formed address.
pub fn domain_separator(domain: &Domain) -> Result<[u8; 32], Error> {
    let mut types = Types::new();
    types.insert("EIP712Domain".into(), domain.type_fields());
    hash_struct("EIP712Domain", &domain.message(), &types)
}

/// The final signing digest:
/// `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(primaryType, message))`.
///
/// # Errors
///
/// Fails when either constituent hash fails.
pub fn digest(typed_data: &TypedData) -> Result<[u8; 32], Error> {
    let mut bytes = Vec::with_capacity(2 + 32 + 32);
    bytes.extend_from_slice(&[0x19, 0x01]);
    bytes.extend_from_slice(&domain_separator(&typed_data.domain)?);
    bytes.extend_from_slice(&hash_struct(
        &typed_data.primary_type,
        &typed_data.message,
        &typed_data.types,
    )?);
    Ok(keccak256(&bytes))
}

/// Encode a single primitive value to its 32-byte word. Dynamic types
/// (`string`, `bytes`) encode to the keccak hash of their contents, as they
/// do inside `encodeData`.
///
/// # Errors
///
/// Fails when the value does not parse as the declared type.
pub fn encode_primitive(type_: &str, value: &Value) -> Result<[u8; 32], Error> {
    encode_value(type_, type_, value, &Types::new())
}

// Walk the type graph from `name`, recording every referenced struct type.
fn collect_types(
    name: &str, types: &Types, referenced: &mut BTreeSet<String>,
) -> Result<(), Error> {
    let fields = types.get(name).ok_or_else(|| Error::UnknownType(name.to_string()))?;
    for field in fields {
        let base = field.type_.trim_end_matches("[]");
        if types.contains_key(base) && referenced.insert(base.to_string()) {
            collect_types(base, types, referenced)?;
        }
    }
    Ok(())
}

// Encode a single value to its 32-byte word (atomic types) or the keccak
// hash of its contents (dynamic types, arrays, nested structs).
fn encode_value(
    name: &str, type_: &str, value: &Value, types: &Types,
) -> Result<[u8; 32], Error> {
    if let Some(element) = type_.strip_suffix("[]") {
        let Value::Array(items) = value else {
            return Err(Error::InvalidValue(name.into(), "expected an array".into()));
        };
        let mut encoded = Vec::with_capacity(32 * items.len());
        for item in items {
            encoded.extend_from_slice(&encode_value(name, element, item, types)?);
        }
        return Ok(keccak256(&encoded));
    }

    if types.contains_key(type_) {
        let Value::Object(object) = value else {
            return Err(Error::InvalidValue(name.into(), format!("expected a {type_} object")));
        };
        return hash_struct(type_, object, types);
    }

    match type_ {
        "string" => {
            let Value::String(s) = value else {
                return Err(Error::InvalidValue(name.into(), "expected a string".into()));
            };
            Ok(keccak256(s.as_bytes()))
        }
        "bytes" => Ok(keccak256(&decode_hex(name, value)?)),
        "bytes32" => {
            let bytes = decode_hex(name, value)?;
            fit_word(name, &bytes, false)
        }
        "address" => {
            let bytes = decode_hex(name, value)?;
            if bytes.len() != 20 {
                return Err(Error::InvalidValue(name.into(), "expected 20 address bytes".into()));
            }
            fit_word(name, &bytes, true)
        }
        "bool" => {
            let Value::Bool(b) = value else {
                return Err(Error::InvalidValue(name.into(), "expected a bool".into()));
            };
            let mut word = [0u8; 32];
            word[31] = u8::from(*b);
            Ok(word)
        }
        t if t.starts_with("uint") => {
            let n = match value {
                Value::Number(n) => n
                    .as_u64()
                    .ok_or_else(|| Error::InvalidValue(name.into(), "expected an unsigned integer".into()))?,
                Value::String(s) => s
                    .parse::<u64>()
                    .map_err(|e| Error::InvalidValue(name.into(), e.to_string()))?,
                _ => {
                    return Err(Error::InvalidValue(name.into(), "expected an unsigned integer".into()))
                }
            };
            let mut word = [0u8; 32];
            word[24..].copy_from_slice(&n.to_be_bytes());
            Ok(word)
        }
        _ => Err(Error::UnknownType(type_.to_string())),
    }
}

// Decode a 0x-prefixed hex string value.
fn decode_hex(name: &str, value: &Value) -> Result<Vec<u8>, Error> {
    let Value::String(s) = value else {
        return Err(Error::InvalidValue(name.into(), "expected a hex string".into()));
    };
    hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| Error::InvalidValue(name.into(), e.to_string()))
}

// Fit `bytes` into a 32-byte word: addresses left-pad (value in the low
// bytes), fixed byte strings right-pad (value in the high bytes).
fn fit_word(name: &str, bytes: &[u8], left_pad: bool) -> Result<[u8; 32], Error> {
    if bytes.len() > 32 {
        return Err(Error::InvalidValue(name.into(), "value exceeds 32 bytes".into()));
    }
    let mut word = [0u8; 32];
    if left_pad {
        word[32 - bytes.len()..].copy_from_slice(bytes);
    } else {
        word[..bytes.len()].copy_from_slice(bytes);
    }
    Ok(word)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::TypeField;

    fn mail_types() -> Types {
        let mut types = Types::new();
        types.insert(
            "Mail".into(),
            vec![
                TypeField::new("from", "Person"),
                TypeField::new("to", "Person"),
                TypeField::new("contents", "string"),
            ],
        );
        types.insert(
            "Person".into(),
            vec![TypeField::new("wallet", "address"), TypeField::new("name", "string")],
        );
        types
    }

    #[test]
    fn encode_type_orders_referenced_types() {
        let encoded = encode_type("Mail", &mail_types()).expect("should encode");
        assert_eq!(
            encoded,
            "Mail(Person from,Person to,string contents)Person(address wallet,string name)"
        );
    }

    #[test]
    fn encode_type_unknown_reference() {
        let mut types = mail_types();
        types.remove("Person");
        assert_eq!(encode_type("Mail", &types), Err(Error::UnknownType("Person".into())));
    }

    #[test]
    fn bool_word() {
        let word = encode_value("flag", "bool", &json!(true), &Types::new()).expect("should encode");
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(word, expected);
    }

    #[test]
    fn address_word_left_pads() {
        let addr = format!("0x{}", "11".repeat(20));
        let word =
            encode_value("who", "address", &json!(addr), &Types::new()).expect("should encode");
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0x11u8; 20]);
    }

    #[test]
    fn uint_word_big_endian() {
        let word = encode_value("n", "uint64", &json!(5), &Types::new()).expect("should encode");
        assert_eq!(word[31], 5);
        assert_eq!(&word[..31], &[0u8; 31]);
    }

    #[test]
    fn rejects_bad_address_length() {
        let err = encode_value("who", "address", &json!("0x1234"), &Types::new());
        assert!(matches!(err, Err(Error::InvalidValue(..))));
    }

    #[test]
    fn struct_hash_is_deterministic() {
        let types = mail_types();
        let message = json!({
            "from": {"wallet": format!("0x{}", "aa".repeat(20)), "name": "Alice"},
            "to": {"wallet": format!("0x{}", "bb".repeat(20)), "name": "Bob"},
            "contents": "Hello"
        });
        let Value::Object(message) = message else { panic!("should be an object") };

        let first = hash_struct("Mail", &message, &types).expect("should hash");
        let second = hash_struct("Mail", &message, &types).expect("should hash");
        assert_eq!(first, second);
    }

    #[test]
    fn struct_hash_is_content_sensitive() {
        let types = mail_types();
        let base = json!({
            "from": {"wallet": format!("0x{}", "aa".repeat(20)), "name": "Alice"},
            "to": {"wallet": format!("0x{}", "bb".repeat(20)), "name": "Bob"},
            "contents": "Hello"
        });
        let mut changed = base.clone();
        changed["contents"] = json!("Goodbye");

        let Value::Object(base) = base else { panic!("should be an object") };
        let Value::Object(changed) = changed else { panic!("should be an object") };

        assert_ne!(
            hash_struct("Mail", &base, &types).expect("should hash"),
            hash_struct("Mail", &changed, &types).expect("should hash"),
        );
    }

    #[test]
    fn missing_field_is_an_error() {
        let types = mail_types();
        let message = json!({"from": {"wallet": format!("0x{}", "aa".repeat(20)), "name": "A"}});
        let Value::Object(message) = message else { panic!("should be an object") };
        assert!(matches!(hash_struct("Mail", &message, &types), Err(Error::InvalidValue(..))));
    }

    #[test]
    fn domain_separator_includes_contract_when_set() {
        let bare = Domain::new("Test", "1", 1);
        let scoped = Domain::new("Test", "1", 1)
            .verifying_contract(format!("0x{}", "cc".repeat(20)));

        assert_ne!(
            domain_separator(&bare).expect("should hash"),
            domain_separator(&scoped).expect("should hash"),
        );
    }
}
