//! Typed-data projection.
//!
//! Derives the full EIP-712 type graph for an arbitrary JSON document so the
//! document can be signed as structured data. The projection is recursive
//! over a closed set of value shapes: objects synthesize named sub-types
//! whose field lists follow the object's own key order; arrays must be
//! shape-uniform; scalars map to primitive type tags. Anything outside the
//! closed set is a definition error, never a silent best guess.
//!
//! The projection is deterministic: identical documents always yield
//! identical type graphs and field orders. A verifier independently
//! recomputes this structure from the published document, so any divergence
//! breaks signature verification.

use serde_json::{Map, Value};

use crate::{Domain, Error, TypeField, TypedData, Types};

/// Derive the typed-data payload for `document` with the given primary type
/// name and signing domain.
///
/// # Errors
///
/// Fails when the document contains a value outside the closed shape set,
/// an array with inconsistent element shapes, or two fields that synthesize
/// the same sub-type name with different field lists.
pub fn project(
    domain: Domain, primary_type: &str, document: &Map<String, Value>,
) -> Result<TypedData, Error> {
    tracing::debug!("project: {primary_type}");

    let mut types = Types::new();
    let fields = project_object(document, &mut types)?;
    register(&mut types, primary_type.to_string(), fields)?;
    types.insert("EIP712Domain".into(), domain.type_fields());

    Ok(TypedData {
        types,
        primary_type: primary_type.into(),
        domain,
        message: document.clone(),
    })
}

/// Returns `true` when `value` looks like a 20-byte hex address.
#[must_use]
pub fn is_address(value: &str) -> bool {
    value.len() == 42
        && value.starts_with("0x")
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

// One field per key, in the order the keys appear in the object.
fn project_object(object: &Map<String, Value>, types: &mut Types) -> Result<Vec<TypeField>, Error> {
    let mut fields = Vec::with_capacity(object.len());
    for (key, value) in object {
        fields.push(TypeField::new(key, infer(key, value, types)?));
    }
    Ok(fields)
}

// Infer the wire type tag for a single value, registering synthesized
// sub-types as a side effect.
fn infer(key: &str, value: &Value, types: &mut Types) -> Result<String, Error> {
    match value {
        Value::Object(object) => {
            let name = type_name(key);
            let fields = project_object(object, types)?;
            register(types, name.clone(), fields)?;
            Ok(name)
        }
        Value::Array(items) => infer_array(key, items, types),
        Value::String(s) => Ok(if is_address(s) { "address" } else { "string" }.into()),
        Value::Bool(_) => Ok("bool".into()),
        Value::Number(n) if n.is_u64() => Ok("uint256".into()),
        Value::Number(_) => Err(Error::Unsupported(key.into(), "non-integer number".into())),
        Value::Null => Err(Error::Unsupported(key.into(), "null".into())),
    }
}

// Arrays must unify to a single element type. For arrays of objects the
// elements all project into one named sub-type; `register` rejects any
// element whose field list diverges from the first.
fn infer_array(key: &str, items: &[Value], types: &mut Types) -> Result<String, Error> {
    let Some(first) = items.first() else {
        return Err(Error::Unsupported(key.into(), "empty array".into()));
    };

    let element = infer(key, first, types)?;
    for item in &items[1..] {
        if infer(key, item, types)? != element {
            return Err(Error::Heterogeneous(key.into()));
        }
    }

    Ok(format!("{element}[]"))
}

// Synthesized sub-type name for an object field: the key with its first
// alphabetic character upper-cased ("credentialSubject" → "CredentialSubject").
fn type_name(key: &str) -> String {
    let trimmed = key.trim_start_matches(|c: char| !c.is_ascii_alphabetic());
    let mut chars = trimmed.chars();
    chars.next().map_or_else(
        || key.to_string(),
        |first| first.to_ascii_uppercase().to_string() + chars.as_str(),
    )
}

// Insert a synthesized type, rejecting a second definition with a different
// field list.
fn register(types: &mut Types, name: String, fields: Vec<TypeField>) -> Result<(), Error> {
    if let Some(existing) = types.get(&name) {
        if *existing != fields {
            return Err(Error::TypeConflict(name));
        }
        return Ok(());
    }
    types.insert(name, fields);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document() -> Map<String, Value> {
        let doc = json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential", "AccountTrustCredential712"],
            "issuer": "did:pkh:eip155:1:0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "issuanceDate": "2024-05-01T12:00:00Z",
            "credentialSubject": {
                "id": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "trusted": true
            }
        });
        let Value::Object(doc) = doc else { panic!("should be an object") };
        doc
    }

    #[test]
    fn projection_is_deterministic() {
        let doc = document();
        let first = project(Domain::new("VerifiableCredential", "1", 1), "VerifiableCredential", &doc)
            .expect("should project");
        let second = project(Domain::new("VerifiableCredential", "1", 1), "VerifiableCredential", &doc)
            .expect("should project");

        assert_eq!(first.domain, second.domain);
        assert_eq!(first.types, second.types);
        assert_eq!(first.primary_type, second.primary_type);
    }

    #[test]
    fn nested_objects_synthesize_sub_types() {
        let doc = document();
        let typed_data = project(Domain::new("VerifiableCredential", "1", 1), "VerifiableCredential", &doc)
            .expect("should project");

        let subject = typed_data.types.get("CredentialSubject").expect("sub-type should exist");
        assert_eq!(
            subject,
            &vec![TypeField::new("id", "address"), TypeField::new("trusted", "bool")]
        );

        let primary = typed_data.types.get("VerifiableCredential").expect("primary should exist");
        assert_eq!(
            primary.iter().map(|f| f.type_.as_str()).collect::<Vec<_>>(),
            vec!["string[]", "string[]", "string", "string", "CredentialSubject"]
        );
    }

    #[test]
    fn field_order_follows_key_order() {
        let doc = document();
        let typed_data = project(Domain::new("VerifiableCredential", "1", 1), "VerifiableCredential", &doc)
            .expect("should project");

        let primary = typed_data.types.get("VerifiableCredential").expect("primary should exist");
        assert_eq!(
            primary.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["@context", "type", "issuer", "issuanceDate", "credentialSubject"]
        );
    }

    #[test]
    fn every_referenced_type_is_registered() {
        let doc = document();
        let typed_data = project(Domain::new("VerifiableCredential", "1", 1), "VerifiableCredential", &doc)
            .expect("should project");

        for fields in typed_data.types.values() {
            for field in fields {
                let base = field.type_.trim_end_matches("[]");
                let primitive =
                    matches!(base, "string" | "bool" | "address" | "uint256");
                assert!(
                    primitive || typed_data.types.contains_key(base),
                    "unregistered type: {base}"
                );
            }
        }
    }

    #[test]
    fn heterogeneous_object_array_is_rejected() {
        let doc = json!({
            "items": [{"a": 1}, {"b": 2}]
        });
        let Value::Object(doc) = doc else { panic!("should be an object") };

        let err = project(Domain::new("T", "1", 1), "T", &doc);
        assert_eq!(err, Err(Error::TypeConflict("Items".into())));
    }

    #[test]
    fn mixed_scalar_array_is_rejected() {
        let doc = json!({"items": ["one", true]});
        let Value::Object(doc) = doc else { panic!("should be an object") };

        let err = project(Domain::new("T", "1", 1), "T", &doc);
        assert_eq!(err, Err(Error::Heterogeneous("items".into())));
    }

    #[test]
    fn empty_array_is_rejected() {
        let doc = json!({"items": []});
        let Value::Object(doc) = doc else { panic!("should be an object") };

        assert!(matches!(
            project(Domain::new("T", "1", 1), "T", &doc),
            Err(Error::Unsupported(..))
        ));
    }

    #[test]
    fn address_detection() {
        assert!(is_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
        assert!(is_address("0xF39FD6E51AAD88F6F4CE6AB8827279CFFFB92266"));
        assert!(!is_address("0x1234"));
        assert!(!is_address("f39fd6e51aad88f6f4ce6ab8827279cfffb92266aa"));
        assert!(!is_address("did:pkh:eip155:1:0xf39f"));
    }

    #[test]
    fn projected_document_hashes() {
        let doc = document();
        let typed_data = project(Domain::new("VerifiableCredential", "1", 1), "VerifiableCredential", &doc)
            .expect("should project");

        let first = typed_data.digest().expect("should hash");
        let second = typed_data.digest().expect("should hash");
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
    }
}
