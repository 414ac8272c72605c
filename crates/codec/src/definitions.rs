//! Field and type definitions registry.
//!
//! The registry is pure data: it maps field names to their wire
//! identity (type code, field code, flags), type names to numeric
//! codes, and transaction-type / ledger-entry-type names to their
//! numeric codes. Adding a field or a transaction type to the
//! protocol means adding an entry to the definitions document,
//! never a code change in the codec.
//!
//! Exactly one bundled instance exists per process
//! ([`Definitions::bundled`]); callers targeting a protocol variant
//! (a sidechain with an extended field set, say) construct their own
//! instance from an alternate document and pass it into every codec
//! call. Instances are immutable once built and freely shareable
//! across threads.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;
use snafu::{ensure, OptionExt};

use crate::error::{
    MalformedInputSnafu, Result, UnknownTransactionTypeSnafu, UnknownTypeSnafu,
};

/// The definitions document shipped with this crate.
const BUNDLED_JSON: &str = include_str!("definitions.json");

/// Base serializer kinds.
///
/// Every type name in a definitions document resolves to one of
/// these closed variants, either directly or through an alias
/// supplied at load time. The codec dispatches on the kind, so a
/// registry extension never introduces new serialization logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer, rendered as 16 hex digits in JSON.
    UInt64,
    /// 128-bit hash.
    Hash128,
    /// 160-bit hash.
    Hash160,
    /// 256-bit hash.
    Hash256,
    /// Variable-length byte string.
    Blob,
    /// 160-bit account identifier.
    AccountId,
    /// Native or issued currency amount.
    Amount,
    /// Nested object, terminated by the object-end sentinel.
    Object,
    /// Array of nested objects, terminated by the array-end sentinel.
    Array,
    /// Payment path set.
    PathSet,
    /// Sequence of 256-bit values.
    Vector256,
}

impl TypeKind {
    /// Resolves a base type name, `None` for names that need an alias.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "UInt8" => Some(Self::UInt8),
            "UInt16" => Some(Self::UInt16),
            "UInt32" => Some(Self::UInt32),
            "UInt64" => Some(Self::UInt64),
            "Hash128" => Some(Self::Hash128),
            "Hash160" => Some(Self::Hash160),
            "Hash256" => Some(Self::Hash256),
            "Blob" => Some(Self::Blob),
            "AccountID" => Some(Self::AccountId),
            "Amount" => Some(Self::Amount),
            "STObject" => Some(Self::Object),
            "STArray" => Some(Self::Array),
            "PathSet" => Some(Self::PathSet),
            "Vector256" => Some(Self::Vector256),
            _ => None,
        }
    }
}

/// Raw per-field entry of the definitions document.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEntry {
    /// Field code within its type ("nth field of this type").
    pub nth: u8,
    /// Whether the payload carries a variable-length prefix.
    #[serde(rename = "isVLEncoded")]
    pub is_vl_encoded: bool,
    /// Whether the field appears in the canonical byte stream at all.
    #[serde(rename = "isSerialized")]
    pub is_serialized: bool,
    /// Whether the field is covered by signatures.
    #[serde(rename = "isSigningField")]
    pub is_signing_field: bool,
    /// Type name, resolved against `TYPES` and the alias table.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Deserialized definitions document.
#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionsDoc {
    /// Type name to numeric type code.
    #[serde(rename = "TYPES")]
    pub types: HashMap<String, i32>,
    /// Field definitions, in document order.
    #[serde(rename = "FIELDS")]
    pub fields: Vec<(String, FieldEntry)>,
    /// Transaction type name to numeric code.
    #[serde(rename = "TRANSACTION_TYPES")]
    pub transaction_types: HashMap<String, i32>,
    /// Ledger entry type name to numeric code.
    #[serde(rename = "LEDGER_ENTRY_TYPES", default)]
    pub ledger_entry_types: HashMap<String, i32>,
}

/// A field's resolved wire identity.
///
/// Constructed once at registry load time and never mutated. Identity
/// is the name; canonical sort order is `(type_code, field_code)`
/// ascending.
#[derive(Debug, Clone)]
pub struct FieldInstance {
    /// Field name as it appears in canonical objects.
    pub name: String,
    /// Base serializer kind.
    pub kind: TypeKind,
    /// Numeric type code.
    pub type_code: i32,
    /// Numeric field code within the type.
    pub field_code: u8,
    /// Whether the payload carries a variable-length prefix.
    pub is_vl_encoded: bool,
    /// Whether the field appears in the canonical byte stream.
    pub is_serialized: bool,
    /// Whether the field is covered by signatures.
    pub is_signing_field: bool,
}

impl FieldInstance {
    /// Canonical sort key.
    #[must_use]
    pub fn ordinal(&self) -> (i32, u8) {
        (self.type_code, self.field_code)
    }
}

/// Immutable registry of field, type, and transaction-type definitions.
pub struct Definitions {
    fields: Vec<FieldInstance>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<(i32, u8), usize>,
    type_codes: HashMap<String, i32>,
    tx_type_codes: HashMap<String, i32>,
    tx_type_names: HashMap<i32, String>,
    ledger_entry_type_codes: HashMap<String, i32>,
    ledger_entry_type_names: HashMap<i32, String>,
}

impl Definitions {
    /// The registry built from the bundled definitions document.
    ///
    /// Built once per process; all callers share the same instance.
    #[must_use]
    pub fn bundled() -> &'static Definitions {
        static BUNDLED: OnceLock<Definitions> = OnceLock::new();
        BUNDLED.get_or_init(|| {
            #[allow(clippy::expect_used)]
            Definitions::from_json(BUNDLED_JSON).expect("bundled definitions document is valid")
        })
    }

    /// Builds a registry from a definitions document in JSON form.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if the JSON does not parse, and the
    /// errors of [`Definitions::from_doc`] for semantic problems.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: DefinitionsDoc = serde_json::from_str(json).map_err(|err| {
            MalformedInputSnafu { message: format!("definitions document: {err}") }.build()
        })?;
        Self::from_doc(doc)
    }

    /// Builds a registry from a parsed document with no type aliases.
    ///
    /// # Errors
    ///
    /// See [`Definitions::from_doc_with_aliases`].
    pub fn from_doc(doc: DefinitionsDoc) -> Result<Self> {
        Self::from_doc_with_aliases(doc, &[])
    }

    /// Builds a registry, aliasing new scalar type names onto base kinds.
    ///
    /// An alias `("NewType", TypeKind::UInt32)` makes every field of
    /// type `NewType` serialize exactly as a `UInt32` while keeping its
    /// own numeric type code from the document's `TYPES` table. The
    /// registry stores only the alias target, never new logic.
    ///
    /// # Errors
    ///
    /// - `UnknownType` if a field references a type name with neither a
    ///   base kind nor an alias, or a type name absent from `TYPES`.
    /// - `MalformedInput` if a serialized field's codes fall outside
    ///   the tag-encodable range (types 1–255, fields 1–255).
    pub fn from_doc_with_aliases(
        doc: DefinitionsDoc,
        aliases: &[(&str, TypeKind)],
    ) -> Result<Self> {
        let alias_map: HashMap<&str, TypeKind> = aliases.iter().copied().collect();

        let mut fields = Vec::with_capacity(doc.fields.len());
        for (name, entry) in &doc.fields {
            let kind = alias_map
                .get(entry.type_name.as_str())
                .copied()
                .or_else(|| TypeKind::from_name(&entry.type_name))
                .context(UnknownTypeSnafu { name: entry.type_name.clone() })?;
            let type_code = *doc
                .types
                .get(&entry.type_name)
                .context(UnknownTypeSnafu { name: entry.type_name.clone() })?;
            if entry.is_serialized {
                ensure!(
                    (1..=255).contains(&type_code) && entry.nth >= 1,
                    MalformedInputSnafu {
                        message: format!(
                            "field {name}: codes ({type_code}, {}) outside the tag range",
                            entry.nth
                        ),
                    }
                );
            }
            fields.push(FieldInstance {
                name: name.clone(),
                kind,
                type_code,
                field_code: entry.nth,
                is_vl_encoded: entry.is_vl_encoded,
                is_serialized: entry.is_serialized,
                is_signing_field: entry.is_signing_field,
            });
        }

        let mut by_name = HashMap::with_capacity(fields.len());
        let mut by_code = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            by_name.insert(field.name.clone(), idx);
            by_code.insert(field.ordinal(), idx);
        }

        let tx_type_names =
            doc.transaction_types.iter().map(|(name, &code)| (code, name.clone())).collect();
        let ledger_entry_type_names =
            doc.ledger_entry_types.iter().map(|(name, &code)| (code, name.clone())).collect();

        tracing::debug!(
            fields = fields.len(),
            types = doc.types.len(),
            transaction_types = doc.transaction_types.len(),
            "loaded definitions document"
        );

        Ok(Self {
            fields,
            by_name,
            by_code,
            type_codes: doc.types,
            tx_type_codes: doc.transaction_types,
            tx_type_names,
            ledger_entry_type_codes: doc.ledger_entry_types,
            ledger_entry_type_names,
        })
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInstance> {
        self.by_name.get(name).map(|&idx| &self.fields[idx])
    }

    /// Looks up a field by its `(type_code, field_code)` pair.
    #[must_use]
    pub fn field_by_code(&self, type_code: i32, field_code: u8) -> Option<&FieldInstance> {
        self.by_code.get(&(type_code, field_code)).map(|&idx| &self.fields[idx])
    }

    /// Numeric code of a type name.
    #[must_use]
    pub fn type_code(&self, name: &str) -> Option<i32> {
        self.type_codes.get(name).copied()
    }

    /// Numeric code of a transaction type name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTransactionType` for names absent from the
    /// registry.
    pub fn transaction_type_code(&self, name: &str) -> Result<i32> {
        self.tx_type_codes
            .get(name)
            .copied()
            .context(UnknownTransactionTypeSnafu { name: name.to_string() })
    }

    /// Name of a transaction type code, if the registry defines one.
    #[must_use]
    pub fn transaction_type_name(&self, code: i32) -> Option<&str> {
        self.tx_type_names.get(&code).map(String::as_str)
    }

    /// Numeric code of a ledger entry type name.
    #[must_use]
    pub fn ledger_entry_type_code(&self, name: &str) -> Option<i32> {
        self.ledger_entry_type_codes.get(name).copied()
    }

    /// Name of a ledger entry type code, if the registry defines one.
    #[must_use]
    pub fn ledger_entry_type_name(&self, code: i32) -> Option<&str> {
        self.ledger_entry_type_names.get(&code).map(String::as_str)
    }
}

impl std::fmt::Debug for Definitions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definitions")
            .field("fields", &self.fields.len())
            .field("types", &self.type_codes.len())
            .field("transaction_types", &self.tx_type_codes.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_loads() {
        let defs = Definitions::bundled();
        let account = defs.field("Account").unwrap();
        assert_eq!(account.kind, TypeKind::AccountId);
        assert_eq!(account.ordinal(), (8, 1));
        assert!(account.is_vl_encoded);

        let tx_type = defs.field("TransactionType").unwrap();
        assert_eq!(tx_type.ordinal(), (1, 2));
        assert_eq!(defs.transaction_type_code("Payment").unwrap(), 0);
        assert_eq!(defs.transaction_type_name(0), Some("Payment"));
        assert_eq!(defs.ledger_entry_type_name(97), Some("AccountRoot"));
    }

    #[test]
    fn test_signature_fields_excluded_from_signing() {
        let defs = Definitions::bundled();
        assert!(!defs.field("TxnSignature").unwrap().is_signing_field);
        assert!(!defs.field("Signers").unwrap().is_signing_field);
        assert!(defs.field("SigningPubKey").unwrap().is_signing_field);
    }

    #[test]
    fn test_lookup_by_code_matches_lookup_by_name() {
        let defs = Definitions::bundled();
        let by_name = defs.field("Destination").unwrap();
        let by_code = defs.field_by_code(8, 3).unwrap();
        assert_eq!(by_name.name, by_code.name);
    }

    #[test]
    fn test_unknown_lookups() {
        let defs = Definitions::bundled();
        assert!(defs.field("NoSuchField").is_none());
        assert!(defs.field_by_code(14, 200).is_none());
        assert!(defs.transaction_type_code("NoSuchTransaction").is_err());
    }

    #[test]
    fn test_new_type_requires_alias() {
        let mut doc: DefinitionsDoc = serde_json::from_str(super::BUNDLED_JSON).unwrap();
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

        let err = Definitions::from_doc(doc.clone()).unwrap_err();
        assert!(matches!(err, crate::error::CodecError::UnknownType { .. }));

        let defs = Definitions::from_doc_with_aliases(doc, &[("NewType", TypeKind::UInt32)])
            .unwrap();
        let field = defs.field("TestField").unwrap();
        assert_eq!(field.kind, TypeKind::UInt32);
        assert_eq!(field.ordinal(), (48, 100));
    }
}
