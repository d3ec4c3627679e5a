//! Record decode/encode machinery
//!
//! This module contains [`RecordAdapter`], the composite adapter that a
//! generated codec module assembles out of a property schema, a set of
//! field bindings, and a [`RecordShape`]. It is the keystone of the
//! crate: everything else — streams, leaf adapters, the matcher, the
//! registry — exists so that a `RecordAdapter` can be built once and
//! then run against any number of token streams.
//!
//! # Decoding
//!
//! Decoding drives the reader through
//! `begin_record → (key ⇄ value)* → end_record` and then reconciles
//! the accumulated slot values into a target value:
//!
//! 1. *Required construction.* Every required property's slot is
//!    checked before anything is constructed; a hole aborts the call
//!    with [`DecodeError::MissingRequiredProperty`]. The shape's
//!    constructor then runs, pulling required constructor parameters
//!    and letting the target type's own defaults stand in for the
//!    defaulted ones.
//! 2. *Default reconciliation.* Slots of defaulted constructor
//!    parameters are gated by the presence rule — a property that
//!    differentiates absent from null overrides exactly when its key
//!    was present (an explicit null overrides!), any other defaulted
//!    property overrides exactly when its slot holds a value — and the
//!    survivors are applied in a single reconstruction of the phase-1
//!    value. No validation is repeated here.
//! 3. *Non-constructor assignment.* Slots of post-construction
//!    properties are gated by the same rule and assigned by mutation;
//!    gated-out slots leave the freshly constructed value untouched.
//!
//! During the key loop, a key the matcher does not recognize is skipped
//! wholesale — no delegate runs, and no error is raised. A null in
//! value position of a non-nullable property aborts immediately with
//! [`DecodeError::UnexpectedNullValue`]; no further keys are read.
//!
//! # Encoding
//!
//! Encoding iterates the schema in declaration order, writing each wire
//! key and the delegate-encoded field value between a pair of record
//! markers. A nullable field whose value is `None` is written as an
//! explicit null by its null-safe delegate.
//!
//! # Sharing
//!
//! A built `RecordAdapter` is immutable: concurrent decode/encode calls
//! on independent streams are safe, with all per-call state confined to
//! the [`SlotTable`].

pub mod bind;
pub mod slots;

pub use bind::{PropertyCodec, RecordProperty};
pub use slots::{RecordShape, SlotTable};

use crate::adapter::Adapter;
use crate::error::{DecodeError, DecodeResult, EncodeResult, SchemaError};
use crate::matcher::KeyMatcher;
use crate::schema::PropertySchema;
use crate::stream::{TokenReader, TokenWriter};

/// Decoder/encoder pair for one record-like target type.
///
/// Built once per target type from the declaration-ordered property
/// bindings and the type's construction shape; reused for every decode
/// and encode call thereafter. `RecordAdapter<T>` itself implements
/// [`Adapter<Value = T>`], so it can serve as the delegate for a field
/// of type `T` in an enclosing record schema.
pub struct RecordAdapter<T> {
    name: &'static str,
    properties: Box<[RecordProperty<T>]>,
    matcher: KeyMatcher,
    shape: RecordShape<T>,
}

impl<T: 'static> RecordAdapter<T> {
    /// Builds the adapter, validating the schema as a whole.
    ///
    /// # Errors
    ///
    /// * [`SchemaError::DuplicateWireKey`] if two properties share a
    ///   wire key.
    /// * [`SchemaError::MissingReconstructor`] if a defaulted
    ///   constructor parameter exists but the shape has no phase-2
    ///   callback.
    /// * [`SchemaError::MissingAssigner`] if a non-constructor property
    ///   exists but the shape has no phase-3 callback.
    pub fn new(
        name: &'static str,
        properties: Vec<RecordProperty<T>>,
        shape: RecordShape<T>,
    ) -> Result<Self, SchemaError> {
        let matcher = KeyMatcher::new(properties.iter().map(|p| p.schema().wire_key()))?;
        if !shape.has_reconstruct() {
            if let Some(prop) = properties.iter().find(|p| {
                p.schema().has_constructor_parameter() && p.schema().has_default()
            }) {
                return Err(SchemaError::MissingReconstructor {
                    property: prop.schema().name(),
                });
            }
        }
        if !shape.has_assign() {
            if let Some(prop) = properties
                .iter()
                .find(|p| !p.schema().has_constructor_parameter())
            {
                return Err(SchemaError::MissingAssigner {
                    property: prop.schema().name(),
                });
            }
        }
        Ok(Self {
            name,
            properties: properties.into_boxed_slice(),
            matcher,
            shape,
        })
    }

    /// Name of the target type this adapter was generated for.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declaration-ordered property schemas.
    pub fn schemas(&self) -> impl Iterator<Item = &PropertySchema> {
        self.properties.iter().map(RecordProperty::schema)
    }

    /// Whether `prop` may override the phase-1 value for slot `index`.
    ///
    /// The only place absent and explicit-null diverge: for a
    /// differentiating property the key's presence decides (so an
    /// explicit null *does* override the default), for everything else
    /// a decoded slot value decides.
    fn overrides(&self, prop: &PropertySchema, index: usize, slots: &SlotTable) -> bool {
        if prop.differentiates_absent_from_null() {
            slots.was_present(index)
        } else {
            slots.is_set(index)
        }
    }

    fn decode_record(&self, reader: &mut dyn TokenReader) -> DecodeResult<T> {
        let mut slots = SlotTable::new(self.properties.len());

        reader.begin_record()?;
        while reader.has_next()? {
            let key = reader.next_key()?;
            match self.matcher.find(&key) {
                Some(index) => {
                    let prop = &self.properties[index];
                    if !prop.schema().is_nullable() && reader.peek_null()? {
                        return Err(DecodeError::UnexpectedNullValue {
                            name: prop.schema().name(),
                            path: reader.path(),
                        });
                    }
                    let value = prop.codec().decode_slot(reader)?;
                    slots.store(index, value);
                }
                None => reader.skip_value()?,
            }
        }
        reader.end_record()?;

        self.reconcile(reader.path(), slots)
    }

    fn reconcile(&self, path: String, mut slots: SlotTable) -> DecodeResult<T> {
        // Phase 1: nothing may be constructed while a required slot is
        // empty.
        if let Some((_, prop)) = self
            .properties
            .iter()
            .enumerate()
            .find(|(i, p)| p.schema().is_required() && !slots.is_set(*i))
        {
            return Err(DecodeError::MissingRequiredProperty {
                name: prop.schema().name(),
                path,
            });
        }
        let mut value = self.shape.construct(&mut slots)?;

        // Phase 2: gate defaulted constructor parameters, then rebuild
        // once.
        let mut rebuild = false;
        for (index, prop) in self.properties.iter().enumerate() {
            let schema = prop.schema();
            if !schema.has_constructor_parameter() || !schema.has_default() {
                continue;
            }
            rebuild = true;
            if !self.overrides(schema, index, &slots) {
                slots.clear(index);
            }
        }
        if rebuild {
            value = self.shape.reconstruct(value, &mut slots)?;
        }

        // Phase 3: gate non-constructor properties, then assign.
        let mut assign = false;
        for (index, prop) in self.properties.iter().enumerate() {
            let schema = prop.schema();
            if schema.has_constructor_parameter() {
                continue;
            }
            assign = true;
            if !self.overrides(schema, index, &slots) {
                slots.clear(index);
            }
        }
        if assign {
            self.shape.assign(&mut value, &mut slots)?;
        }

        Ok(value)
    }

    fn encode_record(&self, writer: &mut dyn TokenWriter, value: &T) -> EncodeResult<()> {
        writer.begin_record()?;
        for prop in self.properties.iter() {
            writer.write_key(prop.schema().wire_key())?;
            prop.codec().encode_field(writer, value)?;
        }
        writer.end_record()
    }
}

impl<T: 'static> Adapter for RecordAdapter<T> {
    type Value = T;

    fn decode(&self, reader: &mut dyn TokenReader) -> DecodeResult<T> {
        self.decode_record(reader)
    }

    fn encode(&self, writer: &mut dyn TokenWriter, value: &T) -> EncodeResult<()> {
        self.encode_record(writer, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapter::NullSafe;
    use crate::prim::{StringAdapter, SHARED_BOOL, SHARED_I64, SHARED_STRING};
    use crate::registry::{AdapterRegistry, Qualifiers};
    use crate::stream::{Token, TokenVecReader};

    /// The worked example: required name, defaulted-nullable nickname,
    /// defaulted age.
    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: String,
        nickname: Option<String>,
        age: i64,
    }

    fn person_adapter() -> RecordAdapter<Person> {
        let properties = vec![
            RecordProperty::bind(
                PropertySchema::new("name", "name").constructor_parameter(),
                SHARED_STRING.clone(),
                |p: &Person| &p.name,
            ),
            RecordProperty::bind(
                PropertySchema::new("nickname", "nickname")
                    .nullable()
                    .defaulted()
                    .constructor_parameter(),
                Arc::new(NullSafe::new(StringAdapter)),
                |p: &Person| &p.nickname,
            ),
            RecordProperty::bind(
                PropertySchema::new("age", "age")
                    .defaulted()
                    .constructor_parameter(),
                SHARED_I64.clone(),
                |p: &Person| &p.age,
            ),
        ];
        let shape = RecordShape::new(|slots: &mut SlotTable| {
            Ok(Person {
                name: slots.take_required::<String>(0, "name")?,
                nickname: Some("none".to_owned()),
                age: 0,
            })
        })
        .with_reconstruct(|person: Person, slots: &mut SlotTable| {
            let nickname = slots.take::<Option<String>>(1, "nickname")?;
            let age = slots.take::<i64>(2, "age")?;
            Ok(Person {
                name: person.name,
                nickname: nickname.unwrap_or(person.nickname),
                age: age.unwrap_or(person.age),
            })
        });
        RecordAdapter::new("Person", properties, shape).unwrap()
    }

    fn record(pairs: Vec<Token>) -> Vec<Token> {
        let mut tokens = vec![Token::BeginRecord];
        tokens.extend(pairs);
        tokens.push(Token::EndRecord);
        tokens
    }

    #[test]
    fn required_only_input_applies_both_defaults() {
        let adapter = person_adapter();
        let person = adapter
            .decode_tokens(record(vec![Token::key("name"), Token::str("Ann")]))
            .unwrap();
        assert_eq!(
            person,
            Person {
                name: "Ann".to_owned(),
                nickname: Some("none".to_owned()),
                age: 0,
            }
        );
    }

    #[test]
    fn explicit_null_differs_from_absence() {
        let adapter = person_adapter();
        let person = adapter
            .decode_tokens(record(vec![
                Token::key("name"),
                Token::str("Ann"),
                Token::key("nickname"),
                Token::Null,
            ]))
            .unwrap();
        assert_eq!(person.nickname, None);

        let absent = adapter
            .decode_tokens(record(vec![Token::key("name"), Token::str("Ann")]))
            .unwrap();
        assert_eq!(absent.nickname, Some("none".to_owned()));
        assert_ne!(person.nickname, absent.nickname);
    }

    #[test]
    fn missing_required_property_aborts_before_construction() {
        let adapter = person_adapter();
        match adapter.decode_tokens(record(vec![Token::key("age"), Token::Int(5)])) {
            Err(DecodeError::MissingRequiredProperty { name: "name", path }) => {
                assert_eq!(path, "$");
            }
            other => panic!("expected missing-required error, got {:?}", other),
        }
    }

    #[test]
    fn explicit_null_for_required_property_fails_at_the_value() {
        let adapter = person_adapter();
        match adapter.decode_tokens(record(vec![Token::key("name"), Token::Null])) {
            Err(DecodeError::UnexpectedNullValue { name: "name", path }) => {
                assert_eq!(path, "$.name");
            }
            other => panic!("expected unexpected-null error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_keys_are_skipped_silently() {
        let adapter = person_adapter();
        let with_extra = adapter
            .decode_tokens(record(vec![
                Token::key("name"),
                Token::str("Ann"),
                Token::key("extra"),
                Token::Bool(true),
            ]))
            .unwrap();
        let without = adapter
            .decode_tokens(record(vec![Token::key("name"), Token::str("Ann")]))
            .unwrap();
        assert_eq!(with_extra, without);
    }

    #[test]
    fn unknown_nested_record_values_are_skipped_wholesale() {
        let adapter = person_adapter();
        let person = adapter
            .decode_tokens(record(vec![
                Token::key("extra"),
                Token::BeginRecord,
                Token::key("deep"),
                Token::BeginRecord,
                Token::key("x"),
                Token::Int(1),
                Token::EndRecord,
                Token::EndRecord,
                Token::key("name"),
                Token::str("Ann"),
            ]))
            .unwrap();
        assert_eq!(person.name, "Ann");
    }

    #[test]
    fn key_order_does_not_matter() {
        let adapter = person_adapter();
        let forward = adapter
            .decode_tokens(record(vec![
                Token::key("name"),
                Token::str("Ann"),
                Token::key("age"),
                Token::Int(7),
            ]))
            .unwrap();
        let backward = adapter
            .decode_tokens(record(vec![
                Token::key("age"),
                Token::Int(7),
                Token::key("name"),
                Token::str("Ann"),
            ]))
            .unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn duplicate_keys_last_occurrence_wins() {
        let adapter = person_adapter();
        let person = adapter
            .decode_tokens(record(vec![
                Token::key("name"),
                Token::str("Ann"),
                Token::key("name"),
                Token::str("Bea"),
            ]))
            .unwrap();
        assert_eq!(person.name, "Bea");
    }

    #[test]
    fn missing_begin_marker_is_structural() {
        let adapter = person_adapter();
        match adapter.decode_tokens(vec![Token::key("name"), Token::str("Ann")]) {
            Err(DecodeError::Structural(_)) => {}
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn encode_writes_declaration_order_with_explicit_nulls() {
        let adapter = person_adapter();
        let person = Person {
            name: "Ann".to_owned(),
            nickname: None,
            age: 3,
        };
        assert_eq!(
            adapter.encode_to_tokens(&person).unwrap(),
            vec![
                Token::BeginRecord,
                Token::key("name"),
                Token::str("Ann"),
                Token::key("nickname"),
                Token::Null,
                Token::key("age"),
                Token::Int(3),
                Token::EndRecord,
            ]
        );
    }

    #[test]
    fn round_trip_preserves_every_tri_state() {
        let adapter = person_adapter();
        for person in [
            Person {
                name: "Ann".to_owned(),
                nickname: Some("none".to_owned()),
                age: 0,
            },
            Person {
                name: "Bea".to_owned(),
                nickname: None,
                age: -4,
            },
            Person {
                name: String::new(),
                nickname: Some(String::new()),
                age: i64::MAX,
            },
        ] {
            let tokens = adapter.encode_to_tokens(&person).unwrap();
            assert_eq!(adapter.decode_tokens(tokens).unwrap(), person);
        }
    }

    #[test]
    fn failed_decode_leaves_adapter_reusable() {
        let adapter = person_adapter();
        assert!(adapter
            .decode_tokens(record(vec![Token::key("name"), Token::Null]))
            .is_err());
        assert!(adapter
            .decode_tokens(record(vec![Token::key("name"), Token::str("Ann")]))
            .is_ok());
    }

    #[test]
    fn concurrent_decodes_share_one_adapter() {
        let adapter = Arc::new(person_adapter());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let adapter = Arc::clone(&adapter);
                std::thread::spawn(move || {
                    adapter
                        .decode_tokens(record(vec![
                            Token::key("name"),
                            Token::str(format!("p{}", i)),
                            Token::key("age"),
                            Token::Int(i),
                        ]))
                        .unwrap()
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let person = handle.join().unwrap();
            assert_eq!(person.name, format!("p{}", i));
            assert_eq!(person.age, i as i64);
        }
    }

    /// Target type with a required constructor parameter and a
    /// defaulted post-construction field, exercising phase 3.
    #[derive(Debug, Clone, PartialEq)]
    struct Settings {
        strict: bool,
        tag: String,
    }

    fn settings_adapter() -> RecordAdapter<Settings> {
        let properties = vec![
            RecordProperty::bind(
                PropertySchema::new("strict", "strict").constructor_parameter(),
                SHARED_BOOL.clone(),
                |s: &Settings| &s.strict,
            ),
            RecordProperty::bind(
                PropertySchema::new("tag", "tag").defaulted(),
                SHARED_STRING.clone(),
                |s: &Settings| &s.tag,
            ),
        ];
        let shape = RecordShape::new(|slots: &mut SlotTable| {
            Ok(Settings {
                strict: slots.take_required::<bool>(0, "strict")?,
                tag: "untagged".to_owned(),
            })
        })
        .with_assign(|settings: &mut Settings, slots: &mut SlotTable| {
            if let Some(tag) = slots.take::<String>(1, "tag")? {
                settings.tag = tag;
            }
            Ok(())
        });
        RecordAdapter::new("Settings", properties, shape).unwrap()
    }

    #[test]
    fn non_constructor_property_absent_keeps_type_default() {
        let adapter = settings_adapter();
        let settings = adapter
            .decode_tokens(record(vec![Token::key("strict"), Token::Bool(true)]))
            .unwrap();
        assert_eq!(settings.tag, "untagged");

        let settings = adapter
            .decode_tokens(record(vec![
                Token::key("strict"),
                Token::Bool(false),
                Token::key("tag"),
                Token::str("ops"),
            ]))
            .unwrap();
        assert_eq!(settings.tag, "ops");
    }

    #[test]
    fn shape_without_assign_is_rejected_at_build_time() {
        let properties = vec![RecordProperty::bind(
            PropertySchema::new("tag", "tag").defaulted(),
            SHARED_STRING.clone(),
            |s: &Settings| &s.tag,
        )];
        let shape = RecordShape::<Settings>::new(|_| {
            Ok(Settings {
                strict: false,
                tag: String::new(),
            })
        });
        match RecordAdapter::new("Settings", properties, shape) {
            Err(SchemaError::MissingAssigner { property: "tag" }) => {}
            other => panic!("expected missing-assigner error, got {:?}", other.err()),
        }
    }

    #[test]
    fn shape_without_reconstruct_is_rejected_at_build_time() {
        let properties = vec![RecordProperty::bind(
            PropertySchema::new("age", "age")
                .defaulted()
                .constructor_parameter(),
            SHARED_I64.clone(),
            |p: &Person| &p.age,
        )];
        let shape = RecordShape::<Person>::new(|_| {
            Ok(Person {
                name: String::new(),
                nickname: None,
                age: 0,
            })
        });
        match RecordAdapter::new("Person", properties, shape) {
            Err(SchemaError::MissingReconstructor { property: "age" }) => {}
            other => panic!("expected missing-reconstructor error, got {:?}", other.err()),
        }
    }

    /// Outer record embedding `Person`, with both delegates resolved
    /// through one registry.
    #[derive(Debug, Clone, PartialEq)]
    struct Team {
        lead: Person,
        motto: String,
    }

    fn team_adapter() -> RecordAdapter<Team> {
        let registry = AdapterRegistry::new();
        let person = registry
            .resolve::<Person>(Qualifiers::none(), || Arc::new(person_adapter()))
            .unwrap();
        let motto = registry
            .resolve::<String>(Qualifiers::none(), || SHARED_STRING.clone())
            .unwrap();
        let properties = vec![
            RecordProperty::bind(
                PropertySchema::new("lead", "lead").constructor_parameter(),
                person,
                |t: &Team| &t.lead,
            ),
            RecordProperty::bind(
                PropertySchema::new("motto", "motto").constructor_parameter(),
                motto,
                |t: &Team| &t.motto,
            ),
        ];
        let shape = RecordShape::new(|slots: &mut SlotTable| {
            Ok(Team {
                lead: slots.take_required::<Person>(0, "lead")?,
                motto: slots.take_required::<String>(1, "motto")?,
            })
        });
        RecordAdapter::new("Team", properties, shape).unwrap()
    }

    #[test]
    fn record_adapter_composes_as_a_delegate() {
        let adapter = team_adapter();
        let team = adapter
            .decode_tokens(record(vec![
                Token::key("motto"),
                Token::str("ship it"),
                Token::key("lead"),
                Token::BeginRecord,
                Token::key("name"),
                Token::str("Ann"),
                Token::EndRecord,
            ]))
            .unwrap();
        assert_eq!(team.lead.name, "Ann");
        assert_eq!(team.lead.age, 0);
        assert_eq!(team.motto, "ship it");

        let tokens = adapter.encode_to_tokens(&team).unwrap();
        assert_eq!(adapter.decode_tokens(tokens).unwrap(), team);
    }

    #[test]
    fn nested_null_error_reports_inner_path() {
        let adapter = team_adapter();
        let mut reader = TokenVecReader::new(record(vec![
            Token::key("lead"),
            Token::BeginRecord,
            Token::key("name"),
            Token::Null,
            Token::EndRecord,
        ]));
        match adapter.decode(&mut reader) {
            Err(DecodeError::UnexpectedNullValue { name: "name", path }) => {
                assert_eq!(path, "$.lead.name");
            }
            other => panic!("expected unexpected-null error, got {:?}", other),
        }
    }
}
