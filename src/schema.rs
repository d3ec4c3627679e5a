//! Structural description of one record field
//!
//! A [`PropertySchema`] is the immutable, per-field product of the
//! (external) schema-extraction step: it records how a field is named
//! on the wire, whether null is a legal value for it, whether the
//! target type supplies a default for it, and whether it travels
//! through the constructor or is assigned afterwards. A list of these,
//! in declaration order, is what the record machinery consumes.
//!
//! Two of the attributes the decode algorithm keys off are derived, not
//! stored, so the invariants between them hold by construction:
//!
//! * a property is *required* exactly when it has neither a default nor
//!   null as a legal value — its absence from the input is an error;
//! * a property *differentiates absent from null* exactly when it has
//!   both a default and null as a legal value — the only case where
//!   "key missing" and "key present with null" must behave differently.
//!
//! Uniqueness of wire keys across a schema is not a per-property
//! concern; it is enforced when the key table is built (see
//! [`KeyMatcher`](crate::matcher::KeyMatcher)).

/// Immutable description of one declared field of a record type.
///
/// Constructed in the builder style: [`new`](PropertySchema::new) fixes
/// the names, and the chained `const` setters flip the individual
/// attributes, mirroring how generated code spells out a schema:
///
/// ```
/// use remodel::schema::PropertySchema;
///
/// const NICKNAME: PropertySchema = PropertySchema::new("nickname", "nickname")
///     .nullable()
///     .defaulted()
///     .constructor_parameter();
/// assert!(NICKNAME.differentiates_absent_from_null());
/// assert!(!NICKNAME.is_required());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySchema {
    name: &'static str,
    wire_key: &'static str,
    nullable: bool,
    has_default: bool,
    has_constructor_parameter: bool,
}

impl PropertySchema {
    /// Constructs a schema for a non-nullable, non-defaulted property
    /// assigned outside the constructor.
    #[must_use]
    pub const fn new(name: &'static str, wire_key: &'static str) -> Self {
        Self {
            name,
            wire_key,
            nullable: false,
            has_default: false,
            has_constructor_parameter: false,
        }
    }

    /// Marks explicit null as a legal decoded value for this property.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the target type as supplying a default value when this
    /// property's constructor parameter is omitted.
    #[must_use]
    pub const fn defaulted(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Marks this property as set through the target type's
    /// constructor rather than by post-construction assignment.
    #[must_use]
    pub const fn constructor_parameter(mut self) -> Self {
        self.has_constructor_parameter = true;
        self
    }

    /// The target-type field identifier.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The key identifying this field in the serialized form.
    #[must_use]
    pub const fn wire_key(&self) -> &'static str {
        self.wire_key
    }

    /// Whether explicit null is a legal decoded value.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether the target type supplies a default for this property.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.has_default
    }

    /// Whether this property travels through the constructor.
    #[must_use]
    pub const fn has_constructor_parameter(&self) -> bool {
        self.has_constructor_parameter
    }

    /// Whether absence of this property's key is a decode error.
    ///
    /// Holds exactly when the property has no default and is
    /// non-nullable, so `is_required() ⇒ !has_default() && !is_nullable()`
    /// is an invariant rather than a convention.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        !self.has_default && !self.nullable
    }

    /// Whether "key missing" and "key present with null" must be
    /// handled differently for this property.
    ///
    /// This is the only presence-flag-bearing case; see the decode
    /// algorithm in [`record`](crate::record).
    #[must_use]
    pub const fn differentiates_absent_from_null(&self) -> bool {
        self.has_default && self.nullable
    }
}
