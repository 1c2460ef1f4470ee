//! Schema type definitions for API definition modeling.
//!
//! This module defines the core data model used to represent language-neutral
//! API type schemas. The types are designed for serialization with [`serde`]
//! and round-trip through the JSON bundle format consumed by downstream code
//! generators.

use serde::{Deserialize, Serialize};

use crate::resource::ResourceMeta;

/// A schema type, discriminated by the `variant` JSON field.
///
/// Every value type that can appear in a definition or property is one of
/// these variants. The wire form is internally tagged:
///
/// ```json
/// { "variant": "array", "values": { "variant": "string" } }
/// ```
///
/// # Examples
///
/// ```
/// use kure_schema_core::Type;
///
/// let ty = Type::Array { values: Box::new(Type::string()) };
/// let json = serde_json::to_string(&ty).unwrap();
/// assert!(json.contains(r#""variant":"array""#));
///
/// let back: Type = serde_json::from_str(&json).unwrap();
/// assert_eq!(back, ty);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum Type {
    /// A string, optionally restricted to an enumeration or annotated with a
    /// format tag (`byte`, `duration`, `date-time`, ...).
    String {
        #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
        enum_values: Vec<String>,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        format: String,
    },
    /// An integer with a bit width of 32, 64, or 0 for unspecified.
    Integer {
        #[serde(default, skip_serializing_if = "is_zero")]
        size: u32,
    },
    /// A floating-point number.
    Float {
        #[serde(default, skip_serializing_if = "is_zero")]
        size: u32,
    },
    /// A boolean.
    Boolean,
    /// A structured object with named properties and optional inherited
    /// parents. Every inherited entry must be a [`Type::Reference`].
    Object {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        inherit: Vec<Type>,
        properties: Vec<Property>,
    },
    /// A homogeneous list.
    Array { values: Box<Type> },
    /// A map with string keys.
    Map { values: Box<Type> },
    /// One of several alternative types, in order of preference.
    Union { values: Vec<Type> },
    /// A value that may be absent or null.
    Optional { value: Box<Type> },
    /// A reference to a definition, in this group-version or another.
    Reference { target: ReferenceTarget },
    /// A cluster-managed resource object.
    Resource {
        properties: Vec<Property>,
        metadata: ResourceMeta,
    },
    /// A value with no further schema (e.g. an arbitrary embedded object).
    Unknown,
}

fn is_zero(size: &u32) -> bool {
    *size == 0
}

impl Type {
    /// A plain string with no enumeration or format.
    pub fn string() -> Self {
        Type::String {
            enum_values: Vec::new(),
            format: String::new(),
        }
    }

    /// A string carrying a format tag.
    pub fn string_format(format: impl Into<String>) -> Self {
        Type::String {
            enum_values: Vec::new(),
            format: format.into(),
        }
    }

    /// A reference to a definition in the referrer's own group-version.
    ///
    /// # Examples
    ///
    /// ```
    /// use kure_schema_core::Type;
    ///
    /// let ty = Type::reference("PodSpec");
    /// let json = serde_json::to_value(&ty).unwrap();
    /// assert_eq!(json["target"]["name"], "PodSpec");
    /// assert!(json["target"].get("scope").is_none());
    /// ```
    pub fn reference(name: impl Into<String>) -> Self {
        Type::Reference {
            target: ReferenceTarget {
                scope: None,
                name: name.into(),
            },
        }
    }

    /// Returns `true` for the [`Type::Optional`] variant.
    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional { .. })
    }

    /// Returns `true` for the [`Type::Reference`] variant.
    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Reference { .. })
    }

    /// Returns `true` for the [`Type::Resource`] variant.
    pub fn is_resource(&self) -> bool {
        matches!(self, Type::Resource { .. })
    }
}

/// The definition a [`Type::Reference`] points at.
///
/// Without a scope the target lives in the same group-version as the
/// referrer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ReferenceScope>,
    pub name: String,
}

/// The location of a referenced definition outside the referrer's own
/// group-version.
///
/// `package` names an externally-owned dependency; it is absent for
/// references between groups of the same API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub group: ApiGroupIdentifier,
    pub version: String,
}

/// Identifies an API group by an optional module and a group name.
///
/// `module` distinguishes groups that share a name across modules; it is
/// serialized even when absent (`"module": null`) so that group files are
/// self-describing.
///
/// # Examples
///
/// ```
/// use kure_schema_core::ApiGroupIdentifier;
///
/// let a = ApiGroupIdentifier::new(Some("apps".into()), "apps");
/// let b = ApiGroupIdentifier::new(Some("".into()), "apps");
/// // Empty module strings are normalized away.
/// assert_eq!(b.module, None);
/// assert!(!a.same(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiGroupIdentifier {
    pub module: Option<String>,
    pub name: String,
}

impl ApiGroupIdentifier {
    /// Creates an identifier, normalizing an empty module string to `None`.
    pub fn new(module: Option<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.filter(|m| !m.is_empty()),
            name: name.into(),
        }
    }

    /// Componentwise equality.
    pub fn same(&self, other: &ApiGroupIdentifier) -> bool {
        self.module == other.module && self.name == other.name
    }
}

/// Shared metadata of definitions and properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

/// A named, reusable schema type at the top level of a group-version.
///
/// # Examples
///
/// ```
/// use kure_schema_core::{Definition, DefinitionMeta, Type};
///
/// let def = Definition {
///     meta: DefinitionMeta {
///         name: "Toleration".into(),
///         description: "A pod toleration.".into(),
///         deprecated: false,
///     },
///     value: Type::string(),
/// };
/// let json = serde_json::to_value(&def).unwrap();
/// assert_eq!(json["name"], "Toleration");
/// assert_eq!(json["value"]["variant"], "string");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(flatten)]
    pub meta: DefinitionMeta,
    pub value: Type,
}

impl Definition {
    /// The definition's name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }
}

/// A named member of an [`Type::Object`] or [`Type::Resource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(flatten)]
    pub meta: DefinitionMeta,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    pub value: Type,
}

impl Property {
    /// The property's name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }
}
