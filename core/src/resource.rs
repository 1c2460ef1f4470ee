//! Resource metadata attached to [`Type::Resource`](crate::Type::Resource)
//! definitions.

use serde::{Deserialize, Serialize};

/// How a resource's instances are partitioned in a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceScope {
    /// One instance set per cluster.
    Cluster,
    /// Instances live inside namespaces (the default).
    #[default]
    Namespace,
}

/// Metadata describing how a resource is served by the cluster API.
///
/// # Examples
///
/// ```
/// use kure_schema_core::{ResourceMeta, ResourceScope};
///
/// let meta = ResourceMeta {
///     name: "pods".into(),
///     singular_name: "pod".into(),
///     kind: "Pod".into(),
///     scope: ResourceScope::Namespace,
///     subresources: Default::default(),
/// };
/// let json = serde_json::to_value(&meta).unwrap();
/// assert_eq!(json["scope"], "namespace");
/// assert_eq!(json["singularName"], "pod");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMeta {
    /// Plural resource name, e.g. `pods`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Singular resource name, e.g. `pod`.
    #[serde(rename = "singularName", default, skip_serializing_if = "String::is_empty")]
    pub singular_name: String,
    /// The declared kind, e.g. `Pod`.
    pub kind: String,
    pub scope: ResourceScope,
    pub subresources: Subresources,
}

/// Which well-known subresources a resource serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subresources {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub status: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub scale: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ResourceScope::Cluster).unwrap(),
            r#""cluster""#
        );
        assert_eq!(
            serde_json::to_string(&ResourceScope::Namespace).unwrap(),
            r#""namespace""#
        );
    }

    #[test]
    fn test_empty_subresources_serialize_empty_object() {
        let json = serde_json::to_value(Subresources::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
