//! End-to-end pipeline tests over in-code package fixtures: a small
//! guestbook-style API with resources, shared types, pruning, and a merge.

use kure_ingest_config::{Config, ModuleManifest};
use kure_ingest_extract::model::{BasicKind, Field, Package, TypeDecl, TypeExpr};
use kure_ingest_extract::{classify_packages, generate_bundle, METAV1};
use kure_schema_core::{validate_bundle, Type};

const API_V1: &str = "example.dev/guestbook/api/v1";
const SHARED: &str = "example.dev/guestbook/api/shared";

fn config() -> Config {
    Config::parse(
        r#"
name = "guestbook"

[[export]]
path = "example.dev/guestbook/api/v1"
group = "guestbook.example.dev"
version = "v1"
prune = true

[[export]]
path = "example.dev/guestbook/api/shared"
module = "shared"
group = "shared.guestbook.example.dev"
version = "v1"

[export.merge]
module = ""

[[dependency]]
name = "kubernetes"
path = "k8s.io/api"

[[extern]]
path = "k8s.io/apimachinery/pkg/apis/meta/v1"
package = "kubernetes"
module = "meta"
group = "meta"
version = "v1"
"#,
    )
    .unwrap()
}

fn manifest() -> ModuleManifest {
    toml::from_str(
        r#"
module = "example.dev/guestbook"

[[require]]
path = "k8s.io/api"
version = "v0.29.2"
"#,
    )
    .unwrap()
}

fn field(name: &str, expr: TypeExpr, tag: &str) -> Field {
    Field {
        name: name.into(),
        expr,
        tag: tag.into(),
        doc: String::new(),
    }
}

fn decl(name: &str, rhs: TypeExpr) -> TypeDecl {
    TypeDecl {
        name: name.into(),
        exported: true,
        rhs,
        ..Default::default()
    }
}

/// The v1 API package: a Guestbook resource, its spec, one unused helper,
/// and a field reaching into the shared group.
fn api_package() -> Package {
    Package {
        path: API_V1.into(),
        types: vec![
            TypeDecl {
                name: "Guestbook".into(),
                exported: true,
                doc: "+kubebuilder:resource:path=guestbooks,singular=guestbook,scope=Namespaced\nGuestbook keeps visitor entries.".into(),
                rhs: TypeExpr::Struct {
                    fields: vec![
                        field("TypeMeta", TypeExpr::named(METAV1, "TypeMeta"), r#"json:",inline""#),
                        field(
                            "ObjectMeta",
                            TypeExpr::named(METAV1, "ObjectMeta"),
                            r#"json:"metadata,omitempty""#,
                        ),
                        field(
                            "Spec",
                            TypeExpr::named(API_V1, "GuestbookSpec"),
                            r#"json:"spec,omitempty""#,
                        ),
                        field(
                            "Status",
                            TypeExpr::named(API_V1, "GuestbookStatus"),
                            r#"json:"status""#,
                        ),
                    ],
                },
                ..Default::default()
            },
            decl(
                "GuestbookSpec",
                TypeExpr::Struct {
                    fields: vec![
                        field(
                            "Entries",
                            TypeExpr::Slice {
                                elem: Box::new(TypeExpr::named(SHARED, "Entry")),
                            },
                            r#"json:"entries""#,
                        ),
                        field(
                            "Limit",
                            TypeExpr::Pointer {
                                elem: Box::new(TypeExpr::basic(BasicKind::Int32)),
                            },
                            r#"json:"limit,omitempty""#,
                        ),
                    ],
                },
            ),
            decl(
                "GuestbookStatus",
                TypeExpr::Struct {
                    fields: vec![field(
                        "Phase",
                        TypeExpr::basic(BasicKind::String),
                        r#"json:"phase""#,
                    )],
                },
            ),
            // Unreachable from any resource: pruned.
            decl(
                "Scratch",
                TypeExpr::Struct {
                    fields: vec![field("A", TypeExpr::basic(BasicKind::Bool), r#"json:"a""#)],
                },
            ),
        ],
        ..Default::default()
    }
}

/// The shared package, merged into the root group.
fn shared_package() -> Package {
    Package {
        path: SHARED.into(),
        types: vec![decl(
            "Entry",
            TypeExpr::Struct {
                fields: vec![
                    field("Author", TypeExpr::basic(BasicKind::String), r#"json:"author""#),
                    field(
                        "Message",
                        TypeExpr::basic(BasicKind::String),
                        r#"json:"message,omitempty""#,
                    ),
                ],
            },
        )],
        ..Default::default()
    }
}

fn build_bundle() -> kure_schema_core::Bundle {
    let mut config = config();
    let manifest = manifest();
    config.resolve_versions(&manifest).unwrap();

    let packages = classify_packages(
        &config,
        &manifest,
        vec![api_package(), shared_package()],
    );
    generate_bundle(&config, &packages).unwrap()
}

#[test]
fn merged_bundle_has_single_group() {
    let bundle = build_bundle();

    assert_eq!(bundle.api.name, "guestbook");
    assert_eq!(bundle.groups.len(), 1);
    assert_eq!(bundle.groups[0].identifier.name, "guestbook.example.dev");
    assert_eq!(bundle.groups[0].versions, vec!["v1"]);
    assert_eq!(bundle.versions.len(), 1);
}

#[test]
fn pruning_keeps_only_reachable_definitions() {
    let bundle = build_bundle();

    let names: Vec<&str> = bundle.versions[0]
        .definitions
        .iter()
        .map(|d| d.name())
        .collect();

    assert!(names.contains(&"Guestbook"));
    assert!(names.contains(&"GuestbookSpec"));
    assert!(names.contains(&"GuestbookStatus"));
    assert!(!names.contains(&"Scratch"), "Scratch must be pruned");
    // Entry arrives via the merge; the shared group was not pruned.
    assert!(names.contains(&"Entry"));
}

#[test]
fn merge_rewrites_shared_references_scopeless() {
    let bundle = build_bundle();

    let spec = bundle.versions[0]
        .definitions
        .iter()
        .find(|d| d.name() == "GuestbookSpec")
        .unwrap();

    let Type::Object { properties, .. } = &spec.value else {
        panic!("expected object");
    };
    let entries = properties.iter().find(|p| p.name() == "entries").unwrap();
    let Type::Array { values } = &entries.value else {
        panic!("expected array");
    };
    let Type::Reference { target } = values.as_ref() else {
        panic!("expected reference");
    };

    assert_eq!(target.name, "Entry");
    assert!(
        target.scope.is_none(),
        "reference into the merged group must lose its scope"
    );
}

#[test]
fn resource_spec_and_status_required_flags() {
    let bundle = build_bundle();

    let guestbook = bundle.versions[0]
        .definitions
        .iter()
        .find(|d| d.name() == "Guestbook")
        .unwrap();

    let Type::Resource {
        properties,
        metadata,
    } = &guestbook.value
    else {
        panic!("expected resource");
    };

    assert_eq!(metadata.name, "guestbooks");
    assert_eq!(metadata.singular_name, "guestbook");
    assert_eq!(metadata.kind, "Guestbook");

    let spec = properties.iter().find(|p| p.name() == "spec").unwrap();
    assert!(spec.required);
    let status = properties.iter().find(|p| p.name() == "status").unwrap();
    assert!(!status.required);
}

#[test]
fn dependency_version_resolved_from_manifest() {
    let bundle = build_bundle();

    // kubernetes v0.29.2 resolves as 1.29 (major 0 promotion).
    assert_eq!(bundle.api.dependencies.len(), 1);
    assert_eq!(bundle.api.dependencies[0].package, "kubernetes");
    assert_eq!(bundle.api.dependencies[0].version, "1.29");
}

#[test]
fn bundle_passes_validation() {
    let bundle = build_bundle();
    let errors = validate_bundle(&bundle);
    assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
}

#[test]
fn bundling_is_idempotent() {
    let first = serde_json::to_string(&build_bundle()).unwrap();
    let second = serde_json::to_string(&build_bundle()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn bundle_round_trips_through_json() {
    let bundle = build_bundle();
    let json = serde_json::to_string(&bundle).unwrap();
    let back: kure_schema_core::Bundle = serde_json::from_str(&json).unwrap();
    assert_eq!(back, bundle);
}
