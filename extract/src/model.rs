//! The typed package model the engine consumes.
//!
//! A language frontend type-checks the source tree and serializes one
//! [`PackageSet`] describing every scanned package: its exported type
//! declarations (with their *syntactic* right-hand sides), string constants,
//! imports, and comments. The engine never sees source code; this model is
//! its only window into the scanned codebase.
//!
//! Keeping the declaration's syntactic right-hand side (rather than the
//! fully-reduced underlying type) is what lets the translator distinguish
//! `type Foo struct { ... }` from `type Bar Other` — the former is
//! translated structurally, the latter becomes a reference.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A collection of loaded, typechecked packages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageSet {
    pub packages: Vec<Package>,
}

impl PackageSet {
    /// Loads a package set from a JSON file produced by a frontend.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// One typechecked package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Import path identifying the package.
    pub path: String,
    /// The package-level doc comment.
    #[serde(default)]
    pub doc: String,
    /// Type declarations in the package scope.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    /// Constants in the package scope.
    #[serde(default)]
    pub constants: Vec<ConstDecl>,
    /// Transitively imported package paths.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Every comment group in the package, for the marker pre-scan.
    #[serde(default)]
    pub comments: Vec<CommentBlock>,
}

impl Package {
    /// Looks up a type declaration by name.
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|decl| decl.name == name)
    }

    /// Exported type declarations, sorted by name the way a type-checked
    /// scope enumerates them.
    pub fn exported_types(&self) -> Vec<&TypeDecl> {
        let mut decls: Vec<&TypeDecl> = self.types.iter().filter(|d| d.exported).collect();
        decls.sort_by(|a, b| a.name.cmp(&b.name));
        decls
    }

    /// Exported constants, sorted by name.
    pub fn exported_constants(&self) -> Vec<&ConstDecl> {
        let mut consts: Vec<&ConstDecl> = self.constants.iter().filter(|c| c.exported).collect();
        consts.sort_by(|a, b| a.name.cmp(&b.name));
        consts
    }

    /// Returns `true` when the package transitively imports any path under
    /// `module`.
    pub fn imports_module(&self, module: &str) -> bool {
        self.imports
            .iter()
            .any(|path| kure_ingest_config::within_module(module, path))
    }
}

/// A named type declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub exported: bool,
    /// The doc comment attached to the declaration.
    #[serde(default)]
    pub doc: String,
    /// File the declaration appears in.
    #[serde(default)]
    pub file: String,
    /// Line of the declaration itself.
    #[serde(default)]
    pub line: u32,
    /// First line of the doc comment, when one exists.
    #[serde(default)]
    pub doc_line: Option<u32>,
    /// The syntactic right-hand side of the declaration.
    pub rhs: TypeExpr,
    /// Names of methods declared on this type.
    #[serde(default)]
    pub methods: Vec<String>,
}

/// A constant declaration. Only string constants participate in enum
/// derivation; others are carried for completeness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub name: String,
    #[serde(default)]
    pub exported: bool,
    /// Name of the named type the constant belongs to, when it has one.
    #[serde(default)]
    pub type_name: Option<String>,
    /// The constant's value, unquoted.
    pub value: String,
}

/// A comment group, indexed by the file and line it ends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentBlock {
    pub file: String,
    pub last_line: u32,
    pub text: String,
}

/// A type expression, discriminated by the `kind` JSON field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeExpr {
    /// A built-in scalar type.
    Basic { basic: BasicKind },
    /// A reference to a named type, possibly in another package.
    Named { package: String, name: String },
    /// A struct literal.
    Struct { fields: Vec<Field> },
    /// A slice.
    Slice { elem: Box<TypeExpr> },
    /// A map.
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// A pointer.
    Pointer { elem: Box<TypeExpr> },
    /// An interface; only the empty interface is translatable.
    Interface { empty: bool },
}

impl TypeExpr {
    /// A basic type expression.
    pub fn basic(kind: BasicKind) -> Self {
        TypeExpr::Basic { basic: kind }
    }

    /// A named type expression.
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Named {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl Default for TypeExpr {
    fn default() -> Self {
        TypeExpr::Interface { empty: true }
    }
}

/// One struct field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub expr: TypeExpr,
    /// The raw struct tag, backtick contents included verbatim.
    #[serde(default)]
    pub tag: String,
    /// The field's doc comment.
    #[serde(default)]
    pub doc: String,
}

/// The scalar kinds a [`TypeExpr::Basic`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    String,
    Bool,
    Int,
    Int32,
    Int64,
    Uint,
    Uint32,
    Uint64,
    Uintptr,
    Byte,
    Float32,
    Float64,
}

impl BasicKind {
    /// Whether the kind is string-typed.
    pub fn is_string(self) -> bool {
        matches!(self, BasicKind::String)
    }

    /// Whether the kind is an integer.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::Int
                | BasicKind::Int32
                | BasicKind::Int64
                | BasicKind::Uint
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
                | BasicKind::Byte
        )
    }

    /// Whether the kind is a float.
    pub fn is_float(self) -> bool {
        matches!(self, BasicKind::Float32 | BasicKind::Float64)
    }

    /// The schema bit width: 32, 64, or 0 for unspecified.
    pub fn integer_size(self) -> u32 {
        match self {
            BasicKind::Int32 | BasicKind::Uint32 => 32,
            BasicKind::Int64 | BasicKind::Uint64 | BasicKind::Uintptr => 64,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_expr_round_trip() {
        let expr = TypeExpr::Struct {
            fields: vec![Field {
                name: "Replicas".into(),
                expr: TypeExpr::Pointer {
                    elem: Box::new(TypeExpr::basic(BasicKind::Int32)),
                },
                tag: r#"json:"replicas,omitempty""#.into(),
                doc: String::new(),
            }],
        };

        let json = serde_json::to_string(&expr).unwrap();
        let back: TypeExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn test_exported_types_sorted() {
        let pkg = Package {
            path: "example.dev/api/v1".into(),
            types: vec![
                TypeDecl {
                    name: "Zeta".into(),
                    exported: true,
                    rhs: TypeExpr::basic(BasicKind::String),
                    ..Default::default()
                },
                TypeDecl {
                    name: "alpha".into(),
                    exported: false,
                    rhs: TypeExpr::basic(BasicKind::String),
                    ..Default::default()
                },
                TypeDecl {
                    name: "Alpha".into(),
                    exported: true,
                    rhs: TypeExpr::basic(BasicKind::String),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let names: Vec<&str> = pkg.exported_types().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_imports_module() {
        let pkg = Package {
            path: "example.dev/api/v1".into(),
            imports: vec!["k8s.io/apimachinery/pkg/apis/meta/v1".into()],
            ..Default::default()
        };
        assert!(pkg.imports_module("k8s.io/apimachinery"));
        assert!(!pkg.imports_module("k8s.io/client-go"));
    }

    #[test]
    fn test_integer_sizes() {
        assert_eq!(BasicKind::Int32.integer_size(), 32);
        assert_eq!(BasicKind::Uint64.integer_size(), 64);
        assert_eq!(BasicKind::Uintptr.integer_size(), 64);
        assert_eq!(BasicKind::Int.integer_size(), 0);
        assert_eq!(BasicKind::Byte.integer_size(), 0);
    }
}
