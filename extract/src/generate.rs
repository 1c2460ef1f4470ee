//! The type translator: turns typed declarations plus marker comments into
//! schema definitions, one group-version artifact per exported package.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use kure_ingest_config::{Config, Export};
use kure_schema_core::{
    ApiDependency, ApiGroupIdentifier, ApiGroupVersion, Definition, DefinitionMeta, Property,
    ReferenceScope, ReferenceTarget, ResourceMeta, ResourceScope, Subresources, Type, API_VERSION,
};

use crate::classify::ScannedPackage;
use crate::comment::{scan_enum_values, Comment, CommentIndex};
use crate::error::{ExtractError, Result};
use crate::model::{BasicKind, Field, TypeDecl, TypeExpr};

/// The well-known package holding `TypeMeta`, `ObjectMeta`, and `ListMeta`.
pub const METAV1: &str = "k8s.io/apimachinery/pkg/apis/meta/v1";

/// Shared state for translating one codebase: the configuration and every
/// scanned package, indexed by path.
pub struct GeneratorContext<'a> {
    pub config: &'a Config,
    packages: HashMap<&'a str, &'a ScannedPackage>,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(config: &'a Config, packages: &'a [ScannedPackage]) -> Self {
        let packages = packages.iter().map(|pkg| (pkg.path(), pkg)).collect();
        GeneratorContext { config, packages }
    }

    /// Looks up a scanned package by path.
    pub fn package(&self, path: &str) -> Option<&'a ScannedPackage> {
        self.packages.get(path).copied()
    }
}

/// Translates one target package into a group-version artifact, accumulating
/// the external dependencies touched along the way.
pub struct Generator<'a> {
    ctx: &'a GeneratorContext<'a>,
    target: &'a ScannedPackage,
    export: &'a Export,

    /// The package-level comment.
    package_comment: Comment,
    /// All comment blocks in the package, for the marker pre-scan.
    comments: CommentIndex,
    /// Dependency name → resolved version, touched during translation.
    deps: BTreeMap<String, String>,
}

impl<'a> Generator<'a> {
    pub fn new(
        ctx: &'a GeneratorContext<'a>,
        target: &'a ScannedPackage,
        export: &'a Export,
    ) -> Self {
        Generator {
            ctx,
            target,
            export,
            package_comment: Comment::read(&target.package.doc),
            comments: CommentIndex::scan(&target.package),
            deps: BTreeMap::new(),
        }
    }

    /// Translates the target package into its group-version artifact.
    pub fn generate(mut self) -> Result<ApiGroupVersion> {
        let group = self
            .target
            .group
            .as_ref()
            .ok_or_else(|| ExtractError::MissingGroup(self.target.path().to_string()))?;

        let mut gv = ApiGroupVersion {
            api_version: API_VERSION.to_string(),
            kind: "APIGroupVersion".to_string(),
            api: self.ctx.config.name.clone(),
            group: group.identifier.clone(),
            version: group.version.clone(),
            dependencies: Vec::new(),
            definitions: Vec::new(),
        };

        gv.definitions = self.definitions()?;
        gv.dependencies = self
            .deps
            .iter()
            .map(|(package, version)| ApiDependency {
                package: package.clone(),
                version: version.clone(),
            })
            .collect();

        Ok(gv)
    }

    fn definitions(&mut self) -> Result<Vec<Definition>> {
        let target = self.target;
        let mut defs = Vec::new();

        for decl in target.package.exported_types() {
            match self.definition(decl) {
                Ok(Some(def)) => defs.push(def),
                Ok(None) => debug!(name = %decl.name, "definition omitted"),
                Err(err) => return Err(err.in_definition(&decl.name)),
            }
        }

        Ok(defs)
    }

    fn definition(&mut self, decl: &TypeDecl) -> Result<Option<Definition>> {
        let comment = Comment::read(&decl.doc);

        if comment.marker("protobuf") == Some("false") {
            return Ok(None);
        }

        let meta = DefinitionMeta {
            name: decl.name.clone(),
            description: comment.text.clone(),
            deprecated: comment.deprecated(),
        };

        let value = self.value(&decl.rhs, Some(decl), &decl.doc)?;
        Ok(value.map(|value| Definition { meta, value }))
    }

    /// Recursively translates a type expression.
    ///
    /// `decl` is the named declaration hosting the expression when
    /// translating a top-level definition; field and element types pass
    /// `None`. `doc` is the comment governing markers at this level.
    ///
    /// Returns `Ok(None)` when the surrounding definition should be omitted.
    fn value(&mut self, expr: &TypeExpr, decl: Option<&TypeDecl>, doc: &str) -> Result<Option<Type>> {
        let result = match expr {
            TypeExpr::Basic { basic } => Some(self.basic_type(*basic, decl, doc)?),
            TypeExpr::Struct { fields } => self.struct_type(fields, decl, doc)?,
            TypeExpr::Named { package, name } => Some(self.reference_type(package, name)?),
            TypeExpr::Slice { elem } => self.array_type(elem, doc)?,
            TypeExpr::Map { key, value } => self.map_type(key, value, doc)?,
            TypeExpr::Pointer { elem } => self.pointer_type(elem, doc)?,
            TypeExpr::Interface { empty: true } => Some(Type::Unknown),
            TypeExpr::Interface { empty: false } => {
                return Err(ExtractError::UnsupportedType("interface".to_string()))
            }
        };

        let comment = Comment::read(doc);
        match result {
            Some(inner) if !inner.is_optional() && comment.marker("+nullable") == Some("true") => {
                Ok(Some(Type::Optional {
                    value: Box::new(inner),
                }))
            }
            other => Ok(other),
        }
    }

    fn basic_type(&mut self, kind: BasicKind, decl: Option<&TypeDecl>, doc: &str) -> Result<Type> {
        if kind.is_string() {
            let comment = Comment::read(doc);

            let enum_values = if let Some(values) = comment.marker("kubebuilder:validation:Enum") {
                scan_enum_values(values)?
            } else if comment.marker("enum") == Some("true") {
                decl.map(|d| self.constant_values(&d.name)).unwrap_or_default()
            } else {
                Vec::new()
            };

            return Ok(Type::String {
                enum_values,
                format: comment
                    .marker("kubebuilder:validation:Format")
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        if kind == BasicKind::Bool {
            return Ok(Type::Boolean);
        }
        if kind.is_integer() {
            return Ok(Type::Integer {
                size: kind.integer_size(),
            });
        }
        if kind.is_float() {
            return Ok(Type::Float { size: 64 });
        }

        Err(ExtractError::UnsupportedType(format!("{kind:?}")))
    }

    /// All string constants of the named type, used for `+enum=true`.
    fn constant_values(&self, type_name: &str) -> Vec<String> {
        self.target
            .package
            .exported_constants()
            .into_iter()
            .filter(|c| c.type_name.as_deref() == Some(type_name))
            .map(|c| c.value.clone())
            .collect()
    }

    fn struct_type(
        &mut self,
        fields: &[Field],
        decl: Option<&TypeDecl>,
        doc: &str,
    ) -> Result<Option<Type>> {
        if let Some(decl) = decl {
            // Types with a custom schema hook serialize as plain strings.
            if decl.methods.iter().any(|m| m == "OpenAPISchemaType") {
                return Ok(Some(Type::string()));
            }
        }

        let mut comment = Comment::read(doc);
        if let Some(block) = decl.and_then(|d| self.marker_block(d)) {
            comment.add_markers(&block);
        }

        let mut props: Vec<Property> = Vec::new();
        let mut parents: Vec<Type> = Vec::new();

        let mut has_type_meta = false;
        let mut has_object_meta = false;

        for field in fields {
            if let TypeExpr::Named { package, name } = &field.expr {
                if package == METAV1 {
                    match name.as_str() {
                        "TypeMeta" => {
                            has_type_meta = true;
                            continue;
                        }
                        "ObjectMeta" => has_object_meta = true,
                        "ListMeta" => {
                            // List types are not emitted, except for the
                            // meta/v1 List definition itself.
                            let is_meta_list = self.target.path() == METAV1
                                && decl.is_some_and(|d| d.name == "List");
                            if !is_meta_list {
                                return Ok(None);
                            }
                        }
                        _ => {}
                    }
                }
            }

            let value = match self.value(&field.expr, None, &field.doc) {
                Ok(Some(value)) => value,
                Ok(None) => return Ok(None),
                Err(err) => return Err(err.in_field(&field.name)),
            };

            let (name, inline, omissible) = json_tag(&field.tag);
            if (name.is_empty() && !inline) || name == "-" {
                continue;
            }

            if inline {
                if !value.is_reference() {
                    return Err(ExtractError::InlineFieldNotNamed);
                }
                parents.push(value);
            } else {
                let field_comment = Comment::read(&field.doc);

                props.push(Property {
                    meta: DefinitionMeta {
                        name,
                        description: field_comment.text.clone(),
                        deprecated: field_comment.deprecated(),
                    },
                    required: self.field_required(&field_comment, omissible),
                    value,
                });
            }
        }

        if has_type_meta && has_object_meta {
            if !parents.is_empty() {
                return Err(ExtractError::ResourceWithParents);
            }

            for prop in &mut props {
                if prop.name() == "spec" && !prop.required {
                    prop.required = true;
                } else if prop.name() == "status" && prop.required {
                    prop.required = false;
                }
            }

            let kind = decl.map(|d| d.name.clone()).unwrap_or_default();
            return Ok(Some(Type::Resource {
                properties: props,
                metadata: self.resource_meta(&kind, &comment),
            }));
        }

        Ok(Some(Type::Object {
            inherit: parents,
            properties: props,
        }))
    }

    fn resource_meta(&self, kind: &str, comment: &Comment) -> ResourceMeta {
        let scale = comment.marker("kubebuilder:subresource:scale");
        let status = comment.marker("kubebuilder:subresource:status");

        // Repeated kubebuilder:resource markers are comma-joined.
        let mut resource = String::new();
        for marker in &comment.markers {
            if let Some(value) = marker.strip_prefix("kubebuilder:resource:") {
                if resource.is_empty() {
                    resource = value.to_string();
                } else {
                    resource.push(',');
                    resource.push_str(value);
                }
            }
        }

        let mut name = String::new();
        let mut singular_name = String::new();
        let mut scope = ResourceScope::Namespace;

        for part in resource.split(',').filter(|p| !p.is_empty()) {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };

            match key {
                "path" => name = value.to_string(),
                "singular" => singular_name = value.to_string(),
                "scope" => match value {
                    "Cluster" | "cluster" => scope = ResourceScope::Cluster,
                    "Namespaced" | "namespaced" | "namespace" => scope = ResourceScope::Namespace,
                    _ => {}
                },
                _ => {}
            }
        }

        if comment
            .markers
            .iter()
            .any(|m| m.starts_with("genclient:") && m.contains("nonNamespaced"))
        {
            scope = ResourceScope::Cluster;
        }

        ResourceMeta {
            name,
            singular_name,
            kind: kind.to_string(),
            scope,
            subresources: Subresources {
                status: status.is_some(),
                scale: scale.is_some(),
            },
        }
    }

    fn field_required(&self, comment: &Comment, omissible: bool) -> bool {
        let mut required = self
            .package_comment
            .marker("kubebuilder:validation:Optional")
            .is_none();

        if comment.marker("+optional") == Some("true")
            || comment.marker("kubebuilder:validation:Optional") == Some("true")
            || omissible
        {
            required = false;
        } else if comment.marker("kubebuilder:validation:Required") == Some("true") {
            required = true;
        }

        required
    }

    /// Finds the comment block sitting above the declaration's doc comment
    /// (or above the declaration itself when it has no docs).
    fn marker_block(&self, decl: &TypeDecl) -> Option<String> {
        let line = match decl.doc_line {
            Some(doc_line) => doc_line.checked_sub(2)?,
            None => decl.line.checked_sub(1)?,
        };

        self.comments.get(&decl.file, line).map(str::to_string)
    }

    fn reference_type(&mut self, package: &str, name: &str) -> Result<Type> {
        if package == self.target.path() {
            return Ok(Type::reference(name));
        }

        if let Some(builtin) = builtin_reference(package, name) {
            return Ok(builtin);
        }

        let resolved = self
            .ctx
            .config
            .resolve(package)
            .ok_or_else(|| ExtractError::UndeclaredPackage(package.to_string()))?;

        let dep_name = resolved.dependency();
        let scope = ReferenceScope {
            package: dep_name.map(String::from),
            group: resolved.group_identifier(),
            version: resolved.version().to_string(),
        };

        if let Some(dep_name) = dep_name {
            let dep = self
                .ctx
                .config
                .dependency(dep_name)
                .ok_or_else(|| ExtractError::UndeclaredDependency(dep_name.to_string()))?;

            self.deps
                .insert(dep.name.clone(), dep.version.clone().unwrap_or_default());
        }

        Ok(Type::Reference {
            target: ReferenceTarget {
                scope: Some(scope),
                name: name.to_string(),
            },
        })
    }

    fn array_type(&mut self, elem: &TypeExpr, doc: &str) -> Result<Option<Type>> {
        if let TypeExpr::Basic {
            basic: BasicKind::Byte,
        } = elem
        {
            return Ok(Some(Type::string_format("byte")));
        }

        let Some(value) = self.value(elem, None, doc)? else {
            return Ok(None);
        };

        Ok(Some(Type::Array {
            values: Box::new(value),
        }))
    }

    fn map_type(&mut self, key: &TypeExpr, value: &TypeExpr, doc: &str) -> Result<Option<Type>> {
        if let TypeExpr::Basic { basic } = key {
            if !basic.is_string() {
                return Err(ExtractError::InvalidMapKey(format!("{basic:?}")));
            }
        }

        let Some(value) = self.value(value, None, doc)? else {
            return Ok(None);
        };

        Ok(Some(Type::Map {
            values: Box::new(value),
        }))
    }

    fn pointer_type(&mut self, elem: &TypeExpr, doc: &str) -> Result<Option<Type>> {
        let Some(value) = self.value(elem, None, doc)? else {
            return Ok(None);
        };

        let points_at_basic = match elem {
            TypeExpr::Basic { .. } => true,
            TypeExpr::Named { package, name } => self.resolves_to_basic(package, name),
            _ => false,
        };

        if points_at_basic && !self.export.explicit_null {
            return Ok(Some(Type::Optional {
                value: Box::new(value),
            }));
        }

        Ok(Some(value))
    }

    /// Whether a named type's fully-reduced underlying form is a basic type.
    /// Unknown packages resolve conservatively to `false`.
    fn resolves_to_basic(&self, package: &str, name: &str) -> bool {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut current = (package.to_string(), name.to_string());

        loop {
            if !seen.insert(current.clone()) {
                return false;
            }

            let Some(decl) = self
                .ctx
                .package(&current.0)
                .and_then(|pkg| pkg.package.type_decl(&current.1))
            else {
                return false;
            };

            match &decl.rhs {
                TypeExpr::Basic { .. } => return true,
                TypeExpr::Named { package, name } => {
                    current = (package.clone(), name.clone());
                }
                _ => return false,
            }
        }
    }
}

/// Parses the `json:"..."` key of a raw struct tag into
/// (name, inline, omitempty).
fn json_tag(tag: &str) -> (String, bool, bool) {
    let Some(start) = tag.find("json:\"") else {
        return (String::new(), false, false);
    };
    let rest = &tag[start + 6..];
    let Some(end) = rest.find('"') else {
        return (String::new(), false, false);
    };

    let mut parts = rest[..end].split(',');
    let name = parts.next().unwrap_or_default().to_string();
    let options: Vec<&str> = parts.collect();

    (
        name,
        options.contains(&"inline"),
        options.contains(&"omitempty"),
    )
}

/// Well-known external types with fixed translations.
fn builtin_reference(package: &str, name: &str) -> Option<Type> {
    match (package, name) {
        ("k8s.io/apimachinery/pkg/runtime", "Object" | "RawExtension") => Some(Type::Unknown),

        ("k8s.io/apimachinery/pkg/util/intstr", "IntOrString") => Some(Type::Union {
            values: vec![Type::Integer { size: 32 }, Type::string()],
        }),

        ("k8s.io/apimachinery/pkg/api/resource", "Quantity") => Some(Type::Reference {
            target: ReferenceTarget {
                scope: Some(ReferenceScope {
                    package: Some("kubernetes".to_string()),
                    group: ApiGroupIdentifier::new(Some("meta".to_string()), "meta"),
                    version: "v1".to_string(),
                }),
                name: name.to_string(),
            },
        }),

        ("time", "Duration") => Some(Type::string_format("duration")),
        ("time", "Time") => Some(Type::string_format("date-time")),

        _ => None,
    }
}
