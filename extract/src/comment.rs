//! Doc-comment splitting and `+marker` handling.
//!
//! A doc comment is split into free text and an ordered marker list: leading
//! and trailing lines starting with `+` become markers (with the `+`
//! stripped), everything between them is the description. Marker lines in
//! the middle of the text are left alone.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ExtractError, Result};
use crate::model::Package;

static DEPRECATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bDeprecated|DEPRECATED\b").expect("static regex must compile"));

/// A parsed doc comment: free text plus markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub text: String,
    pub markers: Vec<String>,
}

impl Comment {
    /// Splits a raw doc comment into text and markers.
    ///
    /// # Examples
    ///
    /// ```
    /// use kure_ingest_extract::Comment;
    ///
    /// let comment = Comment::read("+enum=true\nPhase of the pod.\n+optional");
    /// assert_eq!(comment.text, "Phase of the pod.");
    /// assert_eq!(comment.markers, vec!["enum=true", "optional"]);
    /// ```
    pub fn read(doc: &str) -> Comment {
        let lines: Vec<&str> = doc.split('\n').collect();
        let mut comment = Comment::default();
        let mut start = 0;
        let mut end = lines.len();

        for line in &lines {
            if !line.is_empty() {
                if let Some(marker) = line.strip_prefix('+') {
                    comment.markers.push(marker.trim().to_string());
                } else {
                    break;
                }
            }
            start += 1;
        }

        for i in (start..lines.len()).rev() {
            let line = lines[i];
            if !line.is_empty() {
                if let Some(marker) = line.strip_prefix('+') {
                    comment.markers.push(marker.trim().to_string());
                } else {
                    break;
                }
            }
            end -= 1;
        }

        comment.text = lines[start..end].join("\n");
        comment
    }

    /// Prepends the `+`-prefixed lines of a comment block found above the
    /// doc comment. Non-marker lines in the block are ignored.
    pub fn add_markers(&mut self, block: &str) {
        let mut markers: Vec<String> = Vec::new();

        for line in block.split('\n') {
            if let Some(marker) = line.strip_prefix('+') {
                markers.push(marker.trim().to_string());
            }
        }

        if !markers.is_empty() {
            markers.append(&mut self.markers);
            self.markers = markers;
        }
    }

    /// Looks up a marker by name.
    ///
    /// Returns `Some("true")` for a bare marker, the value for a
    /// `name=value` marker, and `None` when absent. The name is matched
    /// literally against the stored marker strings.
    pub fn marker(&self, name: &str) -> Option<&str> {
        let prefix = format!("{name}=");

        for marker in &self.markers {
            if marker == name {
                return Some("true");
            } else if let Some(value) = marker.strip_prefix(&prefix) {
                return Some(value);
            }
        }

        None
    }

    /// Whether the free text marks the subject deprecated.
    pub fn deprecated(&self) -> bool {
        DEPRECATION.is_match(&self.text)
    }
}

/// All comment groups of a package, indexed by filename and last line.
#[derive(Debug, Default)]
pub struct CommentIndex {
    blocks: HashMap<(String, u32), String>,
}

impl CommentIndex {
    /// Indexes every comment block of a package.
    pub fn scan(package: &Package) -> CommentIndex {
        let mut blocks = HashMap::new();

        for block in &package.comments {
            blocks.insert((block.file.clone(), block.last_line), block.text.clone());
        }

        CommentIndex { blocks }
    }

    /// Finds the comment block ending on a given line.
    pub fn get(&self, file: &str, last_line: u32) -> Option<&str> {
        self.blocks
            .get(&(file.to_string(), last_line))
            .map(String::as_str)
    }
}

/// Scans a `kubebuilder:validation:Enum` marker value: a `;`-separated list
/// of bare tokens and double-quoted strings. Empty tokens are only
/// expressible through explicit quoting.
pub fn scan_enum_values(spec: &str) -> Result<Vec<String>> {
    let bytes = spec.as_bytes();
    let mut values = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let Some(n) = bytes[i..].iter().position(|&b| b == b'"' || b == b';') else {
            break;
        };

        match bytes[i + n] {
            b';' => {
                values.push(spec[i..i + n].to_string());
                i += n + 1;
            }
            _ => {
                let (value, len) = unquote_prefix(&spec[i..])?;
                values.push(value);

                i += len;
                if i < bytes.len() && bytes[i] == b';' {
                    i += 1;
                }
            }
        }
    }
    if i < bytes.len() {
        values.push(spec[i..].to_string());
    }

    Ok(values)
}

/// Decodes a double-quoted string prefix, returning the unescaped value and
/// the number of bytes consumed (including both quotes).
fn unquote_prefix(s: &str) -> Result<(String, usize)> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, '"')) => {}
        _ => return Err(ExtractError::InvalidEnumMarker(s.to_string())),
    }

    let mut value = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, i + 1)),
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    return Err(ExtractError::InvalidEnumMarker(s.to_string()));
                };
                match escaped {
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    '\'' => value.push('\''),
                    _ => return Err(ExtractError::InvalidEnumMarker(s.to_string())),
                }
            }
            _ => value.push(c),
        }
    }

    Err(ExtractError::InvalidEnumMarker(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_and_trailing_markers_split() {
        let comment = Comment::read(
            "+kubebuilder:resource:path=pods\nPod is a collection of containers.\n\nMore text.\n+kubebuilder:subresource:status",
        );
        assert_eq!(
            comment.markers,
            vec![
                "kubebuilder:resource:path=pods",
                "kubebuilder:subresource:status"
            ]
        );
        assert_eq!(comment.text, "Pod is a collection of containers.\n\nMore text.");
    }

    #[test]
    fn test_inner_marker_lines_stay_in_text() {
        let comment = Comment::read("Some text.\n+marker=1\nMore text.");
        assert!(comment.markers.is_empty());
        assert_eq!(comment.text, "Some text.\n+marker=1\nMore text.");
    }

    #[test]
    fn test_blank_lines_between_markers_allowed() {
        let comment = Comment::read("+first\n\n+second\nText.");
        assert_eq!(comment.markers, vec!["first", "second"]);
        assert_eq!(comment.text, "Text.");
    }

    #[test]
    fn test_marker_lookup() {
        let comment = Comment::read("+optional\n+protobuf=false\nText.");
        assert_eq!(comment.marker("optional"), Some("true"));
        assert_eq!(comment.marker("protobuf"), Some("false"));
        assert_eq!(comment.marker("missing"), None);
    }

    #[test]
    fn test_add_markers_prepends() {
        let mut comment = Comment::read("+last\nText.");
        comment.add_markers("not a marker\n+genclient:nonNamespaced\n+other");
        assert_eq!(
            comment.markers,
            vec!["genclient:nonNamespaced", "other", "last"]
        );
    }

    #[test]
    fn test_deprecated_detection() {
        assert!(Comment::read("Deprecated: use v2 instead.").deprecated());
        assert!(Comment::read("THIS FIELD IS DEPRECATED").deprecated());
        assert!(!Comment::read("A perfectly healthy field.").deprecated());
    }

    #[test]
    fn test_scan_enum_bare_tokens() {
        let values = scan_enum_values("Always;Never;IfNotPresent").unwrap();
        assert_eq!(values, vec!["Always", "Never", "IfNotPresent"]);
    }

    #[test]
    fn test_scan_enum_quoted_tokens() {
        let values = scan_enum_values(r#""semi;colon";Plain;"""#).unwrap();
        assert_eq!(values, vec!["semi;colon", "Plain", ""]);
    }

    #[test]
    fn test_scan_enum_quoted_escapes() {
        let values = scan_enum_values(r#""a\"b";"tab\there""#).unwrap();
        assert_eq!(values, vec![r#"a"b"#, "tab\there"]);
    }

    #[test]
    fn test_scan_enum_single_token() {
        assert_eq!(scan_enum_values("Always").unwrap(), vec!["Always"]);
    }

    #[test]
    fn test_scan_enum_unterminated_quote_fails() {
        assert!(scan_enum_values(r#""unterminated"#).is_err());
    }

    #[test]
    fn test_comment_index_lookup() {
        use crate::model::{CommentBlock, Package};

        let package = Package {
            path: "p".into(),
            comments: vec![CommentBlock {
                file: "types.go".into(),
                last_line: 10,
                text: "+genclient:nonNamespaced".into(),
            }],
            ..Default::default()
        };

        let index = CommentIndex::scan(&package);
        assert_eq!(index.get("types.go", 10), Some("+genclient:nonNamespaced"));
        assert_eq!(index.get("types.go", 11), None);
        assert_eq!(index.get("other.go", 10), None);
    }
}
