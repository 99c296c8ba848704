use super::collaborators::{DocComment, SourceLocator};
use crate::model::SourceRange;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A declaration in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub offset: usize,
    #[serde(default)]
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default)]
    pub comment: DocComment,
}

impl Declaration {
    #[must_use]
    pub fn new(offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            line: None,
            comment: DocComment::Missing,
        }
    }

    #[must_use]
    pub const fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: DocComment) -> Self {
        self.comment = comment;
        self
    }

    const fn range(&self) -> SourceRange {
        SourceRange {
            offset: self.offset,
            length: self.length,
            line: self.line,
        }
    }
}

/// Declarations of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSource {
    pub source_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<Declaration>,
    /// Keyed by member key (`name(signature)` or field name)
    #[serde(default)]
    pub members: IndexMap<String, Declaration>,
}

impl TypeSource {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            declaration: None,
            members: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declaration = Some(declaration);
        self
    }

    #[must_use]
    pub fn with_member(mut self, key: impl Into<String>, declaration: Declaration) -> Self {
        self.members.insert(key.into(), declaration);
        self
    }
}

/// A [`SourceLocator`] backed by a precomputed index of declarations.
///
/// The index is what a source scanner produces for the workspace; an empty
/// index knows no declarations, which turns since-tag checks off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIndex {
    #[serde(default)]
    pub types: IndexMap<String, TypeSource>,
}

impl SourceIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>, source: TypeSource) -> Self {
        self.types.insert(type_name.into(), source);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl SourceLocator for SourceIndex {
    fn source_file(&self, type_name: &str) -> Option<String> {
        self.types.get(type_name).map(|t| t.source_file.clone())
    }

    fn member_range(&self, type_name: &str, member: Option<&str>) -> Option<SourceRange> {
        let source = self.types.get(type_name)?;
        let declaration = match member {
            Some(key) => source.members.get(key),
            None => source.declaration.as_ref(),
        };
        declaration.map(Declaration::range)
    }

    fn comment_at(&self, source_file: &str, offset: usize) -> DocComment {
        self.types
            .values()
            .filter(|t| t.source_file == source_file)
            .flat_map(|t| t.declaration.iter().chain(t.members.values()))
            .find(|d| d.offset == offset)
            .map(|d| d.comment.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SourceIndex {
        SourceIndex::new().with_type(
            "a.B",
            TypeSource::new("src/a/B.java")
                .with_declaration(Declaration::new(40, 1).with_comment(DocComment::doc("1.0")))
                .with_member(
                    "run()V",
                    Declaration::new(120, 3)
                        .with_line(9)
                        .with_comment(DocComment::Plain),
                ),
        )
    }

    #[test]
    fn test_lookup() {
        let idx = index();
        assert_eq!(idx.source_file("a.B").as_deref(), Some("src/a/B.java"));
        assert_eq!(idx.source_file("a.C"), None);
        let range = idx.member_range("a.B", Some("run()V")).unwrap();
        assert_eq!((range.offset, range.line), (120, Some(9)));
        assert_eq!(idx.member_range("a.B", None).unwrap().offset, 40);
        assert!(idx.member_range("a.B", Some("stop()V")).is_none());
    }

    #[test]
    fn test_comment_at() {
        let idx = index();
        assert_eq!(idx.comment_at("src/a/B.java", 40), DocComment::doc("1.0"));
        assert_eq!(idx.comment_at("src/a/B.java", 120), DocComment::Plain);
        assert_eq!(idx.comment_at("src/a/B.java", 7), DocComment::Missing);
        assert_eq!(idx.comment_at("src/a/Other.java", 40), DocComment::Missing);
    }

    #[test]
    fn test_deserialize_index() {
        let json = r#"{"types":{"a.B":{"source_file":"src/a/B.java","members":{"x":{"offset":5,"comment":{"kind":"doc","since":"2.0"}}}}}}"#;
        let idx: SourceIndex = serde_json::from_str(json).unwrap();
        assert_eq!(idx.comment_at("src/a/B.java", 5).since(), Some("2.0"));
    }
}
