//! Comments are append-only; merges deduplicate identical sequences
//! (invariant 6). A small closed `CommentMarker` enum models the
//! structured markers some passes stash alongside raw text (`IsTrivial`,
//! `ExpandedClass`, `NameHint`) instead of parsing comment strings, per
//! §9's design note.

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CommentMarker {
    /// Marks a merged `TypeAlias` as the "trivial" side of a merge
    /// (§4.5 rule 8): the non-trivial alias wins.
    IsTrivial,
    /// Marks a class produced by `ExtractClasses` from an anonymous
    /// constructor type.
    ExpandedClass,
    /// A hint fed to `DeriveNonConflictingName` for naming an extracted
    /// interface/class.
    NameHint(String),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Comment {
    Raw(String),
    Marker(CommentMarker),
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Comments(pub Vec<Comment>);

impl Comments {
    pub fn empty() -> Self {
        Comments(Vec::new())
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Comments(vec![Comment::Raw(text.into())])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_marker(&self, marker: &CommentMarker) -> bool {
        self.0.iter().any(|c| matches!(c, Comment::Marker(m) if m == marker))
    }

    pub fn with_marker(mut self, marker: CommentMarker) -> Self {
        self.0.push(Comment::Marker(marker));
        self
    }

    pub fn append(mut self, other: &Comments) -> Self {
        self.0.extend(other.0.iter().cloned());
        self
    }

    /// Union used by merges: identical sequences collapse to one copy
    /// (invariant 6); otherwise the two sequences are appended.
    pub fn merge(a: &Comments, b: &Comments) -> Comments {
        if a == b {
            a.clone()
        } else {
            a.clone().append(b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_of_identical_sequences_deduplicates() {
        let a = Comments::raw("hello");
        let b = Comments::raw("hello");
        let merged = Comments::merge(&a, &b);
        assert_eq!(merged, a);
    }

    #[test]
    fn merge_of_distinct_sequences_appends() {
        let a = Comments::raw("hello");
        let b = Comments::raw("world");
        let merged = Comments::merge(&a, &b);
        assert_eq!(merged.0.len(), 2);
    }
}
