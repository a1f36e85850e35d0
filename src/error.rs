use thiserror::Error;

/// A structural expectation about the source document that no longer holds.
///
/// Every variant is fatal: a catalog built from a document that violates one of
/// these is worse than no catalog at all.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("expected section titled '{expected}', found '{found}'")]
    UnexpectedTitle { expected: String, found: String },

    #[error("missing section: {0}")]
    MissingSection(String),

    #[error("title does not look like a call signature: '{0}'")]
    BadSignature(String),

    #[error("section '{id}' has {count} attribute paragraphs, expected at most one")]
    AmbiguousAttributes { id: String, count: usize },

    #[error("attribute paragraph of section '{id}' does not match the expected sentence: '{text}'")]
    MalformedAttributes { id: String, text: String },

    #[error("'{0}' has nested sections and cannot be read as a single property or method")]
    NotBare(String),

    #[error("'{group}' has more than one '{marker}' section")]
    AmbiguousGroup { group: String, marker: &'static str },

    #[error("'{group}' should only hold {expected}, found '{name}'")]
    MisplacedMember {
        group: String,
        expected: &'static str,
        name: String,
    },

    #[error("section '{title}' has {found} children, expected {expected}")]
    ChildCount {
        title: String,
        expected: usize,
        found: usize,
    },

    #[error("global {kind} '{name}' matches no catalog entry")]
    UnmatchedGlobal { kind: &'static str, name: String },

    #[error("duplicate catalog entry '{0}'")]
    DuplicateName(String),

    #[error("class '{class}' declares '{name}' as both an instance and a shared property")]
    OverlappingMember { class: String, name: String },

    #[error("no element with id '{0}'")]
    MissingAnchor(String),

    #[error("reference list at '{0}' is empty")]
    EmptyReferenceList(String),
}

pub type Result<T> = std::result::Result<T, IntegrityError>;

/// Fail with [`IntegrityError::UnexpectedTitle`] unless `found == expected`.
pub fn expect_title(found: &str, expected: &str) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(IntegrityError::UnexpectedTitle {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}
