use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StandardizeError {
    #[error("'{label}' node must have {expected} children, found {found}")]
    WrongArity {
        label: String,
        expected: String,
        found: usize,
    },
    #[error("'{label}' node has no child labelled '='")]
    MissingEqChild { label: String },
    #[error("'{label}' expects an '=' child with exactly 2 children, found {found}")]
    MalformedEqChild { label: String, found: usize },
}
