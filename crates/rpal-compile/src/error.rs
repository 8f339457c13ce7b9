use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("'{label}' node must have {expected} children, found {found}")]
    WrongArity {
        label: String,
        expected: String,
        found: usize,
    },
    #[error("node labelled '{label}' is not a valid standardized-tree node")]
    NotStandardized { label: String },
}
