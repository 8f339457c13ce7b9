use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    #[error("unbound identifier: {0}")]
    UnboundIdentifier(String),
    #[error("control structure ran out of instructions")]
    ControlUnderflow,
    #[error("value stack underflow")]
    StackUnderflow,
    #[error("'{op}' is not applicable to {operand}")]
    TypeError { op: String, operand: String },
    #[error("cannot apply a {0} as a function")]
    NotApplicable(String),
    #[error("tuple index {index} out of range for a {size}-tuple")]
    IndexOutOfRange { index: i64, size: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer literal '{0}' does not fit in an i64")]
    MalformedInteger(String),
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    #[error("'Delta({0})' executed outside of a 'Beta' dispatch")]
    StrayDelta(usize),
}
