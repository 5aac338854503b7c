use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unhandled address {0}")]
    UnknownAddress(String),
    #[error("parameter index out of range in {address}")]
    ParamIndexOutOfRange { address: String },
    #[error("line index {line} out of range")]
    LineIndexOutOfRange { line: i64 },
    #[error("unexpected arguments for {address}: expected {expected}")]
    UnexpectedArguments {
        address: String,
        expected: &'static str,
    },
}

impl ProtocolError {
    /// Unknown addresses are routine traffic rather than a malformed message.
    pub fn is_unknown_address(&self) -> bool {
        matches!(self, Self::UnknownAddress(_))
    }
}
