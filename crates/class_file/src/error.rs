use thiserror::Error;

use crate::constant_pool::{Constant, ConstantPool};

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Expected {0}, found {1:?}")]
    UnexpectedConstantPoolEntry(&'static str, Constant),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Unsupported major version: {0}")]
    UnsupportedVersion(u16),
    #[error("Truncated input: expected {needed} bytes, found {available}")]
    TruncatedInput { needed: usize, available: usize },
    #[error("Invalid cp info tag: {0}")]
    UnknownTag(u8),
    #[error("{source} (after {} constant pool entries)", .partial.len())]
    MalformedConstantPool {
        partial: ConstantPool,
        source: Box<ClassFileError>,
    },
    #[error("Constant pool index {0} cannot be resolved")]
    UnresolvableIndex(u16),
    #[error("Not a number: {0}")]
    InvalidNumber(String),
    #[error("No constant at index {0}")]
    NoSuchConstant(String),
    #[error("No such field: {0}")]
    NoSuchField(String),
    #[error("Invalid value for {field}: {reason}")]
    InvalidFieldValue { field: &'static str, reason: String },
}
