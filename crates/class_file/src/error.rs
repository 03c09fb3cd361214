use thiserror::Error;

use crate::Version;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Unsupported class file version: {0}")]
    UnsupportedVersion(Version),
    #[error("Invalid cp info tag: {0}")]
    InvalidCpInfoTag(u8),
    #[error("Constant pool entry #{0} does not fit in the declared pool count")]
    ConstantPoolOverflow(u16),
    #[error("Invalid constant pool index: #{0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Expected {expected} at constant pool index #{index}, found {found}")]
    UnexpectedConstantPoolEntry {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Constant pool entry #{0} is not valid UTF-8")]
    InvalidUtf8(u16),
    #[error("Attribute name at constant pool index #{0} cannot be resolved")]
    UnresolvableAttributeName(u16),
    #[error("Invalid code length: {0}")]
    InvalidCodeLength(u32),
    #[error("Invalid element value tag: {0:#04X}")]
    InvalidElementValueTag(u8),
    #[error("Element values nest deeper than {0} levels")]
    ElementValueTooDeep(usize),
    #[error("Invalid verification type tag: {0}")]
    InvalidVerificationTypeTag(u8),
    #[error("Invalid type annotation target type: 0x{0:02X}")]
    InvalidTargetType(u8),
    #[error("Unknown stack map frame type: {0}")]
    UnknownFrameType(u8),
    #[error("Invalid descriptor {descriptor:?} at constant pool index #{index}")]
    InvalidDescriptor { index: u16, descriptor: String },
    #[error("Invalid constant pool entry #{index}: {message}")]
    InvalidConstantPoolEntry { index: u16, message: String },
    #[error("{attribute} attribute declares {declared} bytes but its contents take {computed}")]
    AttributeLengthMismatch {
        attribute: &'static str,
        declared: u32,
        computed: u64,
    },
    #[error("Invalid {attribute} attribute: {message}")]
    InvalidAttribute {
        attribute: &'static str,
        message: String,
    },
    #[error("Invalid access flags on {location}: {message}")]
    InvalidAccessFlags {
        location: String,
        message: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The byte source failed or ran out.
    Io,
    /// The bytes do not form a well-shaped class file.
    Structural,
    /// An index does not resolve to what its referrer needs.
    Referential,
}

impl ClassFileError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClassFileError::IOError(_) => ErrorCategory::Io,
            ClassFileError::InvalidConstantPoolIndex(_)
            | ClassFileError::UnexpectedConstantPoolEntry { .. }
            | ClassFileError::InvalidUtf8(_)
            | ClassFileError::InvalidDescriptor { .. }
            | ClassFileError::InvalidConstantPoolEntry { .. } => ErrorCategory::Referential,
            _ => ErrorCategory::Structural,
        }
    }

    /// The offending constant pool index, if the error names one.
    pub fn constant_pool_index(&self) -> Option<u16> {
        match *self {
            ClassFileError::ConstantPoolOverflow(index)
            | ClassFileError::InvalidConstantPoolIndex(index)
            | ClassFileError::InvalidUtf8(index)
            | ClassFileError::UnresolvableAttributeName(index)
            | ClassFileError::UnexpectedConstantPoolEntry { index, .. }
            | ClassFileError::InvalidDescriptor { index, .. }
            | ClassFileError::InvalidConstantPoolEntry { index, .. } => Some(index),
            _ => None,
        }
    }
}
