use std::fmt;

use crate::{AttributeContext, MemberKind, Version};

/// Something odd the parser noticed but could step over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The attribute name means nothing in this context and the attribute was skipped.
    UnrecognizedAttribute {
        name: String,
        context: AttributeContext,
        length: u32,
    },
    /// The attribute was introduced after the class file's version and was skipped.
    AttributeTooNew {
        name: &'static str,
        since: Version,
        version: Version,
    },
    /// A stack map frame type outside every defined range; the rest of the table was skipped.
    UnknownFrameType { frame_type: u8, entry: u16 },
    UndefinedAccessFlags { kind: MemberKind, bits: u16 },
    /// A decoder stopped short of, or ran past, the declared attribute length.
    AttributeLengthDrift {
        name: &'static str,
        declared: u32,
        consumed: u64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnrecognizedAttribute {
                name,
                context,
                length,
            } => write!(
                f,
                "Skipping unrecognized {} attribute {:?} ({} bytes)",
                context, name, length
            ),
            Diagnostic::AttributeTooNew {
                name,
                since,
                version,
            } => write!(
                f,
                "Skipping {} attribute: introduced in {}, class file is {}",
                name, since, version
            ),
            Diagnostic::UnknownFrameType { frame_type, entry } => write!(
                f,
                "Unknown stack map frame type {} at entry {}",
                frame_type, entry
            ),
            Diagnostic::UndefinedAccessFlags { kind, bits } => {
                write!(f, "Undefined {:?} access flags: 0x{:04X}", kind, bits)
            }
            Diagnostic::AttributeLengthDrift {
                name,
                declared,
                consumed,
            } => write!(
                f,
                "{} attribute declares {} bytes but {} were read",
                name, declared, consumed
            ),
        }
    }
}
