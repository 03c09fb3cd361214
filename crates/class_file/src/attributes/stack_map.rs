#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationTypeInfo {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    Object { cpool_index: u16 },
    Uninitialized { offset: u16 },
}
impl VerificationTypeInfo {
    pub fn tag(&self) -> u8 {
        match self {
            VerificationTypeInfo::Top => 0,
            VerificationTypeInfo::Integer => 1,
            VerificationTypeInfo::Float => 2,
            VerificationTypeInfo::Double => 3,
            VerificationTypeInfo::Long => 4,
            VerificationTypeInfo::Null => 5,
            VerificationTypeInfo::UninitializedThis => 6,
            VerificationTypeInfo::Object { .. } => 7,
            VerificationTypeInfo::Uninitialized { .. } => 8,
        }
    }

    fn encoded_len(&self) -> u64 {
        match self {
            VerificationTypeInfo::Object { .. } | VerificationTypeInfo::Uninitialized { .. } => 3,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackMapFrame {
    Same {
        offset_delta: u16,
    },
    SameLocals1StackItem {
        offset_delta: u16,
        stack: VerificationTypeInfo,
    },
    SameLocals1StackItemExtended {
        offset_delta: u16,
        stack: VerificationTypeInfo,
    },
    /// The last `k` locals are absent.
    Chop {
        k: u8,
        offset_delta: u16,
    },
    SameExtended {
        offset_delta: u16,
    },
    Append {
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo>,
    },
    Full {
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo>,
        stack: Vec<VerificationTypeInfo>,
    },
}
impl StackMapFrame {
    /// The discriminant byte this frame is encoded with.
    pub fn frame_type(&self) -> u8 {
        match self {
            StackMapFrame::Same { offset_delta } => *offset_delta as u8,
            StackMapFrame::SameLocals1StackItem { offset_delta, .. } => 64 + *offset_delta as u8,
            StackMapFrame::SameLocals1StackItemExtended { .. } => 247,
            StackMapFrame::Chop { k, .. } => 251 - k,
            StackMapFrame::SameExtended { .. } => 251,
            StackMapFrame::Append { locals, .. } => 251 + locals.len() as u8,
            StackMapFrame::Full { .. } => 255,
        }
    }

    pub fn offset_delta(&self) -> u16 {
        match *self {
            StackMapFrame::Same { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. }
            | StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => offset_delta,
        }
    }

    /// Every verification type the frame carries, locals first.
    pub fn verification_types(&self) -> impl Iterator<Item = &VerificationTypeInfo> {
        let (locals, stack): (&[VerificationTypeInfo], &[VerificationTypeInfo]) = match self {
            StackMapFrame::SameLocals1StackItem { stack, .. }
            | StackMapFrame::SameLocals1StackItemExtended { stack, .. } => {
                (&[][..], std::slice::from_ref(stack))
            }
            StackMapFrame::Append { locals, .. } => (locals.as_slice(), &[][..]),
            StackMapFrame::Full { locals, stack, .. } => (locals.as_slice(), stack.as_slice()),
            _ => (&[][..], &[][..]),
        };

        locals.iter().chain(stack.iter())
    }

    pub(crate) fn encoded_len(&self) -> u64 {
        let types = |types: &[VerificationTypeInfo]| -> u64 {
            types.iter().map(VerificationTypeInfo::encoded_len).sum()
        };

        match self {
            StackMapFrame::Same { .. } => 1,
            StackMapFrame::SameLocals1StackItem { stack, .. } => 1 + stack.encoded_len(),
            StackMapFrame::SameLocals1StackItemExtended { stack, .. } => 3 + stack.encoded_len(),
            StackMapFrame::Chop { .. } | StackMapFrame::SameExtended { .. } => 3,
            StackMapFrame::Append { locals, .. } => 3 + types(locals.as_slice()),
            StackMapFrame::Full { locals, stack, .. } => {
                7 + types(locals.as_slice()) + types(stack.as_slice())
            }
        }
    }
}
