use crate::{ClassFileError, ConstantPool, CpTag, Grammar, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// A field descriptor naming the annotation type.
    pub type_index: u16,
    pub element_value_pairs: Vec<ElementValuePair>,
}
impl Annotation {
    pub(crate) fn encoded_len(&self) -> u64 {
        4 + self
            .element_value_pairs
            .iter()
            .map(|pair| 2 + pair.value.encoded_len())
            .sum::<u64>()
    }

    /// Length of a count-prefixed table of annotations.
    pub(crate) fn table_len(annotations: &[Annotation]) -> u64 {
        2 + annotations.iter().map(Annotation::encoded_len).sum::<u64>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub element_name_index: u16,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// A primitive or string constant; `tag` is one of `BCDFIJSZs`.
    Const { tag: u8, const_value_index: u16 },
    Enum {
        type_name_index: u16,
        const_name_index: u16,
    },
    Class { class_info_index: u16 },
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}
impl ElementValue {
    pub fn tag(&self) -> u8 {
        match self {
            ElementValue::Const { tag, .. } => *tag,
            ElementValue::Enum { .. } => b'e',
            ElementValue::Class { .. } => b'c',
            ElementValue::Annotation(_) => b'@',
            ElementValue::Array(_) => b'[',
        }
    }

    /// The constant pool entry a constant of the given tag points at under [`Grammar::Lenient`].
    pub fn constant_tag(tag: u8) -> Option<CpTag> {
        match tag {
            b'B' | b'C' | b'I' | b'S' | b'Z' => Some(CpTag::Integer),
            b'D' => Some(CpTag::Double),
            b'F' => Some(CpTag::Float),
            b'J' => Some(CpTag::Long),
            b's' => Some(CpTag::Utf8),
            _ => None,
        }
    }

    /// The field type a constant of the given tag must be declared with under
    /// [`Grammar::Strict`].
    pub fn constant_descriptor(tag: u8) -> Option<&'static [u8]> {
        Some(match tag {
            b'B' => b"B",
            b'C' => b"C",
            b'D' => b"D",
            b'F' => b"F",
            b'I' => b"I",
            b'J' => b"J",
            b'S' => b"S",
            b'Z' => b"Z",
            b's' => b"Ljava/lang/String;",
            _ => return None,
        })
    }

    /// Checks what the `const_value_index` of a constant of `tag` resolves to.
    ///
    /// Under [`Grammar::Strict`] the index names a `Fieldref` whose declared type matches the tag,
    /// a single base type character or `Ljava/lang/String;` for `s`. Under [`Grammar::Lenient`]
    /// it names the constant itself.
    pub fn check_constant(
        tag: u8,
        const_value_index: u16,
        constant_pool: &ConstantPool,
        grammar: Grammar,
    ) -> Result<()> {
        if grammar == Grammar::Lenient {
            if let Some(expected) = Self::constant_tag(tag) {
                constant_pool.expect(const_value_index, expected)?;
            }
            return Ok(());
        }

        let field_ref = constant_pool.field_ref(const_value_index)?;
        let name_and_type = constant_pool.name_and_type(field_ref.name_and_type_index)?;
        let descriptor = constant_pool.utf8(name_and_type.descriptor_index)?;
        if Self::constant_descriptor(tag) == Some(descriptor.as_bytes()) {
            Ok(())
        } else {
            Err(ClassFileError::InvalidConstantPoolEntry {
                index: const_value_index,
                message: format!(
                    "a field of type {} cannot hold a '{}' constant",
                    descriptor, tag as char
                ),
            })
        }
    }

    pub(crate) fn encoded_len(&self) -> u64 {
        1 + match self {
            ElementValue::Const { .. } | ElementValue::Class { .. } => 2,
            ElementValue::Enum { .. } => 4,
            ElementValue::Annotation(annotation) => annotation.encoded_len(),
            ElementValue::Array(values) => {
                2 + values.iter().map(ElementValue::encoded_len).sum::<u64>()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub target_type: u8,
    pub target_info: TargetInfo,
    pub target_path: Vec<TypePathEntry>,
    pub annotation: Annotation,
}
impl TypeAnnotation {
    pub(crate) fn encoded_len(&self) -> u64 {
        1 + self.target_info.encoded_len()
            + 1
            + 2 * self.target_path.len() as u64
            + self.annotation.encoded_len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetInfo {
    TypeParameter {
        type_parameter_index: u8,
    },
    Supertype {
        supertype_index: u16,
    },
    TypeParameterBound {
        type_parameter_index: u8,
        bound_index: u8,
    },
    Empty,
    FormalParameter {
        formal_parameter_index: u8,
    },
    Throws {
        throws_type_index: u16,
    },
    LocalVar(Vec<LocalVarTarget>),
    Catch {
        exception_table_index: u16,
    },
    Offset {
        offset: u16,
    },
    TypeArgument {
        offset: u16,
        type_argument_index: u8,
    },
}
impl TargetInfo {
    fn encoded_len(&self) -> u64 {
        match self {
            TargetInfo::Empty => 0,
            TargetInfo::TypeParameter { .. } | TargetInfo::FormalParameter { .. } => 1,
            TargetInfo::Supertype { .. }
            | TargetInfo::TypeParameterBound { .. }
            | TargetInfo::Throws { .. }
            | TargetInfo::Catch { .. }
            | TargetInfo::Offset { .. } => 2,
            TargetInfo::TypeArgument { .. } => 3,
            TargetInfo::LocalVar(table) => 2 + 6 * table.len() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVarTarget {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypePathEntry {
    pub type_path_kind: u8,
    pub type_argument_index: u8,
}
