mod annotation;
pub(crate) mod dispatch;
mod stack_map;

use crate::{constant_pool::CpInfo, AccessFlags, ConstantPool};

pub use self::annotation::{
    Annotation, ElementValue, ElementValuePair, LocalVarTarget, TargetInfo, TypeAnnotation,
    TypePathEntry,
};
pub use self::dispatch::{AttributeContext, AttributeKind};
pub use self::stack_map::{StackMapFrame, VerificationTypeInfo};

/// Size of the name index and length that precede every attribute.
pub const ATTRIBUTE_HEADER_LEN: u64 = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub attribute_name_index: u16,
    pub attribute_length: u32,
    pub info: AttributeInfo,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.iter().find(|a| {
            matches!(
                constant_pool.get(a.attribute_name_index),
                Ok(CpInfo::Utf8(s)) if s.as_bytes() == name.as_bytes()
            )
        })
    }

    pub fn count(&self, kind: AttributeKind) -> usize {
        self.iter().filter(|a| a.info.kind() == Some(kind)).count()
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.iter().find_map(|a| match &a.info {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn bootstrap_methods(&self) -> Option<&[BootstrapMethod]> {
        self.iter().find_map(|a| match &a.info {
            AttributeInfo::BootstrapMethods(methods) => Some(methods.as_slice()),
            _ => None,
        })
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The decoded contents of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
    ConstantValue {
        constant_value_index: u16,
    },
    Code(CodeAttribute),
    StackMapTable(Vec<StackMapFrame>),
    Exceptions(Vec<u16>),
    InnerClasses(Vec<InnerClass>),
    EnclosingMethod {
        class_index: u16,
        method_index: u16,
    },
    Synthetic,
    Signature {
        signature_index: u16,
    },
    SourceFile {
        sourcefile_index: u16,
    },
    SourceDebugExtension(Vec<u8>),
    LineNumberTable(Vec<LineNumber>),
    LocalVariableTable(Vec<LocalVariable>),
    LocalVariableTypeTable(Vec<LocalVariableType>),
    Deprecated,
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),
    AnnotationDefault(ElementValue),
    BootstrapMethods(Vec<BootstrapMethod>),
    MethodParameters(Vec<MethodParameter>),
    RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),
    RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
    /// An attribute that was skipped: its name is not known in its context, it is newer than
    /// the class file, or its contents could not be followed.
    Unrecognized,
}
impl AttributeInfo {
    pub fn kind(&self) -> Option<AttributeKind> {
        Some(match self {
            AttributeInfo::ConstantValue { .. } => AttributeKind::ConstantValue,
            AttributeInfo::Code(_) => AttributeKind::Code,
            AttributeInfo::StackMapTable(_) => AttributeKind::StackMapTable,
            AttributeInfo::Exceptions(_) => AttributeKind::Exceptions,
            AttributeInfo::InnerClasses(_) => AttributeKind::InnerClasses,
            AttributeInfo::EnclosingMethod { .. } => AttributeKind::EnclosingMethod,
            AttributeInfo::Synthetic => AttributeKind::Synthetic,
            AttributeInfo::Signature { .. } => AttributeKind::Signature,
            AttributeInfo::SourceFile { .. } => AttributeKind::SourceFile,
            AttributeInfo::SourceDebugExtension(_) => AttributeKind::SourceDebugExtension,
            AttributeInfo::LineNumberTable(_) => AttributeKind::LineNumberTable,
            AttributeInfo::LocalVariableTable(_) => AttributeKind::LocalVariableTable,
            AttributeInfo::LocalVariableTypeTable(_) => AttributeKind::LocalVariableTypeTable,
            AttributeInfo::Deprecated => AttributeKind::Deprecated,
            AttributeInfo::RuntimeVisibleAnnotations(_) => AttributeKind::RuntimeVisibleAnnotations,
            AttributeInfo::RuntimeInvisibleAnnotations(_) => {
                AttributeKind::RuntimeInvisibleAnnotations
            }
            AttributeInfo::RuntimeVisibleParameterAnnotations(_) => {
                AttributeKind::RuntimeVisibleParameterAnnotations
            }
            AttributeInfo::RuntimeInvisibleParameterAnnotations(_) => {
                AttributeKind::RuntimeInvisibleParameterAnnotations
            }
            AttributeInfo::AnnotationDefault(_) => AttributeKind::AnnotationDefault,
            AttributeInfo::BootstrapMethods(_) => AttributeKind::BootstrapMethods,
            AttributeInfo::MethodParameters(_) => AttributeKind::MethodParameters,
            AttributeInfo::RuntimeVisibleTypeAnnotations(_) => {
                AttributeKind::RuntimeVisibleTypeAnnotations
            }
            AttributeInfo::RuntimeInvisibleTypeAnnotations(_) => {
                AttributeKind::RuntimeInvisibleTypeAnnotations
            }
            AttributeInfo::Unrecognized => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        self.kind().map_or("unrecognized", AttributeKind::name)
    }

    /// Number of bytes these contents occupy in a class file, not counting the attribute
    /// header. Nested attributes of a `Code` body count with their declared lengths.
    pub fn encoded_len(&self) -> Option<u64> {
        Some(match self {
            AttributeInfo::ConstantValue { .. }
            | AttributeInfo::Signature { .. }
            | AttributeInfo::SourceFile { .. } => 2,
            AttributeInfo::Code(code) => code.encoded_len(),
            AttributeInfo::StackMapTable(frames) => {
                2 + frames.iter().map(StackMapFrame::encoded_len).sum::<u64>()
            }
            AttributeInfo::Exceptions(classes) => 2 + 2 * classes.len() as u64,
            AttributeInfo::InnerClasses(classes) => 2 + 8 * classes.len() as u64,
            AttributeInfo::EnclosingMethod { .. } => 4,
            AttributeInfo::Synthetic | AttributeInfo::Deprecated => 0,
            AttributeInfo::SourceDebugExtension(bytes) => bytes.len() as u64,
            AttributeInfo::LineNumberTable(lines) => 2 + 4 * lines.len() as u64,
            AttributeInfo::LocalVariableTable(variables) => 2 + 10 * variables.len() as u64,
            AttributeInfo::LocalVariableTypeTable(variables) => 2 + 10 * variables.len() as u64,
            AttributeInfo::RuntimeVisibleAnnotations(annotations)
            | AttributeInfo::RuntimeInvisibleAnnotations(annotations) => {
                Annotation::table_len(annotations)
            }
            AttributeInfo::RuntimeVisibleParameterAnnotations(parameters)
            | AttributeInfo::RuntimeInvisibleParameterAnnotations(parameters) => {
                1 + parameters
                    .iter()
                    .map(|annotations| Annotation::table_len(annotations))
                    .sum::<u64>()
            }
            AttributeInfo::AnnotationDefault(value) => value.encoded_len(),
            AttributeInfo::BootstrapMethods(methods) => {
                2 + methods
                    .iter()
                    .map(|m| 4 + 2 * m.bootstrap_arguments.len() as u64)
                    .sum::<u64>()
            }
            AttributeInfo::MethodParameters(parameters) => 1 + 4 * parameters.len() as u64,
            AttributeInfo::RuntimeVisibleTypeAnnotations(annotations)
            | AttributeInfo::RuntimeInvisibleTypeAnnotations(annotations) => {
                2 + annotations
                    .iter()
                    .map(TypeAnnotation::encoded_len)
                    .sum::<u64>()
            }
            AttributeInfo::Unrecognized => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Zero catches everything.
    pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl CodeAttribute {
    fn encoded_len(&self) -> u64 {
        8 + self.code.len() as u64
            + 2
            + 8 * self.exception_table.len() as u64
            + 2
            + self
                .attributes
                .iter()
                .map(|a| ATTRIBUTE_HEADER_LEN + a.attribute_length as u64)
                .sum::<u64>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: AccessFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableType {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub signature_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapMethod {
    pub bootstrap_method_ref: u16,
    pub bootstrap_arguments: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameter {
    /// Zero for a parameter without a name.
    pub name_index: u16,
    pub access_flags: AccessFlags,
}
