use std::fmt;

use crate::Version;

/// The structure an attribute table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeContext {
    Class,
    Field,
    Method,
    Code,
}
impl AttributeContext {
    /// The attributes understood in this context, with the version that introduced each.
    pub fn attributes(self) -> &'static [(AttributeKind, Version)] {
        match self {
            AttributeContext::Class => CLASS_ATTRIBUTES,
            AttributeContext::Field => FIELD_ATTRIBUTES,
            AttributeContext::Method => METHOD_ATTRIBUTES,
            AttributeContext::Code => CODE_ATTRIBUTES,
        }
    }
}
impl fmt::Display for AttributeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeContext::Class => "class",
            AttributeContext::Field => "field",
            AttributeContext::Method => "method",
            AttributeContext::Code => "code",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    ConstantValue,
    Code,
    StackMapTable,
    Exceptions,
    InnerClasses,
    EnclosingMethod,
    Synthetic,
    Signature,
    SourceFile,
    SourceDebugExtension,
    LineNumberTable,
    LocalVariableTable,
    LocalVariableTypeTable,
    Deprecated,
    RuntimeVisibleAnnotations,
    RuntimeInvisibleAnnotations,
    RuntimeVisibleParameterAnnotations,
    RuntimeInvisibleParameterAnnotations,
    AnnotationDefault,
    BootstrapMethods,
    MethodParameters,
    RuntimeVisibleTypeAnnotations,
    RuntimeInvisibleTypeAnnotations,
}
impl AttributeKind {
    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::ConstantValue => "ConstantValue",
            AttributeKind::Code => "Code",
            AttributeKind::StackMapTable => "StackMapTable",
            AttributeKind::Exceptions => "Exceptions",
            AttributeKind::InnerClasses => "InnerClasses",
            AttributeKind::EnclosingMethod => "EnclosingMethod",
            AttributeKind::Synthetic => "Synthetic",
            AttributeKind::Signature => "Signature",
            AttributeKind::SourceFile => "SourceFile",
            AttributeKind::SourceDebugExtension => "SourceDebugExtension",
            AttributeKind::LineNumberTable => "LineNumberTable",
            AttributeKind::LocalVariableTable => "LocalVariableTable",
            AttributeKind::LocalVariableTypeTable => "LocalVariableTypeTable",
            AttributeKind::Deprecated => "Deprecated",
            AttributeKind::RuntimeVisibleAnnotations => "RuntimeVisibleAnnotations",
            AttributeKind::RuntimeInvisibleAnnotations => "RuntimeInvisibleAnnotations",
            AttributeKind::RuntimeVisibleParameterAnnotations => {
                "RuntimeVisibleParameterAnnotations"
            }
            AttributeKind::RuntimeInvisibleParameterAnnotations => {
                "RuntimeInvisibleParameterAnnotations"
            }
            AttributeKind::AnnotationDefault => "AnnotationDefault",
            AttributeKind::BootstrapMethods => "BootstrapMethods",
            AttributeKind::MethodParameters => "MethodParameters",
            AttributeKind::RuntimeVisibleTypeAnnotations => "RuntimeVisibleTypeAnnotations",
            AttributeKind::RuntimeInvisibleTypeAnnotations => "RuntimeInvisibleTypeAnnotations",
        }
    }
}

const CLASS_ATTRIBUTES: &[(AttributeKind, Version)] = &[
    (AttributeKind::SourceFile, Version::JAVA_1_1),
    (AttributeKind::InnerClasses, Version::JAVA_1_1),
    (AttributeKind::Synthetic, Version::JAVA_1_1),
    (AttributeKind::Deprecated, Version::JAVA_1_1),
    (AttributeKind::EnclosingMethod, Version::JAVA_5),
    (AttributeKind::SourceDebugExtension, Version::JAVA_5),
    (AttributeKind::Signature, Version::JAVA_5),
    (AttributeKind::RuntimeVisibleAnnotations, Version::JAVA_5),
    (AttributeKind::RuntimeInvisibleAnnotations, Version::JAVA_5),
    (AttributeKind::BootstrapMethods, Version::JAVA_7),
    (AttributeKind::RuntimeVisibleTypeAnnotations, Version::JAVA_8),
    (AttributeKind::RuntimeInvisibleTypeAnnotations, Version::JAVA_8),
];

const FIELD_ATTRIBUTES: &[(AttributeKind, Version)] = &[
    (AttributeKind::ConstantValue, Version::JAVA_1_1),
    (AttributeKind::Synthetic, Version::JAVA_1_1),
    (AttributeKind::Deprecated, Version::JAVA_1_1),
    (AttributeKind::Signature, Version::JAVA_5),
    (AttributeKind::RuntimeVisibleAnnotations, Version::JAVA_5),
    (AttributeKind::RuntimeInvisibleAnnotations, Version::JAVA_5),
    (AttributeKind::RuntimeVisibleTypeAnnotations, Version::JAVA_8),
    (AttributeKind::RuntimeInvisibleTypeAnnotations, Version::JAVA_8),
];

const METHOD_ATTRIBUTES: &[(AttributeKind, Version)] = &[
    (AttributeKind::Code, Version::JAVA_1_1),
    (AttributeKind::Exceptions, Version::JAVA_1_1),
    (AttributeKind::Synthetic, Version::JAVA_1_1),
    (AttributeKind::Deprecated, Version::JAVA_1_1),
    (AttributeKind::RuntimeVisibleParameterAnnotations, Version::JAVA_5),
    (AttributeKind::RuntimeInvisibleParameterAnnotations, Version::JAVA_5),
    (AttributeKind::AnnotationDefault, Version::JAVA_5),
    (AttributeKind::Signature, Version::JAVA_5),
    (AttributeKind::RuntimeVisibleAnnotations, Version::JAVA_5),
    (AttributeKind::RuntimeInvisibleAnnotations, Version::JAVA_5),
    (AttributeKind::MethodParameters, Version::JAVA_8),
    (AttributeKind::RuntimeVisibleTypeAnnotations, Version::JAVA_8),
    (AttributeKind::RuntimeInvisibleTypeAnnotations, Version::JAVA_8),
];

const CODE_ATTRIBUTES: &[(AttributeKind, Version)] = &[
    (AttributeKind::LineNumberTable, Version::JAVA_1_1),
    (AttributeKind::LocalVariableTable, Version::JAVA_1_1),
    (AttributeKind::LocalVariableTypeTable, Version::JAVA_5),
    (AttributeKind::StackMapTable, Version::JAVA_6),
    (AttributeKind::RuntimeVisibleTypeAnnotations, Version::JAVA_8),
    (AttributeKind::RuntimeInvisibleTypeAnnotations, Version::JAVA_8),
];

/// Outcome of looking an attribute name up for a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Decode(AttributeKind),
    TooNew {
        kind: AttributeKind,
        since: Version,
    },
    Unrecognized,
}

pub fn lookup(context: AttributeContext, name: &[u8], version: Version) -> Lookup {
    let Some(&(kind, since)) = context
        .attributes()
        .iter()
        .find(|(kind, _)| kind.name().as_bytes() == name)
    else {
        return Lookup::Unrecognized;
    };

    if version >= since {
        Lookup::Decode(kind)
    } else {
        Lookup::TooNew { kind, since }
    }
}
