// https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
mod constant_pool;
pub mod descriptor;
mod diagnostic;
mod error;
mod options;
mod parser;
mod validate;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo, Version};
pub use access_flags::{AccessFlags, MemberKind};
pub use attributes::{Attribute, AttributeContext, AttributeInfo, Attributes};
pub use constant_pool::{ConstantPool, CpInfo, CpTag, Utf8Info};
pub use diagnostic::Diagnostic;
pub use error::{ClassFileError, ErrorCategory};
pub use options::{Grammar, ParseOptions};
pub use parser::{Parser, MAX_ELEMENT_VALUE_DEPTH};
pub use validate::{validate, validate_references, validate_structure};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
