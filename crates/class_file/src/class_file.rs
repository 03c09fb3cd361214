use std::{fmt, io::Read};

use crate::{
    attributes::{Attributes, BootstrapMethod},
    parser::Parser,
    AccessFlags, ConstantPool, Diagnostic, Grammar, ParseOptions, Result,
};

/// A class file version, ordered by major then minor version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}
impl Version {
    pub const JAVA_1_1: Version = Version::new(45, 3);
    pub const JAVA_5: Version = Version::new(49, 0);
    pub const JAVA_6: Version = Version::new(50, 0);
    pub const JAVA_7: Version = Version::new(51, 0);
    pub const JAVA_8: Version = Version::new(52, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}
impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub version: Version,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
    /// The grammar the file was decoded with; validation checks descriptors against it too.
    pub grammar: Grammar,
    /// Advisory findings collected while decoding.
    pub diagnostics: Vec<Diagnostic>,
}
impl ClassFile {
    /// Decodes a class file without validating it.
    pub fn parse(bytes: impl Read) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn parse_with(bytes: impl Read, options: ParseOptions) -> Result<ClassFile> {
        Parser::with_options(bytes, options).parse()
    }

    /// Decodes and validates a class file, failing on the first problem found.
    pub fn load(bytes: impl Read) -> Result<ClassFile> {
        let class_file = Self::parse(bytes)?;
        class_file.validate()?;
        Ok(class_file)
    }

    /// Runs the reference and structure checks. Validation never changes the class file.
    pub fn validate(&self) -> Result<()> {
        crate::validate(self)
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(AccessFlags::INTERFACE)
    }

    pub fn class_name(&self) -> Result<&str> {
        self.constant_pool.class_name(self.this_class)
    }

    /// `None` for `java/lang/Object`, the only class without a direct superclass.
    pub fn super_class(&self) -> Result<Option<&str>> {
        if self.super_class == 0 {
            return Ok(None);
        }

        self.constant_pool.class_name(self.super_class).map(Some)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.str(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.str(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.str(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.str(method.descriptor_index)
    }

    pub fn bootstrap_methods(&self) -> Option<&[BootstrapMethod]> {
        self.attributes.bootstrap_methods()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
