use crate::Version;

/// Which name alphabet the descriptor and annotation checks accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// Class names in descriptors are limited to ASCII letters, digits, `/` and `$`, and
    /// annotation element names must have the shape of a field descriptor. Annotation constants
    /// point at a `Fieldref` declared with the constant's type.
    Strict,
    /// Class names may hold anything but `.`, `;` and `[`, and annotation element names only need
    /// to be unqualified names. Annotation constants point at the constant entry itself.
    Lenient,
}
impl Default for Grammar {
    fn default() -> Self {
        Grammar::Strict
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Newest class file version the parser accepts.
    pub max_version: Version,
    pub grammar: Grammar,
}
impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_version: Version::JAVA_8,
            grammar: Grammar::default(),
        }
    }
}
