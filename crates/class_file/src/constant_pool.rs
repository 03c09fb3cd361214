use std::{borrow::Cow, convert::TryFrom, fmt, ops::Index};

use crate::{ClassFileError, Result};

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {{
        let index = $index;
        match $cp.get(index)? {
            $crate::constant_pool::CpInfo::$i(ref n) => Ok(n),
            c => Err($crate::ClassFileError::UnexpectedConstantPoolEntry {
                index,
                expected: $crate::constant_pool::CpTag::$i.name(),
                found: c.tag_name(),
            }),
        }
    }};
}

/// The constant pool of a class file.
///
/// Entries are addressed the way the class file addresses them: index 0 is never valid, and the
/// slot following a `Long` or `Double` holds [`CpInfo::Unusable`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// The `constant_pool_count` of the pool, which counts the unused slot 0.
    pub fn count(&self) -> usize {
        self.cp_infos.len() + 1
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        if index == 0 {
            return Err(ClassFileError::InvalidConstantPoolIndex(index));
        }

        self.cp_infos
            .get(index as usize - 1)
            .ok_or(ClassFileError::InvalidConstantPoolIndex(index))
    }

    /// Resolves `index` and checks that the entry carries `tag`.
    pub fn expect(&self, index: u16, tag: CpTag) -> Result<&CpInfo> {
        let cp_info = self.get(index)?;
        if cp_info.tag() == Some(tag) {
            Ok(cp_info)
        } else {
            Err(ClassFileError::UnexpectedConstantPoolEntry {
                index,
                expected: tag.name(),
                found: cp_info.tag_name(),
            })
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&Utf8Info> {
        matches_cp_info!(self, index, Utf8)
    }

    pub fn field_ref(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, FieldRef)
    }

    pub fn class(&self, index: u16) -> Result<&ClassInfo> {
        matches_cp_info!(self, index, Class)
    }

    pub fn name_and_type(&self, index: u16) -> Result<&NameAndTypeInfo> {
        matches_cp_info!(self, index, NameAndType)
    }

    pub fn method_handle(&self, index: u16) -> Result<&MethodHandleInfo> {
        matches_cp_info!(self, index, MethodHandle)
    }

    /// Resolves a UTF-8 entry as text.
    pub fn str(&self, index: u16) -> Result<&str> {
        self.utf8(index)?
            .to_str()
            .ok_or(ClassFileError::InvalidUtf8(index))
    }

    /// Resolves a `Class` entry to its internal binary name.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        let ClassInfo { name_index } = self.class(index)?;
        self.str(*name_index)
    }

    /// Iterates the live slots together with their pool index.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &CpInfo)> {
        self.cp_infos
            .iter()
            .enumerate()
            .map(|(i, cp_info)| ((i + 1) as u16, cp_info))
    }
}
impl Index<u16> for ConstantPool {
    type Output = CpInfo;

    fn index(&self, index: u16) -> &Self::Output {
        &self.cp_infos[index as usize - 1]
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    InvokeDynamic = 18,
}
impl CpTag {
    pub fn name(self) -> &'static str {
        match self {
            CpTag::Utf8 => "Utf8",
            CpTag::Integer => "Integer",
            CpTag::Float => "Float",
            CpTag::Long => "Long",
            CpTag::Double => "Double",
            CpTag::Class => "Class",
            CpTag::String => "String",
            CpTag::FieldRef => "Fieldref",
            CpTag::MethodRef => "Methodref",
            CpTag::InterfaceMethodRef => "InterfaceMethodref",
            CpTag::NameAndType => "NameAndType",
            CpTag::MethodHandle => "MethodHandle",
            CpTag::MethodType => "MethodType",
            CpTag::InvokeDynamic => "InvokeDynamic",
        }
    }

    /// Long and Double entries take up two slots.
    pub fn slot_size(self) -> usize {
        match self {
            CpTag::Long | CpTag::Double => 2,
            _ => 1,
        }
    }
}
impl TryFrom<u8> for CpTag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(CpTag::Utf8),
            3 => Ok(CpTag::Integer),
            4 => Ok(CpTag::Float),
            5 => Ok(CpTag::Long),
            6 => Ok(CpTag::Double),
            7 => Ok(CpTag::Class),
            8 => Ok(CpTag::String),
            9 => Ok(CpTag::FieldRef),
            10 => Ok(CpTag::MethodRef),
            11 => Ok(CpTag::InterfaceMethodRef),
            12 => Ok(CpTag::NameAndType),
            15 => Ok(CpTag::MethodHandle),
            16 => Ok(CpTag::MethodType),
            18 => Ok(CpTag::InvokeDynamic),
            _ => Err(value),
        }
    }
}
impl fmt::Display for CpTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    MethodRef(RefInfo),
    FieldRef(RefInfo),
    Float(f32),
    InterfaceMethodRef(RefInfo),
    Class(ClassInfo),
    NameAndType(NameAndTypeInfo),
    Utf8(Utf8Info),
    String { string_index: u16 },
    InvokeDynamic(InvokeDynamicInfo),
    Integer(i32),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Long(i64),
    Double(f64),
    Unusable,
}
impl CpInfo {
    /// `None` for the placeholder slot behind a Long or Double.
    pub fn tag(&self) -> Option<CpTag> {
        Some(match self {
            CpInfo::MethodRef(_) => CpTag::MethodRef,
            CpInfo::FieldRef(_) => CpTag::FieldRef,
            CpInfo::Float(_) => CpTag::Float,
            CpInfo::InterfaceMethodRef(_) => CpTag::InterfaceMethodRef,
            CpInfo::Class(_) => CpTag::Class,
            CpInfo::NameAndType(_) => CpTag::NameAndType,
            CpInfo::Utf8(_) => CpTag::Utf8,
            CpInfo::String { .. } => CpTag::String,
            CpInfo::InvokeDynamic(_) => CpTag::InvokeDynamic,
            CpInfo::Integer(_) => CpTag::Integer,
            CpInfo::MethodHandle(_) => CpTag::MethodHandle,
            CpInfo::MethodType(_) => CpTag::MethodType,
            CpInfo::Long(_) => CpTag::Long,
            CpInfo::Double(_) => CpTag::Double,
            CpInfo::Unusable => return None,
        })
    }

    pub fn tag_name(&self) -> &'static str {
        self.tag().map_or("unusable slot", CpTag::name)
    }
}

/// A `CONSTANT_Utf8_info` payload.
///
/// The bytes are kept exactly as declared (modified UTF-8), so embedded zero bytes survive.
#[derive(PartialEq, Eq, Clone, Default)]
pub struct Utf8Info {
    bytes: Vec<u8>,
}
impl Utf8Info {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}
impl fmt::Debug for Utf8Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}
impl fmt::Display for Utf8Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
impl From<&str> for Utf8Info {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
