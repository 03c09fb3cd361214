mod annotation;
mod attributes;
mod stack_map;

pub use self::annotation::MAX_ELEMENT_VALUE_DEPTH;

use std::{
    convert::TryFrom,
    io::{self, BufReader, Read},
    mem,
};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    access_flags::MemberKind,
    attributes::AttributeContext,
    class_file::{FieldInfo, MethodInfo},
    constant_pool::{
        ClassInfo, CpTag, InvokeDynamicInfo, MethodHandleInfo, MethodTypeInfo, NameAndTypeInfo,
        RefInfo, Utf8Info,
    },
};

use super::{constant_pool::CpInfo, *};

type Endian = BigEndian;

/// Decodes a class file from a byte source in a single forward pass.
pub struct Parser<R> {
    r: BufReader<R>,
    position: u64,
    version: Version,
    options: ParseOptions,
    diagnostics: Vec<Diagnostic>,
}
impl<R: Read> Parser<R> {
    pub fn new(r: R) -> Self {
        Self::with_options(r, ParseOptions::default())
    }

    pub fn with_options(r: R, options: ParseOptions) -> Self {
        Self {
            r: BufReader::new(r),
            position: 0,
            version: Version::JAVA_1_1,
            options,
            diagnostics: Vec::new(),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let version = self.parse_version()?;
        if version > self.options.max_version {
            log::error!(
                "Class file version {} is newer than {}",
                version,
                self.options.max_version
            );
            return Err(ClassFileError::UnsupportedVersion(version));
        }
        self.version = version;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = self.parse_access_flags(MemberKind::Class)?;
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;

        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r.read_u16_into::<Endian>(&mut interfaces)?;
        self.position += 2 * interfaces_count as u64;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes(&constant_pool, AttributeContext::Class)?;
        log::debug!(
            "Parsed class file {} with {} fields, {} methods and {} attributes",
            version,
            fields.len(),
            methods.len(),
            attributes.len()
        );

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
            grammar: self.options.grammar,
            diagnostics: mem::take(&mut self.diagnostics),
        })
    }

    fn parse_field_info(&mut self, constant_pool: &ConstantPool) -> Result<FieldInfo> {
        let access_flags = self.parse_access_flags(MemberKind::Field)?;
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes(constant_pool, AttributeContext::Field)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self, constant_pool: &ConstantPool) -> Result<MethodInfo> {
        let access_flags = self.parse_access_flags(MemberKind::Method)?;
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes(constant_pool, AttributeContext::Method)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            0xCAFEBABE => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<Version> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok(Version::new(major, minor))
    }

    /// Reads an access flag word, noting any bits that mean nothing for `kind`.
    fn parse_access_flags(&mut self, kind: MemberKind) -> Result<AccessFlags> {
        let bits = self.read_u16()?;
        let undefined = AccessFlags::undefined_bits(bits, kind);
        if undefined != 0 {
            self.diagnose(Diagnostic::UndefinedAccessFlags {
                kind,
                bits: undefined,
            });
        }

        Ok(AccessFlags::from_bits_truncate(bits))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()? as usize;

        let mut res = Vec::with_capacity(constant_pool_count.saturating_sub(1));
        let mut index = 1;
        while index < constant_pool_count {
            let (cp_info, slot_size) = self.parse_cp_info()?;
            if index + slot_size > constant_pool_count {
                log::error!("Constant pool entry #{} overflows the pool", index);
                return Err(ClassFileError::ConstantPoolOverflow(index as u16));
            }

            res.push(cp_info);
            (1..slot_size).for_each(|_| res.push(CpInfo::Unusable));
            index += slot_size;
        }

        log::trace!("Parsed {} constant pool slots", res.len());
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<(CpInfo, usize)> {
        let tag = self.read_u8()?;
        let tag = CpTag::try_from(tag).map_err(|tag| {
            log::error!("Invalid constant pool tag {}", tag);
            ClassFileError::InvalidCpInfoTag(tag)
        })?;

        let cp_info = match tag {
            CpTag::Utf8 => self.parse_utf8()?,
            CpTag::Integer => CpInfo::Integer(self.read_i32()?),
            CpTag::Float => CpInfo::Float(self.read_f32()?),
            CpTag::Long => CpInfo::Long(self.read_i64()?),
            CpTag::Double => CpInfo::Double(self.read_f64()?),
            CpTag::Class => CpInfo::Class(ClassInfo {
                name_index: self.read_u16()?,
            }),
            CpTag::String => CpInfo::String {
                string_index: self.read_u16()?,
            },
            CpTag::FieldRef => CpInfo::FieldRef(self.parse_ref_info()?),
            CpTag::MethodRef => CpInfo::MethodRef(self.parse_ref_info()?),
            CpTag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            CpTag::NameAndType => self.parse_name_and_type_info()?,
            CpTag::MethodHandle => self.parse_method_handle()?,
            CpTag::MethodType => CpInfo::MethodType(MethodTypeInfo {
                descriptor_index: self.read_u16()?,
            }),
            CpTag::InvokeDynamic => self.parse_invoke_dynamic_info()?,
        };

        Ok((cp_info, tag.slot_size()))
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let bytes = self.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(Utf8Info::new(bytes)))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<CpInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(CpInfo::InvokeDynamic(InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        }))
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn diagnose(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn read_u32(&mut self) -> Result<u32> {
        let value = self.r.read_u32::<Endian>()?;
        self.position += 4;
        Ok(value)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let value = self.r.read_u16::<Endian>()?;
        self.position += 2;
        Ok(value)
    }

    fn read_u8(&mut self) -> Result<u8> {
        let value = self.r.read_u8()?;
        self.position += 1;
        Ok(value)
    }

    fn read_i32(&mut self) -> Result<i32> {
        let value = self.r.read_i32::<Endian>()?;
        self.position += 4;
        Ok(value)
    }

    fn read_i64(&mut self) -> Result<i64> {
        let value = self.r.read_i64::<Endian>()?;
        self.position += 8;
        Ok(value)
    }

    fn read_f32(&mut self) -> Result<f32> {
        let value = self.r.read_f32::<Endian>()?;
        self.position += 4;
        Ok(value)
    }

    fn read_f64(&mut self) -> Result<f64> {
        let value = self.r.read_f64::<Endian>()?;
        self.position += 8;
        Ok(value)
    }

    /// Reads exactly `len` bytes without trusting `len` for the allocation up front.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.r.by_ref().take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        self.position += len as u64;
        Ok(bytes)
    }

    fn skip(&mut self, len: u64) -> Result<()> {
        let skipped = io::copy(&mut self.r.by_ref().take(len), &mut io::sink())?;
        if skipped != len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        self.position += len;
        Ok(())
    }
}

#[cfg(test)]
mod parse_magic_identifier_tests {
    use super::*;

    #[test]
    fn it_should_be_able_to_parse_the_correct_identifier() {
        assert!(Parser::new(&[0xca, 0xfe, 0xba, 0xbe][..])
            .parse_magic_identifier()
            .is_ok());
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        assert!(matches!(
            Parser::new(&[0xca, 0xfe, 0xba][..]).parse_magic_identifier(),
            Err(ClassFileError::IOError(_))
        ));
    }

    #[test]
    fn it_should_fail_if_the_magic_identifier_is_incorrect() {
        assert!(matches!(
            Parser::new(&[0xca, 0xfe, 0xba, 0xbf][..]).parse_magic_identifier(),
            Err(ClassFileError::InvalidMagicIdentifier(0xCAFEBABF))
        ));
    }
}
