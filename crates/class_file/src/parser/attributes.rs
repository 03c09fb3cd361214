use std::io::Read;

use crate::{
    access_flags::MemberKind,
    attributes::{
        dispatch::{self, Lookup},
        Attribute, AttributeContext, AttributeInfo, AttributeKind, Attributes, BootstrapMethod,
        CodeAttribute, ExceptionTableEntry, InnerClass, LineNumber, LocalVariable,
        LocalVariableType, MethodParameter,
    },
    constant_pool::{CpInfo, CpTag},
    ClassFileError, ConstantPool, Diagnostic, Result,
};

use super::Parser;

impl<R: Read> Parser<R> {
    pub(super) fn parse_attributes(
        &mut self,
        constant_pool: &ConstantPool,
        context: AttributeContext,
    ) -> Result<Attributes> {
        let attributes_count = self.read_u16()?;
        (0..attributes_count)
            .map(|_| self.parse_attribute(constant_pool, context))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    fn parse_attribute(
        &mut self,
        constant_pool: &ConstantPool,
        context: AttributeContext,
    ) -> Result<Attribute> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let name = match constant_pool.get(attribute_name_index) {
            Ok(CpInfo::Utf8(name)) => name,
            _ => {
                log::error!(
                    "Attribute name #{} is not a Utf8 entry",
                    attribute_name_index
                );
                return Err(ClassFileError::UnresolvableAttributeName(
                    attribute_name_index,
                ));
            }
        };

        let info = match dispatch::lookup(context, name.as_bytes(), self.version) {
            Lookup::Decode(kind) => self.decode_attribute(constant_pool, kind, attribute_length)?,
            Lookup::TooNew { kind, since } => {
                self.diagnose(Diagnostic::AttributeTooNew {
                    name: kind.name(),
                    since,
                    version: self.version,
                });
                self.skip(attribute_length as u64)?;
                AttributeInfo::Unrecognized
            }
            Lookup::Unrecognized => {
                self.diagnose(Diagnostic::UnrecognizedAttribute {
                    name: name.to_string(),
                    context,
                    length: attribute_length,
                });
                self.skip(attribute_length as u64)?;
                AttributeInfo::Unrecognized
            }
        };

        Ok(Attribute {
            attribute_name_index,
            attribute_length,
            info,
        })
    }

    /// Runs the decoder for `kind` and leaves the stream at the end of the attribute.
    fn decode_attribute(
        &mut self,
        constant_pool: &ConstantPool,
        kind: AttributeKind,
        length: u32,
    ) -> Result<AttributeInfo> {
        let start = self.position;
        let info = match self.parse_attribute_info(constant_pool, kind, length) {
            Err(ClassFileError::UnknownFrameType(_)) => {
                let consumed = self.position - start;
                self.skip((length as u64).saturating_sub(consumed))?;
                return Ok(AttributeInfo::Unrecognized);
            }
            result => result?,
        };

        let consumed = self.position - start;
        if consumed != length as u64 {
            self.diagnose(Diagnostic::AttributeLengthDrift {
                name: kind.name(),
                declared: length,
                consumed,
            });
            if consumed < length as u64 {
                self.skip(length as u64 - consumed)?;
            }
        }

        Ok(info)
    }

    fn parse_attribute_info(
        &mut self,
        constant_pool: &ConstantPool,
        kind: AttributeKind,
        length: u32,
    ) -> Result<AttributeInfo> {
        log::trace!("Decoding {} attribute ({} bytes)", kind.name(), length);

        Ok(match kind {
            AttributeKind::ConstantValue => {
                let constant_value_index = self.read_u16()?;
                constant_pool.get(constant_value_index)?;
                AttributeInfo::ConstantValue {
                    constant_value_index,
                }
            }
            AttributeKind::Code => AttributeInfo::Code(self.parse_code_attribute(constant_pool)?),
            AttributeKind::StackMapTable => {
                AttributeInfo::StackMapTable(self.parse_stack_map_table(constant_pool)?)
            }
            AttributeKind::Exceptions => {
                AttributeInfo::Exceptions(self.parse_exceptions(constant_pool)?)
            }
            AttributeKind::InnerClasses => {
                AttributeInfo::InnerClasses(self.parse_inner_classes(constant_pool)?)
            }
            AttributeKind::EnclosingMethod => self.parse_enclosing_method(constant_pool)?,
            AttributeKind::Synthetic => AttributeInfo::Synthetic,
            AttributeKind::Signature => AttributeInfo::Signature {
                signature_index: self.parse_utf8_index(constant_pool)?,
            },
            AttributeKind::SourceFile => AttributeInfo::SourceFile {
                sourcefile_index: self.parse_utf8_index(constant_pool)?,
            },
            AttributeKind::SourceDebugExtension => {
                AttributeInfo::SourceDebugExtension(self.read_bytes(length as usize)?)
            }
            AttributeKind::LineNumberTable => {
                AttributeInfo::LineNumberTable(self.parse_line_number_table()?)
            }
            AttributeKind::LocalVariableTable => {
                AttributeInfo::LocalVariableTable(self.parse_local_variable_table(constant_pool)?)
            }
            AttributeKind::LocalVariableTypeTable => AttributeInfo::LocalVariableTypeTable(
                self.parse_local_variable_type_table(constant_pool)?,
            ),
            AttributeKind::Deprecated => AttributeInfo::Deprecated,
            AttributeKind::RuntimeVisibleAnnotations => {
                AttributeInfo::RuntimeVisibleAnnotations(self.parse_annotations(constant_pool)?)
            }
            AttributeKind::RuntimeInvisibleAnnotations => {
                AttributeInfo::RuntimeInvisibleAnnotations(self.parse_annotations(constant_pool)?)
            }
            AttributeKind::RuntimeVisibleParameterAnnotations => {
                AttributeInfo::RuntimeVisibleParameterAnnotations(
                    self.parse_parameter_annotations(constant_pool)?,
                )
            }
            AttributeKind::RuntimeInvisibleParameterAnnotations => {
                AttributeInfo::RuntimeInvisibleParameterAnnotations(
                    self.parse_parameter_annotations(constant_pool)?,
                )
            }
            AttributeKind::AnnotationDefault => {
                AttributeInfo::AnnotationDefault(self.parse_element_value(constant_pool)?)
            }
            AttributeKind::BootstrapMethods => {
                AttributeInfo::BootstrapMethods(self.parse_bootstrap_methods(constant_pool)?)
            }
            AttributeKind::MethodParameters => {
                AttributeInfo::MethodParameters(self.parse_method_parameters(constant_pool)?)
            }
            AttributeKind::RuntimeVisibleTypeAnnotations => {
                AttributeInfo::RuntimeVisibleTypeAnnotations(
                    self.parse_type_annotations(constant_pool)?,
                )
            }
            AttributeKind::RuntimeInvisibleTypeAnnotations => {
                AttributeInfo::RuntimeInvisibleTypeAnnotations(
                    self.parse_type_annotations(constant_pool)?,
                )
            }
        })
    }

    fn parse_code_attribute(&mut self, constant_pool: &ConstantPool) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        if code_length == 0 || code_length > u16::MAX as u32 {
            log::error!("Code length {} is out of range", code_length);
            return Err(ClassFileError::InvalidCodeLength(code_length));
        }
        let code = self.read_bytes(code_length as usize)?;

        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry(constant_pool))
            .collect::<Result<Vec<_>>>()?;
        let attributes = self.parse_attributes(constant_pool, AttributeContext::Code)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;
        if catch_type != 0 {
            constant_pool.expect(catch_type, CpTag::Class)?;
        }

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_exceptions(&mut self, constant_pool: &ConstantPool) -> Result<Vec<u16>> {
        let number_of_exceptions = self.read_u16()?;
        (0..number_of_exceptions)
            .map(|_| self.parse_class_index(constant_pool))
            .collect()
    }

    fn parse_inner_classes(&mut self, constant_pool: &ConstantPool) -> Result<Vec<InnerClass>> {
        let number_of_classes = self.read_u16()?;
        (0..number_of_classes)
            .map(|_| {
                let inner_class_info_index = self.parse_class_index(constant_pool)?;
                let outer_class_info_index = self.parse_optional_index(constant_pool, CpTag::Class)?;
                let inner_name_index = self.parse_optional_index(constant_pool, CpTag::Utf8)?;
                let inner_class_access_flags = self.parse_access_flags(MemberKind::NestedClass)?;

                Ok(InnerClass {
                    inner_class_info_index,
                    outer_class_info_index,
                    inner_name_index,
                    inner_class_access_flags,
                })
            })
            .collect()
    }

    fn parse_enclosing_method(&mut self, constant_pool: &ConstantPool) -> Result<AttributeInfo> {
        let class_index = self.parse_class_index(constant_pool)?;
        let method_index = self.parse_optional_index(constant_pool, CpTag::NameAndType)?;

        Ok(AttributeInfo::EnclosingMethod {
            class_index,
            method_index,
        })
    }

    fn parse_line_number_table(&mut self) -> Result<Vec<LineNumber>> {
        let line_number_table_length = self.read_u16()?;
        (0..line_number_table_length)
            .map(|_| {
                Ok(LineNumber {
                    start_pc: self.read_u16()?,
                    line_number: self.read_u16()?,
                })
            })
            .collect()
    }

    fn parse_local_variable_table(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<LocalVariable>> {
        let local_variable_table_length = self.read_u16()?;
        (0..local_variable_table_length)
            .map(|_| {
                Ok(LocalVariable {
                    start_pc: self.read_u16()?,
                    length: self.read_u16()?,
                    name_index: self.parse_utf8_index(constant_pool)?,
                    descriptor_index: self.parse_utf8_index(constant_pool)?,
                    index: self.read_u16()?,
                })
            })
            .collect()
    }

    fn parse_local_variable_type_table(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<LocalVariableType>> {
        let local_variable_type_table_length = self.read_u16()?;
        (0..local_variable_type_table_length)
            .map(|_| {
                Ok(LocalVariableType {
                    start_pc: self.read_u16()?,
                    length: self.read_u16()?,
                    name_index: self.parse_utf8_index(constant_pool)?,
                    signature_index: self.parse_utf8_index(constant_pool)?,
                    index: self.read_u16()?,
                })
            })
            .collect()
    }

    fn parse_bootstrap_methods(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<BootstrapMethod>> {
        let num_bootstrap_methods = self.read_u16()?;
        (0..num_bootstrap_methods)
            .map(|_| {
                let bootstrap_method_ref = self.read_u16()?;
                constant_pool.expect(bootstrap_method_ref, CpTag::MethodHandle)?;
                let num_bootstrap_arguments = self.read_u16()?;
                let bootstrap_arguments = (0..num_bootstrap_arguments)
                    .map(|_| {
                        let argument = self.read_u16()?;
                        constant_pool.get(argument)?;
                        Ok(argument)
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(BootstrapMethod {
                    bootstrap_method_ref,
                    bootstrap_arguments,
                })
            })
            .collect()
    }

    fn parse_method_parameters(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<MethodParameter>> {
        let parameters_count = self.read_u8()?;
        (0..parameters_count)
            .map(|_| {
                Ok(MethodParameter {
                    name_index: self.parse_optional_index(constant_pool, CpTag::Utf8)?,
                    access_flags: self.parse_access_flags(MemberKind::Parameter)?,
                })
            })
            .collect()
    }

    fn parse_class_index(&mut self, constant_pool: &ConstantPool) -> Result<u16> {
        let index = self.read_u16()?;
        constant_pool.expect(index, CpTag::Class)?;
        Ok(index)
    }

    pub(super) fn parse_utf8_index(&mut self, constant_pool: &ConstantPool) -> Result<u16> {
        let index = self.read_u16()?;
        constant_pool.expect(index, CpTag::Utf8)?;
        Ok(index)
    }

    /// Reads an index that is either zero or points at an entry tagged `tag`.
    fn parse_optional_index(&mut self, constant_pool: &ConstantPool, tag: CpTag) -> Result<u16> {
        let index = self.read_u16()?;
        if index != 0 {
            constant_pool.expect(index, tag)?;
        }
        Ok(index)
    }
}

#[cfg(test)]
mod parse_attribute_tests {
    use super::*;
    use crate::{constant_pool::ClassInfo, Version};

    fn constant_pool() -> ConstantPool {
        ConstantPool::new(vec![
            CpInfo::Utf8("Code".into()),
            CpInfo::Utf8("LineNumberTable".into()),
            CpInfo::Utf8("org.vendor.Private".into()),
            CpInfo::Utf8("java/lang/Exception".into()),
            CpInfo::Class(ClassInfo { name_index: 4 }),
            CpInfo::Utf8("StackMapTable".into()),
            CpInfo::Utf8("SourceFile".into()),
        ])
    }

    fn code_attribute(code_length: u32) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x01];
        bytes.extend_from_slice(&(12 + code_length).to_be_bytes());
        bytes.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        bytes.extend_from_slice(&code_length.to_be_bytes());
        bytes.extend(std::iter::repeat(0xb1).take(code_length as usize));
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        bytes
    }

    fn parse(bytes: &[u8], context: AttributeContext) -> Result<Attribute> {
        let mut parser = Parser::new(bytes);
        parser.version = Version::JAVA_8;
        parser.parse_attribute(&constant_pool(), context)
    }

    #[test]
    fn it_should_reject_an_empty_code_body() {
        assert!(matches!(
            parse(&code_attribute(0), AttributeContext::Method),
            Err(ClassFileError::InvalidCodeLength(0))
        ));
    }

    #[test]
    fn it_should_accept_the_largest_code_body() {
        let attribute = parse(&code_attribute(65535), AttributeContext::Method).unwrap();
        match attribute.info {
            AttributeInfo::Code(code) => assert_eq!(code.code.len(), 65535),
            info => panic!("unexpected attribute: {:?}", info),
        }
    }

    #[test]
    fn it_should_reject_a_code_body_past_the_limit() {
        assert!(matches!(
            parse(&code_attribute(65536), AttributeContext::Method),
            Err(ClassFileError::InvalidCodeLength(65536))
        ));
    }

    #[test]
    fn it_should_skip_an_unrecognized_attribute() {
        let bytes = [0x00, 0x03, 0x00, 0x00, 0x00, 0x03, 0xde, 0xad, 0xbe, 0x00];
        let mut parser = Parser::new(&bytes[..]);
        parser.version = Version::JAVA_8;
        let attribute = parser
            .parse_attribute(&constant_pool(), AttributeContext::Field)
            .unwrap();

        assert_eq!(attribute.info, AttributeInfo::Unrecognized);
        assert_eq!(attribute.attribute_length, 3);
        assert_eq!(parser.position, 9);
        assert_eq!(parser.read_u8().unwrap(), 0x00);
    }

    #[test]
    fn it_should_skip_an_attribute_outside_its_context() {
        let attribute = parse(&code_attribute(1), AttributeContext::Class).unwrap();
        assert_eq!(attribute.info, AttributeInfo::Unrecognized);
    }

    #[test]
    fn it_should_skip_an_attribute_that_is_too_new() {
        let bytes = [0x00, 0x06, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00];
        let mut parser = Parser::new(&bytes[..]);
        parser.version = Version::JAVA_5;
        let attribute = parser
            .parse_attribute(&constant_pool(), AttributeContext::Code)
            .unwrap();

        assert_eq!(attribute.info, AttributeInfo::Unrecognized);
        assert!(matches!(
            parser.diagnostics[0],
            Diagnostic::AttributeTooNew {
                name: "StackMapTable",
                ..
            }
        ));
    }

    #[test]
    fn it_should_fail_on_an_unresolvable_name() {
        assert!(matches!(
            parse(&[0x00, 0x05, 0x00, 0x00, 0x00, 0x00], AttributeContext::Class),
            Err(ClassFileError::UnresolvableAttributeName(5))
        ));
        assert!(matches!(
            parse(&[0x00, 0x63, 0x00, 0x00, 0x00, 0x00], AttributeContext::Class),
            Err(ClassFileError::UnresolvableAttributeName(0x63))
        ));
    }

    #[test]
    fn it_should_decode_nested_code_attributes() {
        let bytes = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x21, // Code, 33 bytes
            0x00, 0x02, 0x00, 0x01, // max stack, max locals
            0x00, 0x00, 0x00, 0x01, 0xb1, // code
            0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05, // exception table
            0x00, 0x01, // attributes
            0x00, 0x02, 0x00, 0x00, 0x00, 0x06, 0x00, 0x01, 0x00, 0x00, 0x00, 0x07,
        ];
        let attribute = parse(&bytes, AttributeContext::Method).unwrap();
        let AttributeInfo::Code(code) = attribute.info else {
            panic!("expected a code attribute");
        };

        assert_eq!(code.max_stack, 2);
        assert_eq!(code.exception_table[0].catch_type, 5);
        assert_eq!(
            code.attributes.0[0].info,
            AttributeInfo::LineNumberTable(vec![LineNumber {
                start_pc: 0,
                line_number: 7
            }])
        );
    }

    #[test]
    fn it_should_check_catch_types_while_decoding() {
        let bytes = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x15, // Code
            0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0xb1, // header and code
            0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04, // catch type #4 is Utf8
            0x00, 0x00,
        ];
        assert!(matches!(
            parse(&bytes, AttributeContext::Method),
            Err(ClassFileError::UnexpectedConstantPoolEntry { index: 4, .. })
        ));
    }

    #[test]
    fn it_should_skip_trailing_bytes_and_note_the_drift() {
        // SourceFile declaring four bytes where two are expected
        let bytes = [0x00, 0x07, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01, 0xff, 0xff, 0x2a];
        let mut parser = Parser::new(&bytes[..]);
        parser.version = Version::JAVA_8;
        let attribute = parser
            .parse_attribute(&constant_pool(), AttributeContext::Class)
            .unwrap();

        assert_eq!(
            attribute.info,
            AttributeInfo::SourceFile {
                sourcefile_index: 1
            }
        );
        assert!(matches!(
            parser.diagnostics[0],
            Diagnostic::AttributeLengthDrift {
                declared: 4,
                consumed: 2,
                ..
            }
        ));
        assert_eq!(parser.read_u8().unwrap(), 0x2a);
    }
}
