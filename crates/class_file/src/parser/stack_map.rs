use std::io::Read;

use crate::{
    attributes::{StackMapFrame, VerificationTypeInfo},
    constant_pool::CpTag,
    ClassFileError, ConstantPool, Diagnostic, Result,
};

use super::Parser;

impl<R: Read> Parser<R> {
    pub(super) fn parse_stack_map_table(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<StackMapFrame>> {
        let number_of_entries = self.read_u16()?;
        (0..number_of_entries)
            .map(|entry| self.parse_stack_map_frame(constant_pool, entry))
            .collect()
    }

    fn parse_stack_map_frame(
        &mut self,
        constant_pool: &ConstantPool,
        entry: u16,
    ) -> Result<StackMapFrame> {
        let frame_type = self.read_u8()?;

        Ok(match frame_type {
            0..=63 => StackMapFrame::Same {
                offset_delta: frame_type as u16,
            },
            64..=127 => StackMapFrame::SameLocals1StackItem {
                offset_delta: (frame_type - 64) as u16,
                stack: self.parse_verification_type_info(constant_pool)?,
            },
            247 => StackMapFrame::SameLocals1StackItemExtended {
                offset_delta: self.read_u16()?,
                stack: self.parse_verification_type_info(constant_pool)?,
            },
            248..=250 => StackMapFrame::Chop {
                k: 251 - frame_type,
                offset_delta: self.read_u16()?,
            },
            251 => StackMapFrame::SameExtended {
                offset_delta: self.read_u16()?,
            },
            252..=254 => {
                let offset_delta = self.read_u16()?;
                let locals = (0..frame_type - 251)
                    .map(|_| self.parse_verification_type_info(constant_pool))
                    .collect::<Result<Vec<_>>>()?;

                StackMapFrame::Append {
                    offset_delta,
                    locals,
                }
            }
            255 => {
                let offset_delta = self.read_u16()?;
                let number_of_locals = self.read_u16()?;
                let locals = (0..number_of_locals)
                    .map(|_| self.parse_verification_type_info(constant_pool))
                    .collect::<Result<Vec<_>>>()?;
                let number_of_stack_items = self.read_u16()?;
                let stack = (0..number_of_stack_items)
                    .map(|_| self.parse_verification_type_info(constant_pool))
                    .collect::<Result<Vec<_>>>()?;

                StackMapFrame::Full {
                    offset_delta,
                    locals,
                    stack,
                }
            }
            _ => {
                self.diagnose(Diagnostic::UnknownFrameType { frame_type, entry });
                return Err(ClassFileError::UnknownFrameType(frame_type));
            }
        })
    }

    fn parse_verification_type_info(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<VerificationTypeInfo> {
        let tag = self.read_u8()?;

        Ok(match tag {
            0 => VerificationTypeInfo::Top,
            1 => VerificationTypeInfo::Integer,
            2 => VerificationTypeInfo::Float,
            3 => VerificationTypeInfo::Double,
            4 => VerificationTypeInfo::Long,
            5 => VerificationTypeInfo::Null,
            6 => VerificationTypeInfo::UninitializedThis,
            7 => {
                let cpool_index = self.read_u16()?;
                constant_pool.expect(cpool_index, CpTag::Class)?;
                VerificationTypeInfo::Object { cpool_index }
            }
            8 => VerificationTypeInfo::Uninitialized {
                offset: self.read_u16()?,
            },
            _ => {
                log::error!("Invalid verification type tag {}", tag);
                return Err(ClassFileError::InvalidVerificationTypeTag(tag));
            }
        })
    }
}

#[cfg(test)]
mod parse_stack_map_tests {
    use super::*;
    use crate::{
        attributes::{AttributeContext, AttributeInfo},
        constant_pool::{ClassInfo, CpInfo},
        Version,
    };

    fn constant_pool() -> ConstantPool {
        ConstantPool::new(vec![
            CpInfo::Utf8("java/lang/String".into()),
            CpInfo::Class(ClassInfo { name_index: 1 }),
            CpInfo::Utf8("StackMapTable".into()),
            CpInfo::Utf8("LineNumberTable".into()),
        ])
    }

    #[test]
    fn it_should_decode_every_frame_shape() {
        let bytes = [
            0x00, 0x07, // entries
            0x05, // same
            0x41, 0x01, // same locals 1 stack item, int
            0xf7, 0x01, 0x00, 0x07, 0x00, 0x02, // extended, String
            0xf9, 0x00, 0x03, // chop 2
            0xfb, 0x00, 0x04, // same extended
            0xfc, 0x00, 0x02, 0x04, // append long
            0xff, 0x00, 0x01, 0x00, 0x01, 0x06, 0x00, 0x01, 0x08, 0x00, 0x00, // full
        ];
        let frames = Parser::new(&bytes[..])
            .parse_stack_map_table(&constant_pool())
            .unwrap();

        assert_eq!(
            frames,
            vec![
                StackMapFrame::Same { offset_delta: 5 },
                StackMapFrame::SameLocals1StackItem {
                    offset_delta: 1,
                    stack: VerificationTypeInfo::Integer
                },
                StackMapFrame::SameLocals1StackItemExtended {
                    offset_delta: 256,
                    stack: VerificationTypeInfo::Object { cpool_index: 2 }
                },
                StackMapFrame::Chop {
                    k: 2,
                    offset_delta: 3
                },
                StackMapFrame::SameExtended { offset_delta: 4 },
                StackMapFrame::Append {
                    offset_delta: 2,
                    locals: vec![VerificationTypeInfo::Long]
                },
                StackMapFrame::Full {
                    offset_delta: 1,
                    locals: vec![VerificationTypeInfo::UninitializedThis],
                    stack: vec![VerificationTypeInfo::Uninitialized { offset: 0 }]
                },
            ]
        );
    }

    #[test]
    fn it_should_reject_objects_that_are_not_classes() {
        let bytes = [0x00, 0x01, 0x40, 0x07, 0x00, 0x01];
        assert!(matches!(
            Parser::new(&bytes[..]).parse_stack_map_table(&constant_pool()),
            Err(ClassFileError::UnexpectedConstantPoolEntry { index: 1, .. })
        ));
    }

    #[test]
    fn it_should_reject_unknown_verification_tags() {
        let bytes = [0x00, 0x01, 0x40, 0x09];
        assert!(matches!(
            Parser::new(&bytes[..]).parse_stack_map_table(&constant_pool()),
            Err(ClassFileError::InvalidVerificationTypeTag(9))
        ));
    }

    #[test]
    fn it_should_skip_a_table_with_a_reserved_frame_type() {
        let bytes = [
            0x00, 0x02, // attributes
            0x00, 0x03, 0x00, 0x00, 0x00, 0x05, // StackMapTable, 5 bytes
            0x00, 0x02, 0x00, 0x80, 0x00, // second frame uses a reserved type
            0x00, 0x04, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, // LineNumberTable follows
        ];
        let mut parser = Parser::new(&bytes[..]);
        parser.version = Version::JAVA_8;

        let attributes = parser
            .parse_attributes(&constant_pool(), AttributeContext::Code)
            .unwrap();

        assert_eq!(attributes.0[0].info, AttributeInfo::Unrecognized);
        assert_eq!(attributes.0[1].info, AttributeInfo::LineNumberTable(vec![]));
        assert_eq!(
            parser.diagnostics,
            vec![Diagnostic::UnknownFrameType {
                frame_type: 128,
                entry: 1
            }]
        );
    }
}
