use std::io::Read;

use crate::{
    attributes::{
        Annotation, ElementValue, ElementValuePair, LocalVarTarget, TargetInfo, TypeAnnotation,
        TypePathEntry,
    },
    descriptor, ClassFileError, ConstantPool, Grammar, Result,
};

use super::Parser;

/// Deepest run of nested arrays and annotations an element value may hold.
pub const MAX_ELEMENT_VALUE_DEPTH: usize = 64;

impl<R: Read> Parser<R> {
    pub(super) fn parse_annotations(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<Annotation>> {
        let num_annotations = self.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_annotation(constant_pool, 0))
            .collect()
    }

    pub(super) fn parse_parameter_annotations(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<Vec<Annotation>>> {
        let num_parameters = self.read_u8()?;
        (0..num_parameters)
            .map(|_| self.parse_annotations(constant_pool))
            .collect()
    }

    /// Reads an annotation whose element values sit `depth` levels deep.
    fn parse_annotation(
        &mut self,
        constant_pool: &ConstantPool,
        depth: usize,
    ) -> Result<Annotation> {
        let type_index = self.read_u16()?;
        self.check_field_descriptor(constant_pool, type_index)?;

        let num_element_value_pairs = self.read_u16()?;
        let element_value_pairs = (0..num_element_value_pairs)
            .map(|_| {
                let element_name_index = self.read_u16()?;
                self.check_element_name(constant_pool, element_name_index)?;
                let value = self.parse_nested_element_value(constant_pool, depth)?;

                Ok(ElementValuePair {
                    element_name_index,
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Annotation {
            type_index,
            element_value_pairs,
        })
    }

    pub(super) fn parse_element_value(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<ElementValue> {
        self.parse_nested_element_value(constant_pool, 0)
    }

    fn parse_nested_element_value(
        &mut self,
        constant_pool: &ConstantPool,
        depth: usize,
    ) -> Result<ElementValue> {
        if depth > MAX_ELEMENT_VALUE_DEPTH {
            log::error!(
                "Element value nested more than {} levels deep",
                MAX_ELEMENT_VALUE_DEPTH
            );
            return Err(ClassFileError::ElementValueTooDeep(MAX_ELEMENT_VALUE_DEPTH));
        }

        let tag = self.read_u8()?;

        Ok(match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
                let const_value_index = self.read_u16()?;
                ElementValue::check_constant(
                    tag,
                    const_value_index,
                    constant_pool,
                    self.options.grammar,
                )?;

                ElementValue::Const {
                    tag,
                    const_value_index,
                }
            }
            b'e' => {
                let type_name_index = self.read_u16()?;
                self.check_field_descriptor(constant_pool, type_name_index)?;
                let const_name_index = self.parse_utf8_index(constant_pool)?;

                ElementValue::Enum {
                    type_name_index,
                    const_name_index,
                }
            }
            b'c' => {
                let class_info_index = self.read_u16()?;
                let class_info = constant_pool.utf8(class_info_index)?;
                if !self
                    .options
                    .grammar
                    .is_return_descriptor(class_info.as_bytes())
                {
                    return Err(ClassFileError::InvalidDescriptor {
                        index: class_info_index,
                        descriptor: class_info.to_string(),
                    });
                }

                ElementValue::Class { class_info_index }
            }
            b'@' => ElementValue::Annotation(self.parse_annotation(constant_pool, depth + 1)?),
            b'[' => {
                let num_values = self.read_u16()?;
                ElementValue::Array(
                    (0..num_values)
                        .map(|_| self.parse_nested_element_value(constant_pool, depth + 1))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            _ => {
                log::error!("Invalid element value tag {:#04X}", tag);
                return Err(ClassFileError::InvalidElementValueTag(tag));
            }
        })
    }

    pub(super) fn parse_type_annotations(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<TypeAnnotation>> {
        let num_annotations = self.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_type_annotation(constant_pool))
            .collect()
    }

    fn parse_type_annotation(&mut self, constant_pool: &ConstantPool) -> Result<TypeAnnotation> {
        let target_type = self.read_u8()?;
        let target_info = self.parse_target_info(target_type)?;

        let path_length = self.read_u8()?;
        let target_path = self
            .read_bytes(path_length as usize * 2)?
            .chunks_exact(2)
            .map(|step| TypePathEntry {
                type_path_kind: step[0],
                type_argument_index: step[1],
            })
            .collect();

        let annotation = self.parse_annotation(constant_pool, 0)?;

        Ok(TypeAnnotation {
            target_type,
            target_info,
            target_path,
            annotation,
        })
    }

    fn parse_target_info(&mut self, target_type: u8) -> Result<TargetInfo> {
        Ok(match target_type {
            0x00 | 0x01 => TargetInfo::TypeParameter {
                type_parameter_index: self.read_u8()?,
            },
            0x10 => TargetInfo::Supertype {
                supertype_index: self.read_u16()?,
            },
            0x11 | 0x12 => TargetInfo::TypeParameterBound {
                type_parameter_index: self.read_u8()?,
                bound_index: self.read_u8()?,
            },
            0x13..=0x15 => TargetInfo::Empty,
            0x16 => TargetInfo::FormalParameter {
                formal_parameter_index: self.read_u8()?,
            },
            0x17 => TargetInfo::Throws {
                throws_type_index: self.read_u16()?,
            },
            0x40 | 0x41 => {
                let table_length = self.read_u16()?;
                TargetInfo::LocalVar(
                    (0..table_length)
                        .map(|_| {
                            Ok(LocalVarTarget {
                                start_pc: self.read_u16()?,
                                length: self.read_u16()?,
                                index: self.read_u16()?,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            0x42 => TargetInfo::Catch {
                exception_table_index: self.read_u16()?,
            },
            0x43..=0x46 => TargetInfo::Offset {
                offset: self.read_u16()?,
            },
            0x47..=0x4B => TargetInfo::TypeArgument {
                offset: self.read_u16()?,
                type_argument_index: self.read_u8()?,
            },
            _ => {
                log::error!("Invalid type annotation target type 0x{:02X}", target_type);
                return Err(ClassFileError::InvalidTargetType(target_type));
            }
        })
    }

    fn check_field_descriptor(&self, constant_pool: &ConstantPool, index: u16) -> Result<()> {
        let utf8 = constant_pool.utf8(index)?;
        if self.options.grammar.is_field_descriptor(utf8.as_bytes()) {
            Ok(())
        } else {
            Err(ClassFileError::InvalidDescriptor {
                index,
                descriptor: utf8.to_string(),
            })
        }
    }

    fn check_element_name(&self, constant_pool: &ConstantPool, index: u16) -> Result<()> {
        let name = constant_pool.utf8(index)?;
        let valid = match self.options.grammar {
            Grammar::Strict => Grammar::Strict.is_field_descriptor(name.as_bytes()),
            Grammar::Lenient => descriptor::is_unqualified_name(name.as_bytes()),
        };

        if valid {
            Ok(())
        } else {
            Err(ClassFileError::InvalidConstantPoolEntry {
                index,
                message: format!("{:?} is not a valid element name", name),
            })
        }
    }
}


#[cfg(test)]
mod parse_type_annotation_tests {
    use super::*;
    use crate::constant_pool::CpInfo;

    fn constant_pool() -> ConstantPool {
        ConstantPool::new(vec![CpInfo::Utf8("Ljavax/annotation/Nonnull;".into())])
    }

    #[test]
    fn it_should_decode_a_local_variable_target() {
        let bytes = [
            0x2, 0x00, // count
            0x40, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x02, // localvar target
            0x01, 0x03, 0x00, // type path
            0x00, 0x01, 0x00, 0x00, // annotation
            0x14, 0x00, 0x00, 0x01, 0x00, 0x00, // empty target, no path
        ];
        let annotations = Parser::new(&bytes[1..])
            .parse_type_annotations(&constant_pool())
            .unwrap();

        assert_eq!(annotations.len(), 2);
        assert_eq!(
            annotations[0].target_info,
            TargetInfo::LocalVar(vec![LocalVarTarget {
                start_pc: 0,
                length: 5,
                index: 2
            }])
        );
        assert_eq!(
            annotations[0].target_path,
            vec![TypePathEntry {
                type_path_kind: 3,
                type_argument_index: 0
            }]
        );
        assert_eq!(annotations[1].target_info, TargetInfo::Empty);
    }

    #[test]
    fn it_should_reject_unknown_target_types() {
        let bytes = [0x00, 0x01, 0x30, 0x00];
        assert!(matches!(
            Parser::new(&bytes[..]).parse_type_annotations(&constant_pool()),
            Err(ClassFileError::InvalidTargetType(0x30))
        ));
    }
}
