use crate::{
    attributes::{AttributeInfo, AttributeKind, Attributes, CodeAttribute, InnerClass},
    AccessFlags, ClassFile, ClassFileError, ConstantPool, CpTag, FieldInfo, MethodInfo, Result,
    Utf8Info, Version,
};

/// Checks access flag combinations, descriptors, attribute lengths and the layout rules of
/// individual attributes.
pub fn validate_structure(class_file: &ClassFile) -> Result<()> {
    check_class_flags(class_file.access_flags)?;
    for field in &class_file.fields {
        check_field(class_file, field)?;
    }
    for method in &class_file.methods {
        check_method(class_file, method)?;
    }

    check_attributes(class_file, &class_file.attributes)
}

fn invalid_flags(location: impl Into<String>, message: &'static str) -> ClassFileError {
    ClassFileError::InvalidAccessFlags {
        location: location.into(),
        message,
    }
}

fn check_class_flags(flags: AccessFlags) -> Result<()> {
    if flags.contains(AccessFlags::INTERFACE) {
        if !flags.contains(AccessFlags::ABSTRACT) {
            return Err(invalid_flags("class", "an interface must be abstract"));
        }
        if flags.intersects(AccessFlags::FINAL | AccessFlags::SUPER | AccessFlags::ENUM) {
            return Err(invalid_flags(
                "class",
                "an interface must not be final, super or enum",
            ));
        }
    } else {
        if flags.contains(AccessFlags::ANNOTATION) {
            return Err(invalid_flags(
                "class",
                "an annotation type must be an interface",
            ));
        }
        if flags.contains(AccessFlags::FINAL | AccessFlags::ABSTRACT) {
            return Err(invalid_flags(
                "class",
                "a class must not be both final and abstract",
            ));
        }
    }

    Ok(())
}

fn check_field(class_file: &ClassFile, field: &FieldInfo) -> Result<()> {
    let cp = &class_file.constant_pool;
    let location = format!("field {}", cp.utf8(field.name_index)?);
    let flags = field.access_flags;

    if flags.visibility_count() > 1 {
        return Err(invalid_flags(
            location,
            "at most one of public, protected and private may be set",
        ));
    }
    if flags.contains(AccessFlags::FINAL | AccessFlags::VOLATILE) {
        return Err(invalid_flags(
            location,
            "a field must not be both final and volatile",
        ));
    }

    let constant = AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL;
    if class_file.is_interface() {
        if !flags.contains(constant) {
            return Err(invalid_flags(
                location,
                "an interface field must be public static final",
            ));
        }
        if !(constant | AccessFlags::SYNTHETIC).contains(flags) {
            return Err(invalid_flags(
                location,
                "an interface field may only be public static final and synthetic",
            ));
        }
    }

    let descriptor = cp.utf8(field.descriptor_index)?;
    if !class_file.grammar.is_field_descriptor(descriptor.as_bytes()) {
        return Err(ClassFileError::InvalidDescriptor {
            index: field.descriptor_index,
            descriptor: descriptor.to_string(),
        });
    }

    if class_file.access_flags.contains(AccessFlags::ENUM)
        && flags.contains(constant)
        && !flags.contains(AccessFlags::ENUM)
    {
        let this_class = cp.utf8(cp.class(class_file.this_class)?.name_index)?;
        let element = descriptor
            .as_bytes()
            .strip_prefix(b"L")
            .and_then(|d| d.strip_suffix(b";"));
        if element == Some(this_class.as_bytes()) {
            return Err(invalid_flags(
                location,
                "an enum constant must carry the enum flag",
            ));
        }
    }

    for attribute in &field.attributes {
        if let AttributeInfo::ConstantValue {
            constant_value_index,
        } = attribute.info
        {
            check_constant_value(cp, descriptor, constant_value_index)?;
        }
    }

    check_attributes(class_file, &field.attributes)
}

/// The constant must have the kind the field's type is initialized from.
fn check_constant_value(cp: &ConstantPool, descriptor: &Utf8Info, index: u16) -> Result<()> {
    let expected = match descriptor.as_bytes() {
        b"J" => CpTag::Long,
        b"F" => CpTag::Float,
        b"D" => CpTag::Double,
        b"I" | b"S" | b"C" | b"B" | b"Z" => CpTag::Integer,
        b"Ljava/lang/String;" => CpTag::String,
        _ => {
            return Err(ClassFileError::InvalidAttribute {
                attribute: AttributeKind::ConstantValue.name(),
                message: format!("a field of type {} cannot have a constant value", descriptor),
            })
        }
    };

    cp.expect(index, expected)?;
    Ok(())
}

fn check_method(class_file: &ClassFile, method: &MethodInfo) -> Result<()> {
    let cp = &class_file.constant_pool;
    let name = cp.utf8(method.name_index)?;
    let location = format!("method {}", name);
    let flags = method.access_flags;
    let is_initializer = name.as_bytes() == b"<init>";
    let is_class_initializer = name.as_bytes() == b"<clinit>";

    if flags.visibility_count() > 1 {
        return Err(invalid_flags(
            location,
            "at most one of public, protected and private may be set",
        ));
    }

    if class_file.is_interface() && !is_class_initializer {
        if flags.intersects(
            AccessFlags::PROTECTED
                | AccessFlags::FINAL
                | AccessFlags::SYNCHRONIZED
                | AccessFlags::NATIVE,
        ) {
            return Err(invalid_flags(
                location,
                "an interface method must not be protected, final, synchronized or native",
            ));
        }
        if class_file.version >= Version::JAVA_8 {
            if !flags.intersects(AccessFlags::PUBLIC | AccessFlags::PRIVATE) {
                return Err(invalid_flags(
                    location,
                    "an interface method must be public or private",
                ));
            }
        } else if !flags.contains(AccessFlags::PUBLIC | AccessFlags::ABSTRACT) {
            return Err(invalid_flags(
                location,
                "before 52.0 an interface method must be public and abstract",
            ));
        }
    }

    if flags.contains(AccessFlags::ABSTRACT)
        && flags.intersects(
            AccessFlags::PRIVATE
                | AccessFlags::STATIC
                | AccessFlags::FINAL
                | AccessFlags::SYNCHRONIZED
                | AccessFlags::NATIVE
                | AccessFlags::STRICT,
        )
    {
        return Err(invalid_flags(
            location,
            "an abstract method must not be private, static, final, synchronized, native or strict",
        ));
    }

    if is_initializer
        && !(AccessFlags::PUBLIC
            | AccessFlags::PROTECTED
            | AccessFlags::PRIVATE
            | AccessFlags::VARARGS
            | AccessFlags::STRICT
            | AccessFlags::SYNTHETIC)
            .contains(flags)
    {
        return Err(invalid_flags(
            location,
            "an instance initializer may only be public, protected, private, varargs, strict or synthetic",
        ));
    }

    let descriptor = cp.utf8(method.descriptor_index)?;
    if !class_file.grammar.is_method_descriptor(descriptor.as_bytes()) {
        return Err(ClassFileError::InvalidDescriptor {
            index: method.descriptor_index,
            descriptor: descriptor.to_string(),
        });
    }

    let code_attributes = method.attributes.count(AttributeKind::Code);
    if flags.intersects(AccessFlags::NATIVE | AccessFlags::ABSTRACT) {
        if code_attributes != 0 {
            return Err(ClassFileError::InvalidAttribute {
                attribute: AttributeKind::Code.name(),
                message: format!("{} is native or abstract but has code", location),
            });
        }
    } else if code_attributes != 1 {
        return Err(ClassFileError::InvalidAttribute {
            attribute: AttributeKind::Code.name(),
            message: format!(
                "{} needs exactly one Code attribute, found {}",
                location, code_attributes
            ),
        });
    }

    check_attributes(class_file, &method.attributes)
}

/// Recomputes the length of every decoded attribute and applies per-attribute layout rules.
/// Skipped attributes are not checked.
fn check_attributes(class_file: &ClassFile, attributes: &Attributes) -> Result<()> {
    for attribute in attributes {
        let computed = match attribute.info.encoded_len() {
            Some(computed) => computed,
            None => continue,
        };
        if computed != attribute.attribute_length as u64 {
            return Err(ClassFileError::AttributeLengthMismatch {
                attribute: attribute.info.name(),
                declared: attribute.attribute_length,
                computed,
            });
        }

        match &attribute.info {
            AttributeInfo::Code(code) => check_code(class_file, code)?,
            AttributeInfo::InnerClasses(classes) => check_inner_classes(class_file, classes)?,
            _ => {}
        }
    }

    Ok(())
}

fn check_code(class_file: &ClassFile, code: &CodeAttribute) -> Result<()> {
    let code_length = code.code.len();
    for (i, entry) in code.exception_table.iter().enumerate() {
        let (start, end, handler) = (
            entry.start_pc as usize,
            entry.end_pc as usize,
            entry.handler_pc as usize,
        );
        if start >= end || end > code_length || handler >= code_length {
            return Err(ClassFileError::InvalidAttribute {
                attribute: AttributeKind::Code.name(),
                message: format!(
                    "exception table entry {} covers [{}, {}) with handler {} in {} bytes of code",
                    i, start, end, handler, code_length
                ),
            });
        }
    }

    let cp = &class_file.constant_pool;
    for attribute in &code.attributes {
        if let AttributeInfo::LocalVariableTable(variables) = &attribute.info {
            for variable in variables {
                let descriptor = cp.utf8(variable.descriptor_index)?;
                if !class_file.grammar.is_field_descriptor(descriptor.as_bytes()) {
                    return Err(ClassFileError::InvalidDescriptor {
                        index: variable.descriptor_index,
                        descriptor: descriptor.to_string(),
                    });
                }
            }
        }
    }

    check_attributes(class_file, &code.attributes)
}

fn check_inner_classes(class_file: &ClassFile, classes: &[InnerClass]) -> Result<()> {
    if class_file.version < Version::JAVA_7 {
        return Ok(());
    }

    // Anonymous classes have no outer class from 51.0 on.
    for (i, class) in classes.iter().enumerate() {
        if class.inner_name_index == 0 && class.outer_class_info_index != 0 {
            return Err(ClassFileError::InvalidAttribute {
                attribute: AttributeKind::InnerClasses.name(),
                message: format!(
                    "entry {} is anonymous but names outer class #{}",
                    i, class.outer_class_info_index
                ),
            });
        }
    }

    Ok(())
}
