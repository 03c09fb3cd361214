use crate::{
    attributes::{
        Annotation, AttributeInfo, Attributes, BootstrapMethod, ElementValue, VerificationTypeInfo,
    },
    constant_pool::{InvokeDynamicInfo, MethodHandleInfo, NameAndTypeInfo},
    ClassFile, ClassFileError, ConstantPool, CpInfo, CpTag, Grammar, Result, Version,
};

const REF_GET_FIELD: u8 = 1;
const REF_PUT_STATIC: u8 = 4;
const REF_INVOKE_VIRTUAL: u8 = 5;
const REF_INVOKE_STATIC: u8 = 6;
const REF_INVOKE_SPECIAL: u8 = 7;
const REF_NEW_INVOKE_SPECIAL: u8 = 8;
const REF_INVOKE_INTERFACE: u8 = 9;

/// Entries a bootstrap method may receive as a static argument.
const LOADABLE: &[CpTag] = &[
    CpTag::String,
    CpTag::Class,
    CpTag::Integer,
    CpTag::Long,
    CpTag::Float,
    CpTag::Double,
    CpTag::MethodHandle,
    CpTag::MethodType,
];

const CONSTANT_VALUE: &[CpTag] = &[
    CpTag::Integer,
    CpTag::Float,
    CpTag::Long,
    CpTag::Double,
    CpTag::String,
];

const BOOTSTRAP_DESCRIPTOR_PREFIX: &[u8] =
    b"(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;";

/// Checks that every constant pool index in the class file resolves to the kind of entry its
/// referrer needs, and that method handles, names and bootstrap methods are consistent.
pub fn validate_references(class_file: &ClassFile) -> Result<()> {
    let mut validator = ReferenceValidator::new(class_file);
    validator.check_pool()?;
    validator.check_class()
}

struct ReferenceValidator<'a> {
    class_file: &'a ClassFile,
    cp: &'a ConstantPool,
    /// Entries whose own references are known to be good, by pool index.
    visited: Vec<bool>,
}
impl<'a> ReferenceValidator<'a> {
    fn new(class_file: &'a ClassFile) -> Self {
        Self {
            class_file,
            cp: &class_file.constant_pool,
            visited: vec![false; class_file.constant_pool.count()],
        }
    }

    fn check_pool(&mut self) -> Result<()> {
        let cp = self.cp;
        for (index, cp_info) in cp.iter() {
            if cp_info.tag().is_none() {
                continue;
            }

            if let Err(err) = self.check_entry(index) {
                log::error!("Constant pool entry #{} is invalid: {}", index, err);
                return Err(err);
            }
        }

        Ok(())
    }

    fn check(&mut self, index: u16, tag: CpTag) -> Result<()> {
        self.cp.expect(index, tag)?;
        self.check_entry(index)
    }

    fn check_any(&mut self, index: u16, tags: &[CpTag], expected: &'static str) -> Result<()> {
        let cp_info = self.cp.get(index)?;
        match cp_info.tag() {
            Some(tag) if tags.contains(&tag) => self.check_entry(index),
            _ => Err(ClassFileError::UnexpectedConstantPoolEntry {
                index,
                expected,
                found: cp_info.tag_name(),
            }),
        }
    }

    fn check_optional(&mut self, index: u16, tag: CpTag) -> Result<()> {
        if index == 0 {
            Ok(())
        } else {
            self.check(index, tag)
        }
    }

    fn check_entry(&mut self, index: u16) -> Result<()> {
        if self.visited[index as usize] {
            return Ok(());
        }

        let cp = self.cp;
        match cp.get(index)? {
            CpInfo::Class(class) => self.check(class.name_index, CpTag::Utf8)?,
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                self.check(r.class_index, CpTag::Class)?;
                self.check(r.name_and_type_index, CpTag::NameAndType)?;
            }
            CpInfo::String { string_index } => self.check(*string_index, CpTag::Utf8)?,
            CpInfo::NameAndType(name_and_type) => {
                self.check(name_and_type.name_index, CpTag::Utf8)?;
                self.check_member_name(index, name_and_type.name_index)?;
                self.check(name_and_type.descriptor_index, CpTag::Utf8)?;
            }
            CpInfo::MethodHandle(handle) => self.check_method_handle(index, handle)?,
            CpInfo::MethodType(method_type) => {
                self.check(method_type.descriptor_index, CpTag::Utf8)?;
                let descriptor = cp.utf8(method_type.descriptor_index)?;
                if !self
                    .class_file
                    .grammar
                    .is_method_descriptor(descriptor.as_bytes())
                {
                    return Err(ClassFileError::InvalidDescriptor {
                        index: method_type.descriptor_index,
                        descriptor: descriptor.to_string(),
                    });
                }
            }
            CpInfo::InvokeDynamic(invoke_dynamic) => {
                self.check_invoke_dynamic(index, invoke_dynamic)?
            }
            CpInfo::Utf8(_)
            | CpInfo::Integer(_)
            | CpInfo::Float(_)
            | CpInfo::Long(_)
            | CpInfo::Double(_)
            | CpInfo::Unusable => {}
        }

        self.visited[index as usize] = true;
        Ok(())
    }

    /// Field and method names may not contain `.;[/<>`, except for the two initializer names.
    fn check_member_name(&self, index: u16, name_index: u16) -> Result<()> {
        let name = self.cp.utf8(name_index)?;
        let bytes = name.as_bytes();
        if bytes == b"<init>" || bytes == b"<clinit>" {
            return Ok(());
        }

        if bytes.iter().any(|b| b".;[/<>".contains(b)) {
            return Err(ClassFileError::InvalidConstantPoolEntry {
                index,
                message: format!("{:?} is not a valid member name", name),
            });
        }

        Ok(())
    }

    fn check_method_handle(&mut self, index: u16, handle: &MethodHandleInfo) -> Result<()> {
        let reference_index = handle.reference_index;
        match handle.reference_kind {
            REF_GET_FIELD..=REF_PUT_STATIC => self.check(reference_index, CpTag::FieldRef)?,
            REF_INVOKE_VIRTUAL | REF_NEW_INVOKE_SPECIAL => {
                self.check(reference_index, CpTag::MethodRef)?
            }
            REF_INVOKE_STATIC | REF_INVOKE_SPECIAL => {
                if self.class_file.version >= Version::JAVA_8 {
                    self.check_any(
                        reference_index,
                        &[CpTag::MethodRef, CpTag::InterfaceMethodRef],
                        "Methodref or InterfaceMethodref",
                    )?
                } else {
                    self.check(reference_index, CpTag::MethodRef)?
                }
            }
            REF_INVOKE_INTERFACE => self.check(reference_index, CpTag::InterfaceMethodRef)?,
            kind => {
                return Err(ClassFileError::InvalidConstantPoolEntry {
                    index,
                    message: format!("invalid method handle reference kind {}", kind),
                })
            }
        }

        let name = self
            .cp
            .utf8(self.member_name_and_type(reference_index)?.name_index)?;
        let is_constructor = name.as_bytes() == b"<init>";
        if handle.reference_kind == REF_NEW_INVOKE_SPECIAL {
            if !is_constructor {
                return Err(ClassFileError::InvalidConstantPoolEntry {
                    index,
                    message: format!("newInvokeSpecial handle must target <init>, not {:?}", name),
                });
            }
        } else if is_constructor || name.as_bytes() == b"<clinit>" {
            return Err(ClassFileError::InvalidConstantPoolEntry {
                index,
                message: format!(
                    "method handle of kind {} must not target {:?}",
                    handle.reference_kind, name
                ),
            });
        }

        Ok(())
    }

    fn check_invoke_dynamic(&mut self, index: u16, invoke_dynamic: &InvokeDynamicInfo) -> Result<()> {
        self.check(invoke_dynamic.name_and_type_index, CpTag::NameAndType)?;

        let class_file = self.class_file;
        let bootstrap_methods = class_file.bootstrap_methods().ok_or_else(|| {
            ClassFileError::InvalidConstantPoolEntry {
                index,
                message: "InvokeDynamic requires a BootstrapMethods attribute".to_owned(),
            }
        })?;
        let bootstrap_method = bootstrap_methods
            .get(invoke_dynamic.bootstrap_method_attr_index as usize)
            .ok_or_else(|| ClassFileError::InvalidConstantPoolEntry {
                index,
                message: format!(
                    "bootstrap method {} is out of range, the table has {}",
                    invoke_dynamic.bootstrap_method_attr_index,
                    bootstrap_methods.len()
                ),
            })?;

        self.check_bootstrap_method(bootstrap_method)?;

        let handle = self.cp.method_handle(bootstrap_method.bootstrap_method_ref)?;
        if !matches!(
            handle.reference_kind,
            REF_INVOKE_STATIC | REF_NEW_INVOKE_SPECIAL
        ) {
            return Err(ClassFileError::InvalidConstantPoolEntry {
                index,
                message: format!(
                    "bootstrap method handle #{} has reference kind {}",
                    bootstrap_method.bootstrap_method_ref, handle.reference_kind
                ),
            });
        }

        let descriptor = self
            .cp
            .utf8(self.member_name_and_type(handle.reference_index)?.descriptor_index)?;
        if !descriptor.as_bytes().starts_with(BOOTSTRAP_DESCRIPTOR_PREFIX) {
            return Err(ClassFileError::InvalidConstantPoolEntry {
                index,
                message: format!("invalid bootstrap method descriptor {:?}", descriptor),
            });
        }

        Ok(())
    }

    fn check_bootstrap_method(&mut self, bootstrap_method: &BootstrapMethod) -> Result<()> {
        self.check(bootstrap_method.bootstrap_method_ref, CpTag::MethodHandle)?;
        for &argument in &bootstrap_method.bootstrap_arguments {
            self.check_any(argument, LOADABLE, "loadable constant")?;
        }

        Ok(())
    }

    /// The name and type of a Fieldref, Methodref or InterfaceMethodref.
    fn member_name_and_type(&self, index: u16) -> Result<&'a NameAndTypeInfo> {
        let cp = self.cp;
        match cp.get(index)? {
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                cp.name_and_type(r.name_and_type_index)
            }
            cp_info => Err(ClassFileError::UnexpectedConstantPoolEntry {
                index,
                expected: "member reference",
                found: cp_info.tag_name(),
            }),
        }
    }

    fn check_class(&mut self) -> Result<()> {
        let class_file = self.class_file;
        self.check(class_file.this_class, CpTag::Class)?;
        self.check_optional(class_file.super_class, CpTag::Class)?;
        for &interface in &class_file.interfaces {
            self.check(interface, CpTag::Class)?;
        }

        for field in &class_file.fields {
            self.check(field.name_index, CpTag::Utf8)?;
            self.check(field.descriptor_index, CpTag::Utf8)?;
            self.check_attributes(&field.attributes)?;
        }
        for method in &class_file.methods {
            self.check(method.name_index, CpTag::Utf8)?;
            self.check(method.descriptor_index, CpTag::Utf8)?;
            self.check_attributes(&method.attributes)?;
        }

        self.check_attributes(&class_file.attributes)
    }

    fn check_attributes(&mut self, attributes: &Attributes) -> Result<()> {
        for attribute in attributes {
            self.check(attribute.attribute_name_index, CpTag::Utf8)?;
            self.check_attribute_info(&attribute.info)?;
        }

        Ok(())
    }

    fn check_attribute_info(&mut self, info: &AttributeInfo) -> Result<()> {
        match info {
            AttributeInfo::ConstantValue {
                constant_value_index,
            } => self.check_any(*constant_value_index, CONSTANT_VALUE, "constant value")?,
            AttributeInfo::Code(code) => {
                for entry in &code.exception_table {
                    self.check_optional(entry.catch_type, CpTag::Class)?;
                }
                self.check_attributes(&code.attributes)?;
            }
            AttributeInfo::StackMapTable(frames) => {
                for frame in frames {
                    for verification_type in frame.verification_types() {
                        if let VerificationTypeInfo::Object { cpool_index } = *verification_type {
                            self.check(cpool_index, CpTag::Class)?;
                        }
                    }
                }
            }
            AttributeInfo::Exceptions(classes) => {
                for &class in classes {
                    self.check(class, CpTag::Class)?;
                }
            }
            AttributeInfo::InnerClasses(classes) => {
                for class in classes {
                    self.check(class.inner_class_info_index, CpTag::Class)?;
                    self.check_optional(class.outer_class_info_index, CpTag::Class)?;
                    self.check_optional(class.inner_name_index, CpTag::Utf8)?;
                }
            }
            AttributeInfo::EnclosingMethod {
                class_index,
                method_index,
            } => {
                self.check(*class_index, CpTag::Class)?;
                self.check_optional(*method_index, CpTag::NameAndType)?;
            }
            AttributeInfo::Signature { signature_index } => {
                self.check(*signature_index, CpTag::Utf8)?
            }
            AttributeInfo::SourceFile { sourcefile_index } => {
                self.check(*sourcefile_index, CpTag::Utf8)?
            }
            AttributeInfo::LocalVariableTable(variables) => {
                for variable in variables {
                    self.check(variable.name_index, CpTag::Utf8)?;
                    self.check(variable.descriptor_index, CpTag::Utf8)?;
                }
            }
            AttributeInfo::LocalVariableTypeTable(variables) => {
                for variable in variables {
                    self.check(variable.name_index, CpTag::Utf8)?;
                    self.check(variable.signature_index, CpTag::Utf8)?;
                }
            }
            AttributeInfo::RuntimeVisibleAnnotations(annotations)
            | AttributeInfo::RuntimeInvisibleAnnotations(annotations) => {
                for annotation in annotations {
                    self.check_annotation(annotation)?;
                }
            }
            AttributeInfo::RuntimeVisibleParameterAnnotations(parameters)
            | AttributeInfo::RuntimeInvisibleParameterAnnotations(parameters) => {
                for annotation in parameters.iter().flatten() {
                    self.check_annotation(annotation)?;
                }
            }
            AttributeInfo::AnnotationDefault(value) => self.check_element_value(value)?,
            AttributeInfo::BootstrapMethods(methods) => {
                for method in methods {
                    self.check_bootstrap_method(method)?;
                }
            }
            AttributeInfo::MethodParameters(parameters) => {
                for parameter in parameters {
                    self.check_optional(parameter.name_index, CpTag::Utf8)?;
                }
            }
            AttributeInfo::RuntimeVisibleTypeAnnotations(annotations)
            | AttributeInfo::RuntimeInvisibleTypeAnnotations(annotations) => {
                for type_annotation in annotations {
                    self.check_annotation(&type_annotation.annotation)?;
                }
            }
            AttributeInfo::Synthetic
            | AttributeInfo::Deprecated
            | AttributeInfo::SourceDebugExtension(_)
            | AttributeInfo::LineNumberTable(_)
            | AttributeInfo::Unrecognized => {}
        }

        Ok(())
    }

    fn check_annotation(&mut self, annotation: &Annotation) -> Result<()> {
        self.check(annotation.type_index, CpTag::Utf8)?;
        for pair in &annotation.element_value_pairs {
            self.check(pair.element_name_index, CpTag::Utf8)?;
            self.check_element_value(&pair.value)?;
        }

        Ok(())
    }

    fn check_element_value(&mut self, value: &ElementValue) -> Result<()> {
        match value {
            ElementValue::Const {
                tag,
                const_value_index,
            } => {
                let grammar = self.class_file.grammar;
                let kind = match grammar {
                    Grammar::Strict => Some(CpTag::FieldRef),
                    Grammar::Lenient => ElementValue::constant_tag(*tag),
                };
                if let Some(kind) = kind {
                    self.check(*const_value_index, kind)?;
                }
                ElementValue::check_constant(*tag, *const_value_index, self.cp, grammar)?;
            }
            ElementValue::Enum {
                type_name_index,
                const_name_index,
            } => {
                self.check(*type_name_index, CpTag::Utf8)?;
                self.check(*const_name_index, CpTag::Utf8)?;
            }
            ElementValue::Class { class_info_index } => {
                self.check(*class_info_index, CpTag::Utf8)?
            }
            ElementValue::Annotation(annotation) => self.check_annotation(annotation)?,
            ElementValue::Array(values) => {
                for value in values {
                    self.check_element_value(value)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod validate_references_tests {
    use super::*;
    use crate::{
        attributes::{Attribute, ElementValuePair},
        constant_pool::{ClassInfo, InvokeDynamicInfo, NameAndTypeInfo, RefInfo},
        AccessFlags, FieldInfo, Grammar,
    };

    /// A class named `Foo` at #2 followed by `extra` entries starting at #3.
    fn class_file(extra: Vec<CpInfo>) -> ClassFile {
        let mut cp_infos = vec![
            CpInfo::Utf8("Foo".into()),
            CpInfo::Class(ClassInfo { name_index: 1 }),
        ];
        cp_infos.extend(extra);

        ClassFile {
            version: Version::JAVA_8,
            constant_pool: ConstantPool::new(cp_infos),
            access_flags: AccessFlags::PUBLIC | AccessFlags::SUPER,
            this_class: 2,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: Attributes::default(),
            grammar: Grammar::Strict,
            diagnostics: vec![],
        }
    }

    fn method_ref(name: &str, descriptor: &str) -> Vec<CpInfo> {
        vec![
            CpInfo::Utf8(name.into()),
            CpInfo::Utf8(descriptor.into()),
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index: 3,
                descriptor_index: 4,
            }),
            CpInfo::MethodRef(RefInfo {
                class_index: 2,
                name_and_type_index: 5,
            }),
        ]
    }

    fn method_handle(reference_kind: u8, reference_index: u16) -> CpInfo {
        CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        })
    }

    #[test]
    fn it_should_accept_a_minimal_pool() {
        assert!(validate_references(&class_file(vec![])).is_ok());
    }

    #[test]
    fn it_should_reject_a_reference_to_the_long_placeholder() {
        let class_file = class_file(vec![
            CpInfo::Long(1 << 40),
            CpInfo::Unusable,
            CpInfo::String { string_index: 4 },
        ]);

        let err = validate_references(&class_file).unwrap_err();
        assert!(matches!(
            err,
            ClassFileError::UnexpectedConstantPoolEntry {
                index: 4,
                found: "unusable slot",
                ..
            }
        ));
        assert_eq!(err.constant_pool_index(), Some(4));
    }

    #[test]
    fn it_should_accept_clinit_as_a_member_name() {
        let class_file = class_file(vec![
            CpInfo::Utf8("<clinit>".into()),
            CpInfo::Utf8("()V".into()),
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index: 3,
                descriptor_index: 4,
            }),
        ]);
        assert!(validate_references(&class_file).is_ok());
    }

    #[test]
    fn it_should_reject_member_names_with_reserved_characters() {
        for name in ["a/b", "<main>", "x;y"] {
            let class_file = class_file(method_ref(name, "()V"));
            assert!(matches!(
                validate_references(&class_file),
                Err(ClassFileError::InvalidConstantPoolEntry { index: 5, .. })
            ));
        }
    }

    #[test]
    fn it_should_match_method_handle_kinds_to_their_referent() {
        let mut entries = method_ref("run", "()V");
        entries.push(method_handle(1, 6));
        assert!(matches!(
            validate_references(&class_file(entries)),
            Err(ClassFileError::UnexpectedConstantPoolEntry {
                index: 6,
                expected: "Fieldref",
                ..
            })
        ));

        let mut entries = method_ref("run", "()V");
        entries.push(method_handle(5, 6));
        assert!(validate_references(&class_file(entries)).is_ok());

        let mut entries = method_ref("run", "()V");
        entries.push(method_handle(10, 6));
        assert!(matches!(
            validate_references(&class_file(entries)),
            Err(ClassFileError::InvalidConstantPoolEntry { index: 7, .. })
        ));
    }

    #[test]
    fn it_should_only_allow_constructors_for_new_invoke_special() {
        let mut entries = method_ref("run", "()V");
        entries.push(method_handle(8, 6));
        assert!(matches!(
            validate_references(&class_file(entries)),
            Err(ClassFileError::InvalidConstantPoolEntry { index: 7, .. })
        ));

        let mut entries = method_ref("<init>", "()V");
        entries.push(method_handle(8, 6));
        assert!(validate_references(&class_file(entries)).is_ok());

        let mut entries = method_ref("<init>", "()V");
        entries.push(method_handle(5, 6));
        assert!(matches!(
            validate_references(&class_file(entries)),
            Err(ClassFileError::InvalidConstantPoolEntry { index: 7, .. })
        ));
    }

    #[test]
    fn it_should_accept_interface_methods_for_static_handles_from_java_8() {
        let mut entries = method_ref("run", "()V");
        entries[3] = CpInfo::InterfaceMethodRef(RefInfo {
            class_index: 2,
            name_and_type_index: 5,
        });
        entries.push(method_handle(6, 6));

        let mut class_file = class_file(entries);
        assert!(validate_references(&class_file).is_ok());

        class_file.version = Version::JAVA_7;
        assert!(matches!(
            validate_references(&class_file),
            Err(ClassFileError::UnexpectedConstantPoolEntry { index: 6, .. })
        ));
    }

    fn invoke_dynamic(arguments: Vec<u16>, bootstrap_kind: u8) -> ClassFile {
        let mut entries = method_ref(
            "bootstrap",
            "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;\
             Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/CallSite;",
        );
        entries.extend(vec![
            method_handle(bootstrap_kind, 6),
            CpInfo::Utf8("run".into()),
            CpInfo::Utf8("()Ljava/lang/Runnable;".into()),
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index: 8,
                descriptor_index: 9,
            }),
            CpInfo::InvokeDynamic(InvokeDynamicInfo {
                bootstrap_method_attr_index: 0,
                name_and_type_index: 10,
            }),
            CpInfo::Integer(42),
            CpInfo::Utf8("BootstrapMethods".into()),
        ]);

        let mut class_file = class_file(entries);
        class_file.attributes = Attributes(vec![Attribute {
            attribute_name_index: 13,
            attribute_length: 6 + 2 * arguments.len() as u32,
            info: AttributeInfo::BootstrapMethods(vec![BootstrapMethod {
                bootstrap_method_ref: 7,
                bootstrap_arguments: arguments,
            }]),
        }]);
        class_file
    }

    #[test]
    fn it_should_resolve_invoke_dynamic_through_its_bootstrap_method() {
        assert!(validate_references(&invoke_dynamic(vec![12], 6)).is_ok());
    }

    #[test]
    fn it_should_require_a_bootstrap_methods_attribute() {
        let mut class_file = invoke_dynamic(vec![], 6);
        class_file.attributes = Attributes::default();
        assert!(matches!(
            validate_references(&class_file),
            Err(ClassFileError::InvalidConstantPoolEntry { index: 11, .. })
        ));
    }

    #[test]
    fn it_should_require_a_static_bootstrap_handle() {
        assert!(matches!(
            validate_references(&invoke_dynamic(vec![], 5)),
            Err(ClassFileError::InvalidConstantPoolEntry { index: 11, .. })
        ));
    }

    #[test]
    fn it_should_require_loadable_bootstrap_arguments() {
        assert!(matches!(
            validate_references(&invoke_dynamic(vec![12, 1], 6)),
            Err(ClassFileError::UnexpectedConstantPoolEntry {
                index: 1,
                expected: "loadable constant",
                ..
            })
        ));
    }

    #[test]
    fn it_should_give_the_same_answer_twice() {
        let good = invoke_dynamic(vec![12], 6);
        let bad = invoke_dynamic(vec![12], 5);

        for class_file in [&good, &bad] {
            let first = validate_references(class_file).map_err(|e| e.to_string());
            let second = validate_references(class_file).map_err(|e| e.to_string());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn it_should_check_references_inside_field_attributes() {
        let mut class_file = class_file(vec![
            CpInfo::Utf8("value".into()),
            CpInfo::Utf8("I".into()),
            CpInfo::Utf8("ConstantValue".into()),
        ]);
        class_file.fields.push(FieldInfo {
            access_flags: AccessFlags::STATIC | AccessFlags::FINAL,
            name_index: 3,
            descriptor_index: 4,
            attributes: Attributes(vec![Attribute {
                attribute_name_index: 5,
                attribute_length: 2,
                info: AttributeInfo::ConstantValue {
                    constant_value_index: 3,
                },
            }]),
        });

        assert!(matches!(
            validate_references(&class_file),
            Err(ClassFileError::UnexpectedConstantPoolEntry {
                index: 3,
                expected: "constant value",
                ..
            })
        ));
    }

    #[test]
    fn it_should_check_the_super_class_only_when_present() {
        let mut class_file = class_file(vec![]);
        class_file.super_class = 1;
        assert!(matches!(
            validate_references(&class_file),
            Err(ClassFileError::UnexpectedConstantPoolEntry { index: 1, .. })
        ));
    }

    /// `@Marker(I = Foo.MAX)` where `MAX` is declared with `descriptor`.
    fn annotated_with_constant(tag: u8, descriptor: &str) -> ClassFile {
        let mut class_file = class_file(vec![
            CpInfo::Utf8("MAX".into()),
            CpInfo::Utf8(descriptor.into()),
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index: 3,
                descriptor_index: 4,
            }),
            CpInfo::FieldRef(RefInfo {
                class_index: 2,
                name_and_type_index: 5,
            }),
            CpInfo::Utf8("RuntimeVisibleAnnotations".into()),
            CpInfo::Utf8("Lmy/Marker;".into()),
            CpInfo::Utf8("I".into()),
        ]);
        class_file.attributes = Attributes(vec![Attribute {
            attribute_name_index: 7,
            attribute_length: 11,
            info: AttributeInfo::RuntimeVisibleAnnotations(vec![Annotation {
                type_index: 8,
                element_value_pairs: vec![ElementValuePair {
                    element_name_index: 9,
                    value: ElementValue::Const {
                        tag,
                        const_value_index: 6,
                    },
                }],
            }]),
        }]);
        class_file
    }

    #[test]
    fn it_should_match_annotation_constants_against_field_types() {
        assert!(validate_references(&annotated_with_constant(b's', "Ljava/lang/String;")).is_ok());
        assert!(validate_references(&annotated_with_constant(b'Z', "Z")).is_ok());
        assert!(matches!(
            validate_references(&annotated_with_constant(b'I', "Ljava/lang/String;")),
            Err(ClassFileError::InvalidConstantPoolEntry { index: 6, .. })
        ));
    }

    #[test]
    fn it_should_resolve_annotation_constants_directly_when_lenient() {
        let mut class_file = annotated_with_constant(b'I', "I");
        class_file.grammar = Grammar::Lenient;
        assert!(matches!(
            validate_references(&class_file),
            Err(ClassFileError::UnexpectedConstantPoolEntry {
                index: 6,
                expected: "Integer",
                ..
            })
        ));
    }
}
