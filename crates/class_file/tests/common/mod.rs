#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

/// Assembles class files byte by byte. Pool entries are appended in call order and their
/// indices are handed back to the caller.
pub struct ClassBuilder {
    major: u16,
    minor: u16,
    pool: Vec<u8>,
    pool_count: u16,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<u8>,
    fields_count: u16,
    methods: Vec<u8>,
    methods_count: u16,
    attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
    /// A public class `name` extending `java/lang/Object`, version 52.0.
    pub fn new(name: &str) -> Self {
        let mut builder = Self::bare();
        builder.this_class = builder.class(name);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    /// A class with nothing in its pool and zero for `this_class` and `super_class`.
    pub fn bare() -> Self {
        Self {
            major: 52,
            minor: 0,
            pool: Vec::new(),
            pool_count: 1,
            access_flags: 0x0021,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            fields_count: 0,
            methods: Vec::new(),
            methods_count: 0,
            attributes: Vec::new(),
        }
    }

    pub fn version(&mut self, major: u16, minor: u16) -> &mut Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn access_flags(&mut self, access_flags: u16) -> &mut Self {
        self.access_flags = access_flags;
        self
    }

    pub fn this_class(&self) -> u16 {
        self.this_class
    }

    pub fn super_class(&mut self, super_class: u16) -> &mut Self {
        self.super_class = super_class;
        self
    }

    fn entry(&mut self, tag: u8, payload: &[u8], slots: u16) -> u16 {
        let index = self.pool_count;
        self.pool.push(tag);
        self.pool.extend_from_slice(payload);
        self.pool_count += slots;
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        self.utf8_bytes(value.as_bytes())
    }

    pub fn utf8_bytes(&mut self, bytes: &[u8]) -> u16 {
        let mut payload = Vec::new();
        payload.write_u16::<BigEndian>(bytes.len() as u16).unwrap();
        payload.extend_from_slice(bytes);
        self.entry(1, &payload, 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.entry(3, &value.to_be_bytes(), 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.entry(5, &value.to_be_bytes(), 2)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.entry(7, &name_index.to_be_bytes(), 1)
    }

    /// A `String` entry pointing at `string_index`, whatever lives there.
    pub fn string_at(&mut self, string_index: u16) -> u16 {
        self.entry(8, &string_index.to_be_bytes(), 1)
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let string_index = self.utf8(value);
        self.string_at(string_index)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.entry(12, &pair(name_index, descriptor_index), 1)
    }

    pub fn field_ref(&mut self, class_index: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.entry(9, &pair(class_index, name_and_type_index), 1)
    }

    pub fn method_ref(&mut self, class_index: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.entry(10, &pair(class_index, name_and_type_index), 1)
    }

    pub fn method_handle(&mut self, reference_kind: u8, reference_index: u16) -> u16 {
        let mut payload = vec![reference_kind];
        payload.extend_from_slice(&reference_index.to_be_bytes());
        self.entry(15, &payload, 1)
    }

    pub fn invoke_dynamic(&mut self, bootstrap_method: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.entry(18, &pair(bootstrap_method, name_and_type_index), 1)
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    pub fn field(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) -> &mut Self {
        let member = self.member(access_flags, name, descriptor, attributes);
        self.fields.extend(member);
        self.fields_count += 1;
        self
    }

    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) -> &mut Self {
        let member = self.member(access_flags, name, descriptor, attributes);
        self.methods.extend(member);
        self.methods_count += 1;
        self
    }

    fn member(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);

        let mut bytes = Vec::new();
        bytes.write_u16::<BigEndian>(access_flags).unwrap();
        bytes.write_u16::<BigEndian>(name_index).unwrap();
        bytes.write_u16::<BigEndian>(descriptor_index).unwrap();
        write_attributes(&mut bytes, &attributes);
        bytes
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    /// An attribute whose declared length matches its body.
    pub fn attribute(&mut self, name: &str, body: &[u8]) -> Vec<u8> {
        self.attribute_with_length(name, body.len() as u32, body)
    }

    pub fn attribute_with_length(&mut self, name: &str, length: u32, body: &[u8]) -> Vec<u8> {
        let name_index = self.utf8(name);

        let mut bytes = Vec::new();
        bytes.write_u16::<BigEndian>(name_index).unwrap();
        bytes.write_u32::<BigEndian>(length).unwrap();
        bytes.extend_from_slice(body);
        bytes
    }

    /// A `Code` attribute; each exception table entry is `[start, end, handler, catch_type]`.
    pub fn code(
        &mut self,
        code: &[u8],
        exception_table: &[[u16; 4]],
        attributes: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.write_u16::<BigEndian>(2).unwrap();
        body.write_u16::<BigEndian>(2).unwrap();
        body.write_u32::<BigEndian>(code.len() as u32).unwrap();
        body.extend_from_slice(code);
        body.write_u16::<BigEndian>(exception_table.len() as u16)
            .unwrap();
        for entry in exception_table {
            for &value in entry {
                body.write_u16::<BigEndian>(value).unwrap();
            }
        }
        write_attributes(&mut body, &attributes);

        self.attribute("Code", &body)
    }

    /// A `Code` attribute holding a lone `return`.
    pub fn return_code(&mut self) -> Vec<u8> {
        self.code(&[0xb1], &[], vec![])
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.write_u32::<BigEndian>(0xCAFEBABE).unwrap();
        bytes.write_u16::<BigEndian>(self.minor).unwrap();
        bytes.write_u16::<BigEndian>(self.major).unwrap();

        bytes.write_u16::<BigEndian>(self.pool_count).unwrap();
        bytes.extend_from_slice(&self.pool);

        bytes.write_u16::<BigEndian>(self.access_flags).unwrap();
        bytes.write_u16::<BigEndian>(self.this_class).unwrap();
        bytes.write_u16::<BigEndian>(self.super_class).unwrap();
        bytes
            .write_u16::<BigEndian>(self.interfaces.len() as u16)
            .unwrap();
        for &interface in &self.interfaces {
            bytes.write_u16::<BigEndian>(interface).unwrap();
        }

        bytes.write_u16::<BigEndian>(self.fields_count).unwrap();
        bytes.extend_from_slice(&self.fields);
        bytes.write_u16::<BigEndian>(self.methods_count).unwrap();
        bytes.extend_from_slice(&self.methods);
        write_attributes(&mut bytes, &self.attributes);
        bytes
    }
}

fn pair(first: u16, second: u16) -> [u8; 4] {
    let [a, b] = first.to_be_bytes();
    let [c, d] = second.to_be_bytes();
    [a, b, c, d]
}

fn write_attributes(bytes: &mut Vec<u8>, attributes: &[Vec<u8>]) {
    bytes
        .write_u16::<BigEndian>(attributes.len() as u16)
        .unwrap();
    for attribute in attributes {
        bytes.extend_from_slice(attribute);
    }
}

/// Big-endian `u16` values laid out back to back.
pub fn u16s(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}
