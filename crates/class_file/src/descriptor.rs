//! Field and method descriptor grammar.
//!
//! The classifiers work directly on the raw bytes of a UTF-8 constant and never allocate.

use crate::Grammar;

/// An array type may have at most this many dimensions.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Checks `bytes` against the field descriptor grammar with [`Grammar::Strict`] class names.
pub fn is_field_descriptor(bytes: &[u8]) -> bool {
    Grammar::Strict.is_field_descriptor(bytes)
}

/// Checks `bytes` against the method descriptor grammar with [`Grammar::Strict`] class names.
pub fn is_method_descriptor(bytes: &[u8]) -> bool {
    Grammar::Strict.is_method_descriptor(bytes)
}

impl Grammar {
    pub fn is_field_descriptor(self, bytes: &[u8]) -> bool {
        self.field_descriptor_len(bytes) == Some(bytes.len())
    }

    pub fn is_method_descriptor(self, bytes: &[u8]) -> bool {
        match self.parameters_end(bytes) {
            Some((_, end)) => self.is_return_descriptor(&bytes[end..]),
            None => false,
        }
    }

    /// A field descriptor or `V`.
    pub fn is_return_descriptor(self, bytes: &[u8]) -> bool {
        bytes == b"V" || self.is_field_descriptor(bytes)
    }

    /// Whether `bytes` may name a class in an `L...;` descriptor.
    pub fn is_class_name(self, bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            return false;
        }

        match self {
            Grammar::Strict => bytes
                .iter()
                .all(|&b| b.is_ascii_alphanumeric() || b == b'/' || b == b'$'),
            Grammar::Lenient => !bytes.iter().any(|b| b".;[".contains(b)),
        }
    }

    /// Length of the field descriptor that starts `bytes`, if there is one.
    fn field_descriptor_len(self, bytes: &[u8]) -> Option<usize> {
        let dimensions = bytes.iter().take_while(|&&b| b == b'[').count();
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return None;
        }

        let element = &bytes[dimensions..];
        let element_len = match element.first()? {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => 1,
            b'L' => {
                let end = element.iter().position(|&b| b == b';')?;
                if !self.is_class_name(&element[1..end]) {
                    return None;
                }
                end + 1
            }
            _ => return None,
        };

        Some(dimensions + element_len)
    }

    /// Walks the parameter list of a method descriptor, returning the number of parameters and
    /// the offset just past the closing `)`.
    fn parameters_end(self, bytes: &[u8]) -> Option<(usize, usize)> {
        if bytes.first() != Some(&b'(') {
            return None;
        }

        let mut offset = 1;
        let mut count = 0;
        loop {
            match bytes.get(offset)? {
                b')' => return Some((count, offset + 1)),
                _ => {
                    offset += self.field_descriptor_len(&bytes[offset..])?;
                    count += 1;
                }
            }
        }
    }
}

/// Whether `bytes` is an unqualified name: non-empty and free of `.`, `;`, `[` and `/`.
pub fn is_unqualified_name(bytes: &[u8]) -> bool {
    !bytes.is_empty() && !bytes.iter().any(|b| b".;[/".contains(b))
}

/// Number of parameters declared by a method descriptor, or `None` if it is malformed.
pub fn parameter_count(bytes: &[u8]) -> Option<usize> {
    let (count, end) = Grammar::Lenient.parameters_end(bytes)?;
    if Grammar::Lenient.is_return_descriptor(&bytes[end..]) {
        Some(count)
    } else {
        None
    }
}

/// Renders a field descriptor the way it reads in Java source, e.g. `[Ljava/lang/String;` as
/// `java.lang.String[]`.
pub fn source_type_name(bytes: &[u8]) -> Option<String> {
    if !Grammar::Lenient.is_field_descriptor(bytes) {
        return None;
    }

    let dimensions = bytes.iter().take_while(|&&b| b == b'[').count();
    let mut name = match bytes[dimensions] {
        b'B' => "byte".to_owned(),
        b'C' => "char".to_owned(),
        b'D' => "double".to_owned(),
        b'F' => "float".to_owned(),
        b'I' => "int".to_owned(),
        b'J' => "long".to_owned(),
        b'S' => "short".to_owned(),
        b'Z' => "boolean".to_owned(),
        _ => String::from_utf8_lossy(&bytes[dimensions + 1..bytes.len() - 1]).replace('/', "."),
    };
    for _ in 0..dimensions {
        name.push_str("[]");
    }

    Some(name)
}
