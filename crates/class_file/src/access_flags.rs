use bitflags::bitflags;

bitflags! {
    /// Access and property flags shared by classes, nested classes, fields, methods and method
    /// parameters. Several bits mean different things depending on where they appear.
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MANDATED = 0x8000;
    }
}

/// The kind of structure an access flag word belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Class,
    NestedClass,
    Field,
    Method,
    Parameter,
}
impl MemberKind {
    /// Every flag that is defined for this kind.
    pub fn mask(self) -> AccessFlags {
        AccessFlags::from_bits_truncate(match self {
            MemberKind::Class => 0x7631,
            MemberKind::NestedClass => 0x761F,
            MemberKind::Field => 0x50DF,
            MemberKind::Method => 0x1DFF,
            MemberKind::Parameter => 0x9010,
        })
    }
}

impl AccessFlags {
    /// Bits of `raw` that carry no meaning for `kind`.
    pub fn undefined_bits(raw: u16, kind: MemberKind) -> u16 {
        raw & !kind.mask().bits()
    }

    /// Number of `public`, `protected` and `private` flags that are set.
    pub fn visibility_count(self) -> u32 {
        (self & (AccessFlags::PUBLIC | AccessFlags::PROTECTED | AccessFlags::PRIVATE))
            .bits()
            .count_ones()
    }

    /// Renders the flags as Java source modifiers, e.g. `public static final`.
    pub fn modifiers(self, kind: MemberKind) -> String {
        let mut words = Vec::new();
        let mut push = |flag: AccessFlags, word: &'static str| {
            if self.contains(flag) {
                words.push(word);
            }
        };

        push(AccessFlags::PUBLIC, "public");
        if kind != MemberKind::Class {
            push(AccessFlags::PROTECTED, "protected");
            push(AccessFlags::PRIVATE, "private");
        }
        if kind != MemberKind::Parameter {
            push(AccessFlags::ABSTRACT, "abstract");
            push(AccessFlags::STATIC, "static");
        }
        push(AccessFlags::FINAL, "final");
        match kind {
            MemberKind::Field => {
                push(AccessFlags::TRANSIENT, "transient");
                push(AccessFlags::VOLATILE, "volatile");
            }
            MemberKind::Method => {
                push(AccessFlags::SYNCHRONIZED, "synchronized");
                push(AccessFlags::NATIVE, "native");
                push(AccessFlags::STRICT, "strictfp");
            }
            _ => {}
        }

        words.join(" ")
    }
}

#[cfg(test)]
mod modifiers_tests {
    use super::*;

    #[test]
    fn it_should_render_field_modifiers_in_source_order() {
        let flags = AccessFlags::FINAL | AccessFlags::STATIC | AccessFlags::PUBLIC;
        assert_eq!(flags.modifiers(MemberKind::Field), "public static final");
    }

    #[test]
    fn it_should_read_shared_bits_by_kind() {
        let flags = AccessFlags::from_bits_truncate(0x0060);
        assert_eq!(flags.modifiers(MemberKind::Field), "volatile");
        assert_eq!(flags.modifiers(MemberKind::Method), "synchronized");
        assert_eq!(flags.modifiers(MemberKind::Class), "");
    }

    #[test]
    fn it_should_report_undefined_bits() {
        assert_eq!(AccessFlags::undefined_bits(0x0102, MemberKind::Class), 0x0102);
        assert_eq!(AccessFlags::undefined_bits(0x0021, MemberKind::Class), 0);
        assert_eq!(AccessFlags::undefined_bits(0x8001, MemberKind::Method), 0x8000);
    }

    #[test]
    fn it_should_count_visibility_flags() {
        assert_eq!(AccessFlags::empty().visibility_count(), 0);
        assert_eq!(
            (AccessFlags::PUBLIC | AccessFlags::PRIVATE | AccessFlags::STATIC).visibility_count(),
            2
        );
    }
}
