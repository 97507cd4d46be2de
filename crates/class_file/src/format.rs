//! Human readable rendering of constants, e.g. `<Class tag=7 name_index=1>`.

use std::fmt::{self, Write};

use bitflags::bitflags;

use crate::{
    constant_pool::{Constant, FieldKind, FieldValue, Utf8Info},
    ClassFileError, ConstantPool, Result,
};

/// Nesting limit when following references, so that reference cycles in a
/// malformed pool still render.
const MAX_RESOLVE_DEPTH: usize = 8;

bitflags! {
    pub struct DisplayFlags: u8 {
        /// Show what `_index` fields refer to instead of the raw index.
        const RESOLVE = 0b001;
        const HIDE_TAG_AND_LENGTH = 0b010;
        /// Show and read pool indices in hexadecimal.
        const HEX = 0b100;
    }
}

pub fn format_constant(
    constant: &Constant,
    constant_pool: &ConstantPool,
    flags: DisplayFlags,
) -> String {
    FormattedConstant {
        constant,
        constant_pool,
        flags,
    }
    .to_string()
}

struct FormattedConstant<'a> {
    constant: &'a Constant,
    constant_pool: &'a ConstantPool,
    flags: DisplayFlags,
}

impl fmt::Display for FormattedConstant<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_constant(f, self.constant, self.constant_pool, self.flags, 0)
    }
}

fn write_constant<W: Write>(
    w: &mut W,
    constant: &Constant,
    constant_pool: &ConstantPool,
    flags: DisplayFlags,
    depth: usize,
) -> fmt::Result {
    write!(w, "<{}", constant.name())?;

    for descriptor in constant.fields() {
        if flags.contains(DisplayFlags::HIDE_TAG_AND_LENGTH) && descriptor.is_structural() {
            continue;
        }
        let Some(value) = constant.field(descriptor.name) else {
            continue;
        };

        match value {
            FieldValue::Unsigned(index)
                if descriptor.kind == FieldKind::Index && flags.contains(DisplayFlags::RESOLVE) =>
            {
                match resolve(index as u16, constant_pool, depth) {
                    Ok(target) => {
                        let name = descriptor
                            .name
                            .strip_suffix("_index")
                            .unwrap_or(descriptor.name);
                        write!(w, " {}=", name)?;
                        match target {
                            Target::Utf8(info) => w.write_str(&latin1(&info.bytes))?,
                            Target::Constant(target) => {
                                write_constant(w, &target, constant_pool, flags, depth + 1)?
                            }
                        }
                    }
                    Err(e) => {
                        log::trace!("{}", e);
                        write!(w, " {}={}", descriptor.name, index)?;
                    }
                }
            }
            value => write!(w, " {}={}", descriptor.name, format_value(&value))?,
        }
    }

    w.write_char('>')
}

enum Target<'a> {
    Utf8(&'a Utf8Info),
    Constant(Constant),
}

fn resolve(index: u16, constant_pool: &ConstantPool, depth: usize) -> Result<Target<'_>> {
    if depth >= MAX_RESOLVE_DEPTH {
        return Err(ClassFileError::UnresolvableIndex(index));
    }

    match constant_pool.utf8(index) {
        Ok(info) => Ok(Target::Utf8(info)),
        Err(ClassFileError::UnexpectedConstantPoolEntry(_, constant)) => {
            Ok(Target::Constant(constant))
        }
        Err(e) => Err(e),
    }
}

/// Renders a field value, decoding bytes as Latin-1 so that every byte maps
/// to exactly one character.
pub fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Unsigned(v) => v.to_string(),
        FieldValue::Float(v) => v.to_string(),
        FieldValue::Bytes(bytes) => latin1(bytes),
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Zero-padded 1-based pool index, as shown at the start of each listing line.
pub fn format_index(index: usize, flags: DisplayFlags) -> String {
    if flags.contains(DisplayFlags::HEX) {
        format!("{:08x}", index)
    } else {
        format!("{:08}", index)
    }
}

/// One line per pool slot: `00000001: <Utf8 tag=1 length=4 bytes=test>`.
pub struct PoolListing<'a> {
    constant_pool: &'a ConstantPool,
    flags: DisplayFlags,
}

pub fn listing(constant_pool: &ConstantPool, flags: DisplayFlags) -> PoolListing<'_> {
    PoolListing {
        constant_pool,
        flags,
    }
}

impl fmt::Display for PoolListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, constant) in self.constant_pool.iter().enumerate() {
            writeln!(
                f,
                "{}: {}",
                format_index(i + 1, self.flags),
                FormattedConstant {
                    constant,
                    constant_pool: self.constant_pool,
                    flags: self.flags,
                }
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod format_constant_tests {
    use super::*;
    use crate::constant_pool::{ClassInfo, NameAndTypeInfo, RefInfo, Utf8Info};

    fn utf8(text: &str) -> Constant {
        Constant::Utf8(Utf8Info {
            length: text.len() as u16,
            bytes: text.as_bytes().to_vec(),
        })
    }

    fn pool() -> ConstantPool {
        ConstantPool::new(vec![utf8("test"), Constant::Class(ClassInfo { name_index: 1 })])
    }

    #[test]
    fn it_should_show_the_raw_index_when_not_resolving() {
        let pool = pool();

        assert_eq!(
            format_constant(&pool[2], &pool, DisplayFlags::empty()),
            "<Class tag=7 name_index=1>"
        );
    }

    #[test]
    fn it_should_substitute_a_utf8_when_resolving() {
        let pool = pool();

        assert_eq!(
            format_constant(&pool[2], &pool, DisplayFlags::RESOLVE),
            "<Class tag=7 name=test>"
        );
    }

    #[test]
    fn it_should_hide_the_tag_and_length() {
        let pool = pool();

        assert_eq!(
            format_constant(&pool[1], &pool, DisplayFlags::HIDE_TAG_AND_LENGTH),
            "<Utf8 bytes=test>"
        );
        assert_eq!(
            format_constant(&pool[1], &pool, DisplayFlags::empty()),
            "<Utf8 tag=1 length=4 bytes=test>"
        );
    }

    #[test]
    fn it_should_nest_resolved_constants() {
        let pool = ConstantPool::new(vec![
            utf8("java/lang/Object"),
            Constant::Class(ClassInfo { name_index: 1 }),
            utf8("<init>"),
            utf8("()V"),
            Constant::NameAndType(NameAndTypeInfo {
                name_index: 3,
                descriptor_index: 4,
            }),
            Constant::MethodRef(RefInfo {
                class_index: 2,
                name_and_type_index: 5,
            }),
        ]);

        assert_eq!(
            format_constant(
                &pool[6],
                &pool,
                DisplayFlags::RESOLVE | DisplayFlags::HIDE_TAG_AND_LENGTH
            ),
            "<Methodref class=<Class name=java/lang/Object> \
             name_and_type=<NameAndType name=<init> descriptor=()V>>"
        );
    }

    #[test]
    fn it_should_fall_back_to_the_raw_index_when_out_of_bounds() {
        let pool = ConstantPool::new(vec![
            Constant::Class(ClassInfo { name_index: 0 }),
            Constant::Class(ClassInfo { name_index: 9 }),
        ]);

        assert_eq!(
            format_constant(&pool[1], &pool, DisplayFlags::RESOLVE),
            "<Class tag=7 name_index=0>"
        );
        assert_eq!(
            format_constant(&pool[2], &pool, DisplayFlags::RESOLVE),
            "<Class tag=7 name_index=9>"
        );
    }

    #[test]
    fn it_should_terminate_on_a_reference_cycle() {
        let pool = ConstantPool::new(vec![Constant::Class(ClassInfo { name_index: 1 })]);

        let formatted = format_constant(&pool[1], &pool, DisplayFlags::RESOLVE);

        assert!(formatted.ends_with("name_index=1>>>>>>>>>"), "{}", formatted);
    }

    #[test]
    fn it_should_decode_bytes_as_latin1() {
        let pool = ConstantPool::new(vec![Constant::Utf8(Utf8Info {
            length: 2,
            bytes: vec![0xc3, 0xa9],
        })]);

        assert_eq!(
            format_constant(&pool[1], &pool, DisplayFlags::HIDE_TAG_AND_LENGTH),
            "<Utf8 bytes=Ã©>"
        );
    }

    #[test]
    fn it_should_be_stable_across_calls() {
        let pool = pool();
        let flags = DisplayFlags::RESOLVE | DisplayFlags::HEX;

        assert_eq!(
            format_constant(&pool[2], &pool, flags),
            format_constant(&pool[2], &pool, flags)
        );
    }
}
