use std::convert::TryFrom;

use crate::{
    class_file::{ClassFileHeader, MAGIC_IDENTIFIER},
    constant_pool::{Constant, Tag},
    cursor, version, ClassFile, ClassFileError, ConstantPool, Result,
};

pub struct Parser<'a> {
    buf: &'a [u8],
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Parses the header and the constant pool. Everything after the pool is
    /// kept as is.
    pub fn parse(mut self) -> Result<ClassFile> {
        let _ = self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;
        let constant_pool_count = self.read_u16()?;
        log::debug!(
            "Class file version {}.{}, {} constant pool slots",
            major_version,
            minor_version,
            constant_pool_count
        );

        let constant_pool = self.parse_constant_pool(constant_pool_count)?;

        Ok(ClassFile {
            header: ClassFileHeader {
                minor_version,
                major_version,
                constant_pool_count,
            },
            constant_pool,
            tail: self.buf.to_vec(),
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC_IDENTIFIER => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;

        if version::release_name(major).is_none() {
            return Err(ClassFileError::UnsupportedVersion(major));
        }

        Ok((major, minor))
    }

    /// On failure the constants decoded so far are returned inside
    /// [`ClassFileError::MalformedConstantPool`].
    pub(crate) fn parse_constant_pool(&mut self, constant_pool_count: u16) -> Result<ConstantPool> {
        let mut count = (constant_pool_count as usize).saturating_sub(1);
        let mut constant_pool = ConstantPool::default();
        while count > 0 {
            let (cp_info, slot_size) = match self.parse_cp_info() {
                Ok(parsed) => parsed,
                Err(source) => {
                    return Err(ClassFileError::MalformedConstantPool {
                        partial: constant_pool,
                        source: Box::new(source),
                    })
                }
            };
            log::trace!("#{}: {:?}", constant_pool.len() + 1, cp_info);
            constant_pool.push(cp_info);

            if slot_size > count {
                log::warn!("8-byte constant in the last slot of the constant pool");
            }
            (1..slot_size.min(count)).for_each(|_| constant_pool.push(Constant::Unusable));

            count = count.saturating_sub(slot_size);
        }

        Ok(constant_pool)
    }

    fn parse_cp_info(&mut self) -> Result<(Constant, usize)> {
        let tag = self.read_u8()?;
        let tag = Tag::try_from(tag).map_err(ClassFileError::UnknownTag)?;

        let width = match tag {
            Tag::Utf8 => {
                let (length, _) = cursor::take_uint(2, self.buf)?;
                tag.body_width() + length as usize
            }
            _ => tag.body_width(),
        };
        let body = self.take(width)?;

        Ok((Constant::decode(tag, body)?, tag.slot_size()))
    }

    fn take(&mut self, width: usize) -> Result<&'a [u8]> {
        let (head, rest) = cursor::take_bytes(width, self.buf)?;
        self.buf = rest;
        Ok(head)
    }

    fn read_uint(&mut self, width: usize) -> Result<u64> {
        let (value, rest) = cursor::take_uint(width, self.buf)?;
        self.buf = rest;
        Ok(value)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_uint(4)? as u32)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_uint(2)? as u16)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_uint(1)? as u8)
    }
}


#[cfg(test)]
mod parse_version_tests {
    use super::*;

    #[test]
    fn it_should_be_able_to_parse_a_version() {
        assert_eq!(
            Parser::new(&[0x00, 0x03, 0x00, 0x34]).parse_version().unwrap(),
            (52, 3)
        );
    }

    #[test]
    fn it_should_reject_an_unknown_major_version() {
        assert!(matches!(
            Parser::new(&[0x00, 0x00, 0x00, 0xff]).parse_version(),
            Err(ClassFileError::UnsupportedVersion(255))
        ));
    }
}
