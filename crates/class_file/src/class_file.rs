use std::{
    fmt,
    io::{self, Write},
};

use byteorder::{BigEndian, WriteBytesExt};

use crate::{parser::Parser, version, ConstantPool, Result};

pub(crate) const MAGIC_IDENTIFIER: u32 = 0xCAFEBABE;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassFileHeader {
    pub minor_version: u16,
    pub major_version: u16,
    /// As declared in the file, one more than the number of pool slots.
    pub constant_pool_count: u16,
}
impl ClassFileHeader {
    /// Release name such as `1.8`, followed by the minor version when it is
    /// not zero.
    pub fn version(&self) -> String {
        let release = version::release_name(self.major_version)
            .unwrap_or_else(|| self.major_version.to_string());

        match self.minor_version {
            0 => release,
            minor => format!("{}.{}", release, minor),
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(MAGIC_IDENTIFIER)?;
        w.write_u16::<BigEndian>(self.minor_version)?;
        w.write_u16::<BigEndian>(self.major_version)?;
        w.write_u16::<BigEndian>(self.constant_pool_count)
    }
}

/// A class file split into the parts this crate understands. Everything
/// after the constant pool is carried along untouched in `tail`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub header: ClassFileHeader,
    pub constant_pool: ConstantPool,
    pub tail: Vec<u8>,
}
impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.header.write_to(w)?;
        self.constant_pool.write_to(w)?;
        w.write_all(&self.tail)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10 + self.tail.len());
        self.write_to(&mut buf)
            .expect("writing to a Vec<u8> cannot fail");
        buf
    }
}

impl fmt::Display for ClassFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Class File Version: {}", self.header.version())?;
        writeln!(
            f,
            "Constant Pool Length: {}",
            self.header.constant_pool_count
        )?;

        Ok(())
    }
}
