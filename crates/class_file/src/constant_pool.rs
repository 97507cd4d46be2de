use std::{
    convert::TryFrom,
    fmt,
    io::{self, Write},
    ops::Index,
};

use byteorder::{BigEndian, WriteBytesExt};

use crate::{cursor, ClassFileError, Result};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConstantPool {
    constants: Vec<Constant>,
}
impl ConstantPool {
    pub fn new(constants: Vec<Constant>) -> Self {
        Self { constants }
    }

    /// Number of slots, which is the declared `constant_pool_count` minus one.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Looks up a slot by its 1-based index. Index 0 is never valid.
    pub fn get(&self, index: u16) -> Option<&Constant> {
        let index = index.checked_sub(1)?;
        self.constants.get(index as usize)
    }

    pub fn get_mut(&mut self, index: u16) -> Option<&mut Constant> {
        let index = index.checked_sub(1)?;
        self.constants.get_mut(index as usize)
    }

    /// Looks up the constant an `_index` field refers to.
    pub fn resolve(&self, index: u16) -> Result<&Constant> {
        match self.get(index) {
            None | Some(Constant::Unusable) => Err(ClassFileError::UnresolvableIndex(index)),
            Some(constant) => Ok(constant),
        }
    }

    /// Resolves `index`, which must refer to a Utf8 constant.
    pub fn utf8(&self, index: u16) -> Result<&Utf8Info> {
        match self.resolve(index)? {
            Constant::Utf8(info) => Ok(info),
            c => Err(ClassFileError::UnexpectedConstantPoolEntry("Utf8", c.clone())),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constant> {
        self.constants.iter()
    }

    pub(crate) fn push(&mut self, constant: Constant) {
        self.constants.push(constant);
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.constants.iter().try_for_each(|c| c.write_to(w))
    }
}
impl Index<u16> for ConstantPool {
    type Output = Constant;

    fn index(&self, index: u16) -> &Self::Output {
        &self.constants[index as usize - 1]
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a Constant;
    type IntoIter = std::slice::Iter<'a, Constant>;

    fn into_iter(self) -> Self::IntoIter {
        self.constants.iter()
    }
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.4-140
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}
impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Tag::Utf8),
            3 => Ok(Tag::Integer),
            4 => Ok(Tag::Float),
            5 => Ok(Tag::Long),
            6 => Ok(Tag::Double),
            7 => Ok(Tag::Class),
            8 => Ok(Tag::String),
            9 => Ok(Tag::FieldRef),
            10 => Ok(Tag::MethodRef),
            11 => Ok(Tag::InterfaceMethodRef),
            12 => Ok(Tag::NameAndType),
            15 => Ok(Tag::MethodHandle),
            16 => Ok(Tag::MethodType),
            18 => Ok(Tag::InvokeDynamic),
            19 => Ok(Tag::Module),
            20 => Ok(Tag::Package),
            _ => Err(value),
        }
    }
}
impl Tag {
    /// Width of the fixed part of the body following the tag byte. For `Utf8`
    /// this is only the length prefix.
    pub fn body_width(self) -> usize {
        match self {
            Tag::Utf8 => 2,
            Tag::Integer | Tag::Float => 4,
            Tag::Long | Tag::Double => 8,
            Tag::Class | Tag::String | Tag::MethodType | Tag::Module | Tag::Package => 2,
            Tag::FieldRef
            | Tag::MethodRef
            | Tag::InterfaceMethodRef
            | Tag::NameAndType
            | Tag::InvokeDynamic => 4,
            Tag::MethodHandle => 3,
        }
    }

    /// Number of constant pool slots taken by an entry with this tag.
    pub fn slot_size(self) -> usize {
        match self {
            Tag::Long | Tag::Double => 2,
            _ => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Utf8 => "Utf8",
            Tag::Integer => "Integer",
            Tag::Float => "Float",
            Tag::Long => "Long",
            Tag::Double => "Double",
            Tag::Class => "Class",
            Tag::String => "String",
            Tag::FieldRef => "Fieldref",
            Tag::MethodRef => "Methodref",
            Tag::InterfaceMethodRef => "InterfaceMethodref",
            Tag::NameAndType => "NameAndType",
            Tag::MethodHandle => "MethodHandle",
            Tag::MethodType => "MethodType",
            Tag::InvokeDynamic => "InvokeDynamic",
            Tag::Module => "Module",
            Tag::Package => "Package",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Tag,
    /// Derived from the length of another field.
    Length,
    Unsigned,
    /// 1-based reference into the constant pool.
    Index,
    Float,
    Bytes,
}
impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Tag => "tag",
            FieldKind::Length => "length",
            FieldKind::Unsigned => "integer",
            FieldKind::Index => "index",
            FieldKind::Float => "float",
            FieldKind::Bytes => "bytes",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Width on the wire in bytes, 0 for variable length.
    pub width: usize,
}
impl FieldDescriptor {
    const fn new(name: &'static str, kind: FieldKind, width: usize) -> Self {
        Self { name, kind, width }
    }

    /// Whether the field is hidden from the editor and the tag-less display.
    pub fn is_structural(&self) -> bool {
        matches!(self.kind, FieldKind::Tag | FieldKind::Length)
    }
}

const TAG: FieldDescriptor = FieldDescriptor::new("tag", FieldKind::Tag, 1);

const fn index(name: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(name, FieldKind::Index, 2)
}

static UTF8_FIELDS: [FieldDescriptor; 3] = [
    TAG,
    FieldDescriptor::new("length", FieldKind::Length, 2),
    FieldDescriptor::new("bytes", FieldKind::Bytes, 0),
];
static INTEGER_FIELDS: [FieldDescriptor; 2] =
    [TAG, FieldDescriptor::new("bytes", FieldKind::Unsigned, 4)];
static FLOAT_FIELDS: [FieldDescriptor; 2] =
    [TAG, FieldDescriptor::new("bytes", FieldKind::Float, 4)];
static WIDE_FIELDS: [FieldDescriptor; 3] = [
    TAG,
    FieldDescriptor::new("high_bytes", FieldKind::Bytes, 4),
    FieldDescriptor::new("low_bytes", FieldKind::Bytes, 4),
];
static NAME_FIELDS: [FieldDescriptor; 2] = [TAG, index("name_index")];
static STRING_FIELDS: [FieldDescriptor; 2] = [TAG, index("string_index")];
static REF_FIELDS: [FieldDescriptor; 3] = [TAG, index("class_index"), index("name_and_type_index")];
static NAME_AND_TYPE_FIELDS: [FieldDescriptor; 3] =
    [TAG, index("name_index"), index("descriptor_index")];
static METHOD_HANDLE_FIELDS: [FieldDescriptor; 3] = [
    TAG,
    FieldDescriptor::new("reference_kind", FieldKind::Unsigned, 1),
    index("reference_index"),
];
static METHOD_TYPE_FIELDS: [FieldDescriptor; 2] = [TAG, index("descriptor_index")];
static INVOKE_DYNAMIC_FIELDS: [FieldDescriptor; 3] = [
    TAG,
    index("bootstrap_method_attr_index"),
    index("name_and_type_index"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Unsigned(u64),
    Float(f32),
    Bytes(Vec<u8>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Constant {
    Utf8(Utf8Info),
    Integer(IntegerInfo),
    Float(FloatInfo),
    Long(WideInfo),
    Double(WideInfo),
    Class(ClassInfo),
    String { string_index: u16 },
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    InvokeDynamic(InvokeDynamicInfo),
    Module(ModuleInfo),
    Package(PackageInfo),
    /// The slot following a `Long` or `Double`.
    Unusable,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Utf8Info {
    pub length: u16,
    pub bytes: Vec<u8>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct IntegerInfo {
    /// Two's-complement bit pattern of the `int`.
    pub bytes: u32,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FloatInfo {
    pub bytes: f32,
}

#[derive(Debug, PartialEq, Clone)]
pub struct WideInfo {
    pub high_bytes: [u8; 4],
    pub low_bytes: [u8; 4],
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ModuleInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PackageInfo {
    pub name_index: u16,
}

enum FieldSlot<'a> {
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    F32(&'a mut f32),
    Fixed(&'a mut [u8; 4]),
    Utf8(&'a mut Utf8Info),
}

impl Constant {
    /// Builds a constant from its body, the bytes following the tag. For
    /// `Utf8` the body is the length prefix followed by the payload.
    pub fn decode(tag: Tag, body: &[u8]) -> Result<Constant> {
        let constant = match tag {
            Tag::Utf8 => {
                let (length, rest) = split_u16(body)?;
                let (bytes, _) = cursor::take_bytes(length as usize, rest)?;
                Constant::Utf8(Utf8Info {
                    length,
                    bytes: bytes.to_vec(),
                })
            }
            Tag::Integer => Constant::Integer(IntegerInfo {
                bytes: split_u32(body)?.0,
            }),
            Tag::Float => Constant::Float(FloatInfo {
                bytes: f32::from_bits(split_u32(body)?.0),
            }),
            Tag::Long => Constant::Long(decode_wide(body)?),
            Tag::Double => Constant::Double(decode_wide(body)?),
            Tag::Class => Constant::Class(ClassInfo {
                name_index: split_u16(body)?.0,
            }),
            Tag::String => Constant::String {
                string_index: split_u16(body)?.0,
            },
            Tag::FieldRef => Constant::FieldRef(decode_ref(body)?),
            Tag::MethodRef => Constant::MethodRef(decode_ref(body)?),
            Tag::InterfaceMethodRef => Constant::InterfaceMethodRef(decode_ref(body)?),
            Tag::NameAndType => {
                let (name_index, rest) = split_u16(body)?;
                let (descriptor_index, _) = split_u16(rest)?;
                Constant::NameAndType(NameAndTypeInfo {
                    name_index,
                    descriptor_index,
                })
            }
            Tag::MethodHandle => {
                let (reference_kind, rest) = cursor::take_uint(1, body)?;
                let (reference_index, _) = split_u16(rest)?;
                Constant::MethodHandle(MethodHandleInfo {
                    reference_kind: reference_kind as u8,
                    reference_index,
                })
            }
            Tag::MethodType => Constant::MethodType(MethodTypeInfo {
                descriptor_index: split_u16(body)?.0,
            }),
            Tag::InvokeDynamic => {
                let (bootstrap_method_attr_index, rest) = split_u16(body)?;
                let (name_and_type_index, _) = split_u16(rest)?;
                Constant::InvokeDynamic(InvokeDynamicInfo {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                })
            }
            Tag::Module => Constant::Module(ModuleInfo {
                name_index: split_u16(body)?.0,
            }),
            Tag::Package => Constant::Package(PackageInfo {
                name_index: split_u16(body)?.0,
            }),
        };

        Ok(constant)
    }

    pub fn tag(&self) -> Option<Tag> {
        let tag = match self {
            Constant::Utf8(_) => Tag::Utf8,
            Constant::Integer(_) => Tag::Integer,
            Constant::Float(_) => Tag::Float,
            Constant::Long(_) => Tag::Long,
            Constant::Double(_) => Tag::Double,
            Constant::Class(_) => Tag::Class,
            Constant::String { .. } => Tag::String,
            Constant::FieldRef(_) => Tag::FieldRef,
            Constant::MethodRef(_) => Tag::MethodRef,
            Constant::InterfaceMethodRef(_) => Tag::InterfaceMethodRef,
            Constant::NameAndType(_) => Tag::NameAndType,
            Constant::MethodHandle(_) => Tag::MethodHandle,
            Constant::MethodType(_) => Tag::MethodType,
            Constant::InvokeDynamic(_) => Tag::InvokeDynamic,
            Constant::Module(_) => Tag::Module,
            Constant::Package(_) => Tag::Package,
            Constant::Unusable => return None,
        };

        Some(tag)
    }

    pub fn name(&self) -> &'static str {
        self.tag().map_or("Unusable", Tag::name)
    }

    /// The fields of this constant in wire order, tag first.
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        match self {
            Constant::Utf8(_) => &UTF8_FIELDS,
            Constant::Integer(_) => &INTEGER_FIELDS,
            Constant::Float(_) => &FLOAT_FIELDS,
            Constant::Long(_) | Constant::Double(_) => &WIDE_FIELDS,
            Constant::Class(_) | Constant::Module(_) | Constant::Package(_) => &NAME_FIELDS,
            Constant::String { .. } => &STRING_FIELDS,
            Constant::FieldRef(_) | Constant::MethodRef(_) | Constant::InterfaceMethodRef(_) => {
                &REF_FIELDS
            }
            Constant::NameAndType(_) => &NAME_AND_TYPE_FIELDS,
            Constant::MethodHandle(_) => &METHOD_HANDLE_FIELDS,
            Constant::MethodType(_) => &METHOD_TYPE_FIELDS,
            Constant::InvokeDynamic(_) => &INVOKE_DYNAMIC_FIELDS,
            Constant::Unusable => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<FieldValue> {
        use FieldValue::*;

        let value = match (self, name) {
            (_, "tag") => Unsigned(self.tag()? as u64),
            (Constant::Utf8(info), "length") => Unsigned(info.length.into()),
            (Constant::Utf8(info), "bytes") => Bytes(info.bytes.clone()),
            (Constant::Integer(info), "bytes") => Unsigned(info.bytes.into()),
            (Constant::Float(info), "bytes") => Float(info.bytes),
            (Constant::Long(info) | Constant::Double(info), "high_bytes") => {
                Bytes(info.high_bytes.to_vec())
            }
            (Constant::Long(info) | Constant::Double(info), "low_bytes") => {
                Bytes(info.low_bytes.to_vec())
            }
            (Constant::Class(ClassInfo { name_index }), "name_index")
            | (Constant::Module(ModuleInfo { name_index }), "name_index")
            | (Constant::Package(PackageInfo { name_index }), "name_index")
            | (Constant::NameAndType(NameAndTypeInfo { name_index, .. }), "name_index") => {
                Unsigned((*name_index).into())
            }
            (Constant::String { string_index }, "string_index") => {
                Unsigned((*string_index).into())
            }
            (
                Constant::FieldRef(info)
                | Constant::MethodRef(info)
                | Constant::InterfaceMethodRef(info),
                "class_index",
            ) => Unsigned(info.class_index.into()),
            (
                Constant::FieldRef(RefInfo {
                    name_and_type_index,
                    ..
                })
                | Constant::MethodRef(RefInfo {
                    name_and_type_index,
                    ..
                })
                | Constant::InterfaceMethodRef(RefInfo {
                    name_and_type_index,
                    ..
                })
                | Constant::InvokeDynamic(InvokeDynamicInfo {
                    name_and_type_index,
                    ..
                }),
                "name_and_type_index",
            ) => Unsigned((*name_and_type_index).into()),
            (Constant::NameAndType(NameAndTypeInfo { descriptor_index, .. }), "descriptor_index")
            | (Constant::MethodType(MethodTypeInfo { descriptor_index }), "descriptor_index") => {
                Unsigned((*descriptor_index).into())
            }
            (Constant::MethodHandle(info), "reference_kind") => {
                Unsigned(info.reference_kind.into())
            }
            (Constant::MethodHandle(info), "reference_index") => {
                Unsigned(info.reference_index.into())
            }
            (Constant::InvokeDynamic(info), "bootstrap_method_attr_index") => {
                Unsigned(info.bootstrap_method_attr_index.into())
            }
            _ => return None,
        };

        Some(value)
    }

    /// Replaces the value of a field. The value must have the field's type
    /// and fit its width. Setting the payload of a `Utf8` also updates its
    /// `length`.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
        let descriptor = *self
            .fields()
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| ClassFileError::NoSuchField(name.to_owned()))?;
        let invalid = |reason: String| ClassFileError::InvalidFieldValue {
            field: descriptor.name,
            reason,
        };

        if descriptor.is_structural() {
            return Err(invalid(format!("the {} is not editable", descriptor.kind)));
        }

        match (self.slot_mut(name), value) {
            (Some(FieldSlot::U8(field)), FieldValue::Unsigned(v)) => {
                *field = u8::try_from(v).map_err(|_| invalid(does_not_fit(v, 1)))?;
            }
            (Some(FieldSlot::U16(field)), FieldValue::Unsigned(v)) => {
                *field = u16::try_from(v).map_err(|_| invalid(does_not_fit(v, 2)))?;
            }
            (Some(FieldSlot::U32(field)), FieldValue::Unsigned(v)) => {
                *field = u32::try_from(v).map_err(|_| invalid(does_not_fit(v, 4)))?;
            }
            (Some(FieldSlot::F32(field)), FieldValue::Float(v)) => *field = v,
            (Some(FieldSlot::Fixed(field)), FieldValue::Bytes(v)) => {
                *field = <[u8; 4]>::try_from(&v[..])
                    .map_err(|_| invalid(format!("expected 4 bytes, found {}", v.len())))?;
            }
            (Some(FieldSlot::Utf8(info)), FieldValue::Bytes(v)) => {
                info.length = u16::try_from(v.len())
                    .map_err(|_| invalid(format!("{} bytes is too long", v.len())))?;
                info.bytes = v;
            }
            (_, v) => {
                return Err(invalid(format!(
                    "expected {} value, found {:?}",
                    descriptor.kind, v
                )))
            }
        }

        Ok(())
    }

    fn slot_mut(&mut self, name: &str) -> Option<FieldSlot<'_>> {
        let slot = match (self, name) {
            (Constant::Utf8(info), "bytes") => FieldSlot::Utf8(info),
            (Constant::Integer(info), "bytes") => FieldSlot::U32(&mut info.bytes),
            (Constant::Float(info), "bytes") => FieldSlot::F32(&mut info.bytes),
            (Constant::Long(info) | Constant::Double(info), "high_bytes") => {
                FieldSlot::Fixed(&mut info.high_bytes)
            }
            (Constant::Long(info) | Constant::Double(info), "low_bytes") => {
                FieldSlot::Fixed(&mut info.low_bytes)
            }
            (Constant::Class(ClassInfo { name_index }), "name_index")
            | (Constant::Module(ModuleInfo { name_index }), "name_index")
            | (Constant::Package(PackageInfo { name_index }), "name_index")
            | (Constant::NameAndType(NameAndTypeInfo { name_index, .. }), "name_index") => {
                FieldSlot::U16(name_index)
            }
            (Constant::String { string_index }, "string_index") => FieldSlot::U16(string_index),
            (
                Constant::FieldRef(info)
                | Constant::MethodRef(info)
                | Constant::InterfaceMethodRef(info),
                "class_index",
            ) => FieldSlot::U16(&mut info.class_index),
            (
                Constant::FieldRef(RefInfo {
                    name_and_type_index,
                    ..
                })
                | Constant::MethodRef(RefInfo {
                    name_and_type_index,
                    ..
                })
                | Constant::InterfaceMethodRef(RefInfo {
                    name_and_type_index,
                    ..
                })
                | Constant::InvokeDynamic(InvokeDynamicInfo {
                    name_and_type_index,
                    ..
                }),
                "name_and_type_index",
            ) => FieldSlot::U16(name_and_type_index),
            (Constant::NameAndType(NameAndTypeInfo { descriptor_index, .. }), "descriptor_index")
            | (Constant::MethodType(MethodTypeInfo { descriptor_index }), "descriptor_index") => {
                FieldSlot::U16(descriptor_index)
            }
            (Constant::MethodHandle(info), "reference_kind") => {
                FieldSlot::U8(&mut info.reference_kind)
            }
            (Constant::MethodHandle(info), "reference_index") => {
                FieldSlot::U16(&mut info.reference_index)
            }
            (Constant::InvokeDynamic(info), "bootstrap_method_attr_index") => {
                FieldSlot::U16(&mut info.bootstrap_method_attr_index)
            }
            _ => return None,
        };

        Some(slot)
    }

    /// Writes the tag followed by every field at its declared width.
    /// `Unusable` slots have no representation and write nothing.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let Some(tag) = self.tag() else {
            return Ok(());
        };
        w.write_u8(tag as u8)?;

        match self {
            Constant::Utf8(info) => {
                w.write_u16::<BigEndian>(info.length)?;
                w.write_all(&info.bytes)
            }
            Constant::Integer(info) => w.write_u32::<BigEndian>(info.bytes),
            Constant::Float(info) => w.write_u32::<BigEndian>(info.bytes.to_bits()),
            Constant::Long(info) | Constant::Double(info) => {
                w.write_all(&info.high_bytes)?;
                w.write_all(&info.low_bytes)
            }
            Constant::Class(ClassInfo { name_index })
            | Constant::Module(ModuleInfo { name_index })
            | Constant::Package(PackageInfo { name_index }) => {
                w.write_u16::<BigEndian>(*name_index)
            }
            Constant::String { string_index } => w.write_u16::<BigEndian>(*string_index),
            Constant::FieldRef(info)
            | Constant::MethodRef(info)
            | Constant::InterfaceMethodRef(info) => {
                w.write_u16::<BigEndian>(info.class_index)?;
                w.write_u16::<BigEndian>(info.name_and_type_index)
            }
            Constant::NameAndType(info) => {
                w.write_u16::<BigEndian>(info.name_index)?;
                w.write_u16::<BigEndian>(info.descriptor_index)
            }
            Constant::MethodHandle(info) => {
                w.write_u8(info.reference_kind)?;
                w.write_u16::<BigEndian>(info.reference_index)
            }
            Constant::MethodType(info) => w.write_u16::<BigEndian>(info.descriptor_index),
            Constant::InvokeDynamic(info) => {
                w.write_u16::<BigEndian>(info.bootstrap_method_attr_index)?;
                w.write_u16::<BigEndian>(info.name_and_type_index)
            }
            Constant::Unusable => Ok(()),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)
            .expect("writing to a Vec<u8> cannot fail");
        buf
    }
}

fn does_not_fit(value: u64, width: usize) -> String {
    format!("{} does not fit in {} byte(s)", value, width)
}

fn split_u16(buf: &[u8]) -> Result<(u16, &[u8])> {
    cursor::take_uint(2, buf).map(|(value, rest)| (value as u16, rest))
}

fn split_u32(buf: &[u8]) -> Result<(u32, &[u8])> {
    cursor::take_uint(4, buf).map(|(value, rest)| (value as u32, rest))
}

fn split_array(buf: &[u8]) -> Result<([u8; 4], &[u8])> {
    let (head, rest) = cursor::take_bytes(4, buf)?;
    let mut array = [0u8; 4];
    array.copy_from_slice(head);
    Ok((array, rest))
}

fn decode_wide(body: &[u8]) -> Result<WideInfo> {
    let (high_bytes, rest) = split_array(body)?;
    let (low_bytes, _) = split_array(rest)?;

    Ok(WideInfo {
        high_bytes,
        low_bytes,
    })
}

fn decode_ref(body: &[u8]) -> Result<RefInfo> {
    let (class_index, rest) = split_u16(body)?;
    let (name_and_type_index, _) = split_u16(rest)?;

    Ok(RefInfo {
        class_index,
        name_and_type_index,
    })
}

#[cfg(test)]
mod utf8_tests {
    use super::*;

    fn pool() -> ConstantPool {
        ConstantPool::new(vec![
            Constant::Utf8(Utf8Info {
                length: 4,
                bytes: b"test".to_vec(),
            }),
            Constant::Class(ClassInfo { name_index: 1 }),
            Constant::Unusable,
        ])
    }

    #[test]
    fn it_should_return_the_utf8_info() {
        assert_eq!(pool().utf8(1).unwrap().bytes, b"test");
    }

    #[test]
    fn it_should_reject_a_constant_of_another_kind() {
        match pool().utf8(2) {
            Err(ClassFileError::UnexpectedConstantPoolEntry(expected, found)) => {
                assert_eq!(expected, "Utf8");
                assert_eq!(found, Constant::Class(ClassInfo { name_index: 1 }));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn it_should_reject_unresolvable_indices() {
        let pool = pool();

        assert!(matches!(pool.utf8(0), Err(ClassFileError::UnresolvableIndex(0))));
        assert!(matches!(pool.utf8(3), Err(ClassFileError::UnresolvableIndex(3))));
        assert!(matches!(pool.utf8(4), Err(ClassFileError::UnresolvableIndex(4))));
    }
}
