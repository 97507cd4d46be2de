use std::{
    convert::TryFrom,
    io::{BufRead, Write},
};

use crate::{
    constant_pool::{Constant, FieldDescriptor, FieldKind, FieldValue},
    format::{self, DisplayFlags},
    ClassFile, ClassFileError, Result,
};

/// Edits the constants of a class file in place.
///
/// Constants are selected by their 1-based pool index and fields by their
/// 1-based position among the editable fields, i.e. every field but the tag
/// and the length.
pub struct Editor<'a> {
    class_file: &'a mut ClassFile,
    flags: DisplayFlags,
}
impl<'a> Editor<'a> {
    pub fn new(class_file: &'a mut ClassFile, flags: DisplayFlags) -> Self {
        Self { class_file, flags }
    }

    fn hex(&self) -> bool {
        self.flags.contains(DisplayFlags::HEX)
    }

    /// Parses a pool index typed by the user.
    pub fn select_constant(&self, input: &str) -> Result<u16> {
        let no_such_constant = || ClassFileError::NoSuchConstant(input.trim().to_owned());
        let index =
            u16::try_from(parse_number(input, self.hex())?).map_err(|_| no_such_constant())?;

        match self.class_file.constant_pool.get(index) {
            None | Some(Constant::Unusable) => Err(no_such_constant()),
            Some(_) => Ok(index),
        }
    }

    /// Parses a field number typed by the user.
    pub fn select_field(&self, index: u16, input: &str) -> Result<usize> {
        let number = usize::try_from(parse_number(input, self.hex())?)
            .map_err(|_| ClassFileError::NoSuchField(input.trim().to_owned()))?;
        self.editable_field(index, number)?;

        Ok(number)
    }

    pub fn editable_fields(&self, index: u16) -> Result<Vec<(FieldDescriptor, FieldValue)>> {
        let constant = self.constant(index)?;

        Ok(constant
            .fields()
            .iter()
            .filter(|descriptor| !descriptor.is_structural())
            .filter_map(|descriptor| Some((*descriptor, constant.field(descriptor.name)?)))
            .collect())
    }

    fn editable_field(&self, index: u16, number: usize) -> Result<FieldDescriptor> {
        number
            .checked_sub(1)
            .and_then(|n| {
                self.constant(index)
                    .ok()?
                    .fields()
                    .iter()
                    .filter(|descriptor| !descriptor.is_structural())
                    .nth(n)
                    .copied()
            })
            .ok_or_else(|| ClassFileError::NoSuchField(number.to_string()))
    }

    fn constant(&self, index: u16) -> Result<&Constant> {
        self.class_file
            .constant_pool
            .get(index)
            .ok_or_else(|| ClassFileError::NoSuchConstant(index.to_string()))
    }

    /// Replaces field `number` of constant `index` with `input`, converted to
    /// the field's type. Nothing changes if the conversion fails.
    pub fn edit(&mut self, index: u16, number: usize, input: &str) -> Result<()> {
        let descriptor = self.editable_field(index, number)?;
        let value = coerce(&descriptor, input, self.hex())?;
        log::debug!("#{}.{} = {:?}", index, descriptor.name, value);

        self.class_file
            .constant_pool
            .get_mut(index)
            .ok_or_else(|| ClassFileError::NoSuchConstant(index.to_string()))?
            .set_field(descriptor.name, value)
    }

    /// Runs the interactive edit loop until an empty line or end of input at
    /// the index prompt. Invalid selections and values are reported on
    /// `output` and leave the class file unchanged.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        loop {
            let line = match prompt(&mut input, &mut output, "Index (Enter nothing to save)? ")? {
                Some(line) if !line.trim().is_empty() => line,
                _ => return Ok(()),
            };

            match self.edit_interactively(&line, &mut input, &mut output) {
                Ok(true) => write!(
                    output,
                    "{}",
                    format::listing(&self.class_file.constant_pool, self.flags)
                )?,
                Ok(false) => return Ok(()),
                Err(ClassFileError::IOError(e)) => return Err(e.into()),
                Err(e) => {
                    log::warn!("{}", e);
                    writeln!(output, "error: {}", e)?;
                }
            }
        }
    }

    /// Returns `false` if the input ended before a value was entered.
    fn edit_interactively<R: BufRead, W: Write>(
        &mut self,
        index: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        let index = self.select_constant(index)?;
        for (number, (descriptor, value)) in self.editable_fields(index)?.iter().enumerate() {
            writeln!(
                output,
                "{}. {}: {}",
                self.format_number(number + 1),
                descriptor.name,
                format::format_value(value)
            )?;
        }

        let Some(field) = prompt(input, output, "Choose value to edit? ")? else {
            return Ok(false);
        };
        let number = self.select_field(index, &field)?;

        let Some(value) = prompt(input, output, "Enter value? ")? else {
            return Ok(false);
        };
        self.edit(index, number, &value)?;

        Ok(true)
    }

    fn format_number(&self, number: usize) -> String {
        if self.hex() {
            format!("{:x}", number)
        } else {
            number.to_string()
        }
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_owned()))
}

fn parse_number(input: &str, hex: bool) -> Result<i128> {
    parse_integer(input, hex)
        .ok_or_else(|| ClassFileError::InvalidNumber(input.trim().to_owned()))
}

fn parse_integer(input: &str, hex: bool) -> Option<i128> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, input),
    };
    if digits.starts_with(&['+', '-'][..]) {
        return None;
    }

    let value = if hex {
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
        i128::from_str_radix(digits, 16).ok()?
    } else {
        digits.parse::<i128>().ok()?
    };

    Some(if negative { -value } else { value })
}

/// Converts user input to a value of the field's type. Integers must fit the
/// field's width; negative values of plain integer fields are stored as their
/// two's complement.
fn coerce(descriptor: &FieldDescriptor, input: &str, hex: bool) -> Result<FieldValue> {
    let invalid = |reason: String| ClassFileError::InvalidFieldValue {
        field: descriptor.name,
        reason,
    };

    match descriptor.kind {
        FieldKind::Index | FieldKind::Unsigned => {
            let value = parse_integer(input, hex)
                .ok_or_else(|| invalid(format!("{:?} is not an integer", input)))?;
            let bits = 8 * descriptor.width as u32;
            let max = (1i128 << bits) - 1;
            let min = match descriptor.kind {
                FieldKind::Unsigned => -(1i128 << (bits - 1)),
                _ => 0,
            };
            if value < min || value > max {
                return Err(invalid(format!(
                    "{} is out of range {}..={}",
                    value, min, max
                )));
            }

            Ok(FieldValue::Unsigned((value & max) as u64))
        }
        FieldKind::Float => input
            .trim()
            .parse::<f32>()
            .map(FieldValue::Float)
            .map_err(|e| invalid(e.to_string())),
        FieldKind::Bytes => Ok(FieldValue::Bytes(input.as_bytes().to_vec())),
        FieldKind::Tag | FieldKind::Length => {
            Err(invalid(format!("the {} is not editable", descriptor.kind)))
        }
    }
}

#[cfg(test)]
mod parse_integer_tests {
    use super::*;

    #[test]
    fn it_should_parse_decimal() {
        assert_eq!(parse_integer(" 42\n", false), Some(42));
        assert_eq!(parse_integer("-1", false), Some(-1));
    }

    #[test]
    fn it_should_parse_hexadecimal_with_or_without_prefix() {
        assert_eq!(parse_integer("ff", true), Some(255));
        assert_eq!(parse_integer("0x1A", true), Some(26));
    }

    #[test]
    fn it_should_reject_garbage() {
        assert_eq!(parse_integer("", false), None);
        assert_eq!(parse_integer("ff", false), None);
        assert_eq!(parse_integer("--1", false), None);
    }
}

#[cfg(test)]
mod coerce_tests {
    use super::*;

    fn descriptor(kind: FieldKind, width: usize) -> FieldDescriptor {
        FieldDescriptor {
            name: "field",
            kind,
            width,
        }
    }

    #[test]
    fn it_should_truncate_negative_integers_to_the_field_width() {
        assert_eq!(
            coerce(&descriptor(FieldKind::Unsigned, 4), "-2", false).unwrap(),
            FieldValue::Unsigned(0xffff_fffe)
        );
    }

    #[test]
    fn it_should_reject_negative_indices() {
        assert!(coerce(&descriptor(FieldKind::Index, 2), "-1", false).is_err());
    }

    #[test]
    fn it_should_reject_values_wider_than_the_field() {
        assert!(coerce(&descriptor(FieldKind::Index, 2), "65536", false).is_err());
        assert!(coerce(&descriptor(FieldKind::Index, 2), "ffff", true).is_ok());
    }

    #[test]
    fn it_should_parse_floats() {
        assert_eq!(
            coerce(&descriptor(FieldKind::Float, 4), "2.5", false).unwrap(),
            FieldValue::Float(2.5)
        );
        assert!(coerce(&descriptor(FieldKind::Float, 4), "two", false).is_err());
    }

    #[test]
    fn it_should_encode_bytes_as_utf8() {
        assert_eq!(
            coerce(&descriptor(FieldKind::Bytes, 0), "é", false).unwrap(),
            FieldValue::Bytes(vec![0xc3, 0xa9])
        );
    }
}

#[cfg(test)]
mod editor_tests {
    use std::io::Cursor;

    use super::*;
    use crate::{
        class_file::ClassFileHeader,
        constant_pool::{ClassInfo, IntegerInfo, Utf8Info, WideInfo},
        ConstantPool,
    };

    fn class_file() -> ClassFile {
        ClassFile {
            header: ClassFileHeader {
                minor_version: 0,
                major_version: 52,
                constant_pool_count: 6,
            },
            constant_pool: ConstantPool::new(vec![
                Constant::Utf8(Utf8Info {
                    length: 4,
                    bytes: b"test".to_vec(),
                }),
                Constant::Class(ClassInfo { name_index: 1 }),
                Constant::Integer(IntegerInfo { bytes: 7 }),
                Constant::Long(WideInfo {
                    high_bytes: [0; 4],
                    low_bytes: [0; 4],
                }),
                Constant::Unusable,
            ]),
            tail: vec![],
        }
    }

    fn run(class_file: &mut ClassFile, flags: DisplayFlags, input: &str) -> String {
        let mut output = Vec::new();
        Editor::new(class_file, flags)
            .run(Cursor::new(input), &mut output)
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn it_should_list_only_editable_fields() {
        let mut class_file = class_file();
        let editor = Editor::new(&mut class_file, DisplayFlags::empty());

        let fields = editor.editable_fields(1).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0.name, "bytes");
        assert_eq!(fields[0].1, FieldValue::Bytes(b"test".to_vec()));
    }

    #[test]
    fn it_should_update_the_length_of_an_edited_utf8() {
        let mut class_file = class_file();
        Editor::new(&mut class_file, DisplayFlags::empty())
            .edit(1, 1, "hello")
            .unwrap();

        assert_eq!(
            class_file.constant_pool[1].encode(),
            [0x01, 0x00, 0x05, 0x68, 0x65, 0x6c, 0x6c, 0x6f]
        );
    }

    #[test]
    fn it_should_read_indices_in_hex_mode() {
        let mut class_file = class_file();
        let editor = Editor::new(&mut class_file, DisplayFlags::HEX);

        assert_eq!(editor.select_constant("0x3").unwrap(), 3);
        assert!(editor.select_constant("10").is_err());
    }

    #[test]
    fn it_should_not_select_an_unusable_slot() {
        let mut class_file = class_file();
        let editor = Editor::new(&mut class_file, DisplayFlags::empty());

        assert!(editor.select_constant("5").is_err());
        assert!(editor.select_constant("0").is_err());
    }

    #[test]
    fn it_should_edit_through_the_prompts() {
        let mut class_file = class_file();

        let output = run(&mut class_file, DisplayFlags::empty(), "2\n1\n3\n\n");

        assert_eq!(class_file.constant_pool[2], Constant::Class(ClassInfo { name_index: 3 }));
        assert!(output.contains("1. name_index: 1\n"));
        assert!(output.contains("00000002: <Class tag=7 name_index=3>\n"));
    }

    #[test]
    fn it_should_report_a_bad_value_and_carry_on() {
        let mut class_file = class_file();

        let output = run(
            &mut class_file,
            DisplayFlags::empty(),
            "3\n1\nseven\n3\n1\n-7\n",
        );

        assert!(output.contains("error: Invalid value for bytes"));
        assert_eq!(
            class_file.constant_pool[3],
            Constant::Integer(IntegerInfo {
                bytes: (-7i32) as u32
            })
        );
    }

    #[test]
    fn it_should_report_out_of_range_selections() {
        let mut class_file = class_file();
        let original = class_file.clone();

        let output = run(&mut class_file, DisplayFlags::empty(), "9\n2\n4\n");

        assert!(output.contains("error: No constant at index 9"));
        assert!(output.contains("error: No such field: 4"));
        assert_eq!(class_file, original);
    }

    #[test]
    fn it_should_report_input_that_is_not_a_number() {
        let mut class_file = class_file();
        let original = class_file.clone();

        let output = run(&mut class_file, DisplayFlags::empty(), "abc\n2\nfirst\n");

        assert!(output.contains("error: Not a number: abc\n"));
        assert!(output.contains("error: Not a number: first\n"));
        assert!(!output.contains("No constant at index"));
        assert!(!output.contains("No such field"));
        assert_eq!(class_file, original);
    }

    #[test]
    fn it_should_stop_at_end_of_input_mid_edit() {
        let mut class_file = class_file();
        let original = class_file.clone();

        run(&mut class_file, DisplayFlags::empty(), "1\n1\n");

        assert_eq!(class_file, original);
    }
}
