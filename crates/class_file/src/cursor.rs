//! Splitting helpers over an immutable byte buffer.
//!
//! Every multi-byte integer in a class file is stored big-endian, so the only
//! interpretation offered here is an unsigned big-endian integer.

use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

/// Splits off the first `width` bytes of `buf` as raw bytes.
pub fn take_bytes(width: usize, buf: &[u8]) -> Result<(&[u8], &[u8])> {
    if buf.len() < width {
        return Err(ClassFileError::TruncatedInput {
            needed: width,
            available: buf.len(),
        });
    }

    Ok(buf.split_at(width))
}

/// Splits off the first `width` bytes of `buf` as an unsigned big-endian
/// integer. A width of 0 yields 0.
///
/// # Panics
///
/// Panics if `width` is greater than 8.
pub fn take_uint(width: usize, buf: &[u8]) -> Result<(u64, &[u8])> {
    let (head, rest) = take_bytes(width, buf)?;
    let value = match width {
        0 => 0,
        _ => BigEndian::read_uint(head, width),
    };

    Ok((value, rest))
}


#[cfg(test)]
mod take_uint_tests {
    use super::*;

    #[test]
    fn it_should_read_big_endian() {
        assert_eq!(
            take_uint(2, &[0x12, 0x34, 0x56]).unwrap(),
            (0x1234, &[0x56][..])
        );
    }

    #[test]
    fn it_should_yield_zero_for_a_zero_width() {
        assert_eq!(take_uint(0, &[0xff]).unwrap(), (0, &[0xff][..]));
    }

    #[test]
    fn it_should_not_sign_extend() {
        assert_eq!(
            take_uint(4, &[0xff, 0xff, 0xff, 0xfe]).unwrap().0,
            0xffff_fffe
        );
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        assert!(take_uint(4, &[0xca, 0xfe, 0xba]).is_err());
    }
}
