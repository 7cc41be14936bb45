//! Low-level binary reading primitives for the VPK format.
//!
//! All multi-byte integers in a VPK file are little-endian. Strings in the
//! directory tree are NUL-terminated UTF-8.

use std::io::{self, Read};

/// Reads a little-endian u32.
pub(crate) fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Reads a little-endian u16.
pub(crate) fn read_u16_le<R: Read>(reader: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Reads exactly `len` bytes.
pub(crate) fn read_bytes<R: Read>(reader: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Reads a NUL-terminated UTF-8 string.
///
/// Consumes bytes up to and including the terminating NUL. Fails with
/// `UnexpectedEof` if the stream ends before a NUL is seen, and with
/// `InvalidData` if the bytes are not valid UTF-8.
pub(crate) fn read_nul_string<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut bytes = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        reader.read_exact(&mut byte)?;
        if byte[0] == 0 {
            break;
        }
        bytes.push(byte[0]);
    }
    String::from_utf8(bytes).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            "non-UTF-8 string in directory tree",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_u32_le() {
        let mut cursor = Cursor::new(vec![0x34, 0x12, 0xaa, 0x55]);
        assert_eq!(read_u32_le(&mut cursor).unwrap(), 0x55aa1234);
    }

    #[test]
    fn test_read_u16_le() {
        let mut cursor = Cursor::new(vec![0xff, 0x7f]);
        assert_eq!(read_u16_le(&mut cursor).unwrap(), 0x7fff);
    }

    #[test]
    fn test_read_u32_truncated() {
        let mut cursor = Cursor::new(vec![0x01, 0x02]);
        let err = read_u32_le(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_read_bytes() {
        let mut cursor = Cursor::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(read_bytes(&mut cursor, 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(read_bytes(&mut cursor, 2).unwrap(), vec![4, 5]);
    }

    #[test]
    fn test_read_nul_string() {
        let mut cursor = Cursor::new(b"maps\0dota\0".to_vec());
        assert_eq!(read_nul_string(&mut cursor).unwrap(), "maps");
        assert_eq!(read_nul_string(&mut cursor).unwrap(), "dota");
    }

    #[test]
    fn test_read_nul_string_empty() {
        let mut cursor = Cursor::new(vec![0u8]);
        assert_eq!(read_nul_string(&mut cursor).unwrap(), "");
    }

    #[test]
    fn test_read_nul_string_unterminated() {
        let mut cursor = Cursor::new(b"abc".to_vec());
        let err = read_nul_string(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_read_nul_string_invalid_utf8() {
        let mut cursor = Cursor::new(vec![0xff, 0xfe, 0x00]);
        let err = read_nul_string(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
