//! Big-endian primitives shared by the encoder and decoder

use std::io::{self, Read};

use chrono::{DateTime, Utc};

use super::CodecError;

pub(crate) fn put_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub(crate) fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_time(buf: &mut Vec<u8>, t: &DateTime<Utc>) {
    put_i64(buf, t.timestamp());
}

/// Length-prefixed string: byte count, then the bytes
pub(crate) fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_u64(buf, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

pub(crate) fn read_u32<R: Read>(r: &mut R) -> Result<u32, CodecError> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_be_bytes(b))
}

pub(crate) fn read_i64<R: Read>(r: &mut R) -> Result<i64, CodecError> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(i64::from_be_bytes(b))
}

pub(crate) fn read_u64<R: Read>(r: &mut R) -> Result<u64, CodecError> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(u64::from_be_bytes(b))
}

pub(crate) fn read_time<R: Read>(r: &mut R) -> Result<DateTime<Utc>, CodecError> {
    let secs = read_i64(r)?;
    time_from_unix(secs)
}

pub(crate) fn time_from_unix(secs: i64) -> Result<DateTime<Utc>, CodecError> {
    DateTime::from_timestamp(secs, 0).ok_or(CodecError::InvalidTimestamp(secs))
}

/// Reads a length-prefixed string.
///
/// The length is checked against `max_len` first; the buffer then grows only
/// as bytes arrive, so a lying prefix never allocates up front.
pub(crate) fn read_string<R: Read>(r: &mut R, max_len: u64) -> Result<String, CodecError> {
    let len = read_u64(r)?;
    if len > max_len {
        return Err(CodecError::OversizedString { len, max: max_len });
    }

    let mut buf = Vec::new();
    let read = r.by_ref().take(len).read_to_end(&mut buf)?;
    if u64::try_from(read).map_or(true, |n| n < len) {
        return Err(CodecError::Truncated);
    }
    String::from_utf8(buf).map_err(|_| CodecError::InvalidUtf8)
}

/// Reads the leading byte of the next record; `None` on a clean end of stream
pub(crate) fn read_record_byte<R: Read>(r: &mut R) -> Result<Option<u8>, CodecError> {
    let mut b = [0u8; 1];
    loop {
        match r.read(&mut b) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(b[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_string_prefix_is_byte_length() {
        let mut buf = Vec::new();
        put_str(&mut buf, "héllo");
        assert_eq!(&buf[..8], &6u64.to_be_bytes());
        assert_eq!(buf.len(), 14);

        let s = read_string(&mut Cursor::new(buf), 64).unwrap();
        assert_eq!(s, "héllo");
    }

    #[test]
    fn test_integers_are_big_endian() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 1);
        put_i64(&mut buf, -2);
        assert_eq!(&buf[..4], &[0, 0, 0, 1]);
        assert_eq!(&buf[4..], &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);
    }

    #[test]
    fn test_oversized_length_rejected_before_read() {
        let buf = u64::MAX.to_be_bytes().to_vec();
        let err = read_string(&mut Cursor::new(buf), 1024).unwrap_err();
        assert!(matches!(
            err,
            CodecError::OversizedString {
                len: u64::MAX,
                max: 1024
            }
        ));
    }

    #[test]
    fn test_short_string_is_truncated() {
        let mut buf = 10u64.to_be_bytes().to_vec();
        buf.extend_from_slice(b"abc");
        let err = read_string(&mut Cursor::new(buf), 64).unwrap_err();
        assert!(matches!(err, CodecError::Truncated));
    }

    #[test]
    fn test_unbounded_limit_with_lying_prefix() {
        let mut buf = u64::MAX.to_be_bytes().to_vec();
        buf.extend_from_slice(b"only a few bytes");
        let err = read_string(&mut Cursor::new(buf), u64::MAX).unwrap_err();
        assert!(matches!(err, CodecError::Truncated));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut buf = 2u64.to_be_bytes().to_vec();
        buf.extend_from_slice(&[0xC3, 0x28]);
        let err = read_string(&mut Cursor::new(buf), 64).unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8));
    }

    #[test]
    fn test_record_byte_clean_eof() {
        let mut empty = Cursor::new(Vec::<u8>::new());
        assert!(read_record_byte(&mut empty).unwrap().is_none());

        let mut one = Cursor::new(vec![2u8]);
        assert_eq!(read_record_byte(&mut one).unwrap(), Some(2));
    }

    #[test]
    fn test_time_out_of_range() {
        assert!(matches!(
            time_from_unix(i64::MAX),
            Err(CodecError::InvalidTimestamp(i64::MAX))
        ));
        assert_eq!(time_from_unix(0).unwrap().timestamp(), 0);
    }
}
