/*!
Byte-level primitives shared by every codec in the crate: a bounds-checked
big-endian reader over a borrowed slice, and a growable big-endian writer
with a back-patchable length slot for the OpenFlow header.
*/

use byteorder::{BigEndian, ByteOrder};

use error::{OfpError, Result};

/// A cursor over a borrowed byte slice. Every read is bounds-checked and
/// fails with `Truncated` when fewer bytes remain than requested; the
/// slice itself is never copied.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Reader<'a> {
        Reader { buf: buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(OfpError::Truncated);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn peek_u8(&self) -> Result<u8> {
        if self.is_empty() {
            return Err(OfpError::Truncated);
        }
        Ok(self.buf[self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Consume and return everything left in the buffer.
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.buf[self.pos..];
        self.pos = self.buf.len();
        slice
    }

    /// Split off a bounded sub-reader of exactly `n` bytes. The parent
    /// advances past them; the child cannot read beyond them.
    pub fn sub_reader(&mut self, n: usize) -> Result<Reader<'a>> {
        Ok(Reader::new(self.take(n)?))
    }

    /// Assert that a variant-complete decode consumed its whole slice.
    pub fn expect_end(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(OfpError::MalformedTrailer)
        }
    }
}

/// A growable big-endian writer. Writes never fail; the caller sizes the
/// buffer up-front where the intrinsic size is known.
#[derive(Debug)]
pub struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    pub fn new() -> Writer {
        Writer { bytes: Vec::new() }
    }

    pub fn with_capacity(n: usize) -> Writer {
        Writer { bytes: Vec::with_capacity(n) }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        let mut buf = [0; 2];
        BigEndian::write_u16(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_u32(&mut self, v: u32) {
        let mut buf = [0; 4];
        BigEndian::write_u32(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_u64(&mut self, v: u64) {
        let mut buf = [0; 8];
        BigEndian::write_u64(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_bytes(&mut self, v: &[u8]) {
        self.bytes.extend_from_slice(v);
    }

    pub fn pad(&mut self, n: usize) {
        for _ in 0..n {
            self.bytes.push(0);
        }
    }

    /// Reserve a 16-bit slot to be patched later, e.g. the length field
    /// of a header emitted before its body. Returns the slot offset.
    pub fn reserve_u16(&mut self) -> usize {
        let at = self.bytes.len();
        self.pad(2);
        at
    }

    pub fn patch_u16(&mut self, at: usize, v: u16) {
        BigEndian::write_u16(&mut self.bytes[at..at + 2], v);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Read `len` bytes holding a NUL-padded string, trimming the padding.
pub fn read_fixed_size_string(reader: &mut Reader, len: usize) -> Result<String> {
    let raw = reader.read_bytes(len)?;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(len);
    Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
}

/// Write `s` into a fixed `len`-byte field, NUL-padded. Oversized strings
/// are cut at `len - 1` so the field stays terminated.
pub fn write_fixed_size_string(writer: &mut Writer, s: &str, len: usize) {
    let raw = s.as_bytes();
    let n = if raw.len() >= len { len - 1 } else { raw.len() };
    writer.write_bytes(&raw[..n]);
    writer.pad(len - n);
}

#[cfg(test)]
mod tests {
    use super::*;
    use error::OfpError;

    #[test]
    fn read_big_endian_fields() {
        let mut r = Reader::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);
        assert_eq!(r.peek_u8().unwrap(), 0x01);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u16().unwrap(), 0x0203);
        assert_eq!(r.read_u32().unwrap(), 0x04050607);
        assert!(r.is_empty());
    }

    #[test]
    fn short_read_is_truncated() {
        let mut r = Reader::new(&[0x01, 0x02]);
        match r.read_u32() {
            Err(OfpError::Truncated) => {}
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn sub_reader_bounds() {
        let mut r = Reader::new(&[1, 2, 3, 4, 5]);
        let mut sub = r.sub_reader(3).unwrap();
        assert_eq!(sub.read_u16().unwrap(), 0x0102);
        assert!(sub.expect_end().is_err());
        assert_eq!(sub.read_u8().unwrap(), 3);
        assert!(sub.expect_end().is_ok());
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn writer_backpatch() {
        let mut w = Writer::new();
        w.write_u8(0xab);
        let slot = w.reserve_u16();
        w.write_u32(0xdeadbeef);
        let total = w.len() as u16;
        w.patch_u16(slot, total);
        assert_eq!(w.into_bytes(), vec![0xab, 0x00, 0x07, 0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn fixed_string_roundtrip() {
        let mut w = Writer::new();
        write_fixed_size_string(&mut w, "eth0", 16);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 16);
        let mut r = Reader::new(&bytes);
        assert_eq!(read_fixed_size_string(&mut r, 16).unwrap(), "eth0");
    }
}
