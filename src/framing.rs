/*!
Length-delimited framing of OpenFlow messages over a byte stream. The
reader accumulates into a growable buffer, peeks the length field out of
the fixed header, and splits off one message at a time; the writer sends
each encoded message as a single contiguous write.
*/

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder};
use bytes::BytesMut;

use error::{OfpError, Result};
use ofp_header::OfpHeader;

const READ_CHUNK: usize = 4096;

/// Per-connection reassembly buffer. Bytes are appended at the back as
/// the stream yields them and complete messages are split off the front.
#[derive(Debug)]
pub struct MessageFramer {
    buf: BytesMut,
}

impl MessageFramer {
    pub fn new() -> MessageFramer {
        MessageFramer {
            buf: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Bytes buffered but not yet claimed by a complete message.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Pull bytes from `stream` until one whole message is buffered,
    /// then hand it out as a parsed header plus body. Returns `Ok(None)`
    /// on EOF at a message boundary; EOF mid-message is `Truncated`.
    pub fn read_message<R: Read>(&mut self, stream: &mut R) -> Result<Option<(OfpHeader, Vec<u8>)>> {
        loop {
            // the length field sits in bytes 2..4 of the header
            if self.buf.len() >= 4 {
                let declared = BigEndian::read_u16(&self.buf[2..4]) as usize;
                if declared < OfpHeader::size() {
                    return Err(OfpError::LengthInconsistent);
                }
                if self.buf.len() >= declared {
                    let msg = self.buf.split_to(declared);
                    let header = OfpHeader::parse(&msg)?;
                    return Ok(Some((header, msg[OfpHeader::size()..].to_vec())));
                }
            }
            let mut chunk = [0; READ_CHUNK];
            let n = stream.read(&mut chunk)?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(OfpError::Truncated);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

/// Write one encoded message as a single contiguous send. Interleaving
/// bytes of two messages on one stream is never allowed, so callers
/// must serialize their use of the stream per connection.
pub fn write_message<W: Write>(stream: &mut W, bytes: &[u8]) -> io::Result<()> {
    stream.write_all(bytes)?;
    stream.flush()
}
