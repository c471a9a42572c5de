use error::{OfpError, Result};
use ofp_utils::{Reader, Writer};
use openflow0x01::MsgCode;

/// The only protocol version this crate speaks.
pub const OFP_VERSION: u8 = 0x01;

/// Fixed 8-byte header carried by every OpenFlow message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfpHeader {
    version: u8,
    typ: u8,
    length: u16,
    xid: u32,
}

impl OfpHeader {
    pub fn new(version: u8, typ: u8, length: u16, xid: u32) -> OfpHeader {
        OfpHeader {
            version: version,
            typ: typ,
            length: length,
            xid: xid,
        }
    }

    pub fn size() -> usize {
        8
    }

    pub fn marshal(bytes: &mut Writer, header: &OfpHeader) {
        bytes.write_u8(header.version);
        bytes.write_u8(header.typ);
        bytes.write_u16(header.length);
        bytes.write_u32(header.xid);
    }

    /// Parse a header off the front of `buf`. The declared length is
    /// sanity-checked to cover at least the header itself; the version
    /// is the caller's business (the handshake reacts to mismatches).
    pub fn parse(buf: &[u8]) -> Result<OfpHeader> {
        let mut bytes = Reader::new(buf);
        let header = OfpHeader {
            version: bytes.read_u8()?,
            typ: bytes.read_u8()?,
            length: bytes.read_u16()?,
            xid: bytes.read_u32()?,
        };
        if (header.length as usize) < OfpHeader::size() {
            return Err(OfpError::LengthInconsistent);
        }
        Ok(header)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn typ(&self) -> u8 {
        self.typ
    }

    /// Map the raw type octet onto a message code, rejecting
    /// discriminants outside the enumerated set.
    pub fn type_code(&self) -> Result<MsgCode> {
        MsgCode::of_u8(self.typ)
    }

    pub fn length(&self) -> usize {
        self.length as usize
    }

    /// Byte count of the body following the header.
    pub fn body_length(&self) -> usize {
        self.length() - OfpHeader::size()
    }

    pub fn xid(&self) -> u32 {
        self.xid
    }
}
