use error::Result;
use ofp_header::OfpHeader;

/// OpenFlow Message
///
/// Version-agnostic API for handling OpenFlow messages at the byte-buffer level.
pub trait OfpMessage: Sized {
    /// Return the byte-size of an `OfpMessage`, header included.
    fn size_of(msg: &Self) -> usize;
    /// Create an `OfpHeader` for the given transaction id and OpenFlow message.
    fn header_of(xid: u32, msg: &Self) -> OfpHeader;
    /// Return a marshaled buffer containing an OpenFlow header and the message `msg`.
    /// The header's length field is back-patched after the body is emitted.
    fn marshal(xid: u32, msg: Self) -> Vec<u8>;
    /// Returns a pair `(u32, OfpMessage)` of the transaction id and OpenFlow message
    /// parsed from the given OpenFlow header `header` and body buffer `buf`.
    /// The buffer must hold exactly the body; leftovers are a `MalformedTrailer`.
    fn parse(header: &OfpHeader, buf: &[u8]) -> Result<(u32, Self)>;
}
