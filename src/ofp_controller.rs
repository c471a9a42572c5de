/*!
The surface between the server and controller logic: a handle for
talking back to one switch, and the trait controller applications
implement to receive decoded messages.
*/

use std::io;
use std::net::SocketAddr;
use std::sync::mpsc::Sender;

use error::{OfpError, Result};
use ofp_message::OfpMessage;
use openflow0x01::message::CsMessage;
use openflow0x01::message::ScMessage;

/// Handle to one live switch connection. Cloneable; sends are queued on
/// the connection's outbound channel and written by its writer thread,
/// so a whole message is always one contiguous send.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: u64,
    peer: SocketAddr,
    outbound: Sender<Vec<u8>>,
}

impl ConnectionHandle {
    pub(crate) fn new(id: u64, peer: SocketAddr, outbound: Sender<Vec<u8>>) -> ConnectionHandle {
        ConnectionHandle {
            id: id,
            peer: peer,
            outbound: outbound,
        }
    }

    /// Accept-order identity of this connection.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Serialize `msg` and queue it for transmission.
    pub fn send(&self, xid: u32, msg: CsMessage) -> Result<()> {
        self.send_bytes(CsMessage::marshal(xid, msg))
    }

    pub(crate) fn send_bytes(&self, bytes: Vec<u8>) -> Result<()> {
        self.outbound.send(bytes).map_err(|_| {
            OfpError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "connection closed",
            ))
        })
    }
}

/// Controller logic driven by the server. Calls are serialized per
/// connection but arrive concurrently across connections, so
/// implementations share state explicitly or not at all.
pub trait OfpHandler: Send + Sync + 'static {
    /// The OpenFlow handshake with this switch completed.
    fn switch_connected(&self, _conn: &ConnectionHandle) {}

    /// The connection is gone; the handle no longer accepts sends.
    fn switch_disconnected(&self, _conn: &ConnectionHandle) {}

    /// One decoded message, delivered in wire order.
    fn message_received(&self, conn: &ConnectionHandle, xid: u32, message: ScMessage);
}
