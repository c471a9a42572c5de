/*!
The switch-facing TCP server: accepts connections, runs the OpenFlow
handshake on each, decodes inbound traffic, and dispatches it to the
controller handler. One reader thread and one writer thread per
connection; a misbehaving switch never affects its peers.
*/

use std::collections::HashMap;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rand;

use error::{ErrorCounters, OfpError, Result};
use framing::{write_message, MessageFramer};
use ofp_controller::{ConnectionHandle, OfpHandler};
use ofp_header::OFP_VERSION;
use ofp_message::OfpMessage;
use openflow0x01::message::{CsMessage, ScMessage};
use openflow0x01::{BadRequest, ErrorType, HelloFailed, SwitchError};

/// IANA-registered OpenFlow port.
pub const OFP_TCP_PORT: u16 = 6633;

struct Connection {
    handle: ConnectionHandle,
    stream: Option<TcpStream>,
}

struct ServerInner<H: OfpHandler> {
    listener: TcpListener,
    local_addr: SocketAddr,
    handler: H,
    connections: Mutex<HashMap<u64, Connection>>,
    counters: ErrorCounters,
    stopping: AtomicBool,
    next_id: AtomicU64,
    active: AtomicUsize,
}

/// A listening OpenFlow controller endpoint. Construct with `bind`,
/// start the accept loop with `serve`, stop with `shutdown`.
pub struct OfpServer<H: OfpHandler> {
    inner: Arc<ServerInner<H>>,
    accept_thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<H: OfpHandler> OfpServer<H> {
    pub fn bind<A: ToSocketAddrs>(addr: A, handler: H) -> io::Result<OfpServer<H>> {
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;
        Ok(OfpServer {
            inner: Arc::new(ServerInner {
                listener: listener,
                local_addr: local_addr,
                handler: handler,
                connections: Mutex::new(HashMap::new()),
                counters: ErrorCounters::new(),
                stopping: AtomicBool::new(false),
                next_id: AtomicU64::new(0),
                active: AtomicUsize::new(0),
            }),
            accept_thread: Mutex::new(None),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    pub fn counters(&self) -> &ErrorCounters {
        &self.inner.counters
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.lock().unwrap().len()
    }

    /// Spawn the accept loop. Returns immediately; connections are
    /// served on their own threads until `shutdown`.
    pub fn serve(&self) {
        let mut guard = self.accept_thread.lock().unwrap();
        if guard.is_some() {
            return;
        }
        let inner = self.inner.clone();
        *guard = Some(thread::spawn(move || ServerInner::accept_loop(inner)));
    }

    /// Encode `msg` once and queue it on every live connection.
    pub fn broadcast(&self, xid: u32, msg: CsMessage) {
        let bytes = CsMessage::marshal(xid, msg);
        let connections = self.inner.connections.lock().unwrap();
        for conn in connections.values() {
            let _ = conn.handle.send_bytes(bytes.clone());
        }
    }

    /// Stop accepting, close every connection, and wait up to `timeout`
    /// for connection threads to drain.
    pub fn shutdown(&self, timeout: Duration) {
        info!("controller shutting down");
        self.inner.stopping.store(true, Ordering::SeqCst);
        // wake the blocking accept call
        let _ = TcpStream::connect(self.inner.local_addr);
        if let Some(thread) = self.accept_thread.lock().unwrap().take() {
            let _ = thread.join();
        }
        {
            let connections = self.inner.connections.lock().unwrap();
            for conn in connections.values() {
                if let Some(ref stream) = conn.stream {
                    let _ = stream.shutdown(Shutdown::Both);
                }
            }
        }
        let deadline = Instant::now() + timeout;
        while self.inner.active.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        let leftover = self.inner.active.load(Ordering::SeqCst);
        if leftover > 0 {
            warn!("shutdown drain timed out with {} connections live", leftover);
        }
    }
}

impl<H: OfpHandler> ServerInner<H> {
    fn accept_loop(inner: Arc<ServerInner<H>>) {
        loop {
            let (stream, peer) = match inner.listener.accept() {
                Ok(pair) => pair,
                Err(e) => {
                    if inner.stopping.load(Ordering::SeqCst) {
                        break;
                    }
                    error!("accept failed: {}", e);
                    continue;
                }
            };
            if inner.stopping.load(Ordering::SeqCst) {
                break;
            }
            let id = inner.next_id.fetch_add(1, Ordering::SeqCst);
            debug!("connection {} accepted from {}", id, peer);
            inner.active.fetch_add(1, Ordering::SeqCst);
            let inner2 = inner.clone();
            thread::spawn(move || ServerInner::run_connection(inner2, id, stream, peer));
        }
    }

    fn run_connection(inner: Arc<ServerInner<H>>, id: u64, stream: TcpStream, peer: SocketAddr) {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let handle = ConnectionHandle::new(id, peer, tx);

        let writer_stream = match stream.try_clone() {
            Ok(s) => s,
            Err(e) => {
                inner.counters.record(&OfpError::Io(e));
                inner.active.fetch_sub(1, Ordering::SeqCst);
                return;
            }
        };
        // the writer drains the outbound queue one whole message at a
        // time and exits once every handle clone is gone
        thread::spawn(move || {
            let mut out = writer_stream;
            while let Ok(msg) = rx.recv() {
                if let Err(e) = write_message(&mut out, &msg) {
                    debug!("connection {}: write failed: {}", id, e);
                    break;
                }
            }
        });

        {
            let mut connections = inner.connections.lock().unwrap();
            connections.insert(
                id,
                Connection {
                    handle: handle.clone(),
                    stream: stream.try_clone().ok(),
                },
            );
        }

        let result = inner.read_loop(&handle, stream);
        if let Err(ref e) = result {
            inner.counters.record(e);
            warn!("connection {}: {}", id, e);
            ServerInner::<H>::emit_protocol_error(&handle, e);
        }

        inner.connections.lock().unwrap().remove(&id);
        inner.handler.switch_disconnected(&handle);
        inner.active.fetch_sub(1, Ordering::SeqCst);
        debug!("connection {} closed", id);
    }

    fn read_loop(&self, handle: &ConnectionHandle, mut stream: TcpStream) -> Result<()> {
        handle.send(rand::random(), CsMessage::Hello)?;
        let mut framer = MessageFramer::new();
        let mut hello_received = false;
        loop {
            let (header, body) = match framer.read_message(&mut stream)? {
                Some(msg) => msg,
                None => return Ok(()),
            };
            if header.version() != OFP_VERSION {
                let err =
                    SwitchError::new(ErrorType::HelloFailed(HelloFailed::Incompatible), vec![]);
                let _ = handle.send(header.xid(), CsMessage::Error(err));
                return Err(OfpError::VersionMismatch(header.version()));
            }
            let (xid, msg) = ScMessage::parse(&header, &body)?;
            if !hello_received {
                match msg {
                    ScMessage::Hello => {
                        hello_received = true;
                        trace!("connection {}: handshake complete", handle.id());
                        self.handler.switch_connected(handle);
                    }
                    _ => {
                        return Err(OfpError::InvalidEnum {
                            field: "handshake message type",
                            value: header.typ() as u64,
                        })
                    }
                }
            } else {
                self.handler.message_received(handle, xid, msg);
            }
        }
    }

    /// Tell a still-reachable switch why its connection is going away.
    fn emit_protocol_error(handle: &ConnectionHandle, e: &OfpError) {
        let code = match *e {
            OfpError::UnknownMessageType(_) => Some(BadRequest::BadType),
            OfpError::Truncated | OfpError::MalformedTrailer | OfpError::LengthInconsistent => {
                Some(BadRequest::BadLen)
            }
            _ => None,
        };
        if let Some(code) = code {
            let err = SwitchError::new(ErrorType::BadRequest(code), vec![]);
            let _ = handle.send(rand::random(), CsMessage::Error(err));
        }
    }
}
