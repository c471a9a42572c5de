/*!
Parsing and building of the frames OpenFlow carries: Ethernet II with
optional 802.1Q tagging, ARP, IPv4 with its transport headers, and the
PaneDP discovery probe.
*/

use bits::{pack_tci, test_bit, unpack_tci};
use error::{OfpError, Result};
use ofp_utils::{Reader, Writer};

pub const ETH_TYP_IP: u16 = 0x0800;
pub const ETH_TYP_ARP: u16 = 0x0806;
pub const ETH_TYP_VLAN: u16 = 0x8100;
pub const ETH_TYP_PANE: u16 = 0x0777;
pub const ETH_TYP_IPV6: u16 = 0x86dd;
pub const ETH_TYP_8021X: u16 = 0x888e;

/// EtherTypes below this value are 802.3 length fields, not Ethernet II.
const ETH_TYP_MIN: u16 = 0x0600;

pub const MAC_BROADCAST: u64 = 0xffff_ffff_ffff;

pub fn bytes_of_mac(addr: u64) -> [u8; 6] {
    let mut arr = [0; 6];
    for i in 0..6 {
        arr[i] = (addr >> (8 * (5 - i)) & 0xff) as u8;
    }
    arr
}

pub fn mac_of_bytes(addr: [u8; 6]) -> u64 {
    let mut acc = 0u64;
    for i in 0..6 {
        acc = acc << 8 | addr[i] as u64;
    }
    acc
}

fn read_mac(bytes: &mut Reader) -> Result<u64> {
    let mut arr = [0; 6];
    arr.copy_from_slice(bytes.read_bytes(6)?);
    Ok(mac_of_bytes(arr))
}

fn write_mac(bytes: &mut Writer, addr: u64) {
    bytes.write_bytes(&bytes_of_mac(addr));
}

/// TCP header flags, including the NS bit from the adjacent reserved
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpFlags {
    pub fin: bool,
    pub syn: bool,
    pub rst: bool,
    pub psh: bool,
    pub ack: bool,
    pub urg: bool,
    pub ece: bool,
    pub cwr: bool,
    pub ns: bool,
}

impl TcpFlags {
    fn of_int(d: u16) -> TcpFlags {
        TcpFlags {
            fin: test_bit(0, d as u64),
            syn: test_bit(1, d as u64),
            rst: test_bit(2, d as u64),
            psh: test_bit(3, d as u64),
            ack: test_bit(4, d as u64),
            urg: test_bit(5, d as u64),
            ece: test_bit(6, d as u64),
            cwr: test_bit(7, d as u64),
            ns: test_bit(8, d as u64),
        }
    }

    fn to_int(&self) -> u16 {
        use bits::bit;
        let mut d = 0u64;
        d = bit(0, d, self.fin);
        d = bit(1, d, self.syn);
        d = bit(2, d, self.rst);
        d = bit(3, d, self.psh);
        d = bit(4, d, self.ack);
        d = bit(5, d, self.urg);
        d = bit(6, d, self.ece);
        d = bit(7, d, self.cwr);
        d = bit(8, d, self.ns);
        d as u16
    }
}

/// TCP header of a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tcp {
    pub src: u16,
    pub dst: u16,
    pub seq: u32,
    pub ack: u32,
    pub offset: u8,
    pub flags: TcpFlags,
    pub window: u16,
    pub chksum: u16,
    pub urgent: u16,
    pub payload: Vec<u8>,
}

impl Tcp {
    fn parse(bytes: &mut Reader) -> Result<Tcp> {
        let src = bytes.read_u16()?;
        let dst = bytes.read_u16()?;
        let seq = bytes.read_u32()?;
        let ack = bytes.read_u32()?;
        let offset_and_flags = bytes.read_u16()?;
        let offset = (offset_and_flags >> 12) as u8;
        let flags = TcpFlags::of_int(offset_and_flags & 0x01ff);
        let window = bytes.read_u16()?;
        let chksum = bytes.read_u16()?;
        let urgent = bytes.read_u16()?;
        let payload = bytes.rest().to_vec();
        Ok(Tcp {
            src: src,
            dst: dst,
            seq: seq,
            ack: ack,
            offset: offset,
            flags: flags,
            window: window,
            chksum: chksum,
            urgent: urgent,
            payload: payload,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.src);
        bytes.write_u16(self.dst);
        bytes.write_u32(self.seq);
        bytes.write_u32(self.ack);
        bytes.write_u16((self.offset as u16) << 12 | self.flags.to_int());
        bytes.write_u16(self.window);
        bytes.write_u16(self.chksum);
        bytes.write_u16(self.urgent);
        bytes.write_bytes(&self.payload);
    }
}

/// UDP header of a packet. The wire length field is derived from the
/// payload on output rather than stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Udp {
    pub src: u16,
    pub dst: u16,
    pub chksum: u16,
    pub payload: Vec<u8>,
}

impl Udp {
    fn parse(bytes: &mut Reader) -> Result<Udp> {
        let src = bytes.read_u16()?;
        let dst = bytes.read_u16()?;
        let _len = bytes.read_u16()?;
        let chksum = bytes.read_u16()?;
        let payload = bytes.rest().to_vec();
        Ok(Udp {
            src: src,
            dst: dst,
            chksum: chksum,
            payload: payload,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.src);
        bytes.write_u16(self.dst);
        bytes.write_u16(8 + self.payload.len() as u16);
        bytes.write_u16(self.chksum);
        bytes.write_bytes(&self.payload);
    }
}

/// ICMP header of a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icmp {
    pub typ: u8,
    pub code: u8,
    pub chksum: u16,
    pub payload: Vec<u8>,
}

impl Icmp {
    fn parse(bytes: &mut Reader) -> Result<Icmp> {
        let typ = bytes.read_u8()?;
        let code = bytes.read_u8()?;
        let chksum = bytes.read_u16()?;
        let payload = bytes.rest().to_vec();
        Ok(Icmp {
            typ: typ,
            code: code,
            chksum: chksum,
            payload: payload,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u8(self.typ);
        bytes.write_u8(self.code);
        bytes.write_u16(self.chksum);
        bytes.write_bytes(&self.payload);
    }
}

/// Transport-level view of an IPv4 payload. TCP, UDP, and ICMP headers
/// are decoded; any other protocol travels as its protocol number plus
/// raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tp {
    Tcp(Tcp),
    Udp(Udp),
    Icmp(Icmp),
    Unparsable(u8, Vec<u8>),
}

const IP_PROTO_ICMP: u8 = 0x01;
const IP_PROTO_TCP: u8 = 0x06;
const IP_PROTO_UDP: u8 = 0x11;

impl Tp {
    pub fn proto_code(&self) -> u8 {
        match *self {
            Tp::Tcp(_) => IP_PROTO_TCP,
            Tp::Udp(_) => IP_PROTO_UDP,
            Tp::Icmp(_) => IP_PROTO_ICMP,
            Tp::Unparsable(proto, _) => proto,
        }
    }

    fn marshal(&self, bytes: &mut Writer) {
        match *self {
            Tp::Tcp(ref tcp) => tcp.marshal(bytes),
            Tp::Udp(ref udp) => udp.marshal(bytes),
            Tp::Icmp(ref icmp) => icmp.marshal(bytes),
            Tp::Unparsable(_, ref body) => bytes.write_bytes(body),
        }
    }
}

/// The IPv4 control flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub dont_fragment: bool,
    pub more_fragments: bool,
}

/// IPv4 header of a packet. The total-length field is derived from the
/// content on output rather than stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ip {
    pub tos: u8,
    pub ident: u16,
    pub flags: Flags,
    pub frag: u16,
    pub ttl: u8,
    pub chksum: u16,
    pub src: u32,
    pub dst: u32,
    pub options: Vec<u8>,
    pub tp: Tp,
}

impl Ip {
    fn parse(bytes: &mut Reader) -> Result<Ip> {
        let vhl = bytes.read_u8()?;
        if vhl >> 4 != 4 {
            return Err(OfpError::InvalidEnum {
                field: "ip version",
                value: (vhl >> 4) as u64,
            });
        }
        let ihl = vhl & 0x0f;
        if ihl < 5 {
            return Err(OfpError::LengthInconsistent);
        }
        let tos = bytes.read_u8()?;
        let _total_len = bytes.read_u16()?;
        let ident = bytes.read_u16()?;
        let frag_word = bytes.read_u16()?;
        let flags = Flags {
            dont_fragment: test_bit(14, frag_word as u64),
            more_fragments: test_bit(13, frag_word as u64),
        };
        let frag = frag_word & 0x1fff;
        let ttl = bytes.read_u8()?;
        let proto = bytes.read_u8()?;
        let chksum = bytes.read_u16()?;
        let src = bytes.read_u32()?;
        let dst = bytes.read_u32()?;
        let options = bytes.read_bytes(ihl as usize * 4 - 20)?.to_vec();
        let body = bytes.rest();
        let tp = match proto {
            IP_PROTO_ICMP => match Icmp::parse(&mut Reader::new(body)) {
                Ok(icmp) => Tp::Icmp(icmp),
                Err(_) => Tp::Unparsable(proto, body.to_vec()),
            },
            IP_PROTO_TCP => match Tcp::parse(&mut Reader::new(body)) {
                Ok(tcp) => Tp::Tcp(tcp),
                Err(_) => Tp::Unparsable(proto, body.to_vec()),
            },
            IP_PROTO_UDP => match Udp::parse(&mut Reader::new(body)) {
                Ok(udp) => Tp::Udp(udp),
                Err(_) => Tp::Unparsable(proto, body.to_vec()),
            },
            _ => Tp::Unparsable(proto, body.to_vec()),
        };
        Ok(Ip {
            tos: tos,
            ident: ident,
            flags: flags,
            frag: frag,
            ttl: ttl,
            chksum: chksum,
            src: src,
            dst: dst,
            options: options,
            tp: tp,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        let ihl = (20 + self.options.len()) / 4;
        bytes.write_u8(4 << 4 | ihl as u8);
        bytes.write_u8(self.tos);
        let total_len_slot = bytes.reserve_u16();
        let written_before = bytes.len() - 4;
        bytes.write_u16(self.ident);
        let mut frag_word = self.frag & 0x1fff;
        if self.flags.dont_fragment {
            frag_word |= 1 << 14;
        }
        if self.flags.more_fragments {
            frag_word |= 1 << 13;
        }
        bytes.write_u16(frag_word);
        bytes.write_u8(self.ttl);
        bytes.write_u8(self.tp.proto_code());
        bytes.write_u16(self.chksum);
        bytes.write_u32(self.src);
        bytes.write_u32(self.dst);
        bytes.write_bytes(&self.options);
        self.tp.marshal(bytes);
        let total = (bytes.len() - written_before) as u16;
        bytes.patch_u16(total_len_slot, total);
    }
}

/// Address resolution protocol payload, queries and replies only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arp {
    Query(u64, u32, u32),
    Reply(u64, u32, u64, u32),
}

impl Arp {
    fn parse(bytes: &mut Reader) -> Result<Arp> {
        // hardware/protocol type and sizes; fixed for Ethernet/IPv4
        bytes.skip(6)?;
        let oper = bytes.read_u16()?;
        let sha = read_mac(bytes)?;
        let spa = bytes.read_u32()?;
        let tha = read_mac(bytes)?;
        let tpa = bytes.read_u32()?;
        match oper {
            0x0001 => Ok(Arp::Query(sha, spa, tpa)),
            0x0002 => Ok(Arp::Reply(sha, spa, tha, tpa)),
            code => Err(OfpError::InvalidEnum {
                field: "arp opcode",
                value: code as u64,
            }),
        }
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(0x0001);
        bytes.write_u16(ETH_TYP_IP);
        bytes.write_u8(6);
        bytes.write_u8(4);
        match *self {
            Arp::Query(sha, spa, tpa) => {
                bytes.write_u16(0x0001);
                write_mac(bytes, sha);
                bytes.write_u32(spa);
                write_mac(bytes, 0);
                bytes.write_u32(tpa);
            }
            Arp::Reply(sha, spa, tha, tpa) => {
                bytes.write_u16(0x0002);
                write_mac(bytes, sha);
                bytes.write_u32(spa);
                write_mac(bytes, tha);
                bytes.write_u32(tpa);
            }
        }
    }
}

/// Discovery probe frame carried under the experimental ethertype
/// 0x0777: the sending switch and the egress port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneDp {
    pub switch_id: u64,
    pub port_id: u16,
}

impl PaneDp {
    fn parse(bytes: &mut Reader) -> Result<PaneDp> {
        Ok(PaneDp {
            switch_id: bytes.read_u64()?,
            port_id: bytes.read_u16()?,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u64(self.switch_id);
        bytes.write_u16(self.port_id);
    }
}

/// Network-level view of an Ethernet body. IPv6 and 802.1X frames are
/// carried uninterpreted after their fixed headers check out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nw {
    Ip(Ip),
    Arp(Arp),
    PaneDp(PaneDp),
    Unparsable(u16, Vec<u8>),
}

impl Nw {
    pub fn ethertype(&self) -> u16 {
        match *self {
            Nw::Ip(_) => ETH_TYP_IP,
            Nw::Arp(_) => ETH_TYP_ARP,
            Nw::PaneDp(_) => ETH_TYP_PANE,
            Nw::Unparsable(typ, _) => typ,
        }
    }
}

/// An Ethernet II frame, possibly 802.1Q-tagged, and its decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub dl_src: u64,
    pub dl_dst: u64,
    pub dl_vlan: Option<u16>,
    pub dl_vlan_dei: bool,
    pub dl_vlan_pcp: u8,
    pub nw: Nw,
}

impl Packet {
    pub fn parse(buf: &[u8]) -> Result<Packet> {
        let mut bytes = Reader::new(buf);
        let dst = read_mac(&mut bytes)?;
        let src = read_mac(&mut bytes)?;
        let typ = bytes.read_u16()?;
        if typ < ETH_TYP_MIN {
            // 802.3 length field, not an Ethernet II frame
            return Err(OfpError::UnknownEtherType(typ));
        }
        let (tag, dei, pcp, typ) = match typ {
            ETH_TYP_VLAN => {
                let (pcp, dei, vid) = unpack_tci(bytes.read_u16()?);
                (Some(vid), dei, pcp, bytes.read_u16()?)
            }
            _ => (None, false, 0x0, typ),
        };
        let nw = match typ {
            ETH_TYP_IP => {
                let body = bytes.rest();
                match Ip::parse(&mut Reader::new(body)) {
                    Ok(ip) => Nw::Ip(ip),
                    Err(_) => Nw::Unparsable(typ, body.to_vec()),
                }
            }
            ETH_TYP_ARP => Nw::Arp(Arp::parse(&mut bytes)?),
            ETH_TYP_PANE => Nw::PaneDp(PaneDp::parse(&mut bytes)?),
            ETH_TYP_IPV6 => {
                if bytes.remaining() < 40 {
                    return Err(OfpError::Truncated);
                }
                Nw::Unparsable(typ, bytes.rest().to_vec())
            }
            ETH_TYP_8021X => {
                if bytes.remaining() < 4 {
                    return Err(OfpError::Truncated);
                }
                Nw::Unparsable(typ, bytes.rest().to_vec())
            }
            _ => return Err(OfpError::UnknownEtherType(typ)),
        };
        Ok(Packet {
            dl_src: src,
            dl_dst: dst,
            dl_vlan: tag,
            dl_vlan_dei: dei,
            dl_vlan_pcp: pcp,
            nw: nw,
        })
    }

    pub fn marshal(pk: &Packet, bytes: &mut Writer) {
        write_mac(bytes, pk.dl_dst);
        write_mac(bytes, pk.dl_src);
        if let Some(vid) = pk.dl_vlan {
            bytes.write_u16(ETH_TYP_VLAN);
            bytes.write_u16(pack_tci(pk.dl_vlan_pcp, pk.dl_vlan_dei, vid));
        }
        bytes.write_u16(pk.nw.ethertype());
        match pk.nw {
            Nw::Ip(ref ip) => ip.marshal(bytes),
            Nw::Arp(ref arp) => arp.marshal(bytes),
            Nw::PaneDp(ref probe) => probe.marshal(bytes),
            Nw::Unparsable(_, ref body) => bytes.write_bytes(body),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Writer::new();
        Packet::marshal(self, &mut bytes);
        bytes.into_bytes()
    }

    pub fn as_ip(&self) -> Option<&Ip> {
        match self.nw {
            Nw::Ip(ref ip) => Some(ip),
            _ => None,
        }
    }

    pub fn as_ip_tcp(&self) -> Option<(&Ip, &Tcp)> {
        match self.nw {
            Nw::Ip(ref ip) => match ip.tp {
                Tp::Tcp(ref tcp) => Some((ip, tcp)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_arp(&self) -> Option<&Arp> {
        match self.nw {
            Nw::Arp(ref arp) => Some(arp),
            _ => None,
        }
    }
}

/// Build a broadcast ARP query asking who holds `tpa`.
pub fn arp_query(sha: u64, spa: u32, tpa: u32) -> Packet {
    Packet {
        dl_src: sha,
        dl_dst: MAC_BROADCAST,
        dl_vlan: None,
        dl_vlan_dei: false,
        dl_vlan_pcp: 0,
        nw: Nw::Arp(Arp::Query(sha, spa, tpa)),
    }
}

/// Build a unicast ARP reply telling `tha` that `sha` holds `spa`.
pub fn arp_reply(sha: u64, spa: u32, tha: u64, tpa: u32) -> Packet {
    Packet {
        dl_src: sha,
        dl_dst: tha,
        dl_vlan: None,
        dl_vlan_dei: false,
        dl_vlan_pcp: 0,
        nw: Nw::Arp(Arp::Reply(sha, spa, tha, tpa)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error::OfpError;

    #[test]
    fn mac_helpers_are_inverse() {
        let mac = 0x001122334455;
        assert_eq!(bytes_of_mac(mac), [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(mac_of_bytes(bytes_of_mac(mac)), mac);
    }

    #[test]
    fn arp_query_wire_format() {
        let frame = arp_query(0x001122334455, 0x0a000001, 0x0a000002);
        let bytes = frame.to_bytes();
        assert_eq!(bytes.len(), 42);
        assert_eq!(
            &bytes[..22],
            &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x08,
              0x06, 0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01][..]
        );
        assert_eq!(Packet::parse(&bytes).unwrap(), frame);
    }

    #[test]
    fn arp_reply_roundtrip() {
        let frame = arp_reply(0x0a0b0c0d0e0f, 0xc0a80101, 0x001122334455, 0xc0a80102);
        assert_eq!(Packet::parse(&frame.to_bytes()).unwrap(), frame);
    }

    #[test]
    fn arp_bad_opcode_is_invalid_enum() {
        let mut bytes = arp_query(0x001122334455, 1, 2).to_bytes();
        // opcode field sits right after the fixed ARP preamble
        bytes[20] = 0x00;
        bytes[21] = 0x03;
        match Packet::parse(&bytes) {
            Err(OfpError::InvalidEnum { field: "arp opcode", .. }) => {}
            other => panic!("expected InvalidEnum, got {:?}", other),
        }
    }

    #[test]
    fn ethernet_one_frames_rejected() {
        let mut frame = vec![0u8; 14];
        frame[12] = 0x05;
        frame[13] = 0xff;
        match Packet::parse(&frame) {
            Err(OfpError::UnknownEtherType(0x05ff)) => {}
            other => panic!("expected UnknownEtherType, got {:?}", other),
        }
        // 0x0600 passes the Ethernet II check and fails only on dispatch
        frame[12] = 0x06;
        frame[13] = 0x00;
        match Packet::parse(&frame) {
            Err(OfpError::UnknownEtherType(0x0600)) => {}
            other => panic!("expected UnknownEtherType, got {:?}", other),
        }
    }

    fn tcp_frame() -> Packet {
        Packet {
            dl_src: 0x000000000001,
            dl_dst: 0x000000000002,
            dl_vlan: None,
            dl_vlan_dei: false,
            dl_vlan_pcp: 0,
            nw: Nw::Ip(Ip {
                tos: 0,
                ident: 0x1234,
                flags: Flags { dont_fragment: true, more_fragments: false },
                frag: 0,
                ttl: 64,
                chksum: 0xbeef,
                src: 0x0a000001,
                dst: 0x0a000002,
                options: vec![],
                tp: Tp::Tcp(Tcp {
                    src: 43512,
                    dst: 80,
                    seq: 1,
                    ack: 2,
                    offset: 5,
                    flags: TcpFlags {
                        fin: false,
                        syn: true,
                        rst: false,
                        psh: false,
                        ack: true,
                        urg: false,
                        ece: false,
                        cwr: false,
                        ns: false,
                    },
                    window: 0xffff,
                    chksum: 0xabcd,
                    urgent: 0,
                    payload: vec![1, 2, 3],
                }),
            }),
        }
    }

    #[test]
    fn ip_tcp_roundtrip() {
        let frame = tcp_frame();
        let bytes = frame.to_bytes();
        // derived IPv4 total length covers header plus TCP header and payload
        assert_eq!(&bytes[16..18], &[0x00, 43][..]);
        let parsed = Packet::parse(&bytes).unwrap();
        assert_eq!(parsed, frame);
        let (ip, tcp) = parsed.as_ip_tcp().unwrap();
        assert_eq!(ip.ttl, 64);
        assert_eq!(tcp.dst, 80);
    }

    #[test]
    fn udp_and_icmp_roundtrip() {
        let mut frame = tcp_frame();
        if let Nw::Ip(ref mut ip) = frame.nw {
            ip.tp = Tp::Udp(Udp { src: 53, dst: 4242, chksum: 0, payload: vec![9, 9] });
        }
        assert_eq!(Packet::parse(&frame.to_bytes()).unwrap(), frame);
        if let Nw::Ip(ref mut ip) = frame.nw {
            ip.tp = Tp::Icmp(Icmp { typ: 8, code: 0, chksum: 0x1111, payload: vec![0; 8] });
        }
        assert_eq!(Packet::parse(&frame.to_bytes()).unwrap(), frame);
    }

    #[test]
    fn unknown_ip_protocol_passes_through() {
        let mut frame = tcp_frame();
        if let Nw::Ip(ref mut ip) = frame.nw {
            ip.tp = Tp::Unparsable(89, vec![0xde, 0xad]);
        }
        let parsed = Packet::parse(&frame.to_bytes()).unwrap();
        assert_eq!(parsed, frame);
        assert!(parsed.as_ip_tcp().is_none());
    }

    #[test]
    fn vlan_tag_roundtrip() {
        let mut frame = tcp_frame();
        frame.dl_vlan = Some(0x123);
        frame.dl_vlan_pcp = 5;
        frame.dl_vlan_dei = true;
        let bytes = frame.to_bytes();
        assert_eq!(&bytes[12..14], &[0x81, 0x00][..]);
        assert_eq!(Packet::parse(&bytes).unwrap(), frame);
    }

    #[test]
    fn pane_probe_roundtrip() {
        let frame = Packet {
            dl_src: 0x02,
            dl_dst: MAC_BROADCAST,
            dl_vlan: None,
            dl_vlan_dei: false,
            dl_vlan_pcp: 0,
            nw: Nw::PaneDp(PaneDp { switch_id: 0xaabbccdd00112233, port_id: 7 }),
        };
        let bytes = frame.to_bytes();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[12..14], &[0x07, 0x77][..]);
        assert_eq!(Packet::parse(&bytes).unwrap(), frame);
    }

    #[test]
    fn ipv6_body_is_uninterpreted() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&[0; 12]);
        bytes.extend_from_slice(&[0x86, 0xdd]);
        bytes.extend_from_slice(&[0x60; 40]);
        let frame = Packet::parse(&bytes).unwrap();
        match frame.nw {
            Nw::Unparsable(ETH_TYP_IPV6, ref body) => assert_eq!(body.len(), 40),
            ref other => panic!("expected Unparsable body, got {:?}", other),
        }
        assert_eq!(frame.to_bytes(), bytes);
        // a frame shorter than the fixed IPv6 header is truncated
        match Packet::parse(&bytes[..20]) {
            Err(OfpError::Truncated) => {}
            other => panic!("expected Truncated, got {:?}", other),
        }
    }
}
