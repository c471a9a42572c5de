/*!
The OpenFlow 1.0 data model and wire codec: flow matches, actions,
flow-table modifications, statistics, port and queue configuration, and
the two direction-specific message enums in the `message` submodule.
*/

use bits::{bit, test_bit};
use error::{OfpError, Result};
use ofp_utils::{read_fixed_size_string, write_fixed_size_string, Reader, Writer};
use packet::{bytes_of_mac, mac_of_bytes};

/// OpenFlow message type codes, used by headers to identify the meaning
/// of the rest of a message.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MsgCode {
    Hello,
    Error,
    EchoReq,
    EchoResp,
    Vendor,
    FeaturesReq,
    FeaturesResp,
    GetConfigReq,
    GetConfigResp,
    SetConfig,
    PacketIn,
    FlowRemoved,
    PortStatus,
    PacketOut,
    FlowMod,
    PortMod,
    StatsReq,
    StatsResp,
    BarrierReq,
    BarrierResp,
    QueueGetConfigReq,
    QueueGetConfigResp,
}

impl MsgCode {
    pub fn of_u8(code: u8) -> Result<MsgCode> {
        let c = match code {
            0 => MsgCode::Hello,
            1 => MsgCode::Error,
            2 => MsgCode::EchoReq,
            3 => MsgCode::EchoResp,
            4 => MsgCode::Vendor,
            5 => MsgCode::FeaturesReq,
            6 => MsgCode::FeaturesResp,
            7 => MsgCode::GetConfigReq,
            8 => MsgCode::GetConfigResp,
            9 => MsgCode::SetConfig,
            10 => MsgCode::PacketIn,
            11 => MsgCode::FlowRemoved,
            12 => MsgCode::PortStatus,
            13 => MsgCode::PacketOut,
            14 => MsgCode::FlowMod,
            15 => MsgCode::PortMod,
            16 => MsgCode::StatsReq,
            17 => MsgCode::StatsResp,
            18 => MsgCode::BarrierReq,
            19 => MsgCode::BarrierResp,
            20 => MsgCode::QueueGetConfigReq,
            21 => MsgCode::QueueGetConfigResp,
            _ => return Err(OfpError::UnknownMessageType(code)),
        };
        Ok(c)
    }
}

/// Per-field wildcard bits of a flow match, with the 6-bit subnet mask
/// counts for the two IP address fields.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Wildcards {
    pub in_port: bool,
    pub dl_vlan: bool,
    pub dl_src: bool,
    pub dl_dst: bool,
    pub dl_type: bool,
    pub nw_proto: bool,
    pub tp_src: bool,
    pub tp_dst: bool,
    pub nw_src: u32,
    pub nw_dst: u32,
    pub dl_vlan_pcp: bool,
    pub nw_tos: bool,
}

impl Wildcards {
    fn set_nw_mask(f: u32, offset: usize, v: u32) -> u32 {
        f | ((0x3f & v) << offset)
    }

    fn get_nw_mask(f: u32, offset: usize) -> u32 {
        (f >> offset) & 0x3f
    }

    fn marshal(&self, bytes: &mut Writer) {
        let ret = 0u64;
        let ret = bit(0, ret, self.in_port);
        let ret = bit(1, ret, self.dl_vlan);
        let ret = bit(2, ret, self.dl_src);
        let ret = bit(3, ret, self.dl_dst);
        let ret = bit(4, ret, self.dl_type);
        let ret = bit(5, ret, self.nw_proto);
        let ret = bit(6, ret, self.tp_src);
        let ret = bit(7, ret, self.tp_dst);
        let ret = Wildcards::set_nw_mask(ret as u32, 8, self.nw_src);
        let ret = Wildcards::set_nw_mask(ret, 14, self.nw_dst);
        let ret = bit(20, ret as u64, self.dl_vlan_pcp);
        let ret = bit(21, ret, self.nw_tos);
        bytes.write_u32(ret as u32)
    }

    fn parse(bits: u32) -> Wildcards {
        Wildcards {
            in_port: test_bit(0, bits as u64),
            dl_vlan: test_bit(1, bits as u64),
            dl_src: test_bit(2, bits as u64),
            dl_dst: test_bit(3, bits as u64),
            dl_type: test_bit(4, bits as u64),
            nw_proto: test_bit(5, bits as u64),
            tp_src: test_bit(6, bits as u64),
            tp_dst: test_bit(7, bits as u64),
            nw_src: Wildcards::get_nw_mask(bits, 8),
            nw_dst: Wildcards::get_nw_mask(bits, 14),
            dl_vlan_pcp: test_bit(20, bits as u64),
            nw_tos: test_bit(21, bits as u64),
        }
    }

    fn mask_bits_of(m: &Option<Mask<u32>>) -> u32 {
        match *m {
            None => 32,
            Some(ref m) => m.mask.unwrap_or(0),
        }
    }
}

/// A value with an optional number of wildcarded low-order bits.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Mask<T> {
    pub value: T,
    pub mask: Option<T>,
}

/// Fields to match against packets, `None` meaning wildcarded. The
/// `dl_vlan` field distinguishes "any tag" (outer `None`) from
/// "untagged only" (`Some(None)`).
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Pattern {
    pub dl_src: Option<u64>,
    pub dl_dst: Option<u64>,
    pub dl_typ: Option<u16>,
    pub dl_vlan: Option<Option<u16>>,
    pub dl_vlan_pcp: Option<u8>,
    pub nw_src: Option<Mask<u32>>,
    pub nw_dst: Option<Mask<u32>>,
    pub nw_proto: Option<u8>,
    pub nw_tos: Option<u8>,
    pub tp_src: Option<u16>,
    pub tp_dst: Option<u16>,
    pub in_port: Option<u16>,
}

const OFP_MATCH_SIZE: usize = 40;

impl Pattern {
    pub fn match_all() -> Pattern {
        Pattern {
            dl_src: None,
            dl_dst: None,
            dl_typ: None,
            dl_vlan: None,
            dl_vlan_pcp: None,
            nw_src: None,
            nw_dst: None,
            nw_proto: None,
            nw_tos: None,
            tp_src: None,
            tp_dst: None,
            in_port: None,
        }
    }

    pub fn size_of(&self) -> usize {
        OFP_MATCH_SIZE
    }

    fn wildcards_of_pattern(&self) -> Wildcards {
        Wildcards {
            in_port: self.in_port.is_none(),
            dl_vlan: self.dl_vlan.is_none(),
            dl_src: self.dl_src.is_none(),
            dl_dst: self.dl_dst.is_none(),
            dl_type: self.dl_typ.is_none(),
            nw_proto: self.nw_proto.is_none(),
            tp_src: self.tp_src.is_none(),
            tp_dst: self.tp_dst.is_none(),
            nw_src: Wildcards::mask_bits_of(&self.nw_src),
            nw_dst: Wildcards::mask_bits_of(&self.nw_dst),
            dl_vlan_pcp: self.dl_vlan_pcp.is_none(),
            nw_tos: self.nw_tos.is_none(),
        }
    }

    fn read_mac(bytes: &mut Reader) -> Result<u64> {
        let mut arr = [0; 6];
        arr.copy_from_slice(bytes.read_bytes(6)?);
        Ok(mac_of_bytes(arr))
    }

    fn parse(bytes: &mut Reader) -> Result<Pattern> {
        let w = Wildcards::parse(bytes.read_u32()?);
        let in_port = if w.in_port {
            bytes.skip(2)?;
            None
        } else {
            Some(bytes.read_u16()?)
        };
        let dl_src = if w.dl_src {
            bytes.skip(6)?;
            None
        } else {
            Some(Pattern::read_mac(bytes)?)
        };
        let dl_dst = if w.dl_dst {
            bytes.skip(6)?;
            None
        } else {
            Some(Pattern::read_mac(bytes)?)
        };
        let dl_vlan = if w.dl_vlan {
            bytes.skip(2)?;
            None
        } else {
            let vlan = bytes.read_u16()?;
            if vlan == 0xffff {
                Some(None)
            } else {
                Some(Some(vlan))
            }
        };
        let dl_vlan_pcp = if w.dl_vlan_pcp {
            bytes.skip(1)?;
            None
        } else {
            Some(bytes.read_u8()?)
        };
        bytes.skip(1)?;
        let dl_typ = if w.dl_type {
            bytes.skip(2)?;
            None
        } else {
            Some(bytes.read_u16()?)
        };
        let nw_tos = if w.nw_tos {
            bytes.skip(1)?;
            None
        } else {
            Some(bytes.read_u8()?)
        };
        let nw_proto = if w.nw_proto {
            bytes.skip(1)?;
            None
        } else {
            Some(bytes.read_u8()?)
        };
        bytes.skip(2)?;
        let nw_src = Pattern::parse_nw_field(bytes, w.nw_src)?;
        let nw_dst = Pattern::parse_nw_field(bytes, w.nw_dst)?;
        let tp_src = if w.tp_src {
            bytes.skip(2)?;
            None
        } else {
            Some(bytes.read_u16()?)
        };
        let tp_dst = if w.tp_dst {
            bytes.skip(2)?;
            None
        } else {
            Some(bytes.read_u16()?)
        };
        Ok(Pattern {
            dl_src: dl_src,
            dl_dst: dl_dst,
            dl_typ: dl_typ,
            dl_vlan: dl_vlan,
            dl_vlan_pcp: dl_vlan_pcp,
            nw_src: nw_src,
            nw_dst: nw_dst,
            nw_proto: nw_proto,
            nw_tos: nw_tos,
            tp_src: tp_src,
            tp_dst: tp_dst,
            in_port: in_port,
        })
    }

    /// Subnet wildcard counts of 32 and above mean the field is fully
    /// wildcarded; the address bits on the wire are then ignored.
    fn parse_nw_field(bytes: &mut Reader, mask_bits: u32) -> Result<Option<Mask<u32>>> {
        if mask_bits >= 32 {
            bytes.skip(4)?;
            Ok(None)
        } else if mask_bits == 0 {
            Ok(Some(Mask {
                value: bytes.read_u32()?,
                mask: None,
            }))
        } else {
            Ok(Some(Mask {
                value: bytes.read_u32()?,
                mask: Some(mask_bits),
            }))
        }
    }

    fn marshal(&self, bytes: &mut Writer) {
        self.wildcards_of_pattern().marshal(bytes);
        bytes.write_u16(self.in_port.unwrap_or(0));
        bytes.write_bytes(&bytes_of_mac(self.dl_src.unwrap_or(0)));
        bytes.write_bytes(&bytes_of_mac(self.dl_dst.unwrap_or(0)));
        let vlan = match self.dl_vlan {
            Some(Some(v)) => v,
            Some(None) | None => 0xffff,
        };
        bytes.write_u16(vlan);
        bytes.write_u8(self.dl_vlan_pcp.unwrap_or(0));
        bytes.pad(1);
        bytes.write_u16(self.dl_typ.unwrap_or(0));
        bytes.write_u8(self.nw_tos.unwrap_or(0));
        bytes.write_u8(self.nw_proto.unwrap_or(0));
        bytes.pad(2);
        bytes.write_u32(self.nw_src.map(|m| m.value).unwrap_or(0));
        bytes.write_u32(self.nw_dst.map(|m| m.value).unwrap_or(0));
        bytes.write_u16(self.tp_src.unwrap_or(0));
        bytes.write_u16(self.tp_dst.unwrap_or(0));
    }
}

/// Reserved port numbers of OpenFlow 1.0.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OfpPort {
    Max = 0xff00,
    InPort = 0xfff8,
    Table = 0xfff9,
    Normal = 0xfffa,
    Flood = 0xfffb,
    All = 0xfffc,
    Controller = 0xfffd,
    Local = 0xfffe,
    None = 0xffff,
}

/// Port selector carried by actions and flow mods. `Controller` carries
/// the number of packet bytes to ship to the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PseudoPort {
    PhysicalPort(u16),
    InPort,
    Table,
    Normal,
    Flood,
    AllPorts,
    Controller(u16),
    Local,
}

impl PseudoPort {
    fn of_int(p: u16) -> Result<Option<PseudoPort>> {
        if p == OfpPort::None as u16 {
            Ok(None)
        } else {
            PseudoPort::make(p, 0).map(Some)
        }
    }

    fn make(p: u16, max_len: u16) -> Result<PseudoPort> {
        let res = match p {
            p if p == OfpPort::InPort as u16 => PseudoPort::InPort,
            p if p == OfpPort::Table as u16 => PseudoPort::Table,
            p if p == OfpPort::Normal as u16 => PseudoPort::Normal,
            p if p == OfpPort::Flood as u16 => PseudoPort::Flood,
            p if p == OfpPort::All as u16 => PseudoPort::AllPorts,
            p if p == OfpPort::Controller as u16 => PseudoPort::Controller(max_len),
            p if p == OfpPort::Local as u16 => PseudoPort::Local,
            p if p <= OfpPort::Max as u16 => PseudoPort::PhysicalPort(p),
            p => {
                return Err(OfpError::InvalidEnum {
                    field: "port number",
                    value: p as u64,
                })
            }
        };
        Ok(res)
    }

    fn marshal(&self, bytes: &mut Writer) {
        let code = match *self {
            PseudoPort::PhysicalPort(p) => p,
            PseudoPort::InPort => OfpPort::InPort as u16,
            PseudoPort::Table => OfpPort::Table as u16,
            PseudoPort::Normal => OfpPort::Normal as u16,
            PseudoPort::Flood => OfpPort::Flood as u16,
            PseudoPort::AllPorts => OfpPort::All as u16,
            PseudoPort::Controller(_) => OfpPort::Controller as u16,
            PseudoPort::Local => OfpPort::Local as u16,
        };
        bytes.write_u16(code)
    }
}

const ACTION_OUTPUT: u16 = 0;
const ACTION_SET_VLAN_VID: u16 = 1;
const ACTION_SET_VLAN_PCP: u16 = 2;
const ACTION_STRIP_VLAN: u16 = 3;
const ACTION_SET_DL_SRC: u16 = 4;
const ACTION_SET_DL_DST: u16 = 5;
const ACTION_SET_NW_SRC: u16 = 6;
const ACTION_SET_NW_DST: u16 = 7;
const ACTION_SET_NW_TOS: u16 = 8;
const ACTION_SET_TP_SRC: u16 = 9;
const ACTION_SET_TP_DST: u16 = 10;
const ACTION_ENQUEUE: u16 = 11;
const ACTION_VENDOR: u16 = 0xffff;

/// An atomic effect applied to a matched packet. Unknown action types
/// are carried as their raw type code plus body so lists round-trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Output(PseudoPort),
    SetVlanVid(u16),
    SetVlanPcp(u8),
    StripVlan,
    SetDlSrc(u64),
    SetDlDst(u64),
    SetNwSrc(u32),
    SetNwDst(u32),
    SetNwTos(u8),
    SetTpSrc(u16),
    SetTpDst(u16),
    Enqueue(PseudoPort, u32),
    Vendor(Vec<u8>),
    Unknown(u16, Vec<u8>),
}

impl Action {
    fn type_code(&self) -> u16 {
        match *self {
            Action::Output(_) => ACTION_OUTPUT,
            Action::SetVlanVid(_) => ACTION_SET_VLAN_VID,
            Action::SetVlanPcp(_) => ACTION_SET_VLAN_PCP,
            Action::StripVlan => ACTION_STRIP_VLAN,
            Action::SetDlSrc(_) => ACTION_SET_DL_SRC,
            Action::SetDlDst(_) => ACTION_SET_DL_DST,
            Action::SetNwSrc(_) => ACTION_SET_NW_SRC,
            Action::SetNwDst(_) => ACTION_SET_NW_DST,
            Action::SetNwTos(_) => ACTION_SET_NW_TOS,
            Action::SetTpSrc(_) => ACTION_SET_TP_SRC,
            Action::SetTpDst(_) => ACTION_SET_TP_DST,
            Action::Enqueue(_, _) => ACTION_ENQUEUE,
            Action::Vendor(_) => ACTION_VENDOR,
            Action::Unknown(typ, _) => typ,
        }
    }

    pub fn size_of(&self) -> usize {
        match *self {
            Action::SetDlSrc(_) | Action::SetDlDst(_) | Action::Enqueue(_, _) => 16,
            Action::Vendor(ref body) | Action::Unknown(_, ref body) => 4 + body.len(),
            _ => 8,
        }
    }

    pub fn size_of_sequence(actions: &[Action]) -> usize {
        actions.iter().fold(0, |acc, x| acc + x.size_of())
    }

    fn parse_one(bytes: &mut Reader) -> Result<Action> {
        let typ = bytes.read_u16()?;
        let len = bytes.read_u16()? as usize;
        if len < 4 || len % 8 != 0 {
            return Err(OfpError::LengthInconsistent);
        }
        // the declared length bounds this action even when we do not
        // understand its type
        let mut body = bytes.sub_reader(len - 4)?;
        let action = match typ {
            ACTION_OUTPUT => {
                let port_code = body.read_u16()?;
                let max_len = body.read_u16()?;
                Action::Output(PseudoPort::make(port_code, max_len)?)
            }
            ACTION_SET_VLAN_VID => {
                let vid = body.read_u16()?;
                Action::SetVlanVid(vid)
            }
            ACTION_SET_VLAN_PCP => Action::SetVlanPcp(body.read_u8()?),
            ACTION_STRIP_VLAN => Action::StripVlan,
            ACTION_SET_DL_SRC => Action::SetDlSrc(Pattern::read_mac(&mut body)?),
            ACTION_SET_DL_DST => Action::SetDlDst(Pattern::read_mac(&mut body)?),
            ACTION_SET_NW_SRC => Action::SetNwSrc(body.read_u32()?),
            ACTION_SET_NW_DST => Action::SetNwDst(body.read_u32()?),
            ACTION_SET_NW_TOS => Action::SetNwTos(body.read_u8()?),
            ACTION_SET_TP_SRC => Action::SetTpSrc(body.read_u16()?),
            ACTION_SET_TP_DST => Action::SetTpDst(body.read_u16()?),
            ACTION_ENQUEUE => {
                let port = body.read_u16()?;
                body.skip(6)?;
                Action::Enqueue(PseudoPort::make(port, 0)?, body.read_u32()?)
            }
            ACTION_VENDOR => Action::Vendor(body.rest().to_vec()),
            t => Action::Unknown(t, body.rest().to_vec()),
        };
        // whatever is left of the declared length is padding
        let _ = body.rest();
        Ok(action)
    }

    /// Parse actions until the enclosing slice is exhausted.
    pub fn parse_sequence(bytes: &mut Reader) -> Result<Vec<Action>> {
        let mut actions = vec![];
        while !bytes.is_empty() {
            actions.push(Action::parse_one(bytes)?);
        }
        Ok(actions)
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.type_code());
        bytes.write_u16(self.size_of() as u16);
        match *self {
            Action::Output(pp) => {
                pp.marshal(bytes);
                bytes.write_u16(match pp {
                    PseudoPort::Controller(max_len) => max_len,
                    _ => 0,
                });
            }
            Action::SetVlanVid(vid) => {
                bytes.write_u16(vid);
                bytes.pad(2);
            }
            Action::SetVlanPcp(pcp) => {
                bytes.write_u8(pcp);
                bytes.pad(3);
            }
            Action::StripVlan => bytes.pad(4),
            Action::SetDlSrc(mac) | Action::SetDlDst(mac) => {
                bytes.write_bytes(&bytes_of_mac(mac));
                bytes.pad(6);
            }
            Action::SetNwSrc(addr) | Action::SetNwDst(addr) => bytes.write_u32(addr),
            Action::SetNwTos(tos) => {
                bytes.write_u8(tos);
                bytes.pad(3);
            }
            Action::SetTpSrc(pt) | Action::SetTpDst(pt) => {
                bytes.write_u16(pt);
                bytes.pad(2);
            }
            Action::Enqueue(pp, qid) => {
                pp.marshal(bytes);
                bytes.pad(6);
                bytes.write_u32(qid);
            }
            Action::Vendor(ref body) | Action::Unknown(_, ref body) => bytes.write_bytes(body),
        }
    }

    fn marshal_sequence(actions: &[Action], bytes: &mut Writer) {
        for act in actions {
            act.marshal(bytes);
        }
    }
}

/// How long before a flow entry expires.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Timeout {
    Permanent,
    ExpiresAfter(u16),
}

impl Timeout {
    fn of_int(tm: u16) -> Timeout {
        match tm {
            0 => Timeout::Permanent,
            d => Timeout::ExpiresAfter(d),
        }
    }

    fn to_int(&self) -> u16 {
        match *self {
            Timeout::Permanent => 0,
            Timeout::ExpiresAfter(d) => d,
        }
    }
}

/// Capabilities supported by the datapath.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub flow_stats: bool,
    pub table_stats: bool,
    pub port_stats: bool,
    pub stp: bool,
    pub ip_reasm: bool,
    pub queue_stats: bool,
    pub arp_match_ip: bool,
}

impl Capabilities {
    fn of_int(d: u32) -> Capabilities {
        Capabilities {
            flow_stats: test_bit(0, d as u64),
            table_stats: test_bit(1, d as u64),
            port_stats: test_bit(2, d as u64),
            stp: test_bit(3, d as u64),
            ip_reasm: test_bit(5, d as u64),
            queue_stats: test_bit(6, d as u64),
            arp_match_ip: test_bit(7, d as u64),
        }
    }

    fn to_int(&self) -> u32 {
        let mut d = 0u64;
        d = bit(0, d, self.flow_stats);
        d = bit(1, d, self.table_stats);
        d = bit(2, d, self.port_stats);
        d = bit(3, d, self.stp);
        d = bit(5, d, self.ip_reasm);
        d = bit(6, d, self.queue_stats);
        d = bit(7, d, self.arp_match_ip);
        d as u32
    }
}

/// Actions supported by the datapath.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SupportedActions {
    pub output: bool,
    pub set_vlan_id: bool,
    pub set_vlan_pcp: bool,
    pub strip_vlan: bool,
    pub set_dl_src: bool,
    pub set_dl_dst: bool,
    pub set_nw_src: bool,
    pub set_nw_dst: bool,
    pub set_nw_tos: bool,
    pub set_tp_src: bool,
    pub set_tp_dst: bool,
    pub enqueue: bool,
    pub vendor: bool,
}

impl SupportedActions {
    fn of_int(d: u32) -> SupportedActions {
        SupportedActions {
            output: test_bit(0, d as u64),
            set_vlan_id: test_bit(1, d as u64),
            set_vlan_pcp: test_bit(2, d as u64),
            strip_vlan: test_bit(3, d as u64),
            set_dl_src: test_bit(4, d as u64),
            set_dl_dst: test_bit(5, d as u64),
            set_nw_src: test_bit(6, d as u64),
            set_nw_dst: test_bit(7, d as u64),
            set_nw_tos: test_bit(8, d as u64),
            set_tp_src: test_bit(9, d as u64),
            set_tp_dst: test_bit(10, d as u64),
            enqueue: test_bit(11, d as u64),
            vendor: test_bit(12, d as u64),
        }
    }

    fn to_int(&self) -> u32 {
        let mut d = 0u64;
        d = bit(0, d, self.output);
        d = bit(1, d, self.set_vlan_id);
        d = bit(2, d, self.set_vlan_pcp);
        d = bit(3, d, self.strip_vlan);
        d = bit(4, d, self.set_dl_src);
        d = bit(5, d, self.set_dl_dst);
        d = bit(6, d, self.set_nw_src);
        d = bit(7, d, self.set_nw_dst);
        d = bit(8, d, self.set_nw_tos);
        d = bit(9, d, self.set_tp_src);
        d = bit(10, d, self.set_tp_dst);
        d = bit(11, d, self.enqueue);
        d = bit(12, d, self.vendor);
        d as u32
    }
}

/// Switch features, the body of the features reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchFeatures {
    pub datapath_id: u64,
    pub num_buffers: u32,
    pub num_tables: u8,
    pub supported_capabilities: Capabilities,
    pub supported_actions: SupportedActions,
    pub ports: Vec<PortDesc>,
}

impl SwitchFeatures {
    fn size_of(&self) -> usize {
        24 + self.ports.len() * PORT_DESC_SIZE
    }

    fn parse(bytes: &mut Reader) -> Result<SwitchFeatures> {
        let datapath_id = bytes.read_u64()?;
        let num_buffers = bytes.read_u32()?;
        let num_tables = bytes.read_u8()?;
        bytes.skip(3)?;
        let supported_capabilities = Capabilities::of_int(bytes.read_u32()?);
        let supported_actions = SupportedActions::of_int(bytes.read_u32()?);
        let mut ports = vec![];
        while !bytes.is_empty() {
            ports.push(PortDesc::parse(bytes)?);
        }
        Ok(SwitchFeatures {
            datapath_id: datapath_id,
            num_buffers: num_buffers,
            num_tables: num_tables,
            supported_capabilities: supported_capabilities,
            supported_actions: supported_actions,
            ports: ports,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u64(self.datapath_id);
        bytes.write_u32(self.num_buffers);
        bytes.write_u8(self.num_tables);
        bytes.pad(3);
        bytes.write_u32(self.supported_capabilities.to_int());
        bytes.write_u32(self.supported_actions.to_int());
        for port in &self.ports {
            port.marshal(bytes);
        }
    }
}

/// STP state of a port.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StpState {
    Listen,
    Learn,
    Forward,
    Block,
}

/// Current state of a physical port. Not configurable by the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PortState {
    pub down: bool,
    pub stp_state: StpState,
}

impl PortState {
    fn of_int(d: u32) -> PortState {
        PortState {
            down: test_bit(0, d as u64),
            stp_state: match (d >> 8) & 0x3 {
                0 => StpState::Listen,
                1 => StpState::Learn,
                2 => StpState::Forward,
                _ => StpState::Block,
            },
        }
    }

    fn to_int(&self) -> u32 {
        bit(0, (self.stp_state as u32 as u64) << 8, self.down) as u32
    }
}

/// Features of physical ports available in a datapath.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PortFeatures {
    pub f_10mbhd: bool,
    pub f_10mbfd: bool,
    pub f_100mbhd: bool,
    pub f_100mbfd: bool,
    pub f_1gbhd: bool,
    pub f_1gbfd: bool,
    pub f_10gbfd: bool,
    pub copper: bool,
    pub fiber: bool,
    pub autoneg: bool,
    pub pause: bool,
    pub pause_asym: bool,
}

impl PortFeatures {
    fn of_int(d: u32) -> PortFeatures {
        PortFeatures {
            f_10mbhd: test_bit(0, d as u64),
            f_10mbfd: test_bit(1, d as u64),
            f_100mbhd: test_bit(2, d as u64),
            f_100mbfd: test_bit(3, d as u64),
            f_1gbhd: test_bit(4, d as u64),
            f_1gbfd: test_bit(5, d as u64),
            f_10gbfd: test_bit(6, d as u64),
            copper: test_bit(7, d as u64),
            fiber: test_bit(8, d as u64),
            autoneg: test_bit(9, d as u64),
            pause: test_bit(10, d as u64),
            pause_asym: test_bit(11, d as u64),
        }
    }

    fn to_int(&self) -> u32 {
        let mut d = 0u64;
        d = bit(0, d, self.f_10mbhd);
        d = bit(1, d, self.f_10mbfd);
        d = bit(2, d, self.f_100mbhd);
        d = bit(3, d, self.f_100mbfd);
        d = bit(4, d, self.f_1gbhd);
        d = bit(5, d, self.f_1gbfd);
        d = bit(6, d, self.f_10gbfd);
        d = bit(7, d, self.copper);
        d = bit(8, d, self.fiber);
        d = bit(9, d, self.autoneg);
        d = bit(10, d, self.pause);
        d = bit(11, d, self.pause_asym);
        d as u32
    }

    pub fn none() -> PortFeatures {
        PortFeatures::of_int(0)
    }
}

/// Flags describing and configuring the behavior of a physical port.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PortConfig {
    pub down: bool,
    pub no_stp: bool,
    pub no_recv: bool,
    pub no_recv_stp: bool,
    pub no_flood: bool,
    pub no_fwd: bool,
    pub no_packet_in: bool,
}

impl PortConfig {
    fn of_int(d: u32) -> PortConfig {
        PortConfig {
            down: test_bit(0, d as u64),
            no_stp: test_bit(1, d as u64),
            no_recv: test_bit(2, d as u64),
            no_recv_stp: test_bit(3, d as u64),
            no_flood: test_bit(4, d as u64),
            no_fwd: test_bit(5, d as u64),
            no_packet_in: test_bit(6, d as u64),
        }
    }

    fn to_int(&self) -> u32 {
        let mut d = 0u64;
        d = bit(0, d, self.down);
        d = bit(1, d, self.no_stp);
        d = bit(2, d, self.no_recv);
        d = bit(3, d, self.no_recv_stp);
        d = bit(4, d, self.no_flood);
        d = bit(5, d, self.no_fwd);
        d = bit(6, d, self.no_packet_in);
        d as u32
    }

    pub fn none() -> PortConfig {
        PortConfig::of_int(0)
    }
}

const PORT_DESC_SIZE: usize = 48;

/// Description of a physical port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortDesc {
    pub port_no: u16,
    pub hw_addr: u64,
    pub name: String,
    pub config: PortConfig,
    pub state: PortState,
    pub curr: PortFeatures,
    pub advertised: PortFeatures,
    pub supported: PortFeatures,
    pub peer: PortFeatures,
}

impl PortDesc {
    fn parse(bytes: &mut Reader) -> Result<PortDesc> {
        let port_no = bytes.read_u16()?;
        let hw_addr = Pattern::read_mac(bytes)?;
        let name = read_fixed_size_string(bytes, 16)?;
        let config = PortConfig::of_int(bytes.read_u32()?);
        let state = PortState::of_int(bytes.read_u32()?);
        let curr = PortFeatures::of_int(bytes.read_u32()?);
        let advertised = PortFeatures::of_int(bytes.read_u32()?);
        let supported = PortFeatures::of_int(bytes.read_u32()?);
        let peer = PortFeatures::of_int(bytes.read_u32()?);
        Ok(PortDesc {
            port_no: port_no,
            hw_addr: hw_addr,
            name: name,
            config: config,
            state: state,
            curr: curr,
            advertised: advertised,
            supported: supported,
            peer: peer,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.port_no);
        bytes.write_bytes(&bytes_of_mac(self.hw_addr));
        write_fixed_size_string(bytes, &self.name, 16);
        bytes.write_u32(self.config.to_int());
        bytes.write_u32(self.state.to_int());
        bytes.write_u32(self.curr.to_int());
        bytes.write_u32(self.advertised.to_int());
        bytes.write_u32(self.supported.to_int());
        bytes.write_u32(self.peer.to_int());
    }
}

/// Type of modification to perform on a flow table.
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FlowModCmd {
    AddFlow,
    ModFlow,
    ModStrictFlow,
    DeleteFlow,
    DeleteStrictFlow,
}

impl FlowModCmd {
    fn of_int(d: u16) -> Result<FlowModCmd> {
        let cmd = match d {
            0 => FlowModCmd::AddFlow,
            1 => FlowModCmd::ModFlow,
            2 => FlowModCmd::ModStrictFlow,
            3 => FlowModCmd::DeleteFlow,
            4 => FlowModCmd::DeleteStrictFlow,
            d => {
                return Err(OfpError::InvalidEnum {
                    field: "flow mod command",
                    value: d as u64,
                })
            }
        };
        Ok(cmd)
    }
}

/// Represents modifications to a flow table from the controller.
#[derive(Debug, PartialEq, Clone)]
pub struct FlowMod {
    pub command: FlowModCmd,
    pub pattern: Pattern,
    pub priority: u16,
    pub actions: Vec<Action>,
    pub cookie: u64,
    pub idle_timeout: Timeout,
    pub hard_timeout: Timeout,
    pub notify_when_removed: bool,
    pub apply_to_packet: Option<u32>,
    pub out_port: Option<PseudoPort>,
    pub check_overlap: bool,
}

const NO_BUFFER: u32 = 0xffffffff;

impl FlowMod {
    fn flags_to_int(check_overlap: bool, notify_when_removed: bool) -> u16 {
        (if check_overlap { 1 << 1 } else { 0 }) | (if notify_when_removed { 1 } else { 0 })
    }

    fn size_of(&self) -> usize {
        self.pattern.size_of() + 24 + Action::size_of_sequence(&self.actions)
    }

    fn parse(bytes: &mut Reader) -> Result<FlowMod> {
        let pattern = Pattern::parse(bytes)?;
        let cookie = bytes.read_u64()?;
        let command = FlowModCmd::of_int(bytes.read_u16()?)?;
        let idle = Timeout::of_int(bytes.read_u16()?);
        let hard = Timeout::of_int(bytes.read_u16()?);
        let priority = bytes.read_u16()?;
        let buffer_id = bytes.read_u32()?;
        let out_port = PseudoPort::of_int(bytes.read_u16()?)?;
        let flags = bytes.read_u16()?;
        let actions = Action::parse_sequence(bytes)?;
        Ok(FlowMod {
            command: command,
            pattern: pattern,
            priority: priority,
            actions: actions,
            cookie: cookie,
            idle_timeout: idle,
            hard_timeout: hard,
            notify_when_removed: flags & 1 != 0,
            apply_to_packet: match buffer_id {
                NO_BUFFER => None,
                n => Some(n),
            },
            out_port: out_port,
            check_overlap: flags & 2 != 0,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        self.pattern.marshal(bytes);
        bytes.write_u64(self.cookie);
        bytes.write_u16(self.command as u16);
        bytes.write_u16(self.idle_timeout.to_int());
        bytes.write_u16(self.hard_timeout.to_int());
        bytes.write_u16(self.priority);
        bytes.write_u32(self.apply_to_packet.unwrap_or(NO_BUFFER));
        match self.out_port {
            None => bytes.write_u16(OfpPort::None as u16),
            Some(port) => port.marshal(bytes),
        }
        bytes.write_u16(FlowMod::flags_to_int(self.check_overlap, self.notify_when_removed));
        Action::marshal_sequence(&self.actions, bytes);
    }
}

/// The data associated with a packet surfaced to or emitted by the
/// controller: either resident in a switch buffer or carried inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Buffered(u32, Vec<u8>),
    NotBuffered(Vec<u8>),
}

impl Payload {
    pub fn bytes(&self) -> &[u8] {
        match *self {
            Payload::Buffered(_, ref buf) | Payload::NotBuffered(ref buf) => buf,
        }
    }

    fn size_of(&self) -> usize {
        self.bytes().len()
    }

    fn buffer_id(&self) -> u32 {
        match *self {
            Payload::Buffered(n, _) => n,
            Payload::NotBuffered(_) => NO_BUFFER,
        }
    }
}

/// The reason a packet arrives at the controller.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketInReason {
    NoMatch,
    ExplicitSend,
}

impl PacketInReason {
    fn of_int(d: u8) -> Result<PacketInReason> {
        match d {
            0 => Ok(PacketInReason::NoMatch),
            1 => Ok(PacketInReason::ExplicitSend),
            d => Err(OfpError::InvalidEnum {
                field: "packet in reason",
                value: d as u64,
            }),
        }
    }
}

/// A packet received by the datapath and sent to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIn {
    pub input_payload: Payload,
    pub total_len: u16,
    pub port: u16,
    pub reason: PacketInReason,
}

impl PacketIn {
    fn size_of(&self) -> usize {
        10 + self.input_payload.size_of()
    }

    fn parse(bytes: &mut Reader) -> Result<PacketIn> {
        let buf_id = bytes.read_u32()?;
        let total_len = bytes.read_u16()?;
        let port = bytes.read_u16()?;
        let reason = PacketInReason::of_int(bytes.read_u8()?)?;
        bytes.skip(1)?;
        let pk = bytes.rest().to_vec();
        let payload = match buf_id {
            NO_BUFFER => Payload::NotBuffered(pk),
            n => Payload::Buffered(n, pk),
        };
        Ok(PacketIn {
            input_payload: payload,
            total_len: total_len,
            port: port,
            reason: reason,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u32(self.input_payload.buffer_id());
        bytes.write_u16(self.total_len);
        bytes.write_u16(self.port);
        bytes.write_u8(self.reason as u8);
        bytes.pad(1);
        bytes.write_bytes(self.input_payload.bytes());
    }
}

/// A packet emitted by the controller through the datapath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOut {
    pub output_payload: Payload,
    pub port_id: Option<u16>,
    pub apply_actions: Vec<Action>,
}

impl PacketOut {
    fn size_of(&self) -> usize {
        let trailer = match self.output_payload {
            Payload::Buffered(_, _) => 0,
            Payload::NotBuffered(ref buf) => buf.len(),
        };
        8 + Action::size_of_sequence(&self.apply_actions) + trailer
    }

    fn parse(bytes: &mut Reader) -> Result<PacketOut> {
        let buf_id = bytes.read_u32()?;
        let in_port = bytes.read_u16()?;
        let actions_len = bytes.read_u16()? as usize;
        let mut actions_bytes = bytes.sub_reader(actions_len)?;
        let actions = Action::parse_sequence(&mut actions_bytes)?;
        let payload = match buf_id {
            NO_BUFFER => Payload::NotBuffered(bytes.rest().to_vec()),
            n => {
                // a buffered packet-out must not carry an inline payload
                bytes.expect_end()?;
                Payload::Buffered(n, vec![])
            }
        };
        Ok(PacketOut {
            output_payload: payload,
            port_id: if in_port == OfpPort::None as u16 {
                None
            } else {
                Some(in_port)
            },
            apply_actions: actions,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u32(self.output_payload.buffer_id());
        bytes.write_u16(self.port_id.unwrap_or(OfpPort::None as u16));
        bytes.write_u16(Action::size_of_sequence(&self.apply_actions) as u16);
        Action::marshal_sequence(&self.apply_actions, bytes);
        if let Payload::NotBuffered(ref buf) = self.output_payload {
            bytes.write_bytes(buf);
        }
    }
}

/// Reason a flow was removed from a switch.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FlowRemovedReason {
    IdleTimeout,
    HardTimeout,
    Delete,
}

impl FlowRemovedReason {
    fn of_int(d: u8) -> Result<FlowRemovedReason> {
        match d {
            0 => Ok(FlowRemovedReason::IdleTimeout),
            1 => Ok(FlowRemovedReason::HardTimeout),
            2 => Ok(FlowRemovedReason::Delete),
            d => Err(OfpError::InvalidEnum {
                field: "flow removed reason",
                value: d as u64,
            }),
        }
    }
}

/// Flow removed notification (datapath to controller).
#[derive(Debug, PartialEq, Clone)]
pub struct FlowRemoved {
    pub pattern: Pattern,
    pub cookie: u64,
    pub priority: u16,
    pub reason: FlowRemovedReason,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: Timeout,
    pub packet_count: u64,
    pub byte_count: u64,
}

impl FlowRemoved {
    fn size_of(&self) -> usize {
        self.pattern.size_of() + 40
    }

    fn parse(bytes: &mut Reader) -> Result<FlowRemoved> {
        let pattern = Pattern::parse(bytes)?;
        let cookie = bytes.read_u64()?;
        let priority = bytes.read_u16()?;
        let reason = FlowRemovedReason::of_int(bytes.read_u8()?)?;
        bytes.skip(1)?;
        let duration_sec = bytes.read_u32()?;
        let duration_nsec = bytes.read_u32()?;
        let idle = Timeout::of_int(bytes.read_u16()?);
        bytes.skip(2)?;
        let packet_count = bytes.read_u64()?;
        let byte_count = bytes.read_u64()?;
        Ok(FlowRemoved {
            pattern: pattern,
            cookie: cookie,
            priority: priority,
            reason: reason,
            duration_sec: duration_sec,
            duration_nsec: duration_nsec,
            idle_timeout: idle,
            packet_count: packet_count,
            byte_count: byte_count,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        self.pattern.marshal(bytes);
        bytes.write_u64(self.cookie);
        bytes.write_u16(self.priority);
        bytes.write_u8(self.reason as u8);
        bytes.pad(1);
        bytes.write_u32(self.duration_sec);
        bytes.write_u32(self.duration_nsec);
        bytes.write_u16(self.idle_timeout.to_int());
        bytes.pad(2);
        bytes.write_u64(self.packet_count);
        bytes.write_u64(self.byte_count);
    }
}

/// What changed about a physical port.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PortReason {
    PortAdd,
    PortDelete,
    PortModify,
}

impl PortReason {
    fn of_int(d: u8) -> Result<PortReason> {
        match d {
            0 => Ok(PortReason::PortAdd),
            1 => Ok(PortReason::PortDelete),
            2 => Ok(PortReason::PortModify),
            d => Err(OfpError::InvalidEnum {
                field: "port status reason",
                value: d as u64,
            }),
        }
    }
}

/// A physical port has changed in the datapath.
#[derive(Debug, PartialEq, Clone)]
pub struct PortStatus {
    pub reason: PortReason,
    pub desc: PortDesc,
}

impl PortStatus {
    fn size_of(&self) -> usize {
        8 + PORT_DESC_SIZE
    }

    fn parse(bytes: &mut Reader) -> Result<PortStatus> {
        let reason = PortReason::of_int(bytes.read_u8()?)?;
        bytes.skip(7)?;
        let desc = PortDesc::parse(bytes)?;
        Ok(PortStatus {
            reason: reason,
            desc: desc,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u8(self.reason as u8);
        bytes.pad(7);
        self.desc.marshal(bytes);
    }
}

/// Controller-initiated change to a physical port's configuration.
#[derive(Debug, PartialEq, Clone)]
pub struct PortMod {
    pub port_no: u16,
    pub hw_addr: u64,
    pub config: PortConfig,
    pub mask: PortConfig,
    pub advertise: PortFeatures,
}

impl PortMod {
    fn size_of(&self) -> usize {
        24
    }

    fn parse(bytes: &mut Reader) -> Result<PortMod> {
        let port_no = bytes.read_u16()?;
        let hw_addr = Pattern::read_mac(bytes)?;
        let config = PortConfig::of_int(bytes.read_u32()?);
        let mask = PortConfig::of_int(bytes.read_u32()?);
        let advertise = PortFeatures::of_int(bytes.read_u32()?);
        bytes.skip(4)?;
        Ok(PortMod {
            port_no: port_no,
            hw_addr: hw_addr,
            config: config,
            mask: mask,
            advertise: advertise,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.port_no);
        bytes.write_bytes(&bytes_of_mac(self.hw_addr));
        bytes.write_u32(self.config.to_int());
        bytes.write_u32(self.mask.to_int());
        bytes.write_u32(self.advertise.to_int());
        bytes.pad(4);
    }
}

/// Switch configuration as set by the controller: fragment handling
/// flags and the number of packet bytes shipped on a table miss.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SwitchConfig {
    pub flags: u16,
    pub miss_send_len: u16,
}

impl SwitchConfig {
    fn parse(bytes: &mut Reader) -> Result<SwitchConfig> {
        Ok(SwitchConfig {
            flags: bytes.read_u16()?,
            miss_send_len: bytes.read_u16()?,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.flags);
        bytes.write_u16(self.miss_send_len);
    }
}

/// Type of stats request and reply.
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StatsReqType {
    Desc,
    Flow,
    Aggregate,
    Table,
    Port,
    Queue,
    Vendor = 0xffff,
}

impl StatsReqType {
    fn of_int(d: u16) -> Result<StatsReqType> {
        match d {
            0 => Ok(StatsReqType::Desc),
            1 => Ok(StatsReqType::Flow),
            2 => Ok(StatsReqType::Aggregate),
            3 => Ok(StatsReqType::Table),
            4 => Ok(StatsReqType::Port),
            5 => Ok(StatsReqType::Queue),
            0xffff => Ok(StatsReqType::Vendor),
            d => Err(OfpError::InvalidEnum {
                field: "stats type",
                value: d as u64,
            }),
        }
    }
}

/// Body of a stats request.
#[derive(Debug, PartialEq, Clone)]
pub enum StatsReqBody {
    DescBody,
    /// Also used for aggregate stats requests.
    FlowStatsBody {
        pattern: Pattern,
        table_id: u8,
        out_port: u16,
    },
    TableBody,
    PortBody {
        port_no: u16,
    },
    QueueBody {
        port_no: u16,
        queue_id: u32,
    },
    VendorBody(Vec<u8>),
}

/// Stats request from the controller. Replies can span several messages
/// linked by the `more` flag.
#[derive(Debug, PartialEq, Clone)]
pub struct StatsReq {
    pub req_type: StatsReqType,
    pub flags: u16,
    pub body: StatsReqBody,
}

impl StatsReq {
    fn size_of(&self) -> usize {
        4 + match self.body {
            StatsReqBody::DescBody | StatsReqBody::TableBody => 0,
            StatsReqBody::FlowStatsBody { ref pattern, .. } => pattern.size_of() + 4,
            StatsReqBody::PortBody { .. } => 8,
            StatsReqBody::QueueBody { .. } => 8,
            StatsReqBody::VendorBody(ref body) => body.len(),
        }
    }

    fn parse(bytes: &mut Reader) -> Result<StatsReq> {
        let req_type = StatsReqType::of_int(bytes.read_u16()?)?;
        let flags = bytes.read_u16()?;
        let body = match req_type {
            StatsReqType::Desc => StatsReqBody::DescBody,
            StatsReqType::Flow | StatsReqType::Aggregate => {
                let pattern = Pattern::parse(bytes)?;
                let table_id = bytes.read_u8()?;
                bytes.skip(1)?;
                let out_port = bytes.read_u16()?;
                StatsReqBody::FlowStatsBody {
                    pattern: pattern,
                    table_id: table_id,
                    out_port: out_port,
                }
            }
            StatsReqType::Table => StatsReqBody::TableBody,
            StatsReqType::Port => {
                let port_no = bytes.read_u16()?;
                bytes.skip(6)?;
                StatsReqBody::PortBody { port_no: port_no }
            }
            StatsReqType::Queue => {
                let port_no = bytes.read_u16()?;
                bytes.skip(2)?;
                let queue_id = bytes.read_u32()?;
                StatsReqBody::QueueBody {
                    port_no: port_no,
                    queue_id: queue_id,
                }
            }
            StatsReqType::Vendor => StatsReqBody::VendorBody(bytes.rest().to_vec()),
        };
        Ok(StatsReq {
            req_type: req_type,
            flags: flags,
            body: body,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.req_type as u16);
        bytes.write_u16(self.flags);
        match self.body {
            StatsReqBody::DescBody | StatsReqBody::TableBody => {}
            StatsReqBody::FlowStatsBody { ref pattern, table_id, out_port } => {
                pattern.marshal(bytes);
                bytes.write_u8(table_id);
                bytes.pad(1);
                bytes.write_u16(out_port);
            }
            StatsReqBody::PortBody { port_no } => {
                bytes.write_u16(port_no);
                bytes.pad(6);
            }
            StatsReqBody::QueueBody { port_no, queue_id } => {
                bytes.write_u16(port_no);
                bytes.pad(2);
                bytes.write_u32(queue_id);
            }
            StatsReqBody::VendorBody(ref body) => bytes.write_bytes(body),
        }
    }
}

/// Received/transmitted pair of a per-port counter.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TransmissionCounter {
    pub rx: u64,
    pub tx: u64,
}

impl TransmissionCounter {
    fn parse(bytes: &mut Reader) -> Result<TransmissionCounter> {
        Ok(TransmissionCounter {
            rx: bytes.read_u64()?,
            tx: bytes.read_u64()?,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u64(self.rx);
        bytes.write_u64(self.tx);
    }
}

/// One flow entry in a flow stats reply.
#[derive(Debug, PartialEq, Clone)]
pub struct FlowStats {
    pub table_id: u8,
    pub pattern: Pattern,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub priority: u16,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub cookie: u64,
    pub packet_count: u64,
    pub byte_count: u64,
    pub actions: Vec<Action>,
}

impl FlowStats {
    fn size_of(&self) -> usize {
        88 + Action::size_of_sequence(&self.actions)
    }
}

/// Per-port counters in a port stats reply.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PortStats {
    pub port_no: u16,
    pub packets: TransmissionCounter,
    pub bytes: TransmissionCounter,
    pub dropped: TransmissionCounter,
    pub errors: TransmissionCounter,
    pub rx_frame_errors: u64,
    pub rx_over_errors: u64,
    pub rx_crc_errors: u64,
    pub collisions: u64,
}

/// Per-queue counters in a queue stats reply.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct QueueStats {
    pub port_no: u16,
    pub queue_id: u32,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
}

/// Per-table counters in a table stats reply.
#[derive(Debug, PartialEq, Clone)]
pub struct TableStats {
    pub table_id: u8,
    pub name: String,
    pub wildcards: Wildcards,
    pub max_entries: u32,
    pub active_count: u32,
    pub lookup_count: u64,
    pub matched_count: u64,
}

const DESC_STR_LENGTH: usize = 256;
const SERIAL_NUM_LENGTH: usize = 32;
const TABLE_NAME_LENGTH: usize = 32;

/// Body of a stats reply.
#[derive(Debug, PartialEq, Clone)]
pub enum StatsRespBody {
    DescBody {
        manufacturer_desc: String,
        hardware_desc: String,
        software_desc: String,
        serial_number: String,
        datapath_desc: String,
    },
    FlowStatsBody {
        flow_stats: Vec<FlowStats>,
    },
    AggregateStatsBody {
        packet_count: u64,
        byte_count: u64,
        flow_count: u32,
    },
    TableBody {
        table_stats: Vec<TableStats>,
    },
    PortBody {
        port_stats: Vec<PortStats>,
    },
    QueueBody {
        queue_stats: Vec<QueueStats>,
    },
    VendorBody(Vec<u8>),
}

/// One chunk of a stats reply. Reassembly across the `more` flag is the
/// caller's responsibility.
#[derive(Debug, PartialEq, Clone)]
pub struct StatsResp {
    pub req_type: StatsReqType,
    pub flags: u16,
    pub body: StatsRespBody,
}

impl StatsResp {
    /// Whether further reply chunks follow for the same request.
    pub fn more(&self) -> bool {
        self.flags & 1 != 0
    }

    fn size_of(&self) -> usize {
        4 + match self.body {
            StatsRespBody::DescBody { .. } => 4 * DESC_STR_LENGTH + SERIAL_NUM_LENGTH,
            StatsRespBody::FlowStatsBody { ref flow_stats } => {
                flow_stats.iter().map(|stats| stats.size_of()).sum()
            }
            StatsRespBody::AggregateStatsBody { .. } => 24,
            StatsRespBody::TableBody { ref table_stats } => table_stats.len() * 64,
            StatsRespBody::PortBody { ref port_stats } => port_stats.len() * 104,
            StatsRespBody::QueueBody { ref queue_stats } => queue_stats.len() * 32,
            StatsRespBody::VendorBody(ref body) => body.len(),
        }
    }

    fn parse(bytes: &mut Reader) -> Result<StatsResp> {
        let req_type = StatsReqType::of_int(bytes.read_u16()?)?;
        let flags = bytes.read_u16()?;
        let body = match req_type {
            StatsReqType::Desc => StatsRespBody::DescBody {
                manufacturer_desc: read_fixed_size_string(bytes, DESC_STR_LENGTH)?,
                hardware_desc: read_fixed_size_string(bytes, DESC_STR_LENGTH)?,
                software_desc: read_fixed_size_string(bytes, DESC_STR_LENGTH)?,
                serial_number: read_fixed_size_string(bytes, SERIAL_NUM_LENGTH)?,
                datapath_desc: read_fixed_size_string(bytes, DESC_STR_LENGTH)?,
            },
            StatsReqType::Flow => {
                let mut flow_stats = vec![];
                while !bytes.is_empty() {
                    let entry_length = bytes.read_u16()? as usize;
                    if entry_length < 2 {
                        return Err(OfpError::LengthInconsistent);
                    }
                    let mut flow = bytes.sub_reader(entry_length - 2)?;
                    let table_id = flow.read_u8()?;
                    flow.skip(1)?;
                    let pattern = Pattern::parse(&mut flow)?;
                    let duration_sec = flow.read_u32()?;
                    let duration_nsec = flow.read_u32()?;
                    let priority = flow.read_u16()?;
                    let idle_timeout = flow.read_u16()?;
                    let hard_timeout = flow.read_u16()?;
                    flow.skip(6)?;
                    let cookie = flow.read_u64()?;
                    let packet_count = flow.read_u64()?;
                    let byte_count = flow.read_u64()?;
                    let actions = Action::parse_sequence(&mut flow)?;
                    flow_stats.push(FlowStats {
                        table_id: table_id,
                        pattern: pattern,
                        duration_sec: duration_sec,
                        duration_nsec: duration_nsec,
                        priority: priority,
                        idle_timeout: idle_timeout,
                        hard_timeout: hard_timeout,
                        cookie: cookie,
                        packet_count: packet_count,
                        byte_count: byte_count,
                        actions: actions,
                    });
                }
                StatsRespBody::FlowStatsBody { flow_stats: flow_stats }
            }
            StatsReqType::Aggregate => {
                let packet_count = bytes.read_u64()?;
                let byte_count = bytes.read_u64()?;
                let flow_count = bytes.read_u32()?;
                bytes.skip(4)?;
                StatsRespBody::AggregateStatsBody {
                    packet_count: packet_count,
                    byte_count: byte_count,
                    flow_count: flow_count,
                }
            }
            StatsReqType::Table => {
                let mut table_stats = vec![];
                while !bytes.is_empty() {
                    let table_id = bytes.read_u8()?;
                    bytes.skip(3)?;
                    let name = read_fixed_size_string(bytes, TABLE_NAME_LENGTH)?;
                    let wildcards = Wildcards::parse(bytes.read_u32()?);
                    let max_entries = bytes.read_u32()?;
                    let active_count = bytes.read_u32()?;
                    let lookup_count = bytes.read_u64()?;
                    let matched_count = bytes.read_u64()?;
                    table_stats.push(TableStats {
                        table_id: table_id,
                        name: name,
                        wildcards: wildcards,
                        max_entries: max_entries,
                        active_count: active_count,
                        lookup_count: lookup_count,
                        matched_count: matched_count,
                    });
                }
                StatsRespBody::TableBody { table_stats: table_stats }
            }
            StatsReqType::Port => {
                let mut port_stats = vec![];
                while !bytes.is_empty() {
                    let port_no = bytes.read_u16()?;
                    bytes.skip(6)?;
                    port_stats.push(PortStats {
                        port_no: port_no,
                        packets: TransmissionCounter::parse(bytes)?,
                        bytes: TransmissionCounter::parse(bytes)?,
                        dropped: TransmissionCounter::parse(bytes)?,
                        errors: TransmissionCounter::parse(bytes)?,
                        rx_frame_errors: bytes.read_u64()?,
                        rx_over_errors: bytes.read_u64()?,
                        rx_crc_errors: bytes.read_u64()?,
                        collisions: bytes.read_u64()?,
                    });
                }
                StatsRespBody::PortBody { port_stats: port_stats }
            }
            StatsReqType::Queue => {
                let mut queue_stats = vec![];
                while !bytes.is_empty() {
                    let port_no = bytes.read_u16()?;
                    bytes.skip(2)?;
                    queue_stats.push(QueueStats {
                        port_no: port_no,
                        queue_id: bytes.read_u32()?,
                        tx_bytes: bytes.read_u64()?,
                        tx_packets: bytes.read_u64()?,
                        tx_errors: bytes.read_u64()?,
                    });
                }
                StatsRespBody::QueueBody { queue_stats: queue_stats }
            }
            StatsReqType::Vendor => StatsRespBody::VendorBody(bytes.rest().to_vec()),
        };
        Ok(StatsResp {
            req_type: req_type,
            flags: flags,
            body: body,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.req_type as u16);
        bytes.write_u16(self.flags);
        match self.body {
            StatsRespBody::DescBody {
                ref manufacturer_desc,
                ref hardware_desc,
                ref software_desc,
                ref serial_number,
                ref datapath_desc,
            } => {
                write_fixed_size_string(bytes, manufacturer_desc, DESC_STR_LENGTH);
                write_fixed_size_string(bytes, hardware_desc, DESC_STR_LENGTH);
                write_fixed_size_string(bytes, software_desc, DESC_STR_LENGTH);
                write_fixed_size_string(bytes, serial_number, SERIAL_NUM_LENGTH);
                write_fixed_size_string(bytes, datapath_desc, DESC_STR_LENGTH);
            }
            StatsRespBody::FlowStatsBody { ref flow_stats } => {
                for stats in flow_stats {
                    bytes.write_u16(stats.size_of() as u16);
                    bytes.write_u8(stats.table_id);
                    bytes.pad(1);
                    stats.pattern.marshal(bytes);
                    bytes.write_u32(stats.duration_sec);
                    bytes.write_u32(stats.duration_nsec);
                    bytes.write_u16(stats.priority);
                    bytes.write_u16(stats.idle_timeout);
                    bytes.write_u16(stats.hard_timeout);
                    bytes.pad(6);
                    bytes.write_u64(stats.cookie);
                    bytes.write_u64(stats.packet_count);
                    bytes.write_u64(stats.byte_count);
                    Action::marshal_sequence(&stats.actions, bytes);
                }
            }
            StatsRespBody::AggregateStatsBody { packet_count, byte_count, flow_count } => {
                bytes.write_u64(packet_count);
                bytes.write_u64(byte_count);
                bytes.write_u32(flow_count);
                bytes.pad(4);
            }
            StatsRespBody::TableBody { ref table_stats } => {
                for stats in table_stats {
                    bytes.write_u8(stats.table_id);
                    bytes.pad(3);
                    write_fixed_size_string(bytes, &stats.name, TABLE_NAME_LENGTH);
                    stats.wildcards.marshal(bytes);
                    bytes.write_u32(stats.max_entries);
                    bytes.write_u32(stats.active_count);
                    bytes.write_u64(stats.lookup_count);
                    bytes.write_u64(stats.matched_count);
                }
            }
            StatsRespBody::PortBody { ref port_stats } => {
                for stats in port_stats {
                    bytes.write_u16(stats.port_no);
                    bytes.pad(6);
                    stats.packets.marshal(bytes);
                    stats.bytes.marshal(bytes);
                    stats.dropped.marshal(bytes);
                    stats.errors.marshal(bytes);
                    bytes.write_u64(stats.rx_frame_errors);
                    bytes.write_u64(stats.rx_over_errors);
                    bytes.write_u64(stats.rx_crc_errors);
                    bytes.write_u64(stats.collisions);
                }
            }
            StatsRespBody::QueueBody { ref queue_stats } => {
                for stats in queue_stats {
                    bytes.write_u16(stats.port_no);
                    bytes.pad(2);
                    bytes.write_u32(stats.queue_id);
                    bytes.write_u64(stats.tx_bytes);
                    bytes.write_u64(stats.tx_packets);
                    bytes.write_u64(stats.tx_errors);
                }
            }
            StatsRespBody::VendorBody(ref body) => bytes.write_bytes(body),
        }
    }
}

/// Reason Hello failed.
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HelloFailed {
    Incompatible,
    EPerm,
}

/// Reason the controller made a bad request to a switch.
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BadRequest {
    BadVersion,
    BadType,
    BadStat,
    BadVendor,
    BadSubType,
    EPerm,
    BadLen,
    BufferEmpty,
    BufferUnknown,
}

/// Reason an action in a controller request failed.
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BadAction {
    BadType,
    BadLen,
    BadVendor,
    BadVendorType,
    BadOutPort,
    BadArgument,
    EPerm,
    TooMany,
    BadQueue,
}

/// Reason a FlowMod from the controller failed.
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FlowModFailed {
    AllTablesFull,
    Overlap,
    EPerm,
    BadEmergTimeout,
    BadCommand,
    Unsupported,
}

/// Reason a PortMod from the controller failed.
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PortModFailed {
    BadPort,
    BadHwAddr,
}

/// Reason a queue operation from the controller failed.
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QueueOpFailed {
    BadPort,
    BadQueue,
    EPerm,
}

/// High-level type of an OpenFlow error message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorType {
    HelloFailed(HelloFailed),
    BadRequest(BadRequest),
    BadAction(BadAction),
    FlowModFailed(FlowModFailed),
    PortModFailed(PortModFailed),
    QueueOpFailed(QueueOpFailed),
}

impl ErrorType {
    fn of_ints(typ: u16, code: u16) -> Result<ErrorType> {
        fn bad(field: &'static str, value: u16) -> OfpError {
            OfpError::InvalidEnum {
                field: field,
                value: value as u64,
            }
        }
        let t = match typ {
            0 => ErrorType::HelloFailed(match code {
                0 => HelloFailed::Incompatible,
                1 => HelloFailed::EPerm,
                c => return Err(bad("hello failed code", c)),
            }),
            1 => ErrorType::BadRequest(match code {
                0 => BadRequest::BadVersion,
                1 => BadRequest::BadType,
                2 => BadRequest::BadStat,
                3 => BadRequest::BadVendor,
                4 => BadRequest::BadSubType,
                5 => BadRequest::EPerm,
                6 => BadRequest::BadLen,
                7 => BadRequest::BufferEmpty,
                8 => BadRequest::BufferUnknown,
                c => return Err(bad("bad request code", c)),
            }),
            2 => ErrorType::BadAction(match code {
                0 => BadAction::BadType,
                1 => BadAction::BadLen,
                2 => BadAction::BadVendor,
                3 => BadAction::BadVendorType,
                4 => BadAction::BadOutPort,
                5 => BadAction::BadArgument,
                6 => BadAction::EPerm,
                7 => BadAction::TooMany,
                8 => BadAction::BadQueue,
                c => return Err(bad("bad action code", c)),
            }),
            3 => ErrorType::FlowModFailed(match code {
                0 => FlowModFailed::AllTablesFull,
                1 => FlowModFailed::Overlap,
                2 => FlowModFailed::EPerm,
                3 => FlowModFailed::BadEmergTimeout,
                4 => FlowModFailed::BadCommand,
                5 => FlowModFailed::Unsupported,
                c => return Err(bad("flow mod failed code", c)),
            }),
            4 => ErrorType::PortModFailed(match code {
                0 => PortModFailed::BadPort,
                1 => PortModFailed::BadHwAddr,
                c => return Err(bad("port mod failed code", c)),
            }),
            5 => ErrorType::QueueOpFailed(match code {
                0 => QueueOpFailed::BadPort,
                1 => QueueOpFailed::BadQueue,
                2 => QueueOpFailed::EPerm,
                c => return Err(bad("queue op failed code", c)),
            }),
            t => return Err(bad("error type", t)),
        };
        Ok(t)
    }

    fn to_ints(&self) -> (u16, u16) {
        match *self {
            ErrorType::HelloFailed(c) => (0, c as u16),
            ErrorType::BadRequest(c) => (1, c as u16),
            ErrorType::BadAction(c) => (2, c as u16),
            ErrorType::FlowModFailed(c) => (3, c as u16),
            ErrorType::PortModFailed(c) => (4, c as u16),
            ErrorType::QueueOpFailed(c) => (5, c as u16),
        }
    }
}

/// Error message, normally datapath to controller. The data carries the
/// offending message bytes.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SwitchError {
    pub code: ErrorType,
    pub data: Vec<u8>,
}

impl SwitchError {
    pub fn new(code: ErrorType, data: Vec<u8>) -> SwitchError {
        SwitchError {
            code: code,
            data: data,
        }
    }

    fn size_of(&self) -> usize {
        4 + self.data.len()
    }

    fn parse(bytes: &mut Reader) -> Result<SwitchError> {
        let typ = bytes.read_u16()?;
        let code = bytes.read_u16()?;
        Ok(SwitchError {
            code: ErrorType::of_ints(typ, code)?,
            data: bytes.rest().to_vec(),
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        let (typ, code) = self.code.to_ints();
        bytes.write_u16(typ);
        bytes.write_u16(code);
        bytes.write_bytes(&self.data);
    }
}

/// A property of a packet queue.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QueueProp {
    None,
    /// Guaranteed minimum rate in 1/10ths of a percent.
    MinRate(u16),
}

impl QueueProp {
    fn size_of(&self) -> usize {
        match *self {
            QueueProp::None => 8,
            QueueProp::MinRate(_) => 16,
        }
    }

    fn parse_sequence(bytes: &mut Reader) -> Result<Vec<QueueProp>> {
        let mut props = vec![];
        while !bytes.is_empty() {
            let typ = bytes.read_u16()?;
            let len = bytes.read_u16()? as usize;
            bytes.skip(4)?;
            if len < 8 {
                return Err(OfpError::LengthInconsistent);
            }
            let mut body = bytes.sub_reader(len - 8)?;
            let prop = match typ {
                0 => QueueProp::None,
                1 => {
                    let rate = body.read_u16()?;
                    body.skip(6)?;
                    QueueProp::MinRate(rate)
                }
                t => {
                    return Err(OfpError::InvalidEnum {
                        field: "queue property",
                        value: t as u64,
                    })
                }
            };
            body.expect_end()?;
            props.push(prop);
        }
        Ok(props)
    }

    fn marshal(&self, bytes: &mut Writer) {
        match *self {
            QueueProp::None => {
                bytes.write_u16(0);
                bytes.write_u16(8);
                bytes.pad(4);
            }
            QueueProp::MinRate(rate) => {
                bytes.write_u16(1);
                bytes.write_u16(16);
                bytes.pad(4);
                bytes.write_u16(rate);
                bytes.pad(6);
            }
        }
    }
}

/// Configuration of one packet queue on a port.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct QueueConfig {
    pub queue_id: u32,
    pub properties: Vec<QueueProp>,
}

impl QueueConfig {
    fn size_of(&self) -> usize {
        8 + self.properties.iter().map(|p| p.size_of()).sum::<usize>()
    }

    fn parse_sequence(bytes: &mut Reader) -> Result<Vec<QueueConfig>> {
        let mut queues = vec![];
        while !bytes.is_empty() {
            let queue_id = bytes.read_u32()?;
            let len = bytes.read_u16()? as usize;
            bytes.skip(2)?;
            if len < 8 {
                return Err(OfpError::LengthInconsistent);
            }
            let mut body = bytes.sub_reader(len - 8)?;
            let properties = QueueProp::parse_sequence(&mut body)?;
            queues.push(QueueConfig {
                queue_id: queue_id,
                properties: properties,
            });
        }
        Ok(queues)
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u32(self.queue_id);
        bytes.write_u16(self.size_of() as u16);
        bytes.pad(2);
        for prop in &self.properties {
            prop.marshal(bytes);
        }
    }

    fn size_of_sequence(queues: &[QueueConfig]) -> usize {
        queues.iter().map(|q| q.size_of()).sum()
    }

    fn marshal_sequence(queues: &[QueueConfig], bytes: &mut Writer) {
        for queue in queues {
            queue.marshal(bytes);
        }
    }
}

/// Controller request for the queues configured on a port.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct QueueConfigRequest {
    pub port: u16,
}

impl QueueConfigRequest {
    fn parse(bytes: &mut Reader) -> Result<QueueConfigRequest> {
        let port = bytes.read_u16()?;
        bytes.skip(2)?;
        Ok(QueueConfigRequest { port: port })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.port);
        bytes.pad(2);
    }
}

/// Switch answer listing the queues configured on a port.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct QueueConfigReply {
    pub port: u16,
    pub queues: Vec<QueueConfig>,
}

impl QueueConfigReply {
    fn size_of(&self) -> usize {
        8 + QueueConfig::size_of_sequence(&self.queues)
    }

    fn parse(bytes: &mut Reader) -> Result<QueueConfigReply> {
        let port = bytes.read_u16()?;
        bytes.skip(6)?;
        Ok(QueueConfigReply {
            port: port,
            queues: QueueConfig::parse_sequence(bytes)?,
        })
    }

    fn marshal(&self, bytes: &mut Writer) {
        bytes.write_u16(self.port);
        bytes.pad(6);
        QueueConfig::marshal_sequence(&self.queues, bytes);
    }
}

/// Vendor id of the OpenFlow reference queue extension.
pub const OPENFLOW_VENDOR_ID: u32 = 0x000026e1;

const QUEUE_MODIFY_SUBTYPE: u32 = 0;
const QUEUE_DELETE_SUBTYPE: u32 = 1;

/// Encapsulates handling of the direction-specific message taxonomies.
pub mod message {
    use super::*;
    use error::{OfpError, Result};
    use ofp_header::{OfpHeader, OFP_VERSION};
    use ofp_message::OfpMessage;
    use ofp_utils::{Reader, Writer};

    /// Messages originating at the switch, delivered to controller logic.
    #[derive(Debug, PartialEq, Clone)]
    pub enum ScMessage {
        Hello,
        EchoRequest(Vec<u8>),
        EchoReply(Vec<u8>),
        Features(SwitchFeatures),
        PacketIn(PacketIn),
        PortStatus(PortStatus),
        FlowRemoved(FlowRemoved),
        StatsReply(StatsResp),
        Error(SwitchError),
        BarrierReply,
        QueueConfigReply(QueueConfigReply),
    }

    /// Messages originating at the controller, transmitted to a switch.
    #[derive(Debug, PartialEq, Clone)]
    pub enum CsMessage {
        Hello,
        EchoRequest(Vec<u8>),
        EchoReply(Vec<u8>),
        FeaturesRequest,
        PacketOut(PacketOut),
        FlowMod(FlowMod),
        PortMod(PortMod),
        StatsRequest(StatsReq),
        BarrierRequest,
        SetConfig(SwitchConfig),
        ExtQueueModify(u16, Vec<QueueConfig>),
        ExtQueueDelete(u16, Vec<QueueConfig>),
        Vendor(Vec<u8>),
        GetQueueConfig(QueueConfigRequest),
        Error(SwitchError),
    }

    fn start_message(bytes: &mut Writer, code: MsgCode, xid: u32) -> usize {
        bytes.write_u8(OFP_VERSION);
        bytes.write_u8(code as u8);
        let len_slot = bytes.reserve_u16();
        bytes.write_u32(xid);
        len_slot
    }

    /// Validate the header and hand back a reader over exactly the body.
    fn body_reader<'a>(header: &OfpHeader, buf: &'a [u8]) -> Result<Reader<'a>> {
        if header.version() != OFP_VERSION {
            return Err(OfpError::VersionMismatch(header.version()));
        }
        let body_len = header.body_length();
        if buf.len() < body_len {
            return Err(OfpError::Truncated);
        }
        if buf.len() > body_len {
            return Err(OfpError::MalformedTrailer);
        }
        Ok(Reader::new(buf))
    }

    impl ScMessage {
        fn msg_code(&self) -> MsgCode {
            match *self {
                ScMessage::Hello => MsgCode::Hello,
                ScMessage::EchoRequest(_) => MsgCode::EchoReq,
                ScMessage::EchoReply(_) => MsgCode::EchoResp,
                ScMessage::Features(_) => MsgCode::FeaturesResp,
                ScMessage::PacketIn(_) => MsgCode::PacketIn,
                ScMessage::PortStatus(_) => MsgCode::PortStatus,
                ScMessage::FlowRemoved(_) => MsgCode::FlowRemoved,
                ScMessage::StatsReply(_) => MsgCode::StatsResp,
                ScMessage::Error(_) => MsgCode::Error,
                ScMessage::BarrierReply => MsgCode::BarrierResp,
                ScMessage::QueueConfigReply(_) => MsgCode::QueueGetConfigResp,
            }
        }

        fn body_size(&self) -> usize {
            match *self {
                ScMessage::Hello | ScMessage::BarrierReply => 0,
                ScMessage::EchoRequest(ref buf) | ScMessage::EchoReply(ref buf) => buf.len(),
                ScMessage::Features(ref f) => f.size_of(),
                ScMessage::PacketIn(ref pi) => pi.size_of(),
                ScMessage::PortStatus(ref ps) => ps.size_of(),
                ScMessage::FlowRemoved(ref fr) => fr.size_of(),
                ScMessage::StatsReply(ref sr) => sr.size_of(),
                ScMessage::Error(ref err) => err.size_of(),
                ScMessage::QueueConfigReply(ref qcr) => qcr.size_of(),
            }
        }

        fn marshal_body(&self, bytes: &mut Writer) {
            match *self {
                ScMessage::Hello | ScMessage::BarrierReply => {}
                ScMessage::EchoRequest(ref buf) | ScMessage::EchoReply(ref buf) => {
                    bytes.write_bytes(buf)
                }
                ScMessage::Features(ref f) => f.marshal(bytes),
                ScMessage::PacketIn(ref pi) => pi.marshal(bytes),
                ScMessage::PortStatus(ref ps) => ps.marshal(bytes),
                ScMessage::FlowRemoved(ref fr) => fr.marshal(bytes),
                ScMessage::StatsReply(ref sr) => sr.marshal(bytes),
                ScMessage::Error(ref err) => err.marshal(bytes),
                ScMessage::QueueConfigReply(ref qcr) => qcr.marshal(bytes),
            }
        }
    }

    impl OfpMessage for ScMessage {
        fn size_of(msg: &ScMessage) -> usize {
            OfpHeader::size() + msg.body_size()
        }

        fn header_of(xid: u32, msg: &ScMessage) -> OfpHeader {
            OfpHeader::new(
                OFP_VERSION,
                msg.msg_code() as u8,
                ScMessage::size_of(msg) as u16,
                xid,
            )
        }

        fn marshal(xid: u32, msg: ScMessage) -> Vec<u8> {
            let mut bytes = Writer::with_capacity(ScMessage::size_of(&msg));
            let len_slot = start_message(&mut bytes, msg.msg_code(), xid);
            msg.marshal_body(&mut bytes);
            let total = bytes.len() as u16;
            bytes.patch_u16(len_slot, total);
            bytes.into_bytes()
        }

        fn parse(header: &OfpHeader, buf: &[u8]) -> Result<(u32, ScMessage)> {
            let mut bytes = body_reader(header, buf)?;
            let msg = match header.type_code()? {
                MsgCode::Hello => {
                    bytes.expect_end()?;
                    ScMessage::Hello
                }
                MsgCode::Error => ScMessage::Error(SwitchError::parse(&mut bytes)?),
                MsgCode::EchoReq => ScMessage::EchoRequest(bytes.rest().to_vec()),
                MsgCode::EchoResp => ScMessage::EchoReply(bytes.rest().to_vec()),
                MsgCode::FeaturesResp => ScMessage::Features(SwitchFeatures::parse(&mut bytes)?),
                MsgCode::PacketIn => ScMessage::PacketIn(PacketIn::parse(&mut bytes)?),
                MsgCode::FlowRemoved => ScMessage::FlowRemoved(FlowRemoved::parse(&mut bytes)?),
                MsgCode::PortStatus => ScMessage::PortStatus(PortStatus::parse(&mut bytes)?),
                MsgCode::StatsResp => ScMessage::StatsReply(StatsResp::parse(&mut bytes)?),
                MsgCode::BarrierResp => {
                    bytes.expect_end()?;
                    ScMessage::BarrierReply
                }
                MsgCode::QueueGetConfigResp => {
                    ScMessage::QueueConfigReply(QueueConfigReply::parse(&mut bytes)?)
                }
                _ => return Err(OfpError::UnknownMessageType(header.typ())),
            };
            bytes.expect_end()?;
            Ok((header.xid(), msg))
        }
    }

    impl CsMessage {
        fn msg_code(&self) -> MsgCode {
            match *self {
                CsMessage::Hello => MsgCode::Hello,
                CsMessage::EchoRequest(_) => MsgCode::EchoReq,
                CsMessage::EchoReply(_) => MsgCode::EchoResp,
                CsMessage::FeaturesRequest => MsgCode::FeaturesReq,
                CsMessage::PacketOut(_) => MsgCode::PacketOut,
                CsMessage::FlowMod(_) => MsgCode::FlowMod,
                CsMessage::PortMod(_) => MsgCode::PortMod,
                CsMessage::StatsRequest(_) => MsgCode::StatsReq,
                CsMessage::BarrierRequest => MsgCode::BarrierReq,
                CsMessage::SetConfig(_) => MsgCode::SetConfig,
                CsMessage::ExtQueueModify(_, _) | CsMessage::ExtQueueDelete(_, _) => {
                    MsgCode::Vendor
                }
                CsMessage::Vendor(_) => MsgCode::Vendor,
                CsMessage::GetQueueConfig(_) => MsgCode::QueueGetConfigReq,
                CsMessage::Error(_) => MsgCode::Error,
            }
        }

        fn body_size(&self) -> usize {
            match *self {
                CsMessage::Hello | CsMessage::FeaturesRequest | CsMessage::BarrierRequest => 0,
                CsMessage::EchoRequest(ref buf) | CsMessage::EchoReply(ref buf) => buf.len(),
                CsMessage::PacketOut(ref po) => po.size_of(),
                CsMessage::FlowMod(ref fm) => fm.size_of(),
                CsMessage::PortMod(ref pm) => pm.size_of(),
                CsMessage::StatsRequest(ref sr) => sr.size_of(),
                CsMessage::SetConfig(_) => 4,
                CsMessage::ExtQueueModify(_, ref queues)
                | CsMessage::ExtQueueDelete(_, ref queues) => {
                    16 + QueueConfig::size_of_sequence(queues)
                }
                CsMessage::Vendor(ref body) => body.len(),
                CsMessage::GetQueueConfig(_) => 4,
                CsMessage::Error(ref err) => err.size_of(),
            }
        }

        fn marshal_body(&self, bytes: &mut Writer) {
            match *self {
                CsMessage::Hello | CsMessage::FeaturesRequest | CsMessage::BarrierRequest => {}
                CsMessage::EchoRequest(ref buf) | CsMessage::EchoReply(ref buf) => {
                    bytes.write_bytes(buf)
                }
                CsMessage::PacketOut(ref po) => po.marshal(bytes),
                CsMessage::FlowMod(ref fm) => fm.marshal(bytes),
                CsMessage::PortMod(ref pm) => pm.marshal(bytes),
                CsMessage::StatsRequest(ref sr) => sr.marshal(bytes),
                CsMessage::SetConfig(ref conf) => conf.marshal(bytes),
                CsMessage::ExtQueueModify(port, ref queues) => {
                    CsMessage::marshal_ext_queue(QUEUE_MODIFY_SUBTYPE, port, queues, bytes)
                }
                CsMessage::ExtQueueDelete(port, ref queues) => {
                    CsMessage::marshal_ext_queue(QUEUE_DELETE_SUBTYPE, port, queues, bytes)
                }
                CsMessage::Vendor(ref body) => bytes.write_bytes(body),
                CsMessage::GetQueueConfig(ref req) => req.marshal(bytes),
                CsMessage::Error(ref err) => err.marshal(bytes),
            }
        }

        fn marshal_ext_queue(subtype: u32, port: u16, queues: &[QueueConfig], bytes: &mut Writer) {
            bytes.write_u32(OPENFLOW_VENDOR_ID);
            bytes.write_u32(subtype);
            bytes.write_u16(port);
            bytes.pad(6);
            QueueConfig::marshal_sequence(queues, bytes);
        }

        /// Vendor bodies with the reference queue-extension id decode to
        /// the typed queue commands; everything else stays opaque.
        fn parse_vendor(bytes: &mut Reader) -> Result<CsMessage> {
            let body = bytes.rest();
            let mut vendor = Reader::new(body);
            if vendor.remaining() >= 8 {
                let vendor_id = vendor.read_u32()?;
                let subtype = vendor.read_u32()?;
                if vendor_id == OPENFLOW_VENDOR_ID
                    && (subtype == QUEUE_MODIFY_SUBTYPE || subtype == QUEUE_DELETE_SUBTYPE)
                {
                    let port = vendor.read_u16()?;
                    vendor.skip(6)?;
                    let queues = QueueConfig::parse_sequence(&mut vendor)?;
                    return Ok(if subtype == QUEUE_MODIFY_SUBTYPE {
                        CsMessage::ExtQueueModify(port, queues)
                    } else {
                        CsMessage::ExtQueueDelete(port, queues)
                    });
                }
            }
            Ok(CsMessage::Vendor(body.to_vec()))
        }
    }

    impl OfpMessage for CsMessage {
        fn size_of(msg: &CsMessage) -> usize {
            OfpHeader::size() + msg.body_size()
        }

        fn header_of(xid: u32, msg: &CsMessage) -> OfpHeader {
            OfpHeader::new(
                OFP_VERSION,
                msg.msg_code() as u8,
                CsMessage::size_of(msg) as u16,
                xid,
            )
        }

        fn marshal(xid: u32, msg: CsMessage) -> Vec<u8> {
            let mut bytes = Writer::with_capacity(CsMessage::size_of(&msg));
            let len_slot = start_message(&mut bytes, msg.msg_code(), xid);
            msg.marshal_body(&mut bytes);
            let total = bytes.len() as u16;
            bytes.patch_u16(len_slot, total);
            bytes.into_bytes()
        }

        fn parse(header: &OfpHeader, buf: &[u8]) -> Result<(u32, CsMessage)> {
            let mut bytes = body_reader(header, buf)?;
            let msg = match header.type_code()? {
                MsgCode::Hello => {
                    bytes.expect_end()?;
                    CsMessage::Hello
                }
                MsgCode::Error => CsMessage::Error(SwitchError::parse(&mut bytes)?),
                MsgCode::EchoReq => CsMessage::EchoRequest(bytes.rest().to_vec()),
                MsgCode::EchoResp => CsMessage::EchoReply(bytes.rest().to_vec()),
                MsgCode::Vendor => CsMessage::parse_vendor(&mut bytes)?,
                MsgCode::FeaturesReq => {
                    bytes.expect_end()?;
                    CsMessage::FeaturesRequest
                }
                MsgCode::SetConfig => CsMessage::SetConfig(SwitchConfig::parse(&mut bytes)?),
                MsgCode::PacketOut => CsMessage::PacketOut(PacketOut::parse(&mut bytes)?),
                MsgCode::FlowMod => CsMessage::FlowMod(FlowMod::parse(&mut bytes)?),
                MsgCode::PortMod => CsMessage::PortMod(PortMod::parse(&mut bytes)?),
                MsgCode::StatsReq => CsMessage::StatsRequest(StatsReq::parse(&mut bytes)?),
                MsgCode::BarrierReq => {
                    bytes.expect_end()?;
                    CsMessage::BarrierRequest
                }
                MsgCode::QueueGetConfigReq => {
                    CsMessage::GetQueueConfig(QueueConfigRequest::parse(&mut bytes)?)
                }
                _ => return Err(OfpError::UnknownMessageType(header.typ())),
            };
            bytes.expect_end()?;
            Ok((header.xid(), msg))
        }
    }

    /// Return a `FlowMod` adding a flow with the given `priority`,
    /// `pattern`, and `actions`.
    pub fn add_flow(prio: u16, pattern: Pattern, actions: Vec<Action>) -> FlowMod {
        FlowMod {
            command: FlowModCmd::AddFlow,
            pattern: pattern,
            priority: prio,
            actions: actions,
            cookie: 0,
            idle_timeout: Timeout::Permanent,
            hard_timeout: Timeout::Permanent,
            notify_when_removed: false,
            out_port: None,
            apply_to_packet: None,
            check_overlap: false,
        }
    }

    /// Parse a payload buffer into a network-level packet.
    pub fn parse_payload(p: &Payload) -> Result<::packet::Packet> {
        ::packet::Packet::parse(p.bytes())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        const TEST_XID: u32 = 0x12345678;

        fn parse_sc(data: &[u8]) -> Result<(u32, ScMessage)> {
            let header = OfpHeader::parse(data)?;
            ScMessage::parse(&header, &data[OfpHeader::size()..])
        }

        fn parse_cs(data: &[u8]) -> Result<(u32, CsMessage)> {
            let header = OfpHeader::parse(data)?;
            CsMessage::parse(&header, &data[OfpHeader::size()..])
        }

        fn roundtrip_sc(msg: ScMessage) {
            let data = ScMessage::marshal(TEST_XID, msg.clone());
            let header = OfpHeader::parse(&data).unwrap();
            assert_eq!(header.length(), data.len());
            let (xid, parsed) = ScMessage::parse(&header, &data[8..]).unwrap();
            assert_eq!(xid, TEST_XID);
            assert_eq!(parsed, msg);
        }

        fn roundtrip_cs(msg: CsMessage) {
            let data = CsMessage::marshal(TEST_XID, msg.clone());
            let header = OfpHeader::parse(&data).unwrap();
            assert_eq!(header.length(), data.len());
            let (xid, parsed) = CsMessage::parse(&header, &data[8..]).unwrap();
            assert_eq!(xid, TEST_XID);
            assert_eq!(parsed, msg);
        }

        #[test]
        fn hello_known_bytes() {
            let data = ScMessage::marshal(1, ScMessage::Hello);
            assert_eq!(data, vec![0x01, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01]);
            let (xid, msg) = parse_sc(&data).unwrap();
            assert_eq!(xid, 1);
            assert_eq!(msg, ScMessage::Hello);
        }

        #[test]
        fn echo_request_known_bytes() {
            let data = [0x01, 0x02, 0x00, 0x0c, 0x00, 0x00, 0x00, 0x2a, 0xde, 0xad, 0xbe, 0xef];
            let (xid, msg) = parse_sc(&data).unwrap();
            assert_eq!(xid, 42);
            assert_eq!(msg, ScMessage::EchoRequest(vec![0xde, 0xad, 0xbe, 0xef]));
            assert_eq!(ScMessage::marshal(42, msg), data.to_vec());
        }

        #[test]
        fn features_reply_no_ports() {
            let data = [
                0x01, 0x06, 0x00, 0x20, 0x00, 0x00, 0x00, 0x07, // header
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // datapath id
                0x00, 0x00, 0x00, 0xff, // n_buffers
                0x03, 0x00, 0x00, 0x00, // n_tables + pad
                0x00, 0x00, 0x00, 0x87, // capabilities
                0x00, 0x00, 0x0f, 0xff, // actions
            ];
            let (xid, msg) = parse_sc(&data).unwrap();
            assert_eq!(xid, 7);
            match msg {
                ScMessage::Features(ref f) => {
                    assert_eq!(f.datapath_id, 1);
                    assert_eq!(f.num_buffers, 255);
                    assert_eq!(f.num_tables, 3);
                    assert_eq!(f.supported_capabilities.to_int(), 0x87);
                    assert_eq!(f.supported_actions.to_int(), 0x0fff);
                    assert!(f.ports.is_empty());
                }
                ref other => panic!("expected Features, got {:?}", other),
            }
            assert_eq!(ScMessage::marshal(7, msg), data.to_vec());
        }

        #[test]
        fn flow_mod_add_drop_is_72_bytes() {
            let fm = add_flow(0, Pattern::match_all(), vec![]);
            let data = CsMessage::marshal(TEST_XID, CsMessage::FlowMod(fm.clone()));
            assert_eq!(data.len(), 72);
            let (_, parsed) = parse_cs(&data).unwrap();
            assert_eq!(parsed, CsMessage::FlowMod(fm));
        }

        #[test]
        fn echo_payload_transparency() {
            let payload: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
            roundtrip_sc(ScMessage::EchoReply(payload.clone()));
            roundtrip_cs(CsMessage::EchoRequest(payload));
        }

        #[test]
        fn version_mismatch_detected() {
            let data = [0x04, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01];
            match parse_sc(&data) {
                Err(OfpError::VersionMismatch(4)) => {}
                other => panic!("expected VersionMismatch, got {:?}", other),
            }
        }

        #[test]
        fn unknown_message_type_detected() {
            let data = [0x01, 0x63, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01];
            match parse_sc(&data) {
                Err(OfpError::UnknownMessageType(0x63)) => {}
                other => panic!("expected UnknownMessageType, got {:?}", other),
            }
        }

        #[test]
        fn trailing_bytes_rejected() {
            // a Hello whose declared length exceeds its true body
            let data = [0x01, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x01, 0xaa];
            match parse_sc(&data) {
                Err(OfpError::MalformedTrailer) => {}
                other => panic!("expected MalformedTrailer, got {:?}", other),
            }
        }

        #[test]
        fn declared_length_beyond_slice_is_truncated() {
            let data = [0x01, 0x02, 0x00, 0x10, 0x00, 0x00, 0x00, 0x01, 0xaa];
            match parse_sc(&data) {
                Err(OfpError::Truncated) => {}
                other => panic!("expected Truncated, got {:?}", other),
            }
        }

        fn sample_pattern() -> Pattern {
            Pattern {
                dl_src: Some(0x1234567890ab),
                dl_dst: None,
                dl_typ: Some(0x0800),
                dl_vlan: Some(Some(0x123)),
                dl_vlan_pcp: Some(3),
                nw_src: Some(Mask {
                    value: 0x0a000000,
                    mask: Some(8),
                }),
                nw_dst: Some(Mask {
                    value: 0x0a000001,
                    mask: None,
                }),
                nw_proto: Some(6),
                nw_tos: None,
                tp_src: None,
                tp_dst: Some(80),
                in_port: Some(1),
            }
        }

        fn sample_actions() -> Vec<Action> {
            vec![
                Action::Output(PseudoPort::Controller(128)),
                Action::SetVlanVid(0x123),
                Action::SetVlanPcp(5),
                Action::StripVlan,
                Action::SetDlSrc(0x001122334455),
                Action::SetDlDst(0x665544332211),
                Action::SetNwSrc(0x0a000001),
                Action::SetNwDst(0x0a000002),
                Action::SetNwTos(0x10),
                Action::SetTpSrc(5000),
                Action::SetTpDst(6000),
                Action::Enqueue(PseudoPort::PhysicalPort(3), 9),
            ]
        }

        #[test]
        fn action_list_closure() {
            let actions = sample_actions();
            let mut bytes = Writer::new();
            Action::marshal_sequence(&actions, &mut bytes);
            let buf = bytes.into_bytes();
            assert_eq!(buf.len(), Action::size_of_sequence(&actions));
            let parsed = Action::parse_sequence(&mut Reader::new(&buf)).unwrap();
            assert_eq!(parsed, actions);
        }

        #[test]
        fn unknown_action_is_length_skipped() {
            let mut bytes = Writer::new();
            // an action of type 0x77 whose body we do not understand
            bytes.write_u16(0x77);
            bytes.write_u16(8);
            bytes.write_u32(0xdeadbeef);
            Action::Output(PseudoPort::Flood).marshal(&mut bytes);
            let buf = bytes.into_bytes();
            let parsed = Action::parse_sequence(&mut Reader::new(&buf)).unwrap();
            assert_eq!(
                parsed,
                vec![
                    Action::Unknown(0x77, vec![0xde, 0xad, 0xbe, 0xef]),
                    Action::Output(PseudoPort::Flood),
                ]
            );
        }

        #[test]
        fn vendor_action_roundtrip() {
            let actions = vec![Action::Vendor(vec![0x00, 0x00, 0x23, 0x20])];
            let mut bytes = Writer::new();
            Action::marshal_sequence(&actions, &mut bytes);
            let buf = bytes.into_bytes();
            let parsed = Action::parse_sequence(&mut Reader::new(&buf)).unwrap();
            assert_eq!(parsed, actions);
        }

        #[test]
        fn pattern_wildcard_roundtrip() {
            let pattern = sample_pattern();
            let mut bytes = Writer::new();
            pattern.marshal(&mut bytes);
            let buf = bytes.into_bytes();
            assert_eq!(buf.len(), 40);
            let parsed = Pattern::parse(&mut Reader::new(&buf)).unwrap();
            assert_eq!(parsed, pattern);
        }

        #[test]
        fn oversized_subnet_wildcard_normalizes() {
            // hand-build a match whose nw_src wildcard count is 63 and
            // whose address bits are garbage
            let mut w = Pattern::match_all().wildcards_of_pattern();
            w.nw_src = 63;
            let mut bytes = Writer::new();
            w.marshal(&mut bytes);
            bytes.write_u16(0);
            bytes.write_bytes(&[0; 12]);
            bytes.write_u16(0xffff);
            bytes.pad(2);
            bytes.write_u16(0);
            bytes.pad(4);
            bytes.write_u32(0xdeadbeef);
            bytes.write_u32(0);
            bytes.write_u32(0);
            let buf = bytes.into_bytes();
            let parsed = Pattern::parse(&mut Reader::new(&buf)).unwrap();
            assert_eq!(parsed.nw_src, None);
            // re-encoding writes count 32 and a zero address
            let mut out = Writer::new();
            parsed.marshal(&mut out);
            let out = out.into_bytes();
            let w2 = Wildcards::parse(Reader::new(&out).read_u32().unwrap());
            assert_eq!(w2.nw_src, 32);
            assert_eq!(&out[28..32], &[0, 0, 0, 0][..]);
        }

        #[test]
        fn flow_mod_full_roundtrip() {
            let fm = FlowMod {
                command: FlowModCmd::DeleteStrictFlow,
                pattern: sample_pattern(),
                priority: 4096,
                actions: sample_actions(),
                cookie: 0x1234567887654321,
                idle_timeout: Timeout::ExpiresAfter(180),
                hard_timeout: Timeout::Permanent,
                notify_when_removed: true,
                apply_to_packet: Some(77),
                out_port: Some(PseudoPort::PhysicalPort(2)),
                check_overlap: true,
            };
            roundtrip_cs(CsMessage::FlowMod(fm));
        }

        #[test]
        fn packet_in_roundtrip() {
            let pi = PacketIn {
                input_payload: Payload::Buffered(17, vec![1, 2, 3, 4, 5]),
                total_len: 5,
                port: 3,
                reason: PacketInReason::NoMatch,
            };
            roundtrip_sc(ScMessage::PacketIn(pi));
        }

        #[test]
        fn packet_out_not_buffered_carries_payload() {
            let po = PacketOut {
                output_payload: Payload::NotBuffered(vec![0xca, 0xfe]),
                port_id: Some(1),
                apply_actions: vec![Action::Output(PseudoPort::AllPorts)],
            };
            roundtrip_cs(CsMessage::PacketOut(po));
        }

        #[test]
        fn packet_out_buffered_has_no_trailer() {
            let po = PacketOut {
                output_payload: Payload::Buffered(42, vec![]),
                port_id: None,
                apply_actions: vec![Action::Output(PseudoPort::PhysicalPort(4))],
            };
            let data = CsMessage::marshal(TEST_XID, CsMessage::PacketOut(po.clone()));
            // header + packet-out preamble + one 8-byte action, nothing else
            assert_eq!(data.len(), 24);
            let (_, parsed) = parse_cs(&data).unwrap();
            assert_eq!(parsed, CsMessage::PacketOut(po));

            // the same message with an inline payload appended is malformed
            let mut bad = data.clone();
            bad.extend_from_slice(&[0xde, 0xad]);
            bad[3] = bad.len() as u8;
            match parse_cs(&bad) {
                Err(OfpError::MalformedTrailer) => {}
                other => panic!("expected MalformedTrailer, got {:?}", other),
            }
        }

        fn port_desc() -> PortDesc {
            PortDesc {
                port_no: 1,
                hw_addr: 0xaabbccddeeff,
                name: "port_1".to_string(),
                config: PortConfig {
                    no_recv_stp: true,
                    ..PortConfig::none()
                },
                state: PortState {
                    down: false,
                    stp_state: StpState::Forward,
                },
                curr: PortFeatures::of_int(0x0fff),
                advertised: PortFeatures::of_int(0x0f0f),
                supported: PortFeatures::of_int(0x00ff),
                peer: PortFeatures::none(),
            }
        }

        #[test]
        fn features_reply_with_ports_roundtrip() {
            let features = SwitchFeatures {
                datapath_id: 0x1122334455667788,
                num_buffers: 200,
                num_tables: 254,
                supported_capabilities: Capabilities::of_int(0x87),
                supported_actions: SupportedActions::of_int(0x0fff),
                ports: vec![port_desc()],
            };
            roundtrip_sc(ScMessage::Features(features));
        }

        #[test]
        fn port_status_roundtrip() {
            let ps = PortStatus {
                reason: PortReason::PortAdd,
                desc: port_desc(),
            };
            roundtrip_sc(ScMessage::PortStatus(ps));
        }

        #[test]
        fn port_mod_roundtrip() {
            let pm = PortMod {
                port_no: 7,
                hw_addr: 0x001122334455,
                config: PortConfig {
                    no_flood: true,
                    ..PortConfig::none()
                },
                mask: PortConfig {
                    no_flood: true,
                    ..PortConfig::none()
                },
                advertise: PortFeatures::none(),
            };
            roundtrip_cs(CsMessage::PortMod(pm));
        }

        #[test]
        fn flow_removed_roundtrip() {
            let fr = FlowRemoved {
                pattern: sample_pattern(),
                cookie: 0xdeadbeefcafef00d,
                priority: 22,
                reason: FlowRemovedReason::IdleTimeout,
                duration_sec: 123,
                duration_nsec: 456789,
                idle_timeout: Timeout::ExpiresAfter(60),
                packet_count: 100,
                byte_count: 120500,
            };
            roundtrip_sc(ScMessage::FlowRemoved(fr));
        }

        #[test]
        fn switch_error_roundtrip() {
            let err = SwitchError::new(
                ErrorType::FlowModFailed(FlowModFailed::AllTablesFull),
                vec![0xab; 12],
            );
            roundtrip_sc(ScMessage::Error(err.clone()));
            roundtrip_cs(CsMessage::Error(err));
        }

        #[test]
        fn barrier_and_requests_roundtrip() {
            roundtrip_sc(ScMessage::BarrierReply);
            roundtrip_cs(CsMessage::BarrierRequest);
            roundtrip_cs(CsMessage::FeaturesRequest);
            roundtrip_cs(CsMessage::SetConfig(SwitchConfig {
                flags: 0,
                miss_send_len: 128,
            }));
            roundtrip_cs(CsMessage::GetQueueConfig(QueueConfigRequest { port: 3 }));
        }

        #[test]
        fn stats_request_bodies_roundtrip() {
            roundtrip_cs(CsMessage::StatsRequest(StatsReq {
                req_type: StatsReqType::Desc,
                flags: 0,
                body: StatsReqBody::DescBody,
            }));
            roundtrip_cs(CsMessage::StatsRequest(StatsReq {
                req_type: StatsReqType::Flow,
                flags: 0,
                body: StatsReqBody::FlowStatsBody {
                    pattern: sample_pattern(),
                    table_id: 0xff,
                    out_port: OfpPort::None as u16,
                },
            }));
            roundtrip_cs(CsMessage::StatsRequest(StatsReq {
                req_type: StatsReqType::Aggregate,
                flags: 0,
                body: StatsReqBody::FlowStatsBody {
                    pattern: Pattern::match_all(),
                    table_id: 0,
                    out_port: 1,
                },
            }));
            roundtrip_cs(CsMessage::StatsRequest(StatsReq {
                req_type: StatsReqType::Table,
                flags: 0,
                body: StatsReqBody::TableBody,
            }));
            roundtrip_cs(CsMessage::StatsRequest(StatsReq {
                req_type: StatsReqType::Port,
                flags: 0,
                body: StatsReqBody::PortBody {
                    port_no: OfpPort::All as u16,
                },
            }));
            roundtrip_cs(CsMessage::StatsRequest(StatsReq {
                req_type: StatsReqType::Queue,
                flags: 0,
                body: StatsReqBody::QueueBody {
                    port_no: 1,
                    queue_id: 0xffffffff,
                },
            }));
        }

        #[test]
        fn stats_reply_bodies_roundtrip() {
            roundtrip_sc(ScMessage::StatsReply(StatsResp {
                req_type: StatsReqType::Desc,
                flags: 0,
                body: StatsRespBody::DescBody {
                    manufacturer_desc: "manufacturer".to_string(),
                    hardware_desc: "hardware".to_string(),
                    software_desc: "software".to_string(),
                    serial_number: "12345".to_string(),
                    datapath_desc: "dp001".to_string(),
                },
            }));
            roundtrip_sc(ScMessage::StatsReply(StatsResp {
                req_type: StatsReqType::Flow,
                flags: 1,
                body: StatsRespBody::FlowStatsBody {
                    flow_stats: vec![
                        FlowStats {
                            table_id: 0,
                            pattern: Pattern::match_all(),
                            duration_sec: 120,
                            duration_nsec: 123456789,
                            priority: 33,
                            idle_timeout: 0,
                            hard_timeout: 0,
                            cookie: 0x12345678,
                            packet_count: 5000,
                            byte_count: 640000,
                            actions: vec![Action::Output(PseudoPort::Controller(0))],
                        },
                        FlowStats {
                            table_id: 2,
                            pattern: sample_pattern(),
                            duration_sec: 10,
                            duration_nsec: 0,
                            priority: 65,
                            idle_timeout: 500,
                            hard_timeout: 0,
                            cookie: 0x87654321,
                            packet_count: 10,
                            byte_count: 10000,
                            actions: sample_actions(),
                        },
                    ],
                },
            }));
            roundtrip_sc(ScMessage::StatsReply(StatsResp {
                req_type: StatsReqType::Aggregate,
                flags: 0,
                body: StatsRespBody::AggregateStatsBody {
                    packet_count: 0x1000,
                    byte_count: 0x200000,
                    flow_count: 37,
                },
            }));
            roundtrip_sc(ScMessage::StatsReply(StatsResp {
                req_type: StatsReqType::Table,
                flags: 0,
                body: StatsRespBody::TableBody {
                    table_stats: vec![TableStats {
                        table_id: 0,
                        name: "classifier".to_string(),
                        wildcards: Pattern::match_all().wildcards_of_pattern(),
                        max_entries: 1024,
                        active_count: 10,
                        lookup_count: 1000,
                        matched_count: 900,
                    }],
                },
            }));
            roundtrip_sc(ScMessage::StatsReply(StatsResp {
                req_type: StatsReqType::Port,
                flags: 0,
                body: StatsRespBody::PortBody {
                    port_stats: vec![
                        PortStats {
                            port_no: 1,
                            packets: TransmissionCounter { rx: 1000, tx: 2000 },
                            bytes: TransmissionCounter {
                                rx: 536870912,
                                tx: 1073741824,
                            },
                            dropped: TransmissionCounter { rx: 5, tx: 0 },
                            errors: TransmissionCounter { rx: 0, tx: 0 },
                            rx_frame_errors: 1,
                            rx_over_errors: 2,
                            rx_crc_errors: 3,
                            collisions: 4,
                        },
                        PortStats {
                            port_no: 2,
                            packets: TransmissionCounter { rx: 0, tx: 0 },
                            bytes: TransmissionCounter { rx: 0, tx: 0 },
                            dropped: TransmissionCounter { rx: 0, tx: 0 },
                            errors: TransmissionCounter { rx: 0, tx: 0 },
                            rx_frame_errors: 0,
                            rx_over_errors: 0,
                            rx_crc_errors: 0,
                            collisions: 0,
                        },
                    ],
                },
            }));
            roundtrip_sc(ScMessage::StatsReply(StatsResp {
                req_type: StatsReqType::Queue,
                flags: 0,
                body: StatsRespBody::QueueBody {
                    queue_stats: vec![QueueStats {
                        port_no: 1,
                        queue_id: 3,
                        tx_bytes: 77,
                        tx_packets: 11,
                        tx_errors: 0,
                    }],
                },
            }));
        }

        #[test]
        fn stats_more_flag() {
            let resp = StatsResp {
                req_type: StatsReqType::Flow,
                flags: 1,
                body: StatsRespBody::FlowStatsBody { flow_stats: vec![] },
            };
            assert!(resp.more());
        }

        fn sample_queues() -> Vec<QueueConfig> {
            vec![
                QueueConfig {
                    queue_id: 1,
                    properties: vec![QueueProp::MinRate(500)],
                },
                QueueConfig {
                    queue_id: 2,
                    properties: vec![QueueProp::None],
                },
            ]
        }

        #[test]
        fn queue_config_reply_roundtrip() {
            let reply = QueueConfigReply {
                port: 4,
                queues: sample_queues(),
            };
            roundtrip_sc(ScMessage::QueueConfigReply(reply));
        }

        #[test]
        fn ext_queue_messages_roundtrip() {
            roundtrip_cs(CsMessage::ExtQueueModify(2, sample_queues()));
            roundtrip_cs(CsMessage::ExtQueueDelete(2, sample_queues()));
        }

        #[test]
        fn foreign_vendor_body_stays_opaque() {
            let body = vec![0x00, 0x00, 0x23, 0x20, 0x01, 0x02, 0x03, 0x04, 0x05];
            roundtrip_cs(CsMessage::Vendor(body));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nw_mask_field_roundtrip() {
        let serialized = Wildcards::set_nw_mask(0, 14, 8);
        assert_eq!(Wildcards::get_nw_mask(serialized, 14), 8);
    }

    #[test]
    fn msg_code_mapping_is_inverse() {
        for code in 0..22u8 {
            assert_eq!(MsgCode::of_u8(code).unwrap() as u8, code);
        }
        assert!(MsgCode::of_u8(22).is_err());
    }
}
