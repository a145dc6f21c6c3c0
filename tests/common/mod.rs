#![allow(dead_code)]

/// IPv4 + TCP SYN from 10.0.0.1:51000 to 10.0.0.2:80, no link header.
pub fn tcp_packet() -> Vec<u8> {
    let mut tcp = Vec::new();
    tcp.extend_from_slice(&51000u16.to_be_bytes());
    tcp.extend_from_slice(&80u16.to_be_bytes());
    tcp.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0]);
    tcp.extend_from_slice(&[0x50, 0x02, 0xff, 0xff, 0, 0, 0, 0]);
    ipv4(6, [10, 0, 0, 1], [10, 0, 0, 2], &tcp)
}

/// Ethernet + IPv4 + TCP SYN from 10.0.0.1:51000 to 10.0.0.2:80.
pub fn tcp_frame() -> Vec<u8> {
    ethernet(0x0800, &tcp_packet())
}

/// BSD loopback (DLT_NULL) frame: host-order AF_INET, then the TCP packet.
pub fn loopback_tcp_frame() -> Vec<u8> {
    let mut frame = 2u32.to_le_bytes().to_vec();
    frame.extend_from_slice(&tcp_packet());
    frame
}

/// Ethernet + IPv4 + UDP from 192.168.1.2:5353 to 192.168.1.1:53.
pub fn udp_frame() -> Vec<u8> {
    let payload = [0u8; 4];
    let mut udp = Vec::new();
    udp.extend_from_slice(&5353u16.to_be_bytes());
    udp.extend_from_slice(&53u16.to_be_bytes());
    udp.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    udp.extend_from_slice(&[0, 0]);
    udp.extend_from_slice(&payload);
    ethernet(0x0800, &ipv4(17, [192, 168, 1, 2], [192, 168, 1, 1], &udp))
}

pub fn arp_frame() -> Vec<u8> {
    ethernet(0x0806, &[0u8; 28])
}

fn ethernet(ether_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xff; 6];
    frame.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x01]);
    frame.extend_from_slice(&ether_type.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

fn ipv4(protocol: u8, src: [u8; 4], dst: [u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut ip = vec![0x45, 0];
    ip.extend_from_slice(&((20 + payload.len()) as u16).to_be_bytes());
    ip.extend_from_slice(&[0, 0, 0x40, 0, 64, protocol, 0, 0]);
    ip.extend_from_slice(&src);
    ip.extend_from_slice(&dst);
    ip.extend_from_slice(payload);
    ip
}

/// Byte order, timestamp precision and link type of a legacy pcap file.
#[derive(Debug, Clone, Copy)]
pub struct LegacyFormat {
    pub big_endian: bool,
    pub nanosecond: bool,
    pub linktype: u32,
}

impl Default for LegacyFormat {
    fn default() -> Self {
        Self {
            big_endian: false,
            nanosecond: false,
            linktype: 1,
        }
    }
}

/// Legacy little-endian microsecond pcap with Ethernet link type.
pub fn legacy_pcap(frames: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    legacy_pcap_as(LegacyFormat::default(), frames)
}

/// Legacy pcap; the second tuple field is micro- or nanoseconds per `format`.
pub fn legacy_pcap_as(format: LegacyFormat, frames: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let u32_bytes = |v: u32| if format.big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let u16_bytes = |v: u16| if format.big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let magic = if format.nanosecond { 0xa1b23c4du32 } else { 0xa1b2c3d4 };

    let mut out = Vec::new();
    out.extend_from_slice(&u32_bytes(magic));
    out.extend_from_slice(&u16_bytes(2));
    out.extend_from_slice(&u16_bytes(4));
    out.extend_from_slice(&u32_bytes(0));
    out.extend_from_slice(&u32_bytes(0));
    out.extend_from_slice(&u32_bytes(65535));
    out.extend_from_slice(&u32_bytes(format.linktype));
    for (sec, frac, data) in frames {
        out.extend_from_slice(&u32_bytes(*sec));
        out.extend_from_slice(&u32_bytes(*frac));
        out.extend_from_slice(&u32_bytes(data.len() as u32));
        out.extend_from_slice(&u32_bytes(data.len() as u32));
        out.extend_from_slice(data);
    }
    out
}

fn ng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total = (12 + body.len()) as u32;
    let mut out = Vec::new();
    out.extend_from_slice(&block_type.to_le_bytes());
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(&total.to_le_bytes());
    out
}

/// One interface description block.
#[derive(Debug, Clone, Copy)]
pub struct NgInterface {
    pub linktype: u16,
    pub tsresol: u8,
    pub tsoffset: Option<i64>,
}

impl Default for NgInterface {
    fn default() -> Self {
        Self {
            linktype: 1,
            tsresol: 6,
            tsoffset: None,
        }
    }
}

/// Packet blocks following the interface descriptions.
#[derive(Debug, Clone)]
pub enum NgPacket {
    Enhanced { interface: u32, ticks: u64, data: Vec<u8> },
    Simple { data: Vec<u8> },
}

fn padded(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    while out.len() % 4 != 0 {
        out.push(0);
    }
    out
}

fn ng_option(code: u16, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&code.to_le_bytes());
    out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    out.extend(padded(value));
    out
}

/// Little-endian pcapng: one section, the given interfaces, then packets.
pub fn pcapng_with(interfaces: &[NgInterface], packets: &[NgPacket]) -> Vec<u8> {
    let mut shb = Vec::new();
    shb.extend_from_slice(&0x1a2b3c4du32.to_le_bytes());
    shb.extend_from_slice(&1u16.to_le_bytes());
    shb.extend_from_slice(&0u16.to_le_bytes());
    shb.extend_from_slice(&(-1i64).to_le_bytes());
    let mut out = ng_block(0x0a0d0d0a, &shb);

    for iface in interfaces {
        let mut idb = Vec::new();
        idb.extend_from_slice(&iface.linktype.to_le_bytes());
        idb.extend_from_slice(&0u16.to_le_bytes());
        idb.extend_from_slice(&65535u32.to_le_bytes());
        idb.extend(ng_option(9, &[iface.tsresol]));
        if let Some(offset) = iface.tsoffset {
            idb.extend(ng_option(14, &offset.to_le_bytes()));
        }
        idb.extend(ng_option(0, &[]));
        out.extend(ng_block(1, &idb));
    }

    for packet in packets {
        match packet {
            NgPacket::Enhanced { interface, ticks, data } => {
                let mut epb = Vec::new();
                epb.extend_from_slice(&interface.to_le_bytes());
                epb.extend_from_slice(&((ticks >> 32) as u32).to_le_bytes());
                epb.extend_from_slice(&(*ticks as u32).to_le_bytes());
                epb.extend_from_slice(&(data.len() as u32).to_le_bytes());
                epb.extend_from_slice(&(data.len() as u32).to_le_bytes());
                epb.extend(padded(data));
                out.extend(ng_block(6, &epb));
            }
            NgPacket::Simple { data } => {
                let mut spb = (data.len() as u32).to_le_bytes().to_vec();
                spb.extend(padded(data));
                out.extend(ng_block(3, &spb));
            }
        }
    }
    out
}

/// pcapng with one Ethernet interface at microsecond resolution.
pub fn pcapng(frames: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let packets: Vec<NgPacket> = frames
        .iter()
        .map(|(sec, usec, data)| NgPacket::Enhanced {
            interface: 0,
            ticks: u64::from(*sec) * 1_000_000 + u64::from(*usec),
            data: data.clone(),
        })
        .collect();
    pcapng_with(&[NgInterface::default()], &packets)
}

/// The three-packet TCP capture used across tests: t = 0, 0.5, 1.25 s.
pub fn three_tcp_frames() -> Vec<(u32, u32, Vec<u8>)> {
    vec![
        (1_700_000_000, 0, tcp_frame()),
        (1_700_000_000, 500_000, tcp_frame()),
        (1_700_000_001, 250_000, tcp_frame()),
    ]
}

pub fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}
