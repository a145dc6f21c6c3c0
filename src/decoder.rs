use std::fs::File;
use std::io::Read;
use std::net::IpAddr;
use std::path::Path;

use etherparse::{EtherType, Ethernet2HeaderSlice, LinkSlice, NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{create_reader, Block, Linktype, PcapBlockOwned, PcapError};
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::models::domain::{Addresses, Layer, LayerSet, RawPacket};

const BUFFER_SIZE: usize = 1 << 20;
// consecutive refills without a parsed block before giving up
const MAX_STALLED_REFILLS: usize = 16;

/// Turns a capture file into an ordered list of packets.
pub trait CaptureDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Vec<RawPacket>, DecodeError>;
}

/// Reads legacy pcap and pcapng files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcapFileDecoder;

impl CaptureDecoder for PcapFileDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<RawPacket>, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let packets = decode_reader(file)?;
        debug!(path = %path.display(), packets = packets.len(), "capture decoded");
        Ok(packets)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    Ethernet,
    RawIp,
    Loopback,
    Other,
}

impl From<Linktype> for LinkKind {
    fn from(link: Linktype) -> Self {
        match link.0 {
            1 => LinkKind::Ethernet,
            101 | 228 | 229 => LinkKind::RawIp,
            0 | 108 => LinkKind::Loopback,
            _ => LinkKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Interface {
    link: LinkKind,
    // ticks per second
    resolution: u64,
    offset_secs: i64,
}

fn ts_resolution(tsresol: u8) -> Option<u64> {
    let exp = u32::from(tsresol & 0x7f);
    if tsresol & 0x80 != 0 {
        2u64.checked_pow(exp)
    } else {
        10u64.checked_pow(exp)
    }
}

/// Decodes any pcap/pcapng byte stream.
pub fn decode_reader<R: Read + Send>(source: R) -> Result<Vec<RawPacket>, DecodeError> {
    let mut reader = create_reader(BUFFER_SIZE, source).map_err(|e| DecodeError::UnknownFormat {
        reason: e.to_string(),
    })?;

    let mut packets = Vec::new();
    // legacy files: (link, fractional divisor)
    let mut legacy: Option<(LinkKind, f64)> = None;
    let mut interfaces: Vec<Interface> = Vec::new();
    let mut stalled = 0;

    loop {
        match reader.next() {
            Ok((offset, block)) => {
                stalled = 0;
                match block {
                    PcapBlockOwned::LegacyHeader(header) => {
                        let divisor = if header.is_nanosecond_precision() { 1e9 } else { 1e6 };
                        legacy = Some((LinkKind::from(header.network), divisor));
                    }
                    PcapBlockOwned::Legacy(record) => {
                        let (link, divisor) = legacy.unwrap_or((LinkKind::Ethernet, 1e6));
                        let timestamp = f64::from(record.ts_sec) + f64::from(record.ts_usec) / divisor;
                        let len = (record.caplen as usize).min(record.data.len());
                        packets.push(dissect(link, timestamp, &record.data[..len]));
                    }
                    PcapBlockOwned::NG(Block::SectionHeader(_)) => interfaces.clear(),
                    PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                        interfaces.push(Interface {
                            link: LinkKind::from(idb.linktype),
                            resolution: ts_resolution(idb.if_tsresol).unwrap_or(1_000_000),
                            offset_secs: idb.if_tsoffset as i64,
                        });
                    }
                    PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => {
                        let iface = interfaces.get(epb.if_id as usize).copied().ok_or_else(|| {
                            DecodeError::Malformed {
                                reason: format!("packet references unknown interface {}", epb.if_id),
                            }
                        })?;
                        let ticks = (u64::from(epb.ts_high) << 32) | u64::from(epb.ts_low);
                        let timestamp = iface.offset_secs as f64
                            + (ticks / iface.resolution) as f64
                            + (ticks % iface.resolution) as f64 / iface.resolution as f64;
                        let len = (epb.caplen as usize).min(epb.data.len());
                        packets.push(dissect(iface.link, timestamp, &epb.data[..len]));
                    }
                    PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
                        // no timestamp in simple blocks; keep the previous one
                        let link = interfaces.first().map(|i| i.link).unwrap_or(LinkKind::Other);
                        let timestamp = packets.last().map(|p: &RawPacket| p.timestamp).unwrap_or(0.0);
                        let len = (spb.origlen as usize).min(spb.data.len());
                        packets.push(dissect(link, timestamp, &spb.data[..len]));
                    }
                    _ => {}
                }
                reader.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::UnexpectedEof) => {
                warn!(packets = packets.len(), "capture ends with a truncated record");
                break;
            }
            Err(PcapError::Incomplete(_)) => {
                stalled += 1;
                if stalled > MAX_STALLED_REFILLS {
                    return Err(DecodeError::Malformed {
                        reason: "record larger than the read buffer".into(),
                    });
                }
                reader.refill().map_err(|e| DecodeError::Malformed {
                    reason: format!("read error: {}", e),
                })?;
            }
            Err(e) => {
                return Err(DecodeError::Malformed {
                    reason: e.to_string(),
                })
            }
        }
    }

    Ok(packets)
}

/// Dissects one frame into the layer tags, addresses and summary line.
fn dissect(link: LinkKind, timestamp: f64, data: &[u8]) -> RawPacket {
    let sliced = match link {
        LinkKind::Ethernet => SlicedPacket::from_ethernet(data).ok(),
        LinkKind::RawIp => SlicedPacket::from_ip(data).ok(),
        LinkKind::Loopback => data.get(4..).and_then(|ip| SlicedPacket::from_ip(ip).ok()),
        LinkKind::Other => None,
    };

    let mut chain = Vec::new();
    let mut addresses = None;
    let mut detail = String::new();

    match sliced {
        Some(packet) => {
            if let Some(LinkSlice::Ethernet2(eth)) = &packet.link {
                chain.push(Layer::Ethernet);
                if eth.ether_type() == EtherType::ARP {
                    chain.push(Layer::Arp);
                }
            }

            let endpoints = match &packet.net {
                Some(NetSlice::Ipv4(ipv4)) => {
                    chain.push(Layer::Ipv4);
                    let header = ipv4.header();
                    Some((
                        IpAddr::V4(header.source_addr()),
                        IpAddr::V4(header.destination_addr()),
                        ipv4.payload().ip_number.0,
                    ))
                }
                Some(NetSlice::Ipv6(ipv6)) => {
                    chain.push(Layer::Ipv6);
                    let header = ipv6.header();
                    Some((
                        IpAddr::V6(header.source_addr()),
                        IpAddr::V6(header.destination_addr()),
                        ipv6.payload().ip_number.0,
                    ))
                }
                _ => None,
            };

            if let Some((src, dst, ip_number)) = endpoints {
                addresses = Some(Addresses {
                    source: src.to_string(),
                    destination: dst.to_string(),
                });

                detail = match &packet.transport {
                    Some(TransportSlice::Tcp(tcp)) => {
                        chain.push(Layer::Tcp);
                        let flags: String = [
                            (tcp.fin(), 'F'),
                            (tcp.syn(), 'S'),
                            (tcp.rst(), 'R'),
                            (tcp.psh(), 'P'),
                            (tcp.ack(), 'A'),
                            (tcp.urg(), 'U'),
                        ]
                        .iter()
                        .filter(|(set, _)| *set)
                        .map(|(_, c)| *c)
                        .collect();
                        let mut line = format!(
                            " {} > {}",
                            endpoint(src, tcp.source_port()),
                            endpoint(dst, tcp.destination_port())
                        );
                        if !flags.is_empty() {
                            line.push(' ');
                            line.push_str(&flags);
                        }
                        line
                    }
                    Some(TransportSlice::Udp(udp)) => {
                        chain.push(Layer::Udp);
                        format!(
                            " {} > {}",
                            endpoint(src, udp.source_port()),
                            endpoint(dst, udp.destination_port())
                        )
                    }
                    Some(TransportSlice::Icmpv4(icmp)) => {
                        chain.push(Layer::Icmp);
                        format!(" {} > {} type {} code {}", src, dst, icmp.type_u8(), icmp.code_u8())
                    }
                    Some(TransportSlice::Icmpv6(icmp)) => {
                        chain.push(Layer::Icmp);
                        format!(" {} > {} type {} code {}", src, dst, icmp.type_u8(), icmp.code_u8())
                    }
                    _ => format!(" {} > {} proto {}", src, dst, ip_number),
                };
            }
        }
        None => {
            // the frame did not slice cleanly; keep whatever link header is there
            if link == LinkKind::Ethernet && Ethernet2HeaderSlice::from_slice(data).is_ok() {
                chain.push(Layer::Ethernet);
            }
        }
    }

    let layers: LayerSet = chain.iter().copied().collect();
    let mut names: Vec<&str> = chain.iter().map(Layer::name).collect();
    if !layers.has_network() && !layers.contains(Layer::Arp) {
        names.push("Raw");
    }

    RawPacket {
        timestamp,
        length: data.len(),
        layers,
        addresses,
        summary: format!("{}{}", names.join(" / "), detail),
    }
}

fn endpoint(addr: IpAddr, port: u16) -> String {
    match addr {
        IpAddr::V4(v4) => format!("{}:{}", v4, port),
        IpAddr::V6(v6) => format!("[{}]:{}", v6, port),
    }
}
