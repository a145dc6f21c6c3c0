use crate::models::domain::{DisplayRow, Layer, ProtocolLabel, RawPacket};

const PLACEHOLDER: &str = "-";

/// Builds the listing row for one packet.
///
/// `base_timestamp` is the timestamp of the first packet in the capture.
/// Packets are not reordered, so a decoder returning out-of-order
/// timestamps yields negative relative times for the late ones.
pub fn project_row(packet: &RawPacket, sequence_number: usize, base_timestamp: Option<f64>) -> DisplayRow {
    let relative_time = match base_timestamp {
        Some(base) => packet.timestamp - base,
        None => 0.0,
    };

    let (source, destination, protocol_label) = match &packet.addresses {
        Some(addrs) if packet.layers.has_network() => {
            let label = if packet.layers.contains(Layer::Tcp) {
                ProtocolLabel::Tcp
            } else if packet.layers.contains(Layer::Udp) {
                ProtocolLabel::Udp
            } else {
                ProtocolLabel::Ip
            };
            (addrs.source.clone(), addrs.destination.clone(), label)
        }
        _ => (PLACEHOLDER.to_string(), PLACEHOLDER.to_string(), ProtocolLabel::None),
    };

    DisplayRow {
        sequence_number,
        relative_time,
        source,
        destination,
        protocol_label,
        length: packet.length,
        info: packet.summary.clone(),
    }
}

/// Projects a whole capture, numbering rows from 1.
pub fn project_rows(packets: &[RawPacket]) -> Vec<DisplayRow> {
    let base = packets.first().map(|p| p.timestamp);
    packets
        .iter()
        .enumerate()
        .map(|(i, p)| project_row(p, i + 1, base))
        .collect()
}
