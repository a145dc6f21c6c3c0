pub mod domain {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::path::PathBuf;

    /// Protocol layers the decoder can recognise inside a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Layer {
        Ethernet,
        Arp,
        Ipv4,
        Ipv6,
        Tcp,
        Udp,
        Icmp,
    }

    impl Layer {
        pub fn name(&self) -> &'static str {
            match self {
                Layer::Ethernet => "Ether",
                Layer::Arp => "ARP",
                Layer::Ipv4 => "IP",
                Layer::Ipv6 => "IPv6",
                Layer::Tcp => "TCP",
                Layer::Udp => "UDP",
                Layer::Icmp => "ICMP",
            }
        }

        fn bit(&self) -> u8 {
            match self {
                Layer::Ethernet => 1 << 0,
                Layer::Arp => 1 << 1,
                Layer::Ipv4 => 1 << 2,
                Layer::Ipv6 => 1 << 3,
                Layer::Tcp => 1 << 4,
                Layer::Udp => 1 << 5,
                Layer::Icmp => 1 << 6,
            }
        }
    }

    /// Set of layer tags present on a packet.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct LayerSet(u8);

    impl LayerSet {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, layer: Layer) {
            self.0 |= layer.bit();
        }

        pub fn with(mut self, layer: Layer) -> Self {
            self.insert(layer);
            self
        }

        pub fn contains(&self, layer: Layer) -> bool {
            self.0 & layer.bit() != 0
        }

        pub fn has_network(&self) -> bool {
            self.contains(Layer::Ipv4) || self.contains(Layer::Ipv6)
        }

        pub fn is_empty(&self) -> bool {
            self.0 == 0
        }
    }

    impl FromIterator<Layer> for LayerSet {
        fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
            iter.into_iter().fold(LayerSet::new(), LayerSet::with)
        }
    }

    /// Source/destination pair taken from the network layer.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Addresses {
        pub source: String,
        pub destination: String,
    }

    /// One decoded frame, as handed over by a capture decoder.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RawPacket {
        pub timestamp: f64,
        pub length: usize,
        pub layers: LayerSet,
        pub addresses: Option<Addresses>,
        pub summary: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum ProtocolLabel {
        #[serde(rename = "-")]
        None,
        #[serde(rename = "IP")]
        Ip,
        #[serde(rename = "TCP")]
        Tcp,
        #[serde(rename = "UDP")]
        Udp,
    }

    impl ProtocolLabel {
        pub fn as_str(&self) -> &'static str {
            match self {
                ProtocolLabel::None => "-",
                ProtocolLabel::Ip => "IP",
                ProtocolLabel::Tcp => "TCP",
                ProtocolLabel::Udp => "UDP",
            }
        }
    }

    impl fmt::Display for ProtocolLabel {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.pad(self.as_str())
        }
    }

    /// One line of the packet listing.
    #[derive(Debug, Clone, PartialEq)]
    pub struct DisplayRow {
        pub sequence_number: usize,
        pub relative_time: f64,
        pub source: String,
        pub destination: String,
        pub protocol_label: ProtocolLabel,
        pub length: usize,
        pub info: String,
    }

    impl DisplayRow {
        pub fn formatted_time(&self) -> String {
            format!("{:.6}", self.relative_time)
        }
    }

    /// A stored capture file and who owns it.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Upload {
        pub id: u64,
        pub owner: String,
        pub file_name: String,
        pub stored_path: PathBuf,
        pub uploaded_at: DateTime<Utc>,
    }

    impl fmt::Display for Upload {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} - {}", self.owner, self.file_name)
        }
    }
}

pub mod dto {
    use chrono::{DateTime, Utc};
    use serde::Serialize;

    use super::domain::{DisplayRow, ProtocolLabel, Upload};
    use crate::paginator::Page;

    #[derive(Debug, Serialize, Clone, PartialEq)]
    pub struct PacketRowDTO {
        pub no: usize,
        pub time: String,
        pub src: String,
        pub dst: String,
        pub proto: ProtocolLabel,
        pub length: usize,
        pub info: String,
    }

    impl From<&DisplayRow> for PacketRowDTO {
        fn from(row: &DisplayRow) -> Self {
            PacketRowDTO {
                no: row.sequence_number,
                time: row.formatted_time(),
                src: row.source.clone(),
                dst: row.destination.clone(),
                proto: row.protocol_label,
                length: row.length,
                info: row.info.clone(),
            }
        }
    }

    #[derive(Debug, Serialize, Clone, PartialEq)]
    pub struct PageDTO {
        pub number: usize,
        pub num_pages: usize,
        pub count: usize,
        pub page_size: usize,
        pub has_previous: bool,
        pub has_next: bool,
        pub previous_page_number: Option<usize>,
        pub next_page_number: Option<usize>,
        pub start_index: usize,
        pub end_index: usize,
        pub object_list: Vec<PacketRowDTO>,
    }

    impl From<&Page> for PageDTO {
        fn from(page: &Page) -> Self {
            PageDTO {
                number: page.number(),
                num_pages: page.num_pages(),
                count: page.total_count(),
                page_size: page.page_size(),
                has_previous: page.has_previous(),
                has_next: page.has_next(),
                previous_page_number: page.previous_page_number(),
                next_page_number: page.next_page_number(),
                start_index: page.start_index(),
                end_index: page.end_index(),
                object_list: page.rows().iter().map(PacketRowDTO::from).collect(),
            }
        }
    }

    /// Upload metadata as exposed to clients; the storage path stays private.
    #[derive(Debug, Serialize, Clone, PartialEq)]
    pub struct UploadDTO {
        pub id: u64,
        pub file_name: String,
        pub uploaded_at: DateTime<Utc>,
    }

    impl From<&Upload> for UploadDTO {
        fn from(upload: &Upload) -> Self {
            UploadDTO {
                id: upload.id,
                file_name: upload.file_name.clone(),
                uploaded_at: upload.uploaded_at,
            }
        }
    }

    /// Everything the rendering layer needs for the analysis view.
    #[derive(Debug, Serialize, Clone, PartialEq)]
    pub struct AnalysisContext {
        pub upload: UploadDTO,
        pub page_obj: PageDTO,
        pub error: Option<String>,
    }
}
