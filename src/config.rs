use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_USER_HEADER: &str = "X-Authenticated-User";

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload packet captures and browse the decoded packets page by page")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServerConfig),
    /// Print one page of a capture's packet listing
    Show(ShowArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "TRAFFICLENS_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    #[arg(long, env = "TRAFFICLENS_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory holding uploaded captures and the upload index
    #[arg(long, env = "TRAFFICLENS_MEDIA_DIR", default_value = "media")]
    pub media_dir: PathBuf,

    /// Header carrying the identity set by the fronting auth layer
    #[arg(long, env = "TRAFFICLENS_USER_HEADER", default_value = DEFAULT_USER_HEADER)]
    pub user_header: String,

    /// Largest accepted upload, in megabytes
    #[arg(long, env = "TRAFFICLENS_MAX_UPLOAD_MB", default_value_t = 100)]
    pub max_upload_mb: usize,
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ShowArgs {
    /// Capture file (pcap or pcapng)
    pub file: PathBuf,

    /// Page to print; out-of-range values are clamped
    #[arg(short, long)]
    pub page: Option<String>,
}
