use std::io::{self, Write};

use clap::Parser;
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use trafficlens::config::{Cli, Command, ShowArgs};
use trafficlens::{analyze, Page, PcapFileDecoder};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trafficlens=info,actix_web=info")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve(config) => trafficlens::server::run(config).await?,
        Command::Show(args) => show(&args)?,
    }
    Ok(())
}

fn show(args: &ShowArgs) -> io::Result<()> {
    let analysis = analyze(&PcapFileDecoder, &args.file, args.page.as_deref());
    if let Some(error) = &analysis.error {
        eprintln!("Error: {}", error);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_page(&mut out, &analysis.page)
}

fn print_page<W: Write>(out: &mut W, page: &Page) -> io::Result<()> {
    writeln!(
        out,
        "{:>7}  {:>12}  {:<39}  {:<39}  {:<5}  {:>6}  Info",
        "No.", "Time", "Source", "Destination", "Proto", "Length"
    )?;
    for row in page.rows() {
        writeln!(
            out,
            "{:>7}  {:>12}  {:<39}  {:<39}  {:<5}  {:>6}  {}",
            row.sequence_number,
            row.formatted_time(),
            row.source,
            row.destination,
            row.protocol_label,
            row.length,
            row.info
        )?;
    }
    writeln!(
        out,
        "-- page {} of {} ({} packets) --",
        page.number(),
        page.num_pages(),
        page.total_count()
    )
}
