pub mod config;
pub mod db;
pub mod decoder;
pub mod error;
pub mod models;
pub mod paginator;
pub mod pipeline;
pub mod projector;
pub mod server;

pub use decoder::{CaptureDecoder, PcapFileDecoder};
pub use error::{AppError, DecodeError, StoreError};
pub use paginator::{Page, Paginator, PAGE_SIZE};
pub use pipeline::{analyze, Analysis};
