use std::path::Path;

use tracing::{debug, warn};

use crate::decoder::CaptureDecoder;
use crate::models::domain::DisplayRow;
use crate::paginator::{Page, Paginator};
use crate::projector::project_rows;

/// Stages a listing request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decoding,
    Projecting,
    Paginating,
    Done,
    Failed,
}

/// Result of one listing request. A failed decode still carries a
/// renderable (empty) page next to the error message.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub page: Page,
    pub error: Option<String>,
    pub stage: Stage,
}

impl Analysis {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Decodes `path`, projects every packet and returns the requested page.
///
/// Runs synchronously and decodes afresh on every call.
pub fn analyze<D>(decoder: &D, path: &Path, requested_page: Option<&str>) -> Analysis
where
    D: CaptureDecoder + ?Sized,
{
    debug!(path = %path.display(), stage = ?Stage::Decoding);
    let (rows, error): (Vec<DisplayRow>, Option<String>) = match decoder.decode(path) {
        Ok(packets) => {
            debug!(packets = packets.len(), stage = ?Stage::Projecting);
            (project_rows(&packets), None)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "capture decode failed");
            (Vec::new(), Some(e.to_string()))
        }
    };

    let page = Paginator::new(rows).get_page(requested_page);
    debug!(
        total = page.total_count(),
        page = page.number(),
        stage = ?Stage::Paginating
    );

    let stage = if error.is_some() { Stage::Failed } else { Stage::Done };
    Analysis { page, error, stage }
}
