use crate::models::domain::DisplayRow;

/// Rows per listing page; captures can be huge.
pub const PAGE_SIZE: usize = 200;

/// Splits a listing into fixed-size pages.
#[derive(Debug, Clone)]
pub struct Paginator {
    rows: Vec<DisplayRow>,
    page_size: usize,
}

/// A contiguous slice of the listing plus navigation info.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    rows: Vec<DisplayRow>,
    number: usize,
    num_pages: usize,
    total_count: usize,
    page_size: usize,
}

impl Paginator {
    pub fn new(rows: Vec<DisplayRow>) -> Self {
        Self::with_page_size(rows, PAGE_SIZE)
    }

    pub fn with_page_size(rows: Vec<DisplayRow>, page_size: usize) -> Self {
        Self {
            rows,
            page_size: page_size.max(1),
        }
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Never less than one, even for an empty listing.
    pub fn num_pages(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    /// Returns the requested page, clamped into `1..=num_pages`.
    pub fn page(&self, requested: usize) -> Page {
        let num_pages = self.num_pages();
        let number = requested.clamp(1, num_pages);
        let start = ((number - 1) * self.page_size).min(self.rows.len());
        let end = (start + self.page_size).min(self.rows.len());

        Page {
            rows: self.rows[start..end].to_vec(),
            number,
            num_pages,
            total_count: self.rows.len(),
            page_size: self.page_size,
        }
    }

    /// Lenient lookup from a raw query value: absent or non-numeric input
    /// gives page 1, out-of-range input is clamped.
    pub fn get_page(&self, raw: Option<&str>) -> Page {
        self.page(parse_page_number(raw))
    }
}

/// Parses a page query value; anything unusable maps to 1 and values past
/// `usize::MAX` saturate so they clamp to the last page.
pub fn parse_page_number(raw: Option<&str>) -> usize {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 1;
    };

    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => usize::try_from(n).unwrap_or(usize::MAX),
        Ok(_) => 1,
        Err(_) if is_unsigned_digits(raw) => usize::MAX,
        Err(_) => 1,
    }
}

fn is_unsigned_digits(raw: &str) -> bool {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl Page {
    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next().then(|| self.number + 1)
    }

    /// 1-based index of the first row on this page, 0 when empty.
    pub fn start_index(&self) -> usize {
        if self.total_count == 0 {
            0
        } else {
            (self.number - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last row on this page, 0 when empty.
    pub fn end_index(&self) -> usize {
        if self.total_count == 0 {
            0
        } else {
            self.start_index() + self.rows.len() - 1
        }
    }

    /// An empty listing: page 1 of 1.
    pub fn empty() -> Self {
        Paginator::new(Vec::new()).page(1)
    }
}
