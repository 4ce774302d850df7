//! Progress reporting for paginated fetches.

/// Receives a notification after every successfully fetched page.
///
/// `fetched` is the number of records accumulated so far and `total` is the
/// count reported by the first page.
pub trait ProgressSink: Send {
    fn on_page(&mut self, fetched: usize, total: u64);
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, u64) + Send,
{
    fn on_page(&mut self, fetched: usize, total: u64) {
        self(fetched, total);
    }
}

/// Accumulator owned by the caller of a fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchProgress {
    /// Records fetched so far.
    pub fetched: usize,
    /// Total reported by the API.
    pub total: u64,
    /// Pages received.
    pub pages: u32,
}

impl FetchProgress {
    /// Fraction complete in `0.0..=1.0`; `1.0` when nothing was reported.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.fetched as f64 / self.total as f64).min(1.0)
    }
}

impl ProgressSink for FetchProgress {
    fn on_page(&mut self, fetched: usize, total: u64) {
        self.fetched = fetched;
        self.total = total;
        self.pages += 1;
    }
}
