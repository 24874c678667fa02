//! Cumulative rasterization counters.

/// A snapshot of the rasterizer's counters.
///
/// `*_min_*` fields are zero until the first successful render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Successful rasterization passes.
    pub renders: u64,
    /// Passes that failed writing to the sink.
    pub failed_renders: u64,
    /// Bytes written across all successful passes.
    pub render_bytes: u64,
    /// Largest single pass, in bytes.
    pub render_max_bytes: u64,
    /// Smallest single pass, in bytes.
    pub render_min_bytes: u64,
    /// Time spent across all successful passes, in nanoseconds.
    pub render_ns: u64,
    /// Slowest single pass.
    pub render_max_ns: u64,
    /// Fastest single pass.
    pub render_min_ns: u64,
    /// Cells skipped because they matched the previous frame.
    pub cell_elisions: u64,
    /// Cells written.
    pub cell_emissions: u64,
    /// Written cells whose foreground was already current.
    pub fg_elisions: u64,
    /// Foreground color sequences written.
    pub fg_emissions: u64,
    /// Written cells whose background was already current.
    pub bg_elisions: u64,
    /// Background color sequences written.
    pub bg_emissions: u64,
    /// Written cells whose default colors were already current.
    pub default_elisions: u64,
    /// Default-color sequences written.
    pub default_emissions: u64,
}

/// Per-pass counters produced by the diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DiffCounts {
    pub(crate) cell_elisions: u64,
    pub(crate) cell_emissions: u64,
    pub(crate) fg_elisions: u64,
    pub(crate) fg_emissions: u64,
    pub(crate) bg_elisions: u64,
    pub(crate) bg_emissions: u64,
    pub(crate) default_elisions: u64,
    pub(crate) default_emissions: u64,
}

impl RenderStats {
    /// Fold one successful pass into the totals.
    pub(crate) fn record(&mut self, bytes: u64, ns: u64, counts: &DiffCounts) {
        if self.renders == 0 {
            self.render_min_bytes = bytes;
            self.render_min_ns = ns;
        } else {
            self.render_min_bytes = self.render_min_bytes.min(bytes);
            self.render_min_ns = self.render_min_ns.min(ns);
        }
        self.renders += 1;
        self.render_bytes += bytes;
        self.render_max_bytes = self.render_max_bytes.max(bytes);
        self.render_ns += ns;
        self.render_max_ns = self.render_max_ns.max(ns);

        self.cell_elisions += counts.cell_elisions;
        self.cell_emissions += counts.cell_emissions;
        self.fg_elisions += counts.fg_elisions;
        self.fg_emissions += counts.fg_emissions;
        self.bg_elisions += counts.bg_elisions;
        self.bg_emissions += counts.bg_emissions;
        self.default_elisions += counts.default_elisions;
        self.default_emissions += counts.default_emissions;
    }
}
