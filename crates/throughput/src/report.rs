//! Fixed-width report lines.

use crate::harness::PointResult;

/// Column headings, right-aligned to the row widths.
#[must_use]
pub fn header() -> String {
    format!(
        "{:>8}{:>16}{:>8}{:>16}{:>16}",
        "t_cost", "m_cost", "threads", "Argon2d (ms)", "Argon2i (ms)"
    )
}

/// One row: the grid point and the best latency of each variant in
/// milliseconds with three decimals.
#[must_use]
pub fn format_row(result: &PointResult) -> String {
    format!(
        "{:8}{:16}{:8}{:16.3}{:16.3}",
        result.point.t_cost,
        result.point.m_cost,
        result.point.threads,
        result.argon2d_ms,
        result.argon2i_ms
    )
}
