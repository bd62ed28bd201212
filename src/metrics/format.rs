use std::time::Duration;

const NANOS_PER_MILLI: u128 = 1_000_000;

/// Render a duration in milliseconds with a fixed number of decimals
/// (rounded half up), without going through floating point.
#[must_use]
pub fn format_millis(duration: Duration, decimals: u32) -> String {
    let scale = 10u128.saturating_pow(decimals);
    let scaled = duration
        .as_nanos()
        .saturating_mul(scale)
        .saturating_add(NANOS_PER_MILLI / 2)
        .checked_div(NANOS_PER_MILLI)
        .unwrap_or(0);
    let whole = scaled.checked_div(scale).unwrap_or(0);
    if decimals == 0 {
        return whole.to_string();
    }
    let fraction = scaled.checked_rem(scale).unwrap_or(0);
    let width = usize::try_from(decimals).unwrap_or(0);
    format!("{}.{:0width$}", whole, fraction, width = width)
}

/// Render an x100 fixed-point value as `N.NN`.
#[must_use]
pub fn format_x100(value: u64) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}
