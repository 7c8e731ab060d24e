//! Per-bar return series. `None` marks a value that is undefined at that bar
//! (the first bar has no previous close and no position yet).

use core_types::Signal;

/// Simple returns `close[i] / close[i - 1] - 1`; `None` at bar 0.
///
/// A non-finite return (a zero previous close) is reported as `Some(0.0)` so
/// that one bad print cannot poison the whole equity curve.
pub fn pct_change(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(None);
    for (i, pair) in closes.windows(2).enumerate() {
        let ret = pair[1] / pair[0] - 1.0;
        if ret.is_finite() {
            out.push(Some(ret));
        } else {
            tracing::warn!(bar = i + 1, prev_close = pair[0], close = pair[1], "Non-finite market return treated as 0.");
            out.push(Some(0.0));
        }
    }
    out
}

/// Positions held on each bar: the signal from the previous bar.
///
/// A decision made on the close of bar `i - 1` is executed on bar `i`, so
/// the position at bar 0 is undefined.
pub fn shift_positions(signals: &[Signal]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(signals.len());
    if signals.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(signals[..signals.len() - 1].iter().map(|s| Some(s.position())));
    out
}

/// Element-wise `position * market_return`; undefined where either input is.
pub fn strategy_returns(positions: &[Option<f64>], market: &[Option<f64>]) -> Vec<Option<f64>> {
    positions
        .iter()
        .zip(market)
        .map(|(position, ret)| Some((*position)? * (*ret)?))
        .collect()
}
