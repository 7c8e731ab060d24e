use anyhow::Context;
use core_types::{CoreError, PriceBar, PriceSeries};
use std::path::Path;

/// Reads a JSON array of price bars.
///
/// An empty array is reported as missing market data before any engine sees
/// it; out-of-order bars are rejected the same way.
pub fn load(path: &Path) -> anyhow::Result<PriceSeries> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read price file {}", path.display()))?;
    let bars: Vec<PriceBar> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse price file {}", path.display()))?;

    let series = PriceSeries::new(bars).map_err(|e| match e {
        CoreError::EmptySeries => anyhow::anyhow!("MarketDataEmpty: {} contains no bars", path.display()),
        other => anyhow::Error::new(other).context(format!("Invalid price file {}", path.display())),
    })?;

    tracing::info!(path = %path.display(), bars = series.len(), "Price series loaded.");
    Ok(series)
}
