//! 成交量加權平均價

use crate::data_ingestion::NormalizedSeries;

/// 逐列累計的 VWAP，典型價為 `(high + low + close) / 3`
///
/// 任一所需欄位不可用時返回 `None`。累計成交量仍為 0 的列為 `None`；
/// 含 NaN 的列不計入累計。
pub fn vwap(series: &NormalizedSeries) -> Option<Vec<Option<f64>>> {
    let highs = series.highs()?;
    let lows = series.lows()?;
    let closes = series.closes()?;
    let volumes = series.volumes()?;

    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    let values = (0..series.len())
        .map(|row| {
            let typical = (highs[row] + lows[row] + closes[row]) / 3.0;
            let volume = volumes[row];
            if typical.is_finite() && volume.is_finite() {
                cum_pv += typical * volume;
                cum_volume += volume;
            }
            (cum_volume > 0.0).then(|| cum_pv / cum_volume)
        })
        .collect();

    Some(values)
}
