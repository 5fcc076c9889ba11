//! 斐波那契回撤水位

use serde::Serialize;

use crate::data_ingestion::NormalizedSeries;

pub const FIB_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
}

/// 以收盤價的最高與最低點計算回撤水位，`price = high - (high - low) * ratio`
pub fn fibonacci_levels(series: &NormalizedSeries) -> Option<Vec<FibonacciLevel>> {
    let closes = series.closes()?;
    let (low, high) = closes
        .iter()
        .filter(|close| close.is_finite())
        .fold(None, |range, &close| match range {
            None => Some((close, close)),
            Some((lo, hi)) => Some((f64::min(lo, close), f64::max(hi, close))),
        })?;

    Some(
        FIB_RATIOS
            .iter()
            .map(|&ratio| FibonacciLevel {
                ratio,
                price: high - (high - low) * ratio,
            })
            .collect(),
    )
}
