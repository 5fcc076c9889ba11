//! 成交量分布
//!
//! 將收盤價範圍等分為若干價格區間，累加每個區間內的成交量。

use serde::Serialize;

use crate::data_ingestion::NormalizedSeries;

/// 預設價格區間數
pub const DEFAULT_PROFILE_BINS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileBin {
    pub lower: f64,
    pub upper: f64,
    pub volume: f64,
}

impl ProfileBin {
    pub fn mid(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeProfile {
    pub min_price: f64,
    pub max_price: f64,
    /// 依價格由低到高排列
    pub bins: Vec<ProfileBin>,
}

impl VolumeProfile {
    pub fn total_volume(&self) -> f64 {
        self.bins.iter().map(|bin| bin.volume).sum()
    }

    /// 成交量最大的區間（控制點），同量時取價格較低者
    pub fn point_of_control(&self) -> Option<&ProfileBin> {
        self.bins.iter().fold(None, |best: Option<&ProfileBin>, bin| match best {
            Some(current) if current.volume >= bin.volume => Some(current),
            _ => Some(bin),
        })
    }
}

/// 計算成交量分布
///
/// 收盤價或成交量欄位不可用、沒有有限的收盤價、或 `bin_count` 為 0 時返回 `None`。
/// 區間寬度為 `(max - min) / bin_count`，最後一個區間包含上界；
/// 所有收盤價相同時只產生一個區間。
pub fn volume_profile(series: &NormalizedSeries, bin_count: usize) -> Option<VolumeProfile> {
    if bin_count == 0 {
        return None;
    }
    let closes = series.closes()?;
    let volumes = series.volumes()?;

    let rows: Vec<(f64, f64)> = closes
        .iter()
        .zip(volumes)
        .filter(|(close, _)| close.is_finite())
        .map(|(&close, &volume)| (close, if volume.is_finite() { volume } else { 0.0 }))
        .collect();

    let (min_price, max_price) = rows.iter().fold(None, |range, &(close, _)| match range {
        None => Some((close, close)),
        Some((lo, hi)) => Some((f64::min(lo, close), f64::max(hi, close))),
    })?;

    if min_price == max_price {
        let volume = rows.iter().map(|(_, volume)| volume).sum();
        return Some(VolumeProfile {
            min_price,
            max_price,
            bins: vec![ProfileBin {
                lower: min_price,
                upper: max_price,
                volume,
            }],
        });
    }

    let width = (max_price - min_price) / bin_count as f64;
    let mut bins: Vec<ProfileBin> = (0..bin_count)
        .map(|i| ProfileBin {
            lower: min_price + width * i as f64,
            upper: if i + 1 == bin_count {
                max_price
            } else {
                min_price + width * (i + 1) as f64
            },
            volume: 0.0,
        })
        .collect();

    for (close, volume) in rows {
        let index = (((close - min_price) / width).floor() as usize).min(bin_count - 1);
        bins[index].volume += volume;
    }

    Some(VolumeProfile {
        min_price,
        max_price,
        bins,
    })
}
