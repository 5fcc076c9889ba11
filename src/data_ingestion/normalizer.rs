//! 上游表格正規化
//!
//! 將欄位命名不一的原始表格對應到標準欄位集合
//! {time, open, high, low, close, volume}。任何欄位都可能缺失，
//! 缺失只影響依賴該欄位的計算，正規化本身永不失敗。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use tracing::debug;

use super::error::{NormalizeError, NormalizeResult};
use super::schema::{field_candidates, TimestampKind, TIMESTAMP_CANDIDATES};
use crate::data_provider::RawSeries;
use crate::domain_types::{ColumnName, Field};
use crate::utils::time_utils::timestamp_ms_to_datetime;

const MS_PER_DAY: i64 = 86_400_000;

/// 含時間的字串格式
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// 只有日期的字串格式
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// 序列的時間索引
#[derive(Debug, Clone, PartialEq)]
pub enum TimeIndex {
    /// 來自時間欄位的毫秒時間戳
    Timestamps {
        source: String,
        kind: TimestampKind,
        values: Vec<Option<i64>>,
    },
    /// 沒有可用的時間欄位，以列序號為索引
    Positional,
}

/// 已對應到原始欄位的邏輯欄位
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    /// 原始欄位名稱
    pub source: String,
    /// 轉為 f64 的數值，空值為 NaN；無法轉換時保留錯誤
    pub values: NormalizeResult<Vec<f64>>,
}

impl ResolvedColumn {
    pub fn numeric(&self) -> Option<&[f64]> {
        self.values.as_deref().ok()
    }
}

/// 正規化後的序列，列依時間先後排列
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub symbol: String,
    pub index: TimeIndex,
    pub open: Option<ResolvedColumn>,
    pub high: Option<ResolvedColumn>,
    pub low: Option<ResolvedColumn>,
    pub close: Option<ResolvedColumn>,
    pub volume: Option<ResolvedColumn>,
    rows: usize,
}

impl NormalizedSeries {
    /// 沒有任何資料的序列
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            index: TimeIndex::Positional,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            rows: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, field: Field) -> Option<&ResolvedColumn> {
        match field {
            Field::Open => self.open.as_ref(),
            Field::High => self.high.as_ref(),
            Field::Low => self.low.as_ref(),
            Field::Close => self.close.as_ref(),
            Field::Volume => self.volume.as_ref(),
        }
    }

    /// 已解析且可轉為數值的欄位值
    pub fn numeric(&self, field: Field) -> Option<&[f64]> {
        self.column(field).and_then(ResolvedColumn::numeric)
    }

    pub fn has_close(&self) -> bool {
        self.close.is_some()
    }

    /// 成功對應到原始欄位的邏輯欄位
    pub fn resolved_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.column(*field).is_some())
            .collect()
    }

    pub fn closes(&self) -> Option<&[f64]> {
        self.numeric(Field::Close)
    }

    pub fn volumes(&self) -> Option<&[f64]> {
        self.numeric(Field::Volume)
    }

    pub fn highs(&self) -> Option<&[f64]> {
        self.numeric(Field::High)
    }

    pub fn lows(&self) -> Option<&[f64]> {
        self.numeric(Field::Low)
    }

    /// 毫秒時間戳；以列序號為索引時返回 `None`
    pub fn timestamps(&self) -> Option<&[Option<i64>]> {
        match &self.index {
            TimeIndex::Timestamps { values, .. } => Some(values),
            TimeIndex::Positional => None,
        }
    }

    /// 第 `row` 列的時間；以列序號為索引時返回 `None`
    pub fn timestamp(&self, row: usize) -> Option<DateTime<Utc>> {
        match &self.index {
            TimeIndex::Timestamps { values, .. } => values
                .get(row)
                .copied()
                .flatten()
                .and_then(timestamp_ms_to_datetime),
            TimeIndex::Positional => None,
        }
    }

    /// 轉為標準欄位名稱的表格，僅包含可用的欄位
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::new();

        if let TimeIndex::Timestamps { values, .. } = &self.index {
            columns.push(Series::new(ColumnName::TIME.into(), values.clone()).into());
        }
        for field in Field::ALL {
            if let Some(values) = self.numeric(field) {
                columns.push(Series::new(field.canonical_name().into(), values.to_vec()).into());
            }
        }

        DataFrame::new(columns)
    }
}

/// 正規化一次抓取的原始序列
pub fn normalize(raw: &RawSeries) -> NormalizedSeries {
    normalize_frame(&raw.frame, &raw.symbol)
}

/// 正規化原始表格，`symbol` 用於比對多商品樣式的欄位名稱
pub fn normalize_frame(frame: &DataFrame, symbol: &str) -> NormalizedSeries {
    let rows = frame.height();
    let index = resolve_index(frame, symbol);

    let resolve = |field: Field| {
        let resolved = resolve_field(frame, field, symbol);
        if resolved.is_none() {
            debug!("{} 缺少欄位 {}", symbol, field);
        }
        resolved
    };

    let mut series = NormalizedSeries {
        symbol: symbol.to_string(),
        open: resolve(Field::Open),
        high: resolve(Field::High),
        low: resolve(Field::Low),
        close: resolve(Field::Close),
        volume: resolve(Field::Volume),
        index,
        rows,
    };

    if let Some(order) = chronological_order(&series.index) {
        debug!("{} 的時間欄位未排序，重新排列", symbol);
        reorder(&mut series, &order);
    }

    series
}

fn find_series<'a>(frame: &'a DataFrame, candidates: &[String]) -> Option<(&'a Series, String)> {
    candidates.iter().find_map(|name| {
        frame
            .column(name)
            .ok()
            .map(|column| (column.as_materialized_series(), name.clone()))
    })
}

fn resolve_field(frame: &DataFrame, field: Field, symbol: &str) -> Option<ResolvedColumn> {
    let (series, source) = find_series(frame, &field_candidates(field, symbol))?;
    let values = coerce_numeric(&source, series);
    Some(ResolvedColumn { source, values })
}

fn resolve_index(frame: &DataFrame, symbol: &str) -> TimeIndex {
    for (name, kind) in TIMESTAMP_CANDIDATES {
        let Ok(column) = frame.column(name) else {
            continue;
        };
        match timestamp_values(name, column.as_materialized_series()) {
            Ok(values) => {
                return TimeIndex::Timestamps {
                    source: name.to_string(),
                    kind,
                    values,
                }
            }
            Err(e) => debug!("{} 的時間欄位無法使用: {}", symbol, e),
        }
    }
    TimeIndex::Positional
}

fn coerce_numeric(name: &str, series: &Series) -> NormalizeResult<Vec<f64>> {
    let coercion = |e: PolarsError| NormalizeError::Coercion {
        column: name.to_string(),
        reason: e.to_string(),
    };

    let cast = series.strict_cast(&DataType::Float64).map_err(coercion)?;
    let values = cast.f64().map_err(coercion)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn timestamp_values(name: &str, series: &Series) -> NormalizeResult<Vec<Option<i64>>> {
    let coercion = |e: PolarsError| NormalizeError::Coercion {
        column: name.to_string(),
        reason: e.to_string(),
    };

    match series.dtype() {
        DataType::Datetime(unit, _) => {
            let divisor = match unit {
                TimeUnit::Nanoseconds => 1_000_000,
                TimeUnit::Microseconds => 1_000,
                TimeUnit::Milliseconds => 1,
            };
            let physical = series.cast(&DataType::Int64).map_err(coercion)?;
            let values = physical.i64().map_err(coercion)?;
            Ok(values
                .into_iter()
                .map(|v| v.map(|ts| ts.div_euclid(divisor)))
                .collect())
        }
        DataType::Date => {
            let physical = series.cast(&DataType::Int32).map_err(coercion)?;
            let values = physical.i32().map_err(coercion)?;
            Ok(values
                .into_iter()
                .map(|v| v.map(|days| i64::from(days) * MS_PER_DAY))
                .collect())
        }
        DataType::String => {
            let values = series.str().map_err(coercion)?;
            values
                .into_iter()
                .map(|v| match v {
                    None => Ok(None),
                    Some(text) => parse_timestamp(text).map(Some).ok_or_else(|| {
                        NormalizeError::TimestampParse {
                            column: name.to_string(),
                            value: text.to_string(),
                        }
                    }),
                })
                .collect()
        }
        // 整數視為毫秒時間戳
        dtype if dtype.is_integer() => {
            let physical = series.cast(&DataType::Int64).map_err(coercion)?;
            let values = physical.i64().map_err(coercion)?;
            Ok(values.into_iter().collect())
        }
        dtype => Err(NormalizeError::UnsupportedTimestamp {
            column: name.to_string(),
            dtype: dtype.to_string(),
        }),
    }
}

/// 解析字串時間戳為毫秒，無時區資訊時視為 UTC
fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.timestamp_millis());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.and_utc().timestamp_millis());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// 時間欄位遞減時返回排序後的列順序；空值排在最後
fn chronological_order(index: &TimeIndex) -> Option<Vec<usize>> {
    let TimeIndex::Timestamps { values, .. } = index else {
        return None;
    };

    let mut last: Option<i64> = None;
    let mut sorted = true;
    for ts in values.iter().flatten() {
        if last.is_some_and(|prev| *ts < prev) {
            sorted = false;
            break;
        }
        last = Some(*ts);
    }
    if sorted {
        return None;
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&row| values[row].unwrap_or(i64::MAX));
    Some(order)
}

fn permute<T: Copy>(values: &[T], order: &[usize]) -> Vec<T> {
    order.iter().map(|&row| values[row]).collect()
}

fn reorder(series: &mut NormalizedSeries, order: &[usize]) {
    if let TimeIndex::Timestamps { values, .. } = &mut series.index {
        *values = permute(values, order);
    }
    for column in [
        &mut series.open,
        &mut series.high,
        &mut series.low,
        &mut series.close,
        &mut series.volume,
    ]
    .into_iter()
    .flatten()
    {
        if let Ok(values) = &mut column.values {
            *values = permute(values, order);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_bare_columns_resolve() {
        let df = df!(
            "Datetime" => &[1_000i64, 2_000, 3_000],
            "Open" => &[1.0, 2.0, 3.0],
            "High" => &[1.5, 2.5, 3.5],
            "Low" => &[0.5, 1.5, 2.5],
            "Close" => &[1.2, 2.2, 3.2],
            "Volume" => &[10i64, 20, 30]
        )
        .unwrap();

        let series = normalize_frame(&df, "^GDAXI");

        assert_eq!(series.len(), 3);
        assert_eq!(series.resolved_fields(), Field::ALL.to_vec());
        assert_eq!(series.closes(), Some(&[1.2, 2.2, 3.2][..]));
        assert_eq!(series.volumes(), Some(&[10.0, 20.0, 30.0][..]));
        assert_matches!(
            &series.index,
            TimeIndex::Timestamps { source, kind: TimestampKind::Intraday, .. } if source == "Datetime"
        );
    }

    #[test]
    fn test_suffixed_columns_resolve() {
        let df = df!(
            "Date" => &["2024-01-02", "2024-01-03"],
            "Close BTC-USD" => &[42_000.0, 43_000.0],
            "Volume BTC-USD" => &[5.0, 6.0]
        )
        .unwrap();

        let series = normalize_frame(&df, "BTC-USD");

        assert_eq!(series.close.as_ref().unwrap().source, "Close BTC-USD");
        assert_eq!(series.resolved_fields(), vec![Field::Close, Field::Volume]);
        assert_eq!(
            series.timestamp(0).unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_bare_name_wins_over_suffixed() {
        let df = df!(
            "Close ETH-USD" => &[1.0, 1.0],
            "Close" => &[2.0, 2.0]
        )
        .unwrap();

        let series = normalize_frame(&df, "ETH-USD");
        assert_eq!(series.close.as_ref().unwrap().source, "Close");
    }

    #[test]
    fn test_suffix_for_other_symbol_is_ignored() {
        let df = df!("Close SOL-USD" => &[1.0, 2.0]).unwrap();
        let series = normalize_frame(&df, "ETH-USD");
        assert!(!series.has_close());
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_positional_index_fallback() {
        let df = df!("Close" => &[1.0, 2.0]).unwrap();
        let series = normalize_frame(&df, "X");
        assert_eq!(series.index, TimeIndex::Positional);
        assert!(series.timestamp(0).is_none());
    }

    #[test]
    fn test_unparseable_datetime_falls_back_to_date() {
        let df = df!(
            "Datetime" => &["not a time", "still not"],
            "Date" => &["2024-03-01", "2024-03-02"],
            "Close" => &[1.0, 2.0]
        )
        .unwrap();

        let series = normalize_frame(&df, "X");
        assert_matches!(
            &series.index,
            TimeIndex::Timestamps { kind: TimestampKind::DateOnly, .. }
        );
    }

    #[test]
    fn test_non_numeric_close_keeps_coercion_error() {
        let df = df!("Close" => &["abc", "def"]).unwrap();
        let series = normalize_frame(&df, "X");

        assert!(series.has_close());
        assert!(series.closes().is_none());
        assert_matches!(
            &series.close.as_ref().unwrap().values,
            Err(NormalizeError::Coercion { column, .. }) if column == "Close"
        );
    }

    #[test]
    fn test_null_values_become_nan() {
        let df = df!("Close" => &[Some(1.0), None]).unwrap();
        let series = normalize_frame(&df, "X");
        let closes = series.closes().unwrap();
        assert_eq!(closes[0], 1.0);
        assert!(closes[1].is_nan());
    }

    #[test]
    fn test_rows_sorted_chronologically() {
        let df = df!(
            "Datetime" => &[3_000i64, 1_000, 2_000],
            "Close" => &[30.0, 10.0, 20.0],
            "Volume" => &[3.0, 1.0, 2.0]
        )
        .unwrap();

        let series = normalize_frame(&df, "X");
        assert_eq!(series.closes(), Some(&[10.0, 20.0, 30.0][..]));
        assert_eq!(series.volumes(), Some(&[1.0, 2.0, 3.0][..]));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("1970-01-01T00:00:01Z"), Some(1_000));
        assert_eq!(parse_timestamp("1970-01-01 01:00:00+01:00"), Some(0));
        assert_eq!(parse_timestamp("1970-01-02"), Some(MS_PER_DAY));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_to_frame_uses_canonical_names() {
        let df = df!(
            "Datetime" => &[1_000i64, 2_000],
            "Close BTC-USD" => &[1.0, 2.0]
        )
        .unwrap();

        let frame = normalize_frame(&df, "BTC-USD").to_frame().unwrap();
        assert!(frame.column(ColumnName::TIME).is_ok());
        assert!(frame.column(ColumnName::CLOSE).is_ok());
        assert!(frame.column(ColumnName::VOLUME).is_err());
    }
}
