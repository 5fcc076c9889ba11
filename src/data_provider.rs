pub mod fetcher;
pub mod provider;
pub mod yahoo;

pub use fetcher::{default_interval, FetchFailure, FetchOutcome, RawSeries, SeriesFetcher};
pub use provider::{ProviderError, UpstreamProvider};
pub use yahoo::{parse_chart_response, YahooChartProvider};
