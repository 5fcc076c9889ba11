pub mod asset_types;
pub mod instrument;
pub mod interval;
pub mod period;
pub mod types;

pub use asset_types::Category;
pub use instrument::{Instrument, InstrumentCatalog, InstrumentGroup};
pub use interval::Interval;
pub use period::{Lookback, Period, PeriodUnit};
pub use types::{ColumnName, DomainError, Field};
