pub mod error;
pub mod normalizer;
pub mod schema;

pub use error::{NormalizeError, NormalizeResult};
pub use normalizer::{normalize, normalize_frame, NormalizedSeries, ResolvedColumn, TimeIndex};
pub use schema::{field_candidates, ColumnPattern, TimestampKind};
