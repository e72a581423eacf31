// Advanced box-score metrics (possessions, points produced, ratings, win
// shares) computed from one player's season record.

pub mod engine;
pub mod fields;
mod formulas;
pub mod metric;
pub mod record;

pub use engine::{Calculator, DerivedMetrics, FailureCause, MetricFailure};
pub use metric::{Input, Metric};
pub use record::{LeagueContext, RecordBuilder, RecordError, StatLine, StatRecord};
