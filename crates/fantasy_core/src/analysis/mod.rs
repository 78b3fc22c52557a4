//! Trial-matrix reduction: percentiles, correlations, stack totals.

pub mod adjust;
pub mod correlation;
pub mod percentiles;
pub mod stacks;
pub mod summary;

pub use adjust::adjust_percentiles;
pub use correlation::{pearson, CorrelationMatrix, PairCorrelation};
pub use percentiles::{
    mean, percentile_sorted, sorted_finite, OutcomeSummary, PercentileSet, REPORTED_PERCENTILES,
};
pub use stacks::group_stack_totals;
pub use summary::{Summarizer, Summary};
