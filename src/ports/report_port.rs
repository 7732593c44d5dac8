//! Dashboard report output port.

use crate::domain::error::StockdashError;
use crate::domain::metrics::AugmentedSeries;
use crate::domain::query::PriceQuery;

/// Port for writing a rendered dashboard.
pub trait ReportPort {
    fn write(
        &self,
        query: &PriceQuery,
        augmented: &AugmentedSeries<'_>,
        output_path: &str,
    ) -> Result<(), StockdashError>;
}
