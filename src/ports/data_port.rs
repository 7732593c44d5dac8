//! Upstream market-data port.

use crate::domain::error::StockdashError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::query::PriceQuery;

pub trait DataPort {
    /// Daily bars for `query.symbol` within `[query.start, query.end]`.
    ///
    /// An empty vector is a valid answer (no trading days in range).
    /// Unknown symbols surface as [`StockdashError::InvalidSymbol`].
    fn fetch_daily(&self, query: &PriceQuery) -> Result<Vec<OhlcvBar>, StockdashError>;

    /// Short provider name used in log lines.
    fn name(&self) -> &str;

    /// Attribution shown in the page footer.
    fn source(&self) -> &str {
        self.name()
    }
}

impl<T: DataPort + ?Sized> DataPort for Box<T> {
    fn fetch_daily(&self, query: &PriceQuery) -> Result<Vec<OhlcvBar>, StockdashError> {
        (**self).fetch_daily(query)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn source(&self) -> &str {
        (**self).source()
    }
}
