use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One income range taxed at a single marginal rate.
///
/// `lower` is exclusive, `upper` inclusive; `upper` is `None` for the
/// open-ended top slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}
