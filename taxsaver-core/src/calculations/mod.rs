//! Tax computation modules for the TaxSaver planner.
//!
//! All calculation code here is pure and synchronous: a calculator owns no
//! mutable state, performs no I/O, and returns a fresh value object per call.

pub mod common;
pub mod regime;
pub mod scenario;

pub use regime::{RegimeError, TaxRegime};
pub use scenario::{ScenarioCalculator, TaxScenarioError, TaxScenarioInput, TaxScenarioResult};
