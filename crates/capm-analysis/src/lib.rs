//! CAPM estimation: daily returns, single-factor OLS against a benchmark,
//! and the expected-return estimate derived from the fitted beta.

pub mod capm;
pub mod engine;
pub mod regression;
pub mod returns;
pub mod summary;

pub use capm::expected_return;
pub use engine::{CapmEngine, EngineConfig};
pub use regression::linregress;
pub use returns::{compounded_return, drop_undefined, pct_change, RawReturns};
pub use summary::ols_summary;
