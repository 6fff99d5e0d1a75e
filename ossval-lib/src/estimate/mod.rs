//! Replacement-cost model.
//!
//! Effort in person-months follows a COCOMO-style power law over thousands of code
//! lines, scaled by independent multipliers for the project's category, structural
//! complexity, maturity, and lexical difficulty. Effort is priced at a region's fully
//! loaded monthly rate, adjusted by the category's salary premium.
//!
//! All tables live in a [`CostModel`] value handed to the [`CostEstimator`], so they can
//! be overridden without touching any global state.

mod cocomo;
mod multipliers;
mod project_type;
mod region;

pub use cocomo::{CostEstimate, CostEstimator, CostModel, Methodology, confidence};
pub use multipliers::{LEXICAL_RANGE, MATURITY_RANGE, ProjectTypeFactors, lexical_multiplier, maturity_multiplier};
pub use project_type::{Detection, ProjectType};
pub use region::{Region, Salary};
