//! Feature selection utilities.
//!
//! Univariate scoring routines (a la scikit-learn) and the best-k elimination
//! selector used by the sweep.
pub mod univariate_selection;

pub use univariate_selection::{select_not_k_best, ScoreCriterion, ScoreFunction, SelectNotKBest};
