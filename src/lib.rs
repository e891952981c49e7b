//! Classical root-finding for real functions of one variable.
//!
//! ┌ [`root_finding::bisection`]  : interval halving on a sign-change bracket
//! ├ [`root_finding::secant`]     : two-point secant iteration
//! ├ [`root_finding::newton`]     : Newton iteration, start chosen with f''
//! └ [`root_finding::difference`] : finite-difference derivatives
//!
//! Every solver returns a [`root_finding::report::RootFindingReport`]; running
//! out of iterations is a termination reason, not an error.

pub mod root_finding;
