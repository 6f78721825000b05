//! Sizing Services

mod bracket_sizer;

pub use bracket_sizer::{BracketQuantities, BracketSizer};
