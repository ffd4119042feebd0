//! Rewrite laws checked over generated screens.

mod properties;
mod round_trip;
