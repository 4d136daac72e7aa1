//! Recipe operations. Every function takes the caller as `owner` and only ever
//! sees that owner's rows; a recipe belonging to someone else is reported as
//! not found.

pub mod filter;
pub mod payload;
pub mod store;
