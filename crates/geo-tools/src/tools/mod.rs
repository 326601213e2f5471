//! Tool implementations, one module per remote operation.

pub mod geocode;
pub mod reverse;
pub mod routing;
pub mod search;
pub mod timezone;
