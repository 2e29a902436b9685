mod fare;
mod helpers;

pub mod op;
mod secret;

pub use fare::{Fare, FareConversionError};
pub use helpers::parse_boolean_flag;
pub use secret::Secret;
