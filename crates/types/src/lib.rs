pub mod luhn;
pub mod outcome;
pub mod range;
pub mod record;
pub mod verdict;

pub use outcome::*;
pub use range::*;
pub use record::*;
pub use verdict::*;
