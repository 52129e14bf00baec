#![doc = include_str!("../README.md")]

mod error;
mod populate;
mod random;
mod square;

pub use error::{Result, SquareError};
pub use populate::PopulateParams;
pub use random::random_value;
pub use square::{MagicSquare, SquareConfig};
