pub mod error;
pub mod proposal;
