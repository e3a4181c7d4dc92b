pub mod bump;
pub mod check;
pub mod plan;
pub mod sync;
