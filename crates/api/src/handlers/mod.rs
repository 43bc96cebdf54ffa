pub mod entries;
pub mod pricing;
pub mod sync;
