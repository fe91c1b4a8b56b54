pub mod bounds;

pub use bounds::BoundsCheckRule;
