pub mod alert;
pub mod delta;
pub mod matcher;
pub mod normalize;
pub mod types;
