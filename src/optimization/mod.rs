pub mod settlement;
pub mod split;
pub mod summary;
