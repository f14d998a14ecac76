pub mod extractor;
pub mod font;
pub mod grid;
pub mod hierarchy;
pub mod overlay;
pub mod types;
