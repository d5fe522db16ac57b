pub mod fix;
pub mod sample;

pub use fix::{Fix, SourceEvent};
pub use sample::{LocationSample, NewSample};
