pub mod decoder;
pub mod encoder;
pub mod slicer;

pub use decoder::decode_recording;
pub use encoder::encode_recording;
pub use slicer::{materialize, materialize_all};
