// Purpose - boundary with the host: pitch conversion and device buffers

pub mod converter;
pub mod output;

pub use output::{CallbackStats, OutputAdapter};
