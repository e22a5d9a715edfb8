mod lts_inputs;
mod lts_ops;

pub use lts_inputs::LtsInputs;
pub use lts_ops::{annotate_lts, estimate_lts};
