mod offset_ops;

pub use offset_ops::{generate_offsets, offset_linestring, MITRE_LIMIT};
