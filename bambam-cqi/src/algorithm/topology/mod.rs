mod endpoint_degree;
mod topology_ops;

pub use endpoint_degree::EndpointDegreeTable;
pub use topology_ops::{clean, filter_min_length, prune_once};
