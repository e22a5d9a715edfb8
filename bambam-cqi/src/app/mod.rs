pub mod cqi;
pub mod exclusion;
pub mod lts;
pub mod slope;
