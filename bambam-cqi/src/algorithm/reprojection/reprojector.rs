use crate::model::network::{CqiError, Crs};
use geo::Coord;

/// coordinate transformation capability. implementations wrap whatever
/// reprojection machinery is available; the pipeline only asks for point-wise
/// transforms between two tagged CRSs.
pub trait Reprojector: Send + Sync {
    /// true if this reprojector can transform coordinates from `from` to `to`.
    fn supports(&self, from: &Crs, to: &Crs) -> bool;

    /// transforms one coordinate from `from` to `to`.
    fn reproject(&self, coord: Coord<f64>, from: &Crs, to: &Crs) -> Result<Coord<f64>, CqiError>;
}
