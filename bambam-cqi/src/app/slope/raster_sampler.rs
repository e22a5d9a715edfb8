use geo::Point;

/// reads a raster value at a point in the network's metric CRS. returns None
/// outside the raster or on a no-data cell.
pub trait RasterSampler: Send + Sync {
    fn sample(&self, point: &Point<f64>) -> Option<f64>;
}
