use super::Reprojector;
use crate::model::network::{CqiError, Crs};
use geo::Coord;

/// semi-major axis of the WGS84 ellipsoid, used as the sphere radius of EPSG:3857
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// latitude bound of the square web mercator world
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// transforms between WGS84 longitude/latitude (EPSG:4326, CRS84) and web
/// mercator (EPSG:3857). identical source and target CRSs pass coordinates
/// through unchanged, so any projected input is supported when it already
/// matches the target.
#[derive(Debug, Default, Clone, Copy)]
pub struct SphericalMercator;

impl SphericalMercator {
    pub fn forward(coord: Coord<f64>) -> Coord<f64> {
        let lat = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let x = EARTH_RADIUS_M * coord.x.to_radians();
        let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        Coord { x, y }
    }

    pub fn inverse(coord: Coord<f64>) -> Coord<f64> {
        let lon = (coord.x / EARTH_RADIUS_M).to_degrees();
        let lat = (2.0 * (coord.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
            .to_degrees();
        Coord { x: lon, y: lat }
    }
}

impl Reprojector for SphericalMercator {
    fn supports(&self, from: &Crs, to: &Crs) -> bool {
        from == to
            || (from.is_wgs84() && to.is_wgs84())
            || (from.is_wgs84() && *to == Crs::WEB_MERCATOR)
            || (*from == Crs::WEB_MERCATOR && to.is_wgs84())
    }

    fn reproject(&self, coord: Coord<f64>, from: &Crs, to: &Crs) -> Result<Coord<f64>, CqiError> {
        if from == to || (from.is_wgs84() && to.is_wgs84()) {
            Ok(coord)
        } else if from.is_wgs84() && *to == Crs::WEB_MERCATOR {
            Ok(SphericalMercator::forward(coord))
        } else if *from == Crs::WEB_MERCATOR && to.is_wgs84() {
            Ok(SphericalMercator::inverse(coord))
        } else {
            Err(CqiError::ConfigurationError(format!(
                "no reprojection available from {from} to {to}"
            )))
        }
    }
}
