use crate::{constants, Coordinate, Point};

/// An EPSG coordinate reference system identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Epsg(u32);

impl Epsg {
    pub const fn new(code: u32) -> Self {
        Epsg(code)
    }

    pub const fn code(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Epsg {
    fn from(code: u32) -> Self {
        Epsg(code)
    }
}

impl std::fmt::Display for Epsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

pub mod epsg {
    use super::Epsg;

    pub const WGS84: Epsg = Epsg::new(4326);
    pub const WGS84_WEB_MERCATOR: Epsg = Epsg::new(3857);
}

/// Closed form WGS84 -> web mercator conversion
pub fn lat_lon_to_web_mercator(coord: Coordinate) -> Point<f64> {
    let lat = coord.latitude.clamp(-constants::LATITUDE_BOUND, constants::LATITUDE_BOUND);
    let x = coord.longitude.to_radians() * constants::EARTH_RADIUS_M;
    let y = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln() * constants::EARTH_RADIUS_M;
    Point::new(x, y)
}

/// Closed form web mercator -> WGS84 conversion
pub fn web_mercator_to_lat_lon(point: Point<f64>) -> Coordinate {
    let longitude = (point.x() / constants::EARTH_RADIUS_M).to_degrees();
    let latitude = (2.0 * (point.y() / constants::EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    Coordinate::latlon(latitude, longitude)
}
