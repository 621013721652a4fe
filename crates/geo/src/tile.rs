use std::f64::consts::PI;

use crate::{constants::EARTH_CIRCUMFERENCE_M, coordinate::Coordinate, latlonbounds::LatLonBounds, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoomLevelStrategy {
    PreferHigher,
    #[default]
    PreferLower,
    Closest,
    Manual(i32),
}

/// An XYZ web mercator tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Tile {
    pub const TILE_SIZE: u32 = 256;

    fn xy(coord: Coordinate) -> Point<f64> {
        let x = coord.longitude / 360.0 + 0.5;

        let sinlat = coord.latitude.to_radians().sin();
        let y = 0.5 - 0.25 * ((1.0 + sinlat) / (1.0 - sinlat)).ln() / PI;

        Point::new(x, y)
    }

    pub fn for_coordinate(coord: Coordinate, zoom: i32) -> Tile {
        let p = Tile::xy(coord);
        let z2 = f64::powi(2.0, zoom);

        let clamp_axis = |val: f64| -> i32 {
            if val <= 0.0 {
                0
            } else if val >= 1.0 {
                (z2 - 1.0) as i32
            } else {
                ((val + f64::EPSILON) * z2).floor() as i32
            }
        };

        Tile {
            x: clamp_axis(p.x()),
            y: clamp_axis(p.y()),
            z: zoom,
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn upper_left(&self) -> Coordinate {
        let z2 = f64::powi(2.0, self.z);
        let lon_degrees = self.x as f64 / z2 * 360.0 - 180.0;
        let lat_rad = (PI * (1.0 - 2.0 * self.y as f64 / z2)).sinh().atan();

        Coordinate::latlon(lat_rad.to_degrees(), lon_degrees)
    }

    pub fn lower_right(&self) -> Coordinate {
        Tile {
            x: self.x + 1,
            y: self.y + 1,
            z: self.z,
        }
        .upper_left()
    }

    pub fn bounds(&self) -> LatLonBounds {
        LatLonBounds::hull(self.upper_left(), self.lower_right())
    }

    /// The tile extent in web mercator coordinates
    pub fn web_mercator_bounds(&self) -> Rect<f64> {
        let tile_size = EARTH_CIRCUMFERENCE_M / f64::powi(2.0, self.z);
        let left = (self.x as f64 * tile_size) - (EARTH_CIRCUMFERENCE_M / 2.0);
        let right = left + tile_size;

        let top = (EARTH_CIRCUMFERENCE_M / 2.0) - (self.y as f64 * tile_size);
        let bottom = top - tile_size;

        Rect::from_points(Point::new(left, top), Point::new(right, bottom))
    }

    /// The web mercator pixel size of a tile at the given zoom level
    pub fn pixel_size_at_zoom(zoom: i32) -> f64 {
        EARTH_CIRCUMFERENCE_M / (Tile::TILE_SIZE as f64 * f64::powi(2.0, zoom))
    }

    /// The zoom level whose tile resolution matches the given web mercator pixel size
    pub fn zoom_level_for_pixel_size(pixel_size: f64, strategy: ZoomLevelStrategy) -> i32 {
        if let ZoomLevelStrategy::Manual(zoom) = strategy {
            return zoom;
        }

        let exact = (EARTH_CIRCUMFERENCE_M / (Tile::TILE_SIZE as f64 * pixel_size)).log2();
        let zoom = match strategy {
            ZoomLevelStrategy::PreferHigher => exact.ceil(),
            ZoomLevelStrategy::PreferLower => exact.floor(),
            ZoomLevelStrategy::Closest => exact.round(),
            ZoomLevelStrategy::Manual(_) => unreachable!(),
        };

        (zoom as i32).clamp(0, 30)
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
