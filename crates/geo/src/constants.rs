pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
pub const EARTH_CIRCUMFERENCE_M: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_M;
pub const LATITUDE_BOUND: f64 = 85.051_128_779_806_59;
