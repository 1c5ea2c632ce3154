//! Headwind and wind-cost math.

/// Headwind component of the ambient wind in m/s, clamped at zero.
///
/// `walking_bearing` is the direction of travel and `wind_direction` the
/// direction the wind blows *from*, both in degrees. Only facing wind is
/// penalized; tailwind and crosswind contribute nothing.
pub fn headwind_component(walking_bearing: f64, wind_direction: f64, wind_speed: f64) -> f64 {
    let mut angle_diff = (walking_bearing - wind_direction).abs();
    if angle_diff > 180.0 {
        angle_diff = 360.0 - angle_diff;
    }

    // cos(0) = 1 direct headwind, cos(90) = 0 crosswind, cos(180) = -1 tailwind
    let headwind = wind_speed * angle_diff.to_radians().cos();
    headwind.max(0.0)
}

/// Wind cost of a segment: headwind scaled by local exposure.
///
/// A shelter score of 1 cancels the cost entirely; 0 passes the
/// headwind through unchanged.
pub fn wind_cost(headwind: f64, shelter_score: f64) -> f64 {
    headwind * (1.0 - shelter_score)
}
