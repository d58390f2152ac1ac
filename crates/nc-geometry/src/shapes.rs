//! Circular cross-section helpers. All values in SI base units.

use std::f64::consts::PI;

/// A = π·r²
pub fn area_from_radius(radius: f64) -> f64 {
    PI * radius * radius
}

/// r = sqrt(A/π)
pub fn radius_from_area(area: f64) -> f64 {
    (area / PI).sqrt()
}

/// d = sqrt(4·A/π)
pub fn diameter_from_area(area: f64) -> f64 {
    (4.0 * area / PI).sqrt()
}

pub fn radius_from_diameter(diameter: f64) -> f64 {
    0.5 * diameter
}

pub fn diameter_from_radius(radius: f64) -> f64 {
    2.0 * radius
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn radius_survives_area_round_trip(r in 1e-6_f64..1e3) {
            let back = radius_from_diameter(diameter_from_area(area_from_radius(r)));
            prop_assert!((back - r).abs() <= 1e-12 * r.max(1.0));
        }

        #[test]
        fn diameter_is_twice_radius(a in 1e-10_f64..1e2) {
            let d = diameter_from_area(a);
            prop_assert!((diameter_from_radius(radius_from_area(a)) - d).abs() <= 1e-12 * d.max(1.0));
        }
    }
}
