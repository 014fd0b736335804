//! Simplified structural check of a wing root.
//!
//! The wing is treated as a cantilever beam fixed at the fuselage, loaded by
//! the lift of a 1.2 lift-coefficient manoeuvre at the given altitude and
//! speed.

use shared::{SimulationDetails, SimulationReport, SimulationRequest, SimulationStatus};

const SEA_LEVEL_DENSITY: f64 = 1.225;
const SCALE_HEIGHT_M: f64 = 8500.0;
const AREA_FACTOR: f64 = 0.85;
const LIFT_COEFFICIENT: f64 = 1.2;
const SECTION_FACTOR: f64 = 0.15;
/// Stress used when the section modulus is effectively zero, in Pa
const SATURATED_STRESS_PA: f64 = 999_999_999.0;
const MAX_SAFETY_FACTOR: f64 = 100.0;
const REQUIRED_SAFETY_FACTOR: f64 = 1.5;

pub fn structural(req: &SimulationRequest) -> SimulationReport {
    let rho = SEA_LEVEL_DENSITY * (-req.altitude / SCALE_HEIGHT_M).exp();
    let dynamic_pressure = 0.5 * rho * req.speed * req.speed;

    let area = req.span * req.root_chord * AREA_FACTOR;
    let lift = dynamic_pressure * area * LIFT_COEFFICIENT;
    let moment = (lift / 2.0) * (req.span / 4.0);

    let t = req.root_chord * (req.thickness / 100.0);
    let section_modulus = req.root_chord * t * t * SECTION_FACTOR;

    let stress_pa = if section_modulus <= 1e-6 {
        SATURATED_STRESS_PA
    } else {
        moment / section_modulus
    };
    let stress_mpa = stress_pa / 1_000_000.0;

    let safety_factor = if stress_mpa <= 0.001 {
        MAX_SAFETY_FACTOR
    } else {
        (req.material_yield / stress_mpa).min(MAX_SAFETY_FACTOR)
    };

    let status = if safety_factor >= REQUIRED_SAFETY_FACTOR {
        SimulationStatus::Pass
    } else {
        SimulationStatus::Fail
    };

    tracing::debug!(lift, moment, stress_mpa, safety_factor, "structural check");

    SimulationReport {
        status,
        safety_factor: round_to(safety_factor, 2),
        max_stress: round_to(stress_mpa, 2),
        lift_force_kn: round_to(lift / 1000.0, 1),
        details: SimulationDetails {
            air_density: round_to(rho, 4),
            dynamic_pressure: round_to(dynamic_pressure, 0),
        },
    }
}

fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn request() -> SimulationRequest {
        SimulationRequest {
            material_yield: 270.0,
            material_density: 2700.0,
            altitude: 0.0,
            speed: 50.0,
            span: 10.0,
            root_chord: 1.5,
            thickness: 12.0,
        }
    }

    #[test]
    fn test_sea_level_values() {
        let report = structural(&request());
        assert_relative_eq!(report.details.air_density, 1.225);
        // 0.5 * 1.225 * 2500
        assert_relative_eq!(report.details.dynamic_pressure, 1531.0);
        // q * (10 * 1.5 * 0.85) * 1.2 = 23428 N
        assert_relative_eq!(report.lift_force_kn, 23.4);
    }

    #[test]
    fn test_stress_and_safety_factor() {
        let report = structural(&request());
        // M = 11714 * 2.5 = 29285.2; Z = 1.5 * 0.18^2 * 0.15 = 0.00729
        assert_relative_eq!(report.max_stress, 4.02, epsilon = 0.01);
        assert_relative_eq!(report.safety_factor, 67.2, epsilon = 0.1);
        assert_eq!(report.status, SimulationStatus::Pass);
    }

    #[test]
    fn test_density_drops_with_altitude() {
        let high = structural(&SimulationRequest {
            altitude: 8500.0,
            ..request()
        });
        assert_relative_eq!(high.details.air_density, 0.4507, epsilon = 1e-4);
    }

    #[test]
    fn test_weak_material_fails() {
        let report = structural(&SimulationRequest {
            material_yield: 5.0,
            speed: 120.0,
            ..request()
        });
        assert_eq!(report.status, SimulationStatus::Fail);
        assert!(report.safety_factor < 1.5);
    }

    #[test]
    fn test_zero_thickness_saturates_stress() {
        let report = structural(&SimulationRequest {
            thickness: 0.0,
            ..request()
        });
        assert_relative_eq!(report.max_stress, 1000.0);
        assert_eq!(report.status, SimulationStatus::Fail);
    }

    #[test]
    fn test_no_load_caps_safety_factor() {
        let report = structural(&SimulationRequest {
            speed: 0.0,
            ..request()
        });
        assert_eq!(report.safety_factor, 100.0);
        assert_eq!(report.status, SimulationStatus::Pass);
    }
}
