// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Reference Models
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Benchmark functions with published sensitivity results.

use std::f64::consts::PI;

/// Gravitational term of the piston force balance, 2 * 9.81.
const PISTON_GRAVITY: f64 = 19.62;

/// Cycle time [s] of a piston inside a cylinder (Kenett & Zacks).
///
/// Inputs, in order:
///   0 M   piston mass [kg]
///   1 S   piston surface area [m^2]
///   2 V0  initial gas volume [m^3]
///   3 k   spring coefficient [N/m]
///   4 P0  atmospheric pressure [N/m^2]
///   5 Ta  ambient temperature [K]
///   6 T0  filling gas temperature [K]
pub fn piston_cycle_time(x: &[f64]) -> f64 {
    let (mass, area, volume, spring, pressure, ambient, gas) =
        (x[0], x[1], x[2], x[3], x[4], x[5], x[6]);

    let a = pressure * area + PISTON_GRAVITY * mass - spring * volume / area;
    let gas_term = pressure * volume / gas;
    let v = area / (2.0 * spring) * ((a * a + 4.0 * spring * gas_term * ambient).sqrt() - a);
    2.0 * PI * (mass / (spring + area * area * gas_term * ambient / (v * v))).sqrt()
}
