// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — UQ PCE
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Polynomial chaos surrogates and variance-based sensitivity analysis.
//!
//! Parameters -> Basis -> DesignMatrixBuilder -> PolyFit -> Statistics.

pub mod basis;
pub mod design;
pub mod fit;
pub mod models;
pub mod parameter;
pub mod stats;
pub mod study;

pub use basis::{Basis, IndexSet};
pub use design::{Design, DesignMatrixBuilder, Model, TensorGrid};
pub use fit::PolyFit;
pub use parameter::{Parameter, ParameterKey};
pub use stats::{HigherMoments, SobolAnalyzer, SobolIndex, Statistics};
pub use study::{run_study, StudyReport};
