// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Sensitivity Study
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! End-to-end study: configuration in, serializable report out.

use crate::basis::Basis;
use crate::design::{DesignMatrixBuilder, Model};
use crate::fit::PolyFit;
use crate::parameter::Parameter;
use crate::stats::Statistics;
use serde::Serialize;
use tracing::info;
use uq_types::config::StudyConfig;
use uq_types::error::UqResult;

/// Everything a presentation layer needs from one study.
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub name: String,
    /// Parameter labels, in the order used by every per-input vector.
    pub labels: Vec<String>,
    pub cardinality: usize,
    pub evaluations: usize,
    pub residual_norm: f64,
    pub condition_number: f64,
    pub statistics: Statistics,
    pub coefficients: Vec<f64>,
}

impl StudyReport {
    pub fn to_json_pretty(&self) -> UqResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn build_parameters(config: &StudyConfig) -> UqResult<Vec<Parameter>> {
    config.parameters.iter().map(Parameter::from_config).collect()
}

/// Build the basis, evaluate `model`, fit and decompose the variance.
pub fn run_study<M: Model + ?Sized>(config: &StudyConfig, model: &M) -> UqResult<StudyReport> {
    config.validate()?;
    let parameters = build_parameters(config)?;
    let basis = Basis::new(parameters, config.basis.rule, &config.basis.orders)?;
    info!(
        study = %config.name,
        dims = basis.dimensions(),
        cardinality = basis.cardinality(),
        rule = ?config.basis.rule,
        "basis constructed"
    );

    let design = DesignMatrixBuilder::new(&basis, config.evaluations)
        .with_subsampling(config.subsampling)
        .build(model)?;
    info!(
        study = %config.name,
        evaluations = design.len(),
        "model evaluated"
    );

    let fit = PolyFit::try_fit(basis, &design)?;
    info!(
        study = %config.name,
        residual = fit.residual_norm,
        condition_number = fit.condition_number,
        "surrogate fitted"
    );

    let statistics = fit.statistics()?;
    info!(
        study = %config.name,
        mean = statistics.mean,
        variance = statistics.variance,
        "statistics computed"
    );

    Ok(StudyReport {
        name: config.name.clone(),
        labels: config.labels(),
        cardinality: fit.basis.cardinality(),
        evaluations: fit.evaluations,
        residual_norm: fit.residual_norm,
        condition_number: fit.condition_number,
        statistics,
        coefficients: fit.coefficients.to_vec(),
    })
}
