// src/job.rs

//! The export job: load → flatten → write, strictly in that order.

use std::path::PathBuf;

use tracing::{info, info_span};

use crate::config::Config;
use crate::data_loader::{load_vip_ids, loader_for};
use crate::error::{InputKind, JobError};
use crate::flatten::{flatten, Flattened};
use crate::validate::{validate, ValidationReport};
use crate::writer::write_rows;

#[derive(Debug, Clone)]
pub struct JobSummary {
    pub customers: usize,
    pub vip_ids: usize,
    pub rows: usize,
    pub vip_rows: usize,
    pub output: PathBuf,
    pub report: Option<ValidationReport>,
}

/// Output of the load and flatten stages.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub flattened: Flattened,
    pub customers: usize,
    pub vip_ids: usize,
}

/// Runs the load and flatten stages without touching the output.
pub fn prepare(config: &Config) -> Result<Prepared, JobError> {
    let orders_path = &config.input.orders_path;
    let vip_path = &config.input.vip_path;

    let customers = {
        let _span = info_span!("load").entered();
        let loader = loader_for(orders_path, config.input.format.as_deref())
            .map_err(|e| JobError::load(InputKind::Orders, orders_path, e))?;
        let customers = loader
            .load(orders_path)
            .map_err(|e| JobError::load(InputKind::Orders, orders_path, e))?;
        info!(
            path = %orders_path.display(),
            customers = customers.len(),
            "Loaded order collection"
        );
        customers
    };

    let vip_ids =
        load_vip_ids(vip_path).map_err(|e| JobError::load(InputKind::VipList, vip_path, e))?;
    info!(path = %vip_path.display(), vip_ids = vip_ids.len(), "Loaded VIP list");

    let flattened = {
        let _span = info_span!("flatten").entered();
        flatten(&customers, &vip_ids, config.processing.vip_policy)
    };

    Ok(Prepared {
        flattened,
        customers: customers.len(),
        vip_ids: vip_ids.len(),
    })
}

/// Runs the whole job. On a load failure nothing is written.
pub fn run(config: &Config) -> Result<JobSummary, JobError> {
    let Prepared {
        flattened,
        customers,
        vip_ids,
    } = prepare(config)?;

    let report = config.processing.validate.then(|| {
        let report = validate(&flattened.rows);
        report.log();
        report
    });

    let output = config.output.path.clone();
    {
        let _span = info_span!("write").entered();
        write_rows(&output, &flattened.rows).map_err(|e| JobError::write(&output, e))?;
    }

    Ok(JobSummary {
        customers,
        vip_ids,
        rows: flattened.rows.len(),
        vip_rows: flattened.vip_rows(),
        output,
        report,
    })
}
