//! The deployment procedure: look up the contract factory, submit the
//! creation transaction, wait for confirmation and report the address.
//!
//! A run makes exactly one deployment attempt. Every failure ends the run and
//! is reported once, with its full cause chain.

use {
    crate::{
        artifacts::ArtifactProviding,
        network::{DeployedContract, DeploymentClient},
        record::DeploymentRecord,
    },
    anyhow::{Context, Result, ensure},
    std::{io::Write, path::PathBuf, process::ExitCode},
};

#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Name announced when the deployment starts.
    pub label: String,
    /// Contract name (plain or fully qualified) to look up.
    pub contract: String,
    pub constructor_args: Vec<String>,
    pub expected_chain_id: Option<u64>,
    /// Where to write a [`DeploymentRecord`] on success.
    pub record: Option<PathBuf>,
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

/// Runs the deployment, writing progress to `out` and the failure (if any)
/// to `err`.
pub async fn run(
    artifacts: &dyn ArtifactProviding,
    client: &dyn DeploymentClient,
    params: &Params,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Status {
    match deploy(artifacts, client, params, out).await {
        Ok(deployed) => {
            tracing::info!(
                address = %deployed.address,
                transaction_hash = ?deployed.transaction_hash,
                block_number = ?deployed.block_number,
                gas_used = deployed.gas_used,
                "contract deployed"
            );
            Status::Success
        }
        Err(error) => fail(&error, err),
    }
}

/// Reports `error` as the reason the deployment failed.
pub fn fail(error: &anyhow::Error, err: &mut impl Write) -> Status {
    tracing::error!(error = %format!("{error:#}"), "deployment failed");
    // Nothing left to report to if the error stream is gone.
    let _ = writeln!(err, "Error during deployment: {error:#}");
    Status::Failure
}

async fn deploy(
    artifacts: &dyn ArtifactProviding,
    client: &dyn DeploymentClient,
    params: &Params,
    out: &mut impl Write,
) -> Result<DeployedContract> {
    writeln!(out, "Deploying {}...", params.label)?;

    let factory = artifacts
        .contract_factory(&params.contract)
        .await
        .with_context(|| format!("failed to get contract factory for {:?}", params.contract))?;
    let code = factory.deployment_code(&params.constructor_args)?;

    let chain_id = client
        .chain_id()
        .await
        .context("failed to fetch chain id")?;
    tracing::info!(chain_id, contract = %factory.name, "connected to network");
    if let Some(expected) = params.expected_chain_id {
        ensure!(
            chain_id == expected,
            "node is connected to chain {chain_id} but chain {expected} was expected"
        );
    }

    let deployed = client.deploy(code).await?;
    writeln!(out, "{} deployed to: {}", factory.name, deployed.address)?;

    if let Some(path) = &params.record {
        DeploymentRecord {
            contract_name: factory.name.clone(),
            address: deployed.address,
            transaction_hash: deployed.transaction_hash,
            chain_id,
            block_number: deployed.block_number,
        }
        .write(path)
        .await?;
        tracing::debug!(?path, "deployment record written");
    }

    writeln!(out, "Deployment completed successfully!")?;
    Ok(deployed)
}
