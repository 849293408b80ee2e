use {
    crate::{deployment, network::Confirmation},
    alloy::signers::local::PrivateKeySigner,
    anyhow::Result,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
        time::Duration,
    },
    tracing::level_filters::LevelFilter,
    url::Url,
};

#[derive(clap::Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn,deployer=info")]
    pub log_filter: String,

    /// Log events at this level or more severe go to stderr, the others to
    /// stdout. The default keeps stdout free for the deployment progress.
    #[clap(long, env, default_value = "trace")]
    pub log_stderr_threshold: LevelFilter,

    /// Emit log events as JSON objects.
    #[clap(long, env, action = clap::ArgAction::Set, default_value = "false")]
    pub use_json_logs: bool,
}

impl LoggingArguments {
    pub fn observe_config(&self) -> observe::Config {
        observe::Config::new(
            &self.log_filter,
            self.log_stderr_threshold.into_level(),
            self.use_json_logs,
        )
    }
}

#[derive(clap::Parser)]
#[clap(name = "deploy", about = "Deploys a compiled contract and waits for confirmation")]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// Directory containing the compiled contract artifacts (Hardhat
    /// `artifacts/` or Foundry `out/`).
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Name of the contract to deploy. Use a fully qualified name like
    /// `contracts/Project.sol:Project` if the name is not unique.
    #[clap(long, env, default_value = "Project")]
    pub contract: String,

    /// Human readable name announced when the deployment starts.
    #[clap(
        long,
        env,
        default_value = "Tokenized Real-World Asset Ownership Syndicate"
    )]
    pub label: String,

    /// Constructor argument, in declaration order. Repeat the flag for every
    /// argument. Values are parsed according to the constructor's ABI.
    #[clap(long = "constructor-arg")]
    pub constructor_args: Vec<String>,

    /// Hex encoded private key used to sign the deployment transaction. When
    /// neither this nor `--mnemonic` is set, the node's first unlocked account
    /// sends the transaction.
    #[clap(long, env, conflicts_with = "mnemonic")]
    pub private_key: Option<String>,

    /// BIP-39 phrase to derive the signing key from.
    #[clap(long, env)]
    pub mnemonic: Option<String>,

    /// Account index used with `--mnemonic`.
    #[clap(long, env, default_value = "0")]
    pub mnemonic_index: u32,

    /// The chain ID the deployment is expected to run against. The deployment
    /// is aborted before submitting anything if the node reports another one.
    #[clap(long, env)]
    pub chain_id: Option<u64>,

    /// Number of blocks (including the inclusion block) to wait for.
    #[clap(long, env, default_value = "1")]
    pub confirmations: u64,

    /// How long to wait for the deployment transaction to be confirmed.
    #[clap(
        long,
        env,
        default_value = "5m",
        value_parser = humantime::parse_duration,
    )]
    pub confirmation_timeout: Duration,

    /// Write a JSON record of the deployment to this path on success.
    #[clap(long, env)]
    pub deployment_record: Option<PathBuf>,
}

impl Arguments {
    /// Local signer for the deployment transaction, if one is configured.
    pub fn signer(&self) -> Result<Option<PrivateKeySigner>> {
        match (&self.private_key, &self.mnemonic) {
            (Some(key), _) => ethrpc::alloy::signer::from_private_key(key).map(Some),
            (None, Some(phrase)) => {
                ethrpc::alloy::signer::from_mnemonic(phrase, self.mnemonic_index).map(Some)
            }
            (None, None) => Ok(None),
        }
    }

    pub fn confirmation(&self) -> Confirmation {
        Confirmation {
            confirmations: self.confirmations,
            timeout: Some(self.confirmation_timeout),
        }
    }

    pub fn params(&self) -> deployment::Params {
        deployment::Params {
            label: self.label.clone(),
            contract: self.contract.clone(),
            constructor_args: self.constructor_args.clone(),
            expected_chain_id: self.chain_id,
            record: self.deployment_record.clone(),
        }
    }
}

impl Display for LoggingArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            use_json_logs,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        Ok(())
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            node_url,
            artifacts,
            contract,
            label,
            constructor_args,
            private_key,
            mnemonic,
            mnemonic_index,
            chain_id,
            confirmations,
            confirmation_timeout,
            deployment_record,
        } = self;

        write!(f, "{logging}")?;
        writeln!(f, "node_url: {node_url}")?;
        writeln!(f, "artifacts: {}", artifacts.display())?;
        writeln!(f, "contract: {contract}")?;
        writeln!(f, "label: {label}")?;
        writeln!(f, "constructor_args: {constructor_args:?}")?;
        display_secret_option(f, "private_key", private_key)?;
        display_secret_option(f, "mnemonic", mnemonic)?;
        writeln!(f, "mnemonic_index: {mnemonic_index}")?;
        writeln!(f, "chain_id: {chain_id:?}")?;
        writeln!(f, "confirmations: {confirmations}")?;
        writeln!(f, "confirmation_timeout: {confirmation_timeout:?}")?;
        writeln!(f, "deployment_record: {deployment_record:?}")?;
        Ok(())
    }
}

fn display_secret_option<T>(f: &mut Formatter<'_>, name: &str, option: &Option<T>) -> fmt::Result {
    match option {
        Some(_) => writeln!(f, "{name}: SECRET"),
        None => writeln!(f, "{name}: None"),
    }
}
