pub mod arguments;
pub mod artifacts;
pub mod deployment;
pub mod network;
pub mod record;

use {
    arguments::Arguments,
    artifacts::ArtifactDirectory,
    clap::Parser,
    deployment::Status,
    network::Node,
    std::io,
};

/// Entry point of the `deploy` binary.
pub async fn start(args: impl Iterator<Item = String>) -> Status {
    let args = Arguments::parse_from(args);
    observe::tracing::initialize(&args.logging.observe_config());
    tracing::debug!("running deployer with validated arguments:\n{}", args);
    run(args).await
}

pub async fn run(args: Arguments) -> Status {
    let signer = match args.signer() {
        Ok(signer) => signer,
        Err(err) => return deployment::fail(&err, &mut io::stderr()),
    };
    let client = Node::new(&args.node_url, signer, args.confirmation());
    let artifacts = ArtifactDirectory::new(&args.artifacts);

    deployment::run(
        &artifacts,
        &client,
        &args.params(),
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await
}
