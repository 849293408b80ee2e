//! Deploys a minimal contract to a development node (anvil or hardhat) at
//! `NODE_URL`, defaulting to `http://localhost:8545`.
//!
//! Node backed tests are ignored by default, run them with
//! `cargo test -p deployer -- --ignored`.

use {
    deployer::{
        artifacts::ArtifactDirectory,
        deployment::{self, Params, Status},
        network::{Confirmation, Node},
    },
    ethrpc::alloy::signer,
    serde_json::json,
    std::time::Duration,
    tempfile::TempDir,
    url::Url,
};

/// Creation code returning a runtime that always returns 42.
const ANSWER_INIT_CODE: &str = "0x600a600c600039600a6000f3602a60005260206000f3";

fn node_url() -> Url {
    std::env::var("NODE_URL")
        .unwrap_or_else(|_| "http://localhost:8545".to_owned())
        .parse()
        .unwrap()
}

fn artifacts() -> TempDir {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("contracts/Answer.sol/Answer.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let artifact = json!({
        "_format": "hh-sol-artifact-1",
        "contractName": "Answer",
        "sourceName": "contracts/Answer.sol",
        "abi": [],
        "bytecode": ANSWER_INIT_CODE,
        "deployedBytecode": "0x602a60005260206000f3",
        "linkReferences": {},
        "deployedLinkReferences": {}
    });
    std::fs::write(path, serde_json::to_vec(&artifact).unwrap()).unwrap();
    dir
}

fn params() -> Params {
    Params {
        label: "Answer".to_owned(),
        contract: "Answer".to_owned(),
        ..Default::default()
    }
}

fn confirmation() -> Confirmation {
    Confirmation {
        confirmations: 1,
        timeout: Some(Duration::from_secs(30)),
    }
}

#[tokio::test]
#[ignore]
async fn local_node_deploys_with_local_signer() {
    let dir = artifacts();
    let signer = signer::from_mnemonic(signer::DEV_MNEMONIC, 0).unwrap();
    let client = Node::new(&node_url(), Some(signer), confirmation());
    let (mut out, mut err) = (Vec::new(), Vec::new());

    let status = deployment::run(
        &ArtifactDirectory::new(dir.path()),
        &client,
        &params(),
        &mut out,
        &mut err,
    )
    .await;

    let out = String::from_utf8(out).unwrap();
    assert_eq!(status, Status::Success, "{}", String::from_utf8_lossy(&err));
    assert!(out.contains("Answer deployed to: 0x"));
}

#[tokio::test]
#[ignore]
async fn local_node_deploys_with_unlocked_account() {
    let dir = artifacts();
    let client = Node::new(&node_url(), None, confirmation());
    let (mut out, mut err) = (Vec::new(), Vec::new());

    let status = deployment::run(
        &ArtifactDirectory::new(dir.path()),
        &client,
        &params(),
        &mut out,
        &mut err,
    )
    .await;

    assert_eq!(status, Status::Success, "{}", String::from_utf8_lossy(&err));
}

#[tokio::test]
async fn unreachable_node_fails() {
    let dir = artifacts();
    let client = Node::new(
        &"http://127.0.0.1:1".parse().unwrap(),
        None,
        confirmation(),
    );
    let (mut out, mut err) = (Vec::new(), Vec::new());

    let status = deployment::run(
        &ArtifactDirectory::new(dir.path()),
        &client,
        &params(),
        &mut out,
        &mut err,
    )
    .await;

    assert_eq!(status, Status::Failure);
    assert!(String::from_utf8(err).unwrap().starts_with("Error during deployment:"));
}
