use {
    alloy::primitives::{Address, TxHash},
    anyhow::{Context, Result},
    serde::Serialize,
    std::path::Path,
    tokio::fs,
};

/// Summary of a successful deployment, persisted so that later tooling can
/// find the contract without scraping console output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_name: String,
    pub address: Address,
    pub transaction_hash: TxHash,
    pub chain_id: u64,
    pub block_number: Option<u64>,
}

impl DeploymentRecord {
    /// Writes the record as pretty printed JSON, creating missing parent
    /// directories.
    pub async fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {parent:?}"))?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)
            .await
            .with_context(|| format!("failed to write deployment record to {path:?}"))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address, tempfile::TempDir};

    #[tokio::test]
    async fn writes_json_with_camel_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployments/localhost/Project.json");
        let record = DeploymentRecord {
            contract_name: "Project".to_owned(),
            address: address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            transaction_hash: TxHash::repeat_byte(0x11),
            chain_id: 31337,
            block_number: Some(1),
        };

        record.write(&path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["contractName"], "Project");
        assert_eq!(
            written["address"].as_str().unwrap().to_lowercase(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
        assert_eq!(written["chainId"], 31337);
        assert_eq!(written["blockNumber"], 1);
        assert_eq!(
            written["transactionHash"].as_str().unwrap(),
            format!("0x{}", "11".repeat(32))
        );
    }
}
