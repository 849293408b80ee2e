use {
    alloy::{
        network::TransactionBuilder,
        primitives::{Address, Bytes, TxHash},
        providers::Provider,
        rpc::types::{TransactionReceipt, TransactionRequest},
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result, ensure},
    ethrpc::AlloyProvider,
    std::time::Duration,
    url::Url,
};

/// Label attached to every RPC request issued by the deployer.
const LABEL: &str = "deployer";

/// A contract created by a confirmed deployment transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub address: Address,
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Abstracts the node the deployment transaction is sent to.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DeploymentClient: Send + Sync {
    /// Chain ID reported by the node.
    async fn chain_id(&self) -> Result<u64>;

    /// Submits a contract creation transaction with `code` as its data and
    /// waits until it is confirmed.
    async fn deploy(&self, code: Bytes) -> Result<DeployedContract>;
}

/// When a submitted transaction counts as confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// Number of blocks, including the one the transaction is in.
    pub confirmations: u64,
    /// Give up waiting after this long. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for Confirmation {
    fn default() -> Self {
        Self {
            confirmations: 1,
            timeout: Some(Duration::from_secs(5 * 60)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Sender {
    /// Transactions are signed locally by this account.
    Signer(Address),
    /// Transactions are signed by the node with its first unlocked account.
    Unlocked,
}

/// Ethereum JSON-RPC node.
pub struct Node {
    provider: AlloyProvider,
    sender: Sender,
    confirmation: Confirmation,
}

impl Node {
    pub fn new(url: &Url, signer: Option<PrivateKeySigner>, confirmation: Confirmation) -> Self {
        match signer {
            Some(signer) => {
                let address = signer.address();
                Self {
                    provider: ethrpc::alloy::provider_with_signer(url, LABEL, signer),
                    sender: Sender::Signer(address),
                    confirmation,
                }
            }
            None => Self {
                provider: ethrpc::alloy::provider(url, LABEL),
                sender: Sender::Unlocked,
                confirmation,
            },
        }
    }

    async fn sender(&self) -> Result<Address> {
        match self.sender {
            Sender::Signer(address) => Ok(address),
            Sender::Unlocked => self
                .provider
                .get_accounts()
                .await
                .context("failed to list node accounts")?
                .first()
                .copied()
                .context("node has no unlocked accounts, configure a private key or mnemonic"),
        }
    }

    /// Checks that the confirmed transaction of `receipt` created a contract.
    async fn deployed_contract(&self, receipt: &TransactionReceipt) -> Result<DeployedContract> {
        let transaction_hash = receipt.transaction_hash;
        ensure!(
            receipt.status(),
            "deployment transaction {transaction_hash} reverted"
        );
        let address = receipt.contract_address.with_context(|| {
            format!("receipt of {transaction_hash} does not contain a contract address")
        })?;

        let code = self
            .provider
            .get_code_at(address)
            .await
            .context("failed to fetch deployed code")?;
        ensure!(!code.is_empty(), "no code at deployed address {address}");

        Ok(DeployedContract {
            address,
            transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}

#[async_trait::async_trait]
impl DeploymentClient for Node {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn deploy(&self, code: Bytes) -> Result<DeployedContract> {
        let sender = self.sender().await?;
        tracing::debug!(?sender, code_size = code.len(), "submitting deployment");
        let tx = TransactionRequest::default()
            .with_from(sender)
            .with_deploy_code(code);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("failed to submit deployment transaction")?;
        let transaction_hash = *pending.tx_hash();
        tracing::info!(?transaction_hash, "deployment transaction submitted");

        let receipt = pending
            .with_required_confirmations(self.confirmation.confirmations)
            .with_timeout(self.confirmation.timeout)
            .get_receipt()
            .await
            .with_context(|| format!("deployment transaction {transaction_hash} was not confirmed"))?;
        self.deployed_contract(&receipt).await
    }
}
