mod instrumentation;
pub mod signer;

#[cfg(any(test, feature = "test-util"))]
use alloy::providers::mock;
use {
    crate::AlloyProvider,
    alloy::{
        network::{EthereumWallet, TxSigner},
        primitives::Signature,
        providers::{Provider, ProviderBuilder},
        rpc::client::ClientBuilder,
    },
    instrumentation::{InstrumentationLayer, LabelingLayer},
    url::Url,
};

/// Creates a provider for the node at `url` whose requests are logged under
/// `label`. Transactions sent through it are signed by the node, so only
/// accounts unlocked on the node can be used as sender.
pub fn provider(url: &Url, label: &str) -> AlloyProvider {
    let rpc = ClientBuilder::default()
        .layer(LabelingLayer {
            label: label.into(),
        })
        .layer(InstrumentationLayer)
        .http(url.clone());
    ProviderBuilder::new().connect_client(rpc).erased()
}

/// Like [`provider`] but transactions are signed locally by `signer`.
pub fn provider_with_signer<S>(url: &Url, label: &str, signer: S) -> AlloyProvider
where
    S: TxSigner<Signature> + Send + Sync + 'static,
{
    let rpc = ClientBuilder::default()
        .layer(LabelingLayer {
            label: label.into(),
        })
        .layer(InstrumentationLayer)
        .http(url.clone());
    let wallet = EthereumWallet::new(signer);

    ProviderBuilder::new()
        .wallet(wallet)
        .connect_client(rpc)
        .erased()
}

/// Provider backed by a mocked transport. Responses have to be pushed to the
/// returned [`mock::Asserter`] in the order the requests are issued.
#[cfg(any(test, feature = "test-util"))]
pub fn mocked_provider() -> (AlloyProvider, mock::Asserter) {
    let asserter = mock::Asserter::new();
    let provider = ProviderBuilder::new()
        .connect_mocked_client(asserter.clone())
        .erased();
    (provider, asserter)
}
