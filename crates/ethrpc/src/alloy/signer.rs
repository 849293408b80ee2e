use {
    alloy::signers::local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English},
    anyhow::{Context, Result},
};

/// Mnemonic of the prefunded accounts of local development nodes
/// (anvil, hardhat).
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Parses a hex encoded (optionally `0x` prefixed) secp256k1 private key.
pub fn from_private_key(key: &str) -> Result<PrivateKeySigner> {
    // Don't attach the key itself to the error.
    key.trim()
        .parse()
        .context("invalid private key")
}

/// Derives the signer at `m/44'/60'/0'/0/{index}` from a BIP-39 phrase.
pub fn from_mnemonic(phrase: &str, index: u32) -> Result<PrivateKeySigner> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase.trim())
        .index(index)
        .context("invalid derivation index")?
        .build()
        .context("invalid mnemonic")
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address};

    #[test]
    fn private_key_and_mnemonic_agree() {
        let from_key = from_private_key(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        let from_phrase = from_mnemonic(DEV_MNEMONIC, 0).unwrap();

        let expected = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(from_key.address(), expected);
        assert_eq!(from_phrase.address(), expected);
    }

    #[test]
    fn mnemonic_index_selects_account() {
        let signer = from_mnemonic(DEV_MNEMONIC, 1).unwrap();
        assert_eq!(
            signer.address(),
            address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")
        );
    }

    #[test]
    fn rejects_malformed_key() {
        assert!(from_private_key("0x1234").is_err());
        assert!(from_private_key("not a key").is_err());
    }
}
