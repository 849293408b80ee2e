//! Lookup of compiled contract artifacts.
//!
//! Both the Hardhat layout (`artifacts/<source>/<Contract>.json` with a hex
//! string `bytecode`) and the Foundry layout (`out/<source>/<Contract>.json`
//! with `bytecode.object`) are understood.

use {
    alloy::{
        dyn_abi::{JsonAbiExt, Specifier},
        json_abi::JsonAbi,
        primitives::{Bytes, hex},
    },
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        path::{Path, PathBuf},
    },
    tokio::fs,
};

/// Directory holding Hardhat's compiler inputs/outputs. Its files are not
/// contract artifacts.
const BUILD_INFO: &str = "build-info";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no artifact found for contract {0:?}")]
    NotFound(String),
    #[error(
        "multiple artifacts for contract {name:?}, use one of the fully qualified names: {}",
        .candidates.join(", ")
    )]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
    #[error("{0:?} is an abstract contract or an interface and can't be deployed")]
    NotDeployable(String),
    #[error("{name:?} references libraries that need to be linked first: {}", .libraries.join(", "))]
    UnlinkedLibraries {
        name: String,
        libraries: Vec<String>,
    },
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed artifact {path:?}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid bytecode in artifact {path:?}")]
    InvalidBytecode {
        path: PathBuf,
        #[source]
        source: hex::FromHexError,
    },
    #[error("constructor of {name:?} takes {expected} arguments but {actual} were given")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid constructor argument #{index} for {name:?}")]
    InvalidArgument {
        name: String,
        index: usize,
        #[source]
        source: alloy::dyn_abi::Error,
    },
    #[error("failed to encode constructor arguments for {name:?}")]
    Encoding {
        name: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },
}

/// A compiled contract template new instances can be created from.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    pub name: String,
    pub source_name: Option<String>,
    pub abi: JsonAbi,
    /// Creation (init) code without constructor arguments.
    pub bytecode: Bytes,
}

impl ContractFactory {
    /// Returns the data of the contract creation transaction: the creation
    /// code followed by the ABI encoded constructor arguments.
    ///
    /// Arguments are given in their human readable form (`42`, `0x..`,
    /// `[1,2]`, `(true,"a")`) and parsed according to the constructor's
    /// parameter types.
    pub fn deployment_code(&self, args: &[String]) -> Result<Bytes, Error> {
        let Some(constructor) = &self.abi.constructor else {
            return match args.len() {
                0 => Ok(self.bytecode.clone()),
                actual => Err(Error::ArgumentCount {
                    name: self.name.clone(),
                    expected: 0,
                    actual,
                }),
            };
        };
        if constructor.inputs.len() != args.len() {
            return Err(Error::ArgumentCount {
                name: self.name.clone(),
                expected: constructor.inputs.len(),
                actual: args.len(),
            });
        }

        let values = constructor
            .inputs
            .iter()
            .zip(args)
            .enumerate()
            .map(|(index, (param, arg))| {
                param
                    .resolve()
                    .and_then(|ty| ty.coerce_str(arg))
                    .map_err(|source| Error::InvalidArgument {
                        name: self.name.clone(),
                        index,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let encoded = constructor
            .abi_encode_input(&values)
            .map_err(|source| Error::Encoding {
                name: self.name.clone(),
                source,
            })?;

        Ok([&self.bytecode[..], &encoded[..]].concat().into())
    }
}

/// Yields deployable contract factories by contract name.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArtifactProviding: Send + Sync {
    async fn contract_factory(&self, name: &str) -> Result<ContractFactory, Error>;
}

/// Artifacts stored in a build output directory on disk.
#[derive(Debug, Clone)]
pub struct ArtifactDirectory {
    root: PathBuf,
}

impl ArtifactDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds the artifact file of `name`, which is either a plain contract
    /// name or a fully qualified `<source>:<contract>` name.
    async fn locate(&self, name: &str) -> Result<PathBuf, Error> {
        if let Some((source, contract)) = name.rsplit_once(':') {
            let path = self.root.join(source).join(format!("{contract}.json"));
            return match fs::try_exists(&path).await {
                Ok(true) => Ok(path),
                Ok(false) => Err(Error::NotFound(name.to_owned())),
                Err(source) => Err(Error::Io { path, source }),
            };
        }

        let file_name = format!("{name}.json");
        let mut candidates = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let io_err = |source: std::io::Error| Error::Io {
                path: dir.clone(),
                source,
            };
            let mut entries = fs::read_dir(&dir).await.map_err(io_err)?;
            while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
                let file_type = entry.file_type().await.map_err(io_err)?;
                if file_type.is_dir() {
                    if entry.file_name() != BUILD_INFO {
                        pending.push(entry.path());
                    }
                } else if entry.file_name() == file_name.as_str() {
                    candidates.push(entry.path());
                }
            }
        }

        match candidates.len() {
            0 => Err(Error::NotFound(name.to_owned())),
            1 => Ok(candidates.remove(0)),
            _ => {
                let mut candidates: Vec<_> = candidates
                    .iter()
                    .map(|path| self.qualified_name(path, name))
                    .collect();
                candidates.sort();
                Err(Error::Ambiguous {
                    name: name.to_owned(),
                    candidates,
                })
            }
        }
    }

    fn qualified_name(&self, path: &Path, name: &str) -> String {
        let source = path
            .parent()
            .and_then(|dir| dir.strip_prefix(&self.root).ok())
            .unwrap_or(Path::new(""));
        format!("{}:{name}", source.to_string_lossy())
    }
}

#[async_trait::async_trait]
impl ArtifactProviding for ArtifactDirectory {
    async fn contract_factory(&self, name: &str) -> Result<ContractFactory, Error> {
        let path = self.locate(name).await?;
        tracing::debug!(?path, "loading contract artifact");
        let data = fs::read(&path).await.map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        parse(&path, name, &data)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    source_name: Option<String>,
    #[serde(default)]
    abi: JsonAbi,
    bytecode: RawBytecode,
    #[serde(default)]
    link_references: LinkReferences,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object {
        object: String,
        #[serde(default, rename = "linkReferences")]
        link_references: LinkReferences,
    },
}

/// `source -> library -> offsets` of placeholders in the bytecode.
type LinkReferences = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

fn parse(path: &Path, name: &str, data: &[u8]) -> Result<ContractFactory, Error> {
    let raw: RawArtifact = serde_json::from_slice(data).map_err(|source| Error::Malformed {
        path: path.to_owned(),
        source,
    })?;
    let contract_name = raw.contract_name.unwrap_or_else(|| {
        name.rsplit_once(':')
            .map_or(name, |(_, contract)| contract)
            .to_owned()
    });

    let (code, links) = match raw.bytecode {
        RawBytecode::Hex(code) => (code, raw.link_references),
        RawBytecode::Object {
            object,
            link_references,
        } => (object, link_references),
    };
    if !links.is_empty() {
        let libraries = links
            .into_iter()
            .flat_map(|(source, libraries)| {
                libraries
                    .into_keys()
                    .map(move |library| format!("{source}:{library}"))
            })
            .collect();
        return Err(Error::UnlinkedLibraries {
            name: contract_name,
            libraries,
        });
    }

    let bytecode = hex::decode(code.trim()).map_err(|source| Error::InvalidBytecode {
        path: path.to_owned(),
        source,
    })?;
    if bytecode.is_empty() {
        return Err(Error::NotDeployable(contract_name));
    }

    Ok(ContractFactory {
        name: contract_name,
        source_name: raw.source_name,
        abi: raw.abi,
        bytecode: bytecode.into(),
    })
}
