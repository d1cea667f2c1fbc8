//! Requester parameters and their canonical JSON form.
//!
//! The serialized string is hashed inside the request order, so key order,
//! key presence and the proxy slash handling are fixed.
use super::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Ipfs,
    Dropbox,
}

impl fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageProvider::Ipfs => f.write_str("ipfs"),
            StorageProvider::Dropbox => f.write_str("dropbox"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    storage_provider: StorageProvider,
    storage_proxy: String,
    args: Option<String>,
    input_files: Option<Vec<String>>,
    secrets: Option<BTreeMap<u64, String>>, // 1-based
}

#[derive(Deserialize)]
struct RawParams {
    iexec_result_storage_provider: Option<String>,
    iexec_result_storage_proxy: Option<String>,
    iexec_args: Option<String>,
    iexec_input_files: Option<Vec<String>>,
    iexec_secrets: Option<RawSecrets>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSecrets {
    List(Vec<String>),
    Indexed(BTreeMap<String, String>),
}

// field order here is the serialized key order
#[derive(Serialize)]
struct CanonicalParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    iexec_args: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iexec_input_files: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iexec_secrets: Option<&'a BTreeMap<u64, String>>,
    iexec_result_storage_provider: StorageProvider,
    iexec_result_storage_proxy: &'a str,
}

fn invalid(msg: impl Into<String>) -> ValidationError {
    ValidationError::InvalidRequestParams(msg.into())
}

fn check_url(value: &str, field: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(value).map_err(|e| invalid(format!("{field} `{value}`: {e}")))?;
    if !parsed.has_host() {
        return Err(invalid(format!("{field} `{value}` has no host")));
    }
    Ok(())
}

impl RequestParameters {
    pub fn new(
        storage_provider: StorageProvider,
        storage_proxy: &str,
    ) -> Result<Self, ValidationError> {
        check_url(storage_proxy, "iexec_result_storage_proxy")?;

        Ok(Self {
            storage_provider,
            storage_proxy: storage_proxy.trim_end_matches('/').to_string(),
            args: None,
            input_files: None,
            secrets: None,
        })
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        let args = args.into();
        self.args = (!args.is_empty()).then_some(args);
        self
    }

    pub fn with_input_files(mut self, files: Vec<String>) -> Result<Self, ValidationError> {
        for file in &files {
            check_url(file, "iexec_input_files")?;
        }
        self.input_files = (!files.is_empty()).then_some(files);
        Ok(self)
    }

    /// Secrets in order; the first one gets index 1.
    pub fn with_secrets<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let indexed: BTreeMap<u64, String> = (1..).zip(secrets.into_iter().map(Into::into)).collect();
        self.secrets = (!indexed.is_empty()).then_some(indexed);
        self
    }

    /// Parses a JSON document (object or its string form).
    pub fn parse(json: &str) -> Result<Self, ValidationError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| invalid(format!("not json: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        if let serde_json::Value::String(inner) = value {
            return Self::parse(&inner);
        }
        let raw: RawParams =
            serde_json::from_value(value).map_err(|e| invalid(format!("unexpected shape: {e}")))?;

        let storage_provider = match raw.iexec_result_storage_provider.as_deref() {
            Some("ipfs") => StorageProvider::Ipfs,
            Some("dropbox") => StorageProvider::Dropbox,
            Some(other) => return Err(invalid(format!("unknown storage provider `{other}`"))),
            None => return Err(invalid("missing iexec_result_storage_provider")),
        };
        let proxy = raw
            .iexec_result_storage_proxy
            .ok_or_else(|| invalid("missing iexec_result_storage_proxy"))?;

        let mut params = Self::new(storage_provider, &proxy)?;
        if let Some(args) = raw.iexec_args {
            params = params.with_args(args);
        }
        if let Some(files) = raw.iexec_input_files {
            params = params.with_input_files(files)?;
        }
        match raw.iexec_secrets {
            Some(RawSecrets::List(list)) => params = params.with_secrets(list),
            Some(RawSecrets::Indexed(map)) => {
                let mut secrets = BTreeMap::new();
                for (key, secret) in map {
                    let index = key
                        .parse::<u64>()
                        .ok()
                        .filter(|i| *i > 0)
                        .ok_or_else(|| invalid(format!("secret index `{key}` is not positive")))?;
                    secrets.insert(index, secret);
                }
                params.secrets = (!secrets.is_empty()).then_some(secrets);
            }
            None => {}
        }

        Ok(params)
    }

    /// Exact string hashed into the request order.
    pub fn canonical_serialize(&self) -> Result<String, ValidationError> {
        let canonical = CanonicalParams {
            iexec_args: self.args.as_deref(),
            iexec_input_files: self.input_files.as_deref(),
            iexec_secrets: self.secrets.as_ref(),
            iexec_result_storage_provider: self.storage_provider,
            iexec_result_storage_proxy: &self.storage_proxy,
        };
        serde_json::to_string(&canonical).map_err(|e| invalid(format!("cannot serialize: {e}")))
    }

    pub fn storage_provider(&self) -> StorageProvider {
        self.storage_provider
    }

    pub fn storage_proxy(&self) -> &str {
        &self.storage_proxy
    }

    pub fn args(&self) -> Option<&str> {
        self.args.as_deref()
    }

    pub fn input_files(&self) -> &[String] {
        self.input_files.as_deref().unwrap_or_default()
    }

    pub fn secrets(&self) -> Option<&BTreeMap<u64, String>> {
        self.secrets.as_ref()
    }
}
