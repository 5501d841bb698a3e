use std::sync::Arc;

use lazy_static::lazy_static;
use serde::Deserialize;
use serde::Serialize;

use super::ClientFileInfo;

/// Result code carried by every terminal response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCode {
    /// A watched file has a newer release
    ExecuteSuccess,
    /// Nothing changed before the long poll expired
    DataNoChange,
    /// A file entry is missing namespace, group or file name
    BadRequest,
    /// The request names no files at all
    InvalidWatchConfigFileFormat,
    /// The permission gate denied the request
    NotAllowedAccess,
}

/// Classification of a terminal response as seen by long-poll clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalResponse {
    FileChanged,
    NoChange,
    InvalidRequest,
    Unauthorized,
}

/// Terminal response of one watch registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigClientResponse {
    pub code: ResponseCode,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<ClientFileInfo>,
}

lazy_static! {
    static ref NOT_MODIFIED_RESPONSE: Arc<ConfigClientResponse> = Arc::new(ConfigClientResponse {
        code: ResponseCode::DataNoChange,
        info: String::new(),
        config_file: None,
    });
}

impl ConfigClientResponse {
    pub fn file_changed(file: ClientFileInfo) -> Self {
        Self {
            code: ResponseCode::ExecuteSuccess,
            info: String::new(),
            config_file: Some(file),
        }
    }

    /// Shared "no change" sentinel
    pub fn not_modified() -> Arc<Self> {
        Arc::clone(&NOT_MODIFIED_RESPONSE)
    }

    pub fn invalid_request(
        code: ResponseCode,
        info: impl Into<String>,
    ) -> Self {
        Self {
            code,
            info: info.into(),
            config_file: None,
        }
    }

    pub fn unauthorized(info: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::NotAllowedAccess,
            info: info.into(),
            config_file: None,
        }
    }

    pub fn kind(&self) -> TerminalResponse {
        match self.code {
            ResponseCode::ExecuteSuccess => TerminalResponse::FileChanged,
            ResponseCode::DataNoChange => TerminalResponse::NoChange,
            ResponseCode::BadRequest | ResponseCode::InvalidWatchConfigFileFormat => {
                TerminalResponse::InvalidRequest
            }
            ResponseCode::NotAllowedAccess => TerminalResponse::Unauthorized,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.kind() == TerminalResponse::FileChanged
    }

    pub fn is_not_modified(&self) -> bool {
        self.kind() == TerminalResponse::NoChange
    }
}
