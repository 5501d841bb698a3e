use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::FILE_KEY_SEPARATOR;

/// (namespace, group, file_name) triple identifying a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileIdentity {
    pub namespace: String,
    pub group: String,
    pub file_name: String,
}

impl FileIdentity {
    pub fn new(
        namespace: impl Into<String>,
        group: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            group: group.into(),
            file_name: file_name.into(),
        }
    }

    /// Canonical index key, identical for every producer of the same triple
    pub fn key(&self) -> String {
        file_key(&self.namespace, &self.group, &self.file_name)
    }

    /// True when any component is empty
    pub fn is_incomplete(&self) -> bool {
        self.namespace.is_empty() || self.group.is_empty() || self.file_name.is_empty()
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.key())
    }
}

pub(crate) fn file_key(
    namespace: &str,
    group: &str,
    file_name: &str,
) -> String {
    let mut key = String::with_capacity(namespace.len() + group.len() + file_name.len() + 2);
    key.push_str(namespace);
    key.push(FILE_KEY_SEPARATOR);
    key.push_str(group);
    key.push(FILE_KEY_SEPARATOR);
    key.push_str(file_name);
    key
}

/// A watched file as declared by a client
///
/// `version` is the release version the client currently holds; the client is
/// only notified about strictly newer releases. The same shape is used as the
/// payload of a "file changed" reply, then carrying the new version, checksum
/// and display name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientFileInfo {
    pub namespace: String,
    pub group: String,
    pub file_name: String,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ClientFileInfo {
    pub fn new(
        namespace: impl Into<String>,
        group: impl Into<String>,
        file_name: impl Into<String>,
        version: u64,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            group: group.into(),
            file_name: file_name.into(),
            version,
            md5: None,
            name: None,
        }
    }

    pub fn identity(&self) -> FileIdentity {
        FileIdentity::new(&self.namespace, &self.group, &self.file_name)
    }

    pub fn key(&self) -> String {
        file_key(&self.namespace, &self.group, &self.file_name)
    }

    pub fn is_incomplete(&self) -> bool {
        self.namespace.is_empty() || self.group.is_empty() || self.file_name.is_empty()
    }
}

/// A published configuration file release
///
/// Produced by the publishing side and served by the release cache. The watch
/// center only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigFileRelease {
    pub namespace: String,
    pub group: String,
    pub file_name: String,
    /// Release display name
    pub name: String,
    pub version: u64,
    pub md5: String,
    pub active: bool,
}

impl ConfigFileRelease {
    pub fn new(
        namespace: impl Into<String>,
        group: impl Into<String>,
        file_name: impl Into<String>,
        version: u64,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            group: group.into(),
            file_name: file_name.into(),
            name: String::new(),
            version,
            md5: String::new(),
            active: true,
        }
    }

    pub fn with_md5(
        mut self,
        md5: impl Into<String>,
    ) -> Self {
        self.md5 = md5.into();
        self
    }

    pub fn with_name(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.name = name.into();
        self
    }

    pub fn identity(&self) -> FileIdentity {
        FileIdentity::new(&self.namespace, &self.group, &self.file_name)
    }

    /// Key of the file this release belongs to
    pub fn active_key(&self) -> String {
        file_key(&self.namespace, &self.group, &self.file_name)
    }

    /// Descriptor sent to clients to announce this release
    pub fn to_client_file_info(&self) -> ClientFileInfo {
        ClientFileInfo {
            namespace: self.namespace.clone(),
            group: self.group.clone(),
            file_name: self.file_name.clone(),
            version: self.version,
            md5: Some(self.md5.clone()),
            name: Some(self.name.clone()),
        }
    }
}

/// "File republished" event delivered by the event bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishEvent {
    pub release: ConfigFileRelease,
}

impl PublishEvent {
    pub fn new(release: ConfigFileRelease) -> Self {
        Self { release }
    }
}

impl From<ConfigFileRelease> for PublishEvent {
    fn from(release: ConfigFileRelease) -> Self {
        Self { release }
    }
}
