//! Uploaded file storage.

use serde::{Deserialize, Serialize};

fn default_upload_dir() -> String {
    String::from(".helpdesk/uploads")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    /// Root directory that `FileMeta::path` values are relative to.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}
