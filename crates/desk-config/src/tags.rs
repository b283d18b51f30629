//! Defaults for tags created implicitly by task patches.

use serde::{Deserialize, Serialize};

fn default_color() -> String {
    String::from("#20b2aa")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagsConfig {
    #[serde(default = "default_color")]
    pub default_color: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
        }
    }
}
