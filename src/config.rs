use serde::{Deserialize, Serialize};

use crate::converter::ConverterSettings;
use crate::masker::TransparencySettings;
use crate::preview::PreviewSettings;

/// All tunables of a session, passed in explicitly by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub converter: ConverterSettings,
    pub transparency: TransparencySettings,
    pub preview: PreviewSettings,
}
