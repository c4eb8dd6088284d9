use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output color mode of a sprite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// One palette index per pixel.
    Indexed,
    /// RGBA8 pixels.
    Rgb,
}

impl FromStr for ColorMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "indexed" => Ok(Self::Indexed),
            "rgb" | "rgba" => Ok(Self::Rgb),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indexed => f.write_str("Indexed"),
            Self::Rgb => f.write_str("RGB"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CelConfig {
    /// Number of palette entries per bank. The first entry of every bank is reserved.
    #[serde(default = "default_bank_size")]
    pub bank_size: u16,
    /// How many entries each diagnostic list shows before collapsing into an overflow count.
    #[serde(default = "default_diagnostic_limit")]
    pub diagnostic_limit: usize,
    /// Name prefix of synthesized mask layers. Layers starting with it are never scanned.
    #[serde(default = "default_mask_layer_prefix")]
    pub mask_layer_prefix: String,
    /// Imported layers are named `"{layer_name_prefix} {n}"`.
    #[serde(default = "default_layer_name_prefix")]
    pub layer_name_prefix: String,
    /// Transparent palette index recorded on newly built sprites.
    #[serde(default)]
    pub transparent_index: u8,
}

impl Default for CelConfig {
    fn default() -> Self {
        Self {
            bank_size: default_bank_size(),
            diagnostic_limit: default_diagnostic_limit(),
            mask_layer_prefix: default_mask_layer_prefix(),
            layer_name_prefix: default_layer_name_prefix(),
            transparent_index: 0,
        }
    }
}

impl CelConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - `bank_size` is outside `2..=256` (a bank needs one reserved slot and at least one color)
    /// - `mask_layer_prefix` is empty, which would exclude every layer from scans
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::CelpackError;

        if !(2..=256).contains(&self.bank_size) {
            return Err(CelpackError::InvalidConfig(format!(
                "bank_size ({}) must be within 2..=256",
                self.bank_size
            )));
        }
        if self.mask_layer_prefix.is_empty() {
            return Err(CelpackError::InvalidConfig(
                "mask_layer_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Name of the mask layer that collects overlays for the layer at `stack_index`.
    pub fn mask_layer_name(&self, stack_index: usize, layer_name: &str) -> String {
        format!("{}-L{}-{}", self.mask_layer_prefix, stack_index, layer_name)
    }

    /// Returns true if `layer_name` belongs to a synthesized mask layer.
    pub fn is_mask_layer(&self, layer_name: &str) -> bool {
        layer_name.starts_with(&self.mask_layer_prefix)
    }

    pub fn layer_name(&self, layer: u32) -> String {
        format!("{} {}", self.layer_name_prefix, layer)
    }
}

fn default_bank_size() -> u16 {
    16
}
fn default_diagnostic_limit() -> usize {
    20
}
fn default_mask_layer_prefix() -> String {
    "Palette-Mask".into()
}
fn default_layer_name_prefix() -> String {
    "Layer".into()
}

/// Builder for `CelConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct CelConfigBuilder {
    cfg: CelConfig,
}

impl CelConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: CelConfig::default(),
        }
    }
    pub fn bank_size(mut self, v: u16) -> Self {
        self.cfg.bank_size = v;
        self
    }
    pub fn diagnostic_limit(mut self, v: usize) -> Self {
        self.cfg.diagnostic_limit = v;
        self
    }
    pub fn mask_layer_prefix(mut self, v: impl Into<String>) -> Self {
        self.cfg.mask_layer_prefix = v.into();
        self
    }
    pub fn layer_name_prefix(mut self, v: impl Into<String>) -> Self {
        self.cfg.layer_name_prefix = v.into();
        self
    }
    pub fn transparent_index(mut self, v: u8) -> Self {
        self.cfg.transparent_index = v;
        self
    }
    pub fn build(self) -> CelConfig {
        self.cfg
    }
}

impl CelConfig {
    /// Create a fluent builder for `CelConfig`.
    pub fn builder() -> CelConfigBuilder {
        CelConfigBuilder::new()
    }
}
