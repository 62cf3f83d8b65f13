use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::config_err;
use crate::error::Result;

/// Process-independent routing technology description.
///
/// All lengths are in layout resolution units.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct Tech {
    /// The transistor connection layer. Horizontal routing sits one layer above,
    /// vertical routing two layers above.
    #[builder(default = "1")]
    pub conn_layer: u32,
    /// Width of one layout column.
    #[builder(default = "100")]
    pub col_pitch: i64,
    /// Pitch of horizontal routing tracks.
    #[builder(default = "80")]
    pub hm_pitch: i64,
    /// Pitch of vertical routing tracks.
    #[builder(default = "100")]
    pub vm_pitch: i64,
}

impl Default for Tech {
    fn default() -> Self {
        Self {
            conn_layer: 1,
            col_pitch: 100,
            hm_pitch: 80,
            vm_pitch: 100,
        }
    }
}

impl Tech {
    #[inline]
    pub fn builder() -> TechBuilder {
        TechBuilder::default()
    }

    #[inline]
    pub fn hm_layer(&self) -> u32 {
        self.conn_layer + 1
    }

    #[inline]
    pub fn vm_layer(&self) -> u32 {
        self.conn_layer + 2
    }

    pub fn validate(&self) -> Result<()> {
        for (name, pitch) in [
            ("col_pitch", self.col_pitch),
            ("hm_pitch", self.hm_pitch),
            ("vm_pitch", self.vm_pitch),
        ] {
            if pitch <= 0 || pitch % 2 != 0 {
                return Err(config_err!(
                    "{name} = {pitch} must be a positive even number"
                ));
            }
        }
        // column boundaries must land on vertical half tracks
        if (2 * self.col_pitch) % self.vm_pitch != 0 {
            return Err(config_err!(
                "col_pitch = {} is incompatible with vm_pitch = {}",
                self.col_pitch,
                self.vm_pitch
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tech_is_valid() {
        Tech::default().validate().unwrap();
        assert_eq!(Tech::builder().build().unwrap(), Tech::default());
    }

    #[test]
    fn test_rejects_misaligned_columns() {
        let tech = Tech::builder().col_pitch(90).vm_pitch(40).build().unwrap();
        assert!(tech.validate().is_err());
        let tech = Tech::builder().hm_pitch(75).build().unwrap();
        assert!(tech.validate().is_err());
    }
}
