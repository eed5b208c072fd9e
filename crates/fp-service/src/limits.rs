use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

const MIB: u64 = 1024 * 1024;

/// Upload size ceilings, chosen by media type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    /// Ceiling for `image/*` uploads.
    pub max_image_bytes: u64,
    /// Ceiling for every other upload.
    pub max_asset_bytes: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * MIB,
            max_asset_bytes: 25 * MIB,
        }
    }
}

impl SizeLimits {
    /// The ceiling that applies to `media_type`.
    pub fn limit_for(&self, media_type: &str) -> u64 {
        if media_type.starts_with("image/") {
            self.max_image_bytes
        } else {
            self.max_asset_bytes
        }
    }

    /// The largest upload any media type may send.
    pub fn largest(&self) -> u64 {
        self.max_image_bytes.max(self.max_asset_bytes)
    }

    /// Fail with [`ServiceError::SizeLimitExceeded`] when `size` is over the
    /// ceiling for `media_type`.
    pub fn check(&self, media_type: &str, size: u64) -> ServiceResult<()> {
        let limit = self.limit_for(media_type);
        if size > limit {
            return Err(ServiceError::SizeLimitExceeded {
                media_type: media_type.to_string(),
                size,
                limit,
            });
        }
        Ok(())
    }
}
