use serde::{Deserialize, Serialize};

use crate::profile::DeviceProfile;

pub const DESKTOP_IMAGE_QUALITY: u8 = 90;
pub const MOBILE_IMAGE_QUALITY: u8 = 75;
pub const SLOW_MOBILE_IMAGE_QUALITY: u8 = 60;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Slow,
    Fast,
    Unknown,
}

/// Loading parameters handed to rendering code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingDecision {
    pub image_quality: u8,
    pub video_quality: VideoQuality,
    pub preload_images: bool,
    pub enable_animations: bool,
    pub reduced_motion: bool,
    pub connection_type: ConnectionType,
}

/// Map a profile onto loading parameters. Desktop never consults the network.
pub fn compute_decision(profile: &DeviceProfile) -> LoadingDecision {
    let (image_quality, video_quality, preload_images, connection_type) = if profile.is_mobile {
        if profile.is_slow_connection() {
            (
                SLOW_MOBILE_IMAGE_QUALITY,
                VideoQuality::Low,
                false,
                ConnectionType::Slow,
            )
        } else {
            (
                MOBILE_IMAGE_QUALITY,
                VideoQuality::Medium,
                false,
                ConnectionType::Fast,
            )
        }
    } else {
        (
            DESKTOP_IMAGE_QUALITY,
            VideoQuality::High,
            true,
            ConnectionType::Fast,
        )
    };

    LoadingDecision {
        image_quality,
        video_quality,
        preload_images,
        enable_animations: !profile.prefers_reduced_motion,
        reduced_motion: profile.prefers_reduced_motion,
        connection_type,
    }
}
