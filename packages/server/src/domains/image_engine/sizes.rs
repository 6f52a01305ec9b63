//! Fixed platform/aspect → pixel size lookup.

use super::models::{Aspect, Platform};

/// Resolve the pixel canvas for a platform and aspect.
///
/// Total over all combinations; platforms without a native size for an
/// aspect use the common social defaults.
pub fn resolve_size(platform: Platform, aspect: Aspect) -> (u32, u32) {
    match (platform, aspect) {
        (Platform::Instagram, Aspect::Square) => (1080, 1080),
        (Platform::Instagram, Aspect::Portrait) => (1080, 1350),
        (Platform::Instagram, Aspect::Landscape) => (1080, 566),
        (Platform::Instagram, Aspect::Story) => (1080, 1920),

        (Platform::Facebook, Aspect::Landscape) => (1200, 630),
        (Platform::Facebook, Aspect::Square) => (1080, 1080),
        (Platform::Facebook, Aspect::Portrait) => (1080, 1350),
        (Platform::Facebook, Aspect::Story) => (1080, 1920),

        (Platform::X, Aspect::Landscape) => (1600, 900),
        (Platform::X, Aspect::Square) => (1080, 1080),
        (Platform::X, Aspect::Portrait) => (1080, 1350),
        (Platform::X, Aspect::Story) => (1080, 1920),

        (Platform::GoogleBusinessProfile, Aspect::Landscape) => (1200, 900),
        (Platform::GoogleBusinessProfile, Aspect::Square) => (1080, 1080),
        (Platform::GoogleBusinessProfile, Aspect::Portrait) => (1080, 1350),
        (Platform::GoogleBusinessProfile, Aspect::Story) => (1080, 1920),

        (Platform::Blog, Aspect::Landscape) => (1200, 630),
        (Platform::Blog, Aspect::Square) => (1024, 1024),
        (Platform::Blog, Aspect::Portrait) => (1024, 1280),
        (Platform::Blog, Aspect::Story) => (1080, 1920),
    }
}
