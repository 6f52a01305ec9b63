//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use engine_core::domains::image_engine::models::{
    BrandProfile, Category, ConsumerApp, ImageEngineRequest, Platform, SafeMode,
};

/// A minimal valid request. Intent text is deliberately free of any safety
/// rule terms.
pub fn request(
    id: &str,
    platform: Platform,
    category: Category,
    intent: &str,
) -> ImageEngineRequest {
    ImageEngineRequest {
        request_id: id.to_string(),
        consumer_app: ConsumerApp::SocialAutoPoster,
        platform,
        category,
        intent_summary: intent.to_string(),
        brand: None,
        locale: None,
        allow_text_overlay: None,
        safe_mode: None,
    }
}

pub fn request_with_brand(
    id: &str,
    platform: Platform,
    category: Category,
    intent: &str,
    brand_name: &str,
    industry: &str,
    style: &str,
) -> ImageEngineRequest {
    let mut req = request(id, platform, category, intent);
    req.brand = Some(BrandProfile {
        name: Some(brand_name.to_string()),
        industry: Some(industry.to_string()),
        style: Some(style.to_string()),
    });
    req
}

pub fn strict(mut req: ImageEngineRequest) -> ImageEngineRequest {
    req.safe_mode = Some(SafeMode::Strict);
    req
}
