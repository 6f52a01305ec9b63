//! Decision engine: maps a validated request onto a generation plan.
//!
//! Total and pure — always returns a `Decision`, never fails. When the
//! request cannot support generation the mode is `fallback` and the
//! orchestrator skips every downstream stage.

use std::collections::BTreeMap;

use super::models::{
    Aspect, Category, Decision, DecisionMode, DecisionSafety, ImageEngineRequest, Platform,
    PromptPlan, ProviderPlan, Verdict,
};
use super::safety::{self, SafetyInput};

pub const PROVIDER_OPENAI: &str = "openai";
pub const PROVIDER_NANO_BANANA: &str = "nano_banana";

/// Platform/category combinations generation does not support.
fn unsupported_reason(platform: Platform, category: Category) -> Option<&'static str> {
    match (platform, category) {
        // Review-style imagery conflicts with GBP photo policies
        (Platform::GoogleBusinessProfile, Category::SocialProof) => {
            Some("Review-style imagery isn't generated for Google Business Profile.")
        }
        // Blog posts use curated stock for social proof content
        (Platform::Blog, Category::SocialProof) => {
            Some("Blog social-proof posts use curated stock imagery.")
        }
        _ => None,
    }
}

fn default_aspect(platform: Platform, category: Category) -> Aspect {
    match platform {
        Platform::Instagram => match category {
            Category::Promotion => Aspect::Portrait,
            Category::LocalAbstract => Aspect::Story,
            _ => Aspect::Square,
        },
        Platform::Facebook => Aspect::Landscape,
        Platform::X => Aspect::Landscape,
        Platform::GoogleBusinessProfile => Aspect::Landscape,
        Platform::Blog => Aspect::Landscape,
    }
}

/// Abstract/ambient categories render better on the secondary provider;
/// everything else goes to the primary.
fn default_provider(category: Category) -> &'static str {
    match category {
        Category::LocalAbstract | Category::Evergreen => PROVIDER_NANO_BANANA,
        _ => PROVIDER_OPENAI,
    }
}

fn negative_rules(request: &ImageEngineRequest) -> Vec<String> {
    let mut rules = vec!["no_logos".to_string(), "no_faces".to_string()];
    if request.allow_text_overlay != Some(true) {
        rules.insert(0, "no_text".to_string());
    }
    if request.strict_mode() {
        rules.push("strict_content".to_string());
    }
    rules
}

fn variables(request: &ImageEngineRequest) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();
    variables.insert(
        "intent".to_string(),
        request.intent_summary.trim().to_string(),
    );
    if let Some(brand) = &request.brand {
        if let Some(industry) = &brand.industry {
            variables.insert("industry".to_string(), industry.clone());
        }
        if let Some(style) = &brand.style {
            variables.insert("style".to_string(), style.clone());
        }
    }
    if let Some(language) = request.locale.as_ref().and_then(|l| l.language.clone()) {
        variables.insert("language".to_string(), language);
    }
    variables
}

/// Derive the generation plan for a request.
pub fn decide(request: &ImageEngineRequest) -> Decision {
    let aspect = default_aspect(request.platform, request.category);
    let rules = negative_rules(request);

    let mut mode = DecisionMode::Generate;
    let mut reasons: Vec<String> = Vec::new();

    if let Some(reason) = unsupported_reason(request.platform, request.category) {
        mode = DecisionMode::Fallback;
        reasons.push(reason.to_string());
    }

    // Soft safety pre-check: the same rule set the generate stage re-runs.
    let pre_check = safety::evaluate(&SafetyInput {
        platform: request.platform,
        category: request.category,
        aspect,
        mode: DecisionMode::Generate,
        negative_rules: &rules,
        business_name: request
            .brand
            .as_ref()
            .and_then(|b| b.name.as_deref()),
        user_text: Some(&request.intent_summary),
        strict: request.strict_mode(),
    });
    if pre_check.verdict != Verdict::Allow {
        mode = DecisionMode::Fallback;
        if let Some(reason) = pre_check.reason_safe {
            reasons.push(reason);
        }
    }

    Decision {
        mode,
        platform: request.platform,
        category: request.category,
        aspect,
        prompt_plan: PromptPlan {
            negative_rules: rules,
            variables: variables(request),
        },
        provider_plan: ProviderPlan {
            provider_id: default_provider(request.category).to_string(),
        },
        safety: DecisionSafety { reasons },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::image_engine::models::{BrandProfile, ConsumerApp};

    fn request(platform: Platform, category: Category, intent: &str) -> ImageEngineRequest {
        ImageEngineRequest {
            request_id: "req-1".to_string(),
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

    #[test]
    fn supported_request_gets_generate_mode() {
        let decision = decide(&request(
            Platform::Instagram,
            Category::Promotion,
            "spring sale on house plants",
        ));
        assert_eq!(decision.mode, DecisionMode::Generate);
        assert_eq!(decision.aspect, Aspect::Portrait);
        assert_eq!(decision.provider_plan.provider_id, PROVIDER_OPENAI);
        assert!(decision.safety.reasons.is_empty());
    }

    #[test]
    fn abstract_categories_use_secondary_provider() {
        let decision = decide(&request(
            Platform::Instagram,
            Category::LocalAbstract,
            "neighborhood art walk",
        ));
        assert_eq!(decision.provider_plan.provider_id, PROVIDER_NANO_BANANA);
        assert_eq!(decision.aspect, Aspect::Story);
    }

    #[test]
    fn unsupported_combination_falls_back() {
        let decision = decide(&request(
            Platform::GoogleBusinessProfile,
            Category::SocialProof,
            "customer review highlight",
        ));
        assert_eq!(decision.mode, DecisionMode::Fallback);
        assert!(!decision.safety.reasons.is_empty());
    }

    #[test]
    fn soft_safety_precheck_falls_back() {
        let decision = decide(&request(
            Platform::Instagram,
            Category::Promotion,
            "photo of a person using our product",
        ));
        assert_eq!(decision.mode, DecisionMode::Fallback);
        assert!(!decision.safety.reasons.is_empty());
    }

    #[test]
    fn text_overlay_toggle_controls_no_text_rule() {
        let mut req = request(Platform::Facebook, Category::Promotion, "weekend deal");
        let without_overlay = decide(&req);
        assert!(without_overlay
            .prompt_plan
            .negative_rules
            .contains(&"no_text".to_string()));

        req.allow_text_overlay = Some(true);
        let with_overlay = decide(&req);
        assert!(!with_overlay
            .prompt_plan
            .negative_rules
            .contains(&"no_text".to_string()));
    }

    #[test]
    fn strict_mode_adds_rule() {
        let mut req = request(Platform::Blog, Category::Evergreen, "seasonal tips");
        req.safe_mode = Some(crate::domains::image_engine::models::SafeMode::Strict);
        let decision = decide(&req);
        assert!(decision
            .prompt_plan
            .negative_rules
            .contains(&"strict_content".to_string()));
    }

    #[test]
    fn brand_hints_flow_into_variables() {
        let mut req = request(Platform::Instagram, Category::Evergreen, "open late fridays");
        req.brand = Some(BrandProfile {
            name: Some("Night Owl Diner".to_string()),
            industry: Some("restaurant".to_string()),
            style: Some("warm".to_string()),
        });
        let decision = decide(&req);
        assert_eq!(
            decision.prompt_plan.variables.get("industry").map(String::as_str),
            Some("restaurant")
        );
        assert_eq!(
            decision.prompt_plan.variables.get("intent").map(String::as_str),
            Some("open late fridays")
        );
    }
}
