//! Prompt construction.
//!
//! Pure and synchronous. The output [`PromptBundle`] lives only in pipeline
//! memory; it is handed to the provider adapter and nowhere else. Negative
//! rule ids are translated into phrase lists here, so the persisted decision
//! never contains negative prompt text.

use super::models::{Aspect, BrandProfile, Category, Decision, PromptBundle, SafetyResult};

/// Engine category → prompt category.
fn prompt_category(category: Category) -> &'static str {
    match category {
        Category::Evergreen => "evergreen",
        Category::Promotion => "promo",
        Category::SocialProof => "review",
        Category::LocalAbstract => "event",
        Category::Educational => "announcement",
    }
}

/// Industry → visual vibe for the background.
fn industry_vibe(industry: &str) -> &'static str {
    let industry = industry.to_lowercase();
    if industry.contains("restaurant") || industry.contains("food") || industry.contains("cafe") {
        "warm, appetizing"
    } else if industry.contains("fitness") || industry.contains("gym") {
        "energetic, dynamic"
    } else if industry.contains("spa") || industry.contains("salon") || industry.contains("beauty")
    {
        "serene, soft-focus"
    } else if industry.contains("tech") || industry.contains("software") {
        "modern, minimal"
    } else if industry.contains("retail") || industry.contains("shop") {
        "vibrant, inviting"
    } else {
        "clean, professional"
    }
}

/// Style description → tone keyword, substring match on the lower-cased
/// style string. Returns `None` when no tone applies.
fn style_tone(style: &str) -> Option<&'static str> {
    let style = style.to_lowercase();
    if style.contains("luxury") || style.contains("elegant") {
        Some("luxury")
    } else if style.contains("bold") || style.contains("confident") {
        Some("bold")
    } else if style.contains("friendly") || style.contains("warm") {
        Some("friendly")
    } else if style.contains("professional") || style.contains("clean") {
        Some("professional")
    } else {
        None
    }
}

fn aspect_phrase(aspect: Aspect) -> &'static str {
    match aspect {
        Aspect::Square => "square",
        Aspect::Portrait => "vertical portrait",
        Aspect::Landscape => "wide landscape",
        Aspect::Story => "full-height story",
    }
}

/// Negative rule id → phrase list for the negative prompt.
fn negative_phrases(rule: &str) -> Option<&'static str> {
    match rule {
        "no_text" => Some("text, words, letters, typography, captions"),
        "no_logos" => Some("logos, brand marks, trademarks, product packaging"),
        "no_faces" => Some("faces, people, portraits, hands, figures"),
        "strict_content" => Some("alcohol, gambling, smoking, political imagery"),
        _ => None,
    }
}

/// Extra negative phrases keyed by safety tags.
fn tag_phrases(tag: &str) -> Option<&'static str> {
    match tag {
        "sensitive_subject" => Some("recognizable individuals, celebrity likenesses"),
        _ => None,
    }
}

/// Build the prompt pair from a decision, the safety evaluation, and brand
/// hints.
pub fn build_prompt(
    decision: &Decision,
    safety: &SafetyResult,
    brand: Option<&BrandProfile>,
) -> PromptBundle {
    let vibe = brand
        .and_then(|b| b.industry.as_deref())
        .map(industry_vibe)
        .unwrap_or("clean, professional");

    let tone = brand
        .and_then(|b| b.style.as_deref())
        .and_then(style_tone);

    let intent = decision
        .prompt_plan
        .variables
        .get("intent")
        .map(String::as_str)
        .unwrap_or("a local business update");

    let mut prompt = format!(
        "Abstract {} marketing background for a {} post, themed around {}, \
         composed for a {} canvas",
        vibe,
        prompt_category(decision.category),
        intent,
        aspect_phrase(decision.aspect),
    );
    if let Some(tone) = tone {
        prompt.push_str(&format!(", {} tone", tone));
    }
    prompt.push_str(", soft gradients, premium lighting, high detail");

    let mut negatives: Vec<&str> = decision
        .prompt_plan
        .negative_rules
        .iter()
        .filter_map(|rule| negative_phrases(rule))
        .collect();
    negatives.extend(safety.tags.iter().filter_map(|tag| tag_phrases(tag)));
    negatives.push("low quality, blurry, distorted, oversaturated");

    PromptBundle {
        prompt,
        negative_prompt: negatives.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::image_engine::models::{
        DecisionMode, DecisionSafety, Platform, PromptPlan, ProviderPlan, Verdict,
    };
    use std::collections::BTreeMap;

    fn decision(category: Category) -> Decision {
        let mut variables = BTreeMap::new();
        variables.insert("intent".to_string(), "spring planting sale".to_string());
        Decision {
            mode: DecisionMode::Generate,
            platform: Platform::Instagram,
            category,
            aspect: Aspect::Square,
            prompt_plan: PromptPlan {
                negative_rules: vec!["no_text".to_string(), "no_faces".to_string()],
                variables,
            },
            provider_plan: ProviderPlan {
                provider_id: "openai".to_string(),
            },
            safety: DecisionSafety::default(),
        }
    }

    fn allow() -> SafetyResult {
        SafetyResult {
            verdict: Verdict::Allow,
            reason_safe: None,
            tags: vec![],
        }
    }

    #[test]
    fn category_mapping_matches_table() {
        assert_eq!(prompt_category(Category::Evergreen), "evergreen");
        assert_eq!(prompt_category(Category::Promotion), "promo");
        assert_eq!(prompt_category(Category::SocialProof), "review");
        assert_eq!(prompt_category(Category::LocalAbstract), "event");
        assert_eq!(prompt_category(Category::Educational), "announcement");
    }

    #[test]
    fn tone_mapping_is_substring_based() {
        assert_eq!(style_tone("Luxury spa experience"), Some("luxury"));
        assert_eq!(style_tone("elegant and calm"), Some("luxury"));
        assert_eq!(style_tone("Bold statements"), Some("bold"));
        assert_eq!(style_tone("confident voice"), Some("bold"));
        assert_eq!(style_tone("warm neighborhood feel"), Some("friendly"));
        assert_eq!(style_tone("clean lines"), Some("professional"));
        assert_eq!(style_tone("quirky"), None);
    }

    #[test]
    fn prompt_reflects_category_and_intent() {
        let bundle = build_prompt(&decision(Category::Promotion), &allow(), None);
        assert!(bundle.prompt.contains("promo"));
        assert!(bundle.prompt.contains("spring planting sale"));
        assert!(bundle.prompt.contains("square"));
    }

    #[test]
    fn brand_hints_shape_the_prompt() {
        let brand = BrandProfile {
            name: Some("Leaf & Loam".to_string()),
            industry: Some("retail garden shop".to_string()),
            style: Some("warm and friendly".to_string()),
        };
        let bundle = build_prompt(&decision(Category::Evergreen), &allow(), Some(&brand));
        assert!(bundle.prompt.contains("vibrant, inviting"));
        assert!(bundle.prompt.contains("friendly tone"));
    }

    #[test]
    fn negative_rules_become_phrases_not_ids() {
        let bundle = build_prompt(&decision(Category::Promotion), &allow(), None);
        assert!(bundle.negative_prompt.contains("typography"));
        assert!(bundle.negative_prompt.contains("faces"));
        // Rule ids themselves never appear in the negative prompt
        assert!(!bundle.negative_prompt.contains("no_text"));
        assert!(!bundle.negative_prompt.contains("no_faces"));
    }

    #[test]
    fn safety_tags_add_negative_phrases() {
        let safety = SafetyResult {
            verdict: Verdict::Allow,
            reason_safe: None,
            tags: vec!["sensitive_subject".to_string()],
        };
        let bundle = build_prompt(&decision(Category::Promotion), &safety, None);
        assert!(bundle.negative_prompt.contains("celebrity likenesses"));
    }
}
