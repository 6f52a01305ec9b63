//! Rule-based safety evaluation.
//!
//! Pure and deterministic: no I/O, no clock, no randomness. The same rule
//! set runs at decision time (soft pre-check) and again at generate time, so
//! hitting the generate endpoint directly is always safe.
//!
//! Verdict precedence: block > fallback > allow.

use super::models::{Aspect, Category, DecisionMode, Platform, SafetyResult, Verdict};

/// Terms that make generation a hard no. Matched as substrings of the
/// lower-cased free text.
const BLOCK_TERMS: &[&str] = &[
    "weapon", "firearm", "gun", "violence", "violent", "blood", "gore", "nude", "nudity",
    "explicit", "nsfw", "hate", "slur", "terror", "narcotic", "illegal drug",
];

/// Subjects the generator deliberately avoids; the caller gets a stock asset
/// instead of a generated image.
const FALLBACK_TERMS: &[&str] = &[
    "face", "portrait", "person", "people", "celebrity", "influencer", "logo", "trademark",
    "brand mark", "watermark",
];

/// Additional fallback subjects when the caller asked for strict mode.
const STRICT_FALLBACK_TERMS: &[&str] = &[
    "alcohol", "beer", "wine", "liquor", "gambling", "casino", "cigarette", "vape", "political",
    "election",
];

/// Inputs to a single safety evaluation.
#[derive(Debug, Clone)]
pub struct SafetyInput<'a> {
    pub platform: Platform,
    pub category: Category,
    pub aspect: Aspect,
    pub mode: DecisionMode,
    pub negative_rules: &'a [String],
    pub business_name: Option<&'a str>,
    pub user_text: Option<&'a str>,
    pub strict: bool,
}

/// Evaluate the rule set against one generation attempt.
pub fn evaluate(input: &SafetyInput<'_>) -> SafetyResult {
    let mut blocked = false;
    let mut fallback = false;
    let mut reasons: Vec<String> = Vec::new();
    let mut tags: Vec<String> = Vec::new();

    let text = normalized_text(input);

    if BLOCK_TERMS.iter().any(|term| text.contains(term)) {
        blocked = true;
        tags.push("blocked_content".to_string());
        reasons.push(
            "The request describes content this service does not generate imagery for."
                .to_string(),
        );
    }

    if FALLBACK_TERMS.iter().any(|term| text.contains(term)) {
        fallback = true;
        tags.push("sensitive_subject".to_string());
        reasons.push(
            "The request asks for subjects we avoid generating; a stock asset works better here."
                .to_string(),
        );
    }

    if input.strict && STRICT_FALLBACK_TERMS.iter().any(|term| text.contains(term)) {
        fallback = true;
        tags.push("strict_mode_subject".to_string());
        reasons.push("Strict mode excludes this topic from generated imagery.".to_string());
    }

    // A decision that already routed to fallback stays a fallback when the
    // evaluator is re-run standalone at the generate stage.
    if input.mode == DecisionMode::Fallback {
        fallback = true;
        tags.push("decision_fallback".to_string());
        reasons.push("Generation was already routed to a fallback asset.".to_string());
    }

    let verdict = if blocked {
        Verdict::Block
    } else if fallback {
        Verdict::Fallback
    } else {
        Verdict::Allow
    };

    let reason_safe = if reasons.is_empty() {
        None
    } else {
        Some(reasons.join(" "))
    };

    SafetyResult {
        verdict,
        reason_safe,
        tags,
    }
}

/// Free text the rules scan: user intent plus business name, lower-cased.
/// Negative rule ids and the platform/category/aspect are structural inputs
/// and are not scanned as text.
fn normalized_text(input: &SafetyInput<'_>) -> String {
    let mut text = String::new();
    if let Some(user_text) = input.user_text {
        text.push_str(&user_text.to_lowercase());
        text.push(' ');
    }
    if let Some(name) = input.business_name {
        text.push_str(&name.to_lowercase());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(user_text: &str) -> SafetyInput<'static> {
        SafetyInput {
            platform: Platform::Instagram,
            category: Category::Promotion,
            aspect: Aspect::Square,
            mode: DecisionMode::Generate,
            negative_rules: &[],
            business_name: None,
            user_text: Some(Box::leak(user_text.to_string().into_boxed_str())),
            strict: false,
        }
    }

    #[test]
    fn clean_text_allows() {
        let result = evaluate(&input("spring sale on house plants"));
        assert_eq!(result.verdict, Verdict::Allow);
        assert!(result.reason_safe.is_none());
        assert!(result.tags.is_empty());
    }

    #[test]
    fn blocked_term_blocks() {
        let result = evaluate(&input("promo with guns and fireworks"));
        assert_eq!(result.verdict, Verdict::Block);
        assert!(result.tags.contains(&"blocked_content".to_string()));
        assert!(result.reason_safe.is_some());
    }

    #[test]
    fn sensitive_subject_falls_back() {
        let result = evaluate(&input("a smiling person holding our product"));
        assert_eq!(result.verdict, Verdict::Fallback);
        assert!(result.tags.contains(&"sensitive_subject".to_string()));
    }

    #[test]
    fn block_wins_over_fallback() {
        // Trips both a block rule ("violence") and a fallback rule ("people")
        let result = evaluate(&input("people reacting to violence"));
        assert_eq!(result.verdict, Verdict::Block);
    }

    #[test]
    fn strict_mode_widens_fallback_rules() {
        let relaxed = evaluate(&input("wine tasting event banner"));
        assert_eq!(relaxed.verdict, Verdict::Allow);

        let mut strict_input = input("wine tasting event banner");
        strict_input.strict = true;
        let strict = evaluate(&strict_input);
        assert_eq!(strict.verdict, Verdict::Fallback);
        assert!(strict.tags.contains(&"strict_mode_subject".to_string()));
    }

    #[test]
    fn fallback_mode_carries_through() {
        let mut i = input("spring sale");
        i.mode = DecisionMode::Fallback;
        let result = evaluate(&i);
        assert_eq!(result.verdict, Verdict::Fallback);
        assert!(result.tags.contains(&"decision_fallback".to_string()));
    }

    #[test]
    fn business_name_is_scanned() {
        let mut i = input("grand opening special");
        i.business_name = Some("Guns N Gear Outfitters");
        let result = evaluate(&i);
        assert_eq!(result.verdict, Verdict::Block);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let i = input("people enjoying a rooftop patio");
        let first = evaluate(&i);
        let second = evaluate(&i);
        assert_eq!(first.verdict, second.verdict);
        assert_eq!(first.reason_safe, second.reason_safe);
        assert_eq!(first.tags, second.tags);
    }
}
