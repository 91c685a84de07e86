//! Prompt composition for twin images and animations.

use crate::category::Category;
use crate::gemini::GenerationError;

/// Fallback video prompt when neither a motion preset nor details are given.
pub const DEFAULT_MOTION: &str = "Subtle cinematic movement";

/// Gallery label used when an image has neither preset nor details.
pub const DEFAULT_TWIN_LABEL: &str = "Twin generation";

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validate a prompt before sending it to the API.
pub fn validate_prompt(prompt: &str) -> Result<(), GenerationError> {
    if prompt.trim().is_empty() {
        return Err(GenerationError::EmptyPrompt);
    }
    Ok(())
}

/// Compose the style context for a twin image.
///
/// Segments appear in a fixed order and empty optional segments are omitted:
/// `"Category: {category}. Style/Focus: {preset}. Additional Details: {details}"`.
pub fn compose_twin_prompt(category: Category, preset: Option<&str>, details: Option<&str>) -> String {
    let mut prompt = format!("Category: {}. ", category);
    if let Some(preset) = non_empty(preset) {
        prompt.push_str(&format!("Style/Focus: {}. ", preset));
    }
    if let Some(details) = non_empty(details) {
        prompt.push_str(&format!("Additional Details: {}", details));
    }
    prompt
}

/// Compose the prompt for animating an image.
pub fn compose_video_prompt(motion: Option<&str>, vibe: Option<&str>, details: Option<&str>) -> String {
    let motion = non_empty(motion);
    let details = non_empty(details);

    let mut prompt = motion.or(details).unwrap_or(DEFAULT_MOTION).to_string();
    if let Some(vibe) = non_empty(vibe) {
        prompt.push_str(&format!(", {} lighting and atmosphere", vibe));
    }
    if let (Some(_), Some(details)) = (motion, details) {
        prompt.push_str(&format!(". Details: {}", details));
    }
    prompt
}

/// Short label stored with a generated image.
pub fn gallery_label(preset: Option<&str>, details: Option<&str>) -> String {
    non_empty(preset)
        .or(non_empty(details))
        .unwrap_or(DEFAULT_TWIN_LABEL)
        .to_string()
}

/// Wrap a composed style context in the identity-preserving instruction sent
/// to the image model.
pub fn twin_instruction(context: &str) -> String {
    format!(
        "Create a high-end, hyper-realistic image featuring the IDENTICAL TWIN of the person in the reference image(s).\n\
         \n\
         CRITICAL INSTRUCTIONS:\n\
         1. FACE: The face MUST be an identical match to the reference photo(s) (eyes, nose, mouth, bone structure).\n\
         2. CONTEXT: Apply the following context/style settings strictly: {context}\n\
         3. QUALITY: 8k resolution, professional beauty photography, high fashion magazine aesthetic.\n\
         \n\
         If the context involves a luxury car or specific scene, place the Twin naturally within that environment.\n\
         If the context involves makeup/hair, apply that specific style to the Twin while keeping the face recognizable.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twin_prompt_with_preset_only() {
        let prompt = compose_twin_prompt(Category::Hair, Some("Sleek Glass Hair Bob"), None);
        assert_eq!(prompt, "Category: Hair. Style/Focus: Sleek Glass Hair Bob. ");
    }

    #[test]
    fn test_twin_prompt_all_segments_in_order() {
        let prompt = compose_twin_prompt(
            Category::LuxuryCars,
            Some("Bugatti Chiron"),
            Some("parked at night"),
        );
        assert_eq!(
            prompt,
            "Category: Luxury Cars. Style/Focus: Bugatti Chiron. Additional Details: parked at night"
        );
    }

    #[test]
    fn test_twin_prompt_omits_empty_segments() {
        assert_eq!(compose_twin_prompt(Category::Nails, Some(""), Some("   ")), "Category: Nails. ");
        assert_eq!(
            compose_twin_prompt(Category::General, None, Some("candid")),
            "Category: General. Additional Details: candid"
        );
    }

    #[test]
    fn test_twin_prompt_segments_appear_once() {
        for category in Category::ALL {
            for preset in [None, Some("P")] {
                for details in [None, Some("D")] {
                    let prompt = compose_twin_prompt(category, preset, details);
                    assert_eq!(prompt.matches("Category: ").count(), 1);
                    assert_eq!(prompt.matches("Style/Focus: ").count(), preset.is_some() as usize);
                    assert_eq!(
                        prompt.matches("Additional Details: ").count(),
                        details.is_some() as usize
                    );
                    if let (Some(_), Some(_)) = (preset, details) {
                        assert!(prompt.find("Style/Focus").unwrap() < prompt.find("Additional").unwrap());
                    }
                }
            }
        }
    }

    #[test]
    fn test_video_prompt_motion_and_vibe() {
        let prompt = compose_video_prompt(
            Some("Walking confidently towards camera"),
            Some("Golden Hour Sun Flare"),
            None,
        );
        assert_eq!(
            prompt,
            "Walking confidently towards camera, Golden Hour Sun Flare lighting and atmosphere"
        );
    }

    #[test]
    fn test_video_prompt_defaults() {
        assert_eq!(compose_video_prompt(None, None, None), DEFAULT_MOTION);
        assert_eq!(compose_video_prompt(None, None, Some("spin")), "spin");
    }

    #[test]
    fn test_video_prompt_motion_with_details() {
        let prompt = compose_video_prompt(Some("Paparazzi walk"), None, Some("red carpet"));
        assert_eq!(prompt, "Paparazzi walk. Details: red carpet");
    }

    #[test]
    fn test_gallery_label_fallbacks() {
        assert_eq!(gallery_label(Some("Bob"), Some("x")), "Bob");
        assert_eq!(gallery_label(None, Some("x")), "x");
        assert_eq!(gallery_label(None, None), DEFAULT_TWIN_LABEL);
    }

    #[test]
    fn test_twin_instruction_embeds_context() {
        let instruction = twin_instruction("Category: Hair. ");
        assert!(instruction.contains("IDENTICAL TWIN"));
        assert!(instruction.contains("settings strictly: Category: Hair. \n"));
    }

    #[test]
    fn test_validate_prompt() {
        assert!(validate_prompt("walk").is_ok());
        assert!(matches!(validate_prompt("  \n"), Err(GenerationError::EmptyPrompt)));
    }
}
