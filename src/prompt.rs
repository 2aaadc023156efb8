use crate::presets::{Composition, Style};

pub const PROMPT_SUFFIX: &str = "photorealistic, detailed eyes, natural skin tones, 8k, masterpiece";

/// Joins the optional seed text, the preset phrases and the fixed suffix.
/// Callers depend on this exact shape.
pub fn build_prompt(seed: &str, style: Style, composition: Composition) -> String {
    let base = format!(
        "{}, {}, {PROMPT_SUFFIX}",
        style.phrase(),
        composition.phrase()
    );
    let seed = seed.trim();
    if seed.is_empty() {
        base
    } else {
        format!("{seed}, {base}")
    }
}
