pub const EXTRACTION_DEFAULT: &str = include_str!("../data/prompts/extraction_default.txt");

/// Pick the caller's prompt, or the bundled default when none (or an empty
/// one) was supplied.
pub fn extraction_prompt(custom: Option<&str>) -> &str {
    match custom {
        Some(prompt) if !prompt.is_empty() => prompt,
        _ => EXTRACTION_DEFAULT,
    }
}
