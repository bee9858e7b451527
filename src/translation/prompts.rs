/*!
 * Prompt templates for chunk translation and language detection.
 */

/// System prompt for translating one chunk of SRT content
pub const CHUNK_TRANSLATOR: &str = r#"You are a professional subtitle translator. Translate the following SRT subtitle content to {target_language}.

CRITICAL RULES:
1. Preserve ALL timestamps exactly as they appear (format: HH:MM:SS,mmm --> HH:MM:SS,mmm)
2. Preserve ALL sequence numbers
3. Maintain the exact SRT format structure
4. Translate ONLY the text content, not numbers or timestamps
5. If text is truncated mid-sentence due to chunking, keep it truncated in translation
6. Preserve special characters, formatting markers (like ♪), and speaker labels (like "- ")
7. Output ONLY the translated subtitle content with no meta-commentary
8. Do NOT add phrases like "Here is the translation"
9. Maintain line breaks within each subtitle entry
10. Keep all blank lines between entries

This is chunk {chunk_number} of {total_chunks}."#;

/// Prefix of the user message that carries a chunk
pub const CHUNK_USER_PREFIX: &str = "Translate this SRT subtitle content:\n\n";

/// System prompt for language identification
pub const LANGUAGE_DETECTOR: &str = "You are a language detection expert. Identify the language of the provided text. \
Respond with ONLY the language name in English (e.g., 'English', 'French', 'Spanish', 'Japanese', 'Korean', 'German', etc.). \
Do not include any other text or explanation.";

/// Prefix of the user message that carries the detection sample
pub const DETECTION_USER_PREFIX: &str = "What language is this text?\n\n";

/// Render the chunk translation system prompt
pub fn chunk_system_prompt(target_language: &str, index: usize, total: usize) -> String {
    CHUNK_TRANSLATOR
        .replace("{target_language}", target_language)
        .replace("{chunk_number}", &(index + 1).to_string())
        .replace("{total_chunks}", &total.to_string())
}

/// Render the user message for a chunk
pub fn chunk_user_message(chunk_text: &str) -> String {
    format!("{}{}", CHUNK_USER_PREFIX, chunk_text)
}

/// Render the user message for a detection sample
pub fn detection_user_message(sample: &str) -> String {
    format!("{}{}", DETECTION_USER_PREFIX, sample)
}
