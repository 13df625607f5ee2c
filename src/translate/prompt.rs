use crate::languages::language_name;

/// Builds the TranslateGemma prompt.
///
/// The instruction must be separated from the text by exactly two blank
/// lines; the model was trained on that layout.
pub fn build_prompt(text: &str, source_code: &str, target_code: &str) -> String {
    let source_lang = language_name(source_code);
    let target_lang = language_name(target_code);

    format!(
        "You are a professional {source_lang} ({source_code}) to {target_lang} ({target_code}) translator. \
Your goal is to accurately convey the meaning and nuances of the original {source_lang} text while adhering to \
{target_lang} grammar, vocabulary, and cultural sensitivities.\n\
Produce only the {target_lang} translation, without any additional explanations or commentary. \
Please translate the following {source_lang} text into {target_lang}:\n\n\n{text}"
    )
}
