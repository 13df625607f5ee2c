use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// A language the translation model can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

const fn entry(code: &'static str, name: &'static str, native_name: &'static str) -> LanguageEntry {
    LanguageEntry { code, name, native_name }
}

/// Languages supported by TranslateGemma, ordered by English name.
pub const LANGUAGES: &[LanguageEntry] = &[
    entry("af", "Afrikaans", "Afrikaans"),
    entry("am", "Amharic", "አማርኛ"),
    entry("ar", "Arabic", "العربية"),
    entry("bn", "Bengali", "বাংলা"),
    entry("bg", "Bulgarian", "Български"),
    entry("ca", "Catalan", "Català"),
    entry("zh", "Chinese (Simplified)", "简体中文"),
    entry("zh-TW", "Chinese (Traditional)", "繁體中文"),
    entry("hr", "Croatian", "Hrvatski"),
    entry("cs", "Czech", "Čeština"),
    entry("da", "Danish", "Dansk"),
    entry("nl", "Dutch", "Nederlands"),
    entry("en", "English", "English"),
    entry("et", "Estonian", "Eesti"),
    entry("fil", "Filipino", "Filipino"),
    entry("fi", "Finnish", "Suomi"),
    entry("fr", "French", "Français"),
    entry("de", "German", "Deutsch"),
    entry("el", "Greek", "Ελληνικά"),
    entry("gu", "Gujarati", "ગુજરાતી"),
    entry("he", "Hebrew", "עברית"),
    entry("hi", "Hindi", "हिन्दी"),
    entry("hu", "Hungarian", "Magyar"),
    entry("is", "Icelandic", "Íslenska"),
    entry("id", "Indonesian", "Bahasa Indonesia"),
    entry("it", "Italian", "Italiano"),
    entry("ja", "Japanese", "日本語"),
    entry("kn", "Kannada", "ಕನ್ನಡ"),
    entry("ko", "Korean", "한국어"),
    entry("lv", "Latvian", "Latviešu"),
    entry("lt", "Lithuanian", "Lietuvių"),
    entry("ms", "Malay", "Bahasa Melayu"),
    entry("ml", "Malayalam", "മലയാളം"),
    entry("mr", "Marathi", "मराठी"),
    entry("no", "Norwegian", "Norsk"),
    entry("fa", "Persian", "فارسی"),
    entry("pl", "Polish", "Polski"),
    entry("pt", "Portuguese", "Português"),
    entry("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    entry("ro", "Romanian", "Română"),
    entry("ru", "Russian", "Русский"),
    entry("sr", "Serbian", "Српски"),
    entry("sk", "Slovak", "Slovenčina"),
    entry("sl", "Slovenian", "Slovenščina"),
    entry("es", "Spanish", "Español"),
    entry("sw", "Swahili", "Kiswahili"),
    entry("sv", "Swedish", "Svenska"),
    entry("ta", "Tamil", "தமிழ்"),
    entry("te", "Telugu", "తెలుగు"),
    entry("th", "Thai", "ไทย"),
    entry("tr", "Turkish", "Türkçe"),
    entry("uk", "Ukrainian", "Українська"),
    entry("ur", "Urdu", "اردو"),
    entry("vi", "Vietnamese", "Tiếng Việt"),
    entry("zu", "Zulu", "isiZulu"),
];

static BY_CODE: Lazy<HashMap<&'static str, &'static LanguageEntry>> =
    Lazy::new(|| LANGUAGES.iter().map(|lang| (lang.code, lang)).collect());

pub fn find(code: &str) -> Option<&'static LanguageEntry> {
    BY_CODE.get(code).copied()
}

/// Display name for a code, or the code itself when the catalog doesn't know it.
pub fn language_name(code: &str) -> &str {
    find(code).map(|lang| lang.name).unwrap_or(code)
}

/// Filter used by the language pickers: drop `exclude`, then keep entries
/// whose name, native name or code contains `query` (case-insensitive).
pub fn search(query: &str, exclude: Option<&str>) -> Vec<&'static LanguageEntry> {
    let needle = query.to_lowercase();
    LANGUAGES
        .iter()
        .filter(|lang| Some(lang.code) != exclude)
        .filter(|lang| {
            lang.name.to_lowercase().contains(&needle)
                || lang.native_name.to_lowercase().contains(&needle)
                || lang.code.to_lowercase().contains(&needle)
        })
        .collect()
}
