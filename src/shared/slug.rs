/// Maximum slug length in bytes
const MAX_SLUG_LEN: usize = 100;

/// Fold common Latin diacritics to ASCII so "Electronice și Gadget-uri"
/// slugs as "electronice-si-gadget-uri" instead of losing letters.
fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'ă' | 'â' | 'á' | 'à' | 'ä' | 'ã' | 'å' => "a",
        'î' | 'í' | 'ì' | 'ï' => "i",
        'ș' | 'ş' | 'š' | 'ś' => "s",
        'ț' | 'ţ' => "t",
        'é' | 'è' | 'ë' | 'ê' | 'ę' => "e",
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' | 'ø' => "o",
        'ú' | 'ù' | 'ü' | 'û' => "u",
        'ç' | 'č' | 'ć' => "c",
        'ñ' | 'ń' => "n",
        'ž' | 'ź' | 'ż' => "z",
        'ł' => "l",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

/// Convert text to a URL-safe slug.
///
/// Lowercases, folds diacritics, replaces every other non-alphanumeric run
/// with a single hyphen and trims hyphens at both ends. Long slugs are cut at
/// a word boundary.
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_hyphen = true; // skips leading hyphens

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_was_hyphen = false;
        } else if let Some(folded) = fold_char(c) {
            result.push_str(folded);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.len() > MAX_SLUG_LEN {
        // ASCII only at this point, any index is a char boundary
        let truncated = &result[..MAX_SLUG_LEN];
        return match truncated.rfind('-') {
            Some(last_hyphen) if last_hyphen > 0 => truncated[..last_hyphen].to_string(),
            _ => truncated.to_string(),
        };
    }

    result
}

/// Slug for the `attempt`-th candidate: `base`, `base-2`, `base-3`, ...
pub fn numbered_slug(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}
