//! Текстовая эвристика: полный документ или фрагмент.
//!
//! Решение принимается по сырому вводу, без повторного разбора: после
//! ведущих пробелов и комментариев документ начинается с `<html`, `<body`
//! или `<!DOCTYPE`, за которыми идёт пробельный символ или `>`.

const DOCUMENT_KEYWORDS: &[&str] = &["html", "body", "!doctype"];

/// `true`, если ввод следует рендерить как фрагмент.
pub fn is_fragment(raw: &str) -> bool {
    !starts_document(strip_leading_comments(raw))
}

/// Срезает BOM и ведущие комментарии. Незакрытый комментарий остаётся как
/// есть.
fn strip_leading_comments(raw: &str) -> &str {
    let mut rest = raw.strip_prefix('\u{feff}').unwrap_or(raw).trim_start();
    while let Some(after_open) = rest.strip_prefix("<!--") {
        match after_open.find("-->") {
            Some(end) => rest = after_open[end + "-->".len()..].trim_start(),
            None => break,
        }
    }
    rest
}

fn starts_document(text: &str) -> bool {
    let Some(tag) = text.strip_prefix('<') else {
        return false;
    };

    DOCUMENT_KEYWORDS.iter().any(|keyword| {
        let Some(prefix) = tag.get(..keyword.len()) else {
            return false;
        };
        prefix.eq_ignore_ascii_case(keyword)
            && tag[keyword.len()..]
                .chars()
                .next()
                .is_some_and(|ch| ch.is_whitespace() || ch == '>')
    })
}
