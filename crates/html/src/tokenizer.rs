//! Template markup tokenizer.
//!
//! Input is compiler-emitted markup, not arbitrary web content, so the scanner
//! stays small:
//! - tag and attribute names are ASCII `[A-Za-z0-9:_.-]` and keep their case;
//! - `<!-- -->` comments and `<!...>` bogus comments become comment tokens;
//! - `script`, `style`, `textarea` and `title` bodies are scanned as raw text.
use crate::entities::decode_entities;
use crate::types::{AtomId, AtomTable, Token, TokenStream};
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn is_void_element(name: &str) -> bool {
    const VOID: [&str; 14] = [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ];
    VOID.iter().any(|v| v.eq_ignore_ascii_case(name))
}

fn raw_text_close(name: &str) -> Option<&'static [u8]> {
    const RAW: [(&str, &[u8]); 4] = [
        ("script", b"</script"),
        ("style", b"</style"),
        ("textarea", b"</textarea"),
        ("title", b"</title"),
    ];
    RAW.iter()
        .find(|(tag, _)| tag.eq_ignore_ascii_case(name))
        .map(|(_, close)| *close)
}

/// Find `close_tag` (case-insensitive) followed by optional ASCII whitespace and `>`.
/// Returns `(start_of_close_tag, end_after_gt)`.
fn find_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let n = close_tag.len();
    let mut i = 0;
    while i + n <= bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        if i + n > bytes.len() {
            return None;
        }
        if bytes[i..i + n].eq_ignore_ascii_case(close_tag) {
            let mut k = i + n;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

fn scan_name(bytes: &[u8], mut k: usize) -> usize {
    while k < bytes.len() && is_name_byte(bytes[k]) {
        k += 1;
    }
    k
}

fn skip_whitespace(bytes: &[u8], mut k: usize) -> usize {
    while k < bytes.len() && bytes[k].is_ascii_whitespace() {
        k += 1;
    }
    k
}

/// Parses the attribute list and the closing `>` or `/>` of a start tag.
/// Returns the position after the tag and whether it was self-closing.
fn scan_attributes(
    input: &str,
    mut k: usize,
    atoms: &mut AtomTable,
    attributes: &mut Vec<(AtomId, Option<String>)>,
) -> (usize, bool) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    loop {
        k = skip_whitespace(bytes, k);
        if k >= len {
            return (k, false);
        }
        match bytes[k] {
            b'>' => return (k + 1, false),
            b'/' if k + 1 < len && bytes[k + 1] == b'>' => return (k + 2, true),
            b'/' => {
                k += 1;
                continue;
            }
            _ => {}
        }
        let name_start = k;
        k = scan_name(bytes, k);
        if name_start == k {
            // Stray byte such as a quote or `=`; skip it rather than stall.
            k += 1;
            continue;
        }
        let name = atoms.intern(&input[name_start..k]);
        k = skip_whitespace(bytes, k);
        if k >= len || bytes[k] != b'=' {
            attributes.push((name, None));
            continue;
        }
        k = skip_whitespace(bytes, k + 1);
        if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
            let quote = bytes[k];
            let value_start = k + 1;
            let value_end = memchr(quote, &bytes[value_start..])
                .map(|rel| value_start + rel)
                .unwrap_or(len);
            attributes.push((name, Some(decode_entities(&input[value_start..value_end]))));
            k = (value_end + 1).min(len);
        } else {
            let value_start = k;
            while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                    break;
                }
                k += 1;
            }
            attributes.push((name, Some(decode_entities(&input[value_start..k]))));
        }
    }
}

/// Tokenizes template markup into a token stream with interned names.
pub fn tokenize(input: &str) -> TokenStream {
    let mut out = Vec::new();
    let mut atoms = AtomTable::new();
    let bytes = input.as_bytes();
    let mut i = 0;
    // Slices are only cut at ASCII structural bytes, so every endpoint is a
    // UTF-8 char boundary.
    while i < bytes.len() {
        if bytes[i] != b'<' {
            let end = memchr(b'<', &bytes[i..])
                .map(|rel| i + rel)
                .unwrap_or(bytes.len());
            let text = decode_entities(&input[i..end]);
            if !text.is_empty() {
                out.push(Token::Text(text));
            }
            i = end;
            continue;
        }
        let rest = &input[i..];
        if rest.starts_with(COMMENT_START) {
            let body = &rest[COMMENT_START.len()..];
            match body.find(COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(body[..end].to_string()));
                    i += COMMENT_START.len() + end + COMMENT_END.len();
                    continue;
                }
                None => {
                    out.push(Token::Comment(body.to_string()));
                    break;
                }
            }
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            let body = &rest[2..];
            let end = body.find('>').unwrap_or(body.len());
            out.push(Token::Comment(body[..end].to_string()));
            i += 2 + (end + 1).min(body.len());
            continue;
        }
        if rest.starts_with("</") {
            let name_end = scan_name(bytes, i + 2);
            let name = atoms.intern(&input[i + 2..name_end]);
            let close = memchr(b'>', &bytes[name_end..])
                .map(|rel| name_end + rel + 1)
                .unwrap_or(bytes.len());
            out.push(Token::EndTag(name));
            i = close;
            continue;
        }
        let name_end = scan_name(bytes, i + 1);
        if name_end == i + 1 {
            // A lone `<` is text.
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name_str = &input[i + 1..name_end];
        let name = atoms.intern(name_str);
        let mut attributes = Vec::new();
        let (after, mut self_closing) = scan_attributes(input, name_end, &mut atoms, &mut attributes);
        if is_void_element(name_str) {
            self_closing = true;
        }
        out.push(Token::StartTag {
            name,
            attributes,
            self_closing,
        });
        i = after;

        if self_closing {
            continue;
        }
        if let Some(close_tag) = raw_text_close(name_str) {
            let body = &input[i..];
            let (raw, next) = match find_close_tag(body, close_tag) {
                Some((start, end)) => (&body[..start], i + end),
                None => (body, bytes.len()),
            };
            if !raw.is_empty() {
                out.push(Token::Text(raw.to_string()));
            }
            out.push(Token::EndTag(name));
            i = next;
        }
    }
    log::trace!(target: "html::tokenizer", "tokenized {} bytes into {} tokens", input.len(), out.len());
    TokenStream::new(out, atoms)
}
