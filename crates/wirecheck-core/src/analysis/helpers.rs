//! Shared helper functions for check implementations.

use std::sync::LazyLock;

use regex::Regex;

static CALLEE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*(?:\s*\??\.\s*[A-Za-z_$][\w$]*)*").expect("Invalid regex pattern")
});

const GLOBAL_OBJECTS: &[&str] = &["window", "globalThis", "self"];

/// Receivers whose member calls never name a user function.
const BUILTIN_RECEIVERS: &[&str] = &[
    "this",
    "event",
    "console",
    "document",
    "Math",
    "JSON",
    "Object",
    "Array",
    "Number",
    "String",
    "Promise",
    "localStorage",
    "sessionStorage",
    "location",
    "history",
    "navigator",
];

/// Bare names that are language keywords or browser globals.
const BUILTIN_CALLEES: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "new", "typeof", "delete", "void", "return",
    "await", "true", "false", "null", "undefined", "this", "event", "alert", "confirm", "prompt",
    "setTimeout", "setInterval", "clearTimeout", "clearInterval", "requestAnimationFrame",
    "parseInt", "parseFloat", "isNaN", "fetch", "print", "open", "close", "history", "location",
];

const STATEMENT_PREFIXES: &[&str] = &["return ", "void ", "await "];

/// Callee named by each statement of an inline handler, in order.
///
/// `foo(this, 'x')` and `return foo(event)` give `foo`, `window.foo()` gives
/// `foo`, `app.save()` gives `save`. Member calls on builtin receivers such
/// as `event.preventDefault()` give nothing. Bare builtin names like `close`
/// are kept, since a script may define a function with that name.
pub fn handler_callees(handler: &str) -> impl Iterator<Item = &str> {
    handler
        .split(';')
        .filter_map(|statement| callee_of_statement(statement.trim()))
}

/// Whether a bare callee is a keyword or browser global.
pub fn is_builtin_callee(name: &str) -> bool {
    BUILTIN_CALLEES.contains(&name)
}

fn callee_of_statement(statement: &str) -> Option<&str> {
    let mut rest = statement;
    while let Some(stripped) = STATEMENT_PREFIXES
        .iter()
        .find_map(|prefix| rest.strip_prefix(prefix))
    {
        rest = stripped.trim_start();
    }

    let path = CALLEE_PATH.find(rest)?.as_str();
    let segments: Vec<&str> = path
        .split('.')
        .map(|s| s.trim().trim_end_matches('?').trim())
        .collect();

    let segments = match segments.as_slice() {
        [first, tail @ ..] if GLOBAL_OBJECTS.contains(first) && !tail.is_empty() => tail,
        all => all,
    };

    match segments {
        [] => None,
        [name] => Some(*name),
        [receiver, ..] if BUILTIN_RECEIVERS.contains(receiver) => None,
        [.., last] => Some(*last),
    }
}

/// Lowercase words of an id: `shopTabContent` and `shop-tab_content` both
/// give `["shop", "tab", "content"]`.
pub fn id_words(id: &str) -> Vec<String> {
    enum Class {
        Lower,
        Upper,
        Digit,
    }

    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev: Option<Class> = None;

    for c in id.chars() {
        let class = if c.is_ascii_digit() {
            Class::Digit
        } else if c.is_uppercase() {
            Class::Upper
        } else if c.is_alphanumeric() {
            Class::Lower
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        };

        let boundary = match (&prev, &class) {
            (Some(Class::Lower), Class::Upper) => true,
            (Some(Class::Digit), Class::Lower | Class::Upper) => true,
            (Some(Class::Lower | Class::Upper), Class::Digit) => true,
            _ => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
        prev = Some(class);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `settings-modal` becomes `SettingsModal`.
pub fn pascal_case(id: &str) -> String {
    id.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

/// `settings-modal` becomes `settingsModal`.
pub fn camel_case(id: &str) -> String {
    decapitalize(&pascal_case(id))
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The id with the word matching `keyword` cut out, keeping the original
/// separators: `tab-shop` and `shopTab` both give `shop`.
pub fn strip_keyword(id: &str, keyword: &str) -> Option<String> {
    let lower = id.to_ascii_lowercase();
    let keyword = keyword.to_ascii_lowercase();
    let Some(first_char) = keyword.chars().next() else {
        return None;
    };
    let mut search_from = 0;

    while let Some(found) = lower[search_from..].find(&keyword) {
        let start = search_from + found;
        let end = start + keyword.len();
        let starts_word = start == 0 || is_word_boundary(id, start);
        let ends_word = end == id.len() || is_word_boundary(id, end);

        if starts_word && ends_word {
            let mut before = id[..start].to_string();
            let mut after = id[end..].to_string();
            if before.ends_with(['-', '_']) {
                before.pop();
            } else if after.starts_with(['-', '_']) {
                after.remove(0);
            }

            let base = if before.is_empty() {
                decapitalize(&after)
            } else {
                before + after.as_str()
            };
            return (!base.is_empty()).then_some(base);
        }
        search_from = start + first_char.len_utf8();
    }
    None
}

fn is_word_boundary(id: &str, index: usize) -> bool {
    let before = id[..index].chars().next_back();
    let at = id[index..].chars().next();
    match (before, at) {
        (Some(b), _) if !b.is_alphanumeric() => true,
        (_, Some(a)) if !a.is_alphanumeric() => true,
        (Some(b), Some(a)) => {
            (b.is_lowercase() && a.is_uppercase()) || b.is_ascii_digit() != a.is_ascii_digit()
        }
        _ => true,
    }
}

fn decapitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
