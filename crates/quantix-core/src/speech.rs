//! Spoken-math normalization — dictated phrases to symbolic expressions.
//!
//! Pure functions, no I/O. Turns a free-form transcript like
//! "derivative of x squared plus two" into `diff(x**2+2)` for the solver.

use regex::Regex;
use std::sync::LazyLock;

// Compiled regexes — allocated once, reused across calls.
//
// Operation keywords are removed by plain alternation, so longer phrases
// must come first ("derivative of" before "derivative"). Removal is
// substring-based on purpose: "factorial" triggers and loses its "factor".
static RE_DERIVATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"derivative of|derivative|differentiate").unwrap());
static RE_INTEGRAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"integrate|integral of|integral").unwrap());
static RE_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"limit of|limit").unwrap());
static RE_SIMPLIFY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"simplify").unwrap());
static RE_FACTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"factor").unwrap());
static RE_EXPAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"expand").unwrap());

static RE_LETTER_GAP_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])\s+([a-z])").unwrap());
static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_DIGIT_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9])([a-z])").unwrap());
static RE_LETTER_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([0-9])").unwrap());

/// Spoken phrase → symbolic token, applied top to bottom as whole-word
/// replacements. Order is load-bearing: a multi-word phrase must appear
/// before any single word it contains ("divided by" before "by"). One
/// known casualty: "square" rewrites before "square root" can match, so
/// "square root of x" comes out as `**2 root of x` and the solver's own
/// parser gets to reject it.
const SYMBOL_TABLE: &[(&str, &str)] = &[
    ("plus", "+"),
    ("minus", "-"),
    ("times", "*"),
    ("into", "*"),
    ("divide by", "/"),
    ("divided by", "/"),
    ("by", "/"),
    ("equals", "="),
    ("equal to", "="),
    ("squared", "**2"),
    ("square", "**2"),
    ("cubed", "**3"),
    ("cube", "**3"),
    ("power", "**"),
    ("open bracket", "("),
    ("close bracket", ")"),
    ("open parenthesis", "("),
    ("close parenthesis", ")"),
    ("sin", "sin"),
    ("sine", "sin"),
    ("cos", "cos"),
    ("cosine", "cos"),
    ("tan", "tan"),
    ("tangent", "tan"),
    ("log", "log"),
    ("natural log", "ln"),
    ("square root", "sqrt"),
    ("zero", "0"),
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
];

static SYMBOL_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SYMBOL_TABLE
        .iter()
        .map(|&(phrase, token)| (Regex::new(&format!(r"\b{phrase}\b")).unwrap(), token))
        .collect()
});

/// Operation keywords found in a transcript. At most one wins the wrapper;
/// `limit` is recognized and stripped but never wraps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct OpFlags {
    differentiate: bool,
    integrate: bool,
    limit: bool,
    simplify: bool,
    factor: bool,
    expand: bool,
}

/// Normalize a spoken-math transcript into a symbolic expression string.
///
/// Pipeline: lowercase, detect-and-strip operation keywords, word-for-word
/// symbol substitution, implicit multiplication, whitespace removal, then
/// wrap in the detected operation (`diff(..)`, `integrate(..)`, ...).
///
/// Total on any input; an empty transcript maps to the empty string (or a
/// bare wrapper like `diff()` if only a keyword was spoken). Not idempotent:
/// feeding an already-symbolic string back in can re-wrap it.
pub fn normalize(transcript: &str) -> String {
    let lowered = transcript.to_lowercase();
    let (flags, stripped) = detect_and_strip(&lowered);

    let mut t = stripped;
    for (re, token) in SYMBOL_RULES.iter() {
        t = re.replace_all(&t, *token).into_owned();
    }

    // Adjacent letters become products while whitespace still separates
    // them; digit-letter adjacency only exists once whitespace is gone.
    t = RE_LETTER_GAP_LETTER.replace_all(&t, "$1*$2").into_owned();
    t = RE_WHITESPACE.replace_all(&t, "").into_owned();
    t = RE_DIGIT_LETTER.replace_all(&t, "$1*$2").into_owned();
    t = RE_LETTER_DIGIT.replace_all(&t, "$1*$2").into_owned();

    if flags.differentiate {
        format!("diff({t})")
    } else if flags.integrate {
        format!("integrate({t})")
    } else if flags.simplify {
        format!("simplify({t})")
    } else if flags.factor {
        format!("factor({t})")
    } else if flags.expand {
        format!("expand({t})")
    } else {
        // Covers the limit-only case too: stripped, never wrapped.
        t
    }
}

/// Flag each operation keyword present, removing its mentions as we go.
/// Detection runs on the progressively stripped text, so "derivative of
/// the integral" flags both but the wrapper priority picks `diff`.
fn detect_and_strip(text: &str) -> (OpFlags, String) {
    let mut flags = OpFlags::default();
    let mut t = text.to_string();

    if t.contains("derivative") || t.contains("differentiate") {
        flags.differentiate = true;
        t = RE_DERIVATIVE.replace_all(&t, "").into_owned();
    }
    if t.contains("integrate") || t.contains("integral") {
        flags.integrate = true;
        t = RE_INTEGRAL.replace_all(&t, "").into_owned();
    }
    if t.contains("limit") {
        flags.limit = true;
        t = RE_LIMIT.replace_all(&t, "").into_owned();
    }
    if t.contains("simplify") {
        flags.simplify = true;
        t = RE_SIMPLIFY.replace_all(&t, "").into_owned();
    }
    if t.contains("factor") {
        flags.factor = true;
        t = RE_FACTOR.replace_all(&t, "").into_owned();
    }
    if t.contains("expand") {
        flags.expand = true;
        t = RE_EXPAND.replace_all(&t, "").into_owned();
    }

    (flags, t)
}

/// Collapse whitespace runs in typed problem text to single spaces and trim.
/// Keeps the text verbatim otherwise — typed input is not normalized.
pub fn compact_problem_text(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}
