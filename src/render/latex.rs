//! LaTeX math → readable Unicode.
//!
//! Telegram has no math rendering, so `$…$` spans are rewritten into plain
//! Unicode before MarkdownV2 escaping. Only the common subset is handled:
//! Greek letters, operators, `\frac`, `\sqrt`, text commands and
//! super/subscripts. Unknown commands keep their backslash form.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_FRAC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[dt]?frac\s*\{([^{}]*)\}\s*\{([^{}]*)\}").unwrap());
static RE_SQRT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\sqrt\s*\{([^{}]*)\}").unwrap());
static RE_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:text|mathrm|mathbf|mathit|operatorname)\s*\{([^{}]*)\}").unwrap()
});
static RE_SUP_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^\{([^{}]*)\}").unwrap());
static RE_SUB_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"_\{([^{}]*)\}").unwrap());
static RE_SUP_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^([^\s\\{}])").unwrap());
static RE_SUB_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([^\s\\{}])").unwrap());
static RE_COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\([A-Za-z]+)").unwrap());
static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Rewrite a LaTeX math source into Unicode text.
pub fn to_unicode(src: &str) -> String {
    let mut s = src.trim().to_string();

    // Innermost groups first; repeat so nested constructs resolve outwards.
    loop {
        let before = s.clone();
        s = replace(&s, &RE_TEXT, |c| c[1].to_string());
        s = replace(&s, &RE_FRAC, |c| {
            format!("{}/{}", wrap_compound(&c[1]), wrap_compound(&c[2]))
        });
        s = replace(&s, &RE_SQRT, |c| format!("√{}", wrap_compound(&c[1])));
        s = replace(&s, &RE_SUP_CHAR, |c| script(&c[1], superscript, SUP_MARK));
        s = replace(&s, &RE_SUB_CHAR, |c| script(&c[1], subscript, SUB_MARK));
        s = replace(&s, &RE_SUP_GROUP, |c| script(&c[1], superscript, SUP_MARK));
        s = replace(&s, &RE_SUB_GROUP, |c| script(&c[1], subscript, SUB_MARK));
        if s == before {
            break;
        }
    }

    s = replace(&s, &RE_COMMAND, |c| match symbol(&c[1]) {
        Some(sym) => sym.to_string(),
        None => c[0].to_string(),
    });

    let s: String = s
        .chars()
        .filter(|&c| c != '{' && c != '}')
        .map(|c| match c {
            SUP_MARK => '^',
            SUB_MARK => '_',
            other => other,
        })
        .collect();
    RE_SPACES.replace_all(s.trim(), " ").into_owned()
}

// Stand-ins for `^` / `_` in unmappable scripts so later passes skip them.
const SUP_MARK: char = '\u{1}';
const SUB_MARK: char = '\u{2}';

fn replace(input: &str, re: &Regex, f: impl Fn(&regex::Captures) -> String) -> String {
    re.replace_all(input, |c: &regex::Captures| f(c)).into_owned()
}

fn wrap_compound(part: &str) -> String {
    let part = part.trim();
    if part.chars().count() > 1 && part.chars().any(|c| !c.is_alphanumeric()) {
        format!("({part})")
    } else {
        part.to_string()
    }
}

fn script(body: &str, map: fn(char) -> Option<char>, marker: char) -> String {
    let mapped: Option<String> = body.chars().map(map).collect();
    match mapped {
        Some(s) if !s.is_empty() => s,
        _ if body.chars().count() == 1 => format!("{marker}{body}"),
        _ => format!("{marker}({body})"),
    }
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'n' => 'ₙ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "neq" | "ne" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "infty" => "∞",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "partial" => "∂",
        "nabla" => "∇",
        "in" => "∈",
        "notin" => "∉",
        "subset" => "⊂",
        "subseteq" => "⊆",
        "cup" => "∪",
        "cap" => "∩",
        "forall" => "∀",
        "exists" => "∃",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" => "⇒",
        "Leftrightarrow" | "iff" => "⇔",
        "ldots" | "dots" | "cdots" => "…",
        "left" | "right" | "displaystyle" | "quad" => "",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greek_and_operators() {
        assert_eq!(to_unicode(r"\alpha \times \beta"), "α × β");
        assert_eq!(to_unicode(r"a \leq b"), "a ≤ b");
    }

    #[test]
    fn superscripts_and_subscripts() {
        assert_eq!(to_unicode("x^2 + y^2"), "x² + y²");
        assert_eq!(to_unicode("a_{10}"), "a₁₀");
        assert_eq!(to_unicode("e^{i\\pi}"), "e^(iπ)");
    }

    #[test]
    fn fractions_and_roots() {
        assert_eq!(to_unicode(r"\frac{1}{2}"), "1/2");
        assert_eq!(to_unicode(r"\frac{a+b}{c}"), "(a+b)/c");
        assert_eq!(to_unicode(r"\sqrt{x}"), "√x");
    }

    #[test]
    fn text_commands_keep_contents() {
        assert_eq!(to_unicode(r"\text{speed} = 3"), "speed = 3");
    }

    #[test]
    fn unknown_command_is_kept() {
        assert_eq!(to_unicode(r"\foo x"), r"\foo x");
    }
}
