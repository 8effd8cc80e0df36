//! Static lookup tables for LaTeX math commands

use phf::{phf_map, phf_set};

/// Greek letters, relations, operators, arrows and delimiters.
pub static SYMBOLS: phf::Map<&'static str, &'static str> = phf_map! {
    // Lowercase Greek
    "alpha" => "α",
    "beta" => "β",
    "gamma" => "γ",
    "delta" => "δ",
    "epsilon" => "ϵ",
    "varepsilon" => "ε",
    "zeta" => "ζ",
    "eta" => "η",
    "theta" => "θ",
    "vartheta" => "ϑ",
    "iota" => "ι",
    "kappa" => "κ",
    "lambda" => "λ",
    "mu" => "μ",
    "nu" => "ν",
    "xi" => "ξ",
    "omicron" => "ο",
    "pi" => "π",
    "varpi" => "ϖ",
    "rho" => "ρ",
    "varrho" => "ϱ",
    "sigma" => "σ",
    "varsigma" => "ς",
    "tau" => "τ",
    "upsilon" => "υ",
    "phi" => "ϕ",
    "varphi" => "φ",
    "chi" => "χ",
    "psi" => "ψ",
    "omega" => "ω",
    // Uppercase Greek
    "Gamma" => "Γ",
    "Delta" => "Δ",
    "Theta" => "Θ",
    "Lambda" => "Λ",
    "Xi" => "Ξ",
    "Pi" => "Π",
    "Sigma" => "Σ",
    "Upsilon" => "Υ",
    "Phi" => "Φ",
    "Psi" => "Ψ",
    "Omega" => "Ω",
    // Binary operators
    "times" => "×",
    "div" => "÷",
    "pm" => "±",
    "mp" => "∓",
    "cdot" => "⋅",
    "ast" => "∗",
    "star" => "⋆",
    "circ" => "∘",
    "bullet" => "∙",
    "cup" => "∪",
    "cap" => "∩",
    "setminus" => "∖",
    "wedge" => "∧",
    "land" => "∧",
    "vee" => "∨",
    "lor" => "∨",
    "oplus" => "⊕",
    "otimes" => "⊗",
    // Relations
    "leq" => "≤",
    "le" => "≤",
    "geq" => "≥",
    "ge" => "≥",
    "neq" => "≠",
    "ne" => "≠",
    "approx" => "≈",
    "equiv" => "≡",
    "sim" => "∼",
    "simeq" => "≃",
    "cong" => "≅",
    "propto" => "∝",
    "ll" => "≪",
    "gg" => "≫",
    "in" => "∈",
    "notin" => "∉",
    "ni" => "∋",
    "subset" => "⊂",
    "subseteq" => "⊆",
    "supset" => "⊃",
    "supseteq" => "⊇",
    "perp" => "⊥",
    "parallel" => "∥",
    "mid" => "∣",
    // Arrows
    "to" => "→",
    "rightarrow" => "→",
    "leftarrow" => "←",
    "gets" => "←",
    "leftrightarrow" => "↔",
    "Rightarrow" => "⇒",
    "Leftarrow" => "⇐",
    "Leftrightarrow" => "⇔",
    "implies" => "⟹",
    "iff" => "⟺",
    "mapsto" => "↦",
    "uparrow" => "↑",
    "downarrow" => "↓",
    // Miscellaneous
    "infty" => "∞",
    "partial" => "∂",
    "nabla" => "∇",
    "forall" => "∀",
    "exists" => "∃",
    "neg" => "¬",
    "lnot" => "¬",
    "emptyset" => "∅",
    "varnothing" => "∅",
    "angle" => "∠",
    "prime" => "′",
    "hbar" => "ℏ",
    "ell" => "ℓ",
    "Re" => "ℜ",
    "Im" => "ℑ",
    "aleph" => "ℵ",
    "degree" => "°",
    "dagger" => "†",
    "therefore" => "∴",
    "because" => "∵",
    "cdots" => "⋯",
    "ldots" => "…",
    "dots" => "…",
    "vdots" => "⋮",
    "ddots" => "⋱",
    // Delimiters
    "langle" => "⟨",
    "rangle" => "⟩",
    "lfloor" => "⌊",
    "rfloor" => "⌋",
    "lceil" => "⌈",
    "rceil" => "⌉",
    "vert" => "|",
    "Vert" => "‖",
    "lbrace" => "{",
    "rbrace" => "}",
    // Escaped characters
    "{" => "{",
    "}" => "}",
    "|" => "‖",
    "%" => "%",
    "$" => "$",
    "&" => "&",
    "#" => "#",
    "\\" => " ",
};

/// Function names typeset upright.
pub static FUNCTIONS: phf::Set<&'static str> = phf_set! {
    "log", "sin", "cos", "tan", "ln", "max", "min", "exp", "det", "sup", "inf",
    "lim", "sec", "csc", "cot", "sinh", "cosh", "tanh", "arcsin", "arccos",
    "arctan", "lg", "gcd", "arg", "deg", "dim", "ker", "Pr",
};

/// Accent commands and the combining mark each one carries.
pub static ACCENTS: phf::Map<&'static str, char> = phf_map! {
    "vec" => '\u{20D7}',
    "bar" => '\u{0305}',
    "overline" => '\u{0305}',
    "hat" => '\u{0302}',
    "widehat" => '\u{0302}',
    "dot" => '\u{0307}',
    "ddot" => '\u{0308}',
    "tilde" => '\u{0303}',
    "widetilde" => '\u{0303}',
};

/// Spacing commands; `\!` removes space so it maps to nothing.
pub static SPACING: phf::Map<&'static str, &'static str> = phf_map! {
    "," => " ",
    ";" => " ",
    ":" => " ",
    " " => " ",
    "quad" => " ",
    "qquad" => " ",
    "!" => "",
};

/// Commands whose braced argument is kept as upright literal text.
pub static TEXT_COMMANDS: phf::Set<&'static str> = phf_set! {
    "text", "mathrm", "operatorname", "textrm",
};

/// Font commands rendered as a plain group of their argument.
pub static FONT_COMMANDS: phf::Set<&'static str> = phf_set! {
    "mathbf", "mathit", "mathbb", "mathcal", "boldsymbol", "mathsf", "mathtt",
};

/// Characters emitted as upright literals.
pub fn is_literal_char(c: char) -> bool {
    matches!(
        c,
        ',' | ';' | '|' | '=' | '+' | '-' | '<' | '>' | '(' | ')' | '[' | ']' | '{' | '}' | ' '
            | '/' | '!' | ':' | '\'' | '*'
    )
}

/// Look up a command name, with or without its leading backslash.
pub fn lookup_symbol(name: &str) -> Option<&'static str> {
    SYMBOLS.get(name.strip_prefix('\\').unwrap_or(name)).copied()
}
