//! LaTeX formatting of gate parameters and wire labels.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use qsip_ir::ParameterExpression;

/// Tolerance used when recognizing multiples of π.
const PI_TOLERANCE: f64 = 1e-10;

/// Constants that render in symbolic form.
const PI_FORMS: [(f64, &str); 10] = [
    (PI, r"\pi"),
    (-PI, r"-\pi"),
    (FRAC_PI_2, r"\frac{\pi}{2}"),
    (-FRAC_PI_2, r"-\frac{\pi}{2}"),
    (FRAC_PI_4, r"\frac{\pi}{4}"),
    (-FRAC_PI_4, r"-\frac{\pi}{4}"),
    (TAU, r"2\pi"),
    (-TAU, r"-2\pi"),
    (3.0 * FRAC_PI_2, r"\frac{3\pi}{2}"),
    (-3.0 * FRAC_PI_2, r"-\frac{3\pi}{2}"),
];

const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "rho", "sigma", "tau", "upsilon",
    "phi", "varphi", "chi", "psi", "omega", "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi",
    "Sigma", "Upsilon", "Phi", "Psi", "Omega",
];

/// Functions with a dedicated LaTeX operator.
const OPERATORS: &[&str] = &["sin", "cos", "tan", "arcsin", "arccos", "arctan", "exp", "ln", "log"];

/// Format a numeric constant, preferring π forms.
pub fn format_constant(value: f64) -> String {
    PI_FORMS
        .iter()
        .find(|(target, _)| (value - target).abs() < PI_TOLERANCE)
        .map_or_else(|| format!("{value}"), |(_, form)| (*form).to_string())
}

/// Format an identifier, turning Greek letter names into macros.
///
/// A `_` suffix becomes a subscript, so `theta_1` renders as `\theta_{1}`.
pub fn format_symbol(name: &str) -> String {
    if let Some((head, sub)) = name.split_once('_') {
        if !head.is_empty() && !sub.is_empty() {
            return format!("{}_{{{}}}", format_symbol(head), escape(sub));
        }
    }
    if GREEK.contains(&name) {
        format!(r"\{name}")
    } else {
        escape(name)
    }
}

/// Format a parameter expression as math-mode LaTeX.
pub fn format_param(expr: &ParameterExpression) -> String {
    use ParameterExpression as P;

    match expr {
        P::Constant(v) => format_constant(*v),
        P::Symbol(name) => format_symbol(name),
        P::Pi => r"\pi".to_string(),
        P::Neg(inner) => format!("-{}", grouped(inner, inner.is_additive())),
        P::Add(a, b) => format!("{} + {}", format_param(a), format_param(b)),
        P::Sub(a, b) => format!("{} - {}", format_param(a), grouped(b, b.is_additive())),
        P::Mul(a, b) => format!(
            r"{} \cdot {}",
            grouped(a, a.is_additive()),
            grouped(b, b.is_additive() || matches!(**b, P::Neg(_)))
        ),
        P::Div(a, b) => format!(r"\frac{{{}}}{{{}}}", format_param(a), format_param(b)),
        P::Pow(base, exp) => format!("{}^{{{}}}", grouped(base, !base.is_atom()), format_param(exp)),
        P::Call(name, args) => format_call(name, args),
    }
}

fn grouped(expr: &ParameterExpression, parens: bool) -> String {
    if parens {
        format!("({})", format_param(expr))
    } else {
        format_param(expr)
    }
}

fn format_call(name: &str, args: &[ParameterExpression]) -> String {
    if name == "sqrt" && args.len() == 1 {
        return format!(r"\sqrt{{{}}}", format_param(&args[0]));
    }
    let args = args.iter().map(format_param).collect::<Vec<_>>().join(", ");
    if OPERATORS.contains(&name) {
        format!(r"\{name}({args})")
    } else {
        format!("{}({args})", format_symbol(name))
    }
}

/// Format a parameter list as `(a,b,c)`, or nothing when empty.
pub fn format_param_list(params: &[ParameterExpression]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let parts: Vec<_> = params.iter().map(format_param).collect();
    format!("({})", parts.join(","))
}

/// Escape characters that are special in LaTeX math text.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '_' | '#' | '%' | '&' | '$' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Ket label for a wire, e.g. `\lstick{$|q[0]\rangle$}`.
pub fn ket_label(label: &str) -> String {
    format!(r"\lstick{{$|{}\rangle$}}", escape(label))
}
