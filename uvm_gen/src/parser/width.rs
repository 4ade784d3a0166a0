use std::{fmt::Display, sync::LazyLock};

use regex::Regex;

/// The only parameter name `$clog2(..)` is resolved for; it is assumed to be 4.
pub const KNOWN_CLOG2_PARAMETER: &str = "NUM_WAYS";
const KNOWN_CLOG2_VALUE: u32 = 4;

static CLOG2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$clog2\s*\(\s*(\w+)\s*\)").expect("valid regex"));
static NUMERIC_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*:\s*(\d+)\s*$").expect("valid regex"));
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_$]*").expect("valid regex"));

/// Why a width specification fell back to a width of 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidthWarning {
    UnknownParameter { parameter: String, expr: String },
    ParameterizedWidth { expr: String },
    Unparsable { expr: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Width {
    pub bits: u32,
    pub warning: Option<WidthWarning>,
}

impl Width {
    fn exact(bits: u32) -> Self {
        Self {
            bits,
            warning: None,
        }
    }

    fn fallback(warning: WidthWarning) -> Self {
        Self {
            bits: 1,
            warning: Some(warning),
        }
    }
}

/// Resolves the contents of a packed range (the text between `[` and `]`) to a
/// bit width. Never fails: anything it cannot resolve is width 1 plus a warning.
pub fn resolve_width(spec: Option<&str>) -> Width {
    let spec = match spec.map(str::trim) {
        None | Some("") => return Width::exact(1),
        Some(spec) => spec,
    };

    // Must come before the numeric range check; `$clog2(..)` can sit inside one.
    if let Some(captures) = CLOG2.captures(spec) {
        let parameter = &captures[1];
        if parameter == KNOWN_CLOG2_PARAMETER {
            return Width::exact(clog2(KNOWN_CLOG2_VALUE));
        }
        return Width::fallback(WidthWarning::UnknownParameter {
            parameter: parameter.to_string(),
            expr: spec.to_string(),
        });
    }

    if let Some(captures) = NUMERIC_RANGE.captures(spec) {
        if let (Ok(msb), Ok(lsb)) = (captures[1].parse::<u32>(), captures[2].parse::<u32>()) {
            if let Some(bits) = msb.abs_diff(lsb).checked_add(1) {
                return Width::exact(bits);
            }
        }
        return Width::fallback(WidthWarning::Unparsable {
            expr: spec.to_string(),
        });
    }

    if IDENTIFIER.is_match(spec) {
        return Width::fallback(WidthWarning::ParameterizedWidth {
            expr: spec.to_string(),
        });
    }

    Width::fallback(WidthWarning::Unparsable {
        expr: spec.to_string(),
    })
}

fn clog2(value: u32) -> u32 {
    if value <= 1 {
        0
    } else {
        u32::BITS - (value - 1).leading_zeros()
    }
}

impl Display for WidthWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidthWarning::UnknownParameter { parameter, expr } => write!(
                f,
                "Unknown parameter {parameter} in width expression [{expr}] - defaulting to 1"
            ),
            WidthWarning::ParameterizedWidth { expr } => write!(
                f,
                "Parameterized width [{expr}] is not supported - defaulting to 1"
            ),
            WidthWarning::Unparsable { expr } => write!(
                f,
                "Could not parse width expression [{expr}] - defaulting to 1"
            ),
        }
    }
}
