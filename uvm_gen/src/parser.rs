pub mod width;

use std::{fmt::Display, num::IntErrorKind, path::Path, sync::LazyLock};

use regex::Regex;

use crate::{
    model::{Direction, ModuleDescription, Parameter, Port},
    Error, UvmGenResult,
};

pub use width::{resolve_width, Width, WidthWarning};

pub const RTL_EXTENSIONS: [&str; 2] = ["v", "sv"];

const RESERVED_WORDS: [&str; 22] = [
    "input",
    "output",
    "inout",
    "wire",
    "reg",
    "logic",
    "bit",
    "byte",
    "int",
    "integer",
    "shortint",
    "longint",
    "time",
    "var",
    "tri",
    "wand",
    "wor",
    "uwire",
    "signed",
    "unsigned",
    "parameter",
    "module",
];

static MODULE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bmodule\s+(?:(?:automatic|static)\s+)?([A-Za-z_][A-Za-z0-9_$]*)\s*(?:#\s*\(|\(|;)")
        .expect("valid regex")
});

static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\bparameter\s+",
        r"(?:(?:integer|int|shortint|longint|byte|bit|logic|reg|real|string|time|type|signed|unsigned)\s+)*",
        r"(?:\[[^\]]*\]\s*)*",
        r"([A-Za-z_][A-Za-z0-9_$]*)\s*=",
    ))
    .expect("valid regex")
});

static PARAMETER_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*,\s*([A-Za-z_][A-Za-z0-9_$]*)\s*(=)(?:[^=]|$)").expect("valid regex")
});

static PORT_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:input|output|inout)\b").expect("valid regex"));

static PORT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(input|output|inout)\b\s*",
        r"(?:(?:wire|reg|logic|bit|byte|int|integer|shortint|longint|time|var|tri|wand|wor|uwire|signed|unsigned)\b\s*)*",
        r"((?:\[[^\]]*\]\s*)*)",
        r"([A-Za-z_][A-Za-z0-9_$]*)",
    ))
    .expect("valid regex")
});

static USER_DEFINED_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:::|[A-Za-z_])").expect("valid regex"));

static PORT_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*,\s*([A-Za-z_][A-Za-z0-9_$]*)\s*(?:[,;)]|$)").expect("valid regex")
});

static PACKED_DIMENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").expect("valid regex"));

static DECIMAL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d[\d_]*$").expect("valid regex"));

static BASED_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d[\d_]*)?\s*'[sS]?([dDhHbBoO])\s*([0-9a-fA-F][0-9a-fA-F_]*)$")
        .expect("valid regex")
});

/// A parsed module together with the width warnings raised while reading it.
#[derive(Debug)]
pub struct Extraction {
    pub module: ModuleDescription,
    pub warnings: Vec<PortWarning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortWarning {
    pub port: String,
    pub warning: WidthWarning,
}

impl Display for PortWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "port '{}': {}", self.port, self.warning)
    }
}

/// Parses the first module declared in `rtl_path`. Width warnings are logged
/// and otherwise dropped.
pub fn parse(rtl_path: &Path) -> UvmGenResult<ModuleDescription> {
    let extraction = parse_with_warnings(rtl_path)?;
    for warning in extraction.warnings.iter() {
        log::warn!("{}: {}", rtl_path.to_string_lossy(), warning);
    }
    Ok(extraction.module)
}

pub fn parse_with_warnings(rtl_path: &Path) -> UvmGenResult<Extraction> {
    validate_rtl_path(rtl_path)?;
    log::debug!("reading RTL from {}", rtl_path.to_string_lossy());
    let source = std::fs::read_to_string(rtl_path)?;
    parse_source(&source)
}

pub fn has_rtl_extension(rtl_path: &Path) -> bool {
    rtl_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| RTL_EXTENSIONS.contains(&e))
}

pub fn validate_rtl_path(rtl_path: &Path) -> UvmGenResult<()> {
    if !has_rtl_extension(rtl_path) {
        return Err(Error::InvalidExtension(rtl_path.to_path_buf()));
    }
    if !rtl_path.exists() || !rtl_path.is_file() {
        return Err(Error::FileNotFound(rtl_path.to_path_buf()));
    }
    Ok(())
}

pub fn parse_source(source: &str) -> UvmGenResult<Extraction> {
    let text = strip_comments(source);
    // Parameter defaults are read from the unmasked text so string defaults
    // are still reported.
    let declarations = blank_strings(&text);
    let name = extract_module_name(&declarations)?;
    let parameters = extract_parameters(&text)?;
    let (ports, warnings) = extract_ports(&declarations)?;
    log::debug!(
        "module {name}: {} ports, {} parameters",
        ports.len(),
        parameters.len()
    );
    Ok(Extraction {
        module: ModuleDescription::new(name, ports, parameters),
        warnings,
    })
}

fn extract_module_name(text: &str) -> UvmGenResult<String> {
    MODULE_HEADER
        .captures(text)
        .map(|captures| captures[1].to_string())
        .ok_or(Error::NoModuleDefinition)
}

fn extract_parameters(text: &str) -> UvmGenResult<Vec<Parameter>> {
    let mut parameters = vec![];
    let mut pos = 0;
    while let Some(captures) = PARAMETER.captures_at(text, pos) {
        let mut name = captures[1].to_string();
        let mut cursor = captures.get(0).map_or(text.len(), |m| m.end());
        loop {
            let (raw_default, end) = take_default(text, cursor, &name)?;
            parameters.push(Parameter::new(&name, parse_default(&name, raw_default)?));
            cursor = end;
            match PARAMETER_CONTINUATION.captures(&text[cursor..]) {
                Some(next) => {
                    name = next[1].to_string();
                    cursor += next.get(2).map_or(0, |m| m.end());
                }
                None => break,
            }
        }
        pos = cursor;
    }
    Ok(parameters)
}

/// Returns the raw default text starting at `start` and the offset of the
/// character that terminated it.
fn take_default<'a>(text: &'a str, start: usize, name: &str) -> UvmGenResult<(&'a str, usize)> {
    let rest = &text[start..];
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut end = None;
    for (i, c) in rest.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' if depth > 0 => depth -= 1,
            ',' | ';' | ')' if depth == 0 => {
                end = Some(i);
                break;
            }
            _ => {}
        }
    }
    let end = match end {
        Some(end) => end,
        None if depth == 0 && !in_string => rest.len(),
        None => {
            return Err(Error::UnsupportedConstruct(format!(
                "unbalanced default value for parameter '{name}'"
            )))
        }
    };
    let raw = rest[..end].trim();
    if raw.is_empty() {
        return Err(Error::UnsupportedConstruct(format!(
            "parameter '{name}' has no default value"
        )));
    }
    Ok((raw, start + end))
}

fn parse_default(name: &str, raw: &str) -> UvmGenResult<i64> {
    let literal = match raw.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => inner.trim(),
        None => raw,
    };
    parse_integer_literal(name, literal)?.ok_or_else(|| {
        Error::NotImplemented(format!(
            "non-numeric default value {raw} for parameter '{name}'"
        ))
    })
}

/// `Ok(None)` when `literal` is not an integer literal at all.
fn parse_integer_literal(name: &str, literal: &str) -> UvmGenResult<Option<i64>> {
    let parsed = if DECIMAL_LITERAL.is_match(literal) {
        literal.replace('_', "").parse::<i64>()
    } else if let Some(captures) = BASED_LITERAL.captures(literal) {
        let radix = match &captures[1] {
            "d" | "D" => 10,
            "h" | "H" => 16,
            "b" | "B" => 2,
            _ => 8,
        };
        i64::from_str_radix(&captures[2].replace('_', ""), radix)
    } else {
        return Ok(None);
    };
    match parsed {
        Ok(value) => Ok(Some(value)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(Error::UnsupportedConstruct(format!(
                "default value {literal} for parameter '{name}' is out of range"
            )))
        }
        Err(_) => Ok(None),
    }
}

fn extract_ports(text: &str) -> UvmGenResult<(Vec<Port>, Vec<PortWarning>)> {
    let mut ports = vec![];
    let mut warnings = vec![];
    let mut pos = 0;
    while let Some(keyword) = PORT_KEYWORD.find_at(text, pos) {
        let rest = &text[keyword.start()..];
        let captures = PORT_DECLARATION.captures(rest).ok_or_else(|| {
            Error::UnsupportedConstruct(format!("cannot read port declaration '{}'", snippet(rest)))
        })?;
        let direction = Direction::try_from(&captures[1]).map_err(Error::UnsupportedConstruct)?;
        let first_name = captures[3].to_string();
        let declaration_end = captures.get(0).map_or(rest.len(), |m| m.end());
        if USER_DEFINED_TYPE.is_match(&rest[declaration_end..]) {
            return Err(Error::NotImplemented(format!(
                "user-defined port type in '{}'",
                snippet(rest)
            )));
        }
        let range = single_packed_range(&captures[2], &first_name)?;
        let width = resolve_width(range);

        let mut names = vec![first_name];
        let mut cursor = keyword.start() + declaration_end;
        while let Some(next) = PORT_CONTINUATION.captures(&text[cursor..]) {
            names.push(next[1].to_string());
            cursor += next.get(1).map_or(0, |m| m.end());
        }

        for name in names {
            if RESERVED_WORDS.contains(&name.as_str()) {
                return Err(Error::UnsupportedConstruct(format!(
                    "port declaration '{}' has no port name",
                    snippet(rest)
                )));
            }
            if let Some(warning) = &width.warning {
                warnings.push(PortWarning {
                    port: name.clone(),
                    warning: warning.clone(),
                });
            }
            ports.push(Port::new(name, direction, width.bits));
        }
        pos = cursor;
    }
    Ok((ports, warnings))
}

fn single_packed_range<'a>(dimensions: &'a str, port: &str) -> UvmGenResult<Option<&'a str>> {
    let ranges: Vec<&str> = PACKED_DIMENSION
        .captures_iter(dimensions)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    match ranges.as_slice() {
        [] => Ok(None),
        [range] => Ok(Some(range)),
        _ => Err(Error::NotImplemented(format!(
            "multi-dimensional packed port '{port}'"
        ))),
    }
}

fn snippet(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    line.chars().take(48).collect::<String>().trim().to_string()
}

/// Blanks out `//` and `/* */` comments, keeping line breaks and string
/// literals intact.
fn strip_comments(source: &str) -> String {
    let mut stripped = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if in_string {
            stripped.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    stripped.push(escaped);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                stripped.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        stripped.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        stripped.push('\n');
                    }
                    if previous == '*' && skipped == '/' {
                        break;
                    }
                    previous = skipped;
                }
                stripped.push(' ');
            }
            _ => stripped.push(c),
        }
    }
    stripped
}

/// Replaces the contents of string literals with spaces, keeping the quotes
/// and line breaks. Expects comments to be stripped already.
fn blank_strings(text: &str) -> String {
    let mut blanked = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_string = !in_string;
                blanked.push(c);
            }
            '\\' if in_string => {
                blanked.push(' ');
                if let Some(escaped) = chars.next() {
                    blanked.push(if escaped == '\n' { '\n' } else { ' ' });
                }
            }
            '\n' => blanked.push(c),
            _ if in_string => blanked.push(' '),
            _ => blanked.push(c),
        }
    }
    blanked
}
