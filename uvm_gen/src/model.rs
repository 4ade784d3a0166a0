use std::fmt::Display;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
    Inout,
}

/// A single port of the parsed module, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Port {
    name: String,
    direction: Direction,
    width: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Parameter {
    name: String,
    default: i64,
}

/// Everything the generator needs to know about a module: its name, ports and
/// parameters, each list in the order it appears in the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModuleDescription {
    name: String,
    ports: Vec<Port>,
    parameters: Vec<Parameter>,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "input" => Ok(Direction::Input),
            "output" => Ok(Direction::Output),
            "inout" => Ok(Direction::Inout),
            other => Err(format!("unknown port direction '{other}'")),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Port {
    /// Widths below 1 are clamped to 1.
    pub fn new(name: impl Into<String>, direction: Direction, width: u32) -> Self {
        Self {
            name: name.into(),
            direction,
            width: width.max(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

impl Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.width > 1 {
            write!(f, "{} [{}:0] {}", self.direction, self.width - 1, self.name)
        } else {
            write!(f, "{} {}", self.direction, self.name)
        }
    }
}

impl Parameter {
    pub fn new(name: impl Into<String>, default: i64) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> i64 {
        self.default
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parameter {} = {}", self.name, self.default)
    }
}

impl ModuleDescription {
    pub fn new(name: impl Into<String>, ports: Vec<Port>, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            ports,
            parameters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}
