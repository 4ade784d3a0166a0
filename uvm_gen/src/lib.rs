//! Generates UVM testbench skeletons from Verilog / SystemVerilog module
//! declarations.
//!
//! [`parser`] turns an RTL file into a [`ModuleDescription`] and [`generator`]
//! renders that description into one file per [`ArtifactKind`].

pub mod error;
pub mod generator;
pub mod model;
pub mod parser;

pub use error::{Error, UvmGenResult};
pub use generator::{generate, ArtifactKind, Generator, TemplateSource};
pub use model::{Direction, ModuleDescription, Parameter, Port};
pub use parser::{parse, parse_source, parse_with_warnings};
