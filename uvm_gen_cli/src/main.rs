mod error;

use std::path::PathBuf;

use clap::Parser;
use uvm_gen::{parser, Generator, ModuleDescription, TemplateSource};

use crate::error::{UvmGenCliError, UvmGenCliResult};

/// Generate a UVM testbench skeleton from a Verilog / SystemVerilog module.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// RTL file (.sv or .v)
    #[arg(short, long)]
    rtl: PathBuf,

    /// Output directory
    #[arg(short, long)]
    out: PathBuf,

    /// Directory with custom templates (one <kind>.sv.hbs per component)
    #[arg(short, long)]
    template_dir: Option<PathBuf>,

    /// Echo the parsed module and every generated file
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn run(cli: &Cli) -> UvmGenCliResult<()> {
    if !parser::has_rtl_extension(&cli.rtl) {
        return Err(UvmGenCliError::InvalidExtension(cli.rtl.clone()));
    }

    if cli.verbose {
        println!("Parsing RTL file: {}", cli.rtl.to_string_lossy());
    }
    let module = parser::parse(&cli.rtl)?;
    if cli.verbose {
        print_module(&module);
    }

    let templates = match &cli.template_dir {
        Some(dir) => TemplateSource::directory(dir),
        None => TemplateSource::Embedded,
    };
    let generator = Generator::new(templates);
    if cli.verbose {
        println!("Using templates from: {}", generator.templates());
        println!("Generating UVM components in: {}", cli.out.to_string_lossy());
    }
    let files = generator.generate(&module, &cli.out)?;

    if cli.verbose {
        println!("Generated {} files:", files.len());
        for file in files.iter() {
            println!("  {}", file.to_string_lossy());
        }
    }
    println!("UVM skeleton generated in {}", cli.out.to_string_lossy());
    Ok(())
}

fn print_module(module: &ModuleDescription) {
    println!("Found module: {}", module.name());
    println!("Ports: {}", module.ports().len());
    for port in module.ports() {
        println!("  {port}");
    }
    println!("Parameters: {}", module.parameters().len());
    for parameter in module.parameters() {
        println!("  {parameter}");
    }
}
