use std::{collections::HashMap, path::PathBuf, sync::LazyLock};

use regex::Regex;
use uvm_gen::{
    generate, parse, parser::resolve_width, ArtifactKind, Direction, Error, Generator,
    ModuleDescription, Port, TemplateSource,
};

static INTERFACE_SIGNAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*logic\s+(?:\[([^\]]+)\]\s*)?(\w+);").unwrap());
static DUT_MODPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)modport\s+dut_mp\s*\((.*?)\);").unwrap());
static MODPORT_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(input|output|inout)\s+(\w+)").unwrap());

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn write_default_templates(dir: &std::path::Path) {
    for kind in ArtifactKind::ALL {
        let template = TemplateSource::Embedded.load(kind).unwrap();
        std::fs::write(dir.join(kind.template_file_name()), template.as_bytes()).unwrap();
    }
}

/// Reads the ports back out of a generated interface file.
fn ports_from_interface(content: &str) -> Vec<Port> {
    let widths: HashMap<String, u32> = INTERFACE_SIGNAL
        .captures_iter(content)
        .map(|c| {
            let width = resolve_width(c.get(1).map(|m| m.as_str()));
            assert_eq!(width.warning, None);
            (c[2].to_string(), width.bits)
        })
        .collect();
    let modport = DUT_MODPORT.captures(content).unwrap();
    MODPORT_ENTRY
        .captures_iter(&modport[1])
        .map(|c| {
            let direction = Direction::try_from(&c[1]).unwrap();
            Port::new(&c[2], direction, widths[&c[2]])
        })
        .collect()
}

#[test]
fn test_adder_end_to_end() {
    let module = parse(&fixture("adder.sv")).unwrap();
    assert_eq!(module.name(), "adder");
    assert_eq!(
        module.ports(),
        &[
            Port::new("a", Direction::Input, 8),
            Port::new("b", Direction::Input, 8),
            Port::new("sum", Direction::Output, 9),
        ]
    );
    assert!(module.parameters().is_empty());

    let out_dir = tempfile::tempdir().unwrap();
    let files = generate(&module, out_dir.path()).unwrap();
    assert_eq!(files.len(), 12);
    for (kind, file) in ArtifactKind::ALL.iter().zip(files.iter()) {
        assert!(file.is_absolute());
        assert_eq!(
            file.file_name().unwrap().to_string_lossy(),
            kind.output_file_name("adder")
        );
        let content = std::fs::read_to_string(file).unwrap();
        assert!(content.contains("adder"), "{kind} does not mention adder");
    }
}

#[test]
fn test_ports_round_trip_through_interface() {
    let module = parse(&fixture("cache_ctrl.v")).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let files = generate(&module, out_dir.path()).unwrap();

    let interface = std::fs::read_to_string(&files[9]).unwrap();
    assert_eq!(ports_from_interface(&interface), module.ports());

    let transaction = std::fs::read_to_string(&files[8]).unwrap();
    for port in module.ports() {
        assert!(transaction.contains(&format!("{};", port.name())));
        assert!(transaction.contains(&format!("`uvm_field_int({},", port.name())));
    }
}

#[test]
fn test_config_lists_parameters() {
    let module = parse(&fixture("fsm.sv")).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    generate(&module, out_dir.path()).unwrap();

    let config = std::fs::read_to_string(out_dir.path().join("fsm_config.sv")).unwrap();
    assert!(config.contains("int STATES = 4;"));
    assert!(config.contains("int WIDTH = 8;"));

    let tb_top = std::fs::read_to_string(out_dir.path().join("fsm_tb_top.sv")).unwrap();
    assert!(tb_top.contains(".WIDTH(8)"));
    assert!(tb_top.contains(".data_in(vif.data_in)"));
}

#[test]
fn test_generation_is_idempotent() {
    let module = parse(&fixture("fsm.sv")).unwrap();
    let out_dir = tempfile::tempdir().unwrap();

    let first: Vec<Vec<u8>> = generate(&module, out_dir.path())
        .unwrap()
        .iter()
        .map(|f| std::fs::read(f).unwrap())
        .collect();
    let second: Vec<Vec<u8>> = generate(&module, out_dir.path())
        .unwrap()
        .iter()
        .map(|f| std::fs::read(f).unwrap())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_creates_nested_output_directory() {
    let module = ModuleDescription::new("nested", vec![], vec![]);
    let root = tempfile::tempdir().unwrap();
    let out_dir = root.path().join("a/b/tb");
    let files = generate(&module, &out_dir).unwrap();
    assert!(out_dir.is_dir());
    assert!(files.iter().all(|f| f.starts_with(std::path::absolute(&out_dir).unwrap())));
}

#[test]
fn test_custom_template_override() {
    let templates = tempfile::tempdir().unwrap();
    write_default_templates(templates.path());
    std::fs::write(
        templates.path().join("agent.sv.hbs"),
        "class {{module.name}}_agent extends uvm_agent;\n  // Custom agent implementation\nendclass\n",
    )
    .unwrap();

    let module = parse(&fixture("adder.sv")).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    Generator::new(TemplateSource::directory(templates.path()))
        .generate(&module, out_dir.path())
        .unwrap();

    let agent = std::fs::read_to_string(out_dir.path().join("adder_agent.sv")).unwrap();
    assert_eq!(
        agent,
        "class adder_agent extends uvm_agent;\n  // Custom agent implementation\nendclass\n"
    );
}

#[test]
fn test_missing_template_names_artifact() {
    let templates = tempfile::tempdir().unwrap();
    write_default_templates(templates.path());
    std::fs::remove_file(templates.path().join("scoreboard.sv.hbs")).unwrap();

    let module = parse(&fixture("adder.sv")).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let e = Generator::new(TemplateSource::directory(templates.path()))
        .generate(&module, out_dir.path())
        .unwrap_err();
    assert_eq!(e.artifact(), Some(ArtifactKind::Scoreboard));
    assert!(e.to_string().starts_with("Failed to generate scoreboard: "));
    assert!(e.to_string().contains("scoreboard.sv.hbs"));

    // Artifacts ahead of the failing one are left in place.
    assert!(out_dir.path().join("adder_sequencer.sv").exists());
    assert!(!out_dir.path().join("adder_env.sv").exists());
}

#[test]
fn test_empty_template_directory() {
    let templates = tempfile::tempdir().unwrap();
    let module = parse(&fixture("adder.sv")).unwrap();
    let e = Generator::new(TemplateSource::directory(templates.path()))
        .generate(&module, templates.path())
        .unwrap_err();
    assert!(matches!(
        e,
        Error::TemplateLoad {
            artifact: ArtifactKind::Agent,
            ..
        }
    ));
}

#[test]
fn test_template_syntax_error_names_artifact() {
    let templates = tempfile::tempdir().unwrap();
    write_default_templates(templates.path());
    std::fs::write(
        templates.path().join("env.sv.hbs"),
        "{{#each module.ports}}{{name}}{{/if}}\n",
    )
    .unwrap();

    let module = parse(&fixture("adder.sv")).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let e = Generator::new(TemplateSource::directory(templates.path()))
        .generate(&module, out_dir.path())
        .unwrap_err();
    assert!(matches!(
        e,
        Error::TemplateSyntax {
            artifact: ArtifactKind::Env,
            ..
        }
    ));
    assert!(!e.is_permission_denied());
}

#[cfg(unix)]
#[test]
fn test_read_only_output_directory() {
    use std::os::unix::fs::PermissionsExt;

    let root = tempfile::tempdir().unwrap();
    let read_only = root.path().join("readonly");
    std::fs::create_dir(&read_only).unwrap();
    std::fs::set_permissions(&read_only, std::fs::Permissions::from_mode(0o500)).unwrap();
    if std::fs::write(read_only.join("probe"), b"").is_ok() {
        // Permission bits are not enforced for this user (e.g. root).
        return;
    }

    let module = parse(&fixture("adder.sv")).unwrap();
    let e = generate(&module, &read_only).unwrap_err();
    assert!(e.is_permission_denied());
    assert_eq!(e.artifact(), Some(ArtifactKind::Agent));
    assert!(e.to_string().contains("Permission denied"));

    std::fs::set_permissions(&read_only, std::fs::Permissions::from_mode(0o700)).unwrap();
}
