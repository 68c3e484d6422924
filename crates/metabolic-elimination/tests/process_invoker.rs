#![cfg(unix)]

use std::collections::HashSet;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use metabolic_elimination::paradigm::{parse_tool_output, Invocation, ProcessInvoker, ToolInvoker};

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("paradigm");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn invocation(dir: &Path) -> Invocation {
    Invocation {
        config: dir.join("bc.cfg"),
        pathway: dir.join("pathway_Alpha.tab"),
        evidence: dir.join("BC_k=0"),
    }
}

#[test]
fn passes_config_pathway_and_evidence_flags() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_script(dir.path(), r#"printf '%s\n' "$@""#);
    let inv = invocation(dir.path());

    let stdout = ProcessInvoker::new(&tool).invoke(&inv).unwrap();
    let args: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        args,
        vec![
            "-c",
            inv.config.to_str().unwrap(),
            "-p",
            inv.pathway.to_str().unwrap(),
            "-b",
            inv.evidence.to_str().unwrap(),
        ]
    );
}

#[test]
fn non_zero_exit_still_yields_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_script(dir.path(), "printf '> 0 s\\nR1\\t0.25\\nend\\n'\necho oops >&2\nexit 3");

    let stdout = ProcessInvoker::new(&tool).invoke(&invocation(dir.path())).unwrap();
    let reactions: HashSet<String> = ["R1".to_string()].into_iter().collect();
    let blocks = parse_tool_output(&stdout, &reactions).unwrap();
    assert_eq!(blocks, vec![vec![("R1".to_string(), 0.25)]]);
}

#[test]
fn missing_executable_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ProcessInvoker::new(dir.path().join("absent")).invoke(&invocation(dir.path()));
    assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::NotFound);
}
