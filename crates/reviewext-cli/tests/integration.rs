//! Integration tests for the reviewext CLI
//!
//! Library commands run against temporary book trees; the preprocess
//! tests drive the built binary from inside the tree.

use std::fs;
use std::path::Path;
use std::process::Command;

use reviewext_cli::{check_command, render_command, OutputFormat, RenderFormat};
use reviewext_core::config::Settings;
use tempfile::TempDir;

const LEGACY: &str = "\
= Legacy

@<B>{bold} text

//emlist[Sample][ruby]{
puts 'hello'
//}

//cmd{
$ make
//}
";

const MODERN: &str = "\
= Modern

//list[main][Main][lang=ruby,lineno=on]{
#@mapfile(code/main.rb)
#@end
//}
";

/// A book with one legacy and one modern chapter plus included code
fn book() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("chapters")).unwrap();
    fs::create_dir_all(dir.path().join("code")).unwrap();
    fs::write(dir.path().join("chapters/legacy.re"), LEGACY).unwrap();
    fs::write(dir.path().join("modern.re"), MODERN).unwrap();
    fs::write(dir.path().join("code/main.rb"), "def main\n  puts 1\nend\n").unwrap();
    dir
}

fn reviewext(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_reviewext"))
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

#[test]
fn test_render_latex_with_mapfile() {
    let dir = book();
    let output = dir.path().join("modern.tex");

    render_command(
        &dir.path().join("modern.re"),
        RenderFormat::Latex,
        Some(&output),
        &Settings::default(),
    )
    .unwrap();

    let tex = fs::read_to_string(&output).unwrap();
    assert!(tex.contains("  numbers=left,\n"));
    assert!(tex.contains("  language=Ruby,\n"));
    assert!(tex.contains("[caption={Main}]\ndef main\n  puts 1\nend\n\\end{reviewlistlst}"));
    assert!(!tex.contains("#@mapfile"));
}

#[test]
fn test_render_html() {
    let dir = book();
    let output = dir.path().join("modern.html");

    render_command(
        &dir.path().join("modern.re"),
        RenderFormat::Html,
        Some(&output),
        &Settings::default(),
    )
    .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("<div class=\"code-block line-numbers language-ruby\""));
    assert!(html.contains("<span class=\"line\">def main</span>"));
}

#[test]
fn test_render_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = render_command(
        &dir.path().join("missing.re"),
        RenderFormat::Latex,
        None,
        &Settings::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn test_render_reports_failing_block() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("narrow.re");
    fs::write(&input, "//list[narrow][Narrow][wrap=8]{\nlong long long line\n//}\n").unwrap();

    let err = render_command(&input, RenderFormat::Latex, None, &Settings::default()).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("listing narrow (line 1)"), "{}", chain);
}

#[test]
fn test_check_and_fix() {
    let dir = book();
    let input = dir.path().join("chapters/legacy.re");

    let has_errors = check_command(&input, OutputFormat::Json, false, &Settings::default()).unwrap();
    assert!(!has_errors);

    check_command(&input, OutputFormat::Text, true, &Settings::default()).unwrap();
    let fixed = fs::read_to_string(&input).unwrap();
    assert!(fixed.contains("//list[][Sample][ruby]{\nputs 'hello'\n//}\n"));
    assert!(fixed.contains("//list[][コマンド][fontsize=small]{\n$ make\n//}\n"));
    // Inline markup is the converter's business, not the linter's
    assert!(fixed.contains("@<B>{bold}"));
}

#[test]
fn test_check_errors_from_settings() {
    let dir = book();
    let input = dir.path().join("chapters/legacy.re");
    let settings = Settings::from_toml_str("[lint]\ndeprecated_list = \"error\"\n").unwrap();

    let has_errors = check_command(&input, OutputFormat::Text, false, &settings).unwrap();
    assert!(has_errors);
}

#[test]
fn test_preprocess_writes_out_dir() {
    let dir = book();
    let out = reviewext(dir.path(), &["preprocess", "chapters/*.re", "--stats"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let converted = fs::read_to_string(dir.path().join(".out/chapters/legacy.re")).unwrap();
    assert!(converted.contains("@<strong>{bold}"));
    assert!(converted.contains("//list[][Sample][ruby]{"));
    assert!(converted.contains("//list[][コマンド][fontsize=small]{"));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Files processed: 1"));
    assert!(stdout.contains("Total replacements: 3"));

    // Sources are left untouched
    assert_eq!(
        fs::read_to_string(dir.path().join("chapters/legacy.re")).unwrap(),
        LEGACY
    );
}

#[test]
fn test_preprocess_dry_run() {
    let dir = book();
    let out = reviewext(dir.path(), &["preprocess", "**/*.re", "--dry-run", "-o", "build"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[DRY RUN] Would process: chapters/legacy.re"));
    assert!(stdout.contains("[DRY RUN] No files were modified."));
    assert!(!dir.path().join("build").exists());
}

#[test]
fn test_preprocess_expands_mapfile() {
    let dir = book();
    let out = reviewext(dir.path(), &["preprocess", "modern.re", "--mapfile"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let converted = fs::read_to_string(dir.path().join(".out/modern.re")).unwrap();
    assert!(converted.contains("#@mapfile(code/main.rb)\ndef main\n"));
}

#[test]
fn test_preprocess_list_options() {
    let dir = tempfile::tempdir().unwrap();
    let out = reviewext(dir.path(), &["preprocess", "--list-options"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Available List Options:"));
    assert!(stdout.contains("lineno=on|off|<number>"));
    assert!(stdout.contains("Conversion Rules:"));
}
