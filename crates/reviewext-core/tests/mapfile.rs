//! Integration tests for mapfile / maprange inclusion
//!
//! Builds small project trees in temporary directories.

use std::fs;
use std::path::Path;

use reviewext_core::config::MapfileSettings;
use reviewext_core::include::{expand, MapfileResolver, MAPOUTPUT_DISABLED};
use reviewext_core::MapfileError;
use tempfile::TempDir;

const SAMPLE_RB: &str = "\
require 'json'
# BEGIN-MAIN
def main
  puts 'hi'
end
# END-MAIN
main
";

/// Create a project with `code/sample.rb`
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("code")).unwrap();
    fs::write(dir.path().join("code/sample.rb"), SAMPLE_RB).unwrap();
    dir
}

fn resolver(root: &Path) -> MapfileResolver {
    MapfileResolver::new(root, MapfileSettings::default())
}

#[test]
fn test_mapfile_block_replaces_body() {
    let dir = project();
    let source = "before\n#@mapfile(code/sample.rb)\nstale content\n#@end\nafter\n";

    let out = expand(source, &resolver(dir.path())).unwrap();
    assert_eq!(
        out,
        format!("before\n#@mapfile(code/sample.rb)\n{}#@end\nafter\n", SAMPLE_RB)
    );
}

#[test]
fn test_maprange_inline() {
    let dir = project();
    let source = "//list[main][Main][lang=ruby]{\n//maprange(\"code/sample.rb\", BEGIN-MAIN, END-MAIN)\n//}\n";

    let out = expand(source, &resolver(dir.path())).unwrap();
    assert_eq!(
        out,
        "//list[main][Main][lang=ruby]{\ndef main\n  puts 'hi'\nend\n//}\n"
    );
}

#[test]
fn test_read_strips_bom() {
    let dir = project();
    fs::write(dir.path().join("bom.txt"), "\u{feff}hello\n").unwrap();

    let content = resolver(dir.path()).read("bom.txt").unwrap();
    assert_eq!(content, "hello\n");
}

#[test]
fn test_missing_file() {
    let dir = project();
    let err = resolver(dir.path()).read("code/missing.rb").unwrap_err();
    assert!(matches!(err, MapfileError::NotFound(_)));
}

#[test]
fn test_path_outside_project() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("book");
    fs::create_dir(&root).unwrap();
    fs::write(outer.path().join("secret.txt"), "token").unwrap();

    let err = resolver(&root).read("../secret.txt").unwrap_err();
    assert!(matches!(err, MapfileError::OutsideProject(_)));
}

#[test]
fn test_extension_not_allowed() {
    let dir = project();
    fs::write(dir.path().join("binary.exe"), "MZ").unwrap();
    fs::write(dir.path().join("Makefile"), "all:").unwrap();

    let resolver = resolver(dir.path());
    assert!(matches!(
        resolver.read("binary.exe"),
        Err(MapfileError::ExtensionNotAllowed(_))
    ));
    assert!(matches!(
        resolver.read("Makefile"),
        Err(MapfileError::ExtensionNotAllowed(_))
    ));
}

#[test]
fn test_extension_is_case_insensitive() {
    let dir = project();
    fs::write(dir.path().join("UPPER.RB"), "x = 1\n").unwrap();
    assert_eq!(resolver(dir.path()).read("UPPER.RB").unwrap(), "x = 1\n");
}

#[test]
fn test_file_too_large() {
    let dir = project();
    fs::write(dir.path().join("big.txt"), "a".repeat(64)).unwrap();
    let settings = MapfileSettings {
        max_file_size: 32,
        ..Default::default()
    };

    let err = MapfileResolver::new(dir.path(), settings)
        .read("big.txt")
        .unwrap_err();
    match err {
        MapfileError::TooLarge { size, limit, .. } => {
            assert_eq!(size, 64);
            assert_eq!(limit, 32);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_mapoutput_disabled() {
    let dir = project();
    let source = "#@mapoutput(rm -rf /)\n#@end\n";

    let out = expand(source, &resolver(dir.path())).unwrap();
    assert_eq!(out, format!("#@mapoutput(rm -rf /)\n{}\n#@end\n", MAPOUTPUT_DISABLED));
}

#[test]
fn test_unterminated_block_directive() {
    let dir = project();
    let err = expand("#@mapfile(code/sample.rb)\nbody\n", &resolver(dir.path())).unwrap_err();
    assert!(matches!(err, MapfileError::MalformedDirective { line: 1, .. }));
}

#[test]
fn test_project_root_above_base_dir() {
    let dir = project();
    let chapters = dir.path().join("chapters");
    fs::create_dir(&chapters).unwrap();

    let resolver = MapfileResolver::new(&chapters, MapfileSettings::default())
        .with_project_root(dir.path());
    let content = resolver
        .read_range("../code/sample.rb", Some("END-MAIN"), None)
        .unwrap();
    assert_eq!(content, "main\n");
}
