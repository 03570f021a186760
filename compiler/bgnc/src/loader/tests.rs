use super::*;
use bgn_ir::AstBuilder;
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

/// Write an empty program's JSON AST to `path`.
fn write_program(path: &Path) {
    let (ast, root) = AstBuilder::new().finish();
    let text = interchange::encode(&ast, root, &[]).unwrap();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn canonical(path: &Path) -> String {
    fs::canonicalize(path).unwrap().to_string_lossy().into_owned()
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn import_is_found_next_to_the_importer() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("common.json");
    write_program(&target);
    let importer = dir.path().join("main.json");
    let mut loader = FsLoader::default();
    let found = loader
        .canonicalize("common.json", importer.to_str())
        .unwrap();
    assert_eq!(found, canonical(&target));
}

#[test]
fn source_name_finds_its_ast() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("common.bgn.json");
    write_program(&target);
    let importer = dir.path().join("main.json");
    let mut loader = FsLoader::default();
    let found = loader.canonicalize("common.bgn", importer.to_str()).unwrap();
    assert_eq!(found, canonical(&target));
}

#[test]
fn search_paths_are_tried_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    write_program(&second.join("lib.json"));
    write_program(&first.join("lib.json"));
    let importer = dir.path().join("app").join("main.json");
    let mut loader = FsLoader::new(vec![first.clone(), second]);
    let found = loader.canonicalize("lib.json", importer.to_str()).unwrap();
    assert_eq!(found, canonical(&first.join("lib.json")));
}

#[test]
fn missing_import_cannot_be_opened() {
    let dir = tempfile::tempdir().unwrap();
    let importer = dir.path().join("main.json");
    let mut loader = FsLoader::default();
    let err = loader.canonicalize("nope.json", importer.to_str()).unwrap_err();
    assert!(matches!(err, ImportError::Open { ref path, .. } if path == "nope.json"));
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn load_decodes_the_program() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("common.json");
    write_program(&target);
    let mut loader = FsLoader::default();
    let (ast, root) = loader.load(&canonical(&target)).unwrap();
    assert!(ast.is::<bgn_ir::Program>(root));
}

#[test]
fn malformed_ast_cannot_be_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("broken.json");
    fs::write(&target, "{\"node\": 3}").unwrap();
    let mut loader = FsLoader::default();
    let err = loader.load(&canonical(&target)).unwrap_err();
    assert!(matches!(err, ImportError::Parse { .. }));
}
