use std::fs;
use std::path::{Path, PathBuf};

use importgraph::config::{save_config, InspectConfig};
use importgraph::errors::InspectError;
use importgraph::extraction::PythonExtractor;
use importgraph::inspector::ImportInspector;
use importgraph::report::{format_registry_as_json, format_report_as_text};
use importgraph::resolution::environment::discover_interpreter;
use importgraph::types::{ImportKind, Resolution};
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Config that ignores the environment, so tests only see what they build.
fn hermetic_config(search_paths: Vec<String>) -> InspectConfig {
    InspectConfig {
        use_pythonpath: false,
        discover_python: false,
        search_paths,
        ..InspectConfig::default()
    }
}

fn canonical_tempdir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let root = fs::canonicalize(dir.path()).unwrap();
    (dir, root)
}

#[test]
fn test_two_file_scenario() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("a.py"), "import b\nimport missing_mod\n");
    write(&root.join("b.py"), "");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    let result = inspector.analyze().unwrap();
    let registry = &result.registry;

    assert_eq!(registry.len(), 2);
    let a = registry.get(&root.join("a.py")).unwrap();
    let b = registry.get(&root.join("b.py")).unwrap();
    assert_eq!(a.local_imports, vec![root.join("b.py")]);
    assert_eq!(a.missing_imports, vec!["missing_mod"]);
    assert!(a.imported_by_local.is_empty());
    assert_eq!(b.imported_by_local, vec![root.join("a.py")]);

    assert_eq!(
        format_report_as_text(registry, &root),
        "a.py: not imported\na.py: missing imports: ['missing_mod']\n"
    );

    assert_eq!(result.stats.file_count, 2);
    assert_eq!(result.stats.module_count, 2);
    assert_eq!(result.stats.reference_count, 2);
    assert_eq!(result.stats.local, 1);
    assert_eq!(result.stats.missing, 1);
}

#[test]
fn test_bucket_totals_equal_extracted_references() {
    let (_dir, root) = canonical_tempdir();
    let (_site_dir, site) = canonical_tempdir();
    write(&site.join("requests/__init__.py"), "");
    write(
        &root.join("app/main.py"),
        "import sys\nimport requests\nfrom . import helpers\nfrom .helpers import x\nimport nowhere\nimport shared\n",
    );
    write(&root.join("app/__init__.py"), "");
    write(&root.join("app/helpers.py"), "import os.path\n");
    write(&root.join("shared/part.py"), "");

    let config = hermetic_config(vec![site.to_string_lossy().to_string()]);
    let inspector = ImportInspector::with_config(&root, config).unwrap();
    let result = inspector.analyze().unwrap();

    let mut extracted = 0;
    for file in inspector.scan_files().unwrap() {
        let source = fs::read_to_string(&file).unwrap();
        extracted += PythonExtractor::extract("f.py", &source).unwrap().len();
    }

    assert_eq!(result.registry.total_references(), extracted);
    assert_eq!(result.stats.reference_count, extracted);
    let by_kind: usize = ImportKind::ALL
        .iter()
        .map(|k| result.stats.of_kind(*k))
        .sum();
    assert_eq!(by_kind, extracted);
}

#[test]
fn test_third_party_creates_no_record() {
    let (_dir, root) = canonical_tempdir();
    let (_site_dir, site) = canonical_tempdir();
    write(&site.join("requests/__init__.py"), "");
    write(&root.join("main.py"), "import requests\n");

    let config = hermetic_config(vec![site.to_string_lossy().to_string()]);
    let inspector = ImportInspector::with_config(&root, config).unwrap();
    let result = inspector.analyze().unwrap();

    assert_eq!(result.registry.len(), 1);
    let main = result.registry.get(&root.join("main.py")).unwrap();
    assert_eq!(main.third_party_imports, vec!["requests"]);
    assert!(main.local_imports.is_empty());
    assert!(!result
        .registry
        .contains(&site.join("requests/__init__.py")));
}

#[test]
fn test_default_config_finds_stdlib_through_interpreter() {
    if discover_interpreter().is_none() {
        eprintln!("no Python interpreter on this machine, skipping");
        return;
    }
    let (_dir, root) = canonical_tempdir();
    write(&root.join("a.py"), "import os\nimport json\n");

    let config = InspectConfig {
        use_pythonpath: false,
        ..InspectConfig::default()
    };
    let inspector = ImportInspector::with_config(&root, config).unwrap();
    let result = inspector.analyze().unwrap();

    let a = result.registry.get(&root.join("a.py")).unwrap();
    assert!(a.missing_imports.is_empty(), "missing: {:?}", a.missing_imports);
    assert!(matches!(
        inspector.resolve(Path::new("a.py"), "os").unwrap(),
        Resolution::ThirdParty(_)
    ));
}

#[test]
fn test_namespace_import_is_reported() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("main.py"), "import plugins\n");
    write(&root.join("plugins/extra.py"), "");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    let result = inspector.analyze().unwrap();

    let main = result.registry.get(&root.join("main.py")).unwrap();
    assert_eq!(main.namespaced_imports, vec!["plugins"]);
    assert!(main.unknown_imports.is_empty());

    let report = format_report_as_text(&result.registry, &root);
    assert!(report.contains("main.py: namespaced imports: ['plugins']\n"));
}

#[test]
fn test_builtin_import_is_unknown() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("main.py"), "import sys\n");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    let result = inspector.analyze().unwrap();

    let report = format_report_as_text(&result.registry, &root);
    assert_eq!(
        report,
        "main.py: not imported\nmain.py: unknown imports: ['sys']\n"
    );
}

#[test]
fn test_target_outside_scan_set_gets_record() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("main.py"), "import compiled\n");
    write(&root.join("compiled.so"), "");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    let result = inspector.analyze().unwrap();

    let target = root.join("compiled.so");
    let record = result.registry.get(&target).unwrap();
    assert_eq!(record.imported_by_local, vec![root.join("main.py")]);
    assert_eq!(result.stats.file_count, 1);
    assert_eq!(result.stats.module_count, 2);
}

#[test]
fn test_report_is_deterministic() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("z.py"), "import a\nimport gone\n");
    write(&root.join("a.py"), "from pkg import thing\n");
    write(&root.join("pkg/__init__.py"), "import pkg.mod\n");
    write(&root.join("pkg/mod.py"), "from . import missing_sibling\n");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    let first = inspector.analyze().unwrap();
    let second = inspector.analyze().unwrap();

    assert_eq!(
        format_report_as_text(&first.registry, &root),
        format_report_as_text(&second.registry, &root)
    );
    assert_eq!(
        format_registry_as_json(&first.registry, &root),
        format_registry_as_json(&second.registry, &root)
    );
}

#[test]
fn test_files_are_scanned_in_name_order() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("b.py"), "");
    write(&root.join("a.py"), "");
    write(&root.join("pkg/c.py"), "");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    let files = inspector.scan_files().unwrap();
    assert_eq!(
        files,
        vec![root.join("a.py"), root.join("b.py"), root.join("pkg/c.py")]
    );
}

#[test]
fn test_scan_respects_excludes_and_hidden_dirs() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("main.py"), "");
    write(&root.join(".venv/lib/site.py"), "");
    write(&root.join("build/gen.py"), "");
    write(&root.join("pkg/__pycache__/cached.py"), "");
    write(&root.join("notes.txt"), "import nothing");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    assert_eq!(inspector.scan_files().unwrap(), vec![root.join("main.py")]);
}

#[test]
fn test_scan_skips_files_over_size_limit() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("small.py"), "import os\n");
    write(&root.join("large.py"), &"x = 1\n".repeat(100));

    let config = InspectConfig {
        max_file_size: 50,
        ..hermetic_config(vec![])
    };
    let inspector = ImportInspector::with_config(&root, config).unwrap();
    assert_eq!(inspector.scan_files().unwrap(), vec![root.join("small.py")]);
}

#[test]
fn test_parse_failure_aborts_run() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("good.py"), "import os\n");
    write(&root.join("broken.py"), "def oops(:\n");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    assert!(matches!(
        inspector.analyze(),
        Err(InspectError::Parse { .. })
    ));
}

#[test]
fn test_relative_import_beyond_top_level_aborts_run() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("top.py"), "from . import sibling\n");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    assert!(matches!(
        inspector.analyze(),
        Err(InspectError::Lookup { .. })
    ));
}

#[test]
fn test_resolve_single_reference() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("pkg/__init__.py"), "");
    write(&root.join("pkg/a.py"), "");
    write(&root.join("pkg/b.py"), "");

    let inspector = ImportInspector::with_config(&root, hermetic_config(vec![])).unwrap();
    assert_eq!(
        inspector.resolve(Path::new("pkg/a.py"), ".b").unwrap(),
        Resolution::Local(root.join("pkg/b.py"))
    );
    assert_eq!(
        inspector.resolve(Path::new("pkg/a.py"), "zzz").unwrap(),
        Resolution::Missing
    );
}

#[test]
fn test_open_uses_saved_config() {
    let (_dir, root) = canonical_tempdir();
    write(&root.join("main.py"), "import vendored\n");
    write(&root.join("third_party/vendored.py"), "");

    let config = InspectConfig {
        exclude: vec!["third_party/**".to_string()],
        ..hermetic_config(vec!["third_party".to_string()])
    };
    save_config(&root, &config).unwrap();

    let inspector = ImportInspector::open(&root).unwrap();
    assert_eq!(inspector.config(), &config);
    let result = inspector.analyze().unwrap();

    // third_party/ is under the root, so the import is still local.
    let main = result.registry.get(&root.join("main.py")).unwrap();
    assert_eq!(main.local_imports, vec![root.join("third_party/vendored.py")]);
    assert_eq!(result.stats.file_count, 1);
}

#[test]
fn test_missing_root_is_file_error() {
    let (_dir, root) = canonical_tempdir();
    let result = ImportInspector::with_config(&root.join("nope"), hermetic_config(vec![]));
    assert!(matches!(result, Err(InspectError::File { .. })));
}
