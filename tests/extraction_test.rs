use importgraph::errors::InspectError;
use importgraph::extraction::{is_source_file, PythonExtractor};
use importgraph::types::RawImport;
use std::path::Path;

fn names(source: &str) -> Vec<String> {
    PythonExtractor::extract("src/mod.py", source)
        .expect("extraction should succeed")
        .into_iter()
        .map(|i| i.name)
        .collect()
}

#[test]
fn test_extract_plain_imports() {
    let source = r#"
import os
import os.path, json
"#;
    assert_eq!(names(source), vec!["os", "os.path", "json"]);
}

#[test]
fn test_extract_aliased_imports() {
    let source = "import numpy as np, pandas.io as pio\n";
    assert_eq!(names(source), vec!["numpy", "pandas.io"]);
}

#[test]
fn test_extract_from_imports() {
    let source = r#"
from collections import OrderedDict
from a.b.c import d as e, f
from pkg import *
"#;
    assert_eq!(names(source), vec!["collections", "a.b.c", "pkg"]);
}

#[test]
fn test_extract_relative_imports() {
    let source = r#"
from . import sibling
from .models import User
from ...core.base import Base
"#;
    assert_eq!(names(source), vec![".", ".models", "...core.base"]);
}

#[test]
fn test_extract_future_import() {
    let source = "from __future__ import annotations\nimport sys\n";
    assert_eq!(names(source), vec!["__future__", "sys"]);
}

#[test]
fn test_extract_nested_imports_in_source_order() {
    let source = r#"
import first

def load():
    import inside_function
    if True:
        from inside_if import thing

class Plugin:
    import inside_class

try:
    import optional_dep
except ImportError:
    optional_dep = None
"#;
    assert_eq!(
        names(source),
        vec![
            "first",
            "inside_function",
            "inside_if",
            "inside_class",
            "optional_dep"
        ]
    );
}

#[test]
fn test_extract_records_lines() {
    let source = "import a\n\n\nfrom b import c\n";
    let imports = PythonExtractor::extract("x.py", source).unwrap();
    assert_eq!(
        imports,
        vec![
            RawImport {
                name: "a".to_string(),
                line: 1
            },
            RawImport {
                name: "b".to_string(),
                line: 4
            },
        ]
    );
    assert!(!imports[0].is_relative());
}

#[test]
fn test_extract_ignores_strings_and_comments() {
    let source = r#"
# import commented_out
text = "import not_code"
"#;
    assert!(names(source).is_empty());
}

#[test]
fn test_extract_syntax_error_is_parse_error() {
    let result = PythonExtractor::extract("broken.py", "import os\nclass :\n    pass\n");
    match result {
        Err(InspectError::Parse { path, .. }) => assert_eq!(path, "broken.py"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_empty_file_has_no_imports() {
    assert!(names("").is_empty());
}

#[test]
fn test_is_source_file() {
    assert!(is_source_file(Path::new("pkg/mod.py")));
    assert!(!is_source_file(Path::new("pkg/mod.pyc")));
    assert!(!is_source_file(Path::new("README.md")));
}
