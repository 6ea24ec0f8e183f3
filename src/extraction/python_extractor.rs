/// Tree-sitter based Python import extractor.
///
/// Parses a Python source file and emits every module reference made by its
/// `import` and `from ... import` statements, in source order.
use tree_sitter::{Node as TsNode, Parser, Tree};

use crate::errors::{InspectError, Result};
use crate::types::RawImport;

/// Extracts raw import references from Python source using tree-sitter.
pub struct PythonExtractor;

/// Internal state used during AST traversal.
struct ExtractionState<'s> {
    imports: Vec<RawImport>,
    file_path: String,
    source: &'s [u8],
}

impl<'s> ExtractionState<'s> {
    fn new(file_path: &str, source: &'s str) -> Self {
        Self {
            imports: Vec::new(),
            file_path: file_path.to_string(),
            source: source.as_bytes(),
        }
    }

    /// Gets the text of a tree-sitter node from the source.
    fn node_text(&self, node: TsNode<'_>) -> Result<&'s str> {
        node.utf8_text(self.source)
            .map_err(|_| self.parse_error(node, "invalid utf-8 in import statement"))
    }

    fn parse_error(&self, node: TsNode<'_>, message: impl Into<String>) -> InspectError {
        InspectError::Parse {
            message: message.into(),
            path: self.file_path.clone(),
            line: Some(line_of(node)),
        }
    }

    fn push(&mut self, name: String, node: TsNode<'_>) {
        self.imports.push(RawImport {
            name,
            line: line_of(node),
        });
    }
}

fn line_of(node: TsNode<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

impl PythonExtractor {
    /// Extract every import reference from a Python source file.
    ///
    /// `file_path` is only used in error messages. A file with syntax
    /// errors, or an import whose name is not a well-formed dotted name,
    /// fails the whole extraction.
    pub fn extract(file_path: &str, source: &str) -> Result<Vec<RawImport>> {
        let tree = Self::parse_source(file_path, source)?;
        let root = tree.root_node();

        let mut state = ExtractionState::new(file_path, source);
        if root.has_error() {
            let culprit = first_error(root).unwrap_or(root);
            return Err(state.parse_error(culprit, "syntax error"));
        }

        Self::visit_children(&mut state, root)?;
        Ok(state.imports)
    }

    /// Parse source code into a tree-sitter AST.
    fn parse_source(file_path: &str, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE;
        parser
            .set_language(&language.into())
            .map_err(|e| InspectError::Parse {
                message: format!("failed to load Python grammar: {e}"),
                path: file_path.to_string(),
                line: None,
            })?;
        parser
            .parse(source, None)
            .ok_or_else(|| InspectError::Parse {
                message: "tree-sitter parse returned None".to_string(),
                path: file_path.to_string(),
                line: None,
            })
    }

    /// Visit all children of a node.
    fn visit_children(state: &mut ExtractionState<'_>, node: TsNode<'_>) -> Result<()> {
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                Self::visit_node(state, child)?;
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Visit a single AST node, dispatching on its type.
    fn visit_node(state: &mut ExtractionState<'_>, node: TsNode<'_>) -> Result<()> {
        match node.kind() {
            "import_statement" => Self::visit_import(state, node),
            "import_from_statement" => Self::visit_import_from(state, node),
            "future_import_statement" => {
                state.push("__future__".to_string(), node);
                Ok(())
            }
            // Imports can appear anywhere a statement can, so keep descending.
            _ => Self::visit_children(state, node),
        }
    }

    /// `import a.b, c as d`: one reference per imported name.
    fn visit_import(state: &mut ExtractionState<'_>, node: TsNode<'_>) -> Result<()> {
        let mut cursor = node.walk();
        let names: Vec<TsNode<'_>> = node.children_by_field_name("name", &mut cursor).collect();
        if names.is_empty() {
            return Err(state.parse_error(node, "import statement without a module name"));
        }

        for name_node in names {
            let dotted = match name_node.kind() {
                "dotted_name" => name_node,
                "aliased_import" => name_node
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "dotted_name")
                    .ok_or_else(|| state.parse_error(name_node, "not an aliased module name"))?,
                other => {
                    return Err(state.parse_error(
                        name_node,
                        format!("unexpected '{other}' in import statement"),
                    ))
                }
            };
            let name = Self::dotted_name(state, dotted)?;
            state.push(name, node);
        }
        Ok(())
    }

    /// `from x.y import z` and `from ..x import z`: one reference for the
    /// module part. Relative references keep their leading dots.
    fn visit_import_from(state: &mut ExtractionState<'_>, node: TsNode<'_>) -> Result<()> {
        let module = node
            .child_by_field_name("module_name")
            .ok_or_else(|| state.parse_error(node, "from-import without a module name"))?;

        let name = match module.kind() {
            "dotted_name" => Self::dotted_name(state, module)?,
            "relative_import" => Self::relative_name(state, module)?,
            other => {
                return Err(state.parse_error(
                    module,
                    format!("unexpected '{other}' in from-import statement"),
                ))
            }
        };
        state.push(name, node);
        Ok(())
    }

    /// Joins the identifiers of a `dotted_name`, ignoring any whitespace
    /// the source placed around the dots.
    fn dotted_name(state: &ExtractionState<'_>, node: TsNode<'_>) -> Result<String> {
        let mut parts = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "identifier" => parts.push(state.node_text(child)?),
                "comment" => {}
                other => {
                    return Err(
                        state.parse_error(child, format!("'{other}' is not a name token"))
                    )
                }
            }
        }
        if parts.is_empty() {
            return Err(state.parse_error(node, "empty module name"));
        }
        Ok(parts.join("."))
    }

    /// Renders a `relative_import` as dots followed by the optional module.
    fn relative_name(state: &ExtractionState<'_>, node: TsNode<'_>) -> Result<String> {
        let mut name = String::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import_prefix" => {
                    let dots = state.node_text(child)?;
                    name.extend(dots.chars().filter(|c| *c == '.'));
                }
                "dotted_name" => name.push_str(&Self::dotted_name(state, child)?),
                _ => {}
            }
        }
        if !name.starts_with('.') {
            return Err(state.parse_error(node, "relative import without a prefix"));
        }
        Ok(name)
    }
}

/// Finds the first error or missing node in pre-order.
fn first_error(node: TsNode<'_>) -> Option<TsNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<TsNode<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error)
}
