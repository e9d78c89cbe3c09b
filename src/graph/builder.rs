use std::collections::{HashMap, HashSet};

use tracing::debug;
use tree_sitter::{Node as TsNode, Parser, Tree};

use crate::types::{AstSummary, Declaration, SourceUnit};

/// Language tag of units that participate in graph construction.
pub const GRAPH_LANGUAGE: &str = "go";

/// Declaration index and caller→callee call graph built from Go units.
///
/// Callee names are recorded exactly as written at the call site and may not
/// correspond to any declaration (external or built-in calls); lookups that
/// miss simply terminate that branch. Declaration keys are assumed unique:
/// a colliding key overwrites the earlier entry without diagnostic.
#[derive(Debug, Default)]
pub struct SymbolGraph {
    decls: HashMap<String, Declaration>,
    calls: HashMap<String, HashSet<String>>,
}

impl SymbolGraph {
    /// Builds the graph from every unit tagged as the analyzed language.
    ///
    /// A unit that fails to parse is excluded from the graph entirely; it
    /// stays in the corpus with baseline weight. This never returns an error.
    pub fn build(units: &[SourceUnit]) -> SymbolGraph {
        let mut graph = SymbolGraph::default();
        for unit in units.iter().filter(|u| u.language == GRAPH_LANGUAGE) {
            graph.add_unit(unit);
        }
        graph
    }

    /// Returns the declaration recorded under the exact qualified key.
    pub fn declaration(&self, key: &str) -> Option<&Declaration> {
        self.decls.get(key)
    }

    /// Returns the callee names recorded for a declaration key.
    pub fn callees(&self, key: &str) -> Option<&HashSet<String>> {
        self.calls.get(key)
    }

    /// Iterates over all (caller, callees) entries.
    pub fn calls(&self) -> impl Iterator<Item = (&String, &HashSet<String>)> {
        self.calls.iter()
    }

    /// Number of declarations in the index.
    pub fn declaration_count(&self) -> usize {
        self.decls.len()
    }

    /// Finds declaration keys matching a candidate name.
    ///
    /// A candidate matches a key on exact equality, when the key ends with
    /// the candidate, or when the key ends with `"." + candidate` — so a
    /// bare name matches both a free function and any method of that name.
    pub fn matching_keys(&self, candidate: &str) -> Vec<&str> {
        let dotted = format!(".{candidate}");
        self.decls
            .keys()
            .filter(|key| {
                key.as_str() == candidate || key.ends_with(candidate) || key.ends_with(&dotted)
            })
            .map(String::as_str)
            .collect()
    }

    fn add_unit(&mut self, unit: &SourceUnit) {
        let Some(tree) = parse_go(&unit.content) else {
            debug!(path = %unit.path, "parse failed, unit excluded from graph");
            return;
        };
        let source = unit.content.as_bytes();
        let root = tree.root_node();

        // Pass 1: top-level function and method declarations.
        let mut unit_decls: Vec<Declaration> = Vec::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            let key = match child.kind() {
                "function_declaration" => function_key(child, source),
                "method_declaration" => method_key(child, source),
                _ => None,
            };
            if let Some(key) = key {
                unit_decls.push(Declaration {
                    key,
                    path: unit.path.clone(),
                    start: child.start_byte(),
                    end: child.end_byte(),
                });
            }
        }

        // Pass 2: call sites anywhere in the file, attributed to the
        // enclosing top-level declaration by byte position. Calls inside
        // function literals land on the enclosing top-level declaration;
        // calls outside any declaration are dropped.
        let mut sites: Vec<(usize, String)> = Vec::new();
        collect_call_sites(root, source, &mut sites);
        for (offset, callee) in sites {
            if let Some(decl) = unit_decls.iter().find(|d| d.contains(offset)) {
                self.calls
                    .entry(decl.key.clone())
                    .or_default()
                    .insert(callee);
            }
        }

        for decl in unit_decls {
            self.decls.insert(decl.key.clone(), decl);
        }
    }
}

/// Extracts a lightweight structural summary from Go source.
///
/// Returns `None` when the source cannot be parsed, keeping the extraction
/// pipeline resilient.
pub fn summarize(source: &str) -> Option<AstSummary> {
    let tree = parse_go(source)?;
    let bytes = source.as_bytes();
    let root = tree.root_node();
    let mut summary = AstSummary::default();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "package_clause" => {
                if let Some(name) = find_child_by_kind(child, "package_identifier") {
                    summary.package = node_text(name, bytes);
                }
            }
            "import_declaration" => collect_imports(child, bytes, &mut summary.imports),
            "type_declaration" => collect_struct_names(child, bytes, &mut summary.structs),
            "function_declaration" => {
                if let Some(name) = child.child_by_field_name("name") {
                    summary.functions.push(node_text(name, bytes));
                }
            }
            "method_declaration" => {
                if let (Some(recv), Some(name)) =
                    (receiver_type_text(child, bytes), child.child_by_field_name("name"))
                {
                    summary
                        .functions
                        .push(format!("({}).{}", recv, node_text(name, bytes)));
                }
            }
            _ => {}
        }
    }

    Some(summary)
}

/// Parses Go source into a tree-sitter AST, or `None` on failure.
fn parse_go(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    let language = tree_sitter_go::LANGUAGE;
    parser.set_language(&language.into()).ok()?;
    parser.parse(source, None)
}

/// Key for a free function: the bare identifier.
fn function_key(node: TsNode<'_>, source: &[u8]) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| node_text(n, source))
}

/// Key for a method: `<receiver-type-text>.<name>`, with the receiver type
/// rendered as plain source text (e.g. `*Circle.Area`).
fn method_key(node: TsNode<'_>, source: &[u8]) -> Option<String> {
    let name = node.child_by_field_name("name")?;
    let recv = receiver_type_text(node, source)?;
    Some(format!("{}.{}", recv, node_text(name, source)))
}

/// Returns the literal receiver type text of a method declaration.
fn receiver_type_text(node: TsNode<'_>, source: &[u8]) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let param = find_child_by_kind(receiver, "parameter_declaration")?;
    let ty = param.child_by_field_name("type")?;
    Some(node_text(ty, source))
}

/// Recursively collects `(byte offset, callee name)` for every call
/// expression under `node`.
///
/// Two call shapes yield a callee: a bare identifier, and a member access
/// whose left side is itself a simple identifier (`left.member`); a member
/// access on any other expression yields the member name alone. Other
/// shapes yield nothing.
fn collect_call_sites(node: TsNode<'_>, source: &[u8], out: &mut Vec<(usize, String)>) {
    if node.kind() == "call_expression" {
        if let Some(callee) = node
            .child_by_field_name("function")
            .and_then(|f| callee_name(f, source))
        {
            out.push((node.start_byte(), callee));
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_call_sites(child, source, out);
    }
}

fn callee_name(function: TsNode<'_>, source: &[u8]) -> Option<String> {
    match function.kind() {
        "identifier" => Some(node_text(function, source)),
        "selector_expression" => {
            let field = function.child_by_field_name("field")?;
            let member = node_text(field, source);
            let operand = function.child_by_field_name("operand")?;
            if operand.kind() == "identifier" {
                Some(format!("{}.{}", node_text(operand, source), member))
            } else {
                Some(member)
            }
        }
        _ => None,
    }
}

fn collect_imports(node: TsNode<'_>, source: &[u8], out: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_spec" => push_import(child, source, out),
            "import_spec_list" => {
                let mut inner = child.walk();
                for spec in child.children(&mut inner) {
                    if spec.kind() == "import_spec" {
                        push_import(spec, source, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_import(spec: TsNode<'_>, source: &[u8], out: &mut Vec<String>) {
    let text = node_text(spec, source);
    out.push(text.trim().trim_matches('"').to_string());
}

fn collect_struct_names(node: TsNode<'_>, source: &[u8], out: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "type_spec" {
            continue;
        }
        if find_child_by_kind(child, "struct_type").is_some() {
            if let Some(name) = child.child_by_field_name("name") {
                out.push(node_text(name, source));
            }
        }
    }
}

fn find_child_by_kind<'a>(node: TsNode<'a>, kind: &str) -> Option<TsNode<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn node_text(node: TsNode<'_>, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or_default().to_string()
}
