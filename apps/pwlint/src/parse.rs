//! Structural adapter: turns artifact text into a `TestStructure`.
//!
//! The adapter never fails. Empty input and syntax errors are reported as a
//! single `Error` finding next to a degraded (empty) structure, so the rule
//! set can still run over it.
//!
//! The tree is walked iteratively; deeply nested input must not be able to
//! exhaust the stack.

use crate::models::structure::{
    Argument, CallSite, Decorator, FunctionDef, Import, Literal, TestStructure,
};
use crate::models::Finding;
use tracing::debug;
use tree_sitter::{Node, Parser};

pub const EMPTY_ARTIFACT: &str = "empty-artifact";
pub const PARSE_FAILURE: &str = "parse";

/// Adapter output: the structure plus any finding raised while building it.
pub struct Parsed {
    pub structure: TestStructure,
    pub findings: Vec<Finding>,
}

impl Parsed {
    fn failed(finding: Finding) -> Self {
        Parsed {
            structure: TestStructure::degraded(),
            findings: vec![finding],
        }
    }
}

/// Parse artifact text as a pytest/Playwright module.
pub fn parse_artifact(source: &str) -> Parsed {
    if source.trim().is_empty() {
        return Parsed::failed(Finding::error(
            EMPTY_ARTIFACT,
            "empty artifact: no test source was provided",
        ));
    }
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&tree_sitter_python::language()) {
        return Parsed::failed(Finding::error(
            PARSE_FAILURE,
            format!("syntax error: parser unavailable ({})", e),
        ));
    }
    let tree = match parser.parse(source, None) {
        Some(t) => t,
        None => {
            return Parsed::failed(Finding::error(
                PARSE_FAILURE,
                "syntax error: the artifact could not be parsed",
            ))
        }
    };
    let root = tree.root_node();
    if root.has_error() {
        return Parsed::failed(syntax_error(root));
    }

    let mut ex = Extractor {
        src: source.as_bytes(),
        classes: Vec::new(),
        out: TestStructure::default(),
    };
    ex.walk(root);
    debug!(
        functions = ex.out.functions.len(),
        calls = ex.out.calls.len(),
        imports = ex.out.imports.len(),
        "artifact parsed"
    );
    Parsed {
        structure: ex.out,
        findings: Vec::new(),
    }
}

fn syntax_error(root: Node) -> Finding {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            let what = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                "unexpected input".to_string()
            };
            return Finding::error(
                PARSE_FAILURE,
                format!("syntax error: {} at column {}", what, pos.column + 1),
            )
            .at_line(pos.row + 1);
        }
        for i in (0..node.child_count()).rev() {
            if let Some(c) = node.child(i) {
                if c.has_error() {
                    stack.push(c);
                }
            }
        }
    }
    Finding::error(PARSE_FAILURE, "syntax error: the artifact could not be parsed")
}

#[derive(Clone, Copy, Default)]
struct Ctx {
    class: Option<usize>,
    function: Option<usize>,
    /// Somewhere inside a function body, at any depth.
    nested: bool,
}

struct Extractor<'s> {
    src: &'s [u8],
    classes: Vec<String>,
    out: TestStructure,
}

impl<'s> Extractor<'s> {
    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.src).unwrap_or("")
    }

    fn walk(&mut self, root: Node) {
        let mut stack: Vec<(Node, Ctx)> = vec![(root, Ctx::default())];
        while let Some((node, ctx)) = stack.pop() {
            match node.kind() {
                "import_statement" => self.import(node),
                "import_from_statement" => self.import_from(node),
                "future_import_statement" | "comment" => {}
                "identifier" => {
                    let name = self.text(node).to_string();
                    self.out.references.insert(name);
                }
                "attribute" => {
                    if let Some(obj) = node.child_by_field_name("object") {
                        stack.push((obj, ctx));
                    }
                }
                "keyword_argument" => {
                    if let Some(v) = node.child_by_field_name("value") {
                        stack.push((v, ctx));
                    }
                }
                "assert_statement" => {
                    self.out.asserts.push(line(node));
                    push_children(&mut stack, node, ctx);
                }
                "call" => {
                    if let Some(call) = self.call_site(node, ctx) {
                        self.out.calls.push(call);
                    }
                    push_children(&mut stack, node, ctx);
                }
                "decorated_definition" => {
                    let decorators: Vec<Decorator> = named_children(node)
                        .into_iter()
                        .filter(|c| c.kind() == "decorator")
                        .filter_map(|d| self.decorator(d))
                        .collect();
                    if let Some(def) = node.child_by_field_name("definition") {
                        match def.kind() {
                            "function_definition" => {
                                self.function(def, ctx, decorators, &mut stack)
                            }
                            _ => stack.push((def, ctx)),
                        }
                    }
                    for c in named_children(node).into_iter().rev() {
                        if c.kind() == "decorator" {
                            stack.push((c, ctx));
                        }
                    }
                }
                "function_definition" => self.function(node, ctx, Vec::new(), &mut stack),
                "class_definition" => {
                    let name = node
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    self.classes.push(name);
                    let inner = Ctx {
                        class: Some(self.classes.len() - 1),
                        function: None,
                        nested: ctx.nested,
                    };
                    if let Some(body) = node.child_by_field_name("body") {
                        stack.push((body, inner));
                    }
                    if let Some(sup) = node.child_by_field_name("superclasses") {
                        stack.push((sup, ctx));
                    }
                }
                _ => push_children(&mut stack, node, ctx),
            }
        }
    }

    fn function<'t>(
        &mut self,
        node: Node<'t>,
        ctx: Ctx,
        decorators: Vec<Decorator>,
        stack: &mut Vec<(Node<'t>, Ctx)>,
    ) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let mut params = Vec::new();
        if let Some(ps) = node.child_by_field_name("parameters") {
            for p in named_children(ps) {
                match p.kind() {
                    "identifier" => params.push(self.text(p).to_string()),
                    "typed_parameter" => {
                        if let Some(id) = named_children(p)
                            .into_iter()
                            .find(|c| c.kind() == "identifier")
                        {
                            params.push(self.text(id).to_string());
                        }
                        if let Some(t) = p.child_by_field_name("type") {
                            stack.push((t, ctx));
                        }
                    }
                    // pytest never injects fixtures into defaulted parameters
                    "default_parameter" | "typed_default_parameter" => {
                        for field in ["type", "value"] {
                            if let Some(v) = p.child_by_field_name(field) {
                                stack.push((v, ctx));
                            }
                        }
                    }
                    // *args / **kwargs are never fixtures
                    _ => {}
                }
            }
        }
        params.retain(|p| p != "self" && p != "cls");
        if let Some(rt) = node.child_by_field_name("return_type") {
            stack.push((rt, ctx));
        }
        let class_name = if ctx.function.is_none() {
            ctx.class.map(|i| self.classes[i].clone())
        } else {
            None
        };
        self.out.functions.push(FunctionDef {
            name,
            class_name,
            params,
            decorators,
            nested: ctx.nested,
            line: line(node),
        });
        let inner = Ctx {
            class: ctx.class,
            function: Some(self.out.functions.len() - 1),
            nested: true,
        };
        if let Some(body) = node.child_by_field_name("body") {
            stack.push((body, inner));
        }
    }

    fn import(&mut self, node: Node) {
        for c in named_children(node) {
            let import = match c.kind() {
                "dotted_name" => {
                    let module = self.text(c).to_string();
                    let name = module.split('.').next().unwrap_or_default().to_string();
                    Import {
                        original: module.clone(),
                        name,
                        module,
                        line: line(c),
                    }
                }
                "aliased_import" => {
                    let module = c
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    let name = c
                        .child_by_field_name("alias")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_else(|| module.clone());
                    Import {
                        original: module.clone(),
                        name,
                        module,
                        line: line(c),
                    }
                }
                _ => continue,
            };
            self.out.imports.push(import);
        }
    }

    fn import_from(&mut self, node: Node) {
        let module_node = node.child_by_field_name("module_name");
        let module = module_node
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let module_id = module_node.map(|n| n.id());
        for c in named_children(node) {
            if Some(c.id()) == module_id {
                continue;
            }
            let (name, original) = match c.kind() {
                "dotted_name" => (self.text(c).to_string(), self.text(c).to_string()),
                "aliased_import" => {
                    let alias = match c.child_by_field_name("alias") {
                        Some(a) => self.text(a).to_string(),
                        None => continue,
                    };
                    let original = c
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_else(|| alias.clone());
                    (alias, original)
                }
                _ => continue,
            };
            self.out.imports.push(Import {
                name,
                original,
                module: module.clone(),
                line: line(c),
            });
        }
    }

    fn decorator(&self, node: Node) -> Option<Decorator> {
        let expr = node.named_child(0)?;
        if expr.kind() == "call" {
            let func = expr.child_by_field_name("function")?;
            Some(Decorator {
                name: collapse(self.text(func)),
                args: self.arguments(expr),
            })
        } else {
            Some(Decorator {
                name: collapse(self.text(expr)),
                args: Vec::new(),
            })
        }
    }

    fn call_site(&self, node: Node, ctx: Ctx) -> Option<CallSite> {
        let func = node.child_by_field_name("function")?;
        let callee = collapse(self.text(func));
        let (method, receiver_root, from_expect) = match func.kind() {
            "attribute" => {
                let attr = func.child_by_field_name("attribute")?;
                let obj = func.child_by_field_name("object")?;
                let (root, from_expect) = self.chain_root(obj);
                (self.text(attr).to_string(), root, from_expect)
            }
            "identifier" => (callee.clone(), None, false),
            _ => (callee.clone(), None, false),
        };
        let function = ctx
            .function
            .map(|i| self.out.functions[i].name.clone());
        Some(CallSite {
            callee,
            method,
            receiver_root,
            from_expect,
            args: self.arguments(node),
            function,
            line: line(node),
        })
    }

    /// Leftmost identifier of an attribute/call chain, and whether the chain
    /// starts at an `expect(...)` call.
    fn chain_root(&self, mut node: Node) -> (Option<String>, bool) {
        loop {
            match node.kind() {
                "identifier" => return (Some(self.text(node).to_string()), false),
                "attribute" => match node.child_by_field_name("object") {
                    Some(o) => node = o,
                    None => return (None, false),
                },
                "call" => match node.child_by_field_name("function") {
                    Some(f) if f.kind() == "identifier" && self.text(f) == "expect" => {
                        return (Some("expect".to_string()), true)
                    }
                    Some(f) => node = f,
                    None => return (None, false),
                },
                "subscript" => match node.child_by_field_name("value") {
                    Some(v) => node = v,
                    None => return (None, false),
                },
                "parenthesized_expression" | "await" => match node.named_child(0) {
                    Some(c) => node = c,
                    None => return (None, false),
                },
                _ => return (None, false),
            }
        }
    }

    fn arguments(&self, call: Node) -> Vec<Argument> {
        let args = match call.child_by_field_name("arguments") {
            Some(a) if a.kind() == "argument_list" => a,
            _ => return Vec::new(),
        };
        let mut out = Vec::new();
        for c in named_children(args) {
            match c.kind() {
                "comment" => {}
                "keyword_argument" => {
                    let keyword = c
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string());
                    let value = c.child_by_field_name("value");
                    out.push(Argument {
                        keyword,
                        text: value.map(|v| collapse(self.text(v))).unwrap_or_default(),
                        literal: value.and_then(|v| self.literal(v)),
                    });
                }
                _ => out.push(Argument {
                    keyword: None,
                    text: collapse(self.text(c)),
                    literal: self.literal(c),
                }),
            }
        }
        out
    }

    fn literal(&self, node: Node) -> Option<Literal> {
        let text = self.text(node);
        match node.kind() {
            "string" => {
                let interpolated = named_children(node)
                    .into_iter()
                    .any(|c| c.kind() == "interpolation");
                if interpolated {
                    None
                } else {
                    Some(Literal::Str(unquote(text).to_string()))
                }
            }
            "integer" | "float" | "unary_operator" => parse_number(text),
            _ => None,
        }
    }
}

fn push_children<'t>(stack: &mut Vec<(Node<'t>, Ctx)>, node: Node<'t>, ctx: Ctx) {
    for i in (0..node.child_count()).rev() {
        if let Some(c) = node.child(i) {
            stack.push((c, ctx));
        }
    }
}

fn named_children(node: Node) -> Vec<Node> {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .collect()
}

fn line(node: Node) -> usize {
    node.start_position().row + 1
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip string prefix letters and the surrounding quotes. Escapes are kept.
fn unquote(text: &str) -> &str {
    let body = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for q in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body.strip_prefix(q).and_then(|b| b.strip_suffix(q)) {
            return inner;
        }
    }
    body
}

fn parse_number(text: &str) -> Option<Literal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if let Ok(i) = cleaned.parse::<i64>() {
        return Some(Literal::Int(i));
    }
    cleaned.parse::<f64>().ok().map(Literal::Float)
}
