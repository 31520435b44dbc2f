//! Structural view of a pytest/Playwright artifact.
//!
//! Everything here is owned data extracted from the syntax tree, so rules
//! never touch the parser and the structure can be shared across threads.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
/// Literal value of a call argument, when the argument is a plain literal.
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Keyword name for `name=value` arguments.
    pub keyword: Option<String>,
    pub text: String,
    pub literal: Option<Literal>,
}

impl Argument {
    pub fn as_str(&self) -> Option<&str> {
        match &self.literal {
            Some(Literal::Str(s)) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    /// Source text of the called expression, whitespace collapsed.
    pub callee: String,
    /// Last segment: attribute name or bare function name.
    pub method: String,
    /// Leftmost identifier of the receiver chain (`page` in `page.locator(..).click`).
    pub receiver_root: Option<String>,
    /// True when the chain starts with an `expect(...)` call.
    pub from_expect: bool,
    pub args: Vec<Argument>,
    pub function: Option<String>,
    pub line: usize,
}

impl CallSite {
    pub fn positional(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter().filter(|a| a.keyword.is_none())
    }

    pub fn is_bare(&self) -> bool {
        self.receiver_root.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    /// Dotted name, e.g. `pytest.fixture` or `pytest.mark.parametrize`.
    pub name: String,
    pub args: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub class_name: Option<String>,
    pub params: Vec<String>,
    pub decorators: Vec<Decorator>,
    /// Defined inside another function's body (directly or via a local class).
    pub nested: bool,
    pub line: usize,
}

impl FunctionDef {
    /// pytest collects module-level `test*` functions and `test*` methods of
    /// module-level `Test*` classes.
    pub fn is_test(&self) -> bool {
        if self.nested || !self.name.starts_with("test") {
            return false;
        }
        match &self.class_name {
            Some(c) => c.starts_with("Test"),
            None => true,
        }
    }

    pub fn fixture_decorator(&self) -> Option<&Decorator> {
        self.decorators
            .iter()
            .find(|d| d.name == "pytest.fixture" || d.name == "fixture")
    }

    pub fn is_fixture(&self) -> bool {
        self.fixture_decorator().is_some()
    }

    /// Name under which a fixture is requested (`name=` overrides the def name).
    pub fn fixture_name(&self) -> Option<&str> {
        let d = self.fixture_decorator()?;
        let renamed = d
            .args
            .iter()
            .find(|a| a.keyword.as_deref() == Some("name"))
            .and_then(Argument::as_str);
        Some(renamed.unwrap_or(&self.name))
    }

    pub fn is_autouse(&self) -> bool {
        self.fixture_decorator().map_or(false, |d| {
            d.args
                .iter()
                .any(|a| a.keyword.as_deref() == Some("autouse") && a.text == "True")
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Name bound in the module namespace.
    pub name: String,
    /// Imported name before any `as` alias (`sleep` for `from time import sleep as pause`).
    pub original: String,
    /// Source module (`time` for `from time import sleep`, `os.path` for `import os.path`).
    pub module: String,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TestStructure {
    pub imports: Vec<Import>,
    pub functions: Vec<FunctionDef>,
    pub calls: Vec<CallSite>,
    /// Lines of `assert` statements.
    pub asserts: Vec<usize>,
    /// Identifiers read anywhere outside import statements and definition names.
    pub references: BTreeSet<String>,
    /// Set when the adapter could not produce a real parse.
    pub degraded: bool,
}

impl TestStructure {
    pub fn degraded() -> Self {
        TestStructure {
            degraded: true,
            ..Default::default()
        }
    }

    pub fn tests(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.iter().filter(|f| f.is_test())
    }

    pub fn fixtures(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.iter().filter(|f| f.is_fixture())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f.name == name)
    }

    pub fn is_imported(&self, name: &str) -> bool {
        self.imports.iter().any(|i| i.name == name)
    }

    /// Import that binds `name`, if any.
    pub fn import_of(&self, name: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.name == name)
    }

    /// Module a bare name was imported from, if any.
    pub fn import_source(&self, name: &str) -> Option<&str> {
        self.import_of(name).map(|i| i.module.as_str())
    }
}
