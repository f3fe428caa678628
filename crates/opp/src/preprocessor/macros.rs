//! Macro table and the symbol storage shared across includes

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Name of the predefined imaginary-unit macro
pub const IMAGINARY_UNIT_NAME: &str = "##i";
/// What `##i` renders as
pub const IMAGINARY_UNIT: &str = "1i";

/// A macro definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub body: String,
    /// Only expands when immediately followed by `(`; arguments are positional (`#0`, `#1`, ...)
    pub function_like: bool,
    /// Predefined macros survive `##-`
    pub predefined: bool,
}

impl Macro {
    pub fn object(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            function_like: false,
            predefined: false,
        }
    }

    pub fn function(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            function_like: true,
            ..Self::object(name, body)
        }
    }

    fn predefined(name: &str, body: &str) -> Self {
        Self {
            predefined: true,
            ..Self::object(name, body)
        }
    }
}

/// Macro definitions keyed by name
///
/// `candidates` yields macros longest name first (ties by name) so that
/// matching at a position is deterministic.
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: HashMap<String, Macro>,
    order: Vec<String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding only the predefined macros
    pub fn with_predefined() -> Self {
        let mut table = Self::new();
        table.insert(Macro::predefined(IMAGINARY_UNIT_NAME, IMAGINARY_UNIT));
        table
    }

    /// Insert or replace a definition. Empty names are ignored.
    pub fn insert(&mut self, mut mac: Macro) -> bool {
        if mac.name.is_empty() {
            return false;
        }
        if let Some(old) = self.macros.get(&mac.name) {
            mac.predefined |= old.predefined;
        } else {
            self.order.push(mac.name.clone());
            self.reorder();
        }
        self.macros.insert(mac.name.clone(), mac);
        true
    }

    /// Remove a definition; predefined macros stay put
    pub fn remove(&mut self, name: &str) -> Option<Macro> {
        if self.macros.get(name)?.predefined {
            return None;
        }
        self.order.retain(|n| n != name);
        self.macros.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Macro> {
        self.order.iter().filter_map(|name| self.macros.get(name))
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    fn reorder(&mut self) {
        self.order
            .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    }
}

/// Macros plus the definedness set consulted by conditions
#[derive(Debug)]
pub struct SymbolTable {
    pub macros: MacroTable,
    pub variables: HashSet<String>,
}

/// Symbol storage shared between a preprocessor and the children it spawns for includes
pub type SharedSymbols = Rc<RefCell<SymbolTable>>;

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            macros: MacroTable::with_predefined(),
            variables: HashSet::new(),
        }
    }

    pub fn shared() -> SharedSymbols {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Register a definition and mark its name defined
    pub fn define_macro(&mut self, mac: Macro) {
        if mac.name.is_empty() {
            return;
        }
        self.variables.insert(mac.name.clone());
        self.macros.insert(mac);
    }

    pub fn undefine(&mut self, name: &str) {
        self.variables.remove(name);
        self.macros.remove(name);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.variables.contains(name)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the text after `##:` into a macro
///
/// The first space separates `NAME` or `NAME(params)` from the body. Parameter
/// names are discarded; bodies refer to arguments by position.
pub fn parse_definition(definition: &str) -> Macro {
    let (head, body) = match definition.find(' ') {
        Some(space) => (&definition[..space], unescape_body(&definition[space + 1..])),
        None => (definition.trim(), String::new()),
    };

    match head.find('(') {
        Some(paren) => Macro::function(&head[..paren], body),
        None => Macro::object(head, body),
    }
}

/// Resolve `##,#` escapes in a macro body
///
/// `##,##` becomes `##`, `##,#X` becomes `#X`. A trailing `##,#` with nothing
/// after it is kept as is.
pub fn unescape_body(body: &str) -> String {
    const ESCAPE: &str = "##,#";

    let mut result = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(idx) = rest.find(ESCAPE) {
        result.push_str(&rest[..idx]);
        let after = &rest[idx + ESCAPE.len()..];

        match after.chars().next() {
            Some('#') => {
                result.push_str("##");
                rest = &after[1..];
            }
            Some(ch) => {
                result.push('#');
                result.push(ch);
                rest = &after[ch.len_utf8()..];
            }
            None => {
                result.push_str(&rest[idx..]);
                rest = "";
            }
        }
    }

    result.push_str(rest);
    result
}
