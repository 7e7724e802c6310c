//! Lexical scope chain used during the semantic walk. Each [`Block`],
//! [`FunctionDef`] body, and `for` loop pushes a child scope; name
//! resolution walks up through `parent` until it runs out of scopes.
//!
//! [`Block`]: pinelint_par::Block
//! [`FunctionDef`]: pinelint_par::Stmt::FunctionDef

use crate::types::PineType;
use pinelint_util::Span;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use std::cell::RefCell;

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub ty: PineType,
    pub declared_at: Option<Span>,
    pub is_mutable: bool,
    pub usage_count: u32,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: PineType, declared_at: Option<Span>) -> Self {
        Symbol {
            name: name.into(),
            ty,
            declared_at,
            is_mutable: false,
            usage_count: 0,
        }
    }

    pub fn mutable(mut self) -> Self {
        self.is_mutable = true;
        self
    }
}

pub type ScopeRef = Rc<RefCell<Scope>>;

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeRef>,
    pub symbols: FxHashMap<String, Symbol>,
}

impl Scope {
    pub fn root() -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            parent: None,
            symbols: FxHashMap::default(),
        }))
    }

    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            parent: Some(Rc::clone(parent)),
            symbols: FxHashMap::default(),
        }))
    }

    pub fn define(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name.clone(), symbol);
    }

    pub fn declares(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }
}

/// Walks `scope` and its ancestors looking for `name`, without mutating
/// usage counts (used for existence checks, e.g. the shadowing warning).
pub fn resolve(scope: &ScopeRef, name: &str) -> Option<Symbol> {
    if let Some(sym) = scope.borrow().symbols.get(name) {
        return Some(sym.clone());
    }
    let parent = scope.borrow().parent.clone();
    match parent {
        Some(p) => resolve(&p, name),
        None => None,
    }
}

/// Same as [`resolve`] but increments the resolved symbol's usage count in
/// place, feeding the unused-variable sweep.
pub fn resolve_and_mark_used(scope: &ScopeRef, name: &str) -> Option<Symbol> {
    if let Some(sym) = scope.borrow_mut().symbols.get_mut(name) {
        sym.usage_count += 1;
        return Some(sym.clone());
    }
    let parent = scope.borrow().parent.clone();
    match parent {
        Some(p) => resolve_and_mark_used(&p, name),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_resolves_through_parent() {
        let root = Scope::root();
        root.borrow_mut().define(Symbol::new("x", PineType::series_any(), None));
        let child = Scope::child(&root);
        assert!(resolve(&child, "x").is_some());
        assert!(resolve(&child, "y").is_none());
    }

    #[test]
    fn local_definition_shadows_parent() {
        let root = Scope::root();
        root.borrow_mut().define(Symbol::new("x", PineType::series_any(), None).mutable());
        let child = Scope::child(&root);
        child.borrow_mut().define(Symbol::new("x", PineType::series_any(), None));
        assert!(!child.borrow().symbols["x"].is_mutable);
    }

    #[test]
    fn resolve_and_mark_used_increments_count() {
        let root = Scope::root();
        root.borrow_mut().define(Symbol::new("x", PineType::series_any(), None));
        resolve_and_mark_used(&root, "x");
        resolve_and_mark_used(&root, "x");
        assert_eq!(root.borrow().symbols["x"].usage_count, 2);
    }
}
