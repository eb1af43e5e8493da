//! Name-resolution scope stack.
//!
//! A stack of name→symbol maps, pushed and popped around function bodies,
//! blocks, loop headers with bound variables, and match arms with
//! bindings. Re-declaring a name in the same scope fails; shadowing across
//! scopes is allowed.

use rustc_hash::FxHashMap;

use crate::types::Ty;

/// A resolved symbol.
#[derive(Clone, Debug)]
pub struct SymbolInfo {
    pub name: String,
    pub ty: Ty,
    pub mutable: bool,
    pub is_pub: bool,
    /// Module this symbol was imported from; `None` for the current module.
    pub source_module: Option<String>,
    /// Generic type parameters, for functions.
    pub type_params: Vec<String>,
    /// `where` constraints: type parameter → required traits.
    pub constraints: Vec<(String, Vec<String>)>,
}

impl SymbolInfo {
    /// A local variable or parameter symbol.
    pub fn var(name: impl Into<String>, ty: Ty, mutable: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            mutable,
            is_pub: false,
            source_module: None,
            type_params: Vec::new(),
            constraints: Vec::new(),
        }
    }
}

/// The scope stack.
pub struct ScopeStack {
    scopes: Vec<FxHashMap<String, SymbolInfo>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declares into the innermost scope. Returns false when the name is
    /// already declared in that scope.
    pub fn declare(&mut self, name: impl Into<String>, sym: SymbolInfo) -> bool {
        let name = name.into();
        let scope = self
            .scopes
            .last_mut()
            .expect("declare called with no open scope");
        if scope.contains_key(&name) {
            return false;
        }
        scope.insert(name, sym);
        true
    }

    /// Innermost-out lookup.
    pub fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Every visible name, innermost scopes first (suggestion candidates).
    pub fn visible_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for scope in self.scopes.iter().rev() {
            names.extend(scope.keys().cloned());
        }
        names
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
