//! Generic inference, trait-bound validation, and name suggestions.
//!
//! Generic inference is performed over type-name text: a parameter whose
//! declared type is exactly a type parameter binds directly, and container
//! shapes (`Vec<T>` against `Vec<i32>`) bind through one level of generic
//! arguments. Once bound, parameters substitute into the declared return
//! type with whole-word replacement.

use manac_util::{find_similar, Span};
use rustc_hash::FxHashMap;

use crate::types::{generic_args, split_type_list, Ty};
use crate::{FuncSig, SemanticAnalyzer};

impl<'a> SemanticAnalyzer<'a> {
    // -- did-you-mean -------------------------------------------------------

    /// Collects every name a suggestion may offer: visible scope entries,
    /// builtins, types, enums, and functions.
    pub(crate) fn all_known_names(&self) -> Vec<String> {
        let mut names = self.scopes.visible_names();
        names.extend(self.builtin_functions.iter().map(|s| s.to_string()));
        names.extend(self.structs.keys().cloned());
        names.extend(self.enums.keys().cloned());
        names.extend(self.funcs.keys().cloned());
        names
    }

    /// Nearest-name suggestion within the fixed edit-distance bound.
    pub(crate) fn find_similar_name(&self, name: &str) -> Option<String> {
        let candidates = self.all_known_names();
        find_similar(name, candidates.iter().map(|s| s.as_str())).map(|s| s.to_string())
    }

    /// Formats an undeclared-name message, appending the suggestion when
    /// one is close enough.
    pub(crate) fn undeclared_message(&self, what: &str, name: &str) -> String {
        let mut msg = format!("{} '{}'", what, name);
        if let Some(suggestion) = self.find_similar_name(name) {
            msg.push_str(&format!("; did you mean '{}'?", suggestion));
        }
        msg
    }

    // -- trait implementations ----------------------------------------------

    /// Whether `type_name` implements `trait_name`, via a recorded impl or
    /// the built-in seeds for primitive types.
    pub(crate) fn type_implements_trait(&self, type_name: &str, trait_name: &str) -> bool {
        if let Some(impls) = self.trait_impls.get(type_name) {
            if impls.contains(trait_name) {
                return true;
            }
        }
        builtin_trait_impls(type_name)
            .map(|traits| traits.contains(&trait_name))
            .unwrap_or(false)
    }

    /// Validates every trait bound for one inferred binding; reports each
    /// missing implementation.
    pub(crate) fn check_trait_bounds(
        &self,
        type_param: &str,
        concrete: &Ty,
        required: &[String],
        span: Span,
    ) {
        let type_name = concrete.name();
        for trait_name in required {
            if !self.type_implements_trait(&type_name, trait_name) {
                self.error(
                    format!(
                        "type '{}' does not implement trait '{}' required by type parameter '{}'",
                        type_name, trait_name, type_param
                    ),
                    span,
                );
            }
        }
    }

    // -- generic inference --------------------------------------------------

    /// Infers type-parameter bindings from argument types at a call site.
    pub(crate) fn infer_type_bindings(
        &self,
        sig: &FuncSig,
        arg_types: &[Ty],
    ) -> FxHashMap<String, Ty> {
        let mut bindings = FxHashMap::default();
        if sig.type_params.is_empty() {
            return bindings;
        }

        for (param, arg_ty) in sig.params.iter().zip(arg_types) {
            for tp in &sig.type_params {
                if bindings.contains_key(tp) {
                    continue;
                }
                // Direct match: parameter declared exactly as the type
                // parameter.
                if &param.type_name == tp {
                    bindings.insert(tp.clone(), arg_ty.clone());
                    continue;
                }
                // Container match: Vec<T> bound against Vec<i32> extracts
                // the inner argument.
                if let Some(decl_base) = param.type_name.split('<').next() {
                    if let Some(decl_inner) = generic_args(&param.type_name, decl_base) {
                        let inner_params = split_type_list(&decl_inner);
                        if inner_params.len() == 1 && inner_params[0] == *tp {
                            let arg_name = arg_ty.name();
                            if let Some(arg_base) = arg_name.split('<').next() {
                                if let Some(arg_inner) = generic_args(&arg_name, arg_base) {
                                    bindings
                                        .insert(tp.clone(), self.resolve_type(arg_inner.trim()));
                                }
                            }
                        }
                    }
                }
            }
        }

        bindings
    }

    /// Substitutes inferred bindings into the declared return type; returns
    /// `None` when no substitution applies.
    pub(crate) fn substitute_return_type(
        &self,
        sig: &FuncSig,
        bindings: &FxHashMap<String, Ty>,
    ) -> Option<Ty> {
        if bindings.is_empty() {
            return None;
        }

        // Exact match: return type is a bare type parameter.
        if let Some(bound) = bindings.get(&sig.return_type) {
            return Some(bound.clone());
        }

        // Whole-word replacement of each parameter within the text.
        let mut ret = sig.return_type.clone();
        for (tp, concrete) in bindings {
            ret = replace_whole_word(&ret, tp, &concrete.name());
        }
        if ret != sig.return_type {
            return Some(self.resolve_type(&ret));
        }
        None
    }
}

/// Built-in trait implementation seeds for primitive types.
fn builtin_trait_impls(type_name: &str) -> Option<&'static [&'static str]> {
    const INT_TRAITS: &[&str] = &[
        "Add", "Sub", "Mul", "Div", "Rem", "Eq", "Ord", "Copy", "Clone", "Default",
    ];
    const FLOAT_TRAITS: &[&str] = &["Add", "Sub", "Mul", "Div", "Eq", "Copy", "Clone", "Default"];
    const BOOL_TRAITS: &[&str] = &["Eq", "Copy", "Clone", "Default"];
    const STRING_TRAITS: &[&str] = &["Eq", "Clone", "Default", "Display"];

    match type_name {
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" => Some(INT_TRAITS),
        "f32" | "f64" => Some(FLOAT_TRAITS),
        "bool" => Some(BOOL_TRAITS),
        "string" => Some(STRING_TRAITS),
        _ => None,
    }
}

/// Replaces `word` with `with` wherever it appears with non-alphanumeric
/// neighbors, so `T` does not rewrite the `T` inside `Tree`.
fn replace_whole_word(text: &str, word: &str, with: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if text[i..].starts_with(word) {
            let before_ok = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
            let after = i + word.len();
            let after_ok = after >= bytes.len() || !bytes[after].is_ascii_alphanumeric();
            if before_ok && after_ok {
                out.push_str(with);
                i += word.len();
                continue;
            }
        }
        out.push(text[i..].chars().next().unwrap());
        i += text[i..].chars().next().unwrap().len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_clean, errors_of};
    use crate::ParamSig;
    use manac_util::Handler;

    fn sig(params: &[(&str, &str)], ret: &str, type_params: &[&str]) -> FuncSig {
        FuncSig {
            name: "f".into(),
            params: params
                .iter()
                .map(|(n, t)| ParamSig {
                    name: n.to_string(),
                    type_name: t.to_string(),
                    has_default: false,
                })
                .collect(),
            return_type: ret.into(),
            type_params: type_params.iter().map(|s| s.to_string()).collect(),
            constraints: Vec::new(),
            is_pub: false,
            source_module: None,
            receiver: None,
        }
    }

    #[test]
    fn test_replace_whole_word() {
        assert_eq!(replace_whole_word("T", "T", "i32"), "i32");
        assert_eq!(replace_whole_word("Vec<T>", "T", "i32"), "Vec<i32>");
        assert_eq!(replace_whole_word("Tree<T>", "T", "i32"), "Tree<i32>");
        assert_eq!(replace_whole_word("Result<T, E>", "E", "string"), "Result<T, string>");
    }

    #[test]
    fn test_direct_binding() {
        let handler = Handler::new();
        let analyzer = SemanticAnalyzer::new(&handler);
        let sig = sig(&[("x", "T")], "T", &["T"]);
        let bindings = analyzer.infer_type_bindings(&sig, &[Ty::i32()]);
        assert_eq!(bindings.get("T"), Some(&Ty::i32()));
        let ret = analyzer.substitute_return_type(&sig, &bindings);
        assert_eq!(ret, Some(Ty::i32()));
    }

    #[test]
    fn test_container_binding() {
        let handler = Handler::new();
        let analyzer = SemanticAnalyzer::new(&handler);
        let sig = sig(&[("v", "Vec<T>")], "T", &["T"]);
        let bindings = analyzer.infer_type_bindings(&sig, &[Ty::structure("Vec<i32>")]);
        assert_eq!(bindings.get("T"), Some(&Ty::i32()));
    }

    #[test]
    fn test_container_return_substitution() {
        let handler = Handler::new();
        let analyzer = SemanticAnalyzer::new(&handler);
        let sig = sig(&[("x", "T")], "Option<T>", &["T"]);
        let bindings = analyzer.infer_type_bindings(&sig, &[Ty::Str]);
        let ret = analyzer.substitute_return_type(&sig, &bindings).unwrap();
        assert_eq!(ret, Ty::structure("Option<string>"));
    }

    #[test]
    fn test_builtin_trait_seeds() {
        let handler = Handler::new();
        let analyzer = SemanticAnalyzer::new(&handler);
        assert!(analyzer.type_implements_trait("i32", "Add"));
        assert!(analyzer.type_implements_trait("string", "Display"));
        assert!(!analyzer.type_implements_trait("bool", "Add"));
        assert!(!analyzer.type_implements_trait("Widget", "Clone"));
    }

    #[test]
    fn test_trait_bound_satisfied_by_builtin() {
        assert_clean(
            "module m\ntrait Ord { fn cmp(self) -> i32 }\nfn biggest<T>(a: T, b: T) -> T where T: Ord { return a }\nfn main() -> i32 { return biggest(1, 2) }",
        );
    }

    #[test]
    fn test_trait_bound_violation_reported() {
        let errors = errors_of(
            "module m\ntrait Sortable { fn key(self) -> i32 }\nstruct Blob { x: i32 }\nfn pick<T>(a: T) -> T where T: Sortable { return a }\nfn main() -> i32 {\n  let b = Blob{x: 1}\n  let c = pick(b)\n  return 0\n}",
        );
        assert!(
            errors.iter().any(|e| e.contains("does not implement trait 'Sortable'")),
            "got: {:?}",
            errors
        );
    }

    #[test]
    fn test_trait_bound_satisfied_by_impl() {
        assert_clean(
            "module m\ntrait Sortable { fn key(self) -> i32 }\nstruct Blob { x: i32 }\nimpl Sortable for Blob { fn key(self) -> i32 { return self.x } }\nfn pick<T>(a: T) -> T where T: Sortable { return a }\nfn main() -> i32 {\n  let b = Blob{x: 1}\n  let c = pick(b)\n  return c.x\n}",
        );
    }
}
