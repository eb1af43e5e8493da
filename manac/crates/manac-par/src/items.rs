//! Declaration parsing: imports, use, functions, structs, enums, traits,
//! impl blocks, type aliases, and top-level globals.

use manac_lex::TokenKind;

use crate::ast::*;
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses one top-level declaration, or returns `None` after recording
    /// an error (the caller synchronizes).
    pub(crate) fn parse_declaration(&mut self) -> Option<Decl> {
        // Doc comments accumulate until the next non-doc token, then attach
        // to the declaration they precede.
        let mut doc_lines: Vec<String> = Vec::new();
        while self.check(TokenKind::DocComment) {
            self.advance();
            doc_lines.push(self.prev_lexeme());
        }
        let doc = if doc_lines.is_empty() {
            None
        } else {
            Some(doc_lines.join("\n"))
        };

        if self.eat(TokenKind::KwImport) {
            return self.parse_import_decl();
        }

        // Attributes: #[name]. Only #[test] is meaningful; unknown names
        // are consumed and ignored.
        let mut is_test = false;
        if self.eat(TokenKind::Hash) {
            self.expect(TokenKind::LBracket, "expected '[' after '#'");
            self.expect(TokenKind::Identifier, "expected attribute name");
            if self.prev_lexeme() == "test" {
                is_test = true;
            }
            self.expect(TokenKind::RBracket, "expected ']' after attribute");
        }

        let is_pub = self.eat(TokenKind::KwPub);

        if self.eat(TokenKind::KwUse) {
            return self.parse_use_decl(is_pub);
        }

        if self.eat(TokenKind::KwExtern) {
            self.expect(TokenKind::KwFn, "expected 'fn' after 'extern'");
            let mut func = self.parse_function_decl(is_pub, false, is_test, true)?;
            func.doc = doc;
            return Some(Decl::Function(func));
        }

        if self.eat(TokenKind::KwAsync) {
            self.expect(TokenKind::KwFn, "expected 'fn' after 'async'");
            let mut func = self.parse_function_decl(is_pub, true, is_test, false)?;
            func.doc = doc;
            return Some(Decl::Function(func));
        }

        if self.eat(TokenKind::KwStatic) {
            self.expect(TokenKind::KwFn, "expected 'fn' after 'static'");
            let mut func = self.parse_function_decl(is_pub, false, is_test, false)?;
            func.is_static = true;
            func.doc = doc;
            return Some(Decl::Function(func));
        }

        if self.eat(TokenKind::KwFn) {
            let mut func = self.parse_function_decl(is_pub, false, is_test, false)?;
            func.doc = doc;
            return Some(Decl::Function(func));
        }

        if self.eat(TokenKind::KwStruct) {
            let mut decl = self.parse_struct_decl(is_pub)?;
            decl.doc = doc;
            return Some(Decl::Struct(decl));
        }

        if self.eat(TokenKind::KwEnum) {
            let mut decl = self.parse_enum_decl(is_pub, false)?;
            decl.doc = doc;
            return Some(Decl::Enum(decl));
        }

        if self.eat(TokenKind::KwVariant) {
            let mut decl = self.parse_enum_decl(is_pub, true)?;
            decl.doc = doc;
            return Some(Decl::Enum(decl));
        }

        if self.eat(TokenKind::KwTrait) {
            let mut decl = self.parse_trait_decl(is_pub)?;
            decl.doc = doc;
            return Some(Decl::Trait(decl));
        }

        if self.eat(TokenKind::KwImpl) {
            let mut decl = self.parse_impl_decl()?;
            decl.doc = doc;
            return Some(Decl::Impl(decl));
        }

        if self.eat(TokenKind::KwType) {
            let mut decl = self.parse_type_alias_decl(is_pub)?;
            decl.doc = doc;
            return Some(Decl::TypeAlias(decl));
        }

        // Top-level global: name : type = expr
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::Colon) {
            let mut decl = self.parse_global_decl()?;
            decl.doc = doc;
            return Some(Decl::Global(decl));
        }

        self.error("unexpected top-level declaration", self.peek_span());
        None
    }

    fn parse_import_decl(&mut self) -> Option<Decl> {
        let span = self.peek_span();

        // File import: import "path/to/file"
        if self.eat(TokenKind::StrLiteral) {
            let path = self.prev_lexeme();
            self.optional_semicolon();
            return Some(Decl::Import(ImportDecl {
                path,
                is_file_import: true,
                span,
            }));
        }

        // Module import: import std::io
        self.expect(TokenKind::Identifier, "expected import name");
        let mut path = self.prev_lexeme();
        while self.eat(TokenKind::ColonColon) {
            self.expect(TokenKind::Identifier, "expected identifier after '::'");
            path.push_str("::");
            path.push_str(&self.prev_lexeme());
        }
        self.optional_semicolon();
        Some(Decl::Import(ImportDecl {
            path,
            is_file_import: false,
            span,
        }))
    }

    fn parse_use_decl(&mut self, is_pub: bool) -> Option<Decl> {
        let span = self.peek_span();

        self.expect(TokenKind::Identifier, "expected module path");
        let mut path = self.prev_lexeme();

        while self.eat(TokenKind::ColonColon) {
            // Glob import: use std::io::*
            if self.eat(TokenKind::Star) {
                self.optional_semicolon();
                return Some(Decl::Use(UseDecl {
                    path,
                    is_glob: true,
                    names: Vec::new(),
                    alias: None,
                    is_pub,
                    span,
                }));
            }

            // Selective import: use std::io::{File, Read}
            if self.eat(TokenKind::LBrace) {
                let mut names = Vec::new();
                loop {
                    self.expect(TokenKind::Identifier, "expected name in use");
                    names.push(self.prev_lexeme());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace, "expected '}' in use");
                self.optional_semicolon();
                return Some(Decl::Use(UseDecl {
                    path,
                    is_glob: false,
                    names,
                    alias: None,
                    is_pub,
                    span,
                }));
            }

            self.expect(TokenKind::Identifier, "expected identifier after '::'");
            path.push_str("::");
            path.push_str(&self.prev_lexeme());
        }

        let alias = if self.eat(TokenKind::KwAs) {
            self.expect(TokenKind::Identifier, "expected alias name");
            Some(self.prev_lexeme())
        } else {
            None
        };

        self.optional_semicolon();
        Some(Decl::Use(UseDecl {
            path,
            is_glob: false,
            names: Vec::new(),
            alias,
            is_pub,
            span,
        }))
    }

    pub(crate) fn parse_function_decl(
        &mut self,
        is_pub: bool,
        is_async: bool,
        is_test: bool,
        is_extern: bool,
    ) -> Option<FuncDecl> {
        self.expect(TokenKind::Identifier, "expected function name");
        let first_name = self.prev_lexeme();
        let span = self.prev_span();

        // Method syntax: fn Type.method(...)
        let (receiver_type, name) = if self.eat(TokenKind::Dot) {
            self.expect(TokenKind::Identifier, "expected method name after '.'");
            (Some(first_name), self.prev_lexeme())
        } else {
            (None, first_name)
        };

        // Generic parameters: fn foo<T, U>(...)
        let mut type_params = Vec::new();
        if self.eat(TokenKind::Less) {
            loop {
                self.expect(TokenKind::Identifier, "expected type parameter name");
                type_params.push(self.prev_lexeme());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Greater, "expected '>' after type parameters");
        }

        self.expect(TokenKind::LParen, "expected '('");
        let mut params = Vec::new();
        let mut has_self = false;

        if !self.check(TokenKind::RParen) {
            loop {
                // 'self' is implicit and untyped; only valid first.
                if self.check(TokenKind::KwSelf) {
                    self.advance();
                    has_self = true;
                    if self.eat(TokenKind::Comma) {
                        continue;
                    }
                    break;
                }

                self.expect(TokenKind::Identifier, "expected parameter name");
                let p_name = self.prev_lexeme();
                let p_span = self.prev_span();
                self.expect(TokenKind::Colon, "expected ':' after parameter name");
                let p_type = self.parse_type_name();

                let default_value = if self.eat(TokenKind::Assign) {
                    Some(self.parse_expression())
                } else {
                    None
                };

                params.push(Param {
                    name: p_name,
                    type_name: p_type,
                    default_value,
                    span: p_span,
                });

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')'");

        // Return type is required, except for main which defaults to i32.
        let return_type = if self.eat(TokenKind::Arrow) {
            self.parse_type_name()
        } else if name == "main" && receiver_type.is_none() {
            "i32".to_string()
        } else {
            self.error("expected '->' and return type", self.peek_span());
            return None;
        };

        // where T: A + B, U: C
        let mut constraints = Vec::new();
        if self.eat(TokenKind::KwWhere) {
            loop {
                self.expect(
                    TokenKind::Identifier,
                    "expected type parameter in where clause",
                );
                let type_param = self.prev_lexeme();
                let c_span = self.prev_span();
                self.expect(
                    TokenKind::Colon,
                    "expected ':' after type parameter in where clause",
                );

                let mut traits = Vec::new();
                loop {
                    self.expect(TokenKind::Identifier, "expected trait name in where clause");
                    traits.push(self.prev_lexeme());
                    if !self.eat(TokenKind::Plus) {
                        break;
                    }
                }

                constraints.push(TypeConstraint {
                    type_param,
                    traits,
                    span: c_span,
                });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        let body = if is_extern {
            self.optional_semicolon();
            None
        } else {
            Some(self.parse_block()?)
        };

        Some(FuncDecl {
            name,
            receiver_type,
            type_params,
            constraints,
            params,
            return_type,
            body,
            is_pub,
            is_async,
            is_test,
            is_extern,
            is_static: false,
            has_self,
            doc: None,
            source_module: None,
            span,
        })
    }

    fn parse_struct_decl(&mut self, is_pub: bool) -> Option<StructDecl> {
        self.expect(TokenKind::Identifier, "expected struct name");
        let name = self.prev_lexeme();
        let span = self.prev_span();

        let mut type_params = Vec::new();
        if self.eat(TokenKind::Less) {
            loop {
                self.expect(TokenKind::Identifier, "expected type parameter name");
                type_params.push(self.prev_lexeme());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Greater, "expected '>' after type parameters");
        }

        self.expect(TokenKind::LBrace, "expected '{' after struct name");

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if !self.expect(TokenKind::Identifier, "expected field name") {
                break;
            }
            let field_name = self.prev_lexeme();
            let field_span = self.prev_span();
            self.expect(TokenKind::Colon, "expected ':' after field name");
            let field_type = self.parse_type_name();

            let default_value = if self.eat(TokenKind::Assign) {
                Some(self.parse_expression())
            } else {
                None
            };

            fields.push(StructField {
                name: field_name,
                type_name: field_type,
                default_value,
                span: field_span,
            });

            // Comma or semicolon separators, both optional before '}'.
            if !self.eat(TokenKind::Comma) && !self.eat(TokenKind::Semicolon) {
                if !self.check(TokenKind::RBrace) {
                    self.error("expected ',' or '}' after field", self.peek_span());
                }
            }
        }

        self.expect(TokenKind::RBrace, "expected '}' after struct fields");
        Some(StructDecl {
            name,
            type_params,
            fields,
            is_pub,
            doc: None,
            source_module: None,
            span,
        })
    }

    fn parse_enum_decl(&mut self, is_pub: bool, declared_as_variant: bool) -> Option<EnumDecl> {
        self.expect(TokenKind::Identifier, "expected enum name");
        let name = self.prev_lexeme();
        let span = self.prev_span();

        self.expect(TokenKind::LBrace, "expected '{' after enum name");

        let mut variants = Vec::new();
        let mut next_value: i64 = 0;

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if !self.expect(TokenKind::Identifier, "expected variant name") {
                break;
            }
            let v_name = self.prev_lexeme();
            let v_span = self.prev_span();

            let mut variant = EnumVariant {
                name: v_name,
                tuple_types: Vec::new(),
                struct_fields: Vec::new(),
                discriminant: None,
                value: next_value,
                span: v_span,
            };

            if self.eat(TokenKind::LParen) {
                // Tuple variant: Name(T1, T2)
                if !self.check(TokenKind::RParen) {
                    loop {
                        variant.tuple_types.push(self.parse_type_name());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "expected ')' after tuple variant types");
            } else if self.eat(TokenKind::LBrace) {
                // Struct variant: Name { field: Type, ... }
                while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                    if !self.expect(TokenKind::Identifier, "expected field name in struct variant")
                    {
                        break;
                    }
                    let f_name = self.prev_lexeme();
                    let f_span = self.prev_span();
                    self.expect(TokenKind::Colon, "expected ':' after field name");
                    let f_type = self.parse_type_name();
                    variant.struct_fields.push(StructField {
                        name: f_name,
                        type_name: f_type,
                        default_value: None,
                        span: f_span,
                    });

                    if !self.check(TokenKind::RBrace) {
                        self.expect(TokenKind::Comma, "expected ',' after struct variant field");
                    } else {
                        self.eat(TokenKind::Comma);
                    }
                }
                self.expect(TokenKind::RBrace, "expected '}' after struct variant fields");
            } else if self.eat(TokenKind::Assign) {
                // Explicit discriminant: Name = 10
                self.expect(TokenKind::IntLiteral, "expected integer value for enum variant");
                let value = self.prev_lexeme().parse::<i64>().unwrap_or(0);
                variant.discriminant = Some(value);
                variant.value = value;
                next_value = value;
            }

            variants.push(variant);
            next_value += 1;

            if !self.check(TokenKind::RBrace) {
                self.expect(TokenKind::Comma, "expected ',' after enum variant");
            } else {
                self.eat(TokenKind::Comma);
            }
        }

        self.expect(TokenKind::RBrace, "expected '}' after enum variants");
        Some(EnumDecl {
            name,
            variants,
            is_pub,
            declared_as_variant,
            doc: None,
            source_module: None,
            span,
        })
    }

    fn parse_trait_decl(&mut self, is_pub: bool) -> Option<TraitDecl> {
        self.expect(TokenKind::Identifier, "expected trait name");
        let name = self.prev_lexeme();
        let span = self.prev_span();

        self.expect(TokenKind::LBrace, "expected '{' after trait name");

        let mut associated_types = Vec::new();
        let mut methods = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            // Associated type declaration: type Item;
            if self.eat(TokenKind::KwType) {
                self.expect(TokenKind::Identifier, "expected associated type name");
                associated_types.push(AssociatedType {
                    name: self.prev_lexeme(),
                    span: self.prev_span(),
                });
                self.optional_semicolon();
                continue;
            }

            if !self.expect(TokenKind::KwFn, "expected 'fn' or 'type' in trait body") {
                return None;
            }
            self.expect(TokenKind::Identifier, "expected method name");
            let m_name = self.prev_lexeme();
            let m_span = self.prev_span();

            self.expect(TokenKind::LParen, "expected '('");
            let mut takes_self = false;
            let mut params = Vec::new();
            if !self.check(TokenKind::RParen) {
                loop {
                    if self.check(TokenKind::KwSelf) {
                        self.advance();
                        takes_self = true;
                        if !self.check(TokenKind::RParen) && !self.check(TokenKind::Comma) {
                            self.error("'self' must be first parameter", self.peek_span());
                        }
                    } else {
                        self.expect(TokenKind::Identifier, "expected parameter name");
                        let p_name = self.prev_lexeme();
                        let p_span = self.prev_span();
                        self.expect(TokenKind::Colon, "expected ':' after parameter name");
                        let p_type = self.parse_type_name();
                        params.push(Param {
                            name: p_name,
                            type_name: p_type,
                            default_value: None,
                            span: p_span,
                        });
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "expected ')'");
            self.expect(TokenKind::Arrow, "expected '->'");
            let return_type = self.parse_type_name();

            // Optional default body.
            let body = if self.check(TokenKind::LBrace) {
                self.parse_block()
            } else {
                self.optional_semicolon();
                None
            };

            methods.push(TraitMethod {
                name: m_name,
                takes_self,
                params,
                return_type,
                body,
                span: m_span,
            });
        }

        self.expect(TokenKind::RBrace, "expected '}' after trait methods");
        Some(TraitDecl {
            name,
            associated_types,
            methods,
            is_pub,
            doc: None,
            source_module: None,
            span,
        })
    }

    fn parse_impl_decl(&mut self) -> Option<ImplDecl> {
        self.expect(TokenKind::Identifier, "expected trait or type name");
        let first_name = self.prev_lexeme();
        let span = self.prev_span();

        // "impl Trait for Type" vs inherent "impl Type".
        let (trait_name, type_name) = if self.eat(TokenKind::KwFor) {
            self.expect(TokenKind::Identifier, "expected type name after 'for'");
            (Some(first_name), self.prev_lexeme())
        } else {
            (None, first_name)
        };

        self.expect(TokenKind::LBrace, "expected '{' after impl");

        let mut type_assignments = Vec::new();
        let mut constants = Vec::new();
        let mut methods = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            // Associated type assignment: type Item = Concrete;
            if self.eat(TokenKind::KwType) {
                self.expect(TokenKind::Identifier, "expected associated type name");
                let a_name = self.prev_lexeme();
                let a_span = self.prev_span();
                self.expect(TokenKind::Assign, "expected '=' after associated type name");
                let target_type = self.parse_type_name();
                self.optional_semicolon();
                type_assignments.push(TypeBinding {
                    name: a_name,
                    target_type,
                    span: a_span,
                });
                continue;
            }

            // Constant: const NAME: Type = expr;
            if self.eat(TokenKind::KwConst) {
                self.expect(TokenKind::Identifier, "expected constant name");
                let c_name = self.prev_lexeme();
                let c_span = self.prev_span();
                self.expect(TokenKind::Colon, "expected ':' after constant name");
                let c_type = self.parse_type_name();
                self.expect(TokenKind::Assign, "expected '=' after constant type");
                let init = self.parse_expression();
                self.optional_semicolon();
                constants.push(ImplConst {
                    name: c_name,
                    type_name: c_type,
                    init,
                    span: c_span,
                });
                continue;
            }

            let is_static = self.eat(TokenKind::KwStatic);
            if !self.expect(
                TokenKind::KwFn,
                "expected 'fn', 'const', 'type', or 'static' in impl block",
            ) {
                return None;
            }

            if let Some(mut method) = self.parse_function_decl(false, false, false, false) {
                method.receiver_type = Some(type_name.clone());
                method.is_static = is_static;
                methods.push(method);
            }
        }

        self.expect(TokenKind::RBrace, "expected '}' after impl methods");
        Some(ImplDecl {
            type_name,
            trait_name,
            type_assignments,
            constants,
            methods,
            doc: None,
            source_module: None,
            span,
        })
    }

    fn parse_type_alias_decl(&mut self, is_pub: bool) -> Option<TypeAliasDecl> {
        self.expect(TokenKind::Identifier, "expected type alias name");
        let name = self.prev_lexeme();
        let span = self.prev_span();
        self.expect(TokenKind::Assign, "expected '=' after type alias name");
        let target_type = self.parse_type_name();
        self.optional_semicolon();
        Some(TypeAliasDecl {
            name,
            target_type,
            is_pub,
            doc: None,
            source_module: None,
            span,
        })
    }

    fn parse_global_decl(&mut self) -> Option<GlobalDecl> {
        self.expect(TokenKind::Identifier, "expected variable name");
        let name = self.prev_lexeme();
        let span = self.prev_span();
        self.expect(TokenKind::Colon, "expected ':'");
        let type_name = self.parse_type_name();
        self.expect(TokenKind::Assign, "expected '='");
        let init = self.parse_expression();
        self.optional_semicolon();
        Some(GlobalDecl {
            name,
            type_name,
            init,
            mutable: true,
            doc: None,
            source_module: None,
            span,
        })
    }
}
