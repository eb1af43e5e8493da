//! Type-name parsing.
//!
//! The parser represents types as canonical text; the semantic analyzer
//! turns the text into its `Ty` model. Produced spellings:
//! `*T`, `&T`, `&mut T`, `dyn Trait`, `[N]T` / `[]T`, `(T1, T2)`,
//! `Name`, `Name::Assoc`, `Name<T, U>`, `Self`, `Self::Item`.

use manac_lex::TokenKind;

use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses a type and returns its canonical text form.
    pub(crate) fn parse_type_name(&mut self) -> String {
        // Pointer type: *T
        if self.eat(TokenKind::Star) {
            let pointee = self.parse_type_name();
            return format!("*{}", pointee);
        }

        // Reference type: &T or &mut T
        if self.eat(TokenKind::Amp) {
            if self.eat(TokenKind::KwMut) {
                let referent = self.parse_type_name();
                return format!("&mut {}", referent);
            }
            let referent = self.parse_type_name();
            return format!("&{}", referent);
        }

        // Trait object: dyn TraitName
        if self.eat(TokenKind::KwDyn) {
            self.expect(TokenKind::Identifier, "expected trait name after 'dyn'");
            return format!("dyn {}", self.prev_lexeme());
        }

        // Array type: [N]T or []T
        if self.eat(TokenKind::LBracket) {
            let mut size = String::new();
            if self.check(TokenKind::IntLiteral) {
                self.advance();
                size = self.prev_lexeme();
            }
            self.expect(TokenKind::RBracket, "expected ']' in array type");
            let elem = self.parse_type_name();
            return format!("[{}]{}", size, elem);
        }

        // Tuple type: (T1, T2, ...)
        if self.eat(TokenKind::LParen) {
            let mut out = String::from("(");
            if !self.check(TokenKind::RParen) {
                out.push_str(&self.parse_type_name());
                while self.eat(TokenKind::Comma) {
                    out.push_str(", ");
                    out.push_str(&self.parse_type_name());
                }
            }
            self.expect(TokenKind::RParen, "expected ')' in tuple type");
            out.push(')');
            return out;
        }

        // Self or Self::Item in type position
        if self.eat(TokenKind::KwSelf) {
            let mut name = String::from("Self");
            if self.eat(TokenKind::ColonColon) {
                self.expect(
                    TokenKind::Identifier,
                    "expected associated type name after 'Self::'",
                );
                name.push_str("::");
                name.push_str(&self.prev_lexeme());
            }
            return name;
        }

        self.expect(TokenKind::Identifier, "expected type name");
        let mut name = self.prev_lexeme();

        // Path with associated type: TypeName::AssociatedType
        if self.eat(TokenKind::ColonColon) {
            self.expect(TokenKind::Identifier, "expected type name after '::'");
            name.push_str("::");
            name.push_str(&self.prev_lexeme());
        }

        // Generic arguments: Type<T, U>
        if self.eat(TokenKind::Less) {
            name.push('<');
            name.push_str(&self.parse_type_name());
            while self.eat(TokenKind::Comma) {
                name.push_str(", ");
                name.push_str(&self.parse_type_name());
            }
            self.expect(TokenKind::Greater, "expected '>' after type arguments");
            name.push('>');
        }

        name
    }
}
