//! Token definitions for the mana language.

use manac_util::Span;
use std::fmt;

/// The kind of a lexical token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,

    Identifier,
    IntLiteral,
    FloatLiteral,
    StrLiteral,
    FStrLiteral,
    RawStrLiteral,
    MultilineStrLiteral,
    CharLiteral,
    /// `///` documentation comment; the lexeme is the trimmed remainder of
    /// the line. Ordinary comments are skipped and never become tokens.
    DocComment,

    // Keywords
    KwModule,
    KwImport,
    KwUse,
    KwPub,
    KwFn,
    KwStruct,
    KwEnum,
    KwVariant,
    KwTrait,
    KwImpl,
    KwDyn,
    KwLet,
    KwMut,
    KwMove,
    KwConst,
    KwStatic,
    KwExtern,
    KwAsync,
    KwAwait,
    KwWhere,
    KwMatch,
    KwWhen,
    KwIf,
    KwElse,
    KwWhile,
    KwFor,
    KwIn,
    KwLoop,
    KwBreak,
    KwContinue,
    KwReturn,
    KwDefer,
    KwScope,
    KwSelf,
    KwTrue,
    KwFalse,
    KwNone,
    KwType,
    KwAs,
    KwFrom,
    KwOr,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    /// `::`
    ColonColon,
    Dot,
    /// `->`
    Arrow,
    /// `=>`
    FatArrow,
    /// `=`
    Assign,
    /// standalone `_`
    Underscore,
    /// `#` (attribute prefix)
    Hash,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `**`
    StarStar,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `/=`
    SlashEq,
    /// `%=`
    PercentEq,
    /// `**=`
    StarStarEq,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `<<=`
    ShlEq,
    /// `>>=`
    ShrEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    Caret,
    Tilde,
    /// `&=`
    AmpEq,
    /// `|=`
    PipeEq,
    /// `^=`
    CaretEq,
    Bang,
    /// `?` (error propagation)
    Question,
    /// `?.` (optional chaining)
    QuestionDot,
    /// `??` (null coalescing)
    QuestionQuestion,
    /// `..`
    DotDot,
    /// `..=`
    DotDotEq,
}

impl TokenKind {
    /// Human-readable name used in parser error messages.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of file",
            TokenKind::Identifier => "identifier",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StrLiteral => "string literal",
            TokenKind::FStrLiteral => "f-string literal",
            TokenKind::RawStrLiteral => "raw string literal",
            TokenKind::MultilineStrLiteral => "multi-line string literal",
            TokenKind::CharLiteral => "char literal",
            TokenKind::DocComment => "doc comment",
            TokenKind::KwModule => "'module'",
            TokenKind::KwImport => "'import'",
            TokenKind::KwUse => "'use'",
            TokenKind::KwPub => "'pub'",
            TokenKind::KwFn => "'fn'",
            TokenKind::KwStruct => "'struct'",
            TokenKind::KwEnum => "'enum'",
            TokenKind::KwVariant => "'variant'",
            TokenKind::KwTrait => "'trait'",
            TokenKind::KwImpl => "'impl'",
            TokenKind::KwDyn => "'dyn'",
            TokenKind::KwLet => "'let'",
            TokenKind::KwMut => "'mut'",
            TokenKind::KwMove => "'move'",
            TokenKind::KwConst => "'const'",
            TokenKind::KwStatic => "'static'",
            TokenKind::KwExtern => "'extern'",
            TokenKind::KwAsync => "'async'",
            TokenKind::KwAwait => "'await'",
            TokenKind::KwWhere => "'where'",
            TokenKind::KwMatch => "'match'",
            TokenKind::KwWhen => "'when'",
            TokenKind::KwIf => "'if'",
            TokenKind::KwElse => "'else'",
            TokenKind::KwWhile => "'while'",
            TokenKind::KwFor => "'for'",
            TokenKind::KwIn => "'in'",
            TokenKind::KwLoop => "'loop'",
            TokenKind::KwBreak => "'break'",
            TokenKind::KwContinue => "'continue'",
            TokenKind::KwReturn => "'return'",
            TokenKind::KwDefer => "'defer'",
            TokenKind::KwScope => "'scope'",
            TokenKind::KwSelf => "'self'",
            TokenKind::KwTrue => "'true'",
            TokenKind::KwFalse => "'false'",
            TokenKind::KwNone => "'None'",
            TokenKind::KwType => "'type'",
            TokenKind::KwAs => "'as'",
            TokenKind::KwFrom => "'from'",
            TokenKind::KwOr => "'or'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::ColonColon => "'::'",
            TokenKind::Dot => "'.'",
            TokenKind::Arrow => "'->'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Assign => "'='",
            TokenKind::Underscore => "'_'",
            TokenKind::Hash => "'#'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::StarStar => "'**'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::StarStarEq => "'**='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::LessEq => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEq => "'>='",
            TokenKind::Shl => "'<<'",
            TokenKind::Shr => "'>>'",
            TokenKind::ShlEq => "'<<='",
            TokenKind::ShrEq => "'>>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::Bang => "'!'",
            TokenKind::Question => "'?'",
            TokenKind::QuestionDot => "'?.'",
            TokenKind::QuestionQuestion => "'??'",
            TokenKind::DotDot => "'..'",
            TokenKind::DotDotEq => "'..='",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexical token: kind, captured lexeme, and source position.
///
/// Lexemes are normalized: numeric literals have separators stripped and
/// radix prefixes decoded to decimal, string lexemes carry the unescaped
/// payload without quotes.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}

/// Maps an identifier to its keyword kind, if it is reserved.
///
/// # Examples
///
/// ```
/// use manac_lex::{keyword_from_str, TokenKind};
///
/// assert_eq!(keyword_from_str("fn"), Some(TokenKind::KwFn));
/// assert_eq!(keyword_from_str("banana"), None);
/// ```
pub fn keyword_from_str(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "module" => TokenKind::KwModule,
        "import" => TokenKind::KwImport,
        "use" => TokenKind::KwUse,
        "pub" => TokenKind::KwPub,
        "fn" => TokenKind::KwFn,
        "struct" => TokenKind::KwStruct,
        "enum" => TokenKind::KwEnum,
        "variant" => TokenKind::KwVariant,
        "trait" => TokenKind::KwTrait,
        "impl" => TokenKind::KwImpl,
        "dyn" => TokenKind::KwDyn,
        "let" => TokenKind::KwLet,
        "mut" => TokenKind::KwMut,
        "move" => TokenKind::KwMove,
        "const" => TokenKind::KwConst,
        "static" => TokenKind::KwStatic,
        "extern" => TokenKind::KwExtern,
        "async" => TokenKind::KwAsync,
        "await" => TokenKind::KwAwait,
        "where" => TokenKind::KwWhere,
        "match" => TokenKind::KwMatch,
        "when" => TokenKind::KwWhen,
        "if" => TokenKind::KwIf,
        "else" => TokenKind::KwElse,
        "while" => TokenKind::KwWhile,
        "for" => TokenKind::KwFor,
        "in" => TokenKind::KwIn,
        "loop" => TokenKind::KwLoop,
        "break" => TokenKind::KwBreak,
        "continue" => TokenKind::KwContinue,
        "return" => TokenKind::KwReturn,
        "defer" => TokenKind::KwDefer,
        "scope" => TokenKind::KwScope,
        "self" => TokenKind::KwSelf,
        "true" => TokenKind::KwTrue,
        "false" => TokenKind::KwFalse,
        "None" => TokenKind::KwNone,
        "type" => TokenKind::KwType,
        "as" => TokenKind::KwAs,
        "from" => TokenKind::KwFrom,
        "or" => TokenKind::KwOr,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(keyword_from_str("module"), Some(TokenKind::KwModule));
        assert_eq!(keyword_from_str("variant"), Some(TokenKind::KwVariant));
        assert_eq!(keyword_from_str("when"), Some(TokenKind::KwWhen));
        assert_eq!(keyword_from_str("or"), Some(TokenKind::KwOr));
        assert_eq!(keyword_from_str("extern"), Some(TokenKind::KwExtern));
    }

    #[test]
    fn test_keyword_lookup_case_sensitive() {
        assert_eq!(keyword_from_str("None"), Some(TokenKind::KwNone));
        assert_eq!(keyword_from_str("none"), None);
        assert_eq!(keyword_from_str("Fn"), None);
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(TokenKind::Arrow.name(), "'->'");
        assert_eq!(TokenKind::Eof.name(), "end of file");
    }
}
