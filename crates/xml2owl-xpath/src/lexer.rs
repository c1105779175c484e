//! Location path tokens

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'a> {
    #[token("//")]
    DoubleSlash,

    #[token("/")]
    Slash,

    #[token("..")]
    DotDot,

    #[token(".")]
    Dot,

    #[token("@")]
    At,

    #[token("*")]
    Star,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("=")]
    Equals,

    #[token("text()")]
    TextTest,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<usize>().ok())]
    Integer(usize),

    #[regex(r"'[^']*'", |lex| unquote(lex.slice()))]
    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    Literal(&'a str),

    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*(:[A-Za-z_][A-Za-z0-9_.\-]*)?")]
    Name(&'a str),
}

fn unquote(slice: &str) -> &str {
    &slice[1..slice.len() - 1]
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::DoubleSlash => write!(f, "//"),
            Token::Slash => write!(f, "/"),
            Token::DotDot => write!(f, ".."),
            Token::Dot => write!(f, "."),
            Token::At => write!(f, "@"),
            Token::Star => write!(f, "*"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Equals => write!(f, "="),
            Token::TextTest => write!(f, "text()"),
            Token::Integer(n) => write!(f, "{}", n),
            Token::Literal(s) => write!(f, "'{}'", s),
            Token::Name(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token<'_>> {
        Token::lexer(input).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn test_descendant_attribute() {
        assert_eq!(lex("//@referenceName"), vec![Token::DoubleSlash, Token::At, Token::Name("referenceName")]);
    }

    #[test]
    fn test_prefixed_name_and_predicate() {
        assert_eq!(
            lex("x:rule[@id = 'a b']"),
            vec![
                Token::Name("x:rule"),
                Token::LBracket,
                Token::At,
                Token::Name("id"),
                Token::Equals,
                Token::Literal("a b"),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_text_test_wins_over_name() {
        assert_eq!(lex("a/text()"), vec![Token::Name("a"), Token::Slash, Token::TextTest]);
    }

    #[test]
    fn test_unknown_character_is_error() {
        assert!(Token::lexer("a|b").any(|t| t.is_err()));
    }
}
