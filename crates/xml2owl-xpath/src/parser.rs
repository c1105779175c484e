//! Location path parser

use crate::lexer::Token;
use crate::PathError;
use logos::Logos;
use std::iter::Peekable;

/// Parsed location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationPath {
    /// Starts at the document root
    pub absolute: bool,
    pub steps: Vec<Step>,
}

/// One location step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Introduced by `//`: applies to the context and all its descendants
    pub recursive: bool,
    pub kind: StepKind,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    Child(NameTest),
    Attribute(NameTest),
    Text,
    SelfNode,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    Any,
    Name { prefix: Option<String>, local: String },
}

impl NameTest {
    fn from_qname(qname: &str) -> Self {
        match qname.split_once(':') {
            Some((prefix, local)) => NameTest::Name {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => NameTest::Name {
                prefix: None,
                local: qname.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[n]`, 1-based
    Position(usize),
    /// `[@a]`
    HasAttribute(NameTest),
    /// `[@a='v']`
    AttributeEquals(NameTest, String),
}

struct Parser<'a, I: Iterator<Item = Token<'a>>> {
    expression: &'a str,
    tokens: Peekable<I>,
}

/// Parse a location path expression
pub fn parse(expression: &str) -> Result<LocationPath, PathError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(expression);
    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(PathError::Syntax {
                    expression: expression.to_string(),
                    message: format!("unexpected character at offset {}", lexer.span().start),
                })
            }
        }
    }

    let mut parser = Parser {
        expression,
        tokens: tokens.into_iter().peekable(),
    };
    parser.location_path()
}

impl<'a, I: Iterator<Item = Token<'a>>> Parser<'a, I> {
    fn error(&self, message: impl Into<String>) -> PathError {
        PathError::Syntax {
            expression: self.expression.to_string(),
            message: message.into(),
        }
    }

    fn location_path(&mut self) -> Result<LocationPath, PathError> {
        let mut steps = Vec::new();
        let (absolute, mut recursive) = match self.tokens.peek() {
            Some(Token::Slash) => {
                self.tokens.next();
                (true, false)
            }
            Some(Token::DoubleSlash) => {
                self.tokens.next();
                (true, true)
            }
            None => return Err(self.error("empty expression")),
            _ => (false, false),
        };

        // A lone "/" selects the document root
        if absolute && !recursive && self.tokens.peek().is_none() {
            return Ok(LocationPath { absolute, steps });
        }

        loop {
            steps.push(self.step(recursive)?);
            match self.tokens.next() {
                None => break,
                Some(Token::Slash) => recursive = false,
                Some(Token::DoubleSlash) => recursive = true,
                Some(other) => return Err(self.error(format!("unexpected token '{}'", other))),
            }
        }

        Ok(LocationPath { absolute, steps })
    }

    fn step(&mut self, recursive: bool) -> Result<Step, PathError> {
        let kind = match self.tokens.next() {
            Some(Token::Dot) => StepKind::SelfNode,
            Some(Token::DotDot) => StepKind::Parent,
            Some(Token::TextTest) => StepKind::Text,
            Some(Token::Star) => StepKind::Child(NameTest::Any),
            Some(Token::Name(name)) => StepKind::Child(NameTest::from_qname(name)),
            Some(Token::At) => StepKind::Attribute(self.name_test()?),
            Some(other) => return Err(self.error(format!("unexpected token '{}'", other))),
            None => return Err(self.error("expected a location step")),
        };

        let mut predicates = Vec::new();
        while let Some(Token::LBracket) = self.tokens.peek() {
            self.tokens.next();
            predicates.push(self.predicate()?);
        }

        Ok(Step {
            recursive,
            kind,
            predicates,
        })
    }

    fn name_test(&mut self) -> Result<NameTest, PathError> {
        match self.tokens.next() {
            Some(Token::Star) => Ok(NameTest::Any),
            Some(Token::Name(name)) => Ok(NameTest::from_qname(name)),
            _ => Err(self.error("expected a name test")),
        }
    }

    fn predicate(&mut self) -> Result<Predicate, PathError> {
        let predicate = match self.tokens.next() {
            Some(Token::Integer(0)) => return Err(self.error("positions start at 1")),
            Some(Token::Integer(n)) => Predicate::Position(n),
            Some(Token::At) => {
                let test = self.name_test()?;
                if let Some(Token::Equals) = self.tokens.peek() {
                    self.tokens.next();
                    match self.tokens.next() {
                        Some(Token::Literal(value)) => Predicate::AttributeEquals(test, value.to_string()),
                        _ => return Err(self.error("expected a string literal")),
                    }
                } else {
                    Predicate::HasAttribute(test)
                }
            }
            _ => return Err(self.error("unsupported predicate")),
        };

        match self.tokens.next() {
            Some(Token::RBracket) => Ok(predicate),
            _ => Err(self.error("expected ']'")),
        }
    }
}
