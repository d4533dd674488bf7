//! Outcomes: the keys of a distribution.
//!
//! An outcome is an ordered sequence of [`Symbol`]s, stored either as a tuple or as a
//! string. The [`OutcomeClass`] of a distribution plays the role of its outcome constructor:
//! new outcome fragments are built with it so they can be concatenated onto existing outcomes.

use crate::probability::ProbabilityError;

/// The number of non-negative values of [`Symbol::Int`].
pub const MAX_INT_SYMBOLS: usize = 1 << 31;

/// An elementary symbol of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Int(i32),
    Char(char),
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Int(i) => write!(f, "{}", i),
            Symbol::Char(c) => write!(f, "{}", c),
        }
    }
}

impl From<i32> for Symbol {
    fn from(value: i32) -> Self {
        Symbol::Int(value)
    }
}

impl From<char> for Symbol {
    fn from(value: char) -> Self {
        Symbol::Char(value)
    }
}

/// How outcomes of a distribution are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeClass {
    /// Outcomes are tuples of arbitrary symbols.
    Tuple,
    /// Outcomes are strings; every symbol is a character.
    Text,
}

impl OutcomeClass {
    /// Builds an outcome of this class from a sequence of symbols.
    pub fn construct(self, symbols: Vec<Symbol>) -> Result<Outcome, ProbabilityError> {
        match self {
            OutcomeClass::Tuple => Ok(Outcome::Tuple(symbols)),
            OutcomeClass::Text => symbols
                .into_iter()
                .map(|symbol| match symbol {
                    Symbol::Char(c) => Ok(c),
                    Symbol::Int(_) => Err(ProbabilityError::InvalidSymbol { symbol }),
                })
                .collect::<Result<String, _>>()
                .map(Outcome::Text),
        }
    }

    /// Renders a boolean as a one-symbol outcome: `(0,)`/`(1,)` or `"0"`/`"1"`.
    pub fn boolean(self, value: bool) -> Outcome {
        match self {
            OutcomeClass::Tuple => Outcome::Tuple(vec![Symbol::Int(i32::from(value))]),
            OutcomeClass::Text => Outcome::Text(if value { "1" } else { "0" }.to_string()),
        }
    }
}

/// One elementary event of a joint distribution.
///
/// Outcomes of different classes never compare equal, even if they hold the same symbols.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Tuple(Vec<Symbol>),
    Text(String),
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Tuple(symbols) => write!(
                f,
                "({})",
                symbols
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Outcome::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<&str> for Outcome {
    fn from(value: &str) -> Self {
        Outcome::Text(value.to_string())
    }
}

impl From<Vec<Symbol>> for Outcome {
    fn from(value: Vec<Symbol>) -> Self {
        Outcome::Tuple(value)
    }
}

impl From<&[i32]> for Outcome {
    fn from(value: &[i32]) -> Self {
        Outcome::ints(value)
    }
}

impl Outcome {
    /// A tuple outcome of integers.
    pub fn ints(values: &[i32]) -> Self {
        Outcome::Tuple(values.iter().map(|&i| Symbol::Int(i)).collect())
    }

    /// A string outcome.
    pub fn text(value: &str) -> Self {
        Outcome::Text(value.to_string())
    }

    pub fn class(&self) -> OutcomeClass {
        match self {
            Outcome::Tuple(_) => OutcomeClass::Tuple,
            Outcome::Text(_) => OutcomeClass::Text,
        }
    }

    /// The number of symbols in the outcome.
    pub fn len(&self) -> usize {
        match self {
            Outcome::Tuple(symbols) => symbols.len(),
            Outcome::Text(text) => text.chars().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The symbol at position `index`, if any.
    pub fn symbol(&self, index: usize) -> Option<Symbol> {
        match self {
            Outcome::Tuple(symbols) => symbols.get(index).copied(),
            Outcome::Text(text) => text.chars().nth(index).map(Symbol::Char),
        }
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        match self {
            Outcome::Tuple(symbols) => symbols.clone(),
            Outcome::Text(text) => text.chars().map(Symbol::Char).collect(),
        }
    }

    /// Appends `other` to this outcome. Both must be of the same class.
    pub fn concat(&self, other: &Outcome) -> Result<Outcome, ProbabilityError> {
        match (self, other) {
            (Outcome::Tuple(a), Outcome::Tuple(b)) => {
                let mut symbols = Vec::with_capacity(a.len() + b.len());
                symbols.extend_from_slice(a);
                symbols.extend_from_slice(b);
                Ok(Outcome::Tuple(symbols))
            }
            (Outcome::Text(a), Outcome::Text(b)) => Ok(Outcome::Text(format!("{}{}", a, b))),
            _ => Err(ProbabilityError::OutcomeClassMismatch {
                left: self.class(),
                right: other.class(),
            }),
        }
    }
}
