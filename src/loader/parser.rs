//! Fact parser using Pest
//!
//! Turns one line of solver output into ground facts. Terms keep their
//! source text so that node names round-trip unchanged.

use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "loader/facts.pest"]
pub struct FactParser;

/// A ground term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Symbol, number, quoted string or function term, as written
    Constant(String),
    /// Parenthesized tuple with its source text
    Tuple { text: String, items: Vec<Term> },
}

impl Term {
    /// Source text of the term
    pub fn text(&self) -> &str {
        match self {
            Term::Constant(text) => text,
            Term::Tuple { text, .. } => text,
        }
    }

    /// Components of a pair `(x, y)`
    pub fn as_pair(&self) -> Option<(&Term, &Term)> {
        match self {
            Term::Tuple { items, .. } if items.len() == 2 => Some((&items[0], &items[1])),
            _ => None,
        }
    }
}

/// A fact `predicate(arg, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub predicate: String,
    pub args: Vec<Term>,
}

/// Parse every fact on a line
pub fn parse_line(input: &str) -> Result<Vec<Fact>, pest::error::Error<Rule>> {
    let pairs = FactParser::parse(Rule::line, input)?;

    let mut facts = Vec::new();
    for pair in pairs {
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::fact {
                facts.push(parse_fact(inner));
            }
        }
    }
    Ok(facts)
}

fn parse_fact(pair: pest::iterators::Pair<Rule>) -> Fact {
    let mut predicate = String::new();
    let mut args = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::name => predicate = inner.as_str().to_string(),
            Rule::term => args.push(parse_term(inner)),
            _ => {}
        }
    }

    Fact { predicate, args }
}

fn parse_term(pair: pest::iterators::Pair<Rule>) -> Term {
    let text = pair.as_str().to_string();
    match pair.into_inner().next() {
        Some(inner) if inner.as_rule() == Rule::tuple => Term::Tuple {
            text,
            items: inner.into_inner().map(parse_term).collect(),
        },
        _ => Term::Constant(text),
    }
}
