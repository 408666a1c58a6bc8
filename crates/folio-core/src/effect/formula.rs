//! Templated effects resolved against a die roll.
//!
//! A `random_effect` page carries amounts such as `"-{roll}"` or
//! `"roll * 2 - 1"`. These are parsed into a small integer expression tree
//! that knows only literals, the roll, `+ - * /`, unary minus and
//! parentheses. Nothing else is accepted. Lexing is done by `logos`,
//! parsing by `chumsky`.

use std::fmt;

use chumsky::input::ValueInput;
use chumsky::prelude::*;
use logos::Logos;
use serde::{Deserialize, Serialize};

use super::EffectDelta;
use crate::error::{CoreError, CoreResult};

/// A parsed arithmetic formula over a single `roll` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Num(i64),
    Roll,
    Neg(Box<Expr>),
    Bin(Op, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Num(i64),
    Roll,
    Op(Op),
    Open,
    Close,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{n}"),
            Token::Roll => f.write_str("roll"),
            Token::Op(op) => write!(f, "{op}"),
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
        }
    }
}

/// Borrowing logos token, converted to [`Token`] after lexing.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t]+")]
enum RawToken {
    #[regex(r"[0-9]+")]
    Num,

    #[token("roll")]
    #[token("{roll}")]
    Roll,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    Open,

    #[token(")")]
    Close,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name,
}

impl Formula {
    /// Parse a formula. `{roll}` and `roll` both name the die value.
    pub fn parse(source: &str) -> CoreResult<Self> {
        let fail = |reason: &str| CoreError::MalformedFormula {
            formula: source.to_string(),
            reason: reason.to_string(),
        };

        let tokens = lex(source).map_err(|r| fail(&r))?;
        if tokens.is_empty() {
            return Err(fail("empty formula"));
        }
        let (expr, errors) = formula_parser()
            .parse(tokens.as_slice())
            .into_output_errors();
        let expr = match (expr, errors.first()) {
            (Some(expr), None) => expr,
            (_, Some(error)) => return Err(fail(&error.to_string())),
            (None, None) => return Err(fail("unparseable formula")),
        };
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// Evaluate with the given die roll.
    pub fn eval(&self, roll: u32) -> CoreResult<i32> {
        let value = eval(&self.expr, i64::from(roll)).map_err(|reason| {
            CoreError::MalformedFormula {
                formula: self.source.clone(),
                reason,
            }
        })?;
        i32::try_from(value).map_err(|_| CoreError::MalformedFormula {
            formula: self.source.clone(),
            reason: "result out of range".to_string(),
        })
    }

    /// The authored text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

fn lex(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let token = match result {
            Ok(RawToken::Num) => {
                let value = lexer
                    .slice()
                    .parse::<i64>()
                    .map_err(|_| format!("number too large: {}", lexer.slice()))?;
                Token::Num(value)
            }
            Ok(RawToken::Roll) => Token::Roll,
            Ok(RawToken::Plus) => Token::Op(Op::Add),
            Ok(RawToken::Minus) => Token::Op(Op::Sub),
            Ok(RawToken::Star) => Token::Op(Op::Mul),
            Ok(RawToken::Slash) => Token::Op(Op::Div),
            Ok(RawToken::Open) => Token::Open,
            Ok(RawToken::Close) => Token::Close,
            Ok(RawToken::Name) => return Err(format!("unknown name '{}'", lexer.slice())),
            Err(()) => return Err(format!("unexpected character {:?}", lexer.slice())),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

/// `expr := sum`, `sum := product (('+' | '-') product)*`,
/// `product := unary (('*' | '/') unary)*`, `unary := ('-' | '+')* atom`.
fn formula_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let atom = choice((
            select! {
                Token::Num(n) => Expr::Num(n),
                Token::Roll => Expr::Roll,
            },
            expr.delimited_by(just(Token::Open), just(Token::Close)),
        ))
        .labelled("a number, 'roll' or '('");

        let sign = select! {
            Token::Op(Op::Sub) => true,
            Token::Op(Op::Add) => false,
        };
        let unary = sign.repeated().foldr(atom, |negate, rhs| {
            if negate { Expr::Neg(Box::new(rhs)) } else { rhs }
        });

        let product_op = select! { Token::Op(op @ (Op::Mul | Op::Div)) => op };
        let product = unary
            .clone()
            .foldl(product_op.then(unary).repeated(), |lhs, (op, rhs)| {
                bin(op, lhs, rhs)
            });

        let sum_op = select! { Token::Op(op @ (Op::Add | Op::Sub)) => op };
        product
            .clone()
            .foldl(sum_op.then(product).repeated(), |lhs, (op, rhs)| {
                bin(op, lhs, rhs)
            })
    })
    .then_ignore(end())
}

fn bin(op: Op, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Bin(op, Box::new(lhs), Box::new(rhs))
}

fn eval(expr: &Expr, roll: i64) -> Result<i64, String> {
    let overflow = || "arithmetic overflow".to_string();
    match expr {
        Expr::Num(n) => Ok(*n),
        Expr::Roll => Ok(roll),
        Expr::Neg(inner) => eval(inner, roll)?.checked_neg().ok_or_else(overflow),
        Expr::Bin(op, lhs, rhs) => {
            let (a, b) = (eval(lhs, roll)?, eval(rhs, roll)?);
            match op {
                Op::Add => a.checked_add(b).ok_or_else(overflow),
                Op::Sub => a.checked_sub(b).ok_or_else(overflow),
                Op::Mul => a.checked_mul(b).ok_or_else(overflow),
                Op::Div if b == 0 => Err("division by zero".to_string()),
                Op::Div => a.checked_div(b).ok_or_else(overflow),
            }
        }
    }
}

/// A fixed number or a formula over the die roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    /// A literal delta.
    Fixed(i32),
    /// A formula such as `"-{roll}"`.
    Formula(String),
}

impl Amount {
    /// Resolve against a die roll.
    pub fn resolve(&self, roll: u32) -> CoreResult<i32> {
        match self {
            Self::Fixed(n) => Ok(*n),
            Self::Formula(text) => Formula::parse(text)?.eval(roll),
        }
    }

    /// Check that a formula amount parses.
    pub fn check(&self) -> CoreResult<()> {
        match self {
            Self::Fixed(_) => Ok(()),
            Self::Formula(text) => Formula::parse(text).map(|_| ()),
        }
    }
}

/// The authored `effect_template` of a `random_effect` page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTemplate {
    /// STAMINA amount.
    pub stamina: Option<Amount>,
    /// SKILL amount.
    pub skill: Option<Amount>,
    /// LUCK amount.
    pub luck: Option<Amount>,
    /// Gold amount.
    pub gold: Option<Amount>,
    /// Lose every gold piece.
    pub lose_all_gold: bool,
    /// Items gained.
    pub add_items: Vec<String>,
    /// Items lost.
    pub remove_items: Vec<String>,
    /// Number of random items lost.
    pub lose_random_items: Option<u32>,
}

impl EffectTemplate {
    /// Substitute `roll` into every formula and produce a concrete delta.
    pub fn resolve(&self, roll: u32) -> CoreResult<EffectDelta> {
        let amount = |a: &Option<Amount>| a.as_ref().map(|a| a.resolve(roll)).transpose();
        Ok(EffectDelta {
            stamina: amount(&self.stamina)?,
            skill: amount(&self.skill)?,
            luck: amount(&self.luck)?,
            gold: amount(&self.gold)?,
            lose_all_gold: self.lose_all_gold,
            add_items: self.add_items.clone(),
            remove_items: self.remove_items.clone(),
            lose_random_items: self.lose_random_items,
        })
    }

    /// Parse every formula without evaluating it.
    pub fn check(&self) -> CoreResult<()> {
        [&self.stamina, &self.skill, &self.luck, &self.gold]
            .into_iter()
            .flatten()
            .try_for_each(Amount::check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str, roll: u32) -> i32 {
        Formula::parse(text).unwrap().eval(roll).unwrap()
    }

    #[test]
    fn braced_and_bare_roll() {
        assert_eq!(eval("-{roll}", 4), -4);
        assert_eq!(eval("roll", 6), 6);
        assert_eq!(eval("{roll} + 1", 2), 3);
    }

    #[test]
    fn precedence_and_parens() {
        assert_eq!(eval("2 + roll * 3", 2), 8);
        assert_eq!(eval("(2 + roll) * 3", 2), 12);
        assert_eq!(eval("-(roll - 1) * 2", 4), -6);
        assert_eq!(eval("roll / 2", 5), 2);
    }

    #[test]
    fn stacked_signs() {
        assert_eq!(eval("--roll", 3), 3);
        assert_eq!(eval("2 * -roll", 3), -6);
        assert_eq!(eval("+roll - -1", 3), 4);
    }

    #[test]
    fn lexer_names_the_bad_input() {
        let err = Formula::parse("rolls + 1").unwrap_err();
        assert!(err.to_string().contains("unknown name 'rolls'"), "{err}");
        let err = Formula::parse("roll % 2").unwrap_err();
        assert!(err.to_string().contains("unexpected character"), "{err}");
    }

    #[test]
    fn rejects_names_and_symbols() {
        for bad in ["", "roll +", "__import__('os')", "roll ** 2", "(roll", "3 4", "dice"] {
            let err = Formula::parse(bad).unwrap_err();
            assert!(matches!(err, CoreError::MalformedFormula { .. }), "{bad}");
        }
    }

    #[test]
    fn division_by_zero_fails_at_eval() {
        let f = Formula::parse("roll / (roll - 3)").unwrap();
        assert_eq!(f.eval(4).unwrap(), 4);
        assert!(f.eval(3).is_err());
    }

    #[test]
    fn template_resolves_mixed_amounts() {
        let template: EffectTemplate = serde_json::from_str(
            r#"{"stamina": "-{roll}", "gold": 3, "add_items": ["Bone Charm"]}"#,
        )
        .unwrap();
        let delta = template.resolve(5).unwrap();
        assert_eq!(delta.stamina, Some(-5));
        assert_eq!(delta.gold, Some(3));
        assert_eq!(delta.skill, None);
        assert_eq!(delta.add_items, vec!["Bone Charm".to_string()]);
    }

    #[test]
    fn template_check_reports_bad_formula() {
        let template = EffectTemplate {
            luck: Some(Amount::Formula("roll ^ 2".into())),
            ..EffectTemplate::default()
        };
        assert!(template.check().is_err());
        assert!(EffectTemplate::default().check().is_ok());
    }
}
