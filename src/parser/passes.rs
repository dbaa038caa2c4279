//! Reduction passes over a token list.
//!
//! Each pass consumes a `Vec<Token>` and folds it left to right into a new one,
//! condensing every match of its pattern into a single resolved token. The
//! output list doubles as a stack, so a condensed token is immediately
//! available as the left operand of the next match; that is what makes
//! chained operators of one precedence level left associative.

use super::error::ParseError;
use super::schema::Schema;
use super::token::{Token, TokenKind};
use super::tokenizer::parse_number;
use crate::expr::Expr;

/// Binary operator levels, tightest binding first
pub const BINARY_PRECEDENCE: [&[TokenKind]; 6] = [
    &[TokenKind::Multiply, TokenKind::Divide, TokenKind::Modulus],
    &[TokenKind::BinaryPlus, TokenKind::BinaryMinus],
    &[
        TokenKind::Less,
        TokenKind::Greater,
        TokenKind::LessEqual,
        TokenKind::GreaterEqual,
    ],
    &[TokenKind::Equal, TokenKind::NotEqual],
    &[TokenKind::LogicalAnd],
    &[TokenKind::LogicalOr],
];

/// Turn identifiers and numbers into resolved tokens.
///
/// `source` is the whitespace-free string the tokens were cut from; it is only
/// used to point at the offending token in errors.
pub fn resolve_leaves<C: 'static, S: Schema<C> + ?Sized>(
    tokens: Vec<Token<C>>,
    schema: &S,
    source: &str,
) -> Result<Vec<Token<C>>, ParseError> {
    let mut offset = 0;
    let mut resolved = Vec::with_capacity(tokens.len());
    for token in tokens {
        let span = (offset, token.text().len());
        offset += token.text().len();
        let token = match token.kind() {
            TokenKind::Identifier => match schema.resolve(token.text()) {
                Some(expr) => Token::resolved(expr.with_name(token.text())),
                None => {
                    return Err(ParseError::UnknownVariable {
                        name: token.text().to_string(),
                        span: span.into(),
                        src: source.to_string(),
                    })
                }
            },
            TokenKind::Number => {
                let value = parse_number(token.text()).ok_or_else(|| ParseError::InvalidNumber {
                    literal: token.text().to_string(),
                    span: span.into(),
                    src: source.to_string(),
                })?;
                Token::resolved(Expr::scalar(token.text(), move |_| value))
            }
            _ => token,
        };
        resolved.push(token);
    }
    Ok(resolved)
}

/// Index of the bracket closing the one at `open`, counting nesting of the
/// same bracket kind only. `None` if `open` is not an opener or is never closed.
pub fn find_close<C>(tokens: &[Token<C>], open: usize) -> Option<usize> {
    let open_kind = tokens.get(open)?.kind();
    let close_kind = open_kind.closer()?;
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind() == open_kind {
            depth += 1;
        } else if token.kind() == close_kind {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn concatenate<C>(tokens: &[Token<C>]) -> String {
    tokens.iter().map(Token::text).collect()
}

/// `vector [ scalar ]` becomes a single scalar
pub fn apply_subscripts<C: 'static>(tokens: Vec<Token<C>>) -> Vec<Token<C>> {
    let mut out: Vec<Token<C>> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.kind() == TokenKind::CloseSquare {
            if let [.., vector, open, index] = out.as_slice() {
                if vector.kind() == TokenKind::ResolvedVector
                    && open.kind() == TokenKind::OpenSquare
                    && index.kind() == TokenKind::ResolvedScalar
                {
                    let start = out.len() - 3;
                    let name = concatenate(&out[start..]) + token.text();
                    let mut operands = out.drain(start..);
                    let vector = operands.next().and_then(Token::into_value);
                    let index = operands.nth(1).and_then(Token::into_value);
                    drop(operands);
                    if let Some(expr) = vector
                        .zip(index)
                        .and_then(|(vector, index)| vector.subscript(index))
                    {
                        out.push(Token::resolved(expr.with_name(name)));
                        continue;
                    }
                }
            }
        }
        out.push(token);
    }
    out
}

/// `( value )` becomes the value, renamed to include the parentheses
pub fn merge_parentheses<C>(tokens: Vec<Token<C>>) -> Vec<Token<C>> {
    let mut out: Vec<Token<C>> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.kind() == TokenKind::CloseParen {
            if let [.., open, inner] = out.as_slice() {
                if open.kind() == TokenKind::OpenParen && inner.kind().is_resolved() {
                    let name = format!("({})", inner.text());
                    if let Some(mut inner) = out.pop() {
                        out.pop();
                        inner.rename(&name);
                        out.push(inner);
                        continue;
                    }
                }
            }
        }
        out.push(token);
    }
    out
}

/// Role of an ambiguous `+`/`-` given the kind of the token before it (`None`
/// at the start of the expression). Other kinds are returned unchanged.
pub fn disambiguate(kind: TokenKind, previous: Option<TokenKind>) -> TokenKind {
    use TokenKind::*;
    let (binary, unary) = match kind {
        AmbiguousPlus => (BinaryPlus, UnaryPlus),
        AmbiguousMinus => (BinaryMinus, UnaryMinus),
        other => return other,
    };
    match previous.unwrap_or(OpenParen) {
        ResolvedScalar | ResolvedVector | Number | Identifier | CloseParen | CloseSquare => binary,
        Unknown => kind,
        _ => unary,
    }
}

pub fn disambiguate_plus_minus<C>(tokens: Vec<Token<C>>) -> Vec<Token<C>> {
    let mut out: Vec<Token<C>> = Vec::with_capacity(tokens.len());
    for mut token in tokens {
        let kind = disambiguate(token.kind(), out.last().map(Token::kind));
        if kind != token.kind() {
            token.reclassify(kind);
        }
        out.push(token);
    }
    out
}

fn unary_operation<C: 'static>(op: TokenKind, operand: Expr<C>) -> Expr<C> {
    match op {
        TokenKind::UnaryMinus => -operand,
        TokenKind::LogicalNot => !operand,
        _ => operand.pos(),
    }
}

/// Apply prefix `+`, `-` and `!`, innermost first so `!!x` and `--x` chain
pub fn apply_unary<C: 'static>(tokens: Vec<Token<C>>) -> Vec<Token<C>> {
    let mut out: Vec<Token<C>> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Some(mut expr) = token.value().cloned() else {
            out.push(token);
            continue;
        };
        let mut applied = false;
        while let Some(op) = out
            .last()
            .map(Token::kind)
            .filter(|kind| kind.is_unary_operator())
        {
            out.pop();
            expr = unary_operation(op, expr);
            applied = true;
        }
        out.push(if applied { Token::resolved(expr) } else { token });
    }
    out
}

fn binary_operation<C: 'static>(lhs: Expr<C>, op: TokenKind, rhs: Expr<C>) -> Expr<C> {
    use TokenKind::*;
    match op {
        Multiply => lhs * rhs,
        Divide => lhs / rhs,
        Modulus => lhs % rhs,
        BinaryPlus => lhs + rhs,
        BinaryMinus => lhs - rhs,
        Less => lhs.less(rhs),
        Greater => lhs.greater(rhs),
        LessEqual => lhs.less_equal(rhs),
        GreaterEqual => lhs.greater_equal(rhs),
        Equal => lhs.equal(rhs),
        NotEqual => lhs.not_equal(rhs),
        LogicalAnd => lhs.and(rhs),
        LogicalOr => lhs.or(rhs),
        other => unreachable!("{:?} is not a binary operator", other),
    }
}

/// Condense `value op value` for every `op` in `operators`, left to right
pub fn reduce_binary<C: 'static>(tokens: Vec<Token<C>>, operators: &[TokenKind]) -> Vec<Token<C>> {
    let mut out: Vec<Token<C>> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Some(rhs) = token.value().cloned() else {
            out.push(token);
            continue;
        };
        match take_left_operand(&mut out, operators) {
            Some((lhs, op)) => out.push(Token::resolved(binary_operation(lhs, op, rhs))),
            None => out.push(token),
        }
    }
    out
}

/// Pop `value op` off the end of `out` when `op` is one of `operators`
fn take_left_operand<C>(out: &mut Vec<Token<C>>, operators: &[TokenKind]) -> Option<(Expr<C>, TokenKind)> {
    let [.., lhs, op] = out.as_slice() else {
        return None;
    };
    if !operators.contains(&op.kind()) {
        return None;
    }
    let lhs = lhs.value()?.clone();
    let op = op.kind();
    out.truncate(out.len() - 2);
    Some((lhs, op))
}
