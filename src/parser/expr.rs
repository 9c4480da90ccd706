use crate::{
    ast::ast::{LiteralKind, NodeId, NodeKind, OperatorKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    stmt::{parse_stmt, parse_terminator},
};

/// Parses an expression whose operators bind tighter than `bp`.
///
/// An operator at the start of a new line never continues the expression,
/// so line breaks separate statements.
///
/// # Arguments
///
/// * `parser` - The parser positioned at the first token of the expression
/// * `bp` - Binding power of the enclosing operator
///
/// # Returns
///
/// The id of the parsed expression node.
pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    parser.nested(|parser| parse_nested_expr(parser, bp))
}

fn parse_nested_expr(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud_fn = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud_fn) => *nud_fn,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token = parser.current_token();
        if token.newline_before {
            break;
        }

        let token_kind = token.kind;
        let token_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);

        if token_bp <= bp {
            break;
        }

        let led_fn = match parser.get_led_lookup().get(&token_kind) {
            Some(led_fn) => *led_fn,
            None => break,
        };

        left = led_fn(parser, left, token_bp)?;
    }

    Ok(left)
}

/// Whether `kind` can start a type expression directly after a signature or
/// an array size.
pub fn starts_type(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::OpenParen
            | TokenKind::OpenBracket
            | TokenKind::Ampersand
            | TokenKind::Func
    )
}

fn infix_operator(kind: TokenKind) -> Option<OperatorKind> {
    let op = match kind {
        TokenKind::Plus => OperatorKind::Add,
        TokenKind::Dash => OperatorKind::Sub,
        TokenKind::Star => OperatorKind::Mul,
        TokenKind::Slash => OperatorKind::Div,
        TokenKind::Percent => OperatorKind::Mod,
        TokenKind::Ampersand => OperatorKind::BitAnd,
        TokenKind::Pipe => OperatorKind::BitOr,
        TokenKind::Caret => OperatorKind::BitXor,
        TokenKind::ShiftLeft => OperatorKind::Shl,
        TokenKind::ShiftRight => OperatorKind::Shr,
        TokenKind::Equals => OperatorKind::Eq,
        TokenKind::NotEquals => OperatorKind::Ne,
        TokenKind::Less => OperatorKind::Lt,
        TokenKind::LessEquals => OperatorKind::Le,
        TokenKind::Greater => OperatorKind::Gt,
        TokenKind::GreaterEquals => OperatorKind::Ge,
        TokenKind::Assignment => OperatorKind::Assign,
        _ => return None,
    };
    Some(op)
}

pub fn ident_node(parser: &mut Parser, token: &Token) -> NodeId {
    parser.alloc(NodeKind::Ident(token.value.clone()), token.span.clone())
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let literal_kind = match parser.current_token_kind() {
        TokenKind::Int => LiteralKind::Int,
        TokenKind::Float => LiteralKind::Float,
        TokenKind::String => LiteralKind::String,
        TokenKind::Identifier => {
            let token = parser.advance();
            return Ok(ident_node(parser, &token));
        }
        _ => return Err(parser.unexpected()),
    };

    let token = parser.advance();
    Ok(parser.alloc(
        NodeKind::Literal {
            kind: literal_kind,
            value: token.value,
        },
        token.span,
    ))
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: NodeId,
    bp: BindingPower,
) -> Result<NodeId, Error> {
    let kind = match infix_operator(parser.current_token_kind()) {
        Some(kind) => kind,
        None => return Err(parser.unexpected()),
    };
    let operator_token = parser.advance();
    let op = parser.alloc(NodeKind::Operator(kind), operator_token.span);

    let right = parse_expr(parser, bp)?;
    let span = parser.span(left).to(&parser.span(right));

    Ok(parser.alloc(
        NodeKind::InfixOp {
            op,
            lhs: left,
            rhs: right,
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let operator_token = parser.advance();
    let mut op_span = operator_token.span.clone();

    let kind = match operator_token.kind {
        TokenKind::Dash => OperatorKind::Neg,
        TokenKind::Not => OperatorKind::Not,
        TokenKind::Ampersand if parser.current_token_kind() == TokenKind::Mut => {
            op_span = op_span.to(&parser.advance().span);
            OperatorKind::MutAddr
        }
        TokenKind::Ampersand => OperatorKind::Addr,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let op = parser.alloc(NodeKind::Operator(kind), op_span.clone());
    let operand = parse_expr(parser, BindingPower::Unary)?;
    let span = op_span.to(&parser.span(operand));

    Ok(parser.alloc(NodeKind::PrefixOp { op, operand }, span))
}

pub fn parse_postfix_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    let operator_token = parser.advance();
    let kind = if operator_token.kind == TokenKind::DotStar {
        OperatorKind::Unwrap
    } else {
        OperatorKind::Try
    };

    let op = parser.alloc(NodeKind::Operator(kind), operator_token.span.clone());
    let span = parser.span(left).to(&operator_token.span);

    Ok(parser.alloc(NodeKind::PostfixOp { op, operand: left }, span))
}

/// Parses a comma separated list between the current opening token and
/// `close`.
///
/// # Returns
///
/// The elements, the span covering both delimiters, and whether the list
/// ended with a trailing comma.
pub fn parse_list(
    parser: &mut Parser,
    close: TokenKind,
) -> Result<(Vec<NodeId>, Span, bool), Error> {
    let open = parser.advance();
    let mut items = vec![];
    let mut trailing_comma = false;

    while parser.current_token_kind() != close {
        if !parser.has_tokens() {
            return Err(parser.unexpected());
        }

        items.push(parse_expr(parser, BindingPower::Default)?);
        trailing_comma = false;

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            trailing_comma = true;
        } else if parser.current_token_kind() != close {
            return Err(parser.unexpected());
        }
    }

    let close = parser.expect(close)?;
    Ok((items, open.span.to(&close.span), trailing_comma))
}

pub fn parse_paren_list(parser: &mut Parser) -> Result<NodeId, Error> {
    if parser.current_token_kind() != TokenKind::OpenParen {
        return Err(parser.unexpected());
    }

    let (items, span, _) = parse_list(parser, TokenKind::CloseParen)?;
    Ok(parser.alloc(NodeKind::ParenList(items), span))
}

/// `(expr)` groups, `()`, `(a,)` and `(a, b)` are tuples.
pub fn parse_paren_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let (items, span, trailing_comma) = parse_list(parser, TokenKind::CloseParen)?;

    if items.len() == 1 && !trailing_comma {
        return Ok(items[0]);
    }

    Ok(parser.alloc(NodeKind::ParenList(items), span))
}

/// Array literal `[a, b]`, or array type `[N]T` when a type follows on the
/// same line.
pub fn parse_bracket_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let (items, span, _) = parse_list(parser, TokenKind::CloseBracket)?;
    let args = parser.alloc(NodeKind::BracketList(items), span.clone());

    let next = parser.current_token();
    if next.newline_before || !starts_type(next.kind) {
        return Ok(args);
    }

    let elem = parse_expr(parser, BindingPower::Unary)?;
    let span = span.to(&parser.span(elem));

    Ok(parser.alloc(NodeKind::ArrayType { args, elem }, span))
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    let args = parse_paren_list(parser)?;
    let span = parser.span(left).to(&parser.span(args));

    Ok(parser.alloc(NodeKind::Call { callee: left, args }, span))
}

pub fn parse_index_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    let (items, list_span, _) = parse_list(parser, TokenKind::CloseBracket)?;
    let args = parser.alloc(NodeKind::BracketList(items), list_span.clone());
    let span = parser.span(left).to(&list_span);

    Ok(parser.alloc(NodeKind::Index { target: left, args }, span))
}

/// Parses `{ ... }` into a curly list of statements.
pub fn parse_block_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.nested(parse_nested_block)
}

fn parse_nested_block(parser: &mut Parser) -> Result<NodeId, Error> {
    let open = parser.expect(TokenKind::OpenCurly)?;
    let mut statements = vec![];

    loop {
        while parser.current_token_kind() == TokenKind::Semicolon {
            parser.advance();
        }

        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::EOF => return Err(parser.unexpected_detailed("expected `}`")),
            _ => {}
        }

        statements.push(parse_stmt(parser)?);
        parse_terminator(parser)?;
    }

    let close = parser.expect(TokenKind::CloseCurly)?;
    Ok(parser.alloc(NodeKind::CurlyList(statements), open.span.to(&close.span)))
}

pub fn parse_builtin_call_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let at = parser.advance();
    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = ident_node(parser, &name_token);

    let args = match parser.current_token_kind() {
        TokenKind::OpenParen => parse_paren_list(parser)?,
        TokenKind::OpenCurly => parse_block_expr(parser)?,
        _ => return Err(parser.unexpected_detailed("expected built-in arguments")),
    };
    let span = at.span.to(&parser.span(args));

    Ok(parser.alloc(NodeKind::BuiltInCall { name, args }, span))
}

pub fn parse_if_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;

    let cond = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block_expr(parser)?;

    let else_ = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(parse_if_expr(parser)?)
        } else {
            Some(parse_block_expr(parser)?)
        }
    } else {
        None
    };

    let end = parser.span(else_.unwrap_or(body));
    Ok(parser.alloc(NodeKind::If { cond, body, else_ }, start.to(&end)))
}

pub fn parse_while_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;

    let cond = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block_expr(parser)?;
    let span = start.to(&parser.span(body));

    Ok(parser.alloc(NodeKind::While { cond, body }, span))
}

/// Parses an optional result type following a parameter list.
pub fn parse_result_type(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let next = parser.current_token();
    if next.newline_before || !starts_type(next.kind) {
        return Ok(None);
    }

    Ok(Some(parse_expr(parser, BindingPower::Unary)?))
}

/// `func(T, ...) R` as a type expression.
pub fn parse_signature_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;

    let params = parse_paren_list(parser)?;
    let result = parse_result_type(parser)?;
    let end = parser.span(result.unwrap_or(params));

    Ok(parser.alloc(NodeKind::Signature { params, result }, start.to(&end)))
}
