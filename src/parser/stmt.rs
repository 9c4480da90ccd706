use crate::{
    ast::ast::{NodeId, NodeKind},
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    expr::{ident_node, parse_block_expr, parse_result_type, starts_type},
    parser::Parser,
};

/// Parses a declaration or an expression statement.
pub fn parse_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    if let Some(stmt_fn) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return stmt_fn(parser);
    }

    if parser.current_token_kind() == TokenKind::Identifier
        && matches!(parser.peek(1).kind, TokenKind::Walrus | TokenKind::Colon)
    {
        return parse_decl_stmt(parser);
    }

    parse_expr(parser, BindingPower::Default)
}

/// Statements end at `;`, at a line break, before `}` or at EOF.
pub fn parse_terminator(parser: &mut Parser) -> Result<(), Error> {
    let token = parser.current_token();

    match token.kind {
        TokenKind::Semicolon => {
            parser.advance();
            Ok(())
        }
        TokenKind::CloseCurly | TokenKind::EOF => Ok(()),
        _ if token.newline_before => Ok(()),
        _ => Err(parser.unexpected_detailed("expected a line break or `;` after statement")),
    }
}

/// `name := value`, `name: T = value`, `name: T` and
/// `name := (params) R { body }`.
pub fn parse_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let name_token = parser.advance();
    let name = ident_node(parser, &name_token);

    if parser.advance().kind == TokenKind::Walrus {
        if is_signature_start(parser) {
            return parse_func_decl(parser, name);
        }

        let value = parse_expr(parser, BindingPower::Default)?;
        let span = name_token.span.to(&parser.span(value));

        return Ok(parser.alloc(
            NodeKind::VarDecl {
                name,
                ty: None,
                value: Some(value),
            },
            span,
        ));
    }

    let ty = parse_expr(parser, BindingPower::Assignment)?;
    let value = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    let span = name_token.span.to(&parser.span(value.unwrap_or(ty)));
    Ok(parser.alloc(
        NodeKind::VarDecl {
            name,
            ty: Some(ty),
            value,
        },
        span,
    ))
}

/// Decides whether the parenthesis at the current token opens a function
/// signature rather than a parenthesised expression.
///
/// A signature either has a `:` directly inside the parentheses, or is
/// empty and is followed on the same line by a result type or a body.
fn is_signature_start(parser: &Parser) -> bool {
    if parser.current_token_kind() != TokenKind::OpenParen {
        return false;
    }

    let mut depth = 0usize;
    let mut offset = 0usize;
    let mut has_colon = false;

    loop {
        let token = parser.peek(offset);

        match token.kind {
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenCurly => depth += 1,
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseCurly => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            TokenKind::Colon if depth == 1 => has_colon = true,
            TokenKind::EOF => return false,
            _ => {}
        }

        offset += 1;
    }

    if has_colon {
        return true;
    }

    let after = parser.peek(offset + 1);
    offset == 1
        && !after.newline_before
        && (after.kind == TokenKind::OpenCurly || starts_type(after.kind))
}

/// Parses `(a: T, ...) R { ... }` after `name :=`.
fn parse_func_decl(parser: &mut Parser, name: NodeId) -> Result<NodeId, Error> {
    let open = parser.expect(TokenKind::OpenParen)?;
    let mut bindings = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        bindings.push(parse_binding(parser)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected());
        }
    }

    let close = parser.expect(TokenKind::CloseParen)?;
    let params = parser.alloc(NodeKind::ParenList(bindings), open.span.to(&close.span));

    let result = parse_result_type(parser)?;
    let signature_span = open.span.to(&parser.span(result.unwrap_or(params)));
    let signature = parser.alloc(NodeKind::Signature { params, result }, signature_span);

    let body = if parser.current_token_kind() == TokenKind::OpenCurly
        && !parser.current_token().newline_before
    {
        Some(parse_block_expr(parser)?)
    } else {
        None
    };

    let span = parser
        .span(name)
        .to(&parser.span(body.unwrap_or(signature)));
    Ok(parser.alloc(
        NodeKind::FuncDecl {
            name,
            signature,
            body,
        },
        span,
    ))
}

/// `name`, `name: T` or `name: T = value`.
fn parse_binding(parser: &mut Parser) -> Result<NodeId, Error> {
    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = ident_node(parser, &name_token);

    let ty = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Assignment)?)
    } else {
        None
    };

    if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        let span = name_token.span.to(&parser.span(value));
        return Ok(parser.alloc(NodeKind::BindingWithValue { name, ty, value }, span));
    }

    let span = name_token.span.to(&parser.span(ty.unwrap_or(name)));
    Ok(parser.alloc(NodeKind::Binding { name, ty }, span))
}

pub fn parse_type_alias_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;

    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = ident_node(parser, &name_token);

    parser.expect(TokenKind::Assignment)?;
    let expr = parse_expr(parser, BindingPower::Default)?;
    let span = start.to(&parser.span(expr));

    Ok(parser.alloc(NodeKind::TypeAliasDecl { name, expr }, span))
}

/// Parses the `{ ... }` member list shared by struct and enum declarations.
fn parse_members(
    parser: &mut Parser,
    member_fn: fn(&mut Parser) -> Result<NodeId, Error>,
) -> Result<(Vec<NodeId>, crate::Span), Error> {
    parser.expect(TokenKind::OpenCurly)?;

    let mut members = vec![];
    loop {
        while matches!(
            parser.current_token_kind(),
            TokenKind::Comma | TokenKind::Semicolon
        ) {
            parser.advance();
        }

        if parser.current_token_kind() == TokenKind::CloseCurly {
            break;
        }

        members.push(member_fn(parser)?);

        let token = parser.current_token();
        if !matches!(
            token.kind,
            TokenKind::Comma | TokenKind::Semicolon | TokenKind::CloseCurly
        ) && !token.newline_before
        {
            return Err(parser.unexpected());
        }
    }

    let close = parser.expect(TokenKind::CloseCurly)?;
    Ok((members, close.span))
}

pub fn parse_struct_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;

    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = ident_node(parser, &name_token);

    let (fields, end) = parse_members(parser, parse_binding)?;

    Ok(parser.alloc(NodeKind::StructDecl { name, fields }, start.to(&end)))
}

fn parse_variant(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(ident_node(parser, &token))
}

pub fn parse_enum_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;

    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = ident_node(parser, &name_token);

    let (variants, end) = parse_members(parser, parse_variant)?;

    Ok(parser.alloc(NodeKind::EnumDecl { name, variants }, start.to(&end)))
}
