use crate::{
    ast::{
        ast::{BlockStmt, Expr},
        expressions::{
            AssignExpr, BinaryExpr, BooleanExpr, DispatchExpr, FunctionExpr, IdentExpr, ListExpr,
            NumberExpr, Parameter, SelfExpr, StringExpr, SubscriptExpr,
        },
        types::TypeNote,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser, stmt::parse_block, types::parse_type};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let Some(led_fn) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected());
        };

        left = led_fn(parser, left, next_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();
    match token.kind {
        TokenKind::Number => {
            let value = token.value.parse::<i64>().map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span.start,
                )
            })?;
            parser.advance();
            Ok(Expr::Number(NumberExpr {
                value,
                span: token.span,
            }))
        }
        TokenKind::String => {
            parser.advance();
            Ok(Expr::String(StringExpr {
                value: token.value,
                span: token.span,
            }))
        }
        TokenKind::Identifier => {
            parser.advance();
            Ok(Expr::Ident(IdentExpr {
                value: token.value,
                span: token.span,
            }))
        }
        TokenKind::True | TokenKind::False => {
            parser.advance();
            Ok(Expr::Boolean(BooleanExpr {
                value: token.kind == TokenKind::True,
                span: token.span,
            }))
        }
        TokenKind::SelfKw => {
            parser.advance();
            Ok(Expr::SelfRef(SelfExpr { span: token.span }))
        }
        _ => Err(parser.unexpected()),
    }
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryExpr {
        span: Span::new(left.get_span().start, right.get_span().end),
        left: Box::new(left),
        operator: operator_token.value,
        right: Box::new(right),
    }))
}

/// Assignment is right associative: `a = b = c` assigns `c` to `b` first.
pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.advance();
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(Expr::Assign(AssignExpr {
        span: Span::new(left.get_span().start, value.get_span().end),
        assignee: Box::new(left),
        value: Box::new(value),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Parses comma separated expressions up to and including `close`.
fn parse_expr_list(parser: &mut Parser, close: TokenKind) -> Result<Vec<Expr>, Error> {
    let mut items = vec![];

    while parser.current_token_kind() != close {
        items.push(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != close {
            return Err(parser.unexpected());
        }
    }

    parser.expect(close)?;
    Ok(items)
}

pub fn parse_dispatch_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.advance();
    let arguments = parse_expr_list(parser, TokenKind::CloseParen)?;

    Ok(Expr::Dispatch(DispatchExpr {
        span: parser.span_from(left.get_span().start),
        callee: Box::new(left),
        arguments,
    }))
}

pub fn parse_subscript_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expr::Subscript(SubscriptExpr {
        span: parser.span_from(left.get_span().start),
        target: Box::new(left),
        index: Box::new(index),
    }))
}

pub fn parse_list_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    let elements = parse_expr_list(parser, TokenKind::CloseBracket)?;

    Ok(Expr::List(ListExpr {
        elements,
        span: parser.span_from(start),
    }))
}

/// `fn(a: Int, b: Str): Int { ... }`. Without a return annotation the
/// function returns `Void`.
pub fn parse_function_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    let id = parser.advance_id();

    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let error = Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected parameter name"),
            },
            parser.get_position(),
        );
        let name_token = parser.expect_error(TokenKind::Identifier, Some(error))?;
        parser.expect(TokenKind::Colon)?;
        let type_note = parse_type(parser, BindingPower::Default)?;

        parameters.push(Parameter {
            name: name_token.value,
            type_note,
            span: parser.span_from(name_token.span.start),
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected());
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        parse_type(parser, BindingPower::Default)?
    } else {
        TypeNote::Void
    };

    let body: BlockStmt = parse_block(parser)?;

    Ok(Expr::Function(FunctionExpr {
        id,
        parameters,
        return_type,
        body,
        span: parser.span_from(start),
    }))
}
