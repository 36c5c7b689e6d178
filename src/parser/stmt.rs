use crate::{
    ast::{
        ast::{BlockStmt, Stmt},
        statements::{DeclarationStmt, ExpressionStmt, IfStmt, PubStmt, ReturnStmt, UseStmt},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(stmt_fn) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return stmt_fn(parser);
    }

    let expression = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Expression(ExpressionStmt {
        span: parser.span_from(expression.get_span().start),
        expression,
    }))
}

/// Parses `let name [: Type] := value;` into its bare declaration.
fn parse_declaration(parser: &mut Parser) -> Result<DeclarationStmt, Error> {
    let start = parser.expect(TokenKind::Let)?.span.start;

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected identifier during variable declaration"),
        },
        parser.get_position(),
    );
    let identifier = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let explicit_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("declarations are written `let name := value;`"),
        },
        parser.get_position(),
    );
    parser.expect_error(TokenKind::Declare, Some(error))?;
    let value = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(DeclarationStmt {
        identifier,
        explicit_type,
        value,
        span: parser.span_from(start),
    })
}

pub fn parse_declaration_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Declaration(parse_declaration(parser)?))
}

pub fn parse_pub_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    if parser.current_token_kind() != TokenKind::Let {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("only declarations can be exported"),
            },
            parser.get_position(),
        ));
    }

    let declaration = parse_declaration(parser)?;

    Ok(Stmt::Pub(PubStmt {
        declaration,
        span: parser.span_from(start),
    }))
}

pub fn parse_use_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected a module path string"),
        },
        parser.get_position(),
    );
    let path = parser.expect_error(TokenKind::String, Some(error))?.value;

    let filter = if parser.current_token_kind() == TokenKind::OpenParen {
        parser.advance();

        let mut names = vec![];
        while parser.current_token_kind() != TokenKind::CloseParen {
            names.push(parser.expect(TokenKind::Identifier)?.value);

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else if parser.current_token_kind() != TokenKind::CloseParen {
                return Err(parser.unexpected());
            }
        }

        parser.expect(TokenKind::CloseParen)?;
        Some(names)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Use(UseStmt {
        path,
        filter,
        span: parser.span_from(start),
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Stmt::If(IfStmt {
        condition,
        body,
        span: parser.span_from(start),
    }))
}

/// Parses `{ stmts }`.
pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut body = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected());
        }
        body.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt {
        body,
        span: parser.span_from(start),
    })
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: parser.span_from(start),
    }))
}
