//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Named types (`Int`, `Str`) plus the builtins `Any` and `Void`
//! - List types `[T]`
//! - Optional types `T?`
//! - Tuple types `(A B)` and function types `(A B) => R`
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers for parsing complex type expressions.

use std::collections::HashMap;

use crate::{ast::types::TypeNote, errors::errors::Error, lexer::tokens::TokenKind};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeNote, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, TypeNote, BindingPower) -> Result<TypeNote, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Type alias for type LED lookup table.
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

/// Type alias for type binding power lookup table.
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Initializes the type parsing lookup tables.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::OpenBracket, parse_list_type);
    parser.type_nud(TokenKind::OpenParen, parse_tuple_type);
    parser.type_led(TokenKind::Question, BindingPower::Call, parse_optional_type);
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<TypeNote, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(match token.value.as_str() {
        "Any" => TypeNote::Any,
        "Void" => TypeNote::Void,
        name => TypeNote::ident(name),
    })
}

pub fn parse_list_type(parser: &mut Parser) -> Result<TypeNote, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let element = parse_type(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(TypeNote::List(Box::new(element)))
}

/// `(A B)` or `(A, B)`, turned into a function type when followed by `=> R`.
pub fn parse_tuple_type(parser: &mut Parser) -> Result<TypeNote, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut items = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        items.push(parse_type(parser, BindingPower::Default)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        let return_type = parse_type(parser, BindingPower::Default)?;
        return Ok(TypeNote::Function {
            parameters: items,
            return_type: Box::new(return_type),
        });
    }

    Ok(TypeNote::Tuple(items))
}

pub fn parse_optional_type(
    parser: &mut Parser,
    left: TypeNote,
    _bp: BindingPower,
) -> Result<TypeNote, Error> {
    parser.expect(TokenKind::Question)?;

    Ok(TypeNote::Optional(Box::new(left)))
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<TypeNote, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_type_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let Some(led_fn) = parser.get_type_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected());
        };

        left = led_fn(parser, left, next_bp)?;
    }

    Ok(left)
}
