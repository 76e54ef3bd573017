//! Tests for reply parsers
//!
//! These tests verify:
//! - Function order and option precedence when composing
//! - Error replies bypassing functions unless requested
//! - Failures wrapped as parse errors
//! - The built-in coercions

use std::error::Error as _;

use vermilion::protocol::ServerError;
use vermilion::{Parser, ParserOptions, Reply, ThawOptions, VermilionError};

fn append(suffix: &'static str) -> Parser {
    Parser::new(move |reply| match reply {
        Reply::Text(s) => Ok(Reply::Text(format!("{}{}", s, suffix))),
        other => Err(format!("unexpected {:?}", other).into()),
    })
}

// =============================================================================
// Composition
// =============================================================================

#[test]
fn test_compose_runs_inner_then_outer() {
    let outer = append("-outer");
    let inner = append("-inner");

    let composed = outer.compose(&inner);
    assert_eq!(
        composed.apply(Reply::Text("x".into())).unwrap(),
        Reply::Text("x-inner-outer".into())
    );
}

#[test]
fn test_compose_outer_options_win() {
    let outer = Parser::default().with_raw_bulk(false).with_parse_errors(true);
    let inner = Parser::default()
        .with_raw_bulk(true)
        .with_thaw_opts(ThawOptions::with_limit(64));

    let composed = outer.compose(&inner);
    assert_eq!(
        composed.options(),
        &ParserOptions {
            raw_bulk: Some(false),
            thaw_opts: Some(ThawOptions::with_limit(64)),
            dummy_reply: None,
            parse_errors: Some(true),
        }
    );
}

#[test]
fn test_compose_keeps_single_function() {
    let composed = Parser::raw().compose(&append("!"));
    assert!(composed.has_function());
    assert_eq!(composed.options().raw_bulk, Some(true));
    assert_eq!(
        composed.apply(Reply::Text("hi".into())).unwrap(),
        Reply::Text("hi!".into())
    );
}

#[test]
fn test_decode_options_from_parser() {
    let opts = Parser::raw().options().decode_options();
    assert!(opts.raw_bulk);
    assert_eq!(Parser::default().options().decode_options(), Default::default());
}

// =============================================================================
// Application
// =============================================================================

#[test]
fn test_no_function_passes_reply_through() {
    let reply = Reply::Int(5);
    assert_eq!(Parser::raw().apply(reply.clone()).unwrap(), reply);
}

#[test]
fn test_server_errors_bypass_function_by_default() {
    let err = Reply::Error(ServerError::parse("MOVED 3999 127.0.0.1:6381"));
    assert_eq!(append("!").apply(err.clone()).unwrap(), err);
}

#[test]
fn test_parse_errors_option_runs_function_on_errors() {
    let parser = Parser::new(|reply| match reply {
        Reply::Error(e) => Ok(Reply::Text(e.category.unwrap_or_default())),
        other => Ok(other),
    })
    .with_parse_errors(true);

    assert_eq!(
        parser.apply(Reply::Error(ServerError::parse("MOVED 1 host:1"))).unwrap(),
        Reply::Text("moved".into())
    );
}

#[test]
fn test_failing_function_becomes_parse_error() {
    let err = append("!").apply(Reply::Int(1)).unwrap_err();
    match &err {
        VermilionError::Parse { message, .. } => assert!(message.contains("unexpected")),
        other => panic!("Expected parse error, got {:?}", other),
    }
    assert!(err.source().is_some());
}

#[test]
fn test_suppressed_sentinel_bypasses_function() {
    assert_eq!(append("!").apply(Reply::Suppressed).unwrap(), Reply::Suppressed);
}

// =============================================================================
// Built-in Coercions
// =============================================================================

#[test]
fn test_as_int() {
    let parser = Parser::as_int();
    assert_eq!(parser.apply(Reply::Text("42".into())).unwrap(), Reply::Int(42));
    assert_eq!(parser.apply(Reply::Int(7)).unwrap(), Reply::Int(7));
    assert_eq!(parser.apply(Reply::Nil).unwrap(), Reply::Nil);
    assert!(matches!(
        parser.apply(Reply::Text("forty".into())),
        Err(VermilionError::Parse { .. })
    ));
}

#[test]
fn test_as_float() {
    let parser = Parser::as_float();
    assert_eq!(parser.apply(Reply::Text("1.5".into())).unwrap(), Reply::Float(1.5));
    assert_eq!(parser.apply(Reply::Int(2)).unwrap(), Reply::Float(2.0));
}

#[test]
fn test_as_bool() {
    let parser = Parser::as_bool();
    assert_eq!(parser.apply(Reply::Int(1)).unwrap(), Reply::Bool(true));
    assert_eq!(parser.apply(Reply::Int(0)).unwrap(), Reply::Bool(false));
    assert_eq!(parser.apply(Reply::Status("OK".into())).unwrap(), Reply::Bool(true));
    assert!(parser.apply(Reply::Text("maybe".into())).is_err());
}
