//! iscript_evaluator: embedded JavaScript execution.
//!
//! Hands generated script text to the Boa engine. The pipeline treats this
//! crate as opaque: script in, printed output and a completion value (or
//! error) out. A `console` object is registered so that generated
//! `console.log` calls print to stdout.

use boa_engine::property::Attribute;
use boa_engine::{js_string, Context, Source};
use boa_runtime::Console;
use std::fmt;

/// An error produced while evaluating generated JavaScript.
#[derive(Debug)]
pub struct EvalError {
    message: String,
}

impl EvalError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

/// Evaluate a JavaScript source string, returning the completion value's
/// display form. `console.log` output goes to stdout as a side effect.
pub fn evaluate(script: &str) -> Result<String, EvalError> {
    let mut context = Context::default();
    register_console(&mut context)?;
    match context.eval(Source::from_bytes(script)) {
        Ok(value) => Ok(value.display().to_string()),
        Err(err) => Err(EvalError::new(err.to_string())),
    }
}

fn register_console(context: &mut Context) -> Result<(), EvalError> {
    let console = Console::init(context);
    context
        .register_global_property(js_string!(Console::NAME), console, Attribute::all())
        .map_err(|err| EvalError::new(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_expression() {
        assert_eq!(evaluate("1 + 2").unwrap(), "3");
    }

    #[test]
    fn test_evaluate_string_value() {
        assert_eq!(evaluate("'a' + 'b'").unwrap(), "\"ab\"");
    }

    #[test]
    fn test_console_is_available() {
        assert!(evaluate("console.log('from test'); 1").is_ok());
    }

    #[test]
    fn test_syntax_error_reports() {
        assert!(evaluate("function {").is_err());
    }

    #[test]
    fn test_thrown_error_reports() {
        let err = evaluate("throw new Error('boom');").unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
