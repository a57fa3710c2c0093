//! Host functions bound in the global frame before any program runs.

use std::rc::Rc;

use chrono::Utc;
use log::debug;

use crate::callable::{NativeFn, NativeFunction};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// `(name, arity, implementation)` for every native.
const NATIVES: [(&str, usize, NativeFn); 4] = [
    ("clock", 0, clock),
    ("input", 1, input),
    ("print", 1, print),
    ("num", 1, num),
];

/// Native function values in definition order.
pub fn natives() -> impl Iterator<Item = (&'static str, Value)> {
    NATIVES.into_iter().map(|(name, arity, func)| {
        let native = NativeFunction { name, arity, func };

        (name, Value::NativeFunction(Rc::new(native)))
    })
}

/// Seconds since the Unix epoch, with millisecond resolution.
fn clock(_: &mut Interpreter, _: &[Value]) -> Result<Value, String> {
    let millis = Utc::now().timestamp_millis();

    Ok(Value::Number(millis as f64 / 1000.0))
}

/// Write the prompt, then read up to (not including) the next newline.
fn input(interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, String> {
    let prompt = args.first().map(Value::to_string).unwrap_or_default();

    interpreter
        .write_str(&prompt)
        .map_err(|e| format!("Error writing to stdout: {}", e))?;

    let mut line = interpreter
        .read_line()
        .map_err(|e| format!("Error reading from stdin: {}", e))?;

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }

    debug!("input() read {} byte(s)", line.len());

    Ok(Value::String(line))
}

fn print(interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, String> {
    let text = args.first().map(Value::to_string).unwrap_or_default();

    interpreter
        .write_line(&text)
        .map_err(|e| format!("Error writing to stdout: {}", e))?;

    Ok(Value::Nil)
}

/// Parse a string as a number, or pass a number through.
fn num(_: &mut Interpreter, args: &[Value]) -> Result<Value, String> {
    match args.first() {
        Some(Value::Number(n)) => Ok(Value::Number(*n)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| format!("Cannot convert input to number: '{}'", s)),
        Some(other) => Err(format!("Invalid input type: '{}'", other)),
        None => Err("Invalid input type: 'nil'".to_string()),
    }
}
