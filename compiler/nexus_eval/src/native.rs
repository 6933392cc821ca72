//! Native (host-provided) functions.
//!
//! Natives are plain function pointers paired with a name; the
//! interpreter pre-populates its root scope from [`registry`], and a
//! host may register more before running. Each native validates its own
//! argument count, which is what lets `print` be variadic while the
//! rest are unary.

use nexus_ir::Span;

use crate::error::{EvalResult, RuntimeError};
use crate::interpreter::Interpreter;
use crate::Value;

/// Signature of a native function body.
pub type NativeFn = fn(&mut Interpreter, &[Value]) -> EvalResult;

/// A named host capability callable from Nexus code.
#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub call: NativeFn,
}

impl PartialEq for NativeFunction {
    /// Natives are identified by name; the registry keeps names unique.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// The built-in function registry.
pub fn registry() -> &'static [NativeFunction] {
    REGISTRY
}

const REGISTRY: &[NativeFunction] = &[
    NativeFunction {
        name: "print",
        call: native_print,
    },
    NativeFunction {
        name: "input",
        call: native_input,
    },
    NativeFunction {
        name: "type",
        call: native_type,
    },
    NativeFunction {
        name: "str",
        call: native_str,
    },
    NativeFunction {
        name: "num",
        call: native_num,
    },
    NativeFunction {
        name: "len",
        call: native_len,
    },
];

fn expect_one(args: &[Value]) -> Result<&Value, RuntimeError> {
    if args.len() == 1 {
        Ok(&args[0])
    } else {
        Err(RuntimeError::arity_mismatch(1, args.len(), Span::DUMMY))
    }
}

/// `print(...)`: each argument's string conversion, space-joined, plus a
/// line terminator. Returns null.
fn native_print(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let rendered: Vec<String> = args
        .iter()
        .map(|v| v.stringify(interp.interner()))
        .collect();
    let mut line = rendered.join(" ");
    line.push('\n');
    interp.write_out(&line);
    Ok(Value::Null)
}

/// `input(prompt)`: write the prompt, read one line, return it.
fn native_input(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let prompt = expect_one(args)?.stringify(interp.interner());
    interp.write_out(&prompt);
    let line = interp.read_line();
    Ok(Value::string(line))
}

/// `type(value)`: the value's kind name as a string.
fn native_type(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::string(expect_one(args)?.kind_name()))
}

/// `str(value)`: the canonical string conversion.
fn native_str(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let rendered = expect_one(args)?.stringify(interp.interner());
    Ok(Value::string(rendered))
}

/// `num(value)`: pass numbers through, parse strings, reject the rest.
fn native_num(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    match expect_one(args)? {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Number).map_err(|_| {
            RuntimeError::conversion_error(
                format!("cannot convert '{}' to number", &**s),
                Span::DUMMY,
            )
        }),
        other => Err(RuntimeError::conversion_error(
            format!("cannot convert {} to number", other.kind_name()),
            Span::DUMMY,
        )),
    }
}

/// `len(value)`: character count of a string or element count of an
/// array.
fn native_len(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    match expect_one(args)? {
        Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::Array(items) => Ok(Value::Number(items.len() as f64)),
        other => Err(RuntimeError::type_error(
            format!("len() requires a string or array, got {}", other.kind_name()),
            Span::DUMMY,
        )),
    }
}
