//! Runtime values for the Nexus interpreter.
//!
//! All heap allocations go through factory methods on [`Value`]; the
//! [`Heap`] wrapper has a private constructor, so external code cannot
//! build heap values directly. `Heap` wraps `Rc`: the evaluator is
//! single-threaded by contract, so no atomic reference counting is
//! needed.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use nexus_ir::StringInterner;

use crate::class::{ClassValue, InstanceValue};
use crate::function::FunctionValue;
use crate::native::NativeFunction;

/// Immutable shared heap storage for values.
#[derive(Debug)]
pub struct Heap<T>(Rc<T>);

impl<T> Heap<T> {
    /// Crate-internal constructor; use the `Value` factory methods.
    pub(crate) fn new(value: T) -> Self {
        Heap(Rc::new(value))
    }

    /// Identity comparison (same allocation).
    pub fn ptr_eq(a: &Heap<T>, b: &Heap<T>) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Rc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

/// Single-threaded shared mutable cell, used for instance field maps.
#[derive(Debug)]
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Identity comparison (same cell).
    pub fn ptr_eq(a: &Shared<T>, b: &Shared<T>) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

/// Runtime value in the Nexus interpreter.
#[derive(Clone, Debug)]
pub enum Value {
    /// The null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Double-precision number; the only numeric kind.
    Number(f64),
    /// String value.
    Str(Heap<String>),
    /// Immutable ordered sequence of values.
    Array(Heap<Vec<Value>>),
    /// User-declared function (closure).
    Function(Rc<FunctionValue>),
    /// Host-provided native function.
    Native(NativeFunction),
    /// Declared class.
    Class(Rc<ClassValue>),
    /// Instance of a class.
    Instance(Shared<InstanceValue>),
}

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    /// Create an array value.
    #[inline]
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Heap::new(items))
    }

    /// The kind name reported by the `type` builtin.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Native(_) => "builtin_function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }

    /// Truthiness for conditionals: only `null` and `false` are falsy.
    /// Zero and the empty string are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Language-level equality.
    ///
    /// Kind first; cross-kind is always unequal except `null == null`.
    /// Numbers, strings, booleans, and arrays compare by content;
    /// functions, classes, and instances by identity.
    pub fn eq_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => **a == **b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.eq_value(y))
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Shared::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The canonical string conversion used by `str`, `print`, and `+`
    /// string coercion.
    ///
    /// Numbers render as their shortest round-trip decimal text (`2`, not
    /// `2.0`); arrays render bracketed with each element's own conversion;
    /// callables and instances render as deterministic opaque descriptors.
    pub fn stringify(&self, interner: &StringInterner) -> String {
        match self {
            Value::Null => "null".to_owned(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Str(s) => (**s).clone(),
            Value::Array(items) => {
                let rendered: Vec<String> =
                    items.iter().map(|v| v.stringify(interner)).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Function(f) => match f.name {
                Some(name) => format!("<function {}>", interner.lookup(name)),
                None => "<function>".to_owned(),
            },
            Value::Native(n) => format!("<builtin {}>", n.name),
            Value::Class(c) => format!("<class {}>", interner.lookup(c.name)),
            Value::Instance(i) => {
                format!("<instance {}>", interner.lookup(i.borrow().class.name))
            }
        }
    }
}

/// Shortest round-trip decimal text for a number.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "inf".to_owned() } else { "-inf".to_owned() }
    } else {
        // Rust's Display for f64 already prints the shortest text that
        // round-trips, with no trailing ".0" on integral values.
        format!("{n}")
    }
}

impl fmt::Display for Value {
    /// Interner-free rendering for host-side debugging; language-visible
    /// conversion goes through [`Value::stringify`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", **s),
            Value::Array(items) => write!(f, "<array of {}>", items.len()),
            Value::Function(_) => write!(f, "<function>"),
            Value::Native(n) => write!(f, "<builtin {}>", n.name),
            Value::Class(_) => write!(f, "<class>"),
            Value::Instance(_) => write!(f, "<instance>"),
        }
    }
}
