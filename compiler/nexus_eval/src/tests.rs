//! End-to-end evaluator tests: source text in, output and results out.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use nexus_ir::StringInterner;

use crate::{Interpreter, RuntimeError, RuntimeErrorKind, Value};

/// Captures interpreter output while the interpreter owns the writer.
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap_or_default()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run a program with the given stdin text, returning the result of the
/// final top-level expression statement plus everything printed.
fn run_with_input(
    source: &str,
    input: &str,
) -> (Result<Option<Value>, RuntimeError>, String) {
    let interner = Rc::new(StringInterner::new());
    let tokens = match nexus_lexer::lex(source, &interner) {
        Ok(tokens) => tokens,
        Err(e) => panic!("lex error: {e}"),
    };
    let module = match nexus_parse::parse(&tokens) {
        Ok(module) => Rc::new(module),
        Err(e) => panic!("parse error: {e}"),
    };
    let buf = SharedBuf::default();
    let stdin = Box::new(std::io::Cursor::new(input.as_bytes().to_vec()));
    let mut interp = Interpreter::with_io(interner, stdin, Box::new(buf.clone()));
    let result = interp.run_module(&module);
    (result, buf.contents())
}

fn run(source: &str) -> (Result<Option<Value>, RuntimeError>, String) {
    run_with_input(source, "")
}

/// Run a program expected to succeed, returning only its output.
fn output_of(source: &str) -> String {
    let (result, output) = run(source);
    if let Err(e) = result {
        panic!("unexpected runtime error: {e}\noutput so far:\n{output}");
    }
    output
}

/// Run a program expected to fail, returning the error.
fn error_of(source: &str) -> RuntimeError {
    let (result, output) = run(source);
    match result {
        Err(e) => e,
        Ok(v) => panic!("expected runtime error, got {v:?}\noutput:\n{output}"),
    }
}

// -----------------------------------------------------------------------
// Expressions and operators
// -----------------------------------------------------------------------

#[test]
fn test_arithmetic_is_type_driven_not_coercing() {
    // 1 + 1 is numeric addition...
    let (result, _) = run("1 + 1;");
    match result {
        Ok(Some(Value::Number(n))) => assert_eq!(n, 2.0),
        other => panic!("expected Number(2), got {other:?}"),
    }
    // ...while a string operand switches + to concatenation.
    assert_eq!(output_of(r#"print("x = " + 5);"#), "x = 5\n");
    assert_eq!(output_of(r#"print(5 + "!");"#), "5!\n");
}

#[test]
fn test_number_formatting() {
    assert_eq!(output_of("print(2); print(2.5); print(10 / 4);"), "2\n2.5\n2.5\n");
}

#[test]
fn test_division_by_zero_does_not_crash() {
    assert_eq!(output_of("print(1 / 0);"), "inf\n");
    assert_eq!(output_of("print(0 / 0);"), "NaN\n");
}

#[test]
fn test_divide_function() {
    let source = "
        func divide(a, b) {
            return a / b;
        }
        print(divide(20, 4));
        print(divide(1, 0));
    ";
    assert_eq!(output_of(source), "5\ninf\n");
}

#[test]
fn test_logical_short_circuit() {
    let source = r#"
        func boom() {
            throw "should not be evaluated";
        }
        print(false && boom());
        print(true || boom());
        print(true && 0);
        print(null || "fallback");
    "#;
    // && / || return booleans; 0 and "fallback" are truthy.
    assert_eq!(output_of(source), "false\ntrue\ntrue\ntrue\n");
}

#[test]
fn test_truthiness_only_null_and_false_are_falsy() {
    let source = r#"
        if (0) { print("zero is truthy"); }
        if ("") { print("empty string is truthy"); }
        if (null) { print("unreachable"); } else { print("null is falsy"); }
        if (false) { print("unreachable"); } else { print("false is falsy"); }
    "#;
    assert_eq!(
        output_of(source),
        "zero is truthy\nempty string is truthy\nnull is falsy\nfalse is falsy\n"
    );
}

#[test]
fn test_equality_across_kinds() {
    let source = r#"
        print(1 == 1);
        print(1 == "1");
        print(null == null);
        print(null == false);
        print("a" != "b");
        print([1, 2] == [1, 2]);
    "#;
    assert_eq!(output_of(source), "true\nfalse\ntrue\nfalse\ntrue\ntrue\n");
}

#[test]
fn test_unary_operators() {
    assert_eq!(output_of("print(-3 + 1); print(!null); print(!0);"), "-2\ntrue\nfalse\n");
}

#[test]
fn test_comparison_type_error() {
    let err = error_of(r#"1 < "2";"#);
    assert!(matches!(err.kind, RuntimeErrorKind::Type { .. }));
}

// -----------------------------------------------------------------------
// Variables and scoping
// -----------------------------------------------------------------------

#[test]
fn test_block_scoping_and_shadowing() {
    let source = "
        var x = 1;
        {
            var x = 2;
            print(x);
        }
        print(x);
    ";
    assert_eq!(output_of(source), "2\n1\n");
}

#[test]
fn test_assignment_reaches_enclosing_scope() {
    let source = "
        var x = 1;
        {
            x = 10;
        }
        print(x);
    ";
    assert_eq!(output_of(source), "10\n");
}

#[test]
fn test_undefined_variable() {
    let err = error_of("print(missing);");
    assert!(matches!(err.kind, RuntimeErrorKind::UndefinedVariable { ref name } if name == "missing"));
}

#[test]
fn test_const_assignment_error() {
    let err = error_of("const k = 1; k = 2;");
    assert!(matches!(err.kind, RuntimeErrorKind::ConstAssignment { ref name } if name == "k"));
}

#[test]
fn test_const_redeclaration_error() {
    let err = error_of("const k = 1; var k = 2;");
    assert!(matches!(err.kind, RuntimeErrorKind::ConstRedeclaration { ref name } if name == "k"));
}

#[test]
fn test_const_shadowing_in_child_scope_is_allowed() {
    let source = "
        const k = 1;
        {
            var k = 2;
            print(k);
        }
        print(k);
    ";
    assert_eq!(output_of(source), "2\n1\n");
}

#[test]
fn test_var_redeclaration_shadows() {
    assert_eq!(output_of(r#"var x = 1; var x = "two"; print(x);"#), "two\n");
}

// -----------------------------------------------------------------------
// Control flow
// -----------------------------------------------------------------------

#[test]
fn test_if_elif_else() {
    let source = r#"
        func classify(n) {
            if (n < 0) {
                return "negative";
            } elif (n == 0) {
                return "zero";
            } elif (n < 10) {
                return "small";
            } else {
                return "large";
            }
        }
        print(classify(-5));
        print(classify(0));
        print(classify(3));
        print(classify(99));
    "#;
    assert_eq!(output_of(source), "negative\nzero\nsmall\nlarge\n");
}

#[test]
fn test_while_loop() {
    let source = "
        var sum = 0;
        var i = 1;
        while (i <= 4) {
            sum = sum + i;
            i = i + 1;
        }
        print(sum);
    ";
    assert_eq!(output_of(source), "10\n");
}

#[test]
fn test_for_loop_continue_and_break() {
    // The canonical control-flow program: continue at 5, break at 8.
    let source = "
        for (var j = 0; j < 10; j = j + 1) {
            if (j == 5) { continue; }
            if (j == 8) { break; }
            print(j);
        }
    ";
    assert_eq!(output_of(source), "0\n1\n2\n3\n4\n6\n7\n");
}

#[test]
fn test_for_loop_empty_clauses() {
    let source = "
        var i = 0;
        for (;;) {
            if (i == 3) { break; }
            i = i + 1;
        }
        print(i);
    ";
    assert_eq!(output_of(source), "3\n");
}

#[test]
fn test_for_loop_variable_is_scoped_to_loop() {
    let err = error_of("for (var j = 0; j < 1; j = j + 1) {} print(j);");
    assert!(matches!(err.kind, RuntimeErrorKind::UndefinedVariable { .. }));
}

#[test]
fn test_break_outside_loop() {
    let err = error_of("break;");
    assert_eq!(err.kind, RuntimeErrorKind::BreakOutsideLoop);
}

#[test]
fn test_continue_inside_function_but_outside_loop() {
    let err = error_of("func f() { continue; } f();");
    assert_eq!(err.kind, RuntimeErrorKind::ContinueOutsideLoop);
}

#[test]
fn test_return_at_top_level() {
    let err = error_of("return 1;");
    assert_eq!(err.kind, RuntimeErrorKind::ReturnOutsideFunction);
}

// -----------------------------------------------------------------------
// Functions and closures
// -----------------------------------------------------------------------

#[test]
fn test_function_returns_null_without_return() {
    let source = "
        func nothing() {}
        print(nothing());
    ";
    assert_eq!(output_of(source), "null\n");
}

#[test]
fn test_recursion() {
    let source = "
        func fib(n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        print(fib(10));
    ";
    assert_eq!(output_of(source), "55\n");
}

#[test]
fn test_closures_share_one_environment() {
    // Counter factory: increment and read close over the same count.
    let source = "
        func make_counter() {
            var count = 0;
            func increment() {
                count = count + 1;
            }
            func read() {
                return count;
            }
            return [increment, read];
        }
        var fns = make_counter();
        var increment = fns[0];
        var read = fns[1];
        print(read());
        increment();
        increment();
        print(read());
    ";
    assert_eq!(output_of(source), "0\n2\n");
}

#[test]
fn test_closures_from_separate_calls_are_independent() {
    let source = "
        func make_counter() {
            var count = 0;
            func increment() {
                count = count + 1;
                return count;
            }
            return increment;
        }
        var a = make_counter();
        var b = make_counter();
        a(); a();
        print(a());
        print(b());
    ";
    assert_eq!(output_of(source), "3\n1\n");
}

#[test]
fn test_arity_mismatch() {
    let err = error_of("func two(a, b) { return a; } two(1);");
    assert!(matches!(
        err.kind,
        RuntimeErrorKind::Arity { expected: 2, got: 1 }
    ));
}

#[test]
fn test_not_callable() {
    let err = error_of("var n = 5; n();");
    assert!(matches!(err.kind, RuntimeErrorKind::NotCallable { kind: "number" }));
}

#[test]
fn test_stack_overflow_is_an_error_not_a_crash() {
    let err = error_of("func loop_forever() { return loop_forever(); } loop_forever();");
    assert!(matches!(err.kind, RuntimeErrorKind::StackOverflow { .. }));
}

// -----------------------------------------------------------------------
// Classes, instances, inheritance
// -----------------------------------------------------------------------

#[test]
fn test_instance_fields_and_init() {
    let source = r#"
        class Point {
            func init(x, y) {
                this.x = x;
                this.y = y;
            }
        }
        var p = Point(3, 4);
        print(p.x + p.y);
    "#;
    assert_eq!(output_of(source), "7\n");
}

#[test]
fn test_missing_field_reads_null() {
    let source = "
        class Empty {}
        var e = Empty();
        print(e.ghost);
        print(e.ghost == null);
    ";
    assert_eq!(output_of(source), "null\ntrue\n");
}

#[test]
fn test_field_mutation_via_set() {
    let source = r#"
        class Box {}
        var b = Box();
        b.value = 1;
        b.value = b.value + 41;
        print(b.value);
    "#;
    assert_eq!(output_of(source), "42\n");
}

#[test]
fn test_inherited_method_binds_this_to_subclass_instance() {
    let source = r#"
        class Animal {
            func speak() {
                return "generic noise";
            }
            func describe() {
                return this.name + " says " + this.speak();
            }
        }
        class Dog < Animal {
            func speak() {
                return "woof";
            }
        }
        var d = Dog();
        d.name = "Rex";
        print(d.describe());
    "#;
    // describe() is inherited; this is the Dog instance, and speak()
    // dispatches to the override.
    assert_eq!(output_of(source), "Rex says woof\n");
}

#[test]
fn test_init_is_inherited() {
    let source = r#"
        class Named {
            func init(name) {
                this.name = name;
            }
        }
        class Label < Named {}
        var l = Label("tag");
        print(l.name);
    "#;
    assert_eq!(output_of(source), "tag\n");
}

#[test]
fn test_undefined_method_call() {
    let err = error_of("class C {} var c = C(); c.missing();");
    assert!(matches!(
        err.kind,
        RuntimeErrorKind::UndefinedMethod { ref method, ref class } if method == "missing" && class == "C"
    ));
}

#[test]
fn test_class_call_without_init_rejects_args() {
    let err = error_of("class C {} C(1);");
    assert!(matches!(err.kind, RuntimeErrorKind::Arity { expected: 0, got: 1 }));
}

#[test]
fn test_superclass_must_be_a_class() {
    let err = error_of("var notclass = 1; class C < notclass {}");
    assert!(matches!(err.kind, RuntimeErrorKind::Type { .. }));
}

#[test]
fn test_method_value_can_be_stored_and_called() {
    let source = r#"
        class Greeter {
            func init(name) { this.name = name; }
            func greet() { return "hi " + this.name; }
        }
        var g = Greeter("nexus");
        var bound = g.greet;
        print(bound());
    "#;
    assert_eq!(output_of(source), "hi nexus\n");
}

// -----------------------------------------------------------------------
// Exceptions
// -----------------------------------------------------------------------

#[test]
fn test_catch_binds_thrown_value() {
    let source = "
        try {
            throw 42;
        } catch (e) {
            print(e + 1);
        }
    ";
    assert_eq!(output_of(source), "43\n");
}

#[test]
fn test_catch_binds_runtime_error_message() {
    let source = "
        try {
            print(missing);
        } catch (e) {
            print(e);
        }
        print(\"still running\");
    ";
    assert_eq!(
        output_of(source),
        "undefined variable 'missing'\nstill running\n"
    );
}

#[test]
fn test_uncaught_throw_terminates() {
    let err = error_of(r#"throw "boom";"#);
    assert_eq!(err.kind, RuntimeErrorKind::Thrown);
    assert_eq!(err.message, "boom");
}

#[test]
fn test_throw_unwinds_through_calls_to_nearest_catch() {
    let source = r#"
        func inner() {
            throw "from inner";
        }
        func outer() {
            inner();
            print("unreachable");
        }
        try {
            outer();
        } catch (e) {
            print("caught: " + e);
        }
    "#;
    assert_eq!(output_of(source), "caught: from inner\n");
}

#[test]
fn test_nested_try_catches_at_nearest_handler() {
    let source = r#"
        try {
            try {
                throw "inner";
            } catch (e) {
                print("first: " + e);
                throw "rethrown";
            }
        } catch (e) {
            print("second: " + e);
        }
    "#;
    assert_eq!(output_of(source), "first: inner\nsecond: rethrown\n");
}

#[test]
fn test_break_is_not_caught_by_try() {
    let source = "
        var i = 0;
        while (true) {
            try {
                i = i + 1;
                if (i == 3) { break; }
            } catch (e) {
                print(\"never\");
            }
        }
        print(i);
    ";
    assert_eq!(output_of(source), "3\n");
}

// -----------------------------------------------------------------------
// Arrays
// -----------------------------------------------------------------------

#[test]
fn test_array_literal_index_and_len() {
    let source = r#"
        var items = [10, "two", [3]];
        print(len(items));
        print(items[0]);
        print(items[1]);
        print(items[2][0]);
        print(items);
    "#;
    assert_eq!(output_of(source), "3\n10\ntwo\n3\n[10, two, [3]]\n");
}

#[test]
fn test_array_index_out_of_bounds() {
    let err = error_of("var a = [1]; a[1];");
    assert!(matches!(err.kind, RuntimeErrorKind::Index { .. }));
}

#[test]
fn test_array_index_must_be_integral() {
    let err = error_of("var a = [1, 2]; a[0.5];");
    assert!(matches!(err.kind, RuntimeErrorKind::Index { .. }));
}

#[test]
fn test_index_non_array_is_type_error() {
    let err = error_of(r#""abc"[0];"#);
    assert!(matches!(err.kind, RuntimeErrorKind::Type { .. }));
}

// -----------------------------------------------------------------------
// Natives
// -----------------------------------------------------------------------

#[test]
fn test_print_is_variadic_and_space_joined() {
    assert_eq!(output_of(r#"print(1, "two", null, true);"#), "1 two null true\n");
    assert_eq!(output_of("print();"), "\n");
}

#[test]
fn test_input_reads_a_line() {
    let (result, output) = run_with_input(
        r#"
            var name = input("name? ");
            print("hello " + name);
        "#,
        "nexus\n",
    );
    assert!(result.is_ok());
    assert_eq!(output, "name? hello nexus\n");
}

#[test]
fn test_type_builtin() {
    let source = r#"
        print(type(null), type(true), type(1), type("s"));
        print(type([1]), type(print));
        func f() {}
        class C {}
        print(type(f), type(C), type(C()));
    "#;
    assert_eq!(
        output_of(source),
        "null boolean number string\narray builtin_function\nfunction class instance\n"
    );
}

#[test]
fn test_str_builtin() {
    let source = r#"
        print(str(2) + str(2.5));
        print(str(null) + "/" + str(true));
        print(str([1, "a"]));
    "#;
    assert_eq!(output_of(source), "22.5\nnull/true\n[1, a]\n");
}

#[test]
fn test_num_builtin() {
    let source = r#"
        print(num("3.5") + 0.5);
        print(num(7));
        print(num("  42  "));
    "#;
    assert_eq!(output_of(source), "4\n7\n42\n");
}

#[test]
fn test_num_conversion_error() {
    let err = error_of(r#"num("not a number");"#);
    assert!(matches!(err.kind, RuntimeErrorKind::Conversion { .. }));
    let err = error_of("num(null);");
    assert!(matches!(err.kind, RuntimeErrorKind::Conversion { .. }));
}

#[test]
fn test_len_builtin() {
    assert_eq!(output_of(r#"print(len("abc"), len(""), len([1, 2]));"#), "3 0 2\n");
    let err = error_of("len(5);");
    assert!(matches!(err.kind, RuntimeErrorKind::Type { .. }));
}

#[test]
fn test_len_counts_characters_not_bytes() {
    assert_eq!(output_of(r#"print(len("αβγ"));"#), "3\n");
}

#[test]
fn test_natives_render_as_opaque_descriptors() {
    assert_eq!(output_of("print(print);"), "<builtin print>\n");
    assert_eq!(
        output_of("func my_helper() {} print(my_helper);"),
        "<function my_helper>\n"
    );
    assert_eq!(output_of("class Thing {} print(Thing); print(Thing());"), "<class Thing>\n<instance Thing>\n");
}

#[test]
fn test_natives_can_be_shadowed() {
    assert_eq!(output_of("var type = 1; print(type + 1);"), "2\n");
}

// -----------------------------------------------------------------------
// Session behavior (REPL-style persistence) and diagnostics
// -----------------------------------------------------------------------

#[test]
fn test_persistent_environment_across_modules() {
    let interner = Rc::new(StringInterner::new());
    let buf = SharedBuf::default();
    let stdin = Box::new(std::io::Cursor::new(Vec::new()));
    let mut interp = Interpreter::with_io(Rc::clone(&interner), stdin, Box::new(buf.clone()));

    let run_line = |interp: &mut Interpreter, line: &str| {
        let tokens = match nexus_lexer::lex(line, &interner) {
            Ok(tokens) => tokens,
            Err(e) => panic!("lex error: {e}"),
        };
        let module = match nexus_parse::parse(&tokens) {
            Ok(module) => Rc::new(module),
            Err(e) => panic!("parse error: {e}"),
        };
        interp.run_module(&module)
    };

    assert!(run_line(&mut interp, "var a = 40;").is_ok());
    assert!(run_line(&mut interp, "func bump(n) { return n + 2; }").is_ok());
    match run_line(&mut interp, "bump(a);") {
        Ok(Some(Value::Number(n))) => assert_eq!(n, 42.0),
        other => panic!("expected Number(42), got {other:?}"),
    }
    // An error reports but leaves the session usable.
    assert!(run_line(&mut interp, "missing;").is_err());
    assert!(run_line(&mut interp, "print(a);").is_ok());
    assert_eq!(buf.contents(), "40\n");
}

#[test]
fn test_runtime_error_spans_map_to_lines() {
    let source = "var ok = 1;\nprint(ok);\nmissing;\n";
    let err = error_of(source);
    assert_eq!(
        nexus_diagnostic::span_utils::line_number(source, err.span),
        3
    );
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, nexus_diagnostic::ErrorCode::E2001);
}

#[test]
fn test_expression_statement_value_is_surfaced_for_echo() {
    let (result, _) = run(r#""hello" + " " + "world";"#);
    match result {
        Ok(Some(Value::Str(s))) => assert_eq!(&**s, "hello world"),
        other => panic!("expected string result, got {other:?}"),
    }
    // A trailing declaration clears the echo value.
    let (result, _) = run("1 + 1; var x = 2;");
    assert!(matches!(result, Ok(None)));
}
