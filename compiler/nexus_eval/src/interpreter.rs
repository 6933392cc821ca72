//! The tree-walking evaluator.
//!
//! Statements execute for effect; expressions produce values. Non-local
//! control flow unwinds as [`Exit`] values through every statement call
//! site: loops consume `Break`/`Continue`, function call boundaries
//! consume `Return`, `try` consumes `Raise`, and anything reaching the
//! top level becomes a reported runtime error.

use std::io::{BufRead, Write};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use nexus_ir::{
    ExprId, ExprKind, FuncRange, LogicalOp, Module, Name, Span, StmtId, StmtKind, StringInterner,
};

use crate::class::{ClassValue, InstanceValue};
use crate::env::{AssignError, DeclareError, Environment, Mutability, ScopeId};
use crate::error::{EvalResult, ExecResult, Exit, RuntimeError};
use crate::function::FunctionValue;
use crate::native::{registry, NativeFunction};
use crate::operators;
use crate::value::{Shared, Value};

/// Maximum language-level call depth before a `StackOverflow` error is
/// raised. Each language call consumes several host frames; this limit
/// keeps deep recursion well inside the host stack.
pub const MAX_CALL_DEPTH: usize = 200;

/// The Nexus evaluator.
///
/// Holds the scope arena, the shared interner, the I/O handles natives
/// write to, and the call-depth counter. Created once per program run,
/// or once per REPL session: the root scope persists across
/// `run_module` calls.
pub struct Interpreter {
    env: Environment,
    globals: ScopeId,
    interner: Rc<StringInterner>,
    stdin: Box<dyn BufRead>,
    stdout: Box<dyn Write>,
    call_depth: usize,
    this_name: Name,
    init_name: Name,
}

impl Interpreter {
    /// Create an interpreter attached to the process stdio.
    pub fn new(interner: Rc<StringInterner>) -> Self {
        Self::with_io(
            interner,
            Box::new(std::io::BufReader::new(std::io::stdin())),
            Box::new(std::io::stdout()),
        )
    }

    /// Create an interpreter with explicit I/O handles (used by tests and
    /// embedding hosts that capture output).
    pub fn with_io(
        interner: Rc<StringInterner>,
        stdin: Box<dyn BufRead>,
        stdout: Box<dyn Write>,
    ) -> Self {
        let env = Environment::new();
        let globals = env.root();
        let this_name = interner.intern("this");
        let init_name = interner.intern("init");
        let mut interp = Interpreter {
            env,
            globals,
            interner,
            stdin,
            stdout,
            call_depth: 0,
            this_name,
            init_name,
        };
        for native in registry() {
            interp.define_native(*native);
        }
        interp
    }

    /// Register a native function in the root scope.
    ///
    /// Natives are ordinary bindings; scripts may shadow them.
    pub fn define_native(&mut self, native: NativeFunction) {
        let name = self.interner.intern(native.name);
        self.declare_fresh(self.globals, name, Value::Native(native), Mutability::Mutable);
    }

    /// The shared interner.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Clone the interner handle (for lexing further input against the
    /// same name table, e.g. successive REPL lines).
    pub fn interner_handle(&self) -> Rc<StringInterner> {
        Rc::clone(&self.interner)
    }

    /// Write to the interpreter's output stream. Errors are ignored;
    /// a closed pipe should not turn `print` into a language error.
    pub fn write_out(&mut self, text: &str) {
        let _ = self.stdout.write_all(text.as_bytes());
        let _ = self.stdout.flush();
    }

    /// Read one line from the input stream, without its line terminator.
    /// Returns an empty string at end of input.
    pub fn read_line(&mut self) -> String {
        let mut line = String::new();
        let _ = self.stdin.read_line(&mut line);
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        line
    }

    /// Execute a module's top-level statements in the root scope.
    ///
    /// Returns the value of the final top-level expression statement, if
    /// any, for the REPL to echo. A non-`Raise` exit escaping the top
    /// level is itself a runtime error.
    pub fn run_module(&mut self, module: &Rc<Module>) -> Result<Option<Value>, RuntimeError> {
        tracing::debug!(statements = module.body.len(), "running module");
        let mut last = None;
        for &id in module.arena.stmt_ids(module.body) {
            let stmt = module.arena.stmt(id);
            let span = stmt.span;
            let outcome = if let &StmtKind::Expr(expr) = &stmt.kind {
                match self.eval_expr(module, expr, self.globals) {
                    Ok(value) => {
                        last = Some(value);
                        Ok(())
                    }
                    Err(err) => Err(Exit::Raise(err)),
                }
            } else {
                last = None;
                self.exec_stmt(module, id, self.globals)
            };
            if let Err(exit) = outcome {
                return Err(Self::exit_to_error(exit, span));
            }
        }
        Ok(last)
    }

    /// Convert an exit escaping its legal extent into a runtime error.
    fn exit_to_error(exit: Exit, enclosing: Span) -> RuntimeError {
        match exit {
            Exit::Break(span) => RuntimeError::break_outside_loop(span),
            Exit::Continue(span) => RuntimeError::continue_outside_loop(span),
            Exit::Return(_) => RuntimeError::return_outside_function(enclosing),
            Exit::Raise(err) => err,
        }
    }

    // -------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------

    fn exec_stmt(&mut self, module: &Rc<Module>, id: StmtId, scope: ScopeId) -> ExecResult {
        let stmt = module.arena.stmt(id);
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(module, *expr, scope)?;
                Ok(())
            }
            StmtKind::VarDecl { name, init } => {
                let value = match init {
                    Some(expr) => self.eval_expr(module, *expr, scope)?,
                    None => Value::Null,
                };
                self.declare_checked(scope, *name, value, Mutability::Mutable, span)?;
                Ok(())
            }
            StmtKind::ConstDecl { name, init } => {
                let value = self.eval_expr(module, *init, scope)?;
                self.declare_checked(scope, *name, value, Mutability::Const, span)?;
                Ok(())
            }
            StmtKind::Func(func_id) => {
                let func = module.arena.func(*func_id);
                let value = Value::Function(Rc::new(FunctionValue {
                    name: Some(func.name),
                    params: func.params.clone(),
                    body: func.body,
                    module: Rc::clone(module),
                    closure: scope,
                    is_initializer: false,
                }));
                self.declare_checked(scope, func.name, value, Mutability::Mutable, span)?;
                Ok(())
            }
            StmtKind::ClassDecl {
                name,
                superclass,
                methods,
            } => {
                let class = self.make_class(module, *name, *superclass, *methods, scope, span)?;
                self.declare_checked(scope, *name, class, Mutability::Mutable, span)?;
                Ok(())
            }
            StmtKind::Block(range) => {
                let child = self.env.push_child(scope);
                for &stmt_id in module.arena.stmt_ids(*range) {
                    self.exec_stmt(module, stmt_id, child)?;
                }
                Ok(())
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(module, *cond, scope)?.is_truthy() {
                    self.exec_stmt(module, *then_branch, scope)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(module, *else_branch, scope)
                } else {
                    Ok(())
                }
            }
            StmtKind::While { cond, body } => {
                loop {
                    if !self.eval_expr(module, *cond, scope)?.is_truthy() {
                        break;
                    }
                    match self.exec_stmt(module, *body, scope) {
                        Ok(()) | Err(Exit::Continue(_)) => {}
                        Err(Exit::Break(_)) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                // The header gets its own scope so `var` in the init
                // clause is local to the loop.
                let loop_scope = self.env.push_child(scope);
                if let Some(init) = init {
                    self.exec_stmt(module, *init, loop_scope)?;
                }
                loop {
                    if let Some(cond) = cond {
                        if !self.eval_expr(module, *cond, loop_scope)?.is_truthy() {
                            break;
                        }
                    }
                    match self.exec_stmt(module, *body, loop_scope) {
                        // `continue` still runs the update clause.
                        Ok(()) | Err(Exit::Continue(_)) => {}
                        Err(Exit::Break(_)) => break,
                        Err(other) => return Err(other),
                    }
                    if let Some(update) = update {
                        self.eval_expr(module, *update, loop_scope)?;
                    }
                }
                Ok(())
            }
            StmtKind::Break => Err(Exit::Break(span)),
            StmtKind::Continue => Err(Exit::Continue(span)),
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(module, *expr, scope)?,
                    None => Value::Null,
                };
                Err(Exit::Return(value))
            }
            StmtKind::Throw(expr) => {
                let value = self.eval_expr(module, *expr, scope)?;
                let message = value.stringify(&self.interner);
                Err(Exit::Raise(RuntimeError::thrown(value, message, span)))
            }
            StmtKind::Try {
                body,
                catch_name,
                catch_body,
            } => match self.exec_stmt(module, *body, scope) {
                Err(Exit::Raise(err)) => {
                    let catch_scope = self.env.push_child(scope);
                    self.declare_fresh(
                        catch_scope,
                        *catch_name,
                        err.catch_value(),
                        Mutability::Mutable,
                    );
                    self.exec_stmt(module, *catch_body, catch_scope)
                }
                other => other,
            },
        }
    }

    fn make_class(
        &mut self,
        module: &Rc<Module>,
        name: Name,
        superclass: Option<Name>,
        methods: FuncRange,
        scope: ScopeId,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let superclass = match superclass {
            Some(super_name) => {
                let value = self.env.get(scope, super_name).ok_or_else(|| {
                    RuntimeError::undefined_variable(self.interner.lookup(super_name), span)
                })?;
                match value {
                    Value::Class(class) => Some(class),
                    other => {
                        return Err(RuntimeError::type_error(
                            format!("superclass must be a class, got {}", other.kind_name()),
                            span,
                        ))
                    }
                }
            }
            None => None,
        };

        let mut table = FxHashMap::default();
        for &func_id in module.arena.func_ids(methods) {
            let func = module.arena.func(func_id);
            let method = Rc::new(FunctionValue {
                name: Some(func.name),
                params: func.params.clone(),
                body: func.body,
                module: Rc::clone(module),
                closure: scope,
                is_initializer: func.name == self.init_name,
            });
            table.insert(func.name, method);
        }

        Ok(Value::Class(Rc::new(ClassValue {
            name,
            superclass,
            methods: table,
        })))
    }

    // -------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------

    fn eval_expr(&mut self, module: &Rc<Module>, id: ExprId, scope: ScopeId) -> EvalResult {
        let expr = module.arena.expr(id);
        let span = expr.span;
        match &expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(name) => Ok(Value::string(self.interner.lookup(*name))),
            ExprKind::Array(range) => {
                let mut items = Vec::with_capacity(range.len());
                for &item_id in module.arena.expr_ids(*range) {
                    items.push(self.eval_expr(module, item_id, scope)?);
                }
                Ok(Value::array(items))
            }
            ExprKind::Ident(name) => self.env.get(scope, *name).ok_or_else(|| {
                RuntimeError::undefined_variable(self.interner.lookup(*name), span)
            }),
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(module, *operand, scope)?;
                operators::eval_unary(*op, &operand, span)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval_expr(module, *lhs, scope)?;
                let rhs = self.eval_expr(module, *rhs, scope)?;
                operators::eval_binary(*op, &lhs, &rhs, span, &self.interner)
            }
            ExprKind::Logical { op, lhs, rhs } => {
                let lhs = self.eval_expr(module, *lhs, scope)?;
                match op {
                    LogicalOp::And => {
                        if !lhs.is_truthy() {
                            Ok(Value::Bool(false))
                        } else {
                            let rhs = self.eval_expr(module, *rhs, scope)?;
                            Ok(Value::Bool(rhs.is_truthy()))
                        }
                    }
                    LogicalOp::Or => {
                        if lhs.is_truthy() {
                            Ok(Value::Bool(true))
                        } else {
                            let rhs = self.eval_expr(module, *rhs, scope)?;
                            Ok(Value::Bool(rhs.is_truthy()))
                        }
                    }
                }
            }
            ExprKind::Assign { name, value } => {
                let value = self.eval_expr(module, *value, scope)?;
                match self.env.assign(scope, *name, value.clone()) {
                    Ok(()) => Ok(value),
                    Err(AssignError::Undefined) => Err(RuntimeError::undefined_variable(
                        self.interner.lookup(*name),
                        span,
                    )),
                    Err(AssignError::Immutable) => Err(RuntimeError::const_assignment(
                        self.interner.lookup(*name),
                        span,
                    )),
                }
            }
            ExprKind::Call { callee, args } => {
                let callee_expr = module.arena.expr(*callee);
                // Property calls resolve through the instance so a miss
                // reports an undefined method, not a null call.
                let callee_value = if let &ExprKind::Get { object, field } = &callee_expr.kind {
                    let object = self.eval_expr(module, object, scope)?;
                    self.resolve_property(&object, field, callee_expr.span, true)?
                } else {
                    self.eval_expr(module, *callee, scope)?
                };
                let mut argv: SmallVec<[Value; 4]> = SmallVec::new();
                for &arg_id in module.arena.expr_ids(*args) {
                    argv.push(self.eval_expr(module, arg_id, scope)?);
                }
                self.call_value(callee_value, &argv, span)
            }
            ExprKind::Get { object, field } => {
                let object = self.eval_expr(module, *object, scope)?;
                self.resolve_property(&object, *field, span, false)
            }
            ExprKind::Set {
                object,
                field,
                value,
            } => {
                let object = self.eval_expr(module, *object, scope)?;
                let Value::Instance(instance) = &object else {
                    return Err(RuntimeError::type_error(
                        format!("only instances have fields, got {}", object.kind_name()),
                        span,
                    ));
                };
                let instance = instance.clone();
                let value = self.eval_expr(module, *value, scope)?;
                instance.borrow_mut().set_field(*field, value.clone());
                Ok(value)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(module, *object, scope)?;
                let index = self.eval_expr(module, *index, scope)?;
                self.eval_index(&object, &index, span)
            }
        }
    }

    fn eval_index(&self, object: &Value, index: &Value, span: Span) -> EvalResult {
        let Value::Array(items) = object else {
            return Err(RuntimeError::type_error(
                format!("only arrays can be indexed, got {}", object.kind_name()),
                span,
            ));
        };
        let Value::Number(n) = index else {
            return Err(RuntimeError::type_error(
                format!("array index must be a number, got {}", index.kind_name()),
                span,
            ));
        };
        if n.fract() != 0.0 || n.is_nan() {
            return Err(RuntimeError::index_error(
                format!("array index must be an integer, got {n}"),
                span,
            ));
        }
        let len = items.len();
        if *n < 0.0 || *n >= len as f64 {
            return Err(RuntimeError::index_error(
                format!("index {n} out of bounds for array of length {len}"),
                span,
            ));
        }
        Ok(items[*n as usize].clone())
    }

    /// Resolve `object.field`: fields first, then bound methods.
    ///
    /// A miss yields `null` in value position (permissive field reads are
    /// part of the language contract) but an undefined-method error in
    /// call position.
    fn resolve_property(
        &mut self,
        object: &Value,
        field: Name,
        span: Span,
        for_call: bool,
    ) -> EvalResult {
        let Value::Instance(instance) = object else {
            return Err(RuntimeError::type_error(
                format!("only instances have properties, got {}", object.kind_name()),
                span,
            ));
        };
        if let Some(value) = instance.borrow().get_field(field) {
            return Ok(value);
        }
        let class = Rc::clone(&instance.borrow().class);
        if let Some(method) = class.find_method(field) {
            let bound = self.bind_method(&method, object.clone());
            return Ok(Value::Function(Rc::new(bound)));
        }
        if for_call {
            Err(RuntimeError::undefined_method(
                self.interner.lookup(field),
                self.interner.lookup(class.name),
                span,
            ))
        } else {
            Ok(Value::Null)
        }
    }

    /// Bind a method to an instance: a fresh scope holding `this` is
    /// layered directly above the method's closure.
    fn bind_method(&mut self, method: &Rc<FunctionValue>, instance: Value) -> FunctionValue {
        let scope = self.env.push_child(method.closure);
        self.declare_fresh(scope, self.this_name, instance, Mutability::Const);
        method.with_closure(scope)
    }

    // -------------------------------------------------------------------
    // Calls
    // -------------------------------------------------------------------

    fn call_value(&mut self, callee: Value, args: &[Value], span: Span) -> EvalResult {
        match callee {
            Value::Function(func) => self.call_function(&func, args, span),
            Value::Native(native) => (native.call)(self, args).map_err(|mut err| {
                if err.span == Span::DUMMY {
                    err.span = span;
                }
                err
            }),
            Value::Class(class) => self.instantiate(&class, args, span),
            other => Err(RuntimeError::not_callable(other.kind_name(), span)),
        }
    }

    /// Call a user function: arity check, depth check, fresh frame over
    /// the closure scope, then the body.
    fn call_function(&mut self, func: &Rc<FunctionValue>, args: &[Value], span: Span) -> EvalResult {
        if args.len() != func.arity() {
            return Err(RuntimeError::arity_mismatch(func.arity(), args.len(), span));
        }
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::stack_overflow(MAX_CALL_DEPTH, span));
        }

        let frame = self.env.push_child(func.closure);
        for (param, arg) in func.params.iter().zip(args) {
            self.declare_fresh(frame, *param, arg.clone(), Mutability::Mutable);
        }

        self.call_depth += 1;
        tracing::trace!(depth = self.call_depth, "enter call");
        let outcome = {
            let body_module = Rc::clone(&func.module);
            let mut result = Ok(());
            for &stmt_id in body_module.arena.stmt_ids(func.body) {
                result = self.exec_stmt(&body_module, stmt_id, frame);
                if result.is_err() {
                    break;
                }
            }
            result
        };
        self.call_depth -= 1;

        match outcome {
            Ok(()) => Ok(Value::Null),
            Err(Exit::Return(value)) => Ok(value),
            Err(Exit::Break(break_span)) => Err(RuntimeError::break_outside_loop(break_span)),
            Err(Exit::Continue(continue_span)) => {
                Err(RuntimeError::continue_outside_loop(continue_span))
            }
            Err(Exit::Raise(err)) => Err(err),
        }
    }

    /// Call a class: create an instance, then run `init` (own or
    /// inherited) with the arguments, discarding its result.
    fn instantiate(&mut self, class: &Rc<ClassValue>, args: &[Value], span: Span) -> EvalResult {
        let instance = Value::Instance(Shared::new(InstanceValue::new(Rc::clone(class))));
        if let Some(init) = class.find_method(self.init_name) {
            let bound = Rc::new(self.bind_method(&init, instance.clone()));
            self.call_function(&bound, args, span)?;
        } else if !args.is_empty() {
            return Err(RuntimeError::arity_mismatch(0, args.len(), span));
        }
        Ok(instance)
    }

    // -------------------------------------------------------------------
    // Environment helpers
    // -------------------------------------------------------------------

    /// Declare into a scope the caller just created; such scopes hold no
    /// const bindings, so the declaration cannot fail.
    fn declare_fresh(&mut self, scope: ScopeId, name: Name, value: Value, mutability: Mutability) {
        let result = self.env.declare(scope, name, value, mutability);
        debug_assert!(result.is_ok(), "declaration into a fresh scope cannot fail");
    }

    fn declare_checked(
        &mut self,
        scope: ScopeId,
        name: Name,
        value: Value,
        mutability: Mutability,
        span: Span,
    ) -> Result<(), RuntimeError> {
        self.env
            .declare(scope, name, value, mutability)
            .map_err(|DeclareError::ConstRedeclaration| {
                RuntimeError::const_redeclaration(self.interner.lookup(name), span)
            })
    }
}
