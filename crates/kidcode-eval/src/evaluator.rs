//! Statement and expression evaluator.

use crate::config::EvalConfig;
use crate::env::Environment;
use crate::error::{EvalResult, Halt, RuntimeError};
use crate::sink::EventSink;
use crate::value::Value;
use kidcode_stack::ensure_sufficient_stack;
use kidcode_types::ast::*;
use kidcode_types::Event;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Why a statement stopped early.
#[derive(Debug)]
enum Interrupt {
    /// Reported as one `Error` event; the run continues.
    Error(RuntimeError),
    /// Ends the run.
    Halt(Halt),
}

impl From<RuntimeError> for Interrupt {
    fn from(err: RuntimeError) -> Self {
        Interrupt::Error(err)
    }
}

impl From<Halt> for Interrupt {
    fn from(halt: Halt) -> Self {
        Interrupt::Halt(halt)
    }
}

/// Walks a program and emits events into `sink`.
///
/// Function definitions are borrowed from the program for the lifetime of
/// the run and are visible everywhere once their `define` has executed.
pub struct Evaluator<'a, S> {
    env: Environment,
    functions: HashMap<&'a str, &'a FunctionDef>,
    config: EvalConfig,
    cancel: &'a AtomicBool,
    sink: S,
    /// Statements executed so far, plus iterations of empty loops.
    instructions: u64,
}

/// Evaluate `program` from `env` and collect every event.
pub fn evaluate(
    program: &Program,
    env: Environment,
    config: &EvalConfig,
    cancel: &AtomicBool,
) -> Vec<Event> {
    Evaluator::new(env, config.clone(), cancel, Vec::new()).run(program)
}

impl<'a, S: EventSink> Evaluator<'a, S> {
    pub fn new(env: Environment, config: EvalConfig, cancel: &'a AtomicBool, sink: S) -> Self {
        Self {
            env,
            functions: HashMap::new(),
            config,
            cancel,
            sink,
            instructions: 0,
        }
    }

    /// Run the whole program and hand back the sink.
    ///
    /// Always starts with `Clear` and a `Move` describing the starting pose.
    pub fn run(mut self, program: &'a Program) -> S {
        tracing::debug!(statements = program.statements.len(), "run started");
        self.emit(Event::Clear);
        let start = self.env.world.snapshot();
        self.emit(start);

        match self.exec_block(&program.statements) {
            Ok(()) => {
                tracing::debug!(instructions = self.instructions, "run finished");
            }
            Err(Halt::Timeout) => {
                tracing::debug!(limit = self.config.instruction_limit, "run timed out");
                self.emit(Event::error(Halt::Timeout.to_string()));
            }
            Err(Halt::Cancelled) => {
                tracing::debug!(instructions = self.instructions, "run cancelled");
            }
        }
        self.sink
    }

    fn emit(&mut self, event: Event) {
        tracing::trace!(?event, "emit");
        self.sink.emit(event);
    }

    fn check_cancelled(&self) -> Result<(), Halt> {
        if self.cancel.load(Ordering::Acquire) {
            Err(Halt::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Count one instruction against the ceiling.
    fn tick(&mut self) -> Result<(), Halt> {
        self.instructions += 1;
        if self.instructions > self.config.instruction_limit {
            Err(Halt::Timeout)
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statement evaluation
    // ══════════════════════════════════════════════════════════════════════

    fn exec_block(&mut self, stmts: &'a [Stmt]) -> Result<(), Halt> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    /// Execute one statement. Runtime errors are reported here and do not
    /// propagate.
    fn exec_stmt(&mut self, stmt: &'a Stmt) -> Result<(), Halt> {
        ensure_sufficient_stack(|| -> Result<(), Halt> {
            self.check_cancelled()?;
            self.tick()?;
            match self.exec_inner(stmt) {
                Ok(()) => Ok(()),
                Err(Interrupt::Error(err)) => {
                    tracing::trace!(line = stmt.span().line, %err, "runtime error");
                    self.emit(Event::error(err.to_string()));
                    Ok(())
                }
                Err(Interrupt::Halt(halt)) => Err(halt),
            }
        })
    }

    fn exec_inner(&mut self, stmt: &'a Stmt) -> Result<(), Interrupt> {
        match stmt {
            Stmt::Expression(s) => {
                self.eval_expr(&s.expr)?;
            }
            Stmt::Set(s) => {
                let value = self.eval_expr(&s.value)?;
                self.env.define(&s.name.name, value);
            }
            Stmt::Move(s) => {
                let steps = self.eval_integer(&s.steps, "move forward")?;
                let (from_x, from_y) = (self.env.world.x, self.env.world.y);
                self.env.world.advance(steps);
                let event = self.env.world.move_event(from_x, from_y);
                self.emit(event);
            }
            Stmt::Turn(s) => {
                let degrees = self.eval_integer(&s.degrees, "turn")?.rem_euclid(360);
                let delta = match s.direction {
                    TurnDirection::Right => degrees,
                    TurnDirection::Left => -degrees,
                };
                self.env.world.turn(delta);
                let event = self.env.world.snapshot();
                self.emit(event);
            }
            Stmt::Say(s) => {
                let message = self.eval_expr(&s.message)?.to_string();
                self.emit(Event::Say { message });
            }
            Stmt::Repeat(s) => self.exec_repeat(s)?,
            Stmt::If(s) => {
                let branch = if self.eval_expr(&s.condition)?.is_truthy() {
                    Some(&s.consequence)
                } else {
                    s.alternative.as_ref()
                };
                if let Some(body) = branch {
                    self.exec_block(body)?;
                }
            }
            Stmt::Pen(s) => {
                self.env.world.pen_down = s.state == PenState::Down;
                let event = self.env.world.snapshot();
                self.emit(event);
            }
            Stmt::SetColor(s) => {
                let name = match self.eval_expr(&s.color)? {
                    Value::String(name) => name,
                    other => other.to_string(),
                };
                self.env.world.set_color(&name)?;
                let event = self.env.world.snapshot();
                self.emit(event);
            }
            Stmt::FunctionDef(def) => {
                self.functions.insert(def.name.name.as_str(), def);
            }
            Stmt::FunctionCall(call) => self.exec_call(call)?,
        }
        Ok(())
    }

    fn exec_repeat(&mut self, stmt: &'a RepeatStmt) -> Result<(), Interrupt> {
        let times = self.eval_integer(&stmt.times, "repeat")?;
        for _ in 0..times.max(0) {
            self.check_cancelled()?;
            if stmt.body.is_empty() {
                // Nothing else would count toward the ceiling.
                self.tick()?;
            }
            self.exec_block(&stmt.body)?;
        }
        Ok(())
    }

    fn exec_call(&mut self, call: &'a FunctionCall) -> Result<(), Interrupt> {
        let name = call.name.name.as_str();
        let def = *self
            .functions
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction(name.to_string()))?;
        if def.params.len() != call.args.len() {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: def.params.len(),
                got: call.args.len(),
            }
            .into());
        }
        if self.env.call_depth() >= self.config.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded(self.config.max_call_depth).into());
        }

        let args = call
            .args
            .iter()
            .map(|arg| self.eval_expr(arg))
            .collect::<EvalResult<Vec<_>>>()?;

        tracing::trace!(function = name, depth = self.env.call_depth() + 1, "call");
        self.env.push_scope();
        for (param, value) in def.params.iter().zip(args) {
            self.env.define(&param.name, value);
        }
        let result = self.exec_block(&def.body);
        self.env.pop_scope();
        result.map_err(Interrupt::from)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression. The first error short-circuits the rest.
    pub fn eval_expr(&self, expr: &Expr) -> EvalResult<Value> {
        ensure_sufficient_stack(|| -> EvalResult<Value> {
            match &expr.kind {
                ExprKind::Identifier(name) => self
                    .env
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),
                ExprKind::IntegerLit(n) => Ok(Value::Integer(*n)),
                ExprKind::StringLit(s) => Ok(Value::String(s.clone())),
                ExprKind::ListLit(items) => items
                    .iter()
                    .map(|item| self.eval_expr(item))
                    .collect::<EvalResult<Vec<_>>>()
                    .map(Value::List),
                ExprKind::Index { collection, index } => {
                    let collection = self.eval_expr(collection)?;
                    let index = self.eval_expr(index)?;
                    eval_index(collection, index)
                }
                ExprKind::Infix { left, op, right } => {
                    let left = self.eval_expr(left)?;
                    let right = self.eval_expr(right)?;
                    eval_infix(*op, left, right)
                }
            }
        })
    }

    fn eval_integer(&self, expr: &Expr, command: &'static str) -> EvalResult<i64> {
        match self.eval_expr(expr)? {
            Value::Integer(n) => Ok(n),
            other => Err(RuntimeError::NotANumber {
                command,
                found: other.type_name(),
            }),
        }
    }
}

fn eval_index(collection: Value, index: Value) -> EvalResult<Value> {
    match (collection, index) {
        (Value::List(items), Value::Integer(i)) => usize::try_from(i)
            .ok()
            .and_then(|at| items.get(at).cloned())
            .ok_or(RuntimeError::IndexOutOfBounds {
                index: i,
                len: items.len(),
            }),
        (Value::List(_), other) => Err(RuntimeError::IndexNotInteger(other.type_name())),
        (other, _) => Err(RuntimeError::NotAList(other.type_name())),
    }
}

fn eval_infix(op: InfixOp, left: Value, right: Value) -> EvalResult<Value> {
    match (left, right) {
        (l @ Value::String(_), r) | (l, r @ Value::String(_)) => {
            if op == InfixOp::Add {
                Ok(Value::String(format!("{l}{r}")))
            } else {
                Err(RuntimeError::StringOperator(op))
            }
        }
        (Value::Integer(a), Value::Integer(b)) => eval_integer_infix(op, a, b),
        (l, r) => Err(RuntimeError::TypeMismatch {
            op,
            left: l.type_name(),
            right: r.type_name(),
        }),
    }
}

fn eval_integer_infix(op: InfixOp, a: i64, b: i64) -> EvalResult<Value> {
    let checked = match op {
        InfixOp::Add => a.checked_add(b),
        InfixOp::Sub => a.checked_sub(b),
        InfixOp::Mul => a.checked_mul(b),
        InfixOp::Div => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a.checked_div(b)
        }
        InfixOp::Eq => return Ok(Value::Boolean(a == b)),
        InfixOp::NotEq => return Ok(Value::Boolean(a != b)),
        InfixOp::Less => return Ok(Value::Boolean(a < b)),
        InfixOp::Greater => return Ok(Value::Boolean(a > b)),
    };
    checked
        .map(Value::Integer)
        .ok_or(RuntimeError::Overflow {
            op,
            left: a,
            right: b,
        })
}
