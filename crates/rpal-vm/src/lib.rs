//! The CSE stack machine: a control register `C`, a value stack `S`, and an
//! id-keyed environment store, driven by a single fetch-execute loop. The
//! value-stack `EnvMarker` bookkeeping and the `Y*`/`Eta` self-application
//! trampoline implement β-reduction and fixed-point recursion over a
//! nested `Object::Tuple` representation (see `object.rs`).

pub mod error;
pub mod object;

use std::fmt::Write as _;

use error::VmError;
use log::trace;
use object::{builtin_name, LambdaValue, Object};
use rpal_compile::{CsFamily, CsInstr, LambdaParam};
use rpal_env::{EnvId, EnvStore};

type VResult<T> = Result<T, VmError>;

/// One item on the control register: either a literal instruction from a
/// control structure, or an `EnvMarker` spliced in at `Gamma`-application
/// time to mark where a call frame's body ends.
#[derive(Debug, Clone)]
enum ControlItem {
    Instr(CsInstr),
    EnvMarker(EnvId),
}
// A body control structure entered via `Gamma` has its trailing `EnvMarker`
// pushed before the body itself, so the marker surfaces on the control
// register only once the body finishes executing (see `apply_closure`).

/// Runs a compiled control-structure family and returns everything it
/// printed via `Print`. `run` owns the evaluation loop end-to-end; callers
/// that want a `Write` other than a `String` can use [`Evaluator::run_into`].
pub fn run(family: &CsFamily) -> VResult<String> {
    let mut out = String::new();
    Evaluator::new(family).run_into(&mut out)?;
    Ok(out)
}

pub struct Evaluator<'a> {
    family: &'a CsFamily,
    control: Vec<ControlItem>,
    stack: Vec<Object>,
    env_stack: Vec<EnvId>,
    envs: EnvStore<Object>,
}

impl<'a> Evaluator<'a> {
    pub fn new(family: &'a CsFamily) -> Self {
        Evaluator {
            family,
            control: Vec::new(),
            stack: Vec::new(),
            env_stack: Vec::new(),
            envs: EnvStore::new(),
        }
    }

    /// Drives the machine to completion, writing every `Print`ed value to
    /// `out` in program-emission order, followed by one trailing newline.
    pub fn run_into(&mut self, out: &mut String) -> VResult<()> {
        let root = self.envs.create_root();
        self.env_stack.push(root);
        self.push_cs(0);

        while let Some(item) = self.control.pop() {
            self.step(item, out)?;
        }
        if out.chars().last() != Some('\n') {
            out.push('\n');
        }
        Ok(())
    }

    fn push_cs(&mut self, cs_index: usize) {
        self.control
            .extend(self.family.get(cs_index).iter().cloned().map(ControlItem::Instr));
    }

    fn current_env(&self) -> VResult<EnvId> {
        self.env_stack.last().copied().ok_or(VmError::ControlUnderflow)
    }

    fn pop_stack(&mut self) -> VResult<Object> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    fn step(&mut self, item: ControlItem, out: &mut String) -> VResult<()> {
        match item {
            ControlItem::EnvMarker(env_id) => self.exec_env_marker(env_id),
            ControlItem::Instr(instr) => match instr {
                CsInstr::Integer(text) => {
                    let n = text
                        .parse::<i64>()
                        .map_err(|_| VmError::MalformedInteger(text.clone()))?;
                    self.stack.push(Object::Int(n));
                    Ok(())
                }
                CsInstr::Str(text) => {
                    self.stack.push(Object::Str(text));
                    Ok(())
                }
                CsInstr::Nil => {
                    self.stack.push(Object::Tuple(Vec::new()));
                    Ok(())
                }
                CsInstr::DummyLit => {
                    self.stack.push(Object::Dummy);
                    Ok(())
                }
                CsInstr::Identifier(name) => self.exec_identifier(&name),
                CsInstr::Lambda { param, body_cs } => {
                    let env = self.current_env()?;
                    self.stack.push(Object::Lambda(LambdaValue { param, body_cs, env }));
                    Ok(())
                }
                CsInstr::Gamma => self.exec_gamma(out),
                CsInstr::Op(op) => self.exec_operator(&op),
                CsInstr::Tau(n) => self.exec_tau(n),
                // `Delta` is only ever consumed by `Beta` peeking ahead on
                // `self.control` (see `pop_delta`); one reaching the front
                // of the fetch-execute loop on its own is a fatal error,
                // not an instruction with step semantics of its own.
                CsInstr::DeltaThen(cs) => Err(VmError::StrayDelta(cs)),
                CsInstr::DeltaElse(cs) => Err(VmError::StrayDelta(cs)),
                CsInstr::Beta => self.exec_beta(),
            },
        }
    }

    fn exec_identifier(&mut self, name: &str) -> VResult<()> {
        if let Some(builtin) = builtin_name(name) {
            self.stack.push(Object::BuiltIn(builtin));
            return Ok(());
        }
        let env = self.current_env()?;
        match self.envs.lookup(env, name) {
            Some(value) => {
                self.stack.push(value.clone());
                Ok(())
            }
            None => Err(VmError::UnboundIdentifier(name.to_string())),
        }
    }

    /// `DeltaThen`/`DeltaElse`/`Beta` sit on the control register untouched
    /// until `Beta` runs: it pops both markers, selects a branch by the
    /// boolean just computed, and enters that branch's control structure.
    fn exec_beta(&mut self) -> VResult<()> {
        let cond = self.pop_stack()?;
        let truthy = cond
            .is_truthy()
            .ok_or_else(|| VmError::TypeError {
                op: "->".to_string(),
                operand: cond.type_name().to_string(),
            })?;

        let else_marker = self.pop_delta()?;
        let then_marker = self.pop_delta()?;
        let chosen = if truthy { then_marker } else { else_marker };
        self.push_cs(chosen);
        Ok(())
    }

    fn pop_delta(&mut self) -> VResult<usize> {
        match self.control.pop() {
            Some(ControlItem::Instr(CsInstr::DeltaThen(cs))) | Some(ControlItem::Instr(CsInstr::DeltaElse(cs))) => {
                Ok(cs)
            }
            _ => Err(VmError::ControlUnderflow),
        }
    }

    fn exec_tau(&mut self, n: usize) -> VResult<()> {
        let mut elements = Vec::with_capacity(n);
        for _ in 0..n {
            elements.push(self.pop_stack()?);
        }
        self.stack.push(Object::Tuple(elements));
        Ok(())
    }

    fn exec_gamma(&mut self, out: &mut String) -> VResult<()> {
        let rator = self.pop_stack()?;
        match rator {
            Object::Lambda(closure) => self.apply_closure(closure),
            Object::Eta(closure) => {
                // Y* f → f applied to the fixed point of f, trampolined
                // through two further Gamma applications.
                self.stack.push(Object::Eta(closure.clone()));
                self.stack.push(Object::Lambda(closure));
                self.control.push(ControlItem::Instr(CsInstr::Gamma));
                self.control.push(ControlItem::Instr(CsInstr::Gamma));
                Ok(())
            }
            Object::BuiltIn(name) => self.exec_builtin(name, out),
            Object::Tuple(elements) => self.index_tuple(&elements),
            other => Err(VmError::NotApplicable(other.type_name().to_string())),
        }
    }

    fn apply_closure(&mut self, closure: LambdaValue) -> VResult<()> {
        let arg = self.pop_stack()?;
        let new_env = self.envs.new_child(closure.env);
        match closure.param {
            LambdaParam::Single(name) => {
                self.envs.define(new_env, name, arg);
            }
            LambdaParam::Tuple(names) => match arg {
                Object::Tuple(elements) if elements.len() == names.len() => {
                    for (name, value) in names.into_iter().zip(elements) {
                        self.envs.define(new_env, name, value);
                    }
                }
                Object::Tuple(elements) => {
                    return Err(VmError::TypeError {
                        op: "lambda application".to_string(),
                        operand: format!("tuple of {} elements, expected {}", elements.len(), names.len()),
                    });
                }
                other => {
                    return Err(VmError::TypeError {
                        op: "lambda application".to_string(),
                        operand: other.type_name().to_string(),
                    });
                }
            },
        }
        self.env_stack.push(new_env);
        self.stack.push(Object::EnvMarker(new_env));
        self.control.push(ControlItem::EnvMarker(new_env));
        self.push_cs(closure.body_cs);
        Ok(())
    }

    /// Strips the `EnvMarker` that delimited this call frame back out of
    /// the value stack, leaving the body's result(s) in place, and pops
    /// the now-finished environment off `env_stack`.
    fn exec_env_marker(&mut self, env_id: EnvId) -> VResult<()> {
        let mut above = Vec::new();
        loop {
            match self.pop_stack()? {
                Object::EnvMarker(id) if id == env_id => break,
                other => above.push(other),
            }
        }
        self.stack.extend(above.into_iter().rev());
        self.env_stack.pop();
        Ok(())
    }

    fn index_tuple(&mut self, elements: &[Object]) -> VResult<()> {
        let index_obj = self.pop_stack()?;
        let index = match index_obj {
            Object::Int(n) => n,
            other => {
                return Err(VmError::TypeError {
                    op: "tuple index".to_string(),
                    operand: other.type_name().to_string(),
                })
            }
        };
        if index < 1 || index as usize > elements.len() {
            return Err(VmError::IndexOutOfRange {
                index,
                size: elements.len(),
            });
        }
        self.stack.push(elements[index as usize - 1].clone());
        Ok(())
    }

    fn exec_operator(&mut self, op: &str) -> VResult<()> {
        match op {
            "neg" => {
                let v = self.pop_int(op)?;
                self.stack.push(Object::Int(-v));
            }
            "not" => {
                let v = self.pop_truthy(op)?;
                self.stack.push(Object::Bool(!v));
            }
            "+" | "-" | "*" | "/" | "**" => {
                let first = self.pop_int(op)?;
                let second = self.pop_int(op)?;
                let result = match op {
                    "+" => first + second,
                    "-" => first - second,
                    "*" => first * second,
                    "/" => {
                        if second == 0 {
                            return Err(VmError::DivisionByZero);
                        }
                        first / second
                    }
                    "**" => first.pow(second.try_into().unwrap_or(0)),
                    _ => unreachable!(),
                };
                self.stack.push(Object::Int(result));
            }
            "gr" | "ge" | "ls" | "le" => {
                let first = self.pop_int(op)?;
                let second = self.pop_int(op)?;
                let result = match op {
                    "gr" => first > second,
                    "ge" => first >= second,
                    "ls" => first < second,
                    "le" => first <= second,
                    _ => unreachable!(),
                };
                self.stack.push(Object::Bool(result));
            }
            "eq" | "ne" => {
                // Compared purely by printed value, with no regard to
                // runtime kind (matches the original CSE's plain
                // node-value string comparison): an Int and a Bool that
                // happen to render the same string would compare equal.
                let first = self.pop_stack()?;
                let second = self.pop_stack()?;
                let equal = render(&first) == render(&second);
                self.stack.push(Object::Bool(if op == "eq" { equal } else { !equal }));
            }
            "or" => {
                let first = self.pop_truthy(op)?;
                let second = self.pop_truthy(op)?;
                self.stack.push(Object::Bool(first || second));
            }
            "&" => {
                let first = self.pop_truthy(op)?;
                let second = self.pop_truthy(op)?;
                self.stack.push(Object::Bool(first && second));
            }
            "aug" => {
                let first = self.pop_stack()?;
                let second = self.pop_stack()?;
                let Object::Tuple(mut elements) = first else {
                    return Err(VmError::TypeError {
                        op: "aug".to_string(),
                        operand: first.type_name().to_string(),
                    });
                };
                elements.push(second);
                self.stack.push(Object::Tuple(elements));
            }
            other => return Err(VmError::UnknownOperator(other.to_string())),
        }
        Ok(())
    }

    fn pop_int(&mut self, op: &str) -> VResult<i64> {
        match self.pop_stack()? {
            Object::Int(n) => Ok(n),
            other => Err(VmError::TypeError {
                op: op.to_string(),
                operand: other.type_name().to_string(),
            }),
        }
    }

    /// Truthiness-based pop for `not`/`or`/`&`: literal `true`/`false` lex
    /// straight to `Int(1)`/`Int(0)` (see spec §9), so these operators must
    /// accept an `Int` operand exactly as `Beta` does, not just `Bool`.
    fn pop_truthy(&mut self, op: &str) -> VResult<bool> {
        let v = self.pop_stack()?;
        v.is_truthy().ok_or_else(|| VmError::TypeError {
            op: op.to_string(),
            operand: v.type_name().to_string(),
        })
    }

    fn exec_builtin(&mut self, name: &'static str, out: &mut String) -> VResult<()> {
        trace!("built-in {name}");
        match name {
            "Print" => {
                let value = self.pop_stack()?;
                write_rendered(out, &value);
            }
            "Isinteger" => {
                let v = self.pop_stack()?;
                self.stack.push(Object::Bool(matches!(v, Object::Int(_))));
            }
            "Isstring" => {
                let v = self.pop_stack()?;
                self.stack.push(Object::Bool(matches!(v, Object::Str(_))));
            }
            "Istuple" => {
                let v = self.pop_stack()?;
                self.stack.push(Object::Bool(matches!(v, Object::Tuple(_))));
            }
            "Isempty" => match self.pop_stack()? {
                Object::Tuple(elements) => self.stack.push(Object::Bool(elements.is_empty())),
                other => {
                    return Err(VmError::TypeError {
                        op: "Isempty".to_string(),
                        operand: other.type_name().to_string(),
                    })
                }
            },
            "Order" => match self.pop_stack()? {
                Object::Tuple(elements) => self.stack.push(Object::Int(elements.len() as i64)),
                other => {
                    return Err(VmError::TypeError {
                        op: "Order".to_string(),
                        operand: other.type_name().to_string(),
                    })
                }
            },
            "Conc" => {
                let first = self.pop_stack()?;
                let second = self.pop_stack()?;
                // The compiler emits Conc as a curried binary application;
                // discard the second Gamma the curry would otherwise need.
                self.control.pop();
                let (Object::Str(a), b) = (first, second) else {
                    return Err(VmError::TypeError {
                        op: "Conc".to_string(),
                        operand: "non-string".to_string(),
                    });
                };
                let joined = match b {
                    Object::Str(s) => a + &s,
                    Object::Int(n) => a + &n.to_string(),
                    other => {
                        return Err(VmError::TypeError {
                            op: "Conc".to_string(),
                            operand: other.type_name().to_string(),
                        })
                    }
                };
                self.stack.push(Object::Str(joined));
            }
            "Stem" => match self.pop_stack()? {
                Object::Str(s) => {
                    let stem = s.chars().next().map(String::from).unwrap_or_default();
                    self.stack.push(Object::Str(stem));
                }
                other => {
                    return Err(VmError::TypeError {
                        op: "Stem".to_string(),
                        operand: other.type_name().to_string(),
                    })
                }
            },
            "Stern" => match self.pop_stack()? {
                Object::Str(s) => {
                    let rest: String = s.chars().skip(1).collect();
                    self.stack.push(Object::Str(rest));
                }
                other => {
                    return Err(VmError::TypeError {
                        op: "Stern".to_string(),
                        operand: other.type_name().to_string(),
                    })
                }
            },
            "Y*" => match self.pop_stack()? {
                Object::Lambda(closure) => self.stack.push(Object::Eta(closure)),
                other => {
                    return Err(VmError::TypeError {
                        op: "Y*".to_string(),
                        operand: other.type_name().to_string(),
                    })
                }
            },
            _ => unreachable!("builtin_name only admits names in object::BUILTINS"),
        }
        Ok(())
    }
}

/// `Print`'s format: integers and strings render literally, booleans as
/// `true`/`false`, tuples parenthesized and comma-joined (recursively),
/// `dummy` as the literal word, and a function as `[lambda closure: <name>:
/// <cs index>]` — `<name>` is empty for a tuple-destructuring parameter,
/// which has no single bound name to show.
fn render(value: &Object) -> String {
    let mut buf = String::new();
    write_rendered(&mut buf, value);
    buf
}

fn write_rendered(buf: &mut String, value: &Object) {
    match value {
        Object::Int(n) => {
            let _ = write!(buf, "{n}");
        }
        Object::Str(s) => buf.push_str(s),
        Object::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        Object::Dummy => buf.push_str("dummy"),
        Object::Tuple(elements) => {
            buf.push('(');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                write_rendered(buf, element);
            }
            buf.push(')');
        }
        Object::Lambda(closure) | Object::Eta(closure) => {
            let name = match &closure.param {
                LambdaParam::Single(n) => n.as_str(),
                // A tuple-destructuring lambda has no single bound name to
                // show; the original prints an empty name in this slot.
                LambdaParam::Tuple(_) => "",
            };
            let _ = write!(buf, "[lambda closure: {name}: {}]", closure.body_cs);
        }
        Object::BuiltIn(name) => buf.push_str(name),
        Object::EnvMarker(_) => buf.push_str("dummy"),
    }
}
