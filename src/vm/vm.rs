//! The bytecode interpreter.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{
    compiler::bytecode::{Bytecode, ClosureTemplate, Constant, Instruction},
    errors::errors::RuntimeFault,
    linker::module::NativeModule,
};

use super::{
    environment::Environment,
    object::{Closure, Object},
};

/// Default limit on nested closure calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

/// What to do after an instruction.
enum Flow {
    Next,
    Jump(usize),
    Exit(Object),
}

/// Evaluates module bodies and keeps the exports of evaluated modules so
/// later modules can import them.
pub struct VM {
    max_call_depth: usize,
    depth: usize,
    modules: FxHashMap<String, FxHashMap<String, Object>>,
}

impl Default for VM {
    fn default() -> Self {
        VM::new(DEFAULT_MAX_CALL_DEPTH)
    }
}

impl VM {
    pub fn new(max_call_depth: usize) -> Self {
        VM {
            max_call_depth,
            depth: 0,
            modules: FxHashMap::default(),
        }
    }

    /// Makes `exports` importable under `module`.
    pub fn register_module(&mut self, module: &str, exports: FxHashMap<String, Object>) {
        self.modules.insert(module.to_string(), exports);
    }

    pub fn register_native(&mut self, native: &NativeModule) {
        let exports = native
            .builtins
            .iter()
            .map(|builtin| (builtin.name.clone(), Object::Builtin(Rc::clone(builtin))))
            .collect();
        self.register_module(&native.name, exports);
    }

    pub fn get_export(&self, module: &str, name: &str) -> Option<&Object> {
        self.modules.get(module).and_then(|exports| exports.get(name))
    }

    /// Runs a module body in a fresh root environment. Returns the value of a
    /// top-level `return`, or `None` when the body runs to its end, together
    /// with the environment holding the module's variables.
    pub fn evaluate(
        &mut self,
        template: &ClosureTemplate,
    ) -> Result<(Object, Rc<Environment>), RuntimeFault> {
        let env = Environment::new_root();
        let result = self.run(&template.bytecode, &env)?;
        Ok((result, env))
    }

    /// Fetches, executes and advances until the body halts or returns.
    fn run(&mut self, bytecode: &Bytecode, env: &Rc<Environment>) -> Result<Object, RuntimeFault> {
        let mut ip = 0;

        while let Some(instruction) = bytecode.instructions.get(ip) {
            match self.execute(instruction, env)? {
                Flow::Next => ip += 1,
                Flow::Jump(target) => ip = target,
                Flow::Exit(result) => return Ok(result),
            }
        }

        Ok(Object::None)
    }

    fn execute(&mut self, instruction: &Instruction, env: &Rc<Environment>) -> Result<Flow, RuntimeFault> {
        match instruction {
            Instruction::Halt => return Ok(Flow::Exit(Object::None)),
            Instruction::Return => return Ok(Flow::Exit(env.pop()?)),
            Instruction::Push(constant) => env.push(materialize(constant, env)),
            Instruction::Pop => {
                env.pop()?;
            }
            Instruction::Reserve(cell) => env.reserve(cell),
            Instruction::Load(cell) => env.push(env.load(cell)?),
            Instruction::Store(cell) => {
                let value = env.pop()?;
                env.store(cell, value)?;
            }
            Instruction::LoadSelf => {
                let closure = env.self_closure().ok_or(RuntimeFault::NoSelf)?;
                env.push(Object::Closure(Rc::clone(closure)));
            }
            Instruction::JumpIfFalse(target) => {
                let condition = env.pop()?;
                let condition = condition.as_bool().ok_or_else(|| wrong_operand("Bool", &condition))?;
                if !condition {
                    return Ok(Flow::Jump(*target));
                }
            }
            Instruction::Dispatch(count) => {
                let result = self.dispatch(env, *count)?;
                env.push(result);
            }
            Instruction::MakeList(count) => {
                let items = env.pop_n(*count)?;
                env.push(Object::List(Rc::new(items)));
            }
            Instruction::Subscript => {
                let index = env.pop()?;
                let target = env.pop()?;
                env.push(subscript(&target, &index)?);
            }
            Instruction::Import { module, name } => {
                let object = self
                    .get_export(module, name)
                    .cloned()
                    .ok_or_else(|| RuntimeFault::MissingExport {
                        module: module.to_string(),
                        name: name.to_string(),
                    })?;
                env.push(object);
            }
            operator => {
                let right = env.pop()?;
                let left = env.pop()?;
                env.push(binary(operator, &left, &right)?);
            }
        }

        Ok(Flow::Next)
    }

    fn dispatch(&mut self, env: &Rc<Environment>, count: usize) -> Result<Object, RuntimeFault> {
        match env.pop()? {
            Object::Closure(closure) => {
                if self.depth >= self.max_call_depth {
                    return Err(RuntimeFault::CallDepthExceeded {
                        limit: self.max_call_depth,
                    });
                }

                let arguments = env.pop_n(count)?;
                let call = Environment::new_call(Rc::clone(&closure));
                for (parameter, argument) in closure.template.parameters.iter().zip(arguments) {
                    call.reserve(parameter);
                    call.store(parameter, argument)?;
                }

                trace!(template = closure.template.id, depth = self.depth, "dispatch");
                self.depth += 1;
                let result = self.run(&closure.template.bytecode, &call);
                self.depth -= 1;
                result
            }
            Object::Builtin(builtin) => {
                let arguments = env.pop_n(count)?;
                trace!(builtin = %builtin.name, "dispatch");
                (builtin.func)(&arguments).map_err(|message| RuntimeFault::Host {
                    name: builtin.name.clone(),
                    message,
                })
            }
            other => Err(RuntimeFault::NotCallable {
                received: other.type_name().to_string(),
            }),
        }
    }
}

fn materialize(constant: &Constant, env: &Rc<Environment>) -> Object {
    match constant {
        Constant::None => Object::None,
        Constant::Int(value) => Object::Int(*value),
        Constant::Str(value) => Object::Str(Rc::clone(value)),
        Constant::Bool(value) => Object::Bool(*value),
        Constant::Closure(template) => Object::Closure(Rc::new(Closure {
            template: Rc::clone(template),
            env: Rc::clone(env),
        })),
    }
}

fn wrong_operand(expected: &'static str, received: &Object) -> RuntimeFault {
    RuntimeFault::WrongOperand {
        expected,
        received: received.type_name().to_string(),
    }
}

fn int_operands(left: &Object, right: &Object) -> Result<(i64, i64), RuntimeFault> {
    let left = left.as_int().ok_or_else(|| wrong_operand("Int", left))?;
    let right = right.as_int().ok_or_else(|| wrong_operand("Int", right))?;
    Ok((left, right))
}

fn bool_operands(left: &Object, right: &Object) -> Result<(bool, bool), RuntimeFault> {
    let left = left.as_bool().ok_or_else(|| wrong_operand("Bool", left))?;
    let right = right.as_bool().ok_or_else(|| wrong_operand("Bool", right))?;
    Ok((left, right))
}

fn binary(operator: &Instruction, left: &Object, right: &Object) -> Result<Object, RuntimeFault> {
    if let (Instruction::Add, Object::Str(l), Object::Str(r)) = (operator, left, right) {
        return Ok(Object::str(&format!("{}{}", l, r)));
    }

    let result = match operator {
        Instruction::Equals => Object::Bool(left == right),
        Instruction::NotEquals => Object::Bool(left != right),
        Instruction::And => {
            let (l, r) = bool_operands(left, right)?;
            Object::Bool(l && r)
        }
        Instruction::Or => {
            let (l, r) = bool_operands(left, right)?;
            Object::Bool(l || r)
        }
        _ => {
            let (l, r) = int_operands(left, right)?;
            match operator {
                Instruction::Add => Object::Int(l.wrapping_add(r)),
                Instruction::Subtract => Object::Int(l.wrapping_sub(r)),
                Instruction::Multiply => Object::Int(l.wrapping_mul(r)),
                Instruction::Divide if r == 0 => return Err(RuntimeFault::DivisionByZero),
                Instruction::Divide => Object::Int(l.wrapping_div(r)),
                Instruction::Modulo if r == 0 => return Err(RuntimeFault::DivisionByZero),
                Instruction::Modulo => Object::Int(l.wrapping_rem(r)),
                Instruction::Less => Object::Bool(l < r),
                Instruction::LessEquals => Object::Bool(l <= r),
                Instruction::Greater => Object::Bool(l > r),
                Instruction::GreaterEquals => Object::Bool(l >= r),
                other => {
                    return Err(RuntimeFault::WrongOperand {
                        expected: "operator",
                        received: other.to_string(),
                    })
                }
            }
        }
    };

    Ok(result)
}

/// Out of range indexes yield `None`.
fn subscript(target: &Object, index: &Object) -> Result<Object, RuntimeFault> {
    let index = index.as_int().ok_or_else(|| wrong_operand("Int", index))?;
    let position = usize::try_from(index).ok();

    match target {
        Object::List(items) => Ok(position
            .and_then(|position| items.get(position))
            .cloned()
            .unwrap_or(Object::None)),
        Object::Str(value) => Ok(position
            .and_then(|position| value.chars().nth(position))
            .map(|ch| Object::str(&ch.to_string()))
            .unwrap_or(Object::None)),
        other => Err(wrong_operand("List or Str", other)),
    }
}
