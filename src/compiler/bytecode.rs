//! Bytecode definitions.

use std::{fmt::Display, rc::Rc};

use crate::type_checker::scope::CellTemplate;

/// A value known at compile time.
#[derive(Debug, Clone)]
pub enum Constant {
    None,
    Int(i64),
    Str(Rc<str>),
    Bool(bool),
    /// Becomes a closure over the current environment when pushed.
    Closure(Rc<ClosureTemplate>),
}

impl Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::None => write!(f, "none"),
            Constant::Int(value) => write!(f, "{}", value),
            Constant::Str(value) => write!(f, "{:?}", value),
            Constant::Bool(value) => write!(f, "{}", value),
            Constant::Closure(template) => write!(f, "<closure #{}>", template.id),
        }
    }
}

/// A single bytecode instruction.
#[derive(Debug, Clone)]
pub enum Instruction {
    /// End of the module body
    Halt,
    /// Push a constant onto the stack
    Push(Constant),
    /// Pop the top value
    Pop,
    /// Create an empty cell in the current environment
    Reserve(Rc<CellTemplate>),
    /// Push the value of a cell
    Load(Rc<CellTemplate>),
    /// Pop into a cell
    Store(Rc<CellTemplate>),
    /// Push the running closure
    LoadSelf,
    /// Pop a `Bool` and jump to the target when it is false
    JumpIfFalse(usize),
    /// Pop a callee, then call it with that many arguments from the stack
    Dispatch(usize),
    /// Pop the result and leave the current function
    Return,

    // Arithmetic operations
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Comparison operations
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,

    // Logical operations
    And,
    Or,

    /// Pop that many values into a list
    MakeList(usize),
    /// Pop an index and a target, push the element or none
    Subscript,
    /// Push an export of an already evaluated module
    Import { module: Rc<str>, name: Rc<str> },
}

impl Instruction {
    /// Instruction for a binary operator, as written in source.
    pub fn binary(operator: &str) -> Option<Instruction> {
        Some(match operator {
            "+" => Instruction::Add,
            "-" => Instruction::Subtract,
            "*" => Instruction::Multiply,
            "/" => Instruction::Divide,
            "%" => Instruction::Modulo,
            "<" => Instruction::Less,
            "<=" => Instruction::LessEquals,
            ">" => Instruction::Greater,
            ">=" => Instruction::GreaterEquals,
            "==" => Instruction::Equals,
            "!=" => Instruction::NotEquals,
            "&&" => Instruction::And,
            "||" => Instruction::Or,
            _ => return None,
        })
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Halt => write!(f, "HALT"),
            Instruction::Push(constant) => write!(f, "PUSH {}", constant),
            Instruction::Pop => write!(f, "POP"),
            Instruction::Reserve(cell) => write!(f, "RESERVE {}", cell),
            Instruction::Load(cell) => write!(f, "LOAD {}", cell),
            Instruction::Store(cell) => write!(f, "STORE {}", cell),
            Instruction::LoadSelf => write!(f, "LOAD_SELF"),
            Instruction::JumpIfFalse(target) => write!(f, "JUMP_IF_FALSE {}", target),
            Instruction::Dispatch(count) => write!(f, "DISPATCH {}", count),
            Instruction::Return => write!(f, "RETURN"),
            Instruction::Add => write!(f, "ADD"),
            Instruction::Subtract => write!(f, "SUB"),
            Instruction::Multiply => write!(f, "MUL"),
            Instruction::Divide => write!(f, "DIV"),
            Instruction::Modulo => write!(f, "MOD"),
            Instruction::Less => write!(f, "LT"),
            Instruction::LessEquals => write!(f, "LE"),
            Instruction::Greater => write!(f, "GT"),
            Instruction::GreaterEquals => write!(f, "GE"),
            Instruction::Equals => write!(f, "EQ"),
            Instruction::NotEquals => write!(f, "NE"),
            Instruction::And => write!(f, "AND"),
            Instruction::Or => write!(f, "OR"),
            Instruction::MakeList(count) => write!(f, "MAKE_LIST {}", count),
            Instruction::Subscript => write!(f, "SUBSCRIPT"),
            Instruction::Import { module, name } => write!(f, "IMPORT {}.{}", module, name),
        }
    }
}

/// A compiled function body.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    /// The instructions
    pub instructions: Vec<Instruction>,
}

impl Bytecode {
    /// Creates a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instruction and returns its index.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        let index = self.instructions.len();
        self.instructions.push(instruction);
        index
    }

    /// Overwrites a previously emitted instruction.
    pub fn patch(&mut self, index: usize, instruction: Instruction) {
        self.instructions[index] = instruction;
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// One `%04d instruction` line per instruction.
impl Display for Bytecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{:04} {}", index, instruction)?;
        }
        Ok(())
    }
}

/// A function as compiled: parameter cells plus its body.
#[derive(Debug)]
pub struct ClosureTemplate {
    pub id: u32,
    pub parameters: Vec<Rc<CellTemplate>>,
    pub bytecode: Bytecode,
}

impl ClosureTemplate {
    /// Templates of the function literals directly inside this body.
    pub fn nested(&self) -> impl Iterator<Item = &Rc<ClosureTemplate>> {
        self.bytecode
            .instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Push(Constant::Closure(template)) => Some(template),
                _ => None,
            })
    }
}

/// Dumps this template followed by every nested one, depth first.
impl Display for ClosureTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "closure #{} (", self.id)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", parameter)?;
        }
        writeln!(f, ")")?;
        write!(f, "{}", self.bytecode)?;

        for nested in self.nested() {
            write!(f, "{}", nested)?;
        }
        Ok(())
    }
}
