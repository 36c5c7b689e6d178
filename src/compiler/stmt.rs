use std::rc::Rc;

use crate::{
    ast::{
        ast::{Expr, Stmt},
        statements::{DeclarationStmt, IfStmt, UseStmt},
    },
    errors::errors::InternalFault,
};

use super::{
    bytecode::{Bytecode, Constant, Instruction},
    compiler::Compiler,
    expr::{gen_assignment, gen_expression},
};

pub fn gen_statement(
    compiler: &mut Compiler,
    bytecode: &mut Bytecode,
    statement: &Stmt,
) -> Result<(), InternalFault> {
    match statement {
        Stmt::Expression(stmt) => {
            // An assignment statement leaves nothing behind to pop.
            if let Expr::Assign(assign) = &stmt.expression {
                return gen_assignment(compiler, bytecode, assign);
            }
            gen_expression(compiler, bytecode, &stmt.expression)?;
            bytecode.emit(Instruction::Pop);
        }
        Stmt::Declaration(stmt) => gen_declaration(compiler, bytecode, stmt)?,
        Stmt::Pub(stmt) => gen_declaration(compiler, bytecode, &stmt.declaration)?,
        Stmt::If(stmt) => gen_if(compiler, bytecode, stmt)?,
        Stmt::Return(stmt) => {
            match &stmt.value {
                Some(value) => gen_expression(compiler, bytecode, value)?,
                None => {
                    bytecode.emit(Instruction::Push(Constant::None));
                }
            }
            bytecode.emit(Instruction::Return);
        }
        Stmt::Use(stmt) => gen_use(compiler, bytecode, stmt)?,
    }

    Ok(())
}

fn gen_declaration(
    compiler: &mut Compiler,
    bytecode: &mut Bytecode,
    stmt: &DeclarationStmt,
) -> Result<(), InternalFault> {
    gen_expression(compiler, bytecode, &stmt.value)?;
    let cell = compiler.declare(&stmt.identifier)?;
    bytecode.emit(Instruction::Store(cell));
    Ok(())
}

/// The jump is emitted as a placeholder and patched once the end of the
/// body is known.
fn gen_if(compiler: &mut Compiler, bytecode: &mut Bytecode, stmt: &IfStmt) -> Result<(), InternalFault> {
    gen_expression(compiler, bytecode, &stmt.condition)?;
    let jump = bytecode.emit(Instruction::JumpIfFalse(0));

    for statement in stmt.body.iter() {
        gen_statement(compiler, bytecode, statement)?;
    }

    let end = bytecode.len();
    bytecode.patch(jump, Instruction::JumpIfFalse(end));
    Ok(())
}

fn gen_use(compiler: &mut Compiler, bytecode: &mut Bytecode, stmt: &UseStmt) -> Result<(), InternalFault> {
    let arena = compiler.arena;
    let dependency = compiler.linked_module(&stmt.path)?;
    let exports = arena.exports(dependency.scopes.global);

    let names: Vec<&str> = match &stmt.filter {
        Some(filter) => filter
            .iter()
            .map(String::as_str)
            .filter(|name| exports.iter().any(|(export, _)| export == name))
            .collect(),
        None => exports.iter().map(|(name, _)| name.as_str()).collect(),
    };

    let module: Rc<str> = Rc::from(dependency.module.key.as_str());
    for name in names {
        bytecode.emit(Instruction::Import {
            module: Rc::clone(&module),
            name: Rc::from(name),
        });
        let cell = compiler.declare(name)?;
        bytecode.emit(Instruction::Store(cell));
    }

    Ok(())
}
