use std::rc::Rc;

use crate::{
    ast::{ast::Expr, expressions::AssignExpr},
    errors::errors::InternalFault,
};

use super::{
    bytecode::{Bytecode, Constant, Instruction},
    compiler::Compiler,
};

/// Emits code leaving exactly one value on the stack.
pub fn gen_expression(
    compiler: &mut Compiler,
    bytecode: &mut Bytecode,
    expression: &Expr,
) -> Result<(), InternalFault> {
    match expression {
        Expr::Number(number) => {
            bytecode.emit(Instruction::Push(Constant::Int(number.value)));
        }
        Expr::String(string) => {
            bytecode.emit(Instruction::Push(Constant::Str(Rc::from(string.value.as_str()))));
        }
        Expr::Boolean(boolean) => {
            bytecode.emit(Instruction::Push(Constant::Bool(boolean.value)));
        }
        Expr::Ident(ident) => {
            let cell = compiler.resolve(&ident.value)?;
            bytecode.emit(Instruction::Load(cell));
        }
        Expr::SelfRef(_) => {
            bytecode.emit(Instruction::LoadSelf);
        }
        Expr::Function(function) => {
            let scope = compiler.function_scope(function.id)?;
            let template = compiler.compile_body(scope, &function.body, false)?;
            bytecode.emit(Instruction::Push(Constant::Closure(template)));
        }
        Expr::Dispatch(dispatch) => {
            for argument in &dispatch.arguments {
                gen_expression(compiler, bytecode, argument)?;
            }
            gen_expression(compiler, bytecode, &dispatch.callee)?;
            bytecode.emit(Instruction::Dispatch(dispatch.arguments.len()));
        }
        Expr::Assign(assign) => {
            gen_assignment(compiler, bytecode, assign)?;
            bytecode.emit(Instruction::Push(Constant::None));
        }
        Expr::Binary(binary) => {
            gen_expression(compiler, bytecode, &binary.left)?;
            gen_expression(compiler, bytecode, &binary.right)?;
            let instruction =
                Instruction::binary(&binary.operator).ok_or_else(|| InternalFault::UnknownOperator {
                    operator: binary.operator.clone(),
                })?;
            bytecode.emit(instruction);
        }
        Expr::Subscript(subscript) => {
            gen_expression(compiler, bytecode, &subscript.target)?;
            gen_expression(compiler, bytecode, &subscript.index)?;
            bytecode.emit(Instruction::Subscript);
        }
        Expr::List(list) => {
            for element in &list.elements {
                gen_expression(compiler, bytecode, element)?;
            }
            bytecode.emit(Instruction::MakeList(list.elements.len()));
        }
    }

    Ok(())
}

/// Stores the value into the assigned variable without leaving anything on
/// the stack.
pub fn gen_assignment(
    compiler: &mut Compiler,
    bytecode: &mut Bytecode,
    assign: &AssignExpr,
) -> Result<(), InternalFault> {
    gen_expression(compiler, bytecode, &assign.value)?;

    let Expr::Ident(ident) = assign.assignee.as_ref() else {
        return Err(InternalFault::InvalidAssignee);
    };
    let cell = compiler.resolve(&ident.value)?;
    bytecode.emit(Instruction::Store(cell));
    Ok(())
}
