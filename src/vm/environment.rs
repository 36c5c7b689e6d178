//! Runtime call frames.
//!
//! An environment is created for each module evaluation and each call of a
//! closure. Closures keep the environment they were created in alive through
//! an `Rc`, which is what lets them outlive the call that made them.

use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::{errors::errors::RuntimeFault, type_checker::scope::CellTemplate};

use super::object::{Closure, Object};

#[derive(Default)]
pub struct Environment {
    /// Operand stack
    stack: RefCell<Vec<Object>>,
    /// Cells by template id; `None` until first stored
    cells: RefCell<FxHashMap<u32, Option<Object>>>,
    parent: Option<Rc<Environment>>,
    /// The closure running in this environment
    self_closure: Option<Rc<Closure>>,
}

impl Environment {
    pub fn new_root() -> Rc<Environment> {
        Rc::new(Environment::default())
    }

    /// A call frame for `closure`, parented at the environment the closure
    /// captured rather than at the caller's.
    pub fn new_call(closure: Rc<Closure>) -> Rc<Environment> {
        Rc::new(Environment {
            parent: Some(Rc::clone(&closure.env)),
            self_closure: Some(closure),
            ..Environment::default()
        })
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    pub fn self_closure(&self) -> Option<&Rc<Closure>> {
        self.self_closure.as_ref()
    }

    pub fn push(&self, object: Object) {
        self.stack.borrow_mut().push(object);
    }

    pub fn pop(&self) -> Result<Object, RuntimeFault> {
        self.stack
            .borrow_mut()
            .pop()
            .ok_or(RuntimeFault::StackUnderflow)
    }

    /// Pops `count` values, returned in push order.
    pub fn pop_n(&self, count: usize) -> Result<Vec<Object>, RuntimeFault> {
        let mut stack = self.stack.borrow_mut();
        if stack.len() < count {
            return Err(RuntimeFault::StackUnderflow);
        }
        let start = stack.len() - count;
        Ok(stack.split_off(start))
    }

    pub fn stack_len(&self) -> usize {
        self.stack.borrow().len()
    }

    /// Creates an empty cell in this environment only.
    pub fn reserve(&self, cell: &CellTemplate) {
        self.cells.borrow_mut().insert(cell.id, None);
    }

    /// Writes the nearest cell for `cell`, searching outwards.
    pub fn store(&self, cell: &CellTemplate, object: Object) -> Result<(), RuntimeFault> {
        let mut current = Some(self);

        while let Some(env) = current {
            if let Some(slot) = env.cells.borrow_mut().get_mut(&cell.id) {
                *slot = Some(object);
                return Ok(());
            }
            current = env.parent.as_deref();
        }

        Err(RuntimeFault::MissingCell {
            id: cell.id,
            name: cell.name.clone(),
        })
    }

    /// Reads the nearest cell for `cell`, searching outwards.
    pub fn load(&self, cell: &CellTemplate) -> Result<Object, RuntimeFault> {
        let mut current = Some(self);

        while let Some(env) = current {
            if let Some(slot) = env.cells.borrow().get(&cell.id) {
                return slot.clone().ok_or_else(|| RuntimeFault::UninitialisedCell {
                    id: cell.id,
                    name: cell.name.clone(),
                });
            }
            current = env.parent.as_deref();
        }

        Err(RuntimeFault::MissingCell {
            id: cell.id,
            name: cell.name.clone(),
        })
    }
}
