//! The stack based virtual machine.
//!
//! Executes compiled module bodies over a chain of environments:
//!
//! - Objects: the runtime values
//! - Environments: operand stack plus cells, one per module run or call
//! - Dispatch onto closures and host builtins
//! - The `std` native module

pub mod environment;
pub mod object;
pub mod stdlib;
pub mod vm;
