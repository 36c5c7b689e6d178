//! The `std` native module.
//!
//! Provides the host builtins every program can import with `use "std";`.

use crate::{
    linker::module::NativeModule,
    type_checker::types::{FunctionType, Type},
};

use super::object::Object;

pub const STD_MODULE: &str = "std";

/// `std` with `print` writing to standard output.
pub fn std_module() -> NativeModule {
    std_module_with_output(|line| println!("{}", line))
}

/// `std` with `print` handing each line to `output`.
pub fn std_module_with_output(output: impl Fn(&str) + 'static) -> NativeModule {
    NativeModule::new(STD_MODULE)
        .with_builtin(
            "print",
            FunctionType::new(vec![Type::Any], Type::Void),
            move |args| {
                let line = args
                    .iter()
                    .map(|arg| arg.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                output(&line);
                Ok(Object::None)
            },
        )
        .with_builtin(
            "len",
            FunctionType::new(vec![Type::str()], Type::int()),
            |args| match args {
                [Object::Str(value)] => Ok(Object::Int(value.chars().count() as i64)),
                _ => Err(String::from("expected a single Str argument")),
            },
        )
        .with_builtin(
            "str",
            FunctionType::new(vec![Type::int()], Type::str()),
            |args| match args {
                [Object::Int(value)] => Ok(Object::str(&value.to_string())),
                _ => Err(String::from("expected a single Int argument")),
            },
        )
        .with_builtin(
            "assert",
            FunctionType::new(vec![Type::bool(), Type::str()], Type::Void),
            |args| match args {
                [Object::Bool(true), _] => Ok(Object::None),
                [Object::Bool(false), message] => Err(format!("assertion failed: {}", message)),
                _ => Err(String::from("expected Bool and Str arguments")),
            },
        )
}
