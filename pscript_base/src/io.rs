//! Console output.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use pscript_runtime::{FunctionId, Registry, RuntimeResult};

use crate::args::arg;
use crate::text::to_text;

/// Destination of `println`.
pub type Output = Rc<RefCell<dyn Write>>;

#[derive(Debug, Clone, Copy)]
pub struct IoFunctions {
    pub println: FunctionId,
}

pub fn stdout() -> Output {
    Rc::new(RefCell::new(std::io::stdout()))
}

pub(crate) fn install(registry: &mut Registry, str_fn: FunctionId, output: Output) -> RuntimeResult<IoFunctions> {
    let any = registry.kernel().any.clone();
    let null = registry.kernel().null.clone();

    let println = registry.create_generic_function("println");
    let out = Rc::clone(&output);
    registry.register_entry(println, vec![], null.clone(), move |r, _| {
        writeln!(out.borrow_mut())?;
        Ok(r.null())
    })?;
    registry.register_entry(println, vec![any], null, move |r, args| {
        let text = to_text(r, str_fn, arg(args, 0)?)?;
        writeln!(output.borrow_mut(), "{}", text)?;
        Ok(r.null())
    })?;

    Ok(IoFunctions { println })
}
