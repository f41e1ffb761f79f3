//! PScript base library
//!
//! Registers the builtin predicates and generic functions into a
//! [`Registry`] through the public engine API:
//!
//! - `predicates`: `isReal`, `isInt`, `isChar`, `isString`, `isList`, `isMap`
//! - `numbers`: arithmetic, comparison, `neg`, `is`, `int`
//! - `text`: `str` and string concatenation on `add`
//! - `collections`: `isEmpty`, `size`, `get`, `set`
//! - `reflect`: `type`, `derive`, `isA`, `AS`, `as`, `apply`
//! - `io`: `println`
//!
//! # Example
//! ```
//! use pscript_runtime::Registry;
//!
//! let mut registry = Registry::new();
//! let base = pscript_base::install(&mut registry).unwrap();
//! let t = &base.types;
//! let sum = registry.call(base.numbers.add, &[t.int(2), t.int(3)]).unwrap();
//! assert_eq!(sum, t.int(5));
//! ```

mod args;
pub mod collections;
pub mod io;
pub mod numbers;
pub mod predicates;
pub mod reflect;
pub mod text;

use pscript_runtime::{Registry, RuntimeResult};

pub use collections::CollectionFunctions;
pub use io::{IoFunctions, Output};
pub use numbers::NumberFunctions;
pub use predicates::BaseTypes;
pub use reflect::ReflectFunctions;
pub use text::TextFunctions;

/// Handles to everything the base library registered.
#[derive(Debug, Clone)]
pub struct Base {
    pub types: BaseTypes,
    pub numbers: NumberFunctions,
    pub text: TextFunctions,
    pub collections: CollectionFunctions,
    pub reflect: ReflectFunctions,
    pub io: IoFunctions,
}

/// Install the base library, printing to stdout.
pub fn install(registry: &mut Registry) -> RuntimeResult<Base> {
    install_with_output(registry, io::stdout())
}

/// Install the base library, sending `println` output to `output`.
pub fn install_with_output(registry: &mut Registry, output: Output) -> RuntimeResult<Base> {
    let types = predicates::install(registry)?;
    let numbers = numbers::install(registry, &types)?;
    let text = text::install(registry, &types, numbers.add)?;
    let collections = collections::install(registry, &types)?;
    let reflect = reflect::install(registry, &types)?;
    let io = io::install(registry, text.str, output)?;
    Ok(Base {
        types,
        numbers,
        text,
        collections,
        reflect,
        io,
    })
}
