mod builtin;
mod env;
mod runtime;

use std::rc::Rc;

pub use env::Environment;
pub use runtime::eval;

/// A fresh root environment. The REPL holds one across lines; script
/// evaluation makes one per run.
pub fn new_environment() -> Rc<Environment> {
    Environment::new_global()
}
