use std::rc::Rc;

use crate::object::{Builtin, Object};

/// The builtin table. It is consulted only after an identifier misses the
/// whole environment chain, so a `let` binding of the same name shadows the
/// builtin for its scope.
pub fn lookup_builtin(name: &str) -> Option<Object> {
    BUILTINS
        .iter()
        .find(|builtin| builtin.name == name)
        .map(|builtin| Object::Builtin(*builtin))
}

const BUILTINS: [Builtin; 6] = [
    Builtin {
        name: "len",
        func: builtin_len,
    },
    Builtin {
        name: "first",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        func: builtin_push,
    },
    Builtin {
        name: "puts",
        func: builtin_puts,
    },
];

fn wrong_arg_count(got: usize, want: usize) -> Object {
    Object::Error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    ))
}

fn builtin_len(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }
    match &args[0] {
        // Byte length, not code points
        Object::Str(text) => Object::Integer(text.len() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => Object::Error(format!(
            "argument to 'len' not supported, got {}",
            other.kind()
        )),
    }
}

fn builtin_first(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.first().cloned().unwrap_or(Object::Null),
        other => Object::Error(format!(
            "argument to 'first' must be ARRAY, got {}",
            other.kind()
        )),
    }
}

fn builtin_last(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.last().cloned().unwrap_or(Object::Null),
        other => Object::Error(format!(
            "argument to 'last' must be ARRAY, got {}",
            other.kind()
        )),
    }
}

fn builtin_rest(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => {
            if elements.is_empty() {
                Object::Null
            } else {
                Object::Array(Rc::new(elements[1..].to_vec()))
            }
        }
        other => Object::Error(format!(
            "argument to 'rest' must be ARRAY, got {}",
            other.kind()
        )),
    }
}

// Returns a new array; the input is never mutated
fn builtin_push(mut args: Vec<Object>) -> Object {
    if args.len() != 2 {
        return wrong_arg_count(args.len(), 2);
    }
    let value = args.pop().unwrap();
    match &args[0] {
        Object::Array(elements) => {
            let mut pushed = elements.as_ref().clone();
            pushed.push(value);
            Object::Array(Rc::new(pushed))
        }
        other => Object::Error(format!(
            "argument to 'push' must be ARRAY, got {}",
            other.kind()
        )),
    }
}

fn builtin_puts(args: Vec<Object>) -> Object {
    for arg in &args {
        println!("{}", arg);
    }
    Object::Null
}
