use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::ast::Block;
use crate::interpreter::Environment;

/// A runtime value. The cheap variants are inline; everything that can be
/// aliased from the language side (strings, collections, functions) sits
/// behind an Rc so that clone is pointer-cheap and `==` can mean identity
/// where the language wants identity.
#[derive(Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Str(Rc<String>),
    Null,
    Array(Rc<Vec<Object>>),
    // Keyed by the derived hash key; the original key object is kept
    // alongside the value for rendering
    Hash(Rc<HashMap<HashKey, (Object, Object)>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    // The early-return sentinel. It travels up block evaluation and is
    // stripped at the nearest call or program boundary
    Return(Box<Object>),
    Error(String),
}

/// The closed set of type tags, used for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Boolean,
    Str,
    Null,
    Array,
    Hash,
    Function,
    Builtin,
    Return,
    Error,
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Type::Integer => "INTEGER",
            Type::Boolean => "BOOLEAN",
            Type::Str => "STRING",
            Type::Null => "NULL",
            Type::Array => "ARRAY",
            Type::Hash => "HASH",
            Type::Function => "FUNCTION",
            Type::Builtin => "BUILTIN",
            Type::Return => "RETURN",
            Type::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A user function value: the literal's pieces plus the environment it was
/// evaluated in. Calls chain a fresh scope under `env`, which is what makes
/// closures work.
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Block,
    pub env: Rc<Environment>,
}

/// A host function exposed to the language.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: fn(Vec<Object>) -> Object,
}

/// The stable key hash values index by: a type tag plus 64 bits derived
/// from the payload. Distinct from object identity on purpose, so that two
/// equal strings address the same hash slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: Type,
    pub value: u64,
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl Object {
    pub fn kind(&self) -> Type {
        match self {
            Object::Integer(_) => Type::Integer,
            Object::Boolean(_) => Type::Boolean,
            Object::Str(_) => Type::Str,
            Object::Null => Type::Null,
            Object::Array(_) => Type::Array,
            Object::Hash(_) => Type::Hash,
            Object::Function(_) => Type::Function,
            Object::Builtin(_) => Type::Builtin,
            Object::Return(_) => Type::Return,
            Object::Error(_) => Type::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Truthiness: everything except false and null.
    pub fn to_bool(&self) -> bool {
        match self {
            Object::Boolean(b) => *b,
            Object::Null => false,
            _ => true,
        }
    }

    /// Derive the hash key, for the three hashable types. Everything else
    /// is None and surfaces as an "unusable as hash key" error upstream.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => Some(HashKey {
                kind: Type::Integer,
                value: *value as u64,
            }),
            Object::Boolean(value) => Some(HashKey {
                kind: Type::Boolean,
                value: u64::from(*value),
            }),
            Object::Str(text) => Some(HashKey {
                kind: Type::Str,
                value: fnv1a_64(text.as_bytes()),
            }),
            _ => None,
        }
    }
}

// Equality is by value for integers, strings, booleans and null, and by
// identity for everything that lives behind an Rc. Two structurally equal
// arrays are not equal unless they are the same allocation
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(l), Object::Integer(r)) => l == r,
            (Object::Boolean(l), Object::Boolean(r)) => l == r,
            (Object::Str(l), Object::Str(r)) => l == r,
            (Object::Null, Object::Null) => true,
            (Object::Array(l), Object::Array(r)) => Rc::ptr_eq(l, r),
            (Object::Hash(l), Object::Hash(r)) => Rc::ptr_eq(l, r),
            (Object::Function(l), Object::Function(r)) => Rc::ptr_eq(l, r),
            (Object::Builtin(l), Object::Builtin(r)) => l.name == r.name,
            (Object::Return(l), Object::Return(r)) => l == r,
            (Object::Error(l), Object::Error(r)) => l == r,
            _ => false,
        }
    }
}

// The inspect form: what the REPL prints and what error messages embed
impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::Str(text) => f.write_str(text),
            Object::Null => f.write_str("null"),
            Object::Array(elements) => {
                f.write_str("[")?;
                let mut first = true;
                for element in elements.iter() {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{}", element)?;
                }
                f.write_str("]")
            }
            Object::Hash(pairs) => {
                f.write_str("{")?;
                let mut first = true;
                for (key, value) in pairs.values() {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Object::Function(function) => {
                write!(f, "fn({}) {}", function.parameters.join(", "), function.body)
            }
            Object::Builtin(_) => f.write_str("builtin function"),
            Object::Return(value) => write!(f, "{}", value),
            Object::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
