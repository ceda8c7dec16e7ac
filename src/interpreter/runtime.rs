use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{BinaryOp, Block, Expr, ExprInner, Program, Stmt, StmtInner, UnaryOp};
use crate::object::{Function, Object, Type};

use super::builtin::lookup_builtin;
use super::env::Environment;

/// Evaluate a whole program. A Return unwinding out of the top level is
/// unwrapped here; an Error stops evaluation and is returned as-is.
pub fn eval(program: &Program, env: &Rc<Environment>) -> Object {
    let mut result = Object::Null;
    for stmt in &program.0 {
        match eval_stmt(stmt, env) {
            Object::Return(value) => return *value,
            err @ Object::Error(_) => return err,
            other => result = other,
        }
    }
    result
}

fn eval_stmt(stmt: &Stmt, env: &Rc<Environment>) -> Object {
    match &stmt.inner {
        StmtInner::Let { name, value } => {
            let value = eval_expr(value, env);
            if value.is_error() {
                return value;
            }
            env.bind(name, value);
            Object::Null
        }
        StmtInner::Return(value) => {
            let value = eval_expr(value, env);
            if value.is_error() {
                return value;
            }
            Object::Return(Box::new(value))
        }
        StmtInner::Expr(expr) => eval_expr(expr, env),
    }
}

// Unlike program evaluation this must NOT unwrap a Return: the sentinel has
// to travel through nested blocks untouched until the enclosing call or
// program strips it
fn eval_block(block: &Block, env: &Rc<Environment>) -> Object {
    let mut result = Object::Null;
    for stmt in &block.stmts {
        match eval_stmt(stmt, env) {
            stop @ (Object::Return(_) | Object::Error(_)) => return stop,
            other => result = other,
        }
    }
    result
}

fn eval_expr(expr: &Expr, env: &Rc<Environment>) -> Object {
    match &expr.inner {
        ExprInner::Integer(value) => Object::Integer(*value),
        ExprInner::Str(raw) => match expand_escapes(raw) {
            Ok(text) => Object::Str(Rc::new(text)),
            Err(err) => err,
        },
        ExprInner::Boolean(value) => Object::Boolean(*value),
        ExprInner::Identifier(name) => env
            .lookup(name)
            .or_else(|| lookup_builtin(name))
            .unwrap_or_else(|| Object::Error(format!("identifier not found: {}", name))),
        ExprInner::Unary { op, right } => {
            let right = eval_expr(right, env);
            if right.is_error() {
                return right;
            }
            eval_unary_expr(*op, right)
        }
        ExprInner::Binary { left, op, right } => {
            let left = eval_expr(left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expr(right, env);
            if right.is_error() {
                return right;
            }
            eval_binary_expr(*op, left, right)
        }
        ExprInner::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expr(condition, env);
            if condition.is_error() {
                return condition;
            }
            if condition.to_bool() {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                Object::Null
            }
        }
        ExprInner::Function { parameters, body } => Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: env.clone(),
        })),
        ExprInner::Call {
            function,
            arguments,
        } => {
            let callee = eval_expr(function, env);
            if callee.is_error() {
                return callee;
            }
            let args = match eval_expr_list(arguments, env) {
                Ok(args) => args,
                Err(err) => return err,
            };
            apply_function(callee, args)
        }
        ExprInner::Array(elements) => match eval_expr_list(elements, env) {
            Ok(elements) => Object::Array(Rc::new(elements)),
            Err(err) => err,
        },
        ExprInner::Index { left, index } => {
            let left = eval_expr(left, env);
            if left.is_error() {
                return left;
            }
            let index = eval_expr(index, env);
            if index.is_error() {
                return index;
            }
            eval_index_expr(left, index)
        }
        ExprInner::Hash(pairs) => eval_hash_literal(pairs, env),
    }
}

// Left-to-right, stopping on the first error. Shared by call arguments and
// array literals
fn eval_expr_list(exprs: &[Expr], env: &Rc<Environment>) -> Result<Vec<Object>, Object> {
    let mut values = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let value = eval_expr(expr, env);
        if value.is_error() {
            return Err(value);
        }
        values.push(value);
    }
    Ok(values)
}

fn apply_function(callee: Object, args: Vec<Object>) -> Object {
    match callee {
        Object::Function(function) => {
            if args.len() != function.parameters.len() {
                return Object::Error(format!(
                    "wrong number of arguments: want={}, got={}",
                    function.parameters.len(),
                    args.len()
                ));
            }
            // The new scope chains under the environment the function was
            // defined in, not the caller's
            let scope = function.env.open_scope();
            for (parameter, value) in function.parameters.iter().zip(args) {
                scope.bind(parameter, value);
            }
            match eval_block(&function.body, &scope) {
                Object::Return(value) => *value,
                other => other,
            }
        }
        Object::Builtin(builtin) => (builtin.func)(args),
        other => Object::Error(format!("not a function: {}", other.kind())),
    }
}

fn eval_unary_expr(op: UnaryOp, right: Object) -> Object {
    match op {
        UnaryOp::Not => match right {
            Object::Boolean(value) => Object::Boolean(!value),
            Object::Null => Object::Boolean(true),
            _ => Object::Boolean(false),
        },
        UnaryOp::Negative => match right {
            Object::Integer(value) => Object::Integer(value.wrapping_neg()),
            other => Object::Error(format!("unknown operator: -{}", other.kind())),
        },
    }
}

fn eval_binary_expr(op: BinaryOp, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_binary_expr(op, *l, *r),
        (Object::Str(l), Object::Str(r)) => eval_string_binary_expr(op, l, r),
        _ => match op {
            // Mixed or non-scalar operands compare by singleton identity:
            // booleans and nulls by value, Rc-backed values by pointer
            BinaryOp::Equal => Object::Boolean(left == right),
            BinaryOp::NotEqual => Object::Boolean(left != right),
            _ if left.kind() != right.kind() => Object::Error(format!(
                "type mismatch: {} {} {}",
                left.kind(),
                op,
                right.kind()
            )),
            _ => Object::Error(format!(
                "unknown operator: {} {} {}",
                left.kind(),
                op,
                right.kind()
            )),
        },
    }
}

fn eval_integer_binary_expr(op: BinaryOp, left: i64, right: i64) -> Object {
    match op {
        BinaryOp::Add => Object::Integer(left.wrapping_add(right)),
        BinaryOp::Subtract => Object::Integer(left.wrapping_sub(right)),
        BinaryOp::Multiply => Object::Integer(left.wrapping_mul(right)),
        BinaryOp::Divide => {
            if right == 0 {
                Object::Error("division by zero".to_string())
            } else {
                // Truncates toward zero; wrapping_div so MIN / -1 stays defined
                Object::Integer(left.wrapping_div(right))
            }
        }
        BinaryOp::LessThan => Object::Boolean(left < right),
        BinaryOp::LessThanEqual => Object::Boolean(left <= right),
        BinaryOp::GreaterThan => Object::Boolean(left > right),
        BinaryOp::GreaterThanEqual => Object::Boolean(left >= right),
        BinaryOp::Equal => Object::Boolean(left == right),
        BinaryOp::NotEqual => Object::Boolean(left != right),
    }
}

fn eval_string_binary_expr(op: BinaryOp, left: &Rc<String>, right: &Rc<String>) -> Object {
    match op {
        BinaryOp::Add => {
            let mut joined = String::with_capacity(left.len() + right.len());
            joined.push_str(left);
            joined.push_str(right);
            Object::Str(Rc::new(joined))
        }
        BinaryOp::Equal => Object::Boolean(left == right),
        BinaryOp::NotEqual => Object::Boolean(left != right),
        _ => Object::Error(format!("type mismatch: {} {} {}", Type::Str, op, Type::Str)),
    }
}

fn eval_index_expr(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(idx)) => {
            if *idx < 0 || *idx as usize >= elements.len() {
                Object::Null
            } else {
                elements[*idx as usize].clone()
            }
        }
        (Object::Hash(pairs), _) => match index.hash_key() {
            Some(key) => pairs
                .get(&key)
                .map(|(_, value)| value.clone())
                .unwrap_or(Object::Null),
            None => Object::Error(format!("unusable as hash key: {}", index.kind())),
        },
        _ => Object::Error(format!("index operator not supported: {}", left.kind())),
    }
}

// Pairs evaluate in source order, key before value. A later duplicate key
// overwrites the earlier entry
fn eval_hash_literal(pairs: &[(Expr, Expr)], env: &Rc<Environment>) -> Object {
    let mut map = HashMap::with_capacity(pairs.len());
    for (key_expr, value_expr) in pairs {
        let key = eval_expr(key_expr, env);
        if key.is_error() {
            return key;
        }
        let hash_key = match key.hash_key() {
            Some(hash_key) => hash_key,
            None => return Object::Error(format!("unusable as hash key: {}", key.kind())),
        };
        let value = eval_expr(value_expr, env);
        if value.is_error() {
            return value;
        }
        map.insert(hash_key, (key, value));
    }
    Object::Hash(Rc::new(map))
}

// String literals reach the evaluator with their escapes raw; expand them
// here so that a malformed escape is an ordinary Error value
fn expand_escapes(raw: &str) -> Result<String, Object> {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            text.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some('r') => text.push('\r'),
            Some('\\') => text.push('\\'),
            Some('"') => text.push('"'),
            Some(other) => {
                return Err(Object::Error(format!(
                    "invalid escape sequence: \\{}",
                    other
                )))
            }
            None => return Err(Object::Error("invalid escape sequence: \\".to_string())),
        }
    }
    Ok(text)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::interpreter::new_environment;
    use crate::parser::parse;

    fn run(code: &str) -> Object {
        let program = match parse(code) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected parse errors for {:?}: {:?}", code, errors),
        };
        let env = new_environment();
        eval(&program, &env)
    }

    fn assert_integer(expected: i64, code: &str) {
        match run(code) {
            Object::Integer(value) => assert_eq!(expected, value, "for source {:?}", code),
            other => panic!("expected an integer for {:?}, got {:?}", code, other),
        }
    }

    fn assert_boolean(expected: bool, code: &str) {
        match run(code) {
            Object::Boolean(value) => assert_eq!(expected, value, "for source {:?}", code),
            other => panic!("expected a boolean for {:?}, got {:?}", code, other),
        }
    }

    fn assert_null(code: &str) {
        match run(code) {
            Object::Null => {}
            other => panic!("expected null for {:?}, got {:?}", code, other),
        }
    }

    fn assert_error(expected: &str, code: &str) {
        match run(code) {
            Object::Error(message) => assert_eq!(expected, message, "for source {:?}", code),
            other => panic!("expected an error for {:?}, got {:?}", code, other),
        }
    }

    #[test]
    fn test_integer_expressions() {
        let tests = [
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("10 + 10 + (20 * 5 + (10 - 2))", 128),
        ];
        for (code, expected) in tests {
            assert_integer(expected, code);
        }
    }

    #[test]
    fn test_integer_division_truncates_toward_zero() {
        assert_integer(-3, "-7 / 2");
        assert_integer(-3, "7 / -2");
        assert_integer(3, "7 / 2");
    }

    #[test]
    fn test_integer_arithmetic_wraps() {
        assert_integer(i64::MIN, "9223372036854775807 + 1");
        assert_integer(i64::MIN, "-9223372036854775807 - 1");
    }

    #[test]
    fn test_boolean_expressions() {
        let tests = [
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 < 1", false),
            ("1 > 1", false),
            ("1 <= 1", true),
            ("1 >= 1", true),
            ("2 <= 1", false),
            ("1 >= 2", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 2", false),
            ("1 != 2", true),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("true != false", true),
            ("(1 < 2) == true", true),
            ("(1 < 2) == false", false),
            ("(1 > 2) == true", false),
            ("\"a\" == \"a\"", true),
            ("\"a\" == \"b\"", false),
            ("\"a\" != \"b\"", true),
            // Mixed types never error under ==, they are just not equal
            ("1 == true", false),
            ("\"1\" == 1", false),
        ];
        for (code, expected) in tests {
            assert_boolean(expected, code);
        }
    }

    #[test]
    fn test_bang_operator() {
        let tests = [
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!!true", true),
            ("!!false", false),
            ("!!5", true),
            ("!(if (false) { 5; })", true),
        ];
        for (code, expected) in tests {
            assert_boolean(expected, code);
        }
    }

    #[test]
    fn test_if_else_expressions() {
        assert_integer(10, "if (true) { 10 }");
        assert_null("if (false) { 10 }");
        assert_integer(10, "if (1) { 10 }");
        assert_integer(10, "if (1 < 2) { 10 }");
        assert_null("if (1 > 2) { 10 }");
        assert_integer(20, "if (1 > 2) { 10 } else { 20 }");
        assert_integer(10, "if (1 < 2) { 10 } else { 20 }");
    }

    #[test]
    fn test_return_statements() {
        let tests = [
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            ("if (10 > 1) { if (10 > 1) { return 10; } return 1; }", 10),
        ];
        for (code, expected) in tests {
            assert_integer(expected, code);
        }
    }

    #[test]
    fn test_error_handling() {
        let tests = [
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            ("\"Hello\" - \"World\"", "type mismatch: STRING - STRING"),
            ("\"Hello\" < \"World\"", "type mismatch: STRING < STRING"),
            (
                "{\"name\": \"simian\"}[fn(x) { x }];",
                "unusable as hash key: FUNCTION",
            ),
            ("{fn(x) { x }: 1};", "unusable as hash key: FUNCTION"),
            ("[1, 2, 3][\"one\"]", "index operator not supported: ARRAY"),
            ("5[0]", "index operator not supported: INTEGER"),
            ("5(1)", "not a function: INTEGER"),
            ("true()", "not a function: BOOLEAN"),
            ("1 / 0", "division by zero"),
        ];
        for (code, expected) in tests {
            assert_error(expected, code);
        }
    }

    // Any node that reads an Error sub-value yields that same error
    #[test]
    fn test_error_contagion() {
        let tests = [
            "let x = 1 / 0; x",
            "-(1 / 0)",
            "(1 / 0) + 2",
            "2 + (1 / 0)",
            "if (1 / 0) { 1 }",
            "[1, 1 / 0, 3]",
            "{1 / 0: 1}",
            "{1: 1 / 0}",
            "[1, 2][1 / 0]",
            "(1 / 0)(1)",
            "len(1 / 0)",
            "return 1 / 0;",
        ];
        for code in tests {
            assert_error("division by zero", code);
        }
    }

    #[test]
    fn test_let_statements() {
        let tests = [
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; let c = a + b + 5; c", 15),
        ];
        for (code, expected) in tests {
            assert_integer(expected, code);
        }
    }

    #[test]
    fn test_function_object() {
        match run("fn(x) { x + 2; };") {
            Object::Function(function) => {
                assert_eq!(vec!["x".to_string()], function.parameters);
                assert_eq!("{ (x + 2); }", function.body.to_string());
            }
            other => panic!("expected a function, got {:?}", other),
        }
        assert_eq!("fn(x) { (x + 2); }", run("fn(x) { x + 2; };").to_string());
    }

    #[test]
    fn test_function_application() {
        let tests = [
            ("let identity = fn(x) { x; }; identity(5);", 5),
            ("let identity = fn(x) { return x; }; identity(5);", 5),
            ("let double = fn(x) { x * 2; }; double(5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
            ("fn(x) { x; }(5)", 5),
        ];
        for (code, expected) in tests {
            assert_integer(expected, code);
        }
    }

    #[test]
    fn test_function_arity_is_strict() {
        assert_error(
            "wrong number of arguments: want=2, got=1",
            "let add = fn(x, y) { x + y; }; add(1);",
        );
        assert_error(
            "wrong number of arguments: want=2, got=3",
            "let add = fn(x, y) { x + y; }; add(1, 2, 3);",
        );
    }

    #[test]
    fn test_closures() {
        assert_integer(
            5,
            "let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3)",
        );
        // Free variables resolve against the defining environment, not the
        // caller's
        assert_integer(
            5,
            "let x = 5; let getx = fn() { x }; let wrapper = fn(x) { getx() }; wrapper(99)",
        );
    }

    #[test]
    fn test_recursive_functions() {
        assert_integer(
            120,
            "let fact = fn(n) { if (n == 0) { 1 } else { n * fact(n - 1) } }; fact(5);",
        );
    }

    #[test]
    fn test_string_literals_and_concat() {
        assert_eq!("Hello World!", run("\"Hello World!\"").to_string());
        assert_eq!(
            "Hello World!",
            run("\"Hello\" + \" \" + \"World!\"").to_string()
        );
    }

    #[test]
    fn test_string_escapes() {
        let tests = [
            ("\"tab\\there\"", "tab\there"),
            ("\"line\\nbreak\"", "line\nbreak"),
            ("\"carriage\\rreturn\"", "carriage\rreturn"),
            ("\"back\\\\slash\"", "back\\slash"),
            ("\"say \\\"hi\\\"\"", "say \"hi\""),
        ];
        for (code, expected) in tests {
            assert_eq!(expected, run(code).to_string(), "for source {:?}", code);
        }
        assert_error("invalid escape sequence: \\q", "\"bad\\quote\"");
    }

    #[test]
    fn test_builtin_functions() {
        assert_integer(0, "len(\"\")");
        assert_integer(4, "len(\"four\")");
        assert_integer(11, "len(\"hello world\")");
        assert_integer(3, "len([1, 2, 3])");
        assert_error("argument to 'len' not supported, got INTEGER", "len(1)");
        assert_error(
            "wrong number of arguments. got=2, want=1",
            "len(\"one\", \"two\")",
        );
        assert_integer(1, "first([1, 2, 3])");
        assert_null("first([])");
        assert_integer(3, "last([1, 2, 3])");
        assert_null("last([])");
        assert_null("rest([])");
        assert_eq!("[2, 3]", run("rest([1, 2, 3])").to_string());
        assert_eq!("[1]", run("push([], 1)").to_string());
        assert_null("puts(\"coverage says hello\")");
    }

    #[test]
    fn test_let_binding_shadows_builtin() {
        assert_integer(5, "let len = 5; len");
        assert_integer(99, "let len = fn(x) { 99 }; len([1, 2, 3])");
        // Unshadowed, the table is the fallback
        assert_eq!("builtin function", run("len").to_string());
    }

    #[test]
    fn test_array_literals_and_indexing() {
        assert_eq!("[1, 4, 6]", run("[1, 2 * 2, 3 + 3]").to_string());
        let tests = [
            ("[1, 2, 3][0]", 1),
            ("[1, 2, 3][1]", 2),
            ("[1, 2, 3][2]", 3),
            ("let i = 0; [1][i];", 1),
            ("[1, 2, 3][1 + 1];", 3),
            ("let myArray = [1, 2, 3]; myArray[2];", 3),
            (
                "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
                6,
            ),
            ("let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]", 2),
        ];
        for (code, expected) in tests {
            assert_integer(expected, code);
        }
        assert_null("[1, 2, 3][3]");
        assert_null("[1, 2, 3][-1]");
    }

    #[test]
    fn test_hash_literals() {
        let code = r#"let two = "two";
{"one": 10 - 9, two: 1 + 1, "thr" + "ee": 6 / 2, 4: 4, true: 5, false: 6}"#;
        let pairs = match run(code) {
            Object::Hash(pairs) => pairs,
            other => panic!("expected a hash, got {:?}", other),
        };
        let expected = [
            (Object::Str(Rc::new("one".to_string())), 1),
            (Object::Str(Rc::new("two".to_string())), 2),
            (Object::Str(Rc::new("three".to_string())), 3),
            (Object::Integer(4), 4),
            (Object::Boolean(true), 5),
            (Object::Boolean(false), 6),
        ];
        assert_eq!(expected.len(), pairs.len());
        for (key, expected_value) in expected {
            let hash_key = key.hash_key().expect("hashable key");
            let (_, value) = pairs.get(&hash_key).expect("entry present");
            assert_eq!(&Object::Integer(expected_value), value);
        }
    }

    #[test]
    fn test_hash_indexing() {
        let tests = [
            ("{\"foo\": 5}[\"foo\"]", Some(5)),
            ("{\"foo\": 5}[\"bar\"]", None),
            ("let key = \"foo\"; {\"foo\": 5}[key]", Some(5)),
            ("{}[\"foo\"]", None),
            ("{5: 5}[5]", Some(5)),
            ("{true: 5}[true]", Some(5)),
            ("{false: 5}[false]", Some(5)),
        ];
        for (code, expected) in tests {
            match expected {
                Some(value) => assert_integer(value, code),
                None => assert_null(code),
            }
        }
    }

    #[test]
    fn test_duplicate_hash_keys_last_wins() {
        assert_integer(2, "{\"a\": 1, \"a\": 2}[\"a\"]");
    }

    // The end-to-end table: full programs against their printed form
    #[test]
    fn test_end_to_end_scenarios() {
        let tests = [
            ("10 + 10 + (20 * 5 + (10 - 2))", "128"),
            ("let a = 5; let b = a; let c = a + b + 5; c", "15"),
            (
                "let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3)",
                "5",
            ),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "ERROR: unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "let two = \"two\"; {\"one\": 10-9, two: 1+1, \"thr\"+\"ee\": 6/2, 4: 4, true: 5, false: 6}[\"thr\"+\"ee\"]",
                "3",
            ),
            (
                "let map = fn(arr, f) { let iter = fn(a, acc) { if (len(a) == 0) { acc } else { iter(rest(a), push(acc, f(first(a)))) } }; iter(arr, []) }; map([1,2,3,4], fn(x){ x*2 })",
                "[2, 4, 6, 8]",
            ),
        ];
        for (code, expected) in tests {
            assert_eq!(expected, run(code).to_string(), "for source {:?}", code);
        }
    }

    // Same AST, equal environments, equal results
    #[test]
    fn test_evaluation_is_deterministic() {
        let code = "let f = fn(x) { x * 3 }; [f(1), f(2), {\"k\": f(3)}[\"k\"]]";
        let program = parse(code).expect("parses");
        let first = eval(&program, &new_environment());
        let second = eval(&program, &new_environment());
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_repl_style_persistent_environment() {
        let env = new_environment();
        let first = parse("let counter = fn(x) { fn() { x + 1 } };").expect("parses");
        eval(&first, &env);
        let second = parse("let c = counter(41); c()").expect("parses");
        match eval(&second, &env) {
            Object::Integer(value) => assert_eq!(42, value),
            other => panic!("expected an integer, got {:?}", other),
        }
    }
}
