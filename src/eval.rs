// Evaluate ast::Expr/SimpleInstr and friends, interpreting the tree
// directly against a single mutable Environment. Dispatch is a plain
// match over the closed AST enums; every per-operator type check is a
// runtime tag match that fails through the shared `PrimError` sink.

use crate::ast::{self, BinOp, BoolOp, Expr, NumRel, Program, SimpleInstr, StrRel, Value};
use crate::env::Environment;
use crate::error::PrimError;
use crate::io::Io;

/// Signals produced by executing a statement: either "keep going" or
/// "the program is done" (an `exit` statement was reached). Kept distinct
/// from `PrimError` so `exit` terminates cleanly rather than through the
/// fatal-error path.
enum Flow {
    Continue,
    Exit,
}

pub fn run(program: &Program, env: &mut Environment, io: &mut Io) -> Result<(), PrimError> {
    exec_instr(&program.0, env, io)?;
    Ok(())
}

fn exec_instr(instr: &ast::Instr, env: &mut Environment, io: &mut Io) -> Result<Flow, PrimError> {
    for stmt in &instr.0 {
        match exec_stmt(stmt, env, io)? {
            Flow::Continue => {}
            Flow::Exit => return Ok(Flow::Exit),
        }
    }
    Ok(Flow::Continue)
}

fn exec_stmt(stmt: &SimpleInstr, env: &mut Environment, io: &mut Io) -> Result<Flow, PrimError> {
    match stmt {
        SimpleInstr::Exit => Ok(Flow::Exit),
        SimpleInstr::Assign(name, expr, _lineno) => {
            let value = eval(expr, env, io)?;
            env.assign(name, value)?;
            Ok(Flow::Continue)
        }
        SimpleInstr::Print(expr, _lineno) => {
            let value = eval(expr, env, io)?;
            let rendered = match value {
                Value::Num(n) => n.to_string(),
                Value::Str(s) => s,
                Value::Bool(_) => {
                    unreachable!("the grammar never allows print(bool_expr)")
                }
            };
            io.print_line(&rendered)
                .map_err(|e| PrimError::no_line(format!("I/O error: {e}")))?;
            Ok(Flow::Continue)
        }
        SimpleInstr::If(cond, then_branch, else_branch, _lineno) => {
            let c = eval(cond, env, io)?;
            let b = expect_bool(c, "If clause condition must be a boolean expression.")?;
            if b {
                exec_stmt(then_branch, env, io)
            } else if let Some(eb) = else_branch {
                exec_stmt(eb, env, io)
            } else {
                Ok(Flow::Continue)
            }
        }
        SimpleInstr::While(cond, body, do_while, _lineno) => {
            // Probe the condition's type up front, even for do-while,
            // before the first iteration runs. A condition with side
            // effects is therefore evaluated one extra time in the
            // do-while form; this is intentional, not a bug.
            let probe = eval(cond, env, io)?;
            expect_bool(probe, "While loop condition must be a boolean expression.")?;

            if *do_while {
                loop {
                    match exec_stmt(body, env, io)? {
                        Flow::Continue => {}
                        Flow::Exit => return Ok(Flow::Exit),
                    }
                    let c = eval(cond, env, io)?;
                    if !expect_bool(c, "While loop condition must be a boolean expression.")? {
                        break;
                    }
                }
            } else {
                loop {
                    let c = eval(cond, env, io)?;
                    if !expect_bool(c, "While loop condition must be a boolean expression.")? {
                        break;
                    }
                    match exec_stmt(body, env, io)? {
                        Flow::Continue => {}
                        Flow::Exit => return Ok(Flow::Exit),
                    }
                }
            }
            Ok(Flow::Continue)
        }
        SimpleInstr::Block(instr) => exec_instr(instr, env, io),
    }
}

fn expect_bool(v: Value, msg: &str) -> Result<bool, PrimError> {
    match v {
        Value::Bool(b) => Ok(b),
        _ => Err(PrimError::no_line(msg.to_string())),
    }
}

fn eval(expr: &Expr, env: &mut Environment, io: &mut Io) -> Result<Value, PrimError> {
    match expr {
        Expr::Ident(name) => env.get(name),
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Grouping(e) => eval(e, env, io),
        Expr::Readint => {
            let line = io
                .read_line()
                .map_err(|e| PrimError::no_line(format!("I/O error: {e}")))?
                .ok_or_else(|| PrimError::no_line("Unexpected end of input on readint."))?;
            line.trim()
                .parse::<i64>()
                .map(Value::Num)
                .map_err(|_| PrimError::no_line("Input to readint must be of type NUM."))
        }
        Expr::Readstr => {
            let line = io
                .read_line()
                .map_err(|e| PrimError::no_line(format!("I/O error: {e}")))?
                .ok_or_else(|| PrimError::no_line("Unexpected end of input on readstr."))?;
            Ok(Value::Str(line))
        }
        Expr::Unary(e, _lineno) => {
            let v = eval(e, env, io)?;
            match v {
                Value::Num(n) => Ok(Value::Num(-n)),
                other => Err(PrimError::no_line(format!(
                    "Unary minus can only be applied to arguments of type NUM, got {}.",
                    other.type_name()
                ))),
            }
        }
        Expr::Binop(l, op, r, _lineno) => {
            let lv = eval(l, env, io)?;
            let rv = eval(r, env, io)?;
            eval_binop(*op, lv, rv)
        }
        Expr::Len(e, _lineno) => match eval(e, env, io)? {
            Value::Str(s) => Ok(Value::Num(s.chars().count() as i64)),
            other => Err(type_error("length()", &[other])),
        },
        Expr::Pos(a, b, _lineno) => {
            let av = eval(a, env, io)?;
            let bv = eval(b, env, io)?;
            match (av, bv) {
                (Value::Str(a), Value::Str(b)) => {
                    let pos = find_char_index(&a, &b).unwrap_or(0);
                    Ok(Value::Num(pos as i64))
                }
                (a, b) => Err(type_error("position()", &[a, b])),
            }
        }
        Expr::Concat(a, b, _lineno) => {
            let av = eval(a, env, io)?;
            let bv = eval(b, env, io)?;
            match (av, bv) {
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (a, b) => Err(type_error("concatenate()", &[a, b])),
            }
        }
        Expr::Substr(s, start, end, _lineno) => {
            let sv = eval(s, env, io)?;
            let startv = eval(start, env, io)?;
            let endv = eval(end, env, io)?;
            match (sv, startv, endv) {
                (Value::Str(s), Value::Num(start), Value::Num(end)) => {
                    Ok(Value::Str(substring(&s, start, end)))
                }
                (s, start, end) => Err(type_error("substring()", &[s, start, end])),
            }
        }
        Expr::Not(e, _lineno) => {
            let v = eval(e, env, io)?;
            match v {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(PrimError::no_line(format!(
                    "'not' keyword can only be used with a boolean expression, got {}.",
                    other.type_name()
                ))),
            }
        }
        Expr::Boolop(a, op, b, _lineno) => {
            // Both operands are evaluated eagerly; short-circuiting is
            // not part of the contract.
            let av = eval(a, env, io)?;
            let bv = eval(b, env, io)?;
            match (av, bv) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
                    BoolOp::And => a && b,
                    BoolOp::Or => a || b,
                })),
                (a, b) => Err(type_error("boolean operator", &[a, b])),
            }
        }
        Expr::NumRelop(a, rel, b, _lineno) => {
            let av = eval(a, env, io)?;
            let bv = eval(b, env, io)?;
            match (av, bv) {
                (Value::Num(a), Value::Num(b)) => Ok(Value::Bool(match rel {
                    NumRel::Eq => a == b,
                    NumRel::Lt => a < b,
                    NumRel::Le => a <= b,
                    NumRel::Gt => a > b,
                    NumRel::Ge => a >= b,
                    NumRel::Ne => a != b,
                })),
                (a, b) => Err(type_error("relational operator", &[a, b])),
            }
        }
        Expr::StrRelop(a, rel, b, _lineno) => {
            let av = eval(a, env, io)?;
            let bv = eval(b, env, io)?;
            match (av, bv) {
                (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(match rel {
                    StrRel::Eq => a == b,
                    StrRel::Ne => a != b,
                })),
                (a, b) => Err(type_error("relational operator", &[a, b])),
            }
        }
    }
}

fn type_error(what: &str, vals: &[Value]) -> PrimError {
    let types: Vec<&str> = vals.iter().map(|v| v.type_name()).collect();
    PrimError::no_line(format!(
        "Arguments passed to {what} have unexpected type(s): {}.",
        types.join(", ")
    ))
}

fn eval_binop(op: BinOp, lv: Value, rv: Value) -> Result<Value, PrimError> {
    let (a, b) = match (lv, rv) {
        (Value::Num(a), Value::Num(b)) => (a, b),
        (_, _) => {
            let sym = match op {
                BinOp::Plus => "+",
                BinOp::Minus => "-",
                BinOp::Times => "*",
                BinOp::Divide => "/",
                BinOp::Mod => "%",
            };
            return Err(PrimError::no_line(format!(
                "Binary operator {sym} can only be applied to arguments of type NUM."
            )));
        }
    };
    match op {
        BinOp::Plus => Ok(Value::Num(a + b)),
        BinOp::Minus => Ok(Value::Num(a - b)),
        BinOp::Times => Ok(Value::Num(a * b)),
        // True division would produce a value with no valid tag, since
        // there is no rational/float variant. Restricted to truncating
        // integer division to keep the single-value-tag invariant
        // intact; see DESIGN.md.
        BinOp::Divide => {
            if b == 0 {
                Err(PrimError::no_line("Division by zero.".to_string()))
            } else {
                Ok(Value::Num(a / b))
            }
        }
        BinOp::Mod => {
            if b == 0 {
                Err(PrimError::no_line("Division by zero.".to_string()))
            } else {
                Ok(Value::Num(a % b))
            }
        }
    }
}

/// 0-based index of the first occurrence of `needle` in `haystack`,
/// counted in characters (not bytes), or `None` if absent.
fn find_char_index(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let hay: Vec<char> = haystack.chars().collect();
    let ndl: Vec<char> = needle.chars().collect();
    if ndl.len() > hay.len() {
        return None;
    }
    for i in 0..=(hay.len() - ndl.len()) {
        if hay[i..i + ndl.len()] == ndl[..] {
            return Some(i);
        }
    }
    None
}

/// `substring(s, start, end)`: 1-based `start` through `end` inclusive of
/// `start` and exclusive of `end + 1`, i.e. `[start-1, end)` 0-based,
/// clamped to the string's bounds. Negative/degenerate bounds yield "".
fn substring(s: &str, start: i64, end: i64) -> String {
    if start < 1 || end < 0 {
        return String::new();
    }
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let from = (start - 1).clamp(0, len) as usize;
    let to = end.clamp(0, len) as usize;
    if from >= to {
        return String::new();
    }
    chars[from..to].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::io::test_support::SharedBuf;
    use crate::io::Io;
    use crate::parser::parse_program;
    use std::io::{BufRead, Cursor};

    fn run_with_stdin(src: &str, stdin: &str) -> (Result<(), PrimError>, String) {
        let program = parse_program(src).unwrap();
        let mut env = Environment::new();
        let out = SharedBuf::new();
        let stdin_reader: Box<dyn BufRead> = Box::new(Cursor::new(stdin.as_bytes().to_vec()));
        let mut io = Io::new(stdin_reader, Box::new(out.clone()));
        let result = run(&program, &mut env, &mut io);
        (result, out.contents())
    }

    fn run_ok(src: &str) -> String {
        let (result, out) = run_with_stdin(src, "");
        result.unwrap();
        out
    }

    #[test]
    fn hello_world() {
        assert_eq!(run_ok(r#"print("hello")"#), "hello\n");
    }

    #[test]
    fn right_assoc_minus_arithmetic() {
        assert_eq!(run_ok("print(10 - 3 - 2)"), "9\n");
    }

    #[test]
    fn while_countdown() {
        let src = "i := 3; while i > 0 do begin print(i); i := i - 1 end";
        assert_eq!(run_ok(src), "3\n2\n1\n");
    }

    #[test]
    fn do_while_runs_body_at_least_once() {
        let src = "i := 0; do i := i + 1 while i < 0; print(i)";
        assert_eq!(run_ok(src), "1\n");
    }

    #[test]
    fn type_pinning_rejects_reassignment_with_different_tag() {
        let (result, _) = run_with_stdin(r#"x := 1; x := "a""#, "");
        let err = result.unwrap_err();
        assert!(err.message.contains("Variable type does not match."));
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() {
        let src = "if true then if false then print(1) else print(2)";
        assert_eq!(run_ok(src), "2\n");
    }

    #[test]
    fn substring_bounds() {
        assert_eq!(run_ok(r#"print(substring("abcdef", 2, 4))"#), "bcd\n");
        assert_eq!(run_ok(r#"print(substring("abc", 10, 20))"#), "\n");
    }

    #[test]
    fn position_sentinel_ambiguity() {
        assert_eq!(run_ok(r#"print(position("hello", "ll"))"#), "2\n");
        assert_eq!(run_ok(r#"print(position("hello", "z"))"#), "0\n");
        // found-at-head is indistinguishable from not-found, by design:
        assert_eq!(run_ok(r#"print(position("hello", "h"))"#), "0\n");
    }

    #[test]
    fn readint_parse_failure_is_an_error() {
        let (result, _) = run_with_stdin("x := readint", "abc\n");
        assert!(result.is_err());
    }

    #[test]
    fn readint_reads_signed_decimal() {
        let src = "x := readint; print(x)";
        assert_eq!(run_with_stdin(src, "-7\n").1, "-7\n");
    }

    #[test]
    fn exit_terminates_without_error() {
        let src = "print(1); exit; print(2)";
        assert_eq!(run_ok(src), "1\n");
    }

    #[test]
    fn concat_then_length_matches_sum_of_lengths() {
        let src = r#"print(length(concatenate("foo", "barbaz")))"#;
        assert_eq!(run_ok(src), "9\n");
    }

    #[test]
    fn substring_of_full_range_is_identity() {
        let src = r#"print(substring("hello", 1, length("hello")))"#;
        assert_eq!(run_ok(src), "hello\n");
    }

    #[test]
    fn boolop_has_no_short_circuit_surface_via_if() {
        // Both operands of `and` are mandatory to evaluate; exercised
        // indirectly since bools aren't printable in Prim.
        assert_eq!(run_ok("if 1 < 2 and 3 < 4 then print(1)"), "1\n");
        assert_eq!(run_ok("if 1 < 2 and 4 < 3 then print(1) else print(2)"), "2\n");
    }

    #[test]
    fn if_condition_must_be_boolean() {
        let (result, _) = run_with_stdin("if 1 then print(1)", "");
        assert!(result.is_err());
    }

    #[test]
    fn unary_minus_requires_num() {
        let (result, _) = run_with_stdin(r#"print(-"a")"#, "");
        assert!(result.is_err());
    }

    #[test]
    fn division_is_integer_and_truncates() {
        assert_eq!(run_ok("print(7 / 2)"), "3\n");
        assert_eq!(run_ok("print(-7 / 2)"), "-3\n");
    }

    #[test]
    fn division_by_zero_errors() {
        let (result, _) = run_with_stdin("print(1 / 0)", "");
        assert!(result.is_err());
    }

    #[test]
    fn not_equal_is_negation_of_equal() {
        assert_eq!(run_ok("if 1 <> 2 then print(1)"), "1\n");
        assert_eq!(run_ok("if 1 <> 1 then print(1) else print(2)"), "2\n");
    }
}
