//! End-to-end scenario tests (spec §8.4), built by hand since parsing source
//! text is out of scope for this crate — every program here is assembled
//! directly out of AST constructors, the same boundary the evaluator itself
//! draws.
use fig_eval::ast::{
    Access, Ast, BinaryOp, BinaryVerb, Block, DefaultParam, Expression, FieldDecl, FunctionBody,
    FunctionCall, FunctionDef, FunctionLiteral, InitArgs, InitExpr, Literal, Param, Position,
    Statement, StructDef, TypeName, VarAssign, VarDef,
};
use fig_eval::value::{AccessModifier, Value};
use fig_eval::{ErrorKind, Evaluator};

fn pos() -> Position {
    Position::new("test", 1, 1)
}

fn int(n: i64) -> Expression {
    Expression::ValueLiteral(Literal::Int(n), pos())
}

fn double(d: f64) -> Expression {
    Expression::ValueLiteral(Literal::Double(d), pos())
}

fn string(s: &str) -> Expression {
    Expression::ValueLiteral(Literal::String(s.to_owned()), pos())
}

fn var(name: &str) -> Expression {
    Expression::VarRef(name.to_owned(), pos())
}

fn binary(verb: BinaryVerb, lhs: Expression, rhs: Expression) -> Expression {
    Expression::Binary(BinaryOp {
        verb,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        position: pos(),
    })
}

fn block(statements: Vec<Statement>) -> Block {
    Block {
        statements,
        position: pos(),
    }
}

/// Scenario 1: a closure captures a live (mutable) variable in an enclosing
/// context, not a snapshot taken at closure-creation time.
#[test]
fn closure_captures_live_variable() {
    // var counter := 0
    let counter_def = Statement::VarDef(VarDef {
        name: "counter".to_owned(),
        type_name: TypeName::Inferred,
        initializer: Some(int(0)),
        is_public: false,
        is_const: false,
        position: pos(),
    });

    // func make_incr() { return fun() -> Int { counter = counter + 1; return counter } }
    let inner_body = block(vec![
        Statement::VarAssign(VarAssign {
            name: "counter".to_owned(),
            value: binary(BinaryVerb::Add, var("counter"), int(1)),
            position: pos(),
        }),
        Statement::Return(Some(var("counter")), pos()),
    ]);
    let closure_literal = Expression::FunctionLiteral(FunctionLiteral {
        params: vec![],
        defaults: vec![],
        variadic: false,
        return_type: TypeName::Int,
        body: FunctionBody::Block(inner_body),
        position: pos(),
    });
    let make_incr = Statement::FunctionDef(FunctionDef {
        name: "make_incr".to_owned(),
        params: vec![],
        defaults: vec![],
        variadic: false,
        return_type: TypeName::Function,
        body: block(vec![Statement::Return(Some(closure_literal), pos())]),
        is_public: false,
        position: pos(),
    });

    // var f := make_incr()
    let f_def = Statement::VarDef(VarDef {
        name: "f".to_owned(),
        type_name: TypeName::Inferred,
        initializer: Some(Expression::FunctionCall(FunctionCall {
            callee: Box::new(var("make_incr")),
            args: vec![],
            position: pos(),
        })),
        is_public: false,
        is_const: false,
        position: pos(),
    });

    let call_f = || {
        Statement::ExpressionStmt(Expression::FunctionCall(FunctionCall {
            callee: Box::new(var("f")),
            args: vec![],
            position: pos(),
        }))
    };

    let ast = Ast::from_nodes(vec![counter_def, make_incr, f_def, call_f(), call_f(), call_f()]);

    let evaluator = Evaluator::new().unwrap();
    let result = evaluator.run(&ast).unwrap();
    assert_eq!(result, Value::Int(3));
}

/// Scenario 2: an unsupplied default parameter is evaluated in the caller's
/// context at the call site, not the closure's defining context.
#[test]
fn default_parameter_evaluates_in_callers_context() {
    // var k := 10
    let k_def = Statement::VarDef(VarDef {
        name: "k".to_owned(),
        type_name: TypeName::Inferred,
        initializer: Some(int(10)),
        is_public: false,
        is_const: false,
        position: pos(),
    });

    // func g(x, y = k + 1) { return x + y }
    let g_def = Statement::FunctionDef(FunctionDef {
        name: "g".to_owned(),
        params: vec![Param {
            name: "x".to_owned(),
            type_name: TypeName::Any,
            position: pos(),
        }],
        defaults: vec![DefaultParam {
            name: "y".to_owned(),
            type_name: TypeName::Any,
            default: binary(BinaryVerb::Add, var("k"), int(1)),
            position: pos(),
        }],
        variadic: false,
        return_type: TypeName::Any,
        body: block(vec![Statement::Return(
            Some(binary(BinaryVerb::Add, var("x"), var("y"))),
            pos(),
        )]),
        is_public: false,
        position: pos(),
    });

    let call = Statement::ExpressionStmt(Expression::FunctionCall(FunctionCall {
        callee: Box::new(var("g")),
        args: vec![int(5)],
        position: pos(),
    }));

    let ast = Ast::from_nodes(vec![k_def, g_def, call]);
    let evaluator = Evaluator::new().unwrap();
    let result = evaluator.run(&ast).unwrap();
    assert_eq!(result, Value::Int(16));
}

/// Scenario 3: Int/Double arithmetic unification collapses to Int whenever
/// the exact result is integer-valued, regardless of which operand carried
/// the Double tag (SPEC_FULL.md §9 Open Question 6).
#[test]
fn numeric_unification() {
    let evaluator = Evaluator::new().unwrap();

    let run_one = |expr: Expression| {
        evaluator
            .run(&Ast::from_nodes(vec![Statement::ExpressionStmt(expr)]))
            .unwrap()
    };

    assert_eq!(run_one(binary(BinaryVerb::Add, int(2), int(2))), Value::Int(4));
    assert_eq!(
        run_one(binary(BinaryVerb::Div, int(2), int(4))),
        Value::Double(0.5)
    );
    assert_eq!(
        run_one(binary(BinaryVerb::Add, double(2.0), int(2))),
        Value::Int(4)
    );
    assert_eq!(
        run_one(binary(
            BinaryVerb::Mul,
            binary(BinaryVerb::Mul, int(3), int(3)),
            int(3)
        )),
        Value::Int(27)
    );
}

/// Scenario 4: a declared return type that the body's actual return value
/// does not satisfy is a hard `ReturnTypeMismatch`, not a silent coercion.
#[test]
fn return_type_enforcement() {
    let bad_def = Statement::FunctionDef(FunctionDef {
        name: "bad".to_owned(),
        params: vec![],
        defaults: vec![],
        variadic: false,
        return_type: TypeName::Int,
        body: block(vec![Statement::Return(Some(string("hi")), pos())]),
        is_public: false,
        position: pos(),
    });
    let call = Statement::ExpressionStmt(Expression::FunctionCall(FunctionCall {
        callee: Box::new(var("bad")),
        args: vec![],
        position: pos(),
    }));

    let ast = Ast::from_nodes(vec![bad_def, call]);
    let evaluator = Evaluator::new().unwrap();
    let err = evaluator.run(&ast).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReturnTypeMismatch);
}

/// Scenario 5: positional and named struct construction both land fields in
/// declaration order / by name, and a later statement can read a public field
/// back off the resulting instance via `Access`.
#[test]
fn struct_construction_positional_vs_named() {
    let point_def = Statement::StructDef(StructDef {
        name: "Point".to_owned(),
        fields: vec![
            FieldDecl {
                access_modifier: AccessModifier::Public,
                name: "x".to_owned(),
                type_name: TypeName::Int,
                default_value: None,
                position: pos(),
            },
            FieldDecl {
                access_modifier: AccessModifier::Public,
                name: "y".to_owned(),
                type_name: TypeName::Int,
                default_value: Some(int(0)),
                position: pos(),
            },
        ],
        is_public: false,
        position: pos(),
    });

    let a_def = Statement::VarDef(VarDef {
        name: "a".to_owned(),
        type_name: TypeName::Inferred,
        initializer: Some(Expression::InitExpr(InitExpr {
            struct_expr: Box::new(var("Point")),
            args: InitArgs::Positional(vec![int(3), int(4)]),
            position: pos(),
        })),
        is_public: false,
        is_const: false,
        position: pos(),
    });

    let b_def = Statement::VarDef(VarDef {
        name: "b".to_owned(),
        type_name: TypeName::Inferred,
        initializer: Some(Expression::InitExpr(InitExpr {
            struct_expr: Box::new(var("Point")),
            args: InitArgs::Named(vec![("y".to_owned(), int(4)), ("x".to_owned(), int(3))]),
            position: pos(),
        })),
        is_public: false,
        is_const: false,
        position: pos(),
    });

    let read_a_x = Statement::ExpressionStmt(Expression::Access(Access {
        target: Box::new(var("a")),
        field: "x".to_owned(),
        position: pos(),
    }));
    let read_b_y = Statement::ExpressionStmt(Expression::Access(Access {
        target: Box::new(var("b")),
        field: "y".to_owned(),
        position: pos(),
    }));

    let evaluator = Evaluator::new().unwrap();

    let ast = Ast::from_nodes(vec![point_def.clone(), a_def.clone(), b_def.clone(), read_a_x]);
    assert_eq!(evaluator.run(&ast).unwrap(), Value::Int(3));

    let ast = Ast::from_nodes(vec![point_def, a_def, b_def, read_b_y]);
    assert_eq!(evaluator.run(&ast).unwrap(), Value::Int(4));
}

/// Scenario 6: `return` used outside any enclosing function is a hard error,
/// not a no-op or an implicit top-level exit.
#[test]
fn return_outside_function_is_an_error() {
    let ast = Ast::from_nodes(vec![Statement::Return(Some(int(1)), pos())]);
    let evaluator = Evaluator::new().unwrap();
    let err = evaluator.run(&ast).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReturnOutsideFunction);
}
