//! Integration tests for end-to-end semantic analysis.
//!
//! These tests build untyped programs with the AST builders, run them through
//! the type checker and inspect the typed tree, the exported symbols or the
//! first error reported.

use frontend::{
    ast::{
        ast::{Expr, Stmt},
        expressions::{BinaryOperator, PrefixOperator},
        statements::{
            AssignmentOperator, AssignmentPath, CondBlock, ElseStmt, ExpressionStmt, FnDeclStmt,
            ImportStmt, ReAssignmentStmt, ReturnStmt, VarDeclStmt, WhileStmt,
        },
        types::DataType,
    },
    config::{LoopCondition, TypeCheckerOptions},
    errors::errors::Error,
    type_checker::{
        importer::ModuleRegistry,
        type_checker::{type_check, type_check_with_importer, TypeCheckOutput},
        typed_ast::{untype, Type, TypedStmt},
    },
    Span,
};

fn check(ast: Vec<Stmt>) -> Result<TypeCheckOutput, Error> {
    type_check(ast, TypeCheckerOptions::default())
}

fn error_name(ast: Vec<Stmt>) -> &'static str {
    match check(ast) {
        Ok(output) => panic!("expected an error, got {:?}", output.typed_ast),
        Err(error) => error.get_error_name(),
    }
}

fn var_type(output: &TypeCheckOutput, identifier: &str) -> Type {
    output
        .typed_ast
        .iter()
        .find_map(|stmt| match stmt {
            TypedStmt::VarDecl(decl) if decl.identifier == identifier => {
                Some(decl.var_type.clone())
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no declaration of `{}`", identifier))
}

fn fn_return_type(output: &TypeCheckOutput, identifier: &str) -> Type {
    output
        .typed_ast
        .iter()
        .find_map(|stmt| match stmt {
            TypedStmt::FnDecl(decl) if decl.identifier == identifier => {
                Some(decl.return_type.clone())
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no function `{}`", identifier))
}

fn call(name: &str, arguments: Vec<Expr>) -> Expr {
    Expr::call(Expr::symbol(name), arguments)
}

fn ret(value: Expr) -> Stmt {
    ReturnStmt::new(Some(value)).into()
}

fn function(name: &str, body: Vec<Stmt>) -> Stmt {
    FnDeclStmt::new(name, vec![], body).into()
}

fn true_literal() -> Expr {
    Expr::boolean(true)
}

#[test]
fn test_literal_declarations() {
    let output = check(vec![
        VarDeclStmt::constant("n", Expr::number(1.0)).into(),
        VarDeclStmt::constant("s", Expr::string("hello")).into(),
        VarDeclStmt::variable("b", Expr::boolean(false)).into(),
        VarDeclStmt::constant(
            "p",
            Expr::object(vec![("x", Expr::number(1.0)), ("y", Expr::number(2.0))]),
        )
        .into(),
    ])
    .expect("valid program");

    assert_eq!(var_type(&output, "n"), Type::Number);
    assert_eq!(var_type(&output, "s"), Type::String { length: 5 });
    assert_eq!(var_type(&output, "b"), Type::Boolean);
    assert_eq!(
        var_type(&output, "p"),
        Type::Object {
            fields: vec![("x".to_string(), Type::Number), ("y".to_string(), Type::Number)]
        }
    );
}

#[test]
fn test_array_element_types() {
    let output = check(vec![VarDeclStmt::constant(
        "xs",
        Expr::array(vec![Expr::number(1.0), Expr::number(2.0)]),
    )
    .into()])
    .expect("homogeneous array");
    assert_eq!(
        var_type(&output, "xs"),
        Type::Array {
            base: Box::new(Type::Number),
            length: 2
        }
    );

    assert_eq!(
        error_name(vec![VarDeclStmt::constant(
            "xs",
            Expr::array(vec![Expr::number(1.0), Expr::boolean(true)]),
        )
        .into()]),
        "HeterogeneousArray"
    );
}

#[test]
fn test_explicit_type_annotation() {
    let output = check(vec![VarDeclStmt::constant("n", Expr::number(1.0))
        .with_type(DataType::Number)
        .into()])
    .expect("matching annotation");
    assert_eq!(var_type(&output, "n"), Type::Number);

    assert_eq!(
        error_name(vec![VarDeclStmt::constant("n", Expr::number(1.0))
            .with_type(DataType::Boolean)
            .into()]),
        "TypeMismatch"
    );
}

#[test]
fn test_duplicate_declaration() {
    assert_eq!(
        error_name(vec![
            VarDeclStmt::constant("a", Expr::number(1.0)).into(),
            VarDeclStmt::variable("a", Expr::number(2.0)).into(),
        ]),
        "DuplicateSymbol"
    );
}

#[test]
fn test_function_forward_reference() {
    let output = check(vec![
        VarDeclStmt::constant("a", call("b", vec![])).into(),
        function("b", vec![ret(Expr::number(1.0))]),
    ])
    .expect("functions are hoisted");

    assert_eq!(var_type(&output, "a"), Type::Number);
    assert_eq!(fn_return_type(&output, "b"), Type::Number);
}

#[test]
fn test_variable_forward_reference() {
    assert_eq!(
        error_name(vec![
            VarDeclStmt::constant("a", Expr::symbol("b")).into(),
            VarDeclStmt::constant("b", Expr::number(1.0)).into(),
        ]),
        "InvalidForwardReference"
    );
}

#[test]
fn test_forward_reference_from_function_body() {
    assert_eq!(
        error_name(vec![
            function("f", vec![ret(Expr::symbol("later"))]),
            VarDeclStmt::constant("later", Expr::number(1.0)).into(),
        ]),
        "InvalidForwardReference"
    );
}

#[test]
fn test_pending_chain_resolves() {
    let output = check(vec![
        VarDeclStmt::constant("a", call("b", vec![])).into(),
        VarDeclStmt::constant("c", Expr::array(vec![Expr::symbol("a")])).into(),
        function("b", vec![ret(Expr::string("ok"))]),
    ])
    .expect("chain resolves once b is declared");

    assert_eq!(var_type(&output, "a"), Type::String { length: 2 });
    assert_eq!(
        var_type(&output, "c"),
        Type::Array {
            base: Box::new(Type::String { length: 2 }),
            length: 1
        }
    );
}

#[test]
fn test_long_pending_chain() {
    let length = 5000;
    let mut ast: Vec<Stmt> = vec![VarDeclStmt::constant("a0", call("f", vec![])).into()];
    for i in 1..length {
        let previous = Expr::symbol(&format!("a{}", i - 1));
        ast.push(VarDeclStmt::constant(&format!("a{}", i), previous).into());
    }
    ast.push(function("f", vec![ret(Expr::number(1.0))]));

    let output = check(ast).expect("every link settles once f is declared");

    assert_eq!(var_type(&output, "a0"), Type::Number);
    assert_eq!(var_type(&output, &format!("a{}", length - 1)), Type::Number);
}

#[test]
fn test_return_type_through_forward_call() {
    let output = check(vec![
        function("f", vec![ret(call("g", vec![]))]),
        function("g", vec![ret(Expr::number(1.0))]),
        VarDeclStmt::constant("x", call("f", vec![])).into(),
    ])
    .expect("return type settles");

    assert_eq!(fn_return_type(&output, "f"), Type::Number);
    assert_eq!(var_type(&output, "x"), Type::Number);
}

#[test]
fn test_mutual_recursion() {
    let n_is_zero = || Expr::binary(Expr::symbol("n"), BinaryOperator::StrictEquality, Expr::number(0.0));
    let n_minus_one = || Expr::binary(Expr::symbol("n"), BinaryOperator::Minus, Expr::number(1.0));

    let output = check(vec![
        FnDeclStmt::new(
            "isEven",
            vec![("n", DataType::Number)],
            vec![
                Stmt::If(CondBlock::new(n_is_zero(), vec![ret(Expr::boolean(true))])),
                ret(call("isOdd", vec![n_minus_one()])),
            ],
        )
        .into(),
        FnDeclStmt::new(
            "isOdd",
            vec![("n", DataType::Number)],
            vec![
                Stmt::If(CondBlock::new(n_is_zero(), vec![ret(Expr::boolean(false))])),
                ret(call("isEven", vec![n_minus_one()])),
            ],
        )
        .into(),
    ])
    .expect("mutually recursive functions");

    assert_eq!(fn_return_type(&output, "isEven"), Type::Boolean);
    assert_eq!(fn_return_type(&output, "isOdd"), Type::Boolean);
}

#[test]
fn test_recursion_without_base_type() {
    let ast = || {
        vec![
            function("f", vec![ret(call("g", vec![]))]),
            function("g", vec![ret(call("f", vec![]))]),
        ]
    };

    assert_eq!(error_name(ast()), "UnresolvedReference");

    let error = type_check(
        ast(),
        TypeCheckerOptions::default().with_report_unresolved_references(false),
    )
    .err()
    .expect("types never settle");
    assert_eq!(error.get_error_name(), "UnresolvedType");
}

#[test]
fn test_unresolved_reference() {
    assert_eq!(
        error_name(vec![VarDeclStmt::constant("a", Expr::symbol("missing")).into()]),
        "UnresolvedReference"
    );
    assert_eq!(
        error_name(vec![VarDeclStmt::constant("a", Expr::symbol("a")).into()]),
        "UnresolvedReference"
    );
}

#[test]
fn test_reassignment() {
    let output = check(vec![
        VarDeclStmt::variable("a", Expr::number(1.0)).into(),
        ReAssignmentStmt::new(
            AssignmentPath::symbol("a"),
            AssignmentOperator::PlusAssign,
            Expr::number(2.0),
        )
        .into(),
    ])
    .expect("mutable number");
    assert_eq!(output.typed_ast.len(), 2);

    assert_eq!(
        error_name(vec![
            VarDeclStmt::constant("a", Expr::number(1.0)).into(),
            ReAssignmentStmt::new(
                AssignmentPath::symbol("a"),
                AssignmentOperator::Assign,
                Expr::number(2.0),
            )
            .into(),
        ]),
        "ReassignToConst"
    );

    assert_eq!(
        error_name(vec![
            VarDeclStmt::variable("a", Expr::number(1.0)).into(),
            ReAssignmentStmt::new(
                AssignmentPath::symbol("a"),
                AssignmentOperator::Assign,
                Expr::boolean(true),
            )
            .into(),
        ]),
        "TypeMismatch"
    );

    assert_eq!(
        error_name(vec![ReAssignmentStmt::new(
            AssignmentPath::symbol("nowhere"),
            AssignmentOperator::Assign,
            Expr::number(1.0),
        )
        .into()]),
        "UnknownSymbol"
    );
}

#[test]
fn test_compound_assignment_needs_number() {
    assert_eq!(
        error_name(vec![
            VarDeclStmt::variable("s", Expr::string("a")).into(),
            ReAssignmentStmt::new(
                AssignmentPath::symbol("s"),
                AssignmentOperator::StarAssign,
                Expr::string("b"),
            )
            .into(),
        ]),
        "TypeMismatch"
    );
}

#[test]
fn test_member_and_index_assignment() {
    let points = Expr::array(vec![
        Expr::object(vec![("x", Expr::number(1.0))]),
        Expr::object(vec![("x", Expr::number(2.0))]),
    ]);

    let output = check(vec![
        VarDeclStmt::constant("ps", points.clone()).into(),
        ReAssignmentStmt::new(
            AssignmentPath::member(
                AssignmentPath::index(AssignmentPath::symbol("ps"), Expr::number(0.0)),
                "x",
            ),
            AssignmentOperator::Assign,
            Expr::number(5.0),
        )
        .into(),
    ])
    .expect("fields of constant records can change");
    assert_eq!(output.typed_ast.len(), 2);

    assert_eq!(
        error_name(vec![
            VarDeclStmt::constant("ps", points).into(),
            ReAssignmentStmt::new(
                AssignmentPath::member(
                    AssignmentPath::index(AssignmentPath::symbol("ps"), Expr::number(0.0)),
                    "y",
                ),
                AssignmentOperator::Assign,
                Expr::number(5.0),
            )
            .into(),
        ]),
        "UnknownField"
    );
}

#[test]
fn test_deferred_reassignment_is_checked() {
    let ast = |value: Expr| {
        vec![
            VarDeclStmt::variable("x", call("b", vec![])).into(),
            ReAssignmentStmt::new(AssignmentPath::symbol("x"), AssignmentOperator::Assign, value)
                .into(),
            function("b", vec![ret(Expr::number(1.0))]),
        ]
    };

    assert!(check(ast(Expr::number(2.0))).is_ok());
    assert_eq!(error_name(ast(Expr::boolean(true))), "TypeMismatch");
}

#[test]
fn test_loop_control() {
    assert_eq!(error_name(vec![Stmt::Break(Span::null())]), "ControlOutsideLoop");
    assert_eq!(error_name(vec![Stmt::Continue(Span::null())]), "ControlOutsideLoop");

    let output = check(vec![WhileStmt::new(
        true_literal(),
        vec![
            Stmt::If(CondBlock::new(
                Expr::boolean(false),
                vec![Stmt::Continue(Span::null())],
            )),
            Stmt::Break(Span::null()),
        ],
    )
    .into()])
    .expect("control inside loop");

    match &output.typed_ast[0] {
        TypedStmt::While(stmt) => assert_eq!(stmt.body.len(), 2),
        other => panic!("expected while, got {:?}", other),
    }
}

#[test]
fn test_while_condition() {
    let compare = || Expr::binary(Expr::number(1.0), BinaryOperator::LessThan, Expr::number(2.0));

    assert_eq!(
        error_name(vec![WhileStmt::new(compare(), vec![]).into()]),
        "InvalidLoopCondition"
    );

    let options = TypeCheckerOptions::default().with_loop_condition(LoopCondition::Boolean);
    assert!(type_check(vec![WhileStmt::new(compare(), vec![]).into()], options.clone()).is_ok());

    let error = type_check(
        vec![WhileStmt::new(Expr::number(1.0), vec![]).into()],
        options,
    )
    .err()
    .expect("number condition");
    assert_eq!(error.get_error_name(), "TypeMismatch");
}

#[test]
fn test_return_rules() {
    assert_eq!(
        error_name(vec![ret(Expr::number(1.0))]),
        "ReturnOutsideFunction"
    );

    assert_eq!(
        error_name(vec![function(
            "f",
            vec![ret(Expr::number(1.0)), ret(Expr::boolean(true))],
        )]),
        "ReturnTypeMismatch"
    );

    assert_eq!(
        error_name(vec![FnDeclStmt::new("f", vec![], vec![ret(Expr::number(1.0))])
            .with_return_type(DataType::Boolean)
            .into()]),
        "ReturnTypeMismatch"
    );

    let output = check(vec![
        function("f", vec![]),
        function("g", vec![ReturnStmt::new(None).into()]),
    ])
    .expect("void functions");
    assert_eq!(fn_return_type(&output, "f"), Type::Void);
    assert_eq!(fn_return_type(&output, "g"), Type::Void);
}

#[test]
fn test_function_declaration_rules() {
    assert_eq!(
        error_name(vec![Stmt::If(CondBlock::new(
            true_literal(),
            vec![function("f", vec![])],
        ))]),
        "FunctionNotTopLevel"
    );

    assert_eq!(
        error_name(vec![FnDeclStmt::new(
            "f",
            vec![("a", DataType::Number), ("a", DataType::Boolean)],
            vec![],
        )
        .into()]),
        "DuplicateParameter"
    );

    assert_eq!(
        error_name(vec![FnDeclStmt::new("f", vec![("a", DataType::NotCalculated)], vec![]).into()]),
        "MissingTypeAnnotation"
    );

    let output = check(vec![
        FnDeclStmt::new(
            "add",
            vec![("a", DataType::Number), ("b", DataType::Number)],
            vec![ret(Expr::binary(
                Expr::symbol("a"),
                BinaryOperator::Plus,
                Expr::symbol("b"),
            ))],
        )
        .into(),
        VarDeclStmt::constant("sum", call("add", vec![Expr::number(1.0), Expr::number(2.0)]))
            .into(),
    ])
    .expect("parameters are in scope");
    assert_eq!(var_type(&output, "sum"), Type::Number);
}

#[test]
fn test_if_chain_is_folded() {
    let output = check(vec![
        Stmt::If(CondBlock::new(Expr::boolean(false), vec![])),
        Stmt::ElseIf(CondBlock::new(Expr::boolean(false), vec![])),
        Stmt::ElseIf(CondBlock::new(true_literal(), vec![])),
        Stmt::Else(ElseStmt::new(vec![])),
        VarDeclStmt::constant("after", Expr::number(1.0)).into(),
    ])
    .expect("if chain");

    assert_eq!(output.typed_ast.len(), 2);
    match &output.typed_ast[0] {
        TypedStmt::If(stmt) => {
            assert_eq!(stmt.else_if_blocks.len(), 2);
            assert!(stmt.else_block.is_some());
        }
        other => panic!("expected if, got {:?}", other),
    }

    let output = check(vec![
        Stmt::If(CondBlock::new(true_literal(), vec![])),
        Stmt::If(CondBlock::new(true_literal(), vec![])),
    ])
    .expect("two separate ifs");
    assert_eq!(output.typed_ast.len(), 2);
}

#[test]
fn test_if_branches_have_their_own_scope() {
    assert!(check(vec![
        Stmt::If(CondBlock::new(
            true_literal(),
            vec![VarDeclStmt::constant("x", Expr::number(1.0)).into()],
        )),
        Stmt::Else(ElseStmt::new(vec![
            VarDeclStmt::constant("x", Expr::boolean(true)).into()
        ])),
    ])
    .is_ok());

    assert_eq!(
        error_name(vec![
            Stmt::If(CondBlock::new(
                true_literal(),
                vec![VarDeclStmt::constant("x", Expr::number(1.0)).into()],
            )),
            VarDeclStmt::constant("y", Expr::symbol("x")).into(),
        ]),
        "UnresolvedReference"
    );
}

#[test]
fn test_if_condition_and_orphans() {
    assert_eq!(
        error_name(vec![Stmt::If(CondBlock::new(Expr::number(1.0), vec![]))]),
        "TypeMismatch"
    );
    assert_eq!(
        error_name(vec![
            Stmt::If(CondBlock::new(call("later", vec![]), vec![])),
            FnDeclStmt::new("later", vec![], vec![ret(Expr::boolean(true))]).into(),
        ]),
        "TypeMismatch"
    );
    assert_eq!(
        error_name(vec![Stmt::Else(ElseStmt::new(vec![]))]),
        "UnexpectedElse"
    );
    assert_eq!(
        error_name(vec![
            Stmt::If(CondBlock::new(true_literal(), vec![])),
            VarDeclStmt::constant("x", Expr::number(1.0)).into(),
            Stmt::ElseIf(CondBlock::new(true_literal(), vec![])),
        ]),
        "UnexpectedElse"
    );
}

#[test]
fn test_expression_statement() {
    let output = check(vec![
        ExpressionStmt::new(call("f", vec![])).into(),
        function("f", vec![]),
    ])
    .expect("hoisted call");

    match &output.typed_ast[0] {
        TypedStmt::Expression(stmt) => assert_eq!(stmt.expression.get_type(), Type::Void),
        other => panic!("expected expression, got {:?}", other),
    }
}

#[test]
fn test_call_arity() {
    let add = FnDeclStmt::new(
        "add",
        vec![("a", DataType::Number), ("b", DataType::Number)],
        vec![ret(Expr::symbol("a"))],
    );

    assert_eq!(
        error_name(vec![
            add.clone().into(),
            ExpressionStmt::new(call("add", vec![Expr::number(1.0)])).into(),
        ]),
        "MissingArguments"
    );
    assert_eq!(
        error_name(vec![
            add.into(),
            ExpressionStmt::new(call(
                "add",
                vec![Expr::number(1.0), Expr::number(2.0), Expr::number(3.0)],
            ))
            .into(),
        ]),
        "UnexpectedArguments"
    );
}

#[test]
fn test_internal_import() {
    let output = check(vec![
        ImportStmt::new(vec!["syscallExit"], "internal").into(),
        VarDeclStmt::constant("ok", call("syscallExit", vec![Expr::number(0.0)])).into(),
    ])
    .expect("internal module");

    assert_eq!(var_type(&output, "ok"), Type::Boolean);

    assert_eq!(
        error_name(vec![ImportStmt::new(vec!["nothing"], "internal").into()]),
        "UnresolvedImport"
    );
    assert_eq!(
        error_name(vec![function(
            "f",
            vec![ImportStmt::new(vec!["syscallExit"], "internal").into()],
        )]),
        "ImportNotTopLevel"
    );
}

#[test]
fn test_imported_names_are_constant() {
    assert_eq!(
        error_name(vec![
            ImportStmt::new(vec!["syscallExit"], "internal").into(),
            ReAssignmentStmt::new(
                AssignmentPath::symbol("syscallExit"),
                AssignmentOperator::Assign,
                Expr::number(1.0),
            )
            .into(),
        ]),
        "ReassignToConst"
    );
}

#[test]
fn test_exports() {
    let output = check(vec![
        VarDeclStmt::constant("hidden", Expr::number(1.0)).into(),
        VarDeclStmt::constant("answer", Expr::number(42.0)).exported().into(),
        FnDeclStmt::new("id", vec![("x", DataType::Number)], vec![ret(Expr::symbol("x"))])
            .exported()
            .into(),
    ])
    .expect("exports");

    let names: Vec<&str> = output.exported_variables.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["answer", "id"]);
    assert_eq!(
        output.exported_variables.get("id"),
        Some(&Type::Function {
            arguments: vec![("x".to_string(), Type::Number)],
            return_type: Box::new(Type::Number),
        })
    );

    assert_eq!(
        error_name(vec![function(
            "f",
            vec![VarDeclStmt::constant("a", Expr::number(1.0)).exported().into()],
        )]),
        "ExportNotTopLevel"
    );
}

#[test]
fn test_loaded_modules() {
    let mut registry = ModuleRegistry::new().with_loader(|module: &str| {
        Ok(match module {
            "math" => vec![
                FnDeclStmt::new(
                    "square",
                    vec![("x", DataType::Number)],
                    vec![ret(Expr::binary(
                        Expr::symbol("x"),
                        BinaryOperator::Star,
                        Expr::symbol("x"),
                    ))],
                )
                .exported()
                .into(),
                VarDeclStmt::constant("private", Expr::number(1.0)).into(),
            ],
            _ => vec![],
        })
    });

    let output = type_check_with_importer(
        vec![
            ImportStmt::new(vec!["square"], "math").into(),
            VarDeclStmt::constant("nine", call("square", vec![Expr::number(3.0)])).into(),
        ],
        &mut registry,
        TypeCheckerOptions::default(),
    )
    .expect("loaded module");
    assert_eq!(var_type(&output, "nine"), Type::Number);
    assert!(registry.exports_of("math").is_some());

    let error = type_check_with_importer(
        vec![ImportStmt::new(vec!["private"], "math").into()],
        &mut registry,
        TypeCheckerOptions::default(),
    )
    .err()
    .expect("not exported");
    assert_eq!(error.get_error_name(), "UnresolvedImport");
}

#[test]
fn test_loaded_modules_use_registry_options() {
    let loader = |module: &str| -> Result<Vec<Stmt>, Error> {
        Ok(match module {
            "poll" => vec![
                VarDeclStmt::variable("ready", Expr::boolean(false)).into(),
                WhileStmt::new(
                    Expr::prefix(PrefixOperator::Bang, Expr::symbol("ready")),
                    vec![ReAssignmentStmt::new(
                        AssignmentPath::symbol("ready"),
                        AssignmentOperator::Assign,
                        Expr::boolean(true),
                    )
                    .into()],
                )
                .into(),
                VarDeclStmt::constant("done", Expr::symbol("ready")).exported().into(),
            ],
            _ => vec![],
        })
    };
    let ast = || vec![ImportStmt::new(vec!["done"], "poll").into()];

    let error = type_check_with_importer(
        ast(),
        &mut ModuleRegistry::new().with_loader(loader),
        TypeCheckerOptions::default(),
    )
    .err()
    .expect("literal true loops only");
    assert_eq!(error.get_error_name(), "InvalidLoopCondition");

    let mut registry = ModuleRegistry::new()
        .with_loader(loader)
        .with_options(TypeCheckerOptions::default().with_loop_condition(LoopCondition::Boolean));
    type_check_with_importer(ast(), &mut registry, TypeCheckerOptions::default())
        .expect("boolean loop conditions in the loaded module");
    assert_eq!(
        registry.exports_of("poll").and_then(|exports| exports.get("done")),
        Some(&DataType::Boolean)
    );
}

#[test]
fn test_cyclic_import() {
    let mut registry = ModuleRegistry::new().with_loader(|module: &str| {
        Ok(match module {
            "a" => vec![
                ImportStmt::new(vec!["y"], "b").into(),
                VarDeclStmt::constant("x", Expr::number(1.0)).exported().into(),
            ],
            "b" => vec![
                ImportStmt::new(vec!["x"], "a").into(),
                VarDeclStmt::constant("y", Expr::number(2.0)).exported().into(),
            ],
            _ => vec![],
        })
    });

    let error = type_check_with_importer(
        vec![ImportStmt::new(vec!["x"], "a").into()],
        &mut registry,
        TypeCheckerOptions::default(),
    )
    .err()
    .expect("cycle");
    assert_eq!(error.get_error_name(), "CyclicImport");
}

#[test]
fn test_typed_tree_is_stable() {
    let ast = vec![
        VarDeclStmt::constant("a", call("b", vec![])).into(),
        VarDeclStmt::variable("xs", Expr::array(vec![Expr::symbol("a"), Expr::number(2.0)])).into(),
        ReAssignmentStmt::new(
            AssignmentPath::index(AssignmentPath::symbol("xs"), Expr::number(0.0)),
            AssignmentOperator::MinusAssign,
            Expr::number(1.0),
        )
        .into(),
        FnDeclStmt::new("b", vec![], vec![ret(Expr::number(1.0))])
            .exported()
            .into(),
        Stmt::If(CondBlock::new(
            Expr::binary(Expr::symbol("a"), BinaryOperator::GreaterThan, Expr::number(0.0)),
            vec![],
        )),
        Stmt::Else(ElseStmt::new(vec![])),
        WhileStmt::new(true_literal(), vec![Stmt::Break(Span::null())]).into(),
        ImportStmt::new(vec!["syscallExit"], "internal").into(),
        Stmt::Eof,
    ];

    let first = check(ast).expect("first pass");
    let second = check(untype(first.typed_ast.clone())).expect("second pass");

    assert_eq!(first, second);
}
