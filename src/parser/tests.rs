//! Parser tests.

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse_program(source: &str) -> Program {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn parse_expr(source: &str) -> Expr {
        match parse_program(source).statements.into_iter().next().unwrap().kind {
            StmtKind::Expression(expr) => expr,
            _ => panic!("Expected expression statement"),
        }
    }

    fn parse_err(source: &str) -> String {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        Parser::new(tokens).parse().unwrap_err().to_string()
    }

    #[test]
    fn test_binary_expr() {
        let expr = parse_expr("1 + 2");
        match expr.kind {
            ExprKind::Binary { operator, .. } => assert_eq!(operator, BinaryOp::Add),
            _ => panic!("Expected binary expression"),
        }
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 should parse as 1 + (2 * 3)
        let expr = parse_expr("1 + 2 * 3");
        match expr.kind {
            ExprKind::Binary {
                operator: BinaryOp::Add,
                right,
                ..
            } => match right.kind {
                ExprKind::Binary {
                    operator: BinaryOp::Multiply,
                    ..
                } => {}
                _ => panic!("Expected multiply on right"),
            },
            _ => panic!("Expected add at top"),
        }
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_expr("2 ** 3 ** 2");
        match expr.kind {
            ExprKind::Binary {
                operator: BinaryOp::Power,
                left,
                right,
            } => {
                assert_eq!(left.kind, ExprKind::Number(2.0));
                assert!(matches!(
                    right.kind,
                    ExprKind::Binary {
                        operator: BinaryOp::Power,
                        ..
                    }
                ));
            }
            _ => panic!("Expected power expression"),
        }
    }

    #[test]
    fn test_not_binds_looser_than_equality() {
        let expr = parse_expr("not a == b");
        match expr.kind {
            ExprKind::Unary {
                operator: UnaryOp::Not,
                operand,
            } => assert!(matches!(
                operand.kind,
                ExprKind::Binary {
                    operator: BinaryOp::Equal,
                    ..
                }
            )),
            _ => panic!("Expected not expression"),
        }
    }

    #[test]
    fn test_call() {
        let expr = parse_expr("foo(1, 2)");
        match expr.kind {
            ExprKind::Call { arguments, .. } => assert_eq!(arguments.len(), 2),
            _ => panic!("Expected call expression"),
        }
    }

    #[test]
    fn test_optional_chain() {
        let expr = parse_expr("a?.b?.(1)?.[0]");
        match expr.kind {
            ExprKind::Index {
                optional: true,
                object,
                ..
            } => match object.kind {
                ExprKind::Call {
                    optional: true,
                    callee,
                    ..
                } => assert!(matches!(
                    callee.kind,
                    ExprKind::Member { optional: true, .. }
                )),
                _ => panic!("Expected optional call"),
            },
            _ => panic!("Expected optional index"),
        }
    }

    #[test]
    fn test_slice() {
        let expr = parse_expr("xs[1:]");
        match expr.kind {
            ExprKind::Slice { start, end, .. } => {
                assert!(start.is_some());
                assert!(end.is_none());
            }
            _ => panic!("Expected slice"),
        }
    }

    #[test]
    fn test_compound_assignment() {
        let expr = parse_expr("x += 2");
        match expr.kind {
            ExprKind::Assign { operator, .. } => assert_eq!(operator, Some(BinaryOp::Add)),
            _ => panic!("Expected assignment"),
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(parse_err("1 + 2 = 3").contains("Invalid assignment target"));
    }

    #[test]
    fn test_function_parameters() {
        let program = parse_program("fun f(a, b: number, c = 2, d?, ...rest) { return a }");
        match &program.statements[0].kind {
            StmtKind::Function(decl) => {
                assert_eq!(decl.name, "f");
                assert!(!decl.auto_return);
                let flags: Vec<(bool, bool)> =
                    decl.params.iter().map(|p| (p.optional, p.rest)).collect();
                assert_eq!(
                    flags,
                    vec![
                        (false, false),
                        (false, false),
                        (true, false),
                        (true, false),
                        (false, true)
                    ]
                );
                assert_eq!(
                    decl.params[1].declared_type.as_ref().map(|t| t.to_string()),
                    Some("number".to_string())
                );
            }
            _ => panic!("Expected function declaration"),
        }
    }

    #[test]
    fn test_auto_return_inline_if_propagates() {
        let program = parse_program("fun sign(x) -> if x > 0: 1 elif x < 0: -1");
        match &program.statements[0].kind {
            StmtKind::Function(decl) => {
                assert!(decl.auto_return);
                match &decl.body.kind {
                    StmtKind::Expression(Expr {
                        kind: ExprKind::If {
                            cases, propagate, ..
                        },
                        ..
                    }) => {
                        assert_eq!(cases.len(), 2);
                        assert!(*propagate);
                    }
                    _ => panic!("Expected inline if body"),
                }
            }
            _ => panic!("Expected function declaration"),
        }
    }

    #[test]
    fn test_if_elif_else_across_lines() {
        let expr = parse_expr("if a {\n 1\n}\nelif b {\n 2\n}\nelse {\n 3\n}");
        match expr.kind {
            ExprKind::If {
                cases,
                else_branch,
                propagate,
            } => {
                assert_eq!(cases.len(), 2);
                assert!(else_branch.is_some());
                assert!(!propagate);
            }
            _ => panic!("Expected if expression"),
        }
    }

    #[test]
    fn test_for_with_step() {
        let expr = parse_expr("for i = 1 to 10 step 2: i");
        match expr.kind {
            ExprKind::For {
                variable,
                start,
                step,
                ..
            } => {
                assert_eq!(variable, "i");
                assert!(start.is_some());
                assert!(step.is_some());
            }
            _ => panic!("Expected for expression"),
        }
    }

    #[test]
    fn test_switch() {
        let expr = parse_expr("switch v {\n case 4, 3: \"4 or 3\"\n default: \"default\"\n}");
        match expr.kind {
            ExprKind::Switch { cases, default, .. } => {
                assert_eq!(cases.len(), 1);
                assert_eq!(cases[0].values.len(), 2);
                assert_eq!(default.map(|d| d.len()), Some(1));
            }
            _ => panic!("Expected switch expression"),
        }
    }

    #[test]
    fn test_class_members() {
        let source = "class Square extends Shape {\n\
                      private static property count: number = 0\n\
                      property side = 1\n\
                      fun __init(side) { self.side = side }\n\
                      get area() -> self.side * self.side\n\
                      set area(v) { self.side = v }\n\
                      }";
        let program = parse_program(source);
        match &program.statements[0].kind {
            StmtKind::Class(decl) => {
                assert_eq!(decl.name, "Square");
                assert!(decl.superclass.is_some());
                assert_eq!(decl.members.len(), 5);
                assert_eq!(decl.members[0].visibility, Visibility::Private);
                assert!(decl.members[0].is_static);
                assert!(matches!(decl.members[3].kind, MemberDeclKind::Getter(_)));
                assert!(matches!(decl.members[4].kind, MemberDeclKind::Setter(_)));
            }
            _ => panic!("Expected class declaration"),
        }
    }

    #[test]
    fn test_enum() {
        let program = parse_program("enum Color {\n RED,\n GREEN,\n BLUE\n}");
        match &program.statements[0].kind {
            StmtKind::Enum(decl) => assert_eq!(decl.variants, vec!["RED", "GREEN", "BLUE"]),
            _ => panic!("Expected enum declaration"),
        }
    }

    #[test]
    fn test_dict_statement_vs_block() {
        assert!(matches!(
            parse_program("{\"a\": 1}").statements[0].kind,
            StmtKind::Expression(Expr {
                kind: ExprKind::Dict(_),
                ..
            })
        ));
        assert!(matches!(
            parse_program("{ a = 1 }").statements[0].kind,
            StmtKind::Block(_)
        ));
    }

    #[test]
    fn test_statements_need_separators() {
        assert!(parse_err("a b").contains("newline or ';'"));
        assert_eq!(parse_program("a; b\nc").statements.len(), 3);
    }

    #[test]
    fn test_delete_targets() {
        assert!(matches!(
            parse_program("del xs[1:2]").statements[0].kind,
            StmtKind::Delete(_)
        ));
        assert!(parse_err("del f()").contains("Can only delete"));
    }
}
