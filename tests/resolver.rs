#[cfg(test)]
mod resolver_tests {
    use std::io::{self, Cursor};

    use rox::ast::{Expr, ExprId, Stmt};
    use rox::interpreter::Interpreter;
    use rox::parser::Parser;
    use rox::resolver::Resolver;
    use rox::scanner::tokenize;

    fn quiet_interpreter() -> Interpreter {
        Interpreter::with_io(Box::new(io::sink()), Box::new(Cursor::new(Vec::new())))
    }

    fn parse(source: &str) -> Vec<Stmt> {
        let (tokens, errors) = tokenize(source.as_bytes());
        assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);

        Parser::new(tokens).parse().expect("source parses")
    }

    /// Every resolve error for `source`, rendered.
    fn resolve_errors(source: &str) -> Vec<String> {
        let statements = parse(source);
        let mut interpreter = quiet_interpreter();
        let mut resolver = Resolver::new(&mut interpreter);

        match resolver.resolve(&statements) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn resolve_warnings(source: &str) -> Vec<String> {
        let statements = parse(source);
        let mut interpreter = quiet_interpreter();
        let mut resolver = Resolver::new(&mut interpreter);

        resolver.resolve(&statements).expect("resolves");

        resolver
            .take_warnings()
            .iter()
            .map(|w| w.to_string())
            .collect()
    }

    /// Ids of variables printed directly by `print`, nested blocks included,
    /// in source order.
    fn printed_variable_ids(statements: &[Stmt], ids: &mut Vec<ExprId>) {
        for stmt in statements {
            match stmt {
                Stmt::Print(Expr::Variable { id, .. }) => ids.push(*id),
                Stmt::Block(inner) => printed_variable_ids(inner, ids),
                _ => {}
            }
        }
    }

    #[test]
    fn test_resolver_01_local_depths() {
        let statements = parse("var g = 0; { var a = 1; { print a; print g; } }");

        let mut interpreter = quiet_interpreter();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .expect("resolves");

        let mut ids = Vec::new();
        printed_variable_ids(&statements, &mut ids);

        assert_eq!(ids.len(), 2);
        assert_eq!(interpreter.local_depth(ids[0]), Some(1));
        assert_eq!(interpreter.local_depth(ids[1]), None);
    }

    #[test]
    fn test_resolver_02_own_initializer() {
        assert_eq!(
            resolve_errors("{ var a = a; }"),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );

        // Globals may refer to themselves; the failure is left to runtime.
        assert!(resolve_errors("var a = a;").is_empty());
    }

    #[test]
    fn test_resolver_03_redeclaration() {
        assert_eq!(
            resolve_errors("fun f(a, a) {}"),
            vec!["[line 1] Error at 'a': Already declared a variable with this name in this scope."]
        );

        assert!(resolve_errors("var a = 1; var a = 2;").is_empty());
    }

    #[test]
    fn test_resolver_04_return_placement() {
        assert_eq!(
            resolve_errors("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
        assert_eq!(
            resolve_errors("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );

        assert!(resolve_errors("class A { init() { return; } }").is_empty());
    }

    #[test]
    fn test_resolver_05_loop_control_placement() {
        assert_eq!(
            resolve_errors("break;"),
            vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop."]
        );
        assert_eq!(
            resolve_errors("if (true) continue;"),
            vec!["[line 1] Error at 'continue': Can't use 'continue' outside of a loop."]
        );

        // A function body does not inherit the enclosing loop.
        assert_eq!(
            resolve_errors("while (true) { fun f() { break; } }"),
            vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop."]
        );

        assert!(resolve_errors("while (true) { if (true) break; else continue; }").is_empty());
    }

    #[test]
    fn test_resolver_06_this_and_super_placement() {
        assert_eq!(
            resolve_errors("print this;"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
        assert_eq!(
            resolve_errors("fun f() { return super.x; }"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );
        assert_eq!(
            resolve_errors("class A { f() { return super.f(); } }"),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
        assert_eq!(
            resolve_errors("class A extends A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_resolver_07_init_must_be_an_instance_method() {
        assert_eq!(
            resolve_errors("class A { class init() {} }"),
            vec!["[line 1] Error at 'init': Can't declare 'init' as a static method."]
        );
        assert_eq!(
            resolve_errors("class A { init {} }"),
            vec!["[line 1] Error at 'init': Can't declare 'init' as a getter."]
        );
    }

    #[test]
    fn test_resolver_08_collects_every_error() {
        let errors = resolve_errors("break;\nreturn;\nprint this;");

        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("[line 1]"));
        assert!(errors[1].starts_with("[line 2]"));
        assert!(errors[2].starts_with("[line 3]"));
    }

    #[test]
    fn test_resolver_09_unused_local_warnings() {
        let source = "{\n  var used = 1;\n  var unused = 2;\n  print used;\n}";

        assert_eq!(
            resolve_warnings(source),
            vec!["[line 3] Warning at 'unused': Unused variable."]
        );
    }

    #[test]
    fn test_resolver_10_assignment_is_not_a_use() {
        let source = "{\n  var written = 1;\n  written = 2;\n}";

        assert_eq!(
            resolve_warnings(source),
            vec!["[line 2] Warning at 'written': Unused variable."]
        );
    }

    #[test]
    fn test_resolver_11_parameters_and_globals_never_warn() {
        assert!(resolve_warnings("var g = 1; fun f(a) { return 1; }").is_empty());
    }
}
