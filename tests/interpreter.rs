#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::io::{self, Cursor, Write};
    use std::rc::Rc;

    use rox::interpreter::Interpreter;
    use rox::session::{Session, SessionError};
    use rox::value::Value;

    /// Writer whose bytes stay readable after the interpreter takes it.
    #[derive(Clone, Default)]
    struct SharedOut(Rc<RefCell<Vec<u8>>>);

    impl SharedOut {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).expect("output is UTF-8")
        }
    }

    impl Write for SharedOut {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session_with_input(input: &str) -> (Session, SharedOut) {
        let out = SharedOut::default();
        let interpreter = Interpreter::with_io(
            Box::new(out.clone()),
            Box::new(Cursor::new(input.as_bytes().to_vec())),
        );

        (Session::with_interpreter(interpreter), out)
    }

    /// Run `source` and return what it printed.
    fn run(source: &str) -> String {
        let (mut session, out) = session_with_input("");

        if let Err(e) = session.run(source) {
            panic!("program failed: {}", e);
        }

        out.contents()
    }

    /// Run `source`, expecting it to fail; return the output so far and the error.
    fn run_err(source: &str) -> (String, SessionError) {
        let (mut session, out) = session_with_input("");

        match session.run(source) {
            Ok(_) => panic!("program succeeded, printed {:?}", out.contents()),
            Err(e) => (out.contents(), e),
        }
    }

    fn runtime_message(source: &str) -> String {
        match run_err(source).1 {
            SessionError::Runtime(e) => e.to_string(),
            other => panic!("expected a runtime error, got {}", other),
        }
    }

    // ─────────────────────────── statements ───────────────────────────

    #[test]
    fn test_interpreter_01_print_and_arithmetic() {
        assert_eq!(run("print 1 + 2 * 3;"), "7\n");
        assert_eq!(run("print 7 / 2;"), "3.5\n");
        assert_eq!(run("print 7 % 4;"), "3\n");
        assert_eq!(run("print -(2 ** 3 ** 2);"), "-512\n");
    }

    #[test]
    fn test_interpreter_02_string_concatenation() {
        assert_eq!(run("print \"a\" + 1.0;"), "a1\n");
        assert_eq!(run("print 2.5 + \"b\";"), "2.5b\n");
        assert_eq!(run("print \"foo\" + \"bar\";"), "foobar\n");
    }

    #[test]
    fn test_interpreter_03_for_continue_runs_increment() {
        let source = "for (var i = 0; i < 3; i = i + 1) {
            if (i == 1) continue;
            print i;
        }";

        assert_eq!(run(source), "0\n2\n");
    }

    #[test]
    fn test_interpreter_04_while_and_break() {
        let source = "var i = 0;
        while (true) {
            i = i + 1;
            if (i > 3) break;
        }
        print i;";

        assert_eq!(run(source), "4\n");
    }

    #[test]
    fn test_interpreter_05_truthiness() {
        assert_eq!(run("if (0) print \"yes\"; else print \"no\";"), "no\n");
        assert_eq!(run("if (\"\") print \"yes\"; else print \"no\";"), "no\n");
        assert_eq!(run("print 0 ? \"a\" : \"b\";"), "b\n");
        assert_eq!(run("print nil or \"x\";"), "true\n");
        assert_eq!(run("print 1 and 0;"), "false\n");
    }

    #[test]
    fn test_interpreter_06_prefix_postfix_and_bitwise() {
        assert_eq!(run("var i = 1; print i++; print i; print ++i;"), "1\n2\n3\n");
        assert_eq!(run("var j = 5; print --j;"), "4\n");
        assert_eq!(run("print 5 & 3; print 5 | 3; print 5 ^ 3;"), "1\n7\n6\n");
        assert_eq!(run("print 1 << 4; print 256 >> 4; print ~0;"), "16\n16\n-1\n");
    }

    #[test]
    fn test_interpreter_07_comma_yields_right_operand() {
        assert_eq!(run("var a = (1, 2, 3); print a;"), "3\n");
    }

    // ─────────────────────────── functions ────────────────────────────

    #[test]
    fn test_interpreter_08_closures_keep_their_frame() {
        let source = "fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                return i;
            }
            return count;
        }
        var c = makeCounter();
        print c();
        print c();";

        assert_eq!(run(source), "1\n2\n");
    }

    #[test]
    fn test_interpreter_09_closures_ignore_later_shadowing() {
        let source = "var a = \"global\";
        {
            fun show() { print a; }
            show();
            var a = \"block\";
            show();
        }";

        let (mut session, out) = session_with_input("");
        let warnings = session.run(source).expect("runs");

        assert_eq!(out.contents(), "global\nglobal\n");

        let warnings: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
        assert_eq!(warnings, vec!["[line 5] Warning at 'a': Unused variable."]);
    }

    #[test]
    fn test_interpreter_10_for_loop_iterations_share_one_frame() {
        let source = "var f1;
        var f2;
        for (var i = 0; i < 2; i = i + 1) {
            if (i == 0) f1 = fun () { return i; };
            else f2 = fun () { return i; };
        }
        print f1();
        print f2();";

        assert_eq!(run(source), "2\n2\n");
    }

    #[test]
    fn test_interpreter_37_loop_body_declarations_get_fresh_frames() {
        let (mut session, out) = session_with_input("");

        session
            .run(
                "var f1;
                var f2;
                for (var i = 0; i < 2; i = i + 1) {
                    var j = i;
                    if (i == 0) f1 = fun () { return j; };
                    else f2 = fun () { return j; };
                }",
            )
            .expect("runs");

        let values = session.evaluate("f1(); f2()").expect("evaluates");
        assert_eq!(values, vec![Value::Number(0.0), Value::Number(1.0)]);
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn test_interpreter_11_recursion() {
        let source = "fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(15);";

        assert_eq!(run(source), "610\n");
    }

    #[test]
    fn test_interpreter_12_callable_display() {
        let source = "fun f() {}
        class P {}
        print f;
        print fun () {};
        print clock;
        print P;
        print P();";

        assert_eq!(
            run(source),
            "<fn: f>\n<fn: anonymous>\n<native fn: clock>\n<class: P>\n<P instance>\n"
        );
    }

    #[test]
    fn test_interpreter_13_print_is_a_callable_value() {
        assert_eq!(run("var p = print; p(\"via native\");"), "via native\n");
    }

    // ──────────────────────────── classes ─────────────────────────────

    #[test]
    fn test_interpreter_14_inherited_method_is_found() {
        let source = "class A { greet() { print \"hi from A\"; } }
        class B extends A {}
        B().greet();";

        assert_eq!(run(source), "hi from A\n");
    }

    #[test]
    fn test_interpreter_15_super_calls_the_ancestor() {
        let source = "class A { name() { return \"A\"; } }
        class B extends A { name() { return \"B+\" + super.name(); } }
        print B().name();";

        assert_eq!(run(source), "B+A\n");
    }

    #[test]
    fn test_interpreter_16_multiple_ancestors_left_to_right() {
        let source = "class Walker { move() { return \"walk\"; } }
        class Swimmer {
            move() { return \"swim\"; }
            dive() { return \"dive\"; }
        }
        class Duck extends Walker, Swimmer {}
        var d = Duck();
        print d.move();
        print d.dive();";

        assert_eq!(run(source), "walk\ndive\n");
    }

    #[test]
    fn test_interpreter_17_initializer_getter_and_static() {
        let source = "class Circle {
            init(r) { this.r = r; }
            area { return this.r * this.r * 3; }
            class unit() { return Circle(1); }
        }
        print Circle(2).area;
        print Circle.unit().r;
        print Circle(5).init(4).r;";

        assert_eq!(run(source), "12\n1\n4\n");
    }

    #[test]
    fn test_interpreter_18_class_and_instance_fields() {
        let source = "class C {}
        C.count = 3;
        var c = C();
        c.x = 1;
        print C.count;
        print c.x;";

        assert_eq!(run(source), "3\n1\n");
    }

    #[test]
    fn test_interpreter_19_property_errors() {
        assert_eq!(
            runtime_message("class C {} var c = C(); print c.y;"),
            "Undefined property 'y' on <C instance>.\n[line 1]"
        );
        assert_eq!(
            runtime_message("class C { m() {} } C.m();"),
            "Cannot access non-static method 'm' through class 'C'.\n[line 1]"
        );
        assert_eq!(
            runtime_message("var x = 1; print x.y;"),
            "Only instances have properties.\n[line 1]"
        );
        assert_eq!(
            runtime_message("var x = 1; x.y = 2;"),
            "Only instances have fields.\n[line 1]"
        );
        assert_eq!(
            runtime_message("var NotClass = 1; class D extends NotClass {}"),
            "Superclass must be a class.\n[line 1]"
        );
    }

    // ─────────────────────── strings and containers ───────────────────

    #[test]
    fn test_interpreter_20_string_indexing() {
        let source = "var s = \"hello\";
        print s[1:3];
        print s[-1];
        print s[0];
        print s[2:100];";

        assert_eq!(run(source), "el\no\nh\nllo\n");

        assert_eq!(
            runtime_message("print \"abc\"[5];"),
            "String index out of range.\n[line 1]"
        );
        assert_eq!(
            runtime_message("print \"abc\"[2:1];"),
            "Start index cannot be greater than end index.\n[line 1]"
        );
    }

    #[test]
    fn test_interpreter_21_tuple_and_map_literals() {
        assert_eq!(run("print [1, \"a\", nil];"), "( 1, 'a', nil )\n");
        assert_eq!(run("print [];"), "()\n");
        assert_eq!(
            run("print {\"b\": 2, 1: true, \"a\": \"x\"};"),
            "{ 1: true, 'a': 'x', 'b': 2 }\n"
        );
    }

    // ───────────────────────────── natives ────────────────────────────

    #[test]
    fn test_interpreter_22_input_and_num() {
        let (mut session, out) = session_with_input("21\nignored\n");

        session
            .run("var n = num(input(\"> \")); print n * 2;")
            .expect("runs");

        assert_eq!(out.contents(), "> 42\n");
    }

    #[test]
    fn test_interpreter_23_num_rejects_bad_input() {
        assert_eq!(
            runtime_message("num(\"abc\");"),
            "Cannot convert input to number: 'abc'\n[line 1]"
        );
        assert_eq!(
            runtime_message("num(nil);"),
            "Invalid input type: 'nil'\n[line 1]"
        );
    }

    #[test]
    fn test_interpreter_24_clock_is_positive() {
        assert_eq!(run("print clock() > 0;"), "true\n");
    }

    // ───────────────────────────── errors ─────────────────────────────

    #[test]
    fn test_interpreter_25_division_by_zero() {
        let (output, error) = run_err("print 1;\nprint 1 / 0;\nprint 2;");

        assert_eq!(output, "1\n");
        assert_eq!(error.exit_code(), 70);
        assert_eq!(error.to_string(), "Division by 0 not allowed.\n[line 2]");
    }

    #[test]
    fn test_interpreter_26_operand_type_errors() {
        assert_eq!(
            runtime_message("print nil + 1;"),
            "'+' operator only supports number and/or string types.\n[line 1]"
        );
        assert_eq!(
            runtime_message("print \"a\" - 1;"),
            "Operands must be numbers.\n[line 1]"
        );
        assert_eq!(
            runtime_message("print -\"a\";"),
            "Operand must be a number.\n[line 1]"
        );
        assert_eq!(
            runtime_message("print 1 == \"1\";"),
            "Operands must be matching truthy types.\n[line 1]"
        );
    }

    #[test]
    fn test_interpreter_27_variable_errors() {
        assert_eq!(
            runtime_message("print missing;"),
            "Undefined variable 'missing'.\n[line 1]"
        );
        assert_eq!(
            runtime_message("var x; print x;"),
            "Uninitialized variable 'x'.\n[line 1]"
        );
        assert_eq!(run("var y = nil; print y;"), "nil\n");
    }

    #[test]
    fn test_interpreter_28_call_errors() {
        assert_eq!(
            runtime_message("fun f(a) {} f();"),
            "Expected 1 arguments but got 0.\n[line 1]"
        );
        assert_eq!(
            runtime_message("\"not callable\"();"),
            "Can only call functions and classes.\n[line 1]"
        );
    }

    #[test]
    fn test_interpreter_29_static_errors_exit_65() {
        let (output, error) = run_err("print 1;\n{ var a = 1; var a = 2; print a; }");

        // Nothing runs when a static error is found.
        assert_eq!(output, "");
        assert_eq!(error.exit_code(), 65);
        assert_eq!(
            error.to_string(),
            "[line 2] Error at 'a': Already declared a variable with this name in this scope."
        );
    }

    #[test]
    fn test_interpreter_30_lex_and_parse_errors_are_reported_together() {
        let (_, error) = run_err("var a = @;\nprint;");

        let messages: Vec<String> = error.errors().iter().map(|e| e.to_string()).collect();

        assert_eq!(messages[0], "[line 1] Error: Unexpected character: @");
        assert!(messages.len() >= 2);
        assert_eq!(error.exit_code(), 65);
    }

    // ──────────────────────────── sessions ────────────────────────────

    #[test]
    fn test_interpreter_31_globals_persist_between_runs() {
        let (mut session, out) = session_with_input("");

        session.run("var a = 1;").expect("first run");
        session.run("fun inc() { a = a + 1; }").expect("second run");
        session.run("inc(); print a;").expect("third run");

        assert_eq!(out.contents(), "2\n");
    }

    #[test]
    fn test_interpreter_32_evaluate_returns_values() {
        let (mut session, _) = session_with_input("");

        session.run("var x = 10;").expect("runs");
        let values = session.evaluate("x * 2; \"s\"").expect("evaluates");

        assert_eq!(values, vec![Value::Number(20.0), Value::String("s".into())]);
        assert_eq!(values[1].repr(), "'s'");
    }

    #[test]
    fn test_interpreter_38_closures_keep_their_locals_across_runs() {
        let (mut session, out) = session_with_input("");

        session
            .run(
                "fun counter() {
                    var n = 0;
                    return fun () { n = n + 1; return n; };
                }
                var next = counter();",
            )
            .expect("first run");
        session.run("next(); print next();").expect("second run");

        assert_eq!(out.contents(), "2\n");
    }

    #[test]
    fn test_interpreter_33_registered_objects_are_counted() {
        let (mut session, _) = session_with_input("");

        session
            .run("fun f() {} class A {} var a = A();")
            .expect("runs");

        // The global frame captured by `f`, the class and the instance.
        assert_eq!(session.interpreter().live_objects(), 3);
    }

    /// Run `setup`, evaluate `name`, and report whether that value outlives
    /// the session.
    fn survives_session(setup: &str, name: &str) -> bool {
        let (mut session, _) = session_with_input("");
        session.run(setup).expect("runs");

        let mut values = session.evaluate(name).expect("evaluates");
        let value = values.pop().expect("one value");

        let alive: Box<dyn Fn() -> bool> = match value {
            Value::Instance(instance) => {
                let weak = Rc::downgrade(&instance);
                Box::new(move || weak.upgrade().is_some())
            }
            Value::Function(function) => {
                let weak = Rc::downgrade(&function);
                Box::new(move || weak.upgrade().is_some())
            }
            Value::Class(class) => {
                let weak = Rc::downgrade(&class);
                Box::new(move || weak.upgrade().is_some())
            }
            other => panic!("expected a reference value, got {:?}", other),
        };

        drop(values);
        drop(session);

        alive()
    }

    #[test]
    fn test_interpreter_34_instance_holding_its_bound_method_is_freed() {
        let setup = "class A { m() {} } var a = A(); a.f = a.m;";

        assert!(!survives_session(setup, "a"));
    }

    #[test]
    fn test_interpreter_35_closure_over_its_own_frame_is_freed() {
        let setup = "class A {} var a = A(); fun f() { return a; } a.f = f;";

        assert!(!survives_session(setup, "f"));
        assert!(!survives_session(setup, "a"));
    }

    #[test]
    fn test_interpreter_36_class_holding_itself_is_freed() {
        assert!(!survives_session("class A {} A.self = A;", "A"));
    }
}
