#[cfg(test)]
mod scanner_tests {
    use rox::error::{LoxError, Result};
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(|r| r.ok()).collect();

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn assert_token_matches(result: &Result<Token>, expected_type: TokenType, expected_lexeme: &str) {
        match result {
            Ok(token) => {
                assert_eq!(
                    token.token_type, expected_type,
                    "Expected token type {:?}, got {:?}",
                    expected_type, token.token_type
                );
                assert_eq!(
                    token.lexeme, expected_lexeme,
                    "Expected lexeme '{}', got '{}'",
                    expected_lexeme, token.lexeme
                );
            }
            Err(e) => panic!("Expected token but got error: {}", e),
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_compound_operators() {
        assert_token_sequence(
            "** ++ -- << >> <= >= == != & | ^ ~ % ? : [ ]",
            &[
                (TokenType::STAR_STAR, "**"),
                (TokenType::PLUS_PLUS, "++"),
                (TokenType::MINUS_MINUS, "--"),
                (TokenType::BITSHIFT_LEFT, "<<"),
                (TokenType::BITSHIFT_RIGHT, ">>"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::BITWISE_AND, "&"),
                (TokenType::BITWISE_OR, "|"),
                (TokenType::BITWISE_XOR, "^"),
                (TokenType::BITWISE_NOT, "~"),
                (TokenType::MODULO, "%"),
                (TokenType::QUESTION_MARK, "?"),
                (TokenType::COLON, ":"),
                (TokenType::LEFT_BRACK, "["),
                (TokenType::RIGHT_BRACK, "]"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class Foo extends Bar { break continue } fun_ var",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::EXTENDS, "extends"),
                (TokenType::IDENTIFIER, "Bar"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::BREAK, "break"),
                (TokenType::CONTINUE, "continue"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::IDENTIFIER, "fun_"),
                (TokenType::VAR, "var"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_numbers() {
        let (tokens, errors) = tokenize(b"12 3.25 7.");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].token_type, TokenType::NUMBER(0.0));
        assert_eq!(tokens[0].literal(), Some(Literal::Number(12.0)));
        assert_eq!(tokens[1].literal(), Some(Literal::Number(3.25)));

        // A trailing dot is not part of the number.
        assert_eq!(tokens[2].lexeme, "7");
        assert_eq!(tokens[3].token_type, TokenType::DOT);
    }

    #[test]
    fn test_scanner_05_token_display() {
        let (tokens, _) = tokenize(b"42 \"hi\" x");

        assert_eq!(tokens[0].to_string(), "NUMBER 42 42.0");
        assert_eq!(tokens[1].to_string(), "STRING \"hi\" hi");
        assert_eq!(tokens[2].to_string(), "IDENTIFIER x null");
        assert_eq!(tokens[3].to_string(), "EOF  null");
    }

    #[test]
    fn test_scanner_06_comments() {
        let source = "// line comment\n/* block /* nested */ still comment */ a\n";

        let (tokens, errors) = tokenize(source.as_bytes());

        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "a");
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_scanner_07_comment_only_source() {
        let (tokens, errors) = tokenize(b"// nothing here");

        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_08_unterminated_comment() {
        let (tokens, errors) = tokenize(b"a /* never\nclosed");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unterminated multi-line comment."));
        assert_eq!(tokens.last().map(|t| t.token_type.clone()), Some(TokenType::EOF));
    }

    #[test]
    fn test_scanner_09_unterminated_string_reports_opening_line() {
        let source = "var a;\nvar b;\nvar c;\nvar s = \"open\nstill open\n";

        let (tokens, errors) = tokenize(source.as_bytes());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line(), Some(4));
        assert_eq!(
            errors[0].to_string(),
            "[line 4] Error: Unterminated string."
        );
        // Scanning still reaches the end of input.
        assert_eq!(tokens.last().map(|t| t.token_type.clone()), Some(TokenType::EOF));
    }

    #[test]
    fn test_scanner_10_multiline_string_counts_lines() {
        let (tokens, errors) = tokenize(b"\"a\nb\" c");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal(), Some(Literal::Str("a\nb".to_string())));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source.as_bytes());

        let results: Vec<_> = scanner.collect();

        // 0: COMMA, 1: DOT, 2: error '$', 3: LEFT_PAREN, 4: error '#', 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<&LoxError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(errors.len(), 2, "Expected 2 error messages");

        assert_eq!(errors[0].to_string(), "[line 1] Error: Unexpected character: $");
        assert_eq!(errors[1].to_string(), "[line 1] Error: Unexpected character: #");
    }

    #[test]
    fn test_scanner_is_fused() {
        let mut scanner = Scanner::new(b"");

        assert!(matches!(scanner.next(), Some(Ok(t)) if t.token_type == TokenType::EOF));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
