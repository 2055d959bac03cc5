// End-to-end runs of the reference grammar through the pipeline.

use std::sync::Arc;

use wickit::{compile_unit, parse_as, tokenize, Ast, Construct, FrontendConfig, Sentinel, SourceTable, Syntax};

fn table(src: &str) -> Arc<SourceTable> {
    Arc::new(SourceTable::from_text("unit.wckt", src))
}

fn compile(src: &str) -> (Option<Ast<Construct>>, Vec<String>) {
    let mut sentinel = Sentinel::collecting();
    let ast = compile_unit(&table(src), &FrontendConfig::default(), &mut sentinel).unwrap();
    let messages = sentinel.diagnostics().iter().map(|d| d.message().to_string()).collect();
    (ast, messages)
}

fn expression(src: &str) -> String {
    let mut sentinel = Sentinel::collecting();
    let ast = parse_as(&table(src), Construct::Expression, &FrontendConfig::default(), &mut sentinel)
        .unwrap()
        .unwrap();
    assert!(sentinel.is_empty(), "{:?}", sentinel.diagnostics());
    ast.sexp(ast.root())
}

#[test]
fn missing_type_is_reported_once_and_the_namespace_survives() {
    let (ast, messages) = compile("namespace A { type X as ; }");
    assert_eq!(messages, ["expected type-expression instead of ';'"]);

    let ast = ast.unwrap();
    let namespace = ast.find("namespace-declaration").unwrap();
    let children: Vec<&str> = ast
        .children(namespace)
        .iter()
        .map(|child| ast.rule_name(*child))
        .collect();
    assert_eq!(children, ["identifier", "type-declaration"]);
}

#[test]
fn missing_type_diagnostic_points_at_the_semicolon() {
    let mut sentinel = Sentinel::collecting();
    compile_unit(&table("namespace A { type X as ; }"), &FrontendConfig::default(), &mut sentinel).unwrap();
    let diagnostic = &sentinel.diagnostics()[0];
    let coords = diagnostic.coords().unwrap();
    assert_eq!((coords.row, coords.col), (1, 25));
    assert_eq!(diagnostic.context(), ["while parsing type-declaration"]);
}

#[test]
fn simple_declarations_build_the_expected_tree() {
    let (ast, messages) = compile("type X as int;");
    assert!(messages.is_empty(), "{messages:?}");
    let ast = ast.unwrap();
    assert_eq!(
        ast.sexp(ast.root()),
        "(compilation-unit (type-declaration (identifier X) \
         (type (type-reference (static-symbol (identifier int))))))"
    );
}

#[test]
fn unterminated_string_yields_one_lexical_diagnostic() {
    let (tokens, diagnostics) = tokenize(&table("\"abc"));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message(), "unterminated string literal");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "\"abc\"");
}

#[test]
fn whitespace_and_comments_only() {
    let src = "  // nothing here\n\t/* or\n here */  \n";
    let (tokens, diagnostics) = tokenize(&table(src));
    assert!(tokens.is_empty());
    assert!(diagnostics.is_empty());

    let (ast, messages) = compile(src);
    assert!(messages.is_empty(), "{messages:?}");
    let ast = ast.unwrap();
    assert_eq!(ast.sexp(ast.root()), "(compilation-unit)");
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(
        expression("a + b * c"),
        "(expression (binary-operator + (identifier a) \
         (binary-operator * (identifier b) (identifier c))))"
    );
}

#[test]
fn binary_operators_associate_left() {
    assert_eq!(
        expression("a - b - c"),
        "(expression (binary-operator - \
         (binary-operator - (identifier a) (identifier b)) (identifier c)))"
    );
}

#[test]
fn assignment_associates_right() {
    assert_eq!(
        expression("a = b += c"),
        "(expression (assignment = (identifier a) \
         (assignment += (identifier b) (identifier c))))"
    );
}

#[test]
fn unary_and_access_operators_nest_around_their_operand() {
    assert_eq!(
        expression("-x.y++"),
        "(expression (prefix-operator - (postfix-operator ++ \
         (member-access (identifier x) (identifier y)))))"
    );
}

#[test]
fn bitwise_layers_keep_their_own_operators() {
    assert_eq!(
        expression("a | b ^ c & d"),
        "(expression (binary-operator | (identifier a) \
         (binary-operator ^ (identifier b) \
         (binary-operator & (identifier c) (identifier d)))))"
    );
}

#[test]
fn nested_generics_close_on_a_single_shift_token() {
    let (ast, messages) = compile("type M as Map<K, List<V>>;");
    assert!(messages.is_empty(), "{messages:?}");
    let ast = ast.unwrap();
    assert_eq!(ast.find_all("generic-type-specifier").len(), 2);
}

#[test]
fn function_types_and_parenthesised_types() {
    let (ast, messages) = compile("type F as (int, bool) -> void;\ntype P as (int)[];");
    assert!(messages.is_empty(), "{messages:?}");
    let ast = ast.unwrap();
    assert_eq!(ast.find_all("function-type").len(), 1);
    assert_eq!(ast.find_all("function-type-parameters").len(), 1);
    assert_eq!(ast.find_all("array-postfix").len(), 1);
}

#[test]
fn missing_semicolon_at_line_end_is_inserted() {
    let (ast, messages) = compile("type X as int\ntype Y as bool;");
    assert_eq!(messages, ["expected ';' after 'int'"]);
    assert_eq!(ast.unwrap().find_all("type-declaration").len(), 2);
}

#[test]
fn imports_and_properties() {
    let (ast, messages) = compile("import a.b.*;\nimport c;\ncount: int = 1 + 2;");
    assert!(messages.is_empty(), "{messages:?}");
    let ast = ast.unwrap();
    let imports = ast.find_all("import-declaration");
    assert_eq!(imports.len(), 2);
    assert_eq!(ast.node(imports[0]).syntax.detail().as_deref(), Some("wildcard"));
    assert!(ast.find("property-declaration").is_some());
}

#[test]
fn a_broken_declaration_does_not_hide_the_next_one() {
    let (ast, messages) = compile("type A as (int;\ntype B as bool;");
    assert_eq!(messages.len(), 1, "{messages:?}");
    assert_eq!(ast.unwrap().find_all("type-declaration").len(), 2);
}

#[test]
fn a_missing_semicolon_inside_a_contract_is_reported() {
    for src in [
        "type X as contract { a: int\n b: int; };",
        "type X as (contract { a: int\n b: int; });",
        "x: contract { a: int\n b: int; };",
    ] {
        let (ast, messages) = compile(src);
        assert_eq!(messages, ["expected ';' after 'int'"], "{src}");
        assert!(ast.unwrap().find("contract-type").is_some(), "{src}");
    }
}

#[test]
fn deeply_nested_types_parse_in_one_pass() {
    let depth = 24;
    let parens = format!("type X as {}int{};", "(".repeat(depth), ")".repeat(depth));
    let (ast, messages) = compile(&parens);
    assert!(messages.is_empty(), "{messages:?}");
    assert_eq!(ast.unwrap().find_all("type-reference").len(), 1);

    let generics = format!("type Y as {}int{};", "A<".repeat(depth), "> ".repeat(depth));
    let (ast, messages) = compile(&generics);
    assert!(messages.is_empty(), "{messages:?}");
    assert_eq!(ast.unwrap().find_all("generic-type-specifier").len(), depth);
}

#[test]
fn single_parameter_function_types() {
    let (ast, messages) = compile("type F as int[] -> bool;\ntype G as (int) -> void;");
    assert!(messages.is_empty(), "{messages:?}");
    let ast = ast.unwrap();
    let functions = ast.find_all("function-type");
    assert_eq!(functions.len(), 2);
    let first: Vec<&str> = ast
        .children(functions[0])
        .iter()
        .map(|child| ast.rule_name(*child))
        .collect();
    assert_eq!(first, ["function-type-parameters", "type-reference"]);
    let parameters = ast.children(functions[0])[0];
    assert_eq!(ast.rule_name(ast.children(parameters)[0]), "array-postfix");
}

#[test]
fn unbalanced_brackets_do_not_swallow_the_next_declaration() {
    let (ast, messages) = compile("x: int = 1 2 (3 ;\ntype Y as int;");
    assert_eq!(messages, ["expected ';' instead of '2'"]);
    assert_eq!(ast.unwrap().find_all("type-declaration").len(), 1);
}

#[test]
fn recovery_that_runs_out_of_input_reports_nothing_more() {
    let (ast, messages) = compile("x: int = 1 2 (3 ;");
    assert_eq!(messages, ["expected ';' instead of '2'"]);
    assert!(ast.unwrap().find("property-declaration").is_some());

    let (_, messages) = compile("import a b c");
    assert_eq!(messages, ["expected ';' instead of 'b'"]);
}
