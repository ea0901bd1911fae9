// tests/construction_tests.rs

use pegast::ast::{BuildContext, List, Node, NodeHeader, Opt, Ptr, TreeDump};
use pegast::syntax::{ErrorList, PestEngine};
use pegast::{
    abstract_class, impl_node, parse, parse_as, AstError, AstParser, ErrorCategory, ParseConfig,
    RuleBindings,
};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar_inline = r#"
WHITESPACE = { " " }

expr_root = { SOI ~ expr ~ EOI }
expr      = { num ~ (add_op ~ num)* }
num       = @{ ASCII_DIGIT+ }
add_op    = { "+" | "-" }

decls     = { SOI ~ decl* ~ EOI }
decl      = { type_name ~ name ~ (":=" ~ expr)? }
type_name = @{ ("int" | "real") ~ !ASCII_ALPHANUMERIC }
name      = @{ !type_name ~ ASCII_ALPHA+ }

seq       = { SOI ~ num ~ triple ~ EOI }
triple    = { num ~ num ~ num }

one       = { SOI ~ num ~ EOI }
two       = { SOI ~ num ~ num ~ EOI }
num_op    = { SOI ~ num ~ add_op ~ EOI }
"#]
struct TestParser;

// ---
// Node declarations
// ---

abstract_class!(Expr);

#[derive(Debug, Clone, Default)]
struct Num {
    header: NodeHeader,
    value: i64,
}

impl Num {
    fn read(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        let text = cx.text();
        self.value = text
            .parse()
            .map_err(|e| AstError::invalid_leaf("Num", text, e, cx.span()))?;
        Ok(())
    }
}

impl_node!(Num: Expr, construct = Num::read, label = |n: &Num| n.value.to_string());

#[derive(Debug, Clone, Default)]
struct AddOp {
    header: NodeHeader,
    symbol: String,
}

impl AddOp {
    fn read(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        self.symbol = cx.text().to_string();
        Ok(())
    }
}

impl_node!(AddOp, construct = AddOp::read, label = |op: &AddOp| op.symbol.clone());

#[derive(Debug, Default)]
struct BinaryOp {
    header: NodeHeader,
    lhs: Ptr<Expr>,
    op: Ptr<AddOp>,
    rhs: Ptr<Expr>,
}

impl_node!(BinaryOp: Expr { lhs, op, rhs });

#[derive(Debug, Clone, Default)]
struct TypeName {
    header: NodeHeader,
    text: String,
}

impl TypeName {
    fn read(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        self.text = cx.text().to_string();
        Ok(())
    }
}

impl_node!(TypeName, construct = TypeName::read, label = |t: &TypeName| t.text.clone());

#[derive(Debug, Clone, Default)]
struct Name {
    header: NodeHeader,
    text: String,
}

impl Name {
    fn read(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        self.text = cx.text().to_string();
        Ok(())
    }
}

impl_node!(Name, construct = Name::read, label = |n: &Name| n.text.clone());

#[derive(Debug, Default)]
struct Decl {
    header: NodeHeader,
    ty: Ptr<TypeName>,
    name: Ptr<Name>,
    init: Opt<Expr>,
}

impl_node!(Decl { ty, name, init });

#[derive(Debug, Default)]
struct Decls {
    header: NodeHeader,
    items: List<Decl>,
}

impl_node!(Decls { items });

#[derive(Debug, Default)]
struct Triple {
    header: NodeHeader,
    a: Ptr<Num>,
    b: Ptr<Num>,
    c: Ptr<Num>,
}

impl_node!(Triple { a, b, c });

#[derive(Debug, Default)]
struct Seq {
    header: NodeHeader,
    head: Ptr<Num>,
    triple: Ptr<Triple>,
}

impl_node!(Seq { head, triple });

#[derive(Debug, Default)]
struct NumPair {
    header: NodeHeader,
    first: Ptr<Num>,
    second: Ptr<Num>,
}

impl_node!(NumPair { first, second });

// ---
// Helpers
// ---

fn bindings() -> RuleBindings<Rule> {
    let mut bindings = RuleBindings::new();
    bindings.bind::<Num>(Rule::num);
    bindings.bind::<AddOp>(Rule::add_op);
    bindings.bind_left_fold::<BinaryOp>(Rule::expr);
    bindings.bind::<TypeName>(Rule::type_name);
    bindings.bind::<Name>(Rule::name);
    bindings.bind::<Decl>(Rule::decl);
    bindings.bind::<Decls>(Rule::decls);
    bindings.bind::<Triple>(Rule::triple);
    bindings.bind::<Seq>(Rule::seq);
    bindings
}

fn parse_root(input: &str, rule: Rule) -> Result<Option<Box<dyn Node>>, AstError> {
    let mut errors = ErrorList::new();
    parse::<TestParser, _, _>(input, rule, Some(Rule::WHITESPACE), &mut errors, &bindings())
}

fn sexpr(node: &dyn Node) -> String {
    TreeDump::of(node).sexpr()
}

fn num_value(node: Option<&dyn Node>) -> Option<i64> {
    node.and_then(|n| n.get_as::<Num>()).map(|n| n.value)
}

// ---
// End-to-end construction
// ---

#[test]
fn test_left_fold_of_additive_expression() {
    let root = parse_root("1+2-3", Rule::expr_root).unwrap().unwrap();
    assert_eq!(
        sexpr(root.as_ref()),
        "(BinaryOp (BinaryOp (Num 1) (AddOp +) (Num 2)) (AddOp -) (Num 3))"
    );
    let outer = root.get_as::<BinaryOp>().unwrap();
    let inner = outer.lhs.get().unwrap();
    assert_eq!(inner.parent(), Some(outer.id()));
    assert_eq!(num_value(outer.rhs.get()), Some(3));
}

#[test]
fn test_single_operand_is_not_wrapped() {
    let root = parse_root("42", Rule::expr_root).unwrap().unwrap();
    assert_eq!(sexpr(root.as_ref()), "(Num 42)");
}

#[test]
fn test_declaration_without_initializer_keeps_sibling_intact() {
    let mut errors = ErrorList::new();
    let decls = parse_as::<Decls, TestParser, _, _>(
        "int x real y := 1+2",
        Rule::decls,
        Some(Rule::WHITESPACE),
        &mut errors,
        &bindings(),
    )
    .unwrap()
    .unwrap();
    assert_eq!(decls.items.len(), 2);
    assert!((decls.as_ref() as &dyn Node).isa::<pegast::ast::AstContainer>());

    let first = decls.items.first().unwrap();
    assert!(first.init.is_none());
    assert_eq!(first.ty.get().map(|t| t.text.as_str()), Some("int"));
    assert_eq!(first.name.get().map(|n| n.text.as_str()), Some("x"));

    let second = decls.items.last().unwrap();
    assert_eq!(second.ty.get().map(|t| t.text.as_str()), Some("real"));
    assert_eq!(second.name.get().map(|n| n.text.as_str()), Some("y"));
    let init = second.init.get().unwrap();
    assert!(init.isa::<BinaryOp>());
    assert!(init.isa::<Expr>());
    assert_eq!(
        sexpr(second),
        "(Decl (TypeName real) (Name y) (BinaryOp (Num 1) (AddOp +) (Num 2)))"
    );
}

#[test]
fn test_container_consumes_exactly_its_children() {
    let root = parse_root("7 1 2 3", Rule::seq).unwrap().unwrap();
    let seq = root.get_as::<Seq>().unwrap();
    assert_eq!(seq.head.get().map(|n| n.value), Some(7));
    let triple = seq.triple.get().unwrap();
    let values: Vec<_> = [&triple.a, &triple.b, &triple.c]
        .iter()
        .map(|slot| slot.get().map(|n| n.value))
        .collect();
    assert_eq!(values, [Some(1), Some(2), Some(3)]);
}

#[test]
fn test_isa_matches_own_kind_and_ancestors_only() {
    let root = parse_root("1+2", Rule::expr_root).unwrap().unwrap();
    assert!(root.isa::<BinaryOp>());
    assert!(root.isa::<Expr>());
    assert!(root.isa::<pegast::ast::AstNode>());
    assert!(!root.isa::<Num>());
    let op = root.get_as::<BinaryOp>().and_then(|b| b.op.get()).unwrap();
    assert!(!(op as &dyn Node).isa::<Expr>());
}

#[test]
fn test_grammar_mismatch_yields_diagnostics_not_errors() {
    let mut errors = ErrorList::new();
    let root = parse::<TestParser, _, _>(
        "1+",
        Rule::expr_root,
        Some(Rule::WHITESPACE),
        &mut errors,
        &bindings(),
    )
    .unwrap();
    assert!(root.is_none());
    assert_eq!(errors.len(), 1);
}

// ---
// Fault policies
// ---

fn pair_parser(config: ParseConfig) -> AstParser<PestEngine<TestParser, Rule>, RuleBindings<Rule>> {
    let mut bindings = bindings();
    bindings.bind::<NumPair>(Rule::one);
    bindings.bind::<NumPair>(Rule::num_op);
    AstParser::new(PestEngine::new(), bindings)
        .with_whitespace(Rule::WHITESPACE)
        .with_config(config)
}

#[test]
fn test_strict_missing_member_is_an_error() {
    let mut errors = ErrorList::new();
    let err = pair_parser(ParseConfig::strict())
        .parse("5", Rule::one, &mut errors)
        .unwrap_err();
    assert!(matches!(err, AstError::MissingNode { expected: "Num", .. }));
    assert_eq!(err.category(), ErrorCategory::ConstructionShape);
}

#[test]
fn test_lenient_missing_member_stays_empty() {
    let mut errors = ErrorList::new();
    let pair = pair_parser(ParseConfig::lenient())
        .parse_as::<NumPair>("5", Rule::one, &mut errors)
        .unwrap()
        .unwrap();
    assert!(pair.first.is_none());
    assert_eq!(pair.second.get().map(|n| n.value), Some(5));
}

#[test]
fn test_strict_wrong_kind_is_a_type_mismatch() {
    let mut errors = ErrorList::new();
    let err = pair_parser(ParseConfig::strict())
        .parse("5 +", Rule::num_op, &mut errors)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeMismatch);
    assert!(matches!(
        err,
        AstError::TypeMismatch {
            expected: "Num",
            found: "AddOp",
            ..
        }
    ));
}

#[test]
fn test_lenient_wrong_kind_is_discarded() {
    let mut errors = ErrorList::new();
    let pair = pair_parser(ParseConfig::lenient())
        .parse_as::<NumPair>("5 +", Rule::num_op, &mut errors)
        .unwrap()
        .unwrap();
    assert_eq!(pair.first.get().map(|n| n.value), Some(5));
    assert!(pair.second.is_none());
    assert_eq!(pair.children().len(), 1);
}

#[test]
fn test_final_stack_depth_policies() {
    let mut errors = ErrorList::new();
    let err = pair_parser(ParseConfig::strict())
        .parse("1 2", Rule::two, &mut errors)
        .unwrap_err();
    assert_eq!(err, AstError::StackDepth { depth: 2 });

    let top = pair_parser(ParseConfig::lenient())
        .parse("1 2", Rule::two, &mut errors)
        .unwrap()
        .unwrap();
    assert_eq!(num_value(Some(top.as_ref())), Some(2));
}

#[test]
fn test_typed_parse_rejects_other_roots() {
    let mut errors = ErrorList::new();
    let err = pair_parser(ParseConfig::strict())
        .parse_as::<Decls>("1+2", Rule::expr_root, &mut errors)
        .unwrap_err();
    assert_eq!(
        err,
        AstError::RootMismatch {
            expected: "Decls",
            found: "BinaryOp"
        }
    );
}

// ---
// Independent parses
// ---

#[test]
fn test_parses_share_bindings_across_threads() {
    let bindings = bindings();
    let inputs = ["1+2", "3-4+5", "6", "7+8+9-10"];
    let dumps: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let bindings = &bindings;
                scope.spawn(move || {
                    let mut errors = ErrorList::new();
                    let root = parse::<TestParser, _, _>(
                        input,
                        Rule::expr_root,
                        Some(Rule::WHITESPACE),
                        &mut errors,
                        bindings,
                    )
                    .unwrap()
                    .unwrap();
                    sexpr(root.as_ref())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(dumps[2], "(Num 6)");
    assert!(dumps[3].starts_with("(BinaryOp (BinaryOp (BinaryOp (Num 7)"));
}
