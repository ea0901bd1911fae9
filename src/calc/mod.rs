//! A small declaration language built on the construction layer.
//!
//! ```text
//! int width := 4 + 2;
//! real scale;
//! ```
//!
//! Each rule that yields a node is bound in [`bindings`]; `expr` is folded
//! to the left so `1 + 2 - 3` reads as `(1 + 2) - 3`.

use pest_derive::Parser;

use crate::ast::{BuildContext, List, NodeHeader, Opt, Ptr};
use crate::config::ParseConfig;
use crate::driver::AstParser;
use crate::errors::AstError;
use crate::registry::RuleBindings;
use crate::syntax::{ErrorList, PestEngine};
use crate::{abstract_class, impl_node};

#[derive(Parser)]
#[grammar = "calc/calc.pest"]
pub struct CalcParser;

/// Parser over the calc grammar with every node rule bound.
pub type CalcAstParser = AstParser<PestEngine<CalcParser, Rule>, RuleBindings<Rule>>;

// ============================================================================
// NODES
// ============================================================================

abstract_class!(
    /// Anything that evaluates to a number.
    pub Expr
);

/// A whole source file.
#[derive(Debug, Default)]
pub struct Program {
    header: NodeHeader,
    pub decls: List<Decl>,
}

impl_node!(Program { decls });

/// `type name (:= init)? ;`
#[derive(Debug, Default)]
pub struct Decl {
    header: NodeHeader,
    pub ty: Ptr<TypeName>,
    pub name: Ptr<Name>,
    pub init: Opt<Expr>,
}

impl_node!(Decl { ty, name, init });

#[derive(Debug, Clone, Default)]
pub struct TypeName {
    header: NodeHeader,
    pub name: String,
}

impl TypeName {
    fn read(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        self.name = cx.text().to_string();
        Ok(())
    }
}

impl_node!(TypeName, construct = TypeName::read, label = |t: &TypeName| t.name.clone());

/// The declared identifier.
#[derive(Debug, Clone, Default)]
pub struct Name {
    header: NodeHeader,
    pub ident: String,
}

impl Name {
    fn read(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        self.ident = cx.text().to_string();
        Ok(())
    }
}

impl_node!(Name, construct = Name::read, label = |n: &Name| n.ident.clone());

/// A reference to a declared identifier inside an expression.
#[derive(Debug, Clone, Default)]
pub struct Var {
    header: NodeHeader,
    pub ident: String,
}

impl Var {
    fn read(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        self.ident = cx.text().to_string();
        Ok(())
    }
}

impl_node!(Var: Expr, construct = Var::read, label = |v: &Var| v.ident.clone());

#[derive(Debug, Clone, Default)]
pub struct Num {
    header: NodeHeader,
    pub value: i64,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddOp {
    header: NodeHeader,
    pub sign: Sign,
}

impl AddOp {
    fn read(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        self.sign = match cx.text() {
            "+" => Sign::Plus,
            "-" => Sign::Minus,
            other => {
                return Err(AstError::invalid_leaf(
                    "AddOp",
                    other,
                    "not an additive operator",
                    cx.span(),
                ))
            }
        };
        Ok(())
    }
}

impl_node!(AddOp, construct = AddOp::read, label = |op: &AddOp| op.sign.as_str().to_string());

/// `lhs op rhs`, built by folding an `expr` match to the left.
#[derive(Debug, Default)]
pub struct BinaryOp {
    header: NodeHeader,
    pub lhs: Ptr<Expr>,
    pub op: Ptr<AddOp>,
    pub rhs: Ptr<Expr>,
}

impl_node!(BinaryOp: Expr { lhs, op, rhs });

// ============================================================================
// BINDINGS
// ============================================================================

/// Rule bindings for the calc grammar.
pub fn bindings() -> RuleBindings<Rule> {
    let mut bindings = RuleBindings::new();
    bindings.bind::<Program>(Rule::program);
    bindings.bind::<Decl>(Rule::decl);
    bindings.bind::<TypeName>(Rule::type_name);
    bindings.bind::<Name>(Rule::name);
    bindings.bind::<Var>(Rule::var);
    bindings.bind::<Num>(Rule::num);
    bindings.bind::<AddOp>(Rule::add_op);
    bindings.bind_left_fold::<BinaryOp>(Rule::expr);
    bindings
}

/// A ready parser; whitespace matches build nothing.
pub fn parser(config: ParseConfig) -> CalcAstParser {
    AstParser::new(PestEngine::new(), bindings())
        .with_whitespace(Rule::WHITESPACE)
        .with_config(config)
}

/// Parses a whole program.
pub fn parse_program(
    input: &str,
    config: ParseConfig,
    errors: &mut ErrorList,
) -> Result<Option<Box<Program>>, AstError> {
    parser(config).parse_as::<Program>(input, Rule::program, errors)
}

/// Parses a single expression.
pub fn parse_expr(
    input: &str,
    config: ParseConfig,
    errors: &mut ErrorList,
) -> Result<Option<Box<dyn crate::ast::Node>>, AstError> {
    parser(config).parse_as::<Expr>(input, Rule::expression, errors)
}
