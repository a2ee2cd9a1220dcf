//! End-to-end scenarios: built-in rules run through the dispatcher and
//! rendered by the reporter.

use hdl_lint_core::{
    ArenaTree, CompilationUnit, Design, Diagnostic, Dispatcher, FileId, LintResult, NodeKind,
    NodeSpec, Reporter, Rule, RuleFault, UnitStatus,
};
use hdl_lint_rules::{all_rules, ImplicitDataType, PrototypeReturnDataType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Files(Vec<&'static str>);

impl Design for Files {
    fn compilation_units(&self) -> Vec<CompilationUnit<'_>> {
        Vec::new()
    }

    fn resolve_path(&self, file: FileId) -> Option<&str> {
        self.0.get(file.index() as usize).copied()
    }
}

/// `module top; <decl> endmodule` where `<decl>` is `[3:0] foo;` and
/// `typed` adds `logic`.
fn declaration_unit(typed: bool) -> NodeSpec {
    let mut decl = NodeSpec::new(NodeKind::DataDeclaration, 2);
    if typed {
        decl = decl.child(
            NodeSpec::new(NodeKind::DataType, 2)
                .child(NodeSpec::new(NodeKind::IntegerVectorType, 2)),
        );
    }
    let decl = decl.children([
        NodeSpec::new(NodeKind::PackedDimension, 2)
            .child(NodeSpec::new(NodeKind::ConstantRange, 2)),
        NodeSpec::new(NodeKind::ListOfVariableDeclAssignments, 2).child(
            NodeSpec::new(NodeKind::VariableDeclAssignment, 2).child(NodeSpec::ident("foo", 2)),
        ),
    ]);
    NodeSpec::new(NodeKind::SourceText, 1).child(
        NodeSpec::new(NodeKind::ModuleDeclaration, 1)
            .child(NodeSpec::ident("top", 1))
            .child(decl),
    )
}

/// `class c; extern function [void] foo(); endclass`
fn prototype_unit(typed: bool) -> NodeSpec {
    let mut ty = NodeSpec::new(NodeKind::FunctionDataTypeOrImplicit, 3);
    if typed {
        ty = ty.child(NodeSpec::new(NodeKind::FunctionDataType, 3));
    }
    NodeSpec::new(NodeKind::SourceText, 1).child(
        NodeSpec::new(NodeKind::ClassDeclaration, 2)
            .child(NodeSpec::ident("c", 2))
            .child(
                NodeSpec::new(NodeKind::ClassItem, 3).child(
                    NodeSpec::new(NodeKind::ClassMethod, 3).child(
                        NodeSpec::new(NodeKind::FunctionPrototype, 3).children([
                            ty,
                            NodeSpec::ident("foo", 3),
                            NodeSpec::new(NodeKind::TfPortList, 3),
                        ]),
                    ),
                ),
            ),
    )
}

fn build(root: &NodeSpec, file: u32) -> ArenaTree {
    ArenaTree::from_spec(root, FileId::new(file)).unwrap()
}

fn run_all(trees: &[(&str, &ArenaTree, UnitStatus)]) -> LintResult {
    let units: Vec<CompilationUnit<'_>> = trees
        .iter()
        .zip(0..)
        .map(|((name, tree, status), i)| CompilationUnit::new(name, FileId::new(i), *tree, status))
        .collect();
    let mut builder = Dispatcher::builder();
    for rule in all_rules() {
        builder = builder.rule_box(rule);
    }
    builder.build().unwrap().run(&units)
}

fn lines(result: &LintResult, design: &Files) -> String {
    result
        .diagnostics
        .iter()
        .map(|d| hdl_lint_core::render_line(d, design))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn implicit_vector_is_reported_at_dimension() {
    let tree = build(&declaration_unit(false), 0);
    let result = run_all(&[("top", &tree, UnitStatus::Valid)]);

    insta::assert_snapshot!(lines(&result, &Files(vec!["rtl/top.sv"])), @"Error IMPLICIT_DATA_TYPE_IN_DECLARATION: variable 'foo' declared without explicit type at rtl/top.sv:2");
}

#[test]
fn typed_vector_is_clean() {
    let tree = build(&declaration_unit(true), 0);
    let result = run_all(&[("top", &tree, UnitStatus::Valid)]);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn untyped_prototype_is_reported() {
    let tree = build(&prototype_unit(false), 0);
    let result = run_all(&[("c", &tree, UnitStatus::Valid)]);

    insta::assert_snapshot!(lines(&result, &Files(vec!["tb/c.sv"])), @"Error PROTOTYPE_RETURN_DATA_TYPE: Function prototype 'foo' missing return data type at tb/c.sv:3");
}

#[test]
fn void_prototype_is_clean() {
    let tree = build(&prototype_unit(true), 0);
    let result = run_all(&[("c", &tree, UnitStatus::Valid)]);
    assert!(result.by_rule("PROTOTYPE_RETURN_DATA_TYPE").is_empty());
}

#[test]
fn catalogue_order_holds_across_rules() {
    let covergroup = NodeSpec::new(NodeKind::CovergroupDeclaration, 3).child(
        NodeSpec::new(NodeKind::CoverPoint, 3).children([
            NodeSpec::ident("cp", 3),
            NodeSpec::new(NodeKind::Expression, 3).child(
                NodeSpec::new(NodeKind::IncOrDecExpression, 3).child(NodeSpec::ident("cnt", 3)),
            ),
        ]),
    );
    let dpi = NodeSpec::new(NodeKind::DpiImportExport, 4).children([
        NodeSpec::new(NodeKind::DpiSpecStringDpi, 4),
        NodeSpec::new(NodeKind::FunctionPrototype, 4).children([
            NodeSpec::new(NodeKind::FunctionDataTypeOrImplicit, 4)
                .child(NodeSpec::new(NodeKind::FunctionDataType, 4)),
            NodeSpec::ident("sv_add", 4),
        ]),
    ]);
    let sequence = NodeSpec::new(NodeKind::SequenceExpr, 5).children([
        NodeSpec::new(NodeKind::SequenceInstance, 5).child(NodeSpec::ident("s1", 5)),
        NodeSpec::new(NodeKind::GotoRepetition, 5),
    ]);
    let vif = NodeSpec::new(NodeKind::DataDeclaration, 6).child(
        NodeSpec::new(NodeKind::VirtualInterfaceType, 6).child(
            NodeSpec::new(NodeKind::HierarchicalIdentifier, 6)
                .children([NodeSpec::ident("top", 6), NodeSpec::ident("u_bus", 6)]),
        ),
    );
    let root = NodeSpec::new(NodeKind::SourceText, 1).child(
        NodeSpec::new(NodeKind::ModuleDeclaration, 1).children([covergroup, dpi, sequence, vif]),
    );
    let tree = build(&root, 0);
    let result = run_all(&[("chk", &tree, UnitStatus::Valid)]);

    assert_eq!(
        lines(&result, &Files(vec!["rtl/chk.sv"])),
        [
            "Error REPETITION_IN_SEQUENCE: goto repetition [->] applied to sequence 's1' at rtl/chk.sv:5",
            "Error HIERARCHICAL_INTERFACE_IDENTIFIER: interface 'top.u_bus' referenced through hierarchical identifier at rtl/chk.sv:6",
            "Error DPI_DECLARATION_STRING: DPI declaration 'sv_add' uses deprecated \"DPI\"; use \"DPI-C\" at rtl/chk.sv:4",
            "Error COVERGROUP_EXPRESSION: coverpoint 'cp' expression has side effects at rtl/chk.sv:3",
        ]
        .join("\n")
    );
}

#[test]
fn empty_unit_exits_zero() {
    let tree = build(&NodeSpec::new(NodeKind::SourceText, 1), 0);
    let result = run_all(&[("empty", &tree, UnitStatus::Valid)]);
    assert!(result.diagnostics.is_empty());
    assert_eq!(Reporter::new().exit_code(&result), 0);
}

/// Counts how often the wrapped rule is evaluated.
struct Counting {
    inner: ImplicitDataType,
    calls: Arc<AtomicUsize>,
}

impl Rule for Counting {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.evaluate(unit)
    }
}

#[test]
fn invalid_unit_is_skipped_without_invoking_rules() {
    let broken = build(&declaration_unit(false), 0);
    let good = build(&declaration_unit(false), 1);
    let broken_status = UnitStatus::Invalid {
        reason: "syntax error".to_string(),
    };
    let valid = UnitStatus::Valid;
    let units = [
        CompilationUnit::new("broken", FileId::new(0), &broken, &broken_status),
        CompilationUnit::new("good", FileId::new(1), &good, &valid),
    ];

    let calls = Arc::new(AtomicUsize::new(0));
    let result = Dispatcher::builder()
        .rule(Counting {
            inner: ImplicitDataType::new(),
            calls: Arc::clone(&calls),
        })
        .build()
        .unwrap()
        .run(&units);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].unit, "broken");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].location.file, FileId::new(1));
}

#[test]
fn registration_order_changes_interleaving_only() {
    let mut root = declaration_unit(false);
    root.children.append(&mut prototype_unit(false).children);
    let tree = build(&root, 0);
    let valid = UnitStatus::Valid;
    let units = [CompilationUnit::new("mixed", FileId::new(0), &tree, &valid)];

    let forward = Dispatcher::builder()
        .rule(ImplicitDataType::new())
        .rule(PrototypeReturnDataType::new())
        .build()
        .unwrap()
        .run(&units);
    let reverse = Dispatcher::builder()
        .rule(PrototypeReturnDataType::new())
        .rule(ImplicitDataType::new())
        .build()
        .unwrap()
        .run(&units);

    assert_eq!(forward.diagnostics.len(), 2);
    assert_eq!(forward.diagnostics[0], reverse.diagnostics[1]);
    assert_eq!(forward.diagnostics[1], reverse.diagnostics[0]);
}

#[test]
fn repeated_and_parallel_runs_agree() {
    let trees: Vec<ArenaTree> = (0..12)
        .map(|i| {
            if i % 2 == 0 {
                build(&declaration_unit(false), i)
            } else {
                build(&prototype_unit(false), i)
            }
        })
        .collect();
    let valid = UnitStatus::Valid;
    let units: Vec<CompilationUnit<'_>> = trees
        .iter()
        .zip(0..)
        .map(|(t, i)| CompilationUnit::new("u", FileId::new(i), t, &valid))
        .collect();

    let run = |workers| {
        let mut builder = Dispatcher::builder().parallelism(workers);
        for rule in all_rules() {
            builder = builder.rule_box(rule);
        }
        builder.build().unwrap().run(&units).diagnostics
    };

    let sequential = run(1);
    assert_eq!(sequential.len(), 12);
    assert_eq!(sequential, run(1));
    assert_eq!(sequential, run(6));
}
