//! Integration tests for the dispatch lifecycle.
//!
//! Every command in these trees records its `on_init`/`on_run` calls and the
//! hierarchy it was handed, so the tests can check ordering and shape from
//! the outside.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use vrachos::engine::{
    reconstruct, ArgumentHierarchy, Engine, EngineError, HierarchyReconstructionError,
    Initializable, InvocationChain, Phase, RunOutcome, Runnable,
};
use vrachos::schema::{CommandDefinition, FieldSpec, FieldValues, ValidationError};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Shared record of lifecycle events, in call order.
#[derive(Clone, Default)]
struct Journal {
    events: Arc<Mutex<Vec<String>>>,
    hierarchies: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Journal {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Hierarchy that `command` saw in `on_init`.
    fn hierarchy_of(&self, command: &str) -> Value {
        self.hierarchies
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == command)
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| panic!("no hierarchy recorded for {command}"))
    }
}

struct Recorder {
    name: &'static str,
    journal: Journal,
    outcome: Option<RunOutcome>,
    fail_init: bool,
}

impl Initializable for Recorder {
    fn on_init(&mut self, hierarchy: &ArgumentHierarchy) -> anyhow::Result<()> {
        self.journal
            .events
            .lock()
            .unwrap()
            .push(format!("init:{}", self.name));
        self.journal
            .hierarchies
            .lock()
            .unwrap()
            .push((self.name.to_string(), serde_json::to_value(hierarchy)?));
        if self.fail_init {
            anyhow::bail!("setup failed");
        }
        Ok(())
    }
}

impl Runnable for Recorder {
    fn on_run(&mut self, _hierarchy: &ArgumentHierarchy) -> anyhow::Result<RunOutcome> {
        self.journal
            .events
            .lock()
            .unwrap()
            .push(format!("run:{}", self.name));
        Ok(self.outcome.unwrap_or(RunOutcome::Done))
    }
}

fn recorded(name: &'static str, journal: &Journal) -> CommandDefinition {
    recorded_with(name, journal, None, false)
}

fn recorded_with(
    name: &'static str,
    journal: &Journal,
    outcome: Option<RunOutcome>,
    fail_init: bool,
) -> CommandDefinition {
    let journal = journal.clone();
    CommandDefinition::new(name).factory(move |_values: &FieldValues| {
        Ok(Recorder {
            name,
            journal: journal.clone(),
            outcome,
            fail_init,
        })
    })
}

/// `app [-v] -> ticket [--filter] -> create --key [--priority] [--dry-run]`,
/// plus a passive `config` group with a `show` leaf.
fn app(journal: &Journal) -> CommandDefinition {
    let create_journal = journal.clone();
    let create = CommandDefinition::new("create")
        .field(FieldSpec::new::<String>("key").alias("k"))
        .field(FieldSpec::new::<i64>("priority").default_value(3))
        .field(FieldSpec::new::<bool>("dry-run"))
        .factory(move |values: &FieldValues| {
            if values.require_str("key")?.is_empty() {
                return Err(ValidationError::invalid("key", "cannot be empty"));
            }
            Ok(Recorder {
                name: "create",
                journal: create_journal.clone(),
                outcome: None,
                fail_init: false,
            })
        });

    recorded("app", journal)
        .field(FieldSpec::new::<bool>("verbose").alias("v"))
        .child(
            recorded("ticket", journal)
                .field(FieldSpec::new::<String>("filter").default_value("default"))
                .child(create),
        )
        .child(CommandDefinition::new("config").child(recorded("show", journal)))
}

fn run(journal: &Journal, args: &[&str]) -> (Result<vrachos::engine::DispatchReport, EngineError>, String) {
    let engine = Engine::new(&app(journal)).unwrap();
    let mut out = Vec::new();
    let result = engine.run_from(args.iter().copied(), &mut out);
    (result, String::from_utf8(out).unwrap())
}

// =============================================================================
// Lifecycle Ordering
// =============================================================================

#[test]
fn init_runs_root_first_and_only_leaf_runs() {
    let journal = Journal::default();
    let (result, out) = run(&journal, &["app", "ticket", "create", "--key", "T-1"]);

    let report = result.unwrap();
    assert_eq!(
        journal.events(),
        vec!["init:app", "init:ticket", "init:create", "run:create"]
    );
    assert_eq!(report.ran(), Some("create"));
    assert_eq!(report.nodes.len(), 3);
    assert!(out.is_empty());
}

#[test]
fn group_without_subcommand_runs_itself() {
    let journal = Journal::default();
    let (result, _) = run(&journal, &["app", "ticket"]);

    assert_eq!(result.unwrap().ran(), Some("ticket"));
    assert_eq!(journal.events(), vec!["init:app", "init:ticket", "run:ticket"]);
}

#[test]
fn passive_group_prints_its_help() {
    let journal = Journal::default();
    let (result, out) = run(&journal, &["app", "config"]);

    let report = result.unwrap();
    assert_eq!(report.ran(), Some("config"));
    assert!(report.nodes[1].showed_help);
    assert!(out.contains("Usage: app config"), "{out}");
    assert!(out.contains("show"));
    // Only the root recorded anything; no child of config was touched.
    assert_eq!(journal.events(), vec!["init:app"]);
}

#[test]
fn show_help_outcome_prints_help() {
    let journal = Journal::default();
    let root = recorded_with("solo", &journal, Some(RunOutcome::ShowHelp), false)
        .about("A lone command")
        .field(FieldSpec::new::<i64>("count").default_value(1));
    let engine = Engine::new(&root).unwrap();
    let mut out = Vec::new();

    let report = engine.run_from(["solo"], &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(report.nodes[0].showed_help);
    assert!(out.contains("A lone command"));
    assert!(out.contains("--count"));
}

// =============================================================================
// Hierarchy Shape
// =============================================================================

#[test]
fn hierarchy_nests_ancestors_by_name() {
    let journal = Journal::default();
    let (result, _) = run(
        &journal,
        &["app", "-v", "ticket", "--filter", "open", "create", "-k", "T-1", "--priority", "-2"],
    );
    result.unwrap();

    assert_eq!(journal.hierarchy_of("app"), json!({ "verbose": true }));
    assert_eq!(
        journal.hierarchy_of("ticket"),
        json!({ "filter": "open", "app": { "verbose": true } })
    );
    assert_eq!(
        journal.hierarchy_of("create"),
        json!({
            "key": "T-1",
            "priority": -2,
            "dry-run": false,
            "ticket": { "filter": "open", "app": { "verbose": true } }
        })
    );
}

#[test]
fn commands_off_the_path_never_appear() {
    let journal = Journal::default();
    let (result, _) = run(&journal, &["app", "config", "show"]);
    result.unwrap();

    let show = journal.hierarchy_of("show");
    // The passive config group contributes an empty level.
    assert_eq!(show, json!({ "config": { "app": { "verbose": false } } }));
    assert!(show.get("ticket").is_none());
}

#[test]
fn absent_bool_is_false() {
    let journal = Journal::default();
    let (result, _) = run(&journal, &["app", "ticket", "create", "--key", "T-1"]);
    result.unwrap();

    let create = journal.hierarchy_of("create");
    assert_eq!(create["dry-run"], json!(false));
    assert_eq!(create["ticket"]["app"]["verbose"], json!(false));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn missing_required_field_fails_before_any_init() {
    let journal = Journal::default();
    let (result, _) = run(&journal, &["app", "ticket", "create"]);

    let err = result.unwrap_err();
    assert!(err.is_usage());
    assert_eq!(err.exit_code(), 2);
    assert!(journal.events().is_empty());
}

#[test]
fn unparsable_value_and_unknown_flag_are_usage_errors() {
    let journal = Journal::default();

    let (result, _) = run(&journal, &["app", "ticket", "create", "--key", "k", "--priority", "high"]);
    assert!(result.unwrap_err().is_usage());

    let (result, _) = run(&journal, &["app", "--nope"]);
    assert!(result.unwrap_err().is_usage());

    assert!(journal.events().is_empty());
}

#[test]
fn help_flag_exits_successfully() {
    let journal = Journal::default();
    let (result, _) = run(&journal, &["app", "ticket", "--help"]);

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 0);
    assert!(!err.is_usage());
    assert!(journal.events().is_empty());
}

#[test]
fn validation_error_names_command_and_field() {
    let journal = Journal::default();
    let (result, _) = run(&journal, &["app", "ticket", "create", "--key", ""]);

    let err = result.unwrap_err();
    match &err {
        EngineError::Validation { command, source } => {
            assert_eq!(command, "create");
            assert!(matches!(source, ValidationError::Invalid { field, .. } if field == "key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("create"));
    // Ancestors were initialized before the leaf failed to construct.
    assert_eq!(journal.events(), vec!["init:app", "init:ticket"]);
}

#[test]
fn failing_init_stops_the_chain() {
    let journal = Journal::default();
    let root = recorded_with("app", &journal, None, true).child(recorded("sub", &journal));
    let engine = Engine::new(&root).unwrap();

    let err = engine.run_from(["app", "sub"], &mut Vec::new()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Handler { ref command, phase: Phase::Initializing, .. } if command == "app"
    ));
    assert!(err.to_string().contains("setup failed"));
    assert_eq!(journal.events(), vec!["init:app"]);
}

#[test]
fn definition_errors_surface_before_parsing() {
    let journal = Journal::default();
    let root = app(&journal).child(
        CommandDefinition::new("bad").field(FieldSpec::new::<Option<String>>("maybe")),
    );

    assert!(Engine::new(&root).is_err());
    assert!(journal.events().is_empty());
}

#[test]
fn reconstruction_errors_name_the_chain() {
    let root = CommandDefinition::new("root")
        .field(FieldSpec::new::<String>("name"))
        .factory(|values: &FieldValues| {
            if values.require_str("name")?.is_empty() {
                return Err(ValidationError::invalid("name", "cannot be empty"));
            }
            Ok(Passive)
        })
        .child(CommandDefinition::new("mid").child(CommandDefinition::new("leaf")));
    let engine = Engine::new(&root).unwrap();
    let tree = engine.tree();
    let mid = tree.child_named(tree.root().id, "mid").unwrap().id;
    let leaf = tree.child_named(mid, "leaf").unwrap().id;

    // Hand-built chain whose root values break the root's own contract.
    let mut chain = InvocationChain::new();
    chain.push(tree, tree.root().id, FieldValues::new().with("name", ""));
    chain.push(tree, mid, FieldValues::new());
    let err = reconstruct(tree, &chain, 1).unwrap_err();
    assert!(matches!(
        err,
        HierarchyReconstructionError::Ancestor { ref ancestor, .. } if ancestor == "root"
    ));
    assert!(err.to_string().contains("root > mid"));

    // `leaf` placed directly below `root`.
    let mut skipped = InvocationChain::new();
    skipped.push(tree, tree.root().id, FieldValues::new().with("name", "n"));
    skipped.push(tree, leaf, FieldValues::new());
    assert!(matches!(
        reconstruct(tree, &skipped, 1).unwrap_err(),
        HierarchyReconstructionError::Inconsistent { .. }
    ));

    assert!(matches!(
        reconstruct(tree, &skipped, 5).unwrap_err(),
        HierarchyReconstructionError::MissingContext { index: 5, .. }
    ));
}

struct Passive;

impl Initializable for Passive {}
impl Runnable for Passive {}

// =============================================================================
// Sharing
// =============================================================================

#[test]
fn compiled_engine_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Engine>();

    let journal = Journal::default();
    let engine = Arc::new(Engine::new(&app(&journal)).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                let key = format!("T-{i}");
                engine
                    .run_from(["app", "ticket", "create", "--key", key.as_str()], &mut Vec::new())
                    .map(|report| report.ran().map(str::to_string))
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), Some("create".to_string()));
    }
    assert_eq!(
        journal.events().iter().filter(|e| *e == "run:create").count(),
        4
    );
}
