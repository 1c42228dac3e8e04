use lazyaz_core::ActionSubject;
use lazyaz_core::testing::{ScriptedSource, Ticket, tickets};
use lazyaz_runtime_config::ExtensionEntry;
use lazyaz_tui::engine::{
    AnnounceDuration, AnnounceLevel, BrowserController, DetailView, FetchPhase, ViewSignal,
};
use lazyaz_tui::extensions::{
    ActionError, EntryPointTable, ExtensionRegistry, ExtensionSettings, Indicator,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("runtime")
}

fn controller(
    rt: &tokio::runtime::Runtime,
    source: &Arc<ScriptedSource<Ticket>>,
) -> BrowserController<Ticket> {
    BrowserController::<Ticket>::new(source.clone(), rt.handle().clone())
}

fn pump_until(
    controller: &mut BrowserController<Ticket>,
    done: impl Fn(&BrowserController<Ticket>) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(controller) {
        assert!(Instant::now() < deadline, "timed out waiting for controller");
        controller.pump();
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Pump until one background result has been applied.
fn pump_next(controller: &mut BrowserController<Ticket>) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !controller.pump() {
        assert!(Instant::now() < deadline, "timed out waiting for a result");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn announcements(controller: &mut BrowserController<Ticket>) -> Vec<String> {
    controller
        .take_signals()
        .into_iter()
        .filter_map(|signal| match signal {
            ViewSignal::Announce(a) => Some(a.message),
            _ => None,
        })
        .collect()
}

fn loaded(controller: &BrowserController<Ticket>) -> Option<String> {
    match controller.detail_view() {
        DetailView::Loaded(detail) => Some(detail.clone()),
        _ => None,
    }
}

/// Controller with `titles` loaded and no background work outstanding.
fn populated(
    rt: &tokio::runtime::Runtime,
    titles: &[&str],
) -> (Arc<ScriptedSource<Ticket>>, BrowserController<Ticket>) {
    let source = Arc::new(ScriptedSource::<Ticket>::new());
    source.set_list("all", tickets(titles));
    let mut controller = controller(rt, &source);
    controller.start();
    pump_until(&mut controller, |c| {
        c.state().phase == FetchPhase::Populated && !c.filter_options().is_empty()
    });
    (source, controller)
}

#[test]
fn search_finds_the_matching_row() {
    let rt = runtime();
    let (_source, mut controller) = populated(&rt, &["A", "B", "C"]);

    controller.submit_search("B");
    assert_eq!(controller.search().matches(), &[(1, 0)]);
    assert_eq!(controller.search().current_index(), Some(0));
    assert_eq!(controller.state().selected_index, 1);

    let signals = controller.take_signals();
    assert!(signals.contains(&ViewSignal::Highlight { row: 1, col: 0 }));
    assert!(signals.iter().any(|s| matches!(
        s,
        ViewSignal::Announce(a) if a.message == "Match 1/1"
    )));
}

#[test]
fn repeated_search_advances_and_wraps() {
    let rt = runtime();
    let (_source, mut controller) = populated(&rt, &["alpha", "beta", "alphabet"]);

    controller.submit_search("alpha");
    let first = controller.search().matches().to_vec();
    assert_eq!(first, vec![(0, 0), (2, 0)]);
    assert_eq!(controller.search().current_index(), Some(0));

    controller.submit_search("alpha");
    assert_eq!(controller.search().matches(), first.as_slice());
    assert_eq!(controller.search().current_index(), Some(1));
    assert_eq!(controller.state().selected_index, 2);

    controller.repeat_search();
    assert_eq!(controller.search().current_index(), Some(0));
    assert_eq!(controller.state().selected_index, 0);

    controller.submit_search("   ");
    assert!(!controller.search().is_active());
    assert!(controller.search().matches().is_empty());
}

#[test]
fn search_without_hits_reports_no_matches() {
    let rt = runtime();
    let (_source, mut controller) = populated(&rt, &["A", "B"]);
    controller.take_signals();

    controller.submit_search("zzz");
    assert!(controller.search().matches().is_empty());
    assert_eq!(announcements(&mut controller), vec!["No matches!".to_string()]);
}

#[test]
fn filter_change_during_fetch_is_dropped() {
    let rt = runtime();
    let source = Arc::new(ScriptedSource::<Ticket>::new());
    source.set_list("all", tickets(&["from all"]));
    source.set_list("mine", tickets(&["from mine"]));
    source.hold_lists();

    let mut controller = controller(&rt, &source);
    controller.start();
    assert!(source.wait_for_list_calls(1));
    assert!(controller.fetch_in_flight());
    assert_eq!(controller.state().phase, FetchPhase::Fetching);

    controller.set_filter("mine");
    assert!(!controller.refresh());
    source.release_lists();
    pump_until(&mut controller, |c| c.state().phase == FetchPhase::Populated);

    assert_eq!(source.list_calls(), vec!["all".to_string()]);
    assert_eq!(controller.state().filter, "mine");
    assert_eq!(controller.state().records_filter.as_deref(), Some("all"));
    assert_eq!(controller.state().records[0].title, "from all");
    assert!(!controller.fetch_in_flight());

    // The token is free again, so the next request goes through.
    assert!(controller.refresh());
    pump_until(&mut controller, |c| {
        c.state().records_filter.as_deref() == Some("mine")
    });
    assert_eq!(controller.state().records[0].title, "from mine");
}

#[test]
fn set_filter_resets_search_selection_and_details() {
    let rt = runtime();
    let (source, mut controller) = populated(&rt, &["alpha", "beta", "alphabet"]);
    source.set_list("mine", tickets(&["mine"]));

    controller.submit_search("alphabet");
    assert_eq!(controller.state().selected_index, 2);
    controller.toggle_details();
    controller.toggle_expanded();
    assert!(controller.search().is_active());
    assert!(controller.state().details_expanded);

    controller.set_filter("mine");
    assert!(!controller.search().is_active());
    assert!(controller.search().matches().is_empty());
    assert_eq!(controller.state().selected_index, 0);
    assert!(!controller.state().details_visible);
    assert!(!controller.state().details_expanded);
    assert!(matches!(controller.detail_view(), DetailView::Hidden));

    pump_until(&mut controller, |c| {
        c.state().records_filter.as_deref() == Some("mine")
    });
    assert_eq!(controller.state().selected_index, 0);
}

#[test]
fn fetch_stays_in_flight_until_its_result_is_applied() {
    let rt = runtime();
    let (source, mut controller) = populated(&rt, &["A"]);
    source.set_list("all", tickets(&["A", "B"]));

    assert!(controller.refresh());
    assert!(source.wait_for_finished_lists(2));
    std::thread::sleep(Duration::from_millis(20));
    assert!(controller.fetch_in_flight());
    assert!(!controller.refresh());

    pump_next(&mut controller);
    assert_eq!(controller.state().records.len(), 2);
    assert!(!controller.fetch_in_flight());
    assert_eq!(source.list_calls().len(), 2);
}

#[test]
fn manual_refresh_is_announced() {
    let rt = runtime();
    let (source, mut controller) = populated(&rt, &["A"]);
    controller.take_signals();
    source.hold_lists();

    assert!(controller.refresh());
    let started: Vec<_> = controller
        .take_signals()
        .into_iter()
        .filter_map(|s| match s {
            ViewSignal::Announce(a) => Some(a),
            _ => None,
        })
        .collect();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].message, "⏳ Refreshing work items...");
    assert_eq!(started[0].duration, AnnounceDuration::Sticky);

    // A dropped request says nothing.
    assert!(!controller.refresh());
    assert!(announcements(&mut controller).is_empty());

    source.release_lists();
    pump_until(&mut controller, |c| !c.fetch_in_flight());
    let done = controller
        .take_signals()
        .into_iter()
        .find_map(|s| match s {
            ViewSignal::Announce(a) => Some(a),
            _ => None,
        })
        .expect("refresh result announced");
    assert_eq!(done.message, "✅ Refresh done");
    assert_eq!(done.level, AnnounceLevel::Success);
    assert_eq!(done.duration, AnnounceDuration::Seconds(3));
}

#[test]
fn refresh_preserves_selection_within_bounds() {
    let rt = runtime();
    let (source, mut controller) = populated(&rt, &["A", "B", "C", "D"]);
    controller.select_index(3);

    source.set_list("all", tickets(&["A", "B"]));
    assert!(controller.refresh());
    pump_until(&mut controller, |c| c.state().records.len() == 2);
    assert_eq!(controller.state().selected_index, 1);
}

#[test]
fn empty_result_is_distinguished_from_failure() {
    let rt = runtime();
    let source = Arc::new(ScriptedSource::<Ticket>::new());
    source.fail_list("mine", "az exited with status 1");
    let mut controller = controller(&rt, &source);
    controller.start();
    pump_until(&mut controller, |c| c.state().phase == FetchPhase::Empty);
    assert!(controller.selected_record().is_none());

    controller.set_filter("mine");
    pump_until(&mut controller, |c| matches!(c.state().phase, FetchPhase::Error(_)));
    let messages = announcements(&mut controller);
    assert!(messages.iter().any(|m| m.starts_with("Failed to load Work Items")));
}

#[test]
fn detail_placeholder_then_payload() {
    let rt = runtime();
    let (source, mut controller) = populated(&rt, &["A", "B"]);
    source.set_detail(1, "body of A".to_string());
    source.hold_detail(1);

    assert!(matches!(controller.detail_view(), DetailView::Hidden));
    controller.toggle_details();
    assert!(matches!(controller.detail_view(), DetailView::Placeholder));

    source.release_detail(&1);
    pump_until(&mut controller, |c| loaded(c).is_some());
    assert_eq!(loaded(&controller).as_deref(), Some("body of A"));

    // Cached: reopening does not fetch again.
    controller.toggle_details();
    controller.toggle_details();
    assert_eq!(loaded(&controller).as_deref(), Some("body of A"));
    assert_eq!(source.detail_calls(), vec![1]);
}

#[test]
fn stale_detail_is_discarded() {
    let rt = runtime();
    let (source, mut controller) = populated(&rt, &["R", "S"]);
    source.set_detail(1, "body of R".to_string());
    source.set_detail(2, "body of S".to_string());
    source.hold_detail(1);

    controller.toggle_details();
    assert!(source.wait_for_detail_calls(1));
    controller.select_index(1);
    pump_until(&mut controller, |c| loaded(c).is_some());
    assert_eq!(loaded(&controller).as_deref(), Some("body of S"));

    source.release_detail(&1);
    pump_next(&mut controller);
    assert_eq!(loaded(&controller).as_deref(), Some("body of S"));
    assert!(controller.cached_detail(&1).is_none());

    // Going back to R fetches it again.
    controller.select_index(0);
    assert!(matches!(controller.detail_view(), DetailView::Placeholder));
    pump_until(&mut controller, |c| loaded(c).is_some());
    assert_eq!(loaded(&controller).as_deref(), Some("body of R"));
    assert_eq!(source.detail_calls(), vec![1, 2, 1]);
}

#[test]
fn failed_detail_shows_reason() {
    let rt = runtime();
    let (source, mut controller) = populated(&rt, &["A"]);
    source.fail_detail(1, "timeout");

    controller.toggle_details();
    pump_until(&mut controller, |c| matches!(c.detail_view(), DetailView::Failed(_)));
    match controller.detail_view() {
        DetailView::Failed(reason) => assert!(reason.contains("timeout")),
        _ => unreachable!(),
    }
}

fn entry(name: &str, applies_to: &[&str]) -> ExtensionEntry {
    ExtensionEntry {
        name: name.to_string(),
        applies_to: applies_to.iter().map(|tag| tag.to_string()).collect(),
        ..ExtensionEntry::default()
    }
}

fn echo(subject: &ActionSubject, _settings: &ExtensionSettings) -> Result<String, ActionError> {
    Ok(format!("echoed {}", subject.id))
}

fn no_clipboard(_subject: &ActionSubject, _settings: &ExtensionSettings) -> Result<String, ActionError> {
    Err(ActionError::SinkUnavailable)
}

#[test]
fn unresolved_extension_is_skipped_with_warning() {
    let entries = BTreeMap::from([
        ("echo".to_string(), entry("Echo", &["workitems"])),
        ("x".to_string(), entry("X", &["workitems"])),
    ]);
    let table = EntryPointTable::empty().register("echo", echo);
    let registry = ExtensionRegistry::load(&entries, &table);

    assert_eq!(registry.len(), 1);
    let ids: Vec<_> = registry.get_for("workitems").iter().map(|d| d.id.clone()).collect();
    assert_eq!(ids, vec!["echo".to_string()]);
    assert!(registry.get("x").is_none());
    assert_eq!(registry.warnings().len(), 1);
    assert!(registry.warnings()[0].contains("extension x"));
}

#[test]
fn invoked_extension_reports_success() {
    let rt = runtime();
    let (_source, mut controller) = populated(&rt, &["A"]);
    let entries = BTreeMap::from([("echo".to_string(), entry("Echo", &["workitems"]))]);
    let registry = ExtensionRegistry::load(&entries, &EntryPointTable::empty().register("echo", echo));
    let descriptor = registry.get("echo").expect("echo resolves").clone();

    assert!(controller.invoke_extension(&descriptor));
    assert_eq!(controller.indicator("echo"), Some(Indicator::Running));
    pump_until(&mut controller, |c| c.indicator("echo") == Some(Indicator::Succeeded));

    let signals = controller.take_signals();
    assert!(signals.iter().any(|s| matches!(
        s,
        ViewSignal::Announce(a) if a.message == "✅ Echo done" && a.level == AnnounceLevel::Success
    )));
}

#[test]
fn missing_clipboard_has_its_own_message() {
    let rt = runtime();
    let (_source, mut controller) = populated(&rt, &["A"]);
    let entries = BTreeMap::from([("copy".to_string(), entry("Copy", &["workitems"]))]);
    let table = EntryPointTable::empty().register("copy", no_clipboard);
    let registry = ExtensionRegistry::load(&entries, &table);
    let descriptor = registry.get("copy").expect("copy resolves").clone();

    assert!(controller.invoke_extension(&descriptor));
    pump_until(&mut controller, |c| c.indicator("copy") == Some(Indicator::Failed));

    let announcement = controller
        .take_signals()
        .into_iter()
        .find_map(|s| match s {
            ViewSignal::Announce(a) if a.level == AnnounceLevel::Error => Some(a),
            _ => None,
        })
        .expect("failure announced");
    assert_eq!(
        announcement.message,
        "❌ Copy failed: no clipboard utility found (install xsel or xclip)"
    );
    assert_eq!(announcement.duration, AnnounceDuration::Seconds(10));
}

#[test]
fn extension_for_other_domain_is_not_invoked() {
    let rt = runtime();
    let (_source, mut controller) = populated(&rt, &["A"]);
    let entries = BTreeMap::from([("echo".to_string(), entry("Echo", &["pipelines"]))]);
    let registry = ExtensionRegistry::load(&entries, &EntryPointTable::empty().register("echo", echo));
    let descriptor = registry.get("echo").expect("echo resolves").clone();

    assert!(registry.get_for("workitems").is_empty());
    assert!(!controller.invoke_extension(&descriptor));
    assert_eq!(controller.indicator("echo"), None);
}

#[test]
fn export_writes_rendered_template_with_detail() {
    let rt = runtime();
    let (source, mut controller) = populated(&rt, &["Upgrade toolchain"]);
    source.set_detail(1, "Move to the new compiler".to_string());
    controller.toggle_details();
    pump_until(&mut controller, |c| loaded(c).is_some());

    let templates = tempfile::tempdir().expect("templates dir");
    std::fs::write(
        templates.path().join("workitem.md"),
        "# {{.ID}} {{ .Title }}\n\n{{.Body}}\n",
    )
    .expect("write template");
    let output = tempfile::tempdir().expect("output dir");
    let mut export = entry("Export", &["workitems"]);
    export.templates_directory = templates.path().display().to_string();
    export.output_target = output.path().join("exports").display().to_string();
    let entries = BTreeMap::from([("export_to_template".to_string(), export)]);
    let registry = ExtensionRegistry::load(&entries, &EntryPointTable::builtin());
    let descriptor = registry.get("export_to_template").expect("builtin resolves").clone();

    assert!(controller.invoke_extension(&descriptor));
    pump_until(&mut controller, |c| {
        c.indicator("export_to_template") == Some(Indicator::Succeeded)
    });

    let written = std::fs::read_to_string(output.path().join("exports").join("workitem-1.md"))
        .expect("export file");
    assert_eq!(written, "# 1 Upgrade toolchain\n\nMove to the new compiler\n");
}
