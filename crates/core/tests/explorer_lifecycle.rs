mod common;

use common::{sample_function, ENTRY};
use mcx_core::config::ExplorerConfig;
use mcx_core::host::{HeadlessHost, Key, UiEvent, ViewId};
use mcx_core::model::{FunctionFixture, GenerateError, Maturity, Program, Segment};
use mcx_core::services::{Command, Explorer, ExplorerError};

fn program() -> Program {
    let mut program = Program::default();
    program.functions.push(FunctionFixture {
        name: "sub_401000".into(),
        start: 0x401000,
        end: 0x401011,
        levels: vec![sample_function()],
    });
    program.segments.push(Segment { name: ".text".into(), start: 0x400000, end: 0x402000 });
    program.symbols.insert("sub_401000".into(), 0x401000);
    program
}

fn open(explorer: &Explorer, host: &mut HeadlessHost, program: &Program) -> ViewId {
    explorer
        .generate_and_show(host, program, ENTRY, Maturity::LocalOpt)
        .unwrap()
        .unwrap()
        .release()
}

fn key(view: ViewId, c: char) -> UiEvent {
    UiEvent::Key { view, key: Key::Char(c), shift: false }
}

fn current_line(host: &HeadlessHost, view: ViewId) -> usize {
    host.text_view(view).unwrap().current_line
}

#[test]
fn titles_are_deduplicated_up_to_the_limit() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();

    let handles: Vec<_> = (0..3)
        .map(|_| explorer.generate_and_show(&mut host, &program, ENTRY, Maturity::LocalOpt).unwrap().unwrap())
        .collect();
    let titles: Vec<_> =
        handles.iter().map(|h| host.text_view(h.view()).unwrap().title.clone()).collect();
    assert_eq!(
        titles,
        vec![
            "Microcode - 401000 - MMAT_LOCOPT",
            "Microcode - 401000 - MMAT_LOCOPT (2)",
            "Microcode - 401000 - MMAT_LOCOPT (3)",
        ]
    );

    let fourth = explorer.generate_and_show(&mut host, &program, ENTRY, Maturity::LocalOpt);
    assert!(matches!(fourth, Err(ExplorerError::TitleExhausted { limit: 3, .. })));
    assert_eq!(host.text_view_count(), 3);
    assert_eq!(explorer.open_sessions(), 3);
}

#[test]
fn closed_title_becomes_available_again() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();

    let first = open(&explorer, &mut host, &program);
    let _second = open(&explorer, &mut host, &program);
    let event = host.close_view(first).unwrap();
    assert!(explorer.handle_event(&mut host, event));

    let again = open(&explorer, &mut host, &program);
    assert_eq!(host.text_view(again).unwrap().title, "Microcode - 401000 - MMAT_LOCOPT");
}

#[test]
fn widget_destroyed_frees_the_session_exactly_once() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();
    let view = open(&explorer, &mut host, &program);
    assert_eq!(explorer.open_sessions(), 1);

    let event = host.close_view(view).unwrap();
    assert!(explorer.handle_event(&mut host, event));
    assert_eq!(explorer.open_sessions(), 0);

    assert!(!explorer.handle_event(&mut host, event));
    assert!(!explorer.handle_event(&mut host, key(view, 'G')));
    assert!(!explorer.handle_event(&mut host, UiEvent::DoubleClick { view }));
    assert!(!explorer.run_command(&mut host, view, Command::BlockGraph));
    assert!(explorer.popup_actions(view).is_empty());
    assert!(explorer.with_session(view, |_| ()).is_none());
}

#[test]
fn dropping_the_handle_closes_the_session() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();

    let handle = explorer.generate_and_show(&mut host, &program, ENTRY, Maturity::LocalOpt).unwrap().unwrap();
    let view = handle.view();
    assert!(explorer.with_session(view, |s| s.title().to_string()).is_some());
    drop(handle);
    assert_eq!(explorer.open_sessions(), 0);

    // The host still delivers its destroy notification later; it is ignored.
    let event = host.close_view(view).unwrap();
    assert!(!explorer.handle_event(&mut host, event));
}

#[test]
fn generation_failures_are_reported_and_open_nothing() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();

    let outside = explorer.generate_and_show(&mut host, &program, 0x500000, Maturity::LocalOpt);
    assert!(matches!(
        outside,
        Err(ExplorerError::Generate(GenerateError::NoFunction(0x500000)))
    ));

    let missing = explorer.generate_and_show(&mut host, &program, ENTRY, Maturity::Calls);
    assert!(matches!(missing, Err(ExplorerError::Generate(GenerateError::Unavailable { .. }))));

    assert_eq!(host.errors().len(), 2);
    assert_eq!(host.errors()[0], "500000: Please position the cursor within a function");
    assert_eq!(host.text_view_count(), 0);
    assert_eq!(explorer.open_sessions(), 0);
}

#[test]
fn cancelled_maturity_prompt_is_a_no_op() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();

    let shown = explorer.generate_and_show(&mut host, &program, ENTRY, Maturity::from_selection(None));
    assert!(shown.unwrap().is_none());
    assert_eq!(host.text_view_count(), 0);
    assert!(host.errors().is_empty());
}

#[test]
fn popup_offers_graphs_only_when_they_can_open() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();
    let view = open(&explorer, &mut host, &program);

    let labels = |explorer: &Explorer| {
        explorer.popup_actions(view).iter().map(|a| a.label).collect::<Vec<_>>()
    };

    assert!(explorer.handle_event(&mut host, UiEvent::CursorMoved { view, line: 7, column: 4 }));
    assert_eq!(labels(&explorer), vec!["Show Microcode Graph", "Show Microinstruction Graph"]);
    let actions = explorer.popup_actions(view);
    assert_eq!(actions[0].hotkey, 'M');
    assert_eq!(actions[1].command, Command::InstructionGraph);

    explorer.handle_event(&mut host, UiEvent::CursorMoved { view, line: 2, column: 0 });
    assert_eq!(labels(&explorer), vec!["Show Microcode Graph"]);

    explorer.invalidate_ir(view);
    assert!(labels(&explorer).is_empty());
    assert!(!explorer.handle_event(&mut host, key(view, 'M')));
}

#[test]
fn views_without_retained_microcode_offer_no_graphs() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let config = ExplorerConfig { keep_ir: false, ..ExplorerConfig::default() };
    let explorer = Explorer::new(config);
    let view = open(&explorer, &mut host, &program);

    explorer.handle_event(&mut host, UiEvent::CursorMoved { view, line: 7, column: 0 });
    assert!(explorer.popup_actions(view).is_empty());
    assert!(!explorer.handle_event(&mut host, key(view, 'I')));
    assert!(host.graph_views().is_empty());

    // Navigation still works on a plain listing.
    host.queue_answer("3");
    assert!(explorer.handle_event(&mut host, key(view, 'g')));
    assert_eq!(current_line(&host, view), 11);
}

#[test]
fn goto_prefers_addresses_and_honours_cancel() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();
    let view = open(&explorer, &mut host, &program);

    host.queue_answer("40100E");
    assert!(explorer.handle_event(&mut host, key(view, 'G')));
    assert_eq!(current_line(&host, view), 8);

    host.queue_answer("1");
    assert!(explorer.handle_event(&mut host, key(view, 'g')));
    assert_eq!(current_line(&host, view), 4);

    host.queue_answer("sub_401000");
    assert!(explorer.handle_event(&mut host, key(view, 'G')));
    assert_eq!(current_line(&host, view), 1);

    // No queued answer: the prompt was cancelled.
    assert!(!explorer.handle_event(&mut host, key(view, 'G')));
    assert_eq!(current_line(&host, view), 1);
}

#[test]
fn enter_and_double_click_follow_block_references() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();
    let view = open(&explorer, &mut host, &program);

    explorer.handle_event(&mut host, UiEvent::CursorMoved { view, line: 4, column: 0 });
    assert!(explorer.handle_event(&mut host, UiEvent::Key { view, key: Key::Enter, shift: false }));
    assert_eq!(current_line(&host, view), 11);
    assert_eq!(explorer.with_session(view, |s| s.cursor().line), Some(11));

    explorer.handle_event(&mut host, UiEvent::CursorMoved { view, line: 0, column: 0 });
    assert!(explorer.handle_event(&mut host, UiEvent::DoubleClick { view }));
    assert_eq!(current_line(&host, view), 1);
}

#[test]
fn graph_keys_open_graph_views() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();
    let view = open(&explorer, &mut host, &program);

    explorer.handle_event(&mut host, UiEvent::CursorMoved { view, line: 8, column: 0 });
    assert!(explorer.handle_event(&mut host, key(view, 'i')));
    assert!(explorer.handle_event(&mut host, key(view, 'M')));

    let graphs = host.graph_views();
    assert_eq!(graphs.len(), 2);
    let insn = host.render_graph(graphs[0]).unwrap();
    assert_eq!(insn.title, "Microinstruction Graph - 401000[MMAT_LOCOPT]/40100E");
    assert_eq!(insn.nodes.len(), 8);
    let blocks = host.render_graph(graphs[1]).unwrap();
    assert_eq!(blocks.title, "Microcode Graph - 401000[MMAT_LOCOPT]");
    assert_eq!(blocks.nodes.len(), 4);
    assert_ne!(insn.token, blocks.token);
}

#[test]
fn unbound_and_shifted_keys_are_ignored() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();
    let view = open(&explorer, &mut host, &program);

    host.queue_answer("3");
    assert!(!explorer.handle_event(&mut host, UiEvent::Key { view, key: Key::Char('G'), shift: true }));
    assert!(!explorer.handle_event(&mut host, key(view, 'x')));
    assert!(!explorer.handle_event(&mut host, UiEvent::Key { view, key: Key::Escape, shift: false }));
    assert_eq!(current_line(&host, view), 0);
}

#[test]
fn block_graph_survives_its_text_view_until_the_microcode_goes() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();
    let view = open(&explorer, &mut host, &program);

    assert!(explorer.run_command(&mut host, view, Command::BlockGraph));
    let graph = host.graph_views()[0];

    let event = host.close_view(view).unwrap();
    explorer.handle_event(&mut host, event);
    // The session held the last strong reference to the microcode.
    assert!(host.render_graph(graph).is_none());
    assert!(host.graph_views().is_empty());
}

#[test]
fn scripted_jump_moves_the_host_view() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();
    let view = open(&explorer, &mut host, &program);

    assert_eq!(explorer.jump_to_target(&mut host, view, "0x401010"), Some(11));
    assert_eq!(current_line(&host, view), 11);
    assert_eq!(explorer.jump_to_target(&mut host, view, "2"), Some(7));
    assert_eq!(explorer.jump_to_target(&mut host, view, "42"), None);
    assert_eq!(current_line(&host, view), 7);
    assert_eq!(explorer.jump_to_target(&mut host, ViewId(999), "2"), None);
}

#[test]
fn text_view_is_backed_by_the_rendered_listing() {
    let program = program();
    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::default();
    let view = open(&explorer, &mut host, &program);

    let state = host.text_view(view).unwrap();
    assert_eq!(state.line_count(), 12);
    let rendered: Vec<String> = explorer
        .with_session(view, |s| s.listing().lines().iter().map(|l| l.plain().to_string()).collect())
        .unwrap();
    assert_eq!(state.lines, rendered);
    assert!(state.lines[0].starts_with("0. 0 ; 1WAY-BLOCK 0"));
    assert!(state.lines[11].starts_with("3. 0 ret"));
    assert!(state.lines[11].ends_with("; 00401010"));
}

#[test]
fn showing_microcode_under_modification_is_refused() {
    let mut host = HeadlessHost::new();
    let explorer = Explorer::default();
    let ir = sample_function().into_shared();

    let guard = ir.borrow_mut();
    let shown = explorer.show(&mut host, ir.clone(), true, "MMAT_LOCOPT");
    assert!(matches!(shown, Err(ExplorerError::IrBusy)));
    assert_eq!(host.text_view_count(), 0);
    assert_eq!(explorer.open_sessions(), 0);
    drop(guard);

    assert!(explorer.show(&mut host, ir, true, "MMAT_LOCOPT").is_ok());
}
