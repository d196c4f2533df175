use chrono::DateTime;
use mindcanvas::geom::point;
use mindcanvas::geom::vector;
use mindcanvas::{
    CanvasConfig, Clock, Command, CommandBus, EditError, Engine, EngineOptions, InteractionState,
    LayoutMode, MenuAction, PointerEvent, Tool, Viewport,
};
use serde_json::json;

const T0: i64 = 1_700_000_000_000;

fn engine() -> Engine {
    let options = EngineOptions {
        clock: Clock::Fixed(DateTime::from_timestamp_millis(T0).expect("timestamp")),
        ..EngineOptions::default()
    };
    let mut engine = Engine::new(options).expect("valid config");
    // Center (400, 300): root draws there, func (layout 200,-200) at (600, 100).
    engine
        .mount(Viewport::new(800.0, 600.0, 2.0))
        .expect("mount");
    engine
}

fn click(engine: &mut Engine, x: f64, y: f64, t: u64) {
    engine.pointer_down(PointerEvent::primary(point(x, y), t));
    engine.pointer_up();
}

fn titles(engine: &mut Engine) -> Vec<String> {
    engine
        .drain_notices()
        .into_iter()
        .map(|n| n.title)
        .collect()
}

#[test]
fn add_under_selected_func_through_the_add_tool() {
    let mut engine = engine();
    click(&mut engine, 600.0, 100.0, 0);
    assert_eq!(engine.selected(), Some("func"));

    engine.set_tool(Tool::Add);
    assert_eq!(engine.add_draft().expect("draft").parent_id, "func");
    engine.add_draft_mut().expect("draft").text = "接口测试".to_string();
    let id = engine.commit_add().expect("add").expect("draft committed");

    assert_eq!(id, format!("node_{T0}"));
    let map = engine.map();
    assert_eq!(map.len(), 14);
    assert_eq!(map.get("func").expect("func").children.last(), Some(&id));
    assert_eq!(map.get(&id).expect("new node").text, "接口测试");
    assert_eq!(engine.selected(), Some(id.as_str()));
    assert_eq!(engine.interaction().tool(), Tool::Select);
    assert_eq!(engine.history().len(), 2);
    assert!(engine.positions().contains_key(&id));
    assert_eq!(titles(&mut engine), ["节点已添加"]);
}

#[test]
fn consecutive_adds_get_distinct_increasing_ids() {
    let mut engine = engine();
    let a = engine.add_node(None, "").expect("first");
    let b = engine.add_node(None, "").expect("second");
    assert_eq!(a, format!("node_{T0}"));
    assert_eq!(b, format!("node_{}", T0 + 1));
    // The second add lands under the first, which became the selection.
    assert_eq!(engine.map().get(&b).expect("b").parent_id.as_deref(), Some(a.as_str()));
    assert_eq!(engine.map().get(&a).expect("a").text, "新节点");
}

#[test]
fn add_under_unknown_parent_is_rejected() {
    let mut engine = engine();
    let err = engine.add_node(Some("ghost"), "x").unwrap_err();
    assert_eq!(err, EditError::UnknownNode("ghost".into()));
    assert_eq!(engine.history().len(), 1);

    let notices = engine.drain_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_error());
    assert_eq!(notices[0].description, "找不到节点“ghost”。");
}

#[test]
fn edits_of_unknown_nodes_post_error_notices() {
    let mut engine = engine();
    let err = engine.toggle_collapse("ghost").unwrap_err();
    assert_eq!(err, EditError::UnknownNode("ghost".into()));
    assert!(engine.edit_node("ghost", "x", "").is_err());
    assert!(engine.delete_node("ghost").is_err());

    let notices = engine.drain_notices();
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|n| n.is_error()));
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn deleting_the_root_is_refused_with_a_notice() {
    let mut engine = engine();
    let before = serde_json::to_string(engine.map()).expect("json");
    let err = engine.delete_node("root").unwrap_err();
    assert_eq!(err, EditError::RootProtected("root".into()));
    assert_eq!(serde_json::to_string(engine.map()).expect("json"), before);
    assert_eq!(engine.history().len(), 1);

    let notices = engine.drain_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_error());
    assert_eq!(notices[0].title, "无法删除根节点");
}

#[test]
fn delete_reports_closure_size_and_clears_selection_inside_it() {
    let mut engine = engine();
    click(&mut engine, 600.0, 100.0, 0);
    assert_eq!(engine.delete_node("func"), Ok(4));
    assert_eq!(engine.map().len(), 9);
    assert_eq!(engine.selected(), None);
    let notices = engine.drain_notices();
    assert_eq!(notices[0].description, "已删除节点及其子节点（共 4 个）。");
}

#[test]
fn double_click_edits_the_clicked_node() {
    let mut engine = engine();
    click(&mut engine, 600.0, 100.0, 1_000);
    click(&mut engine, 600.0, 100.0, 1_250);
    assert_eq!(engine.state(), InteractionState::EditingNode);

    // Pointer input is ignored while the editor is open.
    click(&mut engine, 400.0, 300.0, 1_400);
    assert_eq!(engine.selected(), Some("func"));

    let buffer = engine.edit_buffer_mut().expect("editor open");
    assert_eq!(buffer.node_id, "func");
    buffer.text = "功能".to_string();
    buffer.notes = "核心路径".to_string();
    assert_eq!(engine.save_edit(), Ok(true));

    let func = engine.map().get("func").expect("func");
    assert_eq!(func.text, "功能");
    assert_eq!(func.notes.as_deref(), Some("核心路径"));
    assert_eq!(func.children.len(), 3);
    assert_eq!(titles(&mut engine), ["节点已更新"]);
}

#[test]
fn cancelled_edit_leaves_no_history() {
    let mut engine = engine();
    assert!(engine.open_editor("perf"));
    engine.edit_buffer_mut().expect("editor").text = "changed".to_string();
    assert!(engine.cancel_edit());
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.map().get("perf").expect("perf").text, "性能测试");
}

#[test]
fn undo_and_redo_stop_at_the_ends() {
    let mut engine = engine();
    assert!(!engine.undo());
    let id = engine.add_node(Some("perf"), "缓存").expect("add");
    engine.toggle_collapse("perf").expect("toggle");

    assert!(engine.undo());
    assert!(!engine.map().get("perf").expect("perf").collapsed);
    assert!(engine.undo());
    assert!(!engine.map().contains(&id));
    // The selection pointed at the removed node.
    assert_eq!(engine.selected(), None);
    assert!(!engine.undo());

    assert!(engine.redo());
    assert!(engine.redo());
    assert!(engine.map().get("perf").expect("perf").collapsed);
    assert!(!engine.redo());
}

#[test]
fn zoom_is_clamped_and_reset_restores_identity() {
    let mut engine = engine();
    for _ in 0..25 {
        engine.zoom_in();
    }
    assert_eq!(engine.view().zoom, 2.0);
    for _ in 0..25 {
        engine.zoom_out();
    }
    assert_eq!(engine.view().zoom, 0.5);
    assert_eq!(engine.set_zoom(7.0), 2.0);

    engine.reset_view();
    assert_eq!(engine.view().zoom, 1.0);
    assert_eq!(engine.view().offset, vector(0.0, 0.0));
}

#[test]
fn reset_view_returns_to_the_configured_default_zoom() {
    let config = CanvasConfig::from_json_str(r#"{"zoom":{"min":1.5,"max":3.0,"default":2.0}}"#)
        .expect("config");
    let mut engine = Engine::new(EngineOptions {
        config,
        ..EngineOptions::default()
    })
    .expect("valid config");
    assert_eq!(engine.view().zoom, 2.0);
    engine.zoom_in();
    engine.reset_view();
    assert_eq!(engine.view().zoom, 2.0);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let inverted = CanvasConfig::with_overrides(&json!({"zoom": {"min": 3.0, "default": 3.0}}));
    assert!(
        Engine::new(EngineOptions {
            config: inverted,
            ..EngineOptions::default()
        })
        .is_err()
    );

    let tiny_grid = CanvasConfig::with_overrides(&json!({"grid": {"size": 1e-9}}));
    assert!(
        Engine::new(EngineOptions {
            config: tiny_grid,
            ..EngineOptions::default()
        })
        .is_err()
    );
}

#[test]
fn pan_tool_drags_the_offset() {
    let mut engine = engine();
    engine.set_tool(Tool::Pan);
    engine.pointer_down(PointerEvent::primary(point(100.0, 100.0), 0));
    assert_eq!(engine.state(), InteractionState::Panning);
    engine.pointer_move(PointerEvent::primary(point(130.0, 90.0), 10));
    assert_eq!(engine.view().offset, vector(30.0, -10.0));
    engine.pointer_leave();
    assert_eq!(engine.state(), InteractionState::Idle);
    engine.pointer_move(PointerEvent::primary(point(200.0, 200.0), 20));
    assert_eq!(engine.view().offset, vector(30.0, -10.0));
}

#[test]
fn hover_follows_the_pointer() {
    let mut engine = engine();
    engine.pointer_move(PointerEvent::primary(point(400.0, 300.0), 0));
    assert_eq!(engine.state(), InteractionState::NodeHover);
    assert_eq!(engine.interaction().hovered(), Some("root"));
    assert!(
        engine
            .frame()
            .expect("frame")
            .contains(">这是测试策略的主要节点，包含了所有测试类型。</text>")
    );
    engine.pointer_move(PointerEvent::primary(point(5.0, 5.0), 1));
    assert_eq!(engine.interaction().hovered(), None);
}

#[test]
fn context_menu_actions_apply_to_the_menu_node() {
    let mut engine = engine();
    assert_eq!(
        engine.context_menu(point(400.0, 300.0)),
        [MenuAction::Edit, MenuAction::AddChild, MenuAction::ToggleCollapse]
    );
    assert_eq!(engine.state(), InteractionState::ContextMenuOpen);
    assert_eq!(engine.menu_action(MenuAction::Delete), Ok(false));
    let frames = engine.redraw_count();
    assert_eq!(engine.menu_action(MenuAction::ToggleCollapse), Ok(true));
    assert_eq!(engine.redraw_count(), frames + 1);
    assert!(engine.map().root().collapsed);
    assert_eq!(engine.positions().len(), 1);

    assert!(engine.context_menu(point(5.0, 5.0)).is_empty());
    assert_eq!(engine.menu_action(MenuAction::Edit), Ok(false));
}

#[test]
fn delete_from_the_menu_waits_for_confirmation() {
    let mut engine = engine();
    let actions = engine.context_menu(point(600.0, 100.0));
    assert!(actions.contains(&MenuAction::Delete));
    assert_eq!(engine.menu_action(MenuAction::Delete), Ok(true));
    assert_eq!(engine.pending_delete(), Some("func"));
    assert_eq!(engine.map().len(), 13);

    assert!(engine.cancel_delete());
    assert_eq!(engine.confirm_delete(), Ok(None));

    engine.request_delete("perf");
    assert_eq!(engine.confirm_delete(), Ok(Some(3)));
    assert!(!engine.map().contains("perf"));
}

#[test]
fn primary_click_closes_the_menu_without_acting() {
    let mut engine = engine();
    engine.context_menu(point(600.0, 100.0));
    click(&mut engine, 5.0, 5.0, 0);
    assert_eq!(engine.state(), InteractionState::Idle);
    assert_eq!(engine.map().len(), 13);
}

#[test]
fn layout_switch_relays_out_once_and_notifies() {
    let mut engine = engine();
    let passes = engine.layout_passes();
    engine.set_layout_mode(LayoutMode::MindMap);
    assert_eq!(engine.layout_passes(), passes);
    assert!(engine.drain_notices().is_empty());

    engine.set_layout_mode(LayoutMode::Fishbone);
    assert_eq!(engine.layout_passes(), passes + 1);
    assert_eq!(engine.layout_mode(), LayoutMode::Fishbone);
    let notices = engine.drain_notices();
    assert_eq!(notices[0].description, "思维导图布局已更改为鱼骨图。");
}

#[test]
fn frames_are_drawn_only_with_a_surface() {
    let mut engine = Engine::new(EngineOptions::default()).expect("valid config");
    engine.redraw();
    assert_eq!(engine.redraw_count(), 0);
    assert!(engine.frame().is_none());

    assert!(engine.mount(Viewport::new(0.0, 600.0, 1.0)).is_err());
    engine
        .mount(Viewport::new(300.0, 200.0, 2.0))
        .expect("mount");
    assert_eq!(engine.redraw_count(), 1);
    let svg = engine.frame().expect("frame");
    let doc = roxmltree::Document::parse(svg).expect("valid svg");
    assert_eq!(doc.root_element().attribute("width"), Some("600"));
    assert_eq!(doc.root_element().attribute("viewBox"), Some("0 0 300 200"));

    engine.unmount();
    assert!(engine.frame().is_none());
}

#[test]
fn command_bus_focuses_root_and_ignores_table_exports() {
    let mut bus = CommandBus::new();
    let mut engine = engine();
    engine.listen(&mut bus);
    engine.set_tool(Tool::Pan);

    assert_eq!(bus.dispatch(Command::ExportTestCases), 1);
    assert!(engine.process_commands().is_empty());

    bus.dispatch(Command::EditMindMap);
    assert!(engine.process_commands().is_empty());
    assert_eq!(engine.selected(), Some("root"));
    assert_eq!(engine.interaction().tool(), Tool::Select);
}

#[test]
fn fullscreen_toggles() {
    let mut engine = engine();
    assert!(engine.toggle_fullscreen());
    assert!(engine.is_fullscreen());
    assert!(!engine.toggle_fullscreen());
}
