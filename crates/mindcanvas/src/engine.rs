//! The canvas engine: one mind-map instance with its history, view, interaction state and last
//! rendered frame.

use crate::export::{ExportError, ExportGuard, Payload, PendingExport};
use crate::notice::{Notice, NoticeLog};
use mindcanvas_core::config::{LayoutSettings, NodeMetrics};
use mindcanvas_core::geom::Point;
use mindcanvas_core::interaction::{AddDraft, EditBuffer};
use mindcanvas_core::{
    CanvasConfig, Clock, Command, CommandBus, CommandReceiver, EditError, ExportFormat, History,
    IdGenerator, Interaction, InteractionState, LayoutMode, MenuAction, MindMap, PointerEvent,
    Positions, Reaction, Tool, ViewState, Viewport, compute_positions, demo_strategy_map,
    hit_test,
};
use mindcanvas_render::{DeterministicTextMeasurer, Scene, SvgSurface, TextMeasurer, Theme};
use std::cell::Cell;
use std::rc::Rc;

pub struct EngineOptions {
    pub config: CanvasConfig,
    pub measurer: Box<dyn TextMeasurer>,
    pub clock: Clock,
    pub theme: Theme,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            config: CanvasConfig::default(),
            measurer: Box::new(DeterministicTextMeasurer::default()),
            clock: Clock::System,
            theme: Theme::default(),
        }
    }
}

impl std::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

pub struct Engine {
    config: CanvasConfig,
    layout_settings: LayoutSettings,
    metrics: NodeMetrics,
    theme: Theme,
    measurer: Box<dyn TextMeasurer>,
    clock: Clock,
    ids: IdGenerator,

    history: History,
    mode: LayoutMode,
    positions: Positions,
    view: ViewState,
    interaction: Interaction,
    fullscreen: bool,

    viewport: Option<Viewport>,
    frame: Option<String>,

    notices: NoticeLog,
    export_busy: Rc<Cell<bool>>,
    commands: Option<CommandReceiver>,

    layout_passes: usize,
    redraws: usize,
}

impl Engine {
    /// Starts from the built-in test-strategy tree.
    pub fn new(options: EngineOptions) -> mindcanvas_core::Result<Self> {
        Self::with_map(demo_strategy_map(), options)
    }

    /// Fails when `options.config` does not pass [`CanvasConfig::validate`].
    pub fn with_map(map: MindMap, options: EngineOptions) -> mindcanvas_core::Result<Self> {
        options.config.validate()?;
        let EngineOptions {
            config,
            measurer,
            clock,
            theme,
        } = options;
        let mut engine = Self {
            layout_settings: config.layout_settings(),
            metrics: config.node_metrics(),
            view: ViewState::new(config.view_settings()),
            interaction: Interaction::new(config.interaction_settings()),
            config,
            theme,
            measurer,
            clock,
            ids: IdGenerator::new(),
            history: History::new(map),
            mode: LayoutMode::default(),
            positions: Positions::default(),
            fullscreen: false,
            viewport: None,
            frame: None,
            notices: NoticeLog::default(),
            export_busy: Rc::new(Cell::new(false)),
            commands: None,
            layout_passes: 0,
            redraws: 0,
        };
        engine.relayout();
        Ok(engine)
    }

    pub fn map(&self) -> &MindMap {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn state(&self) -> InteractionState {
        self.interaction.state()
    }

    pub fn selected(&self) -> Option<&str> {
        self.interaction.selected()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// SVG document of the last drawn frame; `None` while no surface is mounted.
    pub fn frame(&self) -> Option<&str> {
        self.frame.as_deref()
    }

    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // ---- surface ------------------------------------------------------------------------------

    /// Attaches (or resizes) the drawing surface and draws a frame.
    pub fn mount(&mut self, viewport: Viewport) -> mindcanvas_render::Result<()> {
        SvgSurface::new(viewport)?;
        self.viewport = Some(viewport);
        self.redraw();
        Ok(())
    }

    pub fn resize(&mut self, viewport: Viewport) -> mindcanvas_render::Result<()> {
        self.mount(viewport)
    }

    pub fn unmount(&mut self) {
        self.viewport = None;
        self.frame = None;
    }

    fn relayout(&mut self) {
        self.positions = compute_positions(self.map(), self.mode, &self.layout_settings);
        self.layout_passes += 1;
        tracing::debug!(
            mode = %self.mode,
            placed = self.positions.len(),
            "recomputed layout"
        );
    }

    /// Draws a fresh frame. Without a mounted surface this is a logged no-op.
    pub fn redraw(&mut self) {
        let scene = Scene {
            map: self.history.current(),
            positions: &self.positions,
            mode: self.mode,
            view: &self.view,
            hovered: self.interaction.hovered(),
            selected: self.interaction.selected(),
            metrics: &self.metrics,
            theme: &self.theme,
        };
        let Some(viewport) = self.viewport else {
            mindcanvas_render::render_scene(None, &scene, self.measurer.as_ref());
            return;
        };
        let mut surface = match SvgSurface::new(viewport) {
            Ok(surface) => surface,
            Err(err) => {
                tracing::warn!(error = %err, "cannot create drawing surface; skipping frame");
                return;
            }
        };
        mindcanvas_render::render_scene(Some(&mut surface), &scene, self.measurer.as_ref());
        self.frame = Some(surface.finish());
        self.redraws += 1;
        tracing::debug!(frame = self.redraws, zoom = self.view.zoom, "redrew canvas");
    }

    // ---- view ---------------------------------------------------------------------------------

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.relayout();
        self.redraw();
        self.notices.push(Notice::layout_changed(mode));
    }

    pub fn zoom_in(&mut self) -> f64 {
        let zoom = self.view.zoom_in();
        self.redraw();
        zoom
    }

    pub fn zoom_out(&mut self) -> f64 {
        let zoom = self.view.zoom_out();
        self.redraw();
        zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let zoom = self.view.set_zoom(zoom);
        self.redraw();
        zoom
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
        self.redraw();
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.interaction.set_tool(tool, self.history.current());
        self.redraw();
    }

    /// Flips the fullscreen flag. The host resizes the surface afterwards.
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    /// Selects the root and returns to the select tool.
    pub fn focus_root(&mut self) {
        let root = self.map().root_id().to_string();
        self.interaction.set_tool(Tool::Select, self.history.current());
        self.interaction.select(Some(root));
        self.redraw();
    }

    // ---- pointer ------------------------------------------------------------------------------

    fn hit(&self, screen: Point) -> Option<String> {
        let viewport = self.viewport?;
        hit_test(self.map(), &self.positions, &self.view, &viewport, screen)
    }

    fn apply(&mut self, reaction: Reaction) {
        match reaction {
            Reaction::Unchanged => {}
            Reaction::Changed => self.redraw(),
            Reaction::Pan(offset) => {
                self.view.pan_to(offset);
                self.redraw();
            }
        }
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        let hit = self.hit(event.position);
        let reaction = self.interaction.pointer_down(
            event,
            hit.as_deref(),
            self.history.current(),
            self.view.offset,
        );
        self.apply(reaction);
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        let hit = self.hit(event.position);
        let reaction = self.interaction.pointer_move(event, hit.as_deref());
        self.apply(reaction);
    }

    pub fn pointer_up(&mut self) {
        let reaction = self.interaction.pointer_up();
        self.apply(reaction);
    }

    pub fn pointer_leave(&mut self) {
        let reaction = self.interaction.pointer_leave();
        self.apply(reaction);
    }

    /// Secondary-button request. Returns the actions offered for the node under the pointer,
    /// empty when the menu closed.
    pub fn context_menu(&mut self, position: Point) -> Vec<MenuAction> {
        let hit = self.hit(position);
        let reaction = self.interaction.open_context_menu(position, hit.as_deref());
        self.apply(reaction);
        self.interaction
            .context_menu()
            .map(|menu| MenuAction::available(self.map(), &menu.node_id))
            .unwrap_or_default()
    }

    /// Runs a context-menu action against the menu's node. Returns `Ok(false)` when no menu is
    /// open or the action is not offered for that node.
    pub fn menu_action(&mut self, action: MenuAction) -> Result<bool, EditError> {
        let Some(menu) = self.interaction.context_menu() else {
            return Ok(false);
        };
        if !MenuAction::available(self.map(), &menu.node_id).contains(&action) {
            tracing::warn!(?action, node = %menu.node_id, "menu action not available");
            return Ok(false);
        }
        let Some(menu) = self.interaction.close_context_menu() else {
            return Ok(false);
        };
        let id = menu.node_id;
        match action {
            MenuAction::Edit => {
                self.interaction.open_editor(self.history.current(), &id);
            }
            MenuAction::AddChild => self.interaction.open_add_draft(id),
            MenuAction::ToggleCollapse => {
                self.toggle_collapse(&id)?;
                return Ok(true);
            }
            MenuAction::Delete => self.interaction.request_delete(id),
        }
        self.redraw();
        Ok(true)
    }

    // ---- dialogs ------------------------------------------------------------------------------

    pub fn open_editor(&mut self, node_id: &str) -> bool {
        let opened = self.interaction.open_editor(self.history.current(), node_id);
        if opened {
            self.redraw();
        }
        opened
    }

    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.interaction.edit_buffer()
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        self.interaction.edit_buffer_mut()
    }

    /// Commits the edit buffer to the node it was opened for.
    pub fn save_edit(&mut self) -> Result<bool, EditError> {
        let Some(buffer) = self.interaction.take_edit_buffer() else {
            return Ok(false);
        };
        self.edit_node(&buffer.node_id, &buffer.text, &buffer.notes)?;
        Ok(true)
    }

    pub fn cancel_edit(&mut self) -> bool {
        let had = self.interaction.take_edit_buffer().is_some();
        if had {
            self.redraw();
        }
        had
    }

    pub fn add_draft(&self) -> Option<&AddDraft> {
        self.interaction.add_draft()
    }

    pub fn add_draft_mut(&mut self) -> Option<&mut AddDraft> {
        self.interaction.add_draft_mut()
    }

    /// Adds the drafted node and returns the tool to select. `Ok(None)` when no draft is open.
    pub fn commit_add(&mut self) -> Result<Option<String>, EditError> {
        let Some(draft) = self.interaction.take_add_draft() else {
            return Ok(None);
        };
        self.interaction.set_tool(Tool::Select, self.history.current());
        let id = self.add_node(Some(&draft.parent_id), &draft.text)?;
        Ok(Some(id))
    }

    pub fn cancel_add(&mut self) -> bool {
        let had = self.interaction.take_add_draft().is_some();
        if had {
            self.interaction.set_tool(Tool::Select, self.history.current());
            self.redraw();
        }
        had
    }

    pub fn request_delete(&mut self, node_id: &str) {
        self.interaction.request_delete(node_id.to_string());
        self.redraw();
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.interaction.pending_delete()
    }

    pub fn confirm_delete(&mut self) -> Result<Option<usize>, EditError> {
        let Some(id) = self.interaction.take_pending_delete() else {
            return Ok(None);
        };
        self.delete_node(&id).map(Some)
    }

    pub fn cancel_delete(&mut self) -> bool {
        let had = self.interaction.take_pending_delete().is_some();
        if had {
            self.redraw();
        }
        had
    }

    // ---- mutations ----------------------------------------------------------------------------

    /// Logs a refused edit and posts the matching error notice.
    fn reject(&mut self, operation: &str, err: EditError) -> EditError {
        tracing::warn!(error = %err, "{operation} rejected");
        self.notices.push(Notice::rejected(&err));
        err
    }

    fn commit(&mut self, next: MindMap) {
        self.history.record(next);
        self.interaction.forget_missing(self.history.current());
        self.relayout();
        self.redraw();
    }

    /// Adds a child under `parent_id`, or under the selection (root when nothing is selected).
    /// The new node becomes the selection; its id is returned.
    pub fn add_node(&mut self, parent_id: Option<&str>, text: &str) -> Result<String, EditError> {
        let map = self.history.current();
        let parent = match parent_id {
            Some(id) => id.to_string(),
            None => self
                .interaction
                .selected()
                .filter(|id| map.contains(id))
                .unwrap_or(map.root_id())
                .to_string(),
        };
        let id = self.ids.next_id(&self.clock, |candidate| map.contains(candidate));
        let next = match map.add_child(&parent, &id, text) {
            Ok(next) => next,
            Err(err) => return Err(self.reject("add node", err)),
        };

        tracing::info!(node = %id, parent = %parent, "added node");
        self.interaction.select(Some(id.clone()));
        self.commit(next);
        self.notices.push(Notice::node_added());
        Ok(id)
    }

    pub fn edit_node(&mut self, node_id: &str, text: &str, notes: &str) -> Result<(), EditError> {
        let next = match self.history.current().edit_node(node_id, text, notes) {
            Ok(next) => next,
            Err(err) => return Err(self.reject("edit", err)),
        };
        tracing::info!(node = %node_id, "edited node");
        self.commit(next);
        self.notices.push(Notice::node_updated());
        Ok(())
    }

    /// Deletes a node and its descendants and returns how many nodes were removed. Deleting the
    /// root is refused with an error notice and leaves everything unchanged.
    pub fn delete_node(&mut self, node_id: &str) -> Result<usize, EditError> {
        let deletion = match self.history.current().delete_subtree(node_id) {
            Ok(deletion) => deletion,
            Err(err) => return Err(self.reject("delete", err)),
        };
        let count = deletion.removed.len();
        tracing::info!(node = %node_id, removed = count, "deleted subtree");
        self.commit(deletion.map);
        self.notices.push(Notice::node_deleted(count));
        Ok(count)
    }

    pub fn toggle_collapse(&mut self, node_id: &str) -> Result<(), EditError> {
        let next = match self.history.current().toggle_collapsed(node_id) {
            Ok(next) => next,
            Err(err) => return Err(self.reject("toggle", err)),
        };
        tracing::info!(node = %node_id, "toggled collapse");
        self.commit(next);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        self.after_history_move("undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        self.after_history_move("redo");
        true
    }

    fn after_history_move(&mut self, direction: &str) {
        tracing::info!(index = self.history.index(), "{direction}");
        self.interaction.forget_missing(self.history.current());
        self.relayout();
        self.redraw();
    }

    // ---- export and commands ------------------------------------------------------------------

    /// Starts an export. PNG needs a mounted surface; only one export may be pending at a time.
    pub fn export(&mut self, format: ExportFormat) -> Result<PendingExport, ExportError> {
        let Some(guard) = ExportGuard::acquire(&self.export_busy) else {
            tracing::warn!(?format, "export already in progress");
            self.notices.push(Notice::export_in_flight());
            return Err(ExportError::InFlight);
        };

        let payload = match format {
            ExportFormat::Png => {
                if self.viewport.is_some() {
                    self.redraw();
                }
                let Some(svg) = self.frame.clone() else {
                    tracing::warn!("png export without a mounted surface");
                    self.notices.push(Notice::surface_missing());
                    return Err(ExportError::SurfaceUnavailable);
                };
                Payload::Png { svg }
            }
            ExportFormat::Xmind => Payload::Archive {
                map: self.history.current().clone(),
                created_at: self.clock.now(),
            },
        };

        tracing::info!(?format, "export started");
        Ok(PendingExport::new(
            format,
            self.config.export_file_stem(),
            payload,
            self.notices.clone(),
            guard,
        ))
    }

    /// Subscribes this engine to `bus`. Commands are handled by [`Engine::process_commands`].
    pub fn listen(&mut self, bus: &mut CommandBus) {
        self.commands = Some(bus.subscribe());
    }

    /// Handles every queued command and returns the exports they started.
    pub fn process_commands(&mut self) -> Vec<PendingExport> {
        let queued = self
            .commands
            .as_mut()
            .map(CommandReceiver::drain)
            .unwrap_or_default();

        let mut exports = Vec::new();
        for command in queued {
            match command {
                Command::ExportTestCases => {
                    tracing::debug!("test-case export is handled elsewhere");
                }
                Command::ExportMindMap(format) => {
                    if let Ok(pending) = self.export(format) {
                        exports.push(pending);
                    }
                }
                Command::EditMindMap => self.focus_root(),
            }
        }
        exports
    }
}
