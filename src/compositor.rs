// Session state and the per-frame compositor loop

use tracing::{debug, info, warn};

use crate::app_registry::AppRegistry;
use crate::config::{BackgroundConfig, WmConfig};
use crate::error::ConfigError;
use crate::geometry::Rect;
use crate::input_handler::{Dispatcher, Hotkeys, InputSource, InputState, Routed};
use crate::launcher::{LauncherMenu, MenuLayout};
use crate::paint::PaintOverlay;
use crate::render::{Fill, Gradient, Renderer, Rgb, Texture, TextureId};
use crate::state::WindowStore;

const FRAME_FOCUSED: Rgb = Rgb(0.35, 0.55, 0.85);
const FRAME_UNFOCUSED: Rgb = Rgb(0.4, 0.4, 0.45);
const TITLE_FOCUSED: Rgb = Rgb(0.2, 0.35, 0.65);
const TITLE_UNFOCUSED: Rgb = Rgb(0.3, 0.3, 0.33);
const MENU_PANEL: Rgb = Rgb(0.12, 0.12, 0.16);
const MENU_HIGHLIGHT: Rgb = Rgb(0.25, 0.45, 0.8);
const MENU_HEADER_TEXT: Rgb = Rgb(0.7, 0.7, 0.75);
const BORDER: f64 = 2.0;

/// Everything input can change: windows, menu, paint, and what the menu lists
pub struct Desktop {
    pub windows: WindowStore,
    pub registry: AppRegistry,
    pub menu: LauncherMenu,
    pub paint: PaintOverlay,
    pub menu_layout: MenuLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Quit,
}

/// One window manager session. Owns all mutable state; nothing is global.
pub struct Session {
    desktop: Desktop,
    dispatcher: Dispatcher,
    background: BackgroundConfig,
    /// Full-screen background texture; drawn instead of the gradient when set
    bg_image: Option<TextureId>,
    autostart: Vec<String>,
    frames: u64,
}

impl Session {
    pub fn new(config: &WmConfig, registry: AppRegistry) -> Result<Self, ConfigError> {
        let hotkeys = Hotkeys::from_config(&config.hotkeys)?;
        info!(
            menu = %hotkeys.menu,
            paint = %hotkeys.paint,
            quit = %hotkeys.quit,
            "session created"
        );
        Ok(Self {
            desktop: Desktop {
                windows: WindowStore::new(),
                registry,
                menu: LauncherMenu::Closed,
                paint: PaintOverlay::new(config.paint.radius),
                menu_layout: config.menu,
            },
            dispatcher: Dispatcher::new(hotkeys),
            background: config.background,
            bg_image: None,
            autostart: config.autostart.clone(),
            frames: 0,
        })
    }

    pub fn desktop(&self) -> &Desktop {
        &self.desktop
    }

    pub fn desktop_mut(&mut self) -> &mut Desktop {
        &mut self.desktop
    }

    pub fn input_state(&self) -> &InputState {
        self.dispatcher.state()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn set_bg_color(&mut self, color: Rgb) {
        self.background.color = color;
    }

    pub fn set_bg_gradient(&mut self, gradient: Option<Gradient>) {
        self.background.gradient = gradient;
    }

    /// Upload `image` to `renderer` and stretch it over the whole background
    pub fn set_bg_image(&mut self, renderer: &mut dyn Renderer, image: Texture) -> TextureId {
        let (width, height) = image.size();
        let id = renderer.upload_texture(image);
        info!(?id, width, height, "background image set");
        self.bg_image = Some(id);
        id
    }

    /// Go back to the clear colour and gradient
    pub fn clear_bg_image(&mut self) {
        self.bg_image = None;
    }

    /// Open the configured startup applications. Failures are logged and skipped.
    /// Returns how many windows were opened.
    pub fn autostart(&mut self) -> usize {
        let mut opened = 0;
        for identifier in &self.autostart {
            match self.desktop.registry.load_by_id(identifier, None) {
                Ok(window) => {
                    self.desktop.windows.add(window);
                    opened += 1;
                }
                Err(e) => warn!(%identifier, error = %e, "autostart failed"),
            }
        }
        opened
    }

    /// Drain pending keyboard events, then pending pointer events.
    /// A failing stream is skipped for this frame only.
    pub fn dispatch_input(&mut self, input: &mut dyn InputSource) -> FrameStatus {
        let mut status = FrameStatus::Continue;

        match input.poll_keyboard() {
            Ok(events) => {
                for event in events {
                    if let Routed::Quit = self.dispatcher.dispatch_key(event, &mut self.desktop) {
                        status = FrameStatus::Quit;
                    }
                }
            }
            Err(e) => debug!(error = %e, "keyboard read failed, retrying next frame"),
        }

        match input.poll_pointer() {
            Ok(events) => {
                for event in events {
                    self.dispatcher.dispatch_pointer(event, &mut self.desktop);
                }
            }
            Err(e) => debug!(error = %e, "pointer read failed, retrying next frame"),
        }

        status
    }

    /// Compose one frame: background, windows back to front, menu, paint
    pub fn render(&self, renderer: &mut dyn Renderer) {
        let (width, height) = renderer.screen_size();
        renderer.clear(self.background.color);
        let screen = Rect::new(0.0, 0.0, width, height);
        if let Some(image) = self.bg_image {
            renderer.draw_quad(screen, Fill::Texture(image));
        } else if let Some(gradient) = self.background.gradient {
            renderer.draw_quad(screen, Fill::Gradient(gradient));
        }

        self.render_windows(renderer);

        if self.desktop.menu.is_open() {
            self.render_menu(renderer);
        }

        if self.desktop.paint.is_active() {
            self.render_paint(renderer);
        }
    }

    /// One iteration of the run loop: input, render, present
    pub fn frame(&mut self, input: &mut dyn InputSource, renderer: &mut dyn Renderer) -> FrameStatus {
        let status = self.dispatch_input(input);
        self.render(renderer);
        if let Err(e) = renderer.present() {
            warn!(error = %e, "frame not presented");
        }
        self.frames += 1;
        status
    }

    fn render_windows(&self, renderer: &mut dyn Renderer) {
        let windows = &self.desktop.windows;
        let focus = windows.focus();

        for window in windows.iter_back_to_front() {
            let focused = focus == Some(window.id);
            let (frame, title) = if focused {
                (FRAME_FOCUSED, TITLE_FOCUSED)
            } else {
                (FRAME_UNFOCUSED, TITLE_UNFOCUSED)
            };

            let outer = Rect::new(
                window.bounds.x - BORDER,
                window.bounds.y - BORDER,
                window.bounds.width + BORDER * 2.0,
                window.bounds.height + BORDER * 2.0,
            );
            renderer.draw_quad(outer, Fill::Solid(frame));
            renderer.draw_quad(window.title_bar(), Fill::Solid(title));
            window.content().draw(renderer, window.body());
            renderer.draw_text(
                &window.title,
                (window.bounds.x + 6.0, window.bounds.y + 4.0),
                Rgb::WHITE,
            );
        }
    }

    fn render_menu(&self, renderer: &mut dyn Renderer) {
        let layout = &self.desktop.menu_layout;
        let tree = self.desktop.registry.tree();
        let items = self.desktop.menu.items(tree, layout);

        renderer.draw_quad(layout.panel(items.len()), Fill::Solid(MENU_PANEL));

        let header = self
            .desktop
            .menu
            .cursor()
            .map(|cursor| tree.path_of(cursor.node).join(" / "))
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| "Applications".to_string());
        let header_rect = layout.header();
        renderer.draw_text(&header, (header_rect.x + 10.0, header_rect.y + 7.0), MENU_HEADER_TEXT);

        if items.is_empty() {
            let row = layout.row_rect(0);
            renderer.draw_text("(no applications)", (row.x + 10.0, row.y + 7.0), MENU_HEADER_TEXT);
            return;
        }

        for (i, item) in items.iter().enumerate() {
            let row = layout.row_rect(i);
            if item.selected {
                renderer.draw_quad(row, Fill::Solid(MENU_HIGHLIGHT));
            }
            let label = if item.is_category {
                format!("{} >", item.label)
            } else {
                item.label.to_string()
            };
            renderer.draw_text(&label, (row.x + 10.0, row.y + 7.0), Rgb::WHITE);
        }
    }

    fn render_paint(&self, renderer: &mut dyn Renderer) {
        let paint = &self.desktop.paint;
        for stroke in paint.all_strokes() {
            for &(x, y) in &stroke.points {
                renderer.draw_shape(stroke.shape, Rect::around(x, y, stroke.radius), stroke.color());
            }
        }

        // Brush preview under the pointer
        let (x, y) = self.dispatcher.state().pointer;
        renderer.draw_shape(paint.shape(), Rect::around(x, y, paint.radius()), paint.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_registry::{builtin, ApplicationTree, Catalog, LoadParams};
    use crate::error::{AppError, Device};
    use crate::input_handler::{Key, KeyEvent, PointerButton, PointerEvent, ScriptedInput};
    use crate::launcher::MenuOutcome;
    use crate::render::{DrawOp, HeadlessRenderer, Shape};
    use crate::state::window::WindowSurface;

    fn registry() -> AppRegistry {
        let mut catalog = Catalog::with_builtins();
        catalog.register(
            "editor",
            |_params: Option<&LoadParams>| -> Result<WindowSurface, AppError> {
                Err(AppError::new("editor refused to start"))
            },
        );
        catalog.register("snake", builtin::About);

        let mut tree = ApplicationTree::new();
        tree.add_application(ApplicationTree::ROOT, "about", "About", "about");
        tree.add_application(ApplicationTree::ROOT, "editor", "Editor", "editor");
        let games = tree.add_category(ApplicationTree::ROOT, "games");
        tree.add_application(games, "snake", "Snake", "snake");
        AppRegistry::new(tree, catalog)
    }

    fn session() -> Session {
        Session::new(&WmConfig::default(), registry()).unwrap()
    }

    fn press(key: Key) -> KeyEvent {
        KeyEvent::press(key)
    }

    fn click(x: f64, y: f64, button: PointerButton) -> Vec<PointerEvent> {
        vec![
            PointerEvent::MovedTo { x, y },
            PointerEvent::Button {
                button,
                pressed: true,
            },
            PointerEvent::Button {
                button,
                pressed: false,
            },
        ]
    }

    fn open_window(session: &mut Session, id: &str, x: f64, y: f64) -> crate::state::window::WindowId {
        let params = serde_json::json!({ "x": x, "y": y, "width": 200.0, "height": 150.0 });
        let window = session
            .desktop()
            .registry
            .load_by_id(id, Some(&params))
            .unwrap();
        session.desktop_mut().windows.add(window)
    }

    fn position(ops: &[DrawOp], pred: impl Fn(&DrawOp) -> bool) -> usize {
        ops.iter().position(pred).expect("op not found")
    }

    #[test]
    fn test_composition_order() {
        let mut session = session();
        open_window(&mut session, "about", 400.0, 300.0);

        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::F(1)), press(Key::F(2))]);
        let mut renderer = HeadlessRenderer::new(1280.0, 720.0);
        assert_eq!(session.frame(&mut input, &mut renderer), FrameStatus::Continue);

        let ops = renderer.ops();
        assert_eq!(ops[0], DrawOp::Clear(Rgb(0.0, 0.5, 0.5)));
        assert!(matches!(
            ops[1],
            DrawOp::Quad {
                fill: Fill::Gradient(_),
                ..
            }
        ));
        let title = position(ops, |op| matches!(op, DrawOp::Text { text, .. } if text == "About"));
        let menu = position(ops, |op| matches!(op, DrawOp::Text { text, .. } if text == "Applications"));
        let brush = position(ops, |op| matches!(op, DrawOp::Shape { .. }));
        assert!(1 < title && title < menu && menu < brush);
        assert_eq!(ops.last(), Some(&DrawOp::Present));
        assert_eq!(renderer.frames_presented(), 1);
    }

    #[test]
    fn test_windows_render_back_to_front() {
        let mut session = session();
        let a = open_window(&mut session, "about", 0.0, 0.0);
        open_window(&mut session, "notes", 50.0, 50.0);
        session.desktop_mut().windows.raise_to_top(&a);

        let mut renderer = HeadlessRenderer::new(1280.0, 720.0);
        session.render(&mut renderer);

        let titles: Vec<&str> = renderer
            .texts()
            .into_iter()
            .filter(|t| *t == "About" || *t == "Notes")
            .collect();
        assert_eq!(titles, ["Notes", "About"]);
    }

    #[test]
    fn test_menu_launch_through_keyboard() {
        let mut session = session();
        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::F(1)), press(Key::Enter)]);
        session.dispatch_input(&mut input);

        assert!(!session.desktop().menu.is_open());
        assert_eq!(session.desktop().windows.len(), 1);
    }

    #[test]
    fn test_menu_load_failure_keeps_menu_open() {
        let mut session = session();
        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::F(1)), press(Key::Down), press(Key::Enter)]);
        session.dispatch_input(&mut input);

        assert!(session.desktop().menu.is_open());
        assert_eq!(session.desktop().menu.cursor().unwrap().selected, 1);
        assert!(session.desktop().windows.is_empty());
    }

    #[test]
    fn test_menu_is_modal() {
        let mut session = session();
        let id = open_window(&mut session, "notes", 400.0, 400.0);

        let mut input = ScriptedInput::new();
        input
            .push_keys(vec![press(Key::F(1)), press(Key::Char('x'))])
            .push_pointer(click(450.0, 450.0, PointerButton::Left));
        session.dispatch_input(&mut input);

        // Typing and clicking went nowhere
        let mut renderer = HeadlessRenderer::new(1280.0, 720.0);
        session.render(&mut renderer);
        assert!(renderer.texts().contains(&"_"));
        assert!(session.desktop().menu.is_open());
        assert_eq!(session.desktop().windows.focus(), Some(id));
    }

    #[test]
    fn test_menu_pointer_selects_row() {
        let mut session = session();
        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::F(1))]);
        // Third row is the "games" category
        input.push_pointer(click(150.0, 100.0 + 2.5 * 30.0, PointerButton::Left));
        session.dispatch_input(&mut input);

        let games = session.desktop().registry.tree().lookup(&["games"]).unwrap();
        assert_eq!(session.desktop().menu.cursor().unwrap().node, games);

        // First row inside "games" launches
        let mut input = ScriptedInput::new();
        input.push_pointer(click(150.0, 105.0, PointerButton::Left));
        session.dispatch_input(&mut input);
        assert!(!session.desktop().menu.is_open());
        assert_eq!(session.desktop().windows.len(), 1);
    }

    #[test]
    fn test_empty_tree_select_is_noop() {
        let registry = AppRegistry::new(ApplicationTree::new(), Catalog::new());
        let mut session = Session::new(&WmConfig::default(), registry).unwrap();

        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::F(1)), press(Key::Enter), press(Key::Down)]);
        let mut renderer = HeadlessRenderer::new(1280.0, 720.0);
        session.frame(&mut input, &mut renderer);

        assert!(session.desktop().menu.is_open());
        assert!(session.desktop().windows.is_empty());
        assert!(renderer.texts().contains(&"(no applications)"));
    }

    #[test]
    fn test_paint_strokes_only_when_active() {
        let mut session = session();
        let drag = vec![
            PointerEvent::MovedTo { x: 10.0, y: 10.0 },
            PointerEvent::Button {
                button: PointerButton::Left,
                pressed: true,
            },
            PointerEvent::MovedTo { x: 20.0, y: 20.0 },
            PointerEvent::Button {
                button: PointerButton::Left,
                pressed: false,
            },
        ];

        let mut input = ScriptedInput::new();
        input.push_pointer(drag.clone());
        session.dispatch_input(&mut input);
        assert_eq!(session.desktop().paint.all_strokes().count(), 0);

        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::F(2))]).push_pointer(drag);
        session.dispatch_input(&mut input);

        let strokes = session.desktop().paint.strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].points, vec![(10.0, 10.0), (20.0, 20.0)]);
    }

    #[test]
    fn test_paint_pointer_buttons_adjust_brush() {
        let mut session = session();
        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::F(2))]);
        let mut events = click(5.0, 5.0, PointerButton::Right);
        events.extend(click(5.0, 5.0, PointerButton::Middle));
        events.push(PointerEvent::Scroll { delta: 3 });
        input.push_pointer(events);
        session.dispatch_input(&mut input);

        let paint = &session.desktop().paint;
        assert_eq!(paint.color_index(), 1);
        assert_eq!(paint.shape(), Shape::Square);
        assert_eq!(paint.radius(), 13.0);

        // F3 clears the canvas while painting
        let mut input = ScriptedInput::new();
        input
            .push_keys(vec![])
            .push_pointer(click(5.0, 5.0, PointerButton::Left));
        session.dispatch_input(&mut input);
        assert_eq!(session.desktop().paint.strokes().len(), 1);

        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::F(3))]);
        session.dispatch_input(&mut input);
        assert!(session.desktop().paint.strokes().is_empty());
    }

    #[test]
    fn test_pointer_read_failure_is_transient() {
        let mut session = session();
        let mut input = ScriptedInput::new();
        input
            .push_keys(vec![press(Key::F(2))])
            .push_failure(Device::Pointer)
            .push_pointer(click(30.0, 30.0, PointerButton::Left));
        let mut renderer = HeadlessRenderer::new(1280.0, 720.0);

        // Frame N: keyboard applies, pointer skipped
        assert_eq!(session.frame(&mut input, &mut renderer), FrameStatus::Continue);
        assert!(session.desktop().paint.is_active());
        assert!(session.desktop().paint.strokes().is_empty());

        // Frame N+1: pointer polled again
        session.frame(&mut input, &mut renderer);
        assert_eq!(session.desktop().paint.strokes().len(), 1);
        assert_eq!(session.frames(), 2);
    }

    #[test]
    fn test_click_raises_and_title_drag_moves() {
        let mut session = session();
        let a = open_window(&mut session, "about", 100.0, 100.0);
        let b = open_window(&mut session, "notes", 500.0, 100.0);
        assert_eq!(session.desktop().windows.focus(), Some(b));

        let mut input = ScriptedInput::new();
        input.push_pointer(vec![
            PointerEvent::MovedTo { x: 110.0, y: 105.0 },
            PointerEvent::Button {
                button: PointerButton::Left,
                pressed: true,
            },
            PointerEvent::MovedTo { x: 140.0, y: 125.0 },
            PointerEvent::MovedBy { dx: 10.0, dy: 0.0 },
            PointerEvent::Button {
                button: PointerButton::Left,
                pressed: false,
            },
            PointerEvent::MovedTo { x: 400.0, y: 400.0 },
        ]);
        session.dispatch_input(&mut input);

        let windows = &session.desktop().windows;
        assert_eq!(windows.focus(), Some(a));
        assert_eq!(windows.stack().last(), Some(&a));
        assert_eq!(windows.get(&a).unwrap().position(), (140.0, 120.0));
    }

    #[test]
    fn test_keys_go_to_focused_window() {
        let mut session = session();
        open_window(&mut session, "notes", 100.0, 100.0);
        let about = open_window(&mut session, "about", 400.0, 100.0);

        // Esc closes the focused About window; typing then reaches Notes
        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::Escape), press(Key::Char('o')), press(Key::Char('k'))]);
        session.dispatch_input(&mut input);

        assert!(session.desktop().windows.get(&about).is_none());
        assert_eq!(session.desktop().windows.len(), 1);

        let mut renderer = HeadlessRenderer::new(1280.0, 720.0);
        session.render(&mut renderer);
        assert!(renderer.texts().contains(&"ok_"));
    }

    #[test]
    fn test_quit_hotkey() {
        let mut session = session();
        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::Control), press(Key::Char('q'))]);
        let mut renderer = HeadlessRenderer::new(640.0, 480.0);
        assert_eq!(session.frame(&mut input, &mut renderer), FrameStatus::Quit);
    }

    #[test]
    fn test_hotkeys_toggle_from_any_mode() {
        let mut session = session();
        let mut input = ScriptedInput::new();
        input.push_keys(vec![press(Key::F(1)), press(Key::F(2)), press(Key::F(1))]);
        session.dispatch_input(&mut input);

        assert!(!session.desktop().menu.is_open());
        assert!(session.desktop().paint.is_active());
    }

    #[test]
    fn test_autostart_skips_unknown() {
        let config = WmConfig {
            autostart: vec!["about".to_string(), "missing".to_string(), "notes".to_string()],
            ..WmConfig::default()
        };
        let mut session = Session::new(&config, registry()).unwrap();
        assert_eq!(session.autostart(), 2);

        let titles: Vec<String> = session
            .desktop()
            .windows
            .snapshot()
            .into_iter()
            .map(|w| w.title)
            .collect();
        assert_eq!(titles, ["About", "Notes"]);
    }

    #[test]
    fn test_background_color_override() {
        let mut session = session();
        session.set_bg_color(Rgb::BLACK);
        session.set_bg_gradient(None);

        let mut renderer = HeadlessRenderer::new(640.0, 480.0);
        session.render(&mut renderer);
        assert_eq!(renderer.ops(), &[DrawOp::Clear(Rgb::BLACK)]);
    }

    #[test]
    fn test_background_image_replaces_gradient() {
        let mut session = session();
        let mut renderer = HeadlessRenderer::new(640.0, 480.0);
        let image = Texture::new(2, 1, vec![Rgb::WHITE, Rgb::BLACK]).unwrap();
        let id = session.set_bg_image(&mut renderer, image);

        session.render(&mut renderer);
        assert_eq!(
            renderer.ops(),
            &[
                DrawOp::Clear(Rgb(0.0, 0.5, 0.5)),
                DrawOp::Quad {
                    transform: Rect::new(0.0, 0.0, 640.0, 480.0),
                    fill: Fill::Texture(id),
                },
            ]
        );
        assert_eq!(renderer.texture(id).unwrap().size(), (2, 1));

        session.clear_bg_image();
        session.render(&mut renderer);
        assert!(matches!(
            renderer.ops()[1],
            DrawOp::Quad {
                fill: Fill::Gradient(_),
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_hotkey_rejected() {
        let mut config = WmConfig::default();
        config.hotkeys.menu = "Hyper+Nope".to_string();
        assert!(matches!(
            Session::new(&config, registry()),
            Err(ConfigError::InvalidHotkey { name: "menu", .. })
        ));
    }

    #[test]
    fn test_launch_outcome_reported() {
        let mut session = session();
        let desktop = session.desktop_mut();
        desktop.menu.toggle();
        let outcome = desktop
            .menu
            .select(&desktop.registry, &mut desktop.windows, None);
        assert!(matches!(outcome, MenuOutcome::Launched(_)));
    }
}
