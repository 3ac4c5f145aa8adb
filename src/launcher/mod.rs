// Launcher menu: modal overlay for browsing and starting applications

pub mod layout;

use tracing::{debug, warn};

use crate::app_registry::{AppRegistry, ApplicationTree, LoadParams, NodeId};
use crate::error::LoadError;
use crate::state::window::WindowId;
use crate::state::WindowStore;

pub use layout::MenuLayout;
use layout::{scroll_to, step_list};

/// Position inside the application tree while the menu is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCursor {
    /// Category whose children are listed
    pub node: NodeId,
    /// Highlighted child index
    pub selected: usize,
    /// First visible child index
    pub scroll: usize,
}

impl MenuCursor {
    fn at(node: NodeId) -> Self {
        Self {
            node,
            selected: 0,
            scroll: 0,
        }
    }
}

/// Menu state. Closing drops the cursor, so reopening always starts at the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LauncherMenu {
    #[default]
    Closed,
    Open(MenuCursor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuNav {
    Up,
    Down,
    /// Enter the highlighted category
    Into,
    /// Return to the parent category
    Back,
}

/// Result of a menu action
#[derive(Debug)]
pub enum MenuOutcome {
    Opened,
    Closed,
    Moved { selected: usize },
    Descended,
    Ascended,
    /// Hit the edge of the list or tree
    Boundary,
    /// Application started and the menu closed
    Launched(WindowId),
    /// Load failed; the menu stays open where it was
    LoadFailed(LoadError),
    /// Current category has nothing to select
    Empty,
    /// Menu is closed
    Ignored,
}

/// One visible menu row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem<'a> {
    pub label: &'a str,
    pub is_category: bool,
    pub selected: bool,
}

impl LauncherMenu {
    pub fn is_open(&self) -> bool {
        matches!(self, LauncherMenu::Open(_))
    }

    pub fn cursor(&self) -> Option<&MenuCursor> {
        match self {
            LauncherMenu::Open(cursor) => Some(cursor),
            LauncherMenu::Closed => None,
        }
    }

    pub fn toggle(&mut self) -> MenuOutcome {
        match self {
            LauncherMenu::Closed => {
                *self = LauncherMenu::Open(MenuCursor::at(ApplicationTree::ROOT));
                debug!("launcher menu opened");
                MenuOutcome::Opened
            }
            LauncherMenu::Open(_) => self.close(),
        }
    }

    pub fn close(&mut self) -> MenuOutcome {
        *self = LauncherMenu::Closed;
        debug!("launcher menu closed");
        MenuOutcome::Closed
    }

    pub fn navigate(&mut self, tree: &ApplicationTree, nav: MenuNav, layout: &MenuLayout) -> MenuOutcome {
        let LauncherMenu::Open(cursor) = self else {
            return MenuOutcome::Ignored;
        };
        let children = tree.children(cursor.node);

        match nav {
            MenuNav::Up | MenuNav::Down => {
                match step_list(cursor.selected, children.len(), nav == MenuNav::Down) {
                    Some(selected) => {
                        cursor.selected = selected;
                        cursor.scroll = scroll_to(selected, cursor.scroll, layout.visible_rows);
                        MenuOutcome::Moved { selected }
                    }
                    None => MenuOutcome::Boundary,
                }
            }
            MenuNav::Into => match children.get(cursor.selected) {
                Some(&child) if tree.node(child).is_category() => {
                    *cursor = MenuCursor::at(child);
                    MenuOutcome::Descended
                }
                _ => MenuOutcome::Boundary,
            },
            MenuNav::Back => {
                let Some(parent) = tree.node(cursor.node).parent else {
                    return MenuOutcome::Boundary;
                };
                // Land back on the category we came out of
                let selected = tree
                    .children(parent)
                    .iter()
                    .position(|c| *c == cursor.node)
                    .unwrap_or(0);
                *cursor = MenuCursor {
                    node: parent,
                    selected,
                    scroll: scroll_to(selected, 0, layout.visible_rows),
                };
                MenuOutcome::Ascended
            }
        }
    }

    /// Activate the highlighted entry: descend into a category, or load an
    /// application into `windows` and close the menu.
    pub fn select(
        &mut self,
        registry: &AppRegistry,
        windows: &mut WindowStore,
        params: Option<&LoadParams>,
    ) -> MenuOutcome {
        let LauncherMenu::Open(cursor) = self else {
            return MenuOutcome::Ignored;
        };
        let tree = registry.tree();
        let Some(&child) = tree.children(cursor.node).get(cursor.selected) else {
            return MenuOutcome::Empty;
        };

        if tree.node(child).is_category() {
            *cursor = MenuCursor::at(child);
            return MenuOutcome::Descended;
        }

        match registry.load_node(child, params) {
            Ok(window) => {
                let id = windows.add(window);
                *self = LauncherMenu::Closed;
                MenuOutcome::Launched(id)
            }
            Err(e) => {
                warn!(error = %e, "launch failed, menu stays open");
                MenuOutcome::LoadFailed(e)
            }
        }
    }

    /// Highlight visible row `row` and select it
    pub fn select_row(
        &mut self,
        row: usize,
        registry: &AppRegistry,
        windows: &mut WindowStore,
    ) -> MenuOutcome {
        let LauncherMenu::Open(cursor) = self else {
            return MenuOutcome::Ignored;
        };
        let index = cursor.scroll + row;
        if index >= registry.tree().children(cursor.node).len() {
            return MenuOutcome::Boundary;
        }
        let previous = cursor.clone();
        cursor.selected = index;

        let outcome = self.select(registry, windows, None);
        if let MenuOutcome::LoadFailed(_) = outcome {
            *self = LauncherMenu::Open(previous);
        }
        outcome
    }

    /// Rows currently in view
    pub fn items<'a>(&self, tree: &'a ApplicationTree, layout: &MenuLayout) -> Vec<MenuItem<'a>> {
        let Some(cursor) = self.cursor() else {
            return Vec::new();
        };
        tree.children(cursor.node)
            .iter()
            .enumerate()
            .skip(cursor.scroll)
            .take(layout.visible_rows)
            .map(|(index, id)| {
                let node = tree.node(*id);
                MenuItem {
                    label: &node.label,
                    is_category: node.is_category(),
                    selected: index == cursor.selected,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_registry::{builtin, Catalog};
    use crate::error::AppError;
    use crate::state::window::WindowSurface;

    fn registry() -> AppRegistry {
        let mut catalog = Catalog::with_builtins();
        catalog.register(
            "editor",
            |_params: Option<&LoadParams>| -> Result<WindowSurface, AppError> {
                Err(AppError::new("no display"))
            },
        );
        catalog.register("games.snake", builtin::About);

        let mut tree = ApplicationTree::new();
        tree.add_application(ApplicationTree::ROOT, "about", "about", "about");
        tree.add_application(ApplicationTree::ROOT, "editor", "editor", "editor");
        let games = tree.add_category(ApplicationTree::ROOT, "games");
        tree.add_application(games, "snake", "snake", "games.snake");
        AppRegistry::new(tree, catalog)
    }

    #[test]
    fn test_toggle_resets_cursor() {
        let registry = registry();
        let layout = MenuLayout::default();
        let mut menu = LauncherMenu::Closed;

        menu.toggle();
        menu.navigate(registry.tree(), MenuNav::Down, &layout);
        menu.navigate(registry.tree(), MenuNav::Down, &layout);
        menu.navigate(registry.tree(), MenuNav::Into, &layout);
        assert_ne!(menu.cursor().unwrap().node, ApplicationTree::ROOT);

        assert!(matches!(menu.toggle(), MenuOutcome::Closed));
        assert_eq!(menu, LauncherMenu::Closed);

        menu.toggle();
        assert_eq!(
            menu.cursor(),
            Some(&MenuCursor {
                node: ApplicationTree::ROOT,
                selected: 0,
                scroll: 0
            })
        );
    }

    #[test]
    fn test_navigation_stops_at_boundaries() {
        let registry = registry();
        let tree = registry.tree();
        let layout = MenuLayout::default();
        let mut menu = LauncherMenu::Closed;
        menu.toggle();

        assert!(matches!(menu.navigate(tree, MenuNav::Up, &layout), MenuOutcome::Boundary));
        assert!(matches!(menu.navigate(tree, MenuNav::Back, &layout), MenuOutcome::Boundary));
        // Leaf under the cursor: nothing to enter
        assert!(matches!(menu.navigate(tree, MenuNav::Into, &layout), MenuOutcome::Boundary));

        menu.navigate(tree, MenuNav::Down, &layout);
        menu.navigate(tree, MenuNav::Down, &layout);
        assert!(matches!(menu.navigate(tree, MenuNav::Down, &layout), MenuOutcome::Boundary));
        assert_eq!(menu.cursor().unwrap().selected, 2);

        assert!(matches!(menu.navigate(tree, MenuNav::Into, &layout), MenuOutcome::Descended));
        assert!(matches!(menu.navigate(tree, MenuNav::Back, &layout), MenuOutcome::Ascended));
        // Back on "games"
        assert_eq!(menu.cursor().unwrap().selected, 2);
    }

    #[test]
    fn test_select_leaf_launches_and_closes() {
        let registry = registry();
        let mut windows = WindowStore::new();
        let mut menu = LauncherMenu::Closed;
        menu.toggle();

        let outcome = menu.select(&registry, &mut windows, None);
        let MenuOutcome::Launched(id) = outcome else {
            panic!("expected Launched, got {:?}", outcome);
        };
        assert_eq!(windows.focus(), Some(id));
        assert!(!menu.is_open());
    }

    #[test]
    fn test_select_failure_keeps_menu_open() {
        let registry = registry();
        let layout = MenuLayout::default();
        let mut windows = WindowStore::new();
        let mut menu = LauncherMenu::Closed;
        menu.toggle();
        menu.navigate(registry.tree(), MenuNav::Down, &layout);
        let before = menu.clone();

        let outcome = menu.select(&registry, &mut windows, None);
        assert!(matches!(outcome, MenuOutcome::LoadFailed(LoadError::Failed { .. })));
        assert!(windows.is_empty());
        assert_eq!(menu, before);
    }

    #[test]
    fn test_row_select_failure_keeps_cursor() {
        let registry = registry();
        let mut windows = WindowStore::new();
        let mut menu = LauncherMenu::Closed;
        menu.toggle();
        let before = menu.clone();

        // Row 1 is "editor", whose load fails
        let outcome = menu.select_row(1, &registry, &mut windows);
        assert!(matches!(outcome, MenuOutcome::LoadFailed(LoadError::Failed { .. })));
        assert!(windows.is_empty());
        assert_eq!(menu, before);

        // A row past the end leaves the cursor alone as well
        assert!(matches!(menu.select_row(7, &registry, &mut windows), MenuOutcome::Boundary));
        assert_eq!(menu, before);
    }

    #[test]
    fn test_select_category_descends() {
        let registry = registry();
        let mut windows = WindowStore::new();
        let mut menu = LauncherMenu::Closed;
        menu.toggle();

        assert!(matches!(
            menu.select_row(2, &registry, &mut windows),
            MenuOutcome::Descended
        ));
        let games = registry.tree().lookup(&["games"]).unwrap();
        assert_eq!(menu.cursor().unwrap().node, games);

        let items = menu.items(registry.tree(), &MenuLayout::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "snake");
        assert!(items[0].selected);
    }

    #[test]
    fn test_empty_tree_select_is_noop() {
        let registry = AppRegistry::new(ApplicationTree::new(), Catalog::new());
        let mut windows = WindowStore::new();
        let mut menu = LauncherMenu::Closed;

        assert!(matches!(menu.toggle(), MenuOutcome::Opened));
        assert!(registry.tree().children(menu.cursor().unwrap().node).is_empty());
        assert!(matches!(menu.select(&registry, &mut windows, None), MenuOutcome::Empty));
        assert!(menu.is_open());
        assert!(windows.is_empty());
    }

    #[test]
    fn test_scroll_keeps_selection_visible() {
        let mut tree = ApplicationTree::new();
        for i in 0..5 {
            tree.add_application(ApplicationTree::ROOT, format!("a{}", i), format!("a{}", i), "about");
        }
        let layout = MenuLayout {
            visible_rows: 2,
            ..MenuLayout::default()
        };
        let mut menu = LauncherMenu::Closed;
        menu.toggle();
        for _ in 0..3 {
            menu.navigate(&tree, MenuNav::Down, &layout);
        }
        let cursor = menu.cursor().unwrap();
        assert_eq!((cursor.selected, cursor.scroll), (3, 2));

        let labels: Vec<&str> = menu.items(&tree, &layout).iter().map(|i| i.label).collect();
        assert_eq!(labels, ["a2", "a3"]);
    }
}
