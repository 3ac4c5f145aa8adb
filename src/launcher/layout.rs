// Menu geometry and list stepping

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Where and how large the launcher menu is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuLayout {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub row_height: f64,
    pub visible_rows: usize,
}

impl Default for MenuLayout {
    fn default() -> Self {
        Self {
            origin_x: 100.0,
            origin_y: 100.0,
            width: 320.0,
            row_height: 30.0,
            visible_rows: 12,
        }
    }
}

impl MenuLayout {
    /// Header row showing the current category, drawn above the items
    pub fn header(&self) -> Rect {
        Rect::new(
            self.origin_x,
            self.origin_y - self.row_height,
            self.width,
            self.row_height,
        )
    }

    /// Screen rectangle of visible row `row`
    pub fn row_rect(&self, row: usize) -> Rect {
        Rect::new(
            self.origin_x,
            self.origin_y + row as f64 * self.row_height,
            self.width,
            self.row_height,
        )
    }

    /// Panel behind `rows` item rows, header included
    pub fn panel(&self, rows: usize) -> Rect {
        let rows = rows.clamp(1, self.visible_rows.max(1));
        let header = self.header();
        Rect::new(
            header.x,
            header.y,
            self.width,
            self.row_height * (rows as f64 + 1.0),
        )
    }

    /// Visible row under a point, if any of the first `rows` rows
    pub fn row_at(&self, x: f64, y: f64, rows: usize) -> Option<usize> {
        if self.row_height <= 0.0 || x < self.origin_x || x >= self.origin_x + self.width {
            return None;
        }
        let offset = y - self.origin_y;
        if offset < 0.0 {
            return None;
        }
        let row = (offset / self.row_height) as usize;
        (row < rows.min(self.visible_rows)).then_some(row)
    }
}

/// Step one entry up (`forward == false`) or down a list.
/// Returns `None` at either end; lists never wrap.
pub fn step_list(current_index: usize, total_elements: usize, forward: bool) -> Option<usize> {
    if total_elements == 0 {
        return None;
    }

    if forward {
        if current_index < total_elements - 1 {
            Some(current_index + 1)
        } else {
            None
        }
    } else if current_index > 0 {
        Some(current_index - 1)
    } else {
        None
    }
}

/// Smallest scroll change that keeps `selected` inside the visible window
pub fn scroll_to(selected: usize, scroll: usize, visible_rows: usize) -> usize {
    let visible_rows = visible_rows.max(1);
    if selected < scroll {
        selected
    } else if selected >= scroll + visible_rows {
        selected + 1 - visible_rows
    } else {
        scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_stepping() {
        let total = 5;

        assert_eq!(step_list(2, total, false), Some(1));
        assert_eq!(step_list(2, total, true), Some(3));

        // Boundaries
        assert_eq!(step_list(0, total, false), None);
        assert_eq!(step_list(4, total, true), None);
        assert_eq!(step_list(0, 0, true), None);
    }

    #[test]
    fn test_scroll_follows_selection() {
        assert_eq!(scroll_to(0, 0, 3), 0);
        assert_eq!(scroll_to(3, 0, 3), 1);
        assert_eq!(scroll_to(1, 2, 3), 1);
        assert_eq!(scroll_to(2, 1, 3), 1);
    }

    #[test]
    fn test_row_hit_testing() {
        let layout = MenuLayout::default();
        assert_eq!(layout.row_at(110.0, 101.0, 3), Some(0));
        assert_eq!(layout.row_at(110.0, 165.0, 3), Some(2));
        assert_eq!(layout.row_at(110.0, 195.0, 3), None);
        assert_eq!(layout.row_at(50.0, 101.0, 3), None);
        assert_eq!(layout.row_at(110.0, 90.0, 3), None);
    }
}
