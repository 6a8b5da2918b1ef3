//! Hierarchical launcher menu over an [`EntryTree`].

use std::borrow::Cow;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::entries::{parent_dir, Entry, EntryKind, EntryTree};
use crate::icons::{self, draw_icon, Icon};
use crate::text::{draw_text, fill_rect, fit_to_width, Metrics};

/// Rows shown at once.
pub const MAX_VISIBLE_LINES: usize = 8;

const DOCUMENTATION_DIR: &str = "/Settings/Documentation/";

/// What the host loop should do after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    None,
    /// Moved into a folder or back out of one; the menu needs a redraw.
    Navigated,
    /// Start the app registered under `name`.
    Launch { name: String, path: String },
    /// Show a text file.
    OpenFile { title: String, path: String },
}

pub struct Menu {
    tree: EntryTree,
    current_path: String,
    selected: usize,
    needs_redraw: bool,
}

impl Menu {
    pub fn new(tree: EntryTree) -> Self {
        Self {
            tree,
            current_path: "/".to_string(),
            selected: 0,
            needs_redraw: true,
        }
    }

    pub fn tree(&self) -> &EntryTree {
        &self.tree
    }

    /// Current folder, always with leading and trailing slashes.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn has_back_entry(&self) -> bool {
        self.current_path != "/"
    }

    fn current_entries(&self) -> Vec<&Entry> {
        self.tree.entries_in(&self.current_path)
    }

    /// Rows in the current folder, including the back entry.
    pub fn visible_item_count(&self) -> usize {
        self.current_entries().len() + usize::from(self.has_back_entry())
    }

    /// The selected entry, or `None` on the back entry.
    pub fn selected_entry(&self) -> Option<&Entry> {
        let index = if self.has_back_entry() {
            self.selected.checked_sub(1)?
        } else {
            self.selected
        };
        self.current_entries().get(index).copied()
    }

    pub fn up(&mut self) {
        let total = self.visible_item_count();
        if total == 0 {
            return;
        }
        self.selected = self.selected.checked_sub(1).unwrap_or(total - 1);
        self.needs_redraw = true;
    }

    pub fn down(&mut self) {
        let total = self.visible_item_count();
        if total == 0 {
            return;
        }
        self.selected = (self.selected + 1) % total;
        self.needs_redraw = true;
    }

    /// Act on the selected row.
    pub fn select(&mut self) -> MenuAction {
        if self.visible_item_count() == 0 {
            return MenuAction::None;
        }
        if self.has_back_entry() && self.selected == 0 {
            self.go_back();
            return MenuAction::Navigated;
        }
        let Some(entry) = self.selected_entry() else {
            return MenuAction::None;
        };

        match entry.kind {
            EntryKind::Folder => {
                let target = format!("{}/", entry.path);
                self.navigate_to(&target);
                MenuAction::Navigated
            }
            EntryKind::App => {
                log::info!("Launching app: {}", entry.name);
                let action = MenuAction::Launch {
                    name: entry.name.clone(),
                    path: entry.path.clone(),
                };
                self.invalidate();
                action
            }
            EntryKind::File => MenuAction::OpenFile {
                title: entry.name.chars().filter(|c| (' '..='~').contains(c)).collect(),
                path: map_document_path(&entry.path).into_owned(),
            },
        }
    }

    pub fn navigate_to(&mut self, path: &str) {
        let mut path = path.to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        log::info!("Menu: {}", path);
        self.current_path = path;
        self.selected = 0;
        self.needs_redraw = true;
    }

    pub fn go_back(&mut self) {
        if !self.has_back_entry() {
            return;
        }
        let parent = parent_dir(&self.current_path);
        self.navigate_to(&parent);
    }

    pub fn invalidate(&mut self) {
        self.needs_redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Record that the current state is on screen.
    pub fn mark_drawn(&mut self) {
        self.needs_redraw = false;
    }

    /// Draw the current folder into `target`. Does not flush.
    pub fn render<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    {
        target.clear(BinaryColor::Off)?;
        let metrics = Metrics::of(target);
        let total = self.visible_item_count();
        let start = (self.selected + 1).saturating_sub(MAX_VISIBLE_LINES);

        let back = self
            .has_back_entry()
            .then_some((&icons::BACK, Cow::Borrowed("..")));
        let rows = back.into_iter().chain(
            self.current_entries()
                .into_iter()
                .map(|entry| (entry.icon(), Cow::Borrowed(entry.name.as_str()))),
        );

        for (row, (index, (icon, name))) in rows
            .enumerate()
            .skip(start)
            .take(MAX_VISIBLE_LINES)
            .enumerate()
        {
            let y = (row as u32 * metrics.char_height) as i32;
            self.draw_row(target, &metrics, y, icon, &name, index == self.selected)?;
        }

        if total > MAX_VISIBLE_LINES {
            let (w, h) = (metrics.width as i32, metrics.height as i32);
            if start > 0 {
                draw_arrow(target, [(w - 4, 2), (w - 5, 3), (w - 3, 3)])?;
            }
            if start + MAX_VISIBLE_LINES < total {
                let y = h - 4;
                draw_arrow(target, [(w - 4, y + 2), (w - 5, y + 1), (w - 3, y + 1)])?;
            }
        }
        Ok(())
    }

    fn draw_row<D>(
        &self,
        target: &mut D,
        metrics: &Metrics,
        y: i32,
        icon: &Icon,
        name: &str,
        selected: bool,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let color = if selected {
            fill_rect(
                target,
                Point::new(0, y),
                Size::new(metrics.width, metrics.char_height),
                BinaryColor::On,
            )?;
            BinaryColor::Off
        } else {
            BinaryColor::On
        };

        draw_icon(target, icon, Point::new(0, y), metrics.scale, color)?;

        let text_x = metrics.char_width * 2;
        let max_chars = metrics.chars_in(metrics.width.saturating_sub(text_x));
        let name = if max_chars > 3 {
            fit_to_width(name, max_chars)
        } else {
            Cow::Borrowed(name)
        };
        draw_text(target, &name, Point::new(text_x as i32, y), metrics.scale, color)?;
        Ok(())
    }
}

fn draw_arrow<D>(target: &mut D, points: [(i32, i32); 3]) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.draw_iter(
        points
            .into_iter()
            .map(|(x, y)| Pixel(Point::new(x, y), BinaryColor::On)),
    )
}

/// Where the content of a menu file entry lives on storage.
pub fn map_document_path(path: &str) -> Cow<'_, str> {
    match path {
        "/Settings/Documentation/About" => Cow::Borrowed("/assets/about.txt"),
        "/Settings/Documentation/Lua Docs" => Cow::Borrowed("/assets/lua_docs.md"),
        _ => match path.strip_prefix(DOCUMENTATION_DIR) {
            Some(doc) => Cow::Owned(format!("/assets/documentation/{}", doc)),
            None => Cow::Borrowed(path),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_panel::TestPanel;

    const STRUCTURE: &str = "d ICON:app Applications
d ICON:game Games
d ICON:settings Tools
d ICON:settings Settings
 d ICON:info Documentation
  f ICON:info About
  f ICON:info Lua Docs
  f Wiring
a ICON:sd Storage
";

    fn menu() -> Menu {
        Menu::new(EntryTree::parse(STRUCTURE))
    }

    fn enter_settings(menu: &mut Menu) {
        for _ in 0..3 {
            menu.down();
        }
        assert_eq!(menu.select(), MenuAction::Navigated);
        assert_eq!(menu.current_path(), "/Settings/");
    }

    #[test]
    fn up_and_down_wrap() {
        let mut menu = menu();
        assert_eq!(menu.visible_item_count(), 5);
        menu.up();
        assert_eq!(menu.selected(), 4);
        menu.down();
        assert_eq!(menu.selected(), 0);
        menu.down();
        assert_eq!(menu.selected_entry().map(|e| e.name.as_str()), Some("Games"));
    }

    #[test]
    fn navigation_adds_back_entry() {
        let mut menu = menu();
        enter_settings(&mut menu);
        assert_eq!(menu.visible_item_count(), 2);
        assert!(menu.selected_entry().is_none());

        menu.down();
        assert_eq!(menu.select(), MenuAction::Navigated);
        assert_eq!(menu.current_path(), "/Settings/Documentation/");

        assert_eq!(menu.select(), MenuAction::Navigated);
        assert_eq!(menu.current_path(), "/Settings/");
        menu.go_back();
        assert_eq!(menu.current_path(), "/");
        menu.go_back();
        assert_eq!(menu.current_path(), "/");
    }

    #[test]
    fn select_launches_apps_and_opens_files() {
        let mut menu = menu();
        menu.up();
        menu.mark_drawn();
        assert_eq!(
            menu.select(),
            MenuAction::Launch {
                name: "Storage".into(),
                path: "/Storage".into()
            }
        );
        assert!(menu.needs_redraw());

        menu.navigate_to("/Settings/Documentation");
        menu.down();
        assert_eq!(
            menu.select(),
            MenuAction::OpenFile {
                title: "About".into(),
                path: "/assets/about.txt".into()
            }
        );
        menu.down();
        menu.down();
        assert_eq!(
            menu.select(),
            MenuAction::OpenFile {
                title: "Wiring".into(),
                path: "/assets/documentation/Wiring".into()
            }
        );
    }

    #[test]
    fn empty_folder_ignores_input() {
        let mut menu = Menu::new(EntryTree::new());
        menu.down();
        menu.up();
        assert_eq!(menu.selected(), 0);
        assert_eq!(menu.select(), MenuAction::None);
    }

    #[test]
    fn document_paths_map_to_assets() {
        assert_eq!(map_document_path("/Settings/Documentation/Lua Docs"), "/assets/lua_docs.md");
        assert_eq!(map_document_path("/Tools/readme.txt"), "/Tools/readme.txt");
    }

    #[test]
    fn render_highlights_selected_row() {
        let mut menu = menu();
        menu.down();
        let mut panel = TestPanel::oled();
        menu.render(&mut panel).unwrap();

        // Row 1 is filled except where glyphs and the icon are cut out.
        let row = panel.lit_pixels_in_rows(8, 8);
        assert!(row > 128 * 8 / 2, "selected row should be mostly lit: {row}");
        assert!(panel.lit_pixels_in_rows(0, 8) < 128 * 8 / 2);
        // Five entries leave the lower rows empty and no arrows.
        assert_eq!(panel.lit_pixels_in_rows(40, 24), 0);
    }

    #[test]
    fn long_lists_scroll_and_show_arrows() {
        let mut tree = EntryTree::new();
        for i in 0..12 {
            tree.add_file(&format!("/item{i:02}"), None);
        }
        let mut menu = Menu::new(tree);
        let mut panel = TestPanel::oled();

        menu.render(&mut panel).unwrap();
        assert_eq!(panel.pixel(124, 62), Some(BinaryColor::On));
        assert_eq!(panel.pixel(123, 63), Some(BinaryColor::Off));

        for _ in 0..11 {
            menu.down();
        }
        menu.render(&mut panel).unwrap();
        // Last item selected: rows 4..=11 visible, selection on the bottom row.
        assert_eq!(panel.pixel(124, 2), Some(BinaryColor::On));
        assert_eq!(panel.pixel(123, 2), Some(BinaryColor::Off));
        assert_eq!(panel.pixel(127, 56), Some(BinaryColor::On));
    }
}
