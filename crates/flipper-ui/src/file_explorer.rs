//! Storage browser app.
//!
//! Lists a directory under the storage root with directories first, opens
//! text files in an embedded viewer and walks back up with left or the first
//! row ("Parent", or "Exit" at the root).

use std::cmp::Ordering;
use std::sync::Arc;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::app_runner::{App, AppState};
use crate::filesystem::{join_path, FileInfo, FileSystem, FileSystemError, SharedFileSystem};
use crate::icons::{self, draw_icon, ICON_SIZE};
use crate::input::{ControlState, InputHandle};
use crate::loading::LoadingScreen;
use crate::panel::Panel;
use crate::render_queue::RenderQueue;
use crate::text::{fill_rect, Metrics, TextCursor};
use crate::text_viewer::{load_text, TextViewer};

pub const STORAGE_ROOT: &str = "/storage";
/// Characters kept when a file is opened from the browser.
pub const BROWSER_FILE_LIMIT: usize = 1024;
const HEADER_MAX_CHARS: usize = 20;
const HEADER_TAIL_CHARS: usize = 17;
const OPENING_LABEL: &str = "(opening...)";

/// Outcome of one frame of browser input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    None,
    Redraw,
    /// Entered or left a directory; the listing must be reloaded.
    Reload,
    /// Open the file at this path.
    Open { path: String, name: String },
    Exit,
}

/// Directory listing state.
pub struct FileBrowser {
    root: String,
    current_path: String,
    files: Vec<FileInfo>,
    selected_index: usize,
    scroll_offset: usize,
}

impl FileBrowser {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            current_path: root.to_string(),
            files: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn files(&self) -> &[FileInfo] {
        &self.files
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    fn at_root(&self) -> bool {
        self.current_path == self.root
    }

    /// Rows including the leading Parent/Exit row.
    fn total_items(&self) -> usize {
        self.files.len() + 1
    }

    /// Load the current directory. A directory that cannot be listed shows
    /// as empty.
    pub fn load(&mut self, fs: &mut dyn FileSystem) -> Result<(), FileSystemError> {
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.files.clear();

        let mut files = fs.list_files(&self.current_path).inspect_err(|err| {
            log::warn!("Failed to open directory {}: {}", self.current_path, err);
        })?;

        // Sort: directories first, then alphabetically
        files.sort_by(|a, b| match (a.is_directory, b.is_directory) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.name.cmp(&b.name),
        });
        self.files = files;
        log::info!(
            "Loaded {} entries from {}",
            self.files.len(),
            self.current_path
        );
        Ok(())
    }

    fn go_up(&mut self) -> BrowserEvent {
        if self.at_root() {
            return BrowserEvent::Exit;
        }
        self.current_path = match self.current_path.rfind('/') {
            Some(i) if i >= self.root.len() => self.current_path[..i].to_string(),
            _ => self.root.clone(),
        };
        BrowserEvent::Reload
    }

    pub fn handle_input(&mut self, controls: &ControlState) -> BrowserEvent {
        if controls.button_released {
            if self.selected_index == 0 {
                return self.go_up();
            }
            if let Some(file) = self.files.get(self.selected_index - 1) {
                let path = join_path(&self.current_path, &file.name);
                if file.is_directory {
                    log::info!("Entering {}", path);
                    self.current_path = path;
                    return BrowserEvent::Reload;
                }
                return BrowserEvent::Open {
                    path,
                    name: file.name.clone(),
                };
            }
        }

        if controls.left {
            return self.go_up();
        }

        let mut event = BrowserEvent::None;
        if controls.up && self.selected_index > 0 {
            self.selected_index -= 1;
            event = BrowserEvent::Redraw;
        }
        if controls.down && self.selected_index + 1 < self.total_items() {
            self.selected_index += 1;
            event = BrowserEvent::Redraw;
        }
        event
    }

    /// Header text: the current path, keeping its tail when too long.
    pub fn header(&self) -> String {
        let len = self.current_path.chars().count();
        if len > HEADER_MAX_CHARS {
            let tail: String = self
                .current_path
                .chars()
                .skip(len - HEADER_TAIL_CHARS)
                .collect();
            format!("...{}", tail)
        } else {
            self.current_path.clone()
        }
    }

    fn adjust_scroll(&mut self, max_visible: usize) {
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        }
        if max_visible > 0 && self.selected_index >= self.scroll_offset + max_visible {
            self.scroll_offset = self.selected_index + 1 - max_visible;
        }
    }

    pub fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    {
        target.clear(BinaryColor::Off)?;
        let metrics = Metrics::of(target);
        let row_h = metrics.char_height;
        let max_visible = (metrics.height.saturating_sub(row_h) / row_h) as usize;
        self.adjust_scroll(max_visible);

        let mut cursor = TextCursor::new(metrics);
        cursor.println(target, &self.header(), false)?;

        let first = (&icons::BACK, if self.at_root() { "Exit" } else { "Parent" }.to_string());
        let rows = std::iter::once(first).chain(self.files.iter().map(|file| {
            if file.is_directory {
                (&icons::FOLDER, file.name.clone())
            } else {
                (&icons::FILE, format!("{}{}", file.name, size_label(file.size)))
            }
        }));

        let text_x = (ICON_SIZE * metrics.scale + 4) as i32;
        for (index, (icon, label)) in rows.enumerate().skip(self.scroll_offset).take(max_visible) {
            let selected = index == self.selected_index;
            if selected {
                fill_rect(
                    target,
                    Point::new(0, cursor.y),
                    Size::new(metrics.width, row_h),
                    BinaryColor::On,
                )?;
            }
            let icon_color = if selected {
                BinaryColor::Off
            } else {
                BinaryColor::On
            };
            draw_icon(target, icon, Point::new(2, cursor.y), metrics.scale, icon_color)?;
            cursor.x = text_x;
            cursor.print(target, &label, selected)?;
            cursor.newline();
        }

        let marker = Size::new_equal(3);
        let marker_x = metrics.width as i32 - 4;
        if self.scroll_offset > 0 {
            fill_rect(target, Point::new(marker_x, row_h as i32), marker, BinaryColor::On)?;
        }
        if self.scroll_offset + max_visible < self.total_items() {
            let y = metrics.height as i32 - 4;
            fill_rect(target, Point::new(marker_x, y), marker, BinaryColor::On)?;
        }
        Ok(())
    }
}

/// `" (512B)"` below a kibibyte, `" (3K)"` above.
pub fn size_label(size: u64) -> String {
    if size < 1024 {
        format!(" ({}B)", size)
    } else {
        format!(" ({}K)", size / 1024)
    }
}

/// The Storage app: a [`FileBrowser`] with an embedded [`TextViewer`].
pub struct FileExplorer<P: Panel + 'static> {
    browser: FileBrowser,
    viewer: Option<TextViewer>,
    render: Arc<RenderQueue<P>>,
    input: InputHandle,
    fs: SharedFileSystem,
    loading: Option<Arc<LoadingScreen>>,
    needs_redraw: bool,
}

impl<P: Panel + 'static> FileExplorer<P> {
    pub fn new(
        render: Arc<RenderQueue<P>>,
        input: InputHandle,
        fs: SharedFileSystem,
        loading: Option<Arc<LoadingScreen>>,
    ) -> Self {
        let mut explorer = Self {
            browser: FileBrowser::new(STORAGE_ROOT),
            viewer: None,
            render,
            input,
            fs,
            loading,
            needs_redraw: true,
        };
        explorer.reload();
        explorer
    }

    pub fn browser(&self) -> &FileBrowser {
        &self.browser
    }

    pub fn is_viewing(&self) -> bool {
        self.viewer.is_some()
    }

    fn reload(&mut self) {
        // Logged by the browser; a failed listing shows as an empty list.
        self.browser.load(&mut *self.fs.lock()).ok();
        self.needs_redraw = true;
    }

    fn show_opening(&self) {
        let Some(screen) = &self.loading else {
            return;
        };
        {
            let guard = self.render.lock().acquire();
            let mut panel = guard.panel();
            if let Err(err) = screen.draw_overlay(&mut *panel, Some(OPENING_LABEL)) {
                log::warn!("Loading overlay draw failed: {:?}", err);
            }
        }
        self.render.request_refresh();
    }

    fn open(&mut self, path: &str, name: &str) {
        self.render.status().set_busy();
        self.show_opening();
        let title: String = name.chars().filter(|c| (' '..='~').contains(c)).collect();
        let content = match load_text(&mut *self.fs.lock(), path, BROWSER_FILE_LIMIT) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Cannot read {}: {}", path, err);
                format!("(Cannot read file: {})", path)
            }
        };
        self.viewer = Some(TextViewer::new(&title, &content));
        self.render.status().set_ready();
    }

    fn visible_viewer_lines(&self) -> usize {
        let size = self.render.lock().with(|panel| panel.size());
        TextViewer::visible_lines(size.height, &Metrics::for_size(size))
    }

    fn draw(&mut self) {
        {
            let guard = self.render.lock().acquire();
            let mut panel = guard.panel();
            let drawn = match self.viewer.as_mut() {
                Some(viewer) => viewer.render(&mut *panel),
                None => self.browser.render(&mut *panel),
            };
            if let Err(err) = drawn {
                log::warn!("File explorer draw failed: {:?}", err);
            }
        }
        self.needs_redraw = false;
        self.render.request_refresh();
    }

    fn poll_viewer(&mut self, controls: &ControlState) {
        let visible = self.visible_viewer_lines();
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if viewer.handle_input(controls, visible) == AppState::Exit {
            self.input.consume_button_release();
            self.viewer = None;
            self.needs_redraw = true;
        } else if viewer.needs_redraw() {
            self.needs_redraw = true;
        }
    }
}

impl<P: Panel + 'static> App for FileExplorer<P> {
    fn poll(&mut self) -> AppState {
        let controls = self.input.current();

        if self.viewer.is_some() {
            self.poll_viewer(&controls);
        } else {
            match self.browser.handle_input(&controls) {
                BrowserEvent::None => {}
                BrowserEvent::Redraw => self.needs_redraw = true,
                BrowserEvent::Reload => {
                    self.input.consume_button_release();
                    self.show_opening();
                    self.reload();
                }
                BrowserEvent::Open { path, name } => {
                    self.input.consume_button_release();
                    self.open(&path, &name);
                    self.needs_redraw = true;
                }
                BrowserEvent::Exit => {
                    self.input.consume_button_release();
                    return AppState::Exit;
                }
            }
        }

        if self.needs_redraw {
            self.draw();
        }
        AppState::Running
    }
}
