//! Host loop: joystick input, the launcher menu, the foreground app slot and
//! the debounced secondary panel.
//!
//! [`Shell::tick`] is called once per main-loop iteration. While an app is
//! running it gets every frame; otherwise input drives the [`Menu`], which is
//! redrawn on the primary panel through the render queue. In dual-display
//! mode the secondary panel follows the menu once input has been quiet for
//! the debounce window.

use std::sync::Arc;
use std::time::Instant;

use crate::app_runner::AppRunner;
use crate::debounce::SecondaryDebounce;
use crate::entries::EntryTree;
use crate::filesystem::SharedFileSystem;
use crate::input::{ControlState, Controls, InputHandle, JoystickSource};
use crate::launcher::{AppRegistry, LaunchContext, DEFAULT_MENU};
use crate::loading::LoadingScreen;
use crate::menu::{Menu, MenuAction};
use crate::panel::Panel;
use crate::render_queue::RenderQueue;
use crate::text_viewer::{TextViewer, TextViewerApp};

pub struct Shell<P: Panel + 'static, J, S = P> {
    menu: Menu,
    runner: AppRunner,
    registry: AppRegistry<P>,
    ctx: LaunchContext<P>,
    controls: Controls<J>,
    secondary: Option<S>,
    debounce: SecondaryDebounce,
    awaiting_release: bool,
}

impl<P: Panel + 'static, J: JoystickSource> Shell<P, J, P> {
    /// Single-display shell with the default menu and built-in apps.
    pub fn new(render: Arc<RenderQueue<P>>, controls: Controls<J>, fs: SharedFileSystem) -> Self {
        let loading = LoadingScreen::load(&mut *fs.lock()).map(Arc::new);
        Self {
            menu: Menu::new(EntryTree::parse(DEFAULT_MENU)),
            runner: AppRunner::new(),
            registry: AppRegistry::with_builtin_apps(),
            ctx: LaunchContext {
                render,
                input: InputHandle::new(),
                fs,
                loading,
            },
            controls,
            secondary: None,
            debounce: SecondaryDebounce::default(),
            awaiting_release: false,
        }
    }
}

impl<P: Panel + 'static, J: JoystickSource, S: Panel> Shell<P, J, S> {
    /// Mirror the menu on `secondary`, debounced.
    pub fn with_secondary<S2: Panel>(self, secondary: S2) -> Shell<P, J, S2> {
        Shell {
            menu: self.menu,
            runner: self.runner,
            registry: self.registry,
            ctx: self.ctx,
            controls: self.controls,
            secondary: Some(secondary),
            debounce: self.debounce,
            awaiting_release: self.awaiting_release,
        }
    }

    pub fn with_menu(mut self, tree: EntryTree) -> Self {
        self.menu = Menu::new(tree);
        self
    }

    pub fn with_debounce(mut self, debounce: SecondaryDebounce) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn registry_mut(&mut self) -> &mut AppRegistry<P> {
        &mut self.registry
    }

    /// Start the render worker and draw the first frame on every panel.
    pub fn boot(&mut self) {
        self.ctx.render.init();
        let status = self.ctx.render.status();
        status.set_busy();
        {
            let guard = self.ctx.render.lock().acquire();
            let mut panel = guard.panel();
            if let Err(err) = self.menu.render(&mut *panel) {
                log::warn!("Menu draw failed: {:?}", err);
            } else if let Err(err) = panel.flush() {
                log::warn!("Initial flush failed: {:?}", err);
            }
        }
        if let Some(secondary) = self.secondary.as_mut() {
            log::info!("Initial secondary render...");
            draw_secondary(&self.menu, secondary);
        }
        self.menu.mark_drawn();
        status.set_ready();
        log::info!("System ready");
    }

    /// One iteration of the main loop.
    pub fn tick(&mut self, now: Instant) {
        self.ctx.render.flush_deferred();
        if self.runner.is_app_running() {
            let controls = self.controls.update();
            self.ctx.input.publish(controls);
            if !self.runner.run_app_frame() {
                log::info!("App exited, returning to menu");
                self.awaiting_release = true;
                self.runner.take_menu_invalidation();
                self.menu.invalidate();
                self.redraw_menu();
                if self.secondary.is_some() {
                    self.debounce.note_input(now);
                }
            }
            return;
        }

        if self.awaiting_release {
            if self.controls.update().button_held {
                return;
            }
            self.awaiting_release = false;
            return;
        }

        let controls = self.controls.update();
        let status = self.ctx.render.status();
        let mut had_input = false;
        if controls.up {
            status.set_busy();
            self.menu.up();
            had_input = true;
        }
        if controls.down {
            status.set_busy();
            self.menu.down();
            had_input = true;
        }
        if controls.button_released {
            status.set_busy();
            self.handle_selection();
            had_input = true;
        }

        if self.runner.is_app_running() {
            return;
        }
        if had_input {
            self.redraw_menu();
            if self.secondary.is_some() {
                self.debounce.note_input(now);
            }
        } else if self.runner.take_menu_invalidation() || self.menu.needs_redraw() {
            self.redraw_menu();
        }

        self.update_secondary(now);
    }

    fn handle_selection(&mut self) {
        match self.menu.select() {
            MenuAction::None | MenuAction::Navigated => {}
            MenuAction::Launch { name, path } => match self.registry.launch(&name, &self.ctx) {
                Some(app) => {
                    self.ctx.input.publish(ControlState::default());
                    self.runner.start_boxed(app);
                }
                None => log::warn!("No app registered for {} ({})", name, path),
            },
            MenuAction::OpenFile { title, path } => {
                log::info!("Opening {} from {}", title, path);
                let view = TextViewer::from_file(&mut *self.ctx.fs.lock(), &title, &path);
                self.ctx.input.publish(ControlState::default());
                self.runner.start_app(TextViewerApp::new(
                    view,
                    Arc::clone(&self.ctx.render),
                    self.ctx.input.clone(),
                ));
            }
        }
    }

    fn redraw_menu(&mut self) {
        {
            let guard = self.ctx.render.lock().acquire();
            let mut panel = guard.panel();
            if let Err(err) = self.menu.render(&mut *panel) {
                log::warn!("Menu draw failed: {:?}", err);
            }
        }
        self.menu.mark_drawn();
        self.ctx.render.request_refresh();
    }

    fn update_secondary(&mut self, now: Instant) {
        let Some(secondary) = self.secondary.as_mut() else {
            return;
        };
        if !self.debounce.due(now) {
            return;
        }
        // Holding the primary lock keeps apps and the render worker off the
        // bus while the slow panel updates.
        let _guard = self.ctx.render.lock().acquire();
        let status = self.ctx.render.status();
        status.set_busy();
        self.debounce.begin();
        log::info!("Rendering secondary panel...");
        draw_secondary(&self.menu, secondary);
        log::info!("Secondary panel update complete");
        self.debounce.finish();
        status.set_ready();
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn is_app_running(&self) -> bool {
        self.runner.is_app_running()
    }

    pub fn is_awaiting_release(&self) -> bool {
        self.awaiting_release
    }

    pub fn debounce(&self) -> &SecondaryDebounce {
        &self.debounce
    }

    pub fn render_queue(&self) -> &Arc<RenderQueue<P>> {
        &self.ctx.render
    }

    pub fn input(&self) -> &InputHandle {
        &self.ctx.input
    }

    pub fn filesystem(&self) -> &SharedFileSystem {
        &self.ctx.fs
    }

    pub fn secondary(&self) -> Option<&S> {
        self.secondary.as_ref()
    }

    pub fn controls_mut(&mut self) -> &mut Controls<J> {
        &mut self.controls
    }
}

fn draw_secondary<S: Panel>(menu: &Menu, panel: &mut S) {
    if let Err(err) = menu.render(panel) {
        log::warn!("Secondary draw failed: {:?}", err);
        return;
    }
    if let Err(err) = panel.flush() {
        log::warn!("Secondary flush failed: {:?}", err);
    }
}
