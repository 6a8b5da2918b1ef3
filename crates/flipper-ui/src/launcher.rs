//! App registry: maps app entries in the menu to constructors.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::app_runner::App;
use crate::file_explorer::FileExplorer;
use crate::filesystem::SharedFileSystem;
use crate::input::InputHandle;
use crate::loading::LoadingScreen;
use crate::panel::Panel;
use crate::render_queue::RenderQueue;
use crate::text_viewer::{TextViewer, TextViewerApp};

/// Menu shipped with the firmware.
pub const DEFAULT_MENU: &str = "d ICON:app Applications
d ICON:game Games
d ICON:settings Tools
d ICON:settings Settings
 d ICON:info Documentation
  f ICON:info About
  f ICON:info Lua Docs
a ICON:sd Storage
";

/// Handles an app receives when it is started.
pub struct LaunchContext<P: Panel + 'static> {
    pub render: Arc<RenderQueue<P>>,
    pub input: InputHandle,
    pub fs: SharedFileSystem,
    pub loading: Option<Arc<LoadingScreen>>,
}

impl<P: Panel + 'static> Clone for LaunchContext<P> {
    fn clone(&self) -> Self {
        Self {
            render: Arc::clone(&self.render),
            input: self.input.clone(),
            fs: Arc::clone(&self.fs),
            loading: self.loading.clone(),
        }
    }
}

pub type AppFactory<P> = Box<dyn Fn(&LaunchContext<P>) -> Box<dyn App> + Send>;

pub struct AppRegistry<P: Panel + 'static> {
    factories: BTreeMap<String, AppFactory<P>>,
}

impl<P: Panel + 'static> Default for AppRegistry<P> {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<P: Panel + 'static> AppRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `About` and `Storage`.
    pub fn with_builtin_apps() -> Self {
        let mut registry = Self::new();
        registry.register(
            "About",
            Box::new(|ctx: &LaunchContext<P>| {
                let view = TextViewer::about(&mut *ctx.fs.lock());
                Box::new(TextViewerApp::new(
                    view,
                    Arc::clone(&ctx.render),
                    ctx.input.clone(),
                )) as Box<dyn App>
            }),
        );
        registry.register(
            "Storage",
            Box::new(|ctx: &LaunchContext<P>| {
                Box::new(FileExplorer::new(
                    Arc::clone(&ctx.render),
                    ctx.input.clone(),
                    Arc::clone(&ctx.fs),
                    ctx.loading.clone(),
                )) as Box<dyn App>
            }),
        );
        registry
    }

    /// Register `factory` under `name`, replacing any previous one.
    pub fn register(&mut self, name: &str, factory: AppFactory<P>) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            log::warn!("Replacing app registration: {}", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the app registered under `name`.
    pub fn launch(&self, name: &str, ctx: &LaunchContext<P>) -> Option<Box<dyn App>> {
        let factory = self.factories.get(name)?;
        log::info!("Starting app: {}", name);
        Some(factory(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_runner::AppState;
    use crate::entries::EntryTree;
    use crate::filesystem::shared;
    use crate::input::ControlState;
    use crate::mock_filesystem::MockFileSystem;
    use crate::render_queue::RenderConfig;
    use crate::test_panel::TestPanel;

    fn context() -> LaunchContext<TestPanel> {
        let config = RenderConfig {
            queue_depth: 0,
            ..RenderConfig::default()
        };
        LaunchContext {
            render: Arc::new(RenderQueue::new(TestPanel::oled(), config)),
            input: InputHandle::new(),
            fs: shared(MockFileSystem::sample()),
            loading: None,
        }
    }

    #[test]
    fn builtin_apps_match_menu_entries() {
        let registry = AppRegistry::<TestPanel>::with_builtin_apps();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["About", "Storage"]);

        let tree = EntryTree::parse(DEFAULT_MENU);
        assert!(registry.contains(&tree.get("/Storage").unwrap().name));
    }

    #[test]
    fn launch_builds_runnable_app() {
        let registry = AppRegistry::with_builtin_apps();
        let ctx = context();
        let mut app = registry.launch("About", &ctx).unwrap();
        assert_eq!(app.poll(), AppState::Running);
        assert_eq!(ctx.render.lock().with(|p| p.flush_count()), 1);

        ctx.input.publish(ControlState {
            button_released: true,
            ..ControlState::default()
        });
        assert_eq!(app.poll(), AppState::Exit);
        assert!(registry.launch("Snake", &ctx).is_none());
    }

    #[test]
    fn custom_factories_replace_builtins() {
        let mut registry = AppRegistry::with_builtin_apps();
        registry.register(
            "About",
            Box::new(|_: &LaunchContext<TestPanel>| {
                Box::new(|| AppState::Exit) as Box<dyn App>
            }),
        );
        let mut app = registry.launch("About", &context()).unwrap();
        assert_eq!(app.poll(), AppState::Exit);
    }
}
