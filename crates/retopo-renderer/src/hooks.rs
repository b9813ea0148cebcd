//! Redraw hook registry.
//!
//! Hooks are the extension point the viewport calls on every redraw. A hook
//! prepares GPU state from the scene, then records draw commands into the
//! frame's render pass. Hooks remove themselves by returning
//! [`HookAction::Unregister`] from `prepare`, which keeps teardown inside
//! the redraw cycle instead of racing it from outside.

use crate::context::RenderContext;
use crate::scene::Scene;

/// What the registry should do with a hook after `prepare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Keep the hook registered and call `render` this frame.
    Continue,
    /// Drop the hook without rendering; its resources free with it.
    Unregister,
}

/// A per-redraw viewport overlay.
pub trait RedrawHook {
    /// Unique name used for registration bookkeeping.
    fn name(&self) -> &str;

    /// Rebuilds GPU state from the scene. Runs before the render pass of
    /// the frame opens.
    fn prepare(&mut self, ctx: &RenderContext, scene: &Scene) -> HookAction;

    /// Records draw commands. Skipped for hooks that unregistered during
    /// `prepare`.
    fn render(&self, render_pass: &mut wgpu::RenderPass<'_>);
}

/// Ordered collection of redraw hooks.
#[derive(Default)]
pub struct RedrawHooks {
    hooks: Vec<Box<dyn RedrawHook>>,
}

impl RedrawHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook. Names must be unique; a duplicate is rejected.
    pub fn register(&mut self, hook: Box<dyn RedrawHook>) -> bool {
        if self.contains(hook.name()) {
            tracing::warn!("Hook already registered: {}", hook.name());
            return false;
        }
        tracing::debug!("Registered hook: {}", hook.name());
        self.hooks.push(hook);
        true
    }

    /// Removes the hook with the given name, if registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|h| h.name() != name);
        before != self.hooks.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.iter().any(|h| h.name() == name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs `prepare` on every hook, dropping those that unregister.
    pub fn prepare_all(&mut self, ctx: &RenderContext, scene: &Scene) {
        self.retain_continuing(|hook| hook.prepare(ctx, scene));
    }

    fn retain_continuing(
        &mut self,
        mut prepare: impl FnMut(&mut Box<dyn RedrawHook>) -> HookAction,
    ) {
        self.hooks.retain_mut(|hook| match prepare(hook) {
            HookAction::Continue => true,
            HookAction::Unregister => {
                tracing::debug!("Hook unregistered itself: {}", hook.name());
                false
            }
        });
    }

    /// Records all remaining hooks into the pass, in registration order.
    pub fn render_all(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        for hook in &self.hooks {
            hook.render(render_pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubHook {
        name: String,
    }

    impl StubHook {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
            }
        }
    }

    impl RedrawHook for StubHook {
        fn name(&self) -> &str {
            &self.name
        }

        fn prepare(&mut self, _ctx: &RenderContext, _scene: &Scene) -> HookAction {
            HookAction::Continue
        }

        fn render(&self, _render_pass: &mut wgpu::RenderPass<'_>) {}
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let mut hooks = RedrawHooks::new();
        assert!(hooks.register(Box::new(StubHook::new("overlay"))));
        assert!(!hooks.register(Box::new(StubHook::new("overlay"))));
        assert_eq!(hooks.len(), 1);
    }

    #[test]
    fn test_unregister_by_name() {
        let mut hooks = RedrawHooks::new();
        hooks.register(Box::new(StubHook::new("a")));
        hooks.register(Box::new(StubHook::new("b")));
        assert!(hooks.unregister("a"));
        assert!(!hooks.unregister("a"));
        assert!(hooks.contains("b"));
        assert_eq!(hooks.len(), 1);
    }

    #[test]
    fn test_prepare_drops_unregistering_hooks() {
        let mut hooks = RedrawHooks::new();
        for name in ["a", "b", "c"] {
            hooks.register(Box::new(StubHook::new(name)));
        }

        // a redraw where only "b" hits its stop condition
        hooks.retain_continuing(|hook| {
            if hook.name() == "b" {
                HookAction::Unregister
            } else {
                HookAction::Continue
            }
        });

        assert_eq!(hooks.len(), 2);
        assert!(hooks.contains("a"));
        assert!(!hooks.contains("b"));
        assert!(hooks.contains("c"));

        // survivors keep running on later redraws
        hooks.retain_continuing(|_| HookAction::Continue);
        assert_eq!(hooks.len(), 2);

        // level-triggered teardown empties the registry
        hooks.retain_continuing(|_| HookAction::Unregister);
        assert!(hooks.is_empty());
    }
}
