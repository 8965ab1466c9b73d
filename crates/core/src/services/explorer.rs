use log::{info, warn};
use thiserror::Error;

use super::lifecycle::{SessionRegistry, SharedRegistry, ViewHandle};
use super::navigation::{self, Command, PopupAction};
use super::text_view::{IrRef, TextViewSession};
use crate::config::ExplorerConfig;
use crate::host::{Host, HostError, UiEvent, ViewId};
use crate::listing::Listing;
use crate::model::{Address, GenerateError, Maturity, Program, SharedIr};

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("Too many open views titled '{title}' (limit {limit})")]
    TitleExhausted { title: String, limit: usize },
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("Microcode generation failed: {0}")]
    Generate(#[from] GenerateError),
    #[error("Microcode is being modified and cannot be rendered")]
    IrBusy,
}

/// Entry point: opens microcode text views and routes host events to them.
pub struct Explorer {
    config: ExplorerConfig,
    registry: SharedRegistry,
}

impl Explorer {
    pub fn new(config: ExplorerConfig) -> Self {
        Self { config, registry: SessionRegistry::new_shared() }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// First free title among `base`, `base (2)`, `base (3)`, ... up to the
    /// configured instance limit.
    pub fn unique_title(&self, host: &dyn Host, base: &str) -> Option<String> {
        (1..=self.config.max_title_instances)
            .map(|n| if n == 1 { base.to_string() } else { format!("{base} ({n})") })
            .find(|title| !host.find_view(title))
    }

    /// Render `ir` into a new text view.
    ///
    /// With `keep_ir` the view retains the function so graphs can be opened
    /// from it; otherwise the view is a plain listing.
    pub fn show(
        &self,
        host: &mut dyn Host,
        ir: SharedIr,
        keep_ir: bool,
        name: &str,
    ) -> Result<ViewHandle, ExplorerError> {
        let (entry_ea, listing) = {
            let func = ir.try_borrow().map_err(|_| ExplorerError::IrBusy)?;
            (func.entry_ea(), Listing::render(&*func))
        };
        let base = format!("Microcode - {entry_ea:X} - {name}");
        let Some(title) = self.unique_title(&*host, &base) else {
            warn!("refusing to open another '{base}'");
            return Err(ExplorerError::TitleExhausted {
                title: base,
                limit: self.config.max_title_instances,
            });
        };

        let view = host.open_text_view(&title, listing.lines())?;
        let ir_ref = if keep_ir { IrRef::retained(ir) } else { IrRef::detached() };
        info!("opened {title} ({view}, {} lines)", listing.len());
        let session = TextViewSession::new(view, title, name, entry_ea, listing, ir_ref);
        self.registry.borrow_mut().register(session);
        Ok(ViewHandle::new(view, &self.registry))
    }

    /// Generate microcode for the function at `ea` and show it.
    ///
    /// `Maturity::Zero` means the user cancelled the prompt: nothing happens.
    /// A generation failure is reported through the host and no view opens.
    pub fn generate_and_show(
        &self,
        host: &mut dyn Host,
        program: &Program,
        ea: Address,
        maturity: Maturity,
    ) -> Result<Option<ViewHandle>, ExplorerError> {
        if maturity.is_zero() {
            return Ok(None);
        }
        let func = match program.generate(ea, maturity) {
            Ok(func) => func,
            Err(err) => {
                host.notify_error(&err.to_string());
                return Err(err.into());
            }
        };
        let handle = self.show(host, func.into_shared(), self.config.keep_ir, maturity.as_str())?;
        Ok(Some(handle))
    }

    /// Deliver a host event. Returns whether it was handled.
    pub fn handle_event(&self, host: &mut dyn Host, event: UiEvent) -> bool {
        let mut registry = self.registry.borrow_mut();
        if let UiEvent::WidgetDestroyed { view } = event {
            return registry.close(view);
        }
        let Some(session) = registry.get_mut(event.view()) else {
            return false;
        };
        match event {
            UiEvent::Key { key, shift, .. } => match Command::from_key(key, shift, &self.config.keys) {
                Some(command) => navigation::execute(session, command, host),
                None => false,
            },
            UiEvent::DoubleClick { .. } => navigation::execute(session, Command::JumpToCursor, host),
            UiEvent::CursorMoved { line, column, .. } => {
                session.set_cursor(line, column);
                true
            }
            UiEvent::WidgetDestroyed { .. } => false,
        }
    }

    /// Run a context-menu command for `view`.
    pub fn run_command(&self, host: &mut dyn Host, view: ViewId, command: Command) -> bool {
        let mut registry = self.registry.borrow_mut();
        match registry.get_mut(view) {
            Some(session) => navigation::execute(session, command, host),
            None => false,
        }
    }

    /// Jump `view` to a block number or address without prompting.
    pub fn jump_to_target(&self, host: &mut dyn Host, view: ViewId, token: &str) -> Option<usize> {
        let mut registry = self.registry.borrow_mut();
        let line = registry.get_mut(view)?.jump_to_target(token, &*host)?;
        host.jump(view, line);
        Some(line)
    }

    pub fn popup_actions(&self, view: ViewId) -> Vec<PopupAction> {
        let registry = self.registry.borrow();
        registry
            .get(view)
            .map(|session| navigation::popup_actions(session, &self.config.keys))
            .unwrap_or_default()
    }

    /// The host invalidated the microcode behind `view`.
    pub fn invalidate_ir(&self, view: ViewId) {
        if let Some(session) = self.registry.borrow_mut().get_mut(view) {
            session.invalidate_ir();
        }
    }

    pub fn with_session<R>(&self, view: ViewId, read: impl FnOnce(&TextViewSession) -> R) -> Option<R> {
        self.registry.borrow().get(view).map(read)
    }

    pub fn open_sessions(&self) -> usize {
        self.registry.borrow().len()
    }
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(ExplorerConfig::default())
    }
}
