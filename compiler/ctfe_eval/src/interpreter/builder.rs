//! `InterpreterBuilder` for creating interpreters over a module.

use ctfe_ir::IrModule;

use super::IrInterpreter;
use crate::bridge::NativeRegistry;
use crate::config::{Configuration, Platform};
use crate::environment::Environment;

/// Builder for creating [`IrInterpreter`] instances.
///
/// Defaults to [`Configuration::default`] and the standard native library.
/// Interpreters that must share singletons with an existing one come from
/// [`IrInterpreter::copy_with_new_call_stack`] instead.
pub struct InterpreterBuilder {
    module: IrModule,
    config: Option<Configuration>,
    natives: Option<NativeRegistry>,
}

impl InterpreterBuilder {
    pub fn new(module: IrModule) -> Self {
        Self {
            module,
            config: None,
            natives: None,
        }
    }

    /// Set the evaluation limits and platform.
    #[must_use]
    pub fn config(mut self, config: Configuration) -> Self {
        self.config = Some(config);
        self
    }

    /// Set only the target platform, keeping the other limits.
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.config = Some(self.config.unwrap_or_default().with_platform(platform));
        self
    }

    /// Replace the native library.
    #[must_use]
    pub fn natives(mut self, natives: NativeRegistry) -> Self {
        self.natives = Some(natives);
        self
    }

    pub fn build(self) -> IrInterpreter {
        let config = self.config.unwrap_or_default();
        let natives = self.natives.unwrap_or_else(NativeRegistry::with_stdlib);
        IrInterpreter::new(Environment::new(self.module, natives, config))
    }
}
