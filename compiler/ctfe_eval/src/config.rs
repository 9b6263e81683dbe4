//! Evaluation limits and target platform.

/// Target platform of the compilation unit being folded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Platform {
    #[default]
    Jvm,
    Js,
    Native,
    Wasm,
}

impl Platform {
    /// Platforms without a distinct single-precision float at run time.
    ///
    /// On these, `Float` operands are widened to `Double` before builtin
    /// dispatch.
    #[inline]
    pub fn is_float_poor(self) -> bool {
        matches!(self, Platform::Js)
    }
}

/// Options of an evaluation run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Configuration {
    pub platform: Platform,
    /// Maximum number of simultaneously active frames.
    pub max_stack: usize,
    /// Maximum number of instructions popped in one run.
    pub max_commands: u64,
    /// When false, singleton objects not annotated as compile-time are
    /// created as shells holding only their `const` fields.
    pub create_non_compile_time_objects: bool,
}

impl Configuration {
    pub const DEFAULT_MAX_STACK: usize = 10_000;
    pub const DEFAULT_MAX_COMMANDS: u64 = 1_000_000;

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn with_max_stack(mut self, max_stack: usize) -> Self {
        self.max_stack = max_stack;
        self
    }

    #[must_use]
    pub fn with_max_commands(mut self, max_commands: u64) -> Self {
        self.max_commands = max_commands;
        self
    }

    #[must_use]
    pub fn with_non_compile_time_objects(mut self, create: bool) -> Self {
        self.create_non_compile_time_objects = create;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            platform: Platform::Jvm,
            max_stack: Self::DEFAULT_MAX_STACK,
            max_commands: Self::DEFAULT_MAX_COMMANDS,
            create_non_compile_time_objects: true,
        }
    }
}
