//! Diagnostic logging through `tracing`.
//!
//! On wasm32 each formatted event goes to the browser console method
//! matching its level, and panics are reported through
//! `console_error_panic_hook`. Native builds write to stdout.
//!
//! ```
//! use ow_save_tracker::logger::Builder;
//! use tracing::Level;
//!
//! Builder::new()
//!     .with_default_level(Level::ERROR)
//!     .with_crate_name(env!("CARGO_CRATE_NAME"))
//!     .with_crate_level(Level::INFO)
//!     .with_line_number(true)
//!     .init();
//! ```

use tracing::Level;
use tracing_subscriber::{filter::Targets, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default subscriber for this crate. Later calls are no-ops.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    Builder::new()
        .with_crate_name(env!("CARGO_CRATE_NAME"))
        .with_crate_level(Level::DEBUG)
        .init();
}

#[derive(Debug)]
pub struct Builder {
    targets: Targets,
    default_level: Level,
    crate_name: Option<String>,
    crate_level: Level,
    show_filename: bool,
    show_line_number: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            targets: Targets::new(),
            default_level: Level::ERROR,
            crate_name: None,
            crate_level: Level::INFO,
            show_filename: false,
            show_line_number: false,
        }
    }
    #[must_use]
    pub fn with_default_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }
    #[must_use]
    pub fn with_crate_name(mut self, name: &str) -> Self {
        self.crate_name = Some(name.to_string());
        self
    }
    #[must_use]
    pub fn with_crate_level(mut self, level: Level) -> Self {
        self.crate_level = level;
        self
    }
    #[must_use]
    pub fn with_file(mut self, show: bool) -> Self {
        self.show_filename = show;
        self
    }
    #[must_use]
    pub fn with_line_number(mut self, show: bool) -> Self {
        self.show_line_number = show;
        self
    }

    fn filter(&self) -> Targets {
        let mut filter = self.targets.clone().with_default(self.default_level);
        if let Some(crate_name) = &self.crate_name {
            filter = filter.with_target(crate_name.clone(), self.crate_level);
        }
        filter
    }

    /// Install the subscriber. Returns `false` if one was already set.
    pub fn init(self) -> bool {
        let layer = tracing_subscriber::fmt::layer()
            .without_time()
            .with_file(self.show_filename)
            .with_line_number(self.show_line_number);
        #[cfg(target_arch = "wasm32")]
        let layer = layer
            .with_ansi(false)
            .with_writer(console::MakeConsoleWriter);
        tracing_subscriber::registry()
            .with(self.filter())
            .with(layer)
            .try_init()
            .is_ok()
    }
}

/// Browser console method an event of a given level is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
enum ConsoleMethod {
    Error,
    Warn,
    Info,
    Debug,
    Log,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl ConsoleMethod {
    fn for_level(level: &Level) -> Self {
        if *level == Level::ERROR {
            Self::Error
        } else if *level == Level::WARN {
            Self::Warn
        } else if *level == Level::INFO {
            Self::Info
        } else if *level == Level::DEBUG {
            Self::Debug
        } else {
            Self::Log
        }
    }
}

/// One console line from a formatted event, trailing newline dropped.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn console_line(buf: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(buf);
    let line = line.trim_end();
    (!line.is_empty()).then(|| line.to_string())
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;

    use tracing::Metadata;
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    use super::{ConsoleMethod, console_line};

    /// Buffers one formatted event and hands it to the console on drop.
    pub struct ConsoleWriter {
        method: ConsoleMethod,
        buf: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            let Some(line) = console_line(&self.buf) else {
                return;
            };
            let line = JsValue::from_str(&line);
            match self.method {
                ConsoleMethod::Error => web_sys::console::error_1(&line),
                ConsoleMethod::Warn => web_sys::console::warn_1(&line),
                ConsoleMethod::Info => web_sys::console::info_1(&line),
                ConsoleMethod::Debug => web_sys::console::debug_1(&line),
                ConsoleMethod::Log => web_sys::console::log_1(&line),
            }
        }
    }

    #[derive(Debug, Clone, Copy, Default)]
    pub struct MakeConsoleWriter;

    impl<'a> MakeWriter<'a> for MakeConsoleWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter {
                method: ConsoleMethod::Log,
                buf: Vec::new(),
            }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            ConsoleWriter {
                method: ConsoleMethod::for_level(meta.level()),
                buf: Vec::new(),
            }
        }
    }
}
