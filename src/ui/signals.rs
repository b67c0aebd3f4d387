use crate::error::{Result, SimpleExtractError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Exit code used when the user interrupts a run.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Counts Ctrl+C presses. The first one lets the current archive finish and
/// stops the batch at the next check; the second exits on the spot.
///
/// Child tools are not signalled from here. They share the terminal's
/// process group and receive SIGINT directly.
pub struct GracefulShutdown {
    interrupts: Arc<AtomicUsize>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let interrupts = Arc::new(AtomicUsize::new(0));
        let handler_interrupts = interrupts.clone();

        ctrlc::set_handler(move || {
            if handler_interrupts.fetch_add(1, Ordering::SeqCst) == 0 {
                eprintln!("\n🛑 Stopping after the current item... (press Ctrl+C again to force exit)");
            } else {
                eprintln!("\n💀 Force stopping...");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        })
        .map_err(|e| SimpleExtractError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(Self { interrupts })
    }

    /// Create a GracefulShutdown instance for testing (no signal handler registration)
    pub fn new_for_test() -> Self {
        Self {
            interrupts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.interrupts.load(Ordering::SeqCst) == 0
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if !self.is_running() {
            return Err(SimpleExtractError::Cancelled);
        }
        Ok(())
    }

    pub fn request_shutdown(&self) {
        self.interrupts.fetch_max(1, Ordering::SeqCst);
    }
}
