//! Platform detection and command shell selection
//!
//! Provides OS and architecture information using standard Unix conventions:
//! - macOS → `"darwin"` (kernel name)
//! - Linux → `"linux"`
//! - Windows → `"windows"`
//!
//! Hook commands are handed to the platform shell verbatim, so the shell is
//! part of the platform description. Platform info is cached on first access.

use std::sync::LazyLock;

/// Current platform information (cached)
///
/// # Example
/// ```
/// use scriptable_core::platform::CURRENT_PLATFORM;
///
/// let (program, flag) = CURRENT_PLATFORM.shell;
/// assert!(!program.is_empty() && !flag.is_empty());
/// ```
pub static CURRENT_PLATFORM: LazyLock<Platform> = LazyLock::new(Platform::detect);

/// Platform information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// OS: "darwin" (macOS), "linux", "windows", "unknown"
    pub os: &'static str,
    /// CPU architecture: "x86_64", "aarch64", etc.
    pub arch: &'static str,
    /// Command shell and the flag that makes it run a single command string
    pub shell: (&'static str, &'static str),
}

impl Platform {
    pub fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            arch: std::env::consts::ARCH,
            shell: Self::detect_shell(),
        }
    }

    const fn detect_os() -> &'static str {
        #[cfg(target_os = "macos")]
        {
            "darwin"
        }

        #[cfg(target_os = "linux")]
        {
            "linux"
        }

        #[cfg(target_os = "windows")]
        {
            "windows"
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            "unknown"
        }
    }

    const fn detect_shell() -> (&'static str, &'static str) {
        #[cfg(windows)]
        {
            ("cmd", "/C")
        }

        #[cfg(not(windows))]
        {
            ("/bin/sh", "-c")
        }
    }
}
