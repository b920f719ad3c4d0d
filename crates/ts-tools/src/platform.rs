//! Per-platform facts that affect tool lookup.

/// Executable suffix and system-wide search directories for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Short name for logs ("windows", "unix").
    pub name: &'static str,
    /// Suffix appended to every executable name.
    pub exe_suffix: &'static str,
    /// System directories probed after the bundled candidates, in order.
    pub system_dirs: &'static [&'static str],
}

impl Platform {
    pub const WINDOWS: Platform = Platform {
        name: "windows",
        exe_suffix: ".exe",
        system_dirs: &[],
    };

    pub const UNIX: Platform = Platform {
        name: "unix",
        exe_suffix: "",
        system_dirs: &["/usr/local/bin", "/usr/bin", "/bin"],
    };

    /// The platform this binary was compiled for.
    pub const fn current() -> Platform {
        if cfg!(windows) {
            Platform::WINDOWS
        } else {
            Platform::UNIX
        }
    }

    /// File name of `stem` on this platform (`ffmpeg` -> `ffmpeg.exe`).
    pub fn executable_name(&self, stem: &str) -> String {
        format!("{stem}{}", self.exe_suffix)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}
