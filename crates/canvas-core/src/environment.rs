//! Local vs hosted environment detection.

use std::env;

/// Set inside Google Colab kernels.
const COLAB_MARKER: &str = "COLAB_RELEASE_TAG";

/// Set by JupyterHub for single-user servers.
const HUB_MARKERS: &[&str] = &["JUPYTERHUB_USER", "JUPYTERHUB_API_URL"];

/// Decides whether the tablet can be reached from this machine.
///
/// A remote environment has no USB bus and no user desktop, so only the
/// upload strategy applies there.
pub trait EnvironmentClassifier {
    fn is_remote(&self) -> bool;
}

impl<T: EnvironmentClassifier + ?Sized> EnvironmentClassifier for Box<T> {
    fn is_remote(&self) -> bool {
        (**self).is_remote()
    }
}

/// Classifier backed by hosted-notebook environment markers.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostedEnvironment;

impl EnvironmentClassifier for HostedEnvironment {
    fn is_remote(&self) -> bool {
        is_set(COLAB_MARKER) || HUB_MARKERS.iter().any(|name| is_set(name))
    }
}

fn is_set(name: &str) -> bool {
    env::var_os(name).is_some_and(|v| !v.is_empty())
}

/// Classifier with a fixed verdict, for `--remote`/`--local` and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEnvironment {
    pub remote: bool,
}

impl FixedEnvironment {
    pub fn local() -> Self {
        Self { remote: false }
    }

    pub fn remote() -> Self {
        Self { remote: true }
    }
}

impl EnvironmentClassifier for FixedEnvironment {
    fn is_remote(&self) -> bool {
        self.remote
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &["COLAB_RELEASE_TAG", "JUPYTERHUB_USER", "JUPYTERHUB_API_URL"];

    /// Clears the markers and restores them on drop.
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
        _lock: std::sync::MutexGuard<'static, ()>,
    }

    impl EnvGuard {
        fn cleared() -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let vars = VARS
                .iter()
                .map(|name| (name.to_string(), std::env::var(name).ok()))
                .collect();
            // SAFETY: We hold ENV_MUTEX
            unsafe {
                for name in VARS {
                    std::env::remove_var(name);
                }
            }
            Self { vars, _lock: lock }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.vars {
                // SAFETY: We hold ENV_MUTEX
                unsafe {
                    match value {
                        Some(v) => std::env::set_var(name, v),
                        None => std::env::remove_var(name),
                    }
                }
            }
        }
    }

    #[test]
    fn test_local_without_markers() {
        let _guard = EnvGuard::cleared();
        assert!(!HostedEnvironment.is_remote());
    }

    #[test]
    fn test_each_marker_means_remote() {
        for name in VARS {
            let _guard = EnvGuard::cleared();
            // SAFETY: We hold ENV_MUTEX via _guard
            unsafe { std::env::set_var(name, "1") };
            assert!(HostedEnvironment.is_remote(), "{} should mark remote", name);
        }
    }

    #[test]
    fn test_empty_marker_is_ignored() {
        let _guard = EnvGuard::cleared();
        // SAFETY: We hold ENV_MUTEX via _guard
        unsafe { std::env::set_var("JUPYTERHUB_USER", "") };
        assert!(!HostedEnvironment.is_remote());
    }

    #[test]
    fn test_fixed_environment() {
        assert!(FixedEnvironment::remote().is_remote());
        assert!(!FixedEnvironment::local().is_remote());
    }
}
