use std::sync::LazyLock;

/// Defines the application version.
///
/// The git fields are absent when the crate is built outside a git checkout,
/// in which case the commit is reported as `unknown`.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}-{}{}",
        env!("IMAGE_VERSION"),
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        if option_env!("VERGEN_GIT_DIRTY") == Some("true") {
            "-dirty"
        } else {
            ""
        }
    )
});
