use std::sync::LazyLock;

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the software: the Cargo package version, suffixed with the git
/// commit when `KMERPACK_GIT_HASH` is set at build time.
pub static VERSION: LazyLock<String> = LazyLock::new(|| match option_env!("KMERPACK_GIT_HASH") {
    Some(hash) if !hash.is_empty() => format!("{PKG_VERSION}-{hash}"),
    _ => PKG_VERSION.to_string(),
});
