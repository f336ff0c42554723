//! Placeholder scanning and substitution for step arguments.
//!
//! Descriptors parameterize commands with `{{token}}` placeholders drawn
//! from a closed set. Scanning and substitution are split on purpose: the
//! validator scans every argument up front so an unresolved placeholder is
//! a [`kiln_schema::ManifestError`], never a mid-sequence surprise.

use crate::config::BuildConfig;

/// The closed set of recognized placeholder tokens.
pub const KNOWN_TOKENS: &[&str] = &["prefix", "bin", "std_flags", "jobs"];

/// The splice-only token: expands to multiple argv entries and is
/// therefore only legal as an entire argument.
pub const STD_FLAGS: &str = "std_flags";

/// Extract every `{{token}}` occurrence from a string, in order.
///
/// Unbalanced braces are not an error at this layer; a stray `{{` with no
/// closing `}}` simply yields no token (and the text passes through
/// substitution untouched).
pub fn tokens(text: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };
        found.push(&after[..close]);
        rest = &after[close + 2..];
    }
    found
}

/// Substitute inline tokens (`prefix`, `bin`, `jobs`) in a single string.
///
/// `std_flags` is not handled here; it splices into multiple arguments and
/// is expanded by [`render_args`]. Unknown tokens pass through unchanged
/// (the validator has already rejected them).
pub fn render_inline(text: &str, config: &BuildConfig) -> String {
    text.replace("{{prefix}}", &config.prefix.display().to_string())
        .replace("{{bin}}", &config.bin_dir().display().to_string())
        .replace("{{jobs}}", &config.jobs.to_string())
}

/// Render an argument list against the build configuration.
///
/// An argument that is exactly `{{std_flags}}` is spliced into the
/// platform default flag set; every other argument gets inline
/// substitution.
pub fn render_args(args: &[String], config: &BuildConfig) -> Vec<String> {
    let mut rendered = Vec::with_capacity(args.len());
    for arg in args {
        if arg == "{{std_flags}}" {
            rendered.extend(config.std_flags());
        } else {
            rendered.push(render_inline(arg, config));
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BuildConfig {
        let mut c = BuildConfig::with_prefix("/opt/pkg");
        c.jobs = 4;
        c
    }

    #[test]
    fn tokens_scans_in_order() {
        assert_eq!(tokens("{{bin}}/tool --jobs {{jobs}}"), vec!["bin", "jobs"]);
        assert!(tokens("no placeholders here").is_empty());
    }

    #[test]
    fn tokens_ignores_unclosed_braces() {
        assert!(tokens("{{oops").is_empty());
        assert_eq!(tokens("{{a}} {{trailing"), vec!["a"]);
    }

    #[test]
    fn render_inline_substitutes_paths() {
        assert_eq!(
            render_inline("{{bin}}/cfrds", &config()),
            "/opt/pkg/bin/cfrds"
        );
        assert_eq!(render_inline("-j{{jobs}}", &config()), "-j4");
    }

    #[test]
    fn render_args_splices_std_flags() {
        let args = vec![
            "-S".to_string(),
            ".".to_string(),
            "{{std_flags}}".to_string(),
        ];
        let rendered = render_args(&args, &config());
        assert_eq!(rendered.len(), 4);
        assert_eq!(rendered[2], "-DCMAKE_INSTALL_PREFIX=/opt/pkg");
        assert_eq!(rendered[3], "-DCMAKE_BUILD_TYPE=Release");
    }

    #[test]
    fn render_args_leaves_plain_arguments_alone() {
        let args = vec!["--build".to_string(), "build".to_string()];
        assert_eq!(render_args(&args, &config()), args);
    }
}
