//! Default configuration values

/// Variants built when the project file does not list any
pub const DEFAULT_VARIANTS: &[&str] = &["en", "fr"];

/// Variant built when no `--language` flag is given
pub const DEFAULT_VARIANT: &str = "en";

/// Prefix of each variant's source directory (`cv-en`, `cv-fr`, ...)
pub const DEFAULT_VARIANT_DIR_PREFIX: &str = "cv-";

/// Primary LaTeX document inside a variant directory
pub const DEFAULT_DOCUMENT: &str = "resume.tex";

/// Artifact produced by the toolchain
pub const DEFAULT_ARTIFACT: &str = "resume.pdf";

/// Compiler log produced next to the artifact
pub const DEFAULT_LOG: &str = "resume.log";

/// Container runtime command
pub const DEFAULT_RUNTIME: &str = "docker";

/// Image tag prefix, the variant is appended (`cv-builder-en`)
pub const DEFAULT_IMAGE_PREFIX: &str = "cv-builder";

/// Build descriptor used to create images
pub const DEFAULT_DESCRIPTOR: &str = "Dockerfile.cv";

/// Directory inside the container where the variant directory is mounted
pub const DEFAULT_MOUNT_POINT: &str = "/cv/output";

/// Project configuration file name
pub const PROJECT_CONFIG_FILE: &str = "texdock.toml";

/// Timeout for runtime liveness probes (in seconds)
pub const PROBE_TIMEOUT_SECS: u64 = 30;

/// Timeout for building an image (in seconds)
pub const IMAGE_BUILD_TIMEOUT_SECS: u64 = 1800; // 30 minutes

/// Timeout for a single container compile run (in seconds)
pub const RUN_TIMEOUT_SECS: u64 = 600; // 10 minutes

/// Auxiliary file extensions removed by cleanup
///
/// Never contains the artifact or the log extension.
pub const AUX_EXTENSIONS: &[&str] = &[
    "aux",
    "out",
    "bbl",
    "blg",
    "fdb_latexmk",
    "fls",
    "toc",
    "synctex.gz",
];

/// Maximum number of stderr bytes kept in a failure for verbose reporting
pub const STDERR_TAIL_LIMIT: usize = 4000;

/// Number of warnings listed per variant before the rest is summarized
pub const WARNINGS_SHOWN: usize = 5;
