use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// List images known to the engine
    Images {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Build an image from a recipe file and a context directory
    Build {
        /// Tag for the resulting image
        #[arg(long, short = 't')]
        tag: String,
        /// Recipe to write into the context as Dockerfile
        #[arg(long, short = 'f')]
        file: PathBuf,
        /// Context directory (default: current directory)
        #[arg(default_value = ".")]
        context: PathBuf,
    },
    /// Tag an existing image
    Tag { source: String, target: String },
    /// Pull an image and wait for completion
    Pull { image: String },
    /// Push an image (no registry credentials are sent)
    Push { image: String },
    /// Force-delete an image
    Rmi { image: String },
    /// Check whether NAME:TAG exists on the registry
    #[command(name = "tag-exists")]
    TagExists {
        /// Image name, optionally with :tag
        name: String,
        /// Tag listing API segment
        #[arg(long, default_value = dockhand::registry::DEFAULT_TAG_API)]
        api: String,
    },
    /// Create (pulling or replacing as needed) and start a container
    Run {
        /// Container name
        #[arg(long)]
        name: String,
        /// Environment entries KEY=VALUE (repeatable)
        #[arg(long = "env", short = 'e')]
        env: Vec<String>,
        /// Bind mounts host:container[:mode] (repeatable)
        #[arg(long = "volume", short = 'v')]
        volumes: Vec<String>,
        /// Network to join
        #[arg(long)]
        network: Option<String>,
        /// Block until the container exits, print its logs, then remove it
        #[arg(long)]
        wait: bool,
        /// Image name, optionally with :tag (registry from --registry)
        image: String,
        /// Command and arguments
        #[arg(trailing_var_arg = true)]
        cmd: Vec<String>,
    },
    /// Block until a container reaches a terminal state
    Wait {
        container: String,
        /// Give up after this long (e.g. 90s, 5m)
        #[arg(long, value_parser = humantime::parse_duration)]
        timeout: Option<std::time::Duration>,
    },
    /// Print a container's combined stdout and stderr
    Logs { container: String },
    /// Force-remove containers (stops at the first failure)
    Rm {
        #[arg(required = true)]
        containers: Vec<String>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "dockhand",
    version,
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        "\nbuilt: ",
        env!("DOCKHAND_BUILD_DATE"),
        "\ntarget: ",
        env!("DOCKHAND_BUILD_TARGET"),
        " (",
        env!("DOCKHAND_BUILD_PROFILE"),
        ")\nrustc: ",
        env!("DOCKHAND_BUILD_RUSTC"),
    ),
    about = "Build, pull, push and run container images on a single engine.",
    after_long_help = "Examples:\n  dockhand build -t test_1 -f Dockerfile .\n  dockhand run --name probe --wait busybox:latest -- echo hi\n  dockhand --registry reg.local:5000 tag-exists app:1.0\n"
)]
pub(crate) struct Cli {
    /// Docker binary to use (default: docker on PATH)
    #[arg(long, env = dockhand::config::ENV_DOCKER)]
    pub(crate) docker: Option<PathBuf>,

    /// Registry host used for image references
    #[arg(long, env = dockhand::config::ENV_REGISTRY)]
    pub(crate) registry: Option<String>,

    /// Log filter directive (overrides DOCKHAND_LOG / RUST_LOG)
    #[arg(long)]
    pub(crate) log: Option<String>,

    /// Print detailed execution info (same as --log dockhand=debug)
    #[arg(long)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}
