use anyhow::Context as _;
use clap::Parser;
use wasm_bindgen::prelude::*;

mod board;
mod transport;
mod viewer;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(flatten)]
    viewer: viewer::ViewerProps,
}

impl Args {
    /// Options come from the page hash, e.g. `#--variant=avalam&-vv`.
    fn from_location_hash(hash: &str) -> Result<Self, clap::Error> {
        Self::try_parse_from(hash.split(['#', '&']))
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    if let Err(err) = start() {
        gloo::console::error!(format!("{err:#}"));
    }
}

fn start() -> anyhow::Result<()> {
    use gloo::utils::{document, window};

    let location_hash = window().location().hash().unwrap_or_default();
    let args = Args::from_location_hash(&location_hash).context("Could not parse args")?;
    init_logger(&args.verbose)?;
    log::debug!("args: {:?}", args);

    let root = document()
        .get_element_by_id("viewer")
        .context("Could not find id=\"viewer\" element")?;

    log::debug!("Viewer started");
    yew::Renderer::<viewer::ViewerView>::with_root_and_props(root, args.viewer).render();
    Ok(())
}

/// Installs the console logger unless every level is silenced.
fn init_logger(verbose: &clap_verbosity_flag::Verbosity) -> anyhow::Result<()> {
    let Some(log_level) = verbose.log_level() else {
        return Ok(());
    };
    console_log::init_with_level(log_level)
        .map_err(|err| anyhow::anyhow!("Error initializing logger: {err}"))
}
