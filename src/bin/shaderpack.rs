use anyhow::Context;
use clap::Parser;
use color_print::{ceprintln, cprintln};
use shaderpack_build::{PackManifest, PackWatcher, WorldFolder, build_tree};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
struct Args {
    /// Output directory for the assembled pack.
    output_dir: PathBuf,
    /// Path to the pack manifest.
    #[clap(short, long, default_value = "shaderpack.toml")]
    manifest: PathBuf,
    /// Keep the output tree in sync after the build.
    #[clap(short = 'W', long)]
    watch: bool,
    /// Don't print status lines to stdout.
    #[clap(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => {}
        Err(err) => {
            ceprintln!("<r,bold>error:</> {:#}", err);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let manifest = PackManifest::load(&args.manifest)?;
    let shaders_root = manifest.shaders_source_root();

    let worlds: Vec<WorldFolder> = manifest
        .worlds
        .iter()
        .map(|world| WorldFolder::scan(&shaders_root, world))
        .collect::<anyhow::Result<_>>()
        .context("scanning world directories")?;

    build_tree(&args.output_dir, &manifest, &worlds)?;
    if !args.quiet {
        cprintln!("<g,bold>built</> {}", args.output_dir.display());
    }

    if args.watch {
        if !args.quiet {
            cprintln!("watching {}, press CTRL+C to stop", shaders_root.display());
        }
        let watcher = PackWatcher::start(
            &shaders_root,
            &args.output_dir.join(&manifest.shaders_dir),
            Arc::new(worlds),
            manifest.properties_file.clone(),
        )?;
        watcher.wait().context("watch session ended")?;
    }

    Ok(())
}
