use clap::Parser;
use env_logger::Env;

use triangles::app::launch;
use triangles::args::Args;
use triangles::rotate_triangle::RotatingTriangle;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = <Args as Parser>::parse();

    let res = launch(
        &args,
        "Rotating triangle",
        |renderer, dialect, config, viewport| {
            RotatingTriangle::new(renderer, dialect, config, viewport.aspect())
        },
    );

    if let Err(e) = res {
        log::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
