use clap::Parser;
use env_logger::Env;

use triangles::app::launch;
use triangles::args::Args;
use triangles::triangle::FlatTriangle;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // clion needs help in trait annotation
    let args = <Args as Parser>::parse();

    let res = launch(&args, "Triangle", |renderer, dialect, _config, _viewport| {
        FlatTriangle::new(renderer, dialect)
    });

    if let Err(e) = res {
        log::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
