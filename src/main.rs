use std::error::Error;

use structopt::StructOpt;

use lib::Opt;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::from_args();
    lib::go(opt)
}
